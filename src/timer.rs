use crate::models::Mode;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running {
        end: DateTime<Utc>,
        duration_mins: u32,
    },
    Expired,
}

/// Emitted once when a running countdown reaches zero on its own.
///
/// `duration_mins` is the length the countdown was started with, not the
/// setting at expiry time; editing the focus duration mid-run does not change
/// what the finished run adds to the lifetime total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub mode: Mode,
    pub duration_mins: u32,
}

/// Countdown state machine.
///
/// While running, the remaining time is always recomputed from the absolute
/// end instant, so a late or skipped `tick` never makes the clock drift.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: Mode,
    remaining_secs: u64,
    phase: Phase,
}

impl TimerEngine {
    pub fn new(focus_mins: u32) -> Self {
        Self {
            mode: Mode::Focus,
            remaining_secs: minutes_to_secs(sanitize_minutes(focus_mins, Mode::Focus)),
            phase: Phase::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Last computed remaining time in seconds.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Total length of the countdown in progress, if any.
    pub fn active_duration_mins(&self) -> Option<u32> {
        match self.phase {
            Phase::Running { duration_mins, .. } => Some(duration_mins),
            _ => None,
        }
    }

    pub fn start(&mut self, mode: Mode, duration_mins: u32, now: DateTime<Utc>) {
        self.stop();

        let duration_mins = sanitize_minutes(duration_mins, mode);
        self.mode = mode;
        self.remaining_secs = minutes_to_secs(duration_mins);
        let end = now + Duration::seconds(self.remaining_secs as i64);
        self.phase = Phase::Running { end, duration_mins };

        tracing::debug!(?mode, duration_mins, %end, "countdown started");
    }

    /// Recomputes the remaining time. Returns the expiry exactly once, on the
    /// tick that observes zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Expiry> {
        let Phase::Running { end, duration_mins } = self.phase else {
            return None;
        };

        self.remaining_secs = secs_until(end, now);
        if self.remaining_secs > 0 {
            return None;
        }

        self.phase = Phase::Expired;
        tracing::info!(mode = ?self.mode, duration_mins, "countdown expired");
        Some(Expiry {
            mode: self.mode,
            duration_mins,
        })
    }

    /// Remaining time as of `now`, without touching state.
    #[cfg(test)]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match self.phase {
            Phase::Running { end, .. } => secs_until(end, now),
            _ => self.remaining_secs,
        }
    }

    /// Cancels the countdown. Calling it when already stopped does nothing.
    pub fn stop(&mut self) {
        if self.is_running() {
            tracing::debug!(remaining_secs = self.remaining_secs, "countdown stopped");
            self.phase = Phase::Idle;
        }
    }

    pub fn reset(&mut self, focus_mins: u32) {
        self.stop();
        self.mode = Mode::Focus;
        self.remaining_secs = minutes_to_secs(sanitize_minutes(focus_mins, Mode::Focus));
        self.phase = Phase::Idle;
    }

    /// Shows a newly configured duration on an idle clock of the same mode.
    pub fn set_idle_duration(&mut self, mode: Mode, duration_mins: u32) {
        if self.is_running() || self.mode != mode {
            return;
        }
        self.remaining_secs = minutes_to_secs(sanitize_minutes(duration_mins, mode));
    }
}

fn sanitize_minutes(duration_mins: u32, mode: Mode) -> u32 {
    if duration_mins == 0 {
        mode.default_minutes()
    } else {
        duration_mins
    }
}

fn minutes_to_secs(mins: u32) -> u64 {
    u64::from(mins) * 60
}

fn secs_until(end: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 999) / 1000) as u64
    }
}
