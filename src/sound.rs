use anyhow::Result;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    pub volume: f32,
}

const fn blip(frequency_hz: u32, duration_ms: u32) -> Note {
    Note {
        frequency_hz,
        duration_ms,
        waveform: Waveform::Square,
        volume: 0.3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    AddItem,
    DeleteItem,
    QuestComplete,
    QuestUncomplete,
    ToggleCross,
    StartFocus,
    StartRest,
    Reset,
    TimerComplete,
    Click,
}

const ADD_ITEM: &[Note] = &[blip(800, 50), blip(1200, 80)];
const DELETE_ITEM: &[Note] = &[blip(400, 80), blip(300, 80), blip(200, 100)];
// C5 E5 G5 C6
const QUEST_COMPLETE: &[Note] = &[blip(523, 100), blip(659, 100), blip(784, 100), blip(1047, 300)];
const QUEST_UNCOMPLETE: &[Note] = &[blip(400, 100), blip(300, 150)];
const TOGGLE_CROSS: &[Note] = &[Note {
    frequency_hz: 600,
    duration_ms: 80,
    waveform: Waveform::Square,
    volume: 0.2,
}];
// C4 E4 G4 C5
const START_FOCUS: &[Note] = &[blip(262, 100), blip(330, 100), blip(392, 100), blip(523, 150)];
const START_REST: &[Note] = &[blip(392, 150), blip(330, 150), blip(262, 200)];
const RESET: &[Note] = &[blip(500, 100), blip(400, 100), blip(300, 150)];
const TIMER_COMPLETE: &[Note] = &[
    blip(523, 150),
    blip(523, 150),
    blip(523, 150),
    blip(415, 400),
    blip(466, 150),
    blip(466, 150),
    blip(466, 150),
    blip(415, 400),
];
const CLICK: &[Note] = &[Note {
    frequency_hz: 800,
    duration_ms: 50,
    waveform: Waveform::Square,
    volume: 0.15,
}];

impl SoundEvent {
    pub fn notes(self) -> &'static [Note] {
        match self {
            SoundEvent::AddItem => ADD_ITEM,
            SoundEvent::DeleteItem => DELETE_ITEM,
            SoundEvent::QuestComplete => QUEST_COMPLETE,
            SoundEvent::QuestUncomplete => QUEST_UNCOMPLETE,
            SoundEvent::ToggleCross => TOGGLE_CROSS,
            SoundEvent::StartFocus => START_FOCUS,
            SoundEvent::StartRest => START_REST,
            SoundEvent::Reset => RESET,
            SoundEvent::TimerComplete => TIMER_COMPLETE,
            SoundEvent::Click => CLICK,
        }
    }
}

/// Somewhere a note sequence can be played.
pub trait ToneSink {
    fn play(&mut self, notes: &[Note]) -> Result<()>;
}

/// Rings the terminal bell once per sequence.
pub struct TerminalBell;

impl ToneSink for TerminalBell {
    fn play(&mut self, notes: &[Note]) -> Result<()> {
        let Some(first) = notes.first() else {
            return Ok(());
        };
        let total_ms: u32 = notes.iter().map(|n| n.duration_ms).sum();
        tracing::trace!(
            frequency_hz = first.frequency_hz,
            waveform = ?first.waveform,
            volume = first.volume,
            total_ms,
            "bell"
        );
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

pub struct Silent;

impl ToneSink for Silent {
    fn play(&mut self, _notes: &[Note]) -> Result<()> {
        Ok(())
    }
}

/// Fire-and-forget feedback. Playback failures never reach the caller.
pub struct SoundNotifier {
    sink: Box<dyn ToneSink>,
}

impl SoundNotifier {
    pub fn new(sink: Box<dyn ToneSink>) -> Self {
        Self { sink }
    }

    pub fn from_config(enabled: bool) -> Self {
        if enabled {
            Self::new(Box::new(TerminalBell))
        } else {
            Self::new(Box::new(Silent))
        }
    }

    pub fn play(&mut self, event: SoundEvent) {
        if let Err(err) = self.sink.play(event.notes()) {
            tracing::debug!(?event, err = %err, "sound skipped");
        }
    }
}
