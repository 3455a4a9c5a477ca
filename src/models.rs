use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FOCUS_MINS: u32 = 25;
pub const DEFAULT_REST_MINS: u32 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Rest,
}

impl Mode {
    pub fn default_minutes(self) -> u32 {
        match self {
            Mode::Focus => DEFAULT_FOCUS_MINS,
            Mode::Rest => DEFAULT_REST_MINS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "FOCUS",
            Mode::Rest => "REST",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    #[serde(rename = "focusDuration")]
    pub focus_duration_mins: u32,
    #[serde(rename = "restDuration")]
    pub rest_duration_mins: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration_mins: DEFAULT_FOCUS_MINS,
            rest_duration_mins: DEFAULT_REST_MINS,
        }
    }
}

impl Settings {
    /// Replaces zero durations, which a hand-edited store may contain.
    pub fn sanitized(self) -> Self {
        let or_default = |mins: u32, mode: Mode| {
            if mins == 0 {
                mode.default_minutes()
            } else {
                mins
            }
        };
        Self {
            focus_duration_mins: or_default(self.focus_duration_mins, Mode::Focus),
            rest_duration_mins: or_default(self.rest_duration_mins, Mode::Rest),
        }
    }

    pub fn duration_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_duration_mins,
            Mode::Rest => self.rest_duration_mins,
        }
    }
}

/// Identifier of a quest or distraction, stable for the item's lifetime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}_{}", prefix, uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    /// Clamps progress into 0..=100 and makes `completed` agree with it.
    pub fn normalized(mut self) -> Self {
        self.progress = self.progress.min(100);
        self.completed = self.progress == 100;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Distraction {
    pub id: ItemId,
    pub text: String,
    pub crossed: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything that survives a restart.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppData {
    pub settings: Settings,
    pub total_focus_mins: u64,
    pub quests: Vec<Quest>,
    pub distractions: Vec<Distraction>,
}
