use crate::models::{AppData, Distraction, Quest, Settings};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";
const TOTAL_FOCUS_FILE: &str = "total_focus.json";
const QUESTS_FILE: &str = "quests.json";
const DISTRACTIONS_FILE: &str = "distractions.json";

/// Keeps each persisted record in its own JSON file under one directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn get_base_dir() -> Result<PathBuf> {
        let mut path =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        path.push(".questclock");
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(path)
    }

    pub fn from_dir(dir: PathBuf) -> Self {
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads every record. A record that is missing or does not parse is
    /// replaced by its default without affecting the others.
    pub fn load_all(&self) -> AppData {
        AppData {
            settings: self.load_record(SETTINGS_FILE),
            total_focus_mins: self.load_record(TOTAL_FOCUS_FILE),
            quests: self
                .load_record::<Vec<Quest>>(QUESTS_FILE)
                .into_iter()
                .map(Quest::normalized)
                .collect(),
            distractions: self.load_record(DISTRACTIONS_FILE),
        }
    }

    pub fn save_all(&self, data: &AppData) -> Result<()> {
        self.save_settings(&data.settings)?;
        self.save_total_focus(data.total_focus_mins)?;
        self.save_quests(&data.quests)?;
        self.save_distractions(&data.distractions)?;
        Ok(())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save_record(SETTINGS_FILE, settings)
    }

    pub fn save_total_focus(&self, total_focus_mins: u64) -> Result<()> {
        self.save_record(TOTAL_FOCUS_FILE, &total_focus_mins)
    }

    pub fn save_quests(&self, quests: &[Quest]) -> Result<()> {
        self.save_record(QUESTS_FILE, &quests)
    }

    pub fn save_distractions(&self, distractions: &[Distraction]) -> Result<()> {
        self.save_record(DISTRACTIONS_FILE, &distractions)
    }

    fn load_record<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.dir.join(name);
        if !path.exists() {
            return T::default();
        }

        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|data| serde_json::from_str(&data).map_err(anyhow::Error::from));
        match parsed {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(path = %path.display(), err = %err, "unreadable record, using default");
                T::default()
            }
        }
    }

    fn save_record<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let data = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &path)?;
        tracing::trace!(path = %path.display(), "record saved");
        Ok(())
    }
}
