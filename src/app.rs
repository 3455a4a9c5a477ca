use crate::lists::ItemList;
use crate::models::{AppData, Distraction, ItemId, Mode, Quest, Settings};
use crate::notify::{DesktopNotifier, NotifyRequest};
use crate::sound::{SoundEvent, SoundNotifier};
use crate::storage::Storage;
use crate::timer::{Expiry, TimerEngine};
use crate::utils::parse_minutes;
use anyhow::Result;
use chrono::{DateTime, Utc};

pub const STATUS_IDLE: &str = "PRESS START TO BEGIN QUEST";
pub const STATUS_FOCUS: &str = "FOCUS MODE ACTIVE";
pub const STATUS_REST: &str = "REST MODE ACTIVE";
pub const STATUS_FOCUS_DONE: &str = "QUEST COMPLETE! TIME TO REST";
pub const STATUS_REST_DONE: &str = "BREAK OVER! READY FOR NEW QUEST";

/// Owns all application state. Every mutation is written to storage before
/// the method returns; rendering only ever borrows `&App`.
pub struct App {
    storage: Storage,
    settings: Settings,
    total_focus_mins: u64,
    quests: ItemList<Quest>,
    distractions: ItemList<Distraction>,
    timer: TimerEngine,
    status: &'static str,
    sound: SoundNotifier,
    notifier: DesktopNotifier,
}

impl App {
    pub fn new(storage: Storage, sound: SoundNotifier, notifier: DesktopNotifier) -> Self {
        let AppData {
            settings,
            total_focus_mins,
            quests,
            distractions,
        } = storage.load_all();
        let settings = settings.sanitized();

        tracing::info!(
            dir = %storage.dir().display(),
            quests = quests.len(),
            distractions = distractions.len(),
            total_focus_mins,
            "state loaded"
        );

        Self {
            storage,
            settings,
            total_focus_mins,
            quests: ItemList::from_items(quests),
            distractions: ItemList::from_items(distractions),
            timer: TimerEngine::new(settings.focus_duration_mins),
            status: STATUS_IDLE,
            sound,
            notifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn total_focus_mins(&self) -> u64 {
        self.total_focus_mins
    }

    pub fn quests(&self) -> &ItemList<Quest> {
        &self.quests
    }

    pub fn distractions(&self) -> &ItemList<Distraction> {
        &self.distractions
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn status(&self) -> &str {
        self.status
    }

    pub fn start_focus(&mut self, now: DateTime<Utc>) {
        self.start(Mode::Focus, now);
    }

    pub fn start_rest(&mut self, now: DateTime<Utc>) {
        self.start(Mode::Rest, now);
    }

    fn start(&mut self, mode: Mode, now: DateTime<Utc>) {
        self.timer.stop();
        self.sound.play(match mode {
            Mode::Focus => SoundEvent::StartFocus,
            Mode::Rest => SoundEvent::StartRest,
        });

        self.persist("settings", |s, app| s.save_settings(&app.settings));
        self.timer.start(mode, self.settings.duration_for(mode), now);
        self.status = match mode {
            Mode::Focus => STATUS_FOCUS,
            Mode::Rest => STATUS_REST,
        };
    }

    pub fn reset(&mut self) {
        self.timer.reset(self.settings.focus_duration_mins);
        self.sound.play(SoundEvent::Reset);
        self.status = STATUS_IDLE;
    }

    /// Applies a typed focus duration; bad input becomes the default.
    pub fn set_focus_duration(&mut self, input: &str) -> u32 {
        self.set_duration(Mode::Focus, input)
    }

    pub fn set_rest_duration(&mut self, input: &str) -> u32 {
        self.set_duration(Mode::Rest, input)
    }

    fn set_duration(&mut self, mode: Mode, input: &str) -> u32 {
        let mins = parse_minutes(input, mode.default_minutes());
        match mode {
            Mode::Focus => self.settings.focus_duration_mins = mins,
            Mode::Rest => self.settings.rest_duration_mins = mins,
        }
        self.persist("settings", |s, app| s.save_settings(&app.settings));
        self.timer.set_idle_duration(mode, mins);
        tracing::info!(?mode, mins, "duration updated");
        mins
    }

    /// Periodic recompute of the countdown. Handles expiry when it happens.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Expiry> {
        let expiry = self.timer.tick(now)?;
        self.sound.play(SoundEvent::TimerComplete);

        match expiry.mode {
            Mode::Focus => {
                self.total_focus_mins += u64::from(expiry.duration_mins);
                self.persist("total focus", |s, app| {
                    s.save_total_focus(app.total_focus_mins)
                });
                self.status = STATUS_FOCUS_DONE;
            }
            Mode::Rest => self.status = STATUS_REST_DONE,
        }
        self.notifier.notify(&NotifyRequest::for_expiry(expiry.mode));

        Some(expiry)
    }

    pub fn add_quest(&mut self, title: &str, now: DateTime<Utc>) -> Option<ItemId> {
        let id = self.quests.add(title, now)?.id.clone();
        self.persist("quests", |s, app| s.save_quests(app.quests.as_slice()));
        self.sound.play(SoundEvent::AddItem);
        Some(id)
    }

    pub fn toggle_quest(&mut self, id: &ItemId) -> Option<bool> {
        let completed = self.quests.toggle(id)?;
        self.persist("quests", |s, app| s.save_quests(app.quests.as_slice()));
        self.sound.play(if completed {
            SoundEvent::QuestComplete
        } else {
            SoundEvent::QuestUncomplete
        });
        Some(completed)
    }

    pub fn set_quest_progress(&mut self, id: &ItemId, value: i32) -> Option<bool> {
        let completed = self.quests.set_progress(id, value)?;
        self.persist("quests", |s, app| s.save_quests(app.quests.as_slice()));
        Some(completed)
    }

    pub fn remove_quest(&mut self, id: &ItemId) -> bool {
        if !self.quests.remove(id) {
            return false;
        }
        self.persist("quests", |s, app| s.save_quests(app.quests.as_slice()));
        self.sound.play(SoundEvent::DeleteItem);
        true
    }

    pub fn add_distraction(&mut self, text: &str, now: DateTime<Utc>) -> Option<ItemId> {
        let id = self.distractions.add(text, now)?.id.clone();
        self.persist("distractions", |s, app| {
            s.save_distractions(app.distractions.as_slice())
        });
        self.sound.play(SoundEvent::AddItem);
        Some(id)
    }

    pub fn toggle_distraction(&mut self, id: &ItemId) -> Option<bool> {
        let crossed = self.distractions.toggle(id)?;
        self.persist("distractions", |s, app| {
            s.save_distractions(app.distractions.as_slice())
        });
        self.sound.play(SoundEvent::ToggleCross);
        Some(crossed)
    }

    pub fn remove_distraction(&mut self, id: &ItemId) -> bool {
        if !self.distractions.remove(id) {
            return false;
        }
        self.persist("distractions", |s, app| {
            s.save_distractions(app.distractions.as_slice())
        });
        self.sound.play(SoundEvent::DeleteItem);
        true
    }

    pub fn click(&mut self) {
        self.sound.play(SoundEvent::Click);
    }

    /// Snapshot of everything persisted, e.g. for a final save on exit.
    pub fn data(&self) -> AppData {
        AppData {
            settings: self.settings,
            total_focus_mins: self.total_focus_mins,
            quests: self.quests.as_slice().to_vec(),
            distractions: self.distractions.as_slice().to_vec(),
        }
    }

    pub fn save_all(&self) -> Result<()> {
        self.storage.save_all(&self.data())
    }

    fn persist<F>(&self, record: &str, write: F)
    where
        F: FnOnce(&Storage, &Self) -> Result<()>,
    {
        if let Err(err) = write(&self.storage, self) {
            tracing::warn!(record, err = %err, "write-through failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::testing::RecordingSink;
    use crate::timer::Phase;
    use chrono::{Duration, TimeZone};
    use tempfile::{tempdir, TempDir};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    fn setup() -> (App, RecordingSink, TempDir) {
        let dir = tempdir().unwrap();
        let sink = RecordingSink::default();
        let app = App::new(
            Storage::from_dir(dir.path().to_path_buf()),
            SoundNotifier::new(Box::new(sink.clone())),
            DesktopNotifier::new(false),
        );
        (app, sink, dir)
    }

    fn reload(dir: &TempDir) -> AppData {
        Storage::from_dir(dir.path().to_path_buf()).load_all()
    }

    fn played(sink: &RecordingSink) -> usize {
        sink.played.borrow().len()
    }

    #[test]
    fn test_initial_state() {
        let (app, _, _dir) = setup();
        assert_eq!(app.status(), STATUS_IDLE);
        assert_eq!(app.timer().remaining_secs(), 25 * 60);
        assert_eq!(app.timer().mode(), Mode::Focus);
        assert!(!app.timer().is_running());
        assert_eq!(app.total_focus_mins(), 0);
    }

    #[test]
    fn test_focus_session_expires_and_accumulates() {
        let (mut app, sink, dir) = setup();
        app.set_focus_duration("1");
        app.start_focus(t0());
        assert_eq!(app.status(), STATUS_FOCUS);
        assert_eq!(app.timer().remaining_secs(), 60);

        assert!(app.tick(t0() + Duration::seconds(30)).is_none());
        assert_eq!(app.total_focus_mins(), 0);

        let expiry = app.tick(t0() + Duration::seconds(60)).unwrap();
        assert_eq!(expiry.mode, Mode::Focus);
        assert_eq!(app.timer().phase(), Phase::Expired);
        assert_eq!(app.total_focus_mins(), 1);
        assert_eq!(app.status(), STATUS_FOCUS_DONE);
        assert_eq!(
            sink.played.borrow().last().unwrap(),
            SoundEvent::TimerComplete.notes()
        );

        // Only once per expiry.
        assert!(app.tick(t0() + Duration::seconds(120)).is_none());
        assert_eq!(app.total_focus_mins(), 1);

        assert_eq!(reload(&dir).total_focus_mins, 1);
    }

    #[test]
    fn test_expiry_adds_duration_the_countdown_started_with() {
        let (mut app, _, _dir) = setup();
        app.set_focus_duration("2");
        app.start_focus(t0());
        // Editing the setting mid-run does not change what this run earns.
        app.set_focus_duration("50");

        app.tick(t0() + Duration::minutes(2));
        assert_eq!(app.total_focus_mins(), 2);
    }

    #[test]
    fn test_rest_expiry_does_not_count_focus() {
        let (mut app, _, _dir) = setup();
        app.start_rest(t0());
        assert_eq!(app.status(), STATUS_REST);

        let expiry = app.tick(t0() + Duration::minutes(5)).unwrap();
        assert_eq!(expiry.mode, Mode::Rest);
        assert_eq!(app.total_focus_mins(), 0);
        assert_eq!(app.status(), STATUS_REST_DONE);
        assert!(!app.timer().is_running());
    }

    #[test]
    fn test_switching_modes_restarts_from_configured_duration() {
        let (mut app, _, _dir) = setup();
        app.start_focus(t0());
        app.tick(t0() + Duration::minutes(10));

        app.start_rest(t0() + Duration::minutes(10));
        app.start_focus(t0() + Duration::minutes(11));
        assert_eq!(app.timer().remaining_secs(), 25 * 60);
    }

    #[test]
    fn test_reset_after_running() {
        let (mut app, _, _dir) = setup();
        app.start_rest(t0());
        app.reset();

        assert_eq!(app.status(), STATUS_IDLE);
        assert_eq!(app.timer().mode(), Mode::Focus);
        assert_eq!(app.timer().remaining_secs(), 25 * 60);
        assert!(app.tick(t0() + Duration::hours(1)).is_none());
    }

    #[test]
    fn test_invalid_duration_input_uses_default() {
        let (mut app, _, dir) = setup();
        assert_eq!(app.set_focus_duration("abc"), 25);
        assert_eq!(app.set_rest_duration("0"), 5);
        assert_eq!(app.set_rest_duration("12"), 12);

        let settings = reload(&dir).settings;
        assert_eq!(settings.focus_duration_mins, 25);
        assert_eq!(settings.rest_duration_mins, 12);
    }

    #[test]
    fn test_duration_edit_updates_idle_display() {
        let (mut app, _, _dir) = setup();
        app.set_focus_duration("40");
        assert_eq!(app.timer().remaining_secs(), 40 * 60);

        app.set_rest_duration("10");
        assert_eq!(app.timer().remaining_secs(), 40 * 60);
    }

    #[test]
    fn test_quest_scenario() {
        let (mut app, _, dir) = setup();
        let id = app.add_quest("Write report", t0()).unwrap();

        assert_eq!(app.toggle_quest(&id), Some(true));
        let quest = app.quests().get(&id).unwrap();
        assert!(quest.completed);
        assert_eq!(quest.progress, 100);
        assert_eq!(reload(&dir).quests[0].progress, 100);

        assert_eq!(app.toggle_quest(&id), Some(false));
        let quest = app.quests().get(&id).unwrap();
        assert!(!quest.completed);
        assert_eq!(quest.progress, 0);
        assert!(!reload(&dir).quests[0].completed);
    }

    #[test]
    fn test_quest_progress_is_written_through() {
        let (mut app, _, dir) = setup();
        let id = app.add_quest("Write report", t0()).unwrap();

        assert_eq!(app.set_quest_progress(&id, 60), Some(false));
        assert_eq!(reload(&dir).quests[0].progress, 60);

        assert_eq!(app.set_quest_progress(&id, 100), Some(true));
        assert!(reload(&dir).quests[0].completed);
    }

    #[test]
    fn test_noops_do_not_write_or_play() {
        let (mut app, sink, dir) = setup();
        assert!(app.add_quest("   ", t0()).is_none());
        assert!(app.add_distraction("", t0()).is_none());
        let missing = ItemId::from("missing");
        assert!(app.toggle_quest(&missing).is_none());
        assert!(app.toggle_distraction(&missing).is_none());
        assert!(app.set_quest_progress(&missing, 50).is_none());
        assert!(!app.remove_quest(&missing));
        assert!(!app.remove_distraction(&missing));

        assert_eq!(played(&sink), 0);
        assert!(!dir.path().join("quests.json").exists());
        assert!(!dir.path().join("distractions.json").exists());
    }

    #[test]
    fn test_distraction_lifecycle() {
        let (mut app, sink, dir) = setup();
        let id = app.add_distraction("check email", t0()).unwrap();
        assert_eq!(app.toggle_distraction(&id), Some(true));
        assert!(reload(&dir).distractions[0].crossed);

        assert!(app.remove_distraction(&id));
        assert!(app.distractions().is_empty());
        assert!(reload(&dir).distractions.is_empty());

        let sounds = sink.played.borrow();
        assert_eq!(sounds[0], SoundEvent::AddItem.notes());
        assert_eq!(sounds[1], SoundEvent::ToggleCross.notes());
        assert_eq!(sounds[2], SoundEvent::DeleteItem.notes());
    }

    #[test]
    fn test_state_survives_restart() {
        let (mut app, _, dir) = setup();
        app.set_focus_duration("45");
        app.add_quest("Write report", t0());
        app.add_distraction("phone", t0());
        drop(app);

        let app = App::new(
            Storage::from_dir(dir.path().to_path_buf()),
            SoundNotifier::from_config(false),
            DesktopNotifier::new(false),
        );
        assert_eq!(app.settings().focus_duration_mins, 45);
        assert_eq!(app.timer().remaining_secs(), 45 * 60);
        assert_eq!(app.quests().len(), 1);
        assert_eq!(app.distractions().len(), 1);
    }
}
