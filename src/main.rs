mod app;
mod config;
mod lists;
mod models;
mod notify;
mod report;
mod sound;
mod storage;
mod timer;
mod tui;
mod utils;

use anyhow::Result;
use app::App;
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::Config;
use fd_lock::{RwLock, RwLockWriteGuard};
use models::ItemId;
use notify::DesktopNotifier;
use report::Reporter;
use sound::SoundNotifier;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration as StdDuration;
use storage::Storage;
use tracing::Level;

#[derive(Parser)]
#[command(name = "questclock")]
#[command(about = "A focus timer with a quest log and a distraction list", long_about = None)]
struct Cli {
    /// Directory holding settings, totals and lists
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Path to a custom configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Maximum logging level written to questclock.log
    #[arg(short, long, global = true, default_value_t = Level::INFO)]
    verbosity: Level,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the timer (default)
    Run,
    /// Print settings, lifetime focus and both lists
    Status,
    /// Show or change the focus/rest durations
    Settings {
        /// Focus duration in minutes
        #[arg(long)]
        focus: Option<String>,
        /// Rest duration in minutes
        #[arg(long)]
        rest: Option<String>,
    },
    /// Manage quests
    #[command(subcommand)]
    Quest(QuestCommand),
    /// Manage distractions
    #[command(subcommand)]
    Distraction(DistractionCommand),
}

#[derive(Subcommand)]
enum QuestCommand {
    /// Add a quest
    Add { title: Vec<String> },
    /// Flip a quest between done and not done
    Toggle { id: String },
    /// Set a quest's progress (0-100)
    Progress {
        id: String,
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Delete a quest
    Remove { id: String },
    /// List quests
    List,
}

#[derive(Subcommand)]
enum DistractionCommand {
    /// Log a distraction
    Add { text: Vec<String> },
    /// Cross a distraction out, or back in
    Toggle { id: String },
    /// Delete a distraction
    Remove { id: String },
    /// List distractions
    List,
}

impl Commands {
    /// Whether the command writes to the store, and so must not run next to
    /// an open timer session holding stale copies of the records.
    fn mutates(&self) -> bool {
        match self {
            Commands::Run => true,
            Commands::Status => false,
            Commands::Settings { focus, rest } => focus.is_some() || rest.is_some(),
            Commands::Quest(command) => !matches!(command, QuestCommand::List),
            Commands::Distraction(command) => !matches!(command, DistractionCommand::List),
        }
    }
}

fn open_lock(dir: &Path) -> Result<RwLock<File>> {
    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(dir.join("questclock.lock"))?;
    Ok(RwLock::new(lock_file))
}

fn acquire_lock(lock: &mut RwLock<File>) -> Result<RwLockWriteGuard<'_, File>> {
    lock.try_write().map_err(|_| {
        anyhow::anyhow!("Another instance of Questclock is already running. Please close it before starting a new one.")
    })
}

fn init_logging(dir: &Path, level: Level) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("questclock.log"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| anyhow::anyhow!("Could not setup logger: {}", err))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Storage::get_base_dir()?,
    };
    std::fs::create_dir_all(&base_dir)?;
    init_logging(&base_dir, cli.verbosity)?;

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&base_dir)?,
    };
    let storage = Storage::from_dir(base_dir.clone());

    let command = cli.command.unwrap_or(Commands::Run);
    let mut lock = open_lock(&base_dir)?;
    let _guard = if command.mutates() {
        Some(acquire_lock(&mut lock)?)
    } else {
        None
    };

    match command {
        Commands::Run => {
            let mut app = build_app(storage, &config);
            tui::run_tui(&mut app, StdDuration::from_millis(config.tick_millis))?;

            // Final save
            app.save_all()?;
            println!("Lifetime focus: {} min", app.total_focus_mins());
        }
        Commands::Status => {
            Reporter::new(storage).report();
        }
        Commands::Settings { focus, rest } => {
            let mut app = build_app(storage, &config);
            if let Some(focus) = focus {
                app.set_focus_duration(&focus);
            }
            if let Some(rest) = rest {
                app.set_rest_duration(&rest);
            }
            let settings = app.settings();
            println!(
                "Focus: {}m | Rest: {}m",
                settings.focus_duration_mins, settings.rest_duration_mins
            );
        }
        Commands::Quest(command) => run_quest_command(build_app(storage, &config), command),
        Commands::Distraction(command) => {
            run_distraction_command(build_app(storage, &config), command)
        }
    }

    Ok(())
}

fn build_app(storage: Storage, config: &Config) -> App {
    App::new(
        storage,
        SoundNotifier::from_config(config.sound),
        DesktopNotifier::new(config.notifications),
    )
}

fn run_quest_command(mut app: App, command: QuestCommand) {
    match command {
        QuestCommand::Add { title } => match app.add_quest(&title.join(" "), Utc::now()) {
            Some(id) => println!("Added quest {}", id),
            None => println!("Nothing to add."),
        },
        QuestCommand::Toggle { id } => match app.toggle_quest(&ItemId::from(id)) {
            Some(true) => println!("Quest complete."),
            Some(false) => println!("Quest reopened."),
            None => println!("No such quest."),
        },
        QuestCommand::Progress { id, value } => {
            let id = ItemId::from(id);
            match app.set_quest_progress(&id, value) {
                Some(_) => {
                    if let Some(quest) = app.quests().get(&id) {
                        println!("{}", report::quest_line(quest));
                    }
                }
                None => println!("No such quest."),
            }
        }
        QuestCommand::Remove { id } => {
            if app.remove_quest(&ItemId::from(id)) {
                println!("Quest removed.");
            } else {
                println!("No such quest.");
            }
        }
        QuestCommand::List => {
            for quest in app.quests().iter() {
                println!("{}", report::quest_line(quest));
            }
        }
    }
}

fn run_distraction_command(mut app: App, command: DistractionCommand) {
    match command {
        DistractionCommand::Add { text } => {
            match app.add_distraction(&text.join(" "), Utc::now()) {
                Some(id) => println!("Logged distraction {}", id),
                None => println!("Nothing to add."),
            }
        }
        DistractionCommand::Toggle { id } => match app.toggle_distraction(&ItemId::from(id)) {
            Some(true) => println!("Crossed out."),
            Some(false) => println!("Restored."),
            None => println!("No such distraction."),
        },
        DistractionCommand::Remove { id } => {
            if app.remove_distraction(&ItemId::from(id)) {
                println!("Distraction removed.");
            } else {
                println!("No such distraction.");
            }
        }
        DistractionCommand::List => {
            for distraction in app.distractions().iter() {
                println!("{}", report::distraction_line(distraction));
            }
        }
    }
}
