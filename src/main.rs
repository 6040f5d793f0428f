// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use linguadeck::app_config::{Config, LogLevel};
use linguadeck::lessons::{self, CascadeDeleteCoordinator, LocalLessonFiles};
use linguadeck::providers::{AiClient, ReqwestRelay};
use linguadeck::{DatabaseConnection, Repository, language_utils};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the database and create any missing tables
    Init,

    /// Print row counts and database size
    Stats,

    /// List stored languages
    Languages,

    /// Create a lesson from a text file under the configured storage root
    AddLesson {
        /// Language id
        #[arg(long)]
        language: i64,

        /// Lesson title
        #[arg(short, long)]
        title: String,

        /// File holding the lesson transcript
        content_file: PathBuf,
    },

    /// Delete a lesson with its files, words and cached audio
    DeleteLesson {
        /// Lesson id
        lesson_id: i64,
    },

    /// Annotate words with the active AI platform
    Annotate {
        /// Words to annotate
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Generate shell completions for linguadeck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// linguadeck - local store and AI enrichment for language lessons
#[derive(Parser, Debug)]
#[command(name = "linguadeck")]
#[command(version)]
#[command(about = "Maintenance tool for the linguadeck lesson store")]
#[command(long_about = "linguadeck keeps languages, lessons, vocabulary and word audio in SQLite.

EXAMPLES:
    linguadeck init                             # Create the database and tables
    linguadeck stats                            # Show row counts
    linguadeck --database ./dev.db languages    # Use another database file
    linguadeck add-lesson --language 1 -t Hola a.txt  # Create a lesson
    linguadeck delete-lesson 12                 # Remove lesson 12 and its files
    linguadeck annotate gato perro              # Annotate words with the active platform
    linguadeck completions bash > linguadeck.bash

CONFIGURATION:
    Configuration is stored in linguadeck.json by default. If the file does
    not exist, a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "linguadeck.json", env = "LINGUADECK_CONFIG")]
    config: PathBuf,

    /// Database file; overrides the configuration
    #[arg(short, long, env = "LINGUADECK_DATABASE")]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    /// ANSI color for a level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set via max_level below
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "linguadeck", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if let Some(database) = cli.database.clone() {
        config.database_path = Some(database);
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let db = match &config.database_path {
        Some(path) => DatabaseConnection::new(path),
        None => DatabaseConnection::new_default()?,
    };
    let created = db.connect().await?;
    let repo = Repository::new(db.clone());

    let result = run_command(cli.command, &config, &repo, &created).await;
    db.disconnect();
    result
}

async fn run_command(
    command: Commands,
    config: &Config,
    repo: &Repository,
    created: &[&'static str],
) -> Result<()> {
    match command {
        Commands::Init => {
            if created.is_empty() {
                println!("Database at {:?} is up to date", repo.connection().path());
            } else {
                println!("Created tables: {}", created.join(", "));
            }
        }
        Commands::Stats => {
            println!("{}", repo.connection().stats().await?);
        }
        Commands::Languages => {
            for language in repo.list_languages().await? {
                let name = language_utils::language_name(&language.language_text)
                    .unwrap_or_else(|_| "unknown".to_string());
                println!(
                    "{:>4}  {:<20} {:<10} {:<12} {}",
                    language.id, language.title, language.language_text, name, language.voice
                );
            }
        }
        Commands::AddLesson {
            language,
            title,
            content_file,
        } => {
            let content = tokio::fs::read_to_string(&content_file)
                .await
                .with_context(|| format!("Failed to read lesson text: {:?}", content_file))?;
            let (lesson_id, paths) =
                lessons::create_lesson(repo, &config.storage_root, language, &title, &content).await?;
            println!("Created lesson {} in {:?}", lesson_id, paths.directory);
        }
        Commands::DeleteLesson { lesson_id } => {
            let coordinator = CascadeDeleteCoordinator::new(repo.clone(), Arc::new(LocalLessonFiles));
            let report = coordinator.delete_lesson_by_id(lesson_id).await?;
            info!(
                "Lesson {} deleted: {} words, {} cached audio rows",
                lesson_id, report.word_rows, report.audio_rows
            );
        }
        Commands::Annotate { words } => {
            let settings = repo.load_settings().await?;
            let relay = Arc::new(ReqwestRelay::new(Duration::from_secs(config.http.timeout_secs)));
            let client = AiClient::new(relay);
            let batches = client
                .annotate_in_batches(&words, settings.soft.batch_size(), &settings.ai, &settings.prompts)
                .await?;
            println!("{}", batches.join("\n\n"));
        }
        Commands::Completions { .. } => {
            return Err(anyhow!("completions are handled before the database is opened"));
        }
    }
    Ok(())
}
