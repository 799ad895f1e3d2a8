// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use transync::app_config::{self, Config};
use transync::database::{DatabaseConnection, Repository};
use transync::{
    BatchItem, Cancellation, LogNotifier, PackageRegistry, PluralMigrator, PluralSchema,
    ReviewOverride, Submitter, Synchronizer, TranslationStore,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a parsed translation batch into a language
    Import(ImportArgs),

    /// Replace the plural schema of a language and reshape its translations
    MigratePlurals {
        /// Language tag
        language: String,
        /// JSON file with the new formula and plural forms
        schema_file: PathBuf,
    },

    /// Map a version request onto a registered package version
    ResolveVersion {
        /// Package handle
        handle: String,
        /// Requested version (e.g. 8.2.0rc1)
        request: String,
    },

    /// Translation progress of a package version
    Stats {
        handle: String,
        request: String,
        language: String,
    },

    /// Export the approved translations of a package version
    Export {
        handle: String,
        request: String,
        language: String,
    },

    /// Generate shell completions for transync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Target language tag
    language: String,

    /// JSON file holding an array of {"fingerprint", "texts"} items
    batch_file: PathBuf,

    /// Submit with administrator rights
    #[arg(long)]
    admin: bool,

    /// Approve unchanged current translations (administrators only)
    #[arg(long, conflicts_with = "unapprove")]
    approve: bool,

    /// Send unchanged current translations back to review (administrators only)
    #[arg(long)]
    unapprove: bool,

    /// Author recorded on new translations
    #[arg(long)]
    author: Option<String>,
}

/// transync - translation synchronization engine
///
/// Administrative front end for the translation store: imports parsed
/// translation batches, migrates plural schemas and answers version-scoped
/// export and progress queries.
#[derive(Parser, Debug)]
#[command(name = "transync")]
#[command(version)]
#[command(about = "Translation store synchronization and consistency tool")]
#[command(long_about = "transync merges translation batches into a shared translation store.

EXAMPLES:
    transync import de batch.json                  # Import as a contributor
    transync import de batch.json --admin --approve
    transync migrate-plurals ru ru-plurals.json    # Reshape translations to a new plural schema
    transync resolve-version core 8.2.0rc1         # Find the closest registered version
    transync stats core 8.2 de                     # Progress of a package version
    transync export core 8.2 de > de.json          # Approved translations of a version
    transync completions bash > transync.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in transync.json by default. You can specify a
    different file with --config. If the file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "transync.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                colour,
                now,
                tag,
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
    // The logger accepts everything; the max level filters until the config is read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "transync", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let config = load_config(&cli.config, cli.log_level)?;
    config
        .validate()
        .context("Configuration validation failed")?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let repo = open_repository(&config)?;

    match cli.command {
        Commands::Import(args) => run_import(&config, repo, args).await,
        Commands::MigratePlurals {
            language,
            schema_file,
        } => run_migrate(repo, &language, &schema_file).await,
        Commands::ResolveVersion { handle, request } => {
            let registry = PackageRegistry::new(repo, config.version_scheme());
            match registry.resolve_version(&handle, &request).await? {
                Some(version) => println!("{}", version.version),
                None => warn!("No registered version of {} matches {}", handle, request),
            }
            Ok(())
        }
        Commands::Stats {
            handle,
            request,
            language,
        } => {
            let registry = PackageRegistry::new(repo.clone(), config.version_scheme());
            match registry.version_progress(&handle, &request, &language).await? {
                Some(progress) => print_json(&progress)?,
                None => warn!("No registered version of {} matches {}", handle, request),
            }
            let store = TranslationStore::new(repo.clone());
            info!(
                "{} translations of {} await review",
                store.pending_review_count(&language).await?,
                language
            );
            for string_id in store.check_single_current(&language).await? {
                error!("String #{} has more than one current translation in {}", string_id, language);
            }
            info!("{}", repo.connection().stats()?);
            Ok(())
        }
        Commands::Export {
            handle,
            request,
            language,
        } => {
            let registry = PackageRegistry::new(repo, config.version_scheme());
            match registry.export_version(&handle, &request, &language).await? {
                Some(export) => print_json(&export)?,
                None => warn!("No registered version of {} matches {}", handle, request),
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file, creating a default one when missing
fn load_config(path: &Path, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if path.exists() {
        Config::from_file(path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            path.display()
        );
        let config = Config::default();
        config.save_to_file(path)?;
        config
    };

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    Ok(config)
}

fn open_repository(config: &Config) -> Result<Repository> {
    let db = match &config.database.path {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };
    Ok(Repository::new(db))
}

/// Trip the token on Ctrl-C so long operations stop at their next checkpoint
fn cancel_on_interrupt() -> Cancellation {
    let cancel = Cancellation::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
    cancel
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_import(config: &Config, repo: Repository, args: ImportArgs) -> Result<()> {
    let items: Vec<BatchItem> = read_json(&args.batch_file)?;

    let mut submitter = if args.admin {
        Submitter::administrator()
    } else {
        Submitter::contributor()
    };
    if args.approve {
        submitter = submitter.with_review(ReviewOverride::Approve);
    } else if args.unapprove {
        submitter = submitter.with_review(ReviewOverride::Unapprove);
    }
    if let Some(author) = args.author {
        submitter = submitter.with_author(author);
    }

    let synchronizer = Synchronizer::new(
        TranslationStore::new(repo),
        Arc::new(LogNotifier),
        config.sync_options(),
    );
    let report = synchronizer
        .import(&args.language, &submitter, items, &cancel_on_interrupt())
        .await?;

    print_json(&report)
}

async fn run_migrate(repo: Repository, language: &str, schema_file: &Path) -> Result<()> {
    let schema: PluralSchema = read_json(schema_file)?;

    let migrator = PluralMigrator::with_defaults(TranslationStore::new(repo));
    let report = migrator
        .migrate(language, schema, &cancel_on_interrupt())
        .await?;

    print_json(&report)
}
