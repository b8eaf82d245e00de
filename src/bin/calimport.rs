use anyhow::{Context, Result, bail};
use calimport::config::Config;
use calimport::import::{DateRange, ImportRequest, Importer};
use calimport::storage::LocalStorage;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Import ICS calendar files into the local event store
#[derive(Debug, Parser)]
#[command(name = "calimport")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import an .ics file for an owner
    Import {
        file: PathBuf,

        /// Owner to import for (defaults to `default_owner` from the config)
        #[arg(short, long)]
        owner: Option<String>,

        /// First day of the import window (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the import window (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Keep previously imported events that are missing from this file
        #[arg(long)]
        keep_old: bool,
    },

    /// List stored events
    List {
        /// Only events of this owner
        #[arg(short, long)]
        owner: Option<String>,
    },
}

fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let config = Config::load()?;

    let dir = cli
        .data_dir
        .or_else(|| LocalStorage::default_dir(config.data_dir.as_deref()))
        .context("no data directory available")?;
    let storage = LocalStorage::new(dir);

    match cli.command {
        Commands::Import {
            file,
            owner,
            from,
            to,
            keep_old,
        } => {
            let Some(owner) = config.resolve_owner(owner.as_deref()) else {
                bail!("No owner given: pass --owner or set default_owner in the config");
            };
            let content =
                fs::read(&file).with_context(|| format!("cannot open {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let request = ImportRequest::new(filename, content, owner)
                .with_range(DateRange::new(from, to))
                .remove_old(config.remove_old_events && !keep_old);

            let report = Importer::new().run_locked(&storage, &request)?;
            println!("{}", report.summary());
        }
        Commands::List { owner } => {
            let owner = owner.map(calimport::model::OwnerId::new);
            let mut events = storage.load()?;
            events.sort_by(|a, b| a.start.cmp(&b.start));
            let shown = events
                .iter()
                .filter(|e| owner.as_ref().is_none_or(|o| e.is_owned_by(o)));
            for event in shown {
                println!("{}", event.to_display_string());
            }
            info!("Data directory: {}", storage.dir().display());
        }
    }
    Ok(())
}
