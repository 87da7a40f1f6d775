use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use placemark::config::{get_config_path, Config};
use placemark::db::{Database, StoredPlaces};
use placemark::map::{
    render_markers, render_popups, DeviceLocation, LocateTask, MapViewAdapter, MemorySurface,
};
use placemark::session;
use placemark::sync::{Submission, SyncController};

#[derive(Parser)]
#[command(name = "pmark")]
#[command(about = "Mark places on a map and keep them across sessions")]
struct Cli {
    /// SQLite database file (overrides the configured path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Key the place list is stored under
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Session,
    /// List saved places
    List,
    /// Add a place in one step
    Add {
        /// Latitude of the clicked point
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude of the clicked point
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,
    },
    /// Show the rendered marker set
    Markers {
        /// Print each marker's popup markup instead of the tree
        #[arg(long)]
        html: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the file-backed values, without overrides, to the user config file
        #[arg(long)]
        write: bool,
    },
}

/// Initialize tracing with output to stderr so stdout carries only command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "placemark=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<StoredPlaces> {
    let path = config.database_path()?;
    let db = Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate()?;
    Ok(StoredPlaces::new(db, config.storage_key.clone()))
}

fn start(config: &Config) -> anyhow::Result<SyncController<StoredPlaces, MemorySurface>> {
    let store = open_store(config)?;
    let map = MapViewAdapter::new(MemorySurface::new(), config.map_settings());
    Ok(SyncController::start(store, map))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let file_config = Config::load_file();
    let config = file_config.clone().with_env().with_cli(cli.db, cli.key);

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            let mut controller = start(&config)?;
            let locator = Arc::new(DeviceLocation::from_url(config.geolocation_url.as_deref()));
            let locate = LocateTask::spawn(locator);

            let input = tokio::io::BufReader::new(tokio::io::stdin());
            session::run(&mut controller, Some(locate), input, tokio::io::stdout()).await?;
        }
        Commands::List => {
            let controller = start(&config)?;
            print!("{}", session::format_places(controller.places()));
        }
        Commands::Add {
            lat,
            lon,
            name,
            description,
        } => {
            let mut controller = start(&config)?;
            controller.on_map_click(lat, lon)?;
            controller.set_name(name);
            controller.set_description(description);

            match controller.submit() {
                Submission::Committed { place, publication } => {
                    if !publication.persisted {
                        anyhow::bail!("{} was added but could not be saved", place.name());
                    }
                    println!("added {} [{}]", place.name(), place.coordinate());
                }
                Submission::Rejected(reason) => anyhow::bail!("place not added: {}", reason),
            }
        }
        Commands::Markers { html } => {
            let controller = start(&config)?;
            let surface = controller.map().surface();
            if html {
                print!("{}", render_popups(surface));
            } else {
                print!("{}", render_markers(surface));
            }
        }
        Commands::Config { write } => {
            if write {
                // Overrides from the environment and flags apply to this run only.
                file_config.save()?;
                tracing::info!("Wrote {}", get_config_path()?.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
