//! `pokemonster`: browse the PokeAPI catalog in the terminal.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use bubbletea_rs::Program;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pokemonster::app::{self, CatalogApp, Launch};
use pokemonster::catalog::ResourceKind;
use pokemonster::config::{Backend, Config, HttpSources};
use pokemonster::paginator;

/// Pokemonster - PokeAPI catalog browser
///
/// Configuration priority: CLI args > POKEMONSTER_* environment variables >
/// config file > defaults.
#[derive(Parser, Debug)]
#[command(name = "pokemonster")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse Pokemon, berries and locations from PokeAPI", long_about = None)]
struct CliArgs {
    /// Config file (default: $CONFIG_DIR/pokemonster/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Collection to browse: pokemon, berry or location
    #[arg(short, long, value_parser = clap::value_parser!(ResourceKind))]
    resource: Option<ResourceKind>,

    /// API flavour
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Items per page
    #[arg(short = 'n', long)]
    page_size: Option<usize>,

    /// Page strip: numbers, arabic or dots
    #[arg(long, value_enum)]
    page_strip: Option<paginator::Type>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl CliArgs {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };
        config.apply_env()?;

        if let Some(resource) = self.resource {
            config.resource = resource;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = Some(page_size);
        }
        if let Some(page_strip) = self.page_strip {
            config.page_strip = page_strip;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = Some(log_file);
        }
        config.validate()?;
        Ok(config)
    }
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pokemonster")
        .join("pokemonster.log")
}

fn init_tracing(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokemonster=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = CliArgs::parse().into_config()?;

    let log_path = config.log_file.clone().unwrap_or_else(default_log_path);
    init_tracing(&log_path)?;
    info!(
        resource = %config.resource,
        backend = %config.backend,
        log = %log_path.display(),
        "starting pokemonster"
    );

    let factory = HttpSources::new(&config).context("failed to set up the data source")?;
    app::configure(Launch {
        config,
        factory: Arc::new(factory),
    })
        .map_err(|_| anyhow!("launch settings were already configured"))?;

    let program = Program::<CatalogApp>::builder()
        .alt_screen(true)
        .build()
        .map_err(|err| anyhow!("failed to start terminal program: {err}"))?;
    program
        .run()
        .await
        .map_err(|err| anyhow!("terminal program failed: {err}"))?;

    info!("bye");
    Ok(())
}
