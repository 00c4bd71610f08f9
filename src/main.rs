use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trackbox::api::AppState;
use trackbox::seed::SeedOutcome;
use trackbox::store::Backend;

#[derive(Parser)]
#[command(name = "trackbox", version, about = "Track catalogue HTTP service")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, global = true, env = "TRACKBOX_DB")]
    db_path: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the store if empty, then serve the HTTP API (default)
    Serve {
        /// Address to listen on (e.g. 127.0.0.1:8000)
        #[arg(long)]
        bind: Option<String>,

        /// Seed file (JSON array of tracks)
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Create the database schema and exit
    InitDb,

    /// Seed the database if it is empty, then exit
    Seed {
        /// Seed file (JSON array of tracks)
        #[arg(long)]
        seed: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = trackbox::config::AppConfig::load(cli.config.as_deref());

    // Database path: CLI/env > config > XDG default. Resolved only when SQLite needs it,
    // since the XDG default creates its directory.
    let db_override = cli.db_path.or_else(|| config.db_path.clone());
    let db_path = move || db_override.unwrap_or_else(trackbox::config::default_db_path);
    let backend = cli.backend.unwrap_or(config.backend);

    let command = cli.command.unwrap_or(Commands::Serve { bind: None, seed: None });

    match command {
        Commands::InitDb => {
            if backend == Backend::Memory {
                anyhow::bail!("init-db only applies to the sqlite backend");
            }
            let db_path = db_path();
            trackbox::db::Database::open(&db_path)
                .context("Failed to open database")?;
            println!("Database ready at {}", db_path.display());
        }

        Commands::Seed { seed } => {
            if backend == Backend::Memory {
                anyhow::bail!("Seeding the memory backend outside `serve` has no lasting effect");
            }
            let store = trackbox::store::open(backend, db_path)
                .context("Failed to open store")?;
            let seed_path = seed.unwrap_or(config.seed_path);
            match trackbox::seed::seed_if_empty(store.as_ref(), &seed_path)
                .context("Seeding failed")?
            {
                SeedOutcome::Seeded(n) => println!("Seeded {} tracks from {}", n, seed_path.display()),
                SeedOutcome::AlreadyPopulated => println!("Store already has tracks, nothing to do"),
            }
        }

        Commands::Serve { bind, seed } => {
            let store = trackbox::store::open(backend, db_path)
                .context("Failed to open store")?;

            let seed_path = seed.unwrap_or(config.seed_path);
            trackbox::seed::seed_if_empty(store.as_ref(), &seed_path)
                .context("Seeding failed")?;

            let bind = bind.unwrap_or(config.bind);
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;

            trackbox::api::serve(listener, AppState::new(store))
                .await
                .context("Server error")?;
        }
    }

    Ok(())
}
