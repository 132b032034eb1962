/// Tunebox - search, download and play music from the terminal
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunebox_audio_desktop::CpalBackend;
use tunebox_cli::{commands, config::AppConfig, player};
use tunebox_playback::PlayerStateMachine;
use tunebox_server_client::MusicServerClient;
use tunebox_storage::LocalStore;

#[derive(Parser)]
#[command(name = "tunebox", version)]
#[command(about = "Search, download and play music", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./tunebox.toml if present)
    #[arg(short, long, global = true, env = "TUNEBOX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the server for songs
    Search {
        /// Song name
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Search and download one result
    Download {
        /// Song name
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
        /// Which search result to download
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },
    /// List downloaded songs
    Library,
    /// Delete a downloaded song record
    Delete {
        /// Song id (see `library`)
        id: String,
    },
    /// Show recent searches
    Recent {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Play the library, starting at a song
    Play {
        /// Song id to start with (default: first song)
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunebox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let store = open_store(&config).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Search { term } => {
            let client = MusicServerClient::new(config.server.client_config())?;
            commands::search(&client, &store, &store, &term.join(" "), &mut out).await?;
        }
        Commands::Download { term, index } => {
            let client = MusicServerClient::new(config.server.client_config())?;
            commands::download(
                &client,
                &store,
                &term.join(" "),
                index,
                &config.storage.songs_dir,
                &mut out,
            )
            .await?;
        }
        Commands::Library => {
            commands::library(&store, &mut out).await?;
        }
        Commands::Delete { id } => {
            commands::delete(&store, &id, &mut out).await?;
        }
        Commands::Recent { clear } => {
            commands::recent(&store, clear, &mut out).await?;
        }
        Commands::Play { id } => {
            drop(out);
            let backend = CpalBackend::new(&config.playback);
            let player = PlayerStateMachine::new(backend, config.playback.clone());
            player::run(player, &store, id.as_deref()).await?;
            return Ok(());
        }
    }

    out.flush()?;
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<LocalStore> {
    if let Some(parent) = config
        .storage
        .database_path()
        .and_then(|path| path.parent().map(PathBuf::from))
    {
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let pool = tunebox_storage::create_pool(&config.storage.database_url)
        .await
        .with_context(|| format!("opening database {}", config.storage.database_url))?;
    tunebox_storage::run_migrations(&pool).await?;
    tracing::debug!("Database ready");

    Ok(LocalStore::new(pool))
}
