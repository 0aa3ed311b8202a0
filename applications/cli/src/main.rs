/// Strawberry Player - headless terminal player
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strawberry_cli::{config::CliConfig, player};
use strawberry_playback::catalog::format_duration;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "strawberry-cli")]
#[command(about = "Strawberry Player terminal front-end", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./strawberry.toml if present)
    #[arg(short, long, global = true, env = "STRAWBERRY_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog source: http(s) URL or JSON file
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive player
    Play {
        /// Initial volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,

        /// Start with shuffle on
        #[arg(long)]
        shuffle: bool,

        /// Simulated seconds per real second
        #[arg(long)]
        time_scale: Option<f64>,
    },
    /// Print the resolved catalog
    Catalog {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strawberry_cli=info,strawberry_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog.source = Some(catalog);
    }

    match cli.command {
        Commands::Play {
            volume,
            shuffle,
            time_scale,
        } => {
            if let Some(volume) = volume {
                config.playback.volume = volume;
            }
            if shuffle {
                config.playback.shuffle = true;
            }
            if let Some(time_scale) = time_scale {
                config.device.time_scale = time_scale;
            }
            config.validate()?;
            play(config).await?;
        }
        Commands::Catalog { json } => {
            config.validate()?;
            print_catalog(&config, json).await?;
        }
    }

    Ok(())
}

async fn play(config: CliConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Strawberry Player");

    let stdin = BufReader::new(tokio::io::stdin());
    let snapshot = player::run(config, stdin).await?;

    println!("{}", player::format_status(&snapshot));
    Ok(())
}

async fn print_catalog(config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let load = player::resolve_catalog(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&load)?);
        return Ok(());
    }

    if load.using_fallback {
        match &load.error {
            Some(error) => println!("Using fallback tracks ({})", error),
            None => println!("Using fallback tracks"),
        }
    }

    for (index, track) in load.tracks.iter().enumerate() {
        println!(
            "{:>3}. {} - {} ({}) {}",
            index + 1,
            track.artist,
            track.title,
            track.album,
            format_duration(f64::from(track.duration_hint))
        );
    }

    Ok(())
}
