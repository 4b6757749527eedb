// REFCUE Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | REFCUE

use refcue_core::config::ServerConfig;
use refcue_core::practice::catalog::Catalog;
use refcue_core::practice::playlist::build_playlist;
use refcue_core::practice::{Format, PracticeOption, Selection, Topic};
use refcue_core::server;
use refcue_core::state::PracticeState;
use refcue_core::store::reaper::SessionReaper;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "refcue-core")]
#[command(about = "Roller Derby Hand Signals and Verbal Cues Practice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the practice server
    Serve {
        /// Port to run the server on
        #[arg(short, long)]
        port: Option<u16>,

        /// Root of the <format>/<topic>/<clip> tree
        #[arg(short, long)]
        content: Option<PathBuf>,

        /// Static front-end directory
        #[arg(short, long)]
        dashboard: Option<PathBuf>,
    },

    /// Scan the content tree and list every clip found
    Catalog {
        #[arg(short, long)]
        content: Option<PathBuf>,
    },

    /// Build one playlist and print it
    Playlist {
        /// expressive, receptive or both
        #[arg(short, long, default_value = "both")]
        format: Format,

        /// Comma-separated topics (defaults to every topic)
        #[arg(short, long, value_delimiter = ',')]
        topics: Vec<Topic>,

        /// Comma-separated bookends: intro, outro
        #[arg(short, long, value_delimiter = ',')]
        options: Vec<PracticeOption>,

        #[arg(short, long)]
        content: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,tower_http=warn");
    }
    tracing_subscriber::fmt::init();

    // Log panics with their location before the default hook runs
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!("[PANIC] at {}: {}", location, panic_info);
        default_hook(panic_info);
    }));

    let args = Cli::parse();
    let mut config = ServerConfig::from_env();

    match args.command {
        Commands::Serve {
            port,
            content,
            dashboard,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(content) = content {
                config.content_root = content;
            }
            if let Some(dashboard) = dashboard {
                config.dashboard_dir = dashboard;
            }

            info!("--- REFCUE PRACTICE SERVER v{} ---", env!("CARGO_PKG_VERSION"));
            let ttl = config.session_ttl;
            let state = Arc::new(PracticeState::new(config));

            let reaper = SessionReaper::new(
                state.sessions.clone(),
                ttl,
                SessionReaper::interval_for(ttl),
            );
            reaper.start();

            let result = server::start_server(state).await;

            reaper.stop();
            info!("{}", reaper.status_report());
            result?;
        }
        Commands::Catalog { content } => {
            let root = content.unwrap_or(config.content_root);
            let catalog = Catalog::scan(&root);
            if catalog.is_empty() {
                println!("No clips found under {:?}", root);
            }
            for clip in catalog.clips() {
                println!(
                    "{:<11} {:<13} {}",
                    clip.format.map_or("-", |f| f.as_str()),
                    clip.topic.map_or("-", |t| t.as_str()),
                    clip.url
                );
            }
        }
        Commands::Playlist {
            format,
            topics,
            options,
            content,
        } => {
            let root = content.unwrap_or(config.content_root);
            let catalog = Catalog::scan(&root);
            let topics = if topics.is_empty() {
                Topic::ALL.to_vec()
            } else {
                topics
            };
            let selection = Selection::new(format, topics, options);
            let playlist = build_playlist(&catalog, &selection, &mut rand::thread_rng());

            if playlist.is_empty() {
                println!("Nothing to play for that selection.");
            }
            for (i, clip) in playlist.iter().enumerate() {
                println!("{:>3}. {}", i + 1, clip.url);
            }
        }
    }

    Ok(())
}
