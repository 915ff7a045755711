//! # Blog Index CLI (`blogidx`)
//!
//! ## Usage
//!
//! ```bash
//! blogidx --config ./config/blogidx.toml <command>
//! blogidx --content ./content <command>     # defaults, no config file
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `blogidx scan` | Run one refresh cycle and print what changed |
//! | `blogidx topics` | List topics with their article counts |
//! | `blogidx recent` | Newest published articles |
//! | `blogidx get <topic> [article]` | One topic or article as JSON |
//! | `blogidx uri <file>` | URI of a content file |
//! | `blogidx run` | Keep the index fresh until Ctrl-C |

use anyhow::Result;
use blog_index::commands;
use blog_index::config::{self, Config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blog Index CLI: an incremental in-memory index over a markdown blog.
#[derive(Parser)]
#[command(name = "blogidx", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/blogidx.toml")]
    config: PathBuf,

    /// Use this content root with default settings instead of a config file.
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one refresh cycle against an empty snapshot and print counts.
    Scan,

    /// List topics, highest priority first.
    Topics,

    /// List published articles, newest first.
    Recent {
        /// Maximum number of articles to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Print a topic, or one of its articles, as JSON.
    Get {
        /// Topic slug.
        topic: String,
        /// Article slug within the topic.
        article: Option<String>,
    },

    /// Print the URI of the topic or article loaded from a file.
    Uri {
        /// Path to a topic file or article, absolute or relative to the
        /// content root.
        file: PathBuf,
    },

    /// Load the content, then refresh on an interval and reindex daily.
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.content {
        Some(path) => Config::minimal(path),
        None => config::load_config(&cli.config)?,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log.level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Scan => commands::run_scan(&cfg).await?,
        Commands::Topics => commands::run_topics(&cfg).await?,
        Commands::Recent { limit } => commands::run_recent(&cfg, limit).await?,
        Commands::Get { topic, article } => {
            commands::run_get(&cfg, &topic, article.as_deref()).await?
        }
        Commands::Uri { file } => commands::run_uri(&cfg, &file).await?,
        Commands::Run => commands::run_daemon(&cfg).await?,
    }

    Ok(())
}
