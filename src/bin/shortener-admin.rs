use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shortener::config::Config;
use shortener::storage::{SqliteStorage, Storage};

#[derive(Parser)]
#[command(name = "shortener-admin")]
#[command(about = "Shortener storage management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short code for a URL
    Shorten {
        /// Destination URL (stored as-is)
        url: String,
    },
    /// Print the URL a short code points to
    Resolve {
        /// Short code
        code: String,
    },
    /// Show day/week/total visit counts
    Stats {
        /// Short code
        code: String,
    },
    /// Dump the per-second visit log, newest first
    Log {
        /// Short code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = SqliteStorage::open(
        &config.database.url,
        config.database.max_connections,
        config.short_code_max_length,
    )
    .await?;

    let result = run(&storage, cli.command).await;
    storage.close().await?;
    result
}

async fn run(storage: &SqliteStorage, command: Commands) -> Result<()> {
    match command {
        Commands::Shorten { url } => {
            let code = storage.set(&url).await.context("failed to shorten url")?;
            println!("{}", code);
        }
        Commands::Resolve { code } => match storage.get(&code).await? {
            Some(url) => println!("{}", url),
            None => println!("⚠ Short code '{}' does not exist", code),
        },
        Commands::Stats { code } => {
            let stats = storage.stats(&code).await?;
            println!("{:<8} {}", "day", stats.day);
            println!("{:<8} {}", "week", stats.week);
            println!("{:<8} {}", "total", stats.total);
        }
        Commands::Log { code } => {
            let log = storage.visit_log(&code).await?;
            if log.is_empty() {
                println!("No visits recorded for '{}'.", code);
            } else {
                println!("{:<24} {}", "Visited at", "Visits");
                println!("{}", "-".repeat(32));
                for (visited_at, visits) in log {
                    println!("{:<24} {}", visited_at, visits);
                }
            }
        }
    }

    Ok(())
}
