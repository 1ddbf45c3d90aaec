//! CLI administration tool for link-cache.
//!
//! Inspects links and click statistics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Most recent links
//! cargo run --bin admin -- links list --limit 20
//!
//! # A single link
//! cargo run --bin admin -- links show b
//!
//! # Overall counts, or reconciled stats for one key
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- stats b
//!
//! # Short key codec
//! cargo run --bin admin -- codec encode 125
//! cargo run --bin admin -- codec decode cb
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for all but `codec`): PostgreSQL connection string
//! - `REDIS_URL` (optional): used by `stats <key>` to fold in live click counters

use link_cache::application::services::{ClickTracker, LinkService};
use link_cache::infrastructure::cache::{CacheService, NullCache, RedisCache};
use link_cache::infrastructure::persistence::{PgAnalyticsRepository, PgLinkRepository};
use link_cache::utils::base62;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

const CACHE_TIMEOUT: Duration = Duration::from_millis(500);

/// CLI tool for managing link-cache.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect stored links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Show overall statistics, or click statistics for one short key
    Stats {
        short_key: Option<String>,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Convert between sequence numbers and short keys
    Codec {
        #[command(subcommand)]
        action: CodecAction,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// List the most recently created links
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Show a single link
    Show { short_key: String },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(Subcommand)]
enum CodecAction {
    /// Sequence number to short key
    Encode { value: u64 },

    /// Short key to sequence number
    Decode { short_key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Codec { action } = cli.command {
        return handle_codec_action(action);
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Stats { short_key: None } => handle_overview(&pool).await?,
        Commands::Stats {
            short_key: Some(short_key),
        } => handle_key_stats(&short_key, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Codec { .. } => {}
    }

    Ok(())
}

/// Link lookups go through [`LinkService`] with caching disabled, so the
/// output always reflects PostgreSQL.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = LinkService::new(repo, Arc::new(NullCache::new()), 0);

    match action {
        LinksAction::List { limit } => {
            println!("{}", "📋 Recent Links".bright_blue().bold());
            println!();

            let links = service
                .list_recent(limit)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

            if links.is_empty() {
                println!("{}", "  No links found".yellow());
                return Ok(());
            }

            println!(
                "  {:<10} {:<12} {:<20} {}",
                "Sequence".bright_white().bold(),
                "Key".bright_white().bold(),
                "Created".bright_white().bold(),
                "URL".bright_white().bold()
            );
            println!("  {}", "─".repeat(75).bright_black());

            for link in &links {
                println!(
                    "  {:<10} {:<12} {:<20} {}",
                    link.sequence_id.to_string().bright_black(),
                    link.short_key.cyan(),
                    link.created_at
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                        .bright_black(),
                    link.long_url
                );
            }

            println!();
            println!("  Shown: {}", links.len().to_string().bright_white().bold());
            println!();
        }
        LinksAction::Show { short_key } => {
            let link = service
                .get_link(&short_key)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("{}", "🔗 Link".bright_blue().bold());
            println!();
            println!("  Key:         {}", link.short_key.cyan());
            println!("  Sequence:    {}", link.sequence_id);
            println!("  URL:         {}", link.long_url.bright_white());
            println!("  Fingerprint: {}", link.content_hash.bright_black());
            println!(
                "  Created:     {}",
                link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!();
        }
    }

    Ok(())
}

/// Displays overall counts straight from PostgreSQL.
async fn handle_overview(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(total_clicks), 0)::BIGINT FROM link_analytics")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:            {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Persisted clicks: {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();
    println!(
        "  {}",
        "Click counters still held in Redis are folded in on the next stats read".bright_black()
    );
    println!();

    Ok(())
}

/// Displays reconciled statistics for one key. Reading stats persists the
/// reconciled values, exactly as `GET /stats/{short_key}` does.
async fn handle_key_stats(short_key: &str, pool: &PgPool) -> Result<()> {
    base62::decode(short_key).map_err(|e| anyhow::anyhow!("Invalid short key: {}", e))?;

    let cache: Arc<dyn CacheService> = match std::env::var("REDIS_URL") {
        Ok(url) => match RedisCache::connect(&url, CACHE_TIMEOUT).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                println!("{}", format!("⚠️  Redis unavailable: {e}").yellow());
                Arc::new(NullCache::new())
            }
        },
        Err(_) => Arc::new(NullCache::new()),
    };

    let repo = Arc::new(PgAnalyticsRepository::new(Arc::new(pool.clone())));
    let tracker = ClickTracker::new(repo, cache);

    let stats = tracker
        .get_stats(short_key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

    println!(
        "{}",
        format!("📊 Statistics for {}", stats.short_key)
            .bright_blue()
            .bold()
    );
    println!();
    println!(
        "  Total clicks:  {}",
        stats.total_clicks.to_string().bright_green().bold()
    );
    println!("  Clicks today:  {}", stats.clicks_today);
    println!(
        "  Last access:   {}",
        stats
            .last_accessed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "  Source:        {}",
        stats.data_source.as_str().bright_black()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let next_sequence: Option<i64> =
                sqlx::query_scalar("SELECT MAX(sequence_id) FROM links")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!(
                "  Last sequence: {}",
                next_sequence
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!();
        }
    }

    Ok(())
}

fn handle_codec_action(action: CodecAction) -> Result<()> {
    match action {
        CodecAction::Encode { value } => {
            println!("{}", base62::encode(value).cyan().bold());
        }
        CodecAction::Decode { short_key } => {
            let value = base62::decode(&short_key)
                .map_err(|e| anyhow::anyhow!("Invalid short key: {}", e))?;
            println!("{}", value.to_string().cyan().bold());
        }
    }

    Ok(())
}
