#![forbid(unsafe_code)]

mod defaults;
mod lock;
mod pass;
mod time;

use anyhow::{Context, Result};
use clap::Parser;
use lock::RefreshLock;
use pass::run_pass;
use std::io::Write;
use std::path::PathBuf;
use tally_core::{Category, CategoryId, StaticCategories};
use tally_storage::{
    EngineConfig, EntityTotalCountProvider, ProviderRegistry, SchemaCategories, SqliteStore,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// tally_refresh - reconcile every tracked category counter once
///
/// Meant to be run by a scheduler (for example at minute 30 of every hour).
/// Refreshed counters are printed to stdout; diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(name = "tally_refresh", version)]
struct Cli {
    /// Directory holding the counter database (defaults to `./.tally`)
    #[arg(long, env = "TALLY_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Stored value above which table statistics replace full counts
    #[arg(long)]
    threshold: Option<i64>,

    /// Category to track, as `ID` or `ID=TABLE`; repeatable.
    /// Without any, every table in the database is tracked.
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,

    /// Throwaway database: missing table statistics are not reported as errors
    #[arg(long)]
    ephemeral: bool,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(threshold) = self.threshold {
            config.large_dataset_threshold = threshold;
        }
        if self.ephemeral {
            config.ephemeral = true;
        }
        config
    }
}

fn parse_category(raw: &str) -> Result<Category, String> {
    let (id, table) = match raw.split_once('=') {
        Some((id, table)) => (id.trim(), table.trim()),
        None => (raw.trim(), raw.trim()),
    };
    if table.is_empty() {
        return Err("table name must not be empty".to_string());
    }
    let id = CategoryId::try_new(id).map_err(|err| err.message().to_string())?;
    Ok(Category::new(id, table))
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let storage_dir = match &cli.storage_dir {
        Some(dir) => dir.clone(),
        None => defaults::default_storage_dir(
            &std::env::current_dir().context("failed to resolve current directory")?,
        ),
    };

    let Some(lock) = RefreshLock::try_acquire(&storage_dir)
        .with_context(|| format!("failed to open refresh lock in {}", storage_dir.display()))?
    else {
        tracing::info!(
            storage_dir = %storage_dir.display(),
            "another refresh pass is running; nothing to do"
        );
        return Ok(());
    };
    tracing::debug!(lock = %lock.path().display(), "refresh lock acquired");

    let store = SqliteStore::open_with(&storage_dir, cli.engine_config())
        .with_context(|| format!("failed to open counter store in {}", storage_dir.display()))?;

    let registry = if cli.categories.is_empty() {
        ProviderRegistry::new().with_provider(EntityTotalCountProvider::new(
            &store,
            SchemaCategories::new(&store),
        ))
    } else {
        ProviderRegistry::new().with_provider(EntityTotalCountProvider::new(
            &store,
            StaticCategories::new(cli.categories.clone()),
        ))
    };

    let summary = run_pass(&registry, out).context("failed to write refresh output")?;
    tracing::info!(
        providers = summary.providers,
        refreshed = summary.refreshed,
        failed = summary.failed,
        "refresh pass finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(&cli, &mut std::io::stdout().lock())
}
