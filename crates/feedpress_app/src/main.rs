mod logging;
mod wiring;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use feedpress_engine::{run_continuous, Config, RunError};
use feedpress_logging::{press_info, press_warn};
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

use crate::logging::LogDestination;
use crate::wiring::Overrides;

#[derive(Parser)]
#[command(name = "feedpress")]
#[command(about = "Rewrite feed articles with a generative backend and publish them")]
#[command(version)]
struct Cli {
    /// Configuration file (.json, or .ron)
    #[arg(long, short, default_value = "config.json")]
    config: PathBuf,

    /// Run a single pass even if the config enables continuous mode
    #[arg(long, conflicts_with = "continuous")]
    once: bool,

    /// Keep running, re-checking feeds on the configured interval
    #[arg(long)]
    continuous: bool,

    /// Generative API key; overrides the one in the config file
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Publish into a throwaway in-memory store
    #[arg(long)]
    dry_run: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value = "terminal")]
    log: LogDestination,

    /// Log debug details, including raw backend failures
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    // One entry at a time; the per-entry log context is thread-local.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run(cli))
}

fn load(path: &Path, overrides: &Overrides) -> Result<Config, RunError> {
    let mut config = Config::load(path)?;
    overrides.apply(&mut config);
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        api_key: cli.api_key.clone(),
        dry_run: cli.dry_run,
    };
    let config = load(&cli.config, &overrides)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    // Fail fast on a missing key instead of cooling down forever.
    wiring::rewriter(&config).context("cannot set up rewrite backends")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            press_warn!("Interrupt received, stopping after the current entry");
            on_interrupt.cancel();
        }
    });

    let continuous = cli.continuous || (config.settings.continuous_mode && !cli.once);
    if continuous {
        press_info!(
            "Continuous mode: checking every {} minutes, auto publish {}",
            config.settings.check_interval_minutes,
            config.settings.auto_publish
        );
        let report = run_continuous(
            || load(&cli.config, &overrides),
            |config| wiring::pipeline(config, &overrides),
            cancel,
        )
        .await;
        press_info!(
            "{} cycles ({} failed), {} articles",
            report.cycles,
            report.failed_cycles,
            report.articles
        );
        return Ok(());
    }

    let mut pipeline = wiring::pipeline(&config, &overrides)?;
    let summary = pipeline.run_pass(&config.sources, &cancel).await?;
    if summary.articles() == 0 {
        press_info!("No new articles this run");
    } else {
        press_info!(
            "Done: {} new articles in {}",
            summary.articles(),
            pipeline.output().path().display()
        );
    }
    Ok(())
}
