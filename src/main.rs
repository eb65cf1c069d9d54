use anyhow::Context;
use clap::Parser;
use sanresolver::{args::Args, scan::Pipeline};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config().context("invalid configuration")?;
    tracing::info!(
        workers = config.workers,
        buffer = config.queue_capacity,
        timeout = ?config.dns_timeout,
        only_resolver = ?config.only_resolver,
        "starting"
    );

    let pipeline = Pipeline::from_config(config)?;
    let summary = pipeline
        .run(BufReader::new(tokio::io::stdin()), Box::new(std::io::stdout()))
        .await;

    tracing::info!(
        accepted = summary.accepted,
        malformed = summary.malformed,
        matches = summary.matches,
        mismatches = summary.mismatches,
        dns_failures = summary.dns_failures,
        inline = summary.inline_processed,
        direct = summary.direct_emits,
        emitted = summary.emitted,
        "done"
    );
    Ok(())
}
