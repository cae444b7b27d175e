use anyhow::{Context, Result};
use memory_forensics::config::load_config;
use memory_forensics::{Config, ForensicsEngine, ProcessId};
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Snapshots a process twice and reports how much changed in between.
fn main() -> Result<()> {
    let (pid, interval_ms) = parse_args().context("usage: memory-forensics <pid> [interval-ms]")?;

    let config = load_config().context("failed to load configuration")?;
    init_logging(&config);

    info!("memory-forensics v{}", env!("CARGO_PKG_VERSION"));

    let engine = ForensicsEngine::with_config(config)?;
    info!(backend = engine.backend_name(), pid, "attaching");

    let mut handle = engine.attach(pid)?;
    let before = engine.create_snapshot(&handle)?;
    info!(
        regions = before.region_count(),
        bytes = before.total_bytes(),
        "first snapshot captured"
    );

    thread::sleep(Duration::from_millis(interval_ms));

    let after = engine.create_snapshot(&handle)?;
    info!(
        regions = after.region_count(),
        bytes = after.total_bytes(),
        "second snapshot captured"
    );

    let diff = engine.diff_snapshots(&before, &after)?;
    engine.detach(&mut handle);

    info!(
        modified_regions = diff.modified_region_count(),
        modified_bytes = diff.modified_byte_count(),
        "diff complete"
    );
    println!(
        "{} {}",
        diff.modified_region_count(),
        diff.modified_byte_count()
    );
    Ok(())
}

fn parse_args() -> Result<(ProcessId, u64)> {
    let mut args = std::env::args().skip(1);
    let pid: ProcessId = args
        .next()
        .context("missing pid argument")?
        .parse()
        .context("pid must be a positive integer")?;
    let interval_ms: u64 = match args.next() {
        Some(value) => value.parse().context("interval must be milliseconds")?,
        None => 1000,
    };
    Ok((pid, interval_ms))
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
