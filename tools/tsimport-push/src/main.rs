// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! tsimport-push - feed JSON Lines time series into a batching importer
//!
//! # Usage
//!
//! ```bash
//! # Import a JSON Lines file into a local VictoriaMetrics
//! tsimport-push series.jsonl --base-url http://localhost:8428
//!
//! # Read from stdin with a config file
//! cat series.jsonl | tsimport-push - --config import.yaml
//!
//! # Generate 100k synthetic series
//! tsimport-push --synthetic 100000 --batch-size 5000
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::{self, Receiver, Sender};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::{fmt, EnvFilter};
use tsimport::{Enqueued, ImportConfig, Importer, TimeSeries};

/// Lines buffered between the reader thread and the feed loop.
const LINE_BACKLOG: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "tsimport-push")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Push JSON Lines time series through a batching import buffer")]
struct Cli {
    /// JSON Lines input file (use - for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the time-series database
    #[arg(long)]
    base_url: Option<String>,

    /// Import path or absolute import URL
    #[arg(long)]
    url: Option<String>,

    /// Intake queue capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Maximum payloads per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Flush interval in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Generate N synthetic series instead of reading input
    #[arg(long)]
    synthetic: Option<usize>,

    /// Verbose mode (show worker debug logs)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("tsimport=debug,tsimport_push=debug")
    } else {
        EnvFilter::new("tsimport=info,tsimport_push=info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = build_config(&cli)?;
    tracing::info!(
        base_url = %config.base_url,
        url = %config.url,
        capacity = config.channel_capacity,
        batch_size = config.batch_size,
        interval_ms = config.submit_interval_ms,
        "Starting tsimport-push"
    );

    let importer = Arc::new(Importer::new(config).context("Failed to create importer")?);
    let (interrupt_tx, interrupt_rx) = channel::bounded(1);
    ctrlc_handler(Arc::clone(&importer), interrupt_tx);

    let fed = match cli.synthetic {
        Some(count) => feed_synthetic(&importer, count)?,
        None => {
            let lines = spawn_reader(open_input(&cli.input)?)?;
            feed_lines(&importer, &lines, &interrupt_rx)?
        }
    };

    importer.stop();
    importer.wait();

    let stats = importer.stats();
    tracing::info!(
        fed,
        accepted = stats.delivery.payloads_accepted,
        rejected = stats.delivery.payloads_rejected,
        delivered = stats.delivery.payloads_delivered,
        discarded = stats.delivery.payloads_discarded,
        abandoned = stats.channel_len,
        batches_sent = stats.delivery.batches_sent,
        batches_failed = stats.delivery.batches_failed,
        "Import finished"
    );

    Ok(())
}

/// Load the config file (if any) and apply command-line overrides.
fn build_config(cli: &Cli) -> Result<ImportConfig> {
    let mut config = match cli.config {
        Some(ref path) => ImportConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImportConfig::default(),
    };

    if let Some(ref base_url) = cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(ref url) = cli.url {
        config = config.with_url(url.clone());
    }
    if let Some(capacity) = cli.capacity {
        config = config.with_channel_capacity(capacity);
    }
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config = config.with_submit_interval(Duration::from_millis(interval_ms));
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_input(input: &Path) -> Result<Box<dyn BufRead + Send>> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Read lines on a helper thread so the feed loop can react to Ctrl+C while
/// the input is idle. The thread is left behind if the input never closes.
fn spawn_reader(reader: Box<dyn BufRead + Send>) -> Result<Receiver<io::Result<String>>> {
    let (tx, rx) = channel::bounded(LINE_BACKLOG);
    thread::Builder::new()
        .name("tsimport-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    return;
                }
            }
        })
        .context("Failed to spawn input reader thread")?;
    Ok(rx)
}

/// Enqueue every non-empty line until the input ends, the importer rejects a
/// payload, or an interrupt arrives. Returns the number of lines fed.
fn feed_lines(
    importer: &Importer,
    lines: &Receiver<io::Result<String>>,
    interrupt: &Receiver<()>,
) -> Result<u64> {
    let mut fed = 0;
    loop {
        // None: input exhausted or interrupted.
        let next = channel::select! {
            recv(lines) -> msg => { msg.ok() },
            recv(interrupt) -> _ => { None },
        };
        let Some(line) = next else {
            break;
        };

        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if importer.enqueue(line.as_bytes().to_vec()) == Enqueued::Rejected {
            break;
        }
        fed += 1;
    }
    Ok(fed)
}

/// Enqueue `count` generated series, one sample each.
fn feed_synthetic(importer: &Importer, count: usize) -> Result<u64> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);

    let mut fed = 0;
    for i in 0..count {
        let payload = synthetic_series(i, now_ms)
            .to_json()
            .context("Failed to serialize synthetic series")?;
        if importer.enqueue(payload) == Enqueued::Rejected {
            break;
        }
        fed += 1;
    }
    Ok(fed)
}

fn synthetic_series(index: usize, timestamp_ms: i64) -> TimeSeries {
    let mut series = TimeSeries::new([("__name__", "tsimport_synthetic")]);
    series.set_label("series", index.to_string());
    series.add_value((index % 100) as f64, timestamp_ms);
    series
}

/// Setup Ctrl+C handler: stop the importer and wake the feed loop.
fn ctrlc_handler(importer: Arc<Importer>, interrupt: Sender<()>) {
    let _ = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, shutting down...");
        importer.stop();
        let _ = interrupt.try_send(());
    });
}
