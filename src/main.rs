use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

mod config;
mod decode;
mod error;
mod files;
mod soak;
mod stats;

use config::SoakConfig;
use decode::DecodeStrategy;
use soak::Soak;
use stats::SoakStats;

#[derive(Parser, Debug)]
#[command(name = "pcap-soak")]
#[command(about = "Synthetic CPU load generator that decodes pcap captures in a loop")]
#[command(version = "1.0.0")]
struct Args {
    /// Path to a .pcap file or a directory scanned recursively
    #[arg(short, long, default_value = "pcaps")]
    input: PathBuf,

    /// Decode strategy: reuse is allocation-light, full copies per packet
    #[arg(short, long, value_enum, default_value_t = DecodeStrategy::Reuse)]
    strategy: DecodeStrategy,

    /// Times each packet is decoded (higher = more CPU)
    #[arg(short, long, default_value = "1")]
    repeat: u32,

    /// Sleep between scans when no capture files are present (milliseconds)
    #[arg(long, default_value = "300")]
    idle_sleep_ms: u64,

    /// Delay between passes (milliseconds, 0 = back-to-back passes)
    #[arg(long, default_value = "0")]
    pass_delay_ms: u64,

    /// Heartbeat interval (seconds)
    #[arg(long, default_value = "30")]
    heartbeat_secs: u64,

    /// Verbose logging (default: false)
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = SoakConfig {
        input: args.input,
        strategy: args.strategy,
        repeats_per_packet: args.repeat,
        idle_sleep: Duration::from_millis(args.idle_sleep_ms),
        pass_delay: Duration::from_millis(args.pass_delay_ms),
        heartbeat_interval: Duration::from_secs(args.heartbeat_secs),
    };

    info!("Starting pcap soak loop");
    info!("Input path: {}", config.input.display());
    info!(
        "Strategy: {:?} - repeats per packet: {}",
        config.strategy, config.repeats_per_packet
    );

    let stats = Arc::new(SoakStats::default());
    let running = Arc::new(AtomicBool::new(true));

    {
        let running = running.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
            info!("Received Ctrl+C, shutting down...");
            running.store(false, Ordering::Relaxed);
        });
    }

    let soak = Soak::new(config, stats.clone(), running);
    soak.run().await;

    let snapshot = stats.snapshot();
    info!("======= SOAK SUMMARY =======");
    info!("Passes completed: {}", snapshot.passes);
    info!("Files processed: {}", snapshot.files_processed);
    info!("Packets read: {}", snapshot.packets_read);
    info!("Decode invocations: {}", snapshot.decodes);
    info!("Decode errors: {}", snapshot.decode_errors);
    info!(
        "Open failures: {} - malformed captures: {}",
        snapshot.open_failures, snapshot.malformed_captures
    );
    info!("============================");
    info!("pcap soak shutdown complete");

    Ok(())
}
