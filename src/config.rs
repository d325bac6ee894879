use std::path::PathBuf;
use std::time::Duration;

use crate::decode::DecodeStrategy;

/// Runtime tunables for the soak loop. Defaults match the constants the tool
/// originally shipped with.
#[derive(Debug, Clone)]
pub struct SoakConfig {
    /// A `.pcap` file, or a directory scanned recursively every pass.
    /// Conventionally a mounted volume when running under an orchestrator.
    pub input: PathBuf,
    /// Decode cost profile. Both strategies decode the same layers; only the
    /// per-packet allocation and copy cost differs.
    pub strategy: DecodeStrategy,
    /// Times each packet is decoded. Raise to burn more CPU per packet.
    pub repeats_per_packet: u32,
    /// Sleep between scans while no capture files are present.
    pub idle_sleep: Duration,
    /// Delay between passes. Zero keeps the processor busy back to back.
    pub pass_delay: Duration,
    /// Interval between heartbeat lines.
    pub heartbeat_interval: Duration,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("pcaps"),
            strategy: DecodeStrategy::Reuse,
            repeats_per_packet: 1,
            idle_sleep: Duration::from_millis(300),
            pass_delay: Duration::ZERO,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}
