use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use pcap::{Capture, Error as PcapError};
use tracing::{debug, info};

use crate::config::SoakConfig;
use crate::decode::LayerDecoder;
use crate::files::list_capture_files;
use crate::stats::SoakStats;

/// The soak loop: scan the input path for capture files, decode every packet
/// in every file, then start over. Idles only while no files are found;
/// otherwise passes run back to back to keep the processor busy.
pub struct Soak {
    config: SoakConfig,
    stats: Arc<SoakStats>,
    running: Arc<AtomicBool>,
}

impl Soak {
    pub fn new(config: SoakConfig, stats: Arc<SoakStats>, running: Arc<AtomicBool>) -> Self {
        Self {
            config,
            stats,
            running,
        }
    }

    /// Run until the running flag clears. The flag is checked before each
    /// idle sleep, between files, and at every pass boundary.
    pub async fn run(&self) {
        let mut decoder = LayerDecoder::new(self.config.strategy);
        let mut last_heartbeat = Instant::now();

        while self.running.load(Ordering::Relaxed) {
            let files = match list_capture_files(&self.config.input) {
                Ok(files) if !files.is_empty() => files,
                Ok(_) => {
                    self.idle(&mut last_heartbeat).await;
                    continue;
                }
                // A failed scan is handled like an empty one: wait and retry.
                Err(e) => {
                    debug!("Scan of {} failed: {}", self.config.input.display(), e);
                    self.idle(&mut last_heartbeat).await;
                    continue;
                }
            };

            for file in &files {
                if !self.running.load(Ordering::Relaxed) {
                    return;
                }
                self.process_file(file, &mut decoder);
            }

            self.stats.passes.fetch_add(1, Ordering::Relaxed);
            self.maybe_heartbeat(&mut last_heartbeat);

            if !self.config.pass_delay.is_zero() {
                tokio::time::sleep(self.config.pass_delay).await;
            }
        }
    }

    /// Decode every packet in one capture file, best-effort. Open failures,
    /// header rejections and read errors end the file early; they are counted
    /// and never surfaced to the caller.
    fn process_file(&self, path: &Path, decoder: &mut LayerDecoder) {
        let mut capture = match Capture::from_file(path) {
            Ok(capture) => capture,
            Err(e) => {
                if path.metadata().is_err() {
                    self.stats.open_failures.fetch_add(1, Ordering::Relaxed);
                    debug!("Failed to open {}: {}", path.display(), e);
                } else {
                    self.stats.malformed_captures.fetch_add(1, Ordering::Relaxed);
                    debug!("Rejected capture {}: {}", path.display(), e);
                }
                return;
            }
        };

        loop {
            let packet = match capture.next_packet() {
                Ok(packet) => packet,
                Err(PcapError::NoMorePackets) => break,
                Err(e) => {
                    debug!("Read error in {}: {}", path.display(), e);
                    break;
                }
            };

            self.stats.packets_read.fetch_add(1, Ordering::Relaxed);

            for _ in 0..self.config.repeats_per_packet {
                self.stats.decodes.fetch_add(1, Ordering::Relaxed);
                if !decoder.decode(packet.data) {
                    self.stats.decode_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        self.stats.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    async fn idle(&self, last_heartbeat: &mut Instant) {
        self.maybe_heartbeat(last_heartbeat);
        if !self.running.load(Ordering::Relaxed) {
            return;
        }
        tokio::time::sleep(self.config.idle_sleep).await;
    }

    fn maybe_heartbeat(&self, last_heartbeat: &mut Instant) {
        if last_heartbeat.elapsed() < self.config.heartbeat_interval {
            return;
        }
        let snapshot = self.stats.snapshot();
        info!(
            "heartbeat: passes={} files={} packets={} decodes={} decode_errors={}",
            snapshot.passes,
            snapshot.files_processed,
            snapshot.packets_read,
            snapshot.decodes,
            snapshot.decode_errors
        );
        *last_heartbeat = Instant::now();
    }
}
