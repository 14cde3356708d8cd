// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Vibration monitoring collaborator
//!
//! Owns the sensor poll loop: fixed-rate reads from a [`VibrationSource`],
//! bounded timeout retries with backoff, and a consecutive-failure
//! threshold that marks the link disconnected and reports a runtime fault
//! to the service manager. Decode failures are dropped samples and never
//! touch the analysis window.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::ServiceAction;
use crate::analyzer::VibrationAnalyzer;
use crate::config::SensorConfig;
use crate::transport::{SensorReading, TransportError, VibrationSource};

/// Produces a fresh source on each service start, so a start from `Error`
/// re-opens the link.
pub type SourceFactory =
    Box<dyn Fn() -> Result<Box<dyn VibrationSource>, TransportError> + Send + Sync>;

/// The vibration service: connects the sensor on start, polls it at the
/// configured rate, and feeds the analyzer.
pub struct VibrationMonitor {
    cfg: SensorConfig,
    analyzer: Arc<VibrationAnalyzer>,
    factory: SourceFactory,
    fault_tx: mpsc::UnboundedSender<String>,
    task: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl VibrationMonitor {
    pub fn new(
        cfg: SensorConfig,
        analyzer: Arc<VibrationAnalyzer>,
        factory: SourceFactory,
        fault_tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            cfg,
            analyzer,
            factory,
            fault_tx,
            task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ServiceAction for VibrationMonitor {
    async fn start(&self) -> anyhow::Result<()> {
        let mut slot = self.task.lock().await;
        // Reap a poll loop that exited on its own after a fault, so a
        // retry from Error opens a fresh source.
        if slot.as_ref().is_some_and(|(_, handle)| handle.is_finished()) {
            slot.take();
        }
        if slot.is_some() {
            return Ok(());
        }

        let source = (self.factory)()?;
        self.analyzer.reset();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(
            source,
            self.cfg.clone(),
            self.analyzer.clone(),
            self.fault_tx.clone(),
            shutdown_rx,
        ));
        *slot = Some((shutdown_tx, handle));
        info!("Vibration poll loop started at {} Hz", self.cfg.sample_rate_hz);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let mut slot = self.task.lock().await;
        if let Some((shutdown_tx, handle)) = slot.take() {
            let _ = shutdown_tx.send(true);
            let _ = handle.await;
            info!("Vibration poll loop stopped");
        }
        Ok(())
    }
}

/// One read attempt with bounded timeout retries.
async fn read_with_retry(
    source: &mut dyn VibrationSource,
    cfg: &SensorConfig,
) -> Result<SensorReading, TransportError> {
    let mut attempt: u32 = 0;
    loop {
        match source.read() {
            Err(TransportError::Timeout) if attempt < cfg.read_retries => {
                attempt += 1;
                debug!("sensor read timed out, retry {}/{}", attempt, cfg.read_retries);
                sleep(Duration::from_millis(cfg.retry_backoff_ms * attempt as u64)).await;
            }
            other => return other,
        }
    }
}

async fn poll_loop(
    mut source: Box<dyn VibrationSource>,
    cfg: SensorConfig,
    analyzer: Arc<VibrationAnalyzer>,
    fault_tx: mpsc::UnboundedSender<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = Duration::from_secs_f64(1.0 / cfg.sample_rate_hz.max(0.1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {
                match read_with_retry(source.as_mut(), &cfg).await {
                    Ok(reading) => {
                        consecutive_failures = 0;
                        analyzer.ingest(reading);
                    }
                    Err(TransportError::Decode(e)) => {
                        // Dropped sample, window untouched
                        warn!("dropped sample: {}", e);
                        if cfg.count_decode_failures {
                            consecutive_failures += 1;
                        }
                    }
                    Err(e) => {
                        warn!("sensor read failed: {}", e);
                        consecutive_failures += 1;
                    }
                }

                if consecutive_failures >= cfg.max_consecutive_failures {
                    let message = format!(
                        "sensor link lost after {} consecutive failures",
                        consecutive_failures
                    );
                    warn!("{}", message);
                    // A lost link has no current reading to report
                    analyzer.clear_latest();
                    let _ = fault_tx.send(message);
                    break;
                }
            }
        }
    }

    source.disconnect();
}
