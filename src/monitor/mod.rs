//! Background resource telemetry.
//!
//! A [`TelemetryCollector`] is created idle, and [`TelemetryCollector::start`]
//! consumes it, writes the log header and spawns the sampling loop. The
//! returned [`CollectorHandle`] is the only way to stop and join that loop,
//! so each collector runs exactly once.

pub mod record;

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::locale::{Labels, Locale};
use crate::metrics::MetricsSource;
use crate::{Result, WhisperMonitorError};

/// Lifecycle of one collector run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Collector settings
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Sampling cadence; also the CPU averaging window
    pub interval: Duration,
    /// Query the GPU probe; otherwise log the "unavailable" marker
    pub gpu_enabled: bool,
    pub locale: Locale,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            gpu_enabled: false,
            locale: Locale::En,
        }
    }
}

/// Cooperative stop request shared between the handle and the sampling loop
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop. Calling it again has no effect.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Result of a joined collector run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CollectorReport {
    pub samples_written: u64,
    pub log_path: PathBuf,
}

/// A collector that has not been started yet
pub struct TelemetryCollector {
    source: Box<dyn MetricsSource>,
    config: CollectorConfig,
}

impl TelemetryCollector {
    /// Create an idle collector. A zero interval is rejected.
    pub fn new(source: Box<dyn MetricsSource>, config: CollectorConfig) -> Result<Self> {
        if config.interval.is_zero() {
            return Err(WhisperMonitorError::InvalidInterval);
        }
        Ok(Self { source, config })
    }

    pub fn state(&self) -> CollectorState {
        CollectorState::Idle
    }

    /// Open `log_path` in append mode and start sampling into it.
    pub async fn start(self, log_path: &Path) -> Result<CollectorHandle> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .await
            .map_err(|source| WhisperMonitorError::LogSink {
                path: log_path.to_path_buf(),
                source,
            })?;

        self.start_with_writer(file, log_path).await
    }

    /// Start sampling into an arbitrary writer. `sink_path` names the sink in
    /// errors and in the final report.
    pub async fn start_with_writer<W>(
        self,
        mut writer: W,
        sink_path: &Path,
    ) -> Result<CollectorHandle>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let sink_path = sink_path.to_path_buf();
        let labels = self.config.locale.labels();

        let header =
            record::render_header(labels, Local::now(), self.source.temperature_supported());
        write_flushed(&mut writer, &header, &sink_path).await?;

        let stop = StopToken::new();
        let task = tokio::spawn(run_sampling_loop(
            writer,
            self.source,
            self.config.clone(),
            stop.clone(),
            sink_path.clone(),
        ));

        info!(
            "Resource monitoring started (interval {:?}, GPU {}) -> {}",
            self.config.interval,
            if self.config.gpu_enabled { "on" } else { "off" },
            sink_path.display()
        );

        Ok(CollectorHandle {
            stop,
            task,
            sink_path,
        })
    }
}

/// Handle to a running collector
pub struct CollectorHandle {
    stop: StopToken,
    task: JoinHandle<Result<u64>>,
    sink_path: PathBuf,
}

impl CollectorHandle {
    /// Request termination. Non-blocking and idempotent.
    pub fn stop(&self) {
        if !self.stop.is_stopped() {
            debug!("Stop requested for resource monitor");
        }
        self.stop.stop();
    }

    /// A token that can stop this collector from another context
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// `Stopped` once the sampling loop has exited, whether it was asked to
    /// or gave up on a sink error.
    pub fn state(&self) -> CollectorState {
        if self.task.is_finished() {
            CollectorState::Stopped
        } else if self.stop.is_stopped() {
            CollectorState::Stopping
        } else {
            CollectorState::Running
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.sink_path
    }

    /// Wait for the sampling loop to notice the stop request and finish the
    /// record it was writing.
    ///
    /// Does not request the stop itself; it returns once [`stop`](Self::stop)
    /// (or a [`StopToken`]) has been triggered and the loop has exited. A sink
    /// I/O failure inside the loop is returned here.
    pub async fn join(mut self) -> Result<CollectorReport> {
        let samples_written = (&mut self.task)
            .await
            .map_err(|e| WhisperMonitorError::CollectorJoin(e.to_string()))??;

        info!("Resource monitoring stopped after {} samples", samples_written);
        Ok(CollectorReport {
            samples_written,
            log_path: self.sink_path.clone(),
        })
    }
}

impl Drop for CollectorHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            warn!("Collector handle dropped without join; stopping sampler");
            self.stop.stop();
        }
    }
}

async fn run_sampling_loop<W>(
    mut writer: W,
    mut source: Box<dyn MetricsSource>,
    config: CollectorConfig,
    stop: StopToken,
    sink_path: PathBuf,
) -> Result<u64>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let labels: &Labels = config.locale.labels();
    let mut samples: u64 = 0;

    while !stop.is_stopped() {
        let snapshot = source.poll(config.interval, config.gpu_enabled).await;
        let line = record::render_record(labels, &snapshot);
        write_flushed(&mut writer, &line, &sink_path).await?;
        samples += 1;
        trace!("Wrote resource sample {}", samples);
    }

    Ok(samples)
}

async fn write_flushed<W>(writer: &mut W, text: &str, sink_path: &Path) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let to_error = |source| WhisperMonitorError::LogSink {
        path: sink_path.to_path_buf(),
        source,
    };
    writer.write_all(text.as_bytes()).await.map_err(to_error)?;
    writer.flush().await.map_err(to_error)
}
