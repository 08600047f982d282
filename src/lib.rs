//! Whisper Monitor - transcription with resource telemetry
//!
//! Runs one foreground transcription job while a background task samples
//! host resources into an append-only log:
//!
//! - CPU and memory usage averaged over a fixed interval
//! - optional GPU statistics from `nvidia-smi`
//! - optional CPU temperature from the OS thermal sensors
//! - collision-free output directories per run
//! - three transcript layouts (plain, one sentence per line, timestamped)
//!
//! # Example
//!
//! ```rust,no_run
//! use whisper_monitor::{
//!     metrics::SystemMetricsSource,
//!     monitor::{CollectorConfig, TelemetryCollector},
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let collector = TelemetryCollector::new(
//!         Box::new(SystemMetricsSource::default()),
//!         CollectorConfig::default(),
//!     )?;
//!     let handle = collector.start(Path::new("log.txt")).await?;
//!
//!     // ... run the foreground work ...
//!
//!     handle.stop();
//!     let report = handle.join().await?;
//!     println!("{} samples written", report.samples_written);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod format;
pub mod locale;
pub mod metrics;
pub mod monitor;
pub mod orchestrator;
pub mod output;
pub mod protocol;
pub mod status;
pub mod worker;

// Re-export commonly used types for convenience
pub use format::{format_transcript, FormattingMode};
pub use monitor::{CollectorHandle, CollectorState, TelemetryCollector};
pub use orchestrator::{JobOrchestrator, RunSummary};
pub use protocol::{Device, Segment, TranscriptionRequest, TranscriptionResult};
pub use worker::{Transcriber, TranscriptionError, WhisperCliTranscriber, WorkerConfig};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in a monitored transcription run
#[derive(Error, Debug)]
pub enum WhisperMonitorError {
    /// Monitoring interval must be positive
    #[error("monitoring interval must be greater than zero")]
    InvalidInterval,

    /// Input audio does not exist
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Output directory could not be created
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resource log could not be opened or written
    #[error("failed to write resource log {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transcript file could not be written
    #[error("failed to write transcript {}: {source}", path.display())]
    TranscriptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Foreground job failed
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Sampling task panicked or was cancelled
    #[error("resource monitor did not shut down cleanly: {0}")]
    CollectorJoin(String),
}

/// Result type alias for whisper-monitor operations
pub type Result<T> = std::result::Result<T, WhisperMonitorError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
