use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::format::FormattingMode;
use crate::locale::Locale;
use crate::metrics::SystemMetricsSource;
use crate::{Result, WhisperMonitorError};

#[derive(Parser, Debug)]
#[command(name = "whisper-monitor")]
#[command(about = "Whisper transcription with GPU/CPU resource monitoring")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Use the GPU when one is available (true/false)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub use_gpu: bool,

    /// Transcription language
    #[arg(long, default_value = "pl")]
    pub language: String,

    /// Input audio file
    #[arg(long, default_value = "audio.mp3")]
    pub input_audio: PathBuf,

    /// Whisper model (tiny, medium, large, ...)
    #[arg(long, default_value = "tiny")]
    pub model_name: String,

    /// Transcript layout (default, newlines_after_period, timestamps)
    #[arg(long, default_value = "default")]
    pub formatting_mode: String,

    /// Show transcription progress in the console (true/false)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub show_progress: bool,

    /// Resource monitoring interval in seconds
    #[arg(long, default_value_t = 1)]
    pub monitor_interval: u64,

    /// Also log CPU temperature (true/false)
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub cpu_temperature: bool,

    /// Worker threads for CPU transcription (defaults to the logical CPU count)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Whisper executable
    #[arg(long, default_value = "whisper")]
    pub whisper_cmd: String,

    /// GPU query executable
    #[arg(long, default_value = "nvidia-smi")]
    pub gpu_probe_cmd: String,

    /// Directory that receives the per-run output directory (defaults to the
    /// current directory)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Language of status lines and log markers
    #[arg(long, value_enum, default_value = "en")]
    pub locale: Locale,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub use_gpu: bool,
    pub language: String,
    pub input_audio: PathBuf,
    pub model_name: String,
    pub formatting_mode: FormattingMode,
    pub show_progress: bool,
    pub monitor_interval: Duration,
    pub cpu_temperature: bool,
    pub threads: usize,
    pub whisper_cmd: String,
    pub gpu_probe_cmd: String,
    pub output_root: PathBuf,
    pub locale: Locale,
}

impl Args {
    /// Validate the arguments. Fails before anything touches the disk.
    pub fn into_run_config(self) -> Result<RunConfig> {
        if self.monitor_interval == 0 {
            return Err(WhisperMonitorError::InvalidInterval);
        }

        if !self.input_audio.is_file() {
            return Err(WhisperMonitorError::InputNotFound {
                path: self.input_audio,
            });
        }

        let formatting_mode = FormattingMode::parse(&self.formatting_mode).unwrap_or_else(|| {
            warn!(
                "Unknown formatting mode '{}', writing the transcript unformatted",
                self.formatting_mode
            );
            FormattingMode::Default
        });

        let output_root = match self.output_root {
            Some(root) => root,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        Ok(RunConfig {
            use_gpu: self.use_gpu,
            language: self.language,
            input_audio: self.input_audio,
            model_name: self.model_name,
            formatting_mode,
            show_progress: self.show_progress,
            monitor_interval: Duration::from_secs(self.monitor_interval),
            cpu_temperature: self.cpu_temperature,
            threads: self.threads.unwrap_or_else(SystemMetricsSource::logical_cpus).max(1),
            whisper_cmd: self.whisper_cmd,
            gpu_probe_cmd: self.gpu_probe_cmd,
            output_root,
            locale: self.locale,
        })
    }
}
