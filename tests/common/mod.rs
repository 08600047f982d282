#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use whisper_monitor::cli::RunConfig;
use whisper_monitor::locale::Locale;
use whisper_monitor::metrics::MetricsSource;
use whisper_monitor::{
    FormattingMode, Segment, Transcriber, TranscriptionError, TranscriptionRequest,
    TranscriptionResult,
};

/// Metrics source that sleeps for the interval and returns fixed readings
pub struct ScriptedSource {
    pub gpu: Result<String, String>,
    pub temperature: Option<Option<f32>>,
    pub polls: Arc<AtomicU32>,
}

impl ScriptedSource {
    pub fn healthy() -> Self {
        Self {
            gpu: Ok("42, 17, 63, 95.12".to_string()),
            temperature: None,
            polls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing_gpu() -> Self {
        Self {
            gpu: Err("nvidia-smi exited with exit status: 9".to_string()),
            ..Self::healthy()
        }
    }
}

#[async_trait]
impl MetricsSource for ScriptedSource {
    async fn sample_cpu_memory(&mut self, interval: Duration) -> (f32, f32) {
        tokio::time::sleep(interval).await;
        self.polls.fetch_add(1, Ordering::SeqCst);
        (25.0, 50.0)
    }

    async fn sample_gpu(&mut self) -> Result<String, String> {
        self.gpu.clone()
    }

    fn temperature_supported(&self) -> bool {
        self.temperature.is_some()
    }

    async fn sample_cpu_temperature(&mut self) -> Option<f32> {
        self.temperature.flatten()
    }
}

/// Foreground job that waits, then returns a canned result
pub struct MockTranscriber {
    pub delay: Duration,
    pub result: TranscriptionResult,
}

impl MockTranscriber {
    pub fn hello_world(delay: Duration) -> Self {
        Self {
            delay,
            result: TranscriptionResult::new(
                "Hello. World.",
                vec![Segment::new(0.0, 1.5, " Hello."), Segment::new(1.5, 3.25, " World.")],
            ),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.result.clone())
    }
}

/// Foreground job that waits, then fails
pub struct FailingTranscriber {
    pub delay: Duration,
}

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(
        &self,
        _request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        tokio::time::sleep(self.delay).await;
        Err(TranscriptionError::Other("model crashed".to_string()))
    }
}

pub fn run_config(output_root: &Path, mode: FormattingMode, interval: Duration) -> RunConfig {
    RunConfig {
        use_gpu: false,
        language: "en".to_string(),
        input_audio: PathBuf::from("audio.mp3"),
        model_name: "tiny".to_string(),
        formatting_mode: mode,
        show_progress: false,
        monitor_interval: interval,
        cpu_temperature: false,
        threads: 2,
        whisper_cmd: "whisper".to_string(),
        gpu_probe_cmd: "nvidia-smi".to_string(),
        output_root: output_root.to_path_buf(),
        locale: Locale::En,
    }
}

/// Number of sample records in a log, excluding the header legend
pub fn count_records(log: &str) -> usize {
    log.lines()
        .filter(|line| line.starts_with("CPU Usage:") && !line.contains('['))
        .count()
}

pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
