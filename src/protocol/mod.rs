use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Compute device the transcription runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    /// Name understood by the whisper `--device` flag
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Cuda)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed piece of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    /// Segment text as produced by the model, including any leading space
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Output of one foreground transcription job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcript text
    #[serde(rename = "text")]
    pub full_text: String,
    /// Segments ordered by start time; may be empty
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl TranscriptionResult {
    pub fn new(full_text: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            full_text: full_text.into(),
            segments,
        }
    }

    /// End of the last segment, if any
    pub fn audio_duration(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end)
    }
}

/// Everything a transcriber needs to run one job
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    pub language: String,
    pub model: String,
    pub device: Device,
    /// Stream intermediate output to the console while the job runs
    pub show_progress: bool,
    /// Worker thread count used when running on the CPU
    pub threads: usize,
}
