use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::protocol::{Device, TranscriptionRequest, TranscriptionResult};

/// Number of stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Errors from the foreground transcription job
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("failed to start transcriber `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcriber exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("transcriber produced no output at {path}")]
    MissingOutput { path: PathBuf },

    #[error("could not parse transcriber output {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("transcriber I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by in-process transcribers
    #[error("{0}")]
    Other(String),
}

/// The foreground unit of work
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError>;
}

/// Configuration for the whisper subprocess
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Executable to run (defaults to "whisper")
    pub command: String,
    /// Extra arguments appended after the generated ones
    pub extra_args: Vec<String>,
    /// Environment variables for the child
    pub env_vars: Vec<(String, String)>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: "whisper".to_string(),
            extra_args: Vec::new(),
            env_vars: Vec::new(),
        }
    }
}

/// Runs the `whisper` command-line tool and reads back its JSON output
pub struct WhisperCliTranscriber {
    config: WorkerConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Arguments for one run, writing JSON into `output_dir`
    pub fn build_args(&self, request: &TranscriptionRequest, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            request.audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            request.model.clone(),
            "--language".to_string(),
            request.language.clone(),
            "--device".to_string(),
            request.device.as_str().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--verbose".to_string(),
            if request.show_progress { "True" } else { "False" }.to_string(),
        ];

        if request.device == Device::Cpu {
            args.push("--threads".to_string());
            args.push(request.threads.to_string());
        }

        args.extend(self.config.extra_args.iter().cloned());
        args
    }

    /// Environment for one run. CPU runs pin the OpenMP thread count.
    pub fn build_env(&self, request: &TranscriptionRequest) -> Vec<(String, String)> {
        let mut env = self.config.env_vars.clone();
        if request.device == Device::Cpu {
            env.push(("OMP_NUM_THREADS".to_string(), request.threads.to_string()));
        }
        env
    }

    fn spawn(
        &self,
        request: &TranscriptionRequest,
        output_dir: &Path,
    ) -> Result<Child, TranscriptionError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(self.build_args(request, output_dir));
        for (key, value) in self.build_env(request) {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| TranscriptionError::Spawn {
            command: self.config.command.clone(),
            source,
        })?;
        debug!("Transcriber process spawned with PID: {:?}", child.id());
        Ok(child)
    }
}

/// Path whisper writes its JSON result to: `<output_dir>/<audio stem>.json`
pub fn json_output_path(output_dir: &Path, audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Read and parse whisper's JSON result
pub async fn read_json_output(path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TranscriptionError::MissingOutput {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&contents).map_err(|source| TranscriptionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Wait for an output reader task; a reader that panicked yields nothing.
async fn join_reader<T: Default>(handle: JoinHandle<T>, stream: &str) -> T {
    match handle.await {
        Ok(value) => value,
        Err(e) => {
            warn!("Transcriber {} reader failed: {}", stream, e);
            T::default()
        }
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let output_dir = tempfile::Builder::new().prefix("whisper-monitor-").tempdir()?;
        let mut child = self.spawn(request, output_dir.path())?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TranscriptionError::Other("failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscriptionError::Other("failed to capture stderr".to_string()))?;

        let show_progress = request.show_progress;
        let stdout_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if show_progress {
                    println!("{}", line);
                } else {
                    debug!("whisper stdout: {}", line);
                }
            }
        });

        let stderr_handle = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("whisper stderr: {}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let status = child.wait().await?;
        join_reader(stdout_handle, "stdout").await;
        let stderr_tail = join_reader(stderr_handle, "stderr").await;

        info!("Transcriber process exited with status: {}", status);
        if !status.success() {
            return Err(TranscriptionError::Failed {
                status,
                stderr: stderr_tail,
            });
        }

        read_json_output(&json_output_path(output_dir.path(), &request.audio_path)).await
    }
}
