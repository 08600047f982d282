use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::locale::Labels;
use crate::{Result, WhisperMonitorError};

/// Name of the resource log inside the run directory
pub const LOG_FILE_NAME: &str = "log.txt";

/// Format used for every wall-clock timestamp the program writes
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Find the first of `base`, `base_1`, `base_2`, ... that does not exist and
/// create it.
///
/// The directory is created non-recursively, so a missing parent surfaces as
/// an error. Two processes racing on the same base path may collide.
pub fn allocate_output_dir(base: &Path) -> Result<PathBuf> {
    let mut counter: u32 = 0;
    let mut candidate = base.to_path_buf();

    while candidate.exists() {
        counter += 1;
        candidate = suffixed(base, counter);
    }

    std::fs::create_dir(&candidate).map_err(|source| WhisperMonitorError::OutputDir {
        path: candidate.clone(),
        source,
    })?;

    debug!("Allocated output directory {}", candidate.display());
    Ok(candidate)
}

fn suffixed(base: &Path, counter: u32) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!("_{}", counter));
    PathBuf::from(name)
}

/// Files produced by one run. All of them live under `directory`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutputPaths {
    pub directory: PathBuf,
    pub transcript_file: PathBuf,
    pub log_file: PathBuf,
}

impl OutputPaths {
    /// Allocate `root/model_name` (or a suffixed sibling) and derive the
    /// transcript and log file paths inside it.
    pub fn allocate(root: &Path, model_name: &str) -> Result<Self> {
        let directory = allocate_output_dir(&root.join(model_name))?;
        Ok(Self {
            transcript_file: directory.join(format!("{}.txt", model_name)),
            log_file: directory.join(LOG_FILE_NAME),
            directory,
        })
    }
}

/// Render the transcript file: start line, formatted body, end line and
/// duration in seconds with two decimals.
pub fn render_transcript_file(
    labels: &Labels,
    started_at: DateTime<Local>,
    ended_at: DateTime<Local>,
    elapsed_secs: f64,
    body: &str,
) -> String {
    format!(
        "{} {}\n\n{}\n\n{} {}\n{} {:.2} {}\n",
        labels.transcript_started,
        started_at.format(TIMESTAMP_FORMAT),
        body,
        labels.transcript_ended,
        ended_at.format(TIMESTAMP_FORMAT),
        labels.duration,
        elapsed_secs,
        labels.seconds,
    )
}

/// Write the rendered transcript to `path`, replacing any previous content.
pub async fn write_transcript_file(path: &Path, contents: &str) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| WhisperMonitorError::TranscriptFile {
            path: path.to_path_buf(),
            source,
        })
}
