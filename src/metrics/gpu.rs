use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Fields requested from `nvidia-smi`, in log order
pub const GPU_QUERY_FIELDS: &str = "utilization.gpu,utilization.memory,temperature.gpu,power.draw";

/// Shell probe for NVIDIA GPU utilization
#[derive(Debug, Clone)]
pub struct GpuProbe {
    command: String,
}

impl Default for GpuProbe {
    fn default() -> Self {
        Self::new("nvidia-smi")
    }
}

impl GpuProbe {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Query utilization, memory utilization, temperature and power draw as
    /// one comma-separated line per GPU.
    ///
    /// Returns the failure detail on spawn error or non-zero exit.
    pub async fn query(&self) -> Result<String, String> {
        let output = Command::new(&self.command)
            .arg(format!("--query-gpu={}", GPU_QUERY_FIELDS))
            .arg("--format=csv,noheader,nounits")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Whether the probe can see at least one GPU. Used for device selection.
    pub async fn is_available(&self) -> bool {
        let result = Command::new(&self.command)
            .arg("-L")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("GPU probe {} not usable: {}", self.command, e);
                false
            }
        }
    }
}
