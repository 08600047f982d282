//! Host metrics sampling.
//!
//! [`MetricsSource`] is the seam between the telemetry collector and the
//! platform. Every sampler fails soft: a missing GPU or thermal sensor turns
//! into a marker in the snapshot, never into an error.

pub mod gpu;
pub mod thermal;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::time::Duration;
use sysinfo::System;
use tracing::{debug, warn};

pub use gpu::GpuProbe;
pub use thermal::ThermalProbe;

/// GPU part of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum GpuStats {
    /// Probe output, one comma-separated line per GPU
    Raw(String),
    /// The probe ran and failed
    Error(String),
    /// GPU sampling is turned off for this run
    Disabled,
}

/// CPU temperature part of a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuTemperature {
    Celsius(f32),
    /// The probe is enabled but found no sensors
    Unavailable,
}

/// One poll of the metrics source. Never modified after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Local>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub gpu_stats: GpuStats,
    /// `None` when temperature sampling is not configured
    pub cpu_temperature: Option<CpuTemperature>,
}

/// Pluggable provider of host metrics.
#[async_trait]
pub trait MetricsSource: Send {
    /// CPU usage averaged over `interval`, and current memory usage, both in
    /// percent. Blocks for `interval`; this is the sampling cadence.
    async fn sample_cpu_memory(&mut self, interval: Duration) -> (f32, f32);

    /// Raw GPU statistics, or the failure detail.
    async fn sample_gpu(&mut self) -> Result<String, String>;

    /// Whether this source reads CPU temperature at all.
    fn temperature_supported(&self) -> bool {
        false
    }

    /// Mean CPU temperature in Celsius, `None` if no sensor was found.
    async fn sample_cpu_temperature(&mut self) -> Option<f32> {
        None
    }

    /// Take one full snapshot, substituting markers for anything that failed.
    async fn poll(&mut self, interval: Duration, gpu_enabled: bool) -> MetricsSnapshot {
        let (cpu_percent, memory_percent) = self.sample_cpu_memory(interval).await;

        let gpu_stats = if gpu_enabled {
            match self.sample_gpu().await {
                Ok(raw) => GpuStats::Raw(raw),
                Err(detail) => {
                    warn!("GPU probe failed: {}", detail);
                    GpuStats::Error(detail)
                }
            }
        } else {
            GpuStats::Disabled
        };

        let cpu_temperature = if self.temperature_supported() {
            Some(match self.sample_cpu_temperature().await {
                Some(celsius) => CpuTemperature::Celsius(celsius),
                None => {
                    debug!("No thermal sensors reported a temperature");
                    CpuTemperature::Unavailable
                }
            })
        } else {
            None
        };

        MetricsSnapshot {
            timestamp: Local::now(),
            cpu_percent,
            memory_percent,
            gpu_stats,
            cpu_temperature,
        }
    }
}

/// Metrics from the running host: `sysinfo` for CPU and memory, plus the
/// configured GPU and thermal probes.
pub struct SystemMetricsSource {
    system: System,
    gpu: GpuProbe,
    thermal: ThermalProbe,
}

impl SystemMetricsSource {
    pub fn new(gpu: GpuProbe, thermal: ThermalProbe) -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system,
            gpu,
            thermal,
        }
    }

    /// Logical CPU count, used as the default worker thread count
    pub fn logical_cpus() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

impl Default for SystemMetricsSource {
    fn default() -> Self {
        Self::new(GpuProbe::default(), ThermalProbe::Disabled)
    }
}

#[async_trait]
impl MetricsSource for SystemMetricsSource {
    async fn sample_cpu_memory(&mut self, interval: Duration) -> (f32, f32) {
        // CPU usage is the delta between two refreshes
        self.system.refresh_cpu_usage();
        tokio::time::sleep(interval).await;
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let cpu = self.system.global_cpu_usage();
        let total = self.system.total_memory();
        let memory = if total == 0 {
            0.0
        } else {
            let used = total.saturating_sub(self.system.available_memory());
            (used as f64 / total as f64 * 100.0) as f32
        };

        (cpu, memory)
    }

    async fn sample_gpu(&mut self) -> Result<String, String> {
        self.gpu.query().await
    }

    fn temperature_supported(&self) -> bool {
        self.thermal.is_enabled()
    }

    async fn sample_cpu_temperature(&mut self) -> Option<f32> {
        self.thermal.read_celsius().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        gpu: Result<String, String>,
        temperature: Option<Option<f32>>,
    }

    #[async_trait]
    impl MetricsSource for FixedSource {
        async fn sample_cpu_memory(&mut self, _interval: Duration) -> (f32, f32) {
            (12.5, 40.0)
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

    #[tokio::test]
    async fn test_poll_with_gpu_disabled() {
        let mut source = FixedSource {
            gpu: Ok("should not be read".to_string()),
            temperature: None,
        };
        let snapshot = source.poll(Duration::from_millis(1), false).await;

        assert_eq!(snapshot.cpu_percent, 12.5);
        assert_eq!(snapshot.memory_percent, 40.0);
        assert_eq!(snapshot.gpu_stats, GpuStats::Disabled);
        assert_eq!(snapshot.cpu_temperature, None);
    }

    #[tokio::test]
    async fn test_poll_gpu_failure_becomes_marker() {
        let mut source = FixedSource {
            gpu: Err("exit status 9".to_string()),
            temperature: None,
        };
        let snapshot = source.poll(Duration::from_millis(1), true).await;
        assert_eq!(snapshot.gpu_stats, GpuStats::Error("exit status 9".to_string()));
    }

    #[tokio::test]
    async fn test_poll_temperature_states() {
        let mut with_sensor = FixedSource {
            gpu: Ok("35, 10, 50, 80.5".to_string()),
            temperature: Some(Some(48.0)),
        };
        let snapshot = with_sensor.poll(Duration::from_millis(1), true).await;
        assert_eq!(snapshot.gpu_stats, GpuStats::Raw("35, 10, 50, 80.5".to_string()));
        assert_eq!(snapshot.cpu_temperature, Some(CpuTemperature::Celsius(48.0)));

        let mut without_sensor = FixedSource {
            gpu: Ok(String::new()),
            temperature: Some(None),
        };
        let snapshot = without_sensor.poll(Duration::from_millis(1), false).await;
        assert_eq!(snapshot.cpu_temperature, Some(CpuTemperature::Unavailable));
    }

    #[tokio::test]
    async fn test_system_source_reports_percentages() {
        let mut source = SystemMetricsSource::default();
        let (cpu, memory) = source.sample_cpu_memory(Duration::from_millis(250)).await;

        assert!((0.0..=100.0 * SystemMetricsSource::logical_cpus() as f32).contains(&cpu));
        assert!((0.0..=100.0).contains(&memory));
    }
}
