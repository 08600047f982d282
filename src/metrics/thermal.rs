use tracing::debug;

/// Offset between Kelvin and Celsius
const KELVIN_OFFSET: f64 = 273.15;

/// How CPU temperature is read, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalProbe {
    /// Temperature is not sampled; the log line is omitted
    Disabled,
    /// Component sensors reported by `sysinfo`, already in Celsius
    Components,
    /// ACPI thermal zones through WMI, reported in decikelvin
    Wmi,
}

impl ThermalProbe {
    /// WMI on Windows, `sysinfo` components elsewhere
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            ThermalProbe::Wmi
        } else {
            ThermalProbe::Components
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ThermalProbe::Disabled)
    }

    /// Mean temperature across all sensors, or `None` if none were found.
    pub async fn read_celsius(&self) -> Option<f32> {
        let readings = match self {
            ThermalProbe::Disabled => return None,
            ThermalProbe::Components => read_components().await,
            ThermalProbe::Wmi => read_wmi().await,
        };
        mean(&readings).map(|c| c as f32)
    }
}

/// Sensor files are read synchronously, so the scan runs off the runtime threads.
async fn read_components() -> Vec<f64> {
    let scan = tokio::task::spawn_blocking(|| {
        let components = sysinfo::Components::new_with_refreshed_list();
        components
            .list()
            .iter()
            .map(|c| c.temperature() as f64)
            .filter(|t| t.is_finite())
            .collect::<Vec<_>>()
    });

    match scan.await {
        Ok(readings) => readings,
        Err(e) => {
            debug!("Thermal sensor scan failed: {}", e);
            Vec::new()
        }
    }
}

async fn read_wmi() -> Vec<f64> {
    let output = tokio::process::Command::new("wmic")
        .args([
            "/namespace:\\\\root\\wmi",
            "PATH",
            "MSAcpi_ThermalZoneTemperature",
            "get",
            "CurrentTemperature",
        ])
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            parse_wmi_readings(&String::from_utf8_lossy(&output.stdout))
                .into_iter()
                .map(decikelvin_to_celsius)
                .collect()
        }
        Ok(output) => {
            debug!("wmic thermal query exited with {}", output.status);
            Vec::new()
        }
        Err(e) => {
            debug!("wmic thermal query failed: {}", e);
            Vec::new()
        }
    }
}

/// Convert a WMI thermal-zone reading (tenths of a Kelvin) to Celsius
pub fn decikelvin_to_celsius(decikelvin: f64) -> f64 {
    decikelvin / 10.0 - KELVIN_OFFSET
}

/// Extract the numeric rows of `wmic ... get CurrentTemperature` output,
/// skipping the header and blank lines.
pub fn parse_wmi_readings(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
