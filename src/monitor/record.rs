use chrono::{DateTime, Local};

use crate::locale::Labels;
use crate::metrics::{CpuTemperature, GpuStats, MetricsSnapshot};
use crate::output::TIMESTAMP_FORMAT;

pub const MONITORING_STARTED: &str = "[MONITORING STARTED]";
pub const TIMESTAMP_LABEL: &str = "Timestamp:";
pub const CPU_USAGE_LABEL: &str = "CPU Usage:";
pub const MEMORY_USAGE_LABEL: &str = "Memory Usage:";
pub const CPU_TEMPERATURE_LABEL: &str = "CPU Temperature:";
pub const GPU_STATS_LABEL: &str = "GPU Stats:";

/// Header block written once per collector start
pub fn render_header(
    labels: &Labels,
    started_at: DateTime<Local>,
    with_temperature: bool,
) -> String {
    let mut header = format!(
        "\n{} {}\n{}\n{} {}\n{} {}\n{} {}\n",
        MONITORING_STARTED,
        started_at.format(TIMESTAMP_FORMAT),
        labels.legend,
        TIMESTAMP_LABEL,
        labels.sample_time_legend,
        CPU_USAGE_LABEL,
        labels.cpu_legend,
        MEMORY_USAGE_LABEL,
        labels.memory_legend,
    );
    if with_temperature {
        header.push_str(&format!(
            "{} {}\n",
            CPU_TEMPERATURE_LABEL, labels.temperature_legend
        ));
    }
    header.push_str(labels.gpu_legend);
    header.push_str("\n\n");
    header
}

/// One log record, terminated by a blank line
pub fn render_record(labels: &Labels, snapshot: &MetricsSnapshot) -> String {
    let mut record = format!(
        "{} {}\n{} {:.1}%\n{} {:.1}%\n",
        TIMESTAMP_LABEL,
        snapshot.timestamp.format(TIMESTAMP_FORMAT),
        CPU_USAGE_LABEL,
        snapshot.cpu_percent,
        MEMORY_USAGE_LABEL,
        snapshot.memory_percent,
    );

    match snapshot.cpu_temperature {
        Some(CpuTemperature::Celsius(celsius)) => {
            record.push_str(&format!("{} {:.1}°C\n", CPU_TEMPERATURE_LABEL, celsius));
        }
        Some(CpuTemperature::Unavailable) => {
            record.push_str(&format!(
                "{} {}\n",
                CPU_TEMPERATURE_LABEL, labels.temperature_unavailable
            ));
        }
        None => {}
    }

    let gpu = match &snapshot.gpu_stats {
        GpuStats::Raw(raw) => raw.clone(),
        GpuStats::Error(detail) => format!("{} ({})", labels.gpu_error, detail),
        GpuStats::Disabled => labels.gpu_disabled.to_string(),
    };
    record.push_str(&format!("{} {}\n\n", GPU_STATS_LABEL, gpu));
    record
}
