use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::cli::RunConfig;
use crate::format::format_transcript;
use crate::locale::Labels;
use crate::metrics::{GpuProbe, MetricsSource};
use crate::monitor::{CollectorConfig, TelemetryCollector};
use crate::output::{
    render_transcript_file, write_transcript_file, OutputPaths, TIMESTAMP_FORMAT,
};
use crate::protocol::{Device, TranscriptionRequest};
use crate::status;
use crate::worker::Transcriber;
use crate::Result;

/// What a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    /// Wall-clock duration of the foreground job, including formatting
    pub elapsed_secs: f64,
    pub samples_written: u64,
    pub segments: usize,
    pub device: Device,
    pub paths: OutputPaths,
}

/// Pick CUDA when GPU use is requested and the probe sees a device.
pub async fn select_device(use_gpu: bool, probe: &GpuProbe) -> Device {
    if use_gpu && probe.is_available().await {
        Device::Cuda
    } else {
        Device::Cpu
    }
}

/// Sequences one monitored transcription: output allocation, collector
/// start, the foreground job, transcript write, collector stop and join.
pub struct JobOrchestrator {
    config: RunConfig,
    device: Device,
    transcriber: Box<dyn Transcriber>,
    collector: TelemetryCollector,
}

impl JobOrchestrator {
    /// GPU stats are sampled only when the job runs on the GPU.
    pub fn new(
        config: RunConfig,
        device: Device,
        transcriber: Box<dyn Transcriber>,
        source: Box<dyn MetricsSource>,
    ) -> Result<Self> {
        let collector = TelemetryCollector::new(
            source,
            CollectorConfig {
                interval: config.monitor_interval,
                gpu_enabled: device.is_gpu(),
                locale: config.locale,
            },
        )?;

        Ok(Self {
            config,
            device,
            transcriber,
            collector,
        })
    }

    /// Run the job once. The collector is always stopped and joined before
    /// this returns, whether the job succeeded or not.
    pub async fn run(self) -> Result<RunSummary> {
        let JobOrchestrator {
            config,
            device,
            transcriber,
            collector,
        } = self;
        let labels = config.locale.labels();

        status::info(&format!("{} {}", labels.using_device, device));

        let paths = OutputPaths::allocate(&config.output_root, &config.model_name)?;
        info!("Output directory: {}", paths.directory.display());

        let handle = collector.start(&paths.log_file).await?;

        status::info(&format!(
            "{} '{}' {} '{}'...",
            labels.loading_model, config.model_name, labels.on_device, device
        ));

        let started_at = Local::now();
        let clock = Instant::now();
        status::info(&format!(
            "{} {}",
            labels.transcription_started,
            started_at.format(TIMESTAMP_FORMAT)
        ));

        let outcome = transcribe_and_write(
            &config,
            device,
            transcriber.as_ref(),
            &paths,
            started_at,
            clock,
        )
        .await;

        handle.stop();
        let joined = handle.join().await;

        let (ended_at, elapsed, segments) = match outcome {
            Ok(done) => done,
            Err(e) => {
                if let Err(join_err) = joined {
                    warn!("Resource monitor also failed: {}", join_err);
                }
                return Err(e);
            }
        };
        let report = joined?;

        status::info(&format!(
            "{} {}",
            labels.transcription_ended,
            ended_at.format(TIMESTAMP_FORMAT)
        ));
        status::info(&format!(
            "{} {:.2} {}",
            labels.duration,
            elapsed.as_secs_f64(),
            labels.seconds
        ));
        status::info(&format!("{} {}", labels.result_saved, paths.transcript_file.display()));
        status::info(&format!("{} {}", labels.logs_saved, paths.log_file.display()));

        Ok(RunSummary {
            started_at,
            ended_at,
            elapsed_secs: elapsed.as_secs_f64(),
            samples_written: report.samples_written,
            segments,
            device,
            paths,
        })
    }
}

async fn transcribe_and_write(
    config: &RunConfig,
    device: Device,
    transcriber: &dyn Transcriber,
    paths: &OutputPaths,
    started_at: DateTime<Local>,
    clock: Instant,
) -> Result<(DateTime<Local>, Duration, usize)> {
    let labels: &Labels = config.locale.labels();

    let input = config.input_audio.display();
    if config.show_progress {
        status::info(&format!(
            "{} '{}' {}...",
            labels.transcribing_file, input, labels.with_progress
        ));
    } else {
        status::info(&format!("{} '{}'...", labels.transcribing_file, input));
    }

    let request = TranscriptionRequest {
        audio_path: config.input_audio.clone(),
        language: config.language.clone(),
        model: config.model_name.clone(),
        device,
        show_progress: config.show_progress,
        threads: config.threads,
    };
    let result = transcriber.transcribe(&request).await?;

    let body = format_transcript(&result.full_text, config.formatting_mode, &result.segments);
    let ended_at = Local::now();
    let elapsed = clock.elapsed();

    let contents =
        render_transcript_file(labels, started_at, ended_at, elapsed.as_secs_f64(), &body);
    write_transcript_file(&paths.transcript_file, &contents).await?;
    info!(
        "Transcript written to {} ({} segments)",
        paths.transcript_file.display(),
        result.segments.len()
    );
    if let Some(audio_secs) = result.audio_duration() {
        info!(
            "Transcribed {:.2}s of audio in {:.2}s",
            audio_secs,
            elapsed.as_secs_f64()
        );
    }

    Ok((ended_at, elapsed, result.segments.len()))
}
