use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use whisper_monitor::cli::Args;
use whisper_monitor::metrics::{GpuProbe, SystemMetricsSource, ThermalProbe};
use whisper_monitor::orchestrator::{select_device, JobOrchestrator};
use whisper_monitor::status;
use whisper_monitor::worker::{WhisperCliTranscriber, WorkerConfig};

async fn run(args: Args) -> Result<()> {
    let config = args.into_run_config().context("Invalid configuration")?;

    info!("Starting Whisper Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Input audio: {}", config.input_audio.display());
    info!("  Model: {}", config.model_name);
    info!("  Language: {}", config.language);
    info!("  Formatting: {}", config.formatting_mode);
    info!("  Monitor interval: {:?}", config.monitor_interval);
    info!("  Output root: {}", config.output_root.display());

    let gpu_probe = GpuProbe::new(config.gpu_probe_cmd.clone());
    let device = select_device(config.use_gpu, &gpu_probe).await;
    debug!("Selected device {} (GPU requested: {})", device, config.use_gpu);

    let thermal = if config.cpu_temperature {
        ThermalProbe::platform_default()
    } else {
        ThermalProbe::Disabled
    };
    let source = SystemMetricsSource::new(gpu_probe, thermal);

    let transcriber = WhisperCliTranscriber::new(WorkerConfig {
        command: config.whisper_cmd.clone(),
        ..WorkerConfig::default()
    });

    let orchestrator = JobOrchestrator::new(config, device, Box::new(transcriber), Box::new(source))
        .context("Failed to set up transcription run")?;

    let summary = orchestrator.run().await?;
    debug!("Run summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level: tracing::Level = args.log_level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        status::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
