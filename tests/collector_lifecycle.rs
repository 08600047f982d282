mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;

use common::{count_records, read_log, ScriptedSource};
use whisper_monitor::locale::Locale;
use whisper_monitor::monitor::{CollectorConfig, CollectorState, TelemetryCollector};

fn config(millis: u64, gpu_enabled: bool) -> CollectorConfig {
    CollectorConfig {
        interval: Duration::from_millis(millis),
        gpu_enabled,
        locale: Locale::En,
    }
}

#[tokio::test]
async fn test_no_records_after_join() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let collector =
        TelemetryCollector::new(Box::new(ScriptedSource::healthy()), config(20, true)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop();
    let report = handle.join().await.unwrap();

    let after_join = read_log(&log_path);
    assert!(report.samples_written >= 3, "only {} samples", report.samples_written);
    assert_eq!(count_records(&after_join), report.samples_written as usize);
    assert!(after_join.contains("GPU Stats: 42, 17, 63, 95.12"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(read_log(&log_path), after_join);
}

#[tokio::test]
async fn test_record_count_grows_while_running() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let collector =
        TelemetryCollector::new(Box::new(ScriptedSource::healthy()), config(20, false)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();

    tokio::time::sleep(Duration::from_millis(70)).await;
    let early = count_records(&read_log(&log_path));
    tokio::time::sleep(Duration::from_millis(120)).await;
    let later = count_records(&read_log(&log_path));
    assert_eq!(handle.state(), CollectorState::Running);

    handle.stop();
    handle.join().await.unwrap();

    assert!(early >= 1);
    assert!(later > early, "expected growth: {} -> {}", early, later);
}

#[tokio::test]
async fn test_join_waits_for_late_stop() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let collector =
        TelemetryCollector::new(Box::new(ScriptedSource::healthy()), config(10, false)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();
    let token = handle.stop_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.stop();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .expect("join did not return after stop")
        .unwrap();
    assert!(report.samples_written >= 1);
}

#[tokio::test]
async fn test_gpu_probe_failure_is_logged_and_sampling_continues() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let source = ScriptedSource::failing_gpu();
    let polls = source.polls.clone();
    let collector = TelemetryCollector::new(Box::new(source), config(15, true)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.stop();
    let report = handle.join().await.unwrap();

    let log = read_log(&log_path);
    assert!(report.samples_written >= 2);
    assert_eq!(polls.load(Ordering::SeqCst) as u64, report.samples_written);
    assert_eq!(
        log.matches("GPU Stats: Error fetching GPU stats").count(),
        report.samples_written as usize
    );
}

#[tokio::test]
async fn test_gpu_disabled_marker() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let collector = TelemetryCollector::new(
        Box::new(ScriptedSource::healthy()),
        CollectorConfig {
            locale: Locale::Pl,
            ..config(10, false)
        },
    )
    .unwrap();
    let handle = collector.start(&log_path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop();
    handle.join().await.unwrap();

    let log = read_log(&log_path);
    assert!(log.contains("Legenda:"));
    assert!(log.contains("GPU Stats: GPU niedostępne"));
    assert!(!log.contains("42, 17, 63"));
}

#[tokio::test]
async fn test_temperature_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let mut source = ScriptedSource::healthy();
    source.temperature = Some(None);
    let collector = TelemetryCollector::new(Box::new(source), config(10, false)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.stop();
    let report = handle.join().await.unwrap();

    let log = read_log(&log_path);
    assert_eq!(
        log.matches("CPU Temperature: not available").count(),
        report.samples_written as usize
    );
}

#[tokio::test]
async fn test_log_is_appended_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");
    std::fs::write(&log_path, "previous content\n").unwrap();

    for _ in 0..2 {
        let source = Box::new(ScriptedSource::healthy());
        let collector = TelemetryCollector::new(source, config(10, false)).unwrap();
        let handle = collector.start(&log_path).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();
        handle.join().await.unwrap();
    }

    let log = read_log(&log_path);
    assert!(log.starts_with("previous content\n"));
    assert_eq!(log.matches("[MONITORING STARTED]").count(), 2);
}

#[tokio::test]
async fn test_dropped_handle_stops_sampling() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let collector =
        TelemetryCollector::new(Box::new(ScriptedSource::healthy()), config(10, false)).unwrap();
    let handle = collector.start(&log_path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = read_log(&log_path);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(read_log(&log_path), settled);
}
