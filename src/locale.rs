use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Language used for console status lines, log legend and transcript labels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    En,
    Pl,
}

/// Static label table for one locale
#[derive(Debug)]
pub struct Labels {
    /// Written to the log in place of GPU stats when GPU mode is off
    pub gpu_disabled: &'static str,
    /// Written to the log when the GPU probe fails
    pub gpu_error: &'static str,
    /// Written to the log when no thermal sensors were found
    pub temperature_unavailable: &'static str,
    pub legend: &'static str,
    pub sample_time_legend: &'static str,
    pub cpu_legend: &'static str,
    pub memory_legend: &'static str,
    pub temperature_legend: &'static str,
    pub gpu_legend: &'static str,
    pub transcript_started: &'static str,
    pub transcript_ended: &'static str,
    pub duration: &'static str,
    pub seconds: &'static str,
    pub using_device: &'static str,
    pub loading_model: &'static str,
    pub on_device: &'static str,
    pub transcription_started: &'static str,
    pub transcribing_file: &'static str,
    pub with_progress: &'static str,
    pub transcription_ended: &'static str,
    pub result_saved: &'static str,
    pub logs_saved: &'static str,
}

static EN: Labels = Labels {
    gpu_disabled: "GPU unavailable",
    gpu_error: "Error fetching GPU stats",
    temperature_unavailable: "not available",
    legend: "Legend:",
    sample_time_legend: "[sample time]",
    cpu_legend: "[CPU utilization averaged over the interval, %]",
    memory_legend: "[RAM in use, %]",
    temperature_legend: "[mean of thermal sensors, °C]",
    gpu_legend: "GPU Stats: [Utilization %, Memory Utilization %, Temperature (°C), Power Draw (W)]",
    transcript_started: "Transcription started:",
    transcript_ended: "Transcription ended:",
    duration: "Duration:",
    seconds: "seconds",
    using_device: "Using device:",
    loading_model: "Loading model",
    on_device: "on device",
    transcription_started: "Transcription started:",
    transcribing_file: "Starting transcription of",
    with_progress: "with progress display",
    transcription_ended: "Transcription ended:",
    result_saved: "Transcription completed! Result saved to:",
    logs_saved: "Logs saved to:",
};

static PL: Labels = Labels {
    gpu_disabled: "GPU niedostępne",
    gpu_error: "Błąd odczytu GPU",
    temperature_unavailable: "niedostępna",
    legend: "Legenda:",
    sample_time_legend: "[czas pomiaru]",
    cpu_legend: "[średnie użycie CPU w interwale, %]",
    memory_legend: "[zajęta pamięć RAM, %]",
    temperature_legend: "[średnia z czujników temperatury, °C]",
    gpu_legend: "GPU Stats: [Utilization %, Memory Utilization %, Temperature (°C), Power Draw (W)]",
    transcript_started: "Rozpoczęcie transkrypcji:",
    transcript_ended: "Zakończenie transkrypcji:",
    duration: "Czas trwania procesu:",
    seconds: "sekund",
    using_device: "Używane urządzenie:",
    loading_model: "Ładowanie modelu",
    on_device: "na urządzeniu",
    transcription_started: "Rozpoczęcie transkrypcji:",
    transcribing_file: "Rozpoczynanie transkrypcji pliku",
    with_progress: "z podglądem postępu",
    transcription_ended: "Zakończenie transkrypcji:",
    result_saved: "Transkrypcja zakończona! Wynik zapisany w pliku:",
    logs_saved: "Logi zapisane w pliku:",
};

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::Pl => &PL,
        }
    }
}
