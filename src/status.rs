//! Console status lines.
//!
//! These are the user-facing progress lines (`[INFO] ...`) and are printed
//! regardless of the tracing filter. Diagnostics go through `tracing`.

/// Status line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

impl StatusLevel {
    fn tag(&self) -> &'static str {
        match self {
            StatusLevel::Info => "[INFO]",
            StatusLevel::Error => "[ERROR]",
        }
    }
}

/// Render a status line without printing it
pub fn render(level: StatusLevel, message: &str) -> String {
    format!("{} {}", level.tag(), message)
}

pub fn info(message: &str) {
    println!("{}", render(StatusLevel::Info, message));
}

pub fn error(message: &str) {
    eprintln!("{}", render(StatusLevel::Error, message));
}
