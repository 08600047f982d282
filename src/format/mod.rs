//! Transcript layouts.
//!
//! Three layouts are supported: the raw text, the raw text broken after every
//! `". "`, and one timestamped line per segment. Unknown layout names and a
//! timestamp layout without segments both fall back to the raw text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

use crate::protocol::Segment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingMode {
    /// Text as returned by the model
    #[default]
    Default,
    /// Literal `". "` to `".\n"` substitution
    NewlinesAfterPeriod,
    /// `[start s - end s] text` per segment
    Timestamps,
}

impl FormattingMode {
    /// Parse a mode name, returning `None` for names that are not recognized
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "newlines_after_period" => Some(Self::NewlinesAfterPeriod),
            "timestamps" => Some(Self::Timestamps),
            _ => None,
        }
    }

    /// Parse a mode name, treating anything unrecognized as `Default`
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NewlinesAfterPeriod => "newlines_after_period",
            Self::Timestamps => "timestamps",
        }
    }
}

impl fmt::Display for FormattingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `text` in the requested layout.
pub fn format_transcript(text: &str, mode: FormattingMode, segments: &[Segment]) -> String {
    match mode {
        FormattingMode::NewlinesAfterPeriod => text.replace(". ", ".\n"),
        FormattingMode::Timestamps if !segments.is_empty() => render_timestamps(segments),
        _ => text.to_string(),
    }
}

/// Same as [`format_transcript`] but takes the mode by name.
pub fn format_transcript_named(text: &str, mode: &str, segments: &[Segment]) -> String {
    format_transcript(text, FormattingMode::from_name(mode), segments)
}

fn render_timestamps(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "[{:.2}s - {:.2}s] {}",
            segment.start,
            segment.end,
            segment.text.trim()
        );
    }
    out
}
