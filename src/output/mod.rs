mod csv;
mod json;
mod text;

use chrono::Utc;

use crate::projection::ProjectedMarker;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One delivered frame plus the attitude it was computed for
pub struct FrameOutput<'a> {
    pub frame_index: u64,
    pub timestamp_s: f64,
    pub yaw_degrees: f64,
    pub markers: &'a [ProjectedMarker],
}

impl FrameOutput<'_> {
    pub fn visible_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.position.is_visible())
            .count()
    }
}

pub trait Formatter: Send {
    /// Rendered frame, or `None` when the format has nothing to write for it
    fn format(&self, output: &FrameOutput) -> Option<String>;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter::new(verbose)),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
