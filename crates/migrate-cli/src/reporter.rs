//! Rendering of progress events.

use std::io::Write;

use clap::ValueEnum;
use colored::Colorize;
use migrate_core::{ProgressEvent, ProgressReceiver};
use serde_json::json;
use tracing::{debug, warn};

use crate::timer::format_elapsed;

/// Output format for progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// How progress is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Whether text output is coloured.
    pub color: bool,
}

impl ReporterConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable colour.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Turns events into output lines.
pub trait Renderer: Send + Sync {
    /// Render one progress event. The caller appends the trailing newline.
    fn render_event(&self, event: &ProgressEvent) -> String;

    /// Render the elapsed time of a command.
    fn render_elapsed(&self, seconds: f64) -> String;
}

/// Create a renderer for the given configuration.
pub fn create_renderer(config: &ReporterConfig) -> Box<dyn Renderer> {
    match config.format {
        OutputFormat::Text => Box::new(TextRenderer { color: config.color }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

/// Plain text renderer, optionally coloured.
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    /// Create a text renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Renderer for TextRenderer {
    fn render_event(&self, event: &ProgressEvent) -> String {
        match event {
            ProgressEvent::Message(text) => text.clone(),
            ProgressEvent::Failure(err) => {
                let text = err.to_string();
                if self.color {
                    format!("{}\n", text.red())
                } else {
                    format!("{}\n", text)
                }
            }
            ProgressEvent::MigrationStep(file) => {
                let glyph = file.direction.glyph();
                if self.color {
                    format!("{} {}", glyph.blue(), file.file_name)
                } else {
                    format!("{} {}", glyph, file.file_name)
                }
            }
            ProgressEvent::Other(payload) => payload.to_string(),
        }
    }

    fn render_elapsed(&self, seconds: f64) -> String {
        format!("\n{}", format_elapsed(seconds))
    }
}

/// JSON lines renderer.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render_event(&self, event: &ProgressEvent) -> String {
        let value = match event {
            ProgressEvent::Message(text) => json!({ "type": event.kind(), "text": text }),
            ProgressEvent::Failure(err) => {
                json!({ "type": event.kind(), "error": err.to_string() })
            }
            ProgressEvent::MigrationStep(file) => json!({
                "type": event.kind(),
                "version": file.version,
                "file_name": file.file_name,
                "direction": file.direction,
            }),
            ProgressEvent::Other(payload) => {
                json!({ "type": event.kind(), "text": payload.to_string() })
            }
        };
        value.to_string()
    }

    fn render_elapsed(&self, seconds: f64) -> String {
        json!({
            "type": "elapsed",
            "seconds": seconds,
            "display": format_elapsed(seconds),
        })
        .to_string()
    }
}

/// What the reporter saw while draining a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// `false` once any failure was observed.
    pub success: bool,
    /// Number of events rendered.
    pub events: usize,
    /// Number of failure events.
    pub failures: usize,
}

impl DrainSummary {
    fn record(&mut self, event: &ProgressEvent) {
        self.events += 1;
        if event.is_failure() {
            self.failures += 1;
            self.success = false;
        }
    }
}

impl Default for DrainSummary {
    fn default() -> Self {
        Self {
            success: true,
            events: 0,
            failures: 0,
        }
    }
}

/// Drains progress pipes and renders what arrives.
pub struct Reporter {
    renderer: Box<dyn Renderer>,
}

impl Reporter {
    /// Create a reporter for the given configuration.
    pub fn new(config: &ReporterConfig) -> Self {
        Self::with_renderer(create_renderer(config))
    }

    /// Create a reporter around an existing renderer.
    pub fn with_renderer(renderer: Box<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Render every event until the producer closes the pipe.
    ///
    /// Failures are rendered and counted; they never end the loop early, so
    /// the producer is never left waiting on a send nobody receives.
    pub async fn drain<W: Write>(&self, mut rx: ProgressReceiver, out: &mut W) -> DrainSummary {
        let mut summary = DrainSummary::default();
        while let Some(event) = rx.recv().await {
            self.report(&event, out, &mut summary);
        }
        debug!(
            events = summary.events,
            failures = summary.failures,
            "progress pipe drained"
        );
        summary
    }

    /// Render a single event and fold it into `summary`.
    pub fn report<W: Write>(&self, event: &ProgressEvent, out: &mut W, summary: &mut DrainSummary) {
        summary.record(event);
        let line = self.renderer.render_event(event);
        if let Err(e) = writeln!(out, "{}", line) {
            warn!(error = %e, kind = event.kind(), "failed to write progress event");
        }
    }

    /// Render the elapsed time of a command.
    pub fn report_elapsed<W: Write>(&self, seconds: f64, out: &mut W) {
        let line = self.renderer.render_elapsed(seconds);
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write elapsed time");
        }
    }
}
