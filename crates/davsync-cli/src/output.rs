//! Output formatting for CLI commands
//!
//! Messages go through an [`OutputFormatter`]; a finished run is rendered
//! either as status lines ([`report_lines`]) or as one JSON document
//! ([`report_json`]).

use davsync_core::domain::FileOutcome;
use davsync_core::ports::NotificationOutcome;
use davsync_sync::engine::RunReport;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    /// Multi-line guidance such as command usage
    fn guidance(&self, text: &str);
    /// Renders the outcome of a finished upload run
    fn report(&self, report: &RunReport);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn guidance(&self, text: &str) {
        for line in text.lines() {
            eprintln!("  {}", line);
        }
    }
    fn report(&self, report: &RunReport) {
        for line in report_lines(report) {
            match line {
                ReportLine::Success(msg) => self.success(&msg),
                ReportLine::Error(msg) => self.error(&msg),
                ReportLine::Warn(msg) => self.warn(&msg),
                ReportLine::Info(msg) => self.info(&msg),
            }
        }
    }
}

/// JSON output formatter
///
/// Progress messages are dropped; the report is printed as a single
/// document on stdout.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn guidance(&self, text: &str) {
        eprintln!("{}", serde_json::json!({"usage": text}));
    }
    fn report(&self, report: &RunReport) {
        println!(
            "{}",
            serde_json::to_string_pretty(&report_json(report)).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

// ============================================================================
// Run report rendering
// ============================================================================

/// One status line of a human-readable run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Success(String),
    Error(String),
    Warn(String),
    Info(String),
}

/// A run counts as failed when it hit a fatal error or lost its record
pub fn run_succeeded(report: &RunReport) -> bool {
    report.is_success() && report.state_error.is_none()
}

/// The serialized report plus a top-level `success` flag
pub fn report_json(report: &RunReport) -> serde_json::Value {
    let mut json = serde_json::to_value(report).unwrap_or_default();
    json["success"] = serde_json::Value::Bool(run_succeeded(report));
    json
}

/// Headline, counters, retry list and notification result of a run
pub fn report_lines(report: &RunReport) -> Vec<ReportLine> {
    let summary = &report.summary;
    let duration = format_duration(report.duration_ms);
    let mut lines = Vec::new();

    lines.push(match &report.fatal {
        Some(fatal) => ReportLine::Error(format!("Upload failed after {}: {}", duration, fatal)),
        None if summary.uploaded == 0 && summary.transfer_failed == 0 => {
            ReportLine::Success("Already up to date".to_string())
        }
        None => ReportLine::Success(format!("Upload completed in {}", duration)),
    });

    for (label, count) in [
        ("Uploaded: ", summary.uploaded),
        ("Unchanged:", summary.unchanged),
        ("Excluded: ", summary.excluded),
    ] {
        if count > 0 {
            lines.push(ReportLine::Info(format!("{} {}", label, plural(count, "file"))));
        }
    }

    if summary.transfer_failed > 0 {
        lines.push(ReportLine::Warn(format!(
            "{} not uploaded, will retry next run:",
            plural(summary.transfer_failed, "file")
        )));
        for outcome in &report.outcomes {
            if let FileOutcome::TransferFailed { local, reason, .. } = outcome {
                lines.push(ReportLine::Info(format!("  - {}: {}", local.display(), reason)));
            }
        }
    }
    if summary.directory_failed > 0 {
        lines.push(ReportLine::Warn(format!(
            "{} could not be created remotely",
            plural(summary.directory_failed, "folder")
        )));
    }

    if let Some(err) = &report.state_error {
        lines.push(ReportLine::Error(err.clone()));
    }

    match &report.notification {
        NotificationOutcome::NotConfigured => {}
        NotificationOutcome::Failed(reason) => lines.push(ReportLine::Warn(format!(
            "Completion notification failed: {}",
            reason
        ))),
        other => lines.push(ReportLine::Info(format!("Notification: {}", other))),
    }

    lines
}

/// `1 file`, `3 files`
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Milliseconds below one second, tenths of seconds above
pub fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}
