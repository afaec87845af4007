//! Output formatting for the CLI.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use colored::*;
use hnrelay_domain::{discussion_url, TrackedItem};
use hnrelay_sync::{PollReport, SweepReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format tracked items, flagging those past `retention` as of `now`.
    pub fn format_tracked(
        &self,
        items: &[TrackedItem],
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<String> {
        let cutoff = now - retention;
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = items
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "id": item.id,
                            "message_id": item.handle.value(),
                            "last_synced_at": item.last_synced_at.to_rfc3339(),
                            "expired": item.is_older_than(cutoff),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize("No tracked stories.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Story", "Message", "Last Synced", "Age", "Discussion"]);

                let mut expired = 0;
                for item in items {
                    let mut age = format_age(now - item.last_synced_at);
                    if item.is_older_than(cutoff) {
                        expired += 1;
                        age = self.colorize(&format!("{} (expired)", age), "red");
                    }
                    builder.push_record([
                        item.id.to_string(),
                        item.handle.to_string(),
                        item.last_synced_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        age,
                        discussion_url(item.id),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let summary = self.info(&format!(
                    "{} tracked, {} past retention",
                    items.len(),
                    expired
                ));
                Ok(format!("{}\n{}", table, summary))
            }
        }
    }

    /// Format the result of a poll cycle.
    pub fn format_poll(&self, report: &PollReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "candidates": report.candidates,
                "created": report.created,
                "updated": report.updated,
                "excluded": report.excluded,
                "missing": report.missing,
                "failed": report.failed,
                "elapsed_ms": report.elapsed.as_millis() as u64,
            }))?),
            OutputFormat::Table => {
                let line = format!(
                    "Poll: {} candidates, {} sent, {} edited, {} excluded, {} missing, {} failed",
                    report.candidates,
                    report.created,
                    report.updated,
                    report.excluded,
                    report.missing,
                    report.failed
                );
                Ok(self.outcome(&line, report.failed))
            }
        }
    }

    /// Format the result of a cleanup cycle.
    pub fn format_sweep(&self, report: &SweepReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "expired": report.expired,
                "deleted": report.deleted,
                "already_gone": report.already_gone,
                "failed": report.failed,
                "elapsed_ms": report.elapsed.as_millis() as u64,
            }))?),
            OutputFormat::Table => {
                let line = format!(
                    "Cleanup: {} expired, {} deleted, {} already gone, {} failed",
                    report.expired, report.deleted, report.already_gone, report.failed
                );
                Ok(self.outcome(&line, report.failed))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn outcome(&self, line: &str, failed: usize) -> String {
        if failed > 0 {
            self.warning(line)
        } else {
            self.success(line)
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render an age as hours and minutes.
fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
