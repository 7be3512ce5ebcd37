//! Output formatting for quota dashboards.
//!
//! This module renders a [`Dashboard`] in the supported output formats:
//! - **TTY**: Human-readable terminal output, one line per account
//! - **JSON**: Machine-readable output with raw byte counts and humanized strings
//!
//! # Example
//!
//! ```rust
//! use drivequota_core::format::{humanize_bytes, DashboardFormatter, FormatOptions};
//! use drivequota_core::Dashboard;
//!
//! assert_eq!(humanize_bytes(1536), "1.5 KB");
//!
//! let formatter = DashboardFormatter::new(FormatOptions::default());
//! let output = formatter.format_tty(&Dashboard::new(Vec::new()));
//! assert_eq!(output, "No linked Google accounts.");
//! ```

use serde::{Deserialize, Serialize};

use crate::account::LinkedAccount;
use crate::aggregate::AggregateQuota;
use crate::dashboard::{AccountQuota, Dashboard};
use crate::quota::{ByteLimit, QuotaResult};

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Text used for values without a cap.
pub const UNLIMITED: &str = "unlimited";

/// The output format for dashboard display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Formats a byte count with binary units: `"512 B"`, `"1.5 KB"`, `"15.0 GB"`.
pub fn humanize_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Formats a signed byte count; negative values get a leading `-`.
pub fn humanize_signed(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", humanize_bytes(bytes.unsigned_abs()))
    } else {
        humanize_bytes(bytes.unsigned_abs())
    }
}

/// Formats a limit, rendering no cap as `"unlimited"`.
pub fn humanize_limit(limit: ByteLimit) -> String {
    match limit {
        ByteLimit::Finite(bytes) => humanize_bytes(bytes),
        ByteLimit::Unlimited => UNLIMITED.to_string(),
    }
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Text to show when no account is linked.
    pub no_accounts_text: String,
    /// Whether to show the Drive/trash usage breakdown when reported.
    pub show_breakdown: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_accounts_text: "No linked Google accounts.".to_string(),
            show_breakdown: false,
        }
    }
}

/// Quota values in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonQuota {
    /// Raw usage in bytes.
    pub usage_bytes: u64,
    /// Raw limit in bytes, `null` when unlimited.
    pub limit_bytes: ByteLimit,
    /// Remaining bytes, `null` when unlimited.
    pub remaining_bytes: Option<i64>,
    /// Usage percentage, `null` when unlimited.
    pub percent_used: Option<u32>,
    /// Humanized usage.
    pub usage: String,
    /// Humanized limit.
    pub limit: String,
    /// Humanized remaining bytes, `null` when unlimited.
    pub remaining: Option<String>,
    /// Bytes used by Drive files, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_in_drive: Option<u64>,
    /// Bytes used by trashed Drive files, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_in_drive_trash: Option<u64>,
}

impl From<&QuotaResult> for JsonQuota {
    fn from(quota: &QuotaResult) -> Self {
        let remaining_bytes = quota.remaining_bytes();
        Self {
            usage_bytes: quota.usage_bytes,
            limit_bytes: quota.limit_bytes,
            remaining_bytes,
            percent_used: quota.percent_used(),
            usage: humanize_bytes(quota.usage_bytes),
            limit: humanize_limit(quota.limit_bytes),
            remaining: remaining_bytes.map(humanize_signed),
            usage_in_drive: quota.usage_in_drive,
            usage_in_drive_trash: quota.usage_in_drive_trash,
        }
    }
}

/// One account in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAccount {
    /// The linked account.
    pub account: LinkedAccount,
    /// The quota, `null` when the fetch failed.
    pub quota: Option<JsonQuota>,
    /// The error message, `null` when the fetch succeeded.
    pub error: Option<String>,
}

impl From<&AccountQuota> for JsonAccount {
    fn from(item: &AccountQuota) -> Self {
        Self {
            account: item.account.clone(),
            quota: item.quota().map(JsonQuota::from),
            error: item.error().map(String::from),
        }
    }
}

/// Aggregate totals in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTotal {
    /// Raw aggregate values.
    #[serde(flatten)]
    pub aggregate: AggregateQuota,
    /// Humanized total usage.
    pub used: String,
    /// Humanized total limit.
    pub limit: String,
    /// Humanized total remaining, `null` when unlimited.
    pub remaining: Option<String>,
}

impl From<&AggregateQuota> for JsonTotal {
    fn from(total: &AggregateQuota) -> Self {
        Self {
            aggregate: total.clone(),
            used: humanize_bytes(total.total_used),
            limit: humanize_limit(total.total_limit),
            remaining: total.total_remaining.map(humanize_signed),
        }
    }
}

/// JSON output format for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// One entry per linked account.
    pub items: Vec<JsonAccount>,
    /// Cross-account totals.
    pub total: JsonTotal,
}

impl From<&Dashboard> for JsonOutput {
    fn from(dashboard: &Dashboard) -> Self {
        Self {
            items: dashboard.items.iter().map(JsonAccount::from).collect(),
            total: JsonTotal::from(&dashboard.total),
        }
    }
}

/// Renders dashboards according to [`FormatOptions`].
#[derive(Debug, Clone, Default)]
pub struct DashboardFormatter {
    options: FormatOptions,
}

impl DashboardFormatter {
    /// Creates a formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Renders the dashboard in the requested format.
    pub fn format(
        &self,
        dashboard: &Dashboard,
        format: OutputFormat,
    ) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Tty => Ok(self.format_tty(dashboard)),
            OutputFormat::Json => self.format_json(dashboard),
        }
    }

    /// Renders the dashboard for a terminal.
    pub fn format_tty(&self, dashboard: &Dashboard) -> String {
        if dashboard.is_empty() {
            return self.options.no_accounts_text.clone();
        }

        let mut lines: Vec<String> = dashboard
            .items
            .iter()
            .map(|item| self.format_item(item))
            .collect();
        lines.push(String::new());
        lines.push(Self::format_total(&dashboard.total));
        if dashboard.total.accounts_failed > 0 {
            lines.push(format!(
                "{} of {} accounts could not be read and are not included.",
                dashboard.total.accounts_failed,
                dashboard.items.len()
            ));
        }
        lines.join("\n")
    }

    /// Renders the dashboard as pretty-printed JSON.
    pub fn format_json(&self, dashboard: &Dashboard) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonOutput::from(dashboard))
    }

    fn format_item(&self, item: &AccountQuota) -> String {
        let name = item.account.display_name();
        match &item.outcome {
            Ok(quota) => {
                let mut line = format!(
                    "{}: {}",
                    name,
                    usage_summary(
                        quota.usage_bytes,
                        quota.limit_bytes,
                        quota.remaining_bytes(),
                        quota.percent_used()
                    )
                );
                if self.options.show_breakdown
                    && let Some(in_drive) = quota.usage_in_drive
                {
                    line.push_str(&format!(" [drive {}", humanize_bytes(in_drive)));
                    if let Some(in_trash) = quota.usage_in_drive_trash {
                        line.push_str(&format!(", trash {}", humanize_bytes(in_trash)));
                    }
                    line.push(']');
                }
                line
            }
            Err(message) => format!("{}: error: {}", name, message),
        }
    }

    fn format_total(total: &AggregateQuota) -> String {
        format!(
            "Total: {}",
            usage_summary(
                total.total_used,
                total.total_limit,
                total.total_remaining,
                total.percent_used
            )
        )
    }
}

fn usage_summary(
    used: u64,
    limit: ByteLimit,
    remaining: Option<i64>,
    percent: Option<u32>,
) -> String {
    let mut summary = format!("{} used of {}", humanize_bytes(used), humanize_limit(limit));
    if let Some(pct) = percent {
        summary.push_str(&format!(" ({}%)", pct));
    }
    if let Some(remaining) = remaining {
        summary.push_str(&format!(", {} free", humanize_signed(remaining)));
    }
    summary
}

#[cfg(test)]
mod golden_tests;
