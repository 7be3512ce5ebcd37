//! Core types: quota model, aggregation, formatting

pub mod account;
pub mod aggregate;
pub mod dashboard;
pub mod format;
pub mod quota;
pub mod tracing;

pub use account::{GOOGLE_PROVIDER, LinkedAccount};
pub use aggregate::{AggregateQuota, aggregate};
pub use dashboard::{AccountQuota, Dashboard};
pub use format::{
    DashboardFormatter, FormatOptions, JsonOutput, OutputFormat, humanize_bytes, humanize_limit,
    humanize_signed,
};
pub use quota::{ByteLimit, QuotaResult};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
