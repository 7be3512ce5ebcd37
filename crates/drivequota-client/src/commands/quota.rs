//! The quota dashboard.

use drivequota_core::{Dashboard, DashboardFormatter, FormatOptions, OutputFormat};
use drivequota_providers::{DashboardService, QuotaFetcher};

use crate::commands::check;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Fetches every linked account of `user` and renders the dashboard.
pub async fn show(
    config: &ClientConfig,
    user: &str,
    format: OutputFormat,
    options: FormatOptions,
) -> ClientResult<String> {
    let ready = check::prepare(config)?;
    let service = DashboardService::new(QuotaFetcher::new(ready.google, ready.store)?);
    let dashboard = service.build(user).await?;
    render(&dashboard, format, options)
}

/// Renders a dashboard in the requested format.
pub fn render(
    dashboard: &Dashboard,
    format: OutputFormat,
    options: FormatOptions,
) -> ClientResult<String> {
    Ok(DashboardFormatter::new(options).format(dashboard, format)?)
}
