pub mod dashboard;
pub mod init;
pub mod members;
pub mod projects;
pub mod scores;
pub mod seed;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{presets, Table};
use serde::Serialize;

use transparency_core::service::TransparencyService;
use transparency_store::{Clock, FileStore, OutputFormat, SystemClock, TransparencyConfig};

/// Open the configured data file behind a service.
pub async fn open_service(config: &TransparencyConfig) -> Result<TransparencyService> {
    open_service_with_clock(config, Arc::new(SystemClock)).await
}

pub async fn open_service_with_clock(
    config: &TransparencyConfig,
    clock: Arc<dyn Clock>,
) -> Result<TransparencyService> {
    let store = FileStore::open(config.data_file.clone(), clock)
        .await
        .with_context(|| format!("failed to open data file {}", config.data_file.display()))?;
    Ok(TransparencyService::new(Arc::new(store)))
}

/// A table styled for the output format.
pub fn new_table(format: OutputFormat) -> Table {
    let mut table = Table::new();
    if format == OutputFormat::Markdown {
        table.load_preset(presets::ASCII_MARKDOWN);
    }
    table
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
