//! One handler module per subcommand.

pub mod clear;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod log;
pub mod show;
pub mod summary;

use daylog_core::date;
use daylog_core::storage::{Store, StoreConfig};

use crate::cli::Cli;
use crate::config::DaylogConfig;

/// Open the store at the resolved data directory.
pub(crate) async fn open_store(cli: &Cli, config: &DaylogConfig) -> anyhow::Result<Store> {
    let dir = config.data_dir(cli.data_dir.as_deref());
    Ok(Store::open(StoreConfig::new(dir)).await?)
}

/// Resolve an optional date argument: validate and normalize, or default
/// to today.
pub(crate) fn resolve_date(arg: Option<&str>) -> anyhow::Result<String> {
    match arg {
        Some(raw) => Ok(date::to_iso(date::parse_iso(raw)?)),
        None => Ok(date::today_iso()),
    }
}
