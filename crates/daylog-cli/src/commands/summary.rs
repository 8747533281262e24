use daylog_core::summary::store_totals;

use crate::cli::Cli;
use crate::commands::open_store;
use crate::config::DaylogConfig;

pub async fn handle_summary(cli: &Cli, config: &DaylogConfig) -> anyhow::Result<()> {
    let mut store = open_store(cli, config).await?;
    let totals = store_totals(&store.list_all().await?);

    println!(
        "{} record{} stored",
        totals.records,
        if totals.records == 1 { "" } else { "s" }
    );
    println!(
        "Days logged: {} | Span: {} day{}",
        totals.days_logged,
        totals.span_days,
        if totals.span_days == 1 { "" } else { "s" }
    );
    Ok(())
}
