use daylog_core::date;

use crate::cli::{Cli, ClearAllArgs, ClearRangeArgs};
use crate::commands::open_store;
use crate::config::DaylogConfig;

pub async fn handle_clear_range(
    cli: &Cli,
    config: &DaylogConfig,
    args: &ClearRangeArgs,
) -> anyhow::Result<()> {
    let from = date::to_iso(date::parse_iso(&args.from)?);
    let to = date::to_iso(date::parse_iso(&args.to)?);
    if from > to {
        return Err(anyhow::anyhow!("Range start {} is after range end {}", from, to));
    }

    let mut store = open_store(cli, config).await?;
    let dropped = store.clear_range(&from, &to).await?;
    if !cli.quiet {
        println!(
            "Deleted {} record{} between {} and {}",
            dropped,
            if dropped == 1 { "" } else { "s" },
            from,
            to
        );
    }
    Ok(())
}

pub async fn handle_clear_all(
    cli: &Cli,
    config: &DaylogConfig,
    args: &ClearAllArgs,
) -> anyhow::Result<()> {
    // The confirmation gesture the store itself does not own.
    if !args.yes {
        return Err(anyhow::anyhow!(
            "This deletes every record and cannot be undone; re-run with --yes to confirm"
        ));
    }

    let mut store = open_store(cli, config).await?;
    store.clear_all().await?;
    if !cli.quiet {
        println!("All data cleared");
    }
    Ok(())
}
