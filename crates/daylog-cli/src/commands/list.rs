use daylog_core::export::sort_by_date;

use crate::cli::{Cli, ListArgs};
use crate::commands::open_store;
use crate::config::DaylogConfig;

pub async fn handle_list(cli: &Cli, config: &DaylogConfig, args: &ListArgs) -> anyhow::Result<()> {
    let mut store = open_store(cli, config).await?;
    let logs = sort_by_date(store.list_all().await?);

    if args.json {
        let dates: Vec<&str> = logs.iter().map(|l| l.date.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&dates)?);
        return Ok(());
    }

    for log in &logs {
        println!("{}", log.date);
    }
    if !cli.quiet {
        println!(
            "{} record{} stored",
            logs.len(),
            if logs.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
