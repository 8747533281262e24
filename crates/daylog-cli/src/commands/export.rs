use daylog_core::export::{export_csv, export_json};

use crate::cli::{Cli, ExportArgs};
use crate::commands::open_store;
use crate::config::DaylogConfig;

pub async fn handle_export(cli: &Cli, config: &DaylogConfig, args: &ExportArgs) -> anyhow::Result<()> {
    let mut store = open_store(cli, config).await?;
    let logs = store.list_all().await?;
    let count = logs.len();

    let body = match args.format.as_str() {
        "json" => export_json(logs)?,
        "csv" => export_csv(logs),
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported export format: {} (use json or csv)",
                other
            ));
        }
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, &body)?;
            if !cli.quiet {
                println!("Exported {} record{} to {}", count, if count == 1 { "" } else { "s" }, path);
            }
        }
        None => println!("{}", body),
    }
    Ok(())
}
