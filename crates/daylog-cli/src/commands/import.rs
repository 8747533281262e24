use daylog_core::import::{import_csv, import_json, ImportOptions};

use crate::cli::{Cli, ImportArgs};
use crate::commands::open_store;
use crate::config::DaylogConfig;

pub async fn handle_import(cli: &Cli, config: &DaylogConfig, args: &ImportArgs) -> anyhow::Result<()> {
    let format = match args.format.as_deref() {
        Some(f) => f.to_string(),
        None => match args.file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "json" || ext == "csv" => ext,
            _ => {
                return Err(anyhow::anyhow!(
                    "Cannot infer format from \"{}\"; pass --format json or --format csv",
                    args.file
                ));
            }
        },
    };

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", args.file, e))?;

    let mut store = open_store(cli, config).await?;

    match format.as_str() {
        "json" => {
            let accepted = import_json(&mut store, &text).await?;
            println!("Imported {} log{}", accepted, if accepted == 1 { "" } else { "s" });
        }
        "csv" => {
            let options = ImportOptions {
                auto_date: args.auto_date || config.import.auto_date_missing_rows,
            };
            let report = import_csv(&mut store, &text, options).await?;
            let mut line = format!(
                "Imported {} row{}",
                report.accepted,
                if report.accepted == 1 { "" } else { "s" }
            );
            if report.auto_dated > 0 {
                line.push_str(&format!(", auto-dated {}", report.auto_dated));
            }
            if report.skipped > 0 {
                line.push_str(&format!(", skipped {} (no resolvable date)", report.skipped));
            }
            println!("{}", line);
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported import format: {} (use json or csv)",
                other
            ));
        }
    }
    Ok(())
}
