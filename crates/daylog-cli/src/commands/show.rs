use daylog_core::catalog;
use daylog_core::record::{DailyLog, NUMERIC_FIELDS};
use daylog_core::summary::log_summary;

use crate::cli::{Cli, ShowArgs};
use crate::commands::{open_store, resolve_date};
use crate::config::DaylogConfig;
use crate::measure::measurements_allowed;

pub async fn handle_show(cli: &Cli, config: &DaylogConfig, args: &ShowArgs) -> anyhow::Result<()> {
    let date = resolve_date(args.date.as_deref())?;
    let mut store = open_store(cli, config).await?;

    let stored = store.get(&date).await?;
    let materialized = stored.is_none();
    let log = stored.unwrap_or_else(|| DailyLog::empty(&date));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(());
    }

    println!("Date: {}{}", log.date, if materialized { " (not stored)" } else { "" });

    let taken: Vec<&str> = catalog::SUPPLEMENTS
        .iter()
        .filter(|s| log.supplements.get(s.id).copied().unwrap_or(false))
        .map(|s| s.name)
        .collect();
    if !taken.is_empty() {
        println!("Supplements: {}", taken.join(", "));
    }
    if !log.custom_vitamin_name.is_empty() {
        println!(
            "Custom vitamin: {} ({})",
            log.custom_vitamin_name,
            if log.custom_vitamin_taken { "taken" } else { "not taken" }
        );
    }

    let done: Vec<&str> = catalog::EXERCISES
        .iter()
        .filter(|e| log.exercises.get(e.id).copied().unwrap_or(false))
        .map(|e| e.name)
        .collect();
    if !done.is_empty() {
        println!("Exercises: {}", done.join(", "));
    }

    for field in NUMERIC_FIELDS {
        if let Some(value) = log.numeric(field) {
            println!("{}: {}", field, value);
        }
    }

    for (name, slot) in [
        ("Breakfast", &log.meals.breakfast),
        ("Lunch", &log.meals.lunch),
        ("Dinner", &log.meals.dinner),
    ] {
        if !slot.time.is_empty() || !slot.text.is_empty() {
            println!("{}: {} {}", name, slot.time, slot.text);
        }
    }
    if !log.notes.is_empty() {
        println!("Notes: {}", log.notes);
    }

    if !cli.quiet {
        let summary = log_summary(&log);
        println!(
            "Summary: {} supplements, {} exercises, fasting: {}",
            summary.supplements_taken,
            summary.exercises_done,
            if summary.any_fasting { "Yes" } else { "--" }
        );

        let interval = config.measure_interval();
        if interval > 1 {
            let all = store.list_all().await?;
            let open = measurements_allowed(interval, &all, &date);
            println!(
                "Measurements: {}",
                if open { "open on this date" } else { "locked on this date" }
            );
        }
    }

    Ok(())
}
