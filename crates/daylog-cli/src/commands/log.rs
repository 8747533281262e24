use daylog_core::catalog;
use daylog_core::record::{parse_measurement, DailyLog, LogDraft};
use daylog_core::summary::store_totals;

use crate::cli::{Cli, LogArgs};
use crate::commands::{open_store, resolve_date};
use crate::config::DaylogConfig;
use crate::measure::measurements_allowed;

pub async fn handle_log(cli: &Cli, config: &DaylogConfig, args: &LogArgs) -> anyhow::Result<()> {
    let date = resolve_date(args.date.as_deref())?;
    let mut store = open_store(cli, config).await?;

    let existing = store.get(&date).await?;
    let is_new = existing.is_none();
    let base = existing.unwrap_or_else(|| DailyLog::empty(&date));
    let mut draft = LogDraft::from_log(&base);

    for id in &args.supplement {
        ensure_supplement(id)?;
        draft.supplements.insert(id.clone(), true);
    }
    for id in &args.no_supplement {
        ensure_supplement(id)?;
        draft.supplements.insert(id.clone(), false);
    }
    for id in &args.exercise {
        ensure_exercise(id)?;
        draft.exercises.insert(id.clone(), true);
    }
    for id in &args.no_exercise {
        ensure_exercise(id)?;
        draft.exercises.insert(id.clone(), false);
    }

    if let Some(name) = &args.custom_vitamin {
        draft.custom_vitamin_name = name.clone();
    }
    if args.custom_vitamin_taken {
        draft.custom_vitamin_taken = true;
    }
    if args.fasted {
        draft.fasted = true;
    }
    if args.water_fasted {
        draft.water_fasted = true;
    }

    let measurements: [(&str, &Option<String>); 10] = [
        ("fasting_blood_sugar", &args.fasting_blood_sugar),
        ("pre_dinner_sugar", &args.pre_dinner_sugar),
        ("post_dinner_sugar", &args.post_dinner_sugar),
        ("waist_size", &args.waist_size),
        ("weight", &args.weight),
        ("fat_percentage", &args.fat_percentage),
        ("blood_pressure_systolic", &args.bp_systolic),
        ("blood_pressure_diastolic", &args.bp_diastolic),
        ("grip_strength_left", &args.grip_left),
        ("grip_strength_right", &args.grip_right),
    ];

    if measurements.iter().any(|(_, raw)| raw.is_some()) {
        let interval = config.measure_interval();
        if interval > 1 {
            let all = store.list_all().await?;
            if !measurements_allowed(interval, &all, &date) {
                return Err(anyhow::anyhow!(
                    "Measurements are locked on {} (every {} days from the earliest stored date)",
                    date,
                    interval
                ));
            }
        }
    }
    for (field, raw) in measurements {
        if let Some(raw) = raw {
            // Blank or invalid input clears the field rather than storing zero.
            match parse_measurement(raw) {
                Some(value) => draft.measurements.insert(field.to_string(), value),
                None => draft.measurements.remove(field),
            };
        }
    }

    if let Some(time) = &args.breakfast_time {
        draft.meals.breakfast.time = time.clone();
    }
    if let Some(text) = &args.breakfast {
        draft.meals.breakfast.text = text.clone();
    }
    if let Some(time) = &args.lunch_time {
        draft.meals.lunch.time = time.clone();
    }
    if let Some(text) = &args.lunch {
        draft.meals.lunch.text = text.clone();
    }
    if let Some(time) = &args.dinner_time {
        draft.meals.dinner.time = time.clone();
    }
    if let Some(text) = &args.dinner {
        draft.meals.dinner.text = text.clone();
    }
    if let Some(notes) = &args.notes {
        draft.notes = notes.clone();
    }

    let merged = draft.apply(base);
    if is_new && merged.is_empty() {
        if !cli.quiet {
            println!("Nothing to store for {}", date);
        }
        return Ok(());
    }

    store.put(&merged).await?;

    if !cli.quiet {
        println!("Saved {}", date);
        let totals = store_totals(&store.list_all().await?);
        println!(
            "{} record{} stored",
            totals.records,
            if totals.records == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn ensure_supplement(id: &str) -> anyhow::Result<()> {
    if catalog::supplement_ids().any(|known| known == id) {
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "Unknown supplement \"{}\" (known: {})",
        id,
        catalog::supplement_ids().collect::<Vec<_>>().join(", ")
    ))
}

fn ensure_exercise(id: &str) -> anyhow::Result<()> {
    if catalog::exercise_ids().any(|known| known == id) {
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "Unknown exercise \"{}\" (known: {})",
        id,
        catalog::exercise_ids().collect::<Vec<_>>().join(", ")
    ))
}
