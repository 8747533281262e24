//! Interactive editing session with autosave.
//!
//! Reads field commands from stdin, one per line; every accepted edit marks
//! the autosave controller dirty, and the debounced save runs in the
//! background exactly as it would under a form UI. `quit` (or EOF) flushes
//! before exiting so nothing typed is lost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use daylog_core::autosave::{Autosave, DraftSource, SaveState, SaveStatus};
use daylog_core::catalog;
use daylog_core::record::{DailyLog, LogDraft, NUMERIC_FIELDS};
use daylog_core::summary::log_summary;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex as AsyncMutex;

use crate::cli::{Cli, EditArgs};
use crate::commands::{open_store, resolve_date};
use crate::config::DaylogConfig;
use crate::measure::measurements_allowed;

/// The editing surface handed to the autosave controller.
struct EditForm {
    date: String,
    draft: Mutex<LogDraft>,
}

impl EditForm {
    fn new(date: &str) -> Self {
        EditForm {
            date: date.to_string(),
            draft: Mutex::new(LogDraft::default()),
        }
    }

    fn replace(&self, draft: LogDraft) {
        *self.lock() = draft;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogDraft> {
        match self.draft.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DraftSource for EditForm {
    fn active_date(&self) -> String {
        self.date.clone()
    }

    fn snapshot(&self) -> LogDraft {
        self.lock().clone()
    }
}

/// One line of the editing protocol.
#[derive(Debug, Clone, PartialEq)]
enum EditCmd {
    Supplement(String, bool),
    Exercise(String, bool),
    Fasted(bool),
    WaterFasted(bool),
    CustomName(String),
    CustomTaken(bool),
    Measurement(String, Option<f64>),
    Meal(MealSlotId, Option<String>, String),
    Notes(String),
    Show,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MealSlotId {
    Breakfast,
    Lunch,
    Dinner,
}

const HELP: &str = "\
commands:
  supp <id> [on|off]        mark a supplement taken
  ex <id> [on|off]          mark an exercise done
  fasted [on|off]           fasting flag
  waterfast [on|off]        water-fasting flag
  vitamin <name>            custom vitamin name ('vitamin' alone clears)
  taken [on|off]            custom vitamin taken flag
  set <field> [value]       measurement ('set weight 70.5'; no value clears)
  meal <slot> [HH:MM] <txt> breakfast/lunch/dinner
  note <text>               day notes
  show                      current values
  save                      save now
  quit                      flush and exit";

pub async fn handle_edit(cli: &Cli, config: &DaylogConfig, args: &EditArgs) -> anyhow::Result<()> {
    let date = resolve_date(args.date.as_deref())?;
    let store = Arc::new(AsyncMutex::new(open_store(cli, config).await?));
    let form = Arc::new(EditForm::new(&date));
    let autosave = Autosave::new(
        store.clone(),
        form.clone(),
        Duration::from_millis(config.autosave.debounce_ms),
    );

    // Populate the form from storage; hydration must not look like edits.
    autosave.begin_hydration();
    {
        let mut store = store.lock().await;
        let existing = store.get(&date).await?;
        form.replace(LogDraft::from_log(
            &existing.unwrap_or_else(|| DailyLog::empty(&date)),
        ));
    }
    autosave.end_hydration();

    let interval = config.measure_interval();
    let measurements_open = if interval > 1 {
        let all = store.lock().await.list_all().await?;
        measurements_allowed(interval, &all, &date)
    } else {
        true
    };

    if !cli.quiet {
        println!("Editing {} (autosave on, 'help' lists commands)", date);
        if !measurements_open {
            println!("Measurement inputs are locked on this date.");
        }
    }

    // Echo save acknowledgements as they happen.
    let mut status = autosave.status();
    let quiet = cli.quiet;
    let ack = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            if *status.borrow() == SaveStatus::Saved && !quiet {
                println!("saved");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_cmd(&line) {
            Ok(None) => {}
            Ok(Some(EditCmd::Quit)) => break,
            Ok(Some(EditCmd::Help)) => println!("{}", HELP),
            Ok(Some(EditCmd::Save)) => autosave.flush().await,
            Ok(Some(EditCmd::Show)) => print_draft(&form),
            Ok(Some(cmd)) => {
                if apply_cmd(&form, cmd, measurements_open) {
                    autosave.mark_dirty();
                }
            }
            Err(msg) => eprintln!("{}", msg),
        }
    }

    // Flush whatever is still pending and let a coalesced follow-up settle.
    autosave.flush().await;
    while autosave.state() != SaveState::Idle {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    ack.abort();
    Ok(())
}

/// Apply one command to the form. Returns whether anything changed.
fn apply_cmd(form: &EditForm, cmd: EditCmd, measurements_open: bool) -> bool {
    let mut draft = form.lock();
    match cmd {
        EditCmd::Supplement(id, on) => {
            if !catalog::supplement_ids().any(|known| known == id) {
                eprintln!("unknown supplement \"{}\"", id);
                return false;
            }
            draft.supplements.insert(id, on);
        }
        EditCmd::Exercise(id, on) => {
            if !catalog::exercise_ids().any(|known| known == id) {
                eprintln!("unknown exercise \"{}\"", id);
                return false;
            }
            draft.exercises.insert(id, on);
        }
        EditCmd::Fasted(on) => draft.fasted = on,
        EditCmd::WaterFasted(on) => draft.water_fasted = on,
        EditCmd::CustomName(name) => draft.custom_vitamin_name = name,
        EditCmd::CustomTaken(on) => draft.custom_vitamin_taken = on,
        EditCmd::Measurement(field, value) => {
            if !measurements_open {
                eprintln!("measurements are locked on this date");
                return false;
            }
            match value {
                Some(v) => draft.measurements.insert(field, v),
                None => draft.measurements.remove(&field),
            };
        }
        EditCmd::Meal(slot, time, text) => {
            let slot = match slot {
                MealSlotId::Breakfast => &mut draft.meals.breakfast,
                MealSlotId::Lunch => &mut draft.meals.lunch,
                MealSlotId::Dinner => &mut draft.meals.dinner,
            };
            if let Some(time) = time {
                slot.time = time;
            }
            slot.text = text;
        }
        EditCmd::Notes(text) => draft.notes = text,
        EditCmd::Show | EditCmd::Save | EditCmd::Help | EditCmd::Quit => return false,
    }
    true
}

fn print_draft(form: &EditForm) {
    let draft = form.snapshot();
    let preview = draft.apply(DailyLog::empty(&form.active_date()));
    let summary = log_summary(&preview);
    println!(
        "{}: {} supplements, {} exercises, fasting: {}",
        preview.date,
        summary.supplements_taken,
        summary.exercises_done,
        if summary.any_fasting { "Yes" } else { "--" }
    );
    for field in NUMERIC_FIELDS {
        if let Some(value) = preview.numeric(field) {
            println!("  {} = {}", field, value);
        }
    }
    if !preview.notes.is_empty() {
        println!("  notes: {}", preview.notes);
    }
}

/// Parse one input line. `Ok(None)` is a blank line.
fn parse_cmd(line: &str) -> Result<Option<EditCmd>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word {
        "supp" => {
            let (id, on) = split_toggle(rest)?;
            if id.is_empty() {
                return Err("usage: supp <id> [on|off]".to_string());
            }
            EditCmd::Supplement(id.to_string(), on)
        }
        "ex" => {
            let (id, on) = split_toggle(rest)?;
            if id.is_empty() {
                return Err("usage: ex <id> [on|off]".to_string());
            }
            EditCmd::Exercise(id.to_string(), on)
        }
        "fasted" => EditCmd::Fasted(parse_toggle(rest)?),
        "waterfast" => EditCmd::WaterFasted(parse_toggle(rest)?),
        "vitamin" => EditCmd::CustomName(rest.to_string()),
        "taken" => EditCmd::CustomTaken(parse_toggle(rest)?),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((f, v)) => (f, v.trim()),
                None => (rest, ""),
            };
            if !NUMERIC_FIELDS.contains(&field) {
                return Err(format!(
                    "unknown field \"{}\" (fields: {})",
                    field,
                    NUMERIC_FIELDS.join(", ")
                ));
            }
            EditCmd::Measurement(field.to_string(), daylog_core::record::parse_measurement(value))
        }
        "meal" => {
            let (slot, rest) = match rest.split_once(char::is_whitespace) {
                Some((s, r)) => (s, r.trim()),
                None => (rest, ""),
            };
            let slot = match slot {
                "breakfast" => MealSlotId::Breakfast,
                "lunch" => MealSlotId::Lunch,
                "dinner" => MealSlotId::Dinner,
                other => return Err(format!("unknown meal slot \"{}\"", other)),
            };
            // A leading HH:MM token is the meal time; the rest is the text.
            let (time, text) = match rest.split_once(char::is_whitespace) {
                Some((first, tail)) if first.contains(':') => {
                    (Some(first.to_string()), tail.trim().to_string())
                }
                _ if rest.contains(':') && !rest.contains(' ') => {
                    (Some(rest.to_string()), String::new())
                }
                _ => (None, rest.to_string()),
            };
            EditCmd::Meal(slot, time, text)
        }
        "note" | "notes" => EditCmd::Notes(rest.to_string()),
        "show" => EditCmd::Show,
        "save" => EditCmd::Save,
        "help" => EditCmd::Help,
        "quit" | "exit" => EditCmd::Quit,
        other => return Err(format!("unknown command \"{}\" ('help' lists commands)", other)),
    };
    Ok(Some(cmd))
}

fn split_toggle(rest: &str) -> Result<(&str, bool), String> {
    match rest.rsplit_once(char::is_whitespace) {
        Some((id, toggle)) if toggle == "on" || toggle == "off" => {
            Ok((id.trim(), toggle == "on"))
        }
        _ => Ok((rest, true)),
    }
}

fn parse_toggle(rest: &str) -> Result<bool, String> {
    match rest {
        "" | "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected on or off, got \"{}\"", other)),
    }
}
