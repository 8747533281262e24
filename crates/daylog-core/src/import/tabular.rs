//! Tabular (CSV) import.
//!
//! The parser is deliberately hand-rolled: the files this ingests come from
//! assorted spreadsheet exports, so the contract is delimiter detection
//! (comma vs semicolon, counted in the header line), RFC4180-style quoting
//! with doubled-quote escapes, embedded delimiters and newlines inside
//! quotes, a tolerated UTF-8 BOM, and day-first dates. A row that cannot be
//! dated is skipped and counted, never fatal to the batch.

use std::collections::HashMap;

use crate::catalog;
use crate::date;
use crate::error::{DaylogError, Result};
use crate::import::{ImportOptions, ImportReport};
use crate::record::{DailyLog, NUMERIC_FIELDS};
use crate::storage::Store;

/// Import records from tabular interchange text.
pub async fn import_csv(
    store: &mut Store,
    text: &str,
    options: ImportOptions,
) -> Result<ImportReport> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(DaylogError::Import("CSV file is empty".to_string()));
    }

    let header_line = text.lines().next().unwrap_or("");
    let delim = detect_delimiter(header_line);
    let rows = parse_rows(text, delim);
    if rows.len() < 2 {
        return Err(DaylogError::Import("CSV has no data rows".to_string()));
    }

    // Header names are matched case-sensitively; on duplicates the last
    // column wins.
    let columns: HashMap<String, usize> = rows[0]
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), idx))
        .collect();

    let mut report = ImportReport::default();
    let mut last_date: Option<String> = None;

    for row in &rows[1..] {
        let cell = |name: &str| cell_value(&columns, row, name);

        let blank_row = row.iter().all(|c| c.trim().is_empty());
        if blank_row && !options.auto_date {
            continue;
        }

        let mut date_raw = "";
        for name in ["date", "Date", "DATE"] {
            let value = cell(name);
            if !value.is_empty() {
                date_raw = value;
                break;
            }
        }

        let mut auto_dated = false;
        let mut iso = date::parse_flexible(date_raw);
        if iso.is_none() && options.auto_date {
            if let Some(last) = &last_date {
                iso = date::add_days(last, 1).ok();
                auto_dated = iso.is_some();
            }
        }
        let Some(iso) = iso else {
            report.skipped += 1;
            continue;
        };
        last_date = Some(iso.clone());

        let mut log = DailyLog::empty(&iso);
        let id = cell("id");
        if !id.is_empty() {
            log.id = id.to_string();
        }

        for sid in catalog::supplement_ids() {
            let value = parse_bool_cell(cell(&format!("supp_{}", sid)));
            log.supplements.insert(sid.to_string(), value);
        }
        for eid in catalog::exercise_ids() {
            let value = parse_bool_cell(cell(&format!("ex_{}", eid)));
            log.exercises.insert(eid.to_string(), value);
        }

        log.custom_vitamin_name = cell("custom_vitamin_name").to_string();
        log.custom_vitamin_taken = parse_bool_cell(cell("custom_vitamin_taken"));
        log.fasted = parse_bool_cell(cell("fasted"));
        log.water_fasted = parse_bool_cell(cell("water_fasted"));

        for field in NUMERIC_FIELDS {
            log.set_numeric(field, parse_number_cell(cell(field)));
        }

        store.put(&log).await?;
        report.accepted += 1;
        if auto_dated {
            report.auto_dated += 1;
        }
    }

    Ok(report)
}

/// Look up a row's cell by header name, trimmed; missing columns and short
/// rows read as empty.
fn cell_value<'r>(columns: &HashMap<String, usize>, row: &'r [String], name: &str) -> &'r str {
    columns
        .get(name)
        .and_then(|&idx| row.get(idx))
        .map(|c| c.trim())
        .unwrap_or("")
}

/// Pick the delimiter by counting candidates in the header line.
pub(crate) fn detect_delimiter(header_line: &str) -> char {
    let commas = header_line.matches(',').count();
    let semis = header_line.matches(';').count();
    if semis > commas {
        ';'
    } else {
        ','
    }
}

/// Split text into rows of fields.
///
/// Supports quoted fields, doubled-quote escapes, and delimiters/newlines
/// inside quotes. `\r` outside quotes is dropped, so CRLF files parse the
/// same as LF files. A trailing newline does not produce a phantom row.
pub(crate) fn parse_rows(text: &str, delim: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            c if c == delim => {
                row.push(std::mem::take(&mut field));
            }
            c => field.push(c),
        }
    }

    row.push(field);
    if row.len() > 1 || !row[0].trim().is_empty() {
        rows.push(row);
    }
    rows
}

/// `1`, `true`, or `yes` (case-insensitive); everything else is false.
fn parse_bool_cell(raw: &str) -> bool {
    let v = raw.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

/// Finite number or absent; a comma decimal separator is tolerated.
fn parse_number_cell(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    v.replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_detection_counts_the_header() {
        assert_eq!(detect_delimiter("id,date,weight"), ',');
        assert_eq!(detect_delimiter("id;date;weight"), ';');
        assert_eq!(detect_delimiter("id;date,note;weight"), ';');
        assert_eq!(detect_delimiter("id"), ',');
    }

    #[test]
    fn plain_rows_split_on_the_delimiter() {
        let rows = parse_rows("a,b,c\n1,2,3\n", ',');
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_newlines_and_escaped_quotes() {
        let rows = parse_rows("a,\"x,y\",\"line1\nline2\",\"say \"\"hi\"\"\"\n", ',');
        assert_eq!(
            rows,
            vec![vec!["a", "x,y", "line1\nline2", "say \"hi\""]]
        );
    }

    #[test]
    fn crlf_and_trailing_newline_do_not_add_rows() {
        let rows = parse_rows("a,b\r\n1,2\r\n", ',');
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn blank_lines_become_single_empty_rows() {
        let rows = parse_rows("a,b\n\n1,2\n", ',');
        assert_eq!(rows, vec![vec!["a", "b"], vec![""], vec!["1", "2"]]);
    }

    #[test]
    fn bool_cells() {
        assert!(parse_bool_cell("1"));
        assert!(parse_bool_cell("TRUE"));
        assert!(parse_bool_cell("Yes"));
        assert!(!parse_bool_cell("0"));
        assert!(!parse_bool_cell(""));
        assert!(!parse_bool_cell("y"));
    }

    #[test]
    fn number_cells_tolerate_comma_decimals() {
        assert_eq!(parse_number_cell("70.5"), Some(70.5));
        assert_eq!(parse_number_cell("70,5"), Some(70.5));
        assert_eq!(parse_number_cell(""), None);
        assert_eq!(parse_number_cell("n/a"), None);
    }
}
