//! Offline cleaning of a raw CSV export into the enhanced dataset.
//!
//! One-shot preprocessing, run before the dashboard ever sees the data:
//!
//! - `Amount` / `Profit` / `Avg Order Value` coerced to numbers; rows with an
//!   unparseable `Amount`/`Profit` or a blank `CustomerName` are dropped
//! - `Quantity` coerced to an integer, blank/bad values become 0
//! - `State` / `City` / `Category` trimmed and title-cased
//! - exact duplicate rows (identical across all columns) collapsed to one
//!
//! All other columns pass through untouched, in their original order.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// Columns the raw export must carry for cleaning to make sense.
const RAW_REQUIRED: [&str; 8] = [
    "amount",
    "profit",
    "avg order value",
    "customername",
    "quantity",
    "state",
    "city",
    "category",
];

/// What happened during one cleaning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub duplicates_removed: usize,
}

/// Clean `input` and write the enhanced dataset to `output`.
pub fn clean_csv(input: &Path, output: &Path) -> Result<CleanSummary, AppError> {
    let file = File::open(input).map_err(|e| {
        AppError::input(format!("Failed to open raw CSV '{}': {e}", input.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read raw CSV headers: {e}")))?
        .clone();

    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().trim_start_matches('\u{feff}');
            (name.to_ascii_lowercase(), idx)
        })
        .collect();

    for name in RAW_REQUIRED {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!(
                "Raw CSV is missing required column: `{name}`"
            )));
        }
    }

    let out_file = File::create(output).map_err(|e| {
        AppError::input(format!("Failed to create cleaned CSV '{}': {e}", output.display()))
    })?;
    let mut writer = csv::Writer::from_writer(out_file);
    writer
        .write_record(headers.iter().map(|h| h.trim().trim_start_matches('\u{feff}')))
        .map_err(|e| AppError::input(format!("Failed to write cleaned CSV header: {e}")))?;

    let idx_amount = header_map["amount"];
    let idx_profit = header_map["profit"];
    let idx_aov = header_map["avg order value"];
    let idx_customer = header_map["customername"];
    let idx_quantity = header_map["quantity"];
    let title_case_cols: [usize; 3] = [header_map["state"], header_map["city"], header_map["category"]];

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut rows_read = 0usize;
    let mut rows_written = 0usize;
    let mut rows_dropped = 0usize;
    let mut duplicates_removed = 0usize;

    for result in reader.records() {
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(_) => {
                rows_dropped += 1;
                continue;
            }
        };

        let Some(row) = clean_row(
            &record,
            headers.len(),
            idx_amount,
            idx_profit,
            idx_aov,
            idx_customer,
            idx_quantity,
            &title_case_cols,
        ) else {
            rows_dropped += 1;
            continue;
        };

        // Dedupe on the transformed row so "Karachi" and " karachi "
        // duplicates collapse together.
        if !seen.insert(row.clone()) {
            duplicates_removed += 1;
            continue;
        }

        writer
            .write_record(&row)
            .map_err(|e| AppError::input(format!("Failed to write cleaned CSV row: {e}")))?;
        rows_written += 1;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush cleaned CSV: {e}")))?;

    Ok(CleanSummary {
        rows_read,
        rows_written,
        rows_dropped,
        duplicates_removed,
    })
}

#[allow(clippy::too_many_arguments)]
fn clean_row(
    record: &StringRecord,
    width: usize,
    idx_amount: usize,
    idx_profit: usize,
    idx_aov: usize,
    idx_customer: usize,
    idx_quantity: usize,
    title_case_cols: &[usize],
) -> Option<Vec<String>> {
    let get = |idx: usize| record.get(idx).unwrap_or("").trim();

    // Required numeric fields: unparseable means the row is dropped.
    let amount = parse_num(get(idx_amount))?;
    let profit = parse_num(get(idx_profit))?;

    if get(idx_customer).is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(width);
    for idx in 0..width {
        let raw = get(idx);
        let cell = if idx == idx_amount {
            fmt_num(amount)
        } else if idx == idx_profit {
            fmt_num(profit)
        } else if idx == idx_aov {
            parse_num(raw).map(fmt_num).unwrap_or_default()
        } else if idx == idx_quantity {
            // Coerced to an integer count; bad or blank values become 0.
            parse_num(raw).map_or(0, |v| v as i64).to_string()
        } else if title_case_cols.contains(&idx) {
            title_case(raw)
        } else {
            raw.to_string()
        };
        out.push(cell);
    }

    Some(out)
}

fn parse_num(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.1}", v)
    } else {
        format!("{v}")
    }
}

/// Title-case a trimmed string: each letter run starts uppercase, the rest
/// lowercase (matches the behavior the upstream spreadsheets expect, e.g.
/// `" new york "` → `"New York"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const RAW_HEADER: &str =
        "Order Date,Month-Year,Category,City,CustomerName,State,Amount,Profit,Quantity,Total Orders,Avg Order Value";

    fn run_clean(body: &str) -> (CleanSummary, String) {
        let mut input = std::env::temp_dir();
        input.push(format!(
            "sales_pulse_clean_in_{}_{}.csv",
            std::process::id(),
            body.len()
        ));
        let mut output = std::env::temp_dir();
        output.push(format!(
            "sales_pulse_clean_out_{}_{}.csv",
            std::process::id(),
            body.len()
        ));

        let mut f = File::create(&input).unwrap();
        writeln!(f, "{RAW_HEADER}").unwrap();
        write!(f, "{body}").unwrap();
        drop(f);

        let summary = clean_csv(&input, &output).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
        (summary, text)
    }

    #[test]
    fn unparseable_amount_drops_the_row() {
        let (summary, text) = run_clean(
            "2024-01-05,Jan-2024,Electronics,Karachi,Ali,Sindh,abc,30.0,2,1,120.5\n\
             2024-01-09,Jan-2024,Clothing,Lahore,Sara,Punjab,80.0,12.5,1,1,80.0\n",
        );
        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.rows_dropped, 1);
        assert!(!text.contains("Ali"));
        assert!(text.contains("Sara"));
    }

    #[test]
    fn city_is_trimmed_and_title_cased() {
        let (_, text) = run_clean(
            "2024-01-05,Jan-2024,electronics, karachi ,Ali,sindh,120.5,30.0,2,1,120.5\n",
        );
        assert!(text.contains("Karachi"));
        assert!(text.contains("Electronics"));
        assert!(text.contains("Sindh"));
        assert!(!text.contains(" karachi "));
    }

    #[test]
    fn exact_duplicates_collapse_to_one() {
        let (summary, _) = run_clean(
            "2024-01-05,Jan-2024,Electronics,Karachi,Ali,Sindh,120.5,30.0,2,1,120.5\n\
             2024-01-05,Jan-2024,Electronics,Karachi,Ali,Sindh,120.5,30.0,2,1,120.5\n",
        );
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.duplicates_removed, 1);
    }

    #[test]
    fn blank_quantity_becomes_zero() {
        let (_, text) = run_clean(
            "2024-01-05,Jan-2024,Electronics,Karachi,Ali,Sindh,120.5,30.0,,1,120.5\n",
        );
        let data_line = text.lines().nth(1).unwrap();
        assert_eq!(data_line.split(',').nth(8).unwrap(), "0");
    }

    #[test]
    fn blank_customer_name_drops_the_row() {
        let (summary, _) = run_clean(
            "2024-01-05,Jan-2024,Electronics,Karachi,,Sindh,120.5,30.0,2,1,120.5\n",
        );
        assert_eq!(summary.rows_written, 0);
        assert_eq!(summary.rows_dropped, 1);
    }

    #[test]
    fn title_case_handles_multi_word_values() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("KARACHI"), "Karachi");
        assert_eq!(title_case("sao-paulo"), "Sao-Paulo");
    }
}
