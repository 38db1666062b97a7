//! Enhanced-dataset CSV ingest and normalization.
//!
//! This module turns the cleaned e-commerce CSV into an in-memory `Dataset`
//! that is safe to filter, aggregate, and forecast.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Load once**: the dataset is immutable for the session after this call

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::SaleRecord;
use crate::error::AppError;

/// Columns every enhanced dataset must carry.
///
/// `Avg Order Value` is produced by the cleaning step but tolerated as
/// missing here since older exports predate it.
const REQUIRED_COLUMNS: [&str; 10] = [
    "order date",
    "month-year",
    "category",
    "city",
    "amount",
    "profit",
    "total orders",
    "customername",
    "state",
    "quantity",
];

/// Summary stats about the records actually loaded.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
    pub total_sales: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized records + stats + row errors.
///
/// Loaded once at startup and treated as read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<SaleRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize the enhanced dataset CSV.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open dataset '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records).ok_or_else(|| {
        AppError::new(3, "No valid rows remain after normalization.")
    })?;

    Ok(Dataset {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Order Date"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SaleRecord, String> {
    let order_date = parse_date(get_required(record, header_map, "order date")?)?;
    let month_year = get_required(record, header_map, "month-year")?.to_string();
    let category = get_required(record, header_map, "category")?.to_string();
    let city = get_required(record, header_map, "city")?.to_string();
    let customer_name = get_required(record, header_map, "customername")?.to_string();
    let state = get_required(record, header_map, "state")?.to_string();

    let amount = parse_f64(get_required(record, header_map, "amount")?, "amount")?;
    let profit = parse_f64(get_required(record, header_map, "profit")?, "profit")?;

    let quantity = parse_i64(get_required(record, header_map, "quantity")?, "quantity")?;
    let total_orders = parse_i64(get_required(record, header_map, "total orders")?, "total orders")?;

    let avg_order_value = parse_opt_f64(get_optional(record, header_map, "avg order value"));

    Ok(SaleRecord {
        order_date,
        month_year,
        category,
        city,
        customer_name,
        state,
        amount,
        profit,
        quantity,
        total_orders,
        avg_order_value,
    })
}

fn compute_stats(records: &[SaleRecord]) -> Option<DatasetStats> {
    let mut date_min: Option<NaiveDate> = None;
    let mut date_max: Option<NaiveDate> = None;
    let mut total_sales = 0.0;

    for r in records {
        date_min = Some(date_min.map_or(r.order_date, |d| d.min(r.order_date)));
        date_max = Some(date_max.map_or(r.order_date, |d| d.max(r.order_date)));
        total_sales += r.amount;
    }

    Some(DatasetStats {
        n_records: records.len(),
        date_min: date_min?,
        date_max: date_max?,
        total_sales,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // We recommend ISO dates (`YYYY-MM-DD`), but in practice spreadsheet
    // exports often use `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small set of
    // common formats to reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{s}'."));
    }
    Ok(v)
}

fn parse_i64(s: &str, name: &str) -> Result<i64, String> {
    // Some exports store counts as "3.0"; accept a float and truncate.
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{s}'."));
    }
    Ok(v as i64)
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "Order Date,Month-Year,Category,City,CustomerName,State,Amount,Profit,Quantity,Total Orders,Avg Order Value";

    fn write_temp_csv(body: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "sales_pulse_ingest_test_{}_{}.csv",
            std::process::id(),
            body.len()
        ));
        let mut f = File::create(&path).unwrap();
        writeln!(f, "{HEADER}").unwrap();
        write!(f, "{body}").unwrap();
        path
    }

    #[test]
    fn loads_valid_rows_and_reports_bad_ones() {
        let path = write_temp_csv(
            "2024-01-05,Jan-2024,Electronics,Karachi,Ali,Sindh,120.5,30.0,2,1,120.5\n\
             2024-01-09,Jan-2024,Clothing,Lahore,Sara,Punjab,not-a-number,10.0,1,1,\n\
             2024-02-11,Feb-2024,Clothing,Lahore,Sara,Punjab,80.0,12.5,1,1,80.0\n",
        );

        let ds = load_dataset(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.rows_read, 3);
        assert_eq!(ds.rows_used, 2);
        assert_eq!(ds.row_errors.len(), 1);
        assert_eq!(ds.row_errors[0].line, 3);
        assert_eq!(ds.stats.n_records, 2);
        assert_eq!(ds.stats.date_min, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(ds.stats.date_max, NaiveDate::from_ymd_opt(2024, 2, 11).unwrap());
        assert!((ds.stats.total_sales - 200.5).abs() < 1e-9);
    }

    #[test]
    fn missing_column_is_fatal_with_input_exit_code() {
        let mut path = std::env::temp_dir();
        path.push(format!("sales_pulse_ingest_missing_{}.csv", std::process::id()));
        let mut f = File::create(&path).unwrap();
        writeln!(f, "Order Date,Category,City").unwrap();
        writeln!(f, "2024-01-05,Electronics,Karachi").unwrap();
        drop(f);

        let err = load_dataset(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bom_prefixed_header_is_normalized() {
        assert_eq!(normalize_header_name("\u{feff}Order Date"), "order date");
        assert_eq!(normalize_header_name("  Month-Year "), "month-year");
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let iso = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07").unwrap(), iso);
        assert_eq!(parse_date("07/03/2024").unwrap(), iso);
        assert_eq!(parse_date("07-03-2024").unwrap(), iso);
        assert_eq!(parse_date("2024/03/07").unwrap(), iso);
        assert!(parse_date("March 7, 2024").is_err());
    }

    #[test]
    fn integer_counts_accept_float_spelling() {
        assert_eq!(parse_i64("3", "quantity").unwrap(), 3);
        assert_eq!(parse_i64("3.0", "quantity").unwrap(), 3);
        assert!(parse_i64("three", "quantity").is_err());
    }
}
