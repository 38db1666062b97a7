//! Exports: filtered-view CSV and forecast JSON.
//!
//! The CSV export mirrors the input column layout exactly so a downloaded
//! view can be re-ingested or opened in a spreadsheet without surprises.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{FilterSelection, ForecastSeries, SaleRecord};
use crate::error::AppError;

/// Column layout shared by the input dataset and the export.
pub const EXPORT_HEADER: [&str; 11] = [
    "Order Date",
    "Month-Year",
    "Category",
    "City",
    "CustomerName",
    "State",
    "Amount",
    "Profit",
    "Quantity",
    "Total Orders",
    "Avg Order Value",
];

/// Write the filtered view to a CSV file (UTF-8, comma-delimited, header row).
pub fn write_filtered_csv(path: &Path, records: &[SaleRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(EXPORT_HEADER)
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.order_date.format("%Y-%m-%d").to_string(),
                r.month_year.clone(),
                r.category.clone(),
                r.city.clone(),
                r.customer_name.clone(),
                r.state.clone(),
                format_amount(r.amount),
                format_amount(r.profit),
                r.quantity.to_string(),
                r.total_orders.to_string(),
                r.avg_order_value.map(format_amount).unwrap_or_default(),
            ])
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

/// A saved forecast file (JSON): the portable representation of one forecast
/// run (filters + observed/projected points + model diagnostics).
#[derive(Debug, Clone, Serialize)]
pub struct ForecastFile<'a> {
    pub tool: &'static str,
    pub filters: &'a FilterSelection,
    #[serde(flatten)]
    pub series: &'a ForecastSeries,
}

/// Write a forecast JSON file.
pub fn write_forecast_json(
    path: &Path,
    series: &ForecastSeries,
    filters: &FilterSelection,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create forecast JSON '{}': {e}", path.display()))
    })?;

    let out = ForecastFile {
        tool: "pulse",
        filters,
        series,
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::input(format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Currency-style formatting without trailing float noise.
fn format_amount(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.1}", v)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(city: &str, amount: f64) -> SaleRecord {
        SaleRecord {
            order_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            month_year: "Jan-2024".to_string(),
            category: "Electronics".to_string(),
            city: city.to_string(),
            customer_name: "Ali".to_string(),
            state: "Sindh".to_string(),
            amount,
            profit: 10.0,
            quantity: 1,
            total_orders: 1,
            avg_order_value: Some(amount),
        }
    }

    #[test]
    fn export_roundtrips_through_ingest() {
        let mut path = std::env::temp_dir();
        path.push(format!("sales_pulse_export_test_{}.csv", std::process::id()));

        let records = vec![record("Karachi", 120.5), record("Lahore", 80.0)];
        write_filtered_csv(&path, &records).unwrap();

        let ds = crate::io::ingest::load_dataset(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.records, records);
        assert!(ds.row_errors.is_empty());
    }

    #[test]
    fn amounts_keep_a_decimal_point() {
        assert_eq!(format_amount(80.0), "80.0");
        assert_eq!(format_amount(120.5), "120.5");
    }
}
