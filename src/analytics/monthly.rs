//! Monthly resampling of the daily sales series.
//!
//! Convention (fixed and documented): months are naive calendar months (the
//! dataset carries dates, not instants, so no timezone applies), keyed by the
//! first day of the month. Interior months with no records are zero-filled so
//! the grid is contiguous from the first to the last observed month, matching
//! a `resample('M').sum()` over the same data.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::{MonthlyTotal, SaleRecord};

/// First day of the calendar month containing `date`.
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    // `with_day(1)` cannot fail for day 1 of an existing month.
    date.with_day(1).unwrap_or(date)
}

/// The first day of the month `n` months after `month` (itself a month floor).
pub fn add_months(month: NaiveDate, n: u32) -> NaiveDate {
    month
        .checked_add_months(Months::new(n))
        .unwrap_or(month)
}

/// Group records by calendar date, sum amounts, and resample onto the
/// contiguous monthly grid.
///
/// An empty view produces an empty series (the forecaster treats it as
/// insufficient data).
pub fn monthly_sales(records: &[SaleRecord]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *buckets.entry(month_floor(r.order_date)).or_insert(0.0) += r.amount;
    }

    let (Some((&first, _)), Some((&last, _))) = (buckets.first_key_value(), buckets.last_key_value())
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut month = first;
    while month <= last {
        out.push(MonthlyTotal {
            month,
            total: buckets.get(&month).copied().unwrap_or(0.0),
        });
        month = add_months(month, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, amount: f64) -> SaleRecord {
        SaleRecord {
            order_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            month_year: format!("{m:02}-{y}"),
            category: "A".to_string(),
            city: "Karachi".to_string(),
            customer_name: "X".to_string(),
            state: "S".to_string(),
            amount,
            profit: 0.0,
            quantity: 1,
            total_orders: 1,
            avg_order_value: None,
        }
    }

    #[test]
    fn sums_days_into_their_month() {
        let records = vec![
            record(2024, 1, 5, 100.0),
            record(2024, 1, 28, 50.0),
            record(2024, 2, 2, 75.0),
        ];
        let series = monthly_sales(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!((series[0].total - 150.0).abs() < 1e-9);
        assert!((series[1].total - 75.0).abs() < 1e-9);
    }

    #[test]
    fn interior_gap_months_are_zero_filled() {
        let records = vec![record(2024, 1, 5, 100.0), record(2024, 4, 2, 75.0)];
        let series = monthly_sales(&records);
        assert_eq!(series.len(), 4);
        assert_eq!(series[1].month, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(series[1].total, 0.0);
        assert_eq!(series[2].total, 0.0);
    }

    #[test]
    fn empty_view_gives_empty_series() {
        assert!(monthly_sales(&[]).is_empty());
    }

    #[test]
    fn add_months_rolls_over_year_boundaries() {
        let nov = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        assert_eq!(add_months(nov, 2), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
