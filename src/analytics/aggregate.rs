//! Group-by-and-sum aggregation and KPI computation.

use std::collections::BTreeMap;

use crate::domain::{GroupKey, GroupTotal, Kpis, Measure, SaleRecord};

/// Sum `measure` per distinct value of `key`.
///
/// Output ordering is descending by summed value; ties break by ascending key
/// so results are reproducible across runs.
pub fn sum_by(records: &[SaleRecord], key: GroupKey, measure: Measure) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        let k = match key {
            GroupKey::Category => r.category.as_str(),
            GroupKey::City => r.city.as_str(),
            GroupKey::MonthYear => r.month_year.as_str(),
        };
        *totals.entry(k).or_insert(0.0) += measure.value_of(r);
    }

    let mut out: Vec<GroupTotal> = totals
        .into_iter()
        .map(|(key, total)| GroupTotal {
            key: key.to_string(),
            total,
        })
        .collect();

    // BTreeMap iteration already gives ascending keys, so a stable sort by
    // descending total preserves the ascending-key tie-break.
    out.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Keep the first `n` groups of an already-ranked aggregation.
///
/// `n` larger than the number of groups returns all of them.
pub fn top_n(mut totals: Vec<GroupTotal>, n: usize) -> Vec<GroupTotal> {
    totals.truncate(n);
    totals
}

/// Headline metrics over the filtered view.
///
/// An empty view yields all-zero KPIs; a zero order count makes the average
/// order value 0 rather than an error or NaN.
pub fn compute_kpis(records: &[SaleRecord]) -> Kpis {
    let total_sales: f64 = records.iter().map(|r| r.amount).sum();
    let total_profit: f64 = records.iter().map(|r| r.profit).sum();
    let total_orders: i64 = records.iter().map(|r| r.total_orders).sum();

    let avg_order_value = if total_orders == 0 {
        0.0
    } else {
        total_sales / total_orders as f64
    };

    Kpis {
        total_sales,
        total_profit,
        total_orders,
        avg_order_value,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(category: &str, city: &str, amount: f64, orders: i64) -> SaleRecord {
        SaleRecord {
            order_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            month_year: "Jan-2024".to_string(),
            category: category.to_string(),
            city: city.to_string(),
            customer_name: "X".to_string(),
            state: "S".to_string(),
            amount,
            profit: amount / 4.0,
            quantity: 1,
            total_orders: orders,
            avg_order_value: None,
        }
    }

    #[test]
    fn sums_are_exact_across_groups() {
        let records = vec![
            record("Electronics", "Karachi", 120.5, 1),
            record("Clothing", "Lahore", 80.0, 1),
            record("Electronics", "Lahore", 19.5, 1),
        ];

        let totals = sum_by(&records, GroupKey::Category, Measure::Amount);
        let grouped: f64 = totals.iter().map(|g| g.total).sum();
        let direct: f64 = records.iter().map(|r| r.amount).sum();
        assert!((grouped - direct).abs() < 1e-9);

        assert_eq!(totals[0].key, "Electronics");
        assert!((totals[0].total - 140.0).abs() < 1e-9);
    }

    #[test]
    fn top_n_ranks_descending_with_ascending_key_tie_break() {
        let records = vec![
            record("A", "Zed", 50.0, 1),
            record("A", "Alpha", 50.0, 1),
            record("A", "Mid", 75.0, 1),
        ];

        let totals = sum_by(&records, GroupKey::City, Measure::Amount);
        assert_eq!(totals[0].key, "Mid");
        // Tie between Alpha and Zed resolves lexicographically.
        assert_eq!(totals[1].key, "Alpha");
        assert_eq!(totals[2].key, "Zed");

        let top = top_n(totals.clone(), 2);
        assert_eq!(top.len(), 2);

        // N larger than the group count returns everything.
        let all = top_n(totals, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn kpis_on_empty_view_are_zero() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.total_profit, 0.0);
        assert_eq!(kpis.total_orders, 0);
        assert_eq!(kpis.avg_order_value, 0.0);
    }

    #[test]
    fn zero_orders_gives_zero_average_not_nan() {
        let records = vec![record("A", "Karachi", 100.0, 0)];
        let kpis = compute_kpis(&records);
        assert_eq!(kpis.avg_order_value, 0.0);
        assert!(kpis.avg_order_value.is_finite());
    }

    #[test]
    fn average_order_value_divides_sales_by_orders() {
        let records = vec![
            record("A", "Karachi", 100.0, 2),
            record("B", "Lahore", 50.0, 3),
        ];
        let kpis = compute_kpis(&records);
        assert!((kpis.avg_order_value - 30.0).abs() < 1e-9);
    }
}
