//! Filter engine: equality-membership predicates over the dataset.
//!
//! The contract is small on purpose: given the dataset and a
//! `FilterSelection`, produce the filtered view. Dimensions with an empty
//! selection impose no constraint; an empty result is valid and every
//! downstream consumer must handle it (zero KPIs, empty charts, skipped
//! forecast).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{FilterSelection, SaleRecord};

/// Apply the selection and return the filtered view.
///
/// The view is an owned snapshot: it is recomputed on every render cycle and
/// has no identity beyond it.
pub fn filter_records(records: &[SaleRecord], selection: &FilterSelection) -> Vec<SaleRecord> {
    if selection.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect()
}

/// Distinct values offered by the filter UI, one list per dimension.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    /// Month-year labels in chronological order.
    pub months: Vec<String>,
    /// Categories, ascending.
    pub categories: Vec<String>,
    /// Cities, ascending.
    pub cities: Vec<String>,
}

/// Collect the distinct filterable values present in the dataset.
pub fn build_catalog(records: &[SaleRecord]) -> FilterCatalog {
    // Month labels are ordered by the earliest order date carrying each label,
    // not lexicographically ("Apr-2024" must not sort before "Jan-2024").
    let mut month_first_seen: BTreeMap<String, NaiveDate> = BTreeMap::new();
    let mut categories: BTreeMap<String, ()> = BTreeMap::new();
    let mut cities: BTreeMap<String, ()> = BTreeMap::new();

    for r in records {
        month_first_seen
            .entry(r.month_year.clone())
            .and_modify(|d| *d = (*d).min(r.order_date))
            .or_insert(r.order_date);
        categories.entry(r.category.clone()).or_insert(());
        cities.entry(r.city.clone()).or_insert(());
    }

    let mut months: Vec<(String, NaiveDate)> = month_first_seen.into_iter().collect();
    months.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    FilterCatalog {
        months: months.into_iter().map(|(label, _)| label).collect(),
        categories: categories.into_keys().collect(),
        cities: cities.into_keys().collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(month: &str, day: u32, category: &str, city: &str) -> SaleRecord {
        let (mon, year) = match month {
            "Jan-2024" => (1, 2024),
            "Feb-2024" => (2, 2024),
            "Mar-2024" => (3, 2024),
            _ => panic!("unknown month label"),
        };
        SaleRecord {
            order_date: NaiveDate::from_ymd_opt(year, mon, day).unwrap(),
            month_year: month.to_string(),
            category: category.to_string(),
            city: city.to_string(),
            customer_name: "X".to_string(),
            state: "S".to_string(),
            amount: 100.0,
            profit: 10.0,
            quantity: 1,
            total_orders: 1,
            avg_order_value: None,
        }
    }

    #[test]
    fn empty_selection_passes_everything_through() {
        let records = vec![
            record("Jan-2024", 5, "Electronics", "Karachi"),
            record("Feb-2024", 9, "Clothing", "Lahore"),
        ];
        let view = filter_records(&records, &FilterSelection::default());
        assert_eq!(view, records);
    }

    #[test]
    fn dimensions_and_together_values_or_together() {
        let records = vec![
            record("Jan-2024", 5, "Electronics", "Karachi"),
            record("Jan-2024", 9, "Clothing", "Lahore"),
            record("Feb-2024", 3, "Electronics", "Lahore"),
            record("Feb-2024", 7, "Clothing", "Karachi"),
        ];

        let mut selection = FilterSelection::default();
        selection.months.insert("Jan-2024".to_string());
        selection.cities.insert("Karachi".to_string());
        selection.cities.insert("Lahore".to_string());

        let view = filter_records(&records, &selection);
        // Month constrains (AND), both cities pass (OR within the dimension).
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.month_year == "Jan-2024"));
    }

    #[test]
    fn disjoint_selection_yields_empty_view() {
        let records = vec![record("Jan-2024", 5, "Electronics", "Karachi")];
        let mut selection = FilterSelection::default();
        selection.months.insert("Jan-2024".to_string());
        selection.categories.insert("Furniture".to_string());

        let view = filter_records(&records, &selection);
        assert!(view.is_empty());
    }

    #[test]
    fn every_view_record_comes_from_the_dataset() {
        let records = vec![
            record("Jan-2024", 5, "Electronics", "Karachi"),
            record("Feb-2024", 9, "Clothing", "Lahore"),
            record("Mar-2024", 1, "Clothing", "Karachi"),
        ];
        let mut selection = FilterSelection::default();
        selection.categories.insert("Clothing".to_string());

        let view = filter_records(&records, &selection);
        assert!(view.iter().all(|v| records.contains(v)));
        for r in &records {
            let expected = selection.matches(r);
            assert_eq!(view.contains(r), expected);
        }
    }

    #[test]
    fn catalog_orders_months_chronologically() {
        let records = vec![
            record("Mar-2024", 1, "B", "Lahore"),
            record("Jan-2024", 5, "A", "Karachi"),
            record("Feb-2024", 9, "C", "Karachi"),
        ];
        let catalog = build_catalog(&records);
        assert_eq!(catalog.months, vec!["Jan-2024", "Feb-2024", "Mar-2024"]);
        assert_eq!(catalog.categories, vec!["A", "B", "C"]);
        assert_eq!(catalog.cities, vec!["Karachi", "Lahore"]);
    }
}
