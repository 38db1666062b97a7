//! Plain-text report formatting.

use chrono::NaiveDate;

use crate::app::pipeline::RunOutput;
use crate::domain::{
    FilterSelection, ForecastOutcome, GroupTotal, Kpis, PointSource, ReportConfig, SaleRecord,
};
use crate::io::ingest::Dataset;

/// Month label used throughout terminal output (e.g. `Jan-2024`).
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b-%Y").to_string()
}

/// Currency formatting with thousands separators (`$12,345.67`).
pub fn fmt_money(v: f64) -> String {
    let neg = v < 0.0;
    let s = format!("{:.2}", v.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((&s, "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${grouped}.{frac_part}", if neg { "-" } else { "" })
}

/// Format the full dashboard report (KPIs + rankings + preview).
pub fn format_dashboard(dataset: &Dataset, run: &RunOutput, config: &ReportConfig) -> String {
    let mut out = String::new();

    out.push_str("=== pulse - E-Commerce Sales Dashboard ===\n");
    out.push_str(&format!(
        "Dataset: {} rows ({} used, {} skipped) | dates {} .. {}\n",
        dataset.rows_read,
        dataset.rows_used,
        dataset.row_errors.len(),
        dataset.stats.date_min,
        dataset.stats.date_max,
    ));
    out.push_str(&format!("Filters: {}\n", format_filters(&config.filters)));
    out.push_str(&format!("View: {} record(s)\n", run.view.len()));

    out.push('\n');
    out.push_str(&format_kpis(&run.kpis));

    out.push_str("\nMonthly sales trend:\n");
    if run.monthly.is_empty() {
        out.push_str("  (no records)\n");
    } else {
        for m in &run.monthly {
            out.push_str(&format!(
                "  {:<9} {:>14}\n",
                month_label(m.month),
                fmt_money(m.total)
            ));
        }
    }

    out.push_str("\nTop selling categories:\n");
    out.push_str(&format_group_table(&run.top_categories));

    out.push_str(&format!("\nTop {} cities by sales:\n", config.top_cities));
    out.push_str(&format_group_table(&run.top_cities));

    out.push_str(&format!(
        "\nFiltered data preview (first {}):\n",
        config.preview_rows
    ));
    out.push_str(&format_preview(&run.view, config.preview_rows));

    out
}

/// Format the KPI block.
pub fn format_kpis(kpis: &Kpis) -> String {
    format!(
        "Total Sales: {}\nTotal Profit: {}\nTotal Orders: {}\nAverage Order Value: {}\n",
        fmt_money(kpis.total_sales),
        fmt_money(kpis.total_profit),
        kpis.total_orders,
        fmt_money(kpis.avg_order_value),
    )
}

/// One-line summary of the active filters.
pub fn format_filters(filters: &FilterSelection) -> String {
    if filters.is_empty() {
        return "none".to_string();
    }
    let mut parts = Vec::new();
    if !filters.months.is_empty() {
        parts.push(format!("month-year ∈ {}", join_set(&filters.months)));
    }
    if !filters.categories.is_empty() {
        parts.push(format!("category ∈ {}", join_set(&filters.categories)));
    }
    if !filters.cities.is_empty() {
        parts.push(format!("city ∈ {}", join_set(&filters.cities)));
    }
    parts.join(" AND ")
}

/// Format the forecast view (table or the insufficient-data warning).
pub fn format_forecast(outcome: &ForecastOutcome) -> String {
    let mut out = String::new();
    out.push_str("=== pulse - Sales Forecast (next 3 months) ===\n");

    match outcome {
        ForecastOutcome::InsufficientData { observed } => {
            out.push_str(&format!(
                "Warning: not enough data to generate a forecast ({observed} monthly point(s), need at least 2).\n"
            ));
        }
        ForecastOutcome::Forecast(fc) => {
            out.push_str(&format!(
                "Model: Holt additive trend | alpha={:.3} beta={:.3} | sse={:.3} rmse={:.3} (n={})\n\n",
                fc.model.alpha, fc.model.beta, fc.quality.sse, fc.quality.rmse, fc.quality.n,
            ));
            out.push_str(&trimmed_line(format!(
                "{:<9} {:>14} {:<10}",
                "month", "sales", "source"
            )));
            out.push_str(&trimmed_line(format!(
                "{:-<9} {:-<14} {:-<10}",
                "", "", ""
            )));
            for p in &fc.points {
                let source = match p.source {
                    PointSource::Observed => "observed",
                    PointSource::Projected => "projected",
                };
                out.push_str(&trimmed_line(format!(
                    "{:<9} {:>14} {:<10}",
                    month_label(p.month),
                    fmt_money(p.amount),
                    source,
                )));
            }
        }
    }

    out
}

fn format_group_table(groups: &[GroupTotal]) -> String {
    if groups.is_empty() {
        return "  (no records)\n".to_string();
    }
    let mut out = String::new();
    for g in groups {
        out.push_str(&trimmed_line(format!(
            "  {:<24} {:>14}",
            truncate(&g.key, 24),
            fmt_money(g.total),
        )));
    }
    out
}

fn format_preview(records: &[SaleRecord], limit: usize) -> String {
    if records.is_empty() {
        return "  (no records)\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&trimmed_line(format!(
        "  {:<10} {:<9} {:<16} {:<14} {:>12} {:>12} {:>6}",
        "date", "month", "category", "city", "amount", "profit", "qty"
    )));
    for r in records.iter().take(limit) {
        out.push_str(&trimmed_line(format!(
            "  {:<10} {:<9} {:<16} {:<14} {:>12} {:>12} {:>6}",
            r.order_date,
            truncate(&r.month_year, 9),
            truncate(&r.category, 16),
            truncate(&r.city, 14),
            fmt_money(r.amount),
            fmt_money(r.profit),
            r.quantity,
        )));
    }
    if records.len() > limit {
        out.push_str(&format!("  ... {} more row(s)\n", records.len() - limit));
    }
    out
}

fn join_set(values: &std::collections::BTreeSet<String>) -> String {
    format!(
        "{{{}}}",
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    )
}

fn trimmed_line(s: String) -> String {
    let mut out = s.trim_end().to_string();
    out.push('\n');
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use crate::domain::{FitQuality, ForecastPoint, ForecastSeries, HoltModel};

    use super::*;

    #[test]
    fn money_formatting_groups_thousands() {
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(1234.5), "$1,234.50");
        assert_eq!(fmt_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(fmt_money(-42.0), "-$42.00");
    }

    #[test]
    fn month_label_matches_dataset_convention() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(month_label(d), "Mar-2024");
    }

    #[test]
    fn insufficient_data_renders_a_warning_not_a_table() {
        let text = format_forecast(&ForecastOutcome::InsufficientData { observed: 1 });
        assert!(text.contains("Warning"));
        assert!(text.contains("1 monthly point"));
        assert!(!text.contains("projected"));
    }

    #[test]
    fn forecast_table_tags_projected_rows() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mar = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fc = ForecastSeries {
            points: vec![
                ForecastPoint { month: jan, amount: 100.0, source: PointSource::Observed },
                ForecastPoint { month: feb, amount: 200.0, source: PointSource::Observed },
                ForecastPoint { month: mar, amount: 300.0, source: PointSource::Projected },
            ],
            model: HoltModel { alpha: 0.5, beta: 0.5, level: 200.0, trend: 100.0 },
            quality: FitQuality { sse: 0.0, rmse: 0.0, n: 2 },
        };

        let text = format_forecast(&ForecastOutcome::Forecast(fc));
        assert!(text.contains("Jan-2024"));
        assert!(text.contains("Mar-2024"));
        assert_eq!(text.matches("observed").count(), 2);
        assert_eq!(text.matches("projected").count(), 1);
    }

    #[test]
    fn filters_summary_reads_as_a_predicate() {
        let mut filters = FilterSelection::default();
        assert_eq!(format_filters(&filters), "none");

        filters.months.insert("Jan-2024".to_string());
        filters.cities.insert("Karachi".to_string());
        let text = format_filters(&filters);
        assert!(text.contains("month-year ∈ {Jan-2024}"));
        assert!(text.contains(" AND "));
    }
}
