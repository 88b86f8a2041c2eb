use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_ledger;
use crate::error::{Result, TallyError};
use crate::fmt;
use crate::settings::load_settings;
use crate::stats;

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| TallyError::Other(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

pub fn run(from_date: &str, to_date: &str, chart: bool) -> Result<()> {
    let from = parse_date(from_date)?;
    let to = parse_date(to_date)?;
    let settings = load_settings();
    let ledger = open_ledger()?;
    let user_id = settings.allowed_user_id;

    let summary = stats::summarize(&ledger, user_id, from, to)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Total", "Entries"]);
    table.add_row(vec![
        Cell::new("Income".green().bold()),
        Cell::new(fmt::amount(summary.income_sum)),
        Cell::new(summary.income_count),
    ]);
    table.add_row(vec![
        Cell::new("Expenses".red().bold()),
        Cell::new(fmt::amount(summary.expense_sum)),
        Cell::new(summary.expense_count),
    ]);
    let balance_label = if summary.balance >= 0 {
        "Balance".green().bold()
    } else {
        "Balance".red().bold()
    };
    table.add_row(vec![
        Cell::new(balance_label),
        Cell::new(fmt::amount(summary.balance)),
        Cell::new(""),
    ]);
    println!("Stats for {from} — {to}\n{table}");

    if chart {
        write_chart(&ledger, &settings, user_id, from, to)?;
    }
    Ok(())
}

fn write_chart(
    ledger: &crate::db::Ledger,
    settings: &crate::settings::Settings,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let policy = settings.chart_policy();
    if !policy.wants_chart(from, to) {
        println!(
            "Charts cover periods spanning {} to {} days; summary only.",
            settings.chart_min_span_days, settings.chart_max_span_days
        );
        return Ok(());
    }
    if ledger.daily_totals(user_id, from, to)?.is_empty() {
        println!("No data to chart for this period.");
        return Ok(());
    }

    #[cfg(feature = "chart")]
    {
        let series = stats::daily_series(ledger, user_id, from, to)?;
        let bytes = crate::chart::render_chart(&series)?;
        let path = crate::settings::get_data_dir().join(format!(
            "chart-{}.pdf",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        ));
        std::fs::write(&path, bytes)?;
        println!("Chart written to {}", path.display());
    }
    #[cfg(not(feature = "chart"))]
    println!("This binary was built without chart support.");

    Ok(())
}
