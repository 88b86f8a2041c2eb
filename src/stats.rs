use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::db::Ledger;
use crate::error::{Result, TallyError};

/// Period totals with the derived balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income_sum: i64,
    pub income_count: i64,
    pub expense_sum: i64,
    pub expense_count: i64,
    pub balance: i64,
}

/// One day of the dense, gap-filled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub income: i64,
    pub expense: i64,
}

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(TallyError::InvalidPeriod { start, end });
    }
    Ok(())
}

/// Period summary over `[start, end]` inclusive. Rejects reversed ranges
/// rather than swapping them.
pub fn summarize(ledger: &Ledger, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Summary> {
    check_period(start, end)?;
    let totals = ledger.period_totals(user_id, start, end)?;
    Ok(Summary {
        start,
        end,
        income_sum: totals.income_sum,
        income_count: totals.income_count,
        expense_sum: totals.expense_sum,
        expense_count: totals.expense_count,
        balance: totals.income_sum - totals.expense_sum,
    })
}

/// Dense daily series over `[start, end]` inclusive: one point per calendar
/// date, `(0, 0)` for dates the ledger has no entries on. The sparse rows go
/// into a map keyed by date, then a linear walk over the range fills gaps —
/// O(days) time, O(rows) extra space. Materialized in full before return.
pub fn daily_series(
    ledger: &Ledger,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyPoint>> {
    check_period(start, end)?;
    let sparse = ledger.daily_totals(user_id, start, end)?;
    let by_date: HashMap<NaiveDate, (i64, i64)> = sparse
        .iter()
        .map(|day| (day.date, (day.income, day.expense)))
        .collect();

    let mut series = Vec::new();
    let mut current = start;
    loop {
        let (income, expense) = by_date.get(&current).copied().unwrap_or((0, 0));
        series.push(DailyPoint {
            date: current,
            income,
            expense,
        });
        if current == end {
            break;
        }
        current = current
            .checked_add_days(Days::new(1))
            .ok_or_else(|| TallyError::Other(format!("Date overflow after {current}")))?;
    }
    Ok(series)
}

/// Which period lengths get a chart alongside the text summary. The band is
/// a product choice, so it comes from settings rather than living here as
/// literals. The span counts whole days between the endpoints, so the
/// default 6..=31 means 7 to 32 calendar dates.
#[derive(Debug, Clone, Copy)]
pub struct ChartPolicy {
    pub min_span_days: i64,
    pub max_span_days: i64,
}

impl Default for ChartPolicy {
    fn default() -> Self {
        Self {
            min_span_days: 6,
            max_span_days: 31,
        }
    }
}

impl ChartPolicy {
    pub fn wants_chart(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let span = (end - start).num_days();
        span >= self.min_span_days && span <= self.max_span_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{insert_at, test_ledger};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_summarize_balance() {
        let (_dir, ledger) = test_ledger();
        insert_at(&ledger, 1, "income", 1000, "2025-05-10 09:00:00");
        insert_at(&ledger, 1, "expense", 400, "2025-05-10 19:00:00");
        let summary = summarize(&ledger, 1, d("2025-05-10"), d("2025-05-10")).unwrap();
        assert_eq!(summary.income_sum, 1000);
        assert_eq!(summary.income_count, 1);
        assert_eq!(summary.expense_sum, 400);
        assert_eq!(summary.expense_count, 1);
        assert_eq!(summary.balance, 600);
    }

    #[test]
    fn test_summarize_empty_period_is_zero() {
        let (_dir, ledger) = test_ledger();
        let summary = summarize(&ledger, 1, d("2025-05-01"), d("2025-05-31")).unwrap();
        assert_eq!(summary.income_sum, 0);
        assert_eq!(summary.expense_sum, 0);
        assert_eq!(summary.balance, 0);
    }

    #[test]
    fn test_summarize_rejects_reversed_period() {
        let (_dir, ledger) = test_ledger();
        let err = summarize(&ledger, 1, d("2025-05-10"), d("2025-05-09")).unwrap_err();
        assert!(matches!(err, TallyError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_daily_series_length_covers_every_date() {
        let (_dir, ledger) = test_ledger();
        let series = daily_series(&ledger, 1, d("2025-05-01"), d("2025-05-31")).unwrap();
        assert_eq!(series.len(), 31);
        assert!(series.iter().all(|p| p.income == 0 && p.expense == 0));
    }

    #[test]
    fn test_daily_series_single_day() {
        let (_dir, ledger) = test_ledger();
        insert_at(&ledger, 1, "income", 70, "2025-05-10 12:00:00");
        let series = daily_series(&ledger, 1, d("2025-05-10"), d("2025-05-10")).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].income, 70);
    }

    #[test]
    fn test_daily_series_gap_filling() {
        let (_dir, ledger) = test_ledger();
        insert_at(&ledger, 1, "income", 100, "2025-06-01 10:00:00");
        insert_at(&ledger, 1, "expense", 40, "2025-06-03 10:00:00");
        let series = daily_series(&ledger, 1, d("2025-06-01"), d("2025-06-03")).unwrap();
        assert_eq!(
            series,
            vec![
                DailyPoint { date: d("2025-06-01"), income: 100, expense: 0 },
                DailyPoint { date: d("2025-06-02"), income: 0, expense: 0 },
                DailyPoint { date: d("2025-06-03"), income: 0, expense: 40 },
            ]
        );
    }

    #[test]
    fn test_daily_series_rejects_reversed_period() {
        let (_dir, ledger) = test_ledger();
        let err = daily_series(&ledger, 1, d("2025-06-02"), d("2025-06-01")).unwrap_err();
        assert!(matches!(err, TallyError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_chart_policy_band_boundaries() {
        let policy = ChartPolicy::default();
        let start = d("2025-07-01");
        assert!(!policy.wants_chart(start, d("2025-07-06"))); // span 5
        assert!(policy.wants_chart(start, d("2025-07-07"))); // span 6
        assert!(policy.wants_chart(start, d("2025-08-01"))); // span 31
        assert!(!policy.wants_chart(start, d("2025-08-02"))); // span 32
        assert!(!policy.wants_chart(start, start)); // span 0
    }

    #[test]
    fn test_chart_policy_custom_band() {
        let policy = ChartPolicy { min_span_days: 0, max_span_days: 2 };
        let start = d("2025-07-01");
        assert!(policy.wants_chart(start, start));
        assert!(policy.wants_chart(start, d("2025-07-03")));
        assert!(!policy.wants_chart(start, d("2025-07-04")));
    }
}
