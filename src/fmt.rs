use crate::stats::Summary;

/// Format an integer amount with thousands separators: 1,234,567. Amounts
/// are currency-agnostic units, so no symbol.
pub fn amount(val: i64) -> String {
    let negative = val < 0;
    let digits = val.unsigned_abs().to_string();

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}")
    } else {
        with_commas
    }
}

/// Text block for a period summary, shared by the chat flow and the stats
/// command.
pub fn summary_text(summary: &Summary) -> String {
    format!(
        "Stats for {} — {}\n\n\
         Income: {} (entries: {})\n\
         Expenses: {} (entries: {})\n\n\
         Balance: {}",
        summary.start.format("%Y-%m-%d"),
        summary.end.format("%Y-%m-%d"),
        amount(summary.income_sum),
        summary.income_count,
        amount(summary.expense_sum),
        summary.expense_count,
        amount(summary.balance),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(0), "0");
        assert_eq!(amount(42), "42");
        assert_eq!(amount(1234), "1,234");
        assert_eq!(amount(1000000), "1,000,000");
        assert_eq!(amount(-500), "-500");
        assert_eq!(amount(-1234567), "-1,234,567");
    }

    #[test]
    fn test_summary_text_contains_balance() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let summary = Summary {
            start: d("2025-01-01"),
            end: d("2025-01-31"),
            income_sum: 1000,
            income_count: 1,
            expense_sum: 400,
            expense_count: 1,
            balance: 600,
        };
        let text = summary_text(&summary);
        assert!(text.contains("2025-01-01 — 2025-01-31"));
        assert!(text.contains("Income: 1,000 (entries: 1)"));
        assert!(text.contains("Expenses: 400 (entries: 1)"));
        assert!(text.contains("Balance: 600"));
    }
}
