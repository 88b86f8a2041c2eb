use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::TallyError;

/// Entry kind. The stored `category` column only ever holds these two values;
/// anything else in the table is a data-integrity violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Income,
    Expense,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expense => "expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Category::Income),
            "expense" => Ok(Category::Expense),
            other => Err(TallyError::UnknownCategory(other.to_string())),
        }
    }
}

/// One recorded transaction. Immutable once written.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub category: Category,
    pub amount: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

/// Per-category sums and counts over a period. Zero-valued when no rows match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodTotals {
    pub income_sum: i64,
    pub income_count: i64,
    pub expense_sum: i64,
    pub expense_count: i64,
}

/// One sparse row of the daily breakdown: only dates that have entries appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub income: i64,
    pub expense: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        assert_eq!("income".parse::<Category>().unwrap(), Category::Income);
        assert_eq!("expense".parse::<Category>().unwrap(), Category::Expense);
        assert_eq!(Category::Income.as_str(), "income");
        assert_eq!(Category::Expense.as_str(), "expense");
    }

    #[test]
    fn test_category_rejects_unknown() {
        let err = "transfer".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("transfer"));
    }
}
