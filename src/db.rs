use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{Result, TallyError};
use crate::models::{Category, DayTotals, PeriodTotals};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    category TEXT NOT NULL,
    amount INTEGER NOT NULL,
    comment TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);
";

/// Append-only entry store. Owns the database path; every operation opens a
/// short-lived connection and drops it before returning, so there is no
/// ambient handle to share or poison.
#[derive(Debug, Clone)]
pub struct Ledger {
    db_path: PathBuf,
}

impl Ledger {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }

    /// Ensure the history table exists. Safe to call on every start.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert one entry, with `created_at` defaulted to the current time by
    /// SQLite. Amount/category validation is the caller's responsibility.
    pub fn append(
        &self,
        user_id: i64,
        category: Category,
        amount: i64,
        comment: &str,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO history (user_id, category, amount, comment) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, category.as_str(), amount, comment],
        )?;
        Ok(())
    }

    /// Seeding entry point with an explicit timestamp. The chat and CLI add
    /// paths always let `created_at` default.
    pub(crate) fn append_at(
        &self,
        user_id: i64,
        category: Category,
        amount: i64,
        comment: &str,
        created_at: &str,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO history (user_id, category, amount, comment, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![user_id, category.as_str(), amount, comment, created_at],
        )?;
        Ok(())
    }

    /// Sum and count per category over entries whose calendar date falls in
    /// `[start, end]` inclusive. No matching rows for a category yields
    /// zeros, never NULL.
    pub fn period_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodTotals> {
        let conn = self.connect()?;
        let (income_sum, income_count, expense_sum, expense_count): (
            Option<i64>,
            i64,
            Option<i64>,
            i64,
        ) = conn.query_row(
            "SELECT \
                 SUM(CASE WHEN category = 'income' THEN amount END), \
                 COUNT(CASE WHEN category = 'income' THEN 1 END), \
                 SUM(CASE WHEN category = 'expense' THEN amount END), \
                 COUNT(CASE WHEN category = 'expense' THEN 1 END) \
             FROM history \
             WHERE user_id = ?1 AND date(created_at) BETWEEN ?2 AND ?3",
            rusqlite::params![user_id, fmt_date(start), fmt_date(end)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        Ok(PeriodTotals {
            income_sum: income_sum.unwrap_or(0),
            income_count,
            expense_sum: expense_sum.unwrap_or(0),
            expense_count,
        })
    }

    /// One row per calendar date that has at least one entry in range,
    /// ascending. Dates without entries are absent; gap-filling is the
    /// statistics engine's job.
    pub fn daily_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayTotals>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT \
                 date(created_at) AS day, \
                 SUM(CASE WHEN category = 'income' THEN amount ELSE 0 END), \
                 SUM(CASE WHEN category = 'expense' THEN amount ELSE 0 END) \
             FROM history \
             WHERE user_id = ?1 AND date(created_at) BETWEEN ?2 AND ?3 \
             GROUP BY date(created_at) ORDER BY day",
        )?;
        let raw: Vec<(String, i64, i64)> = stmt
            .query_map(
                rusqlite::params![user_id, fmt_date(start), fmt_date(end)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(day, income, expense)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| TallyError::Other(format!("Bad date in history: {day}: {e}")))?;
                Ok(DayTotals {
                    date,
                    income,
                    expense,
                })
            })
            .collect()
    }

    /// Total number of entries owned by `user_id`.
    pub fn entry_count(&self, user_id: i64) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row(
            "SELECT count(*) FROM history WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Calendar dates of the oldest and newest entries, if any exist.
    pub fn date_range(&self, user_id: i64) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let conn = self.connect()?;
        let (first, last): (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(date(created_at)), MAX(date(created_at)) \
             FROM history WHERE user_id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        match (first, last) {
            (Some(f), Some(l)) => {
                let parse = |s: &str| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .map_err(|e| TallyError::Other(format!("Bad date in history: {s}: {e}")))
                };
                Ok(Some((parse(&f)?, parse(&l)?)))
            }
            _ => Ok(None),
        }
    }
}

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
