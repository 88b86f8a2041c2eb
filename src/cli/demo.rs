use chrono::{Days, Local, NaiveDate};

use crate::cli::open_ledger;
use crate::error::Result;
use crate::models::Category;
use crate::settings::load_settings;

struct DemoEntry {
    days_ago: u64,
    category: Category,
    amount: i64,
}

/// A month of deterministic sample data ending today: two salary payments,
/// regular groceries/transport, and a few one-offs. Backdated so a 6-31 day
/// stats period lands in the chart band.
const ENTRIES: &[DemoEntry] = &[
    DemoEntry { days_ago: 29, category: Category::Income, amount: 85000 },
    DemoEntry { days_ago: 28, category: Category::Expense, amount: 2300 },
    DemoEntry { days_ago: 27, category: Category::Expense, amount: 650 },
    DemoEntry { days_ago: 25, category: Category::Expense, amount: 4100 },
    DemoEntry { days_ago: 23, category: Category::Expense, amount: 1250 },
    DemoEntry { days_ago: 21, category: Category::Expense, amount: 780 },
    DemoEntry { days_ago: 20, category: Category::Income, amount: 12000 },
    DemoEntry { days_ago: 18, category: Category::Expense, amount: 3400 },
    DemoEntry { days_ago: 16, category: Category::Expense, amount: 920 },
    DemoEntry { days_ago: 15, category: Category::Income, amount: 85000 },
    DemoEntry { days_ago: 14, category: Category::Expense, amount: 15600 },
    DemoEntry { days_ago: 12, category: Category::Expense, amount: 2100 },
    DemoEntry { days_ago: 10, category: Category::Expense, amount: 480 },
    DemoEntry { days_ago: 9, category: Category::Expense, amount: 6700 },
    DemoEntry { days_ago: 7, category: Category::Expense, amount: 1800 },
    DemoEntry { days_ago: 5, category: Category::Income, amount: 4500 },
    DemoEntry { days_ago: 4, category: Category::Expense, amount: 2950 },
    DemoEntry { days_ago: 2, category: Category::Expense, amount: 830 },
    DemoEntry { days_ago: 1, category: Category::Expense, amount: 1440 },
    DemoEntry { days_ago: 0, category: Category::Expense, amount: 560 },
];

fn backdate(today: NaiveDate, days_ago: u64) -> String {
    let date = today
        .checked_sub_days(Days::new(days_ago))
        .unwrap_or(today);
    format!("{} 12:00:00", date.format("%Y-%m-%d"))
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let ledger = open_ledger()?;
    let today = Local::now().date_naive();

    for entry in ENTRIES {
        ledger.append_at(
            settings.allowed_user_id,
            entry.category,
            entry.amount,
            "",
            &backdate(today, entry.days_ago),
        )?;
    }

    println!("Seeded {} demo entries over the last 30 days.", ENTRIES.len());
    println!("Try: tally stats --from {} --to {} --chart", today - Days::new(29), today);
    Ok(())
}
