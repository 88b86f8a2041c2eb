use colored::Colorize;

use crate::cli::open_ledger;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let ledger = open_ledger()?;
    let user_id = settings.allowed_user_id;

    println!("{}", "tally status".bold());
    println!("Database: {}", ledger.db_path().display());
    println!("Allowed user id: {user_id}");
    let count = ledger.entry_count(user_id)?;
    println!("Entries: {count}");
    if let Some((first, last)) = ledger.date_range(user_id)? {
        println!("Date range: {first} — {last}");
    }
    Ok(())
}
