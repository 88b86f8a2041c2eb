use crate::cli::open_ledger;
use crate::error::{Result, TallyError};
use crate::fmt;
use crate::models::Category;
use crate::settings::load_settings;

pub fn run(category: &str, amount: i64, comment: &str) -> Result<()> {
    let category: Category = category.parse()?;
    if amount < 0 {
        return Err(TallyError::InvalidAmount(format!(
            "{amount} is negative; amounts are whole non-negative numbers"
        )));
    }
    let settings = load_settings();
    let ledger = open_ledger()?;
    ledger.append(settings.allowed_user_id, category, amount, comment)?;
    println!("Recorded {category} of {}.", fmt::amount(amount));
    Ok(())
}
