use colored::Colorize;

use crate::cli::open_ledger;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, user_id: Option<i64>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(id) = user_id {
        settings.allowed_user_id = id;
    }
    save_settings(&settings)?;

    let ledger = open_ledger()?;
    println!(
        "{} Ledger ready at {}",
        "✓".green().bold(),
        ledger.db_path().display()
    );
    println!("Allowed user id: {}", settings.allowed_user_id);
    Ok(())
}
