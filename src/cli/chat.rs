use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;

use crate::cli::{default_renderer, open_ledger};
use crate::error::Result;
use crate::flow::{FlowController, FlowEvent, Reply};
use crate::models::Category;
use crate::settings::{get_data_dir, load_settings};

const HELP: &str = "Commands:\n\
  income   start recording an income entry\n\
  expense  start recording an expense entry\n\
  stats    period statistics (you will be asked for two dates)\n\
  cancel   abort the current action\n\
  quit     leave the chat\n\
While recording, type the amount; while picking dates, type YYYY-MM-DD.";

/// Map one line of user input to a flow event. Dates and free text are
/// decided here so the state machine never parses transport-level strings.
fn parse_event(input: &str) -> FlowEvent {
    match input {
        "start" | "menu" => FlowEvent::Start,
        "income" => FlowEvent::NewEntry(Category::Income),
        "expense" => FlowEvent::NewEntry(Category::Expense),
        "stats" => FlowEvent::Stats,
        "cancel" | "back" => FlowEvent::Cancel,
        other => match NaiveDate::parse_from_str(other, "%Y-%m-%d") {
            Ok(date) => FlowEvent::DatePicked(date),
            Err(_) => FlowEvent::Text(other.to_string()),
        },
    }
}

fn deliver(replies: &[Reply], data_dir: &Path) -> Result<()> {
    for reply in replies {
        match reply {
            Reply::Text(text) => println!("{text}"),
            Reply::Chart { bytes, caption } => {
                let path = data_dir.join(format!(
                    "chart-{}.pdf",
                    chrono::Local::now().format("%Y%m%d-%H%M%S")
                ));
                std::fs::write(&path, bytes)?;
                println!("{caption}: {}", path.display());
            }
        }
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = get_data_dir();
    let ledger = open_ledger()?;
    let user_id = settings.allowed_user_id;
    let mut flow = FlowController::new(ledger, settings, default_renderer());

    println!(
        "{} — type 'help' for commands, 'quit' to exit.",
        "tally chat".bold()
    );
    deliver(&flow.handle(user_id, FlowEvent::Start), &data_dir)?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{} ", ">".dimmed());
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }
        let replies = flow.handle(user_id, parse_event(input));
        deliver(&replies, &data_dir)?;
    }
    Ok(())
}
