#[cfg(feature = "chart")]
mod chart;
mod cli;
mod db;
mod error;
mod flow;
mod fmt;
mod models;
mod settings;
mod stats;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, user_id } => cli::init::run(data_dir, user_id),
        Commands::Chat => cli::chat::run(),
        Commands::Add {
            category,
            amount,
            comment,
        } => cli::add::run(&category, amount, &comment),
        Commands::Stats {
            from_date,
            to_date,
            chart,
        } => cli::stats::run(&from_date, &to_date, chart),
        Commands::Status => cli::status::run(),
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
