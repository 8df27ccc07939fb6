//! leftovers - daily reminders to eat the meals you cooked

use clap::Parser;
use colored::Colorize;

use leftovers::cli::{Cli, Commands};
use leftovers::config::Config;
use leftovers::error::Result;

mod commands;

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("{} {}", "Error:".red(), e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match Config::log_dir() {
        Ok(dir) => {
            if let Err(e) = leftovers::logging::init_logging(&config.effective_log_level(), &dir) {
                eprintln!("Warning: logging disabled: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => commands::cmd_ui(&config),
        Commands::Add { name, at } => commands::cmd_add(&config, &name, &at),
        Commands::List { json } => commands::cmd_list(&config, json),
        Commands::Cancel { meal, yes } => commands::cmd_cancel(&config, &meal, yes),
        Commands::Tap { meal } => commands::cmd_tap(&config, &meal),
        Commands::Daemon => commands::cmd_daemon(&config),
        Commands::Config => commands::cmd_config(&config),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
