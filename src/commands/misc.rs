//! UI launcher, background daemon, config display, completions

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;

use leftovers::app::open_notifier;
use leftovers::cli::{Cli, CompletionShell};
use leftovers::config::Config;
use leftovers::error::{LeftoversError, Result};
use leftovers::notifier::{local_now, DeliveryMode};
use leftovers::scheduler::{NotificationService, Permission};

/// Launch the TUI
#[cfg(feature = "tui")]
pub fn cmd_ui(config: &Config) -> Result<()> {
    leftovers::tui::run(config)
}

#[cfg(not(feature = "tui"))]
pub fn cmd_ui(_config: &Config) -> Result<()> {
    eprintln!("TUI not available. Rebuild with: cargo build --features tui");
    Ok(())
}

/// Fire reminders until Ctrl+C
pub fn cmd_daemon(config: &Config) -> Result<()> {
    let mode = DeliveryMode::Background {
        notify_command: config.notify_command.clone(),
        foreground_lock: Config::foreground_lock_path()?,
    };
    let mut notifier = open_notifier(config, mode)?;

    if notifier.request_permission()? == Permission::Denied {
        println!(
            "{} notifications are disabled in the config; nothing will fire.",
            "Warning:".yellow()
        );
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| LeftoversError::ConfigError(format!("Failed to set Ctrl+C handler: {}", e)))?;

    let count = notifier.triggers()?.len();
    println!("\nleftovers daemon watching {} reminder(s)  (Ctrl+C to stop)\n", count);
    log::info!("daemon started with {} triggers", count);

    while running.load(Ordering::SeqCst) {
        let now = local_now();
        match notifier.tick(now) {
            Ok(0) => {}
            Ok(fired) => println!("  [{}] {} reminder(s) fired", now.format("%H:%M"), fired),
            Err(e) => {
                log::error!("daemon tick failed: {}", e);
                eprintln!("  [ERROR] {}", e);
            }
        }
        std::thread::sleep(Duration::from_secs(1));
    }

    log::info!("daemon stopped");
    Ok(())
}

/// Show configuration and where data lives
pub fn cmd_config(config: &Config) -> Result<()> {
    println!("\n{}", "Paths".bold());
    println!("  Config:   {}", Config::config_path()?.display());
    println!("  Meals:    {}", Config::store_path()?.display());
    println!("  Triggers: {}", Config::triggers_path()?.display());
    println!("  Logs:     {}", Config::log_dir()?.display());

    println!("\n{}", "Settings".bold());
    let content = toml::to_string_pretty(config).map_err(|e| LeftoversError::ConfigError(e.to_string()))?;
    for line in content.lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "leftovers", &mut io::stdout());
    Ok(())
}
