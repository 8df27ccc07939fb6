//! Meal commands: add, list, cancel, tap

use std::time::Instant;

use colored::Colorize;
use inquire::Confirm;

use leftovers::app::{open_local, Advisory, LocalController};
use leftovers::config::Config;
use leftovers::error::{LeftoversError, Result};
use leftovers::notifier::{record_tap, DeliveryMode};
use leftovers::storage::JsonFileStore;
use leftovers::vibration::SilentVibrator;

fn open_headless(config: &Config) -> Result<LocalController<SilentVibrator>> {
    let mode = DeliveryMode::Background {
        notify_command: config.notify_command.clone(),
        foreground_lock: Config::foreground_lock_path()?,
    };
    let mut controller = open_local(config, mode, SilentVibrator)?;
    controller.load()?;
    Ok(controller)
}

/// Register a meal with a daily reminder
pub fn cmd_add(config: &Config, name: &str, at: &str) -> Result<()> {
    let mut controller = open_headless(config)?;
    let meal = controller.add_meal(name, at)?;

    println!("\n{}", "Meal added!".green().bold());
    println!("  Name:     {}", meal.name);
    println!("  Reminder: every day at {}", meal.time_label());
    println!("  ID:       {}", meal.id.dimmed());

    if controller.advisory() == Some(&Advisory::PermissionDenied) {
        println!(
            "\n{} {}",
            "Warning:".yellow(),
            Advisory::PermissionDenied.message()
        );
    }
    Ok(())
}

/// List registered meals
pub fn cmd_list(config: &Config, json: bool) -> Result<()> {
    let controller = open_headless(config)?;
    let meals = controller.meals();

    if json {
        println!("{}", serde_json::to_string_pretty(meals)?);
        return Ok(());
    }

    if meals.is_empty() {
        println!("\nNo meals registered.");
        println!("Add one with: leftovers add \"Tuna casserole\" --at 18:30");
        return Ok(());
    }

    println!("\nMeals ({}):\n", meals.len());
    for meal in meals {
        let added = meal.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d");
        println!(
            "  {}  {}  {}",
            meal.time_label().green(),
            meal.name.bold(),
            format!("added {} | {}", added, meal.id).dimmed()
        );
    }
    println!();

    Ok(())
}

/// Remove a meal and its reminder
pub fn cmd_cancel(config: &Config, id_or_name: &str, yes: bool) -> Result<()> {
    let mut controller = open_headless(config)?;

    let meal = controller
        .store()
        .find(id_or_name)
        .cloned()
        .ok_or_else(|| LeftoversError::MealNotFound(id_or_name.to_string()))?;

    if !yes {
        let confirmed = Confirm::new(&format!("Stop reminding you about '{}'?", meal.name))
            .with_default(false)
            .prompt()
            .unwrap_or(false);
        if !confirmed {
            println!("Kept {}.", meal.name);
            return Ok(());
        }
    }

    controller.cancel_meal(&meal.id, Instant::now())?;
    println!("\nCanceled reminder for {}", meal.name);
    Ok(())
}

/// Leave a tap so the next UI launch (or the running UI) opens the alarm
pub fn cmd_tap(config: &Config, id_or_name: &str) -> Result<()> {
    let controller = open_headless(config)?;
    let meal = controller
        .store()
        .find(id_or_name)
        .ok_or_else(|| LeftoversError::MealNotFound(id_or_name.to_string()))?;

    let mut taps = JsonFileStore::open(Config::taps_path()?)?;
    record_tap(&mut taps, &meal.payload())?;
    log::info!("tap recorded for meal {}", meal.id);
    println!("Alarm for {} will open in leftovers.", meal.name);
    Ok(())
}
