use clap::{Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "leftovers")]
#[command(author, version, about = "Daily reminders to eat the meals you cooked", long_about = None)]
#[command(after_help = r#"Examples:
  leftovers                                   Open the Tools menu
  leftovers add "Tuna casserole" --at 18:30   Remind me every day at 18:30
  leftovers list                              List registered meals
  leftovers daemon                            Fire reminders while the UI is closed

Quick Start:
  1. leftovers add "Lentil soup" --at 12:00
  2. leftovers daemon &
  3. leftovers
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive UI (default)
    Ui,

    /// Register a meal with a daily reminder
    #[command(after_help = r#"Examples:
  leftovers add "Tuna casserole" --at 18:30
  leftovers add "Chili" --at 7:45
"#)]
    Add {
        /// Meal name
        #[arg(value_name = "NAME")]
        name: String,

        /// Daily reminder time, 24-hour HH:MM
        #[arg(long, value_name = "HH:MM")]
        at: String,
    },

    /// List registered meals, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a meal and its reminder
    Cancel {
        /// Meal ID or name
        #[arg(value_name = "ID_OR_NAME")]
        meal: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Open the alarm for a meal on the next UI launch (for notification actions)
    Tap {
        /// Meal ID or name
        #[arg(value_name = "ID_OR_NAME")]
        meal: String,
    },

    /// Fire reminders in the background until interrupted
    Daemon,

    /// Show configuration and data paths
    Config,

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  leftovers completions bash >> ~/.bashrc
  leftovers completions fish > ~/.config/fish/completions/leftovers.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}
