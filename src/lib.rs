pub mod alarm;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod meal;
pub mod notifier;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod time;
#[cfg(feature = "tui")]
pub mod tui;
pub mod vibration;

pub use error::{LeftoversError, Result};
