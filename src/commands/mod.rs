//! Command implementations for leftovers CLI

mod meals;
mod misc;

pub use meals::*;
pub use misc::*;
