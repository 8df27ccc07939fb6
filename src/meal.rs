use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::format_time;

/// Opaque identifier handed back by the notification service for one trigger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerHandle(pub String);

impl std::fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A prepared meal with a daily reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub id: String,
    pub name: String,
    pub hour: u32,
    pub minute: u32,
    pub scheduler_handle: TriggerHandle,
    pub created_at: DateTime<Utc>,
}

impl MealEntry {
    pub fn time_label(&self) -> String {
        format_time(self.hour, self.minute)
    }

    pub fn payload(&self) -> MealPayload {
        MealPayload {
            meal_id: self.id.clone(),
            meal_name: self.name.clone(),
        }
    }
}

/// Data attached to a scheduled notification so a later delivery or tap can
/// be traced back to its meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPayload {
    #[serde(default)]
    pub meal_id: String,
    #[serde(default)]
    pub meal_name: String,
}

impl MealPayload {
    pub fn new(meal_id: impl Into<String>, meal_name: impl Into<String>) -> Self {
        Self {
            meal_id: meal_id.into(),
            meal_name: meal_name.into(),
        }
    }

    /// Both fields must be present for the payload to raise an alarm
    pub fn is_valid(&self) -> bool {
        !self.meal_id.trim().is_empty() && !self.meal_name.trim().is_empty()
    }
}
