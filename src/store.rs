//! The meal list, newest first, mirrored to a key-value store after every change
//!
//! Another process (the CLI) may write the same store while a UI holds a
//! `MealStore`, so every mutation re-reads storage before applying itself.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{LeftoversError, Result};
use crate::meal::{MealEntry, MealPayload};
use crate::scheduler::{NotificationService, ReminderScheduler};
use crate::storage::KeyValueStore;
use crate::time::parse_time;

pub const MEALS_KEY: &str = "meals";

pub struct MealStore<S: KeyValueStore> {
    storage: S,
    meals: Vec<MealEntry>,
}

impl<S: KeyValueStore> MealStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            meals: Vec::new(),
        }
    }

    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    pub fn get(&self, id: &str) -> Option<&MealEntry> {
        self.meals.iter().find(|m| m.id == id)
    }

    /// Look up by exact id, then by case-insensitive name
    pub fn find(&self, id_or_name: &str) -> Option<&MealEntry> {
        self.get(id_or_name).or_else(|| {
            let wanted = id_or_name.trim().to_lowercase();
            self.meals.iter().find(|m| m.name.to_lowercase() == wanted)
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the in-memory list with whatever storage holds
    pub fn load_all(&mut self) -> Result<()> {
        self.meals = match self.storage.get(MEALS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        log::debug!("loaded {} meals", self.meals.len());
        Ok(())
    }

    pub fn persist_all(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.meals)?;
        self.storage.set(MEALS_KEY, &json)
    }

    /// Validate, schedule the daily trigger, then store the meal at the front
    pub fn add_meal<N: NotificationService>(
        &mut self,
        name: &str,
        time_text: &str,
        scheduler: &mut ReminderScheduler<N>,
    ) -> Result<&MealEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeftoversError::Validation("empty name".into()));
        }
        let (hour, minute) =
            parse_time(time_text).ok_or_else(|| LeftoversError::Validation("bad time".into()))?;

        self.load_all()?;
        let id = Uuid::new_v4().to_string();
        let handle = scheduler.schedule(hour, minute, MealPayload::new(id.clone(), name))?;

        self.meals.insert(
            0,
            MealEntry {
                id,
                name: name.to_string(),
                hour,
                minute,
                scheduler_handle: handle,
                created_at: Utc::now(),
            },
        );
        self.persist_all()?;
        log::info!("added meal {} at {:02}:{:02}", self.meals[0].id, hour, minute);
        Ok(&self.meals[0])
    }

    /// Cancel the trigger before dropping the entry so no trigger is orphaned.
    /// Unknown ids are a no-op.
    pub fn cancel_meal<N: NotificationService>(
        &mut self,
        id: &str,
        scheduler: &mut ReminderScheduler<N>,
    ) -> Result<Option<MealEntry>> {
        self.load_all()?;
        let index = match self.meals.iter().position(|m| m.id == id) {
            Some(index) => index,
            None => return Ok(None),
        };
        scheduler.cancel(&self.meals[index].scheduler_handle)?;
        let removed = self.meals.remove(index);
        self.persist_all()?;
        log::info!("canceled meal {}", removed.id);
        Ok(Some(removed))
    }
}
