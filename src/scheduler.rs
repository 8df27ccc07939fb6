//! Reminder scheduling on top of a platform notification service
//!
//! The scheduler owns one listener registration with the service for its whole
//! lifetime and drops it when the scheduler goes away.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::meal::{MealPayload, TriggerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Public,
}

/// Delivery hints for the channel reminders are posted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub visibility: Visibility,
    /// Alternating off/on durations in milliseconds
    pub vibration_pattern: Vec<u64>,
    pub bypass_dnd: bool,
}

impl ChannelConfig {
    pub fn meal_alarms() -> Self {
        Self {
            id: "meal-alarms".to_string(),
            name: "Meal alarms".to_string(),
            importance: Importance::Max,
            visibility: Visibility::Public,
            vibration_pattern: vec![0, 500, 250, 500],
            bypass_dnd: true,
        }
    }
}

/// Fires every day at the given wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrigger {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Fired while the app was in the foreground
    Delivered(MealPayload),
    /// The user opened the app from the notification
    Tapped(MealPayload),
}

impl NotificationEvent {
    pub fn payload(&self) -> &MealPayload {
        match self {
            NotificationEvent::Delivered(p) | NotificationEvent::Tapped(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub trait NotificationService {
    fn request_permission(&mut self) -> Result<Permission>;
    fn create_channel(&mut self, channel: &ChannelConfig) -> Result<()>;
    fn schedule(&mut self, trigger: DailyTrigger, payload: MealPayload) -> Result<TriggerHandle>;
    /// Unknown or already canceled handles are not an error
    fn cancel(&mut self, handle: &TriggerHandle) -> Result<()>;
    /// Cancel every trigger whose payload names `meal_id`; returns how many
    fn cancel_for_meal(&mut self, meal_id: &str) -> Result<usize>;
    fn subscribe(&mut self, listener: Sender<NotificationEvent>) -> ListenerId;
    fn unsubscribe(&mut self, id: ListenerId);
    /// The tap that launched the app, if any; consumed by the call
    fn take_cold_start_tap(&mut self) -> Result<Option<MealPayload>>;
    /// Fire whatever fell due by `now`. Services that push events on their
    /// own have nothing to do here.
    fn poll(&mut self, _now: NaiveDateTime) -> Result<usize> {
        Ok(0)
    }
}

pub struct ReminderScheduler<N: NotificationService> {
    service: N,
    permission: Option<Permission>,
    denial_reported: bool,
    listener: Option<ListenerId>,
    events: Receiver<NotificationEvent>,
}

impl<N: NotificationService> ReminderScheduler<N> {
    pub fn new(mut service: N) -> Self {
        let (tx, rx) = mpsc::channel();
        let listener = service.subscribe(tx);
        Self {
            service,
            permission: None,
            denial_reported: false,
            listener: Some(listener),
            events: rx,
        }
    }

    /// Ask the platform once; later calls return the cached answer
    pub fn ensure_permission(&mut self) -> Result<Permission> {
        if let Some(permission) = self.permission {
            return Ok(permission);
        }
        let permission = self.service.request_permission()?;
        if permission == Permission::Denied {
            log::warn!("notification permission denied; reminders will be stored but not fire");
        }
        self.permission = Some(permission);
        Ok(permission)
    }

    /// True exactly once after permission was found to be denied
    pub fn take_denial_notice(&mut self) -> bool {
        if self.permission == Some(Permission::Denied) && !self.denial_reported {
            self.denial_reported = true;
            return true;
        }
        false
    }

    pub fn create_channel(&mut self, channel: &ChannelConfig) -> Result<()> {
        self.service.create_channel(channel)
    }

    /// Register a daily trigger. A denied permission does not stop the trigger
    /// from being registered; it just never fires.
    pub fn schedule(&mut self, hour: u32, minute: u32, payload: MealPayload) -> Result<TriggerHandle> {
        self.ensure_permission()?;
        let handle = self.service.schedule(DailyTrigger { hour, minute }, payload.clone())?;
        log::info!(
            "scheduled {} daily at {:02}:{:02} for meal {}",
            handle, hour, minute, payload.meal_id
        );
        Ok(handle)
    }

    pub fn cancel(&mut self, handle: &TriggerHandle) -> Result<()> {
        self.service.cancel(handle)?;
        log::info!("canceled {}", handle);
        Ok(())
    }

    /// Sweep triggers for a meal the store no longer knows about
    pub fn cancel_for_meal(&mut self, meal_id: &str) -> Result<usize> {
        let count = self.service.cancel_for_meal(meal_id)?;
        if count > 0 {
            log::warn!("canceled {} orphaned trigger(s) for meal {}", count, meal_id);
        }
        Ok(count)
    }

    /// Events received since the last call, oldest first
    pub fn drain_events(&self) -> Vec<NotificationEvent> {
        self.events.try_iter().collect()
    }

    pub fn cold_start_tap(&mut self) -> Result<Option<MealPayload>> {
        self.service.take_cold_start_tap()
    }

    pub fn poll(&mut self, now: NaiveDateTime) -> Result<usize> {
        self.service.poll(now)
    }
}

impl<N: NotificationService> Drop for ReminderScheduler<N> {
    fn drop(&mut self) {
        if let Some(id) = self.listener.take() {
            self.service.unsubscribe(id);
        }
    }
}
