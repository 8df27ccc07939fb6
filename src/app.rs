//! Application state: the meal store, the scheduler, the alarm and which
//! screen is showing. Front ends drive a `Controller` and render from it.

use std::time::Instant;

use crate::alarm::{Alarm, AlarmSession, PulseConfig};
use crate::config::Config;
use crate::error::{LeftoversError, Result};
use crate::meal::MealEntry;
use crate::notifier::{DeliveryMode, LocalNotifier};
use crate::scheduler::{ChannelConfig, NotificationEvent, NotificationService, ReminderScheduler};
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::store::MealStore;
use crate::vibration::Vibrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Menu,
    Tool,
}

/// A message the user has to acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    Validation(String),
    PermissionDenied,
    Error(String),
}

impl Advisory {
    pub fn title(&self) -> &'static str {
        match self {
            Advisory::Validation(_) => "Check your input",
            Advisory::PermissionDenied => "Notifications are off",
            Advisory::Error(_) => "Something went wrong",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Advisory::Validation(reason) if reason == "empty name" => {
                "Please enter the name of the meal.".to_string()
            }
            Advisory::Validation(reason) if reason == "bad time" => {
                "Please enter the time as HH:MM, for example 18:30.".to_string()
            }
            Advisory::Validation(reason) => reason.clone(),
            Advisory::PermissionDenied => {
                "Meals will be saved, but their reminders will not go off.".to_string()
            }
            Advisory::Error(message) => message.clone(),
        }
    }
}

pub struct Controller<S: KeyValueStore, N: NotificationService, V: Vibrator> {
    store: MealStore<S>,
    scheduler: ReminderScheduler<N>,
    alarm: Alarm<V>,
    screen: Screen,
    advisory: Option<Advisory>,
}

impl<S: KeyValueStore, N: NotificationService, V: Vibrator> Controller<S, N, V> {
    pub fn new(store: MealStore<S>, scheduler: ReminderScheduler<N>, alarm: Alarm<V>) -> Self {
        Self {
            store,
            scheduler,
            alarm,
            screen: Screen::default(),
            advisory: None,
        }
    }

    /// Load meals, set up the channel, ask for permission and recover an alarm
    /// that launched the app
    pub fn start(&mut self, now: Instant) -> Result<()> {
        self.load()?;
        self.scheduler.create_channel(&ChannelConfig::meal_alarms())?;
        self.scheduler.ensure_permission()?;
        self.check_permission_notice();
        if let Some(payload) = self.scheduler.cold_start_tap()? {
            self.on_notification(&NotificationEvent::Tapped(payload), now);
        }
        Ok(())
    }

    /// Re-read meals from storage; one-shot commands use this instead of `start`
    pub fn load(&mut self) -> Result<()> {
        self.store.load_all()
    }

    fn check_permission_notice(&mut self) {
        if self.scheduler.take_denial_notice() {
            self.advisory = Some(Advisory::PermissionDenied);
        }
    }

    pub fn meals(&self) -> &[MealEntry] {
        self.store.meals()
    }

    pub fn store(&self) -> &MealStore<S> {
        &self.store
    }

    pub fn scheduler_mut(&mut self) -> &mut ReminderScheduler<N> {
        &mut self.scheduler
    }

    pub fn alarm(&self) -> &Alarm<V> {
        &self.alarm
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn dismiss_advisory(&mut self) {
        self.advisory = None;
    }

    pub fn overlay_visible(&self) -> bool {
        self.alarm.is_active()
    }

    /// Switch screens. Refused while the alarm overlay is up.
    pub fn navigate(&mut self, screen: Screen) -> bool {
        if self.overlay_visible() {
            return false;
        }
        self.screen = screen;
        true
    }

    /// Validation failures become an advisory and leave state untouched
    pub fn add_meal(&mut self, name: &str, time_text: &str) -> Result<MealEntry> {
        let result = self
            .store
            .add_meal(name, time_text, &mut self.scheduler)
            .cloned();
        self.check_permission_notice();
        match result {
            Err(LeftoversError::Validation(reason)) => {
                self.advisory = Some(Advisory::Validation(reason.clone()));
                Err(LeftoversError::Validation(reason))
            }
            Err(e) => {
                log::error!("adding meal failed: {}", e);
                self.advisory = Some(Advisory::Error(format!("Could not add the meal: {}", e)));
                Err(e)
            }
            ok => ok,
        }
    }

    /// Remove a meal and its reminder, ending any alarm raised for it
    pub fn cancel_meal(&mut self, id: &str, now: Instant) -> Result<Option<MealEntry>> {
        let removed = self.store.cancel_meal(id, &mut self.scheduler).map_err(|e| {
            log::error!("canceling meal {} failed: {}", id, e);
            e
        })?;
        self.alarm.clear_meal(id, now);
        Ok(removed)
    }

    /// Deliveries and taps are handled alike
    pub fn on_notification(&mut self, event: &NotificationEvent, now: Instant) {
        log::debug!("notification event {:?}", event);
        if self.alarm.raise(event.payload(), now) {
            self.screen = Screen::Tool;
        }
    }

    /// Handle queued scheduler events and advance the vibration pulse
    pub fn tick(&mut self, now: Instant) {
        for event in self.scheduler.drain_events() {
            self.on_notification(&event, now);
        }
        self.alarm.tick(now);
    }

    pub fn type_char(&mut self, c: char) {
        self.alarm.push_char(c);
    }

    pub fn backspace(&mut self) {
        self.alarm.pop_char();
    }

    pub fn clear_typed(&mut self) {
        self.alarm.clear_typed();
    }

    /// End the alarm and keep the meal's reminder
    pub fn dismiss_alarm(&mut self, now: Instant) -> Result<AlarmSession> {
        self.alarm.unlock(now)
    }

    /// End the alarm and cancel the meal for good. A meal that vanished from
    /// the store still loses any trigger carrying its id.
    pub fn cancel_alarm(&mut self, now: Instant) -> Result<AlarmSession> {
        let session = self.alarm.unlock(now)?;
        if self.cancel_meal(&session.meal_id, now)?.is_none() {
            self.scheduler.cancel_for_meal(&session.meal_id)?;
        }
        Ok(session)
    }

    /// Stop the pulse and drop pending alarms
    pub fn shutdown(&mut self) {
        self.alarm.stop();
    }
}

pub type LocalController<V> = Controller<JsonFileStore, LocalNotifier<JsonFileStore>, V>;

/// Wire a controller to the on-disk stores
pub fn open_local<V: Vibrator>(config: &Config, mode: DeliveryMode, vibrator: V) -> Result<LocalController<V>> {
    let store = MealStore::new(JsonFileStore::open(Config::store_path()?)?);
    let notifier = open_notifier(config, mode)?;
    let alarm = Alarm::new(vibrator, pulse_config(config));
    Ok(Controller::new(store, ReminderScheduler::new(notifier), alarm))
}

pub fn open_notifier(config: &Config, mode: DeliveryMode) -> Result<LocalNotifier<JsonFileStore>> {
    let notifier = LocalNotifier::new(
        JsonFileStore::open(Config::triggers_path()?)?,
        JsonFileStore::open(Config::taps_path()?)?,
        config.notifications_enabled,
        mode,
    )
    .with_activity_log(Config::data_dir()?.join("reminders.log"));
    Ok(notifier)
}

pub fn pulse_config(config: &Config) -> PulseConfig {
    PulseConfig {
        pulse_ms: config.pulse_ms,
        interval: std::time::Duration::from_millis(config.pulse_interval_ms.max(100)),
    }
}
