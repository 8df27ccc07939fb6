//! TUI state - the controller plus view-only state (form buffers, selection)

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::app::{Controller, Screen};
use crate::notifier::LocalNotifier;
use crate::scheduler::NotificationService;
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::vibration::{TerminalBell, Vibrator};

use super::types::*;

/// How often the meal list is re-read to pick up CLI changes
const RELOAD_INTERVAL: Duration = Duration::from_secs(1);

pub type LocalApp = App<JsonFileStore, LocalNotifier<JsonFileStore>, TerminalBell>;

pub struct App<S: KeyValueStore, N: NotificationService, V: Vibrator> {
    pub controller: Controller<S, N, V>,
    pub menu_selected: usize,
    pub selected_meal: usize,
    pub focus: FormField,
    pub name_input: String,
    pub time_input: String,
    pub status_message: Option<String>,
    /// Feedback shown inside the alarm overlay
    pub alarm_message: Option<String>,
    pub should_quit: bool,
    last_reload: Option<Instant>,
}

impl<S: KeyValueStore, N: NotificationService, V: Vibrator> App<S, N, V> {
    pub fn new(controller: Controller<S, N, V>) -> Self {
        Self {
            controller,
            menu_selected: 0,
            selected_meal: 0,
            focus: FormField::default(),
            name_input: String::new(),
            time_input: String::new(),
            status_message: None,
            alarm_message: None,
            should_quit: false,
            last_reload: None,
        }
    }

    /// Fire due reminders, pick up meal list changes made elsewhere, then
    /// advance the controller. Notifier and reload failures end up in the
    /// status line; the alarm pulse keeps going regardless.
    pub fn tick(&mut self, wall: NaiveDateTime, now: Instant) {
        let was_active = self.controller.overlay_visible();

        if let Err(e) = self.controller.scheduler_mut().poll(wall) {
            log::error!("reminder check failed: {}", e);
            self.status_message = Some(format!("Reminder check failed: {}", e));
        }

        let reload_due = self
            .last_reload
            .map_or(true, |at| now.duration_since(at) >= RELOAD_INTERVAL);
        if reload_due {
            self.last_reload = Some(now);
            match self.controller.load() {
                Ok(()) => self.clamp_selection(),
                Err(e) => {
                    log::error!("reloading meals failed: {}", e);
                    self.status_message = Some(format!("Could not read meals: {}", e));
                }
            }
        }

        self.controller.tick(now);
        if !was_active && self.controller.overlay_visible() {
            self.alarm_message = None;
        }
    }

    pub fn open_menu_item(&mut self) {
        match MENU_ITEMS.get(self.menu_selected) {
            Some(MenuItem::FoodWastePreventer) => {
                self.controller.navigate(Screen::Tool);
            }
            Some(MenuItem::Quit) => self.should_quit = true,
            None => {}
        }
    }

    pub fn submit_meal(&mut self) {
        let name = self.name_input.clone();
        let time = self.time_input.clone();
        // Failures surface as an advisory from the controller
        if let Ok(meal) = self.controller.add_meal(&name, &time) {
            self.status_message = Some(format!("Reminder set for {} at {}", meal.name, meal.time_label()));
            self.name_input.clear();
            self.time_input.clear();
            self.focus = FormField::Name;
            self.selected_meal = 0;
        }
    }

    pub fn cancel_selected_meal(&mut self) {
        let id = match self.controller.meals().get(self.selected_meal) {
            Some(meal) => meal.id.clone(),
            None => return,
        };
        match self.controller.cancel_meal(&id, Instant::now()) {
            Ok(Some(meal)) => self.status_message = Some(format!("Canceled {}", meal.name)),
            Ok(None) => {}
            Err(e) => self.status_message = Some(format!("Could not cancel meal: {}", e)),
        }
        self.clamp_selection();
    }

    pub fn dismiss_alarm(&mut self) {
        match self.controller.dismiss_alarm(Instant::now()) {
            Ok(session) => {
                self.alarm_message = None;
                self.status_message = Some(format!("Enjoy your {}!", session.meal_name));
            }
            Err(e) => self.alarm_message = Some(e.to_string()),
        }
    }

    pub fn cancel_alarm(&mut self) {
        match self.controller.cancel_alarm(Instant::now()) {
            Ok(session) => {
                self.alarm_message = None;
                self.status_message = Some(format!("Alarm for {} canceled for good", session.meal_name));
                self.clamp_selection();
            }
            Err(e) => self.alarm_message = Some(e.to_string()),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.meals().len();
        if self.selected_meal >= len {
            self.selected_meal = len.saturating_sub(1);
        }
    }

    pub fn next_meal(&mut self) {
        let len = self.controller.meals().len();
        if len > 0 {
            self.selected_meal = (self.selected_meal + 1) % len;
        }
    }

    pub fn prev_meal(&mut self) {
        let len = self.controller.meals().len();
        if len > 0 {
            self.selected_meal = (self.selected_meal + len - 1) % len;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::meal::MealPayload;
    use crate::scheduler::NotificationEvent;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn wall(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    #[test]
    fn broken_trigger_table_does_not_stop_the_pulse() {
        let mut triggers = MemoryStore::new();
        triggers.set("triggers", "not json").unwrap();
        let (mut app, pulses) = app_with_triggers(triggers);
        let now = Instant::now();

        app.tick(wall(0), now);
        app.controller
            .on_notification(&NotificationEvent::Delivered(MealPayload::new("m1", "Soup")), now);
        assert_eq!(pulses.get(), 1);

        app.tick(wall(1), now + Duration::from_secs(2));
        assert!(app.status_message.as_deref().unwrap_or("").starts_with("Reminder check failed"));
        assert_eq!(pulses.get(), 2);
        assert!(app.controller.overlay_visible());
    }

    #[test]
    fn tick_picks_up_meals_written_by_another_process() {
        use crate::alarm::{Alarm, PulseConfig};
        use crate::notifier::DeliveryMode;
        use crate::scheduler::ReminderScheduler;
        use crate::storage::JsonFileStore;
        use crate::store::MealStore;
        use crate::vibration::SilentVibrator;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meals.json");
        let notifier =
            LocalNotifier::new(MemoryStore::new(), MemoryStore::new(), true, DeliveryMode::Foreground);
        let mut app = App::new(Controller::new(
            MealStore::new(JsonFileStore::open(&path).unwrap()),
            ReminderScheduler::new(notifier),
            Alarm::new(SilentVibrator, PulseConfig::default()),
        ));
        let now = Instant::now();
        app.tick(wall(0), now);
        assert!(app.controller.meals().is_empty());

        let json = r#"[{"id":"m1","name":"Soup","hour":12,"minute":0,"schedulerHandle":"t1","createdAt":"2026-03-01T12:00:00Z"}]"#;
        JsonFileStore::open(&path).unwrap().set("meals", json).unwrap();

        app.tick(wall(0), now + Duration::from_millis(100));
        assert!(app.controller.meals().is_empty());
        app.tick(wall(0), now + RELOAD_INTERVAL);
        assert_eq!(app.controller.meals().len(), 1);
    }
}
