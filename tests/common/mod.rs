//! Fakes for the platform collaborators

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use leftovers::alarm::{Alarm, PulseConfig};
use leftovers::app::Controller;
use leftovers::error::{LeftoversError, Result};
use leftovers::meal::{MealPayload, TriggerHandle};
use leftovers::scheduler::{
    ChannelConfig, DailyTrigger, ListenerId, NotificationEvent, NotificationService, Permission,
    ReminderScheduler,
};
use leftovers::storage::MemoryStore;
use leftovers::store::MealStore;
use leftovers::vibration::Vibrator;

#[derive(Default)]
pub struct NotifierState {
    pub permission_requests: usize,
    pub deny: bool,
    pub fail_schedule: bool,
    pub channels: Vec<ChannelConfig>,
    pub scheduled: Vec<(TriggerHandle, DailyTrigger, MealPayload)>,
    pub canceled: Vec<TriggerHandle>,
    pub listeners: Vec<(ListenerId, Sender<NotificationEvent>)>,
    pub cold_start_tap: Option<MealPayload>,
    next_id: u64,
}

impl NotifierState {
    pub fn active(&self) -> Vec<&TriggerHandle> {
        self.scheduled
            .iter()
            .map(|(h, _, _)| h)
            .filter(|h| !self.canceled.contains(h))
            .collect()
    }

    pub fn emit(&self, event: NotificationEvent) {
        for (_, tx) in &self.listeners {
            let _ = tx.send(event.clone());
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeNotifier(pub Rc<RefCell<NotifierState>>);

impl NotificationService for FakeNotifier {
    fn request_permission(&mut self) -> Result<Permission> {
        let mut state = self.0.borrow_mut();
        state.permission_requests += 1;
        Ok(if state.deny { Permission::Denied } else { Permission::Granted })
    }

    fn create_channel(&mut self, channel: &ChannelConfig) -> Result<()> {
        self.0.borrow_mut().channels.push(channel.clone());
        Ok(())
    }

    fn schedule(&mut self, trigger: DailyTrigger, payload: MealPayload) -> Result<TriggerHandle> {
        let mut state = self.0.borrow_mut();
        if state.fail_schedule {
            return Err(LeftoversError::NotificationError("scheduler offline".into()));
        }
        state.next_id += 1;
        let handle = TriggerHandle(format!("fake-{}", state.next_id));
        state.scheduled.push((handle.clone(), trigger, payload));
        Ok(handle)
    }

    fn cancel(&mut self, handle: &TriggerHandle) -> Result<()> {
        self.0.borrow_mut().canceled.push(handle.clone());
        Ok(())
    }

    fn cancel_for_meal(&mut self, meal_id: &str) -> Result<usize> {
        let mut state = self.0.borrow_mut();
        let orphans: Vec<TriggerHandle> = state
            .scheduled
            .iter()
            .filter(|(h, _, p)| p.meal_id == meal_id && !state.canceled.contains(h))
            .map(|(h, _, _)| h.clone())
            .collect();
        state.canceled.extend(orphans.iter().cloned());
        Ok(orphans.len())
    }

    fn subscribe(&mut self, listener: Sender<NotificationEvent>) -> ListenerId {
        let mut state = self.0.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.0.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
    }

    fn take_cold_start_tap(&mut self) -> Result<Option<MealPayload>> {
        Ok(self.0.borrow_mut().cold_start_tap.take())
    }
}

#[derive(Default)]
pub struct VibratorState {
    pub pulses: usize,
    pub cancels: usize,
}

#[derive(Clone, Default)]
pub struct FakeVibrator(pub Rc<RefCell<VibratorState>>);

impl Vibrator for FakeVibrator {
    fn pulse(&mut self, _duration_ms: u64) {
        self.0.borrow_mut().pulses += 1;
    }

    fn cancel_all(&mut self) {
        self.0.borrow_mut().cancels += 1;
    }
}

pub type TestController = Controller<MemoryStore, FakeNotifier, FakeVibrator>;

pub struct Harness {
    pub controller: TestController,
    pub notifier: Rc<RefCell<NotifierState>>,
    pub vibrator: Rc<RefCell<VibratorState>>,
}

pub fn harness_with(storage: MemoryStore, notifier: FakeNotifier) -> Harness {
    let vibrator = FakeVibrator::default();
    let handles = (notifier.0.clone(), vibrator.0.clone());
    let controller = Controller::new(
        MealStore::new(storage),
        ReminderScheduler::new(notifier),
        Alarm::new(vibrator, PulseConfig::default()),
    );
    Harness {
        controller,
        notifier: handles.0,
        vibrator: handles.1,
    }
}

pub fn harness() -> Harness {
    harness_with(MemoryStore::new(), FakeNotifier::default())
}

pub fn unlock_sentence(meal_name: &str) -> String {
    format!("My Name Is Sarah And I Will Use The {} Today", meal_name)
}
