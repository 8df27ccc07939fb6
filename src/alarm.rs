//! Alarm sessions
//!
//! An alarm is raised when a reminder fires and stays up until the user types
//! the confirmation sentence for that meal. While it is up the vibrator is
//! pulsed on a fixed interval. Alarms that arrive while another is showing
//! wait in a queue and are shown in arrival order.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{LeftoversError, Result};
use crate::meal::MealPayload;
use crate::vibration::Vibrator;

/// The sentence that unlocks the alarm for `meal_name`
pub fn required_sentence(meal_name: &str) -> String {
    format!("my name is sarah and i will use the {} today", meal_name.to_lowercase())
}

/// Trim and lowercase `typed`, then compare exactly
pub fn sentence_matches(typed: &str, meal_name: &str) -> bool {
    typed.trim().to_lowercase() == required_sentence(meal_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSession {
    pub meal_id: String,
    pub meal_name: String,
}

impl From<&MealPayload> for AlarmSession {
    fn from(payload: &MealPayload) -> Self {
        Self {
            meal_id: payload.meal_id.clone(),
            meal_name: payload.meal_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Active(AlarmSession),
}

#[derive(Debug, Clone, Copy)]
pub struct PulseConfig {
    pub pulse_ms: u64,
    pub interval: Duration,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 400,
            interval: Duration::from_millis(1500),
        }
    }
}

pub struct Alarm<V: Vibrator> {
    state: AlarmState,
    queue: VecDeque<AlarmSession>,
    typed: String,
    vibrator: V,
    pulse: PulseConfig,
    next_pulse: Option<Instant>,
}

impl<V: Vibrator> Alarm<V> {
    pub fn new(vibrator: V, pulse: PulseConfig) -> Self {
        Self {
            state: AlarmState::Idle,
            queue: VecDeque::new(),
            typed: String::new(),
            vibrator,
            pulse,
            next_pulse: None,
        }
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    pub fn session(&self) -> Option<&AlarmSession> {
        match &self.state {
            AlarmState::Active(session) => Some(session),
            AlarmState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_pulsing(&self) -> bool {
        self.next_pulse.is_some()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn vibrator(&self) -> &V {
        &self.vibrator
    }

    /// Show an alarm for `payload`. Returns false for payloads missing a meal
    /// id or name. A meal that is already showing or waiting is not added twice.
    pub fn raise(&mut self, payload: &MealPayload, now: Instant) -> bool {
        if !payload.is_valid() {
            log::warn!("ignoring alarm with incomplete payload {:?}", payload);
            return false;
        }
        let session = AlarmSession::from(payload);
        match &self.state {
            AlarmState::Active(current) => {
                if current.meal_id != session.meal_id
                    && !self.queue.iter().any(|s| s.meal_id == session.meal_id)
                {
                    log::info!("queueing alarm for {} behind {}", session.meal_id, current.meal_id);
                    self.queue.push_back(session);
                }
            }
            AlarmState::Idle => self.enter(session, now),
        }
        true
    }

    fn enter(&mut self, session: AlarmSession, now: Instant) {
        log::info!("alarm raised for {} ({})", session.meal_id, session.meal_name);
        self.state = AlarmState::Active(session);
        self.typed.clear();
        self.vibrator.pulse(self.pulse.pulse_ms);
        self.next_pulse = Some(now + self.pulse.interval);
    }

    fn leave(&mut self, now: Instant) {
        self.next_pulse = None;
        self.vibrator.cancel_all();
        self.typed.clear();
        self.state = AlarmState::Idle;
        if let Some(next) = self.queue.pop_front() {
            self.enter(next, now);
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_active() {
            self.typed.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.typed.pop();
    }

    pub fn clear_typed(&mut self) {
        self.typed.clear();
    }

    pub fn can_unlock(&self) -> bool {
        self.session()
            .map(|s| sentence_matches(&self.typed, &s.meal_name))
            .unwrap_or(false)
    }

    /// End the current alarm if the typed sentence matches, returning the
    /// session that ended
    pub fn unlock(&mut self, now: Instant) -> Result<AlarmSession> {
        let session = self
            .session()
            .cloned()
            .ok_or_else(|| LeftoversError::Validation("no alarm is active".into()))?;
        if !sentence_matches(&self.typed, &session.meal_name) {
            return Err(LeftoversError::Validation(format!(
                "type \"{}\" to continue",
                required_sentence(&session.meal_name)
            )));
        }
        log::info!("alarm unlocked for {}", session.meal_id);
        self.leave(now);
        Ok(session)
    }

    /// Forget every alarm for `meal_id`, ending the current one if it matches
    pub fn clear_meal(&mut self, meal_id: &str, now: Instant) {
        self.queue.retain(|s| s.meal_id != meal_id);
        if self.session().map(|s| s.meal_id == meal_id).unwrap_or(false) {
            log::info!("alarm for {} cleared with its meal", meal_id);
            self.leave(now);
        }
    }

    /// Pulse again if the interval has elapsed
    pub fn tick(&mut self, now: Instant) {
        if let Some(due) = self.next_pulse {
            if now >= due {
                self.vibrator.pulse(self.pulse.pulse_ms);
                self.next_pulse = Some(now + self.pulse.interval);
            }
        }
    }

    /// End everything without promoting queued alarms
    pub fn stop(&mut self) {
        self.queue.clear();
        self.next_pulse = None;
        self.vibrator.cancel_all();
        self.typed.clear();
        self.state = AlarmState::Idle;
    }
}

impl<V: Vibrator> Drop for Alarm<V> {
    fn drop(&mut self) {
        if self.next_pulse.is_some() {
            self.vibrator.cancel_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingVibrator {
        pulses: usize,
        cancels: usize,
    }

    impl Vibrator for CountingVibrator {
        fn pulse(&mut self, _duration_ms: u64) {
            self.pulses += 1;
        }
        fn cancel_all(&mut self) {
            self.cancels += 1;
        }
    }

    fn alarm() -> Alarm<CountingVibrator> {
        Alarm::new(CountingVibrator::default(), PulseConfig::default())
    }

    fn type_str(alarm: &mut Alarm<CountingVibrator>, text: &str) {
        for c in text.chars() {
            alarm.push_char(c);
        }
    }

    #[test]
    fn required_sentence_lowercases_the_meal() {
        assert_eq!(
            required_sentence("Tuna Casserole"),
            "my name is sarah and i will use the tuna casserole today"
        );
    }

    #[test]
    fn sentence_match_is_case_insensitive_but_exact() {
        let meal = "Tuna Casserole";
        assert!(sentence_matches("My Name Is Sarah And I Will Use The Tuna Casserole Today", meal));
        assert!(sentence_matches("  my name is sarah and i will use the tuna casserole today \n", meal));
        assert!(!sentence_matches("my name is sarah and i will use the tuna casserole today.", meal));
        assert!(!sentence_matches("my name is sarah and i will use the tuna  casserole today", meal));
        assert!(!sentence_matches("my name is sarah", meal));
    }

    #[test]
    fn raising_starts_one_pulse_and_clears_typed_text() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        assert!(alarm.is_active());
        assert!(alarm.is_pulsing());
        assert_eq!(alarm.vibrator().pulses, 1);
        assert_eq!(alarm.typed(), "");
    }

    #[test]
    fn incomplete_payload_does_not_raise() {
        let mut alarm = alarm();
        assert!(!alarm.raise(&MealPayload::new("", "Soup"), Instant::now()));
        assert_eq!(alarm.state(), &AlarmState::Idle);
        assert_eq!(alarm.vibrator().pulses, 0);
    }

    #[test]
    fn pulses_repeat_on_the_interval() {
        let mut alarm = alarm();
        let start = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), start);
        alarm.tick(start + Duration::from_millis(500));
        assert_eq!(alarm.vibrator().pulses, 1);
        alarm.tick(start + Duration::from_millis(1500));
        assert_eq!(alarm.vibrator().pulses, 2);
        alarm.tick(start + Duration::from_millis(3000));
        assert_eq!(alarm.vibrator().pulses, 3);
    }

    #[test]
    fn wrong_sentence_keeps_alarm_up() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        type_str(&mut alarm, "no");
        assert!(matches!(alarm.unlock(now), Err(LeftoversError::Validation(_))));
        assert!(alarm.is_active());
        assert!(alarm.is_pulsing());
    }

    #[test]
    fn unlocking_stops_pulse_and_resets_buffer() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        type_str(&mut alarm, "my name is sarah and i will use the soup today");
        assert!(alarm.can_unlock());
        let session = alarm.unlock(now).unwrap();
        assert_eq!(session.meal_id, "m1");
        assert!(!alarm.is_active());
        assert!(!alarm.is_pulsing());
        assert_eq!(alarm.typed(), "");
        assert_eq!(alarm.vibrator().cancels, 1);

        alarm.tick(now + Duration::from_secs(60));
        assert_eq!(alarm.vibrator().pulses, 1);
    }

    #[test]
    fn second_alarm_waits_for_the_first() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        alarm.raise(&MealPayload::new("m2", "Rice"), now);
        alarm.raise(&MealPayload::new("m2", "Rice"), now);
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        assert_eq!(alarm.queued(), 1);
        assert_eq!(alarm.session().unwrap().meal_id, "m1");

        type_str(&mut alarm, "my name is sarah and i will use the soup today");
        alarm.unlock(now).unwrap();
        assert_eq!(alarm.session().unwrap().meal_name, "Rice");
        assert!(alarm.is_pulsing());
        assert_eq!(alarm.typed(), "");
        assert_eq!(alarm.vibrator().pulses, 2);
    }

    #[test]
    fn clearing_a_meal_drops_its_queued_alarm() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        alarm.raise(&MealPayload::new("m2", "Rice"), now);
        alarm.clear_meal("m2", now);
        assert_eq!(alarm.queued(), 0);
        alarm.clear_meal("m1", now);
        assert!(!alarm.is_active());
        assert!(!alarm.is_pulsing());
    }

    #[test]
    fn stop_ends_everything() {
        let mut alarm = alarm();
        let now = Instant::now();
        alarm.raise(&MealPayload::new("m1", "Soup"), now);
        alarm.raise(&MealPayload::new("m2", "Rice"), now);
        alarm.stop();
        assert!(!alarm.is_active());
        assert!(!alarm.is_pulsing());
        assert_eq!(alarm.queued(), 0);
    }

    #[test]
    fn typing_is_ignored_while_idle() {
        let mut alarm = alarm();
        alarm.push_char('x');
        assert_eq!(alarm.typed(), "");
    }
}
