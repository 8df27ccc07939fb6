//! Local notification service
//!
//! Keeps the daily trigger table in a key-value store so triggers outlive the
//! process, and fires them from a cooperative `tick`. In the foreground the
//! firings become `Delivered` events for the running UI; in the background
//! (the daemon) they run the configured notify command and leave a pending tap
//! for the next UI launch.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::time::{Duration, SystemTime};

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LeftoversError, Result};
use crate::meal::{MealPayload, TriggerHandle};
use crate::scheduler::{
    ChannelConfig, DailyTrigger, ListenerId, NotificationEvent, NotificationService, Permission,
};
use crate::storage::KeyValueStore;

const TRIGGERS_KEY: &str = "triggers";
const PENDING_TAP_KEY: &str = "pending_tap";

/// A lock file not touched for this long belongs to a UI that died
pub const LOCK_STALE_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrigger {
    pub handle: TriggerHandle,
    pub hour: u32,
    pub minute: u32,
    pub payload: MealPayload,
}

#[derive(Debug, Clone)]
pub enum DeliveryMode {
    /// A UI is running and shows the alarm itself
    Foreground,
    /// Nobody is watching; hand the reminder to the desktop
    Background {
        notify_command: Option<String>,
        foreground_lock: PathBuf,
    },
}

pub struct LocalNotifier<S: KeyValueStore> {
    triggers: S,
    taps: S,
    enabled: bool,
    mode: DeliveryMode,
    listeners: Vec<(ListenerId, Sender<NotificationEvent>)>,
    next_listener: u64,
    last_tick: Option<NaiveDateTime>,
    channel: Option<ChannelConfig>,
    activity_log: Option<PathBuf>,
}

impl<S: KeyValueStore> LocalNotifier<S> {
    pub fn new(triggers: S, taps: S, enabled: bool, mode: DeliveryMode) -> Self {
        Self {
            triggers,
            taps,
            enabled,
            mode,
            listeners: Vec::new(),
            next_listener: 1,
            last_tick: None,
            channel: None,
            activity_log: None,
        }
    }

    /// Append every fired reminder to this file
    pub fn with_activity_log(mut self, path: PathBuf) -> Self {
        self.activity_log = Some(path);
        self
    }

    pub fn triggers(&self) -> Result<Vec<StoredTrigger>> {
        match self.triggers.get(TRIGGERS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_triggers(&mut self, triggers: &[StoredTrigger]) -> Result<()> {
        let json = serde_json::to_string(triggers)?;
        self.triggers.set(TRIGGERS_KEY, &json)
    }

    pub fn channel(&self) -> Option<&ChannelConfig> {
        self.channel.as_ref()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Advance the clock to `now`, firing every trigger whose time of day falls
    /// in `(previous tick, now]`. The first tick only arms the clock.
    /// Returns how many triggers fired.
    pub fn tick(&mut self, now: NaiveDateTime) -> Result<usize> {
        if matches!(self.mode, DeliveryMode::Foreground) {
            if let Some(payload) = take_pending_tap(&mut self.taps)? {
                log::info!("tap received for meal {}", payload.meal_id);
                self.emit(NotificationEvent::Tapped(payload));
            }
        }

        let last = match self.last_tick.replace(now) {
            Some(last) => last,
            None => return Ok(0),
        };
        if !self.enabled || now <= last {
            return Ok(0);
        }

        let due: Vec<StoredTrigger> = self
            .triggers()?
            .into_iter()
            .filter(|t| fires_between(t.hour, t.minute, last, now))
            .collect();

        for trigger in &due {
            self.fire(trigger, now);
        }
        Ok(due.len())
    }

    fn fire(&mut self, trigger: &StoredTrigger, now: NaiveDateTime) {
        log::info!(
            "reminder {} fired for meal {} ({})",
            trigger.handle, trigger.payload.meal_id, trigger.payload.meal_name
        );
        if let Some(path) = &self.activity_log {
            log_fired(path, trigger, now);
        }

        match self.mode.clone() {
            DeliveryMode::Foreground => {
                self.emit(NotificationEvent::Delivered(trigger.payload.clone()));
            }
            DeliveryMode::Background { notify_command, foreground_lock } => {
                if let Some(command) = notify_command {
                    if let Err(e) = send_command(&command, &trigger.payload) {
                        log::error!("notify command failed: {}", e);
                    }
                }
                if !ForegroundLock::is_held(&foreground_lock) {
                    if let Err(e) = record_tap(&mut self.taps, &trigger.payload) {
                        log::error!("could not record pending tap: {}", e);
                    }
                }
                self.emit(NotificationEvent::Delivered(trigger.payload.clone()));
            }
        }
    }

    fn emit(&mut self, event: NotificationEvent) {
        // Receivers that went away without unsubscribing are dropped here
        self.listeners.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

impl<S: KeyValueStore> NotificationService for LocalNotifier<S> {
    fn request_permission(&mut self) -> Result<Permission> {
        Ok(if self.enabled { Permission::Granted } else { Permission::Denied })
    }

    fn create_channel(&mut self, channel: &ChannelConfig) -> Result<()> {
        log::debug!(
            "channel {} importance={:?} visibility={:?} pattern={:?}",
            channel.id, channel.importance, channel.visibility, channel.vibration_pattern
        );
        self.channel = Some(channel.clone());
        Ok(())
    }

    fn schedule(&mut self, trigger: DailyTrigger, payload: MealPayload) -> Result<TriggerHandle> {
        let handle = TriggerHandle(format!("trigger-{}", Uuid::new_v4()));
        let mut triggers = self.triggers()?;
        triggers.push(StoredTrigger {
            handle: handle.clone(),
            hour: trigger.hour,
            minute: trigger.minute,
            payload,
        });
        self.save_triggers(&triggers)?;
        Ok(handle)
    }

    fn cancel(&mut self, handle: &TriggerHandle) -> Result<()> {
        let mut triggers = self.triggers()?;
        let before = triggers.len();
        triggers.retain(|t| &t.handle != handle);
        if triggers.len() != before {
            self.save_triggers(&triggers)?;
        }
        Ok(())
    }

    fn cancel_for_meal(&mut self, meal_id: &str) -> Result<usize> {
        let mut triggers = self.triggers()?;
        let before = triggers.len();
        triggers.retain(|t| t.payload.meal_id != meal_id);
        let removed = before - triggers.len();
        if removed > 0 {
            self.save_triggers(&triggers)?;
        }
        Ok(removed)
    }

    fn subscribe(&mut self, listener: Sender<NotificationEvent>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn take_cold_start_tap(&mut self) -> Result<Option<MealPayload>> {
        take_pending_tap(&mut self.taps)
    }

    fn poll(&mut self, now: NaiveDateTime) -> Result<usize> {
        self.tick(now)
    }
}

/// Whether `hour:minute` occurs on any day in the half-open range `(last, now]`
pub fn fires_between(hour: u32, minute: u32, last: NaiveDateTime, now: NaiveDateTime) -> bool {
    let time = match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => return false,
    };
    let mut day = last.date();
    while day <= now.date() {
        let at = day.and_time(time);
        if at > last && at <= now {
            return true;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => return false,
        };
    }
    false
}

/// Leave a tap for the UI to pick up (at launch, or on its next tick)
pub fn record_tap<S: KeyValueStore>(taps: &mut S, payload: &MealPayload) -> Result<()> {
    let json = serde_json::to_string(payload)?;
    taps.set(PENDING_TAP_KEY, &json)
}

fn take_pending_tap<S: KeyValueStore>(taps: &mut S) -> Result<Option<MealPayload>> {
    let json = match taps.get(PENDING_TAP_KEY)? {
        Some(json) => json,
        None => return Ok(None),
    };
    taps.remove(PENDING_TAP_KEY)?;
    match serde_json::from_str(&json) {
        Ok(payload) => Ok(Some(payload)),
        Err(e) => {
            log::warn!("discarding unreadable pending tap: {}", e);
            Ok(None)
        }
    }
}

/// Run the user's notify command with the payload JSON on stdin
fn send_command(command: &str, payload: &MealPayload) -> Result<()> {
    let json = serde_json::to_string(payload)?;

    let mut child = Command::new("sh")
        .args(["-c", command])
        .env("LEFTOVERS_MEAL_ID", &payload.meal_id)
        .env("LEFTOVERS_MEAL_NAME", &payload.meal_name)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(json.as_bytes())?;
    }

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LeftoversError::NotificationError(format!(
            "Command failed: {}",
            stderr
        )));
    }

    Ok(())
}

fn log_fired(path: &Path, trigger: &StoredTrigger, now: NaiveDateTime) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let line = format!(
            "{} | {:02}:{:02} | {} | {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            trigger.hour,
            trigger.minute,
            trigger.payload.meal_name,
            trigger.payload.meal_id,
        );
        let _ = file.write_all(line.as_bytes());
    }
}

/// Pid file marking a UI in the foreground; removed on drop.
/// The holder calls `refresh` well within `LOCK_STALE_AFTER`.
pub struct ForegroundLock {
    path: PathBuf,
}

impl ForegroundLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock = Self { path };
        lock.refresh()?;
        Ok(lock)
    }

    /// Rewrite the pid, bumping the file's modification time
    pub fn refresh(&self) -> Result<()> {
        std::fs::write(&self.path, std::process::id().to_string())?;
        Ok(())
    }

    pub fn is_held(path: &Path) -> bool {
        let pid = match std::fs::read_to_string(path) {
            Ok(pid) => pid,
            Err(_) => return false,
        };
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };
        lock_is_fresh(modified, SystemTime::now()) && process_alive(pid.trim())
    }
}

fn lock_is_fresh(modified: SystemTime, now: SystemTime) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age <= LOCK_STALE_AFTER,
        // Written "after" now: clock skew, not staleness
        Err(_) => true,
    }
}

impl Drop for ForegroundLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(target_os = "linux")]
fn process_alive(pid: &str) -> bool {
    pid.parse::<u32>().is_ok() && Path::new("/proc").join(pid).exists()
}

// No portable liveness check; freshness of the file stands in for it
#[cfg(not(target_os = "linux"))]
fn process_alive(pid: &str) -> bool {
    pid.parse::<u32>().is_ok()
}

/// Current local wall-clock time
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::mpsc;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn foreground() -> LocalNotifier<MemoryStore> {
        LocalNotifier::new(MemoryStore::new(), MemoryStore::new(), true, DeliveryMode::Foreground)
    }

    #[test]
    fn fires_between_is_half_open() {
        assert!(fires_between(18, 30, at(1, 18, 29, 59), at(1, 18, 30, 0)));
        assert!(!fires_between(18, 30, at(1, 18, 30, 0), at(1, 18, 30, 1)));
        assert!(!fires_between(18, 30, at(1, 18, 0, 0), at(1, 18, 29, 0)));
    }

    #[test]
    fn fires_between_handles_midnight() {
        assert!(fires_between(0, 0, at(1, 23, 59, 59), at(2, 0, 0, 0)));
        assert!(fires_between(0, 5, at(1, 23, 0, 0), at(2, 1, 0, 0)));
        assert!(!fires_between(12, 0, at(1, 23, 0, 0), at(2, 1, 0, 0)));
    }

    #[test]
    fn first_tick_only_arms() {
        let mut notifier = foreground();
        notifier.schedule(DailyTrigger { hour: 8, minute: 0 }, MealPayload::new("m", "Soup")).unwrap();
        assert_eq!(notifier.tick(at(1, 8, 0, 0)).unwrap(), 0);
        assert_eq!(notifier.tick(at(2, 8, 0, 0)).unwrap(), 1);
    }

    #[test]
    fn delivers_to_subscribers_and_stops_after_unsubscribe() {
        let mut notifier = foreground();
        let (tx, rx) = mpsc::channel();
        let id = notifier.subscribe(tx);
        let payload = MealPayload::new("m1", "Soup");
        notifier.schedule(DailyTrigger { hour: 8, minute: 0 }, payload.clone()).unwrap();

        notifier.tick(at(1, 7, 59, 0)).unwrap();
        notifier.tick(at(1, 8, 0, 0)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), NotificationEvent::Delivered(payload));

        notifier.unsubscribe(id);
        assert_eq!(notifier.listener_count(), 0);
        notifier.tick(at(2, 8, 0, 0)).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_config_is_kept() {
        let mut notifier = foreground();
        assert!(notifier.channel().is_none());
        notifier.create_channel(&ChannelConfig::meal_alarms()).unwrap();
        assert_eq!(notifier.channel().map(|c| c.id.as_str()), Some("meal-alarms"));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut notifier = foreground();
        let handle = notifier
            .schedule(DailyTrigger { hour: 8, minute: 0 }, MealPayload::new("m", "Soup"))
            .unwrap();
        notifier.cancel(&handle).unwrap();
        notifier.cancel(&handle).unwrap();
        notifier.cancel(&TriggerHandle("never-issued".into())).unwrap();
        assert!(notifier.triggers().unwrap().is_empty());
    }

    #[test]
    fn cancel_for_meal_sweeps_only_that_meal() {
        let mut notifier = foreground();
        for _ in 0..2 {
            notifier
                .schedule(DailyTrigger { hour: 8, minute: 0 }, MealPayload::new("chili", "Chili"))
                .unwrap();
        }
        notifier
            .schedule(DailyTrigger { hour: 9, minute: 0 }, MealPayload::new("soup", "Soup"))
            .unwrap();

        assert_eq!(notifier.cancel_for_meal("chili").unwrap(), 2);
        assert_eq!(notifier.cancel_for_meal("chili").unwrap(), 0);
        let left = notifier.triggers().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].payload.meal_id, "soup");
    }

    #[test]
    fn disabled_notifier_denies_and_never_fires() {
        let mut notifier =
            LocalNotifier::new(MemoryStore::new(), MemoryStore::new(), false, DeliveryMode::Foreground);
        assert_eq!(notifier.request_permission().unwrap(), Permission::Denied);
        notifier.schedule(DailyTrigger { hour: 8, minute: 0 }, MealPayload::new("m", "Soup")).unwrap();
        notifier.tick(at(1, 7, 0, 0)).unwrap();
        assert_eq!(notifier.tick(at(1, 9, 0, 0)).unwrap(), 0);
        assert_eq!(notifier.triggers().unwrap().len(), 1);
    }

    #[test]
    fn pending_tap_is_taken_once() {
        let mut notifier = foreground();
        let payload = MealPayload::new("m", "Soup");
        record_tap(&mut notifier.taps, &payload).unwrap();
        assert_eq!(notifier.take_cold_start_tap().unwrap(), Some(payload));
        assert_eq!(notifier.take_cold_start_tap().unwrap(), None);
    }

    #[test]
    fn foreground_tick_turns_recorded_taps_into_events() {
        let mut notifier = foreground();
        let (tx, rx) = mpsc::channel();
        notifier.subscribe(tx);
        let payload = MealPayload::new("m", "Soup");
        record_tap(&mut notifier.taps, &payload).unwrap();
        notifier.tick(at(1, 12, 0, 0)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), NotificationEvent::Tapped(payload));
    }

    #[test]
    fn background_fire_leaves_a_pending_tap_when_no_ui_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut notifier = LocalNotifier::new(
            MemoryStore::new(),
            MemoryStore::new(),
            true,
            DeliveryMode::Background {
                notify_command: None,
                foreground_lock: dir.path().join("foreground.lock"),
            },
        )
        .with_activity_log(dir.path().join("reminders.log"));
        let payload = MealPayload::new("m", "Soup");
        notifier.schedule(DailyTrigger { hour: 8, minute: 0 }, payload.clone()).unwrap();

        notifier.tick(at(1, 7, 0, 0)).unwrap();
        assert_eq!(notifier.tick(at(1, 8, 0, 0)).unwrap(), 1);
        assert_eq!(notifier.take_cold_start_tap().unwrap(), Some(payload));
        let log = std::fs::read_to_string(dir.path().join("reminders.log")).unwrap();
        assert!(log.contains("08:00 | Soup | m"));
    }

    #[test]
    fn background_fire_skips_pending_tap_while_ui_holds_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("foreground.lock");
        let _lock = ForegroundLock::acquire(&lock_path).unwrap();
        let mut notifier = LocalNotifier::new(
            MemoryStore::new(),
            MemoryStore::new(),
            true,
            DeliveryMode::Background { notify_command: None, foreground_lock: lock_path },
        );
        notifier.schedule(DailyTrigger { hour: 8, minute: 0 }, MealPayload::new("m", "Soup")).unwrap();
        notifier.tick(at(1, 7, 0, 0)).unwrap();
        notifier.tick(at(1, 8, 0, 0)).unwrap();
        assert_eq!(notifier.take_cold_start_tap().unwrap(), None);
    }

    #[test]
    fn foreground_lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreground.lock");
        {
            let _lock = ForegroundLock::acquire(&path).unwrap();
            assert!(ForegroundLock::is_held(&path));
        }
        assert!(!path.exists());
        assert!(!ForegroundLock::is_held(&path));
    }

    #[test]
    fn stale_lock_is_not_held() {
        let now = SystemTime::now();
        assert!(lock_is_fresh(now - Duration::from_secs(5), now));
        assert!(lock_is_fresh(now + Duration::from_secs(5), now));
        assert!(!lock_is_fresh(now - LOCK_STALE_AFTER - Duration::from_secs(1), now));
    }

    #[test]
    fn lock_with_garbage_pid_is_not_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreground.lock");
        std::fs::write(&path, "not-a-pid").unwrap();
        assert!(!ForegroundLock::is_held(&path));
    }
}
