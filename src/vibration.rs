use std::io::Write;

pub trait Vibrator {
    fn pulse(&mut self, duration_ms: u64);
    fn cancel_all(&mut self);
}

/// Rings the terminal bell once per pulse
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Vibrator for TerminalBell {
    fn pulse(&mut self, _duration_ms: u64) {
        if !self.enabled {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }

    // A bell cannot be cut short
    fn cancel_all(&mut self) {}
}

/// For headless commands
#[derive(Debug, Default)]
pub struct SilentVibrator;

impl Vibrator for SilentVibrator {
    fn pulse(&mut self, _duration_ms: u64) {}
    fn cancel_all(&mut self) {}
}
