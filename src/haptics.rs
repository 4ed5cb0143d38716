//! Best-effort haptic feedback.
//!
//! Callers fire and forget: an implementation that cannot vibrate simply
//! does nothing, and no implementation may fail.

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    /// Light tick for navigation and completed swipes
    Tap,
    /// Item added, order call started
    Confirm,
    /// Line removed, cart cleared
    Remove,
    Error,
}

impl HapticPattern {
    /// Vibration pattern in milliseconds, alternating on/off.
    pub fn pattern_ms(self) -> &'static [u64] {
        match self {
            HapticPattern::Tap => &[10],
            HapticPattern::Confirm => &[50],
            HapticPattern::Remove => &[50, 30, 50],
            HapticPattern::Error => &[100, 50, 100],
        }
    }
}

pub trait Haptics: Send + Sync {
    fn pulse(&self, pattern: HapticPattern);
}

/// For platforms without any feedback channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _pattern: HapticPattern) {}
}

/// Terminal stand-in for a vibration motor: one bell per "on" segment of the
/// pattern. Light taps are skipped, a bell per arrow key is too much.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&self, pattern: HapticPattern) {
        if pattern == HapticPattern::Tap {
            return;
        }
        let bells = pattern.pattern_ms().iter().step_by(2).count();
        let mut out = io::stdout();
        for _ in 0..bells {
            let _ = out.write_all(b"\x07");
        }
        let _ = out.flush();
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every pulse for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingHaptics {
        pulses: Mutex<Vec<HapticPattern>>,
    }

    impl RecordingHaptics {
        pub fn pulses(&self) -> Vec<HapticPattern> {
            self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
        }
    }

    impl Haptics for RecordingHaptics {
        fn pulse(&self, pattern: HapticPattern) {
            if let Ok(mut pulses) = self.pulses.lock() {
                pulses.push(pattern);
            }
        }
    }
}
