use std::time::{Duration, Instant};

pub const DEFAULT_REQUIRED_PRESSES: u32 = 5;
pub const DEFAULT_MAX_GAP: Duration = Duration::from_secs(1);

/// Turns a run of quick presses on the finish button into one finish edge.
///
/// Presses must follow each other within `max_gap`; a slower press starts a
/// new chain. Reaching `required` presses fires once and resets.
#[derive(Debug, Clone)]
pub struct ChainedPressDetector {
    required: u32,
    max_gap: Duration,
    presses: u32,
    last_press: Option<Instant>,
}

impl Default for ChainedPressDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_PRESSES, DEFAULT_MAX_GAP)
    }
}

impl ChainedPressDetector {
    pub fn new(required: u32, max_gap: Duration) -> Self {
        Self {
            required: required.max(1),
            max_gap,
            presses: 0,
            last_press: None,
        }
    }

    fn within_window(&self, at: Instant) -> bool {
        self.last_press
            .is_some_and(|last| at.saturating_duration_since(last) < self.max_gap)
    }

    pub fn press(&mut self) -> bool {
        self.press_at(Instant::now())
    }

    /// Returns true exactly when this press completes the chain.
    pub fn press_at(&mut self, at: Instant) -> bool {
        if self.presses > 0 && !self.within_window(at) {
            self.presses = 0;
        }
        self.presses += 1;
        self.last_press = Some(at);

        if self.presses >= self.required {
            self.reset();
            return true;
        }
        false
    }

    /// Drops a stale chain once the window has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.presses > 0 && !self.within_window(now) {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.presses = 0;
        self.last_press = None;
    }

    pub fn presses(&self) -> u32 {
        self.presses
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.presses, self.required)
    }
}
