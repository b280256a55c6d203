use super::App;
use std::time::Instant;

const SPEED_STEP: u64 = 25;
const MIN_SPEED: u64 = 25;
const MAX_SPEED: u64 = 2000;

impl<S> App<S> {
    pub fn toggle_autoplay(&mut self) {
        self.autoplay = !self.autoplay;
        self.last_autoplay_tick = Instant::now();
    }

    /// Shorter delay between autoplay steps
    pub fn increase_speed(&mut self) {
        self.autoplay_speed = self.autoplay_speed.saturating_sub(SPEED_STEP).max(MIN_SPEED);
    }

    /// Longer delay between autoplay steps
    pub fn decrease_speed(&mut self) {
        self.autoplay_speed = (self.autoplay_speed + SPEED_STEP).min(MAX_SPEED);
    }
}
