//! Involuntary blink driver.
//!
//! Runs independently of the expression blender and writes straight into the
//! two blink control slots. It must run after the blender each frame so that
//! it is the last writer for those slots.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::blender::ease_in_out_cubic;
use crate::config::BlinkConfig;

/// Blink driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    Idle,
    Blinking,
}

#[derive(Debug, Clone)]
pub struct BlinkDriver {
    left: Option<usize>,
    right: Option<usize>,
    phase: BlinkPhase,
    start_ms: f64,
    next_blink_ms: f64,
    close_ms: f64,
    open_ms: f64,
    min_delay_ms: f64,
    max_delay_ms: f64,
    influence: f32,
    blinks_started: u64,
    rng: StdRng,
}

impl BlinkDriver {
    /// Create a driver for the resolved blink slots. Inert unless both are `Some`.
    pub fn new(left: Option<usize>, right: Option<usize>, config: &BlinkConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            left,
            right,
            phase: BlinkPhase::Idle,
            start_ms: 0.0,
            next_blink_ms: 0.0,
            close_ms: config.close_ms,
            open_ms: config.open_ms,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms),
            influence: 0.0,
            blinks_started: 0,
            rng,
        }
    }

    /// Driver with no blink controls
    pub fn inert(config: &BlinkConfig) -> Self {
        Self::new(None, None, config)
    }

    pub fn is_active(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn is_blinking(&self) -> bool {
        self.phase == BlinkPhase::Blinking
    }

    /// Current eyelid influence (0 = open, 1 = closed)
    pub fn influence(&self) -> f32 {
        self.influence
    }

    pub fn next_blink_ms(&self) -> f64 {
        self.next_blink_ms
    }

    pub fn blinks_started(&self) -> u64 {
        self.blinks_started
    }

    /// Advance to `now_ms`, writing the influence into `values` while blinking
    pub fn advance(&mut self, now_ms: f64, values: &mut [f32]) {
        let (Some(left), Some(right)) = (self.left, self.right) else {
            return;
        };

        if self.phase == BlinkPhase::Idle && now_ms >= self.next_blink_ms {
            self.phase = BlinkPhase::Blinking;
            self.start_ms = now_ms;
            // Schedules the following blink, independent of this one's length
            self.next_blink_ms =
                now_ms + self.rng.random_range(self.min_delay_ms..=self.max_delay_ms);
            self.blinks_started += 1;
        }

        if self.phase != BlinkPhase::Blinking {
            return;
        }

        let elapsed = now_ms - self.start_ms;
        self.influence = if elapsed <= self.close_ms {
            ease_in_out_cubic((elapsed / self.close_ms) as f32)
        } else if elapsed <= self.close_ms + self.open_ms {
            1.0 - ease_in_out_cubic(((elapsed - self.close_ms) / self.open_ms) as f32)
        } else {
            self.phase = BlinkPhase::Idle;
            0.0
        };

        for slot in [left, right] {
            if let Some(value) = values.get_mut(slot) {
                *value = self.influence;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> BlinkConfig {
        BlinkConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Run the driver at a fixed frame step, returning (time, influence) samples
    fn run(driver: &mut BlinkDriver, until_ms: f64, step_ms: f64) -> Vec<(f64, f32)> {
        let mut values = vec![0.0f32; 2];
        let mut samples = Vec::new();
        let mut now = 0.0;
        while now <= until_ms {
            driver.advance(now, &mut values);
            assert_eq!(values[0], values[1]);
            samples.push((now, values[0]));
            now += step_ms;
        }
        samples
    }

    #[test]
    fn test_inert_without_both_slots() {
        let mut driver = BlinkDriver::new(Some(0), None, &seeded(1));
        assert!(!driver.is_active());

        let mut values = vec![0.5f32; 2];
        driver.advance(10_000.0, &mut values);
        assert_eq!(values, vec![0.5, 0.5]);
        assert_eq!(driver.blinks_started(), 0);
    }

    #[test]
    fn test_first_blink_fires_immediately() {
        let mut driver = BlinkDriver::new(Some(0), Some(1), &seeded(1));
        let mut values = vec![0.0f32; 2];
        driver.advance(0.0, &mut values);
        assert!(driver.is_blinking());
        assert!(driver.next_blink_ms() >= 2000.0 && driver.next_blink_ms() <= 6000.0);
    }

    #[test]
    fn test_blink_shape() {
        let mut driver = BlinkDriver::new(Some(0), Some(1), &seeded(2));
        let mut values = vec![0.0f32; 2];

        driver.advance(0.0, &mut values);
        assert_eq!(values[0], 0.0);

        driver.advance(75.0, &mut values);
        assert_eq!(values[0], 1.0);

        driver.advance(75.0 + 62.5, &mut values);
        assert!((values[0] - 0.5).abs() < 1e-5);

        driver.advance(200.0, &mut values);
        assert_eq!(values[0], 0.0);

        driver.advance(201.0, &mut values);
        assert_eq!(driver.phase(), BlinkPhase::Idle);
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn test_blink_overrides_existing_values() {
        let mut driver = BlinkDriver::new(Some(0), Some(1), &seeded(3));
        let mut values = vec![0.9f32, 0.9, 0.4];
        driver.advance(0.0, &mut values);
        driver.advance(40.0, &mut values);
        assert!(values[0] < 0.9);
        assert_eq!(values[2], 0.4);
    }

    #[test]
    fn test_every_window_contains_a_blink() {
        let mut driver = BlinkDriver::new(Some(0), Some(1), &seeded(42));
        let samples = run(&mut driver, 120_000.0, 5.0);

        let starts: Vec<f64> = samples
            .windows(2)
            .filter(|w| w[0].1 == 0.0 && w[1].1 > 0.0)
            .map(|w| w[1].0)
            .collect();
        assert!(starts.len() >= 20);

        for pair in starts.windows(2) {
            let gap = pair[1] - pair[0];
            // Never overlapping, never longer than the max delay (plus one frame)
            assert!(gap >= 2000.0 - 5.0, "gap {gap}");
            assert!(gap <= 6000.0 + 10.0, "gap {gap}");
        }
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let mut a = BlinkDriver::new(Some(0), Some(1), &seeded(9));
        let mut b = BlinkDriver::new(Some(0), Some(1), &seeded(9));
        assert_eq!(run(&mut a, 30_000.0, 16.0), run(&mut b, 30_000.0, 16.0));
    }
}
