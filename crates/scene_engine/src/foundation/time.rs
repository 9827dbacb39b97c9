//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed-step accumulator
///
/// Frame time is banked and paid out in whole `step` slices. At most
/// `max_steps` slices are paid per frame; anything beyond that is dropped so
/// a slow frame cannot snowball into ever longer catch-up frames.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    /// Create an accumulator paying out `step`-second slices
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_steps,
            accumulator: 0.0,
        }
    }

    /// Length of one fixed step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time banked but not yet paid out
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Bank `delta_time` and return how many fixed steps to run this frame
    ///
    /// Non-finite deltas are ignored.
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if !delta_time.is_finite() {
            log::warn!("Ignoring non-finite frame delta {}", delta_time);
            return 0;
        }
        self.accumulator += delta_time.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            log::warn!(
                "Fixed update fell behind: dropping {:.4}s after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator %= self.step;
        }

        steps
    }

    /// Forget any banked time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
