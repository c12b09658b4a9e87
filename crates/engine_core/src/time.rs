//! Time management for the game loop.

use std::time::{Duration, Instant};

/// Largest simulation step handed to the update loop. Longer pauses (window
/// drags, debugger breaks) are truncated so units never teleport and
/// production never jumps ahead.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Clamped duration of the last frame.
    delta: Duration,
    /// Upper bound applied to `delta`.
    max_delta: Duration,
    /// Total simulated time (sum of clamped deltas).
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Frames counted in the current one-second FPS window.
    fps_frames: u32,
    /// Start of the current FPS window (in simulated time).
    fps_window: Duration,
    /// Frames per second measured over the last full window.
    fps: u32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    /// Create a time manager with a custom step cap.
    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            max_delta,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fps_frames: 0,
            fps_window: Duration::ZERO,
            fps: 0,
        }
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_frame;
        self.last_frame = now;
        self.advance(raw);
    }

    /// Advance by an explicit duration. Used by the headless loop and tests.
    pub fn advance(&mut self, raw: Duration) {
        if raw > self.max_delta {
            log::debug!("Frame took {:?}, clamping step to {:?}", raw, self.max_delta);
        }
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;

        self.fps_frames += 1;
        if self.elapsed - self.fps_window >= Duration::from_secs(1) {
            self.fps = self.fps_frames;
            self.fps_frames = 0;
            self.fps_window = self.elapsed;
        }
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last full second of simulated time.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
