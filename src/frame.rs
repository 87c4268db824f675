// src/frame.rs

//! Continuous per-tick callback into the simulation module.
//!
//! Each tick reports the wall time elapsed since the previous one. There is
//! no frame skipping or catch-up: if ticks stall, the next delta simply
//! carries the whole gap.

use crate::module::{HostImports, SimulationModule};
use log::trace;
use std::thread;
use std::time::{Duration, Instant};

/// Millisecond timestamps for the frame loop.
pub trait FrameClock {
    fn now_ms(&self) -> f64;
}

/// Monotonic clock measured from its creation.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

pub struct FrameDriver {
    previous_ms: f64,
    frames: u64,
}

impl FrameDriver {
    pub fn start(now_ms: f64) -> Self {
        Self {
            previous_ms: now_ms,
            frames: 0,
        }
    }

    /// Advances to `now_ms` and returns the elapsed milliseconds.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = now_ms - self.previous_ms;
        self.previous_ms = now_ms;
        self.frames += 1;
        delta
    }

    /// Ticks and hands the delta to the module's per-frame callback.
    pub fn tick_module(
        &mut self,
        now_ms: f64,
        module: &mut dyn SimulationModule,
        host: &mut dyn HostImports,
    ) -> f64 {
        let delta = self.tick(now_ms);
        trace!("FrameDriver: frame {} (delta {:.3} ms)", self.frames, delta);
        module.on_frame(host, delta);
        delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Sleeps out the remainder of each frame interval, standing in for the
/// display's refresh signal. Late frames are not compensated.
pub struct FramePacer {
    interval: Duration,
    last: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn wait_for_next_tick(&mut self) {
        if let Some(remaining) = self.interval.checked_sub(self.last.elapsed()) {
            thread::sleep(remaining);
        }
        self.last = Instant::now();
    }
}
