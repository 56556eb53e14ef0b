//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic frame clock + wall clock)
//! - Frame scheduling (requestAnimationFrame on web)

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::sim::{Frame, PickerEvent, PickerState, tick};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Time source driving the reveal animator
pub trait Clock {
    /// Monotonic milliseconds (arbitrary origin)
    fn monotonic_ms(&self) -> f64;
    /// Unix time in milliseconds
    fn wall_ms(&self) -> f64;

    /// Both readings packed for `tick`
    fn frame(&self) -> Frame {
        Frame::new(self.monotonic_ms(), self.wall_ms())
    }
}

/// Native clock backed by `Instant` and `SystemTime`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wall_ms(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
    }
}

/// Virtual clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    monotonic: Cell<f64>,
    wall: Cell<f64>,
}

impl ManualClock {
    pub fn new(monotonic_ms: f64, wall_ms: f64) -> Self {
        Self {
            monotonic: Cell::new(monotonic_ms),
            wall: Cell::new(wall_ms),
        }
    }

    /// Move both clocks forward
    pub fn advance(&self, ms: f64) {
        self.monotonic.set(self.monotonic.get() + ms);
        self.wall.set(self.wall.get() + ms);
    }
}

impl Clock for ManualClock {
    fn monotonic_ms(&self) -> f64 {
        self.monotonic.get()
    }

    fn wall_ms(&self) -> f64 {
        self.wall.get()
    }
}

/// Drives a picker from a clock, one `frame()` per display refresh
///
/// Once torn down, frames are ignored for good.
#[derive(Debug)]
pub struct FrameDriver<C: Clock> {
    state: PickerState,
    clock: C,
    torn_down: bool,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(state: PickerState, clock: C) -> Self {
        Self {
            state,
            clock,
            torn_down: false,
        }
    }

    /// Run one frame. Returns whether another frame is wanted.
    pub fn frame(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let frame = self.clock.frame();
        tick(&mut self.state, &frame);
        self.state.wants_frame()
    }

    /// Start a spin with the configured winner count
    pub fn spin(&mut self) -> bool {
        let count = i64::from(self.state.settings.winner_count);
        self.request_spin(count)
    }

    /// Start a spin; always refused once torn down
    pub fn request_spin(&mut self, requested: i64) -> bool {
        if self.torn_down {
            log::debug!("Spin requested after teardown");
            return false;
        }
        self.state.request_spin(requested)
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn drain_events(&mut self) -> Vec<PickerEvent> {
        self.state.drain_events()
    }

    /// Cancel pending work; later frames do nothing
    pub fn teardown(&mut self) {
        if !self.torn_down {
            self.state.teardown();
            self.torn_down = true;
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
