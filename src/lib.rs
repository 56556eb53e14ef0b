//! Ticker Picker - a name ticker for giveaways and door-prize draws
//!
//! Core modules:
//! - `sim`: Deterministic selection engine (pool, sampler, reveal animator, winner session)
//! - `ledger`: Winner history grouped by spin batch
//! - `settings`: Host-tunable configuration
//! - `platform`: Clock abstraction and browser frame driver

pub mod ledger;
pub mod platform;
pub mod settings;
pub mod sim;

pub use ledger::{BatchId, HistoryLedger, HistoryRecord, RecordId};
pub use settings::PickerSettings;

/// Engine configuration constants
pub mod consts {
    /// Total spin duration before the winners are revealed
    pub const SPIN_DURATION_MS: f64 = 4000.0;
    /// Redisplay interval at the start of a spin (about one frame)
    pub const MIN_REDISPLAY_INTERVAL_MS: f64 = 16.0;
    /// Extra interval added at full ease (slows to ~0.6s near the end)
    pub const REDISPLAY_INTERVAL_RANGE_MS: f64 = 600.0;

    /// Scale pulse applied whenever the flicker shows a new entry
    pub const FLICKER_PULSE_SCALE: f32 = 1.05;
    /// Per-frame decay of the flicker pulse back toward 1.0
    pub const FLICKER_SCALE_DECAY: f32 = 0.01;
    /// Scale pulse applied on settle
    pub const SETTLE_PULSE_SCALE: f32 = 1.2;
    /// How long the settle pulse holds before returning to 1.0
    pub const SETTLE_PULSE_MS: f64 = 300.0;

    /// A spin needs at least this many entries in the pool
    pub const MIN_POOL_FOR_SPIN: usize = 2;
    /// Entries shown in the pool preview list
    pub const POOL_PREVIEW_LIMIT: usize = 50;

    /// Entry colors, assigned cyclically by pool position
    pub const PALETTE: [&str; 8] = [
        "#ed1c24", "#ffcb04", "#71bf43", "#f5821f", "#9d0a0e", "#ed1c24", "#ffcb04", "#71bf43",
    ];
    /// Display color while idle
    pub const STANDBY_COLOR: &str = "#ed1c24";
    /// Display color for a multi-winner summary
    pub const SUCCESS_COLOR: &str = "#71bf43";
    /// Display text while idle
    pub const STANDBY_LABEL: &str = "READY";
}

/// Cubic ease-in over normalized progress
#[inline]
pub fn ease_in_cubic(progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    t * t * t
}

/// Milliseconds between flicker redisplays for a given ease value
///
/// Starts at roughly one frame and grows to ~616ms as `ease` reaches 1.
#[inline]
pub fn redisplay_interval_ms(ease: f64) -> f64 {
    consts::MIN_REDISPLAY_INTERVAL_MS + ease * consts::REDISPLAY_INTERVAL_RANGE_MS
}

/// Palette color for a pool position (wraps)
#[inline]
pub fn palette_color(index: usize) -> &'static str {
    consts::PALETTE[index % consts::PALETTE.len()]
}
