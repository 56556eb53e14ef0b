//! Picker settings
//!
//! Host-tunable configuration, loaded from JSON. Nothing is persisted
//! between sessions; the host owns storage if it wants any.

use serde::{Deserialize, Serialize};

use crate::consts::POOL_PREVIEW_LIMIT;

/// Picker settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    /// Giveaway title shown above the ticker
    pub title: String,
    /// Winners to draw per spin (clamped against the pool at spin time)
    pub winner_count: u32,
    /// Entries shown in the pool list before "and N more"
    pub preview_limit: usize,

    // === Accessibility ===
    /// Reduced motion (suppress scale pulses)
    pub reduced_motion: bool,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            title: "Grand Giveaway".to_string(),
            winner_count: 1,
            preview_limit: POOL_PREVIEW_LIMIT,
            reduced_motion: false,
        }
    }
}

impl PickerSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.winner_count = settings.winner_count.max(1);
        Ok(settings)
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings for \"{}\"", settings.title);
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings ({err}), using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Set the winner count, clamped to `[1, max_winners(pool_len)]`
    pub fn set_winner_count(&mut self, count: i64, pool_len: usize) {
        self.winner_count = clamp_winner_count(count, pool_len) as u32;
    }

    /// Stepper "+" button
    pub fn increment_winner_count(&mut self, pool_len: usize) {
        self.set_winner_count(i64::from(self.winner_count) + 1, pool_len);
    }

    /// Stepper "-" button
    pub fn decrement_winner_count(&mut self, pool_len: usize) {
        self.set_winner_count(i64::from(self.winner_count) - 1, pool_len);
    }

    /// Reset the pending winner count (used when the pool is cleared)
    pub fn reset_winner_count(&mut self) {
        self.winner_count = 1;
    }

    /// Effective scale for a requested pulse (respects reduced_motion)
    pub fn effective_scale(&self, scale: f32) -> f32 {
        if self.reduced_motion { 1.0 } else { scale }
    }
}

/// Upper bound for the winner count stepper (at least 1)
pub fn max_winners(pool_len: usize) -> usize {
    pool_len.max(1)
}

/// Clamp a requested winner count to `[1, max_winners(pool_len)]`
pub fn clamp_winner_count(requested: i64, pool_len: usize) -> usize {
    let max = max_winners(pool_len);
    if requested <= 1 {
        1
    } else {
        usize::try_from(requested).map_or(max, |n| n.min(max))
    }
}
