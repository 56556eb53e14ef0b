//! Picker state and reveal animator types
//!
//! `PickerState` is the single authoritative container: every tick reads the
//! pool and the hidden winners from here, and every host command mutates it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::{Entry, EntryId, EntryPool};
use super::sampler::sample;
use super::session::WinnerSession;
use crate::consts::*;
use crate::ledger::{BatchId, HistoryLedger};
use crate::settings::{PickerSettings, clamp_winner_count, max_winners};

/// Current phase of the reveal animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    /// Nothing in flight, no winners on display
    #[default]
    Idle,
    /// Flickering through the pool; winners fixed but hidden
    Running,
    /// Winners revealed
    Settled,
}

/// What the ticker card shows right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCard {
    pub label: String,
    pub color: String,
}

impl DisplayCard {
    pub fn standby() -> Self {
        Self {
            label: STANDBY_LABEL.to_string(),
            color: STANDBY_COLOR.to_string(),
        }
    }

    pub fn entry(entry: &Entry) -> Self {
        Self {
            label: entry.label.clone(),
            color: entry.color.clone(),
        }
    }

    /// Final card for a winner set: the entry itself, or a summary for several
    pub fn for_winners(winners: &[Entry]) -> Self {
        match winners {
            [single] => Self::entry(single),
            _ => Self {
                label: format!("{} WINNERS SELECTED", winners.len()),
                color: SUCCESS_COLOR.to_string(),
            },
        }
    }
}

impl Default for DisplayCard {
    fn default() -> Self {
        Self::standby()
    }
}

/// Transient animator state (never persisted)
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub phase: SpinPhase,
    /// Frame time (ms) the current spin started; latched on its first tick
    pub start_time: Option<f64>,
    /// Frame time (ms) of the last flicker redisplay
    pub last_tick_time: Option<f64>,
    pub display: DisplayCard,
    pub scale: f32,
    /// Frame time (ms) at which the settle pulse returns to 1.0
    pub settle_pulse_until: Option<f64>,
    /// Duration elapsed without a winner set to settle on
    pub overdue: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            phase: SpinPhase::Idle,
            start_time: None,
            last_tick_time: None,
            display: DisplayCard::standby(),
            scale: 1.0,
            settle_pulse_until: None,
            overdue: false,
        }
    }
}

impl AnimationState {
    /// Enter Running with a clean slate
    fn begin(&mut self) {
        self.phase = SpinPhase::Running;
        self.start_time = None;
        self.last_tick_time = None;
        self.display = DisplayCard::standby();
        self.scale = 1.0;
        self.settle_pulse_until = None;
        self.overdue = false;
    }

    /// Back to Idle with the standby card
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the host should schedule another frame
    pub fn wants_frame(&self) -> bool {
        self.phase == SpinPhase::Running || self.settle_pulse_until.is_some()
    }
}

/// Winners drawn at spin start, hidden until settle
#[derive(Debug, Clone)]
pub struct PendingSpin {
    pub batch_id: BatchId,
    pub winners: Vec<Entry>,
}

/// Notifications for the host, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    SpinStarted { batch_id: BatchId, winner_count: usize },
    /// Fired exactly once per settled spin
    SpinComplete { batch_id: BatchId, winners: Vec<Entry> },
    /// The spin was torn down before it settled
    SpinCancelled { batch_id: BatchId },
}

/// Complete picker state
#[derive(Debug, Clone)]
pub struct PickerState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub settings: PickerSettings,
    pub(crate) pool: EntryPool,
    pub(crate) animation: AnimationState,
    pub(crate) session: WinnerSession,
    pub(crate) history: HistoryLedger,
    pub(crate) pending: Option<PendingSpin>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<PickerEvent>,
    next_batch_id: u64,
}

impl PickerState {
    /// Create a picker with a seeded RNG (deterministic)
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            settings: PickerSettings::default(),
            pool: EntryPool::new((seed ^ (seed >> 32)) as u32),
            animation: AnimationState::default(),
            session: WinnerSession::new(),
            history: HistoryLedger::new(),
            pending: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_batch_id: 1,
        }
    }

    /// Create a picker seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn with_settings(mut self, settings: PickerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the pool with a freshly composed one (colors by position)
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pool = EntryPool::from_labels((self.seed ^ (self.seed >> 32)) as u32, labels);
        self
    }

    // === Pool editing (ignored while a spin is running) ===

    fn editable(&self, action: &str) -> bool {
        let editable = self.animation.phase != SpinPhase::Running;
        if !editable {
            log::debug!("Ignoring {action} while spinning");
        }
        editable
    }

    pub fn add(&mut self, label: &str) -> Option<EntryId> {
        if !self.editable("add") {
            return None;
        }
        self.pool.add(label)
    }

    /// Add one entry per non-blank line
    pub fn add_many(&mut self, text: &str) -> usize {
        if !self.editable("bulk add") {
            return 0;
        }
        self.pool.add_many(text)
    }

    pub fn remove(&mut self, id: &EntryId) -> bool {
        if !self.editable("remove") {
            return false;
        }
        self.pool.remove(id).is_some()
    }

    /// Empty the pool and reset the winner count
    pub fn clear(&mut self) {
        if !self.editable("clear") {
            return;
        }
        self.pool.clear();
        self.settings.reset_winner_count();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // === Winner count ===

    pub fn set_winner_count(&mut self, count: i64) {
        if self.editable("winner count change") {
            self.settings.set_winner_count(count, self.pool.len());
        }
    }

    pub fn increment_winner_count(&mut self) {
        if self.editable("winner count change") {
            self.settings.increment_winner_count(self.pool.len());
        }
    }

    pub fn decrement_winner_count(&mut self) {
        if self.editable("winner count change") {
            self.settings.decrement_winner_count(self.pool.len());
        }
    }

    pub fn max_winners(&self) -> usize {
        max_winners(self.pool.len())
    }

    // === Spin lifecycle ===

    /// Start a spin drawing the configured winner count
    pub fn spin(&mut self) -> bool {
        self.request_spin(i64::from(self.settings.winner_count))
    }

    /// Start a spin drawing `requested` winners (clamped to `[1, pool size]`)
    ///
    /// The winners are drawn here, before any flicker frame. Returns `false`
    /// without side effects when the pool is too small or a spin is running.
    pub fn request_spin(&mut self, requested: i64) -> bool {
        if self.animation.phase == SpinPhase::Running {
            log::debug!("Spin requested while already spinning");
            return false;
        }
        if self.pool.len() < MIN_POOL_FOR_SPIN {
            log::debug!("Spin needs at least {MIN_POOL_FOR_SPIN} entries, have {}", self.pool.len());
            return false;
        }

        let count = clamp_winner_count(requested, self.pool.len());
        let winners = sample(self.pool.entries(), count, &mut self.rng);
        if winners.is_empty() {
            return false;
        }

        let batch_id = BatchId(self.next_batch_id);
        self.next_batch_id += 1;

        self.session.dismiss();
        self.animation.begin();
        log::info!(
            "Spin {batch_id} started: {} winner(s) from {} entries",
            winners.len(),
            self.pool.len()
        );
        self.events.push(PickerEvent::SpinStarted {
            batch_id,
            winner_count: winners.len(),
        });
        self.pending = Some(PendingSpin { batch_id, winners });
        true
    }

    /// Commit the settled spin: record history, reveal winners, notify
    ///
    /// Only does anything once per spin, and only after the animator has
    /// settled. Returns whether this call committed.
    pub fn complete_spin(&mut self, wall_ms: f64) -> bool {
        if self.animation.phase != SpinPhase::Settled {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.history.record(&pending.winners, pending.batch_id, wall_ms);
        self.session.reveal(pending.winners.clone());
        log::info!("Spin {} complete", pending.batch_id);
        self.events.push(PickerEvent::SpinComplete {
            batch_id: pending.batch_id,
            winners: pending.winners,
        });
        true
    }

    /// Close the results without touching pool or history
    pub fn dismiss(&mut self) {
        if !self.editable("dismiss") {
            return;
        }
        self.session.dismiss();
        self.animation.reset();
    }

    /// Remove the revealed winners from the pool, then close the results
    pub fn remove_from_pool(&mut self) -> usize {
        if !self.editable("winner removal") {
            return 0;
        }
        let removed = self.session.remove_from_pool(&mut self.pool);
        if removed > 0 {
            log::info!("Removed {removed} winner(s) from the pool");
        }
        self.animation.reset();
        removed
    }

    /// Cancel everything pending (host context going away)
    ///
    /// A running spin is abandoned without recording history or emitting
    /// `SpinComplete`; a settle pulse is dropped.
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::info!("Spin {} cancelled", pending.batch_id);
            self.events.push(PickerEvent::SpinCancelled {
                batch_id: pending.batch_id,
            });
        }
        if self.animation.phase == SpinPhase::Running {
            self.animation.reset();
        }
        self.animation.settle_pulse_until = None;
        self.animation.scale = 1.0;
    }

    // === Read access for the host ===

    pub fn phase(&self) -> SpinPhase {
        self.animation.phase
    }

    pub fn display(&self) -> &DisplayCard {
        &self.animation.display
    }

    pub fn scale(&self) -> f32 {
        self.animation.scale
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn wants_frame(&self) -> bool {
        self.animation.wants_frame()
    }

    pub fn pool(&self) -> &EntryPool {
        &self.pool
    }

    /// Winners currently on display (empty while running)
    pub fn winners(&self) -> &[Entry] {
        self.session.winners()
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PickerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Label for the main action button
    pub fn spin_button_label(&self) -> String {
        let n = self.settings.winner_count;
        if self.animation.phase == SpinPhase::Running {
            let noun = if n > 1 { "Winners" } else { "Winner" };
            format!("Choosing {n} {noun}...")
        } else {
            let noun = if n > 1 { "WINNERS" } else { "WINNER" };
            format!("PICK {n} {noun}")
        }
    }
}
