//! Deterministic selection engine
//!
//! All selection and reveal logic lives here. This module must be pure and
//! deterministic:
//! - Time only comes in through `Frame`
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod pool;
pub mod sampler;
pub mod session;
pub mod state;
pub mod tick;

pub use pool::{Entry, EntryId, EntryPool};
pub use sampler::{RandomSource, pick_one, sample};
pub use session::WinnerSession;
pub use state::{AnimationState, DisplayCard, PendingSpin, PickerEvent, PickerState, SpinPhase};
pub use tick::{Frame, tick};
