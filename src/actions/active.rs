//! The effective move of one use.
//!
//! An [`ActiveMove`] is a fresh copy of a [`MoveData`] plus scratch fields
//! that only make sense for a single invocation: hit index, running damage
//! total, the self-drop latch and so on. It derefs to its `MoveData`, so
//! handlers read `active_move.move_type` directly and may rewrite any field
//! for the rest of the use.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::core::{EffectRef, Id};
use crate::dex::MoveData;

/// Which one-shot empowered form a move was used as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Empowered {
    Z,
    Max,
}

/// A move in flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMove {
    pub data: MoveData,

    /// Move this one was derived from (Max moves keep their base move).
    pub base_move: Option<Id>,
    /// What called the move, when it was not chosen directly.
    pub source_effect: Option<EffectRef>,
    /// Dispatched by an ability or another move rather than chosen.
    pub is_external: bool,
    /// A status move used with Z-power (logged as `Z-<name>`).
    pub z_status: bool,
    /// Set on every Z or Max form.
    pub empowered: Option<Empowered>,

    pub prankster_boosted: bool,
    pub has_bounced: bool,
    /// Suppresses secondaries and the after-secondary events.
    pub negate_secondary: bool,

    // === Scratch ===
    /// More than one independent target.
    pub spread_hit: bool,
    /// Current hit index, starting at 1.
    pub hit: u32,
    /// Damage across every hit of this use.
    pub total_damage: u32,
    /// Self boosts already applied for this use.
    pub self_dropped: bool,
    /// The move aims each hit at its own target. Unlike `smart_target`,
    /// never cleared during the use.
    pub smart_target_declared: bool,
}

impl ActiveMove {
    /// Start a use of `data`.
    pub fn new(data: MoveData) -> Self {
        Self {
            smart_target_declared: data.smart_target,
            data,
            base_move: None,
            source_effect: None,
            is_external: false,
            z_status: false,
            empowered: None,
            prankster_boosted: false,
            has_bounced: false,
            negate_secondary: false,
            spread_hit: false,
            hit: 0,
            total_damage: 0,
            self_dropped: false,
        }
    }

    /// The hook subject for this move.
    #[must_use]
    pub fn effect_ref(&self) -> EffectRef {
        EffectRef::of_move(self.data.id.clone())
    }

    /// Z or Max powered.
    #[must_use]
    pub fn is_z_or_max_powered(&self) -> bool {
        self.empowered.is_some()
    }
}

impl Deref for ActiveMove {
    type Target = MoveData;

    fn deref(&self) -> &MoveData {
        &self.data
    }
}

impl DerefMut for ActiveMove {
    fn deref_mut(&mut self) -> &mut MoveData {
        &mut self.data
    }
}

impl From<MoveData> for ActiveMove {
    fn from(data: MoveData) -> Self {
        Self::new(data)
    }
}
