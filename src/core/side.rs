//! Sides: the two parties of a battle.
//!
//! ## SideId
//!
//! Type-safe side identifier. A battle always has exactly two sides,
//! `SideId(0)` and `SideId(1)`, so [`SideId::foe`] is total.
//!
//! ## Side
//!
//! Ordered active slots, the full party, side-wide and per-slot
//! conditions, and the one-shot empowered-move flags.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::{CombatantId, ConditionState, Id};

/// Side identifier (0 or 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SideId(pub u8);

impl SideId {
    /// Create a new side ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw side index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The opposing side.
    #[must_use]
    pub const fn foe(self) -> Self {
        Self(1 - self.0)
    }

    /// Both sides.
    pub fn both() -> impl Iterator<Item = SideId> {
        (0..2).map(SideId)
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0 + 1)
    }
}

/// One party of the battle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Side {
    pub id: SideId,
    pub name: String,

    /// Active slots, left to right. `None` for an empty slot.
    pub active: Vec<Option<CombatantId>>,

    /// Every combatant on this side, in team order.
    pub party: Vec<CombatantId>,

    /// Side-wide conditions (screens, hazards, guards).
    pub conditions: OrdMap<Id, ConditionState>,

    /// Per-slot conditions, indexed like `active`.
    pub slot_conditions: Vec<OrdMap<Id, ConditionState>>,

    /// Once set, never cleared for the rest of the battle.
    z_move_used: bool,

    /// Once set, never cleared for the rest of the battle.
    max_move_used: bool,
}

impl Side {
    /// Create an empty side with `active_slots` slots.
    pub fn new(id: SideId, name: impl Into<String>, active_slots: usize) -> Self {
        assert!(active_slots > 0, "A side needs at least 1 active slot");
        assert!(active_slots <= 3, "At most 3 active slots supported");

        Self {
            id,
            name: name.into(),
            active: vec![None; active_slots],
            party: Vec::new(),
            conditions: OrdMap::new(),
            slot_conditions: vec![OrdMap::new(); active_slots],
            z_move_used: false,
            max_move_used: false,
        }
    }

    /// Number of active slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains_key(&Id::new(id))
    }

    #[must_use]
    pub fn has_slot_condition(&self, slot: usize, id: &str) -> bool {
        self.slot_conditions
            .get(slot)
            .is_some_and(|conditions| conditions.contains_key(&Id::new(id)))
    }

    /// True once this side has used its Z-move.
    #[must_use]
    pub fn z_move_used(&self) -> bool {
        self.z_move_used
    }

    /// Record the side's Z-move. Idempotent.
    pub fn mark_z_move_used(&mut self) {
        if !self.z_move_used {
            self.z_move_used = true;
        }
    }

    /// True once this side has gone Max.
    #[must_use]
    pub fn max_move_used(&self) -> bool {
        self.max_move_used
    }

    /// Record the side's Max transformation. Idempotent.
    pub fn mark_max_move_used(&mut self) {
        if !self.max_move_used {
            self.max_move_used = true;
        }
    }
}
