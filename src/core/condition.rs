//! Per-instance state of an active condition.

use serde::{Deserialize, Serialize};

use super::{CombatantId, EffectRef, Id};

/// Runtime record for one active condition (volatile, side, slot, field).
///
/// The condition's behavior lives in its hooks; this only tracks what the
/// pipeline and those hooks need to read back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionState {
    /// The condition's id.
    pub id: Id,

    /// Remaining turns. `None` for indefinite.
    pub duration: Option<u8>,

    /// Combatant that created the condition, if any.
    pub source: Option<CombatantId>,

    /// Effect that created the condition, if any.
    pub source_effect: Option<EffectRef>,

    /// Free counter for hooks (stall chains, stockpile layers, ...).
    pub counter: u32,
}

impl ConditionState {
    /// Create a new indefinite condition.
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            duration: None,
            source: None,
            source_effect: None,
            counter: 0,
        }
    }

    /// Set the duration (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, turns: u8) -> Self {
        self.duration = Some(turns);
        self
    }

    /// Set the source combatant (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the source effect (builder pattern).
    #[must_use]
    pub fn with_source_effect(mut self, effect: EffectRef) -> Self {
        self.source_effect = Some(effect);
        self
    }
}
