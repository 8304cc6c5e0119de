//! Core battle types: ids, combatants, sides, field, state, RNG, rules.
//!
//! This module holds the Entity Model the move pipeline reads and mutates.
//! It knows nothing about moves beyond their ids; behavior lives in
//! `actions` and in registered hooks.

pub mod id;
pub mod condition;
pub mod combatant;
pub mod side;
pub mod field;
pub mod rng;
pub mod config;
pub mod state;
pub mod error;

pub use id::{EffectKind, EffectRef, Id};
pub use condition::ConditionState;
pub use combatant::{
    AttackRecord, BoostId, BoostTable, Combatant, CombatantId, MoveSlot, StatId, StatTable, TurnResult,
};
pub use side::{Side, SideId};
pub use field::Field;
pub use rng::{BattleRng, BattleRngState};
pub use config::{HitStep, Rounding, Ruleset, SelfDestructTiming, StruggleRecoil};
pub use state::{BattleState, FaintEntry};
pub use error::{BattleError, Result};
