//! Errors for invalid data, never for in-game failures.
//!
//! Misses, immunities, exhausted PP and similar outcomes are ordinary
//! results of the pipeline. A `BattleError` means the battle was handed
//! data it cannot run: a record missing a field its category requires, or
//! an id that names nothing.

use thiserror::Error;

use super::{CombatantId, Id};

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("unknown move `{0}`")]
    UnknownMove(Id),

    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("max move `{max_move}` has no base power for damaging move `{base_move}`")]
    MissingMaxPower { base_move: Id, max_move: Id },

    #[error("z-move `{z_move}` has no base power for damaging move `{base_move}`")]
    MissingZPower { base_move: Id, z_move: Id },

    #[error("no {kind} move registered for type `{type_name}`")]
    MissingEmpoweredMove { kind: &'static str, type_name: Id },
}
