//! The move pipeline.
//!
//! ## Layers
//!
//! | Layer | Entry | Module |
//! |---|---|---|
//! | Action entry | [`Battle::run_move`](crate::battle::Battle::run_move) | `run_move` |
//! | Inside caller | [`Battle::use_move`](crate::battle::Battle::use_move) | `use_move` |
//! | Hit pipeline | `try_spread_move_hit` | `hit_steps` |
//! | Hit loop | `hit_step_move_hit_loop` | `hit_loop` |
//! | Spread hit | `spread_move_hit` | `spread_hit` |
//! | Effects | `run_move_effects` | `effects` |
//!
//! Each layer calls only the ones below it, except for deliberate
//! re-entry: dance mirroring re-enters `run_move`, and self and secondary
//! sub-effects re-enter `spread_move_hit`.

mod active;
mod effects;
mod hit_loop;
mod hit_steps;
mod run_move;
mod spread_hit;
mod targeting;
mod transform;
mod use_move;

use crate::core::CombatantId;
use crate::dex::{HitEffect, SecondaryEffect};
use crate::hooks::HookEvent;

pub use active::{ActiveMove, Empowered};
pub use hit_loop::calc_recoil_damage;
pub use run_move::RunMoveOptions;
pub use targeting::target_type_choices;
pub use transform::{MaxMoveOption, ZMoveOption};

/// One entry of the target list threaded through a hit.
///
/// The list keeps its length for the whole hit so that per-target result
/// arrays stay index-aligned; removed targets are marked, never dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    Live(CombatantId),
    /// Hit a barrier standing in for the target: no further effects, but
    /// secondaries still roll.
    Shielded,
    /// Out of the hit.
    Removed,
}

impl TargetSlot {
    /// The combatant, while still live.
    #[must_use]
    pub const fn live(self) -> Option<CombatantId> {
        match self {
            TargetSlot::Live(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_removed(self) -> bool {
        matches!(self, TargetSlot::Removed)
    }
}

/// Which part of a move one spread hit applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitData {
    /// The move's own damage and primary effect.
    Primary,
    /// A self effect, applied to the user.
    SelfEffect(HitEffect),
    /// A secondary that passed its roll.
    Secondary(SecondaryEffect),
}

impl HitData {
    /// The non-damage effect this hit applies.
    #[must_use]
    pub fn effect(&self, active_move: &ActiveMove) -> HitEffect {
        match self {
            HitData::Primary => active_move.data.hit.clone(),
            HitData::SelfEffect(effect) => effect.clone(),
            HitData::Secondary(secondary) => secondary.effect.clone(),
        }
    }

    /// The self effect riding on this hit.
    #[must_use]
    pub fn self_effect(&self, active_move: &ActiveMove) -> Option<HitEffect> {
        match self {
            HitData::Primary => active_move.self_effect.clone(),
            HitData::Secondary(secondary) => secondary.self_effect.clone(),
            HitData::SelfEffect(_) => None,
        }
    }

    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self, HitData::Primary)
    }

    /// The move-specific event fired when this hit lands.
    #[must_use]
    pub const fn hit_event(&self) -> HookEvent {
        match self {
            HitData::Primary => HookEvent::Hit,
            HitData::SelfEffect(_) => HookEvent::SelfHit,
            HitData::Secondary(_) => HookEvent::SecondaryHit,
        }
    }
}
