//! # battle-actions
//!
//! A deterministic move-resolution engine for turn-based two-party battles.
//!
//! ## Design Principles
//!
//! 1. **Data, Not Special Cases**: Moves, abilities and items are records in
//!    a [`Dex`] plus handlers in a [`HookRegistry`]. The pipeline never
//!    names an individual move outside of a handful of long-standing
//!    mechanics.
//!
//! 2. **Explicit Outcomes**: Every gate and stage answers a [`HitResult`]
//!    instead of overloading booleans, so "zero damage", "no damage",
//!    "failed" and "failed quietly" never get confused.
//!
//! 3. **Rules As Configuration**: Behavior that changed between rule
//!    generations lives in [`Ruleset`] fields, including the order of the
//!    hit stages.
//!
//! ## Architecture
//!
//! - **Single Thread, Plain Recursion**: One [`Battle`] is stepped by one
//!   caller. Moves calling moves, dance mirroring and secondary sub-hits
//!   are ordinary nested calls that finish before the outer call resumes.
//!
//! - **Seeded Randomness**: All draws come from a ChaCha8 stream in
//!   [`BattleRng`], so a seed replays a battle exactly.
//!
//! - **Persistent Collections**: Condition maps use `im` so snapshots of a
//!   battle state are cheap to clone.
//!
//! ## Modules
//!
//! - `core`: ids, combatants, sides, field, state, RNG, ruleset, errors
//! - `dex`: static move, ability and item records
//! - `hooks`: hit results, events, relays and the hook registry
//! - `log`: the public notification stream
//! - `damage`: the damage calculator seam and its default
//! - `battle`: the battle object, event dispatch and state mutators
//! - `actions`: the move pipeline from action entry to generic effects
//!
//! ## Example
//!
//! ```
//! use battle_actions::{Battle, Combatant, Dex, MoveData, Ruleset, RunMoveOptions, SideId, StatTable};
//! use battle_actions::core::Id;
//! use battle_actions::dex::FixedDamage;
//!
//! let mut dex = Dex::new();
//! dex.register_move(MoveData::special("Dragon Rage", "Dragon", 0).with_fixed_damage(FixedDamage::Amount(40)));
//!
//! let mut battle = Battle::new(Ruleset::gen(9), dex, 42, 1);
//! let user = battle.add_combatant(
//!     SideId::new(0),
//!     Combatant::new("Dratini", 30, 90, StatTable::uniform(60)).with_move("dragonrage", 10),
//! );
//! let foe = battle.add_combatant(SideId::new(1), Combatant::new("Rattata", 30, 70, StatTable::uniform(50)));
//! battle.switch_in(user, 0);
//! battle.switch_in(foe, 0);
//!
//! let loc = battle.get_target_loc(foe, user);
//! assert!(battle.run_move(&Id::new("dragonrage"), user, loc, RunMoveOptions::default()).unwrap());
//! assert_eq!(battle.state[foe].hp, 30);
//! ```

pub mod core;
pub mod dex;
pub mod hooks;
pub mod log;
pub mod damage;
pub mod battle;
pub mod actions;

// Re-export commonly used types
pub use crate::core::{
    BattleError, BattleRng, BattleState, BoostId, BoostTable, Combatant, CombatantId, EffectKind, EffectRef, Id,
    Result, Ruleset, SideId, StatTable, TurnResult,
};

pub use crate::dex::{Dex, HitEffect, MoveData, MoveTarget, SecondaryEffect};

pub use crate::hooks::{EventContext, HitResult, Hook, HookEvent, HookRegistry, HookResult, Relay};

pub use crate::log::{BattleLog, LogEntry};

pub use crate::damage::{DamageCalculator, DamageOutcome, StandardDamage};

pub use crate::battle::Battle;

pub use crate::actions::{ActiveMove, Empowered, RunMoveOptions};
