//! The battle: state plus everything needed to resolve moves against it.
//!
//! ## Design
//!
//! A [`Battle`] owns one [`BattleState`] and the services that act on it:
//! the seeded RNG, the public log, the hook registry, the dex, the ruleset
//! and the damage calculator. Hooks receive `&mut Battle`, so a handler can
//! do anything the pipeline can, including using another move.
//!
//! Everything runs on one thread. Re-entrant calls (dance mirroring,
//! self and secondary sub-hits, moves called by other moves) are ordinary
//! recursion and finish before the outer call resumes.

mod dispatch;
mod mutators;

use std::sync::Arc;

use crate::actions::{ActiveMove, Empowered};
use crate::core::{BattleRng, BattleState, Combatant, CombatantId, EffectKind, EffectRef, Id, Ruleset, SideId};
use crate::damage::{DamageCalculator, StandardDamage};
use crate::dex::Dex;
use crate::hooks::{Hook, HookId, HookRegistry};
use crate::log::{BattleLog, Ident, LogEntry};

/// What the most recent move set in motion looked like.
///
/// Nested uses copy priority from it, and moves called by an empowered
/// move inherit the empowerment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveContext {
    pub move_id: Id,
    pub user: CombatantId,
    pub target: Option<CombatantId>,
    pub priority: i8,
    pub prankster_boosted: bool,
    pub empowered: Option<Empowered>,
    pub z_status: bool,
}

/// One battle between two sides.
pub struct Battle {
    pub state: BattleState,
    pub rng: BattleRng,
    pub log: BattleLog,
    pub hooks: HookRegistry,
    pub dex: Dex,
    pub ruleset: Ruleset,
    calculator: Arc<dyn DamageCalculator>,
    pub(crate) active_move: Option<MoveContext>,
    /// Id of the last move this turn that accomplished something.
    pub last_successful_move: Option<Id>,
}

impl Battle {
    /// Create a battle with `active_slots` slots per side.
    pub fn new(ruleset: Ruleset, dex: Dex, seed: u64, active_slots: usize) -> Self {
        Self {
            state: BattleState::new(active_slots),
            rng: BattleRng::new(seed),
            log: BattleLog::new(),
            hooks: HookRegistry::new(),
            dex,
            ruleset,
            calculator: Arc::new(StandardDamage::new()),
            active_move: None,
            last_successful_move: None,
        }
    }

    /// Replace the damage calculator.
    pub fn set_calculator(&mut self, calculator: impl DamageCalculator + 'static) {
        self.calculator = Arc::new(calculator);
    }

    /// The damage calculator, cloned out so it can be called with `&mut self`.
    #[must_use]
    pub fn calculator(&self) -> Arc<dyn DamageCalculator> {
        Arc::clone(&self.calculator)
    }

    /// Add a combatant to a side's party.
    pub fn add_combatant(&mut self, side: SideId, combatant: Combatant) -> CombatantId {
        self.state.add_combatant(side, combatant)
    }

    /// Put a party member into an active slot.
    pub fn switch_in(&mut self, id: CombatantId, slot: usize) {
        self.state.switch_in(id, slot);
    }

    /// Register a hook.
    pub fn register_hook(&mut self, hook: Hook) -> HookId {
        self.hooks.register(hook)
    }

    /// The move context currently in motion, if any.
    #[must_use]
    pub fn active_move(&self) -> Option<&MoveContext> {
        self.active_move.as_ref()
    }

    pub(crate) fn set_active_move(&mut self, active_move: &ActiveMove, user: CombatantId, target: Option<CombatantId>) {
        self.active_move = Some(MoveContext {
            move_id: active_move.id.clone(),
            user,
            target,
            priority: active_move.priority,
            prankster_boosted: active_move.prankster_boosted,
            empowered: active_move.empowered,
            z_status: active_move.z_status,
        });
    }

    pub(crate) fn clear_active_move(&mut self) {
        self.active_move = None;
    }

    /// The slot a combatant occupies, as named in the log: `p1a`.
    #[must_use]
    pub fn slot_label(&self, id: CombatantId) -> String {
        let combatant = &self.state[id];
        let slot = (b'a' + combatant.position as u8) as char;
        format!("{}{}", combatant.side, slot)
    }

    /// How a combatant is named in the log: `p1a: Name`.
    #[must_use]
    pub fn ident(&self, id: CombatantId) -> Ident {
        Ident::new(id, format!("{}: {}", self.slot_label(id), self.state[id].name))
    }

    /// Display name of an effect for the log.
    #[must_use]
    pub fn effect_name(&self, effect: &EffectRef) -> String {
        let name = match effect.kind {
            EffectKind::Move | EffectKind::Condition => self.dex.get_move(&effect.id).map(|m| m.name.clone()),
            EffectKind::Ability => self.dex.get_ability(&effect.id).map(|a| a.name.clone()),
            EffectKind::Item => self.dex.get_item(&effect.id).map(|i| i.name.clone()),
            _ => None,
        };
        name.unwrap_or_else(|| {
            let id = effect.id.as_str();
            let mut chars = id.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
    }

    /// `[from] ...` annotation for a state change caused by `effect`.
    #[must_use]
    pub fn from_attr(&self, effect: Option<&EffectRef>) -> Option<String> {
        let effect = effect?;
        match effect.kind {
            EffectKind::Move => None,
            EffectKind::Condition if effect.id == "zpower" => Some("[zeffect]".to_string()),
            EffectKind::Condition if effect.id == "strugglerecoil" => Some("[from] recoil".to_string()),
            kind => Some(format!("[from] {}{}", kind.log_prefix(), self.effect_name(effect))),
        }
    }

    /// Push a log entry.
    pub fn add(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    /// Log a bare failure for `who`, marking the last move `[still]`.
    pub(crate) fn add_fail(&mut self, who: CombatantId) {
        let who = self.ident(who);
        self.log.push(LogEntry::Fail { who, what: None });
        self.log.attr_last_move("[still]");
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("turn", &self.state.turn)
            .field("ended", &self.state.ended)
            .field("generation", &self.ruleset.generation)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}
