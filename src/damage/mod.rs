//! Damage calculation.
//!
//! The pipeline only relies on the [`DamageCalculator`] contract: given an
//! attacker, a defender and the move in flight, answer with a
//! [`DamageOutcome`]. [`StandardDamage`] is a compact default that covers
//! fixed damage, one-hit KOs and the level/power/stat formula with the
//! usual random spread. Type effectiveness and critical hits are left to
//! `ModifyDamage` hooks or to a custom calculator.

use rustc_hash::FxHashMap;

use crate::actions::ActiveMove;
use crate::battle::Battle;
use crate::core::{Combatant, CombatantId, Id, StatId};
use crate::dex::{Category, FixedDamage};
use crate::hooks::{EventContext, HitResult, HookEvent, HookScope, Relay};

/// Result of one damage calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Deal this much. Zero still counts as a hit.
    Damage(u32),
    /// Interrupted; the calculator already announced why.
    Fail,
    /// Interrupted; any message was already logged.
    Silent,
    /// No damage; the hit continues.
    NoDamage,
    /// Absorbed by a barrier standing in for the defender.
    Substitute,
}

impl DamageOutcome {
    /// The same outcome as a pipeline result.
    #[must_use]
    pub const fn as_result(self) -> HitResult {
        match self {
            DamageOutcome::Damage(n) => HitResult::Damage(n),
            DamageOutcome::Fail => HitResult::Fail,
            DamageOutcome::Silent => HitResult::Silent,
            DamageOutcome::NoDamage => HitResult::NotAttempted,
            DamageOutcome::Substitute => HitResult::Success,
        }
    }
}

/// Damage formula seam.
///
/// Implementations may fire events and draw from the battle's RNG, but
/// must not apply the damage themselves.
pub trait DamageCalculator: Send + Sync {
    /// Damage `attacker` would deal to `defender` with `active_move`.
    fn get_damage(
        &self,
        battle: &mut Battle,
        attacker: CombatantId,
        defender: CombatantId,
        active_move: &mut ActiveMove,
    ) -> DamageOutcome;

    /// Type-chart immunity of `defender` to attacks of `move_type`.
    fn type_immune(&self, _move_type: &Id, _defender: &Combatant) -> bool {
        false
    }
}

/// The default damage formula.
///
/// ```
/// use battle_actions::damage::{DamageCalculator, StandardDamage};
/// use battle_actions::core::{Combatant, Id, StatTable};
///
/// let calc = StandardDamage::new().with_immunity("Ground", "Flying");
/// let bird = Combatant::new("Bird", 50, 100, StatTable::uniform(50)).with_type("Flying");
/// assert!(calc.type_immune(&Id::new("ground"), &bird));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StandardDamage {
    /// Attacking type to the defending types it cannot touch.
    immunities: FxHashMap<Id, Vec<Id>>,
}

impl StandardDamage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `defending` is immune to `attacking` (builder pattern).
    #[must_use]
    pub fn with_immunity(mut self, attacking: &str, defending: &str) -> Self {
        self.immunities.entry(Id::new(attacking)).or_default().push(Id::new(defending));
        self
    }

    fn base_power(battle: &mut Battle, attacker: CombatantId, defender: CombatantId, active_move: &mut ActiveMove) -> u32 {
        let base = i64::from(active_move.base_power);
        let mut cx = EventContext::new(HookEvent::BasePower, defender)
            .with_source(attacker)
            .with_move(active_move)
            .with_relay(Relay::Int(base))
            .on_effect();
        let relay = battle.run_event(&mut cx);
        relay.as_int().unwrap_or(base).max(0) as u32
    }
}

impl DamageCalculator for StandardDamage {
    fn get_damage(
        &self,
        battle: &mut Battle,
        attacker: CombatantId,
        defender: CombatantId,
        active_move: &mut ActiveMove,
    ) -> DamageOutcome {
        let ignore_immunity = active_move.ignore_immunity.unwrap_or(active_move.is_status());
        if !ignore_immunity {
            let move_type = active_move.move_type.clone();
            if !battle.run_immunity(defender, &move_type, true) {
                return DamageOutcome::Fail;
            }
        }

        if active_move.ohko.is_some() {
            return DamageOutcome::Damage(battle.state[defender].maxhp);
        }

        let subject = active_move.effect_ref();
        if battle.hooks.has(HookEvent::DamageCallback, &subject, HookScope::OnEffect) {
            let mut cx = EventContext::new(HookEvent::DamageCallback, defender)
                .with_source(attacker)
                .with_move(active_move)
                .with_relay(Relay::Int(0));
            return match battle.single_event(&mut cx) {
                Relay::Int(n) => DamageOutcome::Damage(n.max(0) as u32),
                Relay::Result(HitResult::Fail) => DamageOutcome::Fail,
                Relay::Result(HitResult::Silent) => DamageOutcome::Silent,
                Relay::Result(HitResult::Damage(n)) => DamageOutcome::Damage(n),
                _ => DamageOutcome::NoDamage,
            };
        }

        match active_move.fixed_damage {
            Some(FixedDamage::Level) => return DamageOutcome::Damage(u32::from(battle.state[attacker].level)),
            Some(FixedDamage::Amount(n)) => return DamageOutcome::Damage(n),
            None => {}
        }

        let (attack_stat, defense_stat) = match active_move.category {
            Category::Physical => (StatId::Atk, StatId::Def),
            Category::Special => (StatId::Spa, StatId::Spd),
            Category::Status => return DamageOutcome::NoDamage,
        };

        let base_power = Self::base_power(battle, attacker, defender, active_move);
        if base_power == 0 {
            return DamageOutcome::NoDamage;
        }

        let level = u64::from(battle.state[attacker].level);
        let attack = u64::from(battle.state[attacker].get_stat(attack_stat).max(1));
        let defense = u64::from(battle.state[defender].get_stat(defense_stat).max(1));

        let mut damage = (2 * level / 5 + 2) * u64::from(base_power) * attack / defense / 50 + 2;
        if active_move.spread_hit {
            damage = damage * 3 / 4;
        }
        damage = damage * u64::from(100 - battle.rng.random(16)) / 100;
        if battle.state[attacker].types.contains(&active_move.move_type) {
            damage = damage * 3 / 2;
        }

        let mut cx = EventContext::new(HookEvent::ModifyDamage, defender)
            .with_source(attacker)
            .with_move(active_move)
            .with_relay(Relay::Int(damage as i64));
        let modified = battle.run_event(&mut cx).as_int().unwrap_or(damage as i64).max(0) as u32;

        DamageOutcome::Damage(modified.max(1))
    }

    fn type_immune(&self, move_type: &Id, defender: &Combatant) -> bool {
        self.immunities
            .get(move_type)
            .is_some_and(|types| types.iter().any(|t| defender.types.contains(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ruleset, SideId, StatTable};
    use crate::dex::{Dex, MoveData};

    fn battle() -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(Ruleset::default(), Dex::new(), 7, 1);
        let a = battle.add_combatant(SideId::new(0), Combatant::new("A", 50, 200, StatTable::uniform(100)).with_type("Normal"));
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 45, 200, StatTable::uniform(100)).with_type("Ghost"));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    #[test]
    fn test_fixed_damage() {
        let (mut battle, a, b) = battle();
        let calc = StandardDamage::new();
        let mut night_shade = ActiveMove::new(
            MoveData::special("Night Shade", "Ghost", 0).with_fixed_damage(FixedDamage::Level),
        );
        assert_eq!(calc.get_damage(&mut battle, a, b, &mut night_shade), DamageOutcome::Damage(50));
    }

    #[test]
    fn test_type_immunity_fails() {
        let (mut battle, a, b) = battle();
        let calc = StandardDamage::new().with_immunity("Normal", "Ghost");
        battle.set_calculator(calc.clone());
        let mut tackle = ActiveMove::new(MoveData::physical("Tackle", "Normal", 40));
        assert_eq!(calc.get_damage(&mut battle, a, b, &mut tackle), DamageOutcome::Fail);
    }

    #[test]
    fn test_formula_in_range() {
        let (mut battle, a, b) = battle();
        let calc = StandardDamage::new();
        let mut tackle = ActiveMove::new(MoveData::physical("Tackle", "Normal", 40));
        // (22 * 40 * 100 / 100) / 50 + 2 = 19; random 85..=100%; STAB 1.5x.
        match calc.get_damage(&mut battle, a, b, &mut tackle) {
            DamageOutcome::Damage(n) => assert!((24..=28).contains(&n), "got {}", n),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_move_deals_no_damage() {
        let (mut battle, a, b) = battle();
        let mut growl = ActiveMove::new(MoveData::status("Growl", "Normal"));
        assert_eq!(StandardDamage::new().get_damage(&mut battle, a, b, &mut growl), DamageOutcome::NoDamage);
    }
}
