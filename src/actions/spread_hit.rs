//! Spread-hit resolver: one hit of one part of a move against a target list.
//!
//! ## Order
//!
//! 1. Try-hit gate (field, side or first target).
//! 2. Primary-hit pre-emption: a barrier may absorb the hit.
//! 3. Damage from the calculator, then applied through the entity model.
//! 4. Generic effects.
//! 5. Self effect on the user, secondaries, forced switch.
//! 6. Damaging-hit notifications.
//!
//! The returned outcome and target lists always have the input's length.

use crate::battle::Battle;
use crate::core::CombatantId;
use crate::damage::DamageOutcome;
use crate::dex::{HitEffect, MoveTarget, SelfDestruct};
use crate::hooks::{EventTarget, HitResult, HookEvent, HookScope, Relay};

use super::{ActiveMove, HitData, TargetSlot};

impl Battle {
    /// Apply `data` to every target in one hit.
    pub fn spread_move_hit(
        &mut self,
        mut targets: Vec<TargetSlot>,
        user: CombatantId,
        active_move: &mut ActiveMove,
        data: &HitData,
        is_secondary: bool,
        is_self: bool,
    ) -> (Vec<HitResult>, Vec<TargetSlot>) {
        let len = targets.len();
        let mut damage = vec![HitResult::Success; len];
        let first = targets.first().and_then(|slot| slot.live());

        let gate = if !data.is_primary() {
            Relay::SUCCESS
        } else if active_move.target == MoveTarget::All && !is_self {
            let target = first.map_or(EventTarget::Field, EventTarget::Combatant);
            self.single_move_event(HookEvent::TryHitField, target, Some(user), active_move, Relay::SUCCESS)
        } else if matches!(active_move.target, MoveTarget::FoeSide | MoveTarget::AllySide) && !is_self {
            let target = first.map_or(EventTarget::None, |t| EventTarget::Side(self.state[t].side));
            self.single_move_event(HookEvent::TryHitSide, target, Some(user), active_move, Relay::SUCCESS)
        } else if let Some(target) = first {
            self.single_move_event(HookEvent::TryHit, target, Some(user), active_move, Relay::SUCCESS)
        } else {
            Relay::SUCCESS
        };
        if !self.gate_passed(&gate, user) {
            return (vec![HitResult::Fail; len], targets);
        }

        let side_wide = matches!(active_move.target, MoveTarget::All | MoveTarget::AllySide | MoveTarget::FoeSide);
        if !is_secondary && !is_self && !side_wide {
            for (slot, result) in targets.iter_mut().zip(damage.iter_mut()) {
                let TargetSlot::Live(target) = *slot else {
                    continue;
                };
                let relay = self.run_move_event(HookEvent::TryPrimaryHit, target, Some(user), active_move, Relay::SUCCESS);
                if relay == Relay::Substitute {
                    *slot = TargetSlot::Shielded;
                    *result = HitResult::Success;
                } else {
                    *result = relay.as_result();
                }
            }
        }

        let carries_self_effect = data.self_effect(active_move).is_some();
        for (slot, result) in targets.iter_mut().zip(damage.iter_mut()) {
            if slot.live().is_some() && is_secondary && !carries_self_effect {
                *result = HitResult::Success;
            }
            if !result.is_truthy() {
                *slot = TargetSlot::Removed;
            }
        }

        self.spread_damage_rolls(&mut damage, &mut targets, user, active_move, data);
        for (slot, result) in targets.iter_mut().zip(&damage) {
            if result.is_fail() {
                *slot = TargetSlot::Removed;
            }
        }

        for (slot, result) in targets.iter_mut().zip(damage.iter_mut()) {
            if let (TargetSlot::Live(target), HitResult::Damage(amount)) = (*slot, *result) {
                *result = self.damage(amount, target, Some(user), Some(active_move.effect_ref()));
                if result.is_fail() {
                    *slot = TargetSlot::Removed;
                }
            }
        }

        let mut damage = self.run_move_effects(damage, &targets, user, active_move, data, is_secondary, is_self);
        drop_unkept(&mut targets, &damage);

        if let Some(self_effect) = data.self_effect(active_move) {
            self.self_drops(&targets, user, active_move, &self_effect, is_secondary);
        }
        if data.is_primary() && !active_move.secondaries.is_empty() {
            self.secondaries(&targets, user, active_move, is_self);
        }
        if data.effect(active_move).force_switch {
            self.force_switch(&mut damage, &targets, user, active_move);
        }
        drop_unkept(&mut targets, &damage);

        let damaged: Vec<(CombatantId, u32)> = targets
            .iter()
            .zip(&damage)
            .filter_map(|(slot, result)| Some((slot.live()?, result.damage()?)))
            .collect();
        let user_hp_before = self.state[user].hp;
        if !damaged.is_empty() && !is_secondary && !is_self {
            for &(target, amount) in &damaged {
                self.run_move_event(HookEvent::DamagingHit, target, Some(user), active_move, Relay::Int(i64::from(amount)));
            }
            if self.hooks.has(HookEvent::AfterHit, &active_move.effect_ref(), HookScope::OnEffect) {
                for &(target, _) in &damaged {
                    self.single_move_event(HookEvent::AfterHit, target, Some(user), active_move, Relay::SUCCESS);
                }
            }
            let (hp, maxhp) = (self.state[user].hp, self.state[user].maxhp);
            if hp > 0 && hp <= maxhp / 2 && user_hp_before > maxhp / 2 {
                self.emergency_exit(user, None);
            }
        }

        (damage, targets)
    }

    /// Apply `data` to one target. A plain success reads as "nothing
    /// attempted" so callers can fold it with other outcomes.
    pub fn move_hit(
        &mut self,
        target: CombatantId,
        user: CombatantId,
        active_move: &mut ActiveMove,
        data: &HitData,
        is_secondary: bool,
        is_self: bool,
    ) -> HitResult {
        let (damage, _) =
            self.spread_move_hit(vec![TargetSlot::Live(target)], user, active_move, data, is_secondary, is_self);
        match damage.first().copied().unwrap_or_default() {
            HitResult::Success => HitResult::NotAttempted,
            other => other,
        }
    }

    /// Ask the calculator for each live target's damage.
    fn spread_damage_rolls(
        &mut self,
        damage: &mut [HitResult],
        targets: &mut [TargetSlot],
        user: CombatantId,
        active_move: &mut ActiveMove,
        data: &HitData,
    ) {
        let calculator = self.calculator();
        for (slot, result) in targets.iter_mut().zip(damage.iter_mut()) {
            let TargetSlot::Live(target) = *slot else {
                continue;
            };
            if !data.is_primary() {
                *result = HitResult::NotAttempted;
                continue;
            }

            let outcome = calculator.get_damage(self, user, target, active_move);
            *result = match outcome {
                DamageOutcome::Fail | DamageOutcome::Silent => {
                    tracing::debug!(%target, "damage calculation interrupted");
                    HitResult::Fail
                }
                DamageOutcome::Substitute => {
                    *slot = TargetSlot::Shielded;
                    HitResult::Success
                }
                DamageOutcome::NoDamage => HitResult::NotAttempted,
                DamageOutcome::Damage(mut amount) => {
                    let defender = &self.state[target];
                    if active_move.no_faint && !defender.fainted && amount >= defender.hp {
                        amount = defender.hp.saturating_sub(1);
                    }
                    HitResult::Damage(amount)
                }
            };
            if !result.is_fail() && active_move.self_destruct == Some(SelfDestruct::IfHit) {
                self.faint(user, Some(user), Some(active_move.effect_ref()));
            }
        }
    }

    /// Apply a self effect once per remaining target, until the latch sets.
    fn self_drops(
        &mut self,
        targets: &[TargetSlot],
        user: CombatantId,
        active_move: &mut ActiveMove,
        self_effect: &HitEffect,
        is_secondary: bool,
    ) {
        for slot in targets {
            if slot.is_removed() || active_move.self_dropped {
                continue;
            }
            if !is_secondary && self_effect.boosts.is_some() {
                // Every self drop lands, but the roll is still drawn.
                self.rng.random(100);
                if active_move.multi_hit.is_none() {
                    active_move.self_dropped = true;
                }
            }
            self.move_hit(user, user, active_move, &HitData::SelfEffect(self_effect.clone()), is_secondary, true);
        }
    }

    /// Roll each secondary against each remaining target.
    fn secondaries(&mut self, targets: &[TargetSlot], user: CombatantId, active_move: &mut ActiveMove, is_self: bool) {
        for slot in targets {
            let secondaries = match *slot {
                TargetSlot::Removed => continue,
                TargetSlot::Shielded => active_move.secondaries.clone(),
                TargetSlot::Live(target) => {
                    let base = active_move.secondaries.clone();
                    let relay = self.run_move_event(
                        HookEvent::ModifySecondaries,
                        target,
                        Some(user),
                        active_move,
                        Relay::Secondaries(base.clone()),
                    );
                    match relay {
                        Relay::Secondaries(modified) => modified,
                        _ => base,
                    }
                }
            };

            for secondary in secondaries {
                let roll = self.rng.random(100);
                let lands = secondary.chance.map_or(true, |chance| roll < chance);
                if let (true, TargetSlot::Live(target)) = (lands, *slot) {
                    self.move_hit(target, user, active_move, &HitData::Secondary(secondary), true, is_self);
                }
            }
        }
    }

    fn force_switch(
        &mut self,
        damage: &mut [HitResult],
        targets: &[TargetSlot],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) {
        for (slot, result) in targets.iter().zip(damage.iter_mut()) {
            let TargetSlot::Live(target) = *slot else {
                continue;
            };
            let side = self.state[target].side;
            if self.state[target].hp == 0 || self.state[user].hp == 0 || self.can_switch(side) == 0 {
                continue;
            }
            let relay = self.run_move_event(HookEvent::DragOut, target, Some(user), active_move, Relay::SUCCESS);
            if relay.is_truthy() {
                self.state[target].force_switch_flag = true;
            } else if relay.as_result().is_fail() && active_move.is_status() {
                self.add_fail(user);
                *result = HitResult::Fail;
            }
        }
    }
}

/// Remove every target whose outcome no longer keeps it.
fn drop_unkept(targets: &mut [TargetSlot], damage: &[HitResult]) {
    for (slot, result) in targets.iter_mut().zip(damage) {
        if !result.keeps_target() {
            *slot = TargetSlot::Removed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoostId, BoostTable, Combatant, ConditionState, EffectRef, Id, Ruleset, SideId, StatTable};
    use crate::dex::{Dex, FixedDamage, MoveData, SecondaryEffect};
    use crate::hooks::{EventContext, Hook, HookResult};

    fn setup() -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(Ruleset::default(), Dex::new(), 23, 1);
        let a = battle.add_combatant(SideId::new(0), Combatant::new("A", 50, 100, StatTable::uniform(50)));
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 50, 100, StatTable::uniform(50)));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    fn sonic_boom() -> ActiveMove {
        ActiveMove::new(MoveData::special("Sonic Boom", "Normal", 0).with_fixed_damage(FixedDamage::Amount(20)))
    }

    fn absorb(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::Relay(Relay::Substitute)
    }

    #[test]
    fn test_primary_damage() {
        let (mut battle, a, b) = setup();
        let mut mv = sonic_boom();
        let (damage, targets) =
            battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut mv, &HitData::Primary, false, false);
        assert_eq!(damage, vec![HitResult::Damage(20)]);
        assert_eq!(targets, vec![TargetSlot::Live(b)]);
        assert_eq!(battle.state[b].hp, 80);
        assert_eq!(battle.state[a].last_damage, 20);
    }

    #[test]
    fn test_no_faint_leaves_one_hp() {
        let (mut battle, a, b) = setup();
        battle.state[b].hp = 15;
        let mut false_swipe = sonic_boom();
        false_swipe.no_faint = true;
        battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut false_swipe, &HitData::Primary, false, false);
        assert_eq!(battle.state[b].hp, 1);
    }

    #[test]
    fn test_barrier_absorbs_hit() {
        let (mut battle, a, b) = setup();
        battle.state[b].volatiles.insert(Id::new("substitute"), ConditionState::new("substitute"));
        battle.register_hook(Hook::new(HookEvent::TryPrimaryHit, EffectRef::volatile("substitute"), absorb));
        let mut mv = sonic_boom();
        let (damage, targets) =
            battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut mv, &HitData::Primary, false, false);
        assert_eq!(targets, vec![TargetSlot::Shielded]);
        assert_eq!(damage, vec![HitResult::Success]);
        assert_eq!(battle.state[b].hp, 100);
    }

    #[test]
    fn test_guaranteed_secondary_applies() {
        let (mut battle, a, b) = setup();
        let mut nuzzle = ActiveMove::new(
            MoveData::physical("Nuzzle", "Electric", 20)
                .with_fixed_damage(FixedDamage::Amount(10))
                .with_secondary(SecondaryEffect::new(None, HitEffect::new().with_status("par"))),
        );
        battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut nuzzle, &HitData::Primary, false, false);
        assert!(battle.state[b].has_status("par"));
    }

    #[test]
    fn test_self_drop_latches() {
        let (mut battle, a, b) = setup();
        let mut overheat = ActiveMove::new(
            MoveData::special("Overheat", "Fire", 130)
                .with_fixed_damage(FixedDamage::Amount(10))
                .with_self_effect(HitEffect::new().with_boosts(BoostTable::new().with(BoostId::Spa, -2))),
        );
        battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut overheat, &HitData::Primary, false, false);
        assert!(overheat.self_dropped);
        assert_eq!(battle.state[a].boosts.get(BoostId::Spa), -2);

        battle.spread_move_hit(vec![TargetSlot::Live(b)], a, &mut overheat, &HitData::Primary, false, false);
        assert_eq!(battle.state[a].boosts.get(BoostId::Spa), -2);
    }

    #[test]
    fn test_removed_targets_keep_alignment() {
        let (mut battle, a, b) = setup();
        let mut mv = sonic_boom();
        let (damage, targets) = battle.spread_move_hit(
            vec![TargetSlot::Removed, TargetSlot::Live(b)],
            a,
            &mut mv,
            &HitData::Primary,
            false,
            false,
        );
        assert_eq!(damage.len(), 2);
        assert_eq!(targets[0], TargetSlot::Removed);
        assert_eq!(damage[1], HitResult::Damage(20));
    }

    #[test]
    fn test_move_hit_reads_success_as_not_attempted() {
        let (mut battle, a, _) = setup();
        let mut mv = ActiveMove::new(MoveData::status("Splash", "Normal"));
        let data = HitData::SelfEffect(HitEffect::new());
        assert_eq!(battle.move_hit(a, a, &mut mv, &data, false, true), HitResult::NotAttempted);
    }
}
