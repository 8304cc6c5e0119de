//! Generic move effects: boosts, healing, status, conditions, field
//! changes and the move's own hit handlers.
//!
//! Each target folds the outcome of every sub-effect it received into one
//! [`HitResult`]; a target nothing was tried on counts as a success.

use crate::battle::Battle;
use crate::core::CombatantId;
use crate::dex::MoveTarget;
use crate::hooks::{EventTarget, HitResult, HookEvent, HookScope, Relay};
use crate::log::LogEntry;

use super::{ActiveMove, HitData, TargetSlot};

impl Battle {
    /// Apply the non-damage part of `data` to every remaining target and
    /// fold the results into `damage`.
    #[allow(clippy::too_many_arguments)]
    pub fn run_move_effects(
        &mut self,
        mut damage: Vec<HitResult>,
        targets: &[TargetSlot],
        user: CombatantId,
        active_move: &mut ActiveMove,
        data: &HitData,
        is_secondary: bool,
        is_self: bool,
    ) -> Vec<HitResult> {
        let effect = data.effect(active_move);
        let move_ref = active_move.effect_ref();
        let mut did_anything = HitResult::combine_all(damage.iter().copied());

        for (i, slot) in targets.iter().enumerate() {
            if slot.is_removed() {
                continue;
            }
            let mut did = HitResult::NotAttempted;

            if let TargetSlot::Live(target) = *slot {
                let fainted = self.state[target].fainted;

                if let Some(boosts) = effect.boosts.filter(|_| !fainted) {
                    did = self.boost(&boosts, target, Some(user), Some(move_ref.clone()), is_secondary, is_self);
                }

                if let Some((numerator, denominator)) = effect.heal.filter(|_| !fainted) {
                    let combatant = &self.state[target];
                    if combatant.hp >= combatant.maxhp {
                        let who = self.ident(target);
                        self.log.push(LogEntry::Fail { who, what: Some("heal".to_string()) });
                        self.log.attr_last_move("[still]");
                        damage[i] = damage[i].combine(HitResult::Fail);
                        did_anything = did_anything.combine(HitResult::Silent);
                        continue;
                    }
                    let raw = f64::from(combatant.base_maxhp) * f64::from(numerator) / f64::from(denominator.max(1));
                    let amount = self.ruleset.heal_rounding.apply(raw);
                    let healed = self.heal(amount, target, Some(user), Some(move_ref.clone()));
                    if !healed.keeps_target() {
                        if healed != HitResult::Silent {
                            self.add_fail(user);
                        }
                        tracing::debug!(%target, "heal interrupted");
                        damage[i] = damage[i].combine(HitResult::Fail);
                        did_anything = did_anything.combine(HitResult::Silent);
                        continue;
                    }
                    did = HitResult::Success;
                }

                if let Some(status) = &effect.status {
                    let result = self.try_set_status(target, status, Some(user), Some(move_ref.clone()));
                    if !result.is_truthy() && active_move.data.hit.status.is_some() {
                        damage[i] = damage[i].combine(HitResult::Fail);
                        did_anything = did_anything.combine(HitResult::Silent);
                        continue;
                    }
                    did = did.combine(result);
                }
                if let Some(status) = &effect.force_status {
                    did = did.combine(self.set_status(target, status, Some(user), Some(move_ref.clone())));
                }
                if let Some(volatile) = &effect.volatile_status {
                    did = did.combine(self.add_volatile(target, volatile, Some(user), Some(move_ref.clone())));
                }
                if let Some(condition) = &effect.side_condition {
                    let side = self.state[target].side;
                    did = did.combine(self.add_side_condition(side, condition, Some(user), Some(move_ref.clone())));
                }
                if let Some(condition) = &effect.slot_condition {
                    did = did.combine(self.add_slot_condition(target, condition, Some(user), Some(move_ref.clone())));
                }
                if let Some(weather) = &effect.weather {
                    did = did.combine(self.set_weather(weather, Some(user)));
                }
                if let Some(terrain) = &effect.terrain {
                    did = did.combine(self.set_terrain(terrain, Some(user)));
                }
                if let Some(condition) = &effect.pseudo_weather {
                    did = did.combine(self.add_pseudo_weather(condition, Some(user)));
                }
                if effect.force_switch {
                    let side = self.state[target].side;
                    did = did.combine(HitResult::from_bool(self.can_switch(side) > 0));
                }

                did = self.fire_hit_handlers(did, target, user, active_move, data, is_secondary, is_self);
            }

            if effect.self_switch.is_some() {
                let side = self.state[user].side;
                did = if self.can_switch(side) > 0 { HitResult::Success } else { did.combine(HitResult::Fail) };
            }
            if did == HitResult::NotAttempted {
                did = HitResult::Success;
            }
            let folded = if did == HitResult::Silent { HitResult::Fail } else { did };
            damage[i] = damage[i].combine(folded);
            did_anything = did_anything.combine(did);
        }

        let self_destructs = data.is_primary() && active_move.self_destruct.is_some();
        if !did_anything.keeps_target() && data.self_effect(active_move).is_none() && !self_destructs {
            if !is_self && !is_secondary && did_anything == HitResult::Fail {
                self.add_fail(user);
            }
            tracing::debug!(move_id = %active_move.id, "move failed because it did nothing");
        } else if active_move.data.hit.self_switch.is_some() && self.state[user].hp > 0 {
            self.state[user].switch_flag = Some(active_move.id.clone());
        }

        damage
    }

    /// The move's own hit handlers for this part of the move, then the
    /// broadcast `Hit` for primary hits on a target.
    #[allow(clippy::too_many_arguments)]
    fn fire_hit_handlers(
        &mut self,
        mut did: HitResult,
        target: CombatantId,
        user: CombatantId,
        active_move: &mut ActiveMove,
        data: &HitData,
        is_secondary: bool,
        is_self: bool,
    ) -> HitResult {
        let subject = active_move.effect_ref();
        let registered = |battle: &Self, event| battle.hooks.has(event, &subject, HookScope::OnEffect);

        match active_move.target {
            MoveTarget::All if !is_self => {
                if registered(self, HookEvent::HitField) {
                    let relay = self.single_move_event(HookEvent::HitField, target, Some(user), active_move, Relay::SUCCESS);
                    did = did.combine(relay.as_result());
                }
            }
            MoveTarget::FoeSide | MoveTarget::AllySide if !is_self => {
                if registered(self, HookEvent::HitSide) {
                    let side = EventTarget::Side(self.state[target].side);
                    let relay = self.single_move_event(HookEvent::HitSide, side, Some(user), active_move, Relay::SUCCESS);
                    did = did.combine(relay.as_result());
                }
            }
            _ => {
                let event = data.hit_event();
                if registered(self, event) {
                    let relay = self.single_move_event(event, target, Some(user), active_move, Relay::SUCCESS);
                    did = did.combine(relay.as_result());
                }
                if !is_self && !is_secondary {
                    self.run_move_event(HookEvent::Hit, target, Some(user), active_move, Relay::SUCCESS);
                }
            }
        }
        did
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Combatant, ConditionState, EffectRef, Id, Ruleset, SideId, StatTable};
    use crate::dex::{Dex, HitEffect, MoveData, SelfSwitch};
    use crate::hooks::{EventContext, Hook, HookResult};

    fn setup() -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(Ruleset::default(), Dex::new(), 3, 1);
        let a = battle.add_combatant(SideId::new(0), Combatant::new("A", 50, 100, StatTable::uniform(50)));
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 50, 100, StatTable::uniform(50)));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    fn run(battle: &mut Battle, target: CombatantId, user: CombatantId, mv: &mut ActiveMove) -> Vec<HitResult> {
        battle.run_move_effects(vec![HitResult::NotAttempted], &[TargetSlot::Live(target)], user, mv, &HitData::Primary, false, false)
    }

    fn refuse(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::silent()
    }

    #[test]
    fn test_nothing_tried_is_success() {
        let (mut battle, a, b) = setup();
        let mut splash = ActiveMove::new(MoveData::status("Splash", "Normal"));
        assert_eq!(run(&mut battle, b, a, &mut splash), vec![HitResult::Success]);
        assert!(battle.log.is_empty());
    }

    #[test]
    fn test_heal_at_full_fails() {
        let (mut battle, a, _) = setup();
        let mut recover = ActiveMove::new(MoveData::status("Recover", "Normal").with_hit(HitEffect::new().with_heal(1, 2)));
        let result = run(&mut battle, a, a, &mut recover);
        assert_eq!(result, vec![HitResult::Fail]);
        assert_eq!(battle.log.lines(), vec!["|-fail|p1a: A|heal".to_string()]);
    }

    #[test]
    fn test_heal_uses_base_max_hp() {
        let (mut battle, a, _) = setup();
        battle.state[a].hp = 20;
        let mut recover = ActiveMove::new(MoveData::status("Recover", "Normal").with_hit(HitEffect::new().with_heal(1, 2)));
        assert_eq!(run(&mut battle, a, a, &mut recover), vec![HitResult::Success]);
        assert_eq!(battle.state[a].hp, 70);
    }

    #[test]
    fn test_failed_volatile_announces_generic_failure() {
        let (mut battle, a, b) = setup();
        battle.state[b].volatiles.insert(Id::new("confusion"), ConditionState::new("confusion"));
        let mut confuse_ray =
            ActiveMove::new(MoveData::status("Confuse Ray", "Ghost").with_hit(HitEffect::new().with_volatile("confusion")));
        assert_eq!(run(&mut battle, b, a, &mut confuse_ray), vec![HitResult::Fail]);
        assert_eq!(battle.log.lines(), vec!["|-fail|p1a: A".to_string()]);
    }

    #[test]
    fn test_silent_handler_is_not_announced() {
        let (mut battle, a, b) = setup();
        battle.register_hook(Hook::on_effect(HookEvent::Hit, EffectRef::of_move("haze"), refuse));
        let mut haze = ActiveMove::new(MoveData::status("Haze", "Ice"));
        assert_eq!(run(&mut battle, b, a, &mut haze), vec![HitResult::Fail]);
        assert!(battle.log.is_empty());
    }

    #[test]
    fn test_self_switch_sets_flag() {
        let (mut battle, a, b) = setup();
        let bench = battle.add_combatant(SideId::new(0), Combatant::new("C", 50, 100, StatTable::uniform(50)));
        assert!(!battle.state[bench].active);
        let mut hit = HitEffect::new();
        hit.self_switch = Some(SelfSwitch::Switch);
        let mut u_turn = ActiveMove::new(MoveData::physical("U-turn", "Bug", 70).with_hit(hit));
        run(&mut battle, b, a, &mut u_turn);
        assert_eq!(battle.state[a].switch_flag, Some(Id::new("uturn")));
    }
}
