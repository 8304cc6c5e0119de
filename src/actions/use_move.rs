//! The inside caller: everything about a move use except choosing it.
//!
//! Callers that make a combatant use a move without it counting as the
//! combatant's action (a move calling another move, a reflected move) go
//! through [`Battle::use_move`]; [`Battle::run_move`] wraps it with PP,
//! locking and the before/after move events.

use crate::battle::Battle;
use crate::core::{CombatantId, EffectKind, EffectRef, Id, Result, SelfDestructTiming, TurnResult};
use crate::dex::{HitEffect, SelfDestruct};
use crate::hooks::{HitResult, HookEvent, Relay};
use crate::log::LogEntry;

use super::{ActiveMove, Empowered, HitData};

/// Callers whose use of a move is not annotated with `[from]`.
const SILENT_CALLERS: [&str; 2] = ["instruct", "custapberry"];

impl Battle {
    /// A fresh effective move for `id`.
    pub fn get_active_move(&self, id: &Id) -> Result<ActiveMove> {
        Ok(ActiveMove::new(self.dex.require_move(id)?.clone()))
    }

    /// Use `active_move` against `target`, or a random legal target.
    ///
    /// Records the turn outcome on the user unless a nested use already
    /// decided it. `active_move` is left as the effective move of the use.
    pub fn use_move(
        &mut self,
        active_move: &mut ActiveMove,
        user: CombatantId,
        target: Option<CombatantId>,
        source_effect: Option<EffectRef>,
        empowered: Option<Empowered>,
    ) -> Result<bool> {
        self.state[user].move_this_turn_result = TurnResult::Undecided;
        let did_something = self.use_move_inner(active_move, user, target, source_effect, empowered)?;
        if self.state[user].move_this_turn_result == TurnResult::Undecided {
            self.state[user].move_this_turn_result =
                if did_something { TurnResult::Succeeded } else { TurnResult::Failed };
        }
        Ok(did_something)
    }

    /// True if `source` is the move in flight and it was used in `form`.
    fn called_by_empowered(&self, source: Option<&EffectRef>, form: Empowered) -> bool {
        let Some(source) = source.filter(|s| s.kind == EffectKind::Move) else {
            return false;
        };
        self.active_move
            .as_ref()
            .is_some_and(|ctx| ctx.move_id == source.id && ctx.empowered == Some(form))
    }

    fn use_move_inner(
        &mut self,
        active_move: &mut ActiveMove,
        user: CombatantId,
        mut target: Option<CombatantId>,
        mut source_effect: Option<EffectRef>,
        empowered: Option<Empowered>,
    ) -> Result<bool> {
        if source_effect.as_ref().is_some_and(|s| SILENT_CALLERS.contains(&s.id.as_str())) {
            source_effect = None;
        }

        if active_move.id == "weatherball" && empowered == Some(Empowered::Z) {
            // Only a directly used Weather Ball keeps its weather type.
            self.single_move_event(HookEvent::ModifyType, user, target, active_move, Relay::SUCCESS);
            if active_move.move_type != "normal" {
                source_effect = Some(active_move.effect_ref());
            }
        }

        let damaging = !active_move.is_status();
        if empowered == Some(Empowered::Z)
            || (damaging && self.called_by_empowered(source_effect.as_ref(), Empowered::Z))
        {
            *active_move = self.get_active_z_move(&active_move.data, user)?;
        }
        if empowered == Some(Empowered::Max) && damaging {
            self.single_move_event(HookEvent::ModifyType, user, target, active_move, Relay::SUCCESS);
            self.run_move_event(HookEvent::ModifyType, user, target, active_move, Relay::SUCCESS);
        }
        if empowered == Some(Empowered::Max)
            || (damaging && self.called_by_empowered(source_effect.as_ref(), Empowered::Max))
        {
            *active_move = self.get_active_max_move(&active_move.data)?;
        }

        if let Some(ctx) = &self.active_move {
            active_move.priority = ctx.priority;
            if !active_move.has_bounced {
                active_move.prankster_boosted = ctx.prankster_boosted;
            }
        }

        let base_target = active_move.target;
        if target.is_none() {
            target = self.get_random_target(user, active_move.target);
        }
        if active_move.target.targets_user() {
            target = Some(user);
        }
        if source_effect.is_some() {
            active_move.source_effect = source_effect.clone();
        }

        self.set_active_move(active_move, user, target);

        self.single_move_event(HookEvent::ModifyType, user, target, active_move, Relay::SUCCESS);
        self.single_move_event(HookEvent::ModifyMove, user, target, active_move, Relay::SUCCESS);
        if base_target != active_move.target {
            target = self.get_random_target(user, active_move.target);
        }
        self.run_move_event(HookEvent::ModifyType, user, target, active_move, Relay::SUCCESS);
        self.run_move_event(HookEvent::ModifyMove, user, target, active_move, Relay::SUCCESS);
        if base_target != active_move.target {
            target = self.get_random_target(user, active_move.target);
        }
        if self.state[user].fainted {
            return Ok(false);
        }

        self.log_move_use(active_move, user, target, source_effect.as_ref(), empowered);
        if empowered == Some(Empowered::Z) {
            self.run_z_power(active_move, user);
        }

        let Some(mut target) = target else {
            self.announce_no_target(user);
            return Ok(false);
        };

        let (targets, pressure) = self.get_move_targets(user, active_move, target);
        if let Some(&last) = targets.last() {
            target = last;
        }

        if source_effect.as_ref().map_or(true, |s| s.is_move("pursuit")) {
            let mut extra_pp = 0i64;
            for &holder in &pressure {
                if let Relay::Int(drop) =
                    self.run_move_event(HookEvent::DeductPP, holder, Some(user), active_move, Relay::SUCCESS)
                {
                    extra_pp += drop.max(0);
                }
            }
            if extra_pp > 0 {
                let amount = u8::try_from(extra_pp).unwrap_or(u8::MAX);
                self.deduct_pp(user, &active_move.id, amount);
            }
        }

        let single = self.single_move_event(HookEvent::TryMove, user, Some(target), active_move, Relay::SUCCESS);
        let allowed = single.is_truthy()
            && self.run_move_event(HookEvent::TryMove, user, Some(target), active_move, Relay::SUCCESS).is_truthy();
        if !allowed {
            active_move.mind_blown_recoil = false;
            return Ok(false);
        }

        self.single_move_event(HookEvent::UseMoveMessage, user, Some(target), active_move, Relay::SUCCESS);

        if active_move.ignore_immunity.is_none() {
            active_move.ignore_immunity = Some(active_move.is_status());
        }

        let self_destructs = active_move.self_destruct == Some(SelfDestruct::Always);
        let timing = self.ruleset.self_destruct_timing;
        if self_destructs && timing == SelfDestructTiming::BeforeHit {
            self.faint(user, Some(user), Some(active_move.effect_ref()));
        }

        let move_result = if active_move.target.is_field_wide() {
            let result = self.try_move_hit(target, user, active_move);
            if result == HitResult::NotFail {
                self.state[user].move_this_turn_result = TurnResult::NoChoice;
            }
            matches!(result, HitResult::Success | HitResult::Damage(_) | HitResult::NotAttempted)
        } else {
            if targets.is_empty() {
                self.announce_no_target(user);
                return Ok(false);
            }
            let hit = self.try_spread_move_hit(&targets, user, active_move);
            if self_destructs && timing == SelfDestructTiming::AfterHit {
                self.faint(user, Some(user), Some(active_move.effect_ref()));
            }
            hit
        };

        if let Some(boosts) = active_move.self_boost.filter(|_| move_result) {
            let data = HitData::SelfEffect(HitEffect::new().with_boosts(boosts));
            self.move_hit(user, user, active_move, &data, false, true);
        }
        if self.state[user].hp == 0 {
            self.faint(user, Some(user), Some(active_move.effect_ref()));
        }

        if !move_result {
            self.single_move_event(HookEvent::MoveFail, target, Some(user), active_move, Relay::SUCCESS);
            return Ok(false);
        }

        if !active_move.negate_secondary {
            let hp_before = self.state[user].hp;
            self.single_move_event(HookEvent::AfterMoveSecondarySelf, user, Some(target), active_move, Relay::SUCCESS);
            self.run_move_event(HookEvent::AfterMoveSecondarySelf, user, Some(target), active_move, Relay::SUCCESS);
            let (hp, maxhp) = (self.state[user].hp, self.state[user].maxhp);
            if user != target && !active_move.is_status() && hp <= maxhp / 2 && hp_before > maxhp / 2 {
                self.emergency_exit(user, Some(user));
            }
        }

        Ok(true)
    }

    /// The public "move used" record, before anything about the use is
    /// known.
    fn log_move_use(
        &mut self,
        active_move: &ActiveMove,
        user: CombatantId,
        target: Option<CombatantId>,
        source_effect: Option<&EffectRef>,
        empowered: Option<Empowered>,
    ) {
        let mut move_name = if active_move.id == "hiddenpower" {
            "Hidden Power".to_string()
        } else {
            active_move.name.clone()
        };
        let mut attrs = Vec::new();
        if let Some(source) = source_effect {
            attrs.push(format!("[from]{}{}", source.kind.log_prefix(), self.effect_name(source)));
        }
        if empowered == Some(Empowered::Z) && active_move.z_status {
            attrs.insert(0, format!("[anim]{}", move_name));
            move_name = format!("Z-{}", move_name);
        }

        let entry = LogEntry::Move {
            user: self.ident(user),
            move_name,
            target: target.map(|t| self.ident(t)),
            attrs,
        };
        self.log.push(entry);
    }

    fn announce_no_target(&mut self, user: CombatantId) {
        self.log.attr_last_move("[notarget]");
        let who = self.ident(user);
        if self.ruleset.no_target_fails {
            self.log.push(LogEntry::Fail { who, what: None });
        } else {
            self.log.push(LogEntry::NoTarget { who });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Combatant, Ruleset, SideId, StatTable};
    use crate::dex::{Dex, FixedDamage, MoveData, MoveTarget};
    use crate::hooks::{EventContext, Hook, HookResult};

    fn dex() -> Dex {
        let mut dex = Dex::new();
        dex.register_move(MoveData::special("Sonic Boom", "Normal", 0).with_fixed_damage(FixedDamage::Amount(20)));
        dex.register_move(
            MoveData::physical("Explosion", "Normal", 250)
                .with_fixed_damage(FixedDamage::Amount(40))
                .with_target(MoveTarget::AllAdjacent)
                .with_self_destruct(SelfDestruct::Always),
        );
        dex
    }

    fn setup(ruleset: Ruleset) -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(ruleset, dex(), 17, 1);
        let a = battle.add_combatant(SideId::new(0), Combatant::new("A", 50, 100, StatTable::uniform(50)));
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 50, 100, StatTable::uniform(50)));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    fn forbid(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::fail()
    }

    #[test]
    fn test_use_logs_then_damages() {
        let (mut battle, a, b) = setup(Ruleset::default());
        let mut mv = battle.get_active_move(&Id::new("sonicboom")).unwrap();
        assert!(battle.use_move(&mut mv, a, Some(b), None, None).unwrap());
        assert_eq!(
            battle.log.lines(),
            vec!["|move|p1a: A|Sonic Boom|p2a: B".to_string(), "|-damage|p2a: B|80/100".to_string()]
        );
        assert_eq!(battle.state[a].move_this_turn_result, TurnResult::Succeeded);
        assert_eq!(mv.ignore_immunity, Some(false));
    }

    #[test]
    fn test_try_move_veto_fails_quietly() {
        let (mut battle, a, b) = setup(Ruleset::default());
        battle.register_hook(Hook::on_effect(HookEvent::TryMove, EffectRef::of_move("sonicboom"), forbid));
        let mut mv = battle.get_active_move(&Id::new("sonicboom")).unwrap();
        assert!(!battle.use_move(&mut mv, a, Some(b), None, None).unwrap());
        assert_eq!(battle.state[b].hp, 100);
        assert_eq!(battle.state[a].move_this_turn_result, TurnResult::Failed);
    }

    #[test]
    fn test_from_attribute() {
        let (mut battle, a, b) = setup(Ruleset::default());
        let mut mv = battle.get_active_move(&Id::new("sonicboom")).unwrap();
        battle.use_move(&mut mv, a, Some(b), Some(EffectRef::ability("dancer")), None).unwrap();
        assert_eq!(battle.log.lines()[0], "|move|p1a: A|Sonic Boom|p2a: B|[from]ability: Dancer");
    }

    #[test]
    fn test_no_target() {
        let (mut battle, a, b) = setup(Ruleset::gen(4));
        battle.state[b].fainted = true;
        battle.state[b].hp = 0;
        let mut mv = battle.get_active_move(&Id::new("sonicboom")).unwrap();
        assert!(!battle.use_move(&mut mv, a, Some(b), None, None).unwrap());
        assert_eq!(battle.log.lines().last().map(String::as_str), Some("|-notarget|p1a: A"));
    }

    #[test]
    fn test_self_destruct_before_hit() {
        let (mut battle, a, b) = setup(Ruleset::gen(9));
        let mut mv = battle.get_active_move(&Id::new("explosion")).unwrap();
        assert!(battle.use_move(&mut mv, a, Some(b), None, None).unwrap());
        assert_eq!(battle.state[a].hp, 0);
        assert_eq!(battle.state[b].hp, 60);
    }

    #[test]
    fn test_unknown_move_is_an_error() {
        let (battle, _, _) = setup(Ruleset::default());
        assert!(battle.get_active_move(&Id::new("nosuchmove")).is_err());
    }
}
