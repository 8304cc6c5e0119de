//! The hit pipeline: gates and stages between "the move is used" and the
//! hit loop.
//!
//! ## Stages
//!
//! [`Battle::try_spread_move_hit`] runs the ruleset's [`HitStep`] order over
//! the target list. A stage answers one result per target; targets whose
//! result does not keep them are dropped before the next stage. Two stages
//! (`BreakProtect`, `StealBoosts`) only mutate state and answer nothing.
//!
//! Field-wide and side-wide moves skip the stages and go through
//! [`Battle::try_move_hit`] instead.

use crate::battle::Battle;
use crate::core::{BoostId, BoostTable, CombatantId, HitStep, TurnResult};
use crate::dex::{Accuracy, MoveTarget, Ohko};
use crate::hooks::{HitResult, HookEvent, Relay};
use crate::log::LogEntry;

use super::{ActiveMove, HitData};

/// Accuracy multipliers by boost stage.
const ACCURACY_STAGES: [f64; 7] = [1.0, 4.0 / 3.0, 5.0 / 3.0, 2.0, 7.0 / 3.0, 8.0 / 3.0, 3.0];

/// Single-combatant protections removed by protect-breaking moves.
const PROTECTIONS: [&str; 5] = ["banefulbunker", "kingsshield", "obstruct", "protect", "spikyshield"];

/// Side-wide guards removed by protect-breaking moves.
const GUARDS: [&str; 4] = ["craftyshield", "matblock", "quickguard", "wideguard"];

/// Protect-breaking moves that break silently.
const QUIET_BREAKERS: [&str; 3] = ["feint", "gmaxoneblow", "gmaxrapidflow"];

impl Battle {
    /// Run the hit pipeline for a move with a list of combatant targets.
    ///
    /// Returns true if at least one target survived every stage.
    pub fn try_spread_move_hit(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> bool {
        let Some(&first) = targets.first() else {
            return false;
        };
        if targets.len() > 1 && !active_move.smart_target {
            active_move.spread_hit = true;
        }
        self.set_active_move(active_move, user, Some(first));

        let relay = self.single_move_event(HookEvent::Try, user, Some(first), active_move, Relay::SUCCESS);
        if !self.gate_passed(&relay, user) {
            return false;
        }
        let relay = self.single_move_event(HookEvent::PrepareHit, first, Some(user), active_move, Relay::SUCCESS);
        if !self.gate_passed(&relay, user) {
            return false;
        }
        self.run_move_event(HookEvent::PrepareHit, user, Some(first), active_move, Relay::SUCCESS);

        let mut remaining = targets.to_vec();
        let mut at_least_one_failure = false;
        for step in self.ruleset.hit_steps.clone() {
            let Some(results) = self.run_hit_step(step, &remaining, user, active_move) else {
                continue;
            };
            at_least_one_failure |= results.iter().any(|r| r.is_fail());
            remaining = remaining
                .into_iter()
                .zip(results)
                .filter(|(_, result)| result.keeps_target())
                .map(|(target, _)| target)
                .collect();
            tracing::trace!(?step, remaining = remaining.len(), "hit step");
            if remaining.is_empty() {
                break;
            }
        }

        if remaining.is_empty() && !at_least_one_failure {
            self.state[user].move_this_turn_result = TurnResult::NoChoice;
        }
        if active_move.spread_hit {
            let slots: Vec<String> = remaining.iter().map(|&t| self.slot_label(t)).collect();
            self.log.attr_last_move(format!("[spread] {}", slots.join(",")));
        }
        !remaining.is_empty()
    }

    fn run_hit_step(
        &mut self,
        step: HitStep,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Option<Vec<HitResult>> {
        match step {
            HitStep::Invulnerability => Some(self.hit_step_invulnerability_event(targets, user, active_move)),
            HitStep::TryHit => Some(self.hit_step_try_hit_event(targets, user, active_move)),
            HitStep::TypeImmunity => Some(self.hit_step_type_immunity(targets, user, active_move)),
            HitStep::TryImmunity => Some(self.hit_step_try_immunity(targets, user, active_move)),
            HitStep::Accuracy => Some(self.hit_step_accuracy(targets, user, active_move)),
            HitStep::BreakProtect => {
                self.hit_step_break_protect(targets, user, active_move);
                None
            }
            HitStep::StealBoosts => {
                self.hit_step_steal_boosts(targets, user, active_move);
                None
            }
            HitStep::MoveHitLoop => Some(self.hit_step_move_hit_loop(targets, user, active_move)),
        }
    }

    /// True if a gate relay lets the move through; announces a `Fail`.
    pub(super) fn gate_passed(&mut self, relay: &Relay, user: CombatantId) -> bool {
        if relay.is_truthy() {
            return true;
        }
        if relay.as_result().is_fail() {
            self.add_fail(user);
        }
        false
    }

    /// Run the pipeline for a field-wide or side-wide move.
    pub fn try_move_hit(&mut self, target: CombatantId, user: CombatantId, active_move: &mut ActiveMove) -> HitResult {
        self.set_active_move(active_move, user, Some(target));

        let relay = self.single_move_event(HookEvent::Try, user, Some(target), active_move, Relay::SUCCESS);
        if !relay.is_truthy() {
            return HitResult::Fail;
        }
        let relay = self.single_move_event(HookEvent::PrepareHit, target, Some(user), active_move, Relay::SUCCESS);
        if !self.gate_passed(&relay, user) {
            return HitResult::Fail;
        }
        self.run_move_event(HookEvent::PrepareHit, user, Some(target), active_move, Relay::SUCCESS);

        let event = if active_move.target == MoveTarget::All { HookEvent::TryHitField } else { HookEvent::TryHitSide };
        let relay = self.run_move_event(event, target, Some(user), active_move, Relay::SUCCESS);
        if !self.gate_passed(&relay, user) {
            return HitResult::Fail;
        }

        self.move_hit(target, user, active_move, &HitData::Primary, false, false)
    }

    // === Stages ===

    /// Semi-invulnerable targets dodge unless a handler lets the move in.
    pub fn hit_step_invulnerability_event(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let poison_toxic =
            self.ruleset.generation >= 8 && active_move.id == "toxic" && self.state[user].has_type("Poison");
        if active_move.id == "helpinghand" || poison_toxic {
            return vec![HitResult::Success; targets.len()];
        }
        let mut results = Vec::with_capacity(targets.len());
        for &target in targets {
            let result = self
                .run_move_event(HookEvent::Invulnerability, target, Some(user), active_move, Relay::SUCCESS)
                .as_result();
            if result.is_fail() {
                self.announce_miss(user, target, active_move);
            }
            results.push(result);
        }
        results
    }

    pub fn hit_step_try_hit_event(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let mut results = Vec::with_capacity(targets.len());
        for &target in targets {
            let relay = self.run_move_event(HookEvent::TryHit, target, Some(user), active_move, Relay::SUCCESS);
            results.push(relay.as_result());
        }
        if !results.contains(&HitResult::Success) && results.iter().any(|r| r.is_fail()) {
            self.add_fail(user);
        }
        for result in &mut results {
            if *result != HitResult::NotFail && !result.is_truthy() {
                *result = HitResult::Fail;
            }
        }
        results
    }

    pub fn hit_step_type_immunity(
        &mut self,
        targets: &[CombatantId],
        _user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let default = active_move.is_status();
        let ignore = *active_move.ignore_immunity.get_or_insert(default);
        let move_type = active_move.move_type.clone();

        let mut results = Vec::with_capacity(targets.len());
        for &target in targets {
            let result = if ignore {
                HitResult::Success
            } else {
                let announce = !active_move.smart_target;
                HitResult::from_bool(self.run_immunity(target, &move_type, announce))
            };
            if active_move.smart_target && !result.is_truthy() {
                active_move.smart_target = false;
            }
            results.push(result);
        }
        results
    }

    /// Powder, move-specific and prankster immunities.
    pub fn hit_step_try_immunity(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let mut results = Vec::with_capacity(targets.len());
        for &target in targets {
            let immune = if self.ruleset.powder_immunity
                && active_move.flags.powder
                && target != user
                && self.state[target].has_type("Grass")
            {
                tracing::debug!(%target, "natural powder immunity");
                true
            } else if !self
                .single_move_event(HookEvent::TryImmunity, target, Some(user), active_move, Relay::SUCCESS)
                .is_truthy()
            {
                true
            } else if self.ruleset.prankster_immunity
                && active_move.prankster_boosted
                && self.state[user].has_ability("prankster")
                && self.state[target].side != self.state[user].side
                && self.state[target].has_type("Dark")
            {
                tracing::debug!(%target, "natural prankster immunity");
                true
            } else {
                false
            };

            if immune {
                let target = self.ident(target);
                self.log.push(LogEntry::Immune { target, note: None });
                results.push(HitResult::Fail);
            } else {
                results.push(HitResult::Success);
            }
        }
        results
    }

    pub fn hit_step_accuracy(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let mut results = Vec::with_capacity(targets.len());
        for &target in targets {
            let Some(accuracy) = self.move_accuracy(target, user, active_move) else {
                let target = self.ident(target);
                self.log.push(LogEntry::Immune { target, note: Some("[ohko]".to_string()) });
                results.push(HitResult::Fail);
                continue;
            };
            if self.roll_accuracy(target, user, active_move, accuracy) {
                results.push(HitResult::Success);
            } else {
                self.announce_miss(user, target, active_move);
                results.push(HitResult::Fail);
            }
        }
        results
    }

    /// Effective accuracy of `active_move` against `target`.
    ///
    /// `None` means a one-hit KO cannot affect the target at all (higher
    /// level, dynamaxed, or the type it is keyed on).
    pub fn move_accuracy(
        &mut self,
        target: CombatantId,
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Option<Accuracy> {
        if let Some(ohko) = active_move.ohko.clone() {
            let (attacker, defender) = (&self.state[user], &self.state[target]);
            if defender.is_semi_invulnerable() {
                return Some(active_move.accuracy);
            }
            let mut accuracy = 30;
            if let Ohko::Typed(ty) = &ohko {
                if self.ruleset.ice_ohko_penalty && *ty == "ice" && !attacker.has_type("Ice") {
                    accuracy = 20;
                }
            }
            let keyed_type_blocks = matches!(&ohko, Ohko::Typed(ty) if defender.has_type(ty.as_str()));
            if defender.has_volatile("dynamax") || attacker.level < defender.level || keyed_type_blocks {
                return None;
            }
            accuracy += u32::from(attacker.level - defender.level);
            return Some(Accuracy::Percent(accuracy));
        }

        let mut accuracy = active_move.accuracy;
        if let Accuracy::Percent(base) = accuracy {
            let mut value = f64::from(base);
            if !active_move.ignore_accuracy {
                let stage = self.state[user].boosts.get(BoostId::Accuracy).clamp(-6, 6);
                let factor = ACCURACY_STAGES[stage.unsigned_abs() as usize];
                value = if stage > 0 { value * factor } else { value / factor };
            }
            if !active_move.ignore_evasion {
                let stage = self.state[target].boosts.get(BoostId::Evasion).clamp(-6, 6);
                let factor = ACCURACY_STAGES[stage.unsigned_abs() as usize];
                if stage > 0 {
                    value /= factor;
                } else if stage < 0 {
                    value *= factor;
                }
            }
            accuracy = Accuracy::Percent(value.ceil() as u32);
        }

        let relay = self.run_move_event(HookEvent::ModifyAccuracy, target, Some(user), active_move, Relay::Accuracy(accuracy));
        Some(match relay {
            Relay::Accuracy(modified) => modified,
            Relay::Int(n) => Accuracy::Percent(n.max(0) as u32),
            _ => accuracy,
        })
    }

    /// Run the `Accuracy` event and roll against what it settles on.
    pub fn roll_accuracy(
        &mut self,
        target: CombatantId,
        user: CombatantId,
        active_move: &mut ActiveMove,
        accuracy: Accuracy,
    ) -> bool {
        let relay = self.run_move_event(HookEvent::Accuracy, target, Some(user), active_move, Relay::Accuracy(accuracy));
        let chance = match relay {
            Relay::Accuracy(Accuracy::AlwaysHits) | Relay::Result(HitResult::Success) => return true,
            Relay::Accuracy(Accuracy::Percent(p)) => p,
            Relay::Int(n) => n.max(0) as u32,
            _ => 0,
        };
        let hit = self.rng.random_chance(chance, 100);
        tracing::trace!(chance, hit, "accuracy roll");
        hit
    }

    /// Strip protections from every target.
    pub fn hit_step_break_protect(&mut self, targets: &[CombatantId], user: CombatantId, active_move: &mut ActiveMove) {
        if !active_move.breaks_protect {
            return;
        }
        for &target in targets {
            let mut broke = false;
            for id in PROTECTIONS {
                broke |= self.remove_volatile(target, id);
            }
            let side = self.state[target].side;
            if self.ruleset.break_protect_own_side || side != self.state[user].side {
                for id in GUARDS {
                    broke |= self.remove_side_condition(side, id);
                }
            }
            if !broke {
                continue;
            }

            let attrs = if QUIET_BREAKERS.contains(&active_move.id.as_str()) {
                Vec::new()
            } else {
                vec!["[broken]".to_string()]
            };
            let who = self.ident(target);
            self.log.push(LogEntry::Activate { who, effect: format!("move: {}", active_move.name), attrs });
            if self.ruleset.break_protect_clears_stall {
                self.remove_volatile(target, "stall");
            }
        }
    }

    /// Move the first target's positive stages to the user.
    pub fn hit_step_steal_boosts(&mut self, targets: &[CombatantId], user: CombatantId, active_move: &mut ActiveMove) {
        if !active_move.steals_boosts {
            return;
        }
        let Some(&target) = targets.first() else {
            return;
        };
        let mut stolen = BoostTable::new();
        for (stat, stage) in self.state[target].boosts.iter() {
            if stage > 0 {
                stolen.set(stat, stage);
            }
        }
        if stolen.is_empty() {
            return;
        }

        self.log.attr_last_move("[still]");
        let (target_ident, user_ident) = (self.ident(target), self.ident(user));
        self.log.push(LogEntry::ClearPositiveBoost {
            target: target_ident,
            source: user_ident,
            effect: format!("move: {}", active_move.name),
        });
        self.boost(&stolen, user, Some(user), Some(active_move.effect_ref()), false, false);
        for (stat, _) in stolen.iter() {
            self.state[target].boosts.set(stat, 0);
        }
    }

    /// Log a miss, unless the move is still free to aim elsewhere.
    pub(crate) fn announce_miss(&mut self, user: CombatantId, target: CombatantId, active_move: &mut ActiveMove) {
        if active_move.smart_target {
            active_move.smart_target = false;
            return;
        }
        if !active_move.spread_hit {
            self.log.attr_last_move("[miss]");
        }
        let (user, target) = (self.ident(user), self.ident(target));
        self.log.push(LogEntry::Miss { user, target });
    }
}
