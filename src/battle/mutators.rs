//! State changes: damage, healing, boosts, fainting and conditions.
//!
//! Every mutator that can be vetoed fires its gate event first and reports
//! a [`HitResult`], so the pipeline can fold the outcomes of several
//! sub-effects into one.

use im::OrdMap;

use crate::core::{
    AttackRecord, BoostId, BoostTable, CombatantId, ConditionState, EffectKind, EffectRef, FaintEntry, Id, SideId,
};
use crate::hooks::{EventTarget, HitResult, HookEvent, Relay};
use crate::log::LogEntry;

use super::Battle;

impl Battle {
    // === HP ===

    /// Deal damage through the `Damage` gate. Returns the damage dealt.
    ///
    /// A target already at 0 HP takes `Damage(0)`; an inactive one fails.
    pub fn damage(
        &mut self,
        amount: u32,
        target: CombatantId,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        if self.state[target].hp == 0 {
            return HitResult::Damage(0);
        }
        if !self.state[target].is_active() {
            return HitResult::Fail;
        }
        let mut amount = if amount == 0 { 0 } else { amount.max(1) };

        let relay = self.run_plain_event(HookEvent::Damage, target, source, effect.clone(), Relay::Int(i64::from(amount)));
        match relay {
            Relay::Int(n) => amount = n.max(0) as u32,
            Relay::Result(HitResult::Damage(n)) => amount = n,
            other if !other.is_truthy() => return other.as_result(),
            _ => {}
        }
        if amount != 0 {
            amount = amount.max(1);
        }

        let dealt = self.apply_damage(amount, target, source, effect.as_ref());
        let from = self.from_attr(effect.as_ref());
        self.log_damage(target, from);
        HitResult::Damage(dealt)
    }

    /// Deal damage without the `Damage` gate (recoil from the fallback move).
    pub fn direct_damage(
        &mut self,
        amount: u32,
        target: CombatantId,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> u32 {
        if self.state[target].hp == 0 || amount == 0 {
            return 0;
        }
        let dealt = self.apply_damage(amount.max(1), target, source, effect.as_ref());
        let from = self.from_attr(effect.as_ref());
        self.log_damage(target, from);
        dealt
    }

    fn apply_damage(
        &mut self,
        amount: u32,
        target: CombatantId,
        source: Option<CombatantId>,
        effect: Option<&EffectRef>,
    ) -> u32 {
        let combatant = &mut self.state[target];
        let dealt = amount.min(combatant.hp);
        combatant.hp -= dealt;
        if dealt > 0 {
            combatant.hurt_this_turn = Some(combatant.hp);
        }
        let fainted = combatant.hp == 0;

        if let Some(source) = source {
            if effect.is_some_and(|e| e.kind == EffectKind::Move) {
                self.state[source].last_damage = dealt;
            }
        }
        if fainted {
            self.faint(target, source, effect.cloned());
        }
        dealt
    }

    fn log_damage(&mut self, target: CombatantId, from: Option<String>) {
        let combatant = &self.state[target];
        let (hp, maxhp) = (combatant.hp, combatant.maxhp);
        let target = self.ident(target);
        self.log.push(LogEntry::Damage { target, hp, maxhp, from });
    }

    /// Restore HP through the `TryHeal` gate. Returns the HP restored.
    ///
    /// Fails for a fainted, inactive or already-full target.
    pub fn heal(
        &mut self,
        amount: u32,
        target: CombatantId,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        let amount = amount.max(1);
        let relay = self.run_plain_event(HookEvent::TryHeal, target, source, effect.clone(), Relay::Int(i64::from(amount)));
        let amount = match relay {
            Relay::Int(n) if n > 0 => n as u32,
            Relay::Result(HitResult::Damage(n)) if n > 0 => n,
            Relay::Int(_) | Relay::Result(HitResult::Damage(_)) => return HitResult::Damage(0),
            other if !other.is_truthy() => return other.as_result(),
            _ => amount,
        };

        let combatant = &self.state[target];
        if combatant.hp == 0 || !combatant.is_active() || combatant.hp >= combatant.maxhp {
            return HitResult::Fail;
        }

        let combatant = &mut self.state[target];
        let healed = amount.min(combatant.maxhp - combatant.hp);
        combatant.hp += healed;
        let (hp, maxhp) = (combatant.hp, combatant.maxhp);

        let from = self.from_attr(effect.as_ref());
        let ident = self.ident(target);
        self.log.push(LogEntry::Heal { target: ident, hp, maxhp, from });
        HitResult::Damage(healed)
    }

    // === Boosts ===

    /// Apply stage changes through the `ChangeBoost` gate.
    ///
    /// Returns `Success` if any stage moved, `Silent` otherwise. A change
    /// that hits the cap is still announced for primary effects, so the log
    /// can say the stat won't go any higher.
    pub fn boost(
        &mut self,
        boosts: &BoostTable,
        target: CombatantId,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
        is_secondary: bool,
        is_self: bool,
    ) -> HitResult {
        if !self.state[target].is_active() || self.state[target].hp == 0 {
            return HitResult::Fail;
        }
        let relay = self.run_plain_event(HookEvent::ChangeBoost, target, source, effect.clone(), Relay::Boosts(*boosts));
        let boosts = match relay {
            Relay::Boosts(b) => b,
            other if !other.is_truthy() => return other.as_result(),
            _ => *boosts,
        };

        let from = self.from_attr(effect.as_ref());
        let mut success = false;
        for (stat, delta) in boosts.iter() {
            let applied = self.state[target].boost_by(&BoostTable::new().with(stat, delta)).get(stat);
            let at_floor = self.state[target].boosts.get(stat) == -6;
            let unboost = delta < 0 || at_floor;
            if applied != 0 {
                success = true;
                self.log_boost(target, stat, applied, unboost, from.clone());
            } else if !is_secondary && !is_self {
                self.log_boost(target, stat, 0, unboost, from.clone());
            }
        }

        if success {
            HitResult::Success
        } else {
            HitResult::Silent
        }
    }

    fn log_boost(&mut self, target: CombatantId, stat: BoostId, applied: i8, unboost: bool, note: Option<String>) {
        let target = self.ident(target);
        let amount = applied.unsigned_abs();
        let entry = if unboost {
            LogEntry::Unboost { target, stat, amount, note }
        } else {
            LogEntry::Boost { target, stat, amount, note }
        };
        self.log.push(entry);
    }

    // === Fainting ===

    /// Queue a combatant to faint. Idempotent.
    pub fn faint(&mut self, target: CombatantId, source: Option<CombatantId>, effect: Option<EffectRef>) {
        let combatant = &mut self.state[target];
        if combatant.fainted || combatant.faint_queued {
            return;
        }
        combatant.hp = 0;
        combatant.switch_flag = None;
        combatant.faint_queued = true;
        self.state.faint_queue.push(FaintEntry { target, source, effect });
    }

    /// Process the faint queue, then check for a winner.
    ///
    /// Returns true if the battle is over.
    pub fn faint_messages(&mut self) -> bool {
        if self.state.ended {
            return true;
        }
        while !self.state.faint_queue.is_empty() {
            let entry = self.state.faint_queue.remove(0);
            if self.state[entry.target].fainted {
                continue;
            }
            let who = self.ident(entry.target);
            self.log.push(LogEntry::Faint { who });
            self.run_plain_event(HookEvent::Faint, entry.target, entry.source, entry.effect, Relay::SUCCESS);

            let combatant = &mut self.state[entry.target];
            combatant.fainted = true;
            combatant.faint_queued = false;
            combatant.volatiles = OrdMap::new();
            combatant.boosts = BoostTable::new();
            tracing::debug!(target = %entry.target, "fainted");
        }
        self.check_win()
    }

    fn check_win(&mut self) -> bool {
        let lost = |battle: &Self, side: SideId| {
            battle.state.side(side).party.iter().all(|&id| battle.state[id].fainted || battle.state[id].hp == 0)
        };
        let (p1_lost, p2_lost) = (lost(self, SideId::new(0)), lost(self, SideId::new(1)));
        if !p1_lost && !p2_lost {
            return false;
        }

        self.state.ended = true;
        if p1_lost && p2_lost {
            self.state.winner = None;
            self.log.push(LogEntry::Tie);
        } else {
            let winner = if p1_lost { SideId::new(1) } else { SideId::new(0) };
            self.state.winner = Some(winner);
            self.log.push(LogEntry::Win { side: winner });
        }
        true
    }

    // === Status ===

    /// Immunity of `target` to attacks of `move_type`: type chart, then the
    /// `Immunity` gate. Logs `-immune` if `message` is set.
    pub fn run_immunity(&mut self, target: CombatantId, move_type: &Id, message: bool) -> bool {
        let chart_immune = self.calculator().type_immune(move_type, &self.state[target]);
        let immune = chart_immune || {
            let relay = self.run_plain_event(HookEvent::Immunity, target, None, None, Relay::Id(move_type.clone()));
            !relay.is_truthy()
        };
        if immune && message {
            let target = self.ident(target);
            self.log.push(LogEntry::Immune { target, note: None });
        }
        !immune
    }

    /// Attempt a status, respecting an existing one.
    pub fn try_set_status(
        &mut self,
        target: CombatantId,
        status: &Id,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        let status = self.state[target].status.clone().unwrap_or_else(|| status.clone());
        self.set_status(target, &status, source, effect)
    }

    /// Set a status through the `SetStatus` gate.
    ///
    /// Fails if the target is fainted or already has this status.
    pub fn set_status(
        &mut self,
        target: CombatantId,
        status: &Id,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        if self.state[target].hp == 0 {
            return HitResult::Fail;
        }
        if self.state[target].status.as_ref() == Some(status) {
            if effect.as_ref().is_some_and(|e| e.kind == EffectKind::Move) {
                let who = self.ident(target);
                self.log.push(LogEntry::Fail { who, what: Some(status.to_string()) });
            }
            return HitResult::Fail;
        }

        let relay = self.run_plain_event(HookEvent::SetStatus, target, source, effect, Relay::Id(status.clone()));
        if !relay.is_truthy() {
            return relay.as_result();
        }

        self.state[target].status = Some(status.clone());
        let ident = self.ident(target);
        self.log.push(LogEntry::Status { target: ident, status: status.to_string() });
        HitResult::Success
    }

    /// Remove the major status. Returns false if there was none.
    pub fn cure_status(&mut self, target: CombatantId) -> bool {
        self.state[target].status.take().is_some()
    }

    // === Conditions ===

    /// Add a volatile through the `TryAddVolatile` gate.
    pub fn add_volatile(
        &mut self,
        target: CombatantId,
        id: &Id,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        if self.state[target].hp == 0 || self.state[target].volatiles.contains_key(id) {
            return HitResult::Fail;
        }
        let relay = self.run_plain_event(HookEvent::TryAddVolatile, target, source, effect.clone(), Relay::Id(id.clone()));
        if !relay.is_truthy() {
            return relay.as_result();
        }

        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if let Some(effect) = effect {
            state = state.with_source_effect(effect);
        }
        self.state[target].volatiles.insert(id.clone(), state);
        let ident = self.ident(target);
        self.log.push(LogEntry::Start { target: ident, effect: id.to_string() });
        HitResult::Success
    }

    /// Remove a volatile. Returns false if it was not present.
    pub fn remove_volatile(&mut self, target: CombatantId, id: &str) -> bool {
        self.state[target].volatiles.remove(&Id::new(id)).is_some()
    }

    pub fn add_side_condition(
        &mut self,
        side: SideId,
        id: &Id,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        if self.state.side(side).conditions.contains_key(id) {
            return HitResult::Fail;
        }
        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if let Some(effect) = effect {
            state = state.with_source_effect(effect);
        }
        self.state.side_mut(side).conditions.insert(id.clone(), state);
        self.log.push(LogEntry::SideStart { side, condition: id.to_string() });
        HitResult::Success
    }

    /// Remove a side condition. Returns false if it was not present.
    pub fn remove_side_condition(&mut self, side: SideId, id: &str) -> bool {
        self.state.side_mut(side).conditions.remove(&Id::new(id)).is_some()
    }

    /// Add a condition to the slot `target` occupies.
    pub fn add_slot_condition(
        &mut self,
        target: CombatantId,
        id: &Id,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
    ) -> HitResult {
        let (side, slot) = (self.state[target].side, self.state[target].position);
        let Some(conditions) = self.state.side_mut(side).slot_conditions.get_mut(slot) else {
            return HitResult::Fail;
        };
        if conditions.contains_key(id) {
            return HitResult::Fail;
        }
        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if let Some(effect) = effect {
            state = state.with_source_effect(effect);
        }
        conditions.insert(id.clone(), state);
        HitResult::Success
    }

    // === Field ===

    pub fn set_weather(&mut self, id: &Id, source: Option<CombatantId>) -> HitResult {
        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if !self.state.field.set_weather(state) {
            return HitResult::Fail;
        }
        self.log.push(LogEntry::Weather { weather: id.to_string() });
        HitResult::Success
    }

    pub fn set_terrain(&mut self, id: &Id, source: Option<CombatantId>) -> HitResult {
        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if !self.state.field.set_terrain(state) {
            return HitResult::Fail;
        }
        self.log.push(LogEntry::FieldStart { condition: id.to_string() });
        HitResult::Success
    }

    pub fn add_pseudo_weather(&mut self, id: &Id, source: Option<CombatantId>) -> HitResult {
        let mut state = ConditionState::new(id.clone());
        if let Some(source) = source {
            state = state.with_source(source);
        }
        if !self.state.field.add_pseudo_weather(state) {
            return HitResult::Fail;
        }
        self.log.push(LogEntry::FieldStart { condition: id.to_string() });
        HitResult::Success
    }

    // === Bookkeeping ===

    /// Benched combatants that could replace one on `side`.
    #[must_use]
    pub fn can_switch(&self, side: SideId) -> usize {
        self.state.can_switch(side)
    }

    /// Deduct PP for a move slot; returns the amount deducted.
    pub fn deduct_pp(&mut self, user: CombatantId, move_id: &Id, amount: u8) -> u8 {
        self.state[user].deduct_pp(move_id, amount.max(1))
    }

    /// Record that `user` chose `move_id` this turn.
    pub fn move_used(&mut self, user: CombatantId, move_id: &Id) {
        let combatant = &mut self.state[user];
        combatant.last_move = Some(move_id.clone());
        combatant.move_this_turn = Some(move_id.clone());
    }

    /// Record an incoming attack for counter-style effects.
    pub fn got_attacked(&mut self, target: CombatantId, move_id: &Id, damage: HitResult, source: CombatantId) {
        let damage = match damage {
            HitResult::Damage(_) => damage,
            _ => HitResult::Damage(0),
        };
        self.state[target].attacked_by.push(AttackRecord { source, move_id: move_id.clone(), damage, this_turn: true });
    }

    /// Run the emergency-exit event for a combatant that just dropped to
    /// half HP or below.
    pub(crate) fn emergency_exit(&mut self, target: CombatantId, source: Option<CombatantId>) {
        self.run_plain_event(HookEvent::EmergencyExit, EventTarget::Combatant(target), source, None, Relay::SUCCESS);
    }
}
