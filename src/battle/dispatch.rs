//! Event dispatch.
//!
//! [`Battle::run_event`] broadcasts an event to every subject with a stake
//! in it; [`Battle::single_event`] runs only the causing effect's own
//! handler. Both thread a relay value through the handlers and stop on the
//! first falsy one.

use crate::actions::ActiveMove;
use crate::core::{CombatantId, EffectKind, EffectRef, SideId};
use crate::hooks::{
    sort_by_priority, EventContext, EventTarget, HookEvent, HookFn, HookId, HookResult, HookScope, Relay,
};

use super::Battle;

/// A subject with a stake in an event, and who holds it.
#[derive(Clone, Debug)]
struct Holding {
    subject: EffectRef,
    holder: Option<CombatantId>,
}

/// A handler collected for one dispatch.
#[derive(Clone)]
struct Pending {
    handler: HookFn,
    subject: EffectRef,
    holder: Option<CombatantId>,
}

impl Battle {
    /// Broadcast `cx.event` and return the final relay.
    ///
    /// Collects, in one priority-sorted list:
    /// - the causing effect's own handler, if `cx.on_effect` is set;
    /// - self-scoped handlers of everything held by the target, its side
    ///   and slot, and the field;
    /// - source-scoped handlers of everything held by the source;
    /// - any-scoped handlers of everything held by active combatants.
    ///
    /// Handlers of an ability whose holder has fainted, or of anything whose
    /// holder left the field mid-dispatch, are skipped.
    pub fn run_event(&mut self, cx: &mut EventContext<'_>) -> Relay {
        let pending = self.collect_handlers(cx);
        self.dispatch(cx, pending)
    }

    /// Run only the handler the causing effect registered for `cx.event`.
    ///
    /// Returns the relay unchanged when there is none.
    pub fn single_event(&mut self, cx: &mut EventContext<'_>) -> Relay {
        let Some(effect) = cx.effect.clone() else {
            return cx.relay.clone();
        };
        let mut entries: Vec<_> = self
            .hooks
            .find(cx.event, &effect, HookScope::OnEffect)
            .map(|hook| {
                (hook.priority, hook.id, Pending { handler: hook.handler, subject: effect.clone(), holder: None })
            })
            .collect();
        sort_by_priority(&mut entries);
        self.dispatch(cx, entries.into_iter().map(|e| e.2).collect())
    }

    /// `single_event` for the move in flight.
    pub fn single_move_event(
        &mut self,
        event: HookEvent,
        target: impl Into<EventTarget>,
        source: Option<CombatantId>,
        active_move: &mut ActiveMove,
        relay: impl Into<Relay>,
    ) -> Relay {
        let mut cx = EventContext::new(event, target).with_move(active_move).with_relay(relay);
        cx.source = source;
        self.single_event(&mut cx)
    }

    /// `run_event` for the move in flight.
    pub fn run_move_event(
        &mut self,
        event: HookEvent,
        target: impl Into<EventTarget>,
        source: Option<CombatantId>,
        active_move: &mut ActiveMove,
        relay: impl Into<Relay>,
    ) -> Relay {
        let mut cx = EventContext::new(event, target).with_move(active_move).with_relay(relay);
        cx.source = source;
        self.run_event(&mut cx)
    }

    /// `run_event` without a move, e.g. for state changes.
    pub fn run_plain_event(
        &mut self,
        event: HookEvent,
        target: impl Into<EventTarget>,
        source: Option<CombatantId>,
        effect: Option<EffectRef>,
        relay: impl Into<Relay>,
    ) -> Relay {
        let mut cx = EventContext::new(event, target).with_relay(relay);
        cx.source = source;
        cx.effect = effect;
        self.run_event(&mut cx)
    }

    fn dispatch(&mut self, cx: &mut EventContext<'_>, pending: Vec<Pending>) -> Relay {
        for entry in pending {
            if let Some(holder) = entry.holder {
                let combatant = &self.state[holder];
                if !combatant.active {
                    continue;
                }
                if entry.subject.kind == EffectKind::Ability && combatant.fainted {
                    continue;
                }
            }

            cx.subject = Some(entry.subject);
            cx.holder = entry.holder;
            if let HookResult::Relay(relay) = (entry.handler)(self, cx) {
                cx.relay = relay;
                if !cx.relay.is_truthy() {
                    break;
                }
            }
        }
        cx.subject = None;
        cx.holder = None;
        cx.relay.clone()
    }

    fn collect_handlers(&self, cx: &EventContext<'_>) -> Vec<Pending> {
        let mut entries: Vec<(i32, HookId, Pending)> = Vec::new();
        let push = |holdings: Vec<Holding>, scope: HookScope, entries: &mut Vec<(i32, HookId, Pending)>| {
            for holding in holdings {
                for hook in self.hooks.find(cx.event, &holding.subject, scope) {
                    entries.push((
                        hook.priority,
                        hook.id,
                        Pending { handler: hook.handler, subject: holding.subject.clone(), holder: holding.holder },
                    ));
                }
            }
        };

        if cx.on_effect {
            if let Some(effect) = &cx.effect {
                push(vec![Holding { subject: effect.clone(), holder: None }], HookScope::OnEffect, &mut entries);
            }
        }

        let mut target_holdings = Vec::new();
        match cx.target {
            EventTarget::Combatant(id) => {
                target_holdings.extend(self.combatant_holdings(id));
                let combatant = &self.state[id];
                target_holdings.extend(self.side_holdings(combatant.side, Some(combatant.position), Some(id)));
                target_holdings.extend(self.field_holdings());
            }
            EventTarget::Side(side) => {
                target_holdings.extend(self.side_holdings(side, None, None));
                target_holdings.extend(self.field_holdings());
            }
            EventTarget::Field => target_holdings.extend(self.field_holdings()),
            EventTarget::None => {}
        }
        push(target_holdings, HookScope::OnSelf, &mut entries);

        if let Some(source) = cx.source {
            push(self.combatant_holdings(source), HookScope::OnSource, &mut entries);
        }

        let any: Vec<Holding> = self
            .state
            .all_active()
            .into_iter()
            .flat_map(|id| self.combatant_holdings(id))
            .collect();
        push(any, HookScope::OnAny, &mut entries);

        sort_by_priority(&mut entries);
        entries.into_iter().map(|e| e.2).collect()
    }

    fn combatant_holdings(&self, id: CombatantId) -> Vec<Holding> {
        let combatant = &self.state[id];
        let mut holdings = Vec::new();
        if !combatant.ability.is_empty() {
            holdings.push(Holding { subject: EffectRef::ability(combatant.ability.clone()), holder: Some(id) });
        }
        if let Some(item) = &combatant.item {
            holdings.push(Holding { subject: EffectRef::item(item.clone()), holder: Some(id) });
        }
        if let Some(status) = &combatant.status {
            holdings.push(Holding { subject: EffectRef::status(status.clone()), holder: Some(id) });
        }
        for volatile in combatant.volatiles.keys() {
            holdings.push(Holding { subject: EffectRef::volatile(volatile.clone()), holder: Some(id) });
        }
        holdings
    }

    fn side_holdings(&self, side: SideId, slot: Option<usize>, holder: Option<CombatantId>) -> Vec<Holding> {
        let side = self.state.side(side);
        let mut holdings: Vec<Holding> = side
            .conditions
            .keys()
            .map(|id| Holding { subject: EffectRef::new(EffectKind::SideCondition, id.clone()), holder: None })
            .collect();
        if let Some(conditions) = slot.and_then(|s| side.slot_conditions.get(s)) {
            holdings.extend(
                conditions
                    .keys()
                    .map(|id| Holding { subject: EffectRef::new(EffectKind::SlotCondition, id.clone()), holder }),
            );
        }
        holdings
    }

    fn field_holdings(&self) -> Vec<Holding> {
        let field = &self.state.field;
        let mut holdings = Vec::new();
        if let Some(weather) = field.weather_id() {
            holdings.push(Holding { subject: EffectRef::new(EffectKind::Weather, weather.clone()), holder: None });
        }
        if let Some(terrain) = field.terrain_id() {
            holdings.push(Holding { subject: EffectRef::new(EffectKind::Terrain, terrain.clone()), holder: None });
        }
        for id in field.pseudo_weather.keys() {
            holdings.push(Holding { subject: EffectRef::new(EffectKind::PseudoWeather, id.clone()), holder: None });
        }
        holdings
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::Battle;
    use crate::core::{Combatant, CombatantId, EffectRef, Ruleset, SideId, StatTable};
    use crate::dex::Dex;
    use crate::hooks::{EventContext, HitResult, Hook, HookEvent, HookResult, HookScope, Relay};

    fn setup() -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(Ruleset::default(), Dex::new(), 3, 1);
        let a = battle.add_combatant(
            SideId::new(0),
            Combatant::new("A", 50, 100, StatTable::uniform(50)).with_ability("Levitate").with_item("Leftovers"),
        );
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 50, 100, StatTable::uniform(50)));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    fn double(_: &mut Battle, cx: &mut EventContext<'_>) -> HookResult {
        HookResult::int(cx.relay.as_int().unwrap_or(0) * 2)
    }

    fn add_one(_: &mut Battle, cx: &mut EventContext<'_>) -> HookResult {
        HookResult::int(cx.relay.as_int().unwrap_or(0) + 1)
    }

    fn block(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::fail()
    }

    fn faint_holder(battle: &mut Battle, cx: &mut EventContext<'_>) -> HookResult {
        if let Some(holder) = cx.holder {
            battle.state[holder].fainted = true;
        }
        HookResult::Continue
    }

    #[test]
    fn test_priority_order_and_relay() {
        let (mut battle, a, _) = setup();
        battle.register_hook(Hook::new(HookEvent::Damage, EffectRef::item("leftovers"), add_one));
        battle.register_hook(Hook::new(HookEvent::Damage, EffectRef::ability("levitate"), double).with_priority(5));

        let relay = battle.run_plain_event(HookEvent::Damage, a, None, None, Relay::Int(10));
        // double first (priority 5), then add one.
        assert_eq!(relay, Relay::Int(21));
    }

    #[test]
    fn test_falsy_relay_stops_dispatch() {
        let (mut battle, a, _) = setup();
        battle.register_hook(Hook::new(HookEvent::TryHit, EffectRef::ability("levitate"), block).with_priority(1));
        battle.register_hook(Hook::new(HookEvent::TryHit, EffectRef::item("leftovers"), add_one));

        let relay = battle.run_plain_event(HookEvent::TryHit, a, None, None, Relay::SUCCESS);
        assert_eq!(relay, Relay::Result(HitResult::Fail));
    }

    #[test]
    fn test_scopes() {
        let (mut battle, a, b) = setup();
        battle.register_hook(
            Hook::new(HookEvent::Damage, EffectRef::ability("levitate"), add_one).with_scope(HookScope::OnSource),
        );
        // a is the source, b the target.
        assert_eq!(battle.run_plain_event(HookEvent::Damage, b, Some(a), None, Relay::Int(1)), Relay::Int(2));
        // a is the target: the source-scoped hook does not apply.
        assert_eq!(battle.run_plain_event(HookEvent::Damage, a, Some(b), None, Relay::Int(1)), Relay::Int(1));

        battle.register_hook(
            Hook::new(HookEvent::Damage, EffectRef::item("leftovers"), double).with_scope(HookScope::OnAny),
        );
        assert_eq!(battle.run_plain_event(HookEvent::Damage, b, None, None, Relay::Int(3)), Relay::Int(6));
    }

    #[test]
    fn test_fainted_ability_is_suppressed() {
        let (mut battle, a, _) = setup();
        battle.register_hook(Hook::new(HookEvent::Damage, EffectRef::item("leftovers"), faint_holder).with_priority(1));
        battle.register_hook(Hook::new(HookEvent::Damage, EffectRef::ability("levitate"), add_one));

        let relay = battle.run_plain_event(HookEvent::Damage, a, None, None, Relay::Int(1));
        assert_eq!(relay, Relay::Int(1));
    }

    #[test]
    fn test_single_event_without_handler_keeps_relay() {
        let (mut battle, a, _) = setup();
        let mut cx = EventContext::new(HookEvent::TryHit, a)
            .with_effect(EffectRef::of_move("tackle"))
            .with_relay(HitResult::Damage(4));
        assert_eq!(battle.single_event(&mut cx), Relay::Result(HitResult::Damage(4)));

        battle.register_hook(Hook::on_effect(HookEvent::TryHit, EffectRef::of_move("tackle"), block));
        assert_eq!(battle.single_event(&mut cx), Relay::Result(HitResult::Fail));
    }
}
