//! Hook events and the context handed to each handler.
//!
//! ## Design Philosophy
//!
//! The pipeline fires a fixed vocabulary of [`HookEvent`]s at fixed points.
//! What happens at each point is entirely up to the handlers registered
//! for it, so individual moves, abilities and items never appear in the
//! pipeline itself.
//!
//! A handler reads the [`EventContext`], may mutate the battle and the
//! active move, and answers with a [`HookResult`]: either "no opinion" or a
//! new relay value. A falsy relay stops dispatch.

use serde::{Deserialize, Serialize};

use crate::actions::ActiveMove;
use crate::core::{BoostTable, CombatantId, EffectRef, Id, SideId};
use crate::dex::{Accuracy, SecondaryEffect};

use super::HitResult;

/// Named extension points fired by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    // === Action entry ===
    /// May replace the chosen move (relay: `Id`).
    OverrideAction,
    BeforeMove,
    MoveAborted,
    /// Move-specific pre-move veto.
    BeforeMoveCallback,
    /// Relay `Id` when the user is locked into a move.
    LockMove,
    AfterMove,

    // === Inside caller ===
    ModifyType,
    ModifyMove,
    /// Relay `Combatant`: may redirect a single-target move in doubles.
    RedirectTarget,
    /// Extra PP per pressure target (relay: `Int`).
    DeductPP,
    TryMove,
    UseMoveMessage,
    MoveFail,
    AfterMoveSecondarySelf,
    EmergencyExit,

    // === Hit pipeline ===
    Try,
    PrepareHit,
    Invulnerability,
    TryHit,
    TryHitField,
    TryHitSide,
    Immunity,
    TryImmunity,
    ModifyAccuracy,
    Accuracy,

    // === Spread hit ===
    TryPrimaryHit,
    Hit,
    HitField,
    HitSide,
    /// `Hit` handler of a secondary sub-effect.
    SecondaryHit,
    /// `Hit` handler of a self sub-effect.
    SelfHit,
    ModifySecondaries,
    DragOut,
    DamagingHit,
    AfterHit,
    AfterMoveSecondary,

    // === Entity model ===
    /// Relay `Int`: damage about to be dealt.
    Damage,
    /// Relay `Int`: HP about to be restored.
    TryHeal,
    /// Relay `Boosts`: stage changes about to be applied.
    ChangeBoost,
    SetStatus,
    TryAddVolatile,
    Faint,
    /// Move-specific damage override (relay: `Int`).
    DamageCallback,
    /// Relay `Int`: base power for the damage calculator.
    BasePower,
    /// Relay `Int`: final damage from the damage calculator.
    ModifyDamage,
}

/// What an event is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTarget {
    None,
    Combatant(CombatantId),
    Side(SideId),
    Field,
}

impl EventTarget {
    /// The targeted combatant, if any.
    #[must_use]
    pub const fn combatant(self) -> Option<CombatantId> {
        match self {
            EventTarget::Combatant(id) => Some(id),
            _ => None,
        }
    }
}

impl From<CombatantId> for EventTarget {
    fn from(id: CombatantId) -> Self {
        EventTarget::Combatant(id)
    }
}

impl From<SideId> for EventTarget {
    fn from(side: SideId) -> Self {
        EventTarget::Side(side)
    }
}

/// The value relayed through a chain of handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Relay {
    Result(HitResult),
    Int(i64),
    Accuracy(Accuracy),
    Boosts(BoostTable),
    Secondaries(Vec<SecondaryEffect>),
    Id(Id),
    Combatant(CombatantId),
    /// The hit was absorbed by a barrier standing in for the target.
    Substitute,
}

impl Relay {
    /// The default relay: proceed.
    pub const SUCCESS: Relay = Relay::Result(HitResult::Success);

    /// Falsy relays stop dispatch.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Relay::Result(r) => r.is_truthy(),
            Relay::Int(n) => *n != 0,
            Relay::Accuracy(Accuracy::Percent(p)) => *p != 0,
            Relay::Substitute => false,
            _ => true,
        }
    }

    /// View as a gate result. Non-result values count as proceed, except
    /// zero integers which count as `Damage(0)`.
    #[must_use]
    pub fn as_result(&self) -> HitResult {
        match self {
            Relay::Result(r) => *r,
            Relay::Int(n) => HitResult::Damage((*n).max(0) as u32),
            _ => HitResult::Success,
        }
    }

    /// Integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Relay::Int(n) => Some(*n),
            Relay::Result(HitResult::Damage(n)) => Some(i64::from(*n)),
            _ => None,
        }
    }
}

impl From<HitResult> for Relay {
    fn from(result: HitResult) -> Self {
        Relay::Result(result)
    }
}

/// A handler's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookResult {
    /// No opinion; the relay is unchanged.
    Continue,
    /// Replace the relay. A falsy value stops dispatch.
    Relay(Relay),
}

impl HookResult {
    /// Announced failure.
    #[must_use]
    pub const fn fail() -> Self {
        HookResult::Relay(Relay::Result(HitResult::Fail))
    }

    /// Silent failure.
    #[must_use]
    pub const fn silent() -> Self {
        HookResult::Relay(Relay::Result(HitResult::Silent))
    }

    /// Non-failing no-op: stops dispatch without counting as failure.
    #[must_use]
    pub const fn not_fail() -> Self {
        HookResult::Relay(Relay::Result(HitResult::NotFail))
    }

    /// Explicit success.
    #[must_use]
    pub const fn success() -> Self {
        HookResult::Relay(Relay::SUCCESS)
    }

    /// Replace an integer relay.
    #[must_use]
    pub const fn int(value: i64) -> Self {
        HookResult::Relay(Relay::Int(value))
    }
}

/// Everything a handler can see about the event being dispatched.
pub struct EventContext<'a> {
    pub event: HookEvent,
    pub target: EventTarget,
    pub source: Option<CombatantId>,
    /// The effect causing the event (usually the move).
    pub effect: Option<EffectRef>,
    /// The move in flight, when one is.
    pub active_move: Option<&'a mut ActiveMove>,
    /// Current relay value.
    pub relay: Relay,
    /// Also run the causing effect's own handler first.
    pub on_effect: bool,
    /// The hook owner whose handler is running. Set by the dispatcher.
    pub subject: Option<EffectRef>,
    /// Combatant holding `subject`, when it is held by one.
    pub holder: Option<CombatantId>,
}

impl<'a> EventContext<'a> {
    /// A context with the default relay.
    pub fn new(event: HookEvent, target: impl Into<EventTarget>) -> Self {
        Self {
            event,
            target: target.into(),
            source: None,
            effect: None,
            active_move: None,
            relay: Relay::SUCCESS,
            on_effect: false,
            subject: None,
            holder: None,
        }
    }

    /// Set the source (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the causing effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: EffectRef) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Attach the move in flight; also sets it as the causing effect.
    #[must_use]
    pub fn with_move(mut self, active_move: &'a mut ActiveMove) -> Self {
        self.effect = Some(active_move.effect_ref());
        self.active_move = Some(active_move);
        self
    }

    /// Set the initial relay (builder pattern).
    #[must_use]
    pub fn with_relay(mut self, relay: impl Into<Relay>) -> Self {
        self.relay = relay.into();
        self
    }

    /// Run the causing effect's handler too (builder pattern).
    #[must_use]
    pub fn on_effect(mut self) -> Self {
        self.on_effect = true;
        self
    }

    /// The targeted combatant, if any.
    #[must_use]
    pub fn target_combatant(&self) -> Option<CombatantId> {
        self.target.combatant()
    }
}

impl std::fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("event", &self.event)
            .field("target", &self.target)
            .field("source", &self.source)
            .field("effect", &self.effect)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_truthiness() {
        assert!(Relay::SUCCESS.is_truthy());
        assert!(!Relay::Result(HitResult::Fail).is_truthy());
        assert!(!Relay::Int(0).is_truthy());
        assert!(Relay::Int(3).is_truthy());
        assert!(Relay::Accuracy(Accuracy::AlwaysHits).is_truthy());
        assert!(!Relay::Accuracy(Accuracy::Percent(0)).is_truthy());
    }

    #[test]
    fn test_relay_views() {
        assert_eq!(Relay::Int(0).as_result(), HitResult::Damage(0));
        assert_eq!(Relay::Id(Id::new("tackle")).as_result(), HitResult::Success);
        assert!(!Relay::Substitute.is_truthy());
        assert_eq!(Relay::Result(HitResult::Damage(12)).as_int(), Some(12));
        assert_eq!(Relay::SUCCESS.as_int(), None);
    }

    #[test]
    fn test_context_builder() {
        let cx = EventContext::new(HookEvent::TryHit, CombatantId::new(1))
            .with_source(CombatantId::new(0))
            .with_relay(HitResult::Damage(5));
        assert_eq!(cx.target_combatant(), Some(CombatantId::new(1)));
        assert_eq!(cx.source, Some(CombatantId::new(0)));
        assert_eq!(cx.relay, Relay::Result(HitResult::Damage(5)));
        assert!(!cx.on_effect);
    }
}
