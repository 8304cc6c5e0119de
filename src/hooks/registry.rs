//! Hook registry.
//!
//! Handlers are stored under an `(event, subject)` key, where the subject
//! is the move, ability, item or condition that owns the behavior. The
//! battle asks the registry for the handlers of the subjects relevant to an
//! event and runs them in priority order.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::core::EffectRef;

use super::{EventContext, HookEvent, HookResult};

/// A hook handler.
pub type HookFn = fn(&mut Battle, &mut EventContext<'_>) -> HookResult;

/// Unique identifier for a registered hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookId(pub u32);

impl HookId {
    /// Create a new hook ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for HookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hook({})", self.0)
    }
}

/// Whose events a hook listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HookScope {
    /// Events targeting the holder (or the holder's side or field).
    #[default]
    OnSelf,
    /// Events whose source is the holder.
    OnSource,
    /// Events targeting any combatant while the holder is active.
    OnAny,
    /// Only when the subject itself is the effect being processed.
    OnEffect,
}

/// A registered handler.
#[derive(Clone)]
pub struct Hook {
    /// Assigned by the registry.
    pub id: HookId,
    pub event: HookEvent,
    pub subject: EffectRef,
    pub scope: HookScope,
    /// Higher fires first. Ties fire in registration order.
    pub priority: i32,
    pub handler: HookFn,
}

impl Hook {
    /// Create a self-scoped hook with priority 0.
    pub fn new(event: HookEvent, subject: EffectRef, handler: HookFn) -> Self {
        Self {
            id: HookId::new(0),
            event,
            subject,
            scope: HookScope::default(),
            priority: 0,
            handler,
        }
    }

    /// A hook that runs only for its own effect, e.g. a move's `TryHit`.
    pub fn on_effect(event: HookEvent, subject: EffectRef, handler: HookFn) -> Self {
        Self::new(event, subject, handler).with_scope(HookScope::OnEffect)
    }

    /// Set the scope (builder pattern).
    #[must_use]
    pub fn with_scope(mut self, scope: HookScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set priority (builder pattern).
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("subject", &self.subject)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Registry for hooks, indexed by `(event, subject)`.
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    hooks: FxHashMap<HookId, Hook>,
    by_key: FxHashMap<(HookEvent, EffectRef), Vec<HookId>>,
    next_id: u32,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook, returns its ID.
    pub fn register(&mut self, mut hook: Hook) -> HookId {
        self.next_id += 1;
        let id = HookId::new(self.next_id);
        hook.id = id;

        self.by_key
            .entry((hook.event, hook.subject.clone()))
            .or_default()
            .push(id);
        self.hooks.insert(id, hook);
        id
    }

    /// Remove a hook.
    pub fn unregister(&mut self, id: HookId) -> Option<Hook> {
        let hook = self.hooks.remove(&id)?;
        if let Some(ids) = self.by_key.get_mut(&(hook.event, hook.subject.clone())) {
            ids.retain(|&h| h != id);
        }
        Some(hook)
    }

    /// Get a hook by ID.
    #[must_use]
    pub fn get(&self, id: HookId) -> Option<&Hook> {
        self.hooks.get(&id)
    }

    /// Hooks for one subject and scope, in registration order.
    pub fn find<'a>(
        &'a self,
        event: HookEvent,
        subject: &EffectRef,
        scope: HookScope,
    ) -> impl Iterator<Item = &'a Hook> + 'a {
        self.by_key
            .get(&(event, subject.clone()))
            .into_iter()
            .flatten()
            .filter_map(|id| self.hooks.get(id))
            .filter(move |hook| hook.scope == scope)
    }

    /// True if any hook of `scope` exists for the subject.
    #[must_use]
    pub fn has(&self, event: HookEvent, subject: &EffectRef, scope: HookScope) -> bool {
        self.find(event, subject, scope).next().is_some()
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Sort collected handlers: priority descending, then registration order.
pub(crate) fn sort_by_priority<T>(entries: &mut [(i32, HookId, T)]) {
    entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1 .0.cmp(&b.1 .0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::Continue
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = HookRegistry::new();
        let levitate = EffectRef::ability("levitate");

        let id = registry.register(Hook::new(HookEvent::Immunity, levitate.clone(), noop));
        registry.register(Hook::new(HookEvent::Immunity, levitate.clone(), noop).with_scope(HookScope::OnSource));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find(HookEvent::Immunity, &levitate, HookScope::OnSelf).count(), 1);
        assert!(registry.has(HookEvent::Immunity, &levitate, HookScope::OnSource));
        assert!(!registry.has(HookEvent::TryHit, &levitate, HookScope::OnSelf));
        assert_eq!(registry.get(id).map(|h| h.scope), Some(HookScope::OnSelf));
    }

    #[test]
    fn test_unregister() {
        let mut registry = HookRegistry::new();
        let subject = EffectRef::of_move("protect");
        let id = registry.register(Hook::on_effect(HookEvent::TryHit, subject.clone(), noop));

        assert!(registry.unregister(id).is_some());
        assert!(registry.unregister(id).is_none());
        assert!(!registry.has(HookEvent::TryHit, &subject, HookScope::OnEffect));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_priority_sort() {
        let mut entries = vec![
            (0, HookId::new(1), 'a'),
            (5, HookId::new(3), 'b'),
            (0, HookId::new(2), 'c'),
            (5, HookId::new(4), 'd'),
        ];
        sort_by_priority(&mut entries);
        let order: Vec<char> = entries.iter().map(|e| e.2).collect();
        assert_eq!(order, vec!['b', 'd', 'a', 'c']);
    }
}
