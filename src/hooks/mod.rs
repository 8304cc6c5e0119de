//! Event hook protocol: the extension points moves, abilities and items
//! plug into.
//!
//! ## Key Components
//!
//! - [`HitResult`]: the four-valued outcome used by every gate
//! - [`HookEvent`]: the fixed vocabulary of extension points
//! - [`EventContext`] / [`Relay`] / [`HookResult`]: what a handler sees and answers
//! - [`HookRegistry`]: handlers keyed by `(event, subject)`
//!
//! Dispatch itself (`run_event`, `single_event`) lives on
//! [`Battle`](crate::battle::Battle), which knows which subjects each
//! combatant, side and the field currently hold.
//!
//! ## Example Usage
//!
//! ```
//! use battle_actions::battle::Battle;
//! use battle_actions::core::EffectRef;
//! use battle_actions::hooks::{EventContext, Hook, HookEvent, HookRegistry, HookResult, HookScope};
//!
//! // "Levitate": immune to Ground moves.
//! fn levitate(_battle: &mut Battle, cx: &mut EventContext<'_>) -> HookResult {
//!     let ground = cx.active_move.as_ref().is_some_and(|m| m.move_type == "ground");
//!     if ground { HookResult::fail() } else { HookResult::Continue }
//! }
//!
//! let mut registry = HookRegistry::new();
//! registry.register(Hook::new(HookEvent::Immunity, EffectRef::ability("levitate"), levitate));
//! assert!(registry.has(HookEvent::Immunity, &EffectRef::ability("levitate"), HookScope::OnSelf));
//! ```

mod result;
mod event;
mod registry;

pub use result::HitResult;
pub use event::{EventContext, EventTarget, HookEvent, HookResult, Relay};
pub use registry::{Hook, HookFn, HookId, HookRegistry, HookScope};
pub(crate) use registry::sort_by_priority;
