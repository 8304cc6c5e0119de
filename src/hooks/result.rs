//! The four-valued result carried through every gate, stage and sub-effect.
//!
//! ## Variants
//!
//! | Variant | Meaning |
//! |---|---|
//! | `NotAttempted` | Nothing was tried. Aggregates to success. |
//! | `NotFail` | A deliberate no-op that must not count as failure. |
//! | `Silent` | Failed; a message (if any) was already logged. |
//! | `Fail` | Failed; the caller announces it. |
//! | `Success` | Proceed. |
//! | `Damage(n)` | Proceed having dealt `n` damage. `Damage(0)` still counts as a hit. |
//!
//! Zero damage and "no damage" are distinct: the first is `Damage(0)`,
//! the second is `NotAttempted`.

use serde::{Deserialize, Serialize};

/// Outcome of a gate, stage or sub-effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    #[default]
    NotAttempted,
    NotFail,
    Silent,
    Fail,
    Success,
    Damage(u32),
}

impl HitResult {
    /// Proceed / fail from a boolean.
    #[must_use]
    pub const fn from_bool(ok: bool) -> Self {
        if ok {
            HitResult::Success
        } else {
            HitResult::Fail
        }
    }

    /// True for `Success` and non-zero damage.
    #[must_use]
    pub const fn is_truthy(self) -> bool {
        matches!(self, HitResult::Success) || matches!(self, HitResult::Damage(n) if n > 0)
    }

    /// True if a pipeline stage keeps the target: truthy or zero damage.
    #[must_use]
    pub const fn keeps_target(self) -> bool {
        matches!(self, HitResult::Success | HitResult::Damage(_))
    }

    /// True for an announced failure.
    #[must_use]
    pub const fn is_fail(self) -> bool {
        matches!(self, HitResult::Fail)
    }

    /// Damage dealt, if this is a damage value.
    #[must_use]
    pub const fn damage(self) -> Option<u32> {
        match self {
            HitResult::Damage(n) => Some(n),
            _ => None,
        }
    }

    /// Damage dealt, counting every non-damage value as 0.
    #[must_use]
    pub const fn damage_or_zero(self) -> u32 {
        match self {
            HitResult::Damage(n) => n,
            _ => 0,
        }
    }

    const fn rank(self) -> u8 {
        match self {
            HitResult::NotAttempted => 0,
            HitResult::NotFail => 1,
            HitResult::Silent => 2,
            HitResult::Fail | HitResult::Success => 3,
            HitResult::Damage(_) => 4,
        }
    }

    /// Aggregate two sub-effect outcomes into one.
    ///
    /// A higher-ranked `self` wins outright. A truthy `self` survives a
    /// falsy non-damage `other`. Two damages add. Otherwise `other` wins,
    /// which lets a later explicit success override an earlier failure.
    ///
    /// ```
    /// use battle_actions::hooks::HitResult;
    ///
    /// assert_eq!(HitResult::Fail.combine(HitResult::NotAttempted), HitResult::Fail);
    /// assert_eq!(HitResult::Fail.combine(HitResult::Success), HitResult::Success);
    /// assert_eq!(HitResult::Success.combine(HitResult::Fail), HitResult::Success);
    /// assert_eq!(HitResult::Damage(3).combine(HitResult::Damage(4)), HitResult::Damage(7));
    /// ```
    #[must_use]
    pub const fn combine(self, other: HitResult) -> HitResult {
        if self.rank() > other.rank() {
            return self;
        }
        if self.is_truthy() && !other.is_truthy() && !matches!(other, HitResult::Damage(0)) {
            return self;
        }
        if let (HitResult::Damage(a), HitResult::Damage(b)) = (self, other) {
            return HitResult::Damage(a + b);
        }
        other
    }

    /// Fold a sequence with [`combine`](Self::combine), starting from `NotAttempted`.
    pub fn combine_all(results: impl IntoIterator<Item = HitResult>) -> HitResult {
        results.into_iter().fold(HitResult::NotAttempted, HitResult::combine)
    }
}

impl From<bool> for HitResult {
    fn from(ok: bool) -> Self {
        HitResult::from_bool(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(HitResult::Success.is_truthy());
        assert!(HitResult::Damage(1).is_truthy());
        assert!(!HitResult::Damage(0).is_truthy());
        assert!(!HitResult::NotFail.is_truthy());
        assert!(!HitResult::Silent.is_truthy());
        assert!(HitResult::Damage(0).keeps_target());
        assert!(!HitResult::NotFail.keeps_target());
    }

    #[test]
    fn test_failure_poisons_until_success() {
        let folded = HitResult::combine_all([
            HitResult::NotAttempted,
            HitResult::Fail,
            HitResult::NotAttempted,
        ]);
        assert_eq!(folded, HitResult::Fail);

        let folded = HitResult::combine_all([HitResult::Fail, HitResult::Success]);
        assert_eq!(folded, HitResult::Success);
    }

    #[test]
    fn test_silent_propagates() {
        assert_eq!(HitResult::Silent.combine(HitResult::NotAttempted), HitResult::Silent);
        assert_eq!(HitResult::NotFail.combine(HitResult::Silent), HitResult::Silent);
        assert_eq!(HitResult::Silent.combine(HitResult::Success), HitResult::Success);
    }

    #[test]
    fn test_damage_outranks_booleans() {
        assert_eq!(HitResult::Damage(0).combine(HitResult::Fail), HitResult::Damage(0));
        assert_eq!(HitResult::Success.combine(HitResult::Damage(0)), HitResult::Damage(0));
        assert_eq!(HitResult::Damage(5).combine(HitResult::Damage(0)), HitResult::Damage(5));
    }

    #[test]
    fn test_empty_fold_is_not_attempted() {
        assert_eq!(HitResult::combine_all([]), HitResult::NotAttempted);
    }
}
