//! Ruleset configuration.
//!
//! Mechanics that changed between ruleset generations are plain data on
//! [`Ruleset`] rather than version checks scattered through the pipeline.
//! [`Ruleset::gen`] returns the preset for a generation; every switch can be
//! overridden with a `with_*` builder, so a custom format can mix behaviors.
//!
//! ```
//! use battle_actions::core::{HitStep, Ruleset, SelfDestructTiming};
//!
//! let modern = Ruleset::gen(9);
//! assert_eq!(modern.hit_steps, HitStep::CANONICAL.to_vec());
//!
//! let legacy = Ruleset::gen(4);
//! assert_eq!(legacy.self_destruct_timing, SelfDestructTiming::AfterHit);
//! assert_eq!(legacy.hit_steps[4], HitStep::TryHit);
//! ```

use serde::{Deserialize, Serialize};

/// One stage of the multi-target hit pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitStep {
    /// Semi-invulnerable targets (fly, dig, ...) dodge.
    Invulnerability,
    /// TryHit gate: protection, redirection, absorb abilities.
    TryHit,
    /// Type-chart immunity, powder and prankster immunities.
    TypeImmunity,
    /// Move-specific immunity and one-hit-KO level checks.
    TryImmunity,
    Accuracy,
    BreakProtect,
    StealBoosts,
    /// The hit loop; always last.
    MoveHitLoop,
}

impl HitStep {
    /// Current stage order.
    pub const CANONICAL: [HitStep; 8] = [
        HitStep::Invulnerability,
        HitStep::TryHit,
        HitStep::TypeImmunity,
        HitStep::TryImmunity,
        HitStep::Accuracy,
        HitStep::BreakProtect,
        HitStep::StealBoosts,
        HitStep::MoveHitLoop,
    ];

    /// Stage order used by a ruleset generation.
    ///
    /// Generations 5 and 6 check type immunity before TryHit; generation 4
    /// additionally defers TryHit until after accuracy.
    #[must_use]
    pub fn order_for(generation: u8) -> Vec<HitStep> {
        let mut steps = Self::CANONICAL.to_vec();
        if generation <= 6 {
            steps.swap(1, 2);
        }
        if generation == 4 {
            steps.swap(2, 4);
        }
        steps
    }
}

/// When an unconditional self-destruct faints its user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfDestructTiming {
    /// Before the hit pipeline runs.
    BeforeHit,
    /// Only once the hit has fully resolved.
    AfterHit,
}

/// How fractional HP amounts become whole numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    Floor,
    /// Round half away from zero.
    Round,
}

impl Rounding {
    /// Apply to a non-negative value.
    #[must_use]
    pub fn apply(self, value: f64) -> u32 {
        match self {
            Rounding::Floor => value.floor() as u32,
            Rounding::Round => value.round() as u32,
        }
    }
}

/// Recoil rule for the no-PP fallback move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StruggleRecoil {
    /// `floor(maxhp / 4)`.
    QuarterMaxHpFloor,
    /// `max(round(base_maxhp / 4), 1)`.
    QuarterBaseMaxHpRounded,
}

/// Mechanics switches for one ruleset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Generation this ruleset was derived from.
    pub generation: u8,

    /// Ordered hit pipeline stages.
    pub hit_steps: Vec<HitStep>,

    pub self_destruct_timing: SelfDestructTiming,

    /// Rounding for fractional heals.
    pub heal_rounding: Rounding,

    pub struggle_recoil: StruggleRecoil,

    /// Sample table for the "2 to 5 hits" case.
    pub multi_hit_table: Vec<u8>,

    /// Log `-fail` (true) or `-notarget` (false) when no target exists.
    pub no_target_fails: bool,

    /// Break guard side conditions on the user's own side too.
    pub break_protect_own_side: bool,

    /// Breaking protection also resets the protect chain.
    pub break_protect_clears_stall: bool,

    /// Non-Ice users of the Ice one-hit-KO start at 20 accuracy.
    pub ice_ohko_penalty: bool,

    /// Grass types (and other powder-immune targets) ignore powder moves.
    pub powder_immunity: bool,

    /// Dark types ignore prankster-boosted moves from foes.
    pub prankster_immunity: bool,

    /// Z-moves are available.
    pub z_moves: bool,

    /// Max moves are available.
    pub max_moves: bool,
}

impl Ruleset {
    /// Preset for a ruleset generation (1-9).
    #[must_use]
    pub fn gen(generation: u8) -> Self {
        assert!(generation >= 1, "Generation must be at least 1");
        assert!(generation <= 9, "Generations above 9 are not supported");

        let modern = generation >= 5;
        Self {
            generation,
            hit_steps: HitStep::order_for(generation),
            self_destruct_timing: if generation == 4 {
                SelfDestructTiming::AfterHit
            } else {
                SelfDestructTiming::BeforeHit
            },
            heal_rounding: if modern { Rounding::Round } else { Rounding::Floor },
            struggle_recoil: if modern {
                StruggleRecoil::QuarterBaseMaxHpRounded
            } else {
                StruggleRecoil::QuarterMaxHpFloor
            },
            multi_hit_table: if modern {
                vec![2, 2, 3, 3, 4, 5]
            } else {
                vec![2, 2, 2, 3, 3, 3, 4, 5]
            },
            no_target_fails: modern,
            break_protect_own_side: generation >= 6,
            break_protect_clears_stall: generation >= 6,
            ice_ohko_penalty: generation >= 7,
            powder_immunity: generation >= 6,
            prankster_immunity: generation >= 7,
            z_moves: generation == 7,
            max_moves: generation == 8,
        }
    }

    /// Override the hit stage order (builder pattern).
    ///
    /// Panics unless `steps` is a permutation of every stage ending with
    /// the hit loop.
    #[must_use]
    pub fn with_hit_steps(mut self, steps: Vec<HitStep>) -> Self {
        assert_eq!(steps.len(), HitStep::CANONICAL.len(), "Hit steps must list every stage once");
        for step in HitStep::CANONICAL {
            assert!(steps.contains(&step), "Hit steps missing {:?}", step);
        }
        assert_eq!(steps.last(), Some(&HitStep::MoveHitLoop), "Hit loop must be the last stage");
        self.hit_steps = steps;
        self
    }

    /// Override self-destruct timing (builder pattern).
    #[must_use]
    pub fn with_self_destruct_timing(mut self, timing: SelfDestructTiming) -> Self {
        self.self_destruct_timing = timing;
        self
    }

    /// Override heal rounding (builder pattern).
    #[must_use]
    pub fn with_heal_rounding(mut self, rounding: Rounding) -> Self {
        self.heal_rounding = rounding;
        self
    }

    /// Override fallback-move recoil (builder pattern).
    #[must_use]
    pub fn with_struggle_recoil(mut self, recoil: StruggleRecoil) -> Self {
        self.struggle_recoil = recoil;
        self
    }

    /// Override the "2 to 5 hits" sample table (builder pattern).
    #[must_use]
    pub fn with_multi_hit_table(mut self, table: Vec<u8>) -> Self {
        assert!(!table.is_empty(), "Multi-hit table must not be empty");
        assert!(table.iter().all(|&n| n > 0), "Multi-hit table entries must be positive");
        self.multi_hit_table = table;
        self
    }

    /// Enable or disable Z-moves (builder pattern).
    #[must_use]
    pub fn with_z_moves(mut self, enabled: bool) -> Self {
        self.z_moves = enabled;
        self
    }

    /// Enable or disable Max moves (builder pattern).
    #[must_use]
    pub fn with_max_moves(mut self, enabled: bool) -> Self {
        self.max_moves = enabled;
        self
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::gen(9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_gen5() {
        let steps = HitStep::order_for(5);
        assert_eq!(steps[1], HitStep::TypeImmunity);
        assert_eq!(steps[2], HitStep::TryHit);
        assert_eq!(steps[4], HitStep::Accuracy);
    }

    #[test]
    fn test_step_order_gen4() {
        assert_eq!(
            HitStep::order_for(4),
            vec![
                HitStep::Invulnerability,
                HitStep::TypeImmunity,
                HitStep::Accuracy,
                HitStep::TryImmunity,
                HitStep::TryHit,
                HitStep::BreakProtect,
                HitStep::StealBoosts,
                HitStep::MoveHitLoop,
            ]
        );
    }

    #[test]
    fn test_step_order_modern() {
        assert_eq!(HitStep::order_for(7), HitStep::CANONICAL.to_vec());
        assert_eq!(HitStep::order_for(9), HitStep::CANONICAL.to_vec());
    }

    #[test]
    fn test_presets() {
        let gen3 = Ruleset::gen(3);
        assert_eq!(gen3.heal_rounding, Rounding::Floor);
        assert_eq!(gen3.multi_hit_table, vec![2, 2, 2, 3, 3, 3, 4, 5]);
        assert!(!gen3.no_target_fails);

        let gen7 = Ruleset::gen(7);
        assert!(gen7.z_moves);
        assert!(gen7.ice_ohko_penalty);
        assert_eq!(gen7.self_destruct_timing, SelfDestructTiming::BeforeHit);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(Rounding::Floor.apply(12.5), 12);
        assert_eq!(Rounding::Round.apply(12.5), 13);
        assert_eq!(Rounding::Round.apply(12.4), 12);
    }

    #[test]
    fn test_ruleset_serde() {
        let ruleset = Ruleset::gen(4).with_heal_rounding(Rounding::Round);
        let json = serde_json::to_string(&ruleset).unwrap();
        let restored: Ruleset = serde_json::from_str(&json).unwrap();
        assert_eq!(ruleset, restored);
    }

    #[test]
    #[should_panic(expected = "Hit loop must be the last stage")]
    fn test_hit_loop_must_be_last() {
        let mut steps = HitStep::CANONICAL.to_vec();
        steps.swap(6, 7);
        let _ = Ruleset::gen(9).with_hit_steps(steps);
    }

    #[test]
    #[should_panic(expected = "Generation must be at least 1")]
    fn test_generation_zero() {
        let _ = Ruleset::gen(0);
    }
}
