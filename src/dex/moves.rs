//! Move records.
//!
//! A [`MoveData`] is static: it describes what a move does, never what it
//! did. The per-use copy with scratch fields is
//! [`ActiveMove`](crate::actions::ActiveMove).
//!
//! ## Sub-effects
//!
//! Non-damage consequences are described by [`HitEffect`]. The same shape
//! is used for the primary hit, for the `self_effect` applied to the user,
//! and inside each [`SecondaryEffect`], so a single applier handles all
//! three.

use serde::{Deserialize, Serialize};

use crate::core::{BoostTable, Id};

/// Damage category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Physical,
    Special,
    Status,
}

/// Base accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    /// Skips the accuracy check.
    AlwaysHits,
    Percent(u32),
}

impl Accuracy {
    /// Percent value, if not always-hit.
    #[must_use]
    pub const fn percent(self) -> Option<u32> {
        match self {
            Accuracy::AlwaysHits => None,
            Accuracy::Percent(p) => Some(p),
        }
    }
}

/// Which combatants (or which part of the field) a move aims at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    /// One adjacent combatant.
    Normal,
    /// Any one other combatant.
    Any,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    AdjacentFoe,
    /// Every adjacent combatant, allies included.
    AllAdjacent,
    AllAdjacentFoes,
    /// The user and its allies.
    Allies,
    AllySide,
    AllyTeam,
    /// The whole field.
    All,
    FoeSide,
    RandomNormal,
    /// Target picked by the move's own logic (counter-style).
    Scripted,
    /// The user.
    User,
}

impl MoveTarget {
    /// Target specs a player picks a slot for.
    pub const CHOOSABLE: [MoveTarget; 5] = [
        MoveTarget::Normal,
        MoveTarget::Any,
        MoveTarget::AdjacentAlly,
        MoveTarget::AdjacentAllyOrSelf,
        MoveTarget::AdjacentFoe,
    ];

    /// True if a player picks the target slot.
    #[must_use]
    pub fn is_choosable(self) -> bool {
        Self::CHOOSABLE.contains(&self)
    }

    /// True for specs that hit the field or a side rather than combatants.
    #[must_use]
    pub const fn is_field_wide(self) -> bool {
        matches!(
            self,
            MoveTarget::All | MoveTarget::FoeSide | MoveTarget::AllySide | MoveTarget::AllyTeam
        )
    }

    /// True for specs that always resolve to the user.
    #[must_use]
    pub const fn targets_user(self) -> bool {
        matches!(self, MoveTarget::User | MoveTarget::Allies)
    }
}

/// Flags consulted by the pipeline and by hooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFlags {
    pub contact: bool,
    /// Blocked by protection.
    pub protect: bool,
    pub sound: bool,
    pub powder: bool,
    /// Mirrored by dance-mirroring abilities.
    pub dance: bool,
    /// Bypasses substitutes.
    pub bypass_sub: bool,
    pub punch: bool,
}

/// How many times a move hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiHit {
    Fixed(u8),
    /// Inclusive range. `Range(2, 5)` uses the ruleset's weighted table.
    Range(u8, u8),
}

/// When a self-destructing move faints its user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfDestruct {
    /// Regardless of whether it hits.
    Always,
    /// Once it connects with a target.
    IfHit,
}

/// One-hit-KO kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ohko {
    Standard,
    /// Fails against this type and penalizes users lacking it.
    Typed(Id),
}

/// Switch-out behavior of a pivoting move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfSwitch {
    Switch,
    /// Passes boosts and volatiles to the replacement.
    CopyVolatile,
    ShedTail,
}

/// Fixed damage handed to the damage calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedDamage {
    /// Equal to the user's level.
    Level,
    Amount(u32),
}

/// Non-damage consequences of one hit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEffect {
    pub boosts: Option<BoostTable>,
    /// Fraction of the target's base max HP: `(numerator, denominator)`.
    pub heal: Option<(u32, u32)>,
    /// Status attempt that respects immunities and existing status.
    pub status: Option<Id>,
    /// Status applied without the usual checks.
    pub force_status: Option<Id>,
    pub volatile_status: Option<Id>,
    pub side_condition: Option<Id>,
    pub slot_condition: Option<Id>,
    pub weather: Option<Id>,
    pub terrain: Option<Id>,
    pub pseudo_weather: Option<Id>,
    pub force_switch: bool,
    pub self_switch: Option<SelfSwitch>,
}

impl HitEffect {
    /// An effect that does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_boosts(mut self, boosts: BoostTable) -> Self {
        self.boosts = Some(boosts);
        self
    }

    #[must_use]
    pub fn with_heal(mut self, numerator: u32, denominator: u32) -> Self {
        self.heal = Some((numerator, denominator));
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(Id::new(status));
        self
    }

    #[must_use]
    pub fn with_force_status(mut self, status: &str) -> Self {
        self.force_status = Some(Id::new(status));
        self
    }

    #[must_use]
    pub fn with_volatile(mut self, volatile: &str) -> Self {
        self.volatile_status = Some(Id::new(volatile));
        self
    }

    #[must_use]
    pub fn with_side_condition(mut self, condition: &str) -> Self {
        self.side_condition = Some(Id::new(condition));
        self
    }

    #[must_use]
    pub fn with_slot_condition(mut self, condition: &str) -> Self {
        self.slot_condition = Some(Id::new(condition));
        self
    }

    #[must_use]
    pub fn with_weather(mut self, weather: &str) -> Self {
        self.weather = Some(Id::new(weather));
        self
    }

    #[must_use]
    pub fn with_terrain(mut self, terrain: &str) -> Self {
        self.terrain = Some(Id::new(terrain));
        self
    }

    #[must_use]
    pub fn with_pseudo_weather(mut self, condition: &str) -> Self {
        self.pseudo_weather = Some(Id::new(condition));
        self
    }
}

/// A chance-rolled extra consequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    /// Percent chance. `None` always applies.
    pub chance: Option<u32>,
    pub effect: HitEffect,
    /// Applied to the user when the secondary lands.
    pub self_effect: Option<HitEffect>,
}

impl SecondaryEffect {
    /// A secondary with the given chance.
    pub fn new(chance: Option<u32>, effect: HitEffect) -> Self {
        Self { chance, effect, self_effect: None }
    }

    #[must_use]
    pub fn with_self_effect(mut self, effect: HitEffect) -> Self {
        self.self_effect = Some(effect);
        self
    }
}

/// Signature side effect of a status Z-move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZEffect {
    Heal,
    /// Heals the next combatant to enter the user's slot.
    HealReplacement,
    ClearNegativeBoost,
    /// Draws attacks to the user.
    Redirect,
    /// Raises the critical-hit stage.
    Crit2,
    /// Heal if Ghost type, else +1 attack.
    Curse,
}

/// Z-move parameters on a base move.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZMoveData {
    pub base_power: Option<u32>,
    pub boost: Option<BoostTable>,
    pub effect: Option<ZEffect>,
}

/// Max-move parameters on a base move.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxMoveData {
    pub base_power: Option<u32>,
}

/// Static description of a move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: Id,
    pub name: String,
    pub category: Category,
    pub move_type: Id,
    pub target: MoveTarget,
    pub base_power: u32,
    pub accuracy: Accuracy,
    pub priority: i8,
    pub pp: u8,
    pub flags: MoveFlags,

    /// Primary non-damage consequences.
    pub hit: HitEffect,
    /// Applied to the user after a hit.
    pub self_effect: Option<HitEffect>,
    pub secondaries: Vec<SecondaryEffect>,
    /// Boosts for the user if the move succeeds.
    pub self_boost: Option<BoostTable>,

    pub multi_hit: Option<MultiHit>,
    /// Re-roll accuracy for every hit after the first.
    pub multi_accuracy: bool,
    /// One target per hit index in doubles.
    pub smart_target: bool,

    /// Recoil as a fraction of total damage dealt.
    pub recoil: Option<(u32, u32)>,
    /// The no-PP fallback move's fixed recoil.
    pub struggle_recoil: bool,
    /// Half max HP to the user on the first connecting hit.
    pub mind_blown_recoil: bool,

    pub self_destruct: Option<SelfDestruct>,
    pub ohko: Option<Ohko>,
    pub fixed_damage: Option<FixedDamage>,
    /// Leaves the target at 1 HP at worst.
    pub no_faint: bool,
    pub sleep_usable: bool,
    pub breaks_protect: bool,
    pub steals_boosts: bool,
    /// `Some(true)` ignores type immunity; `None` takes the category default.
    pub ignore_immunity: Option<bool>,
    pub ignore_accuracy: bool,
    pub ignore_evasion: bool,

    pub z_move: Option<ZMoveData>,
    pub max_move: Option<MaxMoveData>,
    /// Crystal that empowers this move, for signature Z-moves.
    pub is_z: Option<Id>,
    pub is_max: bool,
}

impl MoveData {
    /// Create a move with neutral defaults: single target, 100 accuracy,
    /// protectable.
    pub fn new(name: &str, category: Category, move_type: &str, base_power: u32) -> Self {
        Self {
            id: Id::new(name),
            name: name.to_string(),
            category,
            move_type: Id::new(move_type),
            target: MoveTarget::Normal,
            base_power,
            accuracy: Accuracy::Percent(100),
            priority: 0,
            pp: 10,
            flags: MoveFlags { protect: true, ..MoveFlags::default() },
            hit: HitEffect::default(),
            self_effect: None,
            secondaries: Vec::new(),
            self_boost: None,
            multi_hit: None,
            multi_accuracy: false,
            smart_target: false,
            recoil: None,
            struggle_recoil: false,
            mind_blown_recoil: false,
            self_destruct: None,
            ohko: None,
            fixed_damage: None,
            no_faint: false,
            sleep_usable: false,
            breaks_protect: false,
            steals_boosts: false,
            ignore_immunity: None,
            ignore_accuracy: false,
            ignore_evasion: false,
            z_move: None,
            max_move: None,
            is_z: None,
            is_max: false,
        }
    }

    /// A physical move.
    pub fn physical(name: &str, move_type: &str, base_power: u32) -> Self {
        Self::new(name, Category::Physical, move_type, base_power)
    }

    /// A special move.
    pub fn special(name: &str, move_type: &str, base_power: u32) -> Self {
        Self::new(name, Category::Special, move_type, base_power)
    }

    /// A status move.
    pub fn status(name: &str, move_type: &str) -> Self {
        Self::new(name, Category::Status, move_type, 0)
    }

    #[must_use]
    pub fn with_target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_pp(mut self, pp: u8) -> Self {
        self.pp = pp;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_hit(mut self, hit: HitEffect) -> Self {
        self.hit = hit;
        self
    }

    #[must_use]
    pub fn with_self_effect(mut self, effect: HitEffect) -> Self {
        self.self_effect = Some(effect);
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: SecondaryEffect) -> Self {
        self.secondaries.push(secondary);
        self
    }

    #[must_use]
    pub fn with_self_boost(mut self, boosts: BoostTable) -> Self {
        self.self_boost = Some(boosts);
        self
    }

    #[must_use]
    pub fn with_multi_hit(mut self, multi_hit: MultiHit) -> Self {
        self.multi_hit = Some(multi_hit);
        self
    }

    #[must_use]
    pub fn with_recoil(mut self, numerator: u32, denominator: u32) -> Self {
        self.recoil = Some((numerator, denominator));
        self
    }

    #[must_use]
    pub fn with_self_destruct(mut self, kind: SelfDestruct) -> Self {
        self.self_destruct = Some(kind);
        self
    }

    #[must_use]
    pub fn with_ohko(mut self, ohko: Ohko) -> Self {
        self.ohko = Some(ohko);
        self
    }

    #[must_use]
    pub fn with_fixed_damage(mut self, damage: FixedDamage) -> Self {
        self.fixed_damage = Some(damage);
        self
    }

    #[must_use]
    pub fn with_z_move(mut self, z_move: ZMoveData) -> Self {
        self.z_move = Some(z_move);
        self
    }

    #[must_use]
    pub fn with_max_move(mut self, max_move: MaxMoveData) -> Self {
        self.max_move = Some(max_move);
        self
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        self.category == Category::Status
    }
}
