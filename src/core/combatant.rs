//! Combatants: stats, boosts, HP, conditions and move slots.
//!
//! ## CombatantId
//!
//! Index into the battle's combatant arena. Stable for the whole battle,
//! whether the combatant is active, benched or fainted.
//!
//! ## BoostTable
//!
//! Stat stages, each clamped to [-6, +6] when applied through
//! [`Combatant::boost_by`].

use im::OrdMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{ConditionState, Id, SideId};
use crate::hooks::HitResult;

/// Volatiles that hide a combatant from most moves.
pub const SEMI_INVULNERABLE: [&str; 7] = ["bounce", "dig", "dive", "fly", "phantomforce", "shadowforce", "skydrop"];

/// Combatant identifier (index into the battle's arena).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u16);

impl CombatantId {
    /// Create a new combatant ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combatant({})", self.0)
    }
}

/// A non-HP stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatId {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
}

/// Stored (pre-boost) stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatTable {
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

impl StatTable {
    /// Create a stat table with every stat set to `value`.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self { atk: value, def: value, spa: value, spd: value, spe: value }
    }

    /// Read one stat.
    #[must_use]
    pub const fn get(&self, stat: StatId) -> u32 {
        match stat {
            StatId::Atk => self.atk,
            StatId::Def => self.def,
            StatId::Spa => self.spa,
            StatId::Spd => self.spd,
            StatId::Spe => self.spe,
        }
    }

    /// Set the speed stat (builder pattern).
    #[must_use]
    pub const fn with_spe(mut self, spe: u32) -> Self {
        self.spe = spe;
        self
    }
}

/// A boostable stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoostId {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl BoostId {
    /// Every boostable stat, in log order.
    pub const ALL: [BoostId; 7] = [
        BoostId::Atk,
        BoostId::Def,
        BoostId::Spa,
        BoostId::Spd,
        BoostId::Spe,
        BoostId::Accuracy,
        BoostId::Evasion,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Protocol name of the stat.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BoostId::Atk => "atk",
            BoostId::Def => "def",
            BoostId::Spa => "spa",
            BoostId::Spd => "spd",
            BoostId::Spe => "spe",
            BoostId::Accuracy => "accuracy",
            BoostId::Evasion => "evasion",
        }
    }

    /// The stored stat this boost modifies, if any.
    #[must_use]
    pub const fn stat(self) -> Option<StatId> {
        match self {
            BoostId::Atk => Some(StatId::Atk),
            BoostId::Def => Some(StatId::Def),
            BoostId::Spa => Some(StatId::Spa),
            BoostId::Spd => Some(StatId::Spd),
            BoostId::Spe => Some(StatId::Spe),
            _ => None,
        }
    }
}

/// Stage deltas or current stages for every boostable stat.
///
/// ```
/// use battle_actions::core::{BoostId, BoostTable};
///
/// let boosts = BoostTable::new().with(BoostId::Atk, 2).with(BoostId::Spe, -1);
/// assert_eq!(boosts.get(BoostId::Atk), 2);
/// assert_eq!(boosts.iter().count(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoostTable([i8; 7]);

impl BoostTable {
    /// An empty table (all zero).
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 7])
    }

    /// Set one entry (builder pattern).
    #[must_use]
    pub const fn with(mut self, boost: BoostId, value: i8) -> Self {
        self.0[boost.index()] = value;
        self
    }

    /// Set every stored stat entry (atk through spe) to `value`.
    #[must_use]
    pub const fn all_stats(value: i8) -> Self {
        Self([value, value, value, value, value, 0, 0])
    }

    /// Read one entry.
    #[must_use]
    pub const fn get(&self, boost: BoostId) -> i8 {
        self.0[boost.index()]
    }

    /// Write one entry.
    pub fn set(&mut self, boost: BoostId, value: i8) {
        self.0[boost.index()] = value;
    }

    /// True if every entry is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// Iterate over non-zero entries in log order.
    pub fn iter(&self) -> impl Iterator<Item = (BoostId, i8)> + '_ {
        BoostId::ALL
            .iter()
            .map(move |&b| (b, self.get(b)))
            .filter(|&(_, v)| v != 0)
    }
}

/// One move slot with its PP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub id: Id,
    pub pp: u8,
    pub max_pp: u8,
    /// Set once the slot has been used this battle.
    pub used: bool,
    pub disabled: bool,
}

impl MoveSlot {
    /// Create a full slot.
    pub fn new(id: impl Into<Id>, max_pp: u8) -> Self {
        Self { id: id.into(), pp: max_pp, max_pp, used: false, disabled: false }
    }
}

/// How a combatant's move this turn resolved.
///
/// Kept apart from the boolean "did anything happen" return of the
/// pipeline so that re-entrant dispatch cannot overwrite an outcome the
/// outer call already decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnResult {
    /// Nothing recorded yet.
    #[default]
    Undecided,
    Succeeded,
    /// The move was attempted and failed.
    Failed,
    /// The combatant never got to choose (flinch, full paralysis, ...).
    NoChoice,
}

/// A record of being hit, for counter-style effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub source: CombatantId,
    pub move_id: Id,
    pub damage: HitResult,
    pub this_turn: bool,
}

/// A combatant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Combatant {
    /// Arena index, assigned when added to a battle.
    pub id: CombatantId,
    pub name: String,
    pub species: Id,
    pub side: SideId,

    /// Active slot index; meaningful only while `active`.
    pub position: usize,
    pub active: bool,

    pub level: u8,
    pub types: SmallVec<[Id; 2]>,

    /// Stored stats before boosts and modifiers.
    pub stored_stats: StatTable,
    pub boosts: BoostTable,

    pub hp: u32,
    pub maxhp: u32,
    /// Max HP before any temporary scaling.
    pub base_maxhp: u32,

    pub status: Option<Id>,
    pub volatiles: OrdMap<Id, ConditionState>,

    pub ability: Id,
    /// Order in which the current ability was acquired (tie-break key).
    pub ability_order: u32,
    pub item: Option<Id>,

    pub move_slots: Vec<MoveSlot>,

    pub fainted: bool,
    pub faint_queued: bool,

    pub last_move: Option<Id>,
    pub move_this_turn: Option<Id>,
    pub move_this_turn_result: TurnResult,
    pub last_damage: u32,
    pub hurt_this_turn: Option<u32>,
    pub attacked_by: Vec<AttackRecord>,

    /// Set by a self-switching move.
    pub switch_flag: Option<Id>,
    /// Set when dragged out.
    pub force_switch_flag: bool,
}

impl Combatant {
    /// Create a combatant at full HP with no moves.
    pub fn new(name: impl Into<String>, level: u8, maxhp: u32, stats: StatTable) -> Self {
        let name = name.into();
        Self {
            id: CombatantId::default(),
            species: Id::new(&name),
            name,
            side: SideId::default(),
            position: 0,
            active: false,
            level,
            types: SmallVec::new(),
            stored_stats: stats,
            boosts: BoostTable::new(),
            hp: maxhp,
            maxhp,
            base_maxhp: maxhp,
            status: None,
            volatiles: OrdMap::new(),
            ability: Id::default(),
            ability_order: 0,
            item: None,
            move_slots: Vec::new(),
            fainted: false,
            faint_queued: false,
            last_move: None,
            move_this_turn: None,
            move_this_turn_result: TurnResult::Undecided,
            last_damage: 0,
            hurt_this_turn: None,
            attacked_by: Vec::new(),
            switch_flag: None,
            force_switch_flag: false,
        }
    }

    /// Set the species (builder pattern).
    #[must_use]
    pub fn with_species(mut self, species: &str) -> Self {
        self.species = Id::new(species);
        self
    }

    /// Add a type (builder pattern).
    #[must_use]
    pub fn with_type(mut self, type_name: &str) -> Self {
        self.types.push(Id::new(type_name));
        self
    }

    /// Set the ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: &str) -> Self {
        self.ability = Id::new(ability);
        self
    }

    /// Set the held item (builder pattern).
    #[must_use]
    pub fn with_item(mut self, item: &str) -> Self {
        self.item = Some(Id::new(item));
        self
    }

    /// Add a move slot (builder pattern).
    #[must_use]
    pub fn with_move(mut self, id: &str, max_pp: u8) -> Self {
        self.move_slots.push(MoveSlot::new(id, max_pp));
        self
    }

    /// Set current HP (builder pattern).
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.maxhp);
        self
    }

    /// Set the major status (builder pattern).
    #[must_use]
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(Id::new(status));
        self
    }

    /// True while on the field and not fainted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && !self.fainted
    }

    #[must_use]
    pub fn has_type(&self, type_name: &str) -> bool {
        let id = Id::new(type_name);
        self.types.contains(&id)
    }

    #[must_use]
    pub fn has_ability(&self, ability: &str) -> bool {
        self.ability == Id::new(ability)
    }

    #[must_use]
    pub fn has_item(&self, item: &str) -> bool {
        self.item.as_ref().is_some_and(|i| *i == Id::new(item))
    }

    #[must_use]
    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_ref().is_some_and(|s| *s == Id::new(status))
    }

    #[must_use]
    pub fn has_volatile(&self, id: &str) -> bool {
        self.volatiles.contains_key(&Id::new(id))
    }

    /// True while in the air, underground, underwater or vanished.
    #[must_use]
    pub fn is_semi_invulnerable(&self) -> bool {
        SEMI_INVULNERABLE.iter().any(|v| self.has_volatile(v))
    }

    /// Read a volatile's state.
    #[must_use]
    pub fn volatile(&self, id: &str) -> Option<&ConditionState> {
        self.volatiles.get(&Id::new(id))
    }

    /// Apply boost deltas with clamping; returns the deltas actually applied.
    pub fn boost_by(&mut self, deltas: &BoostTable) -> BoostTable {
        let mut applied = BoostTable::new();
        for (boost, delta) in deltas.iter() {
            let current = self.boosts.get(boost);
            let next = (current + delta).clamp(-6, 6);
            applied.set(boost, next - current);
            self.boosts.set(boost, next);
        }
        applied
    }

    /// Stat after boosts (no ability or item modifiers).
    #[must_use]
    pub fn get_stat(&self, stat: StatId) -> u32 {
        const MULTIPLIERS: [f64; 7] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

        let base = self.stored_stats.get(stat) as f64;
        let boost = match stat {
            StatId::Atk => self.boosts.get(BoostId::Atk),
            StatId::Def => self.boosts.get(BoostId::Def),
            StatId::Spa => self.boosts.get(BoostId::Spa),
            StatId::Spd => self.boosts.get(BoostId::Spd),
            StatId::Spe => self.boosts.get(BoostId::Spe),
        };
        let scaled = if boost >= 0 {
            base * MULTIPLIERS[boost as usize]
        } else {
            base / MULTIPLIERS[boost.unsigned_abs() as usize]
        };
        scaled.floor() as u32
    }

    /// The slot holding `move_id`.
    #[must_use]
    pub fn move_slot(&self, move_id: &Id) -> Option<&MoveSlot> {
        self.move_slots.iter().find(|s| s.id == *move_id)
    }

    /// Deduct PP; returns how much was actually deducted.
    ///
    /// Marks the slot used even when nothing remains to deduct.
    pub fn deduct_pp(&mut self, move_id: &Id, amount: u8) -> u8 {
        let Some(slot) = self.move_slots.iter_mut().find(|s| s.id == *move_id) else {
            return 0;
        };
        slot.used = true;
        let deducted = amount.min(slot.pp);
        slot.pp -= deducted;
        deducted
    }

    /// True if HP just crossed from above half to at-or-below half.
    #[must_use]
    pub fn crossed_half_hp(&self, damage: u32) -> bool {
        self.hp > 0 && self.hp <= self.maxhp / 2 && self.hp + damage > self.maxhp / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combatant {
        Combatant::new("Sample", 50, 100, StatTable::uniform(100))
            .with_type("Fire")
            .with_move("tackle", 35)
    }

    #[test]
    fn test_boost_clamping() {
        let mut mon = sample();
        let applied = mon.boost_by(&BoostTable::new().with(BoostId::Atk, 4));
        assert_eq!(applied.get(BoostId::Atk), 4);

        let applied = mon.boost_by(&BoostTable::new().with(BoostId::Atk, 4));
        assert_eq!(applied.get(BoostId::Atk), 2);
        assert_eq!(mon.boosts.get(BoostId::Atk), 6);

        let applied = mon.boost_by(&BoostTable::new().with(BoostId::Atk, 1));
        assert_eq!(applied.get(BoostId::Atk), 0);
    }

    #[test]
    fn test_get_stat_with_boosts() {
        let mut mon = sample();
        mon.boosts.set(BoostId::Atk, 2);
        mon.boosts.set(BoostId::Def, -2);
        assert_eq!(mon.get_stat(StatId::Atk), 200);
        assert_eq!(mon.get_stat(StatId::Def), 50);
        assert_eq!(mon.get_stat(StatId::Spe), 100);
    }

    #[test]
    fn test_deduct_pp() {
        let mut mon = sample();
        let tackle = Id::new("tackle");
        assert_eq!(mon.deduct_pp(&tackle, 1), 1);
        assert_eq!(mon.move_slot(&tackle).map(|s| s.pp), Some(34));
        assert!(mon.move_slot(&tackle).is_some_and(|s| s.used));

        mon.move_slots[0].pp = 1;
        assert_eq!(mon.deduct_pp(&tackle, 2), 1);
        assert_eq!(mon.deduct_pp(&tackle, 1), 0);
        assert_eq!(mon.deduct_pp(&Id::new("ember"), 1), 0);
    }

    #[test]
    fn test_crossed_half_hp() {
        let mut mon = sample();
        mon.hp = 40;
        assert!(mon.crossed_half_hp(20));
        assert!(!mon.crossed_half_hp(5));
        mon.hp = 60;
        assert!(!mon.crossed_half_hp(20));
    }

    #[test]
    fn test_predicates() {
        let mon = sample().with_item("Choice Band").with_ability("Dancer");
        assert!(mon.has_type("fire"));
        assert!(mon.has_item("choiceband"));
        assert!(mon.has_ability("dancer"));
        assert!(!mon.is_active());
    }

    #[test]
    fn test_semi_invulnerable() {
        let mut mon = sample();
        assert!(!mon.is_semi_invulnerable());
        mon.volatiles.insert(Id::new("dig"), ConditionState::new("dig"));
        assert!(mon.is_semi_invulnerable());
    }
}
