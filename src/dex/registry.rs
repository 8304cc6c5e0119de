//! Lookup tables for the static records a battle runs on.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::MoveData;
use crate::core::{BattleError, Id, Result};

/// Static ability record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityData {
    pub id: Id,
    pub name: String,
    /// Re-uses dance moves performed by other combatants.
    pub mirrors_dance: bool,
}

impl AbilityData {
    pub fn new(name: &str) -> Self {
        Self { id: Id::new(name), name: name.to_string(), mirrors_dance: false }
    }

    /// Mark as a dance-mirroring ability (builder pattern).
    #[must_use]
    pub fn mirroring_dances(mut self) -> Self {
        self.mirrors_dance = true;
        self
    }
}

/// A crystal that unlocks Z-moves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZCrystal {
    /// Empowers every move of this type.
    pub move_type: Option<Id>,
    /// Signature crystals: `from_move` becomes `z_move`.
    pub from_move: Option<Id>,
    pub z_move: Option<Id>,
    /// Species allowed to use the crystal. Empty means anyone.
    pub users: Vec<Id>,
}

/// Static item record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: Id,
    pub name: String,
    pub z_crystal: Option<ZCrystal>,
}

impl ItemData {
    pub fn new(name: &str) -> Self {
        Self { id: Id::new(name), name: name.to_string(), z_crystal: None }
    }

    /// A type-wide Z crystal.
    pub fn type_crystal(name: &str, move_type: &str) -> Self {
        Self {
            z_crystal: Some(ZCrystal { move_type: Some(Id::new(move_type)), ..ZCrystal::default() }),
            ..Self::new(name)
        }
    }

    /// A signature Z crystal turning `from_move` into `z_move` for `users`.
    pub fn signature_crystal(name: &str, from_move: &str, z_move: &str, users: &[&str]) -> Self {
        Self {
            z_crystal: Some(ZCrystal {
                move_type: None,
                from_move: Some(Id::new(from_move)),
                z_move: Some(Id::new(z_move)),
                users: users.iter().map(|u| Id::new(u)).collect(),
            }),
            ..Self::new(name)
        }
    }
}

/// Registry of moves, abilities and items, plus the empowered-move tables.
///
/// Like the card registry of a card engine, this is populated once at
/// startup and read-only during a battle.
#[derive(Clone, Debug, Default)]
pub struct Dex {
    moves: FxHashMap<Id, MoveData>,
    abilities: FxHashMap<Id, AbilityData>,
    items: FxHashMap<Id, ItemData>,

    /// Move type to the generic Z-move of that type.
    z_move_table: FxHashMap<Id, Id>,
    /// Move type (or `status`) to the Max move of that type.
    max_move_table: FxHashMap<Id, Id>,
}

impl Dex {
    /// Create an empty dex.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a move, replacing any with the same id.
    pub fn register_move(&mut self, data: MoveData) {
        self.moves.insert(data.id.clone(), data);
    }

    pub fn register_ability(&mut self, data: AbilityData) {
        self.abilities.insert(data.id.clone(), data);
    }

    pub fn register_item(&mut self, data: ItemData) {
        self.items.insert(data.id.clone(), data);
    }

    /// Register the generic Z-move for a type.
    pub fn register_z_move(&mut self, move_type: &str, data: MoveData) {
        self.z_move_table.insert(Id::new(move_type), data.id.clone());
        self.register_move(data);
    }

    /// Register the Max move for a type, or for `"Status"`.
    pub fn register_max_move(&mut self, move_type: &str, data: MoveData) {
        self.max_move_table.insert(Id::new(move_type), data.id.clone());
        self.register_move(data);
    }

    #[must_use]
    pub fn get_move(&self, id: &Id) -> Option<&MoveData> {
        self.moves.get(id)
    }

    /// Look up a move, failing for unknown ids.
    pub fn require_move(&self, id: &Id) -> Result<&MoveData> {
        self.moves.get(id).ok_or_else(|| BattleError::UnknownMove(id.clone()))
    }

    #[must_use]
    pub fn get_ability(&self, id: &Id) -> Option<&AbilityData> {
        self.abilities.get(id)
    }

    #[must_use]
    pub fn get_item(&self, id: &Id) -> Option<&ItemData> {
        self.items.get(id)
    }

    /// Generic Z-move id for a type.
    #[must_use]
    pub fn z_move_for_type(&self, move_type: &Id) -> Option<&Id> {
        self.z_move_table.get(move_type)
    }

    /// Max move id for a type, or for status moves.
    #[must_use]
    pub fn max_move_for(&self, move_type: &Id, is_status: bool) -> Option<&Id> {
        if is_status {
            self.max_move_table.get(&Id::new("status"))
        } else {
            self.max_move_table.get(move_type)
        }
    }

    /// Number of registered moves.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut dex = Dex::new();
        dex.register_move(MoveData::physical("Tackle", "Normal", 40));
        dex.register_ability(AbilityData::new("Dancer").mirroring_dances());

        assert!(dex.get_move(&Id::new("tackle")).is_some());
        assert!(dex.require_move(&Id::new("ember")).is_err());
        assert!(dex.get_ability(&Id::new("dancer")).is_some_and(|a| a.mirrors_dance));
        assert_eq!(dex.move_count(), 1);
    }

    #[test]
    fn test_empowered_tables() {
        let mut dex = Dex::new();
        dex.register_z_move("Normal", MoveData::physical("Breakneck Blitz", "Normal", 1));
        dex.register_max_move("Status", MoveData::status("Max Guard", "Normal"));

        assert_eq!(dex.z_move_for_type(&Id::new("normal")), Some(&Id::new("breakneckblitz")));
        assert_eq!(dex.max_move_for(&Id::new("fire"), true), Some(&Id::new("maxguard")));
        assert_eq!(dex.max_move_for(&Id::new("fire"), false), None);
        assert_eq!(dex.move_count(), 2);
    }

    #[test]
    fn test_signature_crystal() {
        let item = ItemData::signature_crystal("Pikanium Z", "Volt Tackle", "Catastropika", &["Pikachu"]);
        let crystal = item.z_crystal.unwrap_or_default();
        assert_eq!(crystal.from_move, Some(Id::new("volttackle")));
        assert_eq!(crystal.users, vec![Id::new("pikachu")]);
    }
}
