//! Identifiers for data records and the effects that own hooks.
//!
//! Moves, abilities, items and conditions are all referred to by a
//! normalized [`Id`]: lowercase ASCII letters and digits only, so
//! `"Swords Dance"`, `"swordsdance"` and `"swords-dance"` all name the
//! same record.
//!
//! An [`EffectRef`] pairs an id with the kind of record it names. It is the
//! "subject" half of the hook registry key.

use serde::{Deserialize, Serialize};

/// Normalized identifier for a data record.
///
/// ```
/// use battle_actions::core::Id;
///
/// assert_eq!(Id::new("Swords Dance"), Id::new("swordsdance"));
/// assert_eq!(Id::new("U-turn").as_str(), "uturn");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(String);

impl Id {
    /// Create an id from a display name, normalizing it.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(
            name.chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect(),
        )
    }

    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of record an [`EffectRef`] points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Move,
    Ability,
    Item,
    /// Major status condition (burn, sleep, ...).
    Status,
    /// Volatile condition attached to one combatant.
    Volatile,
    SideCondition,
    SlotCondition,
    Weather,
    Terrain,
    PseudoWeather,
    /// A named mechanic with no record of its own (recoil, Z-power, ...).
    Condition,
}

impl EffectKind {
    /// Prefix used when an effect is named in the public log.
    #[must_use]
    pub const fn log_prefix(self) -> &'static str {
        match self {
            EffectKind::Move => "move: ",
            EffectKind::Ability => "ability: ",
            EffectKind::Item => "item: ",
            _ => "",
        }
    }
}

/// A typed reference to an effect.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectRef {
    pub kind: EffectKind,
    pub id: Id,
}

impl EffectRef {
    /// Create a new effect reference.
    pub fn new(kind: EffectKind, id: impl Into<Id>) -> Self {
        Self { kind, id: id.into() }
    }

    /// Reference a move.
    pub fn of_move(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Move, id)
    }

    /// Reference an ability.
    pub fn ability(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Ability, id)
    }

    /// Reference an item.
    pub fn item(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Item, id)
    }

    /// Reference a volatile condition.
    pub fn volatile(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Volatile, id)
    }

    /// Reference a status condition.
    pub fn status(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Status, id)
    }

    /// Reference a named mechanic such as `recoil`.
    pub fn condition(id: impl Into<Id>) -> Self {
        Self::new(EffectKind::Condition, id)
    }

    /// True if this references the move with the given id.
    #[must_use]
    pub fn is_move(&self, id: &str) -> bool {
        self.kind == EffectKind::Move && self.id == id
    }
}

impl std::fmt::Display for EffectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.log_prefix(), self.id)
    }
}
