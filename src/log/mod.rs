//! Public battle log.
//!
//! The log is a one-way, ordered stream of [`LogEntry`] records. Each
//! record is one semantically distinct public event; replay and spectator
//! consumers depend on both the set and the order of records, so the
//! pipeline pushes exactly one entry per event.
//!
//! Entries render to the pipe-delimited protocol line via `Display`:
//!
//! ```
//! use battle_actions::core::CombatantId;
//! use battle_actions::log::{Ident, LogEntry};
//!
//! let target = Ident::new(CombatantId::new(1), "p2a: Eevee");
//! let entry = LogEntry::Damage { target, hp: 40, maxhp: 100, from: None };
//! assert_eq!(entry.to_string(), "|-damage|p2a: Eevee|40/100");
//! ```
//!
//! Diagnostics that are not public events go to `tracing`, never here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{BoostId, CombatantId, SideId};

/// A combatant as named in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub id: CombatantId,
    /// Rendered as `p1a: Name`.
    pub label: String,
}

impl Ident {
    pub fn new(id: CombatantId, label: impl Into<String>) -> Self {
        Self { id, label: label.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One public notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    // === Move use ===
    Move {
        user: Ident,
        move_name: String,
        target: Option<Ident>,
        /// Trailing attributes such as `[from] ...`, `[still]`, `[miss]`.
        attrs: Vec<String>,
    },
    /// A later hit of a move that aims each hit separately.
    Anim { user: Ident, move_name: String, target: Ident },
    Cant { who: Ident, reason: String, move_name: Option<String> },
    ZPower { who: Ident },
    Activate { who: Ident, effect: String, attrs: Vec<String> },
    Message(String),

    // === Outcomes ===
    Fail { who: Ident, what: Option<String> },
    NoTarget { who: Ident },
    Miss { user: Ident, target: Ident },
    Immune { target: Ident, note: Option<String> },
    HitCount { target: Ident, count: u32 },
    Ohko,

    // === State changes ===
    Damage { target: Ident, hp: u32, maxhp: u32, from: Option<String> },
    Heal { target: Ident, hp: u32, maxhp: u32, from: Option<String> },
    Boost { target: Ident, stat: BoostId, amount: u8, note: Option<String> },
    Unboost { target: Ident, stat: BoostId, amount: u8, note: Option<String> },
    ClearPositiveBoost { target: Ident, source: Ident, effect: String },
    ClearNegativeBoost { target: Ident, note: Option<String> },
    Status { target: Ident, status: String },
    Start { target: Ident, effect: String },
    SideStart { side: SideId, condition: String },
    SideEnd { side: SideId, condition: String, note: Option<String> },
    Weather { weather: String },
    FieldStart { condition: String },
    Faint { who: Ident },

    // === Battle end ===
    Win { side: SideId },
    Tie,
}

fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &[String]) -> fmt::Result {
    for attr in attrs {
        write!(f, "|{}", attr)?;
    }
    Ok(())
}

fn write_opt(f: &mut fmt::Formatter<'_>, value: &Option<String>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "|{}", v),
        None => Ok(()),
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Move { user, move_name, target, attrs } => {
                write!(f, "|move|{}|{}|", user, move_name)?;
                if let Some(target) = target {
                    write!(f, "{}", target)?;
                }
                write_attrs(f, attrs)
            }
            LogEntry::Anim { user, move_name, target } => write!(f, "|-anim|{}|{}|{}", user, move_name, target),
            LogEntry::Cant { who, reason, move_name } => {
                write!(f, "|cant|{}|{}", who, reason)?;
                write_opt(f, move_name)
            }
            LogEntry::ZPower { who } => write!(f, "|-zpower|{}", who),
            LogEntry::Activate { who, effect, attrs } => {
                write!(f, "|-activate|{}|{}", who, effect)?;
                write_attrs(f, attrs)
            }
            LogEntry::Message(text) => write!(f, "|-message|{}", text),
            LogEntry::Fail { who, what } => {
                write!(f, "|-fail|{}", who)?;
                write_opt(f, what)
            }
            LogEntry::NoTarget { who } => write!(f, "|-notarget|{}", who),
            LogEntry::Miss { user, target } => write!(f, "|-miss|{}|{}", user, target),
            LogEntry::Immune { target, note } => {
                write!(f, "|-immune|{}", target)?;
                write_opt(f, note)
            }
            LogEntry::HitCount { target, count } => write!(f, "|-hitcount|{}|{}", target, count),
            LogEntry::Ohko => f.write_str("|-ohko|"),
            LogEntry::Damage { target, hp, maxhp, from } => {
                write!(f, "|-damage|{}|{}/{}", target, hp, maxhp)?;
                write_opt(f, from)
            }
            LogEntry::Heal { target, hp, maxhp, from } => {
                write!(f, "|-heal|{}|{}/{}", target, hp, maxhp)?;
                write_opt(f, from)
            }
            LogEntry::Boost { target, stat, amount, note } => {
                write!(f, "|-boost|{}|{}|{}", target, stat.name(), amount)?;
                write_opt(f, note)
            }
            LogEntry::Unboost { target, stat, amount, note } => {
                write!(f, "|-unboost|{}|{}|{}", target, stat.name(), amount)?;
                write_opt(f, note)
            }
            LogEntry::ClearPositiveBoost { target, source, effect } => {
                write!(f, "|-clearpositiveboost|{}|{}|{}", target, source, effect)
            }
            LogEntry::ClearNegativeBoost { target, note } => {
                write!(f, "|-clearnegativeboost|{}", target)?;
                write_opt(f, note)
            }
            LogEntry::Status { target, status } => write!(f, "|-status|{}|{}", target, status),
            LogEntry::Start { target, effect } => write!(f, "|-start|{}|{}", target, effect),
            LogEntry::SideStart { side, condition } => write!(f, "|-sidestart|{}|{}", side, condition),
            LogEntry::SideEnd { side, condition, note } => {
                write!(f, "|-sideend|{}|{}", side, condition)?;
                write_opt(f, note)
            }
            LogEntry::Weather { weather } => write!(f, "|-weather|{}", weather),
            LogEntry::FieldStart { condition } => write!(f, "|-fieldstart|{}", condition),
            LogEntry::Faint { who } => write!(f, "|faint|{}", who),
            LogEntry::Win { side } => write!(f, "|win|{}", side),
            LogEntry::Tie => f.write_str("|tie"),
        }
    }
}

/// Ordered sink of public notifications.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Add an attribute to the most recent move entry.
    ///
    /// Does nothing if no move has been logged.
    pub fn attr_last_move(&mut self, attr: impl Into<String>) {
        let last_move = self
            .entries
            .iter_mut()
            .rev()
            .find(|e| matches!(e, LogEntry::Move { .. }));
        if let Some(LogEntry::Move { attrs, .. }) = last_move {
            attrs.push(attr.into());
        }
    }

    /// Point the most recent move entry at a different target.
    pub fn retarget_last_move(&mut self, new_target: Ident) {
        let last_move = self
            .entries
            .iter_mut()
            .rev()
            .find(|e| matches!(e, LogEntry::Move { .. }));
        if let Some(LogEntry::Move { target, .. }) = last_move {
            *target = Some(new_target);
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended after position `from`.
    #[must_use]
    pub fn since(&self, from: usize) -> &[LogEntry] {
        self.entries.get(from..).unwrap_or(&[])
    }

    /// Render every entry as a protocol line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(n: u16, label: &str) -> Ident {
        Ident::new(CombatantId::new(n), label)
    }

    #[test]
    fn test_move_line() {
        let entry = LogEntry::Move {
            user: ident(0, "p1a: Pikachu"),
            move_name: "Thunderbolt".into(),
            target: Some(ident(1, "p2a: Eevee")),
            attrs: vec!["[from] move: Metronome".into()],
        };
        assert_eq!(entry.to_string(), "|move|p1a: Pikachu|Thunderbolt|p2a: Eevee|[from] move: Metronome");
    }

    #[test]
    fn test_attr_last_move() {
        let mut log = BattleLog::new();
        log.push(LogEntry::Move {
            user: ident(0, "p1a: A"),
            move_name: "Tackle".into(),
            target: None,
            attrs: vec![],
        });
        log.push(LogEntry::Fail { who: ident(0, "p1a: A"), what: None });
        log.attr_last_move("[still]");
        log.attr_last_move("[miss]");

        assert_eq!(log.lines(), vec!["|move|p1a: A|Tackle||[still]|[miss]", "|-fail|p1a: A"]);

        log.retarget_last_move(ident(1, "p2a: B"));
        assert_eq!(log.lines()[0], "|move|p1a: A|Tackle|p2a: B|[still]|[miss]");
    }

    #[test]
    fn test_attr_without_move_is_noop() {
        let mut log = BattleLog::new();
        log.attr_last_move("[still]");
        assert!(log.is_empty());
    }

    #[test]
    fn test_since() {
        let mut log = BattleLog::new();
        log.push(LogEntry::Ohko);
        log.push(LogEntry::Tie);
        assert_eq!(log.since(1), &[LogEntry::Tie]);
        assert!(log.since(5).is_empty());
    }

    #[test]
    fn test_boost_lines() {
        let entry = LogEntry::Boost { target: ident(0, "p1a: A"), stat: BoostId::Atk, amount: 2, note: None };
        assert_eq!(entry.to_string(), "|-boost|p1a: A|atk|2");
        let entry = LogEntry::HitCount { target: ident(1, "p2a: B"), count: 3 };
        assert_eq!(entry.to_string(), "|-hitcount|p2a: B|3");
    }
}
