//! Battle state: the combatant arena, both sides and the field.
//!
//! ## Design
//!
//! Combatants live in one arena indexed by [`CombatantId`]; sides and
//! effects refer to them by id only. Every lookup is O(1) and no borrow of
//! one combatant outlives a call, so the pipeline can freely interleave
//! reads and writes across combatants.
//!
//! Conditions use persistent maps, so cloning a `BattleState` for a replay
//! checkpoint is cheap.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::{Combatant, CombatantId, EffectRef, Field, Side, SideId};

/// A combatant waiting for the faint procedure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaintEntry {
    pub target: CombatantId,
    pub source: Option<CombatantId>,
    pub effect: Option<EffectRef>,
}

/// Mutable state of one battle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleState {
    pub combatants: Vec<Combatant>,
    /// Exactly two sides.
    pub sides: Vec<Side>,
    pub field: Field,
    pub turn: u32,

    pub faint_queue: Vec<FaintEntry>,
    pub ended: bool,
    /// `None` with `ended` set means a tie.
    pub winner: Option<SideId>,

    /// Next value handed out as an ability acquisition order.
    next_ability_order: u32,
}

impl BattleState {
    /// Create a state with two empty sides of `active_slots` slots each.
    pub fn new(active_slots: usize) -> Self {
        Self {
            combatants: Vec::new(),
            sides: vec![
                Side::new(SideId::new(0), "Player 1", active_slots),
                Side::new(SideId::new(1), "Player 2", active_slots),
            ],
            field: Field::new(),
            turn: 0,
            faint_queue: Vec::new(),
            ended: false,
            winner: None,
            next_ability_order: 0,
        }
    }

    /// Add a combatant to a side's party; returns its id.
    pub fn add_combatant(&mut self, side: SideId, mut combatant: Combatant) -> CombatantId {
        let id = CombatantId::new(self.combatants.len() as u16);
        combatant.id = id;
        combatant.side = side;
        combatant.ability_order = self.next_ability_order();
        self.sides[side.index()].party.push(id);
        self.combatants.push(combatant);
        id
    }

    /// Hand out the next ability acquisition order.
    pub fn next_ability_order(&mut self) -> u32 {
        self.next_ability_order += 1;
        self.next_ability_order
    }

    /// Put a combatant into an active slot, replacing any occupant.
    pub fn switch_in(&mut self, id: CombatantId, slot: usize) {
        let side = self[id].side;
        assert!(slot < self.sides[side.index()].slot_count(), "Slot {} out of range", slot);

        if let Some(previous) = self.sides[side.index()].active[slot] {
            self[previous].active = false;
        }
        self.sides[side.index()].active[slot] = Some(id);
        let combatant = &mut self[id];
        combatant.active = true;
        combatant.position = slot;
    }

    #[must_use]
    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.index()]
    }

    /// Occupant of a slot (fainted or not).
    #[must_use]
    pub fn active_at(&self, side: SideId, slot: usize) -> Option<CombatantId> {
        self.side(side).active.get(slot).copied().flatten()
    }

    /// Non-fainted active combatants on one side, in slot order.
    #[must_use]
    pub fn active_on(&self, side: SideId) -> Vec<CombatantId> {
        self.side(side)
            .active
            .iter()
            .flatten()
            .copied()
            .filter(|&id| self[id].is_active())
            .collect()
    }

    /// Every non-fainted active combatant, side 0 first.
    #[must_use]
    pub fn all_active(&self) -> Vec<CombatantId> {
        SideId::both().flat_map(|side| self.active_on(side)).collect()
    }

    /// Active allies of `id`, including itself.
    #[must_use]
    pub fn allies_and_self(&self, id: CombatantId) -> Vec<CombatantId> {
        self.active_on(self[id].side)
    }

    /// Active foes of `id`.
    #[must_use]
    pub fn foes(&self, id: CombatantId) -> Vec<CombatantId> {
        self.active_on(self[id].side.foe())
    }

    /// Benched, healthy party members that could switch in for `side`.
    #[must_use]
    pub fn can_switch(&self, side: SideId) -> usize {
        self.side(side)
            .party
            .iter()
            .filter(|&&id| !self[id].active && !self[id].fainted && self[id].hp > 0)
            .count()
    }
}

impl Index<CombatantId> for BattleState {
    type Output = Combatant;

    fn index(&self, id: CombatantId) -> &Combatant {
        &self.combatants[id.index()]
    }
}

impl IndexMut<CombatantId> for BattleState {
    fn index_mut(&mut self, id: CombatantId) -> &mut Combatant {
        &mut self.combatants[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StatTable;

    fn mon(name: &str) -> Combatant {
        Combatant::new(name, 50, 100, StatTable::uniform(50))
    }

    #[test]
    fn test_add_and_switch_in() {
        let mut state = BattleState::new(2);
        let a = state.add_combatant(SideId::new(0), mon("A"));
        let b = state.add_combatant(SideId::new(0), mon("B"));
        let c = state.add_combatant(SideId::new(1), mon("C"));

        state.switch_in(a, 0);
        state.switch_in(c, 1);

        assert_eq!(state.active_at(SideId::new(0), 0), Some(a));
        assert_eq!(state.active_on(SideId::new(0)), vec![a]);
        assert_eq!(state.foes(a), vec![c]);
        assert_eq!(state.can_switch(SideId::new(0)), 1);

        state.switch_in(b, 0);
        assert!(!state[a].active);
        assert_eq!(state[b].position, 0);
    }

    #[test]
    fn test_ability_order_increases() {
        let mut state = BattleState::new(1);
        let a = state.add_combatant(SideId::new(0), mon("A"));
        let b = state.add_combatant(SideId::new(1), mon("B"));
        assert!(state[b].ability_order > state[a].ability_order);
    }

    #[test]
    fn test_fainted_are_not_active() {
        let mut state = BattleState::new(1);
        let a = state.add_combatant(SideId::new(0), mon("A"));
        state.switch_in(a, 0);
        state[a].fainted = true;
        assert!(state.all_active().is_empty());
        assert_eq!(state.active_at(SideId::new(0), 0), Some(a));
    }

    #[test]
    #[should_panic(expected = "Slot 3 out of range")]
    fn test_switch_in_bad_slot() {
        let mut state = BattleState::new(1);
        let a = state.add_combatant(SideId::new(0), mon("A"));
        state.switch_in(a, 3);
    }
}
