//! Target resolution.
//!
//! ## Locations
//!
//! A target location is relative to the user: `0` means "no choice",
//! `-(slot + 1)` names a slot on the user's own side and `slot + 1` a slot
//! on the foe side. With two sides facing each other, foe slot `0` sits
//! across from the user's last slot, which is what adjacency is measured
//! against.
//!
//! ## Resolution
//!
//! - [`Battle::get_target`] turns a chosen location into a combatant,
//!   falling back to a random legal target when the choice is gone.
//! - [`Battle::get_move_targets`] expands the nominal target into the full
//!   target list for the move's target spec, plus the list of combatants
//!   whose presence costs the user extra PP.

use crate::battle::Battle;
use crate::core::CombatantId;
use crate::dex::{MoveData, MoveTarget};
use crate::hooks::{HookEvent, Relay};

use super::ActiveMove;

/// Whether a target spec asks the player to pick a slot.
#[must_use]
pub fn target_type_choices(target: MoveTarget) -> bool {
    target.is_choosable()
}

fn targets_user_slot(target: MoveTarget) -> bool {
    matches!(
        target,
        MoveTarget::User
            | MoveTarget::All
            | MoveTarget::AllySide
            | MoveTarget::AllyTeam
            | MoveTarget::AdjacentAllyOrSelf
    )
}

impl Battle {
    /// Whether two combatants are next to each other.
    #[must_use]
    pub fn is_adjacent(&self, a: CombatantId, b: CombatantId) -> bool {
        let (a, b) = (&self.state[a], &self.state[b]);
        if a.fainted || b.fainted {
            return false;
        }
        let (pa, pb) = (a.position as i64, b.position as i64);
        if a.side == b.side {
            return (pa - pb).abs() == 1;
        }
        let slots = self.state.side(a.side).slot_count() as i64;
        (pa + pb + 1 - slots).abs() <= 1
    }

    /// Active allies next to `id`, excluding itself.
    #[must_use]
    pub fn adjacent_allies(&self, id: CombatantId) -> Vec<CombatantId> {
        self.state
            .allies_and_self(id)
            .into_iter()
            .filter(|&ally| ally != id && self.is_adjacent(id, ally))
            .collect()
    }

    /// Active foes next to `id`.
    #[must_use]
    pub fn adjacent_foes(&self, id: CombatantId) -> Vec<CombatantId> {
        self.state.foes(id).into_iter().filter(|&foe| self.is_adjacent(id, foe)).collect()
    }

    /// Location of `target` as seen from `source`.
    #[must_use]
    pub fn get_target_loc(&self, target: CombatantId, source: CombatantId) -> i32 {
        let position = self.state[target].position as i32 + 1;
        if self.state[target].side == self.state[source].side {
            -position
        } else {
            position
        }
    }

    /// The slot occupant at `loc` as seen from `source`.
    #[must_use]
    pub fn get_at_loc(&self, source: CombatantId, loc: i32) -> Option<CombatantId> {
        let side = self.state[source].side;
        match loc {
            0 => None,
            loc if loc > 0 => self.state.active_at(side.foe(), (loc - 1) as usize),
            loc => self.state.active_at(side, (-loc - 1) as usize),
        }
    }

    /// Whether `loc` is a legal choice for `source` using a move with
    /// target spec `target`.
    #[must_use]
    pub fn valid_target_loc(&self, loc: i32, source: CombatantId, target: MoveTarget) -> bool {
        if loc == 0 {
            return true;
        }
        let slots = self.state.side(self.state[source].side).slot_count() as i32;
        if loc.abs() > slots {
            return false;
        }
        let source_loc = self.get_target_loc(source, source);
        let is_self = source_loc == loc;
        let is_foe = loc > 0;
        let across = -(slots + 1 - loc);
        let is_adjacent = if is_foe {
            (across - source_loc).abs() <= 1
        } else {
            (loc - source_loc).abs() == 1
        };

        match target {
            MoveTarget::RandomNormal | MoveTarget::Scripted | MoveTarget::Normal => is_adjacent,
            MoveTarget::AdjacentAlly => is_adjacent && !is_foe,
            MoveTarget::AdjacentAllyOrSelf => (is_adjacent && !is_foe) || is_self,
            MoveTarget::AdjacentFoe => is_adjacent && is_foe,
            MoveTarget::Any => !is_self,
            _ => false,
        }
    }

    /// A random legal target for a move with target spec `target`.
    ///
    /// `None` only when an ally-targeting move has no ally to aim at.
    pub fn get_random_target(&mut self, user: CombatantId, target: MoveTarget) -> Option<CombatantId> {
        if targets_user_slot(target) {
            return Some(user);
        }
        let slots = self.state.side(self.state[user].side).slot_count();
        if target == MoveTarget::AdjacentAlly {
            if slots == 1 {
                return None;
            }
            let allies = self.adjacent_allies(user);
            return self.rng.sample(&allies).copied();
        }

        let foe_side = self.state[user].side.foe();
        if slots == 1 {
            return self.state.active_at(foe_side, 0);
        }
        let foes = self.adjacent_foes(user);
        if let Some(&foe) = self.rng.sample(&foes) {
            return Some(foe);
        }
        let across = slots.saturating_sub(1 + self.state[user].position);
        self.state.active_at(foe_side, across)
    }

    /// Resolve the nominal target of a chosen move.
    ///
    /// `original_target` is a target the move locked onto earlier (a
    /// charging move); it wins while it is still on the field.
    pub fn get_target(
        &mut self,
        user: CombatantId,
        data: &MoveData,
        loc: i32,
        original_target: Option<CombatantId>,
    ) -> Option<CombatantId> {
        if let Some(locked) = original_target {
            if self.state[locked].is_active() {
                return Some(locked);
            }
        }
        if data.smart_target {
            return match self.get_at_loc(user, loc) {
                Some(current) if !self.state[current].fainted => Some(current),
                _ => self.get_random_target(user, data.target),
            };
        }

        let self_loc = self.get_target_loc(user, user);
        if targets_user_slot(data.target) || (data.target == MoveTarget::AdjacentAlly && loc == self_loc) {
            return Some(user);
        }

        if data.target != MoveTarget::RandomNormal && self.valid_target_loc(loc, user, data.target) {
            if let Some(target) = self.get_at_loc(user, loc) {
                if !self.state[target].fainted {
                    return Some(target);
                }
                if self.state[target].side == self.state[user].side {
                    if data.target == MoveTarget::AdjacentAllyOrSelf && self.ruleset.generation != 5 {
                        return Some(user);
                    }
                    return Some(target);
                }
            }
        }
        self.get_random_target(user, data.target)
    }

    /// Full target list and pressure list for a move about to hit.
    ///
    /// Rewrites the logged move target when redirection picks someone else.
    pub fn get_move_targets(
        &mut self,
        user: CombatantId,
        active_move: &mut ActiveMove,
        target: CombatantId,
    ) -> (Vec<CombatantId>, Vec<CombatantId>) {
        let mut targets = Vec::new();
        match active_move.target {
            MoveTarget::All | MoveTarget::FoeSide | MoveTarget::AllySide | MoveTarget::AllyTeam => {
                if active_move.target != MoveTarget::FoeSide {
                    targets.extend(self.state.allies_and_self(user));
                }
                if matches!(active_move.target, MoveTarget::All | MoveTarget::FoeSide) {
                    targets.extend(self.state.foes(user));
                }
                self.retarget_if_missing(&targets, target);
            }
            MoveTarget::AllAdjacent | MoveTarget::AllAdjacentFoes => {
                if active_move.target == MoveTarget::AllAdjacent {
                    targets.extend(self.adjacent_allies(user));
                }
                targets.extend(self.adjacent_foes(user));
                self.retarget_if_missing(&targets, target);
            }
            MoveTarget::Allies => targets = self.state.allies_and_self(user),
            _ => {
                let selected = target;
                let mut target = target;
                let same_side = self.state[target].side == self.state[user].side;
                if self.state[target].fainted && !same_side {
                    match self.get_random_target(user, active_move.target) {
                        Some(t) => target = t,
                        None => return (Vec::new(), Vec::new()),
                    }
                }

                if self.state.side(self.state[user].side).slot_count() > 1 {
                    let relay = self.run_move_event(
                        HookEvent::RedirectTarget,
                        user,
                        Some(user),
                        active_move,
                        Relay::Combatant(target),
                    );
                    if let Relay::Combatant(redirected) = relay {
                        target = redirected;
                    }
                }

                if active_move.smart_target {
                    targets = self.get_smart_targets(user, target, active_move);
                    target = targets[0];
                } else {
                    targets.push(target);
                }

                if self.state[target].fainted {
                    return (Vec::new(), Vec::new());
                }
                if selected != target {
                    let ident = self.ident(target);
                    self.log.retarget_last_move(ident);
                }
            }
        }

        let pressure = if active_move.target == MoveTarget::FoeSide {
            Vec::new()
        } else {
            targets.clone()
        };
        (targets, pressure)
    }

    /// Targets of a move that aims each hit separately: the chosen target
    /// and its adjacent ally, or whichever of them is still standing.
    pub fn get_smart_targets(
        &mut self,
        user: CombatantId,
        target: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<CombatantId> {
        let partner = self.adjacent_allies(target).first().copied();
        match partner {
            Some(partner) if partner != user && self.state[partner].hp > 0 => {
                if self.state[target].hp == 0 {
                    active_move.smart_target = false;
                    return vec![partner];
                }
                vec![target, partner]
            }
            _ => {
                active_move.smart_target = false;
                vec![target]
            }
        }
    }

    fn retarget_if_missing(&mut self, targets: &[CombatantId], target: CombatantId) {
        if let Some(&last) = targets.last() {
            if !targets.contains(&target) {
                let ident = self.ident(last);
                self.log.retarget_last_move(ident);
            }
        }
    }
}
