//! Empowered move forms.
//!
//! A Z-move is a one-shot-per-side upgrade unlocked by a held crystal; a
//! Max move replaces every move while the user is dynamaxed. Both are
//! derived from the chosen move right before it runs and never outlive the
//! use.

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::core::{BattleError, BoostId, BoostTable, CombatantId, EffectRef, Id, Result};
use crate::dex::{HitEffect, MoveData, MoveTarget, ZCrystal, ZEffect};
use crate::log::LogEntry;

use super::{ActiveMove, Empowered};

/// One entry of a Z-move request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZMoveOption {
    pub move_name: String,
    pub target: MoveTarget,
}

/// One entry of a Max-move request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxMoveOption {
    pub move_id: Id,
    pub target: MoveTarget,
    pub disabled: bool,
}

impl Battle {
    fn z_crystal(&self, user: CombatantId) -> Option<ZCrystal> {
        let combatant = &self.state[user];
        let crystal = combatant.item.as_ref().and_then(|item| self.dex.get_item(item))?.z_crystal.clone()?;
        if !crystal.users.is_empty() && !crystal.users.contains(&combatant.species) {
            return None;
        }
        Some(crystal)
    }

    /// The Z-move `data` would become for `user`, if any.
    ///
    /// With `skip_checks` unset, also requires that the side has not used
    /// its Z-move and that the base move still has PP.
    #[must_use]
    pub fn get_z_move(&self, data: &MoveData, user: CombatantId, skip_checks: bool) -> Option<Id> {
        let crystal = self.z_crystal(user)?;
        if !skip_checks {
            let combatant = &self.state[user];
            if self.state.side(combatant.side).z_move_used() {
                return None;
            }
            if !combatant.move_slot(&data.id).is_some_and(|slot| slot.pp > 0) {
                return None;
            }
        }

        if let Some(from_move) = &crystal.from_move {
            return if *from_move == data.id { crystal.z_move.clone() } else { None };
        }
        if crystal.move_type.as_ref() != Some(&data.move_type) {
            return None;
        }
        if data.is_status() {
            return Some(data.id.clone());
        }
        if data.z_move.as_ref().and_then(|z| z.base_power).is_some() {
            return self.dex.z_move_for_type(&data.move_type).cloned();
        }
        None
    }

    /// Build the Z form of `data` for `user`.
    pub fn get_active_z_move(&self, data: &MoveData, user: CombatantId) -> Result<ActiveMove> {
        if let Some(crystal) = self.z_crystal(user) {
            if crystal.from_move.as_ref() == Some(&data.id) {
                if let Some(z_move) = &crystal.z_move {
                    let mut active = ActiveMove::new(self.dex.require_move(z_move)?.clone());
                    active.empowered = Some(Empowered::Z);
                    return Ok(active);
                }
            }
        }

        if data.is_status() {
            let mut active = ActiveMove::new(data.clone());
            active.z_status = true;
            active.empowered = Some(Empowered::Z);
            return Ok(active);
        }

        let z_move = self.dex.z_move_for_type(&data.move_type).cloned().ok_or_else(|| {
            BattleError::MissingEmpoweredMove { kind: "Z", type_name: data.move_type.clone() }
        })?;
        let base_power = data.z_move.as_ref().and_then(|z| z.base_power).ok_or_else(|| BattleError::MissingZPower {
            base_move: data.id.clone(),
            z_move: z_move.clone(),
        })?;

        let mut active = ActiveMove::new(self.dex.require_move(&z_move)?.clone());
        active.base_power = base_power;
        active.category = data.category;
        active.priority = data.priority;
        active.empowered = Some(Empowered::Z);
        Ok(active)
    }

    /// Z-move request for `user`: one entry per move slot, `None` where the
    /// slot has no Z form.
    ///
    /// `None` overall when no slot qualifies or every slot is out of PP.
    #[must_use]
    pub fn can_z_move(&self, user: CombatantId) -> Option<Vec<Option<ZMoveOption>>> {
        if !self.ruleset.z_moves {
            return None;
        }
        let combatant = &self.state[user];
        if self.state.side(combatant.side).z_move_used() {
            return None;
        }
        self.z_crystal(user)?;

        let mut at_least_one = false;
        let mut must_struggle = true;
        let mut options = Vec::with_capacity(combatant.move_slots.len());
        for slot in &combatant.move_slots {
            if slot.pp == 0 {
                options.push(None);
                continue;
            }
            if !slot.disabled {
                must_struggle = false;
            }
            let option = self
                .dex
                .get_move(&slot.id)
                .and_then(|data| self.get_z_move(data, user, true))
                .and_then(|z_id| self.dex.get_move(&z_id))
                .map(|z_move| {
                    let move_name = if z_move.is_z.is_none() && z_move.is_status() {
                        format!("Z-{}", z_move.name)
                    } else {
                        z_move.name.clone()
                    };
                    ZMoveOption { move_name, target: z_move.target }
                });
            at_least_one |= option.is_some();
            options.push(option);
        }

        (at_least_one && !must_struggle).then_some(options)
    }

    /// The Max move `data` would become.
    #[must_use]
    pub fn get_max_move(&self, data: &MoveData) -> Option<Id> {
        if data.id == "struggle" {
            return Some(data.id.clone());
        }
        self.dex.max_move_for(&data.move_type, data.is_status()).cloned()
    }

    /// Build the Max form of `data`.
    pub fn get_active_max_move(&self, data: &MoveData) -> Result<ActiveMove> {
        if data.id == "struggle" {
            return Ok(ActiveMove::new(data.clone()));
        }
        let max_move = self.get_max_move(data).ok_or_else(|| BattleError::MissingEmpoweredMove {
            kind: "Max",
            type_name: if data.is_status() { Id::new("status") } else { data.move_type.clone() },
        })?;

        let mut active = ActiveMove::new(self.dex.require_move(&max_move)?.clone());
        if !data.is_status() {
            active.base_power = data.max_move.as_ref().and_then(|m| m.base_power).ok_or_else(|| {
                BattleError::MissingMaxPower { base_move: data.id.clone(), max_move: max_move.clone() }
            })?;
            active.category = data.category;
        }
        active.base_move = Some(data.id.clone());
        active.priority = data.priority;
        active.empowered = Some(Empowered::Max);
        Ok(active)
    }

    /// Max-move request for `user`, or `None` if it cannot dynamax.
    #[must_use]
    pub fn can_max_move(&self, user: CombatantId) -> Option<Vec<MaxMoveOption>> {
        if !self.ruleset.max_moves {
            return None;
        }
        let combatant = &self.state[user];
        if self.state.side(combatant.side).max_move_used() && !combatant.has_volatile("dynamax") {
            return None;
        }
        let options = combatant
            .move_slots
            .iter()
            .filter_map(|slot| {
                let data = self.dex.get_move(&slot.id)?;
                let max_id = self.get_max_move(data)?;
                let target = self.dex.get_move(&max_id).map_or(data.target, |m| m.target);
                Some(MaxMoveOption { move_id: max_id, target, disabled: slot.disabled || slot.pp == 0 })
            })
            .collect();
        Some(options)
    }

    /// Apply the Z-power bonus of `active_move` right after it is announced.
    pub fn run_z_power(&mut self, active_move: &mut ActiveMove, user: CombatantId) {
        let zpower = EffectRef::condition("zpower");
        if !active_move.is_status() {
            self.log.attr_last_move("[zeffect]");
            return;
        }
        let z_move = active_move.z_move.clone().unwrap_or_default();
        if let Some(boosts) = z_move.boost {
            self.boost(&boosts, user, Some(user), Some(zpower), false, false);
            return;
        }

        match z_move.effect {
            Some(ZEffect::Heal) => {
                let maxhp = self.state[user].maxhp;
                self.heal(maxhp, user, Some(user), Some(zpower));
            }
            Some(ZEffect::HealReplacement) => {
                active_move.self_effect = Some(HitEffect::new().with_slot_condition("healreplacement"));
            }
            Some(ZEffect::ClearNegativeBoost) => {
                let boosts = &mut self.state[user].boosts;
                for stat in BoostId::ALL {
                    if boosts.get(stat) < 0 {
                        boosts.set(stat, 0);
                    }
                }
                let target = self.ident(user);
                self.log.push(LogEntry::ClearNegativeBoost { target, note: Some("[zeffect]".to_string()) });
            }
            Some(ZEffect::Redirect) => {
                self.add_volatile(user, &Id::new("followme"), Some(user), Some(zpower));
            }
            Some(ZEffect::Crit2) => {
                self.add_volatile(user, &Id::new("focusenergy"), Some(user), Some(zpower));
            }
            Some(ZEffect::Curse) => {
                if self.state[user].has_type("Ghost") {
                    let maxhp = self.state[user].maxhp;
                    self.heal(maxhp, user, Some(user), Some(zpower));
                } else {
                    self.boost(&BoostTable::new().with(BoostId::Atk, 1), user, Some(user), Some(zpower), false, false);
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Combatant, Ruleset, SideId, StatTable};
    use crate::dex::{Category, Dex, ItemData, MaxMoveData, ZMoveData};

    fn dex() -> Dex {
        let mut dex = Dex::new();
        dex.register_move(
            MoveData::physical("Thunderbolt", "Electric", 90)
                .with_z_move(ZMoveData { base_power: Some(175), ..ZMoveData::default() })
                .with_max_move(MaxMoveData { base_power: Some(130) }),
        );
        dex.register_move(MoveData::status("Thunder Wave", "Electric"));
        dex.register_move(MoveData::physical("Volt Tackle", "Electric", 120));
        dex.register_move(MoveData::physical("Catastropika", "Electric", 210));
        dex.register_z_move("Electric", MoveData::physical("Gigavolt Havoc", "Electric", 1));
        dex.register_max_move("Electric", MoveData::physical("Max Lightning", "Electric", 10));
        dex.register_max_move("Status", MoveData::status("Max Guard", "Normal").with_target(MoveTarget::User));
        dex.register_item(ItemData::type_crystal("Electrium Z", "Electric"));
        dex.register_item(ItemData::signature_crystal("Pikanium Z", "Volt Tackle", "Catastropika", &["Pikachu"]));
        dex
    }

    fn setup(item: &str) -> (Battle, CombatantId) {
        let mut battle = Battle::new(Ruleset::gen(7), dex(), 1, 1);
        let user = battle.add_combatant(
            SideId::new(0),
            Combatant::new("Pikachu", 50, 100, StatTable::uniform(50))
                .with_item(item)
                .with_move("thunderbolt", 15)
                .with_move("thunderwave", 20)
                .with_move("volttackle", 15),
        );
        battle.switch_in(user, 0);
        (battle, user)
    }

    fn data(battle: &Battle, id: &str) -> MoveData {
        battle.dex.get_move(&Id::new(id)).cloned().unwrap_or_else(|| MoveData::status(id, "Normal"))
    }

    #[test]
    fn test_type_crystal_z_moves() {
        let (battle, user) = setup("Electrium Z");
        let thunderbolt = data(&battle, "thunderbolt");
        assert_eq!(battle.get_z_move(&thunderbolt, user, false), Some(Id::new("gigavolthavoc")));

        let active = battle.get_active_z_move(&thunderbolt, user).unwrap();
        assert_eq!(active.id, Id::new("gigavolthavoc"));
        assert_eq!(active.base_power, 175);
        assert_eq!(active.category, Category::Physical);
        assert_eq!(active.empowered, Some(Empowered::Z));

        let wave = data(&battle, "thunderwave");
        assert_eq!(battle.get_z_move(&wave, user, false), Some(Id::new("thunderwave")));
        assert!(battle.get_active_z_move(&wave, user).unwrap().z_status);
    }

    #[test]
    fn test_signature_crystal() {
        let (mut battle, user) = setup("Pikanium Z");
        let tackle = data(&battle, "volttackle");
        assert_eq!(battle.get_z_move(&tackle, user, false), Some(Id::new("catastropika")));
        assert_eq!(battle.get_z_move(&data(&battle, "thunderbolt"), user, false), None);

        battle.state[user].species = Id::new("raichu");
        assert_eq!(battle.get_z_move(&tackle, user, false), None);
    }

    #[test]
    fn test_z_move_blocked_after_use_and_without_pp() {
        let (mut battle, user) = setup("Electrium Z");
        let thunderbolt = data(&battle, "thunderbolt");
        battle.state[user].deduct_pp(&Id::new("thunderbolt"), 15);
        assert_eq!(battle.get_z_move(&thunderbolt, user, false), None);
        assert!(battle.get_z_move(&thunderbolt, user, true).is_some());

        battle.state.side_mut(SideId::new(0)).mark_z_move_used();
        assert!(battle.can_z_move(user).is_none());
    }

    #[test]
    fn test_z_request_when_every_slot_disabled() {
        let (mut battle, user) = setup("Electrium Z");
        for slot in battle.state[user].move_slots.iter_mut() {
            slot.disabled = true;
        }
        assert!(battle.can_z_move(user).is_none());

        battle.state[user].move_slots[2].disabled = false;
        let options = battle.can_z_move(user).unwrap();
        assert!(options[0].is_some());
    }

    #[test]
    fn test_z_request_names_status_moves() {
        let (battle, user) = setup("Electrium Z");
        let options = battle.can_z_move(user).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].as_ref().map(|o| o.move_name.as_str()), Some("Gigavolt Havoc"));
        assert_eq!(options[1].as_ref().map(|o| o.move_name.as_str()), Some("Z-Thunder Wave"));
        // Volt Tackle has no Z power of its own.
        assert_eq!(options[2], None);
    }

    #[test]
    fn test_missing_z_power_is_a_data_error() {
        let (battle, user) = setup("Electrium Z");
        let tackle = data(&battle, "volttackle");
        let err = battle.get_active_z_move(&tackle, user).unwrap_err();
        assert!(matches!(err, BattleError::MissingZPower { .. }));
    }

    #[test]
    fn test_max_moves() {
        let (battle, _) = setup("Electrium Z");
        let thunderbolt = data(&battle, "thunderbolt");
        let active = battle.get_active_max_move(&thunderbolt).unwrap();
        assert_eq!(active.id, Id::new("maxlightning"));
        assert_eq!(active.base_power, 130);
        assert_eq!(active.base_move, Some(Id::new("thunderbolt")));

        let guard = battle.get_active_max_move(&data(&battle, "thunderwave")).unwrap();
        assert_eq!(guard.id, Id::new("maxguard"));

        let err = battle.get_active_max_move(&data(&battle, "volttackle")).unwrap_err();
        assert!(matches!(err, BattleError::MissingMaxPower { .. }));
    }

    #[test]
    fn test_can_max_move_follows_side_flag() {
        let (mut battle, user) = setup("Electrium Z");
        assert!(battle.can_max_move(user).is_none());
        battle.ruleset = Ruleset::gen(8);
        assert_eq!(battle.can_max_move(user).map(|o| o.len()), Some(3));

        battle.state.side_mut(SideId::new(0)).mark_max_move_used();
        assert!(battle.can_max_move(user).is_none());
        battle.add_volatile(user, &Id::new("dynamax"), None, None);
        assert!(battle.can_max_move(user).is_some());
    }

    #[test]
    fn test_z_power_effects() {
        let (mut battle, user) = setup("Electrium Z");
        battle.state[user].boosts.set(BoostId::Def, -2);
        let mut active = ActiveMove::new(MoveData::status("Belly Drum", "Normal").with_z_move(ZMoveData {
            effect: Some(ZEffect::ClearNegativeBoost),
            ..ZMoveData::default()
        }));
        battle.run_z_power(&mut active, user);
        assert_eq!(battle.state[user].boosts.get(BoostId::Def), 0);
        assert_eq!(battle.log.lines().last().map(String::as_str), Some("|-clearnegativeboost|p1a: Pikachu|[zeffect]"));

        let mut curse = ActiveMove::new(MoveData::status("Curse", "Ghost").with_z_move(ZMoveData {
            effect: Some(ZEffect::Curse),
            ..ZMoveData::default()
        }));
        battle.run_z_power(&mut curse, user);
        assert_eq!(battle.state[user].boosts.get(BoostId::Atk), 1);
    }
}
