//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use battle_actions::core::{BoostId, BoostTable, Id};
use battle_actions::dex::{
    Accuracy, AbilityData, FixedDamage, ItemData, MoveFlags, MultiHit, Ohko, SelfDestruct, ZMoveData,
};
use battle_actions::{Battle, Combatant, CombatantId, Dex, HitEffect, MoveData, MoveTarget, Ruleset, RunMoveOptions, SideId, StatTable};

/// A small dex with deterministic damage wherever possible.
pub fn dex() -> Dex {
    let mut dex = Dex::new();
    dex.register_move(MoveData::special("Dragon Rage", "Dragon", 0).with_fixed_damage(FixedDamage::Amount(40)));
    dex.register_move(
        MoveData::physical("Double Hit", "Normal", 35)
            .with_fixed_damage(FixedDamage::Amount(15))
            .with_multi_hit(MultiHit::Fixed(2)),
    );
    dex.register_move(
        MoveData::physical("Bullet Seed", "Grass", 25)
            .with_fixed_damage(FixedDamage::Amount(5))
            .with_multi_hit(MultiHit::Range(2, 5)),
    );
    dex.register_move(
        MoveData::physical("Double-Edge", "Normal", 120)
            .with_fixed_damage(FixedDamage::Amount(60))
            .with_recoil(33, 100),
    );
    dex.register_move(MoveData::physical("Fissure", "Ground", 0).with_ohko(Ohko::Standard).with_accuracy(Accuracy::Percent(30)));
    dex.register_move(
        MoveData::physical("Explosion", "Normal", 250)
            .with_target(MoveTarget::AllAdjacent)
            .with_self_destruct(SelfDestruct::Always)
            .with_fixed_damage(FixedDamage::Amount(50)),
    );
    dex.register_move(
        MoveData::status("Swords Dance", "Normal")
            .with_target(MoveTarget::User)
            .with_accuracy(Accuracy::AlwaysHits)
            .with_flags(MoveFlags { dance: true, ..MoveFlags::default() })
            .with_hit(HitEffect::new().with_boosts(BoostTable::new().with(BoostId::Atk, 2))),
    );
    dex.register_move(MoveData::physical("Struggle", "Normal", 50).with_fixed_damage(FixedDamage::Amount(10)));
    dex.register_move(
        MoveData::special("Thunderbolt", "Electric", 90)
            .with_z_move(ZMoveData { base_power: Some(175), ..ZMoveData::default() }),
    );
    dex.register_z_move("Electric", MoveData::special("Gigavolt Havoc", "Electric", 1));
    dex.register_item(ItemData::type_crystal("Electrium Z", "Electric"));
    dex.register_ability(AbilityData::new("Dancer").mirroring_dances());
    dex
}

/// A combatant that knows every move in [`dex`].
pub fn fighter(name: &str, level: u8, hp: u32, spe: u32) -> Combatant {
    ["dragonrage", "doublehit", "bulletseed", "doubleedge", "fissure", "explosion", "swordsdance", "thunderbolt"]
        .iter()
        .fold(Combatant::new(name, level, hp, StatTable::uniform(50).with_spe(spe)), |c, id| c.with_move(id, 20))
}

/// One active combatant per side.
pub fn singles(ruleset: Ruleset, seed: u64) -> (Battle, CombatantId, CombatantId) {
    let mut battle = Battle::new(ruleset, dex(), seed, 1);
    let a = battle.add_combatant(SideId::new(0), fighter("Alpha", 50, 200, 60));
    let b = battle.add_combatant(SideId::new(1), fighter("Bravo", 50, 200, 50));
    battle.switch_in(a, 0);
    battle.switch_in(b, 0);
    (battle, a, b)
}

/// Two active combatants per side, as `[p1a, p1b, p2a, p2b]`.
pub fn doubles(speeds: [u32; 4], seed: u64) -> (Battle, [CombatantId; 4]) {
    let mut battle = Battle::new(Ruleset::default(), dex(), seed, 2);
    let names = ["Alpha", "Bravo", "Charlie", "Delta"];
    let mut ids = [CombatantId::default(); 4];
    for (i, (&name, &spe)) in names.iter().zip(speeds.iter()).enumerate() {
        let side = SideId::new((i / 2) as u8);
        ids[i] = battle.add_combatant(side, fighter(name, 50, 200, spe));
        battle.switch_in(ids[i], i % 2);
    }
    (battle, ids)
}

/// Run `move_id` from `user` at `target` with default options.
pub fn use_on(battle: &mut Battle, move_id: &str, user: CombatantId, target: CombatantId) -> bool {
    let loc = battle.get_target_loc(target, user);
    battle.run_move(&Id::new(move_id), user, loc, RunMoveOptions::default()).unwrap()
}
