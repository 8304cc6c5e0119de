//! Dance mirroring in a doubles battle.

mod common;

use battle_actions::core::{BoostId, Id};
use battle_actions::{LogEntry, RunMoveOptions};
use common::doubles;

fn give_dancer(battle: &mut battle_actions::Battle, ids: &[battle_actions::CombatantId]) {
    for &id in ids {
        battle.state[id].ability = Id::new("Dancer");
    }
}

fn activations(battle: &battle_actions::Battle) -> Vec<String> {
    battle
        .log
        .entries()
        .iter()
        .filter_map(|e| match e {
            LogEntry::Activate { who, effect, .. } if effect == "ability: Dancer" => Some(who.to_string()),
            _ => None,
        })
        .collect()
}

/// Test that dancers copy the dance slowest first.
#[test]
fn test_dancers_activate_in_speed_order() {
    // p1a dances; the others have speeds 65, 50 and 80.
    let (mut battle, [p1a, p1b, p2a, p2b]) = doubles([100, 65, 50, 80], 3);
    give_dancer(&mut battle, &[p1b, p2a, p2b]);

    assert_eq!(battle.dancers(p1a), vec![p2a, p1b, p2b]);
    assert!(battle.run_move(&Id::new("swordsdance"), p1a, 0, RunMoveOptions::default()).unwrap());

    assert_eq!(activations(&battle), vec!["p2a: Charlie", "p1b: Bravo", "p2b: Delta"]);
    for id in [p1a, p1b, p2a, p2b] {
        assert_eq!(battle.state[id].boosts.get(BoostId::Atk), 2, "{} should have danced once", battle.state[id].name);
    }
}

/// Test that mirrored dances cost no PP and are announced with their source.
#[test]
fn test_mirrored_dance_is_external() {
    let (mut battle, [p1a, p1b, _, _]) = doubles([100, 65, 50, 80], 3);
    give_dancer(&mut battle, &[p1b]);
    battle.run_move(&Id::new("swordsdance"), p1a, 0, RunMoveOptions::default()).unwrap();

    assert_eq!(battle.state[p1b].move_slot(&Id::new("swordsdance")).map(|s| s.pp), Some(20));
    assert_eq!(battle.state[p1a].move_slot(&Id::new("swordsdance")).map(|s| s.pp), Some(19));
    let mirrored = battle
        .log
        .lines()
        .into_iter()
        .find(|line| line.starts_with("|move|p1b: Bravo|Swords Dance|"))
        .expect("p1b should dance");
    assert!(mirrored.ends_with("|[from]ability: Dancer"), "got {}", mirrored);
}

/// Test that equal speeds fall back to the most recent ability holder.
#[test]
fn test_speed_tie_prefers_latest_ability() {
    let (mut battle, [p1a, p1b, p2a, _]) = doubles([100, 70, 70, 30], 3);
    give_dancer(&mut battle, &[p1b, p2a]);
    battle.state[p1b].ability_order = battle.state.next_ability_order();

    assert_eq!(battle.dancers(p1a), vec![p1b, p2a]);
}

/// Test that a failed dance is not mirrored.
#[test]
fn test_failed_dance_is_not_mirrored() {
    let (mut battle, [p1a, p1b, _, _]) = doubles([100, 65, 50, 80], 3);
    give_dancer(&mut battle, &[p1b]);
    battle.state[p1a].boosts.set(BoostId::Atk, 6);

    assert!(!battle.run_move(&Id::new("swordsdance"), p1a, 0, RunMoveOptions::default()).unwrap());
    assert!(activations(&battle).is_empty());
    assert_eq!(battle.state[p1b].boosts.get(BoostId::Atk), 0);
}
