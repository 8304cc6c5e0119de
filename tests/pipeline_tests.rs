//! End-to-end tests for a single action: entry, targeting, accuracy and
//! the announcements a move makes on the way.

mod common;

use battle_actions::core::{Id, TurnResult};
use battle_actions::dex::Accuracy;
use battle_actions::{LogEntry, Ruleset, RunMoveOptions};
use common::{singles, use_on};

/// Test that a fixed-damage move logs its use, then the damage.
#[test]
fn test_fixed_damage_move_end_to_end() {
    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    assert!(use_on(&mut battle, "dragonrage", a, b));

    assert_eq!(battle.state[b].hp, 160);
    assert_eq!(
        battle.log.lines(),
        vec!["|move|p1a: Alpha|Dragon Rage|p2a: Bravo".to_string(), "|-damage|p2a: Bravo|160/200".to_string()]
    );
    assert_eq!(battle.state[a].move_this_turn_result, TurnResult::Succeeded);
    assert_eq!(battle.state[a].move_slot(&Id::new("dragonrage")).map(|s| s.pp), Some(19));
}

/// Test one-hit-KO accuracy against lower and higher level targets.
#[test]
fn test_ohko_accuracy_follows_level_gap() {
    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    battle.state[a].level = 55;
    let mut fissure = battle.get_active_move(&Id::new("fissure")).unwrap();

    assert_eq!(battle.move_accuracy(b, a, &mut fissure), Some(Accuracy::Percent(35)));
    assert_eq!(battle.move_accuracy(a, b, &mut fissure), None, "Higher level target must be untouchable");
}

/// Test that a landed one-hit KO empties the target and announces it.
#[test]
fn test_ohko_knocks_out() {
    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    battle.state[a].level = 100;
    battle.state[b].level = 30;
    // 30 + 70 level gap: always lands.
    assert!(use_on(&mut battle, "fissure", a, b));
    assert_eq!(battle.state[b].hp, 0);
    assert!(battle.log.entries().iter().any(|e| matches!(e, LogEntry::Ohko)));
}

/// Test the modern no-target announcement.
#[test]
fn test_no_target_fails_in_modern_rules() {
    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    battle.state[b].hp = 0;
    battle.state[b].fainted = true;

    assert!(!use_on(&mut battle, "dragonrage", a, b));
    let lines = battle.log.lines();
    assert!(lines[0].starts_with("|move|p1a: Alpha|Dragon Rage|"));
    assert!(lines[0].ends_with("[notarget]"), "Move line should carry [notarget], got {}", lines[0]);
    assert_eq!(lines.last().map(String::as_str), Some("|-fail|p1a: Alpha"));
}

/// Test that an override hook replaces the move actually used.
#[test]
fn test_override_action_swaps_the_move() {
    use battle_actions::{EffectRef, EventContext, Hook, HookEvent, HookResult, Relay};

    fn encore(_: &mut battle_actions::Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::Relay(Relay::Id(Id::new("doubleedge")))
    }

    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    battle.register_hook(Hook::new(HookEvent::OverrideAction, EffectRef::volatile("encore"), encore));
    battle.add_volatile(a, &Id::new("encore"), None, None);

    assert!(use_on(&mut battle, "dragonrage", a, b));
    assert_eq!(battle.state[b].hp, 140, "Double-Edge deals its fixed 60");
    assert_eq!(battle.state[a].last_move, Some(Id::new("doubleedge")));
}

/// Test that an external use runs the move without touching PP.
#[test]
fn test_external_use_keeps_pp() {
    let (mut battle, a, b) = singles(Ruleset::default(), 1);
    let loc = battle.get_target_loc(b, a);
    battle.run_move(&Id::new("dragonrage"), a, loc, RunMoveOptions::default().external()).unwrap();
    assert_eq!(battle.state[b].hp, 160);
    assert_eq!(battle.state[a].move_slot(&Id::new("dragonrage")).map(|s| s.pp), Some(20));
}
