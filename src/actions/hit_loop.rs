//! The hit loop: one to N consecutive hits against the surviving targets.
//!
//! Per-target damage stays index-aligned with the target list for the
//! whole loop. Each entry holds the damage of the most recent hit, which is
//! what counter-style effects read; the running total across every hit
//! lives on the active move for recoil.

use crate::battle::Battle;
use crate::core::{CombatantId, EffectKind, EffectRef, StruggleRecoil};
use crate::dex::MultiHit;
use crate::hooks::{HitResult, HookEvent, Relay};
use crate::log::LogEntry;

use super::{ActiveMove, HitData, TargetSlot};

/// Recoil owed for `dealt` total damage at `numerator / denominator` of it.
///
/// Rounds half up and never drops below 1.
///
/// ```
/// use battle_actions::actions::calc_recoil_damage;
///
/// assert_eq!(calc_recoil_damage(100, (1, 3)), 33);
/// assert_eq!(calc_recoil_damage(1, (1, 4)), 1);
/// ```
#[must_use]
pub fn calc_recoil_damage(dealt: u32, (numerator, denominator): (u32, u32)) -> u32 {
    if denominator == 0 {
        return 1;
    }
    let recoil = (f64::from(dealt) * f64::from(numerator) / f64::from(denominator)).round() as u32;
    recoil.max(1)
}

impl Battle {
    /// Draw how many times a move hits this use.
    ///
    /// The two-to-five case samples the ruleset's weighted table; any
    /// other range is uniform.
    pub fn sample_hit_count(&mut self, multi_hit: Option<MultiHit>) -> u32 {
        match multi_hit {
            None => 1,
            Some(MultiHit::Fixed(n)) => u32::from(n.max(1)),
            Some(MultiHit::Range(2, 5)) => {
                let table = self.ruleset.multi_hit_table.clone();
                self.rng.sample(&table).map_or(2, |&n| u32::from(n))
            }
            Some(MultiHit::Range(low, high)) => {
                self.rng.random_range(u32::from(low), u32::from(high) + 1).max(1)
            }
        }
    }

    fn is_sleep_usable(&self, active_move: &ActiveMove) -> bool {
        if active_move.sleep_usable {
            return true;
        }
        active_move
            .source_effect
            .as_ref()
            .filter(|effect| effect.kind == EffectKind::Move)
            .and_then(|effect| self.dex.get_move(&effect.id))
            .is_some_and(|caller| caller.sleep_usable)
    }

    /// Hit every surviving target once per hit of the move.
    pub fn hit_step_move_hit_loop(
        &mut self,
        targets: &[CombatantId],
        user: CombatantId,
        active_move: &mut ActiveMove,
    ) -> Vec<HitResult> {
        let mut damage = vec![HitResult::Damage(0); targets.len()];
        active_move.total_damage = 0;
        self.state[user].last_damage = 0;

        let hits = self.sample_hit_count(active_move.multi_hit);
        let sleep_usable = self.is_sleep_usable(active_move);
        let mut null_damage = true;
        let mut last_slots: Vec<TargetSlot> = targets.iter().map(|&t| TargetSlot::Live(t)).collect();

        let mut hit = 1;
        while hit <= hits {
            if damage.iter().any(|d| d.is_fail()) {
                break;
            }
            if hit > 1 && self.state[user].has_status("slp") && !sleep_usable {
                break;
            }
            if targets.iter().all(|&t| self.state[t].hp == 0) {
                break;
            }
            active_move.hit = hit;

            let per_hit_target = active_move.smart_target && targets.len() > 1;
            let hit_index = (hit - 1) as usize;
            let slots: Vec<TargetSlot> = if per_hit_target {
                match targets.get(hit_index) {
                    Some(&t) => vec![TargetSlot::Live(t)],
                    None => break,
                }
            } else {
                targets.iter().map(|&t| TargetSlot::Live(t)).collect()
            };

            if let Some(TargetSlot::Live(first)) = slots.first().copied() {
                if active_move.smart_target_declared {
                    let ident = self.ident(first);
                    if hit > 1 {
                        let entry = LogEntry::Anim {
                            user: self.ident(user),
                            move_name: active_move.name.clone(),
                            target: ident,
                        };
                        self.log.push(entry);
                    } else {
                        self.log.retarget_last_move(ident);
                    }
                }
                if active_move.multi_accuracy && hit > 1 {
                    let landed = match self.move_accuracy(first, user, active_move) {
                        Some(accuracy) => self.roll_accuracy(first, user, active_move, accuracy),
                        None => false,
                    };
                    if !landed {
                        break;
                    }
                }
            }

            let (move_damage, slots) = self.spread_move_hit(slots, user, active_move, &HitData::Primary, false, false);
            if move_damage.iter().all(|d| d.is_fail()) {
                break;
            }
            null_damage = false;

            for (i, result) in move_damage.iter().enumerate() {
                let index = if per_hit_target { hit_index } else { i };
                let dealt = result.damage_or_zero();
                if let Some(entry) = damage.get_mut(index) {
                    *entry = HitResult::Damage(dealt);
                }
                active_move.total_damage += dealt;
            }
            if !per_hit_target {
                last_slots = slots;
            }

            if active_move.mind_blown_recoil {
                let recoil = (f64::from(self.state[user].maxhp) / 2.0).round() as u32;
                let effect = EffectRef::condition(active_move.id.clone());
                self.damage(recoil, user, Some(user), Some(effect));
                active_move.mind_blown_recoil = false;
            }

            if self.state.ended {
                tracing::debug!(move_id = %active_move.id, hit, "battle ended mid-move");
                hit += 1;
                break;
            }
            if self.state[user].hp == 0 && targets.len() == 1 {
                hit += 1;
                break;
            }
            hit += 1;
        }

        // `hit` is one past the number of hits that landed.
        if hit == 1 || null_damage {
            return vec![HitResult::Fail; targets.len()];
        }
        let hits_landed = hit - 1;

        if active_move.multi_hit.is_some() && !active_move.smart_target_declared {
            let target = self.ident(targets[0]);
            self.log.push(LogEntry::HitCount { target, count: hits_landed });
        }

        if let Some(ratio) = active_move.recoil {
            if active_move.total_damage > 0 {
                let maxhp = self.state[user].maxhp;
                let hp_before = self.state[user].hp;
                let recoil = calc_recoil_damage(active_move.total_damage, ratio);
                self.damage(recoil, user, Some(user), Some(EffectRef::condition("recoil")));
                let hp = self.state[user].hp;
                if hp > 0 && hp <= maxhp / 2 && hp_before > maxhp / 2 {
                    self.emergency_exit(user, Some(user));
                }
            }
        }

        if active_move.struggle_recoil {
            let combatant = &self.state[user];
            let recoil = match self.ruleset.struggle_recoil {
                StruggleRecoil::QuarterBaseMaxHpRounded => {
                    ((f64::from(combatant.base_maxhp) / 4.0).round() as u32).max(1)
                }
                StruggleRecoil::QuarterMaxHpFloor => combatant.maxhp / 4,
            };
            self.direct_damage(recoil, user, Some(user), Some(EffectRef::condition("strugglerecoil")));
        }

        if active_move.smart_target_declared {
            last_slots = targets.iter().map(|&t| TargetSlot::Live(t)).collect();
        }
        for (i, slot) in last_slots.iter().enumerate() {
            if let TargetSlot::Live(target) = *slot {
                if target != user {
                    self.got_attacked(target, &active_move.id, damage[i], user);
                }
            }
        }

        if active_move.ohko.is_some() && self.state[targets[0]].hp == 0 {
            self.log.push(LogEntry::Ohko);
        }

        if !damage.iter().any(|d| d.keeps_target()) {
            return damage;
        }

        if !active_move.negate_secondary {
            let live: Vec<CombatantId> = last_slots.iter().filter_map(|s| s.live()).collect();
            if let Some(&first) = live.first() {
                self.single_move_event(HookEvent::AfterMoveSecondary, first, Some(user), active_move, Relay::SUCCESS);
            }
            for &target in &live {
                self.run_move_event(HookEvent::AfterMoveSecondary, target, Some(user), active_move, Relay::SUCCESS);
            }

            for (i, &target) in targets.iter().enumerate() {
                let current = if targets.len() == 1 { active_move.total_damage } else { damage[i].damage_or_zero() };
                if self.state[target].hp > 0 && self.state[target].crossed_half_hp(current) {
                    self.emergency_exit(target, Some(user));
                }
            }
        }

        tracing::debug!(move_id = %active_move.id, hits = hits_landed, total = active_move.total_damage, "hit loop finished");
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BattleRng, Ruleset};
    use crate::dex::Dex;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_recoil_rounding() {
        assert_eq!(calc_recoil_damage(100, (33, 100)), 33);
        assert_eq!(calc_recoil_damage(50, (1, 4)), 13);
        assert_eq!(calc_recoil_damage(0, (1, 3)), 1);
        assert_eq!(calc_recoil_damage(90, (1, 2)), 45);
    }

    #[test]
    fn test_fixed_and_single_counts() {
        let mut battle = Battle::new(Ruleset::default(), Dex::new(), 1, 1);
        assert_eq!(battle.sample_hit_count(None), 1);
        assert_eq!(battle.sample_hit_count(Some(MultiHit::Fixed(3))), 3);
        for _ in 0..100 {
            let n = battle.sample_hit_count(Some(MultiHit::Range(1, 10)));
            assert!((1..=10).contains(&n));
        }
    }

    #[test]
    fn test_two_to_five_is_weighted() {
        let mut battle = Battle::new(Ruleset::gen(9), Dex::new(), 99, 1);
        let mut counts: FxHashMap<u32, u32> = FxHashMap::default();
        for _ in 0..10_000 {
            *counts.entry(battle.sample_hit_count(Some(MultiHit::Range(2, 5)))).or_default() += 1;
        }
        let freq = |n: u32| counts.get(&n).copied().unwrap_or(0);
        assert!(freq(2) > freq(5));
        assert!(freq(2) > freq(4) && freq(3) > freq(4));
        assert_eq!(counts.keys().filter(|n| !(2..=5).contains(*n)).count(), 0);
    }

    #[test]
    fn test_two_to_five_draws_from_table() {
        for ruleset in [Ruleset::gen(9), Ruleset::gen(4)] {
            let table = ruleset.multi_hit_table.clone();
            let mut battle = Battle::new(ruleset, Dex::new(), 42, 1);
            let mut mirror = BattleRng::new(42);
            for _ in 0..500 {
                let expected = u32::from(table[mirror.random(table.len() as u32) as usize]);
                assert_eq!(battle.sample_hit_count(Some(MultiHit::Range(2, 5))), expected);
            }
        }

        let mut battle = Battle::new(Ruleset::default().with_multi_hit_table(vec![4]), Dex::new(), 3, 1);
        for _ in 0..20 {
            assert_eq!(battle.sample_hit_count(Some(MultiHit::Range(2, 5))), 4);
        }
    }

    #[test]
    fn test_legacy_table() {
        let mut battle = Battle::new(Ruleset::gen(3), Dex::new(), 5, 1);
        let mut twos = 0;
        for _ in 0..8_000 {
            if battle.sample_hit_count(Some(MultiHit::Range(2, 5))) == 2 {
                twos += 1;
            }
        }
        // 3 in 8.
        assert!((2_700..3_300).contains(&twos), "got {}", twos);
    }
}
