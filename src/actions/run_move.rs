//! The action entry point: one combatant acting with one move.
//!
//! ## Flow
//!
//! 1. Resolve the target and let `OverrideAction` swap the move.
//! 2. `BeforeMove` and the move's own pre-move callback may stop the
//!    action.
//! 3. Deduct PP (or follow a move lock) unless the use is external.
//! 4. Spend the side's empowered move, then hand over to
//!    [`Battle::use_move`].
//! 5. `AfterMove`, then dance mirroring.

use crate::battle::Battle;
use crate::core::{CombatantId, EffectRef, Id, Result, TurnResult};
use crate::hooks::{HitResult, HookEvent, Relay};
use crate::log::LogEntry;

use super::{ActiveMove, Empowered};

/// Optional inputs to [`Battle::run_move`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMoveOptions {
    /// What made the combatant act, if not its own choice.
    pub source_effect: Option<EffectRef>,
    /// Use the move's Z or Max form.
    pub empowered: Option<Empowered>,
    /// Dispatched by an ability or another move: no PP, no lock, no
    /// mirroring.
    pub external: bool,
    /// Target a charging move locked onto earlier.
    pub original_target: Option<CombatantId>,
    pub prankster_boosted: bool,
}

impl RunMoveOptions {
    /// Set the source effect (builder pattern).
    #[must_use]
    pub fn with_source_effect(mut self, effect: EffectRef) -> Self {
        self.source_effect = Some(effect);
        self
    }

    /// Use the empowered form (builder pattern).
    #[must_use]
    pub fn with_empowered(mut self, form: Empowered) -> Self {
        self.empowered = Some(form);
        self
    }

    /// Mark as externally dispatched (builder pattern).
    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Set the locked-on target (builder pattern).
    #[must_use]
    pub fn with_original_target(mut self, target: CombatantId) -> Self {
        self.original_target = Some(target);
        self
    }

    #[must_use]
    pub fn prankster_boosted(mut self) -> Self {
        self.prankster_boosted = true;
        self
    }
}

impl Battle {
    /// The requested form, unless the side has already spent it.
    fn available_form(&self, user: CombatantId, requested: Option<Empowered>) -> Option<Empowered> {
        let combatant = &self.state[user];
        let side = self.state.side(combatant.side);
        let spent = match requested? {
            Empowered::Z => side.z_move_used(),
            Empowered::Max => side.max_move_used() && !combatant.has_volatile("dynamax"),
        };
        if spent {
            tracing::debug!(%user, ?requested, "empowered form already spent");
            return None;
        }
        requested
    }

    /// The effective move for `base` in the requested form.
    fn empowered_form(&self, base: &ActiveMove, user: CombatantId, form: Option<Empowered>) -> Result<ActiveMove> {
        match form {
            Some(Empowered::Z) => self.get_active_z_move(&base.data, user),
            Some(Empowered::Max) => self.get_active_max_move(&base.data),
            None => Ok(base.clone()),
        }
    }

    /// Run one action: `user` uses `move_id` aimed at `target_loc`.
    ///
    /// Returns whether the move accomplished anything. Errors only for data
    /// the battle cannot run, such as an unknown move id.
    pub fn run_move(&mut self, move_id: &Id, user: CombatantId, target_loc: i32, opts: RunMoveOptions) -> Result<bool> {
        let empowered = self.available_form(user, opts.empowered);
        let mut base = self.get_active_move(move_id)?;
        base.prankster_boosted = opts.prankster_boosted;
        let mut effective = self.empowered_form(&base, user, empowered)?;
        let mut target = self.get_target(user, &effective.data, target_loc, opts.original_target);

        if base.id != "struggle" && empowered.is_none() && !opts.external {
            let relay = self.run_move_event(HookEvent::OverrideAction, user, target, &mut effective, Relay::Id(base.id.clone()));
            if let Relay::Id(changed) = relay {
                if changed != base.id {
                    tracing::debug!(from = %base.id, to = %changed, "action overridden");
                    base = self.get_active_move(&changed)?;
                    base.prankster_boosted = opts.prankster_boosted;
                    effective = base.clone();
                    target = self.get_random_target(user, base.target);
                }
            }
        }

        effective.is_external = opts.external;
        base.is_external = opts.external;
        self.set_active_move(&effective, user, target);

        let will_try = self.run_move_event(HookEvent::BeforeMove, user, target, &mut effective, Relay::SUCCESS);
        if !will_try.is_truthy() {
            self.run_move_event(HookEvent::MoveAborted, user, target, &mut effective, Relay::SUCCESS);
            self.clear_active_move();
            self.state[user].move_this_turn_result =
                if will_try.as_result() == HitResult::Fail { TurnResult::Failed } else { TurnResult::NoChoice };
            return Ok(false);
        }

        // A truthy answer vetoes the move.
        let vetoed = self.single_move_event(
            HookEvent::BeforeMoveCallback,
            user,
            target,
            &mut effective,
            HitResult::NotAttempted,
        );
        if vetoed.is_truthy() {
            self.clear_active_move();
            self.state[user].move_this_turn_result = TurnResult::Failed;
            return Ok(false);
        }

        self.state[user].last_damage = 0;
        let mut source_effect = opts.source_effect.clone();
        if !opts.external {
            let locked = self.run_move_event(HookEvent::LockMove, user, None, &mut effective, Relay::SUCCESS);
            if matches!(locked, Relay::Id(_)) {
                source_effect = Some(EffectRef::condition("lockedmove"));
            } else if self.deduct_pp(user, &base.id, 1) == 0 && effective.id != "struggle" {
                tracing::debug!(%user, move_id = %effective.id, "no PP");
                let who = self.ident(user);
                self.log.push(LogEntry::Cant { who, reason: "nopp".to_string(), move_name: Some(effective.name.clone()) });
                self.clear_active_move();
                self.state[user].move_this_turn_result = TurnResult::Failed;
                return Ok(false);
            }
            self.move_used(user, &effective.id);
        }

        let no_lock = opts.external && !self.state[user].has_volatile("lockedmove");

        let side = self.state[user].side;
        match empowered {
            Some(Empowered::Z) => {
                let who = self.ident(user);
                self.log.push(LogEntry::ZPower { who });
                self.state.side_mut(side).mark_z_move_used();
            }
            Some(Empowered::Max) => self.state.side_mut(side).mark_max_move_used(),
            None => {}
        }

        let did_something = self.use_move(&mut base, user, target, source_effect, empowered)?;
        self.last_successful_move = did_something.then(|| base.id.clone());

        self.single_move_event(HookEvent::AfterMove, user, target, &mut base, Relay::SUCCESS);
        self.run_move_event(HookEvent::AfterMove, user, target, &mut base, Relay::SUCCESS);

        if base.flags.dance && did_something && !base.is_external {
            self.mirror_dance(&base.id, user, target)?;
        }

        if no_lock && self.state[user].has_volatile("lockedmove") {
            self.remove_volatile(user, "lockedmove");
        }
        self.clear_active_move();
        if !opts.external && self.faint_messages() {
            tracing::debug!(winner = ?self.state.winner, "battle over");
        }
        Ok(did_something)
    }

    /// Combatants that will mirror a dance by `user`, in activation order:
    /// slowest stored speed first, then the most recent ability holder.
    #[must_use]
    pub fn dancers(&self, user: CombatantId) -> Vec<CombatantId> {
        let mut dancers: Vec<CombatantId> = self
            .state
            .all_active()
            .into_iter()
            .filter(|&id| id != user)
            .filter(|&id| {
                let combatant = &self.state[id];
                !combatant.is_semi_invulnerable()
                    && self.dex.get_ability(&combatant.ability).is_some_and(|a| a.mirrors_dance)
            })
            .collect();
        dancers.sort_by(|&a, &b| {
            let (a, b) = (&self.state[a], &self.state[b]);
            a.stored_stats.spe.cmp(&b.stored_stats.spe).then(b.ability_order.cmp(&a.ability_order))
        });
        dancers
    }

    fn mirror_dance(&mut self, move_id: &Id, user: CombatantId, target: Option<CombatantId>) -> Result<()> {
        let dancers = self.dancers(user);
        tracing::debug!(?dancers, "dance mirrored");
        for dancer in dancers {
            if self.faint_messages() {
                break;
            }
            if self.state[dancer].fainted {
                continue;
            }
            let ability = EffectRef::ability(self.state[dancer].ability.clone());
            let who = self.ident(dancer);
            let effect = format!("ability: {}", self.effect_name(&ability));
            self.log.push(LogEntry::Activate { who, effect, attrs: Vec::new() });

            let dancer_side = self.state[dancer].side;
            let dancers_target = match target {
                Some(t) if self.state[t].side != dancer_side && self.state[user].side == dancer_side => t,
                _ => user,
            };
            let loc = self.get_target_loc(dancers_target, dancer);
            self.run_move(move_id, dancer, loc, RunMoveOptions::default().external().with_source_effect(ability))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Combatant, Ruleset, SideId, StatTable};
    use crate::dex::{Dex, FixedDamage, MoveData};
    use crate::hooks::{EventContext, Hook, HookResult};

    fn setup() -> (Battle, CombatantId, CombatantId) {
        let mut dex = Dex::new();
        dex.register_move(
            MoveData::special("Sonic Boom", "Normal", 0).with_fixed_damage(FixedDamage::Amount(20)).with_pp(1),
        );
        dex.register_move(MoveData::physical("Struggle", "Normal", 50).with_fixed_damage(FixedDamage::Amount(10)));
        let mut battle = Battle::new(Ruleset::default(), dex, 29, 1);
        let a = battle.add_combatant(
            SideId::new(0),
            Combatant::new("A", 50, 100, StatTable::uniform(50)).with_move("sonicboom", 1),
        );
        let b = battle.add_combatant(SideId::new(1), Combatant::new("B", 50, 100, StatTable::uniform(50)));
        battle.switch_in(a, 0);
        battle.switch_in(b, 0);
        (battle, a, b)
    }

    fn paralyzed(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::fail()
    }

    fn flinched(_: &mut Battle, _: &mut EventContext<'_>) -> HookResult {
        HookResult::silent()
    }

    #[test]
    fn test_pp_is_spent_once() {
        let (mut battle, a, b) = setup();
        assert!(battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default()).unwrap());
        assert_eq!(battle.state[b].hp, 80);
        assert_eq!(battle.state[a].move_slot(&Id::new("sonicboom")).map(|s| s.pp), Some(0));
        assert_eq!(battle.last_successful_move, Some(Id::new("sonicboom")));
        assert_eq!(battle.state[a].last_move, Some(Id::new("sonicboom")));
    }

    #[test]
    fn test_out_of_pp() {
        let (mut battle, a, b) = setup();
        battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default()).unwrap();
        let from = battle.log.len();
        assert!(!battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default()).unwrap());
        assert_eq!(battle.log.since(from)[0].to_string(), "|cant|p1a: A|nopp|Sonic Boom");
        assert_eq!(battle.state[b].hp, 80);
        assert_eq!(battle.state[a].move_this_turn_result, TurnResult::Failed);
    }

    #[test]
    fn test_external_use_costs_no_pp() {
        let (mut battle, a, b) = setup();
        battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default().external()).unwrap();
        assert_eq!(battle.state[a].move_slot(&Id::new("sonicboom")).map(|s| s.pp), Some(1));
        assert_eq!(battle.state[b].hp, 80);
        assert_eq!(battle.state[a].last_move, None);
    }

    #[test]
    fn test_struggle_without_slot() {
        let (mut battle, a, b) = setup();
        assert!(battle.run_move(&Id::new("struggle"), a, 1, RunMoveOptions::default()).unwrap());
        assert_eq!(battle.state[b].hp, 90);
    }

    #[test]
    fn test_before_move_outcomes() {
        let (mut battle, a, _) = setup();
        let hook = battle.register_hook(Hook::new(HookEvent::BeforeMove, EffectRef::status("par"), paralyzed));
        battle.state[a].status = Some(Id::new("par"));
        assert!(!battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default()).unwrap());
        assert_eq!(battle.state[a].move_this_turn_result, TurnResult::Failed);

        battle.hooks.unregister(hook);
        battle.register_hook(Hook::new(HookEvent::BeforeMove, EffectRef::status("par"), flinched));
        assert!(!battle.run_move(&Id::new("sonicboom"), a, 1, RunMoveOptions::default()).unwrap());
        assert_eq!(battle.state[a].move_this_turn_result, TurnResult::NoChoice);
        assert!(battle.log.is_empty());
    }

    #[test]
    fn test_unknown_move() {
        let (mut battle, a, _) = setup();
        assert!(battle.run_move(&Id::new("nosuchmove"), a, 1, RunMoveOptions::default()).is_err());
    }
}
