// src/combat/src/lib.rs
//! Battle resolution: player actions, the delayed enemy reply and
//! experience from a won encounter.

use std::mem;

use content::{ContentTables, Element};
use dice::{GameRng, RollOptions};
use dungeon::Deck;
use hero::Player;
use serde::Serialize;
use thiserror::Error;

pub mod battle;
mod enemy;
mod item_use;
mod skill_cast;

pub use crate::battle::{BattleKind, BattleMods, BattleSession, EnemyState, PlayerStatus};

/// Combat configuration constants
pub mod constants {
    use dice::DiceExpr;

    pub const NORMAL_TURN_LIMIT: u32 = 10;
    pub const BOSS_TURN_LIMIT: u32 = 15;
    /// 1d6 + bonuses must reach this to escape
    pub const ESCAPE_THRESHOLD: i32 = 4;
    pub const BOSS_EXP_MULT: f64 = 1.6;
    pub const MIN_DAMAGE: i32 = 1;
    pub const WEAKNESS_MULT: i32 = 2;
    pub const LAST_STAND_MULT: i32 = 3;
    pub const DEFAULT_POISON: DiceExpr = DiceExpr::new(1, 0);
}

/// Why an action was declined. The battle state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum Rejection {
    #[error("wait for the current action to finish")]
    Locked,
    #[error("unknown skill {0:?}")]
    UnknownSkill(String),
    #[error("{0} is not equipped")]
    SkillNotEquipped(String),
    #[error("{name} is on cooldown ({ct} turns left)")]
    OnCooldown { name: String, ct: i32 },
    #[error("not enough MP for {name}: need {need}, have {have}")]
    NotEnoughMp { name: String, need: i32, have: i32 },
    #[error("{0} can only be used once per dive")]
    WinOnceUsed(String),
    #[error("unknown item {0:?}")]
    UnknownItem(String),
    #[error("{0} is not in the inventory")]
    ItemNotOwned(String),
    #[error("only one free item per enemy turn")]
    FreeItemUsed,
    #[error("{0}: there is no equipped skill to target")]
    NoSkillToTarget(String),
}

/// What the driver must do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ActionOutcome {
    Rejected(Rejection),
    /// The player may act again without an enemy reply.
    PlayerTurn,
    /// Schedule the enemy reply; `skip_ct` keeps the fresh cooldown of the cast skill.
    EnemyTurn { skip_ct: Option<String> },
    /// The item needs a target skill before it resolves.
    ChooseCtTarget { item_id: String, delta: u32 },
    Victory,
    Defeat,
    Escaped,
    TimedOut,
}

/// Combat result with logs
#[derive(Debug, Clone, PartialEq)]
pub struct CombatResult {
    /// Lines for the game log
    pub logs: Vec<String>,
    /// Text for the battle panel
    pub info: Vec<String>,
    pub outcome: ActionOutcome,
}

impl CombatResult {
    pub fn rejected(reason: Rejection) -> Self {
        Self {
            logs: Vec::new(),
            info: vec![reason.to_string()],
            outcome: ActionOutcome::Rejected(reason),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, ActionOutcome::Rejected(_))
    }
}

/// Player-side attack modifiers for one hit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttackOpts {
    pub element: Element,
    pub atk_dice_delta: i32,
    pub atk_flat_add: i32,
    pub mult: f64,
    pub final_mult: f64,
    pub min_die: Option<u32>,
    pub override_die: Option<u32>,
    /// Ignores dice and DEF entirely
    pub fixed: Option<i32>,
}

impl AttackOpts {
    pub fn with_element(element: Element) -> Self {
        Self {
            element,
            atk_dice_delta: 0,
            atk_flat_add: 0,
            mult: 1.0,
            final_mult: 1.0,
            min_die: None,
            override_die: None,
            fixed: None,
        }
    }
}

/// Borrowed view over everything one battle action touches.
pub struct Combat<'a> {
    pub battle: &'a mut BattleSession,
    pub player: &'a mut Player,
    pub content: &'a ContentTables,
    pub rng: &'a mut GameRng,
    /// Treasure deck for in-battle treasure effects
    pub treasure: &'a mut Deck<u32>,
    logs: Vec<String>,
    info: Vec<String>,
}

impl<'a> Combat<'a> {
    pub fn new(
        battle: &'a mut BattleSession,
        player: &'a mut Player,
        content: &'a ContentTables,
        rng: &'a mut GameRng,
        treasure: &'a mut Deck<u32>,
    ) -> Self {
        Self {
            battle,
            player,
            content,
            rng,
            treasure,
            logs: Vec::new(),
            info: Vec::new(),
        }
    }

    pub(crate) fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    pub(crate) fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    pub(crate) fn finish(&mut self, outcome: ActionOutcome) -> CombatResult {
        if matches!(outcome, ActionOutcome::PlayerTurn) {
            self.battle.locked = false;
        }
        CombatResult {
            logs: mem::take(&mut self.logs),
            info: mem::take(&mut self.info),
            outcome,
        }
    }

    pub fn atk_flat_in_battle(&self) -> i32 {
        self.player.atk_flat(self.content) + self.battle.event_atk_flat + self.battle.mods.atk_flat
    }

    pub fn def_flat_in_battle(&self) -> i32 {
        self.player.def_flat(self.content) + self.battle.event_def_flat + self.battle.mods.def_flat
    }

    fn is_weak(&self, element: Element) -> bool {
        element == self.battle.enemy.weakness
    }

    /// Last stand then weakness, applied to every damage source of the player.
    fn scale_damage(&self, mut dmg: i32, element: Element) -> i32 {
        if self.battle.status.hp1_triple && self.player.hp == 1 {
            dmg *= constants::LAST_STAND_MULT;
        }
        if self.is_weak(element) {
            dmg *= constants::WEAKNESS_MULT;
        }
        dmg
    }

    fn take_next_atk_flat(&mut self) -> i32 {
        let next = self.battle.status.next_atk_flat;
        if next > 0 {
            self.battle.status.next_atk_flat = 0;
            next
        } else {
            0
        }
    }

    /// One player hit against the enemy; returns the damage dealt.
    pub(crate) fn attack_once(&mut self, label: &str, opts: AttackOpts) -> i32 {
        let weak = self.is_weak(opts.element);

        if let Some(fixed) = opts.fixed {
            let dmg = self.scale_damage(fixed.max(constants::MIN_DAMAGE), opts.element);
            self.battle.enemy.take_damage(dmg);
            self.info(format!(
                "{label}: fixed {dmg}{} | enemy HP {}/{}",
                if weak { " (weakness x2)" } else { "" },
                self.battle.enemy.hp,
                self.battle.enemy.hp_max
            ));
            return dmg;
        }

        let atk_expr = self.player.effective_atk(self.content).adjust(opts.atk_dice_delta);
        let atk_roll = atk_expr.roll(
            &mut *self.rng,
            RollOptions {
                min_die: opts.min_die,
                override_die: opts.override_die,
            },
        );
        let def_roll = self.battle.enemy.def_expr.roll_plain(&mut *self.rng);

        let next = self.take_next_atk_flat();
        let flat = self.atk_flat_in_battle();
        let atk_val = atk_roll.total + flat + opts.atk_flat_add + next;
        let def_extra = self.battle.enemy.def_extra();
        let def_val = def_roll.total + def_extra;

        let mut dmg = (atk_val - def_val).max(constants::MIN_DAMAGE);
        dmg = (f64::from(dmg) * opts.mult).floor() as i32;
        dmg = (f64::from(dmg) * opts.final_mult).floor() as i32;
        dmg = self.scale_damage(dmg, opts.element);
        self.battle.enemy.take_damage(dmg);

        tracing::debug!(%atk_roll, %def_roll, atk_val, def_val, dmg, "player hit");
        self.info(format!(
            "{label}: ATK {atk_roll} +{flat}{}{} -> {atk_val} vs DEF {def_roll} {def_extra:+} -> {def_val} | {dmg} damage{} | enemy HP {}/{}",
            if opts.atk_flat_add != 0 { format!(" +{}", opts.atk_flat_add) } else { String::new() },
            if next > 0 { format!(" +{next} (next)") } else { String::new() },
            if weak { " (weakness x2)" } else { "" },
            self.battle.enemy.hp,
            self.battle.enemy.hp_max
        ));
        dmg
    }

    /// Plain attack with the effective ATK; consumes the staged element and flat bonus.
    pub fn normal_attack(&mut self) -> CombatResult {
        if self.battle.locked {
            return CombatResult::rejected(Rejection::Locked);
        }
        self.battle.locked = true;

        let element = self.battle.status.next_attack_element.take().unwrap_or_default();
        let dmg = self.attack_once("Attack", AttackOpts::with_element(element));
        self.log(format!(
            "{} attacks ({element}) for {dmg} / enemy HP {}/{}",
            self.player.id, self.battle.enemy.hp, self.battle.enemy.hp_max
        ));

        let outcome = self.proceed(None);
        self.finish(outcome)
    }

    /// 1d6 + job bonus + staged item bonus against the threshold.
    pub fn escape(&mut self) -> CombatResult {
        if self.battle.locked {
            return CombatResult::rejected(Rejection::Locked);
        }
        self.battle.locked = true;

        let roll = self.rng.d6() as i32;
        let job_bonus = self
            .content
            .job(&self.player.job)
            .map(|j| j.escape_bonus)
            .unwrap_or(0);
        let item_bonus = self.battle.status.escape_bonus_next;
        if item_bonus > 0 {
            self.battle.status.escape_bonus_next = 0;
        }
        let sum = roll + job_bonus + item_bonus;
        let ok = sum >= constants::ESCAPE_THRESHOLD;

        let line = format!(
            "Escape: 1d6={roll} +{job_bonus} (job){} = {sum} -> {}",
            if item_bonus > 0 { format!(" +{item_bonus} (item)") } else { String::new() },
            if ok { "success" } else { "failed" }
        );
        self.info(line.clone());
        self.log(format!("{} {line}", self.player.id));

        let outcome = if ok {
            ActionOutcome::Escaped
        } else {
            self.proceed(None)
        };
        self.finish(outcome)
    }

    /// Shared tail of every turn-consuming player action: win check,
    /// poison tick, then hand over to the enemy.
    pub(crate) fn proceed(&mut self, skip_ct: Option<String>) -> ActionOutcome {
        if !self.battle.enemy.is_alive() {
            self.battle.locked = false;
            return ActionOutcome::Victory;
        }

        if self.battle.enemy.poison_turns > 0 {
            let roll = self.battle.enemy.poison_expr.roll_plain(&mut *self.rng);
            self.battle.enemy.take_damage(roll.total.max(0));
            self.battle.enemy.poison_turns -= 1;
            self.info(format!(
                "Poison: {} takes {} ({roll}) | enemy HP {}/{}",
                self.battle.enemy.name, roll.total, self.battle.enemy.hp, self.battle.enemy.hp_max
            ));
            if !self.battle.enemy.is_alive() {
                self.battle.locked = false;
                return ActionOutcome::Victory;
            }
        }

        ActionOutcome::EnemyTurn { skip_ct }
    }
}

fn expected_stats(enemy: &EnemyState) -> f64 {
    f64::from(enemy.hp_max) + f64::from(enemy.mp) + enemy.atk_expr.expected() + enemy.def_expr.expected()
}

/// Base experience of the encounter, boss-scaled, at least 1.
pub fn exp_from_battle(battle: &BattleSession) -> u32 {
    let base = expected_stats(&battle.enemy) / 4.0;
    let mult = if battle.is_boss() { constants::BOSS_EXP_MULT } else { 1.0 };
    (base * mult).round().max(1.0) as u32
}

/// Experience actually awarded after the battle's multiplier, at least 1.
pub fn exp_gained(battle: &BattleSession) -> u32 {
    let scaled = f64::from(exp_from_battle(battle)) * battle.exp_mult;
    if scaled.is_finite() {
        scaled.round().max(1.0) as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests;
