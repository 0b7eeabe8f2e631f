// src/combat/src/battle.rs
//! 战斗会话：一次遭遇从开始到结束的全部状态

use content::{Element, MonsterDef};
use dice::DiceExpr;
use serde::Serialize;
use strum::Display;

use crate::constants;

/// 遭遇类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BattleKind {
    Normal,
    Boss,
}

impl BattleKind {
    pub fn turn_limit(self) -> u32 {
        match self {
            BattleKind::Normal => constants::NORMAL_TURN_LIMIT,
            BattleKind::Boss => constants::BOSS_TURN_LIMIT,
        }
    }
}

/// 敌人快照（HP 可变，其余来自内容表）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyState {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub atk_expr: DiceExpr,
    pub def_expr: DiceExpr,
    pub weakness: Element,
    /// DEF 临时修正及剩余回合
    pub temp_def_flat: i32,
    pub temp_def_turns: u32,
    pub poison_turns: u32,
    pub poison_expr: DiceExpr,
}

impl EnemyState {
    pub fn from_def(def: &MonsterDef) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            hp: def.hp.max(1),
            hp_max: def.hp.max(1),
            mp: def.mp,
            atk_expr: def.atk_expr,
            def_expr: def.def_expr,
            weakness: def.weakness,
            temp_def_flat: 0,
            temp_def_turns: 0,
            poison_turns: 0,
            poison_expr: constants::DEFAULT_POISON,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// HP 下限 0
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// 生效中的 DEF 修正
    pub fn def_extra(&self) -> i32 {
        if self.temp_def_turns > 0 {
            self.temp_def_flat
        } else {
            0
        }
    }

    /// 覆盖当前 DEF 修正
    pub fn debuff_def(&mut self, delta: i32, turns: u32) {
        self.temp_def_flat = delta;
        self.temp_def_turns = turns;
    }

    pub fn tick_temp(&mut self) {
        if self.temp_def_turns > 0 {
            self.temp_def_turns -= 1;
            if self.temp_def_turns == 0 {
                self.temp_def_flat = 0;
            }
        }
    }

    /// 回合数取较大值；表达式只在给出时覆盖
    pub fn apply_poison(&mut self, turns: u32, expr: Option<DiceExpr>) {
        self.poison_turns = self.poison_turns.max(turns);
        if let Some(expr) = expr {
            self.poison_expr = expr;
        }
    }
}

/// 整场战斗有效的固定加值（技能给的）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BattleMods {
    pub atk_flat: i32,
    pub def_flat: i32,
}

/// 玩家在战斗中的临时状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStatus {
    pub evade_turns: u32,
    /// 下一次受到的伤害减少
    pub next_damage_minus: i32,
    /// 下一次敌人攻击时额外的 DEF 骰
    pub def_dice_this_turn: u32,
    /// HP 恰好为 1 时伤害 ×3
    pub hp1_triple: bool,
    pub escape_bonus_next: i32,
    pub next_attack_element: Option<Element>,
    pub next_atk_flat: i32,
}

impl PlayerStatus {
    /// 技能版净化
    pub fn cleanse_guards(&mut self) {
        self.evade_turns = 0;
        self.next_damage_minus = 0;
        self.def_dice_this_turn = 0;
    }

    /// 道具版净化，连一次性加成一起清掉
    pub fn cleanse_all(&mut self) {
        self.cleanse_guards();
        self.escape_bonus_next = 0;
        self.next_attack_element = None;
        self.next_atk_flat = 0;
    }
}

/// 一次遭遇的会话
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleSession {
    pub kind: BattleKind,
    pub enemy: EnemyState,
    /// 从 1 开始
    pub turn: u32,
    pub turn_limit: u32,
    /// 行动结算期间拒绝新的行动
    pub locked: bool,
    /// 本敌方回合内是否已用过自由道具
    pub free_item_used: bool,
    /// 事件带入的本场修正
    pub event_atk_flat: i32,
    pub event_def_flat: i32,
    pub mods: BattleMods,
    pub status: PlayerStatus,
    pub exp_mult: f64,
    pub last_damage_taken: i32,
}

impl BattleSession {
    pub fn new(kind: BattleKind, enemy: &MonsterDef, event_atk_flat: i32, event_def_flat: i32) -> Self {
        Self {
            kind,
            enemy: EnemyState::from_def(enemy),
            turn: 1,
            turn_limit: kind.turn_limit(),
            locked: false,
            free_item_used: false,
            event_atk_flat,
            event_def_flat,
            mods: BattleMods::default(),
            status: PlayerStatus::default(),
            exp_mult: 1.0,
            last_damage_taken: 0,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.kind == BattleKind::Boss
    }
}
