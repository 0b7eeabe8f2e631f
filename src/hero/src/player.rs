// src/hero/src/player.rs
use content::{ContentTables, EquipSlot, GearEffects, JobDef, SkillDef};
use dice::DiceExpr;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::equipment::{EquipError, Equipment};
use crate::loadout::SkillLoadout;

/// 新装备的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearPlacement {
    Equipped(EquipSlot),
    Bagged,
}

/// 玩家（每个座位一个）
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: String,
    pub job: String,
    pub pos: usize,
    pub depth: u32,
    pub level: u32,
    pub exp: u32,
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub atk_expr: DiceExpr,
    pub def_expr: DiceExpr,
    /// 成长分配的骰子数
    pub atk_dice_bonus: i32,
    pub def_dice_bonus: i32,
    pub atk_flat_bonus: i32,
    pub def_flat_bonus: i32,
    /// 未分配的成长骰
    pub growth_dice: u32,
    /// 已存入的金币，不会丢失
    pub bank_gold: u32,
    /// 背包里的财宝，死亡时全部丢失
    pub bag: Vec<u32>,
    pub items: Vec<String>,
    pub equipment: Equipment,
    pub gear_bag: Vec<String>,
    pub skills: SkillLoadout,
    /// 撤退后跳过下一次格子效果
    pub skip_next_tile: bool,
    /// 事件给下一场战斗的临时修正
    pub next_battle_atk_mod: i32,
    pub next_battle_def_mod: i32,
    /// 本次下潜是否已用过必胜技能
    pub win_once_used: bool,
}

impl Player {
    /// 按职业掷初始 HP/MP；技能、财宝和装备由会话发放
    pub fn new<R: Rng + ?Sized>(id: impl Into<String>, job: &JobDef, rng: &mut R) -> Self {
        let hp = job.base.hp.roll_plain(rng).total.max(1);
        let mp = job.base.mp.roll_plain(rng).total.max(0);
        let id = id.into();
        debug!(player = %id, job = %job.id, hp, mp, "player created");

        Self {
            id,
            job: job.id.clone(),
            pos: 0,
            depth: 1,
            level: 1,
            exp: 0,
            hp,
            hp_max: hp,
            mp,
            mp_max: mp,
            atk_expr: job.base.atk,
            def_expr: job.base.def,
            atk_dice_bonus: 0,
            def_dice_bonus: 0,
            atk_flat_bonus: 0,
            def_flat_bonus: 0,
            growth_dice: 0,
            bank_gold: 0,
            bag: Vec::new(),
            items: Vec::new(),
            equipment: Equipment::default(),
            gear_bag: Vec::new(),
            skills: SkillLoadout::default(),
            skip_next_tile: false,
            next_battle_atk_mod: 0,
            next_battle_def_mod: 0,
            win_once_used: false,
        }
    }

    pub fn gear_totals(&self, content: &ContentTables) -> GearEffects {
        self.equipment.totals(content)
    }

    /// 基础 ATK + 成长骰 + 装备骰
    pub fn effective_atk(&self, content: &ContentTables) -> DiceExpr {
        self.atk_expr
            .adjust(self.atk_dice_bonus + self.gear_totals(content).atk_dice)
    }

    pub fn effective_def(&self, content: &ContentTables) -> DiceExpr {
        self.def_expr
            .adjust(self.def_dice_bonus + self.gear_totals(content).def_dice)
    }

    /// 战斗外的 ATK 固定加值
    pub fn atk_flat(&self, content: &ContentTables) -> i32 {
        self.atk_flat_bonus + self.gear_totals(content).atk_flat
    }

    pub fn def_flat(&self, content: &ContentTables) -> i32 {
        self.def_flat_bonus + self.gear_totals(content).def_flat
    }

    /// 装备修正后的 MP 消耗，下限 0
    pub fn skill_mp_cost(&self, content: &ContentTables, skill: &SkillDef) -> i32 {
        let dice = self.effective_atk(content).count();
        (skill.mp_cost.raw(dice) + self.gear_totals(content).mp_cost).max(0)
    }

    /// 装备修正后的 CT，下限 0
    pub fn skill_ct(&self, content: &ContentTables, skill: &SkillDef) -> i32 {
        (skill.ct + self.gear_totals(content).ct).max(0)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// 返回实际回复量
    pub fn heal_hp(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.hp_max);
        self.hp - before
    }

    pub fn heal_mp(&mut self, amount: i32) -> i32 {
        let before = self.mp;
        self.mp = (self.mp + amount.max(0)).min(self.mp_max);
        self.mp - before
    }

    /// HP 下限 0
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }

    pub fn spend_mp(&mut self, amount: i32) {
        self.mp = (self.mp - amount.max(0)).max(0);
    }

    pub fn bag_value(&self) -> u32 {
        self.bag.iter().sum()
    }

    /// 排名用：存款 + 背包
    pub fn total_wealth(&self) -> u32 {
        self.bank_gold + self.bag_value()
    }

    /// 背包财宝全部存入，返回存入金额
    pub fn bank_bag(&mut self) -> u32 {
        let sum = self.bag_value();
        self.bank_gold += sum;
        self.bag.clear();
        sum
    }

    /// 一次下潜结束：回到起点、深度 1、CT 清零、必胜标记复位
    pub fn reset_dive(&mut self) {
        self.pos = 0;
        self.depth = 1;
        self.win_once_used = false;
        self.skills.reset_all();
    }

    /// 死亡：背包财宝丢失，HP/MP 回满
    pub fn die(&mut self) {
        self.bag.clear();
        self.reset_dive();
        self.hp = self.hp_max;
        self.mp = self.mp_max;
    }

    /// 最便宜的一件背包财宝的下标
    pub fn lowest_treasure_index(&self) -> Option<usize> {
        self.bag
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| **v)
            .map(|(i, _)| i)
    }

    pub fn remove_lowest_treasure(&mut self) -> Option<u32> {
        self.lowest_treasure_index().map(|i| self.bag.remove(i))
    }

    /// 对应槽位为空则自动装备，否则放进装备袋
    pub fn add_gear(&mut self, content: &ContentTables, gear_id: &str) -> Result<GearPlacement, EquipError> {
        let gear = content
            .gear(gear_id)
            .ok_or_else(|| EquipError::UnknownGear(gear_id.to_string()))?;
        if self.equipment.is_free(gear.slot) {
            self.equipment.put(gear.slot, gear.id.clone());
            Ok(GearPlacement::Equipped(gear.slot))
        } else {
            self.gear_bag.push(gear.id.clone());
            Ok(GearPlacement::Bagged)
        }
    }

    /// 从装备袋装备；原装备回到袋中。返回换下的装备
    pub fn equip_from_bag(&mut self, content: &ContentTables, index: usize) -> Result<Option<String>, EquipError> {
        let gear_id = self.gear_bag.get(index).ok_or(EquipError::InvalidIndex(index))?;
        let slot = content
            .gear(gear_id)
            .map(|g| g.slot)
            .ok_or_else(|| EquipError::UnknownGear(gear_id.clone()))?;

        let gear_id = self.gear_bag.remove(index);
        let old = self.equipment.put(slot, gear_id);
        if let Some(old) = &old {
            self.gear_bag.push(old.clone());
        }
        Ok(old)
    }

    /// 卸下到装备袋
    pub fn unequip(&mut self, slot: EquipSlot) -> Result<String, EquipError> {
        let gear_id = self.equipment.take(slot).ok_or(EquipError::EmptySlot(slot))?;
        self.gear_bag.push(gear_id.clone());
        Ok(gear_id)
    }
}
