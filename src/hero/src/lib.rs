// src/hero/src/lib.rs
//! 玩家实体：属性、装备、技能栏与成长

mod equipment;
mod loadout;
mod player;
pub mod progression;

pub use self::{
    equipment::{EquipError, Equipment},
    loadout::{MAX_EQUIPPED_SKILLS, SkillLoadout},
    player::{GearPlacement, Player},
    progression::{GrowthChoice, GrowthResult},
};
