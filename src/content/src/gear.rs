//src/content/src/gear.rs
use std::ops::Add;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// 装备槽位
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

/// 装备提供的修正值，全部可为负
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GearEffects {
    pub atk_dice: i32,
    pub def_dice: i32,
    pub atk_flat: i32,
    pub def_flat: i32,
    /// 加到所有技能的 MP 消耗
    pub mp_cost: i32,
    /// 加到所有技能的 CT
    pub ct: i32,
}

impl Add for GearEffects {
    type Output = GearEffects;

    fn add(self, rhs: GearEffects) -> GearEffects {
        GearEffects {
            atk_dice: self.atk_dice + rhs.atk_dice,
            def_dice: self.def_dice + rhs.def_dice,
            atk_flat: self.atk_flat + rhs.atk_flat,
            def_flat: self.def_flat + rhs.def_flat,
            mp_cost: self.mp_cost + rhs.mp_cost,
            ct: self.ct + rhs.ct,
        }
    }
}

/// 装备定义（equipment.json 的 `gear` 数组）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearDef {
    pub id: String,
    pub name: String,
    pub slot: EquipSlot,
    #[serde(default)]
    pub effects: GearEffects,
    #[serde(default)]
    pub desc: String,
}
