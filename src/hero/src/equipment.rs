// src/hero/src/equipment.rs
use content::{ContentTables, EquipSlot, GearEffects};
use serde::Serialize;
use strum::IntoEnumIterator;
use thiserror::Error;

/// 装备相关错误，引擎层会把它降级为提示信息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("no equipment with id {0:?}")]
    UnknownGear(String),
    #[error("gear bag has no entry {0}")]
    InvalidIndex(usize),
    #[error("nothing equipped in the {0} slot")]
    EmptySlot(EquipSlot),
}

/// 三个装备槽，每槽至多一件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Equipment {
    weapon: Option<String>,
    armor: Option<String>,
    accessory: Option<String>,
}

impl Equipment {
    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<String> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Accessory => &mut self.accessory,
        }
    }

    pub fn get(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_deref(),
            EquipSlot::Armor => self.armor.as_deref(),
            EquipSlot::Accessory => self.accessory.as_deref(),
        }
    }

    /// 放入新装备，返回被替换下来的那件
    pub fn put(&mut self, slot: EquipSlot, gear_id: String) -> Option<String> {
        self.slot_mut(slot).replace(gear_id)
    }

    pub fn take(&mut self, slot: EquipSlot) -> Option<String> {
        self.slot_mut(slot).take()
    }

    pub fn is_free(&self, slot: EquipSlot) -> bool {
        self.get(slot).is_none()
    }

    /// 已占用的槽位（固定顺序：武器、防具、饰品）
    pub fn occupied(&self) -> Vec<EquipSlot> {
        EquipSlot::iter().filter(|s| !self.is_free(*s)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &str)> {
        EquipSlot::iter().filter_map(|s| self.get(s).map(|id| (s, id)))
    }

    /// 所有已装备物品的修正合计；查不到的 id 忽略
    pub fn totals(&self, content: &ContentTables) -> GearEffects {
        self.iter()
            .filter_map(|(_, id)| content.gear(id))
            .fold(GearEffects::default(), |acc, g| acc + g.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_returns_previous_piece() {
        let mut eq = Equipment::default();
        assert_eq!(eq.put(EquipSlot::Weapon, "bronze_sword".into()), None);
        assert_eq!(
            eq.put(EquipSlot::Weapon, "war_axe".into()),
            Some("bronze_sword".to_string())
        );
        assert_eq!(eq.get(EquipSlot::Weapon), Some("war_axe"));
        assert_eq!(eq.occupied(), vec![EquipSlot::Weapon]);
    }

    #[test]
    fn test_totals_sum_equipped_gear() {
        let content = ContentTables::builtin().unwrap();
        let mut eq = Equipment::default();
        eq.put(EquipSlot::Weapon, "war_axe".into());
        eq.put(EquipSlot::Accessory, "quick_ring".into());
        let totals = eq.totals(&content);
        assert_eq!(totals.atk_flat, 3);
        assert_eq!(totals.ct, 0);
    }
}
