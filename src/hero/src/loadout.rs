// src/hero/src/loadout.rs
use std::collections::BTreeMap;

use serde::Serialize;

/// 同时装备的技能上限
pub const MAX_EQUIPPED_SKILLS: usize = 3;

/// 已装备技能及各自的 CT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillLoadout {
    equipped: Vec<String>,
    cooldowns: BTreeMap<String, i32>,
}

impl SkillLoadout {
    pub fn equipped(&self) -> &[String] {
        &self.equipped
    }

    pub fn len(&self) -> usize {
        self.equipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipped.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.equipped.len() >= MAX_EQUIPPED_SKILLS
    }

    pub fn contains(&self, id: &str) -> bool {
        self.equipped.iter().any(|s| s == id)
    }

    /// 空位装备，CT 为 0
    pub fn equip(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.is_full() || self.contains(&id) {
            return false;
        }
        self.cooldowns.insert(id.clone(), 0);
        self.equipped.push(id);
        true
    }

    /// 原位替换；旧技能的 CT 记录一并删除
    pub fn replace(&mut self, old: &str, new: impl Into<String>) -> bool {
        let new = new.into();
        if self.contains(&new) {
            return false;
        }
        let Some(slot) = self.equipped.iter_mut().find(|s| *s == old) else {
            return false;
        };
        *slot = new.clone();
        self.cooldowns.remove(old);
        self.cooldowns.insert(new, 0);
        true
    }

    pub fn cooldown(&self, id: &str) -> i32 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    pub fn set_cooldown(&mut self, id: &str, ct: i32) {
        if self.contains(id) {
            self.cooldowns.insert(id.to_string(), ct.max(0));
        }
    }

    /// 全部 CT -1（下限 0），`skip` 指定的技能不动
    pub fn tick_all(&mut self, skip: Option<&str>) {
        for id in &self.equipped {
            if skip == Some(id.as_str()) {
                continue;
            }
            let ct = self.cooldowns.entry(id.clone()).or_insert(0);
            *ct = (*ct - 1).max(0);
        }
    }

    pub fn reset_all(&mut self) {
        for ct in self.cooldowns.values_mut() {
            *ct = 0;
        }
    }

    /// CT 减少 `delta`，返回 (之前, 之后)
    pub fn reduce(&mut self, id: &str, delta: u32) -> Option<(i32, i32)> {
        if !self.contains(id) {
            return None;
        }
        let ct = self.cooldowns.entry(id.to_string()).or_insert(0);
        let before = *ct;
        *ct = (before - delta as i32).max(0);
        Some((before, *ct))
    }
}
