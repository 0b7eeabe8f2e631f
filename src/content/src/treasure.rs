//src/content/src/treasure.rs
use std::collections::BTreeMap;

use error::GameError;
use serde::{Deserialize, Serialize};

/// 财宝基础值表：面值 -> 张数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureTable {
    pub counts: BTreeMap<String, u32>,
}

impl TreasureTable {
    /// 展开成牌堆的全部牌面
    pub fn population(&self) -> Result<Vec<u32>, GameError> {
        let mut cards = Vec::new();
        for (face, &count) in &self.counts {
            let value: u32 = face.trim().parse().map_err(|_| {
                GameError::InvalidContent(format!("treasure value {face:?} is not a number"))
            })?;
            cards.extend(std::iter::repeat_n(value, count as usize));
        }
        Ok(cards)
    }
}
