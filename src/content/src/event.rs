//src/content/src/event.rs
use dice::DiceExpr;
use error::GameError;
use serde::{Deserialize, Serialize};

use crate::params::RawEffect;

/// 随机事件效果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEffect")]
pub enum EventEffect {
    GainTreasure { count: u32 },
    GainItem { count: u32 },
    GainEquip { count: u32 },
    LoseLowestTreasure,
    StealLowestTreasure,
    /// 装备损坏，直接消失
    DisableEquippedItem,
    HealAndMp { hp: DiceExpr, mp: i32 },
    NextBattleAtkFlatMod { delta: i32 },
    NextBattleDefFlatMod { delta: i32 },
    /// 掷 1d6，奇数走 odd_delta，偶数走 even_delta
    WarpByD6 { odd_delta: i32, even_delta: i32 },
    LostAndFound,
    TransferAtkDefDie,
    MoveByD6,
    /// 传送，不增加深度
    MoveTo { pos: i64 },
    MoveToBoss,
    /// 未知键：保底给一份财宝
    Unknown { key: String },
}

impl TryFrom<RawEffect> for EventEffect {
    type Error = GameError;

    fn try_from(raw: RawEffect) -> Result<Self, Self::Error> {
        let p = raw.params();

        Ok(match raw.key() {
            "gainTreasure" => EventEffect::GainTreasure { count: p.u32("count", 1) },
            "gainItem" => EventEffect::GainItem { count: p.u32("count", 1) },
            "gainEquip" => EventEffect::GainEquip { count: p.u32("count", 1) },
            "loseLowestTreasure" => EventEffect::LoseLowestTreasure,
            "stealLowestTreasure" => EventEffect::StealLowestTreasure,
            "disableEquippedItem" => EventEffect::DisableEquippedItem,
            "healAndMp" => EventEffect::HealAndMp {
                hp: p.dice("hpExpr", DiceExpr::new(1, 0))?,
                mp: p.i32("mpFlat", 0),
            },
            "nextBattleAtkFlatMod" => EventEffect::NextBattleAtkFlatMod { delta: p.i32("delta", 0) },
            "nextBattleDefFlatMod" => EventEffect::NextBattleDefFlatMod { delta: p.i32("delta", 0) },
            "warpByD6" => EventEffect::WarpByD6 {
                odd_delta: p.i32("oddDelta", 0),
                even_delta: p.i32("evenDelta", 0),
            },
            "lostAndFound" => EventEffect::LostAndFound,
            "transferAtkDefDie" => EventEffect::TransferAtkDefDie,
            "moveByD6" => EventEffect::MoveByD6,
            "moveTo" => EventEffect::MoveTo {
                pos: i64::from(p.i32("pos", 0)),
            },
            "moveToBoss" => EventEffect::MoveToBoss,
            other => EventEffect::Unknown {
                key: other.to_string(),
            },
        })
    }
}

/// 事件定义（events.json 的 `events` 数组）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventDef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub effect: EventEffect,
    #[serde(default)]
    pub desc: String,
}
