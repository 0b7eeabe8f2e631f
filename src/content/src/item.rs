//src/content/src/item.rs
use dice::DiceExpr;
use error::GameError;
use serde::{Deserialize, Serialize};

use crate::Element;
use crate::params::RawEffect;

/// 战斗道具效果目录（键不区分大小写）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEffect")]
pub enum ItemEffect {
    HealHp { expr: DiceExpr },
    HealMp { expr: DiceExpr },
    BuffEvadeTurns { turns: u32 },
    BuffNextDamageMinusFlat { flat: i32 },
    /// 需要玩家选择目标技能
    ReduceSkillCt { delta: u32 },
    EscapeBonusNext { add: i32 },
    NextAttackElement { element: Element },
    NextAttackAtkFlat { add: i32 },
    DealFixedDamage { damage: i32, element: Element },
    ApplyPoison { turns: u32, poison: Option<DiceExpr> },
    DebuffEnemyDefFlat { delta: i32, turns: u32 },
    CleanseSelf,
    Unsupported { key: String },
}

impl TryFrom<RawEffect> for ItemEffect {
    type Error = GameError;

    fn try_from(raw: RawEffect) -> Result<Self, Self::Error> {
        let p = raw.params();
        let two_d6 = DiceExpr::new(2, 0);
        let key = raw.key().to_ascii_lowercase();

        Ok(match key.as_str() {
            "heal_hp_expr" => ItemEffect::HealHp {
                expr: p.dice("expr", two_d6)?,
            },
            "heal_mp_expr" => ItemEffect::HealMp {
                expr: p.dice("expr", two_d6)?,
            },
            "buff_evade_turns" => ItemEffect::BuffEvadeTurns { turns: p.u32("turns", 1) },
            "buff_next_damage_minus_flat" => {
                ItemEffect::BuffNextDamageMinusFlat { flat: p.i32("flat", 0) }
            }
            "reduce_skill_ct" => ItemEffect::ReduceSkillCt { delta: p.u32("delta", 2) },
            "escape_bonus_next" => ItemEffect::EscapeBonusNext { add: p.i32("add", 0) },
            "next_attack_element" => ItemEffect::NextAttackElement {
                element: p.element("element", Element::Magic)?,
            },
            "next_attack_atk_flat" => ItemEffect::NextAttackAtkFlat { add: p.i32("add", 0) },
            "deal_fixed_damage" => ItemEffect::DealFixedDamage {
                damage: p.i32("damage", 0),
                element: p.element("element", Element::Physical)?,
            },
            "apply_poison" => ItemEffect::ApplyPoison {
                turns: p.u32("turns", 3),
                poison: p.dice_opt("poisonExpr")?,
            },
            "debuff_enemy_def_flat" => ItemEffect::DebuffEnemyDefFlat {
                delta: p.i32("delta", -4),
                turns: p.u32("turns", 2),
            },
            "cleanse_self" => ItemEffect::CleanseSelf,
            _ => ItemEffect::Unsupported { key },
        })
    }
}

fn free_action_default() -> bool {
    true
}

/// 道具定义（items.json 的 `items` 数组）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub effect: ItemEffect,
    /// 自由行动：每个敌方回合限用一次，不触发敌人反击
    #[serde(default = "free_action_default")]
    pub free_action: bool,
    #[serde(default)]
    pub desc: String,
}
