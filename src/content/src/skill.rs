//src/content/src/skill.rs
use dice::DiceExpr;
use error::GameError;
use serde::{Deserialize, Serialize};

use crate::Element;
use crate::params::RawEffect;

/// 技能 MP 消耗：固定值或随 ATK 骰子数增长
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MpCost {
    Flat(i32),
    PerAtkDie {
        #[serde(default, alias = "flat")]
        base: i32,
        #[serde(rename = "perAtkDie", default)]
        per_atk_die: i32,
    },
}

impl Default for MpCost {
    fn default() -> Self {
        MpCost::Flat(0)
    }
}

impl MpCost {
    /// 未加装备修正、未截断的原始消耗
    pub fn raw(&self, atk_dice: u32) -> i32 {
        match *self {
            MpCost::Flat(v) => v,
            MpCost::PerAtkDie { base, per_atk_die } => base + per_atk_die * atk_dice as i32,
        }
    }
}

/// 固定伤害的计算基准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixedScale {
    /// 等级 × mul
    Level,
    /// 直接取 mul
    Flat,
}

/// 技能效果目录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEffect")]
pub enum SkillEffect {
    AttackMinDie { min: u32 },
    AttackFixedDamage { scale: FixedScale, mul: i32 },
    AttackElementMagic,
    AttackAtkFlat { add: i32 },
    BuffTripleWhileHp1,
    AttackAtkMult { mul: f64 },
    DebuffEnemyDefFlat { delta: i32, turns: u32 },
    HpToMp,
    MpToAtk,
    BuffAtkDefPlus1d6,
    BuffBattleExpMult { mul: f64 },
    WinBattleOncePerDive,
    AttackAtkPlus1d6PlusFlat { flat: i32 },
    AttackTwice,
    /// `poison` 为空时沿用敌人当前的毒表达式
    AttackApplyPoison { turns: u32, poison: Option<DiceExpr> },
    AttackAtkPlusDice { dice: u32 },
    AttackDamageEqualsTaken,
    AttackFinalMult { mul: f64 },
    BuffEvadeTurns { turns: u32 },
    AutoEscape,
    GainTreasureNow,
    AttackAllDice6,
    CleanseSelf,
    HealHp { expr: DiceExpr },
    HealMp { expr: DiceExpr },
    BuffNextDamageMinusFlat { flat: i32 },
    BuffDefPlusDiceThisTurn { dice: u32 },
    /// 未知效果键：照常付费，报告不支持
    Unsupported { key: String },
}

impl TryFrom<RawEffect> for SkillEffect {
    type Error = GameError;

    fn try_from(raw: RawEffect) -> Result<Self, Self::Error> {
        let p = raw.params();
        let two_d6 = DiceExpr::new(2, 0);

        Ok(match raw.key() {
            "attack_min_die" => SkillEffect::AttackMinDie { min: p.u32("min", 1) },
            "attack_fixed_damage" => SkillEffect::AttackFixedDamage {
                scale: match p.text("by").unwrap_or("level") {
                    "level" => FixedScale::Level,
                    _ => FixedScale::Flat,
                },
                mul: p.i32("mul", 10),
            },
            "attack_element_magic" => SkillEffect::AttackElementMagic,
            "attack_atk_flat" => SkillEffect::AttackAtkFlat { add: p.i32("add", 0) },
            "buff_triple_while_hp1" => SkillEffect::BuffTripleWhileHp1,
            "attack_atk_mult" => SkillEffect::AttackAtkMult { mul: p.f64("mul", 2.0) },
            "debuff_enemy_def_flat" => SkillEffect::DebuffEnemyDefFlat {
                delta: p.i32("delta", -6),
                turns: p.u32("turns", 3),
            },
            "hp_to_mp_xd6" => SkillEffect::HpToMp,
            "mp_to_atk_xd6" => SkillEffect::MpToAtk,
            "buff_atk_def_plus_1d6" => SkillEffect::BuffAtkDefPlus1d6,
            "buff_battle_exp_mult" => SkillEffect::BuffBattleExpMult { mul: p.f64("mul", 2.0) },
            "win_battle_once_per_dive" => SkillEffect::WinBattleOncePerDive,
            "attack_atk_plus_1d6_plus_flat" => {
                SkillEffect::AttackAtkPlus1d6PlusFlat { flat: p.i32("flat", 0) }
            }
            "attack_twice" => SkillEffect::AttackTwice,
            "attack_apply_poison" => SkillEffect::AttackApplyPoison {
                turns: p.u32("turns", 3),
                poison: p.dice_opt("poisonExpr")?,
            },
            "attack_atk_plus_dice" => SkillEffect::AttackAtkPlusDice {
                dice: p.dice_count("dice", 1)?,
            },
            "attack_damage_equals_taken" => SkillEffect::AttackDamageEqualsTaken,
            "attack_final_mult" => SkillEffect::AttackFinalMult { mul: p.f64("mul", 1.5) },
            "buff_evade_turns" => SkillEffect::BuffEvadeTurns { turns: p.u32("turns", 1) },
            "auto_escape" => SkillEffect::AutoEscape,
            "gain_treasure_now" => SkillEffect::GainTreasureNow,
            "attack_all_dice_6" => SkillEffect::AttackAllDice6,
            "cleanse_self" => SkillEffect::CleanseSelf,
            "heal_hp_expr" => {
                let expr = match p.dice_opt("expr")? {
                    Some(expr) => expr,
                    None => p.dice("healExpr", two_d6)?,
                };
                SkillEffect::HealHp { expr }
            }
            "heal_mp_expr" => SkillEffect::HealMp {
                expr: p.dice("expr", two_d6)?,
            },
            "buff_next_damage_minus_flat" => {
                SkillEffect::BuffNextDamageMinusFlat { flat: p.i32("flat", 0) }
            }
            "buff_def_plus_dice_this_turn" => SkillEffect::BuffDefPlusDiceThisTurn {
                dice: p.dice_count("dice", 1)?,
            },
            other => SkillEffect::Unsupported {
                key: other.to_string(),
            },
        })
    }
}

/// 技能定义（skills.json 为数组）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub job: String,
    #[serde(default)]
    pub element: Element,
    #[serde(flatten)]
    pub effect: SkillEffect,
    #[serde(default, alias = "mp")]
    pub mp_cost: MpCost,
    #[serde(default, alias = "cooldown")]
    pub ct: i32,
    #[serde(default)]
    pub desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_skill_with_scaled_cost() {
        let skill: SkillDef = serde_json::from_str(
            r#"{
                "id": "sw_slash", "name": "Slash", "job": "swordsman",
                "effectKey": "attack_min_die", "params": { "min": 3 },
                "mpCost": { "base": 1, "perAtkDie": 1 }, "ct": 2
            }"#,
        )
        .unwrap();

        assert_eq!(skill.effect, SkillEffect::AttackMinDie { min: 3 });
        assert_eq!(skill.element, Element::Physical);
        assert_eq!(skill.mp_cost.raw(3), 4);
        assert_eq!(skill.ct, 2);
    }

    #[test]
    fn test_unknown_key_is_unsupported_not_an_error() {
        let skill: SkillDef = serde_json::from_str(
            r#"{ "id": "x", "name": "X", "job": "mage", "effectKey": "summon_dragon", "mpCost": 3 }"#,
        )
        .unwrap();
        assert_eq!(
            skill.effect,
            SkillEffect::Unsupported {
                key: "summon_dragon".into()
            }
        );
        assert_eq!(skill.mp_cost, MpCost::Flat(3));
    }

    #[test]
    fn test_fixed_damage_defaults() {
        let effect = SkillEffect::try_from(RawEffect {
            effect_key: "attack_fixed_damage".into(),
            params: Default::default(),
        })
        .unwrap();
        assert_eq!(
            effect,
            SkillEffect::AttackFixedDamage {
                scale: FixedScale::Level,
                mul: 10
            }
        );
    }

    #[test]
    fn test_malformed_poison_expr_fails_to_load() {
        let result: Result<SkillDef, _> = serde_json::from_str(
            r#"{ "id": "p", "name": "P", "job": "archer",
                 "effectKey": "attack_apply_poison", "params": { "poisonExpr": "1d8" } }"#,
        );
        assert!(result.is_err());
    }
}
