//src/content/src/job.rs
use dice::DiceExpr;
use serde::{Deserialize, Serialize};

/// 职业初始属性，全部是骰子表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: DiceExpr,
    pub mp: DiceExpr,
    pub atk: DiceExpr,
    pub def: DiceExpr,
}

/// 职业定义（jobs.json 以 id 为键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDef {
    /// 从表键回填
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub base: BaseStats,
    /// 开局从本职业抽取的技能数
    #[serde(default)]
    pub start_skill_count: u32,
    /// 逃跑判定的固定加值
    #[serde(default)]
    pub escape_bonus: i32,
    #[serde(default)]
    pub desc: String,
}
