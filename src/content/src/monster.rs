//src/content/src/monster.rs
use dice::DiceExpr;
use serde::{Deserialize, Serialize};

use crate::Element;

/// 怪物或 BOSS 的静态数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterDef {
    pub id: String,
    pub name: String,
    pub hp: i32,
    #[serde(default)]
    pub mp: i32,
    pub atk_expr: DiceExpr,
    pub def_expr: DiceExpr,
    pub weakness: Element,
    /// 仅 BOSS 使用：出现的深度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}
