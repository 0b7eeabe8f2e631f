//! 会话阶段：由会话状态推导，而不是单独存储
//!
//! 多个标记同时存在时按优先级取最前者，例如战斗中弹出的选择框优先于战斗本身。

use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Phase {
    /// 已放弃，驱动方应回到开局设置
    Abandoned,
    AwaitingChoice,
    GameOver,
    /// 升级抽到的技能需要选择丢弃哪一个
    SkillDiscard,
    GrowthAllocation,
    InBattle,
    /// 等待「下一步」推进手番
    AwaitingContinue,
    AwaitingMove,
}

impl Phase {
    /// 可以整理装备的阶段
    pub fn allows_gear_changes(self) -> bool {
        matches!(self, Phase::AwaitingMove | Phase::AwaitingContinue)
    }
}
