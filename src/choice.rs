//! 等待玩家按钮选择的状态节点
//!
//! 每个选项带一个 [`ChoiceAction`]，驱动方提交下标后由会话查表执行对应的转移。

use serde::Serialize;

/// ATK/DEF 成长骰互转的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DieTransfer {
    AtkToDef,
    DefToAtk,
}

/// 选项被选中后要执行的转移
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChoiceAction {
    /// 背包财宝入账并回到起点
    BankAndReturn { after_boss: bool },
    StayInDungeon { after_boss: bool },
    TransferDie(DieTransfer),
    KeepGrowth,
    /// 道具的 CT 减少落到这个技能上
    ReduceCt {
        item_id: String,
        skill_id: String,
        delta: u32,
    },
    CancelItem,
    ConfirmAbandon,
    CancelAbandon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub label: String,
    pub action: ChoiceAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChoice {
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

impl PendingChoice {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, label: impl Into<String>, action: ChoiceAction) -> Self {
        self.options.push(ChoiceOption {
            label: label.into(),
            action,
        });
        self
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }

    pub fn action(&self, index: usize) -> Option<&ChoiceAction> {
        self.options.get(index).map(|o| &o.action)
    }
}
