//! 骰子地牢：40 格螺旋棋盘上的回合制探险
//!
//! [`GameSession`] 持有一局游戏的全部状态。驱动方提交玩家输入，
//! 读取 [`GameSnapshot`]，并在建议的延迟之后调用 [`GameSession::run_scheduled`]。

mod battle_flow;
pub mod choice;
pub mod event_bus;
mod events;
pub mod input;
mod level_up;
pub mod log;
pub mod phase;
pub mod scheduler;
mod session;
pub mod settings;
mod snapshot;
mod tile;
pub mod turn_system;

pub use crate::{
    battle_flow::BattleAction,
    choice::{ChoiceAction, PendingChoice},
    event_bus::{BattleEnd, EventBus, GameEvent},
    level_up::{AfterGrowth, PendingSkillChoice},
    phase::Phase,
    session::{GameSession, Standing},
    settings::GameSettings,
    snapshot::{ChoiceView, GameSnapshot},
    tile::{MAX_EVENT_CHAIN, MAX_MOVE_STEPS},
};

pub use combat::{BattleKind, BattleSession};
pub use content::{ContentTables, EquipSlot, TileKind};
pub use error::GameError;
pub use hero::{GrowthChoice, Player};
