//! 对外只读视图：驱动方据此渲染界面，或序列化成 JSON

use combat::BattleSession;
use hero::Player;
use serde::Serialize;

use crate::level_up::PendingSkillChoice;
use crate::phase::Phase;
use crate::scheduler::Scheduled;
use crate::session::{GameSession, Standing};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub round: u32,
    pub round_limit: u32,
    pub current_player: usize,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub battle: Option<BattleSession>,
    pub pending_choice: Option<ChoiceView>,
    pub pending_skill_choice: Option<PendingSkillChoice>,
    pub continue_label: Option<String>,
    pub scheduled: Option<Scheduled>,
    pub action_info: String,
    pub battle_info: String,
    /// 最近的日志行
    pub log: Vec<String>,
    pub standings: Vec<Standing>,
}

impl GameSession {
    /// `log_tail` 限制带出的日志行数
    pub fn snapshot(&self, log_tail: usize) -> GameSnapshot {
        let log: Vec<String> = self.log.iter().map(str::to_string).collect();
        let skip = log.len().saturating_sub(log_tail);
        GameSnapshot {
            round: self.turns.round(),
            round_limit: self.turns.round_limit(),
            current_player: self.turns.current(),
            phase: self.phase(),
            players: self.players.clone(),
            battle: self.battle.clone(),
            pending_choice: self.pending_choice.as_ref().map(|c| ChoiceView {
                prompt: c.prompt.clone(),
                options: c.labels(),
            }),
            pending_skill_choice: self.pending_skill_choice(),
            continue_label: self.continue_gate.clone(),
            scheduled: self.scheduler.peek().cloned(),
            action_info: self.action_info.clone(),
            battle_info: self.battle_info.clone(),
            log: log.into_iter().skip(skip).collect(),
            standings: self.standings.clone(),
        }
    }
}
