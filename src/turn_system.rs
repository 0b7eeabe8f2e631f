//! 轮流行动的回合调度：当前玩家、轮次与终局判定

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// 调度器所处的高层阶段
pub enum TurnState {
    /// 某位玩家正在行动
    PlayerTurn,
    /// 最后一轮的最后一位玩家已结束
    GameOver,
}

/// 按座位顺序轮转，每当回到 0 号座位轮次 +1
#[derive(Debug, Clone, Serialize)]
pub struct TurnSystem {
    pub state: TurnState,
    round: u32,
    player_index: usize,
    player_count: usize,
    round_limit: u32,
}

impl TurnSystem {
    pub fn new(player_count: usize, round_limit: u32) -> Self {
        Self {
            state: TurnState::PlayerTurn,
            round: 1,
            player_index: 0,
            player_count: player_count.max(1),
            round_limit: round_limit.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.player_index
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_limit(&self) -> u32 {
        self.round_limit
    }

    /// 结束当前玩家的手番，返回新的阶段
    pub fn end_turn(&mut self) -> TurnState {
        if self.state == TurnState::GameOver {
            return self.state;
        }

        self.player_index += 1;
        if self.player_index >= self.player_count {
            self.player_index = 0;
            self.round += 1;
            if self.round > self.round_limit {
                // 停在最后一轮，便于展示
                self.round = self.round_limit;
                self.state = TurnState::GameOver;
            }
        }
        self.state
    }

    pub fn is_player_turn(&self) -> bool {
        matches!(self.state, TurnState::PlayerTurn)
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.state, TurnState::GameOver)
    }
}
