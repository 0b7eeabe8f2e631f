//! 事件总线：会话向表现层发布的状态变化通知
//!
//! 引擎按发生顺序把事件放进当前队列，驱动方每次操作后 `drain` 取走；
//! 另保留一段有限长度的历史，供调试和测试回看。

use combat::BattleKind;
use content::TileKind;
use dungeon::ForcedStop;
use serde::Serialize;

/// 一场战斗的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattleEnd {
    Victory,
    Defeat,
    Escaped,
    TimedOut,
}

/// 游戏事件定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    // ===== 回合 =====
    TurnStarted { player: usize, round: u32 },
    TurnEnded { player: usize },
    GameOver,

    // ===== 移动 =====
    Moved {
        player: usize,
        from: usize,
        to: usize,
        forced: Option<ForcedStop>,
    },
    DepthChanged { player: usize, depth: u32 },
    /// 落格效果开始结算
    TileResolved { player: usize, pos: usize, kind: TileKind },
    /// 非战斗格的 CT -1
    CooldownUpkeep { player: usize },
    EventTriggered { player: usize, event: String },

    // ===== 战斗 =====
    BattleStarted {
        player: usize,
        enemy: String,
        kind: BattleKind,
    },
    EnemyReplyScheduled { delay_ms: u64 },
    BattleEnded { player: usize, end: BattleEnd },

    // ===== 成长与财宝 =====
    ExpGained { player: usize, amount: u32 },
    LevelUp { player: usize, level: u32 },
    Banked { player: usize, amount: u32 },
    PlayerDied { player: usize },
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::TurnStarted { .. } => "TurnStarted",
            GameEvent::TurnEnded { .. } => "TurnEnded",
            GameEvent::GameOver => "GameOver",
            GameEvent::Moved { .. } => "Moved",
            GameEvent::DepthChanged { .. } => "DepthChanged",
            GameEvent::TileResolved { .. } => "TileResolved",
            GameEvent::CooldownUpkeep { .. } => "CooldownUpkeep",
            GameEvent::EventTriggered { .. } => "EventTriggered",
            GameEvent::BattleStarted { .. } => "BattleStarted",
            GameEvent::EnemyReplyScheduled { .. } => "EnemyReplyScheduled",
            GameEvent::BattleEnded { .. } => "BattleEnded",
            GameEvent::ExpGained { .. } => "ExpGained",
            GameEvent::LevelUp { .. } => "LevelUp",
            GameEvent::Banked { .. } => "Banked",
            GameEvent::PlayerDied { .. } => "PlayerDied",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    /// 尚未被驱动方取走的事件
    events: Vec<GameEvent>,
    /// 事件历史（用于调试和回放）
    history: Vec<GameEvent>,
    max_history: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_history_size(256)
    }

    pub fn with_history_size(max_history: usize) -> Self {
        Self {
            events: Vec::new(),
            history: Vec::new(),
            max_history,
        }
    }

    pub fn publish(&mut self, event: GameEvent) {
        tracing::trace!(event = event.event_type(), "publish");
        self.add_to_history(event.clone());
        self.events.push(event);
    }

    /// 获取所有待处理事件并清空队列
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn add_to_history(&mut self, event: GameEvent) {
        if self.max_history == 0 {
            return;
        }
        if self.history.len() >= self.max_history {
            self.history.remove(0);
        }
        self.history.push(event);
    }

    /// 最近 `count` 条历史
    pub fn get_history(&self, count: usize) -> &[GameEvent] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }

    pub fn full_history(&self) -> &[GameEvent] {
        &self.history
    }

    /// 历史中某类事件出现的次数
    pub fn count(&self, event_type: &str) -> usize {
        self.history
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_but_keeps_history() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::TurnStarted { player: 0, round: 1 });
        bus.publish(GameEvent::CooldownUpkeep { player: 0 });

        let drained: Vec<_> = bus.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(bus.is_empty());
        assert_eq!(bus.count("CooldownUpkeep"), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut bus = EventBus::with_history_size(2);
        for player in 0..3 {
            bus.publish(GameEvent::TurnEnded { player });
        }
        assert_eq!(
            bus.full_history(),
            &[
                GameEvent::TurnEnded { player: 1 },
                GameEvent::TurnEnded { player: 2 }
            ]
        );
        assert_eq!(bus.get_history(1), &[GameEvent::TurnEnded { player: 2 }]);
    }
}
