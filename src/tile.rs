//! 移动与落格结算

use content::TileKind;
use dungeon::walk;
use tracing::debug;

use crate::event_bus::GameEvent;
use crate::events::EventStep;
use crate::phase::Phase;
use crate::session::{GameSession, NEXT_PLAYER};

/// 事件连锁移动的上限，超出后停在原地
pub const MAX_EVENT_CHAIN: u32 = 4;

/// 指定步数移动的上限：绕棋盘一圈
pub const MAX_MOVE_STEPS: u32 = content::BOARD_SIZE as u32;

impl GameSession {
    /// 掷 1d6 并移动
    pub fn roll_move(&mut self) -> bool {
        if self.phase() != Phase::AwaitingMove {
            return self.decline("roll_move");
        }
        let steps = self.rng.d6();
        let line = format!("{} rolls {steps}", self.current_player().id);
        self.note(line);
        self.move_player(steps as i32);
        true
    }

    /// 指定步数移动，不掷骰；步数限 1..=`MAX_MOVE_STEPS`
    pub fn move_steps(&mut self, steps: u32) -> bool {
        if !(1..=MAX_MOVE_STEPS).contains(&steps) || self.phase() != Phase::AwaitingMove {
            return self.decline("move_steps");
        }
        let Ok(steps) = i32::try_from(steps) else {
            return self.decline("move_steps");
        };
        self.move_player(steps);
        true
    }

    fn move_player(&mut self, steps: i32) {
        self.walk_current(steps);
        self.resolve_tile(0);
    }

    /// 逐格走并记录深度变化，不结算落格
    pub(crate) fn walk_current(&mut self, steps: i32) {
        let idx = self.turns.current();
        let board = self.content.board();
        let player = &mut self.players[idx];
        let moved = walk(board, player.pos, steps);
        player.pos = moved.pos;
        player.depth += moved.depth_gained;
        let id = player.id.clone();
        let depth = player.depth;

        if moved.depth_gained > 0 {
            self.note(format!("{id} passes START: depth is now {depth}"));
            self.publish(GameEvent::DepthChanged { player: idx, depth });
        }

        let kind = self.content.board().kind_at(moved.pos);
        let line = match moved.forced {
            Some(reason) => format!("{id} moves {} -> {} ({kind}, {reason})", moved.from, moved.pos),
            None => format!("{id} moves {} -> {} ({kind})", moved.from, moved.pos),
        };
        self.note(line);
        debug!(player = %id, from = moved.from, to = moved.pos, forced = ?moved.forced, "walk");
        self.publish(GameEvent::Moved {
            player: idx,
            from: moved.from,
            to: moved.pos,
            forced: moved.forced,
        });
    }

    /// 结算当前玩家所在的格子；`chain` 为事件连锁深度
    pub(crate) fn resolve_tile(&mut self, chain: u32) {
        let idx = self.turns.current();
        let pos = self.players[idx].pos;
        let kind = self.content.board().kind_at(pos);
        self.publish(GameEvent::TileResolved {
            player: idx,
            pos,
            kind,
        });

        if self.players[idx].skip_next_tile {
            self.players[idx].skip_next_tile = false;
            if kind != TileKind::Boss {
                let line = format!("{} is still catching their breath (effect skipped)", self.players[idx].id);
                self.note(line);
                self.set_action_info("Retreated: this tile has no effect.");
                self.upkeep();
                self.wait_continue(NEXT_PLAYER);
                return;
            }
        }

        match kind {
            TileKind::Return => self.offer_return(false),
            TileKind::Monster => self.start_battle(combat::BattleKind::Normal),
            TileKind::Boss => self.start_battle(combat::BattleKind::Boss),
            TileKind::Event => {
                if self.apply_event(chain) == EventStep::Done {
                    self.upkeep();
                    self.wait_continue(NEXT_PLAYER);
                }
            }
            TileKind::Start | TileKind::Safe | TileKind::Other => {
                let text = match kind {
                    TileKind::Start => "Back at START. Nothing happens.",
                    _ => "A quiet tile. Nothing happens.",
                };
                self.set_action_info(text);
                self.upkeep();
                self.wait_continue(NEXT_PLAYER);
            }
        }
    }
}
