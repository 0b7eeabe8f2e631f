//src/dungeon/src/board.rs
use content::{BOARD_SIZE, Board};
use serde::{Deserialize, Serialize};
use strum::Display;

/// 强制停止的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ForcedStop {
    #[strum(serialize = "stopped at the return point")]
    Return,
    #[strum(serialize = "stopped at the boss")]
    Boss,
}

/// 一次逐格移动的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Walk {
    pub from: usize,
    pub pos: usize,
    /// 前进经过 0 号格的次数
    pub depth_gained: u32,
    pub forced: Option<ForcedStop>,
}

/// 从 `from` 出发逐格走 `steps` 步（负数为后退）。
///
/// 经过回城点或 BOSS 格时立即停下；只有前进落到 0 号格才增加深度。
pub fn walk(board: &Board, from: usize, steps: i32) -> Walk {
    let from = from % BOARD_SIZE;
    let forward = steps >= 0;
    let mut pos = from;
    let mut depth_gained = 0;
    let mut forced = None;

    for _ in 0..steps.unsigned_abs() {
        pos = if forward {
            (pos + 1) % BOARD_SIZE
        } else {
            (pos + BOARD_SIZE - 1) % BOARD_SIZE
        };

        if forward && pos == 0 {
            depth_gained += 1;
        }

        if pos != from && board.is_forced_stop(pos) {
            forced = Some(if pos == board.boss_pos() {
                ForcedStop::Boss
            } else {
                ForcedStop::Return
            });
            break;
        }
    }

    Walk {
        from,
        pos,
        depth_gained,
        forced,
    }
}

/// 传送：直接取模落格，不计深度
pub fn teleport(target: i64) -> usize {
    target.rem_euclid(BOARD_SIZE as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use content::{BoardLayout, TileKind};
    use proptest::prelude::*;

    fn board() -> Board {
        let mut tiles = vec![TileKind::Safe; BOARD_SIZE];
        tiles[0] = TileKind::Start;
        tiles[39] = TileKind::Boss;
        Board::new(BoardLayout {
            tiles,
            return_pos: 23,
        })
        .unwrap()
    }

    #[test]
    fn test_boss_forced_stop() {
        let w = walk(&board(), 38, 5);
        assert_eq!(w.pos, 39);
        assert_eq!(w.forced, Some(ForcedStop::Boss));
        assert_eq!(w.depth_gained, 0);
    }

    #[test]
    fn test_return_forced_stop() {
        let w = walk(&board(), 20, 6);
        assert_eq!(w.pos, 23);
        assert_eq!(w.forced, Some(ForcedStop::Return));
    }

    #[test]
    fn test_leaving_a_stop_tile_is_free() {
        let w = walk(&board(), 23, 3);
        assert_eq!(w.pos, 26);
        assert_eq!(w.forced, None);
    }

    #[test]
    fn test_leaving_boss_wraps_and_gains_depth() {
        let w = walk(&board(), 39, 2);
        assert_eq!(w.pos, 1);
        assert_eq!(w.depth_gained, 1);
    }

    #[test]
    fn test_backward_walk_never_gains_depth() {
        let w = walk(&board(), 1, -3);
        assert_eq!(w.pos, 38);
        assert_eq!(w.depth_gained, 0);
    }

    #[test]
    fn test_teleport_wraps() {
        assert_eq!(teleport(41), 1);
        assert_eq!(teleport(-1), 39);
        assert_eq!(teleport(12), 12);
    }

    proptest! {
        #[test]
        fn prop_walk_stays_on_board(from in 0usize..BOARD_SIZE, steps in -12i32..=12) {
            let w = walk(&board(), from, steps);
            prop_assert!(w.pos < BOARD_SIZE);
            prop_assert!(w.depth_gained <= 1);
            if steps <= 0 {
                prop_assert_eq!(w.depth_gained, 0);
            }
        }

        #[test]
        fn prop_depth_counts_forward_crossings(from in 0usize..BOARD_SIZE, steps in 1i32..=6) {
            let w = walk(&board(), from, steps);
            let crossed = w.pos < from;
            prop_assert_eq!(w.depth_gained == 1, crossed);
        }
    }
}
