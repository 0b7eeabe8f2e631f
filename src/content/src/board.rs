//src/content/src/board.rs
use error::GameError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 棋盘格数（7x7 螺旋的外圈到内圈）
pub const BOARD_SIZE: usize = 40;

/// 回城点的默认位置
pub const DEFAULT_RETURN_POS: usize = 23;

/// 格子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TileKind {
    Start,
    Safe,
    Monster,
    Event,
    Boss,
    /// 强制停止的结算点
    Return,
    /// 未知类型，只做通用维护
    #[serde(other)]
    Other,
}

/// board.json 的原始格式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardLayout {
    pub tiles: Vec<TileKind>,
    #[serde(default = "default_return_pos")]
    pub return_pos: usize,
}

fn default_return_pos() -> usize {
    DEFAULT_RETURN_POS
}

/// 校验过的棋盘：恰好 40 格、恰好一个 BOSS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    tiles: Vec<TileKind>,
    boss_pos: usize,
    return_pos: usize,
}

impl Board {
    pub fn new(layout: BoardLayout) -> Result<Self, GameError> {
        let BoardLayout { tiles, return_pos } = layout;

        if tiles.len() != BOARD_SIZE {
            return Err(GameError::InvalidBoard(format!(
                "expected {BOARD_SIZE} tiles, found {}",
                tiles.len()
            )));
        }

        let mut bosses = tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == TileKind::Boss)
            .map(|(i, _)| i);
        let boss_pos = bosses
            .next()
            .ok_or_else(|| GameError::InvalidBoard("no BOSS tile".into()))?;
        if bosses.next().is_some() {
            return Err(GameError::InvalidBoard("more than one BOSS tile".into()));
        }

        if return_pos >= BOARD_SIZE {
            return Err(GameError::InvalidBoard(format!(
                "return position {return_pos} is off the board"
            )));
        }
        if return_pos == boss_pos {
            return Err(GameError::InvalidBoard(
                "return position overlaps the BOSS tile".into(),
            ));
        }

        Ok(Self {
            tiles,
            boss_pos,
            return_pos,
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn boss_pos(&self) -> usize {
        self.boss_pos
    }

    pub fn return_pos(&self) -> usize {
        self.return_pos
    }

    /// 回城点优先于原始格子类型
    pub fn kind_at(&self, pos: usize) -> TileKind {
        let pos = pos % BOARD_SIZE;
        if pos == self.return_pos {
            TileKind::Return
        } else {
            self.tiles[pos]
        }
    }

    /// 移动时不能越过的格子
    pub fn is_forced_stop(&self, pos: usize) -> bool {
        pos == self.return_pos || pos == self.boss_pos
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with_boss_at(boss: usize) -> BoardLayout {
        let mut tiles = vec![TileKind::Safe; BOARD_SIZE];
        tiles[0] = TileKind::Start;
        tiles[boss] = TileKind::Boss;
        BoardLayout {
            tiles,
            return_pos: DEFAULT_RETURN_POS,
        }
    }

    #[test]
    fn test_valid_board() {
        let board = Board::new(layout_with_boss_at(39)).unwrap();
        assert_eq!(board.boss_pos(), 39);
        assert_eq!(board.kind_at(23), TileKind::Return);
        assert_eq!(board.kind_at(0), TileKind::Start);
        assert!(board.is_forced_stop(39));
        assert!(!board.is_forced_stop(22));
    }

    #[test]
    fn test_rejects_wrong_length_and_boss_count() {
        let mut short = layout_with_boss_at(10);
        short.tiles.pop();
        assert!(matches!(Board::new(short), Err(GameError::InvalidBoard(_))));

        let mut two = layout_with_boss_at(10);
        two.tiles[11] = TileKind::Boss;
        assert!(matches!(Board::new(two), Err(GameError::InvalidBoard(_))));

        let none = BoardLayout {
            tiles: vec![TileKind::Safe; BOARD_SIZE],
            return_pos: DEFAULT_RETURN_POS,
        };
        assert!(matches!(Board::new(none), Err(GameError::InvalidBoard(_))));
    }

    #[test]
    fn test_unknown_tile_names_decode_as_other() {
        let layout: BoardLayout = serde_json::from_str(r#"{"tiles":["START","SHOP","BOSS"]}"#).unwrap();
        assert_eq!(layout.tiles[1], TileKind::Other);
        assert_eq!(layout.return_pos, DEFAULT_RETURN_POS);
    }
}
