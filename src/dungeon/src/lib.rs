//src/dungeon/src/lib.rs
//! 地牢：螺旋棋盘上的移动规则与四个抽牌堆

pub mod board;
pub mod deck;

pub use crate::board::{ForcedStop, Walk, teleport, walk};
pub use crate::deck::{Deck, Decks};
