//! 游戏错误处理模块
//!
//! 只有“致命”错误会走到这里：内容表加载失败、骰子表达式格式错误、
//! 棋盘数据无效、开局设置无效。玩家输入冲突、未知效果键、资源耗尽
//! 等情况都由引擎以无操作/回退方式处理，不会产生错误。

use std::path::PathBuf;
use thiserror::Error;

/// 骰子表达式解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// 空字符串
    #[error("empty dice expression")]
    Empty,

    /// 不符合 `NdS[+|-M]` 格式
    #[error("bad dice expression: {0:?}")]
    InvalidFormat(String),

    /// 只支持六面骰
    #[error("unsupported die size in {0:?} (only d6 is allowed)")]
    UnsupportedDie(String),
}

/// 开局前可能出现的致命错误
#[derive(Debug, Error)]
pub enum GameError {
    /// 内容文件读取失败
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 内容文件 JSON 解析失败
    #[error("failed to decode {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// 骰子表达式错误
    #[error(transparent)]
    Dice(#[from] DiceError),

    /// 棋盘数据无效
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// 内容表缺失或为空
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// 引用了不存在的 id
    #[error("unknown {kind} id {id:?}")]
    UnknownReference { kind: &'static str, id: String },

    /// 开局设置无效
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl GameError {
    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        GameError::UnknownReference {
            kind,
            id: id.into(),
        }
    }
}

/// 将致命错误转换为面向玩家的提示
pub fn handle_error(error: &GameError) -> String {
    match error {
        GameError::Io { path, source } => match source.kind() {
            std::io::ErrorKind::NotFound => {
                format!("content file not found: {}", path.display())
            }
            std::io::ErrorKind::PermissionDenied => {
                format!("no permission to read {}", path.display())
            }
            _ => error.to_string(),
        },
        GameError::Json { file, .. } => format!("content file {file} is not valid game data"),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_file() {
        let err = GameError::Io {
            path: PathBuf::from("data/board.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(handle_error(&err), "content file not found: data/board.json");
    }

    #[test]
    fn test_dice_error_is_transparent() {
        let err: GameError = DiceError::InvalidFormat("2x6".into()).into();
        assert_eq!(err.to_string(), "bad dice expression: \"2x6\"");
    }
}
