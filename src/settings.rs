//! 开局设置：玩家职业、回合上限、敌方回合延迟与随机种子

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use content::ContentTables;
use error::GameError;
use serde::{Deserialize, Serialize};

pub const MAX_PLAYERS: usize = 4;
pub const DEFAULT_ROUND_LIMIT: u32 = 10;
/// 玩家行动结果与敌方反击之间的展示间隔
pub const DEFAULT_RESULT_DELAY_MS: u64 = 650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// 每个座位的职业 id，顺序即行动顺序
    pub jobs: Vec<String>,
    pub round_limit: u32,
    pub result_delay_ms: u64,
    /// 为空时使用系统熵
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            jobs: vec!["swordsman".to_string()],
            round_limit: DEFAULT_ROUND_LIMIT,
            result_delay_ms: DEFAULT_RESULT_DELAY_MS,
            seed: None,
        }
    }
}

impl GameSettings {
    pub fn solo(job: impl Into<String>) -> Self {
        Self {
            jobs: vec![job.into()],
            ..Self::default()
        }
    }

    pub fn from_json(file: &str, text: &str) -> Result<Self, GameError> {
        serde_json::from_str(text).map_err(|source| GameError::Json {
            file: file.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &text)
    }

    pub fn player_count(&self) -> usize {
        self.jobs.len()
    }

    /// 人数 1..=4、职业存在且不重复、回合数至少 1
    pub fn validate(&self, content: &ContentTables) -> Result<(), GameError> {
        if self.jobs.is_empty() || self.jobs.len() > MAX_PLAYERS {
            return Err(GameError::InvalidSettings(format!(
                "player count must be 1..={MAX_PLAYERS}, got {}",
                self.jobs.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for job in &self.jobs {
            if content.job(job).is_none() {
                return Err(GameError::unknown("job", job.clone()));
            }
            if !seen.insert(job.as_str()) {
                return Err(GameError::InvalidSettings(format!(
                    "job {job:?} is chosen twice"
                )));
            }
        }

        if self.round_limit == 0 {
            return Err(GameError::InvalidSettings("round limit must be at least 1".into()));
        }
        Ok(())
    }
}
