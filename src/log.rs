//! 面向玩家的游戏日志：只保留最近的若干行

use std::collections::VecDeque;

use serde::Serialize;

pub const LOG_CAPACITY: usize = 400;

#[derive(Debug, Clone, Serialize)]
pub struct EventLog {
    lines: VecDeque<String>,
    #[serde(skip)]
    capacity: usize,
    /// 累计写入的行数（含已淘汰的）
    total: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(LOG_CAPACITY)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
        self.total += 1;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.iter().any(|line| line.contains(needle))
    }

    /// 自第 `seen` 行（按累计计数）之后新写入的行
    pub fn since(&self, seen: u64) -> impl Iterator<Item = &str> {
        let dropped = self.total - self.lines.len() as u64;
        let skip = seen.saturating_sub(dropped) as usize;
        self.iter().skip(skip)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
