//! 延迟指令：玩家行动结果展示之后才结算的敌方反击
//!
//! 引擎只登记指令和建议的延迟，什么时候执行由驱动方决定；
//! 测试可以直接调用 `GameSession::run_scheduled` 同步推进。

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Directive {
    /// `skip_ct` 是本回合刚施放的技能，它的 CT 不参与本次递减
    EnemyReply { skip_ct: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheduled {
    pub directive: Directive,
    pub delay_ms: u64,
    /// 单调递增，用来分辨过期的计时器
    pub token: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Option<Scheduled>,
    next_token: u64,
}

impl Scheduler {
    /// 同一时刻最多一条待执行指令，新的覆盖旧的
    pub fn schedule(&mut self, directive: Directive, delay_ms: u64) -> &Scheduled {
        self.next_token += 1;
        self.pending.insert(Scheduled {
            directive,
            delay_ms,
            token: self.next_token,
        })
    }

    pub fn peek(&self) -> Option<&Scheduled> {
        self.pending.as_ref()
    }

    pub fn take(&mut self) -> Option<Scheduled> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let mut scheduler = Scheduler::default();
        let first = scheduler.schedule(Directive::EnemyReply { skip_ct: None }, 650).token;
        let second = scheduler
            .schedule(
                Directive::EnemyReply {
                    skip_ct: Some("sw_heavy".into()),
                },
                650,
            )
            .token;
        assert!(second > first);

        let taken = scheduler.take().unwrap();
        assert_eq!(taken.token, second);
        assert!(!scheduler.is_pending());
    }
}
