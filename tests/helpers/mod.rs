//! 集成测试用的内容表构造器
//!
//! 默认棋盘除起点、23 号回城点和 39 号 BOSS 外全是 SAFE；
//! 职业 HP/MP 是 `0d6+N` 常数；ATK/DEF 结算时骰子数至少为 1，
//! 所以玩家攻防实际按 1d6 计（期望 3.5）。

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use content::{BOARD_SIZE, BoardLayout, ContentTables, RawContent, TileKind, TreasureTable};
use dice_crawl::{GameSession, GameSettings};
use serde::de::DeserializeOwned;

pub const JOB: &str = "tester";
/// 同属性的其他职业，多人局每人一个
pub const JOBS: [&str; 4] = [JOB, "rival", "third", "fourth"];

fn parse<T: DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("bad fixture {json}: {e}"))
}

pub struct ContentBuilder {
    raw: RawContent,
}

impl ContentBuilder {
    pub fn new() -> Self {
        let mut tiles = vec![TileKind::Safe; BOARD_SIZE];
        tiles[0] = TileKind::Start;
        tiles[23] = TileKind::Return;
        tiles[39] = TileKind::Boss;

        let mut jobs = BTreeMap::new();
        for id in JOBS {
            let mut name = id.to_string();
            name[..1].make_ascii_uppercase();
            jobs.insert(
                id.to_string(),
                parse(&format!(
                    r#"{{ "name": "{name}", "base": {{ "hp": "0d6+20", "mp": "0d6+10", "atk": "0d6+0", "def": "0d6+0" }} }}"#
                )),
            );
        }

        let mut monsters = BTreeMap::new();
        monsters.insert(
            1,
            vec![parse(
                r#"{ "id": "dummy", "name": "Dummy", "hp": 1, "atkExpr": "0d6+0", "defExpr": "0d6+0", "weakness": "magic" }"#,
            )],
        );

        let mut counts = BTreeMap::new();
        counts.insert("10".to_string(), 1);

        Self {
            raw: RawContent {
                board: BoardLayout { tiles, return_pos: 23 },
                jobs,
                skills: Vec::new(),
                items: Vec::new(),
                gear: Vec::new(),
                events: vec![parse(
                    r#"{ "id": "chest", "name": "Chest", "effectKey": "gainTreasure", "params": { "count": 1 } }"#,
                )],
                treasure: TreasureTable { counts },
                monsters,
                bosses: vec![parse(
                    r#"{ "id": "king", "name": "King", "depth": 1, "hp": 1, "atkExpr": "0d6+0", "defExpr": "0d6+0", "weakness": "physical" }"#,
                )],
            },
        }
    }

    pub fn tile(mut self, pos: usize, kind: TileKind) -> Self {
        self.raw.board.tiles[pos] = kind;
        self
    }

    /// 除起点、回城点、BOSS 外全部改成 `kind`
    pub fn fill(mut self, kind: TileKind) -> Self {
        for (pos, tile) in self.raw.board.tiles.iter_mut().enumerate() {
            if ![0, 23, 39].contains(&pos) {
                *tile = kind;
            }
        }
        self
    }

    /// 只对 `JOB` 生效
    pub fn start_skills(mut self, count: u32) -> Self {
        if let Some(job) = self.raw.jobs.get_mut(JOB) {
            job.start_skill_count = count;
        }
        self
    }

    pub fn skill(mut self, json: &str) -> Self {
        self.raw.skills.push(parse(json));
        self
    }

    /// 无效果的占位技能
    pub fn plain_skill(self, id: &str, ct: i32) -> Self {
        self.skill(&format!(
            r#"{{ "id": "{id}", "name": "{id}", "job": "{JOB}", "effectKey": "attack_element_magic", "mpCost": 0, "ct": {ct} }}"#
        ))
    }

    pub fn item(mut self, json: &str) -> Self {
        self.raw.items.push(parse(json));
        self
    }

    pub fn gear(mut self, json: &str) -> Self {
        self.raw.gear.push(parse(json));
        self
    }

    pub fn events(mut self, jsons: &[&str]) -> Self {
        self.raw.events = jsons.iter().map(|j| parse(j)).collect();
        self
    }

    pub fn monster(mut self, json: &str) -> Self {
        self.raw.monsters.insert(1, vec![parse(json)]);
        self
    }

    pub fn raw(self) -> RawContent {
        self.raw
    }

    pub fn build(self) -> Arc<ContentTables> {
        Arc::new(ContentTables::from_raw(self.raw).expect("fixture content is valid"))
    }
}

/// 固定种子、零延迟
pub fn session(content: Arc<ContentTables>, players: usize) -> GameSession {
    session_with_seed(content, players, 42)
}

pub fn session_with_seed(content: Arc<ContentTables>, players: usize, seed: u64) -> GameSession {
    let settings = GameSettings {
        jobs: JOBS[..players].iter().map(|j| j.to_string()).collect(),
        round_limit: 10,
        result_delay_ms: 0,
        seed: Some(seed),
    };
    GameSession::new(content, settings).expect("session starts")
}

/// 反复执行已登记的敌方反击
pub fn settle(session: &mut GameSession) {
    while session.run_scheduled() {}
}
