//src/content/src/lib.rs
//! 静态内容表
//!
//! 职业、技能、道具、装备、怪物、BOSS、事件、棋盘和财宝表在开局前
//! 一次性载入并校验，之后只读。效果键在载入时就转换成封闭的枚举，
//! 未知键落到 `Unsupported`/`Unknown` 分支而不是报错。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use error::GameError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

pub mod board;
pub mod event;
pub mod gear;
pub mod item;
pub mod job;
pub mod monster;
pub mod params;
pub mod skill;
pub mod treasure;

pub use crate::board::{BOARD_SIZE, Board, BoardLayout, DEFAULT_RETURN_POS, TileKind};
pub use crate::event::{EventDef, EventEffect};
pub use crate::gear::{EquipSlot, GearDef, GearEffects};
pub use crate::item::{ItemDef, ItemEffect};
pub use crate::job::{BaseStats, JobDef};
pub use crate::monster::MonsterDef;
pub use crate::skill::{FixedScale, MpCost, SkillDef, SkillEffect};
pub use crate::treasure::TreasureTable;

/// 攻击属性 / 弱点
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Element {
    #[default]
    Physical,
    Magic,
}

/// 内容目录里的文件名
pub mod files {
    pub const BOARD: &str = "board.json";
    pub const JOBS: &str = "jobs.json";
    pub const SKILLS: &str = "skills.json";
    pub const ITEMS: &str = "items.json";
    pub const EQUIPMENT: &str = "equipment.json";
    pub const EVENTS: &str = "events.json";
    pub const TREASURE: &str = "treasure.json";
    pub const MONSTERS: &str = "monsters.json";
    pub const BOSSES: &str = "bosses.json";
}

#[derive(Deserialize)]
struct ItemsFile {
    items: Vec<ItemDef>,
}

#[derive(Deserialize)]
struct GearFile {
    gear: Vec<GearDef>,
}

#[derive(Deserialize)]
struct EventsFile {
    events: Vec<EventDef>,
}

#[derive(Deserialize)]
struct MonstersFile {
    #[serde(rename = "byDepth")]
    by_depth: BTreeMap<u32, Vec<MonsterDef>>,
}

#[derive(Deserialize)]
struct BossesFile {
    bosses: Vec<MonsterDef>,
}

/// 未校验的内容，文件或测试代码都可以构造
#[derive(Debug, Clone)]
pub struct RawContent {
    pub board: BoardLayout,
    pub jobs: BTreeMap<String, JobDef>,
    pub skills: Vec<SkillDef>,
    pub items: Vec<ItemDef>,
    pub gear: Vec<GearDef>,
    pub events: Vec<EventDef>,
    pub treasure: TreasureTable,
    /// 深度档 -> 怪物列表
    pub monsters: BTreeMap<u32, Vec<MonsterDef>>,
    pub bosses: Vec<MonsterDef>,
}

fn decode<T: for<'de> Deserialize<'de>>(file: &str, text: &str) -> Result<T, GameError> {
    serde_json::from_str(text).map_err(|source| GameError::Json {
        file: file.to_string(),
        source,
    })
}

impl RawContent {
    /// 通过文件名取文本，再逐个解码
    pub fn from_sources<F>(mut read: F) -> Result<Self, GameError>
    where
        F: FnMut(&str) -> Result<String, GameError>,
    {
        let mut load = |file: &str| read(file).map(|text| (file.to_string(), text));

        let (f, t) = load(files::BOARD)?;
        let board: BoardLayout = decode(&f, &t)?;
        let (f, t) = load(files::JOBS)?;
        let jobs: BTreeMap<String, JobDef> = decode(&f, &t)?;
        let (f, t) = load(files::SKILLS)?;
        let skills: Vec<SkillDef> = decode(&f, &t)?;
        let (f, t) = load(files::ITEMS)?;
        let items: ItemsFile = decode(&f, &t)?;
        let (f, t) = load(files::EQUIPMENT)?;
        let gear: GearFile = decode(&f, &t)?;
        let (f, t) = load(files::EVENTS)?;
        let events: EventsFile = decode(&f, &t)?;
        let (f, t) = load(files::TREASURE)?;
        let treasure: TreasureTable = decode(&f, &t)?;
        let (f, t) = load(files::MONSTERS)?;
        let monsters: MonstersFile = decode(&f, &t)?;
        let (f, t) = load(files::BOSSES)?;
        let bosses: BossesFile = decode(&f, &t)?;

        Ok(Self {
            board,
            jobs,
            skills,
            items: items.items,
            gear: gear.gear,
            events: events.events,
            treasure,
            monsters: monsters.by_depth,
            bosses: bosses.bosses,
        })
    }
}

/// 校验后的只读内容表
#[derive(Debug, Clone)]
pub struct ContentTables {
    board: Board,
    jobs: BTreeMap<String, JobDef>,
    skills: Vec<SkillDef>,
    items: Vec<ItemDef>,
    gear: Vec<GearDef>,
    events: Vec<EventDef>,
    treasure: Vec<u32>,
    monsters: BTreeMap<u32, Vec<MonsterDef>>,
    bosses: Vec<MonsterDef>,
    skill_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    gear_index: HashMap<String, usize>,
}

fn index_by_id<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>, GameError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_string(), i).is_some() {
            return Err(GameError::InvalidContent(format!("duplicate {kind} id {id:?}")));
        }
    }
    Ok(index)
}

impl ContentTables {
    /// 内置数据（`src/content/data`）
    pub fn builtin() -> Result<Self, GameError> {
        let raw = RawContent::from_sources(|file| {
            let text = match file {
                files::BOARD => include_str!("../data/board.json"),
                files::JOBS => include_str!("../data/jobs.json"),
                files::SKILLS => include_str!("../data/skills.json"),
                files::ITEMS => include_str!("../data/items.json"),
                files::EQUIPMENT => include_str!("../data/equipment.json"),
                files::EVENTS => include_str!("../data/events.json"),
                files::TREASURE => include_str!("../data/treasure.json"),
                files::MONSTERS => include_str!("../data/monsters.json"),
                files::BOSSES => include_str!("../data/bosses.json"),
                other => return Err(GameError::InvalidContent(format!("no built-in {other}"))),
            };
            Ok(text.to_string())
        })?;
        Self::from_raw(raw)
    }

    /// 从目录读取九个 JSON 文件
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, GameError> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "loading content tables");
        let raw = RawContent::from_sources(|file| {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|source| GameError::Io { path, source })
        })?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawContent) -> Result<Self, GameError> {
        let RawContent {
            board,
            mut jobs,
            skills,
            items,
            gear,
            events,
            treasure,
            monsters,
            bosses,
        } = raw;

        let board = Board::new(board)?;

        if jobs.is_empty() {
            return Err(GameError::InvalidContent("job table is empty".into()));
        }
        for (id, job) in jobs.iter_mut() {
            job.id = id.clone();
        }

        let skill_index = index_by_id("skill", skills.iter().map(|s| s.id.as_str()))?;
        if let Some(orphan) = skills.iter().find(|s| !jobs.contains_key(&s.job)) {
            return Err(GameError::unknown("job", orphan.job.clone()));
        }
        let item_index = index_by_id("item", items.iter().map(|i| i.id.as_str()))?;
        let gear_index = index_by_id("equipment", gear.iter().map(|g| g.id.as_str()))?;

        if events.is_empty() {
            return Err(GameError::InvalidContent("event table is empty".into()));
        }

        let treasure = treasure.population()?;
        if treasure.is_empty() {
            return Err(GameError::InvalidContent("treasure table is empty".into()));
        }

        if monsters.is_empty() || monsters.values().any(Vec::is_empty) {
            return Err(GameError::InvalidContent(
                "every monster depth bracket needs at least one monster".into(),
            ));
        }
        if bosses.is_empty() {
            return Err(GameError::InvalidContent("boss table is empty".into()));
        }

        debug!(
            jobs = jobs.len(),
            skills = skills.len(),
            items = items.len(),
            gear = gear.len(),
            events = events.len(),
            "content tables validated"
        );

        Ok(Self {
            board,
            jobs,
            skills,
            items,
            gear,
            events,
            treasure,
            monsters,
            bosses,
            skill_index,
            item_index,
            gear_index,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn job(&self, id: &str) -> Option<&JobDef> {
        self.jobs.get(id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobDef> {
        self.jobs.values()
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skill_index.get(id).map(|&i| &self.skills[i])
    }

    pub fn skills(&self) -> &[SkillDef] {
        &self.skills
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.item_index.get(id).map(|&i| &self.items[i])
    }

    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    pub fn gear(&self, id: &str) -> Option<&GearDef> {
        self.gear_index.get(id).map(|&i| &self.gear[i])
    }

    pub fn gear_list(&self) -> &[GearDef] {
        &self.gear
    }

    pub fn events(&self) -> &[EventDef] {
        &self.events
    }

    /// 财宝牌堆的全部牌面
    pub fn treasure_population(&self) -> &[u32] {
        &self.treasure
    }

    /// 最深的怪物档位
    pub fn max_depth_bracket(&self) -> u32 {
        self.monsters.keys().next_back().copied().unwrap_or(1)
    }

    fn clamp_depth(&self, depth: u32) -> u32 {
        depth.clamp(1, self.max_depth_bracket().max(1))
    }

    /// 深度截断到档位范围；档位有缺口时取较浅的最近一档
    pub fn monsters_for(&self, depth: u32) -> &[MonsterDef] {
        let d = self.clamp_depth(depth);
        self.monsters
            .range(..=d)
            .next_back()
            .or_else(|| self.monsters.iter().next())
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    /// 深度一致的 BOSS，没有则取最后一个
    pub fn boss_for(&self, depth: u32) -> Option<&MonsterDef> {
        let d = self.clamp_depth(depth);
        self.bosses
            .iter()
            .find(|b| b.depth == Some(d))
            .or_else(|| self.bosses.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_tables_load() {
        let content = ContentTables::builtin().unwrap();
        assert_eq!(content.board().len(), BOARD_SIZE);
        assert_eq!(content.board().boss_pos(), 39);
        assert!(content.job("swordsman").is_some());
        assert_eq!(content.job("mage").map(|j| j.id.as_str()), Some("mage"));
        assert!(content.skills().iter().all(|s| content.job(&s.job).is_some()));
        assert!(!content.treasure_population().is_empty());
    }

    #[test]
    fn test_builtin_catalog_is_fully_supported() {
        let content = ContentTables::builtin().unwrap();
        for skill in content.skills() {
            assert!(
                !matches!(skill.effect, SkillEffect::Unsupported { .. }),
                "{} uses an unsupported effect",
                skill.id
            );
        }
        for item in content.items() {
            assert!(!matches!(item.effect, ItemEffect::Unsupported { .. }), "{}", item.id);
        }
        for ev in content.events() {
            assert!(!matches!(ev.effect, EventEffect::Unknown { .. }), "{}", ev.name);
        }
    }

    #[test]
    fn test_monster_brackets_clamp() {
        let content = ContentTables::builtin().unwrap();
        let deepest = content.max_depth_bracket();
        assert_eq!(content.monsters_for(0), content.monsters_for(1));
        assert_eq!(content.monsters_for(deepest + 10), content.monsters_for(deepest));
        assert_eq!(content.boss_for(1).and_then(|b| b.depth), Some(1));
        assert_eq!(
            content.boss_for(99).map(|b| b.id.as_str()),
            content.boss_for(deepest).map(|b| b.id.as_str())
        );
    }

    #[test]
    fn test_load_dir_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentTables::load_dir(dir.path()).unwrap_err();
        match err {
            GameError::Io { path, .. } => assert!(path.ends_with(files::BOARD)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_round_trips_builtin_files() {
        let dir = tempfile::tempdir().unwrap();
        let sources = [
            (files::BOARD, include_str!("../data/board.json")),
            (files::JOBS, include_str!("../data/jobs.json")),
            (files::SKILLS, include_str!("../data/skills.json")),
            (files::ITEMS, include_str!("../data/items.json")),
            (files::EQUIPMENT, include_str!("../data/equipment.json")),
            (files::EVENTS, include_str!("../data/events.json")),
            (files::TREASURE, include_str!("../data/treasure.json")),
            (files::MONSTERS, include_str!("../data/monsters.json")),
            (files::BOSSES, include_str!("../data/bosses.json")),
        ];
        for (name, text) in sources {
            fs::write(dir.path().join(name), text).unwrap();
        }
        let content = ContentTables::load_dir(dir.path()).unwrap();
        assert_eq!(content.skills().len(), ContentTables::builtin().unwrap().skills().len());
    }

    #[test]
    fn test_broken_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(files::BOARD), "{ not json").unwrap();
        let err = ContentTables::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, GameError::Json { ref file, .. } if file == files::BOARD));
    }

    #[test]
    fn test_skill_for_unknown_job_is_rejected() {
        let mut raw = RawContent::from_sources(|file| {
            let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(file);
            fs::read_to_string(&dir).map_err(|source| GameError::Io { path: dir, source })
        })
        .unwrap();
        raw.skills[0].job = "necromancer".into();
        let err = ContentTables::from_raw(raw).unwrap_err();
        assert!(matches!(err, GameError::UnknownReference { kind: "job", .. }));
    }
}
