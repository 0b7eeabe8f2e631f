//! 游戏会话：一局游戏的全部可变状态，以及驱动方可调用的操作
//!
//! 所有操作都是同步的。玩家输入与当前阶段不符时返回 `false` 并写一条提示，
//! 状态保持不变；只有开局设置和内容表问题会返回错误。

use std::sync::Arc;

use combat::BattleSession;
use content::{ContentTables, EquipSlot};
use dice::GameRng;
use dungeon::Decks;
use error::GameError;
use hero::{GearPlacement, Player};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::choice::{ChoiceAction, DieTransfer, PendingChoice};
use crate::event_bus::{EventBus, GameEvent};
use crate::level_up::{AfterGrowth, LevelUpFlow};
use crate::log::EventLog;
use crate::phase::Phase;
use crate::scheduler::{Scheduled, Scheduler};
use crate::settings::GameSettings;
use crate::turn_system::{TurnState, TurnSystem};

pub(crate) const NEXT_PLAYER: &str = "Next player";

/// 终局排名的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub player: String,
    pub job: String,
    pub bank: u32,
    pub bag: u32,
    pub total: u32,
}

pub struct GameSession {
    pub(crate) content: Arc<ContentTables>,
    pub(crate) settings: GameSettings,
    pub(crate) rng: GameRng,
    pub(crate) players: Vec<Player>,
    pub(crate) turns: TurnSystem,
    pub(crate) decks: Decks,
    pub(crate) battle: Option<BattleSession>,
    pub(crate) pending_choice: Option<PendingChoice>,
    pub(crate) level_up: Option<LevelUpFlow>,
    pub(crate) after_growth: Option<AfterGrowth>,
    /// 「下一步」按钮的文字；存在即表示等待推进
    pub(crate) continue_gate: Option<String>,
    pub(crate) scheduler: Scheduler,
    pub(crate) log: EventLog,
    pub(crate) bus: EventBus,
    pub(crate) action_info: String,
    pub(crate) battle_info: String,
    pub(crate) standings: Vec<Standing>,
    pub(crate) abandoned: bool,
}

impl GameSession {
    /// 校验设置，创建玩家并发放初始技能、财宝、道具和装备
    pub fn new(content: Arc<ContentTables>, settings: GameSettings) -> Result<Self, GameError> {
        settings.validate(&content)?;

        let mut rng = match settings.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        info!(seed = rng.seed(), players = settings.player_count(), "starting game");

        let mut players = Vec::with_capacity(settings.player_count());
        for (i, job_id) in settings.jobs.iter().enumerate() {
            let job = content
                .job(job_id)
                .ok_or_else(|| GameError::unknown("job", job_id.clone()))?;
            players.push(Player::new(format!("P{}", i + 1), job, &mut rng));
        }

        let decks = Decks::build(&content, &mut rng);
        let turns = TurnSystem::new(players.len(), settings.round_limit);

        let mut session = Self {
            content,
            settings,
            rng,
            players,
            turns,
            decks,
            battle: None,
            pending_choice: None,
            level_up: None,
            after_growth: None,
            continue_gate: None,
            scheduler: Scheduler::default(),
            log: EventLog::default(),
            bus: EventBus::new(),
            action_info: String::new(),
            battle_info: String::new(),
            standings: Vec::new(),
            abandoned: false,
        };

        for idx in 0..session.players.len() {
            session.deal_starting_kit(idx);
        }

        session.note("=== Game start ===");
        session.begin_turn();
        Ok(session)
    }

    /// 本职业技能、一份财宝、一个道具、一件装备
    fn deal_starting_kit(&mut self, idx: usize) {
        let content = Arc::clone(&self.content);
        let player = &mut self.players[idx];
        let need = content.job(&player.job).map_or(0, |j| j.start_skill_count);

        for _ in 0..need {
            let job = player.job.clone();
            let drawn = self.decks.skills.draw_matching(&mut self.rng, |sid| {
                content.skill(sid).is_some_and(|s| s.job == job) && !player.skills.contains(sid)
            });
            let Some(skill_id) = drawn else {
                debug!(player = %player.id, "no more starting skills for this job");
                break;
            };
            player.skills.equip(skill_id);
        }

        let mut got = Vec::new();
        if let Some(base) = self.decks.treasure.draw(&mut self.rng) {
            let value = base * player.depth;
            player.bag.push(value);
            got.push(format!("treasure {value}G"));
        }
        if let Some(item_id) = self.decks.items.draw(&mut self.rng) {
            let name = content.item(&item_id).map_or(item_id.clone(), |i| i.name.clone());
            player.items.push(item_id);
            got.push(format!("item {name}"));
        }
        if let Some(gear_id) = self.decks.gear.draw(&mut self.rng) {
            let name = content.gear(&gear_id).map_or(gear_id.clone(), |g| g.name.clone());
            match player.add_gear(&content, &gear_id) {
                Ok(GearPlacement::Equipped(slot)) => got.push(format!("{name} (equipped as {slot})")),
                Ok(GearPlacement::Bagged) => got.push(format!("{name} (gear bag)")),
                Err(err) => warn!(%err, "starting gear rejected"),
            }
        }

        let line = format!("{} starts with {}", player.id, got.join(" / "));
        self.note(line);
    }

    // ===== 读取 =====

    pub fn phase(&self) -> Phase {
        if self.abandoned {
            Phase::Abandoned
        } else if self.pending_choice.is_some() {
            Phase::AwaitingChoice
        } else if self.turns.is_game_over() {
            Phase::GameOver
        } else if self.level_up.as_ref().is_some_and(|f| f.pending.is_some()) {
            Phase::SkillDiscard
        } else if self.after_growth.is_some() {
            Phase::GrowthAllocation
        } else if self.battle.is_some() {
            Phase::InBattle
        } else if self.continue_gate.is_some() {
            Phase::AwaitingContinue
        } else {
            Phase::AwaitingMove
        }
    }

    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// 直接修改玩家状态，供编辑工具和测试布置局面
    pub fn player_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    pub fn current_index(&self) -> usize {
        self.turns.current()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.turns.current()]
    }

    pub(crate) fn current_mut(&mut self) -> &mut Player {
        let idx = self.turns.current();
        &mut self.players[idx]
    }

    pub fn round(&self) -> u32 {
        self.turns.round()
    }

    pub fn battle(&self) -> Option<&BattleSession> {
        self.battle.as_ref()
    }

    pub fn scheduled(&self) -> Option<&Scheduled> {
        self.scheduler.peek()
    }

    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.pending_choice.as_ref()
    }

    pub fn continue_label(&self) -> Option<&str> {
        self.continue_gate.as_deref()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn action_info(&self) -> &str {
        &self.action_info
    }

    pub fn battle_info(&self) -> &str {
        &self.battle_info
    }

    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    pub fn event_history(&self) -> &[GameEvent] {
        self.bus.full_history()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.bus.drain().collect()
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    // ===== 内部工具 =====

    pub(crate) fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        debug!(target: "game_log", "{line}");
        self.log.push(line);
    }

    pub(crate) fn set_action_info(&mut self, text: impl Into<String>) {
        self.action_info = text.into();
    }

    pub(crate) fn publish(&mut self, event: GameEvent) {
        self.bus.publish(event);
    }

    /// 输入与当前阶段不符：提示后忽略
    pub(crate) fn decline(&mut self, what: &str) -> bool {
        warn!(action = what, phase = %self.phase(), "input declined");
        false
    }

    pub(crate) fn wait_continue(&mut self, label: &str) {
        self.continue_gate = Some(label.to_string());
    }

    /// 非战斗格的维护：已装备技能 CT -1
    pub(crate) fn upkeep(&mut self) {
        let idx = self.turns.current();
        self.players[idx].skills.tick_all(None);
        self.publish(GameEvent::CooldownUpkeep { player: idx });
    }

    // ===== 回合 =====

    pub(crate) fn begin_turn(&mut self) {
        let idx = self.turns.current();
        let round = self.turns.round();
        let content = Arc::clone(&self.content);
        let player = &mut self.players[idx];
        player.heal_mp(1);
        player.skills.tick_all(None);

        let job = content.job(&player.job).map_or(player.job.clone(), |j| j.name.clone());
        let line = format!("--- {} ({job}) turn / Round {round} ---", player.id);
        let info = format!("{}'s turn. Roll to move.", player.id);
        self.note(line);
        self.set_action_info(info);
        self.battle_info.clear();
        self.publish(GameEvent::TurnStarted { player: idx, round });
    }

    fn end_turn(&mut self) {
        self.continue_gate = None;
        let idx = self.turns.current();
        self.publish(GameEvent::TurnEnded { player: idx });

        match self.turns.end_turn() {
            TurnState::PlayerTurn => self.begin_turn(),
            TurnState::GameOver => self.finish_game(),
        }
    }

    /// 推进「下一步」
    pub fn continue_turn(&mut self) -> bool {
        if self.phase() != Phase::AwaitingContinue {
            return self.decline("continue");
        }
        self.end_turn();
        true
    }

    fn finish_game(&mut self) {
        let content = Arc::clone(&self.content);
        let mut rows: Vec<Standing> = self
            .players
            .iter()
            .map(|p| Standing {
                rank: 0,
                player: p.id.clone(),
                job: content.job(&p.job).map_or(p.job.clone(), |j| j.name.clone()),
                bank: p.bank_gold,
                bag: p.bag_value(),
                total: p.total_wealth(),
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }

        self.note("=== Game over ===");
        if let [solo] = rows.as_slice() {
            let line = format!(
                "Solo result: {} ({}) total {}G (banked {} / bag {})",
                solo.player, solo.job, solo.total, solo.bank, solo.bag
            );
            self.set_action_info(format!("Expedition over!\nFinal score: {}G", solo.total));
            self.note(line);
        } else {
            for row in &rows {
                let line = format!(
                    "#{}: {} ({}) total {}G (banked {} / bag {})",
                    row.rank, row.player, row.job, row.total, row.bank, row.bag
                );
                self.note(line);
            }
            self.set_action_info("Game over! Standings are in the log.");
        }

        info!(winner = ?rows.first().map(|r| &r.player), "game over");
        self.standings = rows;
        self.publish(GameEvent::GameOver);
    }

    // ===== 选择 =====

    /// 选中当前待选项中的第 `index` 个
    pub fn choose(&mut self, index: usize) -> bool {
        let Some(choice) = self.pending_choice.take() else {
            return self.decline("choose");
        };
        let Some(action) = choice.action(index).cloned() else {
            self.pending_choice = Some(choice);
            return self.decline("choose");
        };
        debug!(?action, "choice selected");

        match action {
            ChoiceAction::BankAndReturn { after_boss } => self.bank_and_return(after_boss),
            ChoiceAction::StayInDungeon { after_boss } => {
                self.set_action_info("Continuing the dive without banking.");
                if !after_boss {
                    self.upkeep();
                }
                self.wait_continue(NEXT_PLAYER);
            }
            ChoiceAction::TransferDie(dir) => self.transfer_die(dir),
            ChoiceAction::KeepGrowth => {
                self.set_action_info("Nothing changed.");
                self.upkeep();
                self.wait_continue(NEXT_PLAYER);
            }
            ChoiceAction::ReduceCt {
                item_id,
                skill_id,
                delta,
            } => return self.resolve_ct_target(&item_id, &skill_id, delta),
            ChoiceAction::CancelItem => return self.cancel_item(),
            ChoiceAction::ConfirmAbandon => self.abandon(),
            ChoiceAction::CancelAbandon => self.set_action_info("Cancelled."),
        }
        true
    }

    fn transfer_die(&mut self, dir: DieTransfer) {
        let player = self.current_mut();
        let (from, to, text) = match dir {
            DieTransfer::AtkToDef => (&mut player.atk_dice_bonus, &mut player.def_dice_bonus, "ATK -> DEF"),
            DieTransfer::DefToAtk => (&mut player.def_dice_bonus, &mut player.atk_dice_bonus, "DEF -> ATK"),
        };
        if *from > 0 {
            *from -= 1;
            *to += 1;
        }
        let line = format!("{} moves one growth die {text}", player.id);
        self.note(line);
        self.set_action_info(format!("Moved one growth die {text}."));
        self.upkeep();
        self.wait_continue(NEXT_PLAYER);
    }

    /// 回城点或击败 BOSS 后的入账选择
    pub(crate) fn offer_return(&mut self, after_boss: bool) {
        let bag = self.current_player().bag_value();
        let prompt = if after_boss {
            format!("Boss defeated!\nBank the {bag}G in your bag and return to the start?")
        } else {
            format!("Return point.\nBank the {bag}G in your bag and return to the start?")
        };
        self.set_action_info(prompt.clone());
        self.pending_choice = Some(
            PendingChoice::new(prompt)
                .option("Yes (return)", ChoiceAction::BankAndReturn { after_boss })
                .option("No (keep diving)", ChoiceAction::StayInDungeon { after_boss }),
        );
    }

    fn bank_and_return(&mut self, after_boss: bool) {
        let idx = self.turns.current();
        let player = &mut self.players[idx];
        let amount = player.bank_bag();
        player.reset_dive();
        let line = format!(
            "{} returns: banked {amount}G (bank {}G), back to START",
            player.id, player.bank_gold
        );
        let info = format!("Returned home.\nBanked {amount}G, total {}G.", player.bank_gold);
        self.note(line);
        self.set_action_info(info);
        self.publish(GameEvent::Banked { player: idx, amount });
        if !after_boss {
            self.upkeep();
        }
        self.wait_continue(NEXT_PLAYER);
    }

    // ===== 放弃 =====

    /// 弹出确认框；等待「下一步」或已有选择时拒绝
    pub fn request_abandon(&mut self) -> bool {
        if self.abandoned || self.continue_gate.is_some() || self.pending_choice.is_some() {
            return self.decline("request_abandon");
        }
        self.pending_choice = Some(
            PendingChoice::new("Quit this game and return to setup?")
                .option("Yes (quit)", ChoiceAction::ConfirmAbandon)
                .option("No (keep playing)", ChoiceAction::CancelAbandon),
        );
        true
    }

    /// 直接放弃，不再确认
    pub fn abandon(&mut self) {
        self.abandoned = true;
        self.pending_choice = None;
        self.scheduler.clear();
        self.note("=== Game abandoned ===");
        self.set_action_info("Returned to setup.");
        info!("game abandoned");
    }

    // ===== 装备整理 =====

    /// 把装备袋第 `index` 件装上，原装备回袋
    pub fn equip_from_bag(&mut self, index: usize) -> bool {
        if !self.phase().allows_gear_changes() {
            return self.decline("equip_from_bag");
        }
        let content = Arc::clone(&self.content);
        let player = self.current_mut();
        match player.equip_from_bag(&content, index) {
            Ok(old) => {
                let line = match old {
                    Some(old) => format!("{} swaps equipment ({old} back to the bag)", player.id),
                    None => format!("{} equips a piece from the bag", player.id),
                };
                self.note(line);
                true
            }
            Err(err) => {
                self.set_action_info(err.to_string());
                self.decline("equip_from_bag")
            }
        }
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> bool {
        if !self.phase().allows_gear_changes() {
            return self.decline("unequip");
        }
        let player = self.current_mut();
        match player.unequip(slot) {
            Ok(gear_id) => {
                let line = format!("{} unequips {gear_id} ({slot})", player.id);
                self.note(line);
                true
            }
            Err(err) => {
                self.set_action_info(err.to_string());
                self.decline("unequip")
            }
        }
    }
}
