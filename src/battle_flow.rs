//! 会话层的战斗流程：开战、转发玩家行动、延迟反击和战后结算

use std::sync::Arc;

use combat::{ActionOutcome, BattleKind, BattleSession, Combat, CombatResult, exp_gained};
use hero::progression;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::choice::{ChoiceAction, PendingChoice};
use crate::event_bus::{BattleEnd, GameEvent};
use crate::level_up::AfterGrowth;
use crate::phase::Phase;
use crate::scheduler::Directive;
use crate::session::{GameSession, NEXT_PLAYER};

/// 战斗中玩家可以提交的行动
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleAction {
    Attack,
    Skill(String),
    Item(String),
    Escape,
}

impl GameSession {
    pub(crate) fn start_battle(&mut self, kind: BattleKind) {
        let idx = self.turns.current();
        let content = Arc::clone(&self.content);
        let player = &mut self.players[idx];
        let atk_mod = std::mem::take(&mut player.next_battle_atk_mod);
        let def_mod = std::mem::take(&mut player.next_battle_def_mod);
        let depth = player.depth;

        let enemy = match kind {
            BattleKind::Normal => self.rng.choose(content.monsters_for(depth)),
            BattleKind::Boss => content.boss_for(depth),
        };
        let Some(enemy) = enemy else {
            warn!(?kind, depth, "no enemy defined for this depth");
            self.note("The room is empty. Nothing to fight.");
            self.upkeep();
            self.wait_continue(NEXT_PLAYER);
            return;
        };

        let battle = BattleSession::new(kind, enemy, atk_mod, def_mod);
        let header = if kind == BattleKind::Boss { "BOSS battle" } else { "Battle" };
        let line = format!(
            "{header}: {} vs {} (HP {} / ATK {} / DEF {})",
            self.players[idx].id, enemy.name, enemy.hp, enemy.atk_expr, enemy.def_expr
        );
        self.note(line);
        self.battle_info = format!(
            "{header} start! {} appears.\nWeakness: {}\nTurn 1/{}",
            enemy.name, enemy.weakness, battle.turn_limit
        );
        self.set_action_info("Choose an action.");
        info!(enemy = %enemy.id, ?kind, depth, "battle start");
        self.publish(GameEvent::BattleStarted {
            player: idx,
            enemy: enemy.id.clone(),
            kind,
        });
        self.battle = Some(battle);
    }

    /// 提交一个战斗行动；被拒绝时返回 false，状态不变
    pub fn battle_action(&mut self, action: BattleAction) -> bool {
        if self.phase() != Phase::InBattle || self.scheduler.is_pending() {
            return self.decline("battle_action");
        }
        let result = self.with_combat(|combat| match &action {
            BattleAction::Attack => combat.normal_attack(),
            BattleAction::Skill(id) => combat.cast_skill(id),
            BattleAction::Item(id) => combat.use_item(id),
            BattleAction::Escape => combat.escape(),
        });
        match result {
            Some(result) => self.apply_combat_result(result, false),
            None => self.decline("battle_action"),
        }
    }

    /// 执行已登记的敌方反击。驱动方在延迟结束后调用
    pub fn run_scheduled(&mut self) -> bool {
        let Some(scheduled) = self.scheduler.take() else {
            return false;
        };
        match scheduled.directive {
            Directive::EnemyReply { skip_ct } => {
                let result = self.with_combat(|combat| combat.enemy_reply(skip_ct.as_deref()));
                match result {
                    Some(result) => self.apply_combat_result(result, true),
                    None => false,
                }
            }
        }
    }

    fn with_combat<F>(&mut self, f: F) -> Option<CombatResult>
    where
        F: FnOnce(&mut Combat<'_>) -> CombatResult,
    {
        let idx = self.turns.current();
        let content = Arc::clone(&self.content);
        let battle = self.battle.as_mut()?;
        let mut combat = Combat::new(
            battle,
            &mut self.players[idx],
            &content,
            &mut self.rng,
            &mut self.decks.treasure,
        );
        Some(f(&mut combat))
    }

    fn apply_combat_result(&mut self, result: CombatResult, append: bool) -> bool {
        let CombatResult { logs, info, outcome } = result;
        let outcome = match outcome {
            ActionOutcome::Rejected(reason) => {
                warn!(%reason, "battle action rejected");
                self.set_action_info(info.join("\n"));
                return false;
            }
            other => other,
        };

        for line in logs {
            self.note(line);
        }
        let text = info.join("\n");
        if append && !self.battle_info.is_empty() {
            self.battle_info.push('\n');
            self.battle_info.push_str(&text);
        } else {
            self.battle_info = text;
        }

        match outcome {
            ActionOutcome::Rejected(_) | ActionOutcome::PlayerTurn => self.set_action_info("Your move."),
            ActionOutcome::EnemyTurn { skip_ct } => {
                let delay_ms = self.settings.result_delay_ms;
                self.scheduler.schedule(Directive::EnemyReply { skip_ct }, delay_ms);
                self.set_action_info("The enemy is about to act...");
                self.publish(GameEvent::EnemyReplyScheduled { delay_ms });
            }
            ActionOutcome::ChooseCtTarget { item_id, delta } => self.offer_ct_target(item_id, delta),
            ActionOutcome::Victory => self.on_battle_win(),
            ActionOutcome::Defeat => self.on_player_death(),
            ActionOutcome::Escaped => self.retreat(BattleEnd::Escaped),
            ActionOutcome::TimedOut => self.retreat(BattleEnd::TimedOut),
        }
        true
    }

    fn offer_ct_target(&mut self, item_id: String, delta: u32) {
        let content = Arc::clone(&self.content);
        let player = self.current_player();
        let mut choice = PendingChoice::new(format!("Reduce which skill's CT by {delta}?"));
        for skill_id in player.skills.equipped() {
            let name = content.skill(skill_id).map_or(skill_id.as_str(), |s| s.name.as_str());
            let label = format!("{name} (CT {})", player.skills.cooldown(skill_id));
            choice = choice.option(
                label,
                ChoiceAction::ReduceCt {
                    item_id: item_id.clone(),
                    skill_id: skill_id.clone(),
                    delta,
                },
            );
        }
        self.set_action_info(choice.prompt.clone());
        self.pending_choice = Some(choice.option("Cancel", ChoiceAction::CancelItem));
    }

    pub(crate) fn resolve_ct_target(&mut self, item_id: &str, skill_id: &str, delta: u32) -> bool {
        match self.with_combat(|combat| combat.apply_ct_reduction(item_id, skill_id, delta)) {
            Some(result) => self.apply_combat_result(result, false),
            None => false,
        }
    }

    pub(crate) fn cancel_item(&mut self) -> bool {
        match self.with_combat(|combat| combat.cancel_item()) {
            Some(result) => self.apply_combat_result(result, false),
            None => false,
        }
    }

    fn on_battle_win(&mut self) {
        let Some(battle) = self.battle.take() else {
            return;
        };
        self.scheduler.clear();
        let idx = self.turns.current();
        let content = Arc::clone(&self.content);
        let gained = exp_gained(&battle);
        let was_boss = battle.is_boss();

        let player = &mut self.players[idx];
        let before_level = player.level;
        let ups = progression::add_exp(player, &content, gained);
        let line = format!("{} defeats {} and gains {gained} EXP", player.id, battle.enemy.name);
        let level = player.level;
        self.note(line);
        self.set_action_info(format!("Victory! +{gained} EXP"));
        self.publish(GameEvent::BattleEnded {
            player: idx,
            end: BattleEnd::Victory,
        });
        self.publish(GameEvent::ExpGained {
            player: idx,
            amount: gained,
        });
        if ups > 0 {
            self.note(format!("Level up! Lv{before_level} -> Lv{level}"));
            self.publish(GameEvent::LevelUp { player: idx, level });
            self.start_level_up_flow(ups, was_boss);
        } else {
            self.finalize_victory(was_boss);
        }
    }

    /// 升级流程（若有）结束后的收尾
    pub(crate) fn finalize_victory(&mut self, was_boss: bool) {
        if self.current_player().growth_dice > 0 {
            let dice = self.current_player().growth_dice;
            self.set_action_info(format!("Allocate {dice} growth dice: HP / MP / ATK / DEF"));
            self.after_growth = Some(if was_boss {
                AfterGrowth::BossReturn
            } else {
                AfterGrowth::EndTurn
            });
        } else if was_boss {
            self.offer_return(true);
        } else {
            self.wait_continue(NEXT_PLAYER);
        }
    }

    fn on_player_death(&mut self) {
        let Some(battle) = self.battle.take() else {
            return;
        };
        self.scheduler.clear();
        let idx = self.turns.current();
        let player = &mut self.players[idx];
        let lost = player.bag_value();
        player.die();
        let line = format!(
            "{} falls to {}! Lost {lost}G of treasure and returned to START",
            player.id, battle.enemy.name
        );
        self.note(line);
        self.set_action_info(format!("Defeated... lost {lost}G and returned to START."));
        info!(player = idx, lost, "player died");
        self.publish(GameEvent::BattleEnded {
            player: idx,
            end: BattleEnd::Defeat,
        });
        self.publish(GameEvent::PlayerDied { player: idx });
        self.wait_continue(NEXT_PLAYER);
    }

    /// 逃跑或超时：后退一格，下一次落格效果跳过
    fn retreat(&mut self, end: BattleEnd) {
        if self.battle.take().is_none() {
            return;
        }
        self.scheduler.clear();
        let idx = self.turns.current();
        let player = &mut self.players[idx];
        let from = player.pos;
        player.pos = (player.pos + content::BOARD_SIZE - 1) % content::BOARD_SIZE;
        player.skip_next_tile = true;
        let to = player.pos;
        let line = match end {
            BattleEnd::TimedOut => format!("Time is up! {} retreats one tile", player.id),
            _ => format!("{} escapes and retreats one tile", player.id),
        };
        self.note(line);
        self.publish(GameEvent::BattleEnded { player: idx, end });
        self.publish(GameEvent::Moved {
            player: idx,
            from,
            to,
            forced: None,
        });
        self.resolve_tile(0);
    }
}
