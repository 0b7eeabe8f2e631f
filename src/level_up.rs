//! 升级流程：每次升级抽一张技能，技能栏满时等待玩家弃掉一张；
//! 全部处理完才进入成长骰分配。

use std::sync::Arc;

use hero::progression::{self, GrowthChoice};
use serde::Serialize;
use tracing::debug;

use crate::phase::Phase;
use crate::session::{GameSession, NEXT_PLAYER};

/// 成长骰分配完之后去哪
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AfterGrowth {
    EndTurn,
    /// 击败 BOSS：接着问要不要回城
    BossReturn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelUpFlow {
    pub player: usize,
    /// 还要抽几次技能
    pub remaining: u32,
    /// 技能栏已满时等待处理的新技能
    pub pending: Option<String>,
    pub was_boss: bool,
}

/// 弃技能界面的数据：3 个已装备技能加新技能
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSkillChoice {
    pub player: usize,
    pub new_skill: String,
    pub options: Vec<String>,
}

impl GameSession {
    pub(crate) fn start_level_up_flow(&mut self, ups: u32, was_boss: bool) {
        self.level_up = Some(LevelUpFlow {
            player: self.turns.current(),
            remaining: ups,
            pending: None,
            was_boss,
        });
        self.advance_level_up();
    }

    /// 一直抽到需要玩家介入或抽完为止
    fn advance_level_up(&mut self) {
        let content = Arc::clone(&self.content);
        loop {
            let Some(flow) = self.level_up.as_mut() else {
                return;
            };
            if flow.remaining == 0 {
                let was_boss = flow.was_boss;
                self.level_up = None;
                self.finalize_victory(was_boss);
                return;
            }

            let player = &mut self.players[flow.player];
            let drawn = self
                .decks
                .skills
                .draw_matching(&mut self.rng, |id| !player.skills.contains(id));
            let Some(skill_id) = drawn else {
                let line = format!("{}: no new skills left to learn", player.id);
                flow.remaining = 0;
                self.note(line);
                continue;
            };
            let name = content.skill(&skill_id).map_or(skill_id.clone(), |s| s.name.clone());

            if player.skills.is_full() {
                let line = format!("{} draws {name}, but the skill slots are full", player.id);
                flow.pending = Some(skill_id);
                self.set_action_info(format!("New skill: {name}\nChoose one skill to discard."));
                self.note(line);
                return;
            }

            player.skills.equip(skill_id);
            let line = format!("{} learns {name}", player.id);
            flow.remaining -= 1;
            self.note(line);
        }
    }

    /// 弃掉一张技能：新技能本身，或某个已装备技能（由新技能顶替）
    pub fn discard_skill(&mut self, skill_id: &str) -> bool {
        if self.phase() != Phase::SkillDiscard {
            return self.decline("discard_skill");
        }
        let Some(flow) = self.level_up.as_mut() else {
            return false;
        };
        let Some(new_skill) = flow.pending.clone() else {
            return false;
        };
        let player = &mut self.players[flow.player];

        let line = if skill_id == new_skill {
            let name = self.content.skill(&new_skill).map_or(new_skill.as_str(), |s| s.name.as_str());
            format!("{} passes on {name}", player.id)
        } else if player.skills.replace(skill_id, new_skill.clone()) {
            format!("{} forgets {skill_id} and learns {new_skill}", player.id)
        } else {
            return self.decline("discard_skill");
        };
        debug!(discarded = skill_id, "skill discard");

        flow.pending = None;
        flow.remaining -= 1;
        self.note(line);
        self.advance_level_up();
        true
    }

    pub fn pending_skill_choice(&self) -> Option<PendingSkillChoice> {
        let flow = self.level_up.as_ref()?;
        let new_skill = flow.pending.clone()?;
        let mut options = self.players[flow.player].skills.equipped().to_vec();
        options.push(new_skill.clone());
        Some(PendingSkillChoice {
            player: flow.player,
            new_skill,
            options,
        })
    }

    pub fn after_growth(&self) -> Option<AfterGrowth> {
        self.after_growth
    }

    /// 消耗一颗成长骰；用完后继续原来的流程
    pub fn allocate_growth(&mut self, choice: GrowthChoice) -> bool {
        if self.phase() != Phase::GrowthAllocation {
            return self.decline("allocate_growth");
        }
        let idx = self.turns.current();
        let player = &mut self.players[idx];
        let Some(result) = progression::apply_growth(player, choice, &mut self.rng) else {
            return self.decline("allocate_growth");
        };
        let line = match choice {
            GrowthChoice::Hp | GrowthChoice::Mp => {
                format!("{} grows {choice} +{} ({} dice left)", player.id, result.amount, result.remaining)
            }
            GrowthChoice::Atk | GrowthChoice::Def => {
                format!("{} grows {choice} +1 die ({} dice left)", player.id, result.remaining)
            }
        };
        self.note(line);

        if result.remaining > 0 {
            self.set_action_info(format!("Allocate {} more growth dice.", result.remaining));
            return true;
        }
        match self.after_growth.take() {
            Some(AfterGrowth::BossReturn) => self.offer_return(true),
            Some(AfterGrowth::EndTurn) | None => {
                self.set_action_info("Growth complete.");
                self.wait_continue(NEXT_PLAYER);
            }
        }
        true
    }
}
