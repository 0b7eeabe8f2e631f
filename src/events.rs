//! 事件格：抽一张事件并结算效果

use std::sync::Arc;

use content::{EventDef, EventEffect};
use dungeon::teleport;
use hero::GearPlacement;
use tracing::{debug, warn};

use crate::choice::{ChoiceAction, DieTransfer, PendingChoice};
use crate::event_bus::GameEvent;
use crate::session::{GameSession, NEXT_PLAYER};
use crate::tile::MAX_EVENT_CHAIN;

/// 事件结算后回合的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventStep {
    /// 调用方负责维护与「下一步」
    Done,
    /// 已经移动并结算了新格子
    Moved,
    /// 等待玩家选择
    Paused,
}

impl GameSession {
    pub(crate) fn apply_event(&mut self, chain: u32) -> EventStep {
        if chain >= MAX_EVENT_CHAIN {
            self.note("The chain of events fizzles out. Staying put.");
            self.set_action_info("Too many events in a row: nothing more happens.");
            self.upkeep();
            self.wait_continue(NEXT_PLAYER);
            return EventStep::Moved;
        }

        let content = Arc::clone(&self.content);
        let Some(event) = self.rng.choose(content.events()) else {
            self.note("The event deck is empty.");
            return EventStep::Done;
        };

        let idx = self.turns.current();
        let line = format!("{} triggers an event: {}", self.players[idx].id, event.name);
        self.note(line);
        self.set_action_info(format!("Event: {}\n{}", event.name, event.desc));
        self.publish(GameEvent::EventTriggered {
            player: idx,
            event: event_label(event),
        });
        debug!(event = %event.name, effect = ?event.effect, chain, "apply event");

        match &event.effect {
            EventEffect::GainTreasure { count } => {
                self.gain_treasure(*count);
            }
            EventEffect::GainItem { count } => self.gain_items(*count),
            EventEffect::GainEquip { count } => self.gain_gear(*count),
            EventEffect::LoseLowestTreasure => self.lose_lowest(),
            EventEffect::StealLowestTreasure => self.steal_lowest(),
            EventEffect::DisableEquippedItem => self.break_gear(),
            EventEffect::HealAndMp { hp, mp } => {
                let roll = hp.roll_plain(&mut self.rng);
                let player = &mut self.players[idx];
                let healed = player.heal_hp(roll.total);
                let restored = player.heal_mp(*mp);
                let line = format!("{} recovers HP {roll} (+{healed}) and MP +{restored}", player.id);
                self.note(line);
            }
            EventEffect::NextBattleAtkFlatMod { delta } => {
                let player = &mut self.players[idx];
                player.next_battle_atk_mod += delta;
                let line = format!("{}: next battle ATK {delta:+}", player.id);
                self.note(line);
            }
            EventEffect::NextBattleDefFlatMod { delta } => {
                let player = &mut self.players[idx];
                player.next_battle_def_mod += delta;
                let line = format!("{}: next battle DEF {delta:+}", player.id);
                self.note(line);
            }
            EventEffect::WarpByD6 { odd_delta, even_delta } => {
                let r = self.rng.d6();
                let delta = if r % 2 == 1 { *odd_delta } else { *even_delta };
                self.note(format!("Rolled {r}: warp {delta:+} tiles"));
                self.move_relative(delta, chain);
                return EventStep::Moved;
            }
            EventEffect::LostAndFound => {
                if self.rng.random_bool(0.5) {
                    self.note("Found a lost item on the floor!");
                    self.gain_items(1);
                } else {
                    self.note("Found a piece of lost equipment!");
                    self.gain_gear(1);
                }
            }
            EventEffect::TransferAtkDefDie => return self.offer_die_transfer(),
            EventEffect::MoveByD6 => {
                let r = self.rng.d6();
                self.note(format!("Rolled {r}: move forward {r} tiles"));
                self.move_relative(r as i32, chain);
                return EventStep::Moved;
            }
            EventEffect::MoveTo { pos } => {
                self.teleport_current(teleport(*pos), chain);
                return EventStep::Moved;
            }
            EventEffect::MoveToBoss => {
                let boss = content.board().boss_pos();
                self.teleport_current(boss, chain);
                return EventStep::Moved;
            }
            EventEffect::Unknown { key } => {
                warn!(key = %key, "unknown event effect, granting one treasure instead");
                self.note("Nothing obvious happens... but you pocket a trinket.");
                self.gain_treasure(1);
            }
        }

        EventStep::Done
    }

    /// 事件带来的移动：照常逐格行走并结算新格子
    fn move_relative(&mut self, steps: i32, chain: u32) {
        self.walk_current(steps);
        self.resolve_tile(chain + 1);
    }

    fn teleport_current(&mut self, to: usize, chain: u32) {
        let idx = self.turns.current();
        let player = &mut self.players[idx];
        let from = player.pos;
        player.pos = to;
        let line = format!("{} is teleported {from} -> {to}", player.id);
        self.note(line);
        self.publish(GameEvent::Moved {
            player: idx,
            from,
            to,
            forced: None,
        });
        self.resolve_tile(chain + 1);
    }

    /// 抽 `count` 份财宝（基础值 × 深度）放进背包
    pub(crate) fn gain_treasure(&mut self, count: u32) -> Vec<u32> {
        let idx = self.turns.current();
        let mut gained = Vec::new();
        for _ in 0..count {
            let Some(base) = self.decks.treasure.draw(&mut self.rng) else {
                break;
            };
            let player = &mut self.players[idx];
            let value = base * player.depth;
            player.bag.push(value);
            gained.push(value);
        }
        let id = self.players[idx].id.clone();
        if gained.is_empty() {
            self.note(format!("{id} finds no treasure"));
        } else {
            let list: Vec<String> = gained.iter().map(|v| format!("{v}G")).collect();
            self.note(format!("{id} gains treasure: {}", list.join(", ")));
        }
        gained
    }

    fn gain_items(&mut self, count: u32) {
        let idx = self.turns.current();
        let content = Arc::clone(&self.content);
        for _ in 0..count {
            let Some(item_id) = self.decks.items.draw(&mut self.rng) else {
                break;
            };
            let name = content.item(&item_id).map_or(item_id.clone(), |i| i.name.clone());
            let player = &mut self.players[idx];
            player.items.push(item_id);
            let line = format!("{} gains item: {name}", player.id);
            self.note(line);
        }
    }

    fn gain_gear(&mut self, count: u32) {
        let idx = self.turns.current();
        let content = Arc::clone(&self.content);
        for _ in 0..count {
            let Some(gear_id) = self.decks.gear.draw(&mut self.rng) else {
                break;
            };
            let name = content.gear(&gear_id).map_or(gear_id.clone(), |g| g.name.clone());
            let player = &mut self.players[idx];
            let line = match player.add_gear(&content, &gear_id) {
                Ok(GearPlacement::Equipped(slot)) => format!("{} equips {name} ({slot})", player.id),
                Ok(GearPlacement::Bagged) => format!("{} stows {name} in the gear bag", player.id),
                Err(err) => {
                    warn!(%err, gear = %gear_id, "gear from event rejected");
                    continue;
                }
            };
            self.note(line);
        }
    }

    fn lose_lowest(&mut self) {
        let player = self.current_mut();
        let line = match player.remove_lowest_treasure() {
            Some(v) => format!("{} loses a {v}G treasure", player.id),
            None => format!("{} has nothing to lose", player.id),
        };
        self.note(line);
    }

    /// 从随机一名背包非空的其他玩家手里拿走最低的财宝
    fn steal_lowest(&mut self) {
        let idx = self.turns.current();
        let victims: Vec<usize> = (0..self.players.len())
            .filter(|&i| i != idx && !self.players[i].bag.is_empty())
            .collect();
        let Some(&victim) = self.rng.choose(&victims) else {
            self.note("There is no one to steal from.");
            return;
        };
        let Some(value) = self.players[victim].remove_lowest_treasure() else {
            return;
        };
        self.players[idx].bag.push(value);
        let line = format!(
            "{} steals a {value}G treasure from {}",
            self.players[idx].id, self.players[victim].id
        );
        self.note(line);
    }

    /// 随机一件已装备的装备损坏消失
    fn break_gear(&mut self) {
        let idx = self.turns.current();
        let slots = self.players[idx].equipment.occupied();
        let Some(&slot) = self.rng.choose(&slots) else {
            self.note("No equipment to break.");
            return;
        };
        let player = &mut self.players[idx];
        if let Some(gear_id) = player.equipment.take(slot) {
            let line = format!("{}'s {gear_id} breaks ({slot})", player.id);
            self.note(line);
        }
    }

    fn offer_die_transfer(&mut self) -> EventStep {
        let player = self.current_player();
        let mut choice = PendingChoice::new("Move one growth die between ATK and DEF?");
        let mut any = false;
        if player.atk_dice_bonus > 0 {
            choice = choice.option("ATK -> DEF", ChoiceAction::TransferDie(DieTransfer::AtkToDef));
            any = true;
        }
        if player.def_dice_bonus > 0 {
            choice = choice.option("DEF -> ATK", ChoiceAction::TransferDie(DieTransfer::DefToAtk));
            any = true;
        }
        if !any {
            let line = format!("{} has no growth dice to move", player.id);
            self.note(line);
            return EventStep::Done;
        }
        self.set_action_info(choice.prompt.clone());
        self.pending_choice = Some(choice.option("Keep as is", ChoiceAction::KeepGrowth));
        EventStep::Paused
    }
}

fn event_label(event: &EventDef) -> String {
    if event.id.is_empty() {
        event.name.clone()
    } else {
        event.id.clone()
    }
}
