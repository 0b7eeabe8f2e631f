// src/combat/src/item_use.rs
use content::ItemEffect;
use tracing::warn;

use crate::{ActionOutcome, Combat, CombatResult, Rejection, constants};

impl Combat<'_> {
    /// Uses an inventory item. The item is consumed only once its effect resolves.
    pub fn use_item(&mut self, item_id: &str) -> CombatResult {
        if self.battle.locked {
            return CombatResult::rejected(Rejection::Locked);
        }
        let content = self.content;
        let Some(item) = content.item(item_id) else {
            return CombatResult::rejected(Rejection::UnknownItem(item_id.to_string()));
        };
        if !self.player.items.iter().any(|id| id == item_id) {
            return CombatResult::rejected(Rejection::ItemNotOwned(item.name.clone()));
        }
        if item.free_action && self.battle.free_item_used {
            return CombatResult::rejected(Rejection::FreeItemUsed);
        }

        self.battle.locked = true;

        if let ItemEffect::ReduceSkillCt { delta } = item.effect {
            if self.player.skills.is_empty() {
                self.battle.locked = false;
                return CombatResult::rejected(Rejection::NoSkillToTarget(item.name.clone()));
            }
            self.info(format!("{}: choose a skill (CT -{delta})", item.name));
            return self.finish(ActionOutcome::ChooseCtTarget {
                item_id: item_id.to_string(),
                delta,
            });
        }

        let pid = self.player.id.clone();
        let name = item.name.as_str();
        match &item.effect {
            ItemEffect::HealHp { expr } => {
                let roll = expr.roll_plain(&mut *self.rng);
                let healed = self.player.heal_hp(roll.total);
                self.info(format!(
                    "HP +{healed} ({expr} -> {roll}) | HP {}/{}",
                    self.player.hp, self.player.hp_max
                ));
                self.log(format!("{pid} uses {name}: HP +{healed}"));
            }
            ItemEffect::HealMp { expr } => {
                let roll = expr.roll_plain(&mut *self.rng);
                let healed = self.player.heal_mp(roll.total);
                self.info(format!(
                    "MP +{healed} ({expr} -> {roll}) | MP {}/{}",
                    self.player.mp, self.player.mp_max
                ));
                self.log(format!("{pid} uses {name}: MP +{healed}"));
            }
            ItemEffect::BuffEvadeTurns { turns } => {
                let status = &mut self.battle.status;
                status.evade_turns = status.evade_turns.max(*turns);
                self.info(format!("Evading enemy attacks for {turns} turn(s)"));
                self.log(format!("{pid} uses {name}: evade {turns}"));
            }
            ItemEffect::BuffNextDamageMinusFlat { flat } => {
                let status = &mut self.battle.status;
                status.next_damage_minus = status.next_damage_minus.max(*flat);
                self.info(format!("Next damage taken -{flat}"));
                self.log(format!("{pid} uses {name}: ward -{flat}"));
            }
            ItemEffect::EscapeBonusNext { add } => {
                self.battle.status.escape_bonus_next += add;
                self.info(format!("Next escape roll +{add}"));
                self.log(format!("{pid} uses {name}: escape +{add}"));
            }
            ItemEffect::NextAttackElement { element } => {
                self.battle.status.next_attack_element = Some(*element);
                self.info(format!("Next attack becomes {element}"));
                self.log(format!("{pid} uses {name}: next attack {element}"));
            }
            ItemEffect::NextAttackAtkFlat { add } => {
                self.battle.status.next_atk_flat += add;
                self.info(format!("Next attack ATK +{add}"));
                self.log(format!("{pid} uses {name}: next ATK +{add}"));
            }
            ItemEffect::DealFixedDamage { damage, element } => {
                let weak = *element == self.battle.enemy.weakness;
                let mut dmg = (*damage).max(0);
                if weak {
                    dmg *= constants::WEAKNESS_MULT;
                }
                self.battle.enemy.take_damage(dmg);
                self.info(format!(
                    "{name}: {dmg} {element} damage{} | enemy HP {}/{}",
                    if weak { " (weakness x2)" } else { "" },
                    self.battle.enemy.hp,
                    self.battle.enemy.hp_max
                ));
                self.log(format!("{pid} uses {name}: {dmg} damage"));
                if !self.battle.enemy.is_alive() {
                    self.consume(item_id);
                    self.battle.locked = false;
                    return self.finish(ActionOutcome::Victory);
                }
            }
            ItemEffect::ApplyPoison { turns, poison } => {
                self.battle.enemy.apply_poison(*turns, *poison);
                self.info(format!(
                    "Poisoned for {turns} turns ({} per turn)",
                    self.battle.enemy.poison_expr
                ));
                self.log(format!("{pid} uses {name}: poison {turns}"));
            }
            ItemEffect::DebuffEnemyDefFlat { delta, turns } => {
                self.battle.enemy.debuff_def(*delta, *turns);
                self.info(format!("Enemy DEF {delta:+} for {turns} turns"));
                self.log(format!("{pid} uses {name}: enemy DEF {delta:+} ({turns} turns)"));
            }
            ItemEffect::CleanseSelf => {
                self.battle.status.cleanse_all();
                self.info("All temporary effects cleared");
                self.log(format!("{pid} uses {name}: cleanse"));
            }
            ItemEffect::Unsupported { key } => {
                warn!(item = %item_id, key = %key, "unsupported item effect");
                self.info(format!("Effect {key:?} is not supported"));
                self.log(format!("{pid} uses {name}: unsupported effect {key}"));
            }
            ItemEffect::ReduceSkillCt { .. } => {}
        }

        self.consume(item_id);
        let outcome = self.after_item(item.free_action);
        self.finish(outcome)
    }

    /// Resolves a pending CT reduction against the chosen skill.
    pub fn apply_ct_reduction(&mut self, item_id: &str, skill_id: &str, delta: u32) -> CombatResult {
        let content = self.content;
        let item_name = content.item(item_id).map(|i| i.name.clone()).unwrap_or_else(|| item_id.to_string());
        let free = content.item(item_id).is_none_or(|i| i.free_action);
        let Some((before, after)) = self.player.skills.reduce(skill_id, delta) else {
            self.battle.locked = false;
            return CombatResult::rejected(Rejection::SkillNotEquipped(skill_id.to_string()));
        };

        let skill_name = content.skill(skill_id).map(|s| s.name.as_str()).unwrap_or(skill_id);
        self.info(format!("{skill_name} CT {before} -> {after}"));
        self.log(format!("{} uses {item_name}: {skill_name} CT -{delta}", self.player.id));

        self.consume(item_id);
        let outcome = self.after_item(free);
        self.finish(outcome)
    }

    /// Backs out of a pending target choice. Nothing is consumed.
    pub fn cancel_item(&mut self) -> CombatResult {
        self.info("Item use cancelled");
        self.finish(ActionOutcome::PlayerTurn)
    }

    fn consume(&mut self, item_id: &str) {
        if let Some(idx) = self.player.items.iter().position(|id| id == item_id) {
            self.player.items.remove(idx);
        }
    }

    fn after_item(&mut self, free: bool) -> ActionOutcome {
        if free {
            self.battle.free_item_used = true;
            ActionOutcome::PlayerTurn
        } else {
            self.proceed(None)
        }
    }
}
