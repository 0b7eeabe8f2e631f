// src/combat/src/skill_cast.rs
use content::{Element, FixedScale, SkillEffect};
use tracing::{info, warn};

use crate::{ActionOutcome, AttackOpts, Combat, CombatResult, Rejection};

impl Combat<'_> {
    /// Casts an equipped skill. MP and CT are paid before the effect resolves.
    pub fn cast_skill(&mut self, skill_id: &str) -> CombatResult {
        if self.battle.locked {
            return CombatResult::rejected(Rejection::Locked);
        }
        let content = self.content;
        let Some(skill) = content.skill(skill_id) else {
            return CombatResult::rejected(Rejection::UnknownSkill(skill_id.to_string()));
        };
        if !self.player.skills.contains(skill_id) {
            return CombatResult::rejected(Rejection::SkillNotEquipped(skill.name.clone()));
        }

        let cur_ct = self.player.skills.cooldown(skill_id);
        if cur_ct > 0 {
            return CombatResult::rejected(Rejection::OnCooldown {
                name: skill.name.clone(),
                ct: cur_ct,
            });
        }
        let cost = self.player.skill_mp_cost(content, skill);
        if self.player.mp < cost {
            return CombatResult::rejected(Rejection::NotEnoughMp {
                name: skill.name.clone(),
                need: cost,
                have: self.player.mp,
            });
        }
        if skill.effect == SkillEffect::WinBattleOncePerDive && self.player.win_once_used {
            return CombatResult::rejected(Rejection::WinOnceUsed(skill.name.clone()));
        }

        self.battle.locked = true;
        let ct = self.player.skill_ct(content, skill);
        self.player.spend_mp(cost);
        self.player.skills.set_cooldown(skill_id, ct);
        self.info(format!("Skill {} (MP -{cost}, CT {ct})", skill.name));

        let pid = self.player.id.clone();
        let name = skill.name.as_str();
        let element = skill.element;
        let skip = Some(skill_id.to_string());

        let outcome = match &skill.effect {
            SkillEffect::AttackMinDie { min } => {
                let opts = AttackOpts {
                    min_die: Some(*min),
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::AttackFixedDamage { scale, mul } => {
                let fixed = match scale {
                    FixedScale::Level => self.player.level as i32 * mul,
                    FixedScale::Flat => *mul,
                };
                let opts = AttackOpts {
                    fixed: Some(fixed),
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: fixed {fixed}, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::AttackElementMagic => {
                let dmg = self.attack_once(name, AttackOpts::with_element(Element::Magic));
                self.log(format!("{pid} uses {name}: {dmg} magic damage"));
                self.proceed(skip)
            }
            SkillEffect::AttackAtkFlat { add } => {
                let opts = AttackOpts {
                    atk_flat_add: *add,
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: ATK +{add}, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::BuffTripleWhileHp1 => {
                self.battle.status.hp1_triple = true;
                self.info("Damage x3 while HP is exactly 1 (this battle)");
                self.log(format!("{pid} uses {name}: last stand"));
                self.proceed(skip)
            }
            SkillEffect::AttackAtkMult { mul } => {
                let opts = AttackOpts {
                    mult: *mul,
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: x{mul}, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::DebuffEnemyDefFlat { delta, turns } => {
                self.battle.enemy.debuff_def(*delta, *turns);
                self.info(format!("Enemy DEF {delta:+} for {turns} turns"));
                self.log(format!("{pid} uses {name}: enemy DEF {delta:+} ({turns} turns)"));
                self.proceed(skip)
            }
            SkillEffect::HpToMp => {
                let loss = self.rng.d6() as i32;
                let (hp_before, mp_before) = (self.player.hp, self.player.mp);
                self.player.hp = (self.player.hp - loss).max(1);
                self.player.mp = (self.player.mp + loss).min(self.player.mp_max);
                self.info(format!(
                    "HP -{loss} / MP +{loss}: HP {hp_before}->{} MP {mp_before}->{}",
                    self.player.hp, self.player.mp
                ));
                self.log(format!("{pid} uses {name}: HP->MP {loss}"));
                self.proceed(skip)
            }
            SkillEffect::MpToAtk => {
                let need = self.rng.d6() as i32;
                if self.player.mp <= 0 {
                    self.info(format!("{name} fizzles: no MP left"));
                    self.log(format!("{pid} uses {name}: fizzled"));
                    ActionOutcome::PlayerTurn
                } else {
                    let pay = self.player.mp.min(need);
                    self.player.spend_mp(pay);
                    self.info(format!("Burned {pay} MP (1d6={need})"));
                    let opts = AttackOpts {
                        atk_flat_add: pay,
                        ..AttackOpts::with_element(element)
                    };
                    let dmg = self.attack_once(name, opts);
                    self.log(format!("{pid} uses {name}: MP->ATK {pay}, {dmg} damage"));
                    self.proceed(skip)
                }
            }
            SkillEffect::BuffAtkDefPlus1d6 => {
                let add = self.rng.d6() as i32;
                self.battle.mods.atk_flat += add;
                self.battle.mods.def_flat += add;
                self.info(format!("ATK +{add} / DEF +{add} for this battle"));
                self.log(format!("{pid} uses {name}: ATK/DEF +{add}"));
                self.proceed(skip)
            }
            SkillEffect::BuffBattleExpMult { mul } => {
                self.battle.exp_mult *= mul;
                self.info(format!("EXP x{mul} (now x{})", self.battle.exp_mult));
                self.log(format!("{pid} uses {name}: exp x{}", self.battle.exp_mult));
                self.proceed(skip)
            }
            SkillEffect::WinBattleOncePerDive => {
                self.player.win_once_used = true;
                self.battle.enemy.hp = 0;
                self.info("Victory is assured (once per dive)");
                self.log(format!("{pid} uses {name}: guaranteed win"));
                info!(player = %pid, skill = %skill_id, "guaranteed win used");
                self.battle.locked = false;
                ActionOutcome::Victory
            }
            SkillEffect::AttackAtkPlus1d6PlusFlat { flat } => {
                let roll = self.rng.d6() as i32;
                let add = roll + flat;
                self.info(format!("Bonus 1d6+{flat}: {roll}+{flat} = {add}"));
                let opts = AttackOpts {
                    atk_flat_add: add,
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: +{add}, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::AttackTwice => {
                let first = self.attack_once(name, AttackOpts::with_element(element));
                if !self.battle.enemy.is_alive() {
                    self.log(format!("{pid} uses {name}: first hit {first} kills"));
                    self.battle.locked = false;
                    ActionOutcome::Victory
                } else {
                    let second = self.attack_once(name, AttackOpts::with_element(element));
                    self.log(format!("{pid} uses {name}: {first}+{second} damage"));
                    self.proceed(skip)
                }
            }
            SkillEffect::AttackApplyPoison { turns, poison } => {
                let dmg = self.attack_once(name, AttackOpts::with_element(element));
                self.battle.enemy.apply_poison(*turns, *poison);
                self.info(format!(
                    "Poisoned for {turns} turns ({} per turn)",
                    self.battle.enemy.poison_expr
                ));
                self.log(format!("{pid} uses {name}: {dmg} damage, poison {turns}"));
                self.proceed(skip)
            }
            SkillEffect::AttackAtkPlusDice { dice } => {
                let opts = AttackOpts {
                    atk_dice_delta: *dice as i32,
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: +{dice} ATK dice, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::AttackDamageEqualsTaken => {
                let taken = self.battle.last_damage_taken;
                let opts = AttackOpts {
                    fixed: Some(taken),
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: revenge {dmg} (taken {taken})"));
                self.proceed(skip)
            }
            SkillEffect::AttackFinalMult { mul } => {
                let opts = AttackOpts {
                    final_mult: *mul,
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: final x{mul}, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::BuffEvadeTurns { turns } => {
                let status = &mut self.battle.status;
                status.evade_turns = status.evade_turns.max(*turns);
                self.info(format!("Evading enemy attacks for {turns} turn(s)"));
                self.log(format!("{pid} uses {name}: evade {turns}"));
                self.proceed(skip)
            }
            SkillEffect::AutoEscape => {
                self.info("Escaped for certain");
                self.log(format!("{pid} uses {name}: escaped"));
                ActionOutcome::Escaped
            }
            SkillEffect::GainTreasureNow => {
                match self.treasure.draw(&mut *self.rng) {
                    Some(base) => {
                        let value = base * self.player.depth;
                        self.player.bag.push(value);
                        self.info(format!("Found treasure worth {value}G (bag)"));
                        self.log(format!("{pid} uses {name}: treasure {value}"));
                    }
                    None => self.info("The treasure deck is empty"),
                }
                self.proceed(skip)
            }
            SkillEffect::AttackAllDice6 => {
                let opts = AttackOpts {
                    override_die: Some(6),
                    ..AttackOpts::with_element(element)
                };
                let dmg = self.attack_once(name, opts);
                self.log(format!("{pid} uses {name}: all sixes, {dmg} damage"));
                self.proceed(skip)
            }
            SkillEffect::CleanseSelf => {
                self.battle.status.cleanse_guards();
                self.info("Evasion, wards and extra DEF dice reset");
                self.log(format!("{pid} uses {name}: cleanse"));
                self.proceed(skip)
            }
            SkillEffect::HealHp { expr } => {
                let roll = expr.roll_plain(&mut *self.rng);
                let healed = self.player.heal_hp(roll.total);
                self.info(format!(
                    "HP +{healed} ({expr} -> {roll}) | HP {}/{}",
                    self.player.hp, self.player.hp_max
                ));
                self.log(format!("{pid} uses {name}: HP +{healed}"));
                self.proceed(skip)
            }
            SkillEffect::HealMp { expr } => {
                let roll = expr.roll_plain(&mut *self.rng);
                let healed = self.player.heal_mp(roll.total);
                self.info(format!(
                    "MP +{healed} ({expr} -> {roll}) | MP {}/{}",
                    self.player.mp, self.player.mp_max
                ));
                self.log(format!("{pid} uses {name}: MP +{healed}"));
                self.proceed(skip)
            }
            SkillEffect::BuffNextDamageMinusFlat { flat } => {
                let status = &mut self.battle.status;
                status.next_damage_minus = status.next_damage_minus.max(*flat);
                self.info(format!("Next damage taken -{flat}"));
                self.log(format!("{pid} uses {name}: ward -{flat}"));
                self.proceed(skip)
            }
            SkillEffect::BuffDefPlusDiceThisTurn { dice } => {
                self.battle.status.def_dice_this_turn += dice;
                self.info(format!("+{dice} DEF dice against the next attack"));
                self.log(format!("{pid} uses {name}: DEF dice +{dice}"));
                self.proceed(skip)
            }
            SkillEffect::Unsupported { key } => {
                warn!(skill = %skill_id, key = %key, "unsupported skill effect");
                self.info(format!("Effect {key:?} is not supported"));
                self.log(format!("{pid} uses {name}: unsupported effect {key}"));
                self.proceed(skip)
            }
        };

        self.finish(outcome)
    }
}
