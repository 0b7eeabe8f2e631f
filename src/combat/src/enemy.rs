// src/combat/src/enemy.rs
use crate::{ActionOutcome, Combat, CombatResult, constants};

impl Combat<'_> {
    /// The enemy's delayed counterattack, then end-of-turn upkeep.
    ///
    /// `skip_ct` names the skill cast this turn; its fresh cooldown does not tick.
    pub fn enemy_reply(&mut self, skip_ct: Option<&str>) -> CombatResult {
        let enemy_name = self.battle.enemy.name.clone();

        if self.battle.status.evade_turns > 0 {
            self.battle.status.evade_turns -= 1;
            self.battle.last_damage_taken = 0;
            self.info(format!("{enemy_name} attacks, but you evade"));
            self.log(format!("{} evades {enemy_name}", self.player.id));
        } else {
            let atk_roll = self.battle.enemy.atk_expr.roll_plain(&mut *self.rng);
            let extra_dice = std::mem::take(&mut self.battle.status.def_dice_this_turn);
            let def_expr = self.player.effective_def(self.content).adjust(extra_dice as i32);
            let def_roll = def_expr.roll_plain(&mut *self.rng);
            let def_flat = self.def_flat_in_battle();
            let def_val = def_roll.total + def_flat;

            let raw = (atk_roll.total - def_val).max(constants::MIN_DAMAGE);
            let minus = std::mem::take(&mut self.battle.status.next_damage_minus);
            let dmg = (raw - minus.max(0)).max(0);

            self.player.take_damage(dmg);
            self.battle.last_damage_taken = dmg;

            tracing::debug!(%atk_roll, %def_roll, def_flat, dmg, "enemy hit");
            self.info(format!(
                "{enemy_name}: ATK {atk_roll} vs DEF {def_roll} +{def_flat}{} | {dmg} damage | HP {}/{}",
                if minus > 0 { format!(" (ward -{minus})") } else { String::new() },
                self.player.hp,
                self.player.hp_max
            ));
            self.log(format!("{enemy_name} hits {} for {dmg}", self.player.id));

            if !self.player.is_alive() {
                self.battle.locked = false;
                return self.finish(ActionOutcome::Defeat);
            }
        }

        self.battle.enemy.tick_temp();
        self.player.skills.tick_all(skip_ct);
        self.player.heal_mp(1);
        self.battle.turn += 1;
        self.battle.free_item_used = false;

        let outcome = if self.battle.turn > self.battle.turn_limit && self.battle.enemy.is_alive() {
            self.info(format!("{enemy_name} outlasts you; the battle ends"));
            self.battle.locked = false;
            ActionOutcome::TimedOut
        } else {
            ActionOutcome::PlayerTurn
        };
        self.finish(outcome)
    }
}
