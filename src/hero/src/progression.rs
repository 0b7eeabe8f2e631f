// src/hero/src/progression.rs
//! 经验与成长骰

use content::ContentTables;
use dice::roll_d6;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::info;

use crate::Player;

/// 升到下一级所需经验：
/// `ceil((hpMax + mpMax + E[ATK] + ATK固定 + E[DEF] + DEF固定) / 4 * sqrt(level))`，至少 1
pub fn required_exp(player: &Player, content: &ContentTables) -> u32 {
    let atk = player.effective_atk(content).expected() + f64::from(player.atk_flat(content));
    let def = player.effective_def(content).expected() + f64::from(player.def_flat(content));
    let avg = (f64::from(player.hp_max) + f64::from(player.mp_max) + atk + def) / 4.0;
    let need = (avg * f64::from(player.level).sqrt()).ceil();
    if need.is_finite() && need >= 1.0 {
        need as u32
    } else {
        1
    }
}

/// 加经验并循环升级，每级 +1 成长骰。返回升级次数
pub fn add_exp(player: &mut Player, content: &ContentTables, gained: u32) -> u32 {
    player.exp += gained;
    let mut ups = 0;
    loop {
        let need = required_exp(player, content);
        if player.exp < need {
            break;
        }
        player.exp -= need;
        player.level += 1;
        player.growth_dice += 1;
        ups += 1;
        info!(player = %player.id, level = player.level, "level up");
    }
    ups
}

/// 成长骰的四种用法
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum GrowthChoice {
    /// HP 上限与当前 HP +1d6
    Hp,
    Mp,
    /// ATK 骰 +1
    Atk,
    Def,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthResult {
    pub choice: GrowthChoice,
    /// HP/MP 为掷出的点数，ATK/DEF 为 1
    pub amount: i32,
    pub remaining: u32,
}

/// 消耗一颗成长骰；没有成长骰时返回 None
pub fn apply_growth<R: Rng + ?Sized>(
    player: &mut Player,
    choice: GrowthChoice,
    rng: &mut R,
) -> Option<GrowthResult> {
    if player.growth_dice == 0 {
        return None;
    }
    player.growth_dice -= 1;

    let amount = match choice {
        GrowthChoice::Hp => {
            let r = roll_d6(rng) as i32;
            player.hp_max += r;
            player.hp = (player.hp + r).min(player.hp_max);
            r
        }
        GrowthChoice::Mp => {
            let r = roll_d6(rng) as i32;
            player.mp_max += r;
            player.mp = (player.mp + r).min(player.mp_max);
            r
        }
        GrowthChoice::Atk => {
            player.atk_dice_bonus += 1;
            1
        }
        GrowthChoice::Def => {
            player.def_dice_bonus += 1;
            1
        }
    };

    Some(GrowthResult {
        choice,
        amount,
        remaining: player.growth_dice,
    })
}
