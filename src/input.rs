//! 文本命令解析：把一行输入转换为会话操作

use content::EquipSlot;
use hero::GrowthChoice;
use thiserror::Error;

use crate::battle_flow::BattleAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Roll,
    /// 指定步数，用于调试
    Move(u32),
    Battle(BattleAction),
    Grow(GrowthChoice),
    /// 0 起始的选项下标
    Choose(usize),
    Discard(String),
    Next,
    Equip(usize),
    Unequip(EquipSlot),
    Abandon,
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument {arg:?} for `{command}`")]
    InvalidArgument { command: &'static str, arg: String },
}

pub const HELP: &str = "\
roll (r)            roll 1d6 and move
move <n>            move exactly n tiles (1-40)
attack (a)          normal attack
skill (s) <id>      cast an equipped skill
item (i) <id>       use an item
escape (e)          try to run away
grow (g) <stat>     spend a growth die: hp / mp / atk / def
choose (c) <n>      pick option n (1-based)
discard (d) <id>    discard a skill during level up
next (n)            continue to the next player
equip <n>           equip gear bag slot n (1-based)
unequip <slot>      weapon / armor / accessory
abandon             quit this game (asks first)
state               print the game state as JSON
help (?)            this text
quit (q)            exit";

/// 解析一行命令；大小写不敏感，多余空白忽略
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(InputError::Empty);
    };
    let arg = words.next();
    let head = head.to_ascii_lowercase();

    let cmd = match head.as_str() {
        "roll" | "r" => Command::Roll,
        "move" => Command::Move(number("move", arg)?),
        "attack" | "a" => Command::Battle(BattleAction::Attack),
        "skill" | "s" => Command::Battle(BattleAction::Skill(word("skill", arg)?)),
        "item" | "i" => Command::Battle(BattleAction::Item(word("item", arg)?)),
        "escape" | "e" => Command::Battle(BattleAction::Escape),
        "grow" | "g" => {
            let stat = word("grow", arg)?;
            Command::Grow(stat.parse().map_err(|_| InputError::InvalidArgument {
                command: "grow",
                arg: stat,
            })?)
        }
        "choose" | "c" => Command::Choose(one_based("choose", arg)?),
        "discard" | "d" => Command::Discard(word("discard", arg)?),
        "next" | "n" => Command::Next,
        "equip" => Command::Equip(one_based("equip", arg)?),
        "unequip" => {
            let slot = word("unequip", arg)?;
            Command::Unequip(slot.to_ascii_lowercase().parse().map_err(|_| InputError::InvalidArgument {
                command: "unequip",
                arg: slot,
            })?)
        }
        "abandon" => Command::Abandon,
        "state" => Command::State,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(InputError::Unknown(head)),
    };
    Ok(cmd)
}

fn word(command: &'static str, arg: Option<&str>) -> Result<String, InputError> {
    arg.map(str::to_string).ok_or(InputError::MissingArgument(command))
}

fn number(command: &'static str, arg: Option<&str>) -> Result<u32, InputError> {
    let raw = arg.ok_or(InputError::MissingArgument(command))?;
    raw.parse().map_err(|_| InputError::InvalidArgument {
        command,
        arg: raw.to_string(),
    })
}

fn one_based(command: &'static str, arg: Option<&str>) -> Result<usize, InputError> {
    match number(command, arg)? {
        0 => Err(InputError::InvalidArgument {
            command,
            arg: "0".to_string(),
        }),
        n => Ok(n as usize - 1),
    }
}
