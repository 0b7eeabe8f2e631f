//! Dice expressions of the form `NdS+M` with the die size fixed at six.
//!
//! Every stat, damage formula and heal amount in the game is one of these.
//! Expressions are immutable values: growth, equipment and temporary skill
//! bonuses are composed with [`DiceExpr::adjust`] on top of a base
//! expression instead of rewriting it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use error::DiceError;

mod rng;

pub use crate::rng::GameRng;

/// Number of faces on every die in the game.
pub const DIE_FACES: u32 = 6;

/// Expected value of a single d6.
const DIE_MEAN: f64 = 3.5;

/// Rolls one uniform d6.
pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(1..=DIE_FACES)
}

/// A parsed `NdS+M` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpr {
    count: u32,
    modifier: i32,
}

impl DiceExpr {
    pub const fn new(count: u32, modifier: i32) -> Self {
        Self { count, modifier }
    }

    /// A constant expression (`0d6+value`).
    pub const fn flat(value: i32) -> Self {
        Self::new(0, value)
    }

    /// Parses `"2d6"`, `"1d6+3"`, `"3d6-1"`, `"0d6+20"`.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let text = input.trim().to_ascii_lowercase();
        if text.is_empty() {
            return Err(DiceError::Empty);
        }

        let bad = || DiceError::InvalidFormat(input.to_string());

        let (count_str, rest) = text.split_once('d').ok_or_else(bad)?;
        if count_str.is_empty() || !count_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let count: u32 = count_str.parse().map_err(|_| bad())?;

        let split_at = rest.find(['+', '-']);
        let (die_str, modifier) = match split_at {
            Some(idx) => {
                let (die, signed) = rest.split_at(idx);
                let digits = &signed[1..];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(bad());
                }
                let value: i32 = digits.parse().map_err(|_| bad())?;
                let modifier = if signed.starts_with('-') { -value } else { value };
                (die, modifier)
            }
            None => (rest, 0),
        };

        if die_str.is_empty() || !die_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        if die_str.parse::<u32>().ok() != Some(DIE_FACES) {
            return Err(DiceError::UnsupportedDie(input.to_string()));
        }

        Ok(Self { count, modifier })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// `N * 3.5 + M`, used for balancing formulas only.
    pub fn expected(&self) -> f64 {
        f64::from(self.count) * DIE_MEAN + f64::from(self.modifier)
    }

    /// Same modifier, dice count shifted by `delta` and floored at one.
    pub fn adjust(&self, delta: i32) -> Self {
        let shifted = i64::from(self.count) + i64::from(delta);
        let count = shifted.clamp(1, i64::from(u32::MAX)) as u32;
        Self {
            count,
            modifier: self.modifier,
        }
    }

    pub fn min_total(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    pub fn max_total(&self) -> i32 {
        (self.count * DIE_FACES) as i32 + self.modifier
    }

    /// Rolls every die independently, applies the options, adds the modifier.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R, options: RollOptions) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| {
                let face = options.override_die.unwrap_or_else(|| roll_d6(rng));
                match options.min_die {
                    Some(min) => face.max(min),
                    None => face,
                }
            })
            .collect();

        let dice_total: i32 = rolls.iter().map(|&r| r as i32).sum();
        DiceRoll {
            rolls,
            modifier: self.modifier,
            total: dice_total + self.modifier,
        }
    }

    /// Plain roll without options.
    pub fn roll_plain<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        self.roll(rng, RollOptions::default())
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.count, DIE_FACES),
            m if m > 0 => write!(f, "{}d{}+{}", self.count, DIE_FACES, m),
            m => write!(f, "{}d{}{}", self.count, DIE_FACES, m),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

/// Per-roll overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollOptions {
    /// Every die showing less than this is raised to it.
    pub min_die: Option<u32>,
    /// Every die is forced to this face before the floor applies.
    pub override_die: Option<u32>,
}

impl RollOptions {
    pub fn with_min_die(min: u32) -> Self {
        Self {
            min_die: Some(min),
            override_die: None,
        }
    }

    pub fn all_dice(face: u32) -> Self {
        Self {
            min_die: None,
            override_die: Some(face),
        }
    }
}

/// Result of a roll: the individual faces, the modifier and the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

impl fmt::Display for DiceRoll {
    /// `[3,5]+2=10`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<String> = self.rolls.iter().map(u32::to_string).collect();
        write!(f, "[{}]", faces.join(","))?;
        match self.modifier {
            0 => {}
            m if m > 0 => write!(f, "+{m}")?,
            m => write!(f, "{m}")?,
        }
        write!(f, "={}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_canonical_forms() {
        assert_eq!(DiceExpr::parse("2d6").unwrap(), DiceExpr::new(2, 0));
        assert_eq!(DiceExpr::parse(" 1d6+3 ").unwrap(), DiceExpr::new(1, 3));
        assert_eq!(DiceExpr::parse("3D6-1").unwrap(), DiceExpr::new(3, -1));
        assert_eq!(DiceExpr::parse("0d6+20").unwrap(), DiceExpr::flat(20));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(DiceExpr::parse(""), Err(DiceError::Empty));
        for bad in ["d6", "2x6", "2d", "2d6+", "2d6+a", "-1d6", "2d6+1+1"] {
            assert!(
                matches!(DiceExpr::parse(bad), Err(DiceError::InvalidFormat(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            DiceExpr::parse("1d20"),
            Err(DiceError::UnsupportedDie(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for text in ["1d6", "2d6+4", "3d6-2", "0d6+7"] {
            assert_eq!(DiceExpr::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_expected_value() {
        assert_eq!(DiceExpr::new(2, 3).expected(), 10.0);
        assert_eq!(DiceExpr::flat(5).expected(), 5.0);
    }

    #[test]
    fn test_adjust_keeps_modifier_and_floors_count() {
        let base = DiceExpr::new(3, 2);
        assert_eq!(base.adjust(2), DiceExpr::new(5, 2));
        assert_eq!(base.adjust(-10), DiceExpr::new(1, 2));
        assert_eq!(base, DiceExpr::new(3, 2));
    }

    #[test]
    fn test_override_forces_every_die() {
        let mut rng = GameRng::new(7);
        let roll = DiceExpr::new(4, 1).roll(&mut rng, RollOptions::all_dice(6));
        assert_eq!(roll.rolls, vec![6, 6, 6, 6]);
        assert_eq!(roll.total, 25);
    }

    #[test]
    fn test_roll_display() {
        let roll = DiceRoll {
            rolls: vec![3, 5],
            modifier: 2,
            total: 10,
        };
        assert_eq!(roll.to_string(), "[3,5]+2=10");
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let expr: DiceExpr = serde_json::from_str("\"2d6+1\"").unwrap();
        assert_eq!(expr, DiceExpr::new(2, 1));
        assert_eq!(serde_json::to_string(&expr).unwrap(), "\"2d6+1\"");
        assert!(serde_json::from_str::<DiceExpr>("\"banana\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_roll_stays_in_bounds(count in 0u32..12, modifier in -10i32..10, seed in any::<u64>()) {
            let expr = DiceExpr::new(count, modifier);
            let mut rng = GameRng::new(seed);
            let roll = expr.roll_plain(&mut rng);
            prop_assert_eq!(roll.rolls.len(), count as usize);
            prop_assert!(roll.rolls.iter().all(|r| (1..=6).contains(r)));
            prop_assert!(roll.total >= expr.min_total() && roll.total <= expr.max_total());
        }

        #[test]
        fn prop_min_die_floor_is_respected(count in 1u32..10, min in 1u32..=6, seed in any::<u64>()) {
            let mut rng = GameRng::new(seed);
            let roll = DiceExpr::new(count, 0).roll(&mut rng, RollOptions::with_min_die(min));
            prop_assert!(roll.rolls.iter().all(|r| *r >= min && *r <= 6));
        }

        #[test]
        fn prop_adjust_never_drops_below_one_die(count in 1u32..20) {
            let expr = DiceExpr::new(count, 0);
            let floored = expr.adjust(-(count as i32 - 1));
            prop_assert_eq!(floored.count(), 1);
            prop_assert!(expr.adjust(-(count as i32) - 5).count() >= 1);
        }
    }
}
