//! Roll amounts: either a fixed count or dice notation.

use std::fmt;
use std::str::FromStr;

use crate::error::{DiceError, DiceResult};
use crate::eval::evaluate;
use crate::notation::{RollSpec, parse};
use crate::source::DiceSource;

/// How many times to do something, or a standalone value.
///
/// Links write this as either a plain digit string (`3`) or dice notation
/// (`1d4+1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollAmount {
    /// A literal count.
    Fixed(u32),
    /// Dice rolled to produce the count.
    Dice(RollSpec),
}

impl RollAmount {
    /// Produce the value, rolling if this is dice notation.
    pub fn roll<S: DiceSource + ?Sized>(&self, source: &mut S) -> DiceResult<i64> {
        match self {
            Self::Fixed(n) => Ok(i64::from(*n)),
            Self::Dice(spec) => Ok(evaluate(spec, source)?.final_value()),
        }
    }
}

impl fmt::Display for RollAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Dice(spec) => write!(f, "{spec}"),
        }
    }
}

impl FromStr for RollAmount {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return text
                .parse::<u32>()
                .map(Self::Fixed)
                .map_err(|_| DiceError::invalid(s, "count does not fit in 32 bits"));
        }
        parse(text).map(Self::Dice)
    }
}
