//! Dice notation parsing.
//!
//! Grammar (case-insensitive):
//!
//! ```text
//! notation := count 'd' sides [keep] [modifier]
//! keep     := ('kh' | 'kl') keepcount
//! modifier := ('+' | '-' | '*' | '/') modvalue
//! ```
//!
//! The table sentinel `length` is not notation; callers substitute it with
//! `1d{N}` before reaching this module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::lexer::{Token, lex};

/// Upper bound on the number of dice thrown by a single roll.
pub const MAX_DICE: u32 = 10_000;

/// Which rolled dice count toward the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeepMode {
    /// Keep every die.
    All,
    /// Keep the highest `n` dice.
    Highest(u32),
    /// Keep the lowest `n` dice.
    Lowest(u32),
}

/// Arithmetic applied to the kept sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`, truncating integer division.
    Divide,
}

impl ModifierOp {
    fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }
}

/// An arithmetic modifier such as `+2` or `/3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifier {
    /// The operator.
    pub op: ModifierOp,
    /// The right-hand operand.
    pub operand: u32,
}

impl Modifier {
    /// Apply this modifier to a sum.
    pub fn apply(self, value: i64) -> DiceResult<i64> {
        let operand = i64::from(self.operand);
        match self.op {
            ModifierOp::Add => value.checked_add(operand).ok_or(DiceError::Overflow),
            ModifierOp::Subtract => value.checked_sub(operand).ok_or(DiceError::Overflow),
            ModifierOp::Multiply => value.checked_mul(operand).ok_or(DiceError::Overflow),
            ModifierOp::Divide => {
                if operand == 0 {
                    Err(DiceError::DivisionByZero)
                } else {
                    Ok(value / operand)
                }
            }
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.operand)
    }
}

/// A parsed dice notation such as `3d6kh2+2`.
///
/// Construction validates the invariants: at least one die, at least one
/// side, a keep count between 1 and the dice count, and no division by
/// zero. A `RollSpec` cannot be mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollSpec {
    dice_count: u32,
    die_sides: u32,
    keep: KeepMode,
    modifier: Option<Modifier>,
}

impl RollSpec {
    /// Build a plain `NdS` roll.
    pub fn new(dice_count: u32, die_sides: u32) -> DiceResult<Self> {
        Self::build(dice_count, die_sides, KeepMode::All, None)
    }

    /// Build a roll with keep clause and modifier, validating every invariant.
    pub fn build(
        dice_count: u32,
        die_sides: u32,
        keep: KeepMode,
        modifier: Option<Modifier>,
    ) -> DiceResult<Self> {
        let spec = Self {
            dice_count,
            die_sides,
            keep,
            modifier,
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> DiceResult<()> {
        let text = self.to_string();
        if self.dice_count == 0 {
            return Err(DiceError::invalid(&text, "dice count must be at least 1"));
        }
        if self.dice_count > MAX_DICE {
            return Err(DiceError::TooManyDice {
                requested: self.dice_count,
                max: MAX_DICE,
            });
        }
        if self.die_sides == 0 {
            return Err(DiceError::invalid(&text, "dice need at least 1 side"));
        }
        if let KeepMode::Highest(n) | KeepMode::Lowest(n) = self.keep {
            if n == 0 {
                return Err(DiceError::invalid(&text, "keep count must be at least 1"));
            }
            if n > self.dice_count {
                return Err(DiceError::KeepCountExceedsDiceCount {
                    keep: n,
                    dice: self.dice_count,
                });
            }
        }
        if let Some(Modifier {
            op: ModifierOp::Divide,
            operand: 0,
        }) = self.modifier
        {
            return Err(DiceError::DivisionByZero);
        }
        Ok(())
    }

    /// Number of dice rolled.
    pub fn dice_count(&self) -> u32 {
        self.dice_count
    }

    /// Faces per die.
    pub fn die_sides(&self) -> u32 {
        self.die_sides
    }

    /// The keep clause.
    pub fn keep(&self) -> KeepMode {
        self.keep
    }

    /// Number of dice that count toward the total.
    pub fn keep_count(&self) -> u32 {
        match self.keep {
            KeepMode::All => self.dice_count,
            KeepMode::Highest(n) | KeepMode::Lowest(n) => n,
        }
    }

    /// The arithmetic modifier, if any.
    pub fn modifier(&self) -> Option<Modifier> {
        self.modifier
    }

    /// Smallest value this roll can produce.
    pub fn min_value(&self) -> i64 {
        self.bound(1)
    }

    /// Largest value this roll can produce.
    pub fn max_value(&self) -> i64 {
        self.bound(self.die_sides)
    }

    fn bound(&self, face: u32) -> i64 {
        let sum = i64::from(self.keep_count()) * i64::from(face);
        match self.modifier {
            Some(m) => m.apply(sum).unwrap_or(sum),
            None => sum,
        }
    }
}

impl fmt::Display for RollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.die_sides)?;
        match self.keep {
            KeepMode::All => {}
            KeepMode::Highest(n) => write!(f, "kh{n}")?,
            KeepMode::Lowest(n) => write!(f, "kl{n}")?,
        }
        if let Some(m) = self.modifier {
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

impl FromStr for RollSpec {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for RollSpec {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<RollSpec> for String {
    fn from(spec: RollSpec) -> Self {
        spec.to_string()
    }
}

/// Parse dice notation into a [`RollSpec`].
///
/// Leading and trailing whitespace is ignored; anything else that does not
/// fit the grammar is [`DiceError::InvalidNotation`].
pub fn parse(notation: &str) -> DiceResult<RollSpec> {
    let text = notation.trim();
    if text.is_empty() {
        return Err(DiceError::invalid(notation, "empty notation"));
    }

    let tokens = lex(text)?;
    let mut cursor = Cursor {
        text,
        tokens: &tokens,
        pos: 0,
    };

    let dice_count = cursor.number("dice count")?;
    cursor.expect(Token::Die)?;
    let die_sides = cursor.number("die sides")?;

    let keep = match cursor.peek() {
        Some(Token::KeepHighest) => {
            cursor.advance();
            KeepMode::Highest(cursor.number("keep count")?)
        }
        Some(Token::KeepLowest) => {
            cursor.advance();
            KeepMode::Lowest(cursor.number("keep count")?)
        }
        _ => KeepMode::All,
    };

    let op = match cursor.peek() {
        Some(Token::Plus) => Some(ModifierOp::Add),
        Some(Token::Minus) => Some(ModifierOp::Subtract),
        Some(Token::Star) => Some(ModifierOp::Multiply),
        Some(Token::Slash) => Some(ModifierOp::Divide),
        _ => None,
    };
    let modifier = match op {
        Some(op) => {
            cursor.advance();
            let operand = cursor.number("modifier value")?;
            Some(Modifier { op, operand })
        }
        None => None,
    };

    if let Some(token) = cursor.peek() {
        return Err(DiceError::invalid(
            text,
            format!("unexpected '{token}' after end of notation"),
        ));
    }

    RollSpec::build(dice_count, die_sides, keep, modifier).map_err(|e| match e {
        DiceError::InvalidNotation { reason, .. } => DiceError::invalid(text, reason),
        other => other,
    })
}

struct Cursor<'a> {
    text: &'a str,
    tokens: &'a [(Token, std::ops::Range<usize>)],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn number(&mut self, what: &str) -> DiceResult<u32> {
        match self.peek() {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(n)
            }
            Some(other) => Err(DiceError::invalid(
                self.text,
                format!("expected {what}, found '{other}'"),
            )),
            None => Err(DiceError::invalid(self.text, format!("missing {what}"))),
        }
    }

    fn expect(&mut self, expected: Token) -> DiceResult<()> {
        match self.peek() {
            Some(t) if t == expected => {
                self.advance();
                Ok(())
            }
            Some(other) => Err(DiceError::invalid(
                self.text,
                format!("expected '{expected}', found '{other}'"),
            )),
            None => Err(DiceError::invalid(
                self.text,
                format!("expected '{expected}'"),
            )),
        }
    }
}
