//! Error types for dice notation and evaluation.

use thiserror::Error;

/// Result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;

/// Errors that can occur while parsing or evaluating dice notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// The notation string does not match `<count>d<sides>[kh|kl<n>][+|-|*|/<n>]`.
    #[error("invalid dice notation '{notation}': {reason}")]
    InvalidNotation {
        /// The offending notation text.
        notation: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A keep clause asks for more dice than are rolled.
    #[error("cannot keep {keep} dice out of {dice}")]
    KeepCountExceedsDiceCount {
        /// Requested keep count.
        keep: u32,
        /// Number of dice rolled.
        dice: u32,
    },

    /// A `/` modifier with an operand of zero.
    #[error("division by zero")]
    DivisionByZero,

    /// More dice than a single roll is allowed to throw.
    #[error("too many dice: {requested} (max {max})")]
    TooManyDice {
        /// Requested dice count.
        requested: u32,
        /// Upper bound.
        max: u32,
    },

    /// Applying the modifier overflowed the result type.
    #[error("roll result overflowed")]
    Overflow,
}

impl DiceError {
    pub(crate) fn invalid(notation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidNotation {
            notation: notation.to_string(),
            reason: reason.into(),
        }
    }
}
