//! Error types for tables and resolution.

use thiserror::Error;

use tr_dice::DiceError;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while building, loading, or resolving tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Dice notation failed to parse or evaluate.
    #[error(transparent)]
    Dice(#[from] DiceError),

    /// Bracketed text is neither a roll nor a table reference.
    #[error("unrecognized link format: [{0}]")]
    UnrecognizedLinkFormat(String),

    /// The requested key is not one of the table's results.
    #[error("no result {key} in table '{table}'")]
    UnknownResultKey {
        /// Table that was consulted.
        table: String,
        /// The missing key.
        key: i64,
    },

    /// A link names a table that is not loaded.
    #[error("link [{link}] refers to unknown table '{table}'")]
    UnknownTableReference {
        /// Name of the missing table.
        table: String,
        /// The link text as written.
        link: String,
    },

    /// Nested table references went deeper than the configured bound.
    #[error("recursion limit of {max_depth} reached expanding '{table}'")]
    RecursionLimitExceeded {
        /// Table whose expansion was cut off.
        table: String,
        /// The configured depth bound.
        max_depth: u32,
    },

    /// A table reference asked for more rolls than one link may make.
    #[error("link [{link}] rolled {count} times on '{table}' (max {max})")]
    TooManyReferenceRolls {
        /// Referenced table.
        table: String,
        /// The link text as written.
        link: String,
        /// Rolled count.
        count: i64,
        /// Upper bound.
        max: u32,
    },

    /// A table definition failed validation.
    #[error("invalid table '{name}': {reason}")]
    InvalidTable {
        /// Table name (may be empty when the name itself is missing).
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A table file could not be read.
    #[error("cannot read {path}: {message}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error text.
        message: String,
    },

    /// A table file could not be parsed.
    #[error("cannot parse {path}: {message}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying error text.
        message: String,
    },
}

impl TableError {
    /// Whether resolution can carry on past this error.
    ///
    /// Recoverable errors are collected alongside the resolved text; the
    /// rest abort the call that raised them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedLinkFormat(_)
                | Self::UnknownTableReference { .. }
                | Self::RecursionLimitExceeded { .. }
                | Self::TooManyReferenceRolls { .. }
        )
    }
}
