//! Dice notation for Table Roller.
//!
//! Parses strings such as `3d6kh2+2` into a [`RollSpec`] and evaluates them
//! against an injectable [`DiceSource`]. Supported notation:
//!
//! - `NdS`: roll `N` dice with `S` sides each
//! - `khK` / `klK`: keep the highest or lowest `K` dice
//! - `+M`, `-M`, `*M`, `/M`: apply an integer modifier to the kept sum
//!
//! ```
//! use tr_dice::{FixedRolls, evaluate, parse};
//!
//! let spec = parse("3d6kh2+2").unwrap();
//! let outcome = evaluate(&spec, &mut FixedRolls::new(vec![1, 4, 6])).unwrap();
//! assert_eq!(outcome.kept_faces(), &[4, 6]);
//! assert_eq!(outcome.final_value(), 12);
//! ```

pub mod amount;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod notation;
pub mod source;

pub use amount::RollAmount;
pub use error::{DiceError, DiceResult};
pub use eval::{RollOutcome, evaluate, evaluate_text};
pub use notation::{KeepMode, MAX_DICE, Modifier, ModifierOp, RollSpec, parse};
pub use source::{DiceSource, FixedRolls};
