//! Dice evaluation.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::DiceResult;
use crate::notation::{KeepMode, RollSpec, parse};
use crate::source::DiceSource;

/// The result of evaluating one [`RollSpec`].
///
/// Serializable for reporting; outcomes are never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    spec: RollSpec,
    rolled: Vec<u32>,
    kept: Range<usize>,
    total: i64,
}

impl RollOutcome {
    /// The roll that produced this outcome.
    pub fn spec(&self) -> &RollSpec {
        &self.spec
    }

    /// Every face rolled, sorted ascending.
    pub fn rolled_faces(&self) -> &[u32] {
        &self.rolled
    }

    /// The faces counted toward the total, a contiguous slice of
    /// [`rolled_faces`](Self::rolled_faces).
    pub fn kept_faces(&self) -> &[u32] {
        &self.rolled[self.kept.clone()]
    }

    /// Sum of the kept faces with the modifier applied.
    pub fn final_value(&self) -> i64 {
        self.total
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.spec, join_faces(&self.rolled))?;
        if self.spec.keep() != KeepMode::All {
            write!(f, " -> {}", join_faces(self.kept_faces()))?;
        }
        write!(f, " = {}", self.total)
    }
}

fn join_faces(faces: &[u32]) -> String {
    let values: Vec<String> = faces.iter().map(u32::to_string).collect();
    format!("[{}]", values.join(", "))
}

/// Roll `spec` against `source`.
///
/// Faces are sorted before the keep clause is applied, so keep-highest takes
/// the last `n` sorted faces and keep-lowest the first `n`. Equal faces are
/// never deduplicated.
pub fn evaluate<S: DiceSource + ?Sized>(spec: &RollSpec, source: &mut S) -> DiceResult<RollOutcome> {
    let mut rolled: Vec<u32> = (0..spec.dice_count())
        .map(|_| source.roll_die(spec.die_sides()))
        .collect();
    rolled.sort_unstable();

    let len = rolled.len();
    let kept = match spec.keep() {
        KeepMode::All => 0..len,
        KeepMode::Highest(n) => len - n as usize..len,
        KeepMode::Lowest(n) => 0..n as usize,
    };

    let sum: i64 = rolled[kept.clone()].iter().map(|&v| i64::from(v)).sum();
    let total = match spec.modifier() {
        Some(m) => m.apply(sum)?,
        None => sum,
    };

    Ok(RollOutcome {
        spec: *spec,
        rolled,
        kept,
        total,
    })
}

/// Parse `notation` and roll it, returning only the final value.
pub fn evaluate_text<S: DiceSource + ?Sized>(notation: &str, source: &mut S) -> DiceResult<i64> {
    let spec = parse(notation)?;
    Ok(evaluate(&spec, source)?.final_value())
}
