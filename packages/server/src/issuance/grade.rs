use std::fmt;

use serde::{Deserialize, Serialize};

/// Four-tier grade derived from the final score.
///
/// The mapping is a step function with thresholds at 90/80/70. It is the
/// single source of the label stored on the record and printed on the
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Distinction,
    Merit,
    Credit,
    Pass,
}

impl Grade {
    /// Map a final score to its grade tier.
    ///
    /// The score must be finite and within [0, 100]; out-of-range input is
    /// rejected rather than clamped so a buggy caller is surfaced, not
    /// papered over.
    pub fn from_score(score: f64) -> Result<Self, f64> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(score);
        }
        Ok(if score >= 90.0 {
            Self::Distinction
        } else if score >= 80.0 {
            Self::Merit
        } else if score >= 70.0 {
            Self::Credit
        } else {
            Self::Pass
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Distinction => "Distinction",
            Self::Merit => "Merit",
            Self::Credit => "Credit",
            Self::Pass => "Pass",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
