//! Answer labels and the evidence-strength table.
//!
//! An answer is not free text; it is one of a closed set of five graded
//! responses to a yes/no-style question. Each label carries two fixed
//! likelihood constants that drive the belief update: how probable the
//! answer is when the entity *has* the characteristic, and how probable
//! it is when the entity does not.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Evidence strengths for one answer label.
///
/// `present` is the likelihood of observing the answer given the entity
/// has the characteristic; `absent` given it does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Likelihood {
    /// P(answer | characteristic present).
    pub present: f64,
    /// P(answer | characteristic absent).
    pub absent: f64,
}

/// One of five graded responses to a question.
///
/// The presentation layer maps its own button vocabulary onto these
/// variants; anything it cannot map should go through
/// [`AnswerLabel::normalize`], which turns unrecognized input into
/// [`AnswerLabel::Unknown`] rather than failing.
///
/// # Examples
///
/// ```
/// use guesswork::AnswerLabel;
///
/// assert_eq!(AnswerLabel::normalize("Probably Not"), AnswerLabel::ProbablyNot);
/// assert_eq!(AnswerLabel::normalize("dunno"), AnswerLabel::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerLabel {
    /// Strongly affirmative.
    Yes,
    /// Weakly affirmative.
    Probably,
    /// Weakly negative.
    ProbablyNot,
    /// Strongly negative.
    No,
    /// Neutral; contributes no evidence.
    Unknown,
}

impl AnswerLabel {
    /// Every label, in decreasing order of affirmative strength.
    pub const ALL: [Self; 5] = [
        Self::Yes,
        Self::Probably,
        Self::ProbablyNot,
        Self::No,
        Self::Unknown,
    ];

    /// The canonical likelihood table.
    ///
    /// `Unknown` maps to 1.0/1.0 and therefore never moves the
    /// distribution.
    #[must_use]
    pub const fn likelihood(self) -> Likelihood {
        match self {
            Self::Yes => Likelihood {
                present: 0.95,
                absent: 0.05,
            },
            Self::Probably => Likelihood {
                present: 0.75,
                absent: 0.25,
            },
            Self::ProbablyNot => Likelihood {
                present: 0.25,
                absent: 0.75,
            },
            Self::No => Likelihood {
                present: 0.05,
                absent: 0.95,
            },
            Self::Unknown => Likelihood {
                present: 1.0,
                absent: 1.0,
            },
        }
    }

    /// Returns true if this label leaves the distribution unchanged.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Maps arbitrary user-facing text onto a label.
    ///
    /// Case-insensitive and whitespace-tolerant. Accepts both the
    /// snake_case wire names and the button vocabulary of the original
    /// game ("i dont know"). Unrecognized input becomes `Unknown` —
    /// this function is total by design.
    #[must_use]
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "yes" => Self::Yes,
            "probably" => Self::Probably,
            "probably not" | "probably_not" => Self::ProbablyNot,
            "no" => Self::No,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::Probably => write!(f, "probably"),
            Self::ProbablyNot => write!(f, "probably_not"),
            Self::No => write!(f, "no"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for AnswerLabel {
    fn from(label: &str) -> Self {
        Self::normalize(label)
    }
}
