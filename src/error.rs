use std::error::Error;
use std::fmt;

/// Custom error type for evaluation failures
#[derive(Debug, PartialEq)]
pub enum EvalError {
    NonFiniteScore(usize), // Number of non-finite values found
    LengthMismatch,
    InvalidLabel(i32),
    NoActualPositives,
    NoActualNegatives,
    SweepTooSmall(usize), // Requested cutoff count
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::NonFiniteScore(count) => {
                write!(f, "Found {} non-finite values in scores array", count)
            }
            EvalError::LengthMismatch => {
                write!(f, "Scores and label arrays must have equal length")
            }
            EvalError::InvalidLabel(value) => {
                write!(f, "Labels must be 0 or 1, found {}", value)
            }
            EvalError::NoActualPositives => {
                write!(f, "True-positive rate is undefined: no actual positives")
            }
            EvalError::NoActualNegatives => {
                write!(f, "False-positive rate is undefined: no actual negatives")
            }
            EvalError::SweepTooSmall(count) => {
                write!(f, "Cutoff sweep needs at least 2 cutoffs, got {}", count)
            }
        }
    }
}

impl Error for EvalError {}
