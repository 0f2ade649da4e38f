//! Error types for exchange rate derivation
//!
//! Every failure is a plain value returned to the caller. The computation is
//! deterministic, so none of these are worth retrying.

use thiserror::Error;

/// Smallest number of significant digits the engine will work with.
///
/// Squaring a 29-digit sqrt price and dividing by 2^192 needs roughly this
/// many digits before the reciprocal stops losing information.
pub const MIN_PRECISION: u64 = 40;

/// Largest number of significant digits the engine will work with
pub const MAX_PRECISION: u64 = 10_000;

/// Errors raised while converting a sqrt price into exchange rates
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Price or decimal input could not be accepted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reciprocal of a zero rate was requested
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Configured precision cannot carry the required significant digits
    #[error("Precision of {requested} digits is below the required minimum of {minimum}")]
    PrecisionOverflow { requested: u64, minimum: u64 },
}

impl PriceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PriceError>;
