//! Integer calculator.
//!
//! All arithmetic is signed 64-bit with two's-complement wrapping on
//! overflow, so `i64::MAX + 1 == i64::MIN` and `i64::MIN / -1 == i64::MIN`.
//! Division truncates toward zero. Nothing here panics.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced by a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("unsupported method: {0:?}")]
    UnsupportedMethod(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// A recognized arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Every operation, in the order they are advertised to callers.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// The wire tag for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Subtract => "SUBTRACT",
            Operation::Multiply => "MULTIPLY",
            Operation::Divide => "DIVIDE",
        }
    }

    /// Apply the operation to `a` and `b`.
    pub fn apply(&self, a: i64, b: i64) -> Result<i64, CalcError> {
        match self {
            Operation::Add => Ok(a.wrapping_add(b)),
            Operation::Subtract => Ok(a.wrapping_sub(b)),
            Operation::Multiply => Ok(a.wrapping_mul(b)),
            Operation::Divide => {
                if b == 0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(a.wrapping_div(b))
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    /// Tags are case-sensitive: `"add"` is not `ADD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CalcError::UnsupportedMethod(s.to_string()))
    }
}

/// Perform the operation named by `method` on `a` and `b`.
pub fn calculate(a: i64, b: i64, method: &str) -> Result<i64, CalcError> {
    method.parse::<Operation>()?.apply(a, b)
}
