//! Invocation error taxonomy.

use calc_core::CalcError;
use thiserror::Error;

use crate::invocation::{
    CALCULATION_FAILED_MESSAGE, MARSHAL_FAILED_MESSAGE, UNMARSHAL_FAILED_MESSAGE,
};

/// Failures that are converted into a structured HTTP response.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("malformed input: {0}")]
    MalformedInput(#[source] serde_json::Error),

    #[error("calculation failed: {0}")]
    Calculation(#[from] CalcError),

    #[error("encoding failed: {0}")]
    EncodingFailure(#[source] serde_json::Error),
}

impl InvocationError {
    /// HTTP status code reported to the caller.
    pub fn status(&self) -> u16 {
        match self {
            InvocationError::MalformedInput(_) => 400,
            InvocationError::Calculation(_) => 500,
            InvocationError::EncodingFailure(_) => 500,
        }
    }

    /// Fixed body text reported to the caller.
    ///
    /// Unsupported method and division by zero share a message.
    pub fn message(&self) -> &'static str {
        match self {
            InvocationError::MalformedInput(_) => UNMARSHAL_FAILED_MESSAGE,
            InvocationError::Calculation(_) => CALCULATION_FAILED_MESSAGE,
            InvocationError::EncodingFailure(_) => MARSHAL_FAILED_MESSAGE,
        }
    }
}

/// Failures propagated to the host without a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("HTTP method not supported: {0}")]
    UnsupportedHttpMethod(String),
}
