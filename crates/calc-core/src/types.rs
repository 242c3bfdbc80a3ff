//! Request and result payloads exchanged with callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calculator::{CalcError, calculate};

/// Inbound calculation request.
///
/// All three fields are required. `method` stays a raw string so an
/// unrecognized tag surfaces as [`CalcError::UnsupportedMethod`] rather
/// than as a decode failure. Only a JSON object decodes; the positional
/// form `[a, b, method]` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct CalculationRequest {
    pub a: i64,
    pub b: i64,
    pub method: String,
}

#[derive(Deserialize)]
struct RequestFields {
    a: i64,
    b: i64,
    method: String,
}

impl TryFrom<Map<String, Value>> for CalculationRequest {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields = RequestFields::deserialize(Value::Object(object))?;
        Ok(Self::new(fields.a, fields.b, fields.method))
    }
}

impl CalculationRequest {
    pub fn new(a: i64, b: i64, method: impl Into<String>) -> Self {
        Self {
            a,
            b,
            method: method.into(),
        }
    }

    /// Decode a request from a JSON body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Run the calculation this request describes.
    pub fn evaluate(&self) -> Result<CalculationResult, CalcError> {
        calculate(self.a, self.b, &self.method).map(CalculationResult::new)
    }
}

/// Outbound calculation result, serialized as `{"result": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub result: i64,
}

impl CalculationResult {
    pub fn new(result: i64) -> Self {
        Self { result }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
