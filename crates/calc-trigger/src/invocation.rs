//! Request handler — one invocation in, one response out.
//!
//! Each call to [`RequestHandler::handle`] is independent: nothing is
//! shared between invocations and every step runs exactly once.

use std::collections::HashMap;

use calc_core::{CalcConfig, CalculationRequest};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{InvocationError, TriggerError};

pub const UNMARSHAL_FAILED_MESSAGE: &str =
    "Could not unmarshal Json, please provide a valid request";
pub const CALCULATION_FAILED_MESSAGE: &str =
    r#"Invalid method. Valid methods are "ADD", "SUBTRACT", "MULTIPLY" and "DIVIDE""#;
pub const MARSHAL_FAILED_MESSAGE: &str = "Could not marshal Json";

/// Body returned by the GET health echo.
pub const HEALTH_ECHO_BODY: &str = "GET";

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// A request as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Invocation {
    pub fn new(method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Shorthand for a `POST` with the given body.
    pub fn post(body: impl Into<String>) -> Self {
        Self::new("POST", body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A structured response handed back to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl InvocationResponse {
    fn json(body: String) -> Self {
        Self {
            status: 200,
            headers: HashMap::from([(
                CONTENT_TYPE.to_string(),
                APPLICATION_JSON.to_string(),
            )]),
            body,
        }
    }

    fn plain(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }
}

impl From<InvocationError> for InvocationResponse {
    fn from(err: InvocationError) -> Self {
        Self::plain(err.status(), err.message())
    }
}

/// Handles invocations of the calculator function.
#[derive(Debug, Clone, Default)]
pub struct RequestHandler {
    health_echo: bool,
}

impl RequestHandler {
    /// A handler accepting `POST` only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also answer `GET` with a literal `GET` body.
    pub fn with_health_echo(mut self, enabled: bool) -> Self {
        self.health_echo = enabled;
        self
    }

    pub fn from_config(config: &CalcConfig) -> Self {
        Self::new().with_health_echo(config.health_echo())
    }

    pub fn health_echo(&self) -> bool {
        self.health_echo
    }

    /// Handle a single invocation.
    ///
    /// Every failure except an unsupported HTTP method becomes a response.
    pub fn handle(&self, invocation: &Invocation) -> Result<InvocationResponse, TriggerError> {
        debug!(
            method = %invocation.method,
            content_type = invocation.header("content-type").unwrap_or("-"),
            user_agent = invocation.header("user-agent").unwrap_or("-"),
            body_len = invocation.body.len(),
            "invocation received"
        );

        match invocation.method.as_str() {
            "POST" => Ok(self.create_response(&invocation.body)),
            "GET" if self.health_echo => Ok(InvocationResponse::plain(200, HEALTH_ECHO_BODY)),
            other => {
                warn!(method = other, "rejecting unsupported HTTP method");
                Err(TriggerError::UnsupportedHttpMethod(other.to_string()))
            }
        }
    }

    fn create_response(&self, body: &str) -> InvocationResponse {
        match respond(body) {
            Ok(json) => InvocationResponse::json(json),
            Err(err) => {
                match &err {
                    InvocationError::MalformedInput(e) => {
                        debug!(error = %e, "request body rejected")
                    }
                    InvocationError::Calculation(e) => {
                        debug!(error = %e, "calculation rejected")
                    }
                    InvocationError::EncodingFailure(e) => {
                        warn!(error = %e, "result encoding failed")
                    }
                }
                err.into()
            }
        }
    }
}

/// Decode, calculate and encode. Nothing is calculated unless the whole
/// body decoded.
fn respond(body: &str) -> Result<String, InvocationError> {
    let request =
        CalculationRequest::from_json(body).map_err(InvocationError::MalformedInput)?;
    let result = request.evaluate()?;
    debug!(
        a = request.a,
        b = request.b,
        method = %request.method,
        result = result.result,
        "calculated"
    );
    encode(&result)
}

fn encode<T: Serialize>(value: &T) -> Result<String, InvocationError> {
    serde_json::to_string(value).map_err(InvocationError::EncodingFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::CalculationResult;

    fn post(body: &str) -> InvocationResponse {
        RequestHandler::new().handle(&Invocation::post(body)).unwrap()
    }

    #[test]
    fn add_succeeds_with_json_body() {
        let resp = post(r#"{"a":4,"b":5,"method":"ADD"}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"result":9}"#);
        assert_eq!(resp.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[test]
    fn divide_succeeds() {
        let resp = post(r#"{"a":10,"b":2,"method":"DIVIDE"}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"result":5}"#);
    }

    #[test]
    fn success_body_decodes_to_result() {
        let resp = post(r#"{"a":-6,"b":7,"method":"MULTIPLY"}"#);
        let result: CalculationResult = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(result.result, -42);
    }

    #[test]
    fn divide_by_zero_is_500() {
        let resp = post(r#"{"a":1,"b":0,"method":"DIVIDE"}"#);
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, CALCULATION_FAILED_MESSAGE);
        assert!(resp.headers.is_empty());
    }

    #[test]
    fn unknown_method_is_500() {
        let resp = post(r#"{"a":1,"b":2,"method":"POW"}"#);
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, CALCULATION_FAILED_MESSAGE);
    }

    #[test]
    fn lowercase_method_is_500() {
        let resp = post(r#"{"a":1,"b":2,"method":"add"}"#);
        assert_eq!(resp.status, 500);
    }

    #[test]
    fn not_json_is_400() {
        let resp = post("not-json");
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body, "Could not unmarshal Json, please provide a valid request");
    }

    #[test]
    fn shape_mismatch_is_400() {
        for body in [
            "",
            "[]",
            r#"[4,5,"ADD"]"#,
            r#""ADD""#,
            "{}",
            r#"{"a":1,"b":2}"#,
            r#"{"a":"1","b":2,"method":"ADD"}"#,
            r#"{"a":1,"b":2.5,"method":"ADD"}"#,
            r#"{"a":1,"b":2,"method":true}"#,
        ] {
            let resp = post(body);
            assert_eq!(resp.status, 400, "body {body:?}");
            assert_eq!(resp.body, UNMARSHAL_FAILED_MESSAGE);
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let resp = post(r#"{"a":2,"b":3,"method":"SUBTRACT","extra":[1,2]}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"result":-1}"#);
    }

    #[test]
    fn delete_is_unsupported() {
        let err = RequestHandler::new()
            .handle(&Invocation::new("DELETE", r#"{"a":1,"b":2,"method":"ADD"}"#))
            .unwrap_err();
        assert_eq!(err, TriggerError::UnsupportedHttpMethod("DELETE".into()));
    }

    #[test]
    fn http_method_is_case_sensitive() {
        let err = RequestHandler::new()
            .handle(&Invocation::new("post", r#"{"a":1,"b":2,"method":"ADD"}"#))
            .unwrap_err();
        assert!(matches!(err, TriggerError::UnsupportedHttpMethod(_)));
    }

    #[test]
    fn get_rejected_without_echo() {
        let err = RequestHandler::new()
            .handle(&Invocation::new("GET", ""))
            .unwrap_err();
        assert_eq!(err, TriggerError::UnsupportedHttpMethod("GET".into()));
    }

    #[test]
    fn get_echo_when_enabled() {
        let handler = RequestHandler::new().with_health_echo(true);
        let resp = handler.handle(&Invocation::new("GET", "ignored")).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "GET");
        assert!(resp.headers.is_empty());
    }

    #[test]
    fn echo_does_not_open_other_methods() {
        let handler = RequestHandler::new().with_health_echo(true);
        assert!(handler.handle(&Invocation::new("PUT", "")).is_err());
    }

    #[test]
    fn from_config_reads_health_echo() {
        let config = CalcConfig::default().with_health_echo(true);
        assert!(RequestHandler::from_config(&config).health_echo());
        assert!(!RequestHandler::from_config(&CalcConfig::default()).health_echo());
    }

    #[test]
    fn headers_do_not_change_outcome() {
        let inv = Invocation::post(r#"{"a":4,"b":5,"method":"ADD"}"#)
            .with_header("Content-Type", "text/plain")
            .with_header("User-Agent", "curl/8");
        assert_eq!(inv.header("content-type"), Some("text/plain"));
        let resp = RequestHandler::new().handle(&inv).unwrap();
        assert_eq!(resp.body, r#"{"result":9}"#);
    }

    #[test]
    fn encode_failure_maps_to_marshal_message() {
        let unencodable: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);
        let err = encode(&unencodable).unwrap_err();
        let resp = InvocationResponse::from(err);
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, MARSHAL_FAILED_MESSAGE);
    }
}
