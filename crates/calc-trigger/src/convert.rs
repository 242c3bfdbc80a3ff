//! HTTP type conversions between hyper and the invocation contract.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use http_body_util::Full;
use hyper::Response;

use crate::invocation::{Invocation, InvocationResponse};

/// Convert an http::Method to the string form the handler dispatches on.
pub fn method_to_string(method: &Method) -> String {
    method.as_str().to_string()
}

/// Convert a status code from u16.
pub fn status_from_u16(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Flatten headers into a name → value map.
///
/// Values that are not visible ASCII are dropped. Repeated headers keep
/// the last value.
pub fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Build a HeaderMap from a name → value map, skipping invalid entries.
pub fn headers_from_map(map: &HashMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in map {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
    headers
}

/// Assemble an invocation from request parts and a collected body.
pub fn invocation_from_parts(method: &Method, headers: &HeaderMap, body: &[u8]) -> Invocation {
    Invocation {
        method: method_to_string(method),
        headers: headers_to_map(headers),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

/// Convert a handler response into a hyper response.
pub fn into_hyper_response(response: InvocationResponse) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(response.body)));
    *resp.status_mut() = status_from_u16(response.status);
    *resp.headers_mut() = headers_from_map(&response.headers);
    resp
}

/// A plain-text response with no headers beyond what hyper adds.
pub fn plain_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *resp.status_mut() = status;
    resp
}
