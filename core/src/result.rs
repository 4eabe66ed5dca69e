//! The uniform outcome of every verb call.
//!
//! # Design
//! A verb call never returns `Err` and never panics on network trouble.
//! Outcomes fall into three tiers:
//!
//! 1. a response arrived, whatever its status: `Received`;
//! 2. the request went out but nothing came back (timeout, refused
//!    connection, DNS, TLS, reset mid-body): `Failed` / `NoResponse`;
//! 3. the request could not be built or sent at all: `Failed` / `NotSent`.
//!
//! 4xx and 5xx responses are tier 1. They are valid outcomes a test asserts
//! on, not failures of this layer. The accessors (`status`, `data`,
//! `error`) give every tier the same flat shape, with `status() == 0`
//! marking tiers 2 and 3.

use std::collections::btree_map::Entry;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::config::Headers;

/// Error text for every tier-2 failure.
pub const NO_RESPONSE: &str = "No response received from server";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestResult {
    Received(ReceivedResponse),
    Failed(TransportFailure),
}

/// A response the server actually sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedResponse {
    /// Real HTTP status; never 0.
    pub status: u16,
    /// Parsed JSON body. An empty body is `Null`; a body that is not JSON
    /// is kept as a JSON string.
    pub data: Value,
    /// Lowercase header names. Repeated headers are joined with `", "`.
    pub headers: Headers,
    /// Set for non-2xx statuses only: the body's `message` field when it
    /// has one, otherwise a generic description of the status.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Sent, but no response arrived.
    NoResponse,
    /// Never sent.
    NotSent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub error: String,
}

impl RequestResult {
    /// Normalizes a received response from its raw parts.
    pub fn from_parts(status: u16, headers: Headers, body: &[u8]) -> Self {
        let data = parse_body(body);
        let error = if (200..300).contains(&status) {
            None
        } else {
            Some(
                data.get("message")
                    .and_then(Value::as_str)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Request failed with status code {status}")),
            )
        };
        RequestResult::Received(ReceivedResponse {
            status,
            data,
            headers,
            error,
        })
    }

    pub fn no_response() -> Self {
        RequestResult::Failed(TransportFailure {
            kind: FailureKind::NoResponse,
            error: NO_RESPONSE.to_string(),
        })
    }

    pub fn not_sent(error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.is_empty() {
            "request could not be sent".to_string()
        } else {
            error
        };
        RequestResult::Failed(TransportFailure {
            kind: FailureKind::NotSent,
            error,
        })
    }

    /// Classifies a transport error: builder errors never left the client,
    /// everything else did and got no answer.
    pub fn from_transport_error(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            RequestResult::not_sent(err.to_string())
        } else {
            RequestResult::no_response()
        }
    }

    /// HTTP status, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            RequestResult::Received(response) => response.status,
            RequestResult::Failed(_) => 0,
        }
    }

    /// Response body; `None` stands for the `null` data of a failure.
    pub fn data(&self) -> Option<&Value> {
        match self {
            RequestResult::Received(response) => Some(&response.data),
            RequestResult::Failed(_) => None,
        }
    }

    pub fn headers(&self) -> Option<&Headers> {
        match self {
            RequestResult::Received(response) => Some(&response.headers),
            RequestResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestResult::Received(response) => response.error.as_deref(),
            RequestResult::Failed(failure) => Some(&failure.error),
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, RequestResult::Received(_))
    }

    /// A received 2xx response.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RequestResult::Received(_) => None,
            RequestResult::Failed(failure) => Some(failure.kind),
        }
    }

    /// The flat `{status, data, headers?, error?}` view, with `data: null`
    /// for failures.
    pub fn to_json(&self) -> Value {
        let mut out = serde_json::Map::new();
        out.insert("status".to_string(), Value::from(self.status()));
        out.insert(
            "data".to_string(),
            self.data().cloned().unwrap_or(Value::Null),
        );
        if let Some(headers) = self.headers() {
            let headers = headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            out.insert("headers".to_string(), Value::Object(headers));
        }
        if let Some(error) = self.error() {
            out.insert("error".to_string(), Value::String(error.to_string()));
        }
        Value::Object(out)
    }
}

/// Flattens a transport header map into lowercase name -> value.
pub fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        match headers.entry(name.as_str().to_string()) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
        }
    }
    headers
}

fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
