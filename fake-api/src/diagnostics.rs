//! Routes that report what the server received, for client-side tests.

use std::{collections::BTreeMap, time::Duration};

use axum::{
    extract::Query,
    http::{HeaderMap, Method},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Reflects the request back: method, decoded query, lowercase header map
/// and the body (parsed as JSON when possible).
pub(crate) async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

#[derive(Deserialize)]
pub(crate) struct SlowParams {
    #[serde(default)]
    ms: u64,
}

/// Waits `ms` milliseconds before answering.
pub(crate) async fn slow(Query(params): Query<SlowParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    Json(json!({ "sleptMs": params.ms }))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
