// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for the provider clients.
//!
//! None of these helpers retry. Retries happen once, at the pipeline boundary.

use std::time::Duration;

use emblem_core::EmblemError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Per-request deadline so a hung upstream cannot stall a stage forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds a JSON client with the given default headers.
pub(crate) fn build_client(mut headers: HeaderMap) -> Result<reqwest::Client, EmblemError> {
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| EmblemError::Provider {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

pub(crate) fn header_value(what: &str, value: &str) -> Result<HeaderValue, EmblemError> {
    HeaderValue::from_str(value)
        .map_err(|e| EmblemError::Config(format!("invalid {what} header value: {e}")))
}

/// POSTs `body` as JSON and decodes a successful response into `R`.
///
/// Non-2xx responses become [`EmblemError::Provider`] carrying the upstream's
/// own error message when one can be found in the body.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    body: &B,
) -> Result<R, EmblemError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| EmblemError::Provider {
            message: format!("{provider} request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

    let status = response.status();
    debug!(provider, status = %status, "response received");

    let text = response.text().await.map_err(|e| EmblemError::Provider {
        message: format!("failed to read {provider} response body: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        return Err(EmblemError::Provider {
            message: format!("{provider} returned {status}: {}", error_detail(&text)),
            source: None,
        });
    }

    serde_json::from_str(&text).map_err(|e| EmblemError::Provider {
        message: format!("failed to parse {provider} response: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Pulls a human-readable message out of an error body.
///
/// Understands the OpenAI (`error.message`), Fal (`detail`), Replicate
/// (`detail`/`error`), and Imgur (`data.error`) shapes, falling back to the
/// raw body.
pub(crate) fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return truncate(body);
    };

    let candidates = ["/error/message", "/data/error/message", "/data/error", "/detail", "/error"];
    for pointer in candidates {
        match value.pointer(pointer) {
            Some(Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(Value::Array(items)) if !items.is_empty() => {
                let joined: Vec<String> = items
                    .iter()
                    .map(|item| match item.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => item.to_string(),
                    })
                    .collect();
                return joined.join("; ");
            }
            _ => {}
        }
    }
    truncate(body)
}

fn truncate(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_reads_known_shapes() {
        assert_eq!(
            error_detail(r#"{"error": {"message": "quota exceeded", "type": "insufficient_quota"}}"#),
            "quota exceeded"
        );
        assert_eq!(error_detail(r#"{"detail": "Unauthorized"}"#), "Unauthorized");
        assert_eq!(
            error_detail(r#"{"detail": [{"msg": "field required"}, {"msg": "bad size"}]}"#),
            "field required; bad size"
        );
        assert_eq!(
            error_detail(r#"{"data": {"error": "Invalid URL"}, "success": false, "status": 400}"#),
            "Invalid URL"
        );
        assert_eq!(error_detail("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1_000);
        let detail = error_detail(&body);
        assert!(detail.len() < 400);
        assert!(detail.ends_with("..."));
    }
}
