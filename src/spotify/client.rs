use std::{sync::Arc, time::Duration};

use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::{
    config::Config,
    error::{ApiError, PayloadError},
    management::TokenManager,
    printer::{Notifier, PrintChannel},
};

const APP_PLATFORM: &str = "WebPlayer";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Body returned when the response could not be parsed at all.
pub fn empty_response_payload() -> Value {
    json!({"error": {"status": "unknown", "message": "received an empty response"}})
}

/// Parses a response body, substituting [`empty_response_payload`] for
/// anything that is not JSON.
pub fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| empty_response_payload())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Returns the error carried by a payload, if it is one.
///
/// A payload is an error when it is empty/falsy or has an `error` key.
pub fn payload_error(payload: &Value) -> Option<PayloadError> {
    if let Some(error) = payload.get("error") {
        let status = match error.get("status") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        };
        let message = match error.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ if error.is_string() => error.as_str().unwrap_or_default().to_string(),
            _ => "no message".to_string(),
        };
        return Some(PayloadError { status, message });
    }

    if is_falsy(payload) {
        return Some(PayloadError {
            status: "unknown".to_string(),
            message: "received an empty response".to_string(),
        });
    }

    None
}

/// Raw body and parsed payload of a request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub raw: String,
    pub json: Value,
}

impl ApiResponse {
    pub fn error(&self) -> Option<PayloadError> {
        payload_error(&self.json)
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Turns an error payload into [`ApiError::Payload`].
    pub fn into_result(self) -> Result<Value, ApiError> {
        match payload_error(&self.json) {
            Some(err) => Err(ApiError::Payload(err)),
            None => Ok(self.json),
        }
    }
}

/// Authenticated access to the Web API.
pub struct ApiClient {
    http: Client,
    tokens: TokenManager,
    notifier: Arc<dyn Notifier>,
    language: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new(tokens: TokenManager, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        ApiClient {
            http: Client::new(),
            tokens,
            notifier,
            language: config.language.clone(),
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay,
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn auth_headers(&self, with_user_agent: bool) -> Result<HeaderMap, ApiError> {
        let token = self.tokens.get_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(&self.language)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("app-platform", HeaderValue::from_static(APP_PLATFORM));
        if with_user_agent {
            headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        }
        Ok(headers)
    }

    /// GETs `url`, retrying while the API answers with an error payload.
    ///
    /// After `retry_attempts` attempts the last error payload is returned as a
    /// regular response; callers inspect it with [`ApiResponse::error`].
    /// Transport, token and header failures are returned as `Err` right away.
    pub async fn invoke(&self, url: &str) -> Result<ApiResponse, ApiError> {
        let mut attempt: u32 = 0;

        loop {
            let headers = self.auth_headers(true).await?;
            let response = self.http.get(url).headers(headers).send().await?;
            let raw = response.text().await?;
            let json = parse_payload(&raw);

            let Some(err) = payload_error(&json) else {
                return Ok(ApiResponse { raw, json });
            };

            if attempt < self.retry_attempts.saturating_sub(1) {
                self.notifier.notify(
                    PrintChannel::Warnings,
                    &format!("Spotify API Error (try {}) {}", attempt + 1, err),
                );
                sleep(self.retry_delay).await;
                attempt += 1;
                continue;
            }

            self.notifier
                .notify(PrintChannel::ApiErrors, &format!("Spotify API Error {}", err));
            return Ok(ApiResponse { raw, json });
        }
    }

    /// GETs one page of `url` with `limit`, `offset` and `extra` merged into
    /// the query. No retries: the pagination loop tolerates a bad page.
    pub async fn invoke_with_params(
        &self,
        url: &str,
        limit: u32,
        offset: u32,
        extra: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let headers = self.auth_headers(false).await?;

        let mut params: Vec<(String, String)> = vec![
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        params.extend(extra.iter().cloned());

        let response = self
            .http
            .get(url)
            .headers(headers)
            .query(&params)
            .send()
            .await?;
        let raw = response.text().await?;
        let json = parse_payload(&raw);

        if let Some(err) = payload_error(&json) {
            self.notifier
                .notify(PrintChannel::ApiErrors, &format!("Spotify API Error {}", err));
        }
        Ok(json)
    }
}
