use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    error::AuthError,
    types::{Credential, Session, TokenResponse},
};

/// Caches a client-credentials bearer token and refreshes it once it expires.
///
/// The cache lock is held for the whole refresh, so two callers racing on an
/// expired token produce a single request to the token endpoint.
pub struct TokenManager {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    credential: Mutex<Option<Credential>>,
}

impl TokenManager {
    pub fn new(token_url: &str, client_id: &str, client_secret: &str) -> Self {
        TokenManager {
            client: Client::new(),
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            credential: Mutex::new(None),
        }
    }

    /// Builds a manager for the session's client and seeds it with the token
    /// obtained while the session was created.
    pub fn from_session(session: &Session, token_url: &str) -> Self {
        let manager = Self::new(token_url, &session.client_id, &session.client_secret);
        match &session.credential {
            Some(credential) => manager.with_credential(credential.clone()),
            None => manager,
        }
    }

    pub fn with_credential(self, credential: Credential) -> Self {
        TokenManager {
            credential: Mutex::new(Some(credential)),
            ..self
        }
    }

    /// Returns a usable access token, hitting the token endpoint only when the
    /// cached one is missing or expired.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let mut cached = self.credential.lock().await;
        if let Some(credential) = cached.as_ref() {
            if credential.is_valid() {
                return Ok(credential.access_token.clone());
            }
        }

        let credential = request_client_token(
            &self.client,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
        )
        .await?;
        let token = credential.access_token.clone();
        *cached = Some(credential);
        Ok(token)
    }

    pub async fn current_credential(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }
}

pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// Performs a client-credentials grant against `token_url`.
///
/// Any non-2xx status, a body without `access_token`/`expires_in` or a
/// lifetime that is not positive is an error. Nothing is retried here.
pub async fn request_client_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<Credential, AuthError> {
    let response = client
        .post(token_url)
        .header(AUTHORIZATION, basic_auth_header(client_id, client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AuthError::Rejected { status, body });
    }

    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;
    if token.access_token.is_empty() {
        return Err(AuthError::Malformed("empty access_token".to_string()));
    }

    let expires_in = token.expires_in;
    Credential::from_response(token, Utc::now().timestamp())
        .ok_or_else(|| AuthError::Malformed(format!("unusable expires_in: {}", expires_in)))
}
