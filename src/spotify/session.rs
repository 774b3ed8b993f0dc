use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    error::{AuthError, SessionError},
    management::request_client_token,
    printer::{Notifier, PrintChannel},
    types::{Session, StoredCredentials},
};

/// One way of establishing a session, attempted by [`SessionAuthenticator`].
#[async_trait]
pub trait SessionBuilder: Send + Sync {
    async fn create(&self) -> Result<Session, SessionError>;
}

/// Creates session builders for both credential sources.
pub trait SessionProvider: Send + Sync {
    fn stored_file(&self, path: &Path) -> Box<dyn SessionBuilder>;

    /// `store_at` names the file the credentials are written to once the
    /// session is established.
    fn user_pass(
        &self,
        username: &str,
        password: &str,
        store_at: Option<&Path>,
    ) -> Box<dyn SessionBuilder>;
}

pub trait CredentialPrompt: Send + Sync {
    fn username(&self) -> io::Result<String>;
    fn password(&self) -> io::Result<String>;
}

/// Exponential backoff for connection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl BackoffPolicy {
    /// Delay before retry number `attempt + 1`: `initial_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    StoredFile,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoSession,
    Authenticating(CredentialSource),
    Authenticated(CredentialSource),
    Failed,
}

pub struct SessionAuthenticator<'a> {
    provider: &'a dyn SessionProvider,
    prompt: &'a dyn CredentialPrompt,
    notifier: Arc<dyn Notifier>,
    policy: BackoffPolicy,
    credentials_location: PathBuf,
    save_credentials: bool,
    username: Option<String>,
    password: Option<String>,
    state: AuthState,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(
        provider: &'a dyn SessionProvider,
        prompt: &'a dyn CredentialPrompt,
        notifier: Arc<dyn Notifier>,
        policy: BackoffPolicy,
        credentials_location: PathBuf,
    ) -> Self {
        SessionAuthenticator {
            provider,
            prompt,
            notifier,
            policy,
            credentials_location,
            save_credentials: false,
            username: None,
            password: None,
            state: AuthState::NoSession,
        }
    }

    pub fn save_credentials(mut self, save: bool) -> Self {
        self.save_credentials = save;
        self
    }

    /// Credentials used for the first interactive attempt instead of prompting.
    pub fn preset(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.password = password;
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Runs `builder` until it succeeds, retrying connection failures with
    /// exponential backoff. Authentication failures are returned at once.
    ///
    /// `max_retries` counts retries, not attempts: with 4 retries and a 1s
    /// initial delay the builder runs up to 5 times and waits 1, 2, 4 and 8s
    /// in between. A budget of total attempts would instead stop after 4 runs
    /// and 3 delays; the 1, 2, 4, 8 schedule needs the extra attempt.
    pub async fn create_session_with_retry(
        &self,
        builder: &dyn SessionBuilder,
    ) -> Result<Session, SessionError> {
        let total = self.policy.max_retries + 1;
        let mut attempt = 0;

        loop {
            match builder.create().await {
                Ok(session) => return Ok(session),
                Err(err) if err.is_connection() => {
                    if attempt < self.policy.max_retries {
                        let delay = self.policy.delay_for(attempt);
                        self.notifier.notify(
                            PrintChannel::Warnings,
                            &format!(
                                "Connection error (attempt {}/{}): {}. Retrying in {}s...",
                                attempt + 1,
                                total,
                                err,
                                delay.as_secs_f64()
                            ),
                        );
                        sleep(delay).await;
                        attempt += 1;
                    } else {
                        self.notifier.notify(
                            PrintChannel::Errors,
                            &format!("Failed to connect to Spotify after {} attempts: {}", total, err),
                        );
                        return Err(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Establishes the session for this run.
    ///
    /// The stored credentials file is tried first. When it is missing or
    /// rejected, the user is asked for credentials until a session is created.
    /// Only an exhausted connection budget or a failing prompt ends the loop
    /// with an error.
    pub async fn login(&mut self) -> Result<Session, SessionError> {
        self.state = AuthState::NoSession;

        if self.credentials_location.is_file() {
            self.state = AuthState::Authenticating(CredentialSource::StoredFile);
            let builder = self.provider.stored_file(&self.credentials_location);
            match self.create_session_with_retry(builder.as_ref()).await {
                Ok(session) => {
                    self.state = AuthState::Authenticated(CredentialSource::StoredFile);
                    return Ok(session);
                }
                Err(SessionError::Authentication(reason)) => {
                    self.notifier.notify(
                        PrintChannel::Warnings,
                        &format!("Stored credentials rejected: {}", reason),
                    );
                }
                Err(err) => {
                    self.state = AuthState::Failed;
                    return Err(err);
                }
            }
        }

        let mut preset_username = self.username.clone();
        let mut preset_password = self.password.clone();

        loop {
            self.state = AuthState::Authenticating(CredentialSource::Interactive);

            let credentials = match preset_username.take() {
                Some(username) => Ok(username),
                None => self.ask_username(),
            }
            .and_then(|username| {
                let password = match preset_password.take() {
                    Some(password) => password,
                    None => self.prompt.password()?,
                };
                Ok((username, password))
            });
            let (username, password) = match credentials {
                Ok(pair) => pair,
                Err(err) => {
                    self.state = AuthState::Failed;
                    return Err(SessionError::Prompt(err));
                }
            };

            let store_at = self
                .save_credentials
                .then_some(self.credentials_location.as_path());
            let builder = self.provider.user_pass(&username, &password, store_at);

            match self.create_session_with_retry(builder.as_ref()).await {
                Ok(session) => {
                    self.state = AuthState::Authenticated(CredentialSource::Interactive);
                    return Ok(session);
                }
                Err(SessionError::Authentication(reason)) => {
                    self.notifier
                        .notify(PrintChannel::Errors, &format!("Login failed: {}", reason));
                }
                Err(err) => {
                    self.state = AuthState::Failed;
                    return Err(err);
                }
            }
        }
    }

    fn ask_username(&self) -> io::Result<String> {
        loop {
            let username = self.prompt.username()?;
            let username = username.trim();
            if !username.is_empty() {
                return Ok(username.to_string());
            }
        }
    }
}

/// Sessions backed by a Spotify developer application.
///
/// The username is the application's client id and the password its client
/// secret. A session is established by a successful client-credentials grant.
///
/// A credentials file that cannot be written is reported on WARNINGS; the
/// session is still returned.
pub struct ClientCredentialsProvider {
    client: Client,
    token_url: String,
    notifier: Arc<dyn Notifier>,
}

impl ClientCredentialsProvider {
    pub fn new(token_url: &str, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client: Client::new(),
            token_url: token_url.to_string(),
            notifier,
        }
    }
}

impl SessionProvider for ClientCredentialsProvider {
    fn stored_file(&self, path: &Path) -> Box<dyn SessionBuilder> {
        Box::new(StoredFileBuilder {
            client: self.client.clone(),
            token_url: self.token_url.clone(),
            path: path.to_path_buf(),
        })
    }

    fn user_pass(
        &self,
        username: &str,
        password: &str,
        store_at: Option<&Path>,
    ) -> Box<dyn SessionBuilder> {
        Box::new(UserPassBuilder {
            client: self.client.clone(),
            token_url: self.token_url.clone(),
            credentials: StoredCredentials {
                username: username.to_string(),
                client_id: username.to_string(),
                client_secret: password.to_string(),
            },
            store_at: store_at.map(Path::to_path_buf),
            notifier: Arc::clone(&self.notifier),
        })
    }
}

fn classify(err: AuthError) -> SessionError {
    match err {
        AuthError::Transport(e) => SessionError::Connection(e.to_string()),
        AuthError::Rejected { status, body }
            if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS =>
        {
            SessionError::Connection(format!("{}: {}", status, body))
        }
        other => SessionError::Authentication(other.to_string()),
    }
}

async fn establish(
    client: &Client,
    token_url: &str,
    credentials: &StoredCredentials,
) -> Result<Session, SessionError> {
    let credential = request_client_token(
        client,
        token_url,
        &credentials.client_id,
        &credentials.client_secret,
    )
    .await
    .map_err(classify)?;

    Ok(Session {
        username: credentials.username.clone(),
        client_id: credentials.client_id.clone(),
        client_secret: credentials.client_secret.clone(),
        credential: Some(credential),
    })
}

struct StoredFileBuilder {
    client: Client,
    token_url: String,
    path: PathBuf,
}

#[async_trait]
impl SessionBuilder for StoredFileBuilder {
    async fn create(&self) -> Result<Session, SessionError> {
        let content = async_fs::read_to_string(&self.path).await.map_err(|e| {
            SessionError::Authentication(format!("cannot read stored credentials: {}", e))
        })?;
        let credentials: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| SessionError::Authentication(format!("malformed stored session: {}", e)))?;

        establish(&self.client, &self.token_url, &credentials).await
    }
}

struct UserPassBuilder {
    client: Client,
    token_url: String,
    credentials: StoredCredentials,
    store_at: Option<PathBuf>,
    notifier: Arc<dyn Notifier>,
}

#[async_trait]
impl SessionBuilder for UserPassBuilder {
    async fn create(&self) -> Result<Session, SessionError> {
        let session = establish(&self.client, &self.token_url, &self.credentials).await?;

        if let Some(path) = &self.store_at {
            if let Err(e) = persist_credentials(path, &self.credentials).await {
                self.notifier.notify(
                    PrintChannel::Warnings,
                    &format!("Could not save credentials to {}: {}", path.display(), e),
                );
            }
        }
        Ok(session)
    }
}

async fn persist_credentials(path: &Path, credentials: &StoredCredentials) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(credentials)?;
    async_fs::write(path, json).await
}
