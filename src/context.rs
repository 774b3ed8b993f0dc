use std::sync::Arc;

use crate::{
    config::Config,
    error::SessionError,
    management::TokenManager,
    printer::Notifier,
    spotify::{ApiClient, BackoffPolicy, CredentialPrompt, SessionAuthenticator, SessionProvider},
    types::Session,
};

/// State of one run: configuration, the session and the API client built on
/// top of it. Owned by the top-level command and lent to every component.
pub struct Context {
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub notifier: Arc<dyn Notifier>,
}

impl Context {
    pub fn new(config: Config, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        let tokens = TokenManager::from_session(&session, &config.token_url);
        let api = ApiClient::new(tokens, Arc::clone(&notifier), &config);
        Context {
            config,
            session,
            api,
            notifier,
        }
    }

    /// Logs in through `provider` and builds the context around the session.
    pub async fn login(
        config: Config,
        provider: &dyn SessionProvider,
        prompt: &dyn CredentialPrompt,
        notifier: Arc<dyn Notifier>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, SessionError> {
        let policy = BackoffPolicy {
            max_retries: config.connection_retries,
            initial_delay: config.connection_initial_delay,
        };

        let mut authenticator = SessionAuthenticator::new(
            provider,
            prompt,
            Arc::clone(&notifier),
            policy,
            config.credentials_location.clone(),
        )
        .save_credentials(config.save_credentials)
        .preset(username, password);
        let session = authenticator.login().await?;

        Ok(Self::new(config, session, notifier))
    }
}
