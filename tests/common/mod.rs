#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use sporldl::{
    config::Config,
    error::{ArchiveError, DownloadError},
    management::{Archive, TokenManager, TrackDownloader},
    printer::{Notifier, PrintChannel},
    spotify::CredentialPrompt,
    types::{Credential, DownloadRequest},
};

pub const TEST_TOKEN: &str = "test-token";

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(PrintChannel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self, channel: PrintChannel) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn count(&self, channel: PrintChannel) -> usize {
        self.messages(channel).len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, channel: PrintChannel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((channel, message.to_string()));
    }
}

/// Config pointing at a mock server, without retry delays.
pub fn test_config(base_uri: &str) -> Config {
    Config {
        api_url: base_uri.to_string(),
        token_url: format!("{}/api/token", base_uri),
        retry_attempts: 3,
        retry_delay: Duration::ZERO,
        connection_initial_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// Token manager that already holds a valid token.
pub fn warm_tokens(config: &Config) -> TokenManager {
    TokenManager::new(&config.token_url, "client-id", "client-secret").with_credential(Credential {
        access_token: TEST_TOKEN.to_string(),
        expires_at: Utc::now().timestamp() + 3600,
    })
}

pub struct ScriptedPrompt {
    usernames: Mutex<VecDeque<String>>,
    passwords: Mutex<VecDeque<String>>,
}

impl ScriptedPrompt {
    pub fn new(usernames: &[&str], passwords: &[&str]) -> Self {
        Self {
            usernames: Mutex::new(usernames.iter().map(|s| s.to_string()).collect()),
            passwords: Mutex::new(passwords.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn remaining_usernames(&self) -> usize {
        self.usernames.lock().unwrap().len()
    }
}

fn exhausted() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "prompt script exhausted")
}

impl CredentialPrompt for ScriptedPrompt {
    fn username(&self) -> io::Result<String> {
        self.usernames.lock().unwrap().pop_front().ok_or_else(exhausted)
    }

    fn password(&self) -> io::Result<String> {
        self.passwords.lock().unwrap().pop_front().ok_or_else(exhausted)
    }
}

pub struct FixedArchive {
    ids: HashSet<String>,
    loads: AtomicUsize,
}

impl FixedArchive {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Archive for FixedArchive {
    async fn previously_downloaded(&self) -> Result<HashSet<String>, ArchiveError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.clone())
    }
}

#[derive(Default)]
pub struct RecordingDownloader {
    requests: Mutex<Vec<DownloadRequest>>,
    fail_on: Option<String>,
}

impl RecordingDownloader {
    pub fn failing_on(track_id: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on: Some(track_id.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackDownloader for RecordingDownloader {
    async fn download(&self, request: DownloadRequest) -> Result<(), DownloadError> {
        let fail = self.fail_on.as_deref() == Some(request.track_id.as_str());
        self.requests.lock().unwrap().push(request);
        if fail {
            return Err(DownloadError::Io(io::Error::other("disk full")));
        }
        Ok(())
    }
}
