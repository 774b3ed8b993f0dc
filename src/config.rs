//! Configuration management for the catalog downloader.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. The values are collected once into a [`Config`]
//! which is handed to every component of a run, instead of being read from
//! global state while the run is in progress.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

use crate::Res;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `sporldl/.env` in the platform-specific local
/// data directory. A missing file is not an error; every setting has a
/// default.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sporldl/.env`
/// - macOS: `~/Library/Application Support/sporldl/.env`
/// - Windows: `%LOCALAPPDATA%/sporldl/.env`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Directory holding the `.env` file, stored credentials and the archive.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporldl");
    path
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the token endpoint used for the client-credentials grant.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, e.g. `https://accounts.spotify.com/api/token`.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn var_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a boolean setting. `None` for anything that is neither truthy nor
/// falsy.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn var_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn var_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}

/// Settings of a single run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_url: String,
    pub language: String,
    /// Total attempts `invoke` makes while the API answers with an error payload.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    /// Retries after the first failed connection attempt.
    pub connection_retries: u32,
    pub connection_initial_delay: Duration,
    pub page_size: u32,
    pub skip_previously_downloaded: bool,
    pub save_credentials: bool,
    pub credentials_location: PathBuf,
    pub root_path: PathBuf,
    pub archive_location: PathBuf,
    pub print_warnings: bool,
    pub print_errors: bool,
    pub print_api_errors: bool,
    pub print_skips: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data = data_dir();
        Config {
            api_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            language: "en".to_string(),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
            connection_retries: 3,
            connection_initial_delay: Duration::from_secs(1),
            page_size: 50,
            skip_previously_downloaded: true,
            save_credentials: true,
            credentials_location: data.join("credentials.json"),
            root_path: data.join("library"),
            archive_location: data.join(".song_archive"),
            print_warnings: true,
            print_errors: true,
            print_api_errors: true,
            print_skips: true,
        }
    }
}

impl Config {
    /// Builds the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            language: var_or("SPORLDL_LANGUAGE", &defaults.language),
            retry_attempts: var_u32("SPORLDL_RETRY_ATTEMPTS", defaults.retry_attempts),
            retry_delay: Duration::from_secs(var_u32("SPORLDL_RETRY_DELAY_SECS", 5) as u64),
            connection_retries: var_u32("SPORLDL_CONNECTION_RETRIES", defaults.connection_retries),
            connection_initial_delay: Duration::from_secs(
                var_u32("SPORLDL_CONNECTION_INITIAL_DELAY_SECS", 1) as u64,
            ),
            page_size: var_u32("SPORLDL_PAGE_SIZE", defaults.page_size).clamp(1, 50),
            skip_previously_downloaded: var_bool(
                "SPORLDL_SKIP_PREVIOUSLY_DOWNLOADED",
                defaults.skip_previously_downloaded,
            ),
            save_credentials: var_bool("SPORLDL_SAVE_CREDENTIALS", defaults.save_credentials),
            credentials_location: var_path(
                "SPORLDL_CREDENTIALS_LOCATION",
                defaults.credentials_location,
            ),
            root_path: var_path("SPORLDL_ROOT_PATH", defaults.root_path),
            archive_location: var_path("SPORLDL_ARCHIVE_LOCATION", defaults.archive_location),
            print_warnings: var_bool("SPORLDL_PRINT_WARNINGS", true),
            print_errors: var_bool("SPORLDL_PRINT_ERRORS", true),
            print_api_errors: var_bool("SPORLDL_PRINT_API_ERRORS", true),
            print_skips: var_bool("SPORLDL_PRINT_SKIPS", true),
        }
    }
}
