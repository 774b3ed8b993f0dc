use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds subtracted from the server-declared lifetime of a token.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    /// Unix timestamp in seconds, margin already applied.
    pub expires_at: i64,
}

impl Credential {
    /// Returns `None` when `expires_in` is not positive or the expiry does
    /// not fit in an `i64`.
    pub fn from_response(response: TokenResponse, now: i64) -> Option<Self> {
        if response.expires_in <= 0 {
            return None;
        }

        let expires_at = now
            .checked_add(response.expires_in)?
            .checked_sub(TOKEN_EXPIRY_MARGIN_SECS)?;
        Some(Credential {
            access_token: response.access_token,
            expires_at,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp())
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Authenticated handle to the upstream service.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    /// Token obtained while the session was established, if any.
    pub credential: Option<Credential>,
}

/// On-disk form of a stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetails {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub album_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    /// Local files and some unavailable tracks come without an id.
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
}

/// Extra keys attached to every track of an album download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumContext {
    pub album_num: String,
    pub artist: String,
    pub album: String,
    pub album_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Where the track came from, e.g. `album`.
    pub source: String,
    pub track_id: String,
    pub extra_keys: AlbumContext,
    pub disable_progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumReport {
    pub album_id: String,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Album,
    Artist,
}
