//! # Spotify Integration Module
//!
//! This module is the access layer between the downloader and the Spotify Web
//! API. It establishes a session, attaches bearer tokens to every request,
//! classifies responses, retries what is worth retrying and walks paginated
//! collections.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (cli::download)
//!          ↓
//! Catalog (album tracklists, artist discographies)
//!          ↓
//! Paginator (offset or cursor paging)
//!          ↓
//! ApiClient (headers, payload classification, retries)
//!          ↓
//! TokenManager (client-credentials token cache)
//!          ↑
//! SessionAuthenticator (stored or interactive credentials)
//! ```
//!
//! ## Core Modules
//!
//! ### Session Module
//!
//! [`session`] - Creates the session of a run:
//! - **Stored Credentials**: Tries the credentials file first
//! - **Interactive Fallback**: Prompts until the upstream accepts the credentials
//! - **Connection Backoff**: Retries refused or timed out connections with
//!   exponentially growing delays; bad credentials are never retried
//!
//! ### Client Module
//!
//! [`client`] - Issues authenticated requests:
//! - **Headers**: Bearer token, `Accept-Language`, `Accept`, `app-platform`,
//!   `User-Agent`
//! - **Payload Errors**: Responses carrying an `error` object (or nothing at
//!   all) are retried with a fixed delay and, once the budget is spent, handed
//!   back to the caller as data
//! - **Unparseable Bodies**: Replaced with a sentinel error payload
//!
//! ### Pagination Module
//!
//! [`pagination`] - Walks collections with one routine for both paging styles:
//! - **Offset**: `limit`/`offset` until a short page comes back
//! - **Cursor**: follows the `next` URL until it is null
//!
//! ### Catalog Module
//!
//! [`catalog`] - Album and artist traversals and the per-track download loop,
//! including the early skip of tracks already in the archive.
//!
//! ## API Coverage
//!
//! - `GET /albums/{id}` - Album name and artists
//! - `GET /albums/{id}/tracks` - Album tracklist, offset paged
//! - `GET /artists/{id}/albums` - Artist discography, cursor paged
//! - `POST /api/token` - Client-credentials grant
//!
//! ## Error Types
//!
//! - **`SessionError`** - Connection vs. authentication failures at login
//! - **`ApiError`** - Transport, payload, token and decoding failures
//! - **`CatalogError`** - Failures that interrupt a traversal
//!
//! ## Concurrency
//!
//! All requests of a run are awaited one after the other. The token cache is
//! guarded by a mutex so a concurrent caller could not refresh it twice.

pub mod catalog;
pub mod client;
pub mod pagination;
pub mod session;

pub use catalog::Catalog;
pub use client::{ApiClient, ApiResponse};
pub use pagination::{PageResult, PageStrategy, Paginator};
pub use session::{
    AuthState, BackoffPolicy, ClientCredentialsProvider, CredentialPrompt, CredentialSource,
    SessionAuthenticator, SessionBuilder, SessionProvider,
};
