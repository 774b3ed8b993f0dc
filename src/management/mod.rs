mod archive;
mod auth;
mod manifest;

pub use archive::Archive;
pub use archive::ArchiveEntry;
pub use archive::SongArchive;
pub use auth::TokenManager;
pub use auth::basic_auth_header;
pub use auth::request_client_token;
pub use manifest::ManifestWriter;
pub use manifest::TrackDownloader;
