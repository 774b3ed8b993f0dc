use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::{
    error::DownloadError,
    management::{ArchiveEntry, SongArchive, archive::append_line},
    types::DownloadRequest,
    utils,
};

/// Consumer of resolved tracks.
#[async_trait]
pub trait TrackDownloader: Send + Sync {
    async fn download(&self, request: DownloadRequest) -> Result<(), DownloadError>;
}

#[derive(Serialize)]
struct ManifestLine<'a> {
    #[serde(flatten)]
    request: &'a DownloadRequest,
    queued_at: String,
}

/// Writes every resolved track to `<root>/<artist>/<album>/manifest.jsonl`
/// and records it in the song archive, so a later run skips it.
///
/// Audio retrieval is left to whatever tool consumes the manifest.
pub struct ManifestWriter {
    root: PathBuf,
    archive: SongArchive,
}

impl ManifestWriter {
    pub fn new(root: PathBuf, archive_location: PathBuf) -> Self {
        Self {
            root,
            archive: SongArchive::new(archive_location),
        }
    }

    pub fn manifest_path(&self, request: &DownloadRequest) -> PathBuf {
        self.root
            .join(utils::sanitize_filename(&request.extra_keys.artist))
            .join(utils::sanitize_filename(&request.extra_keys.album))
            .join("manifest.jsonl")
    }
}

#[async_trait]
impl TrackDownloader for ManifestWriter {
    async fn download(&self, request: DownloadRequest) -> Result<(), DownloadError> {
        let path = self.manifest_path(&request);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(&ManifestLine {
            request: &request,
            queued_at: Utc::now().to_rfc3339(),
        })?;
        line.push('\n');
        append_line(&path, &line).await?;

        self.archive
            .record(&ArchiveEntry {
                track_id: request.track_id.clone(),
                artist: request.extra_keys.artist.clone(),
                track_name: String::new(),
                filename: path.display().to_string(),
            })
            .await?;
        Ok(())
    }
}
