use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::error::ArchiveError;

/// Source of the ids that were downloaded by earlier runs.
#[async_trait]
pub trait Archive: Send + Sync {
    async fn previously_downloaded(&self) -> Result<HashSet<String>, ArchiveError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub track_id: String,
    pub artist: String,
    pub track_name: String,
    pub filename: String,
}

/// Tab separated archive file:
/// `track_id\tdownloaded_at\tartist\ttrack_name\tfilename`.
pub struct SongArchive {
    path: PathBuf,
}

impl SongArchive {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> Result<HashSet<String>, ArchiveError> {
        if !self.path.is_file() {
            return Ok(HashSet::new());
        }

        let content = async_fs::read_to_string(&self.path).await?;
        Ok(content
            .lines()
            .filter_map(|line| line.split('\t').next())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn record(&self, entry: &ArchiveEntry) -> Result<(), ArchiveError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let line = format!(
            "{}\t{}\t{}\t{}\t{}\n",
            entry.track_id,
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            strip_tabs(&entry.artist),
            strip_tabs(&entry.track_name),
            strip_tabs(&entry.filename),
        );

        append_line(&self.path, &line).await?;
        Ok(())
    }
}

#[async_trait]
impl Archive for SongArchive {
    async fn previously_downloaded(&self) -> Result<HashSet<String>, ArchiveError> {
        self.load().await
    }
}

/// Appends `line` to `path`, creating the file when needed. Existing content
/// is never rewritten.
pub(crate) async fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

fn strip_tabs(value: &str) -> String {
    value.replace(['\t', '\n'], " ")
}
