use std::{collections::HashSet, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::{ApiError, CatalogError},
    management::{Archive, TrackDownloader},
    printer::{Notifier, PrintChannel},
    spotify::{ApiClient, PageStrategy, Paginator},
    types::{AlbumContext, AlbumDetails, AlbumReport, AlbumSummary, DownloadRequest, TrackItem},
    utils,
};

/// Album and artist traversals on top of the API client.
pub struct Catalog<'a> {
    client: &'a ApiClient,
    archive: &'a dyn Archive,
    downloader: &'a dyn TrackDownloader,
    notifier: Arc<dyn Notifier>,
    api_url: String,
    page_size: u32,
    skip_previously_downloaded: bool,
    show_progress: bool,
}

impl<'a> Catalog<'a> {
    pub fn new(
        client: &'a ApiClient,
        archive: &'a dyn Archive,
        downloader: &'a dyn TrackDownloader,
        notifier: Arc<dyn Notifier>,
        api_url: &str,
    ) -> Self {
        Catalog {
            client,
            archive,
            downloader,
            notifier,
            api_url: api_url.trim_end_matches('/').to_string(),
            page_size: 50,
            skip_previously_downloaded: true,
            show_progress: false,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn skip_previously_downloaded(mut self, skip: bool) -> Self {
        self.skip_previously_downloaded = skip;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub async fn resolve_album_tracks(&self, album_id: &str) -> Result<Vec<TrackItem>, CatalogError> {
        let strategy = PageStrategy::offset(
            format!("{}/albums/{}/tracks", self.api_url, album_id),
            self.page_size,
        );
        let tracks = Paginator::new(self.client).fetch_all_as(&strategy).await?;
        Ok(tracks)
    }

    /// Returns the album's primary artist and its name, made safe for use as
    /// a file name.
    pub async fn resolve_album_identity(
        &self,
        album_id: &str,
    ) -> Result<(String, String), CatalogError> {
        let payload = self
            .client
            .invoke(&format!("{}/albums/{}", self.api_url, album_id))
            .await?
            .into_result()?;
        let album: AlbumDetails =
            serde_json::from_value(payload).map_err(ApiError::Decode)?;

        let artist = album
            .artists
            .first()
            .map(|a| a.name.clone())
            .ok_or_else(|| CatalogError::MissingArtist(album_id.to_string()))?;
        Ok((artist, utils::sanitize_filename(&album.name)))
    }

    /// Ids of the artist's albums and singles, in the order the API lists them.
    pub async fn resolve_artist_albums(&self, artist_id: &str) -> Result<Vec<String>, CatalogError> {
        let strategy = PageStrategy::cursor(format!(
            "{}/artists/{}/albums?include_groups=album%2Csingle",
            self.api_url, artist_id
        ));
        let albums: Vec<AlbumSummary> = Paginator::new(self.client).fetch_all_as(&strategy).await?;
        Ok(albums.into_iter().map(|a| a.id).collect())
    }

    pub async fn download_album(&self, album_id: &str) -> Result<AlbumReport, CatalogError> {
        let archived: HashSet<String> = if self.skip_previously_downloaded {
            self.archive.previously_downloaded().await?
        } else {
            HashSet::new()
        };

        let (artist, album_name) = self.resolve_album_identity(album_id).await?;
        let tracks = self.resolve_album_tracks(album_id).await?;

        let mut report = AlbumReport {
            album_id: album_id.to_string(),
            ..Default::default()
        };
        let pb = self.progress_bar(tracks.len() as u64, &album_name);

        for (n, track) in tracks.iter().enumerate() {
            pb.inc(1);
            let album_num = format!("{:02}", n + 1);

            let Some(track_id) = track.id.as_deref() else {
                self.notifier.notify(
                    PrintChannel::Warnings,
                    &format!("Track {} of {} has no id, skipping", album_num, album_name),
                );
                report.skipped += 1;
                continue;
            };

            if self.skip_previously_downloaded && archived.contains(track_id) {
                self.notifier.notify(
                    PrintChannel::Skips,
                    &format!("Skipping track {} (already downloaded)", track_id),
                );
                report.skipped += 1;
                continue;
            }

            let request = DownloadRequest {
                source: "album".to_string(),
                track_id: track_id.to_string(),
                extra_keys: AlbumContext {
                    album_num,
                    artist: artist.clone(),
                    album: album_name.clone(),
                    album_id: album_id.to_string(),
                },
                disable_progress: true,
            };

            match self.downloader.download(request).await {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    self.notifier.notify(
                        PrintChannel::Errors,
                        &format!("Failed to download track {}: {}", track_id, e),
                    );
                    report.failed += 1;
                }
            }
        }

        pb.finish_and_clear();
        Ok(report)
    }

    /// Downloads every album of the artist, one after the other.
    ///
    /// An album that cannot be resolved is reported and left out; the walk
    /// carries on with the next album.
    pub async fn download_artist_albums(
        &self,
        artist_id: &str,
    ) -> Result<Vec<AlbumReport>, CatalogError> {
        let album_ids = self.resolve_artist_albums(artist_id).await?;

        let mut reports = Vec::with_capacity(album_ids.len());
        for album_id in album_ids {
            match self.download_album(&album_id).await {
                Ok(report) => reports.push(report),
                Err(e) => self.notifier.notify(
                    PrintChannel::Errors,
                    &format!("Failed to download album {}: {}", album_id, e),
                ),
            }
        }
        Ok(reports)
    }

    fn progress_bar(&self, len: u64, album_name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        pb.set_message(album_name.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        let template = "{spinner:.blue} {msg} [{bar:30.blue}] {pos}/{len} songs";
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}
