//! # CLI Module
//!
//! This module provides the command-line operations of sporldl. Each command
//! builds the run [`Context`] (configuration, session, API client), wires the
//! archive and manifest writer into a [`Catalog`] and walks the requested
//! albums and artists one after the other.
//!
//! ## Commands
//!
//! - [`download`] - Downloads albums and artist discographies
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporldl album 4aawyAB9vmqN3uQ7FjRGTy             # One album by id
//! sporldl artist https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF
//! sporldl download spotify:album:4aawyAB9vmqN3uQ7FjRGTy spotify:artist:0OdUWJ0sBjDrqHygGUXeCF
//! ```
//!
//! ## Error Handling
//!
//! A failed login ends the program. A failed album or track is reported and
//! the run continues with the next one.

mod prompt;

use std::sync::Arc;

pub use prompt::StdinPrompt;

use crate::{
    config::Config,
    context::Context,
    error, failure, info,
    management::{ManifestWriter, SongArchive},
    printer::{Notifier, Printer},
    spotify::{Catalog, ClientCredentialsProvider},
    success,
    types::LinkKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Album(String),
    Artist(String),
}

impl Target {
    pub fn new(kind: LinkKind, id: String) -> Self {
        match kind {
            LinkKind::Album => Target::Album(id),
            LinkKind::Artist => Target::Artist(id),
        }
    }
}

pub async fn download(targets: Vec<Target>, username: Option<String>, password: Option<String>) {
    let config = Config::from_env();
    let notifier: Arc<dyn Notifier> = Arc::new(Printer::new(&config));
    let provider = ClientCredentialsProvider::new(&config.token_url, Arc::clone(&notifier));

    let ctx = match Context::login(
        config,
        &provider,
        &StdinPrompt,
        notifier,
        username,
        password,
    )
    .await
    {
        Ok(ctx) => ctx,
        Err(e) => error!("Failed to log in: {}", e),
    };
    success!("Logged in as {}", ctx.session.username);

    let archive = SongArchive::new(ctx.config.archive_location.clone());
    let writer = ManifestWriter::new(
        ctx.config.root_path.clone(),
        ctx.config.archive_location.clone(),
    );
    let catalog = Catalog::new(
        &ctx.api,
        &archive,
        &writer,
        Arc::clone(&ctx.notifier),
        &ctx.config.api_url,
    )
    .page_size(ctx.config.page_size)
    .skip_previously_downloaded(ctx.config.skip_previously_downloaded)
    .show_progress(true);

    for target in targets {
        match target {
            Target::Album(id) => {
                info!("Downloading album {}", id);
                match catalog.download_album(&id).await {
                    Ok(report) => success!(
                        "Album {}: {} queued, {} skipped, {} failed",
                        report.album_id,
                        report.downloaded,
                        report.skipped,
                        report.failed
                    ),
                    Err(e) => failure!("Album {} failed: {}", id, e),
                }
            }
            Target::Artist(id) => {
                info!("Downloading albums of artist {}", id);
                match catalog.download_artist_albums(&id).await {
                    Ok(reports) => {
                        let queued: usize = reports.iter().map(|r| r.downloaded).sum();
                        let skipped: usize = reports.iter().map(|r| r.skipped).sum();
                        success!(
                            "Artist {}: {} albums, {} tracks queued, {} skipped",
                            id,
                            reports.len(),
                            queued,
                            skipped
                        );
                    }
                    Err(e) => failure!("Artist {} failed: {}", id, e),
                }
            }
        }
    }
}
