mod common;

use std::sync::Arc;

use serde_json::json;
use sporldl::{
    error::CatalogError,
    printer::PrintChannel,
    spotify::{ApiClient, Catalog},
    types::AlbumContext,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use common::{FixedArchive, RecordingDownloader, RecordingNotifier, test_config, warm_tokens};

fn client_for(server: &MockServer, notifier: Arc<RecordingNotifier>) -> ApiClient {
    let config = test_config(&server.uri());
    ApiClient::new(warm_tokens(&config), notifier, &config)
}

async fn mount_album(server: &MockServer, album_id: &str, name: &str, track_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/albums/{}", album_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": album_id,
            "name": name,
            "artists": [{"id": "ar1", "name": "The Artist"}, {"id": "ar2", "name": "Guest"}],
        })))
        .mount(server)
        .await;

    let items: Vec<_> = track_ids.iter().map(|id| json!({"id": id})).collect();
    Mock::given(method("GET"))
        .and(path(format!("/albums/{}/tracks", album_id)))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items,
            "next": null,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_download_album_skips_archived_tracks() {
    let server = MockServer::start().await;
    mount_album(&server, "alb1", "Greatest Hits", &["T1", "T2", "T3", "T4"]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&["T1", "T3"]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier.clone(), &server.uri());

    let report = catalog.download_album("alb1").await.unwrap();

    let requests = downloader.requests();
    let downloaded: Vec<_> = requests
        .iter()
        .map(|r| (r.track_id.as_str(), r.extra_keys.album_num.as_str()))
        .collect();
    assert_eq!(downloaded, vec![("T2", "02"), ("T4", "04")]);

    assert_eq!(
        requests[0].extra_keys,
        AlbumContext {
            album_num: "02".to_string(),
            artist: "The Artist".to_string(),
            album: "Greatest Hits".to_string(),
            album_id: "alb1".to_string(),
        }
    );
    assert_eq!(requests[0].source, "album");
    assert!(requests[0].disable_progress);

    assert_eq!(report.downloaded, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(archive.loads(), 1);
    assert_eq!(
        notifier.messages(PrintChannel::Skips),
        vec![
            "Skipping track T1 (already downloaded)".to_string(),
            "Skipping track T3 (already downloaded)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_download_album_without_skipping_ignores_archive() {
    let server = MockServer::start().await;
    mount_album(&server, "alb1", "Greatest Hits", &["T1", "T2"]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&["T1"]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier.clone(), &server.uri())
        .skip_previously_downloaded(false);

    catalog.download_album("alb1").await.unwrap();

    assert_eq!(archive.loads(), 0);
    assert_eq!(downloader.requests().len(), 2);
    assert_eq!(notifier.count(PrintChannel::Skips), 0);
}

#[tokio::test]
async fn test_failed_track_does_not_stop_album() {
    let server = MockServer::start().await;
    mount_album(&server, "alb1", "Greatest Hits", &["T1", "T2", "T3"]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&[]);
    let downloader = RecordingDownloader::failing_on("T2");
    let catalog = Catalog::new(&client, &archive, &downloader, notifier.clone(), &server.uri());

    let report = catalog.download_album("alb1").await.unwrap();

    assert_eq!(downloader.requests().len(), 3);
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(notifier.count(PrintChannel::Errors), 1);
}

#[tokio::test]
async fn test_album_numbers_span_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/big"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Big", "artists": [{"name": "A"}],
        })))
        .mount(&server)
        .await;
    for (offset, ids) in [(0, vec!["t1", "t2"]), (2, vec!["t3"])] {
        let items: Vec<_> = ids.iter().map(|id| json!({"id": id})).collect();
        Mock::given(method("GET"))
            .and(path("/albums/big/tracks"))
            .and(query_param("offset", offset.to_string().as_str()))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&[]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier, &server.uri()).page_size(2);

    catalog.download_album("big").await.unwrap();

    let numbers: Vec<_> = downloader
        .requests()
        .into_iter()
        .map(|r| r.extra_keys.album_num)
        .collect();
    assert_eq!(numbers, vec!["01", "02", "03"]);
}

#[tokio::test]
async fn test_resolve_album_identity_is_stable_and_sanitized() {
    let server = MockServer::start().await;
    mount_album(&server, "alb2", "What/Now: Live?", &[]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&[]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier, &server.uri());

    let first = catalog.resolve_album_identity("alb2").await.unwrap();
    let second = catalog.resolve_album_identity("alb2").await.unwrap();

    assert_eq!(first, ("The Artist".to_string(), "What_Now_ Live_".to_string()));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_resolve_album_identity_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": {"status": 404, "message": "Not found"}})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&[]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier, &server.uri());

    let err = catalog.resolve_album_identity("missing").await.unwrap_err();
    assert!(matches!(err, CatalogError::Api(_)));
}

#[tokio::test]
async fn test_download_artist_albums_walks_albums_in_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums"))
        .and(query_param("include_groups", "album,single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "alb1", "album_group": "album"}],
            "next": format!("{}/artists/ar1/albums-page-2", base),
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums-page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "alb2", "album_group": "single"}],
            "next": null,
        })))
        .expect(2)
        .mount(&server)
        .await;
    mount_album(&server, "alb1", "First", &["a1", "a2"]).await;
    mount_album(&server, "alb2", "Second", &["b1"]).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = client_for(&server, notifier.clone());
    let archive = FixedArchive::new(&["a2"]);
    let downloader = RecordingDownloader::default();
    let catalog = Catalog::new(&client, &archive, &downloader, notifier, &base);

    assert_eq!(
        catalog.resolve_artist_albums("ar1").await.unwrap(),
        vec!["alb1", "alb2"]
    );

    let reports = catalog.download_artist_albums("ar1").await.unwrap();

    assert_eq!(reports.len(), 2);
    let tracks: Vec<_> = downloader
        .requests()
        .into_iter()
        .map(|r| (r.extra_keys.album, r.track_id))
        .collect();
    assert_eq!(
        tracks,
        vec![
            ("First".to_string(), "a1".to_string()),
            ("Second".to_string(), "b1".to_string()),
        ]
    );
    // archive loaded once per album
    assert_eq!(archive.loads(), 2);
}
