//! End-to-end tests: real service, real HTTP fetcher, mock image server.

use image_dl::{Config, DownloadImageService, Error, RequestCode, Status};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnotarealpicture";

async fn serve_png(server: &MockServer, path_str: &str) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/png")
                .set_body_bytes(PNG_BYTES),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn download_succeeds_and_reports_stored_path() {
    let server = MockServer::start().await;
    serve_png(&server, "/img.png").await;
    let temp_dir = TempDir::new().unwrap();

    let service = DownloadImageService::new(Config::default()).unwrap();
    let url = format!("{}/img.png", server.uri());

    let reply = service
        .download(url.clone(), RequestCode::new(7), temp_dir.path())
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(reply.status(), Status::Ok);
    assert_eq!(reply.source_url(), url, "source locator must be echoed");

    let stored = reply.image_pathname().expect("success carries a pathname");
    assert_eq!(stored, temp_dir.path().join("img.png"));
    assert_eq!(
        std::fs::read(stored).unwrap(),
        PNG_BYTES,
        "stored file must contain the served bytes"
    );

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn download_failure_reports_canceled_without_pathname() {
    let server = MockServer::start().await;
    // No mount for this path: the server answers 404.
    let temp_dir = TempDir::new().unwrap();

    let service = DownloadImageService::new(Config::default()).unwrap();
    let url = format!("{}/missing.png", server.uri());

    let reply = service
        .download(url.clone(), RequestCode::new(7), temp_dir.path())
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(reply.status(), Status::Canceled);
    assert_eq!(reply.source_url(), url, "failure reply still echoes the URL");
    assert!(
        reply.image_pathname().is_none(),
        "failure reply must not name a file"
    );

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn caller_vanishing_does_not_take_down_the_service() {
    let server = MockServer::start().await;
    serve_png(&server, "/one.png").await;
    serve_png(&server, "/two.png").await;
    let temp_dir = TempDir::new().unwrap();

    let service = DownloadImageService::new(Config::default()).unwrap();

    // First caller drops its receiver before the reply can be delivered.
    let receiver = service
        .download(
            format!("{}/one.png", server.uri()),
            RequestCode::new(1),
            temp_dir.path(),
        )
        .await
        .unwrap();
    drop(receiver);

    // The service must keep serving subsequent requests.
    let reply = service
        .download(
            format!("{}/two.png", server.uri()),
            RequestCode::new(2),
            temp_dir.path(),
        )
        .await
        .unwrap()
        .await
        .unwrap();

    assert_eq!(reply.status(), Status::Ok);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn each_reply_correlates_with_its_own_request() {
    let server = MockServer::start().await;
    serve_png(&server, "/a.png").await;
    serve_png(&server, "/b.png").await;
    serve_png(&server, "/c.png").await;
    let temp_dir = TempDir::new().unwrap();

    let service = DownloadImageService::new(Config::default()).unwrap();

    let mut receivers = Vec::new();
    let mut urls = Vec::new();
    for (i, name) in ["a.png", "b.png", "c.png"].into_iter().enumerate() {
        let url = format!("{}/{}", server.uri(), name);
        receivers.push(
            service
                .download(url.clone(), RequestCode::new(i as i32), temp_dir.path())
                .await
                .unwrap(),
        );
        urls.push(url);
    }

    let replies = futures::future::join_all(receivers).await;

    for (reply, url) in replies.into_iter().zip(urls) {
        let reply = reply.unwrap();
        assert_eq!(reply.status(), Status::Ok);
        assert_eq!(
            reply.source_url(),
            url,
            "each reply must echo its own request's URL"
        );
    }

    // Three distinct files on disk, one per request.
    for name in ["a.png", "b.png", "c.png"] {
        assert!(temp_dir.path().join(name).exists(), "{name} must be stored");
    }

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn submitting_after_shutdown_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let service = DownloadImageService::new(Config::default()).unwrap();

    service.shutdown().await.unwrap();

    let result = service
        .download(
            "https://example.com/late.png",
            RequestCode::new(1),
            temp_dir.path(),
        )
        .await;

    match result {
        Err(Error::ShuttingDown) => {}
        Err(other) => panic!("expected ShuttingDown, got: {other:?}"),
        Ok(_) => panic!("expected ShuttingDown, got an accepted request"),
    }
}
