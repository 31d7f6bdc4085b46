use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use mediainfo_api::sampler::Sampler;
use mediainfo_api::sources::{Resolution, ResolverRegistry};
use mediainfo_api::{Config, MediaInfoError};

async fn origin() -> String {
    let app = Router::new()
        .route("/big.mp4", get(|| async { vec![1u8; 50_000] }))
        .route("/small.mp3", get(|| async { vec![2u8; 300] }))
        .route(
            "/download",
            get(|| async {
                (
                    [(header::CONTENT_DISPOSITION, "attachment; filename=\"Holiday Clip.mov\"")],
                    vec![3u8; 100],
                )
            }),
        )
        .route(
            "/private.mkv",
            get(|| async { (StatusCode::NOT_FOUND, Html("<html>gone</html>")).into_response() }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sampler(dir: &std::path::Path, max: u64) -> Sampler {
    let mut config = Config::default();
    config.app.temp_dir = Some(dir.to_path_buf());
    config.sampler.max_sample_bytes = max;
    Sampler::new(&config).unwrap()
}

#[tokio::test]
async fn test_sample_is_capped() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    let sample = sampler(temp.path(), 4096)
        .fetch(&format!("{base}/big.mp4"))
        .await
        .unwrap();

    assert_eq!(sample.len(), 4096);
    assert_eq!(std::fs::metadata(sample.path()).unwrap().len(), 4096);
    assert_eq!(sample.declared_length(), Some(50_000));
    assert!(sample.path().starts_with(temp.path()));

    let name = sample.path().file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("mediainfo-sample-"));

    sample.close();
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_short_file_is_kept_whole() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    let sample = sampler(temp.path(), 4096)
        .fetch(&format!("{base}/small.mp3"))
        .await
        .unwrap();

    assert_eq!(sample.len(), 300);
    assert_eq!(sample.suggested_name(), None);
}

#[tokio::test]
async fn test_content_disposition_name() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    let sample = sampler(temp.path(), 4096)
        .fetch(&format!("{base}/download"))
        .await
        .unwrap();

    assert_eq!(sample.suggested_name(), Some("Holiday Clip.mov"));
}

#[tokio::test]
async fn test_dropped_sample_is_removed() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    {
        let _sample = sampler(temp.path(), 1024)
            .fetch(&format!("{base}/big.mp4"))
            .await
            .unwrap();
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    let err = sampler(temp.path(), 1024)
        .fetch(&format!("{base}/private.mkv"))
        .await
        .unwrap_err();

    match err.downcast_ref::<MediaInfoError>() {
        Some(MediaInfoError::HttpStatus { status, html, .. }) => {
            assert_eq!(*status, 404);
            assert!(*html);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_connection_refused() {
    let temp = tempfile::tempdir().unwrap();

    let err = sampler(temp.path(), 1024)
        .fetch("http://127.0.0.1:1/clip.mp4")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MediaInfoError>(),
        Some(MediaInfoError::DownloadFailed { .. })
    ));
    assert_eq!(err.to_string(), "Download failed for http://127.0.0.1:1/clip.mp4");

    // The transport cause appears once in the rendered chain
    let cause = err.chain().nth(1).unwrap().to_string();
    assert_eq!(format!("{err:#}").matches(cause.as_str()).count(), 1);
}

#[tokio::test]
async fn test_direct_resolution_surfaces_its_own_error() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;

    let resolution = ResolverRegistry::new()
        .resolve(&format!("{base}/private.mkv"))
        .unwrap();
    assert!(!resolution.indirect);

    let err = sampler(temp.path(), 1024)
        .fetch_first(&resolution)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 404"));
}

fn sharing_link(candidates: Vec<String>) -> Resolution {
    Resolution {
        original_url: "https://drive.google.com/file/d/abc123/view".to_string(),
        candidates,
        platform: "Google Drive",
        indirect: true,
    }
}

#[tokio::test]
async fn test_rejected_candidate_falls_through_to_next() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;
    let resolution = sharing_link(vec![
        format!("{base}/private.mkv"),
        format!("{base}/small.mp3"),
    ]);

    let sample = sampler(temp.path(), 1024)
        .fetch_first(&resolution)
        .await
        .unwrap();

    assert_eq!(sample.source_url(), format!("{base}/small.mp3"));
    assert_eq!(sample.len(), 300);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);

    sample.close();
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_every_candidate_failing_is_reported_once() {
    let temp = tempfile::tempdir().unwrap();
    let base = origin().await;
    let resolution = sharing_link(vec![
        format!("{base}/private.mkv"),
        "http://127.0.0.1:1/uc".to_string(),
    ]);

    let err = sampler(temp.path(), 1024)
        .fetch_first(&resolution)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MediaInfoError>(),
        Some(MediaInfoError::AllSourcesFailed { attempts: 2 })
    ));
    assert_eq!(
        err.to_string(),
        "All 2 download methods failed - file may be private or restricted"
    );
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}
