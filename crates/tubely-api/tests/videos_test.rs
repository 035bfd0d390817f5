//! Video upload integration tests.
//!
//! Run with: `cargo test -p tubely-api --test videos_test`

mod helpers;

use helpers::auth::TestUser;
use helpers::fixtures::{create_minimal_png, create_test_video, file_form};
use helpers::{s3_url_prefix, FailingStorage, FakeProber, TestApp, PUBLIC_BASE_URL};
use std::sync::Arc;
use tubely_core::{StorageBackend, Video};
use tubely_db::InMemoryVideoStore;

async fn upload_video(app: &TestApp, user: &TestUser, video: &Video, data: Vec<u8>) -> Video {
    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", data))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    response.json()
}

fn s3_key(url: &str) -> String {
    url.strip_prefix(&s3_url_prefix())
        .expect("URL should point at the test bucket")
        .to_string()
}

#[tokio::test]
async fn test_landscape_video_to_s3() {
    let app = TestApp::builder()
        .backend(StorageBackend::S3)
        .prober(FakeProber::dimensions(1920, 1080))
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;
    let data = create_test_video(64 * 1024);

    let updated = upload_video(&app, &user, &video, data.clone()).await;

    let key = s3_key(updated.video_url.as_deref().unwrap());
    assert!(key.starts_with("landscape/"));
    assert!(key.ends_with(".mp4"));

    let (content_type, stored) = app.read_stored(&key).await;
    assert_eq!(content_type, "video/mp4");
    assert_eq!(stored, data);

    assert_eq!(app.fetch_video(video.id).await.video_url, updated.video_url);
    assert_eq!(app.prober.seen_sizes(), vec![data.len() as u64]);
    assert!(app.staging_files().is_empty());
}

#[tokio::test]
async fn test_portrait_video_prefix() {
    let app = TestApp::builder()
        .backend(StorageBackend::S3)
        .prober(FakeProber::dimensions(1080, 1920))
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let updated = upload_video(&app, &user, &video, create_test_video(4096)).await;

    assert!(s3_key(updated.video_url.as_deref().unwrap()).starts_with("portrait/"));
}

#[tokio::test]
async fn test_square_and_dimensionless_videos_are_other() {
    for (width, height) in [(1000, 1000), (0, 0), (1280, 0)] {
        let app = TestApp::builder()
            .backend(StorageBackend::S3)
            .prober(FakeProber::dimensions(width, height))
            .build()
            .await;
        let user = TestUser::new();
        let video = app.seed_video(user.user_id).await;

        let updated = upload_video(&app, &user, &video, create_test_video(4096)).await;

        assert!(
            s3_key(updated.video_url.as_deref().unwrap()).starts_with("other/"),
            "{}x{} should classify as other",
            width,
            height
        );
    }
}

#[tokio::test]
async fn test_video_to_local_is_flat() {
    let app = TestApp::builder()
        .prober(FakeProber::dimensions(1280, 720))
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;
    let data = create_test_video(8192);

    let updated = upload_video(&app, &user, &video, data.clone()).await;

    let url = updated.video_url.unwrap();
    let name = url
        .strip_prefix(&format!("{}/assets/", PUBLIC_BASE_URL))
        .expect("local URL under /assets/");
    assert!(name.ends_with(".mp4"));
    assert!(!name.contains('/'));
    assert_eq!(app.assets_files(), vec![name.to_string()]);
    assert_eq!(std::fs::read(app.assets_dir.path().join(name)).unwrap(), data);
    assert!(app.staging_files().is_empty());
}

#[tokio::test]
async fn test_video_reupload_to_memory_overwrites() {
    let app = TestApp::builder()
        .backend(StorageBackend::Memory)
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let first = upload_video(&app, &user, &video, create_test_video(2048)).await;
    let second_data = create_test_video(3000);
    let second = upload_video(&app, &user, &video, second_data.clone()).await;

    assert_eq!(first.video_url, second.video_url);
    assert_eq!(
        second.video_url.as_deref(),
        Some(format!("{}/api/videos/{}", PUBLIC_BASE_URL, video.id).as_str())
    );

    let fetched = app.client().get(&format!("/api/videos/{}", video.id)).await;
    assert_eq!(fetched.status_code(), 200);
    assert_eq!(fetched.header("content-type"), "video/mp4");
    assert_eq!(fetched.as_bytes().as_ref(), second_data.as_slice());
}

#[tokio::test]
async fn test_non_mp4_rejected() {
    let app = TestApp::builder()
        .backend(StorageBackend::S3)
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mov", "video/quicktime", create_test_video(1024)))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(body["error"], "File is not an mp4");

    assert!(app.prober.seen_sizes().is_empty());
    assert!(app.staging_files().is_empty());
    assert_eq!(app.fetch_video(video.id).await.video_url, None);
}

#[tokio::test]
async fn test_image_sent_to_video_route_rejected() {
    let app = TestApp::builder().build().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "thumb.png", "image/png", create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.assets_files().is_empty());
}

#[tokio::test]
async fn test_probe_failure_stores_nothing() {
    let app = TestApp::builder()
        .prober(FakeProber::failing("moov atom not found"))
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", create_test_video(4096)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CLASSIFICATION_FAILED");
    // Internal causes never reach the body.
    assert!(body.get("details").is_none());

    assert_eq!(app.prober.seen_sizes(), vec![4096]);
    assert!(app.assets_files().is_empty());
    assert!(app.staging_files().is_empty());
    assert_eq!(app.fetch_video(video.id).await.video_url, None);
}

#[tokio::test]
async fn test_oversized_video_rejected() {
    let app = TestApp::builder().max_video_bytes(2048).build().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", create_test_video(8192)))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<serde_json::Value>()["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.prober.seen_sizes().is_empty());
    assert!(app.staging_files().is_empty());
    assert!(app.assets_files().is_empty());
}

#[tokio::test]
async fn test_video_not_owner() {
    let app = TestApp::builder().build().await;
    let owner = TestUser::new();
    let intruder = TestUser::new();
    let video = app.seed_video(owner.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", intruder.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", create_test_video(1024)))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<serde_json::Value>()["code"], "NOT_OWNER");
    assert!(app.prober.seen_sizes().is_empty());
    assert!(app.staging_files().is_empty());
}

#[tokio::test]
async fn test_video_upload_keeps_thumbnail_set_meanwhile() {
    let videos = Arc::new(InMemoryVideoStore::new());
    let user = TestUser::new();
    let video = Video::new(user.user_id, "Boots", "A video about boots");
    videos.insert(video.clone()).await;

    let thumbnail_url = format!("{}/assets/meanwhile.png", PUBLIC_BASE_URL);
    let app = TestApp::builder()
        .backend(StorageBackend::S3)
        .videos(videos.clone())
        .prober(FakeProber::dimensions(1280, 720).with_thumbnail_during_probe(
            videos.clone(),
            video.id,
            &thumbnail_url,
        ))
        .build()
        .await;

    let updated = upload_video(&app, &user, &video, create_test_video(4096)).await;

    assert!(s3_key(updated.video_url.as_deref().unwrap()).starts_with("landscape/"));
    assert_eq!(updated.thumbnail_url.as_deref(), Some(thumbnail_url.as_str()));

    let stored = app.fetch_video(video.id).await;
    assert_eq!(stored.thumbnail_url.as_deref(), Some(thumbnail_url.as_str()));
    assert_eq!(stored.video_url, updated.video_url);
}

#[tokio::test]
async fn test_video_storage_failure() {
    let app = TestApp::builder()
        .storage(Arc::new(FailingStorage))
        .build()
        .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", create_test_video(4096)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORAGE_WRITE_FAILED");
    assert!(!response.text().contains("/var/lib"));

    assert_eq!(app.prober.seen_sizes(), vec![4096]);
    assert!(app.staging_files().is_empty());
    assert_eq!(app.fetch_video(video.id).await, video);
}

#[tokio::test]
async fn test_video_record_update_failure_leaves_stored_asset() {
    let app = TestApp::builder().failing_record_updates().build().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;
    let data = create_test_video(4096);

    let response = app
        .client()
        .put(&format!("/videos/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", "clip.mp4", "video/mp4", data.clone()))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<serde_json::Value>()["code"], "RECORD_UPDATE_FAILED");

    assert_eq!(app.fetch_video(video.id).await, video);
    assert!(app.staging_files().is_empty());

    // The asset stays behind, unreferenced.
    let files = app.assets_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".mp4"));
    assert_eq!(std::fs::read(app.assets_dir.path().join(&files[0])).unwrap(), data);
}
