//! Integration tests for best-effort location and carousel enrichment.
//!
//! Tests verify:
//! - Location names are filled in when resolvable
//! - Location and carousel failures set `partial` without failing the request
//! - Carousel items collected before a failure are kept

use axum::http::StatusCode;

use ig_post_server::error::FetchError;

use super::test_utils::{
    get_json, image_node, image_post, sidecar_post, test_location, test_router, video_node,
    with_location_ref, MockPostSource,
};

// =============================================================================
// Location
// =============================================================================

#[tokio::test]
async fn test_location_name_resolved() {
    let source = MockPostSource::new()
        .with_post(with_location_ref(image_post("LOCATED0001", 11), 213385402))
        .with_location(Ok(Some(test_location("Central Park"))));

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=LOCATED0001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["partial"], false);
    assert_eq!(json["data"]["location"], "Central Park");
}

#[tokio::test]
async fn test_post_without_location() {
    let source = MockPostSource::new().with_post(image_post("NOWHERE0001", 12));

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=NOWHERE0001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["partial"], false);
    assert!(json["data"]["location"].is_null());
}

#[tokio::test]
async fn test_location_failure_is_partial() {
    let source = MockPostSource::new()
        .with_post(with_location_ref(image_post("LOCFAIL0001", 13), 1))
        .with_location(Err(FetchError::Connection(
            "HTTP error code 500.".to_string(),
        )));

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=LOCFAIL0001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["partial"], true);
    assert!(json["error_code"].is_null());
    assert!(json["data"]["location"].is_null());
    assert_eq!(json["data"]["shortcode"], "LOCFAIL0001");
}

#[tokio::test]
async fn test_location_rate_limit_does_not_fail_request() {
    let source = MockPostSource::new()
        .with_post(with_location_ref(image_post("LOCRATE0001", 14), 1))
        .with_location(Err(FetchError::Connection(
            "429 Too Many Requests".to_string(),
        )));

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=LOCRATE0001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["partial"], true);
}

// =============================================================================
// Carousel
// =============================================================================

#[tokio::test]
async fn test_carousel_items_in_order() {
    let source = MockPostSource::new()
        .with_post(sidecar_post("CAROUSEL001", 21))
        .with_sidecar(vec![
            Ok(image_node("https://cdn.example.com/1.jpg")),
            Ok(video_node(
                "https://cdn.example.com/2.jpg",
                "https://cdn.example.com/2.mp4",
            )),
            Ok(image_node("https://cdn.example.com/3.jpg")),
        ]);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=CAROUSEL001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["partial"], false);
    assert_eq!(json["data"]["post_type"], "GraphSidecar");
    assert_eq!(
        json["data"]["carousel_media"],
        serde_json::json!([
            {"is_video": false, "url": "https://cdn.example.com/1.jpg"},
            {"is_video": true, "url": "https://cdn.example.com/2.mp4"},
            {"is_video": false, "url": "https://cdn.example.com/3.jpg"},
        ])
    );
}

#[tokio::test]
async fn test_carousel_failure_keeps_collected_items() {
    let source = MockPostSource::new()
        .with_post(sidecar_post("CAROUSEL002", 22))
        .with_sidecar(vec![
            Ok(image_node("https://cdn.example.com/1.jpg")),
            Ok(image_node("https://cdn.example.com/2.jpg")),
            Err(FetchError::Other("sidecar node 2 has no display_url".to_string())),
            Ok(image_node("https://cdn.example.com/4.jpg")),
        ]);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=CAROUSEL002").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["partial"], true);

    let items = json["data"]["carousel_media"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["url"], "https://cdn.example.com/2.jpg");
}

#[tokio::test]
async fn test_carousel_failure_before_first_item() {
    let source = MockPostSource::new()
        .with_post(sidecar_post("CAROUSEL003", 23))
        .with_sidecar(vec![Err(FetchError::Other(
            "sidecar post has no edges".to_string(),
        ))]);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=CAROUSEL003").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["partial"], true);
    assert_eq!(json["data"]["carousel_media"], serde_json::json!([]));
}

#[tokio::test]
async fn test_non_carousel_ignores_sidecar_items() {
    let source = MockPostSource::new()
        .with_post(image_post("SINGLE00001", 24))
        .with_sidecar(vec![Ok(image_node("https://cdn.example.com/x.jpg"))]);

    let (_, json) =
        get_json(test_router(source), "/get_post_details?shortcode=SINGLE00001").await;

    assert_eq!(json["data"]["carousel_media"], serde_json::json!([]));
    assert_eq!(json["partial"], false);
}

// =============================================================================
// Combined Degradation
// =============================================================================

#[tokio::test]
async fn test_both_enrichments_fail() {
    let source = MockPostSource::new()
        .with_post(with_location_ref(sidecar_post("BOTHFAIL001", 31), 1))
        .with_location(Err(FetchError::Other("bad location payload".to_string())))
        .with_sidecar(vec![Err(FetchError::Connection("reset".to_string()))]);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=BOTHFAIL001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["partial"], true);
}

#[tokio::test]
async fn test_incomplete_post_with_failed_enrichment() {
    let mut post = with_location_ref(image_post("INCOMPLETE1", 41), 1);
    post.thumbnail_url = None;
    let source = MockPostSource::new()
        .with_post(post)
        .with_location(Err(FetchError::Connection("timeout".to_string())));

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=INCOMPLETE1").await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(json["success"], false);
    assert_eq!(json["partial"], true);
    assert_eq!(json["error_code"], 1005);
    assert!(json["data"]["location"].is_null());
}
