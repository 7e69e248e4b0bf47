//! API integration tests for post lookups and error mapping.
//!
//! Tests verify:
//! - Successful lookups by shortcode and media id
//! - Identifier validation and precedence
//! - Fetch failures mapped to error codes and statuses
//! - The completeness gate and panic recovery

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

use ig_post_server::error::FetchError;

use super::test_utils::{
    assert_envelope_shape, get_json, image_post, test_router, video_post, MockPostSource,
    PANIC_SHORTCODE,
};

// =============================================================================
// Successful Lookups
// =============================================================================

#[tokio::test]
async fn test_lookup_by_shortcode_success() {
    let source = MockPostSource::new().with_post(image_post("CuaDDcSIXyz", 3141837120711261363));
    let router = test_router(source);

    let (status, json) = get_json(router, "/get_post_details?shortcode=CuaDDcSIXyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_envelope_shape(&json);
    assert_eq!(json["success"], true);
    assert_eq!(json["partial"], false);
    assert!(json["error_code"].is_null());
    assert_eq!(json["message"], "Post details fetched successfully.");

    let data = &json["data"];
    assert_eq!(data["shortcode"], "CuaDDcSIXyz");
    assert_eq!(data["media_id"], 3141837120711261363u64);
    assert_eq!(data["post_type"], "GraphImage");
    assert_eq!(data["timestamp"], "2024-05-01T12:00:00Z");
    assert_eq!(data["likes"], 1234);
    assert_eq!(data["comments"], 56);
    assert_eq!(data["hashtags"], serde_json::json!(["golden", "hour"]));
    assert_eq!(data["mentions"], serde_json::json!(["friend.one"]));
    assert_eq!(data["owner_info"]["username"], "instagram");
    assert_eq!(data["owner_info"]["is_verified"], true);
}

#[tokio::test]
async fn test_lookup_by_media_id_success() {
    let source = MockPostSource::new().with_post(image_post("BXi1BxjFebG", 1577056037919647430));
    let router = test_router(source);

    let (status, json) = get_json(router, "/get_post_details?media_id=1577056037919647430").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["shortcode"], "BXi1BxjFebG");
}

#[tokio::test]
async fn test_image_post_shape() {
    let source = MockPostSource::new().with_post(image_post("IMAGE000001", 1));
    let (_, json) = get_json(test_router(source), "/get_post_details?shortcode=IMAGE000001").await;

    let data = &json["data"];
    assert_eq!(data["carousel_media"], serde_json::json!([]));
    assert!(data["video_url"].is_null());
    assert_eq!(data["image_url"], "https://cdn.example.com/IMAGE000001.jpg");
    assert_eq!(data["is_video"], false);
}

#[tokio::test]
async fn test_video_post_shape() {
    let source = MockPostSource::new().with_post(video_post("VIDEO000001", 2));
    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=VIDEO000001").await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert!(data["image_url"].is_null());
    assert_eq!(data["video_url"], "https://cdn.example.com/VIDEO000001.mp4");
    assert_eq!(data["is_video"], true);
    assert_eq!(data["post_type"], "GraphVideo");
}

#[tokio::test]
async fn test_response_content_type_is_json() {
    let source = MockPostSource::new().with_post(image_post("IMAGE000001", 1));
    let request = Request::builder()
        .uri("/get_post_details?shortcode=IMAGE000001")
        .body(Body::empty())
        .unwrap();

    let response = test_router(source).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

// =============================================================================
// Identifier Validation
// =============================================================================

#[tokio::test]
async fn test_missing_identifier() {
    let source = MockPostSource::new();
    let counter = source.fetch_counter();

    let (status, json) = get_json(test_router(source), "/get_post_details").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope_shape(&json);
    assert_eq!(json["success"], false);
    assert_eq!(json["partial"], false);
    assert_eq!(json["error_code"], 1000);
    assert_eq!(json["message"], "Missing shortcode or media_id parameter.");
    assert!(json["data"].is_null());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_shortcode_is_missing() {
    let (status, json) = get_json(
        test_router(MockPostSource::new()),
        "/get_post_details?shortcode=",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], 1000);
}

#[tokio::test]
async fn test_unparseable_media_id_is_missing() {
    for uri in [
        "/get_post_details?media_id=abc",
        "/get_post_details?media_id=-5",
        "/get_post_details?media_id=12.5",
        "/get_post_details?media_id=",
    ] {
        let source = MockPostSource::new();
        let counter = source.fetch_counter();

        let (status, json) = get_json(test_router(source), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(json["error_code"], 1000, "uri: {}", uri);
        assert_eq!(counter.load(Ordering::SeqCst), 0, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_unparseable_media_id_falls_back_to_shortcode() {
    let source = MockPostSource::new().with_post(image_post("IMAGE000001", 1));
    let (status, json) = get_json(
        test_router(source),
        "/get_post_details?shortcode=IMAGE000001&media_id=abc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["shortcode"], "IMAGE000001");
}

#[tokio::test]
async fn test_shortcode_takes_precedence_over_media_id() {
    let source = MockPostSource::new()
        .with_post(image_post("FIRST000001", 1))
        .with_post(image_post("SECOND00002", 2));

    let (status, json) = get_json(
        test_router(source),
        "/get_post_details?shortcode=FIRST000001&media_id=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["shortcode"], "FIRST000001");
}

#[tokio::test]
async fn test_repeated_query_key_uses_first_value() {
    let source = MockPostSource::new()
        .with_post(image_post("FIRST000001", 1))
        .with_post(image_post("SECOND00002", 2));
    let router = test_router(source);

    for (uri, expected) in [
        (
            "/get_post_details?shortcode=FIRST000001&shortcode=FIRST000001",
            "FIRST000001",
        ),
        (
            "/get_post_details?shortcode=FIRST000001&media_id=1&media_id=2",
            "FIRST000001",
        ),
        ("/get_post_details?media_id=2&media_id=1", "SECOND00002"),
    ] {
        let (status, json) = get_json(router.clone(), uri).await;

        assert_eq!(status, StatusCode::OK, "uri: {}", uri);
        assert_eq!(json["data"]["shortcode"], expected, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_media_id_beyond_u64_is_missing() {
    let (status, json) = get_json(
        test_router(MockPostSource::new()),
        "/get_post_details?media_id=18446744073709551616",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], 1000);
}

// =============================================================================
// Fetch Failures
// =============================================================================

#[tokio::test]
async fn test_unknown_shortcode_not_found() {
    let (status, json) = get_json(
        test_router(MockPostSource::new()),
        "/get_post_details?shortcode=MISSING0001",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope_shape(&json);
    assert_eq!(json["error_code"], 1001);
    assert_eq!(
        json["message"],
        "Post not found. It may have been deleted or is private."
    );
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_unknown_media_id_not_found() {
    let (status, json) = get_json(
        test_router(MockPostSource::new()),
        "/get_post_details?media_id=42",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], 1001);
}

#[tokio::test]
async fn test_rate_limited() {
    let source = MockPostSource::new().with_shortcode_error(
        "LIMITED0001",
        FetchError::Connection("429 Too Many Requests: please wait".to_string()),
    );

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=LIMITED0001").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error_code"], 1002);
    assert_eq!(json["message"], "Rate limit hit. Please wait before retrying.");
}

#[tokio::test]
async fn test_connection_error() {
    let source = MockPostSource::new()
        .with_media_id_error(7, FetchError::Connection("HTTP error code 502.".to_string()));

    let (status, json) = get_json(test_router(source), "/get_post_details?media_id=7").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_code"], 1003);
    assert_eq!(json["message"], "Connection error. Please try again later.");
}

#[tokio::test]
async fn test_other_fetch_error() {
    let source = MockPostSource::new().with_shortcode_error(
        "BROKEN00001",
        FetchError::Other("unexpected response shape".to_string()),
    );

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=BROKEN00001").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_code"], 1004);
    assert_eq!(json["message"], "Unexpected error while fetching post.");
}

// =============================================================================
// Completeness Gate
// =============================================================================

#[tokio::test]
async fn test_missing_thumbnail_is_incomplete() {
    let mut post = image_post("NOTHUMB0001", 9);
    post.thumbnail_url = None;
    let source = MockPostSource::new().with_post(post);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=NOTHUMB0001").await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(json["success"], false);
    assert_eq!(json["partial"], true);
    assert_eq!(json["error_code"], 1005);
    assert_eq!(
        json["message"],
        "Incomplete post data. Missing fields: thumbnail_url"
    );
    assert_eq!(json["data"]["shortcode"], "NOTHUMB0001");
}

#[tokio::test]
async fn test_missing_media_id_and_thumbnail_listed_in_order() {
    let mut post = image_post("NOMEDIA0001", 0);
    post.media_id = None;
    post.thumbnail_url = None;
    let source = MockPostSource::new().with_post(post);

    let (status, json) =
        get_json(test_router(source), "/get_post_details?shortcode=NOMEDIA0001").await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        json["message"],
        "Incomplete post data. Missing fields: media_id, thumbnail_url"
    );
    assert!(!json["data"].is_null());
}

// =============================================================================
// Internal Errors
// =============================================================================

#[tokio::test]
async fn test_handler_panic_returns_internal_error_envelope() {
    let source = MockPostSource::new();
    let uri = format!("/get_post_details?shortcode={}", PANIC_SHORTCODE);

    let (status, json) = get_json(test_router(source), &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope_shape(&json);
    assert_eq!(json["success"], false);
    assert_eq!(json["error_code"], 1006);
    assert_eq!(
        json["message"],
        "Internal server error. Please contact support."
    );
}

// =============================================================================
// Health and Routing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get_json(test_router(MockPostSource::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let request = Request::builder()
        .uri("/nonexistent")
        .body(Body::empty())
        .unwrap();

    let response = test_router(MockPostSource::new())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let source = MockPostSource::new().with_post(image_post("IMAGE000001", 1));
    let request = Request::builder()
        .uri("/get_post_details?shortcode=IMAGE000001")
        .header("Origin", "https://client.example.com")
        .body(Body::empty())
        .unwrap();

    let response = test_router(source).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_one_resolution_per_request() {
    let source = MockPostSource::new().with_post(image_post("IMAGE000001", 1));
    let counter = source.fetch_counter();

    let (status, _) =
        get_json(test_router(source), "/get_post_details?shortcode=IMAGE000001").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
