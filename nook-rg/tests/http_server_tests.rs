//! HTTP routing and contract integration tests
//!
//! Exercises the router directly with `tower::ServiceExt::oneshot`.
//! Validation failures must surface their stable tags before any backend
//! call; the compose endpoint runs fully offline and is tested end to end.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use tower::ServiceExt;

use nook_common::config::{NookConfig, OpenAiConfig};
use nook_rg::{build_router, AppState};

/// Test state pointing at an unroutable backend; only offline paths and
/// pre-call validation may run.
fn test_app() -> Router {
    let config = NookConfig {
        port: 0,
        openai: OpenAiConfig {
            api_key: "test-key".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            profile_model: "gpt-4o".to_string(),
            question_model: "gpt-4o".to_string(),
            image_model: "gpt-image-1".to_string(),
        },
    };
    build_router(AppState::new(config).expect("state builds"))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn decode_data_uri(uri: &str) -> RgbaImage {
    let b64 = uri
        .strip_prefix("data:image/png;base64,")
        .expect("data URI prefix");
    let bytes = BASE64.decode(b64).unwrap();
    image::load_from_memory(&bytes).unwrap().to_rgba8()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get_json(test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["module"], "nook-rg");
}

#[tokio::test]
async fn personality_products_rejects_missing_answers() {
    let (status, body) = post_json(test_app(), "/personality-products", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn personality_products_rejects_empty_answers() {
    let (status, body) =
        post_json(test_app(), "/personality-products", json!({"userAnswers": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn generate_room_requires_prompt() {
    let (status, body) = post_json(test_app(), "/generate-room", json!({"seed": 7})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "prompt is required");

    let (status, _) =
        post_json(test_app(), "/generate-room", json!({"prompt": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn base_room_requires_prompt() {
    let (status, body) = post_json(test_app(), "/base-room", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn base_room_rejects_unknown_size() {
    let (status, body) = post_json(
        test_app(),
        "/base-room",
        json!({"prompt": "cozy bedroom", "size": "640x480"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
    assert!(body["message"].as_str().unwrap().contains("640x480"));
}

#[tokio::test]
async fn stylize_product_requires_url() {
    let (status, body) = post_json(test_app(), "/stylize-product", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn compose_final_requires_base_and_sprites() {
    let (status, body) = post_json(
        test_app(),
        "/compose-final",
        json!({"spriteB64s": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");

    let (status, _) = post_json(
        test_app(),
        "/compose-final",
        json!({"baseB64": "AA=="}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compose_final_with_zero_sprites_round_trips_base() {
    let base = solid_png(64, 48, [0, 0, 255, 255]);
    let (status, body) = post_json(
        test_app(),
        "/compose-final",
        json!({"baseB64": BASE64.encode(&base), "spriteB64s": []}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let img = decode_data_uri(body["imageUrl"].as_str().unwrap());
    assert_eq!(img.dimensions(), (64, 48));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
}

#[tokio::test]
async fn compose_final_accepts_data_uri_base() {
    let base = solid_png(32, 32, [0, 255, 0, 255]);
    let uri = format!("data:image/png;base64,{}", BASE64.encode(&base));
    let (status, body) = post_json(
        test_app(),
        "/compose-final",
        json!({"baseB64": uri, "spriteB64s": []}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        decode_data_uri(body["imageUrl"].as_str().unwrap()).dimensions(),
        (32, 32)
    );
}

#[tokio::test]
async fn compose_final_places_sprite_at_first_anchor() {
    let base = solid_png(200, 100, [0, 0, 255, 255]);
    let sprite = solid_png(20, 20, [255, 0, 0, 255]);
    let (status, body) = post_json(
        test_app(),
        "/compose-final",
        json!({
            "baseB64": BASE64.encode(&base),
            "spriteB64s": [BASE64.encode(&sprite)],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let img = decode_data_uri(body["imageUrl"].as_str().unwrap());
    assert_eq!(img.dimensions(), (200, 100));
    // anchor 0 is (0.15*200, 0.55*100) = (30, 55)
    assert_eq!(img.get_pixel(30 + 5, 55 + 5).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
}

#[tokio::test]
async fn compose_final_rejects_undecodable_base64() {
    let (status, body) = post_json(
        test_app(),
        "/compose-final",
        json!({"baseB64": "!!not-base64!!", "spriteB64s": []}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "compose_failed");
}

#[tokio::test]
async fn compose_room_requires_prompt_and_products() {
    let (status, body) = post_json(
        test_app(),
        "/compose-room",
        json!({"productUrls": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");

    let (status, _) = post_json(
        test_app(),
        "/compose-room",
        json!({"prompt": "cozy bedroom"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rooms_round_trip_preserves_fields() {
    let app = test_app();

    let (status, created) = post_json(
        app.clone(),
        "/rooms",
        json!({
            "seed": 42,
            "imageUrl": "data:image/png;base64,AA==",
            "productIds": ["p1", "p2"],
            "personalityType": "Cozy Minimalist",
            "theme": {"palette": ["sage", "cream"]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room_id = created["roomId"].as_str().unwrap().to_string();
    assert_eq!(room_id.len(), 8);

    let (status, room) = get_json(app.clone(), &format!("/rooms/{room_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["id"], room_id.as_str());
    assert_eq!(room["seed"], 42);
    assert_eq!(room["imageUrl"], "data:image/png;base64,AA==");
    assert_eq!(room["productIds"], json!(["p1", "p2"]));
    assert_eq!(room["personalityType"], "Cozy Minimalist");
    assert_eq!(room["theme"]["palette"][0], "sage");

    let (status, share) =
        post_json(app, &format!("/rooms/{room_id}/share"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["shareToken"], room_id.as_str());
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let (status, body) = get_json(test_app(), "/rooms/zzzzzzzz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = post_json(test_app(), "/rooms/zzzzzzzz/share", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_room_validates_payload() {
    let (status, body) = post_json(
        test_app(),
        "/rooms",
        json!({"imageUrl": "http://example/img.png"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
    assert_eq!(body["message"], "seed and imageUrl are required");

    let (status, _) = post_json(test_app(), "/rooms", json!({"seed": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn daily_questions_require_answers() {
    let (status, body) = post_json(test_app(), "/generate-daily-questions", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "userAnswers is required");

    let (status, _) = post_json(
        test_app(),
        "/generate-daily-questions",
        json!({"userAnswers": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slots_catalog_has_seven_hotspots() {
    let (status, body) = get_json(test_app(), "/slots").await;
    assert_eq!(status, StatusCode::OK);
    let boxes = body["boxes"].as_array().unwrap();
    assert_eq!(boxes.len(), 7);
    assert_eq!(boxes[0]["label"], "bed");
}
