mod common;

use anyhow::Result;
use axum::{routing::get, Router};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use movie_booking_api::auth::Claims;
use movie_booking_api::database::models::Role;
use movie_booking_api::AppState;

#[tokio::test]
async fn malformed_json_is_rejected_before_authentication() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .client
        .post(server.api("/movies"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(r#"{"name": "Inception","#)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "success": false, "message": "Invalid JSON" }));
    Ok(())
}

#[tokio::test]
async fn garbled_token_is_invalid() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .client
        .get(server.api(&format!("/movies/{}", Uuid::new_v4())))
        .bearer_auth("definitely.not.a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() -> Result<()> {
    let server = common::start().await?;

    let mut claims = Claims::new(Uuid::new_v4(), Role::Admin, 24);
    claims.iat -= 48 * 3600;
    claims.exp -= 25 * 3600;
    let token = server.state.tokens.sign(&claims).unwrap();

    let res = server.create_movie(&token, &common::sample_movie()).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Token expired");
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() -> Result<()> {
    let mut config = common::test_config();
    config.api.max_request_size_bytes = 64;
    let server = common::TestServer::start(config).await?;

    let res = server
        .create_movie(&server.token_for(Role::Admin), &common::sample_movie())
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request body exceeds the 64 byte limit");
    Ok(())
}

#[tokio::test]
async fn rate_limited_clients_get_retry_after() -> Result<()> {
    let mut config = common::test_config();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 3;
    config.api.rate_limit_window_secs = 60;
    let server = common::TestServer::start(config).await?;

    let mut limited = None;
    for _ in 0..10 {
        let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = Some(res);
            break;
        }
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = limited.expect("limiter never kicked in");
    let retry_after: u64 = res
        .headers()
        .get(header::RETRY_AFTER)
        .expect("missing Retry-After")
        .to_str()?
        .parse()?;
    assert!(retry_after >= 1);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Too many requests, please try again later");
    Ok(())
}

#[tokio::test]
async fn malformed_id_segment_is_invalid_reference() -> Result<()> {
    let server = common::start().await?;
    let token = server.token_for(Role::User);

    let res = server
        .client
        .get(server.api("/movies/%FF"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "success": false, "message": "Invalid id: %FF" }));

    let res = server
        .client
        .delete(server.api("/movies/%FF"))
        .bearer_auth(server.token_for(Role::Admin))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

async fn explode() -> &'static str {
    panic!("seat map corrupted")
}

fn faulty_routes() -> Router<AppState> {
    Router::new().route("/explode", get(explode))
}

#[tokio::test]
async fn handler_panic_shows_stack_in_development() -> Result<()> {
    let server = common::TestServer::start_with_routes(common::test_config(), faulty_routes()).await?;

    let res = server.client.get(format!("{}/explode", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Handler panicked: seat map corrupted");
    assert!(body["stack"].is_string());

    // The server keeps serving after the fault
    let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn handler_panic_is_masked_in_production() -> Result<()> {
    let server =
        common::TestServer::start_with_routes(common::production_config(), faulty_routes()).await?;

    let res = server.client.get(format!("{}/explode", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "success": false, "message": "Internal server error" }));
    Ok(())
}
