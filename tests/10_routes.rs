mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use movie_booking_api::database::models::Role;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start().await?;

    let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_serves_a_banner() -> Result<()> {
    let server = common::start().await?;

    let res = server.client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.text().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unmatched_route_reports_path_and_query() -> Result<()> {
    let server = common::start().await?;

    let res = server
        .client
        .get(server.api("/theatres?city=Pune"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /mba/api/v1/theatres?city=Pune not found");
    Ok(())
}

#[tokio::test]
async fn unmatched_route_outside_prefix() -> Result<()> {
    let server = common::start().await?;

    let res = server.client.delete(format!("{}/nowhere", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Route /nowhere not found");
    Ok(())
}

#[tokio::test]
async fn unrouted_method_on_known_path_is_not_found() -> Result<()> {
    let server = common::start().await?;
    let token = server.token_for(Role::Admin);
    let id = Uuid::new_v4();

    let res = server
        .client
        .put(server.api(&format!("/movies/{}", id)))
        .bearer_auth(&token)
        .json(&common::sample_movie())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], format!("Route /mba/api/v1/movies/{} not found", id));

    let res = server.client.get(server.api("/movies")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Route /mba/api/v1/movies not found");

    let res = server.client.get(server.api("/auth/login")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Route /mba/api/v1/auth/login not found");

    let res = server.client.post(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Route /health not found");
    Ok(())
}
