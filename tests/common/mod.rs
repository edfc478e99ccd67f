#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use axum::Router;

use movie_booking_api::app::{routes, with_stages};
use movie_booking_api::config::AppConfig;
use movie_booking_api::database::models::Role;
use movie_booking_api::database::MemoryStore;
use movie_booking_api::AppState;

pub const API: &str = "/mba/api/v1";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".into();
    config.security.bcrypt_cost = 4;
    config
}

/// Production preset with the test secret; unclassified faults are masked
pub fn production_config() -> AppConfig {
    let mut config = AppConfig::production();
    config.security.jwt_secret = "integration-test-secret".into();
    config.security.bcrypt_cost = 4;
    config.api.enable_rate_limiting = false;
    config
}

impl TestServer {
    /// Serve a fresh in-memory application on the current runtime
    pub async fn start(config: AppConfig) -> Result<Self> {
        Self::start_with_routes(config, Router::new()).await
    }

    /// Serve the application with `extra` routes mounted under the same
    /// global request stages
    pub async fn start_with_routes(config: AppConfig, extra: Router<AppState>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        let app = with_stages(routes(&state).merge(extra), state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
        });

        let server = Self {
            port,
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Absolute URL for a path under the API prefix
    pub fn api(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API, path)
    }

    /// Signed token for a synthetic principal
    pub fn token_for(&self, role: Role) -> String {
        self.state
            .tokens
            .issue(Uuid::new_v4(), role)
            .expect("failed to sign test token")
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.api("/auth/register"))
            .json(&json!({ "name": "Test User", "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.api("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn create_movie(&self, token: &str, movie: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.api("/movies"))
            .bearer_auth(token)
            .json(movie)
            .send()
            .await?)
    }
}

pub async fn start() -> Result<TestServer> {
    TestServer::start(test_config()).await
}

pub fn sample_movie() -> Value {
    json!({
        "name": "Inception",
        "description": "A thief who steals corporate secrets through dream-sharing",
        "cast": ["Leonardo DiCaprio", "Joseph Gordon-Levitt", "Elliot Page"],
        "language": "English",
        "director": "Christopher Nolan",
        "releaseDate": "2010-07-16",
        "releaseStatus": "RELEASED",
        "trailerUrl": "https://www.youtube.com/watch?v=YoHD9XEInc0"
    })
}
