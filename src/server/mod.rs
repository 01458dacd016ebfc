// HTTP server: JSON API routes plus the static front end.

pub mod routes;

use anyhow::Context;
use axum::{
    http::{header, Method},
    Router,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::logger::Logger;

/// Read-only state shared by every request
pub struct AppState {
    pub config: AppConfig,
    /// Outbound client for the completion and billing APIs
    pub http: Client,
    pub logger: Logger,
}

impl AppState {
    pub fn new(config: AppConfig, logger: Logger) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { config, http, logger })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    routes::api_routes()
        .with_state(state)
        .fallback_service(static_files)
        .layer(cors)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let actual_addr = listener.local_addr().context("Failed to get local addr")?;

    let logger = state.logger.clone();
    logger.info(&format!("Server listening on http://{}", actual_addr));
    logger.info(&state.config.describe());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await
        .context("Server error")?;

    logger.info("Server stopped");
    Ok(())
}

async fn shutdown_signal(logger: Logger) {
    let _ = tokio::signal::ctrl_c().await;
    logger.info("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_app;
    use axum::{http::StatusCode, routing::post, Json};
    use serde_json::{json, Value};

    async fn start(extra: &[(&str, String)]) -> SocketAddr {
        let extra: Vec<(String, String)> = extra.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let config = AppConfig::from_lookup(|key| {
            extra
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .or_else(|| (key == "STATIC_DIR").then(|| "does-not-exist".to_string()))
        });
        let state = Arc::new(AppState::new(config, Logger::default()).unwrap());
        spawn_app(router(state)).await
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    /// Canned model output for the 1990 / GB / rock profile: prose, then an
    /// unsorted array of 16 songs with mixed year encodings.
    fn canned_completion() -> String {
        let songs = [
            ("1997", "Bitter Sweet Symphony", "The Verve"),
            ("1990", "Sacrifice", "Elton John"),
            ("2003", "Mr. Brightside", "The Killers"),
            ("2008", "Viva la Vida", "Coldplay"),
            ("1994", "Love Is All Around", "Wet Wet Wet"),
            ("2011", "Someone Like You", "Adele"),
            ("1996", "Wannabe", "Spice Girls"),
            ("2012", "Skyfall", "Adele"),
            ("2020", "Blinding Lights", "The Weeknd"),
            ("1995", "Wonderwall", "Oasis"),
            ("2002", "Clocks", "Coldplay"),
            ("2005", "I Predict a Riot", "Kaiser Chiefs"),
            ("2016", "Human", "Rag'n'Bone Man"),
            ("1999", "Scar Tissue", "Red Hot Chili Peppers"),
            ("2022", "As It Was", "Harry Styles"),
            ("2009", "Use Somebody", "Kings of Leon"),
        ];
        let records: Vec<Value> = songs
            .iter()
            .enumerate()
            .map(|(i, (year, title, artist))| {
                let year = if i % 2 == 0 {
                    json!(year)
                } else {
                    json!(year.parse::<i32>().unwrap())
                };
                json!({"year": year, "title": title, "artist": artist, "significance": "A milestone"})
            })
            .collect();
        format!(
            "Here's a playlist of songs that shaped your life:\n\n{}\n\nI hope you enjoy it!",
            serde_json::to_string_pretty(&records).unwrap()
        )
    }

    #[tokio::test]
    async fn test_get_price() {
        let addr = start(&[]).await;
        let us: Value = client()
            .get(format!("http://{}/get_price?country=US", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(us, json!({"amount": 100, "currency": "USD", "display": "$1"}));

        let unknown: Value = client()
            .get(format!("http://{}/get_price?country=XX", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(unknown["currency"], "GBP");
    }

    #[tokio::test]
    async fn test_create_playlist_without_code_is_bad_request() {
        let addr = start(&[]).await;
        let response = client()
            .post(format!("http://{}/create_spotify_playlist", addr))
            .json(&json!({"playlist": [{"year": 1990, "title": "A", "artist": "B", "significance": "C"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Missing code or playlist data"}));
    }

    #[tokio::test]
    async fn test_create_playlist_missing_code_with_minimal_records() {
        let addr = start(&[]).await;
        let response = client()
            .post(format!("http://{}/create_spotify_playlist", addr))
            .json(&json!({"playlist": [{"title": "A", "artist": "B"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Missing code or playlist data"}));
    }

    #[tokio::test]
    async fn test_create_playlist_rejected_code_is_spotify_error() {
        // The code is bogus, so the token exchange fails whether or not Spotify is reachable
        let addr = start(&[
            ("SPOTIFY_CLIENT_ID", "client-abc".to_string()),
            ("SPOTIFY_CLIENT_SECRET", "secret".to_string()),
            ("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:9/callback".to_string()),
        ])
        .await;
        let response = client()
            .post(format!("http://{}/create_spotify_playlist", addr))
            .json(&json!({"code": "not-a-real-code", "playlist": [{"year": 1990, "title": "A", "artist": "B"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Spotify API error: token exchange failed"), "{}", message);
    }

    #[tokio::test]
    async fn test_create_playlist_without_credentials_is_server_error() {
        let addr = start(&[]).await;
        let response = client()
            .post(format!("http://{}/create_spotify_playlist", addr))
            .json(&json!({"code": "abc", "playlist": [{"year": 1990, "title": "A", "artist": "B", "significance": "C"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Spotify client ID or secret is not configured");
    }

    #[tokio::test]
    async fn test_generate_without_key_is_descriptive_500() {
        let addr = start(&[]).await;
        let response = client()
            .post(format!("http://{}/generate_playlist", addr))
            .json(&json!({"birthMonth": 6, "birthYear": 1990, "country": "GB", "genre": "rock"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "API key is not configured");
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_month() {
        let addr = start(&[("CLAUDE_API_KEY", "sk-ant-test".to_string())]).await;
        let response = client()
            .post(format!("http://{}/generate_playlist", addr))
            .json(&json!({"birthMonth": 14, "birthYear": 1990, "country": "GB", "genre": "rock"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_generate_playlist_end_to_end() {
        let completion = canned_completion();
        let fake_claude = Router::new().route(
            "/v1/messages",
            post(move |Json(body): Json<Value>| {
                let completion = completion.clone();
                async move {
                    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
                    assert!(prompt.contains("1990-06-01"));
                    assert!(prompt.contains("rock"));
                    Json(json!({"content": [{"type": "text", "text": completion}]}))
                }
            }),
        );
        let claude_addr = spawn_app(fake_claude).await;
        let addr = start(&[
            ("CLAUDE_API_KEY", "sk-ant-test".to_string()),
            ("CLAUDE_API_URL", format!("http://{}/v1/messages", claude_addr)),
        ])
        .await;

        let response = client()
            .post(format!("http://{}/generate_playlist", addr))
            .json(&json!({"birthMonth": "6", "birthYear": "1990", "country": "GB", "genre": "rock"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        let years: Vec<i64> = body["playlist"]
            .as_array()
            .unwrap()
            .iter()
            .map(|song| song["year"].as_i64().unwrap())
            .collect();
        assert!((15..=20).contains(&years.len()));
        assert!(years.windows(2).all(|w| w[0] <= w[1]));
        assert!(years.iter().all(|y| (1990..=2024).contains(y)));
    }

    #[tokio::test]
    async fn test_upstream_status_is_mirrored() {
        let fake_claude = Router::new().route(
            "/v1/messages",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"type": "authentication_error", "message": "invalid x-api-key"}})),
                )
            }),
        );
        let claude_addr = spawn_app(fake_claude).await;
        let addr = start(&[
            ("CLAUDE_API_KEY", "sk-ant-bad".to_string()),
            ("CLAUDE_API_URL", format!("http://{}/v1/messages", claude_addr)),
        ])
        .await;

        let response = client()
            .post(format!("http://{}/generate_playlist", addr))
            .json(&json!({"birthMonth": 1, "birthYear": 1985, "country": "US", "genre": "pop"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["error"],
            "Failed to generate playlist: authentication_error - invalid x-api-key"
        );
    }

    #[tokio::test]
    async fn test_callback_and_payment_redirect() {
        let addr = start(&[]).await;

        let missing = client().get(format!("http://{}/callback", addr)).send().await.unwrap();
        assert_eq!(missing.status(), 400);
        assert_eq!(missing.text().await.unwrap(), "Authorization failed");

        let page = client()
            .get(format!("http://{}/callback?code=AQD123", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("SPOTIFY_AUTH_SUCCESS"));
        assert!(page.contains("\"AQD123\""));

        let redirect = client()
            .get(format!("http://{}/payment_success", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(redirect.status(), 303);
        assert_eq!(redirect.headers()["location"], "/?payment=success");
    }

    #[tokio::test]
    async fn test_auth_url_route() {
        let addr = start(&[
            ("SPOTIFY_CLIENT_ID", "client-abc".to_string()),
            ("SPOTIFY_CLIENT_SECRET", "secret".to_string()),
        ])
        .await;
        let body: Value = client()
            .get(format!("http://{}/get_spotify_auth_url", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let url = body["authUrl"].as_str().unwrap();
        assert!(url.contains("scope=playlist-modify-private"));
    }

    #[tokio::test]
    async fn test_payment_session_without_token_is_500() {
        let addr = start(&[]).await;
        let response = client()
            .post(format!("http://{}/create_payment_session", addr))
            .json(&json!({"country": "US"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
    }
}
