// JSON API consumed by the Buttercup front end.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

use super::AppState;
use crate::assembler::PlaylistAssembler;
use crate::completion::CompletionClient;
use crate::error::AppError;
use crate::extractor::extract_playlist;
use crate::logger::Logger;
use crate::models::{BirthProfile, RequestedTrack, SongEntry};
use crate::payment::{price_for_country, PaymentGateway, PaymentSession, Price};
use crate::prompt::build_prompt;
use crate::sources::spotify::SpotifyCatalog;

const MISSING_PLAYLIST_INPUT: &str = "Missing code or playlist data";

// ---- Request/Response types ----

#[derive(Serialize)]
pub struct GeneratedPlaylist {
    pub playlist: Vec<SongEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePlaylistRequest {
    pub code: Option<String>,
    pub playlist: Option<Vec<RequestedTrack>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistResponse {
    pub success: bool,
    pub playlist_url: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct PriceParams {
    pub country: Option<String>,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub country: Option<String>,
}

// ---- Route registration ----

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate_playlist", post(generate_playlist))
        .route("/get_spotify_auth_url", get(get_spotify_auth_url))
        .route("/callback", get(callback))
        .route("/create_spotify_playlist", post(create_spotify_playlist))
        .route("/get_price", get(get_price))
        .route("/create_payment_session", post(create_payment_session))
        .route("/payment_success", get(payment_success))
}

/// Log the detailed error, hand back the user-facing one.
fn logged<'a, E>(logger: &'a Logger, context: &'a str) -> impl FnOnce(E) -> AppError + 'a
where
    E: Display + Into<AppError>,
{
    move |err| {
        logger.error(&format!("{}: {}", context, err));
        err.into()
    }
}

// ---- Handlers ----

async fn generate_playlist(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BirthProfile>, JsonRejection>,
) -> Result<Json<GeneratedPlaylist>, AppError> {
    let Json(profile) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let current_year = Local::now().year();
    profile.validate(current_year).map_err(AppError::Validation)?;

    let logger = &state.logger;
    let client = CompletionClient::from_config(state.http.clone(), &state.config.claude)
        .map_err(logged(logger, "Completion client unavailable"))?;

    let prompt = build_prompt(&profile, current_year);
    logger.debug(&format!("Prompt is {} characters", prompt.len()));

    let raw = client
        .complete(&prompt)
        .await
        .map_err(logged(logger, "Completion request failed"))?;
    let playlist = extract_playlist(&raw).map_err(logged(logger, "Could not extract playlist"))?;

    logger.playlist_generated(&profile.date_of_birth(), &profile.country, playlist.len());
    Ok(Json(GeneratedPlaylist { playlist }))
}

async fn get_spotify_auth_url(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let logger = &state.logger;
    let catalog = SpotifyCatalog::from_config(&state.config.spotify)
        .map_err(logged(logger, "Spotify unavailable"))?;
    let auth_url = catalog
        .authorize_url()
        .map_err(logged(logger, "Could not build authorization URL"))?;
    Ok(Json(AuthUrlResponse { auth_url }))
}

async fn callback(Query(params): Query<CallbackParams>) -> Response {
    match (params.code, params.error) {
        (Some(code), _) if !code.is_empty() => {
            Html(auth_result_page("SPOTIFY_AUTH_SUCCESS", "code", &code)).into_response()
        }
        (_, Some(error)) => Html(auth_result_page("SPOTIFY_AUTH_ERROR", "error", &error)).into_response(),
        _ => (StatusCode::BAD_REQUEST, "Authorization failed").into_response(),
    }
}

/// Popup page that hands the OAuth result back to the opener window.
fn auth_result_page(message_type: &str, field: &str, value: &str) -> String {
    // JSON string literal, with `</` broken up so it cannot close the script
    let value = serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/");
    format!(
        r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>Buttercup</title></head>
  <body>
    <p>You can close this window.</p>
    <script>
      if (window.opener) {{
        window.opener.postMessage({{ type: "{message_type}", {field}: {value} }}, window.location.origin);
      }}
    </script>
  </body>
</html>
"#
    )
}

async fn create_spotify_playlist(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<Json<CreatePlaylistResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let (code, playlist) = match (request.code, request.playlist) {
        (Some(code), Some(playlist)) if !code.is_empty() && !playlist.is_empty() => (code, playlist),
        _ => return Err(AppError::Validation(MISSING_PLAYLIST_INPUT.to_string())),
    };

    let logger = &state.logger;
    let catalog = SpotifyCatalog::from_config(&state.config.spotify)
        .map_err(logged(logger, "Spotify unavailable"))?;

    let assembled = PlaylistAssembler::new(catalog, logger.clone())
        .assemble(&code, &playlist)
        .await
        .map_err(logged(logger, "Spotify API error"))?;

    Ok(Json(CreatePlaylistResponse {
        success: true,
        playlist_url: assembled.playlist_url,
        message: format!(
            "Successfully created playlist with {} tracks",
            assembled.matched_count
        ),
    }))
}

async fn get_price(Query(params): Query<PriceParams>) -> Json<Price> {
    Json(price_for_country(params.country.as_deref()))
}

async fn create_payment_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentSession>, AppError> {
    let country = payload.ok().and_then(|Json(request)| request.country);
    let price = price_for_country(country.as_deref());

    let logger = &state.logger;
    let gateway = PaymentGateway::from_config(state.http.clone(), &state.config)
        .map_err(logged(logger, "Payments unavailable"))?;
    let session = gateway
        .create_session(&price)
        .await
        .map_err(logged(logger, "Failed to create payment session"))?;

    logger.payment_session(&session.flow_id, price.currency, price.amount);
    Ok(Json(session))
}

async fn payment_success() -> Redirect {
    Redirect::to("/?payment=success")
}
