//! Proxy endpoints for the quote page.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::constants::{
    GEMINI_KEY_MISSING, NO_QUOTE_RETURNED, PEXELS_KEY_MISSING, PROMPT_REQUIRED,
};
use crate::error::QuoteCardError;
use crate::providers::{image, quote};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    config: Arc<AppConfig>,
    http: reqwest::Client,
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ThemeRequest {
    /// Used verbatim as the search query; an absent field searches for "".
    #[serde(default)]
    theme: String,
}

/// POST /api/quote: `{prompt}` in, `{quote}` out. The credential check comes
/// before field validation, matching the order callers observe.
async fn quote_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, QuoteCardError> {
    let Some(api_key) = state.config.gemini_api_key.as_deref() else {
        return Err(QuoteCardError::MissingCredential(GEMINI_KEY_MISSING));
    };

    let prompt = match body.get("prompt").and_then(Value::as_str) {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => return Err(QuoteCardError::BadRequest(PROMPT_REQUIRED)),
    };

    let generated = quote::generate(&state.http, &state.config.gemini_base, api_key, prompt)
        .await?
        .unwrap_or_else(|| NO_QUOTE_RETURNED.to_string());

    Ok(Json(json!({ "quote": generated })))
}

/// POST /api/theme-image: `{theme}` in, `{imageUrl}` out. A search with no
/// usable photo answers `{imageUrl: null}` with a 200.
async fn theme_image_handler(
    State(state): State<AppState>,
    Json(body): Json<ThemeRequest>,
) -> Result<Json<Value>, QuoteCardError> {
    let Some(api_key) = state.config.pexels_api_key.as_deref() else {
        return Err(QuoteCardError::MissingCredential(PEXELS_KEY_MISSING));
    };

    debug!("Searching background for theme {:?}", body.theme);
    let image_url =
        image::search_large(&state.http, &state.config.pexels_base, api_key, &body.theme).await?;

    Ok(Json(json!({ "imageUrl": image_url })))
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/quote", axum::routing::post(quote_handler))
        .route("/api/theme-image", axum::routing::post(theme_image_handler))
}

/// Starts the proxy server.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    config: AppConfig,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(config));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
