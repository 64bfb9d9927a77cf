//! Client configuration endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use marketplace_core::Envelope;

use crate::state::AppState;

/// Endpoints client pages need.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_url: String,
    pub ws_url: Option<String>,
}

/// GET /api/config
///
/// `apiUrl` is the gateway's proxy prefix, so pages never talk to the
/// backend directly.
pub async fn client_config(State(state): State<AppState>) -> Json<Envelope<ClientConfig>> {
    let config = state.config();
    Json(Envelope::ok(ClientConfig {
        api_url: format!("{}/api/backend", config.public_base_url.trim_end_matches('/')),
        ws_url: config.ws_url.clone(),
    }))
}
