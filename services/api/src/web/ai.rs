//! services/api/src/web/ai.rs
//!
//! Handlers for AI theological commentary and speech synthesis. These are the
//! server-side face of the LLM adapters: clients send passages, the API key
//! never leaves this process.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::error::port_error_response;
use crate::web::state::AppState;
use biblia_core::analysis::{AnalysisMode, AnalysisRequest};
use biblia_core::ports::{CommentaryService, SpeechService};

/// Speech input is capped the way the mobile client capped it before sending.
const MAX_SPEECH_CHARS: usize = 3_800;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AnalyzePayload {
    /// `CHAPTER` or `VERSE`.
    #[schema(value_type = String, example = "CHAPTER")]
    pub mode: AnalysisMode,
    /// The passage text to analyze.
    pub passage: String,
    /// Optional human-readable reference, e.g. `Gênesis 1:1`.
    pub reference: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SpeechPayload {
    pub text: String,
}

#[derive(Serialize)]
pub struct SpeechResponse {
    #[serde(rename = "audioBase64")]
    pub audio_base64: String,
}

fn ai_unavailable() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "OPENAI_API_KEY is not configured on this server".to_string(),
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate theological commentary for a chapter or verse.
#[utoipa::path(
    post,
    path = "/ai/analyze",
    request_body = AnalyzePayload,
    responses(
        (status = 200, description = "The decoded analysis; absent fields were not produced"),
        (status = 400, description = "Empty passage"),
        (status = 502, description = "The model failed or returned no JSON"),
        (status = 503, description = "AI not configured")
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let commentary = state.commentary.clone().ok_or_else(ai_unavailable)?;

    if payload.passage.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "passage must not be empty".to_string(),
        ));
    }

    let request = AnalysisRequest {
        mode: payload.mode,
        passage: payload.passage,
        reference: payload.reference,
    };

    let analysis = commentary.analyze(&request).await.map_err(|e| {
        error!("Commentary failed: {:?}", e);
        port_error_response(e)
    })?;

    Ok(Json(analysis))
}

/// Synthesize speech for a piece of study text.
///
/// Returns the audio as base64 JSON, matching the mobile client's existing
/// `/api/speech` contract.
#[utoipa::path(
    post,
    path = "/ai/speech",
    request_body = SpeechPayload,
    responses(
        (status = 200, description = "Base64-encoded audio"),
        (status = 400, description = "Empty text"),
        (status = 502, description = "Speech synthesis failed"),
        (status = 503, description = "AI not configured")
    )
)]
pub async fn speech_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SpeechPayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let speech = state.speech.clone().ok_or_else(ai_unavailable)?;

    let text = payload.text.trim();
    if text.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "text must not be empty".to_string()));
    }
    let safe_text: String = text.chars().take(MAX_SPEECH_CHARS).collect();

    let audio = speech.synthesize(&safe_text).await.map_err(|e| {
        error!("Speech synthesis failed: {:?}", e);
        port_error_response(e)
    })?;

    Ok(Json(SpeechResponse {
        audio_base64: BASE64.encode(audio),
    }))
}
