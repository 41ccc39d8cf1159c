//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::port_error_response;
use crate::web::middleware::session_token_from_headers;
use crate::web::state::AppState;
use biblia_core::canon::Book;
use biblia_core::domain::{BibleVersion, NoteDraft, Verse};
use biblia_core::notes::StorageMode;
use biblia_core::plan::{group_into_eras, CompletedDays, EraSection, DEFAULT_TOTAL_DAYS};
use biblia_core::ports::ScriptureRepository;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_versions_handler,
        get_chapter_handler,
        search_handler,
        plan_handler,
        plan_sections_handler,
        toggle_day_handler,
        list_notes_handler,
        upsert_note_handler,
        delete_note_handler,
        crate::web::ai::analyze_handler,
        crate::web::ai::speech_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::me_handler,
    ),
    components(schemas(
        NotePayload,
        crate::web::ai::AnalyzePayload,
        crate::web::ai::SpeechPayload,
        crate::web::auth::SignupRequest,
        crate::web::auth::LoginRequest,
        crate::web::auth::AuthResponse,
    )),
    tags(
        (name = "Bíblia API", description = "Scripture text, the chronological reading plan, saved studies and AI commentary.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersionQuery {
    /// Version code, e.g. `ARA`. Defaults to the first catalog entry.
    pub version: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Full-text search terms.
    pub q: String,
    pub version: Option<String>,
    /// Result cap; clamped to 300.
    pub limit: Option<u32>,
}

/// The caller-supplied shape of a note to save.
#[derive(Deserialize, ToSchema)]
pub struct NotePayload {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub reference: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NotePayload {
    fn into_draft(self) -> NoteDraft {
        NoteDraft {
            id: self.id,
            title: self.title,
            content: self.content,
            reference: self.reference,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ChapterResponse {
    pub version: BibleVersion,
    pub verses: Vec<Verse>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub version: BibleVersion,
    pub query: String,
    pub verses: Vec<Verse>,
}

#[derive(Serialize)]
pub struct PlanSectionsResponse {
    pub total_days: u32,
    pub completed: usize,
    pub sections: Vec<EraSection>,
}

#[derive(Serialize)]
pub struct ToggleDayResponse {
    pub day: u32,
    pub completed: bool,
    pub completed_days: CompletedDays,
}

#[derive(Serialize)]
pub struct DeleteNoteResponse {
    pub mode: StorageMode,
}

const MAX_SEARCH_RESULTS: u32 = 300;

fn scripture_unavailable() -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "scripture text requires the database, which is not configured".to_string(),
    )
}

//=========================================================================================
// Scripture Handlers
//=========================================================================================

/// List the active bible versions.
///
/// Served from the timestamp-gated catalog cache; degrades to the built-in
/// fallback entry when the database is unreachable.
#[utoipa::path(
    get,
    path = "/versions",
    responses(
        (status = 200, description = "Active versions ordered for display")
    )
)]
pub async fn list_versions_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.versions.list().await)
}

/// Fetch one chapter of scripture text.
#[utoipa::path(
    get,
    path = "/bible/{book}/{chapter}",
    params(
        ("book" = String, Path, description = "Book abbreviation, e.g. GN or 1SM"),
        ("chapter" = u32, Path, description = "1-based chapter number"),
        VersionQuery
    ),
    responses(
        (status = 200, description = "The chapter's verses in order"),
        (status = 400, description = "Unknown book or chapter out of range"),
        (status = 503, description = "Database not configured")
    )
)]
pub async fn get_chapter_handler(
    State(state): State<Arc<AppState>>,
    Path((book, chapter)): Path<(String, u32)>,
    Query(query): Query<VersionQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let book = Book::from_abbreviation(&book)
        .ok_or((StatusCode::BAD_REQUEST, format!("unknown book '{book}'")))?;
    if chapter == 0 || chapter > book.chapter_count() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} has chapters 1-{}", book.name(), book.chapter_count()),
        ));
    }

    let scripture = state.scripture().ok_or_else(scripture_unavailable)?;
    let version = state
        .versions
        .resolve(query.version.as_deref())
        .await
        .ok_or_else(scripture_unavailable)?;

    let verses = scripture
        .get_chapter(&version.id, book, chapter)
        .await
        .map_err(|e| {
            error!("Failed to load {} {}: {:?}", book.abbreviation(), chapter, e);
            port_error_response(e)
        })?;

    Ok(Json(ChapterResponse { version, verses }))
}

/// Full-text search over one version's verses.
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching verses in canonical order"),
        (status = 400, description = "Empty query"),
        (status = 503, description = "Database not configured")
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let terms = query.q.trim();
    if terms.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query must not be empty".to_string()));
    }

    let scripture = state.scripture().ok_or_else(scripture_unavailable)?;
    let version = state
        .versions
        .resolve(query.version.as_deref())
        .await
        .ok_or_else(scripture_unavailable)?;

    let limit = query
        .limit
        .unwrap_or(MAX_SEARCH_RESULTS)
        .min(MAX_SEARCH_RESULTS);
    let verses = scripture
        .search_verses(&version.id, terms, limit)
        .await
        .map_err(|e| {
            error!("Search failed for '{terms}': {:?}", e);
            port_error_response(e)
        })?;

    Ok(Json(SearchResponse {
        version,
        query: terms.to_string(),
        verses,
    }))
}

//=========================================================================================
// Reading Plan Handlers
//=========================================================================================

/// The full chronological reading plan.
#[utoipa::path(
    get,
    path = "/plan",
    responses(
        (status = 200, description = "All generated day entries in order")
    )
)]
pub async fn plan_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json((*state.plan).clone())
}

/// The plan grouped into era sections, with the user's progress counts.
#[utoipa::path(
    get,
    path = "/plan/sections",
    responses(
        (status = 200, description = "Era sections with completed/total counts"),
        (status = 500, description = "Progress storage failure")
    )
)]
pub async fn plan_sections_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let completed = state
        .progress
        .completed()
        .await
        .map_err(port_error_response)?;

    let sections = group_into_eras(&state.plan, &completed);
    Ok(Json(PlanSectionsResponse {
        total_days: DEFAULT_TOTAL_DAYS,
        completed: completed.len(),
        sections,
    }))
}

/// Toggle one day of the plan as read/unread.
#[utoipa::path(
    post,
    path = "/plan/days/{day}/toggle",
    params(("day" = u32, Path, description = "Day number, 1-365")),
    responses(
        (status = 200, description = "The new state of the toggled day"),
        (status = 400, description = "Day outside the plan"),
        (status = 500, description = "Progress storage failure")
    )
)]
pub async fn toggle_day_handler(
    State(state): State<Arc<AppState>>,
    Path(day): Path<u32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if day == 0 || day > DEFAULT_TOTAL_DAYS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("day must be between 1 and {DEFAULT_TOTAL_DAYS}"),
        ));
    }

    let (completed_now, completed_days) = state
        .progress
        .toggle_day(day)
        .await
        .map_err(port_error_response)?;

    Ok(Json(ToggleDayResponse {
        day,
        completed: completed_now,
        completed_days,
    }))
}

//=========================================================================================
// Saved Notes Handlers (hybrid local/cloud)
//=========================================================================================

/// List saved notes from wherever the current session routes.
///
/// The response's `mode` field reports whether the notes came from the
/// account (`cloud`) or from this server's local store (`local`).
#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "The notes plus the routing mode"),
        (status = 502, description = "Cloud backend failure")
    )
)]
pub async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let store = state.note_store(session_token_from_headers(&headers));
    let listing = store.list().await.map_err(|e| {
        error!("Failed to list notes: {:?}", e);
        port_error_response(e)
    })?;
    Ok(Json(listing))
}

/// Create or update a saved note.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = NotePayload,
    responses(
        (status = 200, description = "The stored note plus the routing mode"),
        (status = 502, description = "Cloud backend failure")
    )
)]
pub async fn upsert_note_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let store = state.note_store(session_token_from_headers(&headers));
    let write = store.upsert(payload.into_draft()).await.map_err(|e| {
        error!("Failed to save note: {:?}", e);
        port_error_response(e)
    })?;
    Ok(Json(write))
}

/// Delete a saved note by id.
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = String, Path, description = "Note id (numeric string in cloud mode)")),
    responses(
        (status = 200, description = "Deleted; reports the routing mode"),
        (status = 400, description = "Id not valid for the routed mode"),
        (status = 502, description = "Cloud backend failure")
    )
)]
pub async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let store = state.note_store(session_token_from_headers(&headers));
    let mode = store.delete(&id).await.map_err(|e| {
        error!("Failed to delete note {id}: {:?}", e);
        port_error_response(e)
    })?;
    Ok(Json(DeleteNoteResponse { mode }))
}
