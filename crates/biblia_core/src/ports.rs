//! crates/biblia_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analysis::{Analysis, AnalysisRequest};
use crate::canon::Book;
use crate::domain::{BibleVersion, NoteDraft, SavedNote, User, UserCredentials, Verse};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The variants follow the error taxonomy of the product: validation errors
/// (`InvalidId`) are client-side mistakes, `Backend` wraps remote transport or
/// database failures verbatim so the UI can display them, and `Storage` is the
/// local key/value store's generic failure.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Local storage error: {0}")]
    Storage(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A string-keyed, string-valued persistent store, mirroring the
/// `getItem`/`setItem`/`removeItem` contract of on-device storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove_item(&self, key: &str) -> PortResult<()>;
}

/// Yields the currently authenticated user, if any.
///
/// Implementations must never fail: any error while probing the session
/// (missing configuration, expired token, unreachable backend) answers `None`,
/// which routes callers to local mode instead of surfacing an error.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Option<Uuid>;
}

/// One storage location for saved notes (local store or remote table).
///
/// `user` is the owning account for cloud implementations; the local
/// implementation ignores it (local notes are anonymous).
#[async_trait]
pub trait NoteBackend: Send + Sync {
    async fn list_notes(&self, user: Option<Uuid>) -> PortResult<Vec<SavedNote>>;
    async fn upsert_note(&self, user: Option<Uuid>, draft: NoteDraft) -> PortResult<SavedNote>;
    async fn delete_note(&self, user: Option<Uuid>, id: &str) -> PortResult<()>;
}

/// Read access to scripture text and the versions reference table.
#[async_trait]
pub trait ScriptureRepository: Send + Sync {
    /// Active versions, ordered by `sort_order`.
    async fn list_versions(&self) -> PortResult<Vec<BibleVersion>>;

    /// All verses of one chapter, ordered by verse number.
    async fn get_chapter(&self, version_id: &str, book: Book, chapter: u32)
        -> PortResult<Vec<Verse>>;

    /// Full-text search over one version's verses. `limit` bounds the result.
    async fn search_verses(&self, version_id: &str, query: &str, limit: u32)
        -> PortResult<Vec<Verse>>;
}

/// Account and auth-session management.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// Generates theological commentary for a chapter or verse.
#[async_trait]
pub trait CommentaryService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> PortResult<Analysis>;
}

/// Synthesizes speech audio from text.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn synthesize(&self, text: &str) -> PortResult<Vec<u8>>;
}
