//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `ScriptureRepository`, `NoteBackend` and
//! `AccountRepository` ports from the `core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.
//!
//! Queries are runtime-checked (`query_as`/`query_scalar` with binds) so the
//! crate builds without a live database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use biblia_core::canon::Book;
use biblia_core::domain::{BibleVersion, NoteDraft, SavedNote, User, UserCredentials, Verse};
use biblia_core::notes::parse_cloud_id;
use biblia_core::ports::{
    AccountRepository, NoteBackend, PortError, PortResult, ScriptureRepository, SessionProvider,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter implementing the scripture, cloud-note and account ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Backend(e.to_string())
}

fn parse_version_id(version_id: &str) -> PortResult<Uuid> {
    Uuid::parse_str(version_id)
        .map_err(|_| PortError::InvalidId(format!("'{version_id}' is not a version id")))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct VersionRecord {
    id: Uuid,
    code: String,
    name: Option<String>,
    sort_order: Option<i32>,
    is_active: Option<bool>,
}
impl VersionRecord {
    fn to_domain(self) -> BibleVersion {
        BibleVersion {
            id: self.id.to_string(),
            code: self.code,
            name: self.name,
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}

#[derive(FromRow)]
struct VerseRecord {
    book: i32,
    chapter: i32,
    verse: i32,
    text: String,
}
impl VerseRecord {
    fn to_domain(self) -> PortResult<Verse> {
        let book = Book::from_number(self.book as u16)
            .ok_or_else(|| PortError::Unexpected(format!("unknown book number {}", self.book)))?;
        Ok(Verse {
            book,
            chapter: self.chapter as u32,
            verse: self.verse as u32,
            text: self.text,
        })
    }
}

#[derive(FromRow)]
struct NoteRecord {
    id: i64,
    title: String,
    content: String,
    reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}
impl NoteRecord {
    fn to_domain(self) -> SavedNote {
        SavedNote {
            id: self.id.to_string(),
            title: self.title,
            content: self.content,
            reference: self.reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

//=========================================================================================
// `ScriptureRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScriptureRepository for DbAdapter {
    async fn list_versions(&self) -> PortResult<Vec<BibleVersion>> {
        let records = sqlx::query_as::<_, VersionRecord>(
            "SELECT id, code, name, sort_order, is_active
             FROM bible_versions
             WHERE is_active = TRUE
             ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_chapter(
        &self,
        version_id: &str,
        book: Book,
        chapter: u32,
    ) -> PortResult<Vec<Verse>> {
        let version_id = parse_version_id(version_id)?;
        let records = sqlx::query_as::<_, VerseRecord>(
            "SELECT book, chapter, verse, text
             FROM bible_verses
             WHERE version_id = $1 AND book = $2 AND chapter = $3
             ORDER BY verse ASC",
        )
        .bind(version_id)
        .bind(book.number() as i32)
        .bind(chapter as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn search_verses(
        &self,
        version_id: &str,
        query: &str,
        limit: u32,
    ) -> PortResult<Vec<Verse>> {
        let version_id = parse_version_id(version_id)?;
        let records = sqlx::query_as::<_, VerseRecord>(
            "SELECT book, chapter, verse, text
             FROM bible_verses
             WHERE version_id = $1
               AND text_tsv @@ websearch_to_tsquery('portuguese', $2)
             ORDER BY book ASC, chapter ASC, verse ASC
             LIMIT $3",
        )
        .bind(version_id)
        .bind(query)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}

//=========================================================================================
// `NoteBackend` Trait Implementation (the cloud half of the hybrid store)
//=========================================================================================

#[async_trait]
impl NoteBackend for DbAdapter {
    async fn list_notes(&self, user: Option<Uuid>) -> PortResult<Vec<SavedNote>> {
        let user = user.ok_or(PortError::Unauthorized)?;
        let records = sqlx::query_as::<_, NoteRecord>(
            "SELECT id, title, content, reference, created_at, updated_at
             FROM saved_notes
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn upsert_note(&self, user: Option<Uuid>, draft: NoteDraft) -> PortResult<SavedNote> {
        let user = user.ok_or(PortError::Unauthorized)?;

        // A non-numeric id cannot address a bigint row; omit it and let the
        // database mint a fresh id instead.
        let supplied_id = draft.id.as_deref().and_then(parse_cloud_id);

        let record = match supplied_id {
            Some(id) => {
                let found = sqlx::query_as::<_, NoteRecord>(
                    "INSERT INTO saved_notes (id, user_id, title, content, reference, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, COALESCE($6, now()), now())
                     ON CONFLICT (id) DO UPDATE
                         SET title = EXCLUDED.title,
                             content = EXCLUDED.content,
                             reference = EXCLUDED.reference,
                             updated_at = now()
                         WHERE saved_notes.user_id = EXCLUDED.user_id
                     RETURNING id, title, content, reference, created_at, updated_at",
                )
                .bind(id)
                .bind(user)
                .bind(&draft.title)
                .bind(&draft.content)
                .bind(&draft.reference)
                .bind(draft.created_at)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
                // The guarded upsert returns no row when the id belongs to
                // another account.
                found.ok_or(PortError::Unauthorized)?
            }
            None => sqlx::query_as::<_, NoteRecord>(
                "INSERT INTO saved_notes (user_id, title, content, reference, created_at)
                 VALUES ($1, $2, $3, $4, COALESCE($5, now()))
                 RETURNING id, title, content, reference, created_at, updated_at",
            )
            .bind(user)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(&draft.reference)
            .bind(draft.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?,
        };

        Ok(record.to_domain())
    }

    async fn delete_note(&self, user: Option<Uuid>, id: &str) -> PortResult<()> {
        let user = user.ok_or(PortError::Unauthorized)?;
        let id = parse_cloud_id(id)
            .ok_or_else(|| PortError::InvalidId(format!("'{id}' is not a valid cloud note id")))?;

        sqlx::query("DELETE FROM saved_notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `AccountRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountRepository for DbAdapter {
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, hashed_password) VALUES ($1, $2) RETURNING user_id, email",
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Backend("email is already registered".to_string())
            }
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("user {email} not found")),
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("user {user_id} not found")),
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// Session probe for the hybrid note store
//=========================================================================================

/// `SessionProvider` backed by the auth-sessions table: holds one request's
/// cookie token and validates it against the database on every probe, so the
/// hybrid store's routing decision is always fresh. Any failure (no token, no
/// database, expired session) reads as anonymous.
pub struct TokenSessionProvider {
    token: Option<String>,
    accounts: Option<Arc<DbAdapter>>,
}

impl TokenSessionProvider {
    pub fn new(token: Option<String>, accounts: Option<Arc<DbAdapter>>) -> Self {
        Self { token, accounts }
    }
}

#[async_trait]
impl SessionProvider for TokenSessionProvider {
    async fn current_user(&self) -> Option<Uuid> {
        let token = self.token.as_deref()?;
        let accounts = self.accounts.as_ref()?;
        accounts.validate_auth_session(token).await.ok()
    }
}
