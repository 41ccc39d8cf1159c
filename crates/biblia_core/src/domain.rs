//! crates/biblia_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canon::Book;

/// A saved study note.
///
/// A note lives either in the local key/value store (anonymous mode) or in
/// the remote `saved_notes` table (cloud mode). Ids are strings on the wire:
/// local ids are free-form, cloud ids are the decimal rendering of a bigint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNote {
    pub id: String,
    pub title: String,
    /// Often a JSON-encoded analysis object, but treated as opaque text here.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The caller-supplied shape of a note about to be saved.
///
/// `id` and `created_at` are optional: a backend fills them in on first
/// creation (timestamp-derived id locally, server-generated id in the cloud).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteDraft {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub reference: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A single verse of scripture text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verse {
    pub book: Book,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// A row of the bible-versions reference table.
///
/// Ids are strings rather than UUIDs because the built-in offline fallback
/// entry uses a non-UUID id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibleVersion {
    pub id: String,
    pub code: String,
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

// Represents a user - used throughout the app.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
