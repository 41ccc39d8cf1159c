//! crates/biblia_core/src/notes.rs
//!
//! The hybrid note store: one `list`/`upsert`/`delete` surface that decides,
//! fresh on every call, whether a saved note lives in the local key/value
//! store or in the remote table. Callers never branch on configuration
//! themselves; they receive the routing mode back so the UI can say
//! "saved locally" vs "saved to account".

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{NoteDraft, SavedNote};
use crate::ports::{KeyValueStorage, NoteBackend, PortError, PortResult, SessionProvider};

/// Storage key holding the local JSON array of notes.
pub const LOCAL_NOTES_KEY: &str = "bibleApp:saved_notes:v1";

/// Which storage location handled an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Cloud,
    Local,
}

/// Result of `list`: the notes plus where they came from.
#[derive(Debug, Serialize)]
pub struct NoteListing {
    pub mode: StorageMode,
    pub notes: Vec<SavedNote>,
}

/// Result of `upsert`: the stored note plus where it went.
#[derive(Debug, Serialize)]
pub struct NoteWrite {
    pub mode: StorageMode,
    pub note: SavedNote,
}

/// Parses an id that must be representable as the remote table's bigint key.
pub fn parse_cloud_id(id: &str) -> Option<i64> {
    id.trim().parse::<i64>().ok()
}

//=========================================================================================
// Local backend
//=========================================================================================

/// Note storage for anonymous/offline mode: one JSON-encoded array under a
/// fixed key. The `user` argument of the port is ignored; local notes belong
/// to the device, not an account.
pub struct LocalNoteBackend {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalNoteBackend {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    async fn load(&self) -> PortResult<Vec<SavedNote>> {
        let raw = self.storage.get_item(LOCAL_NOTES_KEY).await?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        // A corrupt or non-array payload reads as empty instead of erroring.
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    async fn save(&self, notes: &[SavedNote]) -> PortResult<()> {
        let encoded =
            serde_json::to_string(notes).map_err(|e| PortError::Storage(e.to_string()))?;
        self.storage.set_item(LOCAL_NOTES_KEY, &encoded).await
    }
}

#[async_trait::async_trait]
impl NoteBackend for LocalNoteBackend {
    async fn list_notes(&self, _user: Option<Uuid>) -> PortResult<Vec<SavedNote>> {
        self.load().await
    }

    async fn upsert_note(&self, _user: Option<Uuid>, draft: NoteDraft) -> PortResult<SavedNote> {
        let mut notes = self.load().await?;
        let now = Utc::now();

        // New local notes get a timestamp-derived id when none is supplied.
        let id = draft
            .id
            .unwrap_or_else(|| now.timestamp_millis().to_string());

        let existing = notes.iter().position(|n| n.id == id);
        let created_at = draft
            .created_at
            .or_else(|| existing.map(|i| notes[i].created_at))
            .unwrap_or(now);

        let updated = SavedNote {
            id,
            title: draft.title,
            content: draft.content,
            reference: draft.reference,
            created_at,
            updated_at: Some(now),
        };

        match existing {
            Some(i) => notes[i] = updated.clone(),
            None => notes.insert(0, updated.clone()),
        }

        self.save(&notes).await?;
        Ok(updated)
    }

    async fn delete_note(&self, _user: Option<Uuid>, id: &str) -> PortResult<()> {
        let mut notes = self.load().await?;
        notes.retain(|n| n.id != id);
        self.save(&notes).await
    }
}

//=========================================================================================
// Hybrid store
//=========================================================================================

/// Routes every operation to the cloud backend when one is configured AND an
/// authenticated session currently exists; otherwise to the local backend.
///
/// The decision is re-evaluated on each call, never cached: logging out (or a
/// session expiring) flips the very next call back to local. Configuration
/// gaps fall back silently; errors from a chosen backend propagate unchanged.
/// The two locations are deliberately never reconciled: notes written in one
/// mode do not follow the user into the other.
pub struct HybridNoteStore {
    local: Arc<dyn NoteBackend>,
    cloud: Option<Arc<dyn NoteBackend>>,
    sessions: Arc<dyn SessionProvider>,
}

impl HybridNoteStore {
    pub fn new(
        local: Arc<dyn NoteBackend>,
        cloud: Option<Arc<dyn NoteBackend>>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            local,
            cloud,
            sessions,
        }
    }

    async fn route(&self) -> (StorageMode, Arc<dyn NoteBackend>, Option<Uuid>) {
        if let Some(cloud) = &self.cloud {
            if let Some(user) = self.sessions.current_user().await {
                return (StorageMode::Cloud, Arc::clone(cloud), Some(user));
            }
        }
        (StorageMode::Local, Arc::clone(&self.local), None)
    }

    pub async fn list(&self) -> PortResult<NoteListing> {
        let (mode, backend, user) = self.route().await;
        let notes = backend.list_notes(user).await?;
        Ok(NoteListing { mode, notes })
    }

    pub async fn upsert(&self, draft: NoteDraft) -> PortResult<NoteWrite> {
        let (mode, backend, user) = self.route().await;
        let note = backend.upsert_note(user, draft).await?;
        Ok(NoteWrite { mode, note })
    }

    pub async fn delete(&self, id: &str) -> PortResult<StorageMode> {
        let (mode, backend, user) = self.route().await;
        // The remote key is a bigint; a non-numeric id in cloud mode is the
        // caller's mistake, not a silent no-op.
        if mode == StorageMode::Cloud && parse_cloud_id(id).is_none() {
            return Err(PortError::InvalidId(format!(
                "'{id}' is not a valid cloud note id"
            )));
        }
        backend.delete_note(user, id).await?;
        Ok(mode)
    }
}
