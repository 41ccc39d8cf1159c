mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use biblia_core::domain::{NoteDraft, SavedNote};
use biblia_core::notes::{
    parse_cloud_id, HybridNoteStore, LocalNoteBackend, StorageMode, LOCAL_NOTES_KEY,
};
use biblia_core::ports::{NoteBackend, PortError, PortResult};

use common::{MemoryStorage, StubSessions};

/// In-memory stand-in for the remote `saved_notes` table: bigint ids,
/// newest-first listing, rows scoped to their owning user.
#[derive(Default)]
struct CloudStub {
    rows: Mutex<Vec<(Uuid, SavedNote)>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl NoteBackend for CloudStub {
    async fn list_notes(&self, user: Option<Uuid>) -> PortResult<Vec<SavedNote>> {
        let user = user.ok_or(PortError::Unauthorized)?;
        let mut notes: Vec<SavedNote> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, note)| note.clone())
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn upsert_note(&self, user: Option<Uuid>, draft: NoteDraft) -> PortResult<SavedNote> {
        let user = user.ok_or(PortError::Unauthorized)?;
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();

        let supplied = draft.id.as_deref().and_then(parse_cloud_id);
        if let Some(id) = supplied {
            let key = id.to_string();
            if let Some((_, existing)) = rows
                .iter_mut()
                .find(|(owner, note)| *owner == user && note.id == key)
            {
                existing.title = draft.title;
                existing.content = draft.content;
                existing.reference = draft.reference;
                existing.updated_at = Some(now);
                return Ok(existing.clone());
            }
        }

        let id = supplied.unwrap_or_else(|| {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        });
        let note = SavedNote {
            id: id.to_string(),
            title: draft.title,
            content: draft.content,
            reference: draft.reference,
            created_at: draft.created_at.unwrap_or(now),
            updated_at: None,
        };
        rows.push((user, note.clone()));
        Ok(note)
    }

    async fn delete_note(&self, user: Option<Uuid>, id: &str) -> PortResult<()> {
        let user = user.ok_or(PortError::Unauthorized)?;
        self.rows
            .lock()
            .unwrap()
            .retain(|(owner, note)| *owner != user || note.id != id);
        Ok(())
    }
}

/// Backend that always fails, for asserting error propagation.
struct BrokenBackend;

#[async_trait]
impl NoteBackend for BrokenBackend {
    async fn list_notes(&self, _user: Option<Uuid>) -> PortResult<Vec<SavedNote>> {
        Err(PortError::Backend("connection refused".to_string()))
    }

    async fn upsert_note(&self, _user: Option<Uuid>, _draft: NoteDraft) -> PortResult<SavedNote> {
        Err(PortError::Backend("connection refused".to_string()))
    }

    async fn delete_note(&self, _user: Option<Uuid>, _id: &str) -> PortResult<()> {
        Err(PortError::Backend("connection refused".to_string()))
    }
}

fn draft(title: &str, content: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: content.to_string(),
        ..NoteDraft::default()
    }
}

struct Fixture {
    storage: Arc<MemoryStorage>,
    sessions: Arc<StubSessions>,
    store: HybridNoteStore,
}

fn fixture(cloud: Option<Arc<dyn NoteBackend>>, sessions: StubSessions) -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    let sessions = Arc::new(sessions);
    let store = HybridNoteStore::new(
        Arc::new(LocalNoteBackend::new(storage.clone())),
        cloud,
        sessions.clone(),
    );
    Fixture {
        storage,
        sessions,
        store,
    }
}

#[tokio::test]
async fn unconfigured_cloud_always_routes_local_and_never_errors() {
    let fx = fixture(None, StubSessions::anonymous());

    let listing = fx.store.list().await.unwrap();
    assert_eq!(listing.mode, StorageMode::Local);
    assert!(listing.notes.is_empty());

    let write = fx.store.upsert(draft("Estudo", "corpo")).await.unwrap();
    assert_eq!(write.mode, StorageMode::Local);

    let mode = fx.store.delete(&write.note.id).await.unwrap();
    assert_eq!(mode, StorageMode::Local);
}

#[tokio::test]
async fn local_upsert_then_list_round_trips() {
    let fx = fixture(None, StubSessions::anonymous());

    let write = fx
        .store
        .upsert(draft("Gênesis 1", "{\"theme\":\"Criação\"}"))
        .await
        .unwrap();

    let listing = fx.store.list().await.unwrap();
    assert_eq!(listing.notes.len(), 1);
    let note = &listing.notes[0];
    assert_eq!(note.id, write.note.id);
    assert_eq!(note.title, "Gênesis 1");
    assert_eq!(note.content, "{\"theme\":\"Criação\"}");

    // Offline notes receive a timestamp-derived string id and an ISO-format
    // creation timestamp on the wire.
    assert!(!note.id.is_empty());
    let raw = fx.storage.raw(LOCAL_NOTES_KEY).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(rows[0]["id"].is_string());
    let created_at = rows[0]["created_at"].as_str().unwrap();
    assert!(created_at.contains('T'), "expected ISO timestamp, got {created_at}");
}

#[tokio::test]
async fn repeated_upsert_replaces_in_place_and_keeps_created_at() {
    let fx = fixture(None, StubSessions::anonymous());

    let first = fx.store.upsert(draft("v1", "um")).await.unwrap().note;
    let mut edit = draft("v2", "dois");
    edit.id = Some(first.id.clone());
    let second = fx.store.upsert(edit).await.unwrap().note;

    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at.is_some());

    let listing = fx.store.list().await.unwrap();
    let matching: Vec<_> = listing.notes.iter().filter(|n| n.id == first.id).collect();
    assert_eq!(matching.len(), 1, "no duplicate entry for the id");
    assert_eq!(matching[0].title, "v2");
}

#[tokio::test]
async fn new_local_notes_are_prepended_newest_first() {
    let fx = fixture(None, StubSessions::anonymous());

    let mut older = draft("antiga", "a");
    older.id = Some("old".to_string());
    fx.store.upsert(older).await.unwrap();
    let mut newer = draft("nova", "b");
    newer.id = Some("new".to_string());
    fx.store.upsert(newer).await.unwrap();

    let listing = fx.store.list().await.unwrap();
    let ids: Vec<&str> = listing.notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old"]);
}

#[tokio::test]
async fn delete_removes_the_note_everywhere_it_lists() {
    let fx = fixture(None, StubSessions::anonymous());

    let kept = fx.store.upsert(draft("fica", "a")).await.unwrap().note;
    let gone = fx.store.upsert(draft("sai", "b")).await.unwrap().note;

    fx.store.delete(&gone.id).await.unwrap();
    let listing = fx.store.list().await.unwrap();
    assert!(listing.notes.iter().all(|n| n.id != gone.id));
    assert!(listing.notes.iter().any(|n| n.id == kept.id));
}

#[tokio::test]
async fn authenticated_session_with_cloud_routes_to_cloud() {
    let user = Uuid::new_v4();
    let fx = fixture(
        Some(Arc::new(CloudStub::default())),
        StubSessions::logged_in(user),
    );

    let write = fx.store.upsert(draft("na conta", "c")).await.unwrap();
    assert_eq!(write.mode, StorageMode::Cloud);
    assert!(parse_cloud_id(&write.note.id).is_some());

    let listing = fx.store.list().await.unwrap();
    assert_eq!(listing.mode, StorageMode::Cloud);
    assert_eq!(listing.notes.len(), 1);

    // Nothing leaked into local storage.
    assert!(fx.storage.raw(LOCAL_NOTES_KEY).is_none());
}

#[tokio::test]
async fn missing_session_routes_local_even_with_cloud_configured() {
    let fx = fixture(
        Some(Arc::new(CloudStub::default())),
        StubSessions::anonymous(),
    );

    let write = fx.store.upsert(draft("anônimo", "c")).await.unwrap();
    assert_eq!(write.mode, StorageMode::Local);
}

#[tokio::test]
async fn routing_is_reevaluated_on_every_call() {
    let user = Uuid::new_v4();
    let fx = fixture(
        Some(Arc::new(CloudStub::default())),
        StubSessions::anonymous(),
    );

    assert_eq!(fx.store.list().await.unwrap().mode, StorageMode::Local);

    fx.sessions.set_user(Some(user));
    assert_eq!(fx.store.list().await.unwrap().mode, StorageMode::Cloud);

    fx.sessions.set_user(None);
    assert_eq!(fx.store.list().await.unwrap().mode, StorageMode::Local);
}

#[tokio::test]
async fn cloud_delete_rejects_non_numeric_ids_client_side() {
    let user = Uuid::new_v4();
    let fx = fixture(
        Some(Arc::new(CloudStub::default())),
        StubSessions::logged_in(user),
    );

    let err = fx.store.delete("1691234567890abc").await.unwrap_err();
    assert!(matches!(err, PortError::InvalidId(_)));
}

#[tokio::test]
async fn cloud_errors_propagate_unchanged() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(Arc::new(BrokenBackend)), StubSessions::logged_in(user));

    let err = fx.store.list().await.unwrap_err();
    assert!(matches!(err, PortError::Backend(_)));
}

// Switching modes must not migrate notes in either direction. This is the
// product's documented non-behavior, asserted so nobody "fixes" it silently.
#[tokio::test]
async fn logging_in_does_not_migrate_local_notes() {
    let user = Uuid::new_v4();
    let fx = fixture(
        Some(Arc::new(CloudStub::default())),
        StubSessions::anonymous(),
    );

    let offline = fx.store.upsert(draft("offline", "o")).await.unwrap().note;

    fx.sessions.set_user(Some(user));
    let cloud_listing = fx.store.list().await.unwrap();
    assert_eq!(cloud_listing.mode, StorageMode::Cloud);
    assert!(cloud_listing.notes.iter().all(|n| n.id != offline.id));

    fx.store.upsert(draft("online", "c")).await.unwrap();

    fx.sessions.set_user(None);
    let local_listing = fx.store.list().await.unwrap();
    assert_eq!(local_listing.mode, StorageMode::Local);
    assert_eq!(local_listing.notes.len(), 1);
    assert_eq!(local_listing.notes[0].id, offline.id);
}

#[tokio::test]
async fn corrupt_local_payload_reads_as_empty() {
    let fx = fixture(None, StubSessions::anonymous());
    fx.storage.put_raw(LOCAL_NOTES_KEY, "{not json");

    let listing = fx.store.list().await.unwrap();
    assert!(listing.notes.is_empty());
}
