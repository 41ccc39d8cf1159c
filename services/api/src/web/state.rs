//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::adapters::{DbAdapter, TokenSessionProvider};
use crate::config::Config;
use biblia_core::notes::HybridNoteStore;
use biblia_core::plan::DayPlanEntry;
use biblia_core::ports::{
    CommentaryService, KeyValueStorage, NoteBackend, ScriptureRepository, SpeechService,
};
use biblia_core::progress::PlanProgressStore;
use biblia_core::versions::VersionCatalog;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// `db` is `None` in offline mode; everything that needs the database either
/// degrades (notes route local, versions serve the fallback) or answers 503
/// (accounts, scripture text).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Option<Arc<DbAdapter>>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub local_notes: Arc<dyn NoteBackend>,
    pub commentary: Option<Arc<dyn CommentaryService>>,
    pub speech: Option<Arc<dyn SpeechService>>,
    pub versions: VersionCatalog,
    pub progress: PlanProgressStore,
    /// The full reading plan, generated once at startup from the static
    /// chronological block table.
    pub plan: Arc<Vec<DayPlanEntry>>,
}

impl AppState {
    /// Builds the hybrid note store for one request. The store re-checks the
    /// session on every operation, so it is assembled fresh per request from
    /// the request's cookie token; the backends themselves are shared.
    pub fn note_store(&self, session_token: Option<String>) -> HybridNoteStore {
        let sessions = Arc::new(TokenSessionProvider::new(session_token, self.db.clone()));
        let cloud = self
            .db
            .clone()
            .map(|db| db as Arc<dyn NoteBackend>);
        HybridNoteStore::new(Arc::clone(&self.local_notes), cloud, sessions)
    }

    pub fn scripture(&self) -> Option<Arc<dyn ScriptureRepository>> {
        self.db.clone().map(|db| db as Arc<dyn ScriptureRepository>)
    }
}
