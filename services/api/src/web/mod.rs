pub mod ai;
pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the handlers the binary wires into the router.
pub use middleware::require_auth;
pub use rest::{
    delete_note_handler, get_chapter_handler, list_notes_handler, list_versions_handler,
    plan_handler, plan_sections_handler, search_handler, toggle_day_handler, upsert_note_handler,
};
