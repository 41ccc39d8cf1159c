//! crates/biblia_core/src/versions.rs
//!
//! Read-through cache for the bible-versions reference table. The catalog is
//! small and changes rarely, so reads go through a timestamp-gated cache in
//! the key/value port. When the backend is unreachable or unconfigured the
//! catalog degrades to the cache, then to a built-in fallback entry. The
//! fallback is never persisted, so a degraded build cannot stick.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::BibleVersion;
use crate::ports::{KeyValueStorage, ScriptureRepository};

/// Storage key for the cached catalog payload.
pub const VERSIONS_CACHE_KEY: &str = "bibleapp:bible_versions:v2";

/// Cache freshness window: 6 hours.
pub const VERSIONS_CACHE_TTL_MS: i64 = 1000 * 60 * 60 * 6;

#[derive(Serialize, Deserialize)]
struct CachePayload {
    saved_at: i64,
    data: Vec<BibleVersion>,
}

fn fallback_versions() -> Vec<BibleVersion> {
    vec![BibleVersion {
        id: "local-ara".to_string(),
        code: "ARA".to_string(),
        name: Some("ARA".to_string()),
        sort_order: Some(1),
        is_active: Some(true),
    }]
}

#[derive(Clone)]
pub struct VersionCatalog {
    storage: Arc<dyn KeyValueStorage>,
    repository: Option<Arc<dyn ScriptureRepository>>,
}

impl VersionCatalog {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        repository: Option<Arc<dyn ScriptureRepository>>,
    ) -> Self {
        Self {
            storage,
            repository,
        }
    }

    /// Lists the active versions. Total: every failure path degrades to the
    /// cache or the fallback instead of erroring.
    pub async fn list(&self) -> Vec<BibleVersion> {
        let cached = self.read_cache().await;

        let Some(repository) = &self.repository else {
            return cached.unwrap_or_else(fallback_versions);
        };

        match repository.list_versions().await {
            Ok(rows) => {
                let safe: Vec<BibleVersion> = rows
                    .into_iter()
                    .filter(|v| !v.id.is_empty() && !v.code.is_empty())
                    .collect();
                if safe.is_empty() {
                    return cached.unwrap_or_else(fallback_versions);
                }
                self.write_cache(&safe).await;
                safe
            }
            Err(_) => cached.unwrap_or_else(fallback_versions),
        }
    }

    /// Resolves a version id by its code (case-insensitive). Falls back to
    /// the first catalog entry when the code is unknown or absent.
    pub async fn resolve(&self, code: Option<&str>) -> Option<BibleVersion> {
        let versions = self.list().await;
        match code {
            Some(code) => versions
                .iter()
                .find(|v| v.code.eq_ignore_ascii_case(code))
                .cloned()
                .or_else(|| versions.first().cloned()),
            None => versions.first().cloned(),
        }
    }

    pub async fn invalidate(&self) {
        let _ = self.storage.remove_item(VERSIONS_CACHE_KEY).await;
    }

    /// Returns the cached catalog only while it is still fresh; a stale or
    /// malformed payload reads as absent.
    async fn read_cache(&self) -> Option<Vec<BibleVersion>> {
        let raw = self.storage.get_item(VERSIONS_CACHE_KEY).await.ok()??;
        let payload: CachePayload = serde_json::from_str(&raw).ok()?;
        if payload.saved_at <= 0 {
            return None;
        }
        let age = Utc::now().timestamp_millis() - payload.saved_at;
        if age > VERSIONS_CACHE_TTL_MS {
            return None;
        }
        Some(payload.data)
    }

    // Cache writes are best-effort; a failed write only costs a re-fetch.
    async fn write_cache(&self, data: &[BibleVersion]) {
        let payload = CachePayload {
            saved_at: Utc::now().timestamp_millis(),
            data: data.to_vec(),
        };
        if let Ok(encoded) = serde_json::to_string(&payload) {
            let _ = self.storage.set_item(VERSIONS_CACHE_KEY, &encoded).await;
        }
    }
}
