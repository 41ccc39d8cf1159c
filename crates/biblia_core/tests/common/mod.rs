#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use biblia_core::ports::{KeyValueStorage, PortResult, SessionProvider};

/// In-memory stand-in for the device key/value store.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> PortResult<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Session provider whose answer can be flipped mid-test to simulate
/// logging in and out.
#[derive(Default)]
pub struct StubSessions {
    user: Mutex<Option<Uuid>>,
}

impl StubSessions {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user: Uuid) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn set_user(&self, user: Option<Uuid>) {
        *self.user.lock().unwrap() = user;
    }
}

#[async_trait]
impl SessionProvider for StubSessions {
    async fn current_user(&self) -> Option<Uuid> {
        *self.user.lock().unwrap()
    }
}
