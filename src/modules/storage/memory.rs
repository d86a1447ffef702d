//! In-memory photo storage used by service and HTTP tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::PhotoStorage;
use crate::core::error::AppError;

#[derive(Default)]
pub(crate) struct InMemoryPhotoStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_saves: AtomicBool,
    fail_deletes: AtomicBool,
    delete_calls: AtomicUsize,
}

impl InMemoryPhotoStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.objects.lock().unwrap().contains_key(name)
    }
}

#[async_trait]
impl PhotoStorage for InMemoryPhotoStorage {
    async fn save(&self, name: &str, data: &[u8], _content_type: &str) -> Result<(), AppError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.objects.lock().unwrap().get(name).cloned())
    }

    async fn delete(&self, name: &str) -> Result<bool, AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("permission denied".to_string()));
        }
        Ok(self.objects.lock().unwrap().remove(name).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
