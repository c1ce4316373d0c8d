use std::sync::Mutex;

use crate::infra::{contracts::IdentityStore, error::AppError};

/// Identity store that never touches the filesystem.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    id: Mutex<Option<String>>,
}

impl InMemoryIdentityStore {
    pub fn with_id(id: &str) -> Self {
        Self {
            id: Mutex::new(Some(id.to_owned())),
        }
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn load_or_create(&self) -> Result<String, AppError> {
        let mut id = self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone())
    }

    fn clear(&self) -> Result<bool, AppError> {
        let mut id = self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(id.take().is_some())
    }
}
