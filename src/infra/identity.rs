use std::{fs, io, path::PathBuf};

use uuid::Uuid;

use crate::infra::{contracts::IdentityStore, error::AppError};

/// Keeps the client identifier in a single file under the state directory.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_valid(&self) -> Result<Option<String>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.access_error(source)),
        };

        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(Some(id.to_string())),
            Err(_) => {
                tracing::warn!(
                    code = "CLIENT_ID_INVALID",
                    path = %self.path.display(),
                    "stored client id is not a valid identifier; generating a new one"
                );
                Ok(None)
            }
        }
    }

    fn access_error(&self, source: io::Error) -> AppError {
        AppError::IdentityAccess {
            path: self.path.clone(),
            source,
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load_or_create(&self) -> Result<String, AppError> {
        if let Some(id) = self.read_valid()? {
            return Ok(id);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.access_error(source))?;
        }

        let id = Uuid::new_v4().to_string();
        fs::write(&self.path, &id).map_err(|source| self.access_error(source))?;
        tracing::info!(code = "CLIENT_ID_CREATED", "generated a new client id");

        Ok(id)
    }

    fn clear(&self) -> Result<bool, AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.access_error(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> FileIdentityStore {
        FileIdentityStore::new(dir.path().join("state").join("client_id"))
    }

    #[test]
    fn creates_identifier_once_and_reuses_it() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);

        let first = store.load_or_create().expect("id should be created");
        let second = store.load_or_create().expect("id should be reused");

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn replaces_invalid_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        fs::create_dir_all(dir.path().join("state")).expect("state dir");
        fs::write(dir.path().join("state").join("client_id"), "   not-an-id\n")
            .expect("write garbage");

        let id = store.load_or_create().expect("id should be regenerated");

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(
            fs::read_to_string(dir.path().join("state").join("client_id")).expect("read back"),
            id
        );
    }

    #[test]
    fn clear_removes_identifier() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let first = store.load_or_create().expect("id should be created");

        assert!(store.clear().expect("clear should succeed"));
        assert!(!store.clear().expect("second clear should succeed"));

        let second = store.load_or_create().expect("id should be recreated");
        assert_ne!(first, second);
    }
}
