use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::StoreError;

/// One row of the user store. The on-disk column is named `password` but it
/// holds an argon2 PHC string (PHC strings contain commas, so all I/O goes
/// through the csv layer, which quotes as needed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub student_id: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Append-only, keyed user store over a delimited file. The single writer
/// lock is what preserves student_id uniqueness under concurrent requests.
pub struct UserStore {
    path: PathBuf,
    inner: Mutex<HashMap<String, UserRecord>>,
}

impl UserStore {
    /// Opens the store, creating the file with its header if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let file = OpenOptions::new().create(true).write(true).open(&path)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(["student_id", "email", "password"])?;
            writer.flush()?;
            info!(path = %path.display(), "created empty user store");
        }

        let mut users = HashMap::new();
        let mut reader = csv::Reader::from_path(&path)?;
        for record in reader.deserialize() {
            let record: UserRecord = record?;
            users.insert(record.student_id.clone(), record);
        }
        debug!(path = %path.display(), count = users.len(), "user store loaded");

        Ok(Self {
            path,
            inner: Mutex::new(users),
        })
    }

    pub fn find(&self, student_id: &str) -> Option<UserRecord> {
        self.inner
            .lock()
            .expect("user store lock poisoned")
            .get(student_id)
            .cloned()
    }

    /// Duplicate check, file append and map insert happen under one lock
    /// acquisition; the map is only updated after the append has flushed.
    pub fn create(
        &self,
        student_id: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.inner.lock().expect("user store lock poisoned");
        if users.contains_key(student_id) {
            return Err(StoreError::DuplicateId);
        }

        let record = UserRecord {
            student_id: student_id.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(&record)?;
        writer.flush()?;

        users.insert(record.student_id.clone(), record.clone());
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("user store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
