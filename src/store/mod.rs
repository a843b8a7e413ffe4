//! Keyed identifier store.
//!
//! A small table of well-known string keys shared by the session, the wizard and
//! the result views. The medium is abstracted behind [`StorageBackend`] so the
//! same store runs on a JSON state file or purely in memory.

mod file;
mod memory;

pub use file::{app_dir, FileBackend};
pub use memory::MemoryBackend;

use crate::error::StoreError;
use crate::model::{Session, Theme};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Well-known keys, named exactly as they appear in the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    User,
    UserId,
    ResumeId,
    JobId,
    CoverLetterId,
    EmailId,
    CoverLetterGenerated,
    ColdEmailGenerated,
    Theme,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::User => "user",
            StoreKey::UserId => "userId",
            StoreKey::ResumeId => "resumeId",
            StoreKey::JobId => "jobId",
            StoreKey::CoverLetterId => "cover_letterId",
            StoreKey::EmailId => "emailId",
            StoreKey::CoverLetterGenerated => "coverletter_gen",
            StoreKey::ColdEmailGenerated => "coldemail_gen",
            StoreKey::Theme => "ui-theme",
        }
    }

    /// Keys discarded on logout. The theme preference survives.
    pub const SESSION_SCOPE: [StoreKey; 8] = [
        StoreKey::User,
        StoreKey::UserId,
        StoreKey::ResumeId,
        StoreKey::JobId,
        StoreKey::CoverLetterId,
        StoreKey::EmailId,
        StoreKey::CoverLetterGenerated,
        StoreKey::ColdEmailGenerated,
    ];
}

/// Durable medium for the store's key/value table.
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError>;
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError>;
}

/// Process-wide keyed store. Cheap to clone; all clones share one table.
#[derive(Clone)]
pub struct KeyedStore {
    inner: Arc<Inner>,
}

struct Inner {
    entries: Mutex<BTreeMap<String, String>>,
    backend: Box<dyn StorageBackend>,
}

impl KeyedStore {
    /// Open the store, loading whatever the backend already holds.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self, StoreError> {
        let entries = backend.load()?;
        tracing::debug!(keys = entries.len(), "keyed store loaded");
        Ok(Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(entries),
                backend,
            }),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(BTreeMap::new()),
                backend: Box::new(MemoryBackend::default()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned table is still a valid table; last write wins per key.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: StoreKey) -> Option<String> {
        self.lock().get(key.as_str()).cloned()
    }

    /// Apply `change` to a copy of the table and keep it only if the backend accepts it.
    fn commit<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.lock();
        let mut staged = entries.clone();
        if !change(&mut staged) {
            return Ok(());
        }
        self.inner.backend.persist(&staged)?;
        *entries = staged;
        Ok(())
    }

    pub fn set(&self, key: StoreKey, value: impl Into<String>) -> Result<(), StoreError> {
        self.set_all(&[(key, value.into())])
    }

    /// Write several keys as one persisted change.
    pub fn set_all(&self, pairs: &[(StoreKey, String)]) -> Result<(), StoreError> {
        tracing::debug!(keys = pairs.len(), "store write");
        self.commit(|entries| {
            for (key, value) in pairs {
                entries.insert(key.as_str().to_string(), value.clone());
            }
            true
        })
    }

    pub fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.remove_all(&[key])
    }

    pub fn remove_all(&self, keys: &[StoreKey]) -> Result<(), StoreError> {
        self.commit(|entries| {
            let mut changed = false;
            for key in keys {
                changed |= entries.remove(key.as_str()).is_some();
            }
            if changed {
                tracing::debug!(keys = keys.len(), "store remove");
            }
            changed
        })
    }

    /// Non-empty identifier under `key`. An empty string means "not applicable".
    pub fn id(&self, key: StoreKey) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn user_id(&self) -> Option<String> {
        self.id(StoreKey::UserId)
    }

    pub fn resume_id(&self) -> Option<String> {
        self.id(StoreKey::ResumeId)
    }

    pub fn job_id(&self) -> Option<String> {
        self.id(StoreKey::JobId)
    }

    pub fn cover_letter_id(&self) -> Option<String> {
        self.id(StoreKey::CoverLetterId)
    }

    pub fn email_id(&self) -> Option<String> {
        self.id(StoreKey::EmailId)
    }

    pub fn set_resume_id(&self, id: &str) -> Result<(), StoreError> {
        self.set(StoreKey::ResumeId, id)
    }

    pub fn set_job_id(&self, id: &str) -> Result<(), StoreError> {
        self.set(StoreKey::JobId, id)
    }

    pub fn set_cover_letter_id(&self, id: &str) -> Result<(), StoreError> {
        self.set_all(&[
            (StoreKey::CoverLetterId, id.to_string()),
            (StoreKey::CoverLetterGenerated, "true".to_string()),
        ])
    }

    pub fn set_email_id(&self, id: &str) -> Result<(), StoreError> {
        self.set_all(&[
            (StoreKey::EmailId, id.to_string()),
            (StoreKey::ColdEmailGenerated, "true".to_string()),
        ])
    }

    pub fn flag(&self, key: StoreKey) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    pub fn clear_generation_flags(&self) -> Result<(), StoreError> {
        self.remove_all(&[
            StoreKey::CoverLetterGenerated,
            StoreKey::ColdEmailGenerated,
        ])
    }

    /// Persisted session, if one is stored and still parses.
    pub fn session(&self) -> Option<Session> {
        let raw = self.get(StoreKey::User)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                None
            }
        }
    }

    pub fn set_session(&self, session: &Session) -> Result<(), StoreError> {
        let raw = serde_json::to_string(session)?;
        self.set_all(&[
            (StoreKey::User, raw),
            (StoreKey::UserId, session.id.clone()),
        ])
    }

    pub fn clear_session_scope(&self) -> Result<(), StoreError> {
        self.remove_all(&StoreKey::SESSION_SCOPE)
    }

    pub fn theme(&self) -> Theme {
        self.get(StoreKey::Theme)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.set(StoreKey::Theme, theme.as_str())
    }

    /// Snapshot of every stored key, for `whoami --json` and debugging.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Plan;

    fn session() -> Session {
        Session {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            avatar: None,
            plan: Plan::Pro,
        }
    }

    #[test]
    fn empty_ids_read_as_absent() {
        let store = KeyedStore::in_memory();
        store.set(StoreKey::JobId, "").unwrap();
        assert_eq!(store.get(StoreKey::JobId).as_deref(), Some(""));
        assert_eq!(store.job_id(), None);
    }

    #[test]
    fn generated_ids_raise_their_own_flag_only() {
        let store = KeyedStore::in_memory();
        store.set_cover_letter_id("cl1").unwrap();
        assert!(store.flag(StoreKey::CoverLetterGenerated));
        assert!(!store.flag(StoreKey::ColdEmailGenerated));

        store.set_email_id("e1").unwrap();
        assert_eq!(store.cover_letter_id().as_deref(), Some("cl1"));
        assert_eq!(store.email_id().as_deref(), Some("e1"));

        store.clear_generation_flags().unwrap();
        assert!(!store.flag(StoreKey::CoverLetterGenerated));
        assert!(!store.flag(StoreKey::ColdEmailGenerated));
        assert_eq!(store.cover_letter_id().as_deref(), Some("cl1"));
    }

    #[test]
    fn clearing_session_scope_keeps_theme() {
        let store = KeyedStore::in_memory();
        store.set_session(&session()).unwrap();
        store.set_resume_id("r1").unwrap();
        store.set_job_id("j1").unwrap();
        store.set_theme(Theme::Dark).unwrap();

        store.clear_session_scope().unwrap();

        assert!(store.session().is_none());
        assert!(store.user_id().is_none());
        assert!(store.resume_id().is_none());
        assert!(store.job_id().is_none());
        assert_eq!(store.theme(), Theme::Dark);
    }

    struct FullDisk;

    impl StorageBackend for FullDisk {
        fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
            Ok(BTreeMap::new())
        }

        fn persist(&self, _entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_persist_leaves_table_unchanged() {
        let store = KeyedStore::open(Box::new(FullDisk)).unwrap();

        assert!(store.set_resume_id("r1").is_err());
        assert!(store.resume_id().is_none());

        assert!(store.set_cover_letter_id("cl1").is_err());
        assert!(store.cover_letter_id().is_none());
        assert!(!store.flag(StoreKey::CoverLetterGenerated));

        assert!(store.set_session(&session()).is_err());
        assert!(store.session().is_none());
        assert!(store.user_id().is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn failed_removal_keeps_values() {
        let entries = BTreeMap::from([("resumeId".to_string(), "r1".to_string())]);
        let store = KeyedStore {
            inner: Arc::new(Inner {
                entries: Mutex::new(entries),
                backend: Box::new(FullDisk),
            }),
        };

        assert!(store.clear_session_scope().is_err());
        assert_eq!(store.resume_id().as_deref(), Some("r1"));
    }

    #[test]
    fn session_round_trips_through_user_key() {
        let store = KeyedStore::in_memory();
        store.set_session(&session()).unwrap();
        assert_eq!(store.session(), Some(session()));
        assert_eq!(store.user_id().as_deref(), Some("u1"));

        store.set(StoreKey::User, "{not json").unwrap();
        assert!(store.session().is_none());
    }
}
