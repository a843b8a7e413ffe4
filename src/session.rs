//! Sign-in state backed by the keyed store.

use crate::client::Backend;
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::Session;
use crate::store::KeyedStore;

#[derive(Clone)]
pub struct SessionManager {
    store: KeyedStore,
    current: Option<Session>,
}

fn required(field: &'static str, value: &str) -> WorkflowResult<()> {
    if value.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

impl SessionManager {
    /// Pick up whatever session the store already holds.
    pub fn restore(store: KeyedStore) -> Self {
        let current = store.session();
        match &current {
            Some(s) => tracing::info!(user_id = %s.id, "session restored"),
            None => tracing::debug!("no stored session"),
        }
        Self { store, current }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn store(&self) -> &KeyedStore {
        &self.store
    }

    pub async fn login(
        &mut self,
        backend: &dyn Backend,
        email: &str,
        password: &str,
    ) -> WorkflowResult<&Session> {
        required("email", email)?;
        required("password", password)?;
        let session = backend
            .login(email.trim(), password)
            .await
            .map_err(WorkflowError::remote(Action::Login))?;
        self.adopt(session)
    }

    pub async fn register(
        &mut self,
        backend: &dyn Backend,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> WorkflowResult<&Session> {
        required("first name", first_name)?;
        required("last name", last_name)?;
        required("email", email)?;
        required("password", password)?;
        let session = backend
            .register(first_name.trim(), last_name.trim(), email.trim(), password)
            .await
            .map_err(WorkflowError::remote(Action::Register))?;
        self.adopt(session)
    }

    /// Persist a session obtained elsewhere (the controller runs the call itself).
    pub fn adopt(&mut self, session: Session) -> WorkflowResult<&Session> {
        self.store.set_session(&session)?;
        tracing::info!(user_id = %session.id, plan = ?session.plan, "signed in");
        Ok(self.current.insert(session))
    }

    /// Drop the session and every identifier derived from it.
    pub fn logout(&mut self) -> WorkflowResult<()> {
        self.store.clear_session_scope()?;
        if let Some(s) = self.current.take() {
            tracing::info!(user_id = %s.id, "signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{session, FakeBackend};
    use crate::error::RemoteError;
    use crate::store::StoreKey;

    #[tokio::test]
    async fn login_persists_session_and_user_id() {
        let store = KeyedStore::in_memory();
        let backend = FakeBackend::new().with_session(Ok(session("u1")));
        let mut sessions = SessionManager::restore(store.clone());
        assert!(!sessions.is_authenticated());

        sessions
            .login(&backend, "ada@example.com", "hunter2")
            .await
            .unwrap();

        assert_eq!(store.user_id().as_deref(), Some("u1"));
        assert!(SessionManager::restore(store).is_authenticated());
    }

    #[tokio::test]
    async fn rejected_login_writes_nothing() {
        let store = KeyedStore::in_memory();
        let backend = FakeBackend::new().with_session(Err(RemoteError::InvalidCredentials));
        let mut sessions = SessionManager::restore(store.clone());

        let err = sessions
            .login(&backend, "ada@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(store.snapshot().is_empty());
        assert!(!sessions.is_authenticated());
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let store = KeyedStore::in_memory();
        let backend = FakeBackend::new().with_session(Ok(session("u2")));
        let mut sessions = SessionManager::restore(store.clone());

        let err = sessions
            .register(&backend, "", "Lovelace", "ada@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidInput(_)));
        assert!(backend.calls().is_empty());

        sessions
            .register(&backend, " Ada ", "Lovelace", "ada@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(backend.calls(), vec!["register:ada@example.com"]);
        assert_eq!(store.user_id().as_deref(), Some("u2"));
    }

    #[test]
    fn logout_clears_derived_ids() {
        let store = KeyedStore::in_memory();
        let mut sessions = SessionManager::restore(store.clone());
        sessions.adopt(session("u1")).unwrap();
        store.set_resume_id("r1").unwrap();
        store.set_job_id("j1").unwrap();
        store.set_cover_letter_id("cl1").unwrap();

        sessions.logout().unwrap();

        assert!(!sessions.is_authenticated());
        for key in [StoreKey::UserId, StoreKey::ResumeId, StoreKey::JobId, StoreKey::CoverLetterId] {
            assert!(store.get(key).is_none(), "{key:?} survived logout");
        }
    }
}
