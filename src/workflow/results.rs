//! Result and dashboard assembly.
//!
//! Every lookup settles on its own: a failed or missing record only blanks
//! its own card.

use crate::client::Backend;
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::{Entity, EntityKind};
use crate::store::{KeyedStore, StoreKey};
use serde::Serialize;

/// Order in which cards are shown.
pub const CARD_ORDER: [EntityKind; 4] = [
    EntityKind::Job,
    EntityKind::Resume,
    EntityKind::CoverLetter,
    EntityKind::ColdEmail,
];

fn store_key(kind: EntityKind) -> StoreKey {
    match kind {
        EntityKind::Job => StoreKey::JobId,
        EntityKind::Resume => StoreKey::ResumeId,
        EntityKind::CoverLetter => StoreKey::CoverLetterId,
        EntityKind::ColdEmail => StoreKey::EmailId,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Lookup {
    /// No identifier was stored, so nothing was requested.
    Skipped,
    Loaded(Entity),
    /// The backend answered with `null`.
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub kind: EntityKind,
    pub id: Option<String>,
    pub lookup: Lookup,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub cards: Vec<Card>,
}

impl ResultSet {
    /// Cards that have something to render.
    pub fn loaded(&self) -> impl Iterator<Item = &Entity> {
        self.cards.iter().filter_map(|c| match &c.lookup {
            Lookup::Loaded(e) => Some(e),
            _ => None,
        })
    }

    pub fn get(&self, kind: EntityKind) -> Option<&Entity> {
        self.loaded().find(|e| e.kind() == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&EntityKind, &str)> {
        self.cards.iter().filter_map(|c| match &c.lookup {
            Lookup::Failed(msg) => Some((&c.kind, msg.as_str())),
            _ => None,
        })
    }
}

async fn lookup(backend: &dyn Backend, kind: EntityKind, id: Option<String>) -> Card {
    let Some(id) = id else {
        return Card {
            kind,
            id: None,
            lookup: Lookup::Skipped,
        };
    };
    let lookup = match backend.fetch_by_id(kind, &id).await {
        Ok(Some(entity)) => Lookup::Loaded(entity),
        Ok(None) => Lookup::Missing,
        Err(e) => {
            tracing::warn!(kind = kind.label(), id = %id, error = %e, "lookup failed");
            Lookup::Failed(e.to_string())
        }
    };
    Card {
        kind,
        id: Some(id),
        lookup,
    }
}

/// Look up every stored identifier concurrently. Empty ids are never sent.
pub async fn assemble_results(backend: &dyn Backend, store: &KeyedStore) -> ResultSet {
    let lookups = CARD_ORDER
        .iter()
        .map(|&kind| lookup(backend, kind, store.id(store_key(kind))));
    let cards = futures::future::join_all(lookups).await;
    tracing::debug!(
        loaded = cards.iter().filter(|c| matches!(c.lookup, Lookup::Loaded(_))).count(),
        "results assembled"
    );
    ResultSet { cards }
}

/// Look up a single record for a detail view.
pub async fn load_document(
    backend: &dyn Backend,
    kind: EntityKind,
    id: &str,
) -> WorkflowResult<Option<Entity>> {
    if id.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(format!(
            "{} id must not be empty",
            kind.label()
        )));
    }
    backend
        .fetch_by_id(kind, id.trim())
        .await
        .map_err(WorkflowError::remote(Action::Lookup))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Listing {
    Loaded(Vec<Entity>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSection {
    pub kind: EntityKind,
    pub listing: Listing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub sections: Vec<DashboardSection>,
}

impl Dashboard {
    pub fn items(&self, kind: EntityKind) -> &[Entity] {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| match &s.listing {
                Listing::Loaded(items) => Some(items.as_slice()),
                Listing::Failed(_) => None,
            })
            .unwrap_or(&[])
    }
}

/// Everything the signed-in user has created, one independent listing per kind.
pub async fn assemble_dashboard(
    backend: &dyn Backend,
    store: &KeyedStore,
) -> WorkflowResult<Dashboard> {
    let user_id = store
        .user_id()
        .ok_or(WorkflowError::MissingPrerequisite("userId"))?;
    let listings = CARD_ORDER.iter().map(|&kind| {
        let user_id = user_id.as_str();
        async move {
            let listing = match backend.list_for_user(kind, user_id).await {
                Ok(items) => Listing::Loaded(items),
                Err(e) => {
                    tracing::warn!(kind = kind.label(), error = %e, "listing failed");
                    Listing::Failed(e.to_string())
                }
            };
            DashboardSection { kind, listing }
        }
    });
    Ok(Dashboard {
        sections: futures::future::join_all(listings).await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{session, FakeBackend};
    use crate::error::RemoteError;
    use crate::model::{DocumentRecord, JobPosting, ResumeRecord};

    fn job(id: &str) -> Entity {
        Entity::Job(JobPosting {
            id: id.into(),
            url: None,
            title: Some("Engineer".into()),
            user_id: None,
            company: Some("Acme".into()),
            description: None,
            location: None,
            job_type: None,
        })
    }

    fn doc(id: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.into(),
            file_url: None,
            data: Some("Dear...".into()),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn one_failed_lookup_leaves_the_other_cards() {
        let store = KeyedStore::in_memory();
        store.set_job_id("j1").unwrap();
        store.set_resume_id("r1").unwrap();
        store.set_cover_letter_id("cl1").unwrap();
        store.set_email_id("e1").unwrap();
        let backend = FakeBackend::new()
            .with_entity(EntityKind::Job, "j1", Ok(Some(job("j1"))))
            .with_entity(
                EntityKind::Resume,
                "r1",
                Err(RemoteError::Network("timed out".into())),
            )
            .with_entity(EntityKind::CoverLetter, "cl1", Ok(Some(Entity::CoverLetter(doc("cl1")))))
            .with_entity(EntityKind::ColdEmail, "e1", Ok(Some(Entity::ColdEmail(doc("e1")))));

        let results = assemble_results(&backend, &store).await;

        assert_eq!(results.loaded().count(), 3);
        assert!(results.get(EntityKind::Resume).is_none());
        assert!(results.get(EntityKind::ColdEmail).is_some());
        let failures: Vec<_> = results.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(*failures[0].0, EntityKind::Resume);
    }

    #[tokio::test]
    async fn absent_ids_are_never_requested() {
        let store = KeyedStore::in_memory();
        store.set_job_id("j1").unwrap();
        store.set(StoreKey::EmailId, "").unwrap();
        let backend = FakeBackend::new();

        let results = assemble_results(&backend, &store).await;

        assert_eq!(backend.calls(), vec!["fetch:Job:j1"]);
        assert_eq!(results.cards[0].lookup, Lookup::Missing);
        assert!(results.cards[1..]
            .iter()
            .all(|c| c.lookup == Lookup::Skipped));
    }

    #[tokio::test]
    async fn document_lookup_rejects_blank_ids() {
        let backend = FakeBackend::new().with_entity(
            EntityKind::Resume,
            "r1",
            Ok(Some(Entity::Resume(ResumeRecord {
                id: "r1".into(),
                file_url: None,
                resume_data: serde_json::json!({"Name": "Ada"}),
            }))),
        );
        assert!(load_document(&backend, EntityKind::Resume, "  ").await.is_err());
        let found = load_document(&backend, EntityKind::Resume, "r1").await.unwrap();
        assert_eq!(found.map(|e| e.id().to_string()).as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn dashboard_sections_settle_independently() {
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        let backend = FakeBackend::new()
            .with_list(EntityKind::Job, Ok(vec![job("j1"), job("j2")]))
            .with_list(EntityKind::CoverLetter, Err(RemoteError::rejected("boom")));

        let dash = assemble_dashboard(&backend, &store).await.unwrap();

        assert_eq!(dash.items(EntityKind::Job).len(), 2);
        assert!(dash.items(EntityKind::CoverLetter).is_empty());
        assert!(matches!(dash.sections[2].listing, Listing::Failed(_)));
        assert!(matches!(dash.sections[1].listing, Listing::Loaded(ref v) if v.is_empty()));
    }

    #[tokio::test]
    async fn dashboard_needs_a_session() {
        let store = KeyedStore::in_memory();
        let backend = FakeBackend::new();
        let err = assemble_dashboard(&backend, &store).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingPrerequisite("userId")));
        assert!(backend.calls().is_empty());
    }
}
