//! ATS compatibility check for a stored resume or a freshly uploaded file.

use crate::client::{Backend, ResumeFile};
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::AtsResult;
use crate::store::KeyedStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AtsSource {
    ResumeId(String),
    /// Uploaded first, with the returned id persisted like the wizard does.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtsRequest {
    pub source: AtsSource,
    pub user_id: String,
}

/// What an [`AtsRequest`] produced. An upload can succeed even when the analysis fails.
#[derive(Debug)]
pub struct AtsOutcome {
    pub uploaded: Option<String>,
    pub analysis: WorkflowResult<(String, AtsResult)>,
}

impl AtsRequest {
    /// Upload when needed, then run the analysis.
    pub async fn run(self, backend: &dyn Backend) -> AtsOutcome {
        let (resume_id, uploaded) = match self.source {
            AtsSource::ResumeId(id) => (id, None),
            AtsSource::File(path) => match upload(&path, &self.user_id, backend).await {
                Ok(id) => (id.clone(), Some(id)),
                Err(e) => {
                    return AtsOutcome {
                        uploaded: None,
                        analysis: Err(e),
                    }
                }
            },
        };
        let analysis = backend
            .run_ats_analysis(&resume_id, &self.user_id)
            .await
            .map(|result| (resume_id, result))
            .map_err(WorkflowError::remote(Action::Ats));
        AtsOutcome { uploaded, analysis }
    }
}

async fn upload(path: &Path, user_id: &str, backend: &dyn Backend) -> WorkflowResult<String> {
    let file = ResumeFile::load(path)
        .await
        .map_err(|e| WorkflowError::InvalidInput(e.to_string()))?;
    let uploaded = backend
        .upload_and_parse_resume(&file, user_id)
        .await
        .map_err(WorkflowError::remote(Action::UploadResume))?;
    Ok(uploaded.id)
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsFlow {
    pub resume_id: String,
    pub resume_path: Option<PathBuf>,
    in_flight: bool,
    result: Option<AtsResult>,
}

impl AtsFlow {
    pub fn new(store: &KeyedStore) -> Self {
        Self {
            resume_id: store.resume_id().unwrap_or_default(),
            resume_path: None,
            in_flight: false,
            result: None,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn result(&self) -> Option<&AtsResult> {
        self.result.as_ref()
    }

    pub fn can_analyze(&self) -> bool {
        !self.in_flight
            && self.result.is_none()
            && (self.resume_path.is_some() || !self.resume_id.trim().is_empty())
    }

    /// A chosen file takes precedence over the typed id.
    pub fn begin(&mut self, store: &KeyedStore) -> WorkflowResult<AtsRequest> {
        if self.in_flight {
            return Err(WorkflowError::InvalidInput(
                "an analysis is already running".into(),
            ));
        }
        let source = match &self.resume_path {
            Some(path) => AtsSource::File(path.clone()),
            None if !self.resume_id.trim().is_empty() => {
                AtsSource::ResumeId(self.resume_id.trim().to_string())
            }
            None => return Err(WorkflowError::MissingPrerequisite("resumeId")),
        };
        let user_id = store
            .user_id()
            .ok_or(WorkflowError::MissingPrerequisite("userId"))?;
        self.in_flight = true;
        Ok(AtsRequest { source, user_id })
    }

    /// A successful upload is kept even when the analysis that followed it failed.
    pub fn complete(&mut self, outcome: AtsOutcome, store: &KeyedStore) -> WorkflowResult<()> {
        self.in_flight = false;
        if let Some(id) = outcome.uploaded {
            store.set_resume_id(&id)?;
            tracing::info!(resume_id = %id, "resume uploaded for ATS");
            self.resume_id = id;
            self.resume_path = None;
        }
        let (resume_id, result) = outcome.analysis?;
        tracing::info!(resume_id = %resume_id, score = result.score, "ATS analysis finished");
        self.resume_id = resume_id;
        self.result = Some(result);
        Ok(())
    }

    pub async fn analyze(
        &mut self,
        backend: &dyn Backend,
        store: &KeyedStore,
    ) -> WorkflowResult<&AtsResult> {
        let request = self.begin(store)?;
        let outcome = request.run(backend).await;
        self.complete(outcome, store)?;
        self.result
            .as_ref()
            .ok_or_else(|| WorkflowError::InvalidInput("no analysis result".into()))
    }

    pub fn reset(&mut self, store: &KeyedStore) {
        *self = Self::new(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{session, FakeBackend};
    use crate::error::RemoteError;
    use crate::model::{AtsResultData, UploadedResumeRef};

    fn report(score: f64) -> AtsResult {
        AtsResult {
            score,
            missing_skills: vec!["Kubernetes".into()],
            issues: "No summary section".into(),
            suggestions: "Add a summary".into(),
            ats_result_data: AtsResultData::default(),
        }
    }

    fn signed_in() -> KeyedStore {
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        store
    }

    #[tokio::test]
    async fn analyzes_the_stored_resume() {
        let store = signed_in();
        store.set_resume_id("r1").unwrap();
        let backend = FakeBackend::new().with_ats(Ok(report(81.0)));
        let mut flow = AtsFlow::new(&store);
        assert!(flow.can_analyze());

        let result = flow.analyze(&backend, &store).await.unwrap();

        assert_eq!(result.score, 81.0);
        assert_eq!(backend.calls(), vec!["ats:r1:u1"]);
    }

    #[tokio::test]
    async fn uploaded_file_id_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, b"PK").unwrap();
        let store = signed_in();
        let backend = FakeBackend::new()
            .with_resume(Ok(UploadedResumeRef { id: "r7".into() }))
            .with_ats(Ok(report(64.0)));
        let mut flow = AtsFlow::new(&store);
        flow.resume_path = Some(path);

        flow.analyze(&backend, &store).await.unwrap();

        assert_eq!(store.resume_id().as_deref(), Some("r7"));
        assert_eq!(flow.resume_id, "r7");
        assert_eq!(backend.calls(), vec!["upload_resume:cv.docx:u1", "ats:r7:u1"]);
    }

    #[tokio::test]
    async fn upload_survives_a_failed_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, b"PK").unwrap();
        let store = signed_in();
        let backend = FakeBackend::new()
            .with_resume(Ok(UploadedResumeRef { id: "r7".into() }))
            .with_ats(Err(RemoteError::Network("offline".into())));
        let mut flow = AtsFlow::new(&store);
        flow.resume_path = Some(path);

        let err = flow.analyze(&backend, &store).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to run ATS analysis");
        assert_eq!(store.resume_id().as_deref(), Some("r7"));
        assert_eq!(flow.resume_id, "r7");
        assert!(flow.resume_path.is_none());
        assert!(flow.can_analyze());

        let retry = flow.begin(&store).unwrap();
        assert_eq!(retry.source, AtsSource::ResumeId("r7".into()));
        let outcome = retry.run(&backend).await;
        assert!(outcome.uploaded.is_none());
        assert_eq!(
            backend.calls(),
            vec!["upload_resume:cv.docx:u1", "ats:r7:u1", "ats:r7:u1"]
        );
    }

    #[tokio::test]
    async fn failure_reports_ats_alert_and_allows_retry() {
        let store = signed_in();
        let backend = FakeBackend::new().with_ats(Err(RemoteError::Network("offline".into())));
        let mut flow = AtsFlow::new(&store);
        flow.resume_id = "r1".into();

        let err = flow.analyze(&backend, &store).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to run ATS analysis");
        assert!(flow.can_analyze());
        assert!(flow.result().is_none());
    }

    #[tokio::test]
    async fn reset_keeps_store_ids() {
        let store = signed_in();
        store.set_resume_id("r1").unwrap();
        let backend = FakeBackend::new().with_ats(Ok(report(50.0)));
        let mut flow = AtsFlow::new(&store);
        flow.analyze(&backend, &store).await.unwrap();
        assert!(!flow.can_analyze());

        flow.reset(&store);

        assert!(flow.result().is_none());
        assert!(flow.can_analyze());
        assert_eq!(store.resume_id().as_deref(), Some("r1"));
    }

    #[test]
    fn blank_input_is_a_missing_prerequisite() {
        let store = signed_in();
        let mut flow = AtsFlow::new(&store);
        flow.resume_id = "   ".into();
        assert!(!flow.can_analyze());
        assert!(matches!(
            flow.begin(&store),
            Err(WorkflowError::MissingPrerequisite("resumeId"))
        ));
    }
}
