//! Two-step skill-gap analysis: pick a resume, pick a job, compare.

use crate::client::Backend;
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::SkillGapResult;
use crate::store::KeyedStore;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkillGapStep {
    Resume,
    Job,
    Result,
}

/// Arguments of the single remote call, resolved before it is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillGapRequest {
    pub resume_id: String,
    pub job_id: String,
    pub user_id: String,
}

impl SkillGapRequest {
    pub async fn run(self, backend: &dyn Backend) -> WorkflowResult<SkillGapResult> {
        backend
            .run_skill_gap_analysis(&self.resume_id, &self.job_id, &self.user_id)
            .await
            .map_err(WorkflowError::remote(Action::SkillGap))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillGapFlow {
    step: SkillGapStep,
    pub resume_id: String,
    pub job_id: String,
    in_flight: bool,
    result: Option<SkillGapResult>,
}

impl SkillGapFlow {
    /// Start at step 1 with both ids prefilled from the store.
    pub fn new(store: &KeyedStore) -> Self {
        Self {
            step: SkillGapStep::Resume,
            resume_id: store.resume_id().unwrap_or_default(),
            job_id: store.job_id().unwrap_or_default(),
            in_flight: false,
            result: None,
        }
    }

    pub fn step(&self) -> SkillGapStep {
        self.step
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn result(&self) -> Option<&SkillGapResult> {
        self.result.as_ref()
    }

    pub fn can_next(&self) -> bool {
        self.step == SkillGapStep::Resume && !self.resume_id.trim().is_empty()
    }

    pub fn next(&mut self) -> WorkflowResult<()> {
        if !self.can_next() {
            return Err(WorkflowError::InvalidInput("enter a resume id first".into()));
        }
        self.step = SkillGapStep::Job;
        Ok(())
    }

    /// Step 2 back to step 1; the only backward move any flow allows.
    pub fn back(&mut self) {
        if self.step == SkillGapStep::Job && !self.in_flight {
            self.step = SkillGapStep::Resume;
        }
    }

    pub fn can_analyze(&self, store: &KeyedStore) -> bool {
        self.step == SkillGapStep::Job
            && !self.in_flight
            && !self.resume_id.trim().is_empty()
            && !self.job_id.trim().is_empty()
            && store.user_id().is_some()
    }

    pub fn begin(&mut self, store: &KeyedStore) -> WorkflowResult<SkillGapRequest> {
        if self.step != SkillGapStep::Job || self.in_flight {
            return Err(WorkflowError::InvalidInput(
                "analysis is not available at this step".into(),
            ));
        }
        let resume_id = self.resume_id.trim();
        if resume_id.is_empty() {
            return Err(WorkflowError::MissingPrerequisite("resumeId"));
        }
        let job_id = self.job_id.trim();
        if job_id.is_empty() {
            return Err(WorkflowError::MissingPrerequisite("jobId"));
        }
        let user_id = store
            .user_id()
            .ok_or(WorkflowError::MissingPrerequisite("userId"))?;
        let request = SkillGapRequest {
            resume_id: resume_id.to_string(),
            job_id: job_id.to_string(),
            user_id,
        };
        self.in_flight = true;
        Ok(request)
    }

    pub fn complete(&mut self, outcome: WorkflowResult<SkillGapResult>) -> WorkflowResult<()> {
        self.in_flight = false;
        let result = outcome?;
        tracing::info!(
            match_percentage = %result.match_percentage,
            matched = result.matching_skills.len(),
            missing = result.missing_skills.len(),
            "skill gap analysed"
        );
        self.result = Some(result);
        self.step = SkillGapStep::Result;
        Ok(())
    }

    pub async fn analyze(
        &mut self,
        backend: &dyn Backend,
        store: &KeyedStore,
    ) -> WorkflowResult<&SkillGapResult> {
        let request = self.begin(store)?;
        let outcome = request.run(backend).await;
        self.complete(outcome)?;
        self.result
            .as_ref()
            .ok_or_else(|| WorkflowError::InvalidInput("no analysis result".into()))
    }

    /// "Start new analysis": drop the result and return to step 1. Store ids are kept.
    pub fn reset(&mut self, store: &KeyedStore) {
        *self = Self::new(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{session, FakeBackend};
    use crate::error::RemoteError;
    use crate::model::MatchBand;

    fn store() -> KeyedStore {
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        store.set_resume_id("r1").unwrap();
        store.set_job_id("j1").unwrap();
        store
    }

    fn report() -> SkillGapResult {
        SkillGapResult {
            match_percentage: "72%".into(),
            matching_skills: vec!["React".into()],
            missing_skills: vec!["Go".into()],
            feedback: "Learn Go".into(),
        }
    }

    #[tokio::test]
    async fn analysis_uses_prefilled_ids() {
        let store = store();
        let backend = FakeBackend::new().with_skill_gap(Ok(report()));
        let mut flow = SkillGapFlow::new(&store);
        assert_eq!(flow.resume_id, "r1");
        flow.next().unwrap();
        assert!(flow.can_analyze(&store));

        let result = flow.analyze(&backend, &store).await.unwrap();

        assert_eq!(result.match_percentage, "72%");
        assert_eq!(result.matching_skills, vec!["React"]);
        assert_eq!(result.missing_skills, vec!["Go"]);
        assert_eq!(result.band(), MatchBand::Moderate);
        assert_eq!(flow.step(), SkillGapStep::Result);
        assert_eq!(backend.calls(), vec!["skill_gap:r1:j1:u1"]);
    }

    #[test]
    fn back_returns_to_step_one() {
        let store = KeyedStore::in_memory();
        let mut flow = SkillGapFlow::new(&store);
        assert!(!flow.can_next());
        assert!(flow.next().is_err());

        flow.resume_id = " r2 ".into();
        flow.next().unwrap();
        assert_eq!(flow.step(), SkillGapStep::Job);
        flow.back();
        assert_eq!(flow.step(), SkillGapStep::Resume);
    }

    #[tokio::test]
    async fn failure_stays_on_job_step() {
        let store = store();
        let backend = FakeBackend::new().with_skill_gap(Err(RemoteError::rejected("no job")));
        let mut flow = SkillGapFlow::new(&store);
        flow.next().unwrap();

        let err = flow.analyze(&backend, &store).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to analyze skill gap");
        assert_eq!(flow.step(), SkillGapStep::Job);
        assert!(!flow.in_flight());
        assert!(flow.result().is_none());
    }

    #[tokio::test]
    async fn missing_user_blocks_the_call() {
        let store = KeyedStore::in_memory();
        let backend = FakeBackend::new();
        let mut flow = SkillGapFlow::new(&store);
        flow.resume_id = "r1".into();
        flow.job_id = "j1".into();
        flow.next().unwrap();
        assert!(!flow.can_analyze(&store));

        let err = flow.analyze(&backend, &store).await.unwrap_err();
        assert!(matches!(err, WorkflowError::MissingPrerequisite("userId")));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn reset_clears_only_the_result() {
        let store = store();
        let backend = FakeBackend::new().with_skill_gap(Ok(report()));
        let mut flow = SkillGapFlow::new(&store);
        flow.next().unwrap();
        flow.analyze(&backend, &store).await.unwrap();

        flow.reset(&store);

        assert!(flow.result().is_none());
        assert_eq!(flow.step(), SkillGapStep::Resume);
        assert_eq!(store.resume_id().as_deref(), Some("r1"));
        assert_eq!(store.job_id().as_deref(), Some("j1"));
    }
}
