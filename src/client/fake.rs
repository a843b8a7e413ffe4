//! Scripted in-process backend for workflow tests.

use super::{Backend, RemoteResult, ResumeFile};
use crate::error::RemoteError;
use crate::model::{
    AtsResult, Entity, EntityKind, GeneratedOutput, JobSource, OutputKind, Plan, Session,
    SkillGapResult, UploadedJobRef, UploadedResumeRef,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Each operation answers with its configured result; unset operations fail as rejected.
/// Every call is recorded so tests can assert that no request was sent.
#[derive(Default)]
pub struct FakeBackend {
    pub resume: Mutex<Option<RemoteResult<UploadedResumeRef>>>,
    pub job: Mutex<Option<RemoteResult<UploadedJobRef>>>,
    pub output: Mutex<Option<RemoteResult<GeneratedOutput>>>,
    pub skill_gap: Mutex<Option<RemoteResult<SkillGapResult>>>,
    pub ats: Mutex<Option<RemoteResult<AtsResult>>>,
    pub entities: Mutex<HashMap<(EntityKind, String), RemoteResult<Option<Entity>>>>,
    pub lists: Mutex<HashMap<EntityKind, RemoteResult<Vec<Entity>>>>,
    pub session: Mutex<Option<RemoteResult<Session>>>,
    pub calls: Mutex<Vec<String>>,
}

fn take<T>(slot: &Mutex<Option<RemoteResult<T>>>) -> RemoteResult<T> {
    slot.lock()
        .unwrap()
        .take()
        .unwrap_or_else(|| Err(RemoteError::rejected("no scripted response")))
}

fn copy_err(e: &RemoteError) -> RemoteError {
    match e {
        RemoteError::Network(m) => RemoteError::Network(m.clone()),
        RemoteError::ServerRejected { status, message } => RemoteError::ServerRejected {
            status: *status,
            message: message.clone(),
        },
        RemoteError::InvalidCredentials => RemoteError::InvalidCredentials,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn with_resume(self, r: RemoteResult<UploadedResumeRef>) -> Self {
        *self.resume.lock().unwrap() = Some(r);
        self
    }

    pub fn with_job(self, r: RemoteResult<UploadedJobRef>) -> Self {
        *self.job.lock().unwrap() = Some(r);
        self
    }

    pub fn with_output(self, r: RemoteResult<GeneratedOutput>) -> Self {
        *self.output.lock().unwrap() = Some(r);
        self
    }

    pub fn with_skill_gap(self, r: RemoteResult<SkillGapResult>) -> Self {
        *self.skill_gap.lock().unwrap() = Some(r);
        self
    }

    pub fn with_ats(self, r: RemoteResult<AtsResult>) -> Self {
        *self.ats.lock().unwrap() = Some(r);
        self
    }

    pub fn with_session(self, r: RemoteResult<Session>) -> Self {
        *self.session.lock().unwrap() = Some(r);
        self
    }

    pub fn with_entity(self, kind: EntityKind, id: &str, r: RemoteResult<Option<Entity>>) -> Self {
        self.entities
            .lock()
            .unwrap()
            .insert((kind, id.to_string()), r);
        self
    }

    pub fn with_list(self, kind: EntityKind, r: RemoteResult<Vec<Entity>>) -> Self {
        self.lists.lock().unwrap().insert(kind, r);
        self
    }
}

pub fn session(id: &str) -> Session {
    Session {
        id: id.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        avatar: None,
        plan: Plan::Pro,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload_and_parse_resume(
        &self,
        file: &ResumeFile,
        user_id: &str,
    ) -> RemoteResult<UploadedResumeRef> {
        self.record(format!("upload_resume:{}:{user_id}", file.file_name));
        take(&self.resume)
    }

    async fn upload_job(
        &self,
        url: &str,
        source: JobSource,
        user_id: &str,
    ) -> RemoteResult<UploadedJobRef> {
        self.record(format!("upload_job:{url}:{}:{user_id}", source.as_str()));
        take(&self.job)
    }

    async fn generate_final_output(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
        kind: OutputKind,
    ) -> RemoteResult<GeneratedOutput> {
        self.record(format!(
            "generate:{}:{resume_id}:{job_id}:{user_id}",
            kind.backend_path()
        ));
        take(&self.output)
    }

    async fn run_skill_gap_analysis(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
    ) -> RemoteResult<SkillGapResult> {
        self.record(format!("skill_gap:{resume_id}:{job_id}:{user_id}"));
        take(&self.skill_gap)
    }

    async fn run_ats_analysis(&self, resume_id: &str, user_id: &str) -> RemoteResult<AtsResult> {
        self.record(format!("ats:{resume_id}:{user_id}"));
        take(&self.ats)
    }

    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> RemoteResult<Option<Entity>> {
        self.record(format!("fetch:{kind:?}:{id}"));
        match self.entities.lock().unwrap().get(&(kind, id.to_string())) {
            Some(Ok(e)) => Ok(e.clone()),
            Some(Err(e)) => Err(copy_err(e)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, kind: EntityKind, user_id: &str) -> RemoteResult<Vec<Entity>> {
        self.record(format!("list:{kind:?}:{user_id}"));
        match self.lists.lock().unwrap().get(&kind) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(e)) => Err(copy_err(e)),
            None => Ok(Vec::new()),
        }
    }

    async fn login(&self, email: &str, _password: &str) -> RemoteResult<Session> {
        self.record(format!("login:{email}"));
        take(&self.session)
    }

    async fn register(
        &self,
        _first_name: &str,
        _last_name: &str,
        email: &str,
        _password: &str,
    ) -> RemoteResult<Session> {
        self.record(format!("register:{email}"));
        take(&self.session)
    }
}
