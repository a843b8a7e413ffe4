//! Remote client facade for the CareerCraft backend.
//!
//! One method per backend capability. Each call makes exactly one network
//! attempt and returns either a typed result or a [`RemoteError`]; raw JSON
//! never leaves this module.

mod careercraft;
#[cfg(test)]
pub mod fake;
mod queries;
mod upload;
mod wire;

pub use careercraft::ApiClient;
pub use upload::{ResumeFile, ResumeFileError, MAX_RESUME_BYTES};

use crate::error::RemoteError;
use crate::model::{
    AtsResult, Entity, EntityKind, GeneratedOutput, JobSource, OutputKind, Session,
    SkillGapResult, UploadedJobRef, UploadedResumeRef,
};
use async_trait::async_trait;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload_and_parse_resume(
        &self,
        file: &ResumeFile,
        user_id: &str,
    ) -> RemoteResult<UploadedResumeRef>;

    async fn upload_job(
        &self,
        url: &str,
        source: JobSource,
        user_id: &str,
    ) -> RemoteResult<UploadedJobRef>;

    async fn generate_final_output(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
        kind: OutputKind,
    ) -> RemoteResult<GeneratedOutput>;

    async fn run_skill_gap_analysis(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
    ) -> RemoteResult<SkillGapResult>;

    async fn run_ats_analysis(&self, resume_id: &str, user_id: &str) -> RemoteResult<AtsResult>;

    /// Look up one record. A `null` payload is `Ok(None)`.
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> RemoteResult<Option<Entity>>;

    async fn list_for_user(&self, kind: EntityKind, user_id: &str) -> RemoteResult<Vec<Entity>>;

    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session>;

    async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> RemoteResult<Session>;
}
