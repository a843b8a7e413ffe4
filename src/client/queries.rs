//! GraphQL documents understood by the backend.

use crate::model::EntityKind;

pub(super) const LOGIN_USER: &str = r#"
mutation LoginUser($input: LoginUserInput!) {
  loginUser(input: $input) { id email firstName lastName }
}"#;

pub(super) const REGISTER_USER: &str = r#"
mutation Register($input: CreateUserInput!) {
  createUser(input: $input) { id firstName lastName email }
}"#;

pub(super) const UPLOAD_JOB: &str = r#"
mutation UploadJob($url: String!, $userId: String!, $type: String!) {
  uploadJob(url: $url, userId: $userId, type: $type) { id title url }
}"#;

pub(super) const RUN_ATS: &str = r#"
mutation GenerateATS($resumeId: String!, $userId: String!) {
  runATSAnalysis(resumeId: $resumeId, userId: $userId) {
    id score missingSkills Issues atsResultData suggestions userId resumeId
  }
}"#;

const JOB_BY_ID: &str = r#"
query getJobbyId($id: String!) {
  getJobbyId(id: $id) { id url title userId company description location type }
}"#;

const RESUME_BY_ID: &str = r#"
query getResumeById($id: String!) {
  getResumeById(id: $id) { id fileUrl resume_data }
}"#;

const COVER_LETTER_BY_ID: &str = r#"
query getCoverletterById($id: String!) {
  getCoverletterById(id: $id) { id fileUrl data userId }
}"#;

const COLD_EMAIL_BY_ID: &str = r#"
query getColdEmailById($id: String!) {
  getColdEmailById(id: $id) { id fileUrl data userId }
}"#;

const JOBS_BY_USER: &str = r#"
query getJobbyUserId($userId: String!) {
  getJobbyUserId(userId: $userId) { id url title userId company description location type }
}"#;

const RESUMES_BY_USER: &str = r#"
query getResumeByUserId($userId: String!) {
  getResumeByUserId(userId: $userId) { id fileUrl resume_data }
}"#;

const COVER_LETTERS_BY_USER: &str = r#"
query getCoverletterByUserId($userId: String!) {
  getCoverletterByUserId(userId: $userId) { id fileUrl data userId }
}"#;

const COLD_EMAILS_BY_USER: &str = r#"
query getColdEmailByUserId($userId: String!) {
  getColdEmailByUserId(userId: $userId) { id fileUrl data userId }
}"#;

/// Query document and response field for a lookup by id.
pub(super) fn by_id(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Job => (JOB_BY_ID, "getJobbyId"),
        EntityKind::Resume => (RESUME_BY_ID, "getResumeById"),
        EntityKind::CoverLetter => (COVER_LETTER_BY_ID, "getCoverletterById"),
        EntityKind::ColdEmail => (COLD_EMAIL_BY_ID, "getColdEmailById"),
    }
}

/// Query document and response field for a per-user listing.
pub(super) fn by_user(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Job => (JOBS_BY_USER, "getJobbyUserId"),
        EntityKind::Resume => (RESUMES_BY_USER, "getResumeByUserId"),
        EntityKind::CoverLetter => (COVER_LETTERS_BY_USER, "getCoverletterByUserId"),
        EntityKind::ColdEmail => (COLD_EMAILS_BY_USER, "getColdEmailByUserId"),
    }
}
