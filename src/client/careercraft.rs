use super::queries;
use super::wire::{
    self, GenerationResponse, GraphQlResponse, ResumeUploadResponse, SkillGapResponse, WireAts,
    WireUser,
};
use super::{Backend, RemoteResult, ResumeFile};
use crate::error::RemoteError;
use crate::model::{
    AtsResult, ClientConfig, Entity, EntityKind, GeneratedOutput, JobSource, OutputKind, Plan,
    Session, SkillGapResult, UploadedJobRef, UploadedResumeRef,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const UPLOAD_RESUME_ENDPOINT: &str = "upload-parse-resume";
const SKILL_ANALYSIS_ENDPOINT: &str = "skill_analysis";

/// Longest error body echoed back into a `ServerRejected` message.
const MAX_ERROR_BODY: usize = 300;

/// HTTP implementation of [`Backend`] against the hosted CareerCraft API.
pub struct ApiClient {
    http: reqwest::Client,
    graphql_url: String,
    cfg: ClientConfig,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            graphql_url: cfg.graphql_url(),
            cfg: cfg.clone(),
        })
    }

    async fn graphql(
        &self,
        query: &str,
        variables: Value,
    ) -> RemoteResult<serde_json::Map<String, Value>> {
        let (status, parsed) = self.graphql_response(query, variables).await?;
        parsed.into_data().map_err(|e| match e {
            RemoteError::ServerRejected { status: None, message } if !status.is_success() => {
                RemoteError::ServerRejected {
                    status: Some(status.as_u16()),
                    message,
                }
            }
            other => other,
        })
    }

    async fn graphql_response(
        &self,
        query: &str,
        variables: Value,
    ) -> RemoteResult<(StatusCode, GraphQlResponse)> {
        tracing::debug!(url = %self.graphql_url, "graphql request");
        let resp = self
            .http
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        // GraphQL servers report resolver errors with 200 and an `errors` array,
        // but some gateways use 4xx with the same body, so parse both.
        let status = resp.status();
        let body = resp.text().await?;
        let parsed: GraphQlResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(_) if !status.is_success() => {
                return Err(RemoteError::ServerRejected {
                    status: Some(status.as_u16()),
                    message: truncate(&body),
                })
            }
            Err(e) => return Err(RemoteError::rejected(format!("malformed response: {e}"))),
        };
        tracing::debug!(status = status.as_u16(), errors = parsed.errors.len(), "graphql response");
        Ok((status, parsed))
    }

    /// Run a sign-in mutation. Resolver errors and 4xx answers are bad credentials;
    /// server faults and malformed payloads stay `ServerRejected`.
    async fn authenticate(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> RemoteResult<WireUser> {
        let (status, parsed) = match self.graphql_response(query, variables).await {
            Ok(r) => r,
            Err(RemoteError::ServerRejected {
                status: Some(s),
                message,
            }) if (400..500).contains(&s) => {
                tracing::warn!(status = s, %message, "authentication rejected");
                return Err(RemoteError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };
        if status.is_server_error() {
            let message = parsed
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RemoteError::ServerRejected {
                status: Some(status.as_u16()),
                message: truncate(&message),
            });
        }
        if status.is_client_error() || !parsed.errors.is_empty() {
            tracing::warn!(
                status = status.as_u16(),
                errors = parsed.errors.len(),
                "authentication rejected"
            );
            return Err(RemoteError::InvalidCredentials);
        }
        let mut data = parsed.into_data()?;
        wire::field(&mut data, field)?.ok_or_else(|| {
            tracing::warn!(field, "authentication returned no user");
            RemoteError::InvalidCredentials
        })
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: Value) -> RemoteResult<T> {
        let url = self.cfg.endpoint(path);
        tracing::info!(%url, "POST");
        let resp = self.http.post(&url).json(&body).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> RemoteResult<T> {
    let status = resp.status();
    tracing::debug!(status = status.as_u16(), url = %resp.url(), "response");
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RemoteError::ServerRejected {
            status: Some(status.as_u16()),
            message: truncate(&body),
        });
    }
    Ok(resp.json::<T>().await?)
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn upload_and_parse_resume(
        &self,
        file: &ResumeFile,
        user_id: &str,
    ) -> RemoteResult<UploadedResumeRef> {
        let url = self.cfg.endpoint(UPLOAD_RESUME_ENDPOINT);
        let part = Part::stream_with_length(
            reqwest::Body::from(file.content.clone()),
            file.content.len() as u64,
        )
        .file_name(file.file_name.clone())
        .mime_str(file.content_type)
        .map_err(|e| RemoteError::Network(format!("failed to build multipart body: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("userId", user_id.to_string());

        tracing::info!(%url, file = %file.file_name, size_mb = file.size_mb(), "uploading resume");
        let resp = self.http.post(&url).multipart(form).send().await?;
        let parsed: ResumeUploadResponse = decode(resp).await?;
        Ok(UploadedResumeRef {
            id: parsed.resume.id,
        })
    }

    async fn upload_job(
        &self,
        url: &str,
        source: JobSource,
        user_id: &str,
    ) -> RemoteResult<UploadedJobRef> {
        tracing::info!(job_url = %url, source = source.as_str(), "uploading job");
        let mut data = self
            .graphql(
                queries::UPLOAD_JOB,
                json!({ "url": url, "userId": user_id, "type": source.as_str() }),
            )
            .await?;
        wire::required(&mut data, "uploadJob")
    }

    async fn generate_final_output(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
        kind: OutputKind,
    ) -> RemoteResult<GeneratedOutput> {
        let resp: GenerationResponse = self
            .post_json(
                kind.backend_path(),
                json!({ "resumeId": resume_id, "jobId": job_id, "userId": user_id }),
            )
            .await?;
        resp.into_output(kind)
    }

    async fn run_skill_gap_analysis(
        &self,
        resume_id: &str,
        job_id: &str,
        user_id: &str,
    ) -> RemoteResult<SkillGapResult> {
        let resp: SkillGapResponse = self
            .post_json(
                SKILL_ANALYSIS_ENDPOINT,
                json!({ "resumeId": resume_id, "jobId": job_id, "userId": user_id }),
            )
            .await?;
        Ok(resp.message)
    }

    async fn run_ats_analysis(&self, resume_id: &str, user_id: &str) -> RemoteResult<AtsResult> {
        tracing::info!(resume_id, "running ATS analysis");
        let mut data = self
            .graphql(
                queries::RUN_ATS,
                json!({ "resumeId": resume_id, "userId": user_id }),
            )
            .await?;
        let wire: WireAts = wire::required(&mut data, "runATSAnalysis")?;
        wire.into_result()
    }

    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> RemoteResult<Option<Entity>> {
        let (query, field) = queries::by_id(kind);
        let mut data = self.graphql(query, json!({ "id": id })).await?;
        match wire::field::<Value>(&mut data, field)? {
            Some(v) => wire::entity_from_value(kind, v).map(Some),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, kind: EntityKind, user_id: &str) -> RemoteResult<Vec<Entity>> {
        let (query, field) = queries::by_user(kind);
        let mut data = self.graphql(query, json!({ "userId": user_id })).await?;
        let items: Vec<Value> = wire::field(&mut data, field)?.unwrap_or_default();
        items
            .into_iter()
            .map(|v| wire::entity_from_value(kind, v))
            .collect()
    }

    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let user = self
            .authenticate(
                queries::LOGIN_USER,
                json!({ "input": { "email": email, "password": password } }),
                "loginUser",
            )
            .await?;
        Ok(user.into_session(Plan::Pro))
    }

    async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> RemoteResult<Session> {
        let user = self
            .authenticate(
                queries::REGISTER_USER,
                json!({ "input": {
                    "firstName": first_name,
                    "lastName": last_name,
                    "email": email,
                    "password": password,
                } }),
                "createUser",
            )
            .await?;
        Ok(user.into_session(Plan::Free))
    }
}
