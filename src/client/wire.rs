//! Response shapes as the backend sends them, and their conversion into model types.

use crate::error::RemoteError;
use crate::model::{
    AtsResult, AtsResultData, DocumentRecord, Entity, EntityKind, GeneratedOutput, JobPosting,
    OutputKind, Plan, ResumeRecord, Session, SkillGapResult,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub message: String,
}

impl GraphQlResponse {
    /// Data map, or `ServerRejected` carrying every GraphQL error message.
    pub fn into_data(self) -> Result<serde_json::Map<String, Value>, RemoteError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RemoteError::rejected(message));
        }
        self.data
            .ok_or_else(|| RemoteError::rejected("response carried neither data nor errors"))
    }
}

/// Decode `data[field]`. A missing or `null` field is `None`.
pub(super) fn field<T: DeserializeOwned>(
    data: &mut serde_json::Map<String, Value>,
    name: &str,
) -> Result<Option<T>, RemoteError> {
    match data.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| RemoteError::rejected(format!("malformed `{name}`: {e}"))),
    }
}

pub(super) fn required<T: DeserializeOwned>(
    data: &mut serde_json::Map<String, Value>,
    name: &str,
) -> Result<T, RemoteError> {
    field(data, name)?.ok_or_else(|| RemoteError::rejected(format!("`{name}` missing from response")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl WireUser {
    pub fn into_session(self, plan: Plan) -> Session {
        Session {
            id: self.id,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            avatar: None,
            plan,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ResumeUploadResponse {
    pub resume: IdOnly,
}

#[derive(Debug, Deserialize)]
pub(super) struct IdOnly {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireDocument {
    pub id: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationResponse {
    #[serde(default)]
    pub saved_cover_letter: Option<WireDocument>,
    #[serde(default)]
    pub cold_email: Option<WireDocument>,
}

impl GenerationResponse {
    pub fn into_output(self, kind: OutputKind) -> Result<GeneratedOutput, RemoteError> {
        let doc = match kind {
            OutputKind::CoverLetter => self.saved_cover_letter,
            OutputKind::ColdEmail => self.cold_email,
        }
        .ok_or_else(|| {
            RemoteError::rejected(format!("no {} in response", kind.backend_path()))
        })?;
        Ok(GeneratedOutput {
            id: doc.id,
            kind,
            data: doc.data,
            file_url: doc.file_url,
            created_at: doc.created_at,
            user_id: doc.user_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SkillGapResponse {
    pub message: SkillGapResult,
}

/// `Issues`/`suggestions` arrive as a string or a list of strings.
fn text_of(v: Option<Value>) -> String {
    match v {
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|i| match i {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireAts {
    pub score: f64,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(rename = "Issues", default)]
    pub issues: Option<Value>,
    #[serde(default)]
    pub suggestions: Option<Value>,
    #[serde(default)]
    pub ats_result_data: Option<Value>,
}

impl WireAts {
    pub fn into_result(self) -> Result<AtsResult, RemoteError> {
        let ats_result_data = match self.ats_result_data {
            None | Some(Value::Null) => AtsResultData::default(),
            // Some deployments send the breakdown as a JSON-encoded string.
            Some(Value::String(raw)) => serde_json::from_str(&raw)
                .map_err(|e| RemoteError::rejected(format!("malformed atsResultData: {e}")))?,
            Some(v) => serde_json::from_value(v)
                .map_err(|e| RemoteError::rejected(format!("malformed atsResultData: {e}")))?,
        };
        Ok(AtsResult {
            score: self.score,
            missing_skills: self.missing_skills,
            issues: text_of(self.issues),
            suggestions: text_of(self.suggestions),
            ats_result_data,
        })
    }
}

pub(super) fn entity_from_value(kind: EntityKind, v: Value) -> Result<Entity, RemoteError> {
    let malformed = |e: serde_json::Error| {
        RemoteError::rejected(format!("malformed {} record: {e}", kind.label()))
    };
    Ok(match kind {
        EntityKind::Job => Entity::Job(serde_json::from_value::<JobPosting>(v).map_err(malformed)?),
        EntityKind::Resume => {
            Entity::Resume(serde_json::from_value::<ResumeRecord>(v).map_err(malformed)?)
        }
        EntityKind::CoverLetter => {
            Entity::CoverLetter(serde_json::from_value::<DocumentRecord>(v).map_err(malformed)?)
        }
        EntityKind::ColdEmail => {
            Entity::ColdEmail(serde_json::from_value::<DocumentRecord>(v).map_err(malformed)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn graphql_errors_become_rejections() {
        let resp: GraphQlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "User not found"}, {"message": "bad password"}]
        }))
        .unwrap();
        let err = resp.into_data().unwrap_err();
        assert_eq!(
            err.to_string(),
            "server rejected request: User not found; bad password"
        );
    }

    #[test]
    fn null_field_is_none_not_error() {
        let mut data = json!({"getJobbyId": null}).as_object().cloned().unwrap();
        let job: Option<Value> = field(&mut data, "getJobbyId").unwrap();
        assert!(job.is_none());
    }

    #[test]
    fn ats_breakdown_accepts_encoded_string() {
        let wire: WireAts = serde_json::from_value(json!({
            "score": 78,
            "missingSkills": ["Docker"],
            "Issues": ["No summary", "Dense layout"],
            "suggestions": "Add a summary",
            "atsResultData": "{\"structure\":\"Good\",\"formatting\":\"Fair\",\"readability\":\"High\",\"keywordDensity\":\"3%\",\"sectionCoverage\":[\"Education\",\"Skills\"]}"
        }))
        .unwrap();
        let ats = wire.into_result().unwrap();
        assert_eq!(ats.score, 78.0);
        assert_eq!(ats.issues, "No summary\nDense layout");
        assert_eq!(ats.ats_result_data.keyword_density, "3%");
        assert_eq!(ats.ats_result_data.section_coverage.len(), 2);
    }

    #[test]
    fn generation_picks_the_slot_for_its_kind() {
        let resp: GenerationResponse = serde_json::from_value(json!({
            "savedCoverLetter": {"id": "cl1", "data": "Dear...", "userId": "u1"}
        }))
        .unwrap();
        let out = resp.into_output(OutputKind::CoverLetter).unwrap();
        assert_eq!(out.id, "cl1");
        assert_eq!(out.data.as_deref(), Some("Dear..."));

        let resp: GenerationResponse =
            serde_json::from_value(json!({"savedCoverLetter": {"id": "cl1"}})).unwrap();
        assert!(resp.into_output(OutputKind::ColdEmail).is_err());
    }
}
