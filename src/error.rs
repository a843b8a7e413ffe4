//! Error taxonomy shared by the client facade, the store and the workflows.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Network,
    ServerRejected,
    InvalidCredentials,
}

/// Failure of a single backend call. Never retried.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected request{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ServerRejected {
        status: Option<u16>,
        message: String,
    },

    #[error("invalid credentials")]
    InvalidCredentials,
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::Network(_) => RemoteErrorKind::Network,
            RemoteError::ServerRejected { .. } => RemoteErrorKind::ServerRejected,
            RemoteError::InvalidCredentials => RemoteErrorKind::InvalidCredentials,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        RemoteError::ServerRejected {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::ServerRejected {
                status: err.status().map(|s| s.as_u16()),
                message: format!("malformed response: {err}"),
            }
        } else if let Some(status) = err.status() {
            RemoteError::ServerRejected {
                status: Some(status.as_u16()),
                message: err.to_string(),
            }
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no data directory available; pass --data-dir or --ephemeral")]
    NoDataDir,
}

/// The user-facing action a remote failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    UploadResume,
    UploadJob,
    Generate,
    SkillGap,
    Ats,
    Login,
    Register,
    Lookup,
}

impl Action {
    /// Plain-language alert text shown when this action fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::UploadResume => "Failed to upload resume",
            Action::UploadJob => "Failed to fetch job data",
            Action::Generate => "Failed to generate output",
            Action::SkillGap => "Failed to analyze skill gap",
            Action::Ats => "Failed to run ATS analysis",
            Action::Login => "Invalid credentials",
            Action::Register => "Could not register user",
            Action::Lookup => "Failed to load data",
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A required prior identifier is absent; raised before any network call.
    #[error("missing {0}; complete the earlier step first")]
    MissingPrerequisite(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{}", .action.failure_message())]
    Remote {
        action: Action,
        #[source]
        source: RemoteError,
    },

    #[error("could not persist state: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    pub fn remote(action: Action) -> impl FnOnce(RemoteError) -> Self {
        move |source| {
            tracing::warn!(?action, kind = ?source.kind(), error = %source, "remote call failed");
            WorkflowError::Remote { action, source }
        }
    }

    /// Text for the blocking alert popup.
    pub fn alert_text(&self) -> String {
        match self {
            WorkflowError::Remote { action, source } => {
                format!("{}\n\n{source}", action.failure_message())
            }
            other => other.to_string(),
        }
    }
}

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_render_plain_language() {
        let err = WorkflowError::remote(Action::UploadResume)(RemoteError::Network(
            "connection refused".into(),
        ));
        assert_eq!(err.to_string(), "Failed to upload resume");
        assert!(err.alert_text().contains("connection refused"));
    }

    #[test]
    fn rejected_status_is_shown_when_known() {
        let err = RemoteError::ServerRejected {
            status: Some(422),
            message: "bad url".into(),
        };
        assert_eq!(err.to_string(), "server rejected request (422): bad url");
        assert_eq!(err.kind(), RemoteErrorKind::ServerRejected);
        assert_eq!(
            RemoteError::rejected("x").to_string(),
            "server rejected request: x"
        );
    }
}
