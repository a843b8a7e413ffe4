//! Route table and the sign-in guard.

use crate::error::StoreError;
use crate::model::EntityKind;
use crate::store::KeyedStore;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "id", rename_all = "snake_case")]
pub enum Route {
    Home,
    Auth,
    Results,
    CoverLetterTemplates,
    EmailTemplates,
    Dashboard,
    CoverLetter(String),
    Job(String),
    Email(String),
    Resume(String),
    Ats,
    SkillAnalysis,
}

impl Route {
    /// Resolve a path. Anything unrecognised lands on `/`.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        let mut parts = trimmed.trim_start_matches('/').splitn(2, '/');
        let head = parts.next().unwrap_or("");
        let tail = parts.next().map(str::trim).filter(|s| !s.is_empty() && !s.contains('/'));
        match (head, tail) {
            ("", None) => Route::Home,
            ("auth", None) => Route::Auth,
            ("results", None) => Route::Results,
            ("cover-letters", None) => Route::CoverLetterTemplates,
            ("email-templates", None) => Route::EmailTemplates,
            ("dashboard", None) => Route::Dashboard,
            ("ats", None) => Route::Ats,
            ("skill-analysis", None) => Route::SkillAnalysis,
            ("cover_letter", Some(id)) => Route::CoverLetter(id.to_string()),
            ("job", Some(id)) => Route::Job(id.to_string()),
            ("email", Some(id)) => Route::Email(id.to_string()),
            ("resume", Some(id)) => Route::Resume(id.to_string()),
            _ => {
                tracing::debug!(path, "unknown route");
                Route::Home
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Auth => "/auth".into(),
            Route::Results => "/results".into(),
            Route::CoverLetterTemplates => "/cover-letters".into(),
            Route::EmailTemplates => "/email-templates".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::CoverLetter(id) => format!("/cover_letter/{id}"),
            Route::Job(id) => format!("/job/{id}"),
            Route::Email(id) => format!("/email/{id}"),
            Route::Resume(id) => format!("/resume/{id}"),
            Route::Ats => "/ats".into(),
            Route::SkillAnalysis => "/skill-analysis".into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Auth => "Sign in",
            Route::Results => "Results",
            Route::CoverLetterTemplates => "Cover letter templates",
            Route::EmailTemplates => "Email templates",
            Route::Dashboard => "Dashboard",
            Route::CoverLetter(_) => "Cover letter",
            Route::Job(_) => "Job",
            Route::Email(_) => "Cold email",
            Route::Resume(_) => "Resume",
            Route::Ats => "ATS check",
            Route::SkillAnalysis => "Skill gap",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Home | Route::Auth | Route::Results)
    }

    /// Record this route shows by id, if it is a detail view.
    pub fn document(&self) -> Option<(EntityKind, &str)> {
        match self {
            Route::CoverLetter(id) => Some((EntityKind::CoverLetter, id.as_str())),
            Route::Job(id) => Some((EntityKind::Job, id.as_str())),
            Route::Email(id) => Some((EntityKind::ColdEmail, id.as_str())),
            Route::Resume(id) => Some((EntityKind::Resume, id.as_str())),
            _ => None,
        }
    }

    /// Detail view for a record.
    pub fn for_entity(kind: EntityKind, id: &str) -> Self {
        let id = id.to_string();
        match kind {
            EntityKind::CoverLetter => Route::CoverLetter(id),
            EntityKind::Job => Route::Job(id),
            EntityKind::ColdEmail => Route::Email(id),
            EntityKind::Resume => Route::Resume(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where navigation to `route` actually ends up.
pub fn guard(route: Route, authenticated: bool) -> Route {
    if route.requires_session() && !authenticated {
        tracing::debug!(requested = %route, "redirecting to sign-in");
        Route::Auth
    } else {
        route
    }
}

/// Resolve, guard and apply the route's entry effects.
pub fn navigate(path: &str, authenticated: bool, store: &KeyedStore) -> Result<Route, StoreError> {
    let route = guard(Route::parse(path), authenticated);
    if route == Route::Results {
        store.clear_generation_flags()?;
    }
    Ok(route)
}
