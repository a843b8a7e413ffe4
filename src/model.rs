use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the backend client and the workflows built on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub graphql_path: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
    pub progress_script: bool,
    pub data_dir: Option<PathBuf>,
    pub ephemeral: bool,
}

impl ClientConfig {
    pub fn graphql_url(&self) -> String {
        format!(
            "{}{}",
            self.api_url.trim_end_matches('/'),
            self.graphql_path
        )
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

/// Authenticated user, persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub plan: Plan,
}

impl Session {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedResumeRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedJobRef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Job board the posting URL belongs to; passed to the backend scraper as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    #[default]
    Greenhouse,
    Workday,
    Jobslever,
    Jobsvite,
    Keka,
}

impl JobSource {
    pub const ALL: [JobSource; 5] = [
        JobSource::Greenhouse,
        JobSource::Workday,
        JobSource::Jobslever,
        JobSource::Jobsvite,
        JobSource::Keka,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobSource::Greenhouse => "greenhouse",
            JobSource::Workday => "workday",
            JobSource::Jobslever => "jobslever",
            JobSource::Jobsvite => "jobsvite",
            JobSource::Keka => "keka",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobSource::Greenhouse => "Greenhouse",
            JobSource::Workday => "Workday",
            JobSource::Jobslever => "JobsLever",
            JobSource::Jobsvite => "JobsVite",
            JobSource::Keka => "Keka",
        }
    }

    /// Cycle to the next source (used by the TUI selector).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|src| src.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown job source: {s}"))
    }
}

/// What the wizard generates. The UI calls these `cover-letter` and `email`;
/// the backend calls them `cover_letter` and `cold_email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    CoverLetter,
    ColdEmail,
}

impl OutputKind {
    pub fn backend_path(self) -> &'static str {
        match self {
            OutputKind::CoverLetter => "cover_letter",
            OutputKind::ColdEmail => "cold_email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputKind::CoverLetter => "Cover letter",
            OutputKind::ColdEmail => "Cold email",
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover-letter" | "cover_letter" | "letter" => Ok(OutputKind::CoverLetter),
            "email" | "cold-email" | "cold_email" => Ok(OutputKind::ColdEmail),
            other => Err(format!(
                "unknown output type: {other} (expected cover-letter or email)"
            )),
        }
    }
}

/// A generated cover letter or cold email as saved by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutput {
    pub id: String,
    pub kind: OutputKind,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGapResult {
    pub match_percentage: String,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchBand {
    Strong,
    Moderate,
    Weak,
}

impl SkillGapResult {
    /// Leading integer of `match_percentage` ("72%" -> 72), clamped to 100.
    pub fn match_value(&self) -> Option<u8> {
        let digits: String = self
            .match_percentage
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<u32>().ok().map(|v| v.min(100) as u8)
    }

    pub fn band(&self) -> MatchBand {
        match self.match_value().unwrap_or(0) {
            80..=u8::MAX => MatchBand::Strong,
            60..=79 => MatchBand::Moderate,
            _ => MatchBand::Weak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AtsResultData {
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub formatting: String,
    #[serde(default)]
    pub readability: String,
    #[serde(default)]
    pub keyword_density: String,
    #[serde(default)]
    pub section_coverage: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsResult {
    pub score: f64,
    #[serde(rename = "missingSkills", default)]
    pub missing_skills: Vec<String>,
    #[serde(rename = "Issues", default)]
    pub issues: String,
    #[serde(default)]
    pub suggestions: String,
    #[serde(rename = "atsResultData", default)]
    pub ats_result_data: AtsResultData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
}

/// Cover letter or cold email record returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub duration: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkillSet {
    pub programming_languages: Vec<String>,
    pub frameworks_and_tools: Vec<String>,
    pub databases: Vec<String>,
    pub areas_of_interest: Vec<String>,
}

/// Parsed resume as stored by the backend. `resume_data` is free-form JSON whose
/// section keys come back in either capitalisation, so it is read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(rename = "resume_data", default)]
    pub resume_data: serde_json::Value,
}

fn section<'a>(data: &'a serde_json::Value, keys: &[&str]) -> Option<&'a serde_json::Value> {
    keys.iter()
        .filter_map(|k| data.get(*k))
        .find(|v| !v.is_null())
}

fn str_field(v: &serde_json::Value, keys: &[&str]) -> String {
    section(v, keys)
        .map(|f| match f {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn str_list(v: Option<&serde_json::Value>) -> Vec<String> {
    v.and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn entries(data: &serde_json::Value, keys: &[&str]) -> Vec<serde_json::Value> {
    section(data, keys)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

impl ResumeRecord {
    pub fn name(&self) -> Option<String> {
        let name = str_field(&self.resume_data, &["Name", "name"]);
        (!name.is_empty()).then_some(name)
    }

    pub fn education(&self) -> Vec<EducationEntry> {
        entries(&self.resume_data, &["Education", "education"])
            .iter()
            .map(|e| {
                let gpa = str_field(e, &["gpa"]);
                let pct = str_field(e, &["percentage"]);
                EducationEntry {
                    degree: str_field(e, &["degree"]),
                    school: str_field(e, &["school"]),
                    duration: str_field(e, &["duration"]),
                    grade: if !gpa.is_empty() {
                        Some(format!("GPA: {gpa}"))
                    } else if !pct.is_empty() {
                        Some(format!("Percentage: {pct}"))
                    } else {
                        None
                    },
                }
            })
            .collect()
    }

    pub fn experience(&self) -> Vec<ExperienceEntry> {
        entries(&self.resume_data, &["Experience", "experience"])
            .iter()
            .map(|e| ExperienceEntry {
                role: str_field(e, &["role"]),
                company: str_field(e, &["company"]),
                duration: str_field(e, &["duration"]),
                key_points: str_list(e.get("key_points")),
            })
            .collect()
    }

    pub fn projects(&self) -> Vec<ProjectEntry> {
        entries(&self.resume_data, &["Projects", "projects"])
            .iter()
            .map(|p| ProjectEntry {
                name: str_field(p, &["name"]),
                description: str_field(p, &["description"]),
                technologies: str_list(p.get("technologies")),
            })
            .collect()
    }

    pub fn skills(&self) -> SkillSet {
        let Some(skills) = section(&self.resume_data, &["skills", "Skills"]) else {
            return SkillSet::default();
        };
        SkillSet {
            programming_languages: str_list(skills.get("programmingLanguages")),
            frameworks_and_tools: str_list(skills.get("frameworksAndTools")),
            databases: str_list(skills.get("databases")),
            areas_of_interest: str_list(skills.get("areasOfInterest")),
        }
    }

    pub fn achievements(&self) -> Vec<String> {
        str_list(section(
            &self.resume_data,
            &["Achievements", "achievements"],
        ))
    }

    pub fn positions_of_responsibility(&self) -> Vec<String> {
        entries(
            &self.resume_data,
            &["Positions of Responsibility", "positionsOfResponsibility"],
        )
        .iter()
        .map(|p| {
            let title = str_field(p, &["title", "role"]);
            let description = str_field(p, &["description"]);
            if description.is_empty() {
                title
            } else {
                format!("{title} at {description}")
            }
        })
        .collect()
    }
}

/// Kinds of records the backend can look up by id or list per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    Resume,
    CoverLetter,
    ColdEmail,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Job => "Job",
            EntityKind::Resume => "Resume",
            EntityKind::CoverLetter => "Cover letter",
            EntityKind::ColdEmail => "Cold email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Entity {
    Job(JobPosting),
    Resume(ResumeRecord),
    CoverLetter(DocumentRecord),
    ColdEmail(DocumentRecord),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Job(_) => EntityKind::Job,
            Entity::Resume(_) => EntityKind::Resume,
            Entity::CoverLetter(_) => EntityKind::CoverLetter,
            Entity::ColdEmail(_) => EntityKind::ColdEmail,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Job(j) => &j.id,
            Entity::Resume(r) => &r.id,
            Entity::CoverLetter(d) | Entity::ColdEmail(d) => &d.id,
        }
    }

    /// Plain text body, if this entity carries one worth copying or exporting.
    pub fn text(&self) -> Option<&str> {
        match self {
            Entity::CoverLetter(d) | Entity::ColdEmail(d) => d.data.as_deref(),
            Entity::Job(j) => j.description.as_deref(),
            Entity::Resume(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_band_follows_percentage() {
        let mut r = SkillGapResult {
            match_percentage: "72%".into(),
            matching_skills: vec!["React".into()],
            missing_skills: vec!["Go".into()],
            feedback: String::new(),
        };
        assert_eq!(r.match_value(), Some(72));
        assert_eq!(r.band(), MatchBand::Moderate);

        r.match_percentage = "85".into();
        assert_eq!(r.band(), MatchBand::Strong);

        r.match_percentage = "n/a".into();
        assert_eq!(r.match_value(), None);
        assert_eq!(r.band(), MatchBand::Weak);
    }

    #[test]
    fn resume_accessors_accept_either_capitalisation() {
        let upper = ResumeRecord {
            id: "r1".into(),
            file_url: None,
            resume_data: json!({
                "Name": "Ada Lovelace",
                "Education": [{"degree": "BSc", "school": "UCL", "duration": "2019-2022", "gpa": "3.9"}],
                "Skills": {"programmingLanguages": ["Rust", "Go"]},
                "Positions of Responsibility": [{"title": "Lead", "description": "Robotics Club"}]
            }),
        };
        assert_eq!(upper.name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(upper.education()[0].grade.as_deref(), Some("GPA: 3.9"));
        assert_eq!(upper.skills().programming_languages, vec!["Rust", "Go"]);
        assert_eq!(upper.positions_of_responsibility(), vec!["Lead at Robotics Club"]);

        let lower = ResumeRecord {
            id: "r2".into(),
            file_url: None,
            resume_data: json!({
                "name": "Grace Hopper",
                "experience": [{"role": "Engineer", "company": "Navy", "duration": "1943-1986", "key_points": ["COBOL"]}],
                "projects": [{"name": "A-0", "description": "Compiler", "technologies": ["UNIVAC"]}]
            }),
        };
        assert_eq!(lower.name().as_deref(), Some("Grace Hopper"));
        assert_eq!(lower.experience()[0].key_points, vec!["COBOL"]);
        assert_eq!(lower.projects()[0].technologies, vec!["UNIVAC"]);
        assert!(lower.achievements().is_empty());
        assert_eq!(lower.skills(), SkillSet::default());
    }

    #[test]
    fn output_kind_parses_ui_and_backend_names() {
        assert_eq!("cover-letter".parse::<OutputKind>(), Ok(OutputKind::CoverLetter));
        assert_eq!("email".parse::<OutputKind>(), Ok(OutputKind::ColdEmail));
        assert_eq!("cold_email".parse::<OutputKind>(), Ok(OutputKind::ColdEmail));
        assert!("memo".parse::<OutputKind>().is_err());
        assert_eq!(OutputKind::ColdEmail.backend_path(), "cold_email");
    }

    #[test]
    fn job_source_cycles_through_all_boards() {
        let mut src = JobSource::default();
        for _ in 0..JobSource::ALL.len() {
            src = src.next();
        }
        assert_eq!(src, JobSource::Greenhouse);
        assert_eq!("Workday".parse::<JobSource>(), Ok(JobSource::Workday));
    }
}
