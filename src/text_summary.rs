//! Text summary builders for CLI output.
//!
//! Each builder formats one view as plain lines; the TUI reuses them for
//! document bodies and the clipboard.

use crate::model::{
    AtsResult, DocumentRecord, Entity, EntityKind, GeneratedOutput, JobPosting, MatchBand,
    ResumeRecord, Session, SkillGapResult,
};
use crate::templates::Template;
use crate::workflow::results::{Dashboard, Listing, Lookup, ResultSet};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

impl TextSummary {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn field(&mut self, label: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.lines.push(format!("{label}: {v}"));
        }
    }

    fn list(&mut self, label: &str, items: &[String]) {
        if !items.is_empty() {
            self.lines.push(format!("{label}: {}", items.join(", ")));
        }
    }

    fn body(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub(crate) fn session_summary(session: Option<&Session>) -> TextSummary {
    let mut s = TextSummary::new();
    match session {
        Some(user) => {
            s.push(format!("Signed in as {} <{}>", user.display_name(), user.email));
            s.push(format!("User id: {}", user.id));
            s.push(format!("Plan: {}", format!("{:?}", user.plan).to_lowercase()));
        }
        None => s.push("Not signed in"),
    }
    s
}

pub(crate) fn output_summary(out: &GeneratedOutput) -> TextSummary {
    let mut s = TextSummary::new();
    s.push(format!("== {} ({}) ==", out.kind.label(), out.id));
    s.field("File", out.file_url.as_deref());
    s.body(out.data.as_deref().unwrap_or("(no text returned)"));
    s
}

fn job_lines(s: &mut TextSummary, job: &JobPosting) {
    s.push(format!(
        "{}{}",
        job.title.as_deref().unwrap_or("Untitled job"),
        job.company
            .as_deref()
            .map(|c| format!(" at {c}"))
            .unwrap_or_default()
    ));
    s.field("Location", job.location.as_deref());
    s.field("Type", job.job_type.as_deref());
    s.field("URL", job.url.as_deref());
    if let Some(d) = job.description.as_deref().filter(|d| !d.trim().is_empty()) {
        s.push("");
        s.body(d);
    }
}

fn resume_lines(s: &mut TextSummary, resume: &ResumeRecord) {
    s.push(resume.name().unwrap_or_else(|| "Unnamed resume".into()));
    s.field("File", resume.file_url.as_deref());

    let education = resume.education();
    if !education.is_empty() {
        s.push("Education:");
        for e in education {
            let grade = e.grade.map(|g| format!(", {g}")).unwrap_or_default();
            s.push(format!("  {} - {} ({}{grade})", e.degree, e.school, e.duration));
        }
    }
    let experience = resume.experience();
    if !experience.is_empty() {
        s.push("Experience:");
        for e in experience {
            s.push(format!("  {} at {} ({})", e.role, e.company, e.duration));
            for point in e.key_points {
                s.push(format!("    - {point}"));
            }
        }
    }
    let projects = resume.projects();
    if !projects.is_empty() {
        s.push("Projects:");
        for p in projects {
            s.push(format!("  {}: {}", p.name, p.description));
            if !p.technologies.is_empty() {
                s.push(format!("    [{}]", p.technologies.join(", ")));
            }
        }
    }
    let skills = resume.skills();
    s.list("Languages", &skills.programming_languages);
    s.list("Frameworks & tools", &skills.frameworks_and_tools);
    s.list("Databases", &skills.databases);
    s.list("Interests", &skills.areas_of_interest);
    s.list("Achievements", &resume.achievements());
    s.list("Positions", &resume.positions_of_responsibility());
}

fn document_lines(s: &mut TextSummary, doc: &DocumentRecord) {
    s.field("File", doc.file_url.as_deref());
    s.body(doc.data.as_deref().unwrap_or("(empty)"));
}

pub(crate) fn entity_summary(entity: &Entity) -> TextSummary {
    let mut s = TextSummary::new();
    s.push(format!("== {} ({}) ==", entity.kind().label(), entity.id()));
    match entity {
        Entity::Job(job) => job_lines(&mut s, job),
        Entity::Resume(resume) => resume_lines(&mut s, resume),
        Entity::CoverLetter(doc) | Entity::ColdEmail(doc) => document_lines(&mut s, doc),
    }
    s
}

pub(crate) fn results_summary(results: &ResultSet) -> TextSummary {
    let mut s = TextSummary::new();
    for card in &results.cards {
        match &card.lookup {
            Lookup::Loaded(entity) => {
                s.lines.extend(entity_summary(entity).lines);
                s.push("");
            }
            Lookup::Failed(err) => {
                tracing::debug!(kind = card.kind.label(), error = %err, "card omitted");
            }
            Lookup::Missing | Lookup::Skipped => {}
        }
    }
    if s.lines.is_empty() {
        s.push("Nothing to show yet. Run `careercraft apply` first.");
    }
    s
}

fn band_label(band: MatchBand) -> &'static str {
    match band {
        MatchBand::Strong => "strong match",
        MatchBand::Moderate => "moderate match",
        MatchBand::Weak => "weak match",
    }
}

pub(crate) fn skill_gap_summary(result: &SkillGapResult) -> TextSummary {
    let mut s = TextSummary::new();
    s.push(format!(
        "Match: {} ({})",
        result.match_percentage,
        band_label(result.band())
    ));
    s.push(format!(
        "Matching skills ({}): {}",
        result.matching_skills.len(),
        result.matching_skills.join(", ")
    ));
    s.push(format!(
        "Missing skills ({}): {}",
        result.missing_skills.len(),
        result.missing_skills.join(", ")
    ));
    if !result.feedback.trim().is_empty() {
        s.push("");
        s.body(&result.feedback);
    }
    s
}

pub(crate) fn ats_summary(result: &AtsResult) -> TextSummary {
    let mut s = TextSummary::new();
    let data = &result.ats_result_data;
    s.push(format!("ATS score: {:.0}/100", result.score));
    s.field("Structure", Some(data.structure.as_str()));
    s.field("Formatting", Some(data.formatting.as_str()));
    s.field("Readability", Some(data.readability.as_str()));
    s.field("Keyword density", Some(data.keyword_density.as_str()));
    s.list("Sections found", &data.section_coverage);
    s.list("Missing skills", &result.missing_skills);
    if !result.issues.trim().is_empty() {
        s.push("Issues:");
        s.body(&result.issues);
    }
    if !result.suggestions.trim().is_empty() {
        s.push("Suggestions:");
        s.body(&result.suggestions);
    }
    s
}

pub(crate) fn entity_title(entity: &Entity) -> String {
    match entity {
        Entity::Job(j) => j.title.clone().unwrap_or_else(|| "Untitled job".into()),
        Entity::Resume(r) => r.name().unwrap_or_else(|| "Unnamed resume".into()),
        Entity::CoverLetter(d) | Entity::ColdEmail(d) => d
            .data
            .as_deref()
            .and_then(|t| t.lines().find(|l| !l.trim().is_empty()))
            .map(|l| l.chars().take(60).collect())
            .unwrap_or_else(|| "(empty)".into()),
    }
}

pub(crate) fn dashboard_summary(dash: &Dashboard) -> TextSummary {
    let mut s = TextSummary::new();
    for section in &dash.sections {
        match &section.listing {
            Listing::Loaded(items) => {
                s.push(format!("{} ({})", plural(section.kind), items.len()));
                for e in items {
                    s.push(format!("  {}  {}", e.id(), entity_title(e)));
                }
            }
            Listing::Failed(err) => {
                s.push(format!("{}: failed to load ({err})", plural(section.kind)));
            }
        }
    }
    s
}

fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Job => "Jobs",
        EntityKind::Resume => "Resumes",
        EntityKind::CoverLetter => "Cover letters",
        EntityKind::ColdEmail => "Cold emails",
    }
}

pub(crate) fn templates_summary(templates: &[&Template]) -> TextSummary {
    let mut s = TextSummary::new();
    for (i, t) in templates.iter().enumerate() {
        s.push(format!("{:>2}. {} [{}; {}]", i + 1, t.title, t.category, t.note));
        s.push(format!("    {}", t.description));
    }
    s
}

pub(crate) fn template_summary(t: &Template) -> TextSummary {
    let mut s = TextSummary::new();
    s.push(format!("== {} ==", t.title));
    s.push(format!("{} ({})", t.description, t.tags.join(", ")));
    s.push("");
    s.body(t.body);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::results::Card;

    #[test]
    fn skill_gap_lines_show_percentage_and_badges() {
        let s = skill_gap_summary(&SkillGapResult {
            match_percentage: "72%".into(),
            matching_skills: vec!["React".into()],
            missing_skills: vec!["Go".into()],
            feedback: "Pick up Go".into(),
        });
        assert_eq!(s.lines[0], "Match: 72% (moderate match)");
        assert_eq!(s.lines[1], "Matching skills (1): React");
        assert_eq!(s.lines[2], "Missing skills (1): Go");
        assert_eq!(s.lines.last().map(String::as_str), Some("Pick up Go"));
    }

    #[test]
    fn results_skip_failed_cards() {
        let results = ResultSet {
            cards: vec![
                Card {
                    kind: EntityKind::CoverLetter,
                    id: Some("cl1".into()),
                    lookup: Lookup::Loaded(Entity::CoverLetter(DocumentRecord {
                        id: "cl1".into(),
                        file_url: None,
                        data: Some("Dear Hiring Manager,\nHello".into()),
                        user_id: None,
                    })),
                },
                Card {
                    kind: EntityKind::Resume,
                    id: Some("r1".into()),
                    lookup: Lookup::Failed("timeout".into()),
                },
            ],
        };
        let text = results_summary(&results).text();
        assert!(text.contains("Dear Hiring Manager,"));
        assert!(!text.contains("Resume"));
    }

    #[test]
    fn empty_results_point_at_apply() {
        let text = results_summary(&ResultSet::default()).text();
        assert!(text.contains("careercraft apply"));
    }
}
