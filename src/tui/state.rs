use crate::model::{Entity, EntityKind, GeneratedOutput, JobSource, OutputKind, Session, Theme};
use crate::orchestrator::AppEvent;
use crate::router::Route;
use crate::templates::TemplateKind;
use crate::workflow::ats::AtsFlow;
use crate::workflow::results::{Dashboard, ResultSet};
use crate::workflow::skill_gap::SkillGapFlow;
use crate::workflow::wizard::{Wizard, WizardInputs, WizardStep};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::PathBuf;

/// Top-level tabs, in header order.
pub const TABS: [(&str, &str); 7] = [
    ("Home", "/"),
    ("Results", "/results"),
    ("Dashboard", "/dashboard"),
    ("Cover letters", "/cover-letters"),
    ("Emails", "/email-templates"),
    ("ATS", "/ats"),
    ("Skill gap", "/skill-analysis"),
];

pub const HELP_TAB: usize = TABS.len();

pub const DASHBOARD_ORDER: [EntityKind; 4] = [
    EntityKind::Job,
    EntityKind::Resume,
    EntityKind::CoverLetter,
    EntityKind::ColdEmail,
];

/// Text field currently receiving keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ResumePath,
    KnownResumeId,
    JobUrl,
    SkillResumeId,
    SkillJobId,
    AtsResumeId,
    AtsPath,
    TemplateSearch,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub register: bool,
    /// First name, last name, email, password.
    pub fields: [String; 4],
    pub focus: usize,
}

impl AuthForm {
    /// Fields shown in the current mode.
    pub fn visible(&self) -> &'static [usize] {
        if self.register {
            &[0, 1, 2, 3]
        } else {
            &[2, 3]
        }
    }

    pub fn label(idx: usize) -> &'static str {
        match idx {
            0 => "First name",
            1 => "Last name",
            2 => "Email",
            _ => "Password",
        }
    }

    pub fn toggle_mode(&mut self) {
        self.register = !self.register;
        self.focus = 0;
    }

    pub fn move_focus(&mut self, down: bool) {
        let n = self.visible().len();
        self.focus = if down {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        let idx = self.visible()[self.focus.min(self.visible().len() - 1)];
        &mut self.fields[idx]
    }
}

/// Editable copy of the wizard inputs.
#[derive(Debug, Clone, Default)]
pub struct WizardForm {
    pub resume_path: String,
    pub known_resume_id: String,
    pub job_url: String,
    pub job_source: JobSource,
    pub output_kind: Option<OutputKind>,
}

impl WizardForm {
    pub fn from_inputs(inputs: &WizardInputs) -> Self {
        Self {
            resume_path: inputs
                .resume_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            known_resume_id: inputs.known_resume_id.clone(),
            job_url: inputs.job_url.clone(),
            job_source: inputs.job_source,
            output_kind: inputs.output_kind,
        }
    }

    pub fn to_inputs(&self) -> WizardInputs {
        let path = self.resume_path.trim();
        WizardInputs {
            resume_path: (!path.is_empty()).then(|| PathBuf::from(path)),
            known_resume_id: self.known_resume_id.trim().to_string(),
            job_url: self.job_url.trim().to_string(),
            job_source: self.job_source,
            output_kind: self.output_kind,
        }
    }

    pub fn cycle_output(&mut self) {
        self.output_kind = match self.output_kind {
            None | Some(OutputKind::ColdEmail) => Some(OutputKind::CoverLetter),
            Some(OutputKind::CoverLetter) => Some(OutputKind::ColdEmail),
        };
    }
}

pub struct UiState {
    pub route: Route,
    /// Last list view, for going back from a detail view.
    pub back: Route,
    pub show_help: bool,
    pub info: String,
    pub alert: Option<String>,
    pub session: Option<Session>,
    pub theme: Theme,
    pub editing: Option<Field>,

    pub auth: AuthForm,

    pub wizard_open: bool,
    pub wizard: Option<Wizard>,
    pub wizard_form: WizardForm,
    pub progress: Option<String>,
    pub last_output: Option<GeneratedOutput>,

    pub results: Option<ResultSet>,
    pub results_selected: usize,

    pub dashboard: Option<Dashboard>,
    pub dashboard_section: usize,
    pub dashboard_selected: usize,

    /// `None` while loading, `Some(None)` when the record does not exist.
    pub document: Option<Option<Entity>>,

    pub template_selected: usize,
    pub template_query: String,

    pub skill_gap: Option<SkillGapFlow>,
    pub skill_resume_id: String,
    pub skill_job_id: String,

    pub ats: Option<AtsFlow>,
    pub ats_resume_id: String,
    pub ats_path: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            back: Route::Home,
            show_help: false,
            info: String::new(),
            alert: None,
            session: None,
            theme: Theme::default(),
            editing: None,
            auth: AuthForm::default(),
            wizard_open: false,
            wizard: None,
            wizard_form: WizardForm::default(),
            progress: None,
            last_output: None,
            results: None,
            results_selected: 0,
            dashboard: None,
            dashboard_section: 0,
            dashboard_selected: 0,
            document: None,
            template_selected: 0,
            template_query: String::new(),
            skill_gap: None,
            skill_resume_id: String::new(),
            skill_job_id: String::new(),
            ats: None,
            ats_resume_id: String::new(),
            ats_path: String::new(),
        }
    }
}

impl UiState {
    /// Header tab for the current view.
    pub fn tab(&self) -> usize {
        if self.show_help {
            return HELP_TAB;
        }
        let route = if self.route.document().is_some() {
            &self.back
        } else {
            &self.route
        };
        TABS.iter()
            .position(|(_, path)| *path == route.path())
            .unwrap_or(0)
    }

    pub fn template_kind(&self) -> Option<TemplateKind> {
        match self.route {
            Route::CoverLetterTemplates => Some(TemplateKind::CoverLetter),
            Route::EmailTemplates => Some(TemplateKind::Email),
            _ => None,
        }
    }

    pub fn dashboard_kind(&self) -> EntityKind {
        DASHBOARD_ORDER[self.dashboard_section % DASHBOARD_ORDER.len()]
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::ResumePath => &mut self.wizard_form.resume_path,
            Field::KnownResumeId => &mut self.wizard_form.known_resume_id,
            Field::JobUrl => &mut self.wizard_form.job_url,
            Field::SkillResumeId => &mut self.skill_resume_id,
            Field::SkillJobId => &mut self.skill_job_id,
            Field::AtsResumeId => &mut self.ats_resume_id,
            Field::AtsPath => &mut self.ats_path,
            Field::TemplateSearch => &mut self.template_query,
        }
    }

    pub fn apply(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Status(s) => self.info = s,
            AppEvent::Alert(msg) => {
                self.progress = None;
                self.alert = Some(msg);
            }
            AppEvent::Session(session) => {
                if session.is_none() {
                    self.wizard_open = false;
                    self.wizard = None;
                }
                self.auth.fields[3].clear();
                self.session = session;
            }
            AppEvent::Theme(theme) => self.theme = theme,
            AppEvent::Route(route) => {
                self.editing = None;
                self.show_help = false;
                if route.document().is_some() {
                    self.document = None;
                } else {
                    self.back = route.clone();
                }
                match route {
                    Route::Results => {
                        self.results = None;
                        self.results_selected = 0;
                    }
                    Route::Dashboard => self.dashboard = None,
                    Route::CoverLetterTemplates | Route::EmailTemplates => {
                        self.template_selected = 0;
                        self.template_query.clear();
                    }
                    _ => {}
                }
                self.route = route;
            }
            AppEvent::Wizard(wizard) => {
                if wizard.is_closed() {
                    self.wizard_open = false;
                }
                if !wizard.in_flight() {
                    self.progress = None;
                }
                if wizard.step() == WizardStep::Welcome {
                    self.wizard_form = WizardForm::from_inputs(&wizard.inputs);
                }
                self.wizard = Some(*wizard);
            }
            AppEvent::Progress(msg) => self.progress = Some(msg),
            AppEvent::Generated(output) => {
                self.info = format!("{} ready", output.kind.label());
                self.last_output = Some(output);
            }
            AppEvent::Results(set) => {
                let last = set.loaded().count().saturating_sub(1);
                self.results_selected = self.results_selected.min(last);
                self.results = Some(set);
            }
            AppEvent::Dashboard(dash) => {
                self.dashboard_selected = 0;
                self.dashboard = Some(dash);
            }
            AppEvent::Document(found) => self.document = Some(found),
            AppEvent::SkillGap(flow) => {
                if self.editing.is_none() {
                    self.skill_resume_id = flow.resume_id.clone();
                    self.skill_job_id = flow.job_id.clone();
                }
                self.skill_gap = Some(*flow);
            }
            AppEvent::Ats(flow) => {
                if self.editing.is_none() {
                    self.ats_resume_id = flow.resume_id.clone();
                    self.ats_path = flow
                        .resume_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                }
                self.ats = Some(*flow);
            }
        }
    }
}

/// Colours for the selected theme. `System` follows the terminal defaults.
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub key: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            accent: Color::Blue,
            text: Color::Black,
            muted: Color::DarkGray,
            key: Color::Magenta,
        },
        Theme::Dark => Palette {
            accent: Color::Yellow,
            text: Color::White,
            muted: Color::Gray,
            key: Color::Magenta,
        },
        Theme::System => Palette {
            accent: Color::Yellow,
            text: Color::Reset,
            muted: Color::Gray,
            key: Color::Magenta,
        },
    }
}

/// Wrap a `label: value` pair to the area width, indenting continuation lines.
pub fn push_wrapped_kv(out: &mut Vec<Line<'static>>, label: &str, value: &str, width: u16) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Borders take two columns each side.
    let usable_width = width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}
