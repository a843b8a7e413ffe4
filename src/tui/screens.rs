//! One draw function per page, plus the wizard and alert overlays.

use super::state::{palette, push_wrapped_kv, AuthForm, Field, Palette, UiState, DASHBOARD_ORDER};
use crate::model::{MatchBand, OutputKind};
use crate::templates;
use crate::text_summary::{self, TextSummary};
use crate::workflow::progress::PENDING_MESSAGE;
use crate::workflow::results::Listing;
use crate::workflow::skill_gap::SkillGapStep;
use crate::workflow::wizard::{Wizard, WizardStep};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Tabs, Wrap},
    Frame,
};

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn key(p: &Palette, k: &str) -> Span<'static> {
    Span::styled(k.to_string(), Style::default().fg(p.key))
}

fn hint(p: &Palette, parts: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (k, what)) in parts.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(key(p, k));
        spans.push(Span::styled(format!(" {what}"), Style::default().fg(p.muted)));
    }
    Line::from(spans)
}

fn field_line(p: &Palette, label: &str, value: &str, editing: bool, masked: bool) -> Line<'static> {
    let shown = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let value_style = if editing {
        Style::default().fg(p.accent).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(p.text)
    };
    let mut spans = vec![
        Span::styled(format!("{label}: "), Style::default().fg(p.muted)),
        Span::styled(if shown.is_empty() && !editing { "-".into() } else { shown }, value_style),
    ];
    if editing {
        spans.push(Span::styled("_", Style::default().fg(p.accent)));
    }
    Line::from(spans)
}

fn selectable(p: &Palette, items: Vec<String>, selected: usize) -> Vec<Line<'static>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if i == selected {
                Line::from(Span::styled(
                    format!("> {text}"),
                    Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(format!("  {text}"), Style::default().fg(p.text)))
            }
        })
        .collect()
}

fn summary_lines(summary: TextSummary) -> Vec<Line<'static>> {
    summary.lines.into_iter().map(Line::from).collect()
}

pub fn draw_auth(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let form = &state.auth;
    let title = if form.register { "Create account" } else { "Sign in" };

    let mut lines = vec![Line::from("")];
    for (pos, idx) in form.visible().iter().enumerate() {
        lines.push(field_line(
            &p,
            AuthForm::label(*idx),
            &form.fields[*idx],
            pos == form.focus,
            *idx == 3,
        ));
    }
    lines.push(Line::from(""));
    lines.push(hint(
        &p,
        &[
            ("Enter", "submit"),
            ("↑/↓", "field"),
            ("Ctrl-T", if form.register { "sign in instead" } else { "register instead" }),
            ("Esc", "home"),
        ],
    ));

    let height = lines.len() as u16 + 2;
    let rect = centered(area, 60, height);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        rect,
    );
}

pub fn draw_home(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let mut lines = vec![
        Line::from(Span::styled(
            "CareerCraft AI",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from("Tailored cover letters and cold emails from your resume and a job posting."),
        Line::from(""),
    ];
    match &state.session {
        Some(s) => lines.push(Line::from(format!("Signed in as {} <{}>", s.display_name(), s.email))),
        None => lines.push(hint(&p, &[("a", "sign in to save and revisit your documents")])),
    }
    lines.push(hint(&p, &[("n", "start a new application")]));

    if let Some(out) = &state.last_output {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Last generated: {} ({})", out.kind.label(), out.id),
            Style::default().fg(p.muted),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Home")),
        area,
    );

    if state.wizard_open {
        if let Some(wizard) = &state.wizard {
            draw_wizard(area, f, state, wizard);
        }
    }
}

fn step_dots(p: &Palette, current: WizardStep) -> Line<'static> {
    let mut spans = Vec::new();
    for i in 0..WizardStep::COUNT {
        let style = if i <= current.index() {
            Style::default().fg(p.accent)
        } else {
            Style::default().fg(p.muted)
        };
        spans.push(Span::styled(if i <= current.index() { "● " } else { "○ " }, style));
    }
    spans.push(Span::raw(format!(
        " Step {}/{}: {}",
        current.index() + 1,
        WizardStep::COUNT,
        current.title()
    )));
    Line::from(spans)
}

fn draw_wizard(area: Rect, f: &mut Frame, state: &UiState, wizard: &Wizard) {
    let p = palette(state.theme);
    let form = &state.wizard_form;
    let editing = state.editing;
    let step = wizard.step();

    let mut lines = vec![step_dots(&p, step), Line::from("")];
    match step {
        WizardStep::Welcome => {
            lines.push(Line::from("Upload your resume, point us at a job posting and pick"));
            lines.push(Line::from("what to write. We will draft it for you."));
        }
        WizardStep::ResumeInput => {
            lines.push(field_line(
                &p,
                "Resume file (PDF, max 10 MB)",
                &form.resume_path,
                editing == Some(Field::ResumePath),
                false,
            ));
            lines.push(field_line(
                &p,
                "or existing resume id",
                &form.known_resume_id,
                editing == Some(Field::KnownResumeId),
                false,
            ));
            lines.push(Line::from(""));
            lines.push(hint(&p, &[("f", "edit path"), ("i", "edit id")]));
        }
        WizardStep::JobInput => {
            lines.push(field_line(
                &p,
                "Job posting URL",
                &form.job_url,
                editing == Some(Field::JobUrl),
                false,
            ));
            lines.push(Line::from(vec![
                Span::styled("Job board: ", Style::default().fg(p.muted)),
                Span::raw(form.job_source.label()),
            ]));
            lines.push(Line::from(""));
            lines.push(hint(&p, &[("e", "edit URL"), ("s", "change board")]));
        }
        WizardStep::OutputTypeSelect => {
            for kind in [OutputKind::CoverLetter, OutputKind::ColdEmail] {
                let chosen = form.output_kind == Some(kind);
                let marker = if chosen { "(x)" } else { "( )" };
                let style = if chosen {
                    Style::default().fg(p.accent)
                } else {
                    Style::default().fg(p.text)
                };
                lines.push(Line::from(Span::styled(format!("{marker} {}", kind.label()), style)));
            }
            lines.push(Line::from(""));
            lines.push(hint(&p, &[("o", "change")]));
        }
        WizardStep::Generating => {
            let msg = state.progress.as_deref().unwrap_or(PENDING_MESSAGE);
            if wizard.in_flight() {
                lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(p.accent))));
            } else {
                lines.push(Line::from("Generation did not finish."));
                lines.push(hint(&p, &[("Enter", "try again")]));
            }
        }
    }

    lines.push(Line::from(""));
    let ready = Wizard::input_ready(step, &form.to_inputs());
    let footer = if wizard.in_flight() {
        Line::from(Span::styled(
            state.progress.clone().unwrap_or_else(|| "Working...".into()),
            Style::default().fg(p.muted),
        ))
    } else if ready {
        hint(
            &p,
            &[
                (
                    "Enter",
                    if step >= WizardStep::OutputTypeSelect { "generate" } else { "next" },
                ),
                ("Esc", "close"),
            ],
        )
    } else {
        hint(&p, &[("Esc", "close")])
    };
    lines.push(footer);

    let rect = centered(area, 70, lines.len() as u16 + 2);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("New application")),
        rect,
    );
}

fn split_list(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(area)
}

pub fn draw_results(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let Some(set) = &state.results else {
        f.render_widget(
            Paragraph::new("Loading results...")
                .block(Block::default().borders(Borders::ALL).title("Results")),
            area,
        );
        return;
    };
    let loaded: Vec<_> = set.loaded().collect();
    if loaded.is_empty() {
        f.render_widget(
            Paragraph::new(vec![
                Line::from("Nothing to show yet."),
                Line::from(Span::styled(
                    "Start an application from the Home page.",
                    Style::default().fg(p.muted),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).title("Results")),
            area,
        );
        return;
    }

    let cols = split_list(area);
    let items = loaded
        .iter()
        .map(|e| format!("{}: {}", e.kind().label(), text_summary::entity_title(e)))
        .collect();
    f.render_widget(
        Paragraph::new(selectable(&p, items, state.results_selected))
            .block(Block::default().borders(Borders::ALL).title("Results")),
        cols[0],
    );

    let detail = loaded
        .get(state.results_selected)
        .map(|e| summary_lines(text_summary::entity_summary(e)))
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Preview (Enter to open, y to copy)"),
            ),
        cols[1],
    );
}

pub fn draw_dashboard(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let Some(dash) = &state.dashboard else {
        f.render_widget(
            Paragraph::new("Loading your documents...")
                .block(Block::default().borders(Borders::ALL).title("Dashboard")),
            area,
        );
        return;
    };

    let titles: Vec<Line> = DASHBOARD_ORDER
        .iter()
        .map(|k| Line::from(format!("{} ({})", k.label(), dash.items(*k).len())))
        .collect();
    f.render_widget(
        Tabs::new(titles)
            .select(state.dashboard_section % DASHBOARD_ORDER.len())
            .block(Block::default().borders(Borders::ALL).title("Dashboard"))
            .highlight_style(Style::default().fg(p.accent)),
        chunks[0],
    );

    let kind = state.dashboard_kind();
    let failed = dash.sections.iter().find_map(|s| match &s.listing {
        Listing::Failed(err) if s.kind == kind => Some(err.clone()),
        _ => None,
    });
    let lines = match failed {
        Some(err) => vec![Line::from(Span::styled(
            format!("Could not load {}: {err}", kind.label().to_lowercase()),
            Style::default().fg(Color::Red),
        ))],
        None => {
            let items: Vec<String> = dash
                .items(kind)
                .iter()
                .map(|e| format!("{}  {}", text_summary::entity_title(e), e.id()))
                .collect();
            if items.is_empty() {
                vec![Line::from(Span::styled("Nothing here yet.", Style::default().fg(p.muted)))]
            } else {
                selectable(&p, items, state.dashboard_selected)
            }
        }
    };
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("←/→ section, Enter to open"),
        ),
        chunks[1],
    );
}

pub fn draw_document(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let title = match state.route.document() {
        Some((_, id)) => format!("{} {id} (y to copy, Esc to go back)", state.route.title()),
        None => state.route.title().to_string(),
    };
    let lines = match &state.document {
        None => vec![Line::from("Loading...")],
        Some(None) => vec![Line::from(Span::styled(
            format!("{} not found.", state.route.title()),
            Style::default().fg(p.muted),
        ))],
        Some(Some(entity)) => summary_lines(text_summary::entity_summary(entity)),
    };
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

pub fn draw_templates(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let Some(kind) = state.template_kind() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    f.render_widget(
        Paragraph::new(field_line(
            &p,
            "Search",
            &state.template_query,
            state.editing == Some(Field::TemplateSearch),
            false,
        ))
        .block(Block::default().borders(Borders::ALL).title(kind.label())),
        chunks[0],
    );

    let found = templates::search(kind, &state.template_query);
    let cols = split_list(chunks[1]);
    if found.is_empty() {
        f.render_widget(
            Paragraph::new("No templates match.").block(Block::default().borders(Borders::ALL)),
            chunks[1],
        );
        return;
    }
    let items = found
        .iter()
        .map(|t| format!("{} [{}]", t.title, t.category))
        .collect();
    f.render_widget(
        Paragraph::new(selectable(&p, items, state.template_selected))
            .block(Block::default().borders(Borders::ALL)),
        cols[0],
    );

    let detail = found
        .get(state.template_selected)
        .map(|t| {
            let mut lines = Vec::new();
            push_wrapped_kv(&mut lines, "Level", t.note, cols[1].width);
            lines.extend(summary_lines(text_summary::template_summary(t)));
            lines
        })
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("y to copy")),
        cols[1],
    );
}

fn band_color(band: MatchBand) -> Color {
    match band {
        MatchBand::Strong => Color::Green,
        MatchBand::Moderate => Color::Yellow,
        MatchBand::Weak => Color::Red,
    }
}

fn score_color(score: f64) -> Color {
    if score >= 80.0 {
        Color::Green
    } else if score >= 60.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn draw_skill_gap(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let Some(flow) = &state.skill_gap else {
        return;
    };

    if let Some(result) = flow.result() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
            .split(area);
        let pct = result.match_value().unwrap_or(0).min(100);
        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Match"))
                .gauge_style(Style::default().fg(band_color(result.band())))
                .percent(u16::from(pct))
                .label(result.match_percentage.clone()),
            chunks[0],
        );
        let mut lines = summary_lines(text_summary::skill_gap_summary(result));
        lines.push(Line::from(""));
        lines.push(hint(&p, &[("r", "analyze another pair")]));
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Skill gap")),
            chunks[1],
        );
        return;
    }

    let (n, label, field, value) = match flow.step() {
        SkillGapStep::Resume => (1, "Resume id", Field::SkillResumeId, &state.skill_resume_id),
        _ => (2, "Job id", Field::SkillJobId, &state.skill_job_id),
    };
    let mut lines = vec![
        Line::from(format!("Step {n}/2")),
        Line::from(""),
        field_line(&p, label, value, state.editing == Some(field), false),
        Line::from(""),
    ];
    if flow.in_flight() {
        lines.push(Line::from(Span::styled(
            "Analyzing...",
            Style::default().fg(p.accent),
        )));
    } else if n == 1 {
        lines.push(hint(&p, &[("e", "edit"), ("Enter", "next")]));
    } else {
        lines.push(hint(&p, &[("e", "edit"), ("Enter", "analyze"), ("b", "back")]));
    }
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Skill gap")),
        area,
    );
}

pub fn draw_ats(area: Rect, f: &mut Frame, state: &UiState) {
    let p = palette(state.theme);
    let Some(flow) = &state.ats else {
        return;
    };

    if let Some(result) = flow.result() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
            .split(area);
        let score = result.score.clamp(0.0, 100.0);
        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("ATS score"))
                .gauge_style(Style::default().fg(score_color(score)))
                .percent(score.round() as u16)
                .label(format!("{score:.0}/100")),
            chunks[0],
        );
        let mut lines = Vec::new();
        let width = chunks[1].width;
        for line in text_summary::ats_summary(result).lines.into_iter().skip(1) {
            match line.split_once(": ") {
                Some((label, value)) => push_wrapped_kv(&mut lines, label, value, width),
                None => lines.push(Line::from(line)),
            }
        }
        lines.push(Line::from(""));
        lines.push(hint(&p, &[("r", "check another resume")]));
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("ATS check")),
            chunks[1],
        );
        return;
    }

    let mut lines = vec![
        field_line(
            &p,
            "Resume id",
            &state.ats_resume_id,
            state.editing == Some(Field::AtsResumeId),
            false,
        ),
        field_line(
            &p,
            "or resume file",
            &state.ats_path,
            state.editing == Some(Field::AtsPath),
            false,
        ),
        Line::from(""),
    ];
    if flow.in_flight() {
        lines.push(Line::from(Span::styled("Scoring...", Style::default().fg(p.accent))));
    } else {
        lines.push(hint(&p, &[("e", "edit id"), ("f", "edit path"), ("Enter", "analyze")]));
    }
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("ATS check")),
        area,
    );
}

pub fn draw_alert(area: Rect, f: &mut Frame, msg: &str) {
    let mut lines: Vec<Line> = msg.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to dismiss",
        Style::default().fg(Color::Gray),
    )));
    let rect = centered(area, 60, lines.len() as u16 + 4);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Something went wrong"),
        ),
        rect,
    );
}
