mod export;
mod help;
mod screens;
mod state;

use crate::cli::Cli;
use crate::orchestrator::{self, AppEvent, UiCommand};
use crate::router::Route;
use crate::templates;
use crate::text_summary;
use crate::workflow::skill_gap::SkillGapStep;
use crate::workflow::wizard::WizardStep;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use export::copy_to_clipboard;
use help::draw_help;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use state::{palette, Field, UiState, DASHBOARD_ORDER, HELP_TAB, TABS};
use std::path::PathBuf;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let ctx = crate::cli::open_context(&args)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // The terminal is driven from its own thread; the runtime only runs the controller.
    let ui_handle = std::thread::spawn(move || run_threaded(event_rx, cmd_tx));

    let res = orchestrator::run_controller(ctx, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(&mut state, k, &cmd_tx) {
                    let _ = cmd_tx.send(UiCommand::Quit);
                    break Ok(());
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn navigate(cmd_tx: &UnboundedSender<UiCommand>, path: impl Into<String>) {
    let _ = cmd_tx.send(UiCommand::Navigate(path.into()));
}

fn copy(state: &mut UiState, text: &str) {
    state.info = match copy_to_clipboard(text) {
        Ok(()) => format!("✓ Copied to clipboard: {}", export::preview(text)),
        Err(e) => format!("Clipboard copy failed: {e:#}"),
    };
}

fn move_selection(selected: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *selected = 0;
    } else if down {
        *selected = (*selected + 1).min(len - 1);
    } else {
        *selected = selected.saturating_sub(1);
    }
}

/// Apply one key press. Returns `true` when the user asked to quit.
fn handle_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) -> bool {
    if k.modifiers == KeyModifiers::CONTROL && k.code == KeyCode::Char('c') {
        return true;
    }

    if state.alert.is_some() {
        if matches!(k.code, KeyCode::Enter | KeyCode::Esc) {
            state.alert = None;
        }
        return false;
    }

    if let Some(field) = state.editing {
        match k.code {
            KeyCode::Enter | KeyCode::Esc => state.editing = None,
            KeyCode::Backspace => {
                state.field_mut(field).pop();
            }
            KeyCode::Char(c) if !k.modifiers.contains(KeyModifiers::CONTROL) => {
                state.field_mut(field).push(c);
            }
            _ => {}
        }
        if field == Field::TemplateSearch {
            state.template_selected = 0;
        }
        return false;
    }

    if state.route == Route::Auth && !state.show_help {
        handle_auth_key(state, k, cmd_tx);
        return false;
    }

    if state.route == Route::Home && state.wizard_open && !state.show_help {
        return handle_wizard_key(state, k, cmd_tx);
    }

    match k.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            let next = if state.tab() == HELP_TAB { 0 } else { (state.tab() + 1) % TABS.len() };
            navigate(cmd_tx, TABS[next].1);
            return false;
        }
        KeyCode::BackTab => {
            let prev = (state.tab() + TABS.len() - 1) % TABS.len();
            navigate(cmd_tx, TABS[prev.min(TABS.len() - 1)].1);
            return false;
        }
        KeyCode::Char('?') => {
            state.show_help = !state.show_help;
            return false;
        }
        KeyCode::Char('t') => {
            let _ = cmd_tx.send(UiCommand::SetTheme(state.theme.next()));
            return false;
        }
        KeyCode::Char('a') if state.session.is_none() => {
            navigate(cmd_tx, "/auth");
            return false;
        }
        KeyCode::Char('L') if state.session.is_some() => {
            let _ = cmd_tx.send(UiCommand::Logout);
            return false;
        }
        _ => {}
    }
    if state.show_help {
        return false;
    }

    let down = matches!(k.code, KeyCode::Down | KeyCode::Char('j'));
    let up = matches!(k.code, KeyCode::Up | KeyCode::Char('k'));

    match state.route.clone() {
        Route::Home => {
            if k.code == KeyCode::Char('n') {
                state.wizard_open = true;
                let _ = cmd_tx.send(UiCommand::WizardOpen);
            }
        }
        Route::Results => {
            let Some(set) = &state.results else {
                return false;
            };
            let loaded: Vec<_> = set.loaded().cloned().collect();
            if up || down {
                move_selection(&mut state.results_selected, loaded.len(), down);
            }
            if let Some(entity) = loaded.get(state.results_selected) {
                match k.code {
                    KeyCode::Enter => {
                        navigate(cmd_tx, Route::for_entity(entity.kind(), entity.id()).path())
                    }
                    KeyCode::Char('y') => {
                        let text = entity
                            .text()
                            .map(str::to_string)
                            .unwrap_or_else(|| text_summary::entity_summary(entity).text());
                        copy(state, &text);
                    }
                    _ => {}
                }
            }
        }
        Route::Dashboard => {
            match k.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    state.dashboard_section =
                        (state.dashboard_section + DASHBOARD_ORDER.len() - 1) % DASHBOARD_ORDER.len();
                    state.dashboard_selected = 0;
                    return false;
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    state.dashboard_section = (state.dashboard_section + 1) % DASHBOARD_ORDER.len();
                    state.dashboard_selected = 0;
                    return false;
                }
                _ => {}
            }
            let kind = state.dashboard_kind();
            let Some(dash) = &state.dashboard else {
                return false;
            };
            let items = dash.items(kind).to_vec();
            if up || down {
                move_selection(&mut state.dashboard_selected, items.len(), down);
            }
            if k.code == KeyCode::Enter {
                if let Some(entity) = items.get(state.dashboard_selected) {
                    navigate(cmd_tx, Route::for_entity(kind, entity.id()).path());
                }
            }
        }
        Route::CoverLetter(_) | Route::Job(_) | Route::Email(_) | Route::Resume(_) => {
            match k.code {
                KeyCode::Esc | KeyCode::Backspace => navigate(cmd_tx, state.back.path()),
                KeyCode::Char('y') => {
                    if let Some(Some(entity)) = state.document.clone() {
                        let text = entity
                            .text()
                            .map(str::to_string)
                            .unwrap_or_else(|| text_summary::entity_summary(&entity).text());
                        copy(state, &text);
                    }
                }
                _ => {}
            }
        }
        Route::CoverLetterTemplates | Route::EmailTemplates => {
            let Some(kind) = state.template_kind() else {
                return false;
            };
            let found = templates::search(kind, &state.template_query);
            if up || down {
                move_selection(&mut state.template_selected, found.len(), down);
            }
            match k.code {
                KeyCode::Char('/') => state.editing = Some(Field::TemplateSearch),
                KeyCode::Char('y') => {
                    if let Some(t) = found.get(state.template_selected) {
                        copy(state, t.body);
                    }
                }
                _ => {}
            }
        }
        Route::SkillAnalysis => {
            let Some(flow) = &state.skill_gap else {
                return false;
            };
            let step = flow.step();
            let busy = flow.in_flight();
            match k.code {
                KeyCode::Char('e') => {
                    state.editing = match step {
                        SkillGapStep::Resume => Some(Field::SkillResumeId),
                        SkillGapStep::Job => Some(Field::SkillJobId),
                        SkillGapStep::Result => None,
                    }
                }
                KeyCode::Enter if !busy => match step {
                    SkillGapStep::Resume => {
                        let _ = cmd_tx.send(UiCommand::SkillGapNext(state.skill_resume_id.clone()));
                    }
                    SkillGapStep::Job => {
                        let _ = cmd_tx.send(UiCommand::SkillGapAnalyze {
                            resume_id: state.skill_resume_id.clone(),
                            job_id: state.skill_job_id.clone(),
                        });
                    }
                    SkillGapStep::Result => {}
                },
                KeyCode::Char('b') if !busy => {
                    let _ = cmd_tx.send(UiCommand::SkillGapBack);
                }
                KeyCode::Char('r') if !busy => {
                    let _ = cmd_tx.send(UiCommand::SkillGapReset);
                }
                _ => {}
            }
        }
        Route::Ats => {
            let busy = state.ats.as_ref().is_some_and(|a| a.in_flight());
            match k.code {
                KeyCode::Char('e') => state.editing = Some(Field::AtsResumeId),
                KeyCode::Char('f') => state.editing = Some(Field::AtsPath),
                KeyCode::Enter if !busy => {
                    let path = state.ats_path.trim();
                    let _ = cmd_tx.send(UiCommand::AtsAnalyze {
                        resume_id: state.ats_resume_id.trim().to_string(),
                        resume_path: (!path.is_empty()).then(|| PathBuf::from(path)),
                    });
                }
                KeyCode::Char('r') if !busy => {
                    let _ = cmd_tx.send(UiCommand::AtsReset);
                }
                _ => {}
            }
        }
        Route::Auth => {}
    }
    false
}

fn handle_auth_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) {
    let form = &mut state.auth;
    match (k.modifiers, k.code) {
        (_, KeyCode::Esc) => navigate(cmd_tx, "/"),
        (_, KeyCode::Up) | (_, KeyCode::BackTab) => form.move_focus(false),
        (_, KeyCode::Down) | (_, KeyCode::Tab) => form.move_focus(true),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => form.toggle_mode(),
        (_, KeyCode::Backspace) => {
            form.focused_mut().pop();
        }
        (_, KeyCode::Enter) => {
            let [first_name, last_name, email, password] = form.fields.clone();
            let cmd = if form.register {
                UiCommand::Register {
                    first_name,
                    last_name,
                    email,
                    password,
                }
            } else {
                UiCommand::Login { email, password }
            };
            let _ = cmd_tx.send(cmd);
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => form.focused_mut().push(c),
        _ => {}
    }
}

fn handle_wizard_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) -> bool {
    let Some(wizard) = &state.wizard else {
        return false;
    };
    let step = wizard.step();
    let busy = wizard.in_flight();
    match k.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => {
            state.wizard_open = false;
            let _ = cmd_tx.send(UiCommand::WizardClose);
        }
        KeyCode::Enter if !busy => {
            let _ = cmd_tx.send(UiCommand::WizardProceed(state.wizard_form.to_inputs()));
        }
        KeyCode::Char('f') | KeyCode::Char('e') if step == WizardStep::ResumeInput && !busy => {
            state.editing = Some(Field::ResumePath);
        }
        KeyCode::Char('i') if step == WizardStep::ResumeInput && !busy => {
            state.editing = Some(Field::KnownResumeId);
        }
        KeyCode::Char('e') if step == WizardStep::JobInput && !busy => {
            state.editing = Some(Field::JobUrl);
        }
        KeyCode::Char('s') if step == WizardStep::JobInput && !busy => {
            state.wizard_form.job_source = state.wizard_form.job_source.next();
        }
        KeyCode::Char('o') if step == WizardStep::OutputTypeSelect && !busy => {
            state.wizard_form.cycle_output();
        }
        _ => {}
    }
    false
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let p = palette(state.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    let mut titles: Vec<Line> = TABS.iter().map(|(name, _)| Line::from(*name)).collect();
    titles.push(Line::from("Help"));
    let title = match &state.session {
        Some(s) => format!("careercraft - {}", s.email),
        None => "careercraft".to_string(),
    };
    let tabs = Tabs::new(titles)
        .select(state.tab())
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(p.accent));
    f.render_widget(tabs, chunks[0]);

    if state.show_help {
        draw_help(chunks[1], f);
    } else {
        match &state.route {
            Route::Home => screens::draw_home(chunks[1], f, state),
            Route::Auth => screens::draw_auth(chunks[1], f, state),
            Route::Results => screens::draw_results(chunks[1], f, state),
            Route::Dashboard => screens::draw_dashboard(chunks[1], f, state),
            Route::CoverLetterTemplates | Route::EmailTemplates => {
                screens::draw_templates(chunks[1], f, state)
            }
            Route::Ats => screens::draw_ats(chunks[1], f, state),
            Route::SkillAnalysis => screens::draw_skill_gap(chunks[1], f, state),
            Route::CoverLetter(_) | Route::Job(_) | Route::Email(_) | Route::Resume(_) => {
                screens::draw_document(chunks[1], f, state)
            }
        }
    }

    let status = Line::from(vec![
        Span::styled(format!(" theme: {} ", state.theme.as_str()), Style::default().fg(p.muted)),
        Span::raw(" "),
        Span::raw(state.info.clone()),
    ]);
    f.render_widget(Paragraph::new(status), chunks[2]);

    if let Some(msg) = &state.alert {
        screens::draw_alert(area, f, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::session;
    use crate::workflow::wizard::Wizard;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sent(rx: &mut UnboundedReceiver<UiCommand>) -> Vec<UiCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }

    #[test]
    fn tab_cycles_through_pages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = UiState::default();
        assert!(!handle_key(&mut state, press(KeyCode::Tab), &tx));
        assert!(matches!(
            sent(&mut rx).as_slice(),
            [UiCommand::Navigate(p)] if p == "/results"
        ));
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = UiState {
            alert: Some("Failed to upload resume".into()),
            ..UiState::default()
        };
        assert!(!handle_key(&mut state, press(KeyCode::Char('q')), &tx));
        assert!(state.alert.is_some());
        handle_key(&mut state, press(KeyCode::Enter), &tx);
        assert!(state.alert.is_none());
        assert!(sent(&mut rx).is_empty());
    }

    #[test]
    fn wizard_keys_edit_the_form_and_proceed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = UiState::default();
        state.apply(AppEvent::Session(Some(session("u1"))));
        handle_key(&mut state, press(KeyCode::Char('n')), &tx);
        assert!(state.wizard_open);
        state.apply(AppEvent::Wizard(Box::new(Wizard::new())));

        handle_key(&mut state, press(KeyCode::Enter), &tx);
        let cmds = sent(&mut rx);
        assert!(matches!(cmds[0], UiCommand::WizardOpen));
        assert!(matches!(cmds[1], UiCommand::WizardProceed(_)));

        // Typing 'q' while a field is being edited goes into the field.
        state.editing = Some(Field::JobUrl);
        handle_key(&mut state, press(KeyCode::Char('q')), &tx);
        handle_key(&mut state, press(KeyCode::Enter), &tx);
        assert_eq!(state.wizard_form.job_url, "q");
        assert!(state.editing.is_none());

        handle_key(&mut state, press(KeyCode::Esc), &tx);
        assert!(!state.wizard_open);
        assert!(matches!(sent(&mut rx).as_slice(), [UiCommand::WizardClose]));
    }

    #[test]
    fn auth_form_submits_login() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = UiState::default();
        state.apply(AppEvent::Route(Route::Auth));
        for c in "ada@example.com".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)), &tx);
        }
        handle_key(&mut state, press(KeyCode::Down), &tx);
        for c in "pw".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)), &tx);
        }
        handle_key(&mut state, press(KeyCode::Enter), &tx);
        assert!(matches!(
            sent(&mut rx).as_slice(),
            [UiCommand::Login { email, password }] if email == "ada@example.com" && password == "pw"
        ));
    }

    #[test]
    fn document_escape_returns_to_the_list() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = UiState::default();
        state.apply(AppEvent::Route(Route::Results));
        state.apply(AppEvent::Route(Route::CoverLetter("cl1".into())));
        handle_key(&mut state, press(KeyCode::Esc), &tx);
        assert!(matches!(
            sent(&mut rx).as_slice(),
            [UiCommand::Navigate(p)] if p == "/results"
        ));
    }
}
