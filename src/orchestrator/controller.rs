//! Application controller.
//!
//! Owns the session, the wizard and the secondary flows. Remote effects run as
//! spawned tasks so input keeps flowing; each completion carries the liveness
//! token of the view that started it and is dropped once that view is gone.
//! Sign-in completions are scoped to the session instead and only a logout
//! discards them.

use crate::cli::AppContext;
use crate::client::Backend;
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::{ClientConfig, Entity, GeneratedOutput, Session, SkillGapResult, Theme};
use crate::router::{self, Route};
use crate::session::SessionManager;
use crate::store::KeyedStore;
use crate::workflow::ats::{AtsFlow, AtsOutcome};
use crate::workflow::results::{self, Dashboard, ResultSet};
use crate::workflow::skill_gap::SkillGapFlow;
use crate::workflow::wizard::{Applied, Outcome, Transition, Wizard, WizardInputs};
use crate::workflow::{Liveness, ViewScope};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by the UI.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Navigate(String),
    Login {
        email: String,
        password: String,
    },
    Register {
        first_name: String,
        last_name: String,
        email: String,
        password: String,
    },
    Logout,
    WizardOpen,
    /// Primary wizard action with the inputs as currently entered.
    WizardProceed(WizardInputs),
    WizardClose,
    SkillGapNext(String),
    SkillGapBack,
    SkillGapAnalyze { resume_id: String, job_id: String },
    SkillGapReset,
    AtsAnalyze {
        resume_id: String,
        resume_path: Option<PathBuf>,
    },
    AtsReset,
    SetTheme(Theme),
    Quit,
}

/// Events sent back to the UI.
#[derive(Debug, Clone)]
pub(crate) enum AppEvent {
    Status(String),
    /// Blocking, plain-language failure message.
    Alert(String),
    Session(Option<Session>),
    Route(Route),
    Theme(Theme),
    Wizard(Box<Wizard>),
    Progress(String),
    Generated(GeneratedOutput),
    Results(ResultSet),
    Dashboard(Dashboard),
    Document(Option<Entity>),
    SkillGap(Box<SkillGapFlow>),
    Ats(Box<AtsFlow>),
}

enum Finished {
    Login(WorkflowResult<Session>),
    Wizard(Outcome),
    Results(ResultSet),
    Dashboard(WorkflowResult<Dashboard>),
    Document(WorkflowResult<Option<Entity>>),
    SkillGap(WorkflowResult<SkillGapResult>),
    Ats(AtsOutcome),
}

struct Completion {
    live: Liveness,
    finished: Finished,
}

pub(crate) struct Controller {
    backend: Arc<dyn Backend>,
    cfg: ClientConfig,
    sessions: SessionManager,
    wizard: Wizard,
    skill_gap: SkillGapFlow,
    ats: AtsFlow,
    route: Route,
    view: ViewScope,
    wizard_scope: ViewScope,
    auth_scope: ViewScope,
    events: UnboundedSender<AppEvent>,
    tasks: FuturesUnordered<JoinHandle<Completion>>,
}

impl Controller {
    pub fn new(ctx: AppContext, events: UnboundedSender<AppEvent>) -> Self {
        let store = ctx.sessions.store().clone();
        Self {
            backend: ctx.backend,
            cfg: ctx.cfg,
            skill_gap: SkillGapFlow::new(&store),
            ats: AtsFlow::new(&store),
            sessions: ctx.sessions,
            wizard: Wizard::new(),
            route: Route::Home,
            view: ViewScope::default(),
            wizard_scope: ViewScope::default(),
            auth_scope: ViewScope::default(),
            events,
            tasks: FuturesUnordered::new(),
        }
    }

    fn store(&self) -> KeyedStore {
        self.sessions.store().clone()
    }

    fn emit(&self, ev: AppEvent) {
        let _ = self.events.send(ev);
    }

    fn alert(&self, err: &WorkflowError) {
        tracing::warn!(error = %err, "action failed");
        self.emit(AppEvent::Alert(err.alert_text()));
    }

    fn spawn<F>(&self, live: Liveness, fut: F)
    where
        F: std::future::Future<Output = Finished> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(async move {
            Completion {
                live,
                finished: fut.await,
            }
        }));
    }

    /// Initial snapshot for a freshly started UI.
    pub fn start(&mut self) {
        self.emit(AppEvent::Session(self.sessions.current().cloned()));
        self.emit(AppEvent::Theme(self.sessions.store().theme()));
        self.navigate("/");
    }

    pub fn navigate(&mut self, path: &str) {
        let store = self.store();
        let route = match router::navigate(path, self.sessions.is_authenticated(), &store) {
            Ok(r) => r,
            Err(e) => return self.alert(&e.into()),
        };
        let live = self.view.renew();
        tracing::debug!(route = %route, "navigate");
        self.route = route.clone();
        self.emit(AppEvent::Route(route.clone()));

        let backend = self.backend.clone();
        if let Some((kind, id)) = route.document() {
            let id = id.to_string();
            self.spawn(live, async move {
                Finished::Document(results::load_document(backend.as_ref(), kind, &id).await)
            });
            return;
        }
        match route {
            Route::Results => {
                self.emit(AppEvent::Status("Loading results...".into()));
                self.spawn(live, async move {
                    Finished::Results(results::assemble_results(backend.as_ref(), &store).await)
                });
            }
            Route::Dashboard => {
                self.spawn(live, async move {
                    Finished::Dashboard(results::assemble_dashboard(backend.as_ref(), &store).await)
                });
            }
            Route::SkillAnalysis => {
                self.skill_gap = SkillGapFlow::new(&store);
                self.emit_skill_gap();
            }
            Route::Ats => {
                self.ats = AtsFlow::new(&store);
                self.emit_ats();
            }
            _ => {}
        }
    }

    fn emit_wizard(&self) {
        self.emit(AppEvent::Wizard(Box::new(self.wizard.clone())));
    }

    fn emit_skill_gap(&self) {
        self.emit(AppEvent::SkillGap(Box::new(self.skill_gap.clone())));
    }

    fn emit_ats(&self) {
        self.emit(AppEvent::Ats(Box::new(self.ats.clone())));
    }

    pub fn handle(&mut self, cmd: UiCommand) {
        let store = self.store();
        match cmd {
            UiCommand::Navigate(path) => self.navigate(&path),
            UiCommand::Login { email, password } => {
                let backend = self.backend.clone();
                self.emit(AppEvent::Status("Signing in...".into()));
                self.spawn(self.auth_scope.token(), async move {
                    Finished::Login(
                        backend
                            .login(email.trim(), &password)
                            .await
                            .map_err(WorkflowError::remote(Action::Login)),
                    )
                });
            }
            UiCommand::Register {
                first_name,
                last_name,
                email,
                password,
            } => {
                if [&first_name, &last_name, &email, &password]
                    .iter()
                    .any(|v| v.trim().is_empty())
                {
                    return self.alert(&WorkflowError::InvalidInput(
                        "all fields are required".into(),
                    ));
                }
                let backend = self.backend.clone();
                self.emit(AppEvent::Status("Creating account...".into()));
                self.spawn(self.auth_scope.token(), async move {
                    Finished::Login(
                        backend
                            .register(first_name.trim(), last_name.trim(), email.trim(), &password)
                            .await
                            .map_err(WorkflowError::remote(Action::Register)),
                    )
                });
            }
            UiCommand::Logout => {
                self.auth_scope.renew();
                self.wizard_scope.revoke();
                self.wizard = Wizard::new();
                if let Err(e) = self.sessions.logout() {
                    return self.alert(&e);
                }
                self.emit(AppEvent::Session(None));
                self.emit(AppEvent::Status("Signed out".into()));
                self.navigate("/auth");
            }
            UiCommand::WizardOpen => {
                self.wizard_scope.renew();
                self.wizard = Wizard::new();
                self.wizard.inputs.known_resume_id = store.resume_id().unwrap_or_default();
                self.emit_wizard();
            }
            UiCommand::WizardClose => {
                self.wizard_scope.revoke();
                self.wizard = Wizard::new();
                self.emit_wizard();
            }
            UiCommand::WizardProceed(inputs) => {
                if self.wizard.in_flight() {
                    return;
                }
                self.wizard.inputs = inputs;
                match self.wizard.begin(&store) {
                    Ok(Transition::Moved(step)) => {
                        tracing::debug!(step = step.index(), "wizard moved");
                    }
                    Ok(Transition::Pending(effect)) => {
                        let backend = self.backend.clone();
                        let events = self.events.clone();
                        let live = self.wizard_scope.token();
                        let forward_live = live.clone();
                        let scripted = self.cfg.progress_script;
                        self.spawn(live, async move {
                            let (ptx, mut prx) = mpsc::unbounded_channel::<String>();
                            let forward = tokio::spawn(async move {
                                while let Some(msg) = prx.recv().await {
                                    if forward_live.is_live() {
                                        let _ = events.send(AppEvent::Progress(msg));
                                    }
                                }
                            });
                            let outcome = effect.run(backend.as_ref(), Some(&ptx), scripted).await;
                            drop(ptx);
                            let _ = forward.await;
                            Finished::Wizard(outcome)
                        });
                    }
                    Err(e) => self.alert(&e),
                }
                self.emit_wizard();
            }
            UiCommand::SkillGapNext(resume_id) => {
                self.skill_gap.resume_id = resume_id;
                if let Err(e) = self.skill_gap.next() {
                    self.alert(&e);
                }
                self.emit_skill_gap();
            }
            UiCommand::SkillGapBack => {
                self.skill_gap.back();
                self.emit_skill_gap();
            }
            UiCommand::SkillGapAnalyze { resume_id, job_id } => {
                self.skill_gap.resume_id = resume_id;
                self.skill_gap.job_id = job_id;
                match self.skill_gap.begin(&store) {
                    Ok(request) => {
                        let backend = self.backend.clone();
                        self.spawn(self.view.token(), async move {
                            Finished::SkillGap(request.run(backend.as_ref()).await)
                        });
                    }
                    Err(e) => self.alert(&e),
                }
                self.emit_skill_gap();
            }
            UiCommand::SkillGapReset => {
                self.skill_gap.reset(&store);
                self.emit_skill_gap();
            }
            UiCommand::AtsAnalyze {
                resume_id,
                resume_path,
            } => {
                self.ats.resume_id = resume_id;
                self.ats.resume_path = resume_path;
                match self.ats.begin(&store) {
                    Ok(request) => {
                        let backend = self.backend.clone();
                        self.spawn(self.view.token(), async move {
                            Finished::Ats(request.run(backend.as_ref()).await)
                        });
                    }
                    Err(e) => self.alert(&e),
                }
                self.emit_ats();
            }
            UiCommand::AtsReset => {
                self.ats.reset(&store);
                self.emit_ats();
            }
            UiCommand::SetTheme(theme) => match store.set_theme(theme) {
                Ok(()) => self.emit(AppEvent::Theme(theme)),
                Err(e) => self.alert(&e.into()),
            },
            UiCommand::Quit => {}
        }
    }

    fn complete(&mut self, completion: Completion) {
        if !completion.live.is_live() {
            tracing::debug!("discarding completion for a view that is gone");
            return;
        }
        let store = self.store();
        match completion.finished {
            Finished::Login(res) => match res.and_then(|s| self.sessions.adopt(s).cloned()) {
                Ok(session) => {
                    self.emit(AppEvent::Status(format!("Welcome, {}", session.display_name())));
                    self.emit(AppEvent::Session(Some(session)));
                    self.navigate("/");
                }
                Err(e) => self.alert(&e),
            },
            Finished::Wizard(outcome) => {
                match self.wizard.complete(outcome, &store) {
                    Ok(Applied::Moved(step)) => {
                        self.emit(AppEvent::Status(format!("Step {}: {}", step.index(), step.title())));
                    }
                    Ok(Applied::Closed(output)) => {
                        self.emit(AppEvent::Generated(output));
                        self.emit_wizard();
                        self.navigate("/results");
                        return;
                    }
                    Err(e) => self.alert(&e),
                }
                self.emit_wizard();
            }
            Finished::Results(set) => {
                let failed = set.failures().count();
                if failed > 0 {
                    self.emit(AppEvent::Status(format!("{failed} item(s) could not be loaded")));
                } else {
                    self.emit(AppEvent::Status(String::new()));
                }
                self.emit(AppEvent::Results(set));
            }
            Finished::Dashboard(res) => match res {
                Ok(dash) => self.emit(AppEvent::Dashboard(dash)),
                Err(e) => self.alert(&e),
            },
            Finished::Document(res) => match res {
                Ok(found) => self.emit(AppEvent::Document(found)),
                Err(e) => self.alert(&e),
            },
            Finished::SkillGap(outcome) => {
                if let Err(e) = self.skill_gap.complete(outcome) {
                    self.alert(&e);
                }
                self.emit_skill_gap();
            }
            Finished::Ats(outcome) => {
                if let Err(e) = self.ats.complete(outcome, &store) {
                    self.alert(&e);
                }
                self.emit_ats();
            }
        }
    }
}

/// Run the controller until the UI quits or drops its command channel.
pub(crate) async fn run_controller(
    ctx: AppContext,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut ctl = Controller::new(ctx, event_tx);
    ctl.start();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => break,
                    Some(cmd) => ctl.handle(cmd),
                }
            }
            Some(joined) = ctl.tasks.next(), if !ctl.tasks.is_empty() => {
                match joined {
                    Ok(completion) => ctl.complete(completion),
                    Err(e) => {
                        tracing::error!(error = %e, "background task failed");
                        let _ = ctl.events.send(AppEvent::Status(format!("Task failed: {e}")));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{session, FakeBackend};
    use crate::model::{DocumentRecord, EntityKind, OutputKind, UploadedResumeRef};
    use crate::workflow::wizard::WizardStep;

    fn controller(backend: FakeBackend, store: KeyedStore) -> (Controller, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cfg = ClientConfig {
            api_url: "http://localhost".into(),
            graphql_path: "/graphql".into(),
            timeout: std::time::Duration::from_secs(1),
            user_agent: "test".into(),
            progress_script: false,
            data_dir: None,
            ephemeral: true,
        };
        let ctx = AppContext {
            cfg,
            backend: Arc::new(backend),
            sessions: SessionManager::restore(store),
        };
        (Controller::new(ctx, tx), rx)
    }

    async fn settle(ctl: &mut Controller) {
        while let Some(joined) = ctl.tasks.next().await {
            ctl.complete(joined.unwrap());
        }
    }

    fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn protected_navigation_lands_on_auth() {
        let (mut ctl, mut rx) = controller(FakeBackend::new(), KeyedStore::in_memory());
        ctl.navigate("/dashboard");
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Route(Route::Auth))));
        assert!(ctl.tasks.is_empty());
    }

    #[tokio::test]
    async fn stale_results_are_discarded() {
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        store.set_cover_letter_id("cl1").unwrap();
        let backend = FakeBackend::new().with_entity(
            EntityKind::CoverLetter,
            "cl1",
            Ok(Some(Entity::CoverLetter(DocumentRecord {
                id: "cl1".into(),
                file_url: None,
                data: Some("Dear...".into()),
                user_id: None,
            }))),
        );
        let (mut ctl, mut rx) = controller(backend, store);

        ctl.navigate("/results");
        ctl.navigate("/dashboard");
        settle(&mut ctl).await;

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, AppEvent::Results(_))));
        assert!(events.iter().any(|e| matches!(e, AppEvent::Dashboard(_))));
    }

    #[tokio::test]
    async fn wizard_upload_runs_in_background_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        let backend = FakeBackend::new().with_resume(Ok(UploadedResumeRef { id: "r1".into() }));
        let (mut ctl, mut rx) = controller(backend, store.clone());

        ctl.handle(UiCommand::WizardOpen);
        ctl.handle(UiCommand::WizardProceed(WizardInputs::default()));
        assert_eq!(ctl.wizard.step(), WizardStep::ResumeInput);

        let inputs = WizardInputs {
            resume_path: Some(path),
            output_kind: Some(OutputKind::CoverLetter),
            ..WizardInputs::default()
        };
        ctl.handle(UiCommand::WizardProceed(inputs));
        assert!(ctl.wizard.in_flight());
        settle(&mut ctl).await;

        assert_eq!(ctl.wizard.step(), WizardStep::JobInput);
        assert_eq!(store.resume_id().as_deref(), Some("r1"));
        assert!(!drain(&mut rx).iter().any(|e| matches!(e, AppEvent::Alert(_))));
    }

    #[tokio::test]
    async fn closing_the_wizard_drops_its_pending_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let store = KeyedStore::in_memory();
        store.set_session(&session("u1")).unwrap();
        let backend = FakeBackend::new().with_resume(Ok(UploadedResumeRef { id: "r1".into() }));
        let (mut ctl, _rx) = controller(backend, store.clone());

        ctl.handle(UiCommand::WizardOpen);
        ctl.handle(UiCommand::WizardProceed(WizardInputs::default()));
        ctl.handle(UiCommand::WizardProceed(WizardInputs {
            resume_path: Some(path),
            ..WizardInputs::default()
        }));
        ctl.handle(UiCommand::WizardClose);
        settle(&mut ctl).await;

        assert_eq!(ctl.wizard.step(), WizardStep::Welcome);
        assert!(store.resume_id().is_none());
    }

    #[tokio::test]
    async fn failed_login_alerts_and_keeps_auth() {
        let backend =
            FakeBackend::new().with_session(Err(crate::error::RemoteError::InvalidCredentials));
        let (mut ctl, mut rx) = controller(backend, KeyedStore::in_memory());
        ctl.navigate("/auth");
        ctl.handle(UiCommand::Login {
            email: "ada@example.com".into(),
            password: "nope".into(),
        });
        settle(&mut ctl).await;

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Alert(msg) if msg.starts_with("Invalid credentials"))));
        assert!(!ctl.sessions.is_authenticated());
    }

    #[tokio::test]
    async fn login_settles_after_leaving_the_auth_page() {
        let backend = FakeBackend::new().with_session(Ok(session("u1")));
        let store = KeyedStore::in_memory();
        let (mut ctl, mut rx) = controller(backend, store.clone());
        ctl.navigate("/auth");
        ctl.handle(UiCommand::Login {
            email: "ada@example.com".into(),
            password: "secret".into(),
        });
        ctl.navigate("/cover-letters");
        settle(&mut ctl).await;

        assert!(ctl.sessions.is_authenticated());
        assert_eq!(store.user_id().as_deref(), Some("u1"));
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, AppEvent::Session(Some(s)) if s.id == "u1")));
    }

    #[tokio::test]
    async fn logout_discards_a_pending_login() {
        let backend = FakeBackend::new().with_session(Ok(session("u1")));
        let store = KeyedStore::in_memory();
        let (mut ctl, _rx) = controller(backend, store.clone());
        ctl.navigate("/auth");
        ctl.handle(UiCommand::Login {
            email: "ada@example.com".into(),
            password: "secret".into(),
        });
        ctl.handle(UiCommand::Logout);
        settle(&mut ctl).await;

        assert!(!ctl.sessions.is_authenticated());
        assert!(store.user_id().is_none());
    }
}
