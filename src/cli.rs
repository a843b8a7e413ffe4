use crate::client::{ApiClient, Backend};
use crate::model::{ClientConfig, JobSource, OutputKind, Theme};
use crate::router::{self, Route};
use crate::session::SessionManager;
use crate::store::{app_dir, FileBackend, KeyedStore};
use crate::templates::{self, TemplateKind};
use crate::text_summary::{self, TextSummary};
use crate::workflow::ats::AtsFlow;
use crate::workflow::results;
use crate::workflow::skill_gap::SkillGapFlow;
use crate::workflow::wizard::{Applied, Wizard, WizardInputs};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_API_URL: &str = "https://carrercraft-ai-backend-1.onrender.com";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "careercraft",
    version,
    about = "CareerCraft AI in the terminal: cover letters, cold emails, ATS and skill-gap checks"
)]
pub struct Cli {
    /// Base URL of the CareerCraft backend
    #[arg(long, env = "CAREERCRAFT_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Path of the GraphQL endpoint under the base URL
    #[arg(long, default_value = "/graphql", global = true)]
    pub graphql_path: String,

    /// Timeout for a single backend request
    #[arg(long, default_value = "120s", global = true)]
    pub timeout: humantime::Duration,

    /// Directory holding the state file and the TUI log
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Use --progress-script false to show a single status while generating
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, global = true)]
    pub progress_script: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs here instead of the default location
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TemplateSet {
    CoverLetters,
    Emails,
}

impl From<TemplateSet> for TemplateKind {
    fn from(set: TemplateSet) -> Self {
        match set {
            TemplateSet::CoverLetters => TemplateKind::CoverLetter,
            TemplateSet::Emails => TemplateKind::Email,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAREERCRAFT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAREERCRAFT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session and every stored identifier
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Upload a resume and a job posting, then generate a document
    Apply {
        /// Resume to upload (PDF, DOC or DOCX, at most 10 MB)
        #[arg(long, conflicts_with = "resume_id")]
        resume: Option<PathBuf>,
        /// Reuse a resume uploaded earlier
        #[arg(long)]
        resume_id: Option<String>,
        #[arg(long)]
        job_url: String,
        /// Job board: greenhouse, workday, jobslever, jobsvite or keka
        #[arg(long, default_value = "greenhouse")]
        source: JobSource,
        /// cover-letter or email
        #[arg(long = "type", default_value = "cover-letter")]
        output: OutputKind,
    },
    /// Show the latest job, resume, cover letter and cold email
    Results,
    /// List everything created under this account
    Dashboard,
    /// Open a route such as /job/<id> or /cover_letter/<id>
    Open {
        route: String,
        /// Write the document text to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check a resume against applicant tracking systems
    Ats {
        #[arg(long, conflicts_with = "resume_id")]
        resume: Option<PathBuf>,
        /// Defaults to the stored resume
        #[arg(long)]
        resume_id: Option<String>,
    },
    /// Compare a resume with a job posting
    SkillGap {
        /// Defaults to the stored resume
        #[arg(long)]
        resume_id: Option<String>,
        /// Defaults to the stored job
        #[arg(long)]
        job_id: Option<String>,
    },
    /// Browse the built-in templates
    Templates {
        #[arg(value_enum)]
        set: TemplateSet,
        /// Show one template by number or title
        show: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show or set the colour theme
    Theme { value: Option<Theme> },
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        api_url: args.api_url.clone(),
        graphql_path: args.graphql_path.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("careercraft-cli/{}", env!("CARGO_PKG_VERSION")),
        progress_script: args.progress_script,
        data_dir: args.data_dir.clone(),
        ephemeral: args.ephemeral,
    }
}

/// Everything a runner needs: config, store, backend and session.
pub(crate) struct AppContext {
    pub cfg: ClientConfig,
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionManager,
}

impl AppContext {
    pub fn store(&self) -> &KeyedStore {
        self.sessions.store()
    }
}

pub(crate) fn open_store(cfg: &ClientConfig) -> Result<KeyedStore> {
    if cfg.ephemeral {
        return Ok(KeyedStore::in_memory());
    }
    let dir = app_dir(cfg.data_dir.as_deref())?;
    let backend = FileBackend::in_dir(&dir);
    let path = backend.path().to_path_buf();
    KeyedStore::open(Box::new(backend))
        .with_context(|| format!("failed to open state file {}", path.display()))
}

pub(crate) fn open_context(args: &Cli) -> Result<AppContext> {
    let cfg = build_config(args);
    let store = open_store(&cfg)?;
    let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(&cfg)?);
    Ok(AppContext {
        cfg,
        backend,
        sessions: SessionManager::restore(store),
    })
}

fn log_dir(args: &Cli) -> PathBuf {
    app_dir(args.data_dir.as_deref()).unwrap_or_else(|_| std::env::temp_dir().join("careercraft"))
}

pub async fn run(args: Cli) -> Result<()> {
    if args.command.is_none() && !args.json {
        #[cfg(feature = "tui")]
        {
            let log_path = args
                .log_file
                .clone()
                .unwrap_or_else(|| crate::logging::default_log_path(&log_dir(&args)));
            crate::logging::init_file(&log_path)?;
            return crate::tui::run(args).await;
        }
    }

    match args.log_file.as_deref() {
        Some(path) => crate::logging::init_file(path)?,
        None => crate::logging::init_stderr()?,
    }
    let Some(command) = args.command.clone() else {
        bail!("no subcommand given; run `careercraft --help`");
    };

    let mut ctx = open_context(&args)?;
    let (out_tx, out_handle) = spawn_output_writer();
    let out = Output {
        tx: out_tx,
        json: args.json,
    };
    let res = dispatch(&mut ctx, command, &out).await;
    drop(out);
    let _ = out_handle.await;
    res
}

struct Output {
    tx: mpsc::UnboundedSender<OutputLine>,
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, summary: TextSummary) -> Result<()> {
        if self.json {
            let _ = self
                .tx
                .send(OutputLine::Stdout(serde_json::to_string_pretty(value)?));
        } else {
            for line in summary.lines {
                let _ = self.tx.send(OutputLine::Stdout(line));
            }
        }
        Ok(())
    }

    fn note(&self, msg: impl Into<String>) {
        let _ = self.tx.send(OutputLine::Stderr(msg.into()));
    }
}

/// Guard a route the way navigation would; a redirect to sign-in is an error here.
fn enter(ctx: &AppContext, path: &str) -> Result<Route> {
    let route = router::navigate(path, ctx.sessions.is_authenticated(), ctx.store())?;
    if route == Route::Auth && Route::parse(path) != Route::Auth {
        bail!("{path} requires a session; run `careercraft login` first");
    }
    Ok(route)
}

async fn dispatch(ctx: &mut AppContext, command: Command, out: &Output) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let backend = ctx.backend.clone();
            let session = ctx.sessions.login(backend.as_ref(), &email, &password).await?;
            out.emit(session, text_summary::session_summary(Some(session)))
        }
        Command::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let backend = ctx.backend.clone();
            let session = ctx
                .sessions
                .register(backend.as_ref(), &first_name, &last_name, &email, &password)
                .await?;
            out.emit(session, text_summary::session_summary(Some(session)))
        }
        Command::Logout => {
            ctx.sessions.logout()?;
            out.note("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = ctx.sessions.current();
            out.emit(&session, text_summary::session_summary(session))
        }
        Command::Apply {
            resume,
            resume_id,
            job_url,
            source,
            output,
        } => {
            enter(ctx, "/")?;
            run_apply(
                ctx,
                WizardInputs {
                    resume_path: resume,
                    known_resume_id: resume_id.unwrap_or_default(),
                    job_url,
                    job_source: source,
                    output_kind: Some(output),
                },
                out,
            )
            .await
        }
        Command::Results => run_results(ctx, out).await,
        Command::Dashboard => {
            enter(ctx, "/dashboard")?;
            let dash = results::assemble_dashboard(ctx.backend.as_ref(), ctx.store()).await?;
            out.emit(&dash, text_summary::dashboard_summary(&dash))
        }
        Command::Open { route, export } => run_open(ctx, &route, export.as_deref(), out).await,
        Command::Ats { resume, resume_id } => {
            enter(ctx, "/ats")?;
            let mut flow = AtsFlow::new(ctx.store());
            if let Some(id) = resume_id {
                flow.resume_id = id;
            }
            flow.resume_path = resume;
            let result = flow.analyze(ctx.backend.as_ref(), ctx.store()).await?;
            out.emit(result, text_summary::ats_summary(result))
        }
        Command::SkillGap { resume_id, job_id } => {
            enter(ctx, "/skill-analysis")?;
            let mut flow = SkillGapFlow::new(ctx.store());
            if let Some(id) = resume_id {
                flow.resume_id = id;
            }
            if let Some(id) = job_id {
                flow.job_id = id;
            }
            flow.next()?;
            let result = flow.analyze(ctx.backend.as_ref(), ctx.store()).await?;
            out.emit(result, text_summary::skill_gap_summary(result))
        }
        Command::Templates { set, show, search } => {
            let kind = TemplateKind::from(set);
            enter(
                ctx,
                match kind {
                    TemplateKind::CoverLetter => "/cover-letters",
                    TemplateKind::Email => "/email-templates",
                },
            )?;
            match show {
                Some(key) => {
                    let Some(t) = templates::find(kind, &key) else {
                        bail!("no template `{key}` in {}", kind.label());
                    };
                    out.emit(t, text_summary::template_summary(t))
                }
                None => {
                    let found = templates::search(kind, search.as_deref().unwrap_or(""));
                    out.emit(&found, text_summary::templates_summary(&found))
                }
            }
        }
        Command::Theme { value } => {
            if let Some(theme) = value {
                ctx.store().set_theme(theme)?;
            }
            let theme = ctx.store().theme();
            let mut summary = TextSummary { lines: Vec::new() };
            summary.lines.push(format!("Theme: {}", theme.as_str()));
            out.emit(&theme, summary)
        }
    }
}

async fn run_apply(ctx: &AppContext, inputs: WizardInputs, out: &Output) -> Result<()> {
    let mut wizard = Wizard::new();
    wizard.inputs = inputs;

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<String>();
    let forward = {
        let tx = out.tx.clone();
        tokio::spawn(async move {
            while let Some(msg) = progress_rx.recv().await {
                let _ = tx.send(OutputLine::Stderr(msg));
            }
        })
    };

    let output = loop {
        let applied = wizard
            .advance(
                ctx.backend.as_ref(),
                ctx.store(),
                Some(&progress_tx),
                ctx.cfg.progress_script,
            )
            .await;
        match applied {
            Ok(Applied::Moved(step)) => {
                out.note(format!("[{}/4] {}", step.index(), step.title()));
            }
            Ok(Applied::Closed(output)) => break output,
            Err(e) => {
                drop(progress_tx);
                let _ = forward.await;
                return Err(e).with_context(|| format!("stopped at step {}", wizard.step().index()));
            }
        }
    };
    drop(progress_tx);
    let _ = forward.await;

    out.emit(&output, text_summary::output_summary(&output))
}

async fn run_results(ctx: &AppContext, out: &Output) -> Result<()> {
    enter(ctx, "/results")?;
    let set = results::assemble_results(ctx.backend.as_ref(), ctx.store()).await;
    for (kind, err) in set.failures() {
        out.note(format!("{} could not be loaded: {err}", kind.label()));
    }
    out.emit(&set, text_summary::results_summary(&set))
}

async fn run_open(ctx: &AppContext, path: &str, export: Option<&Path>, out: &Output) -> Result<()> {
    let route = enter(ctx, path)?;
    if let Some((kind, id)) = route.document() {
        let Some(entity) = results::load_document(ctx.backend.as_ref(), kind, id).await? else {
            bail!("{} {id} was not found", kind.label());
        };
        let summary = text_summary::entity_summary(&entity);
        if let Some(dest) = export {
            let text = entity
                .text()
                .map(str::to_string)
                .unwrap_or_else(|| summary.text());
            tokio::fs::write(dest, text)
                .await
                .with_context(|| format!("failed to write {}", dest.display()))?;
            out.note(format!("Saved: {}", dest.display()));
        }
        return out.emit(&entity, summary);
    }
    match route {
        Route::Results => run_results(ctx, out).await,
        Route::Dashboard => {
            let dash = results::assemble_dashboard(ctx.backend.as_ref(), ctx.store()).await?;
            out.emit(&dash, text_summary::dashboard_summary(&dash))
        }
        Route::CoverLetterTemplates | Route::EmailTemplates => {
            let kind = if route == Route::EmailTemplates {
                TemplateKind::Email
            } else {
                TemplateKind::CoverLetter
            };
            let all = templates::search(kind, "");
            out.emit(&all, text_summary::templates_summary(&all))
        }
        Route::Ats | Route::SkillAnalysis => {
            bail!("{route} is interactive; use `careercraft ats` or `careercraft skill-gap`")
        }
        Route::Auth => bail!("use `careercraft login` or `careercraft register`"),
        _ => {
            let session = ctx.sessions.current();
            out.emit(&session, text_summary::session_summary(session))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_backend() {
        let args = Cli::parse_from(["careercraft", "whoami"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.graphql_url(), format!("{DEFAULT_API_URL}/graphql"));
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert!(cfg.progress_script);
    }

    #[test]
    fn apply_parses_board_and_output_type() {
        let args = Cli::parse_from([
            "careercraft",
            "--progress-script",
            "false",
            "apply",
            "--resume",
            "cv.pdf",
            "--job-url",
            "https://jobs.example.com/123",
            "--source",
            "workday",
            "--type",
            "email",
        ]);
        assert!(!args.progress_script);
        match args.command {
            Some(Command::Apply { source, output, .. }) => {
                assert_eq!(source, JobSource::Workday);
                assert_eq!(output, OutputKind::ColdEmail);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resume_and_resume_id_conflict() {
        let res = Cli::try_parse_from([
            "careercraft",
            "apply",
            "--resume",
            "cv.pdf",
            "--resume-id",
            "r1",
            "--job-url",
            "x",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn protected_routes_need_login() {
        let args = Cli::parse_from(["careercraft", "--ephemeral", "dashboard"]);
        let ctx = open_context(&args).unwrap();
        let err = enter(&ctx, "/dashboard").unwrap_err();
        assert!(err.to_string().contains("careercraft login"));
        assert_eq!(enter(&ctx, "/results").unwrap(), Route::Results);
        assert_eq!(enter(&ctx, "/auth").unwrap(), Route::Auth);
    }
}
