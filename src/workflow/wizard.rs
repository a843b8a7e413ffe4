//! Guided submission: resume upload, job upload, output choice, generation.

use super::progress;
use crate::client::{Backend, ResumeFile};
use crate::error::{Action, WorkflowError, WorkflowResult};
use crate::model::{GeneratedOutput, JobSource, OutputKind, UploadedJobRef, UploadedResumeRef};
use crate::store::KeyedStore;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WizardStep {
    Welcome,
    ResumeInput,
    JobInput,
    OutputTypeSelect,
    Generating,
}

impl WizardStep {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            WizardStep::Welcome => 0,
            WizardStep::ResumeInput => 1,
            WizardStep::JobInput => 2,
            WizardStep::OutputTypeSelect => 3,
            WizardStep::Generating => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Welcome => "Welcome",
            WizardStep::ResumeInput => "Upload resume",
            WizardStep::JobInput => "Job posting",
            WizardStep::OutputTypeSelect => "Output type",
            WizardStep::Generating => "Generating",
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Welcome => WizardStep::ResumeInput,
            WizardStep::ResumeInput => WizardStep::JobInput,
            WizardStep::JobInput => WizardStep::OutputTypeSelect,
            WizardStep::OutputTypeSelect | WizardStep::Generating => WizardStep::Generating,
        }
    }
}

/// What the user has entered so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WizardInputs {
    pub resume_path: Option<PathBuf>,
    /// Identifier of a resume uploaded earlier; when set, step 1 skips the upload.
    pub known_resume_id: String,
    pub job_url: String,
    pub job_source: JobSource,
    pub output_kind: Option<OutputKind>,
}

/// Remote work a step needs before it can advance.
#[derive(Debug, Clone)]
pub enum Effect {
    UploadResume {
        path: PathBuf,
        user_id: String,
    },
    UploadJob {
        url: String,
        source: JobSource,
        user_id: String,
    },
    Generate {
        resume_id: String,
        job_id: String,
        user_id: String,
        kind: OutputKind,
    },
}

#[derive(Debug, Clone)]
pub enum Completed {
    Resume(UploadedResumeRef),
    Job(UploadedJobRef),
    Output(GeneratedOutput),
}

pub type Outcome = WorkflowResult<Completed>;

impl Effect {
    pub fn action(&self) -> Action {
        match self {
            Effect::UploadResume { .. } => Action::UploadResume,
            Effect::UploadJob { .. } => Action::UploadJob,
            Effect::Generate { .. } => Action::Generate,
        }
    }

    /// Perform the call. `progress` receives status text while generating.
    pub async fn run(
        self,
        backend: &dyn Backend,
        progress: Option<&UnboundedSender<String>>,
        scripted: bool,
    ) -> Outcome {
        let action = self.action();
        match self {
            Effect::UploadResume { path, user_id } => {
                let file = ResumeFile::load(&path)
                    .await
                    .map_err(|e| WorkflowError::InvalidInput(e.to_string()))?;
                backend
                    .upload_and_parse_resume(&file, &user_id)
                    .await
                    .map(Completed::Resume)
                    .map_err(WorkflowError::remote(action))
            }
            Effect::UploadJob {
                url,
                source,
                user_id,
            } => backend
                .upload_job(&url, source, &user_id)
                .await
                .map(Completed::Job)
                .map_err(WorkflowError::remote(action)),
            Effect::Generate {
                resume_id,
                job_id,
                user_id,
                kind,
            } => {
                let call = backend.generate_final_output(&resume_id, &job_id, &user_id, kind);
                progress::with_script(call, progress, scripted)
                    .await
                    .map(Completed::Output)
                    .map_err(WorkflowError::remote(action))
            }
        }
    }
}

/// Result of asking the wizard to move forward.
#[derive(Debug)]
pub enum Transition {
    /// Moved without any remote call.
    Moved(WizardStep),
    /// A call must complete first; the wizard is now in flight.
    Pending(Effect),
}

/// Result of applying a successful outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Moved(WizardStep),
    Closed(GeneratedOutput),
}

#[derive(Debug, Clone, Serialize)]
pub struct Wizard {
    step: WizardStep,
    pub inputs: WizardInputs,
    in_flight: bool,
    status: Option<String>,
    closed: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Welcome,
            inputs: WizardInputs::default(),
            in_flight: false,
            status: None,
            closed: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Whether the step's input predicate holds, ignoring in-flight state.
    pub fn input_ready(step: WizardStep, inputs: &WizardInputs) -> bool {
        match step {
            WizardStep::Welcome => true,
            WizardStep::ResumeInput => {
                inputs.resume_path.is_some() || !inputs.known_resume_id.trim().is_empty()
            }
            WizardStep::JobInput => !inputs.job_url.trim().is_empty(),
            WizardStep::OutputTypeSelect | WizardStep::Generating => inputs.output_kind.is_some(),
        }
    }

    /// The primary control is enabled iff the input predicate holds and nothing is in flight.
    pub fn can_proceed(&self) -> bool {
        !self.closed && !self.in_flight && Self::input_ready(self.step, &self.inputs)
    }

    /// Validate the current step and either move or describe the call to make.
    pub fn begin(&mut self, store: &KeyedStore) -> WorkflowResult<Transition> {
        if self.closed {
            return Err(WorkflowError::InvalidInput("the wizard is closed".into()));
        }
        if self.in_flight {
            return Err(WorkflowError::InvalidInput(
                "a request is already in progress".into(),
            ));
        }
        if !Self::input_ready(self.step, &self.inputs) {
            return Err(WorkflowError::InvalidInput(
                match self.step {
                    WizardStep::ResumeInput => "choose a resume file first",
                    WizardStep::JobInput => "enter the job posting URL first",
                    _ => "choose an output type first",
                }
                .into(),
            ));
        }

        let effect = match self.step {
            WizardStep::Welcome => return Ok(Transition::Moved(self.advance_step())),
            WizardStep::ResumeInput => {
                let known = self.inputs.known_resume_id.trim();
                if !known.is_empty() {
                    store.set_resume_id(known)?;
                    tracing::info!(resume_id = known, "using previously uploaded resume");
                    return Ok(Transition::Moved(self.advance_step()));
                }
                let user_id = store.user_id().ok_or(WorkflowError::MissingPrerequisite("userId"))?;
                let path = self
                    .inputs
                    .resume_path
                    .clone()
                    .ok_or_else(|| WorkflowError::InvalidInput("choose a resume file first".into()))?;
                Effect::UploadResume { path, user_id }
            }
            WizardStep::JobInput => {
                let user_id = store.user_id().ok_or(WorkflowError::MissingPrerequisite("userId"))?;
                Effect::UploadJob {
                    url: self.inputs.job_url.trim().to_string(),
                    source: self.inputs.job_source,
                    user_id,
                }
            }
            WizardStep::OutputTypeSelect | WizardStep::Generating => {
                let user_id = store.user_id().ok_or(WorkflowError::MissingPrerequisite("userId"))?;
                let resume_id = store
                    .resume_id()
                    .ok_or(WorkflowError::MissingPrerequisite("resumeId"))?;
                let job_id = store.job_id().ok_or(WorkflowError::MissingPrerequisite("jobId"))?;
                let kind = self
                    .inputs
                    .output_kind
                    .ok_or_else(|| WorkflowError::InvalidInput("choose an output type first".into()))?;
                self.step = WizardStep::Generating;
                Effect::Generate {
                    resume_id,
                    job_id,
                    user_id,
                    kind,
                }
            }
        };

        self.in_flight = true;
        self.status = None;
        tracing::debug!(step = self.step.index(), action = ?effect.action(), "wizard call started");
        Ok(Transition::Pending(effect))
    }

    /// Apply the outcome of the pending call. Failures leave the step unchanged.
    pub fn complete(&mut self, outcome: Outcome, store: &KeyedStore) -> WorkflowResult<Applied> {
        self.in_flight = false;
        self.status = None;
        let completed = match outcome {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(step = self.step.index(), error = %e, "wizard step failed");
                return Err(e);
            }
        };

        match (self.step, completed) {
            (WizardStep::ResumeInput, Completed::Resume(r)) => {
                store.set_resume_id(&r.id)?;
                tracing::info!(resume_id = %r.id, "resume uploaded");
                Ok(Applied::Moved(self.advance_step()))
            }
            (WizardStep::JobInput, Completed::Job(j)) => {
                store.set_job_id(&j.id)?;
                tracing::info!(job_id = %j.id, title = j.title.as_deref().unwrap_or(""), "job uploaded");
                Ok(Applied::Moved(self.advance_step()))
            }
            (WizardStep::Generating, Completed::Output(out)) => {
                match out.kind {
                    OutputKind::CoverLetter => store.set_cover_letter_id(&out.id)?,
                    OutputKind::ColdEmail => store.set_email_id(&out.id)?,
                }
                tracing::info!(id = %out.id, kind = out.kind.backend_path(), "output generated");
                self.closed = true;
                Ok(Applied::Closed(out))
            }
            (step, other) => Err(WorkflowError::InvalidInput(format!(
                "unexpected {other:?} at step {}",
                step.index()
            ))),
        }
    }

    /// Run one full step against `backend`: begin, call, complete.
    pub async fn advance(
        &mut self,
        backend: &dyn Backend,
        store: &KeyedStore,
        progress: Option<&UnboundedSender<String>>,
        scripted: bool,
    ) -> WorkflowResult<Applied> {
        match self.begin(store)? {
            Transition::Moved(step) => Ok(Applied::Moved(step)),
            Transition::Pending(effect) => {
                let outcome = effect.run(backend, progress, scripted).await;
                self.complete(outcome, store)
            }
        }
    }

    fn advance_step(&mut self) -> WizardStep {
        self.step = self.step.next();
        self.step
    }
}
