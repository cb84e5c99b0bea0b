//! Session state coordinator.
//!
//! The editor side moves through `Idle -> Editing -> Executing -> Editing`.
//! The project list moves through `Unloaded -> Loading -> Loaded | LoadFailed`
//! independently; a failed load is retried by loading again.
//!
//! Every operation takes `&self`. State lives behind a `parking_lot::Mutex`
//! that is never held across an await, so a run in flight does not block
//! editor notifications, and a second run request observes `Executing` and
//! is ignored.

use std::sync::Arc;

use blocklab_sandbox::{ExecutionResult, SandboxSet};
use blocklab_storage::{Language, NewProject, Project, ProjectId};
use parking_lot::Mutex;

use crate::gateway::{GatewayError, ProjectGateway};

const LOAD_FAILED_MESSAGE: &str = "Failed to load projects. Please try again.";

/// Editor-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No diagram yet.
    Idle,
    /// Diagram present; generated code may be stale.
    Editing,
    /// A run is in flight.
    Executing,
}

/// State of the cached project list behind the load affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectListState {
    Unloaded,
    Loading,
    Loaded(Vec<Project>),
    /// Displayable, retryable error.
    LoadFailed(String),
}

/// Presentation snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub language: Language,
    pub diagram: Option<String>,
    pub generated_code: String,
    pub last_result: Option<ExecutionResult>,
    pub editor: EditorState,
    pub projects: ProjectListState,
    pub load_dialog_open: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            language: Language::default(),
            diagram: None,
            generated_code: String::new(),
            last_result: None,
            editor: EditorState::Idle,
            projects: ProjectListState::Unloaded,
            load_dialog_open: false,
        }
    }
}

impl SessionState {
    fn has_diagram(&self) -> bool {
        self.diagram.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Editor state to settle in when no run is in flight.
    fn resting_state(&self) -> EditorState {
        if self.has_diagram() {
            EditorState::Editing
        } else {
            EditorState::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            title: title.to_string(),
            description: description.into(),
        }
    }

    fn error(title: &str, description: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// What a run request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(ExecutionResult),
    /// Generated code was empty or whitespace; the sandbox was not called.
    NothingToRun,
    /// A run was already in flight; the request had no effect.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("nothing to save: create some blocks first")]
    NothingToSave,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    notifications: Vec<Notification>,
    /// Bumped whenever the session content is replaced wholesale, so a run
    /// that started before the replacement does not report into it.
    epoch: u64,
}

impl Inner {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

/// A single-user editing session.
pub struct Session {
    inner: Mutex<Inner>,
    gateway: Arc<dyn ProjectGateway>,
    sandboxes: SandboxSet,
}

impl Session {
    pub fn new(gateway: Arc<dyn ProjectGateway>, sandboxes: SandboxSet) -> Self {
        Session {
            inner: Mutex::new(Inner::default()),
            gateway,
            sandboxes,
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn editor_state(&self) -> EditorState {
        self.inner.lock().state.editor
    }

    /// Drains pending notifications, oldest first.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.inner.lock().notifications)
    }

    // -----------------------------------------------------------------------
    // Editor
    // -----------------------------------------------------------------------

    /// Discards diagram, code, and result.
    ///
    /// A run already in flight keeps the session `Executing` until it
    /// finishes; its result is dropped.
    pub fn new_project(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        let state = &mut inner.state;
        state.diagram = None;
        state.generated_code.clear();
        state.last_result = None;
        if state.editor != EditorState::Executing {
            state.editor = EditorState::Idle;
        }
        let language = state.language;
        inner.notify(Notification::info(
            "New project created",
            format!("Started a new {} project", language.display_name()),
        ));
    }

    /// Records a change notification from the block editor.
    ///
    /// The editor compiles the diagram itself and hands over both. Calls are
    /// applied in order, one at a time; nothing is coalesced.
    pub fn diagram_changed(&self, diagram: impl Into<String>, generated_code: impl Into<String>) {
        let mut inner = self.inner.lock();
        let state = &mut inner.state;
        state.diagram = Some(diagram.into());
        state.generated_code = generated_code.into();
        if state.editor != EditorState::Executing {
            state.editor = state.resting_state();
        }
    }

    /// Switches the target language. The editor follows up with a
    /// regenerated diagram/code pair.
    pub fn set_language(&self, language: Language) {
        let mut inner = self.inner.lock();
        inner.state.language = language;
        inner.state.last_result = None;
    }

    pub fn clear_output(&self) {
        self.inner.lock().state.last_result = None;
    }

    /// Runs the current generated code in the sandbox for the current
    /// language.
    pub async fn run_code(&self) -> RunOutcome {
        let (language, code, epoch) = {
            let mut inner = self.inner.lock();
            if inner.state.editor == EditorState::Executing {
                tracing::debug!("run requested while executing; ignored");
                return RunOutcome::Ignored;
            }
            if inner.state.generated_code.trim().is_empty() {
                inner.notify(Notification::error(
                    "Nothing to run",
                    "Create some blocks first to generate code",
                ));
                return RunOutcome::NothingToRun;
            }
            inner.state.editor = EditorState::Executing;
            inner.state.last_result = None;
            (
                inner.state.language,
                inner.state.generated_code.clone(),
                inner.epoch,
            )
        };

        let guard = ExecutingGuard { inner: &self.inner };
        let result = self.sandboxes.execute(language, &code).await;
        guard.finish(epoch, &result);
        RunOutcome::Completed(result)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Saves the current diagram and code as a new project, then refreshes
    /// the project list.
    pub async fn save_project(&self, name: &str) -> Result<Project, SessionError> {
        let new_project = {
            let mut inner = self.inner.lock();
            if !inner.state.has_diagram() {
                inner.notify(Notification::error("Nothing to save", "Create some blocks first"));
                return Err(SessionError::NothingToSave);
            }
            let state = &inner.state;
            NewProject::new(
                name,
                state.language,
                state.diagram.clone().unwrap_or_default(),
                state.generated_code.clone(),
            )
        };

        match self.gateway.create_project(new_project).await {
            Ok(project) => {
                self.inner.lock().notify(Notification::info(
                    "Project saved",
                    format!("\"{}\" has been saved successfully", project.name),
                ));
                self.refresh_projects().await;
                Ok(project)
            }
            Err(err) => {
                tracing::warn!(error = %err, "saving project failed");
                self.inner.lock().notify(Notification::error(
                    "Save failed",
                    "Could not save your project. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    /// Opens the load affordance and fetches the project list.
    pub async fn open_load_dialog(&self) -> ProjectListState {
        self.inner.lock().state.load_dialog_open = true;
        self.refresh_projects().await
    }

    pub fn close_load_dialog(&self) {
        self.inner.lock().state.load_dialog_open = false;
    }

    /// Re-enters `Loading` and fetches the project list.
    pub async fn refresh_projects(&self) -> ProjectListState {
        self.inner.lock().state.projects = ProjectListState::Loading;

        let next = match self.gateway.list_projects().await {
            Ok(projects) => ProjectListState::Loaded(projects),
            Err(err) => {
                tracing::warn!(error = %err, "fetching projects failed");
                ProjectListState::LoadFailed(LOAD_FAILED_MESSAGE.to_string())
            }
        };
        self.inner.lock().state.projects = next.clone();
        next
    }

    /// Replaces the session content with `project` and closes the load
    /// affordance.
    pub fn load_project(&self, project: &Project) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        let state = &mut inner.state;
        state.language = project.language;
        state.diagram = Some(project.diagram.clone());
        state.generated_code = project.generated_code.clone();
        state.last_result = None;
        state.load_dialog_open = false;
        if state.editor != EditorState::Executing {
            state.editor = state.resting_state();
        }
        inner.notify(Notification::info(
            "Project loaded",
            format!("\"{}\" has been loaded successfully", project.name),
        ));
    }

    /// Fetches a project by ID and loads it.
    pub async fn load_project_by_id(&self, id: ProjectId) -> Result<Project, SessionError> {
        let project = self.gateway.get_project(id).await.map_err(|err| {
            self.inner
                .lock()
                .notify(Notification::error("Load failed", err.to_string()));
            err
        })?;
        self.load_project(&project);
        Ok(project)
    }
}

/// Leaves `Executing` even if the run future is dropped mid-flight.
struct ExecutingGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl ExecutingGuard<'_> {
    fn finish(self, epoch: u64, result: &ExecutionResult) {
        {
            let mut inner = self.inner.lock();
            if inner.epoch == epoch {
                inner.state.last_result = Some(result.clone());
                if !result.is_success() {
                    inner.notify(Notification::error("Execution failed", result.error.clone()));
                }
            }
        }
        // Drop settles the editor state.
    }
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        inner.state.editor = inner.state.resting_state();
    }
}
