/*!
Background execution of the two external calls.

Pages never await the form service themselves. They ask the app for a
`TaskKind`, the `TaskExecutor` runs it on the tokio runtime and the result
re-enters the event loop as an `Action`:

- `Register(identity)`  -> `Action::Registered` / `Action::RegistrationFailed`
- `FetchForm(roll)`     -> `Action::FormLoaded` / `Action::FormFailed`

Every dispatch is stamped with the current generation. `invalidate()` bumps
the generation when the user leaves a page, and results carrying an older
stamp are dropped instead of being delivered to a page that is gone.
*/

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use forms::{FormService, Identity, SchemaError, ServiceError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;

pub const REGISTER_FAILED: &str = "Failed to connect to the server. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load the form. Please try again.";

/// Shown instead of `LOAD_FAILED` when the form arrived but is misconfigured.
pub fn misconfigured(error: &SchemaError) -> String {
    format!("This form cannot be shown: {error}")
}

/// Monotonic task identifier type.
pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    Register(Identity),
    FetchForm(String),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Register(identity) => write!(f, "Register({})", identity.roll_number),
            TaskKind::FetchForm(roll_number) => write!(f, "FetchForm({roll_number})"),
        }
    }
}

/// Handle for scheduling background tasks. Cheap to clone.
pub struct TaskExecutor<S> {
    tx: mpsc::UnboundedSender<Dispatch>,
    generation: Arc<AtomicU64>,
    _service: std::marker::PhantomData<fn() -> S>,
}

impl<S> Clone for TaskExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            generation: self.generation.clone(),
            _service: std::marker::PhantomData,
        }
    }
}

struct Dispatch {
    id: TaskId,
    generation: u64,
    kind: TaskKind,
}

impl<S> TaskExecutor<S>
where
    S: FormService + 'static,
{
    /// Create the executor and spawn its worker. Results are sent on
    /// `action_tx`.
    pub fn new(service: Arc<S>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Dispatch>();
        let generation = Arc::new(AtomicU64::new(0));
        Worker {
            rx,
            service,
            action_tx,
            generation: generation.clone(),
        }
        .spawn();
        Self {
            tx,
            generation,
            _service: std::marker::PhantomData,
        }
    }

    pub fn spawn(&self, kind: TaskKind) -> TaskId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let generation = self.generation.load(Ordering::SeqCst);
        if let Err(e) = self.tx.send(Dispatch {
            id,
            generation,
            kind,
        }) {
            warn!("TaskExecutor channel closed; failed to schedule task: {e}");
        }
        id
    }

    /// Results of everything scheduled so far will be dropped.
    pub fn invalidate(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        debug!(generation = previous + 1, "pending task results invalidated");
    }
}

struct Worker<S> {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    service: Arc<S>,
    action_tx: mpsc::UnboundedSender<Action>,
    generation: Arc<AtomicU64>,
}

impl<S> Worker<S>
where
    S: FormService + 'static,
{
    fn spawn(self) {
        let Worker {
            mut rx,
            service,
            action_tx,
            generation,
        } = self;
        tokio::spawn(async move {
            while let Some(dispatch) = rx.recv().await {
                let id = dispatch.id;
                let stamp = dispatch.generation;
                let action = run(service.as_ref(), dispatch).await;
                if stamp != generation.load(Ordering::SeqCst) {
                    debug!("[task:{id}] result dropped, page was left");
                    continue;
                }
                let _ = action_tx.send(action);
            }
            info!("TaskExecutor worker stopped (channel closed)");
        });
    }
}

async fn run<S: FormService>(service: &S, dispatch: Dispatch) -> Action {
    info!("[task:{}] started {}", dispatch.id, dispatch.kind);
    match dispatch.kind {
        TaskKind::Register(identity) => match service.register_user(&identity).await {
            Ok(outcome) => {
                info!("[task:{}] registration: {outcome}", dispatch.id);
                Action::Registered(outcome)
            }
            Err(e) => {
                warn!("[task:{}] registration failed: {}", dispatch.id, describe(&e));
                Action::RegistrationFailed(REGISTER_FAILED.into())
            }
        },
        TaskKind::FetchForm(roll_number) => match service.fetch_form(&roll_number).await {
            Ok(schema) => Action::FormLoaded(schema),
            Err(ServiceError::Schema(e)) => {
                warn!("[task:{}] form configuration error: {e}", dispatch.id);
                Action::FormFailed(misconfigured(&e))
            }
            Err(e) => {
                warn!("[task:{}] fetching form failed: {}", dispatch.id, describe(&e));
                Action::FormFailed(LOAD_FAILED.into())
            }
        },
    }
}

fn describe(error: &ServiceError) -> String {
    match error {
        ServiceError::Schema(e) => format!("form configuration error: {e}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forms::FileFormService;
    use std::time::Duration;

    const FORM: &str = r#"{ "formTitle": "T", "sections": [
        { "title": "S", "fields": [{ "fieldId": "a", "type": "text", "label": "A" }] }
    ] }"#;

    fn form_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), FORM).unwrap();
        file
    }

    #[tokio::test]
    async fn delivers_results_as_actions() {
        let file = form_file();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(Arc::new(FileFormService::new(file.path())), tx);

        exec.spawn(TaskKind::Register(Identity {
            roll_number: "1".into(),
            name: "A".into(),
        }));
        exec.spawn(TaskKind::FetchForm("1".into()));

        assert_eq!(
            rx.recv().await,
            Some(Action::Registered(forms::RegisterOutcome::Created))
        );
        assert!(matches!(rx.recv().await, Some(Action::FormLoaded(s)) if s.title == "T"));
    }

    #[tokio::test]
    async fn failures_use_page_messages() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(
            Arc::new(FileFormService::new(dir.path().join("missing.json"))),
            tx,
        );
        exec.spawn(TaskKind::FetchForm("1".into()));
        assert_eq!(rx.recv().await, Some(Action::FormFailed(LOAD_FAILED.into())));
    }

    #[tokio::test]
    async fn misconfigured_form_is_named() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{ "formTitle": "T", "sections": [{ "title": "Empty", "fields": [] }] }"#,
        )
        .unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(Arc::new(FileFormService::new(file.path())), tx);
        exec.spawn(TaskKind::FetchForm("1".into()));

        let Some(Action::FormFailed(message)) = rx.recv().await else {
            panic!("expected FormFailed");
        };
        assert!(message.starts_with("This form cannot be shown: "), "{message}");
        assert_ne!(message, LOAD_FAILED);
    }

    #[tokio::test]
    async fn invalidated_results_are_dropped() {
        let file = form_file();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exec = TaskExecutor::new(Arc::new(FileFormService::new(file.path())), tx);

        exec.spawn(TaskKind::FetchForm("1".into()));
        exec.invalidate();
        let fresh = exec.spawn(TaskKind::FetchForm("2".into()));
        assert!(fresh > 0);

        // only the dispatch made after invalidate() arrives
        assert!(matches!(rx.recv().await, Some(Action::FormLoaded(_))));
        let next = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(next.is_err(), "stale result was delivered: {next:?}");
    }
}
