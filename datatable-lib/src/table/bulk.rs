//! Bulk actions over the selected rows on a page

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::error::BulkActionError;
use crate::model::RowKey;

type BulkHandler<T> =
    dyn Fn(Vec<T>, Vec<RowKey>) -> BoxFuture<'static, Result<(), BulkActionError>> + Send + Sync;

type DisabledFn<T> = dyn Fn(&[&T], &[RowKey]) -> bool + Send + Sync;

/// When a bulk action is unavailable.
pub enum Disabled<T> {
    /// Fixed availability.
    Fixed(bool),
    /// Decided from the selected rows and keys on the page.
    When(Arc<DisabledFn<T>>),
}

impl<T> Disabled<T> {
    pub fn evaluate(&self, rows: &[&T], keys: &[RowKey]) -> bool {
        match self {
            Disabled::Fixed(disabled) => *disabled,
            Disabled::When(f) => f(rows, keys),
        }
    }
}

impl<T> Default for Disabled<T> {
    fn default() -> Self {
        Disabled::Fixed(false)
    }
}

impl<T> Clone for Disabled<T> {
    fn clone(&self) -> Self {
        match self {
            Disabled::Fixed(disabled) => Disabled::Fixed(*disabled),
            Disabled::When(f) => Disabled::When(Arc::clone(f)),
        }
    }
}

/// An operation run once against the selected rows on a page.
///
/// # Example
///
/// ```
/// use datatable_lib::error::BulkActionError;
/// use datatable_lib::table::BulkAction;
///
/// let archive: BulkAction<String> = BulkAction::new("archive", "Archive", |rows, _keys| async move {
///     if rows.is_empty() {
///         return Err(BulkActionError::msg("nothing to archive"));
///     }
///     Ok(())
/// })
/// .with_confirm("Archive the selected rows?")
/// .disabled_when(|rows, _| rows.len() > 100);
///
/// assert_eq!(archive.id, "archive");
/// ```
pub struct BulkAction<T> {
    pub id: String,
    pub label: String,
    pub disabled: Disabled<T>,
    /// Asked before running; declining aborts.
    pub confirm: Option<String>,
    handler: Arc<BulkHandler<T>>,
}

impl<T> BulkAction<T> {
    /// Action with an async handler.
    pub fn new<F, Fut>(id: impl Into<String>, label: impl Into<String>, handler: F) -> Self
    where
        T: 'static,
        F: Fn(Vec<T>, Vec<RowKey>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BulkActionError>> + Send + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: Disabled::default(),
            confirm: None,
            handler: Arc::new(move |rows: Vec<T>, keys: Vec<RowKey>| handler(rows, keys).boxed()),
        }
    }

    /// Action with a synchronous handler.
    pub fn sync<F>(id: impl Into<String>, label: impl Into<String>, handler: F) -> Self
    where
        T: 'static,
        F: Fn(Vec<T>, Vec<RowKey>) -> Result<(), BulkActionError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: Disabled::default(),
            confirm: None,
            handler: Arc::new(move |rows: Vec<T>, keys: Vec<RowKey>| {
                futures::future::ready(handler(rows, keys)).boxed()
            }),
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Disabled::Fixed(disabled);
        self
    }

    pub fn disabled_when<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&T], &[RowKey]) -> bool + Send + Sync + 'static,
    {
        self.disabled = Disabled::When(Arc::new(f));
        self
    }

    pub fn with_confirm(mut self, message: impl Into<String>) -> Self {
        self.confirm = Some(message.into());
        self
    }

    pub fn is_disabled(&self, rows: &[&T], keys: &[RowKey]) -> bool {
        self.disabled.evaluate(rows, keys)
    }
}

impl<T> Clone for BulkAction<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            disabled: self.disabled.clone(),
            confirm: self.confirm.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> std::fmt::Debug for BulkAction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("confirm", &self.confirm)
            .finish()
    }
}

/// Blocking yes/no confirmation.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Receives bulk action failures.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, action_id: &str, error: &BulkActionError);
}

impl<F> ErrorReporter for F
where
    F: Fn(&str, &BulkActionError) + Send + Sync,
{
    fn report(&self, action_id: &str, error: &BulkActionError) {
        self(action_id, error)
    }
}

/// Reports failures through `log::error!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, action_id: &str, error: &BulkActionError) {
        log::error!("Bulk action failed: {}: {}", action_id, error);
    }
}

/// What a run did.
#[derive(Debug)]
pub enum BulkOutcome {
    /// The action was disabled for this selection.
    Disabled,
    /// Confirmation was declined or unavailable.
    Declined,
    /// The handler finished successfully.
    Completed,
    /// The handler failed; the error was reported.
    Failed,
    /// The handler is still running on the tokio runtime.
    Spawned(JoinHandle<()>),
    /// The handler is still running on a dedicated thread; there was no
    /// runtime to spawn onto.
    Detached(std::thread::JoinHandle<()>),
}

/// Runs bulk actions, isolating their failures.
#[derive(Clone)]
pub struct BulkActionRunner {
    confirmer: Option<Arc<dyn Confirmer>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl BulkActionRunner {
    /// Runner without a confirmer, reporting to the log.
    pub fn new() -> Self {
        Self {
            confirmer: None,
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_confirmer(mut self, confirmer: Option<Arc<dyn Confirmer>>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Runs `action` with the selected rows and keys of the current page.
    ///
    /// Handlers that finish on their first poll are resolved inline. Others
    /// are spawned onto the current tokio runtime, or onto a detached thread
    /// when there is none, and never block the caller. Failures never
    /// propagate.
    pub fn run<T>(&self, action: &BulkAction<T>, rows: &[&T], keys: &[RowKey]) -> BulkOutcome
    where
        T: Clone,
    {
        if action.is_disabled(rows, keys) {
            log::debug!("Bulk action {} is disabled", action.id);
            return BulkOutcome::Disabled;
        }

        if let Some(message) = &action.confirm {
            let confirmed = self.confirmer.as_ref().is_some_and(|c| c.confirm(message));
            if !confirmed {
                log::debug!("Bulk action {} was not confirmed", action.id);
                return BulkOutcome::Declined;
            }
        }

        let rows: Vec<T> = rows.iter().map(|row| (*row).clone()).collect();
        let mut task = (action.handler)(rows, keys.to_vec());

        match (&mut task).now_or_never() {
            Some(result) => self.settle(&action.id, result),
            None => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let reporter = Arc::clone(&self.reporter);
                    let id = action.id.clone();
                    BulkOutcome::Spawned(handle.spawn(async move {
                        if let Err(e) = task.await {
                            reporter.report(&id, &e);
                        }
                    }))
                }
                Err(_) => {
                    log::debug!("No async runtime, running bulk action {} on its own thread", action.id);
                    let reporter = Arc::clone(&self.reporter);
                    let id = action.id.clone();
                    BulkOutcome::Detached(std::thread::spawn(move || {
                        if let Err(e) = futures::executor::block_on(task) {
                            reporter.report(&id, &e);
                        }
                    }))
                }
            },
        }
    }

    fn settle(&self, action_id: &str, result: Result<(), BulkActionError>) -> BulkOutcome {
        match result {
            Ok(()) => BulkOutcome::Completed,
            Err(e) => {
                self.reporter.report(action_id, &e);
                BulkOutcome::Failed
            }
        }
    }
}

impl Default for BulkActionRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BulkActionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkActionRunner")
            .field("confirmer", &self.confirmer.is_some())
            .finish()
    }
}
