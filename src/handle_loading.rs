use core::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use crate::alert::Alert;
use crate::error::HandleLoadingError;
use crate::host::HostCell;
use crate::logger::{ActionLogger, LogFacade};
use crate::utils::CCStr;

pub type LoadingGetter<H> = fn(&H) -> bool;
pub type LoadingSetter<H> = fn(&mut H, bool);
pub type ErrorSetter<H> = fn(&mut H, Option<Alert>);
pub type ErrorCallback<H> = Arc<dyn Fn(&mut H, &str) + Send + Sync>;
pub type LoggerProbe<H> = for<'a> fn(&'a H) -> Option<&'a dyn ActionLogger>;

/// Where the failure of a wrapped action gets reported on the host
pub enum ErrorTarget<H> {
    /// Receives a fresh error [Alert] on failure and is cleared on success
    Field(ErrorSetter<H>),
    /// Called with the error text on failure, untouched on success
    Callback(ErrorCallback<H>),
    /// Nothing to report to: failures surface as [HandleLoadingError::UnboundErrorTarget]
    Unbound,
}
impl<H> Clone for ErrorTarget<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(set_error) => Self::Field(*set_error),
            Self::Callback(callback) => Self::Callback(Arc::clone(callback)),
            Self::Unbound => Self::Unbound,
        }
    }
}
impl<H> core::fmt::Debug for ErrorTarget<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Field(_) => "ErrorTarget::Field",
            Self::Callback(_) => "ErrorTarget::Callback",
            Self::Unbound => "ErrorTarget::Unbound",
        })
    }
}

/// What a single invocation did to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action succeeded
    Completed,
    /// The host was already loading, nothing was run
    Skipped,
    /// The action failed and this alert was written to the error field
    Failed(Alert),
    /// The action failed and the error callback was called with this text
    Reported(CCStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Running,
}

/// Loading-state and error-state handling around asynchronous actions
///
/// Configured once with accessors to the host's loading flag and error
/// target, then used to run actions against any [HostCell] holding that
/// host:
/// 1. If the host is already loading, the call is skipped with a warning
/// 2. Otherwise the loading flag is set for the whole duration of the action
/// 3. On success a field error target is cleared
/// 4. On failure the error is logged then reported to the error target
///
/// Errors of the action itself are never returned to the caller.
///
/// # Examples
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use handle_loading::prelude::*;
///
/// #[derive(Default)]
/// struct LoginForm {
///     loading: bool,
///     server_error: Option<Alert>,
/// }
///
/// let handle = HandleLoading::new(|f: &LoginForm| f.loading, |f, v| f.loading = v)
///     .error_field(|f, alert| f.server_error = alert)
///     .name("submit_login");
///
/// let form = Rc::new(RefCell::new(LoginForm::default()));
/// let outcome = tokio::runtime::Builder::new_current_thread()
///     .build()
///     .unwrap()
///     .block_on(handle.run(&form, |_form| async { Err::<(), _>("network down") }))
///     .unwrap();
///
/// assert!(matches!(outcome, Outcome::Failed(_)));
/// assert!(!form.borrow().loading);
/// assert_eq!(&**form.borrow().server_error.as_ref().unwrap().text(), "network down");
/// ```
pub struct HandleLoading<H> {
    name: CCStr,
    get_loading: LoadingGetter<H>,
    set_loading: LoadingSetter<H>,
    error_target: ErrorTarget<H>,
    logger: Option<LoggerProbe<H>>,
}
impl<H> Clone for HandleLoading<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            get_loading: self.get_loading,
            set_loading: self.set_loading,
            error_target: self.error_target.clone(),
            logger: self.logger,
        }
    }
}
impl<H> core::fmt::Debug for HandleLoading<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleLoading")
            .field("name", &self.name)
            .field("error_target", &self.error_target)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl<H> HandleLoading<H> {
    /// Creates a wrapper toggling the loading flag reached by the given accessors
    ///
    /// The error target starts [ErrorTarget::Unbound]; use [Self::error_field]
    /// or [Self::error_callback] to bind it.
    pub fn new(get_loading: LoadingGetter<H>, set_loading: LoadingSetter<H>) -> Self {
        Self {
            name: CCStr::from("action"),
            get_loading,
            set_loading,
            error_target: ErrorTarget::Unbound,
            logger: None,
        }
    }

    /// Names the action in diagnostics
    pub fn name(mut self, name: impl Into<CCStr>) -> Self {
        self.name = name.into();
        self
    }

    pub fn error_field(mut self, set_error: ErrorSetter<H>) -> Self {
        self.error_target = ErrorTarget::Field(set_error);
        self
    }

    pub fn error_callback(
        mut self,
        callback: impl Fn(&mut H, &str) + Send + Sync + 'static,
    ) -> Self {
        self.error_target = ErrorTarget::Callback(Arc::new(callback));
        self
    }

    /// Probes the host for its own logger, used instead of the [log] facade
    /// when it returns one
    pub fn logger(mut self, probe: LoggerProbe<H>) -> Self {
        self.logger = Some(probe);
        self
    }

    pub fn error_target(&self) -> &ErrorTarget<H> {
        &self.error_target
    }

    pub fn state<C: HostCell<Host = H>>(&self, host: &C) -> LoadingState {
        let get_loading = self.get_loading;
        if host.with_host(|h| get_loading(h)) {
            LoadingState::Running
        } else {
            LoadingState::Idle
        }
    }

    /// Turns `action` into a reusable [LoadingAction]
    pub fn wrap<F>(self, action: F) -> LoadingAction<H, F> {
        LoadingAction {
            handle: self,
            action,
        }
    }

    /// Runs `action` once against `host`
    ///
    /// The action receives a clone of the host cell. Only a missing error
    /// target is returned as an `Err`; failures of the action are reported
    /// in the [Outcome].
    pub async fn run<C, F, Fut, T, E>(
        &self,
        host: &C,
        action: F,
    ) -> Result<Outcome, HandleLoadingError>
    where
        C: HostCell<Host = H>,
        F: FnOnce(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let set_loading = self.set_loading;
        if !host.try_start(self.get_loading, set_loading) {
            self.diagnose(host, |logger| {
                logger.warn(format_args!("Skipping {} as it's loading", self.name))
            });
            return Ok(Outcome::Skipped);
        }

        log::debug!("{} - start", self.name);
        let guard = LoadingGuard {
            host: host.clone(),
            set_loading,
        };
        let outcome = match action(host.clone()).await {
            Ok(_) => {
                if let ErrorTarget::Field(set_error) = self.error_target {
                    host.with_host_mut(|h| set_error(h, None));
                }
                Ok(Outcome::Completed)
            }
            Err(error) => self.process_error(host, error),
        };
        drop(guard);
        log::debug!("{} - finished", self.name);
        outcome
    }

    fn process_error<C, E>(&self, host: &C, error: E) -> Result<Outcome, HandleLoadingError>
    where
        C: HostCell<Host = H>,
        E: Display,
    {
        self.diagnose(host, |logger| {
            logger.error(format_args!("Action error in {}: {error}", self.name))
        });
        let text = CCStr::from(error.to_string());

        match &self.error_target {
            ErrorTarget::Field(set_error) => {
                let alert = Alert::error(text);
                host.with_host_mut(|h| set_error(h, Some(alert.clone())));
                Ok(Outcome::Failed(alert))
            }
            ErrorTarget::Callback(callback) => {
                host.with_host_mut(|h| callback(h, &*text));
                Ok(Outcome::Reported(text))
            }
            ErrorTarget::Unbound => Err(HandleLoadingError::UnboundErrorTarget { text }),
        }
    }

    fn diagnose<C>(&self, host: &C, emit: impl FnOnce(&dyn ActionLogger))
    where
        C: HostCell<Host = H>,
    {
        match self.logger {
            Some(probe) => host.with_host(|h| match probe(h) {
                Some(logger) => emit(logger),
                None => emit(&LogFacade),
            }),
            None => emit(&LogFacade),
        }
    }
}

/// Clears the loading flag when the invocation ends, however it ends
struct LoadingGuard<C: HostCell> {
    host: C,
    set_loading: LoadingSetter<C::Host>,
}
impl<C: HostCell> Drop for LoadingGuard<C> {
    fn drop(&mut self) {
        let set_loading = self.set_loading;
        self.host.with_host_mut(|h| set_loading(h, false));
    }
}

/// An action bound to a [HandleLoading] configuration
///
/// Every [call](Self::call) goes through the same single-flight guard, keyed
/// on the host's loading flag only: arguments play no part in it.
pub struct LoadingAction<H, F> {
    handle: HandleLoading<H>,
    action: F,
}
impl<H, F> LoadingAction<H, F> {
    pub async fn call<C, A, Fut, T, E>(
        &self,
        host: &C,
        args: A,
    ) -> Result<Outcome, HandleLoadingError>
    where
        C: HostCell<Host = H>,
        F: Fn(C, A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.handle
            .run(host, |host| (self.action)(host, args))
            .await
    }

    pub fn state<C: HostCell<Host = H>>(&self, host: &C) -> LoadingState {
        self.handle.state(host)
    }

    pub fn handle(&self) -> &HandleLoading<H> {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::logger::tests::RecordingLogger;

    #[derive(Default)]
    struct Form {
        loading: bool,
        server_error: Option<Alert>,
        messages: Vec<String>,
        logger: Option<Arc<RecordingLogger>>,
    }

    fn handle() -> HandleLoading<Form> {
        HandleLoading::new(|f: &Form| f.loading, |f, v| f.loading = v)
    }

    fn form() -> Rc<RefCell<Form>> {
        Rc::new(RefCell::new(Form::default()))
    }

    #[tokio::test]
    async fn loading_is_set_only_while_running() {
        let handle = handle().error_field(|f, a| f.server_error = a);
        let host = form();
        assert_eq!(handle.state(&host), LoadingState::Idle);

        let outcome = handle
            .run(&host, |host| async move {
                assert!(host.borrow().loading);
                Ok::<_, String>(())
            })
            .await;
        assert_eq!(outcome, Ok(Outcome::Completed));
        assert_eq!(handle.state(&host), LoadingState::Idle);
    }

    #[tokio::test]
    async fn success_clears_error_field() {
        let handle = handle().error_field(|f, a| f.server_error = a);
        let host = form();
        host.borrow_mut().server_error = Some(Alert::error("stale"));

        handle
            .run(&host, |_| async { Ok::<_, String>(42) })
            .await
            .unwrap();
        assert!(host.borrow().server_error.is_none());
    }

    #[tokio::test]
    async fn failure_writes_error_alert() {
        let handle = handle().error_field(|f, a| f.server_error = a);
        let host = form();

        let outcome = handle
            .run(&host, |_| async { Err::<(), _>("network down") })
            .await
            .unwrap();
        let Outcome::Failed(alert) = outcome else {
            panic!("expected a failure, got {outcome:?}");
        };
        assert_eq!(&**alert.text(), "network down");
        assert_eq!(alert.alert_type(), crate::alert::AlertType::Error);
        assert_eq!(host.borrow().server_error.as_ref(), Some(&alert));
        assert!(!host.borrow().loading);
    }

    #[tokio::test]
    async fn failure_calls_callback_once() {
        let handle = handle().error_callback(|f, text| f.messages.push(text.to_owned()));
        let host = form();

        let outcome = handle
            .run(&host, |_| async { Err::<(), _>("bad password") })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Reported("bad password".into()));
        assert_eq!(host.borrow().messages, vec!["bad password"]);
        assert!(host.borrow().server_error.is_none());
        assert!(!host.borrow().loading);
    }

    #[tokio::test]
    async fn callback_is_not_called_on_success() {
        let handle = handle().error_callback(|f, text| f.messages.push(text.to_owned()));
        let host = form();

        handle
            .run(&host, |_| async { Ok::<_, String>(()) })
            .await
            .unwrap();
        assert!(host.borrow().messages.is_empty());
    }

    #[tokio::test]
    async fn unbound_target_returns_the_text() {
        let host = form();
        let result = handle()
            .run(&host, |_| async { Err::<(), _>("no target") })
            .await;
        assert_eq!(
            result,
            Err(HandleLoadingError::UnboundErrorTarget {
                text: "no target".into()
            })
        );
        assert_eq!(result.unwrap_err().to_string(), "no target");
        assert!(!host.borrow().loading);
    }

    #[tokio::test]
    async fn already_loading_skips_the_action() {
        let handle = handle().error_field(|f, a| f.server_error = a);
        let host = form();
        host.borrow_mut().loading = true;
        let runs = AtomicUsize::new(0);
        let counter = &runs;

        let outcome = handle
            .run(&host, move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("should not run")
            })
            .await;
        assert_eq!(outcome, Ok(Outcome::Skipped));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(host.borrow().loading);
        assert!(host.borrow().server_error.is_none());
    }

    #[tokio::test]
    async fn host_logger_receives_diagnostics() {
        let logger = Arc::new(RecordingLogger::default());
        let handle = handle()
            .error_field(|f, a| f.server_error = a)
            .logger(|f| f.logger.as_deref().map(|l| l as &dyn ActionLogger))
            .name("submit");
        let host = form();
        host.borrow_mut().logger = Some(logger.clone());

        handle
            .run(&host, |_| async { Err::<(), _>("timeout") })
            .await
            .unwrap();
        host.borrow_mut().loading = true;
        handle
            .run(&host, |_| async { Ok::<_, String>(()) })
            .await
            .unwrap();

        assert_eq!(
            *logger.errors.lock().unwrap(),
            vec!["Action error in submit: timeout"]
        );
        assert_eq!(
            *logger.warnings.lock().unwrap(),
            vec!["Skipping submit as it's loading"]
        );
    }

    #[tokio::test]
    async fn host_without_logger_falls_back_to_log_facade() {
        let handle = handle()
            .error_field(|f, a| f.server_error = a)
            .logger(|f| f.logger.as_deref().map(|l| l as &dyn ActionLogger));
        let host = form();
        assert!(host.borrow().logger.is_none());

        let outcome = handle
            .run(&host, |_| async { Err::<(), _>("offline") })
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(
            host.borrow().server_error.as_ref().map(|a| a.text().to_string()),
            Some("offline".to_owned())
        );
        assert!(!host.borrow().loading);

        host.borrow_mut().loading = true;
        let skipped = handle
            .run(&host, |_| async { Ok::<_, String>(()) })
            .await;
        assert_eq!(skipped, Ok(Outcome::Skipped));
    }

    #[tokio::test]
    async fn wrapped_action_forwards_arguments() {
        let submit = handle()
            .error_callback(|f, text| f.messages.push(text.to_owned()))
            .wrap(|host: Rc<RefCell<Form>>, (user, ok): (&'static str, bool)| async move {
                host.borrow_mut().messages.push(format!("submitting {user}"));
                if ok {
                    Ok(())
                } else {
                    Err(format!("{user} rejected"))
                }
            });
        let host = form();

        assert_eq!(submit.call(&host, ("alice", true)).await, Ok(Outcome::Completed));
        assert_eq!(
            submit.call(&host, ("bob", false)).await,
            Ok(Outcome::Reported("bob rejected".into()))
        );
        assert_eq!(
            host.borrow().messages,
            vec!["submitting alice", "submitting bob", "bob rejected"]
        );
        assert_eq!(submit.state(&host), LoadingState::Idle);
    }

    #[test]
    fn new_handle_is_unbound() {
        let handle = handle();
        assert!(matches!(handle.error_target(), ErrorTarget::Unbound));
        let handle = handle.error_field(|f, a| f.server_error = a);
        assert!(matches!(handle.clone().error_target(), ErrorTarget::Field(_)));
        assert_eq!(
            format!("{:?}", handle.error_target()),
            "ErrorTarget::Field"
        );
    }
}
