use core::fmt::Arguments;

/// Diagnostic logging capability a host can expose
///
/// Implementations must not panic and must return promptly: they are called
/// while the wrapper holds access to the host.
pub trait ActionLogger {
    fn error(&self, args: Arguments<'_>);
    fn warn(&self, args: Arguments<'_>);
}

/// Routes diagnostics to the [log] facade
///
/// This is what the wrapper uses when the host does not provide a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;
impl ActionLogger for LogFacade {
    fn error(&self, args: Arguments<'_>) {
        log::error!("{args}");
    }
    fn warn(&self, args: Arguments<'_>) {
        log::warn!("{args}");
    }
}

/// Discards every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;
impl ActionLogger for NoopLogger {
    fn error(&self, _args: Arguments<'_>) {}
    fn warn(&self, _args: Arguments<'_>) {}
}
