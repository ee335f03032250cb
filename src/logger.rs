//! The base structured logger and its configuration

use crate::{
    format::{self, Encoder, Record, TimestampFormat},
    ContextualLogger, Error, Fields, Severity,
};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::{
    env, fmt,
    io::{self, Write},
    panic::{self, AssertUnwindSafe},
    process,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError,
    },
};

/// Environment variable consulted by [`Builder::from_env`]
pub const DEFAULT_LEVEL_ENV: &str = "RUST_LOG";

/// Attribute key used by `with_error`
pub const ERROR_KEY: &str = "error";

pub type ErrorHandler = dyn Fn(&Error) + Send + Sync;
pub type TerminateHook = dyn Fn(Severity, &str) + Send + Sync;
pub type Clock = dyn Fn() -> DateTime<FixedOffset> + Send + Sync;
type ExitHandler = Arc<dyn Fn() + Send + Sync>;

/// Where encoded records are written
pub enum Target {
    Stdout,
    Stderr,
    Pipe(Box<dyn Write + Send + 'static>),
}

impl Target {
    fn into_writer(self) -> Box<dyn Write + Send> {
        match self {
            Target::Stdout => Box::new(io::stdout()),
            Target::Stderr => Box::new(io::stderr()),
            Target::Pipe(pipe) => pipe,
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::Stdout
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Stdout => "Stdout",
            Target::Stderr => "Stderr",
            Target::Pipe(_) => "Pipe",
        })
    }
}

fn report_to_stderr(err: &Error) {
    report_failure(io::stderr(), err)
}

// a closed stderr must not turn a sink failure into a crash
fn report_failure<W: Write>(mut out: W, err: &Error) {
    let _ = writeln!(out, "Failed to write to log, {}", err);
}

fn terminate_process(severity: Severity, message: &str) {
    match severity {
        Severity::Panic => panic!("{}", message),
        _ => process::exit(1),
    }
}

/// Configuration for a [`Logger`], fixed at construction
pub struct Builder {
    min_level: Severity,
    target: Target,
    encoder: Encoder,
    clock: Arc<Clock>,
    on_error: Arc<ErrorHandler>,
    on_terminate: Arc<TerminateHook>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            min_level: Severity::default(),
            target: Target::default(),
            encoder: Encoder::default(),
            clock: Arc::new(format::now),
            on_error: Arc::new(report_to_stderr),
            on_terminate: Arc::new(terminate_process),
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose minimum level is read from `RUST_LOG` when it names a single level
    pub fn from_env() -> Self {
        let builder = Self::new();
        match env::var(DEFAULT_LEVEL_ENV)
            .ok()
            .and_then(|value| value.parse::<Severity>().ok())
        {
            Some(level) => builder.min_level(level),
            None => builder,
        }
    }

    pub fn min_level(mut self, level: Severity) -> Self {
        self.min_level = level;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.encoder.set_timestamp_format(format);
        self
    }

    /// Replaces the source of record timestamps
    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Called with sink failures the caller cannot otherwise observe
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    /// Replaces process termination for `Fatal` and `Panic` records
    ///
    /// The default exits with status 1 for `Fatal` and panics with the record
    /// message for `Panic`.
    pub fn on_terminate<F>(mut self, hook: F) -> Self
    where
        F: Fn(Severity, &str) + Send + Sync + 'static,
    {
        self.on_terminate = Arc::new(hook);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            shared: Arc::new(Shared {
                min_level: AtomicUsize::new(self.min_level.index()),
                encoder: RwLock::new(self.encoder),
                sink: Mutex::new(self.target.into_writer()),
                clock: self.clock,
                on_error: self.on_error,
                on_terminate: self.on_terminate,
                exit_handlers: Mutex::new(Vec::new()),
                exiting: AtomicBool::new(false),
            }),
        }
    }
}

struct Shared {
    min_level: AtomicUsize,
    encoder: RwLock<Encoder>,
    sink: Mutex<Box<dyn Write + Send>>,
    clock: Arc<Clock>,
    on_error: Arc<ErrorHandler>,
    on_terminate: Arc<TerminateHook>,
    exit_handlers: Mutex<Vec<ExitHandler>>,
    exiting: AtomicBool,
}

/// A structured JSON logger
///
/// Cloning is cheap and every clone shares configuration and sink, so a
/// logger may be handed to as many threads as needed. Each record is written
/// to the sink as one unit.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Default for Logger {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level())
            .finish()
    }
}

impl Logger {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn min_level(&self) -> Severity {
        Severity::from_index(self.shared.min_level.load(Ordering::Relaxed))
    }

    pub fn set_min_level(&self, level: Severity) {
        self.shared
            .min_level
            .store(level.index(), Ordering::Relaxed);
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_level()
    }

    /// Redirects subsequent records, dropping the previous sink
    pub fn set_output(&self, target: Target) {
        *self.shared.sink.lock().unwrap_or_else(PoisonError::into_inner) = target.into_writer();
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) {
        self.shared
            .encoder
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_timestamp_format(format);
    }

    /// Registers a function to run before a `Fatal` record ends the process
    ///
    /// Handlers run in registration order, once per logger. A panicking
    /// handler does not stop the ones after it, and a handler may itself log,
    /// including at `Fatal`.
    pub fn register_exit_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .exit_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Writes one record unless `severity` is below the minimum level
    ///
    /// `Fatal` and `Panic` terminate through the configured hook after the
    /// write attempt, whether or not the record was written. A write failure
    /// on those severities goes to the error handler since the caller never
    /// sees a return value.
    pub fn log(
        &self,
        severity: Severity,
        message: impl fmt::Display,
        fields: &Fields,
    ) -> Result<(), Error> {
        self.dispatch(severity, message, || fields.clone())
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Trace, message, &Fields::new()))
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Debug, message, &Fields::new()))
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Info, message, &Fields::new()))
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Warn, message, &Fields::new()))
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Error, message, &Fields::new()))
    }

    pub fn fatal(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Fatal, message, &Fields::new()))
    }

    pub fn panic(&self, message: impl fmt::Display) {
        self.report(self.log(Severity::Panic, message, &Fields::new()))
    }

    /// Derives a logger that adds `fields` to every record
    pub fn with_fields(&self, fields: Fields) -> ContextualLogger {
        ContextualLogger::new(self.clone(), fields)
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> ContextualLogger {
        self.with_fields(Fields::new().with(key, value))
    }

    pub fn with_error(&self, err: &dyn std::error::Error) -> ContextualLogger {
        self.with_field(ERROR_KEY, err.to_string())
    }

    pub(crate) fn dispatch<M, F>(
        &self,
        severity: Severity,
        message: M,
        fields: F,
    ) -> Result<(), Error>
    where
        M: fmt::Display,
        F: FnOnce() -> Fields,
    {
        if !self.enabled(severity) {
            if severity.is_terminal() {
                self.terminate(severity, &message.to_string());
            }
            return Ok(());
        }

        let record = Record::new((self.shared.clock)(), severity, message.to_string(), fields());
        let written = self.write(&record);
        if severity.is_terminal() {
            if let Err(err) = &written {
                (self.shared.on_error)(err);
            }
            self.terminate(severity, record.message());
            return Ok(());
        }
        written
    }

    pub(crate) fn report(&self, result: Result<(), Error>) {
        if let Err(err) = result {
            (self.shared.on_error)(&err);
        }
    }

    /// Like [`Logger::log`] for a non-terminal record, but drops the record
    /// instead of waiting when the sink is held
    ///
    /// Used from the panic hook, which may run on a thread that panicked
    /// while writing.
    pub(crate) fn log_unless_busy(
        &self,
        severity: Severity,
        message: impl fmt::Display,
        fields: &Fields,
    ) -> Result<(), Error> {
        if !self.enabled(severity) {
            return Ok(());
        }
        let record = Record::new((self.shared.clock)(), severity, message.to_string(), fields.clone());
        let line = self.encode(&record)?;
        let sink = match self.shared.sink.try_lock() {
            Ok(sink) => sink,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(()),
        };
        write_line(sink, &line)
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>, Error> {
        self.shared
            .encoder
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .encode(record)
    }

    fn write(&self, record: &Record) -> Result<(), Error> {
        let line = self.encode(record)?;
        write_line(
            self.shared.sink.lock().unwrap_or_else(PoisonError::into_inner),
            &line,
        )
    }

    fn terminate(&self, severity: Severity, message: &str) {
        if severity == Severity::Fatal && !self.shared.exiting.swap(true, Ordering::SeqCst) {
            let handlers: Vec<ExitHandler> = self
                .shared
                .exit_handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for handler in handlers {
                if panic::catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                    let _ = writeln!(io::stderr(), "exit handler panicked");
                }
            }
        }
        (self.shared.on_terminate)(severity, message);
    }
}

fn write_line(mut sink: MutexGuard<'_, Box<dyn Write + Send>>, line: &[u8]) -> Result<(), Error> {
    sink.write_all(line)?;
    sink.flush()?;
    Ok(())
}
