use crate::{logger::ERROR_KEY, Error, Fields, Logger, Severity};
use serde_json::Value;
use std::fmt;

/// A logger bound to a fixed set of attributes
///
/// Every record it emits carries the bound attributes merged with any
/// per-call ones, the per-call value winning on a shared key. The bound set
/// never changes, so repeated calls do not accumulate attributes.
#[derive(Debug, Clone)]
pub struct ContextualLogger {
    logger: Logger,
    fields: Fields,
}

impl ContextualLogger {
    pub(crate) fn new(logger: Logger, fields: Fields) -> Self {
        ContextualLogger { logger, fields }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Derives a logger bound to these fields overlaid with `fields`
    pub fn with_fields(&self, fields: Fields) -> ContextualLogger {
        ContextualLogger::new(self.logger.clone(), self.fields.merged(&fields))
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> ContextualLogger {
        self.with_fields(Fields::new().with(key, value))
    }

    pub fn with_error(&self, err: &dyn std::error::Error) -> ContextualLogger {
        self.with_field(ERROR_KEY, err.to_string())
    }

    pub fn log(
        &self,
        severity: Severity,
        message: impl fmt::Display,
        extra: &Fields,
    ) -> Result<(), Error> {
        self.logger
            .dispatch(severity, message, || self.fields.merged(extra))
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Severity::Trace, message)
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Severity::Debug, message)
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Severity::Info, message)
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Severity::Warn, message)
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Severity::Error, message)
    }

    pub fn fatal(&self, message: impl fmt::Display) {
        self.emit(Severity::Fatal, message)
    }

    pub fn panic(&self, message: impl fmt::Display) {
        self.emit(Severity::Panic, message)
    }

    fn emit(&self, severity: Severity, message: impl fmt::Display) {
        let result = self
            .logger
            .dispatch(severity, message, || self.fields.clone());
        self.logger.report(result)
    }
}
