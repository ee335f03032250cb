//! `json_context_logger` is a structured JSON logger built around per-transaction
//! correlation ids and contextual fields.
//!
//! Every record is written as one JSON object per line with its keys in sorted
//! order, so output is reproducible byte-for-byte apart from the timestamp.
//!
//! ```no_run
//! use json_context_logger::{fields, CorrelationId, Logger, Severity};
//!
//! # fn main() -> Result<(), json_context_logger::Error> {
//! let logger = Logger::builder().min_level(Severity::Trace).build();
//! let uid = CorrelationId::generate()?;
//!
//! let context = logger.with_fields(fields! { "sso" => "444444444", "uid" => uid });
//! context.info("info log message");
//! // {"level":"info","msg":"info log message","sso":"444444444","time":"...","uid":"..."}
//!
//! logger.log(Severity::Warn, "Warn log message", &fields! { "size" => 25, "uid" => uid })?;
//! # Ok(())
//! # }
//! ```
//!
//! A logger is configured once through its [`Builder`] and then shared by
//! cloning. `Fatal` and `Panic` records end the process after they are
//! written; tests can substitute that with [`Builder::on_terminate`].
//!
//! ## `log` crate
//!
//! [`init`] registers an `env_logger` that renders `log` records with the same
//! JSON encoding, controlled by the usual `RUST_LOG` variable.
//!
//! ## features
//!
//! * `backtrace`
//!
//! When registering a panic hook with `panic_hook` by default backtraces are omitted. You can
//! annotate your error with them by enabling the `backtrace` feature.
//!
//! ```toml
//! [dependencies]
//! json_context_logger = { version = "0.1", features = ["backtrace"] }
//! ```

// export to make types accessible without
// requiring adding another Cargo.toml dependency
#[doc(hidden)]
pub extern crate env_logger;

#[macro_use]
mod fields;

mod bridge;
mod context;
mod correlation;
mod error;
mod format;
mod level;
mod logger;

#[cfg(test)]
mod testing;

pub use bridge::{builder, builder_with, init, panic_hook, try_init};
pub use context::ContextualLogger;
pub use correlation::{CorrelationId, EntropySource, OsEntropy};
pub use error::Error;
pub use fields::Fields;
pub use format::{Encoder, FieldKeys, Record, TimestampFormat};
pub use level::Severity;
pub use logger::{
    Builder, Clock, ErrorHandler, Logger, Target, TerminateHook, DEFAULT_LEVEL_ENV, ERROR_KEY,
};
