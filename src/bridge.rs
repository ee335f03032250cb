//! Integration with the `log` facade through `env_logger`

use crate::{
    format::{self, Encoder, Record},
    Fields, Logger, Severity,
};
use env_logger::Builder;
use log::kv;
use std::{
    io::{self, Write},
    panic, thread,
};

/// Register a JSON `env_logger` with the `log` crate.
///
/// Applications should ensure this fn gets called once and only once per application
/// lifetime
///
/// # panics
///
/// Panics if a logger has already been configured
pub fn init() {
    if let Err(err) = try_init() {
        panic!("failed to register json logger: {}", err)
    }
}

/// Register a JSON `env_logger` with the `log` crate
///
/// Will yield a `log::SetLoggerError` when a logger has already
/// been configured
pub fn try_init() -> Result<(), log::SetLoggerError> {
    builder().try_init()
}

/// Yields the standard env_logger builder configured to log in JSON format
///
/// Levels are read from `RUST_LOG`. Key-values attached to `log` records
/// (for instance with `kv-log-macro`) become record attributes.
pub fn builder() -> Builder {
    builder_with(Encoder::default())
}

/// Like [`builder`], rendering records with `encoder`
pub fn builder_with(encoder: Encoder) -> Builder {
    let mut builder = Builder::from_default_env();
    builder.format(move |f, record| {
        let line = encoder
            .encode(&to_record(record))
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        f.write_all(&line)
    });
    builder
}

fn to_record(record: &log::Record<'_>) -> Record {
    struct Collect(Fields);

    impl<'kvs> kv::VisitSource<'kvs> for Collect {
        fn visit_pair(
            &mut self,
            key: kv::Key<'kvs>,
            value: kv::Value<'kvs>,
        ) -> Result<(), kv::Error> {
            let value = serde_json::to_value(&value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            self.0.insert(key.as_str(), value);
            Ok(())
        }
    }

    let mut collect = Collect(Fields::new());
    // a failed visit only drops the remaining attributes
    let _ = record.key_values().visit(&mut collect);
    Record::new(
        format::now(),
        record.level().into(),
        record.args().to_string(),
        collect.0,
    )
}

/// Register a panic hook that logs panics at `Error` through `logger`
///
/// Records carry `thread` and, when known, `location` attributes. A panic
/// raised while the logger's sink is being written is not logged.
pub fn panic_hook(logger: Logger) {
    panic::set_hook(Box::new(move |info| {
        let thread = thread::current();
        let thread = thread.name().unwrap_or("unnamed");

        let msg = match info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &**s,
                None => "Box<Any>",
            },
        };

        let mut fields = fields! { "thread" => thread };
        if let Some(location) = info.location() {
            fields.insert(
                "location",
                format!("{}:{}", location.file(), location.line()),
            );
        }
        #[cfg(feature = "backtrace")]
        fields.insert("backtrace", format!("{:?}", backtrace::Backtrace::new()));

        // the panicking thread may still hold the sink
        logger.report(logger.log_unless_busy(
            Severity::Error,
            format_args!("panicked at '{}'", msg),
            &fields,
        ));
    }));
}
