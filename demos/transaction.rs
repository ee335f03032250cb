//! an example following one transaction through contextual and per-call logging
//!
//! Fatal and Panic end the process, so they are only emitted when the first
//! argument is `fatal` or `panic`.

use json_context_logger::{fields, CorrelationId, Error, Logger, Severity, TimestampFormat};
use serde_json::json;
use std::env;

fn main() -> Result<(), Error> {
    let logger = Logger::builder().min_level(Severity::Trace).build();

    // a transaction without an id should not proceed
    let uid = CorrelationId::generate()?;
    println!("Random UUID Transaction Key: {}", uid);

    let headers = json!({
        "Some-Data": ["http-data"],
        "User-Agent": ["some-browser", "another-browser"],
        "X-Forwarded-Ip": ["127.0.0.1", "192.168.1.1"],
    });

    println!("*** Begin Context logging example ***");
    let context = logger.with_fields(fields! {
        "logMapObject" => headers.clone(),
        "sso" => "123123123",
        "sample message" => "sample logging message using Context Logging",
        "uid" => uid,
    });
    context.info("info log message");
    context.debug("debug log message");
    context.warn("warn log message");
    context.error("error log message");
    context.trace("trace log message");

    println!("*** Begin individual log lines example ***");
    logger.set_timestamp_format(TimestampFormat::unix_date());

    logger.log(
        Severity::Info,
        "Info log message",
        &fields! { "testMapObj" => headers, "sso" => "123456789", "size" => 10, "uid" => uid },
    )?;
    logger.log(
        Severity::Warn,
        "Warn log message",
        &fields! { "sso" => "999999999", "size" => 25, "uid" => uid },
    )?;
    logger.log(
        Severity::Debug,
        "Debug log message",
        &fields! { "sso" => "555555555", "size" => 45, "title" => "debug title", "moo" => "m00", "uid" => uid },
    )?;

    logger.register_exit_handler(|| println!("*** exiting ***"));
    match env::args().nth(1).as_deref() {
        Some("fatal") => logger.log(
            Severity::Fatal,
            "Fatal log message",
            &fields! { "sso" => "555555555", "size" => 62, "type" => "Fatal", "uid" => uid },
        )?,
        Some("panic") => logger.log(
            Severity::Panic,
            "Panic log message",
            &fields! { "sso" => "555555555", "size" => 88, "type" => "Panic", "uid" => uid },
        )?,
        _ => {}
    }

    Ok(())
}
