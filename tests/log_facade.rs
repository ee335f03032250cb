use json_context_logger::{Logger, Target};
use kv_log_macro::{debug, info, warn};
use lazy_static::lazy_static;
use serde_json::{json, Value};
use serial_test::serial;
use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};

#[derive(Clone, Default)]
struct Pipe(Arc<Mutex<Vec<u8>>>);

impl io::Write for Pipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink whose writer panics mid-record
struct Exploding;

impl io::Write for Exploding {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        panic!("sink exploded")
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Pipe {
    fn target(&self) -> Target {
        Target::Pipe(Box::new(self.clone()))
    }

    fn drain(&self) -> Vec<Value> {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap());
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

lazy_static! {
    static ref PIPE: Pipe = {
        let pipe = Pipe::default();
        json_context_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .target(json_context_logger::env_logger::Target::Pipe(Box::new(
                pipe.clone(),
            )))
            .try_init()
            .unwrap();
        pipe
    };
}

#[test]
#[serial]
fn renders_log_records_as_sorted_json() {
    PIPE.drain();
    info!("I am an info", { task_id: 567, thread_id: "12" });

    let records = PIPE.drain();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], json!("info"));
    assert_eq!(record["msg"], json!("I am an info"));
    assert_eq!(record["task_id"], json!(567));
    assert_eq!(record["thread_id"], json!("12"));
    assert!(record["time"].is_string());
}

#[test]
#[serial]
fn respects_the_configured_filter() {
    PIPE.drain();
    debug!("I am a debug", { foo: 2.3 });
    warn!("I am a warning");

    let records = PIPE.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], json!("warning"));
}

#[test]
#[serial]
fn panic_hook_logs_panics_as_errors() {
    let pipe = Pipe::default();
    json_context_logger::panic_hook(Logger::builder().target(pipe.target()).build());

    let outcome = thread::Builder::new()
        .name("panicking_worker".into())
        .spawn(|| panic::catch_unwind(|| panic!("boom")).is_err())
        .unwrap()
        .join()
        .unwrap();
    let _ = panic::take_hook();
    assert!(outcome);

    let records = pipe.drain();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], json!("error"));
    assert_eq!(record["msg"], json!("panicked at 'boom'"));
    assert_eq!(record["thread"], json!("panicking_worker"));
    assert!(record["location"]
        .as_str()
        .unwrap()
        .starts_with("tests/log_facade.rs:"));
}

#[test]
#[serial]
fn panic_hook_skips_panics_raised_while_writing() {
    let pipe = Pipe::default();
    let logger = Logger::builder().target(Target::Pipe(Box::new(Exploding))).build();
    json_context_logger::panic_hook(logger.clone());

    let (done, finished) = mpsc::channel();
    let worker = logger.clone();
    thread::spawn(move || {
        let unwound = panic::catch_unwind(AssertUnwindSafe(|| worker.info("lost"))).is_err();
        let _ = done.send(unwound);
    });
    let unwound = finished.recv_timeout(Duration::from_secs(3));
    let _ = panic::take_hook();
    assert_eq!(unwound, Ok(true));

    // the sink stays usable once the writer is replaced
    logger.set_output(pipe.target());
    logger.info("after");
    let records = pipe.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["msg"], json!("after"));
}
