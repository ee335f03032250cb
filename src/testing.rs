use crate::{Builder, Severity, Target};
use chrono::{DateTime, FixedOffset, TimeZone};
use serde_json::Value;
use std::{
    io,
    sync::{Arc, Mutex},
};

/// An in-memory sink whose contents can be inspected after logging
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn target(&self) -> Target {
        Target::Pipe(Box::new(self.clone()))
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn records(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that rejects every write
pub struct Broken;

impl io::Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Terminations requested through the hook instead of ending the test process
#[derive(Clone, Default)]
pub struct Terminations(Arc<Mutex<Vec<(Severity, String)>>>);

impl Terminations {
    pub fn taken(&self) -> Vec<(Severity, String)> {
        self.0.lock().unwrap().clone()
    }
}

pub fn fixed_time() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2018, 11, 26, 12, 0, 4)
        .unwrap()
}

/// A trace-level builder writing to `capture` on a frozen clock, with terminations recorded
pub fn builder(capture: &Capture, terminations: &Terminations) -> Builder {
    let recorded = terminations.clone();
    Builder::new()
        .min_level(Severity::Trace)
        .target(capture.target())
        .clock(fixed_time)
        .on_terminate(move |severity, message| {
            recorded
                .0
                .lock()
                .unwrap()
                .push((severity, message.to_string()))
        })
}
