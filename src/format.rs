//! JSON rendering of log records

use crate::{Error, Fields, Severity};
use chrono::{
    format::{Item, StrftimeItems},
    DateTime, FixedOffset, Local, SecondsFormat,
};
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Write};

/// One log emission: immutable once built and discarded after encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    time: DateTime<FixedOffset>,
    severity: Severity,
    message: String,
    fields: Fields,
}

impl Record {
    pub fn new(
        time: DateTime<FixedOffset>,
        severity: Severity,
        message: impl Into<String>,
        fields: Fields,
    ) -> Self {
        Record {
            time,
            severity,
            message: message.into(),
            fields,
        }
    }

    pub fn time(&self) -> &DateTime<FixedOffset> {
        &self.time
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// The current local time with its offset
pub(crate) fn now() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_timezone(now.offset())
}

/// How the time field is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `2018-11-26T12:00:04-05:00`, `Z` for UTC
    Rfc3339,
    /// `2018-11-26T12:00:04.123-05:00`
    Rfc3339Millis,
    /// Milliseconds since the unix epoch, as a JSON number
    UnixMillis,
    /// A `strftime` pattern, see [`TimestampFormat::custom`]
    Custom(String),
}

impl TimestampFormat {
    /// Fixed-width `date(1)` style, e.g. `Mon Nov 26 12:00:04 -05:00 2018`
    pub const UNIX_DATE: &'static str = "%a %b %e %H:%M:%S %Z %Y";

    /// A validated `strftime` pattern
    pub fn custom(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimestampFormat(pattern));
        }
        Ok(TimestampFormat::Custom(pattern))
    }

    pub fn unix_date() -> Self {
        TimestampFormat::Custom(Self::UNIX_DATE.to_string())
    }

    fn render(&self, time: &DateTime<FixedOffset>) -> Value {
        match self {
            TimestampFormat::Rfc3339 => time.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
            TimestampFormat::Rfc3339Millis => {
                time.to_rfc3339_opts(SecondsFormat::Millis, true).into()
            }
            TimestampFormat::UnixMillis => time.timestamp_millis().into(),
            TimestampFormat::Custom(pattern) => {
                let mut rendered = String::new();
                // unvalidated patterns fall back rather than panic mid-write
                match write!(rendered, "{}", time.format(pattern)) {
                    Ok(()) => rendered.into(),
                    Err(_) => time.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
                }
            }
        }
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Rfc3339
    }
}

/// Names of the built-in keys of every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys {
    pub time: String,
    pub level: String,
    pub msg: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        FieldKeys {
            time: "time".into(),
            level: "level".into(),
            msg: "msg".into(),
        }
    }
}

impl FieldKeys {
    fn is_reserved(&self, key: &str) -> bool {
        key == self.time || key == self.level || key == self.msg
    }
}

/// Renders records as single-line JSON objects with sorted keys
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    timestamp_format: TimestampFormat,
    keys: FieldKeys,
    data_key: Option<String>,
    disable_timestamp: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Renames the built-in `time`, `level` and `msg` keys
    pub fn field_keys(mut self, keys: FieldKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Nests all record attributes under a single key
    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    pub fn disable_timestamp(mut self, disable: bool) -> Self {
        self.disable_timestamp = disable;
        self
    }

    pub(crate) fn set_timestamp_format(&mut self, format: TimestampFormat) {
        self.timestamp_format = format;
    }

    /// Encodes a record as one newline-terminated line
    ///
    /// Attributes that collide with a built-in key are kept under
    /// `fields.<key>` rather than overwriting it.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut object: BTreeMap<String, Value> = BTreeMap::new();
        match &self.data_key {
            Some(data_key) => {
                if !record.fields.is_empty() {
                    let data = record
                        .fields
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    object.insert(data_key.clone(), Value::Object(data));
                }
            }
            None => {
                for (key, value) in record.fields.iter() {
                    if self.keys.is_reserved(key) {
                        object.insert(format!("fields.{}", key), value.clone());
                    } else {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        if !self.disable_timestamp {
            object.insert(
                self.keys.time.clone(),
                self.timestamp_format.render(&record.time),
            );
        }
        object.insert(self.keys.level.clone(), record.severity.as_str().into());
        object.insert(self.keys.msg.clone(), record.message.clone().into());

        let mut line = serde_json::to_vec(&object)?;
        line.push(b'\n');
        Ok(line)
    }
}
