//! Correlation ids tie together every record logged on behalf of one transaction.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::{Builder, Uuid};

/// A source of random bytes
pub trait EntropySource {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), getrandom::Error>;
}

/// The operating system's random source
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), getrandom::Error> {
        getrandom::fill(dest)
    }
}

/// An immutable, randomly derived 128-bit transaction identifier
///
/// Rendered in canonical hyphenated form, e.g. `5cf8ed31-b894-43ab-82d6-35c97accb312`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a new id from the operating system's random source
    ///
    /// Fails with [`Error::EntropyUnavailable`] when the source cannot be read.
    /// Callers decide whether to abort or retry the transaction.
    pub fn generate() -> Result<Self, Error> {
        Self::generate_from(&mut OsEntropy)
    }

    /// Generates a new id from the given random source
    pub fn generate_from<S>(source: &mut S) -> Result<Self, Error>
    where
        S: EntropySource + ?Sized,
    {
        let mut bytes = [0u8; 16];
        source.fill(&mut bytes).map_err(Error::EntropyUnavailable)?;
        Ok(CorrelationId(Builder::from_random_bytes(bytes).into_uuid()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(CorrelationId)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        CorrelationId(uuid)
    }
}

impl From<CorrelationId> for serde_json::Value {
    fn from(id: CorrelationId) -> Self {
        serde_json::Value::String(id.to_string())
    }
}

impl From<&CorrelationId> for serde_json::Value {
    fn from(id: &CorrelationId) -> Self {
        serde_json::Value::String(id.to_string())
    }
}
