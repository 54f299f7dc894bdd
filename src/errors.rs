use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failure of a single call to the generation backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("generation service unavailable: {0}")] Unavailable(String),
    #[error("malformed generation output: {0}")] MalformedOutput(String),
    #[error("generation timed out: {0}")] Timeout(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    ServiceUnavailable,
    MalformedOutput,
    Timeout,
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ServiceError::Unavailable(_) => ServiceErrorKind::ServiceUnavailable,
            ServiceError::MalformedOutput(_) => ServiceErrorKind::MalformedOutput,
            ServiceError::Timeout(_) => ServiceErrorKind::Timeout,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout(e.to_string())
        } else if e.is_decode() {
            ServiceError::MalformedOutput(e.to_string())
        } else {
            ServiceError::Unavailable(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {0}")] Backend(String),
    #[error("cache entry codec error: {0}")] Codec(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, msg: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(msg.into());
    }

    /// Merge errors of a nested record under `prefix.field`.
    pub fn absorb(&mut self, prefix: &str, other: FieldErrors) {
        for (field, msgs) in other.0 {
            let key = format!("{prefix}.{field}");
            self.0.entry(key).or_default().extend(msgs);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msgs) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, msgs.join(", "))?;
        }
        Ok(())
    }
}
