//! Named result holders
//!
//! A slot is absent until its fetch starts, loading while it is in flight,
//! then either ready or failed. Failure of one slot never touches another.

use aether_client::ClientError;
use serde::Serialize;

/// Why a fetch produced no value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    /// Human-readable cause
    pub message: String,
    /// HTTP status, if the service answered
    pub status: Option<u16>,
    /// Whether the caller-supplied deadline elapsed
    pub timed_out: bool,
}

impl From<&ClientError> for FetchFailure {
    fn from(err: &ClientError) -> Self {
        Self {
            message: err.to_string(),
            status: err.status(),
            timed_out: matches!(err, ClientError::Timeout(_)),
        }
    }
}

/// Current value of one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Slot<T> {
    /// Not requested
    Absent,
    /// Request in flight
    Loading,
    /// Payload received
    Ready(T),
    /// Request failed or timed out
    Failed(FetchFailure),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<T> Slot<T> {
    /// Payload, if ready
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a payload is present
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    /// Whether a request is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading)
    }

    /// Whether the last request failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }

    /// Failure details, if failed
    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Slot::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Borrowing view
    #[must_use]
    pub fn as_ref(&self) -> Slot<&T> {
        match self {
            Slot::Absent => Slot::Absent,
            Slot::Loading => Slot::Loading,
            Slot::Ready(value) => Slot::Ready(value),
            Slot::Failed(failure) => Slot::Failed(failure.clone()),
        }
    }

    /// Store the outcome of a fetch
    pub fn resolve(&mut self, result: Result<T, &ClientError>) {
        *self = match result {
            Ok(value) => Slot::Ready(value),
            Err(err) => Slot::Failed(FetchFailure::from(err)),
        };
    }
}
