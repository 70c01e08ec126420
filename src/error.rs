//! Error types for the search engine
//!
//! Soft misses (nothing matched, optional UI absent) are never errors: they
//! surface as empty collections, `None`, or sentinel values. Only failures that
//! make the current step meaningless end up here.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a document backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Browser or protocol failure
    #[error("browser error: {0}")]
    Browser(String),

    /// The query could not be parsed by the backend
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// An injected script failed or returned something unexpected
    #[error("script error: {0}")]
    Script(String),

    /// The backend cannot perform this capability
    #[error("unsupported by this backend: {0}")]
    Unsupported(&'static str),
}

impl From<anyhow::Error> for DriverError {
    fn from(err: anyhow::Error) -> Self {
        DriverError::Browser(err.to_string())
    }
}

/// A wait whose condition never held within its timeout
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("timed out after {elapsed:?} waiting for {what}")]
pub struct WaitTimeout {
    pub what: String,
    pub elapsed: Duration,
}

/// Fatal failure of an essential step
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// An essential wait expired
    #[error("hard timeout: {0}")]
    HardTimeout(#[from] WaitTimeout),

    /// The target date never showed up while paging the calendar
    #[error("date {date} not found after {attempts} calendar pages")]
    DateNotFound { date: String, attempts: usize },

    /// A day offset lands outside the representable calendar
    #[error("date offset of {days} days is out of range")]
    DateOutOfRange { days: i64 },

    /// The calendar has no way to page forward
    #[error("next month control not found while looking for {date}")]
    NextMonthMissing { date: String },

    /// Check-out must come strictly after check-in
    #[error("invalid stay: check-out {check_out} is not after check-in {check_in}")]
    InvalidStay { check_in: String, check_out: String },

    /// The calendar must be open before a date can be picked
    #[error("calendar is not open")]
    CalendarClosed,

    /// An essential control is absent
    #[error("required element missing: {what}")]
    MissingElement { what: String },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl FlowError {
    /// Whether the failure came from an expired wait rather than a missing shape
    pub fn is_timeout(&self) -> bool {
        matches!(self, FlowError::HardTimeout(_))
    }
}

/// Invalid or missing configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_converts_to_hard_timeout() {
        let err: FlowError = WaitTimeout {
            what: "search results".to_string(),
            elapsed: Duration::from_secs(10),
        }
        .into();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("search results"));
    }

    #[test]
    fn driver_error_is_not_a_timeout() {
        let err: FlowError = DriverError::Unsupported("screenshot").into();
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "unsupported by this backend: screenshot");
    }
}
