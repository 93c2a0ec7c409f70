//! Error types for the price-monitoring pipeline.

use thiserror::Error;

/// Errors that can occur while checking products and dispatching alerts.
///
/// Per-item variants (`Network`, `Blocked`, `Parse`, `InvalidPrice`) skip the
/// affected product for the run; `Persistence` and `Notification` are logged
/// where they occur and never abort the batch. Only a failure to list the
/// active products is fatal to a run.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Connection, timeout or other transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The source site answered with an anti-automation response.
    #[error("request blocked by source site: {0}")]
    Blocked(String),

    /// No selector candidate yielded usable text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Price text was found but did not parse to a positive number.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// The store rejected a read or write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Mail dispatch failed for one user.
    #[error("notification error: {0}")]
    Notification(String),

    /// Scheduler setup or job registration failed.
    #[error("schedule error: {0}")]
    Schedule(String),
}

impl TrackerError {
    /// Short tag used in structured logs to classify failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Blocked(_) => "blocked",
            Self::Parse(_) => "parse",
            Self::InvalidPrice(_) => "invalid_price",
            Self::Persistence(_) => "persistence",
            Self::Notification(_) => "notification",
            Self::Schedule(_) => "schedule",
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("timeout: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<mongodb::error::Error> for TrackerError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for TrackerError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        Self::Schedule(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_distinct_per_variant() {
        assert_eq!(TrackerError::Network("x".into()).kind(), "network");
        assert_eq!(TrackerError::Blocked("x".into()).kind(), "blocked");
        assert_eq!(TrackerError::Parse("x".into()).kind(), "parse");
        assert_eq!(
            TrackerError::InvalidPrice("x".into()).kind(),
            "invalid_price"
        );
        assert_eq!(TrackerError::Persistence("x".into()).kind(), "persistence");
        assert_eq!(
            TrackerError::Notification("x".into()).kind(),
            "notification"
        );
    }

    #[test]
    fn display_includes_detail() {
        let err = TrackerError::InvalidPrice("got 0".into());
        assert!(err.to_string().contains("invalid price"));
        assert!(err.to_string().contains("got 0"));
    }
}
