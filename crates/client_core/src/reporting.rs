//! Strategies for surfacing controller failures to the user.

use std::collections::VecDeque;

use crate::error::ClientError;

pub trait ErrorReporter: Send + Sync {
    fn report(&mut self, error: &ClientError);
    /// Message the views should show, if any.
    fn latest(&self) -> Option<&str>;
    /// Retained failures, oldest first.
    fn log(&self) -> Vec<TaggedError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedError {
    pub tag: &'static str,
    pub message: String,
}

impl From<&ClientError> for TaggedError {
    fn from(error: &ClientError) -> Self {
        Self {
            tag: error.tag(),
            message: error.user_message(),
        }
    }
}

/// Keeps only the most recently settled failure.
#[derive(Debug, Default)]
pub struct LastErrorWins {
    last: Option<TaggedError>,
}

impl ErrorReporter for LastErrorWins {
    fn report(&mut self, error: &ClientError) {
        self.last = Some(error.into());
    }

    fn latest(&self) -> Option<&str> {
        self.last.as_ref().map(|entry| entry.message.as_str())
    }

    fn log(&self) -> Vec<TaggedError> {
        self.last.iter().cloned().collect()
    }
}

/// Bounded, tagged history; the newest entry is the visible one.
#[derive(Debug)]
pub struct ErrorHistory {
    entries: VecDeque<TaggedError>,
    capacity: usize,
}

impl ErrorHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TaggedError> {
        self.entries.iter()
    }
}

impl ErrorReporter for ErrorHistory {
    fn report(&mut self, error: &ClientError) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(error.into());
    }

    fn latest(&self) -> Option<&str> {
        self.entries.back().map(|entry| entry.message.as_str())
    }

    fn log(&self) -> Vec<TaggedError> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeolocationError, Operation, RepositoryError};

    #[test]
    fn last_error_wins_overwrites() {
        let mut reporter = LastErrorWins::default();
        assert_eq!(reporter.latest(), None);

        reporter.report(&RepositoryError::network(Operation::Reports, "boom").into());
        reporter.report(&RepositoryError::network(Operation::RedZones, "bang").into());

        assert_eq!(reporter.latest(), Some("Error fetching red zones: bang"));
        let tags: Vec<_> = reporter.log().into_iter().map(|entry| entry.tag).collect();
        assert_eq!(tags, vec!["red_zones"]);
    }

    #[test]
    fn history_is_bounded_and_tagged() {
        let mut history = ErrorHistory::with_capacity(2);
        history.report(&GeolocationError::Timeout.into());
        history.report(&RepositoryError::network(Operation::Reports, "a").into());
        history.report(&RepositoryError::validation("No image file").into());

        let tags: Vec<_> = history.entries().map(|entry| entry.tag).collect();
        assert_eq!(tags, vec!["reports", "validation"]);
        assert_eq!(history.latest(), Some("Error creating report: No image file"));
    }
}
