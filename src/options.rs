use chrono::{DateTime, Utc};
use kube::api::LogParams;

/// Configuration applied to every log stream opened during one collection
/// run.
///
/// Options compose by chaining; each setter assigns its own field, so the
/// order of calls does not matter and later calls only override the same
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Keep the stream open and emit new lines as they arrive instead of
    /// terminating at the end of current output.
    pub follow: bool,
    /// Retrieve logs from the previous terminated instance of the container.
    pub previous: bool,
    /// Only return log lines emitted at or after this timestamp.
    pub since: Option<DateTime<Utc>>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_follow(mut self) -> Self {
        self.follow = true;
        self
    }

    pub fn with_previous(mut self) -> Self {
        self.previous = true;
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Render these options as the API-level log parameters for one
    /// container.
    pub(crate) fn to_log_params(&self, container: &str) -> LogParams {
        LogParams {
            container: Some(container.to_string()),
            follow: self.follow,
            previous: self.previous,
            since_time: self.since,
            ..LogParams::default()
        }
    }
}
