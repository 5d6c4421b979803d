//! SQLite persistence shared by the CLI and the HTTP server.
//!
//! Raw SQL with rusqlite, one repository struct per table family. Writers go
//! through [`Store::write`] so both front ends serialize on the same lock.

pub mod decisions;
pub mod feature_requests;
pub mod init;
pub mod store;
pub mod transcripts;

#[cfg(test)]
mod tests;

pub use decisions::DecisionRepository;
pub use feature_requests::FeatureRequestRepository;
pub use init::{migrate, open, open_in_memory};
pub use store::Store;
pub use transcripts::{TranscriptRepository, TranscriptSummary};

use chrono::{DateTime, SecondsFormat, Utc};

/// Storage format for timestamps: RFC 3339, UTC, microsecond precision.
pub(crate) fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}
