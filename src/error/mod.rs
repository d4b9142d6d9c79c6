//! # Error Module
//!
//! Error types for the remote photo duplicate detector.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Recoverable vs. structural** - a photo that cannot be downloaded or
//!   hashed is recovered into the run output; only unreadable input or
//!   unwritable output aborts the run
//! - **Include context** - URLs, line numbers, attempt counts

use thiserror::Error;

/// Top-level application error. Only structural failures land here; the
/// engine never returns one of these for an individual record.
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Record source error: {0}")]
    Source(#[from] SourceError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors reading the input record list
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read record file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row at line {line}: expected 4 fields, found {found}")]
    MalformedRow { line: usize, found: usize },
}

/// A single download/decode attempt that went wrong. Feeds the retry loop;
/// the last one is preserved in [`FetchFailed`].
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to decode image from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Terminal download failure after the retry budget is exhausted.
///
/// Recovered into a `FailedRecord` by the engine; never fatal to the run.
#[derive(Error, Debug, Clone)]
#[error("Failed to download image from {url} after {attempts} attempts: {last_error}")]
pub struct FetchFailed {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub last_error: FetchError,
}

/// Errors computing a perceptual fingerprint.
///
/// Distinct from [`FetchFailed`]: per current policy these are logged and
/// counted but do not produce a failed-download row.
#[derive(Error, Debug, Clone)]
pub enum HashError {
    #[error("Image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors writing the output reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_includes_line_number() {
        let error = SourceError::MalformedRow { line: 42, found: 2 };
        let message = error.to_string();
        assert!(message.contains("42"));
        assert!(message.contains("expected 4 fields"));
    }

    #[test]
    fn fetch_failed_includes_url_and_attempts() {
        let error = FetchFailed {
            url: "http://example.com/a.jpg".to_string(),
            attempts: 3,
            last_error: FetchError::Transport {
                url: "http://example.com/a.jpg".to_string(),
                message: "connection refused".to_string(),
            },
        };
        let message = error.to_string();
        assert!(message.contains("http://example.com/a.jpg"));
        assert!(message.contains("3 attempts"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn hash_error_reports_dimensions() {
        let error = HashError::EmptyImage { width: 0, height: 200 };
        assert!(error.to_string().contains("0x200"));
    }
}
