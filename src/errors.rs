//! Error types for scoring operations.
//!
//! Two situations are fatal: a malformed input report (missing the job
//! metadata the log penalty needs) and an inconsistent scoring procedure
//! (a rule claimed by two groups, an uncompilable pattern, bad weights).
//! Both are surfaced to the caller. Everything else — absent tool results,
//! unrecognized rule identifiers — is recoverable and handled inside the
//! engine as preventions or solo findings.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Unified error type for scoring and procedure loading.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The report is structurally unusable: a mandatory field is absent.
    /// This indicates a malformed upstream report, not an absence of
    /// findings, so no score is produced.
    #[error("malformed report {report}: {reason}")]
    MalformedReport { report: String, reason: String },

    /// A (tool, rule) pair is claimed by more than one issue group.
    /// Detected when the reverse index is derived at load time.
    #[error("rule {tool}/{rule} mapped to both group {first} and group {second}")]
    DuplicateRule {
        tool: String,
        rule: String,
        first: String,
        second: String,
    },

    /// A classification fallback pattern failed to compile.
    #[error("invalid pattern for {tool}: {pattern}")]
    InvalidPattern {
        tool: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A weight table fails validation (negative weight, empty id, ...).
    #[error("invalid scoring procedure: {reason}")]
    InvalidProc { reason: String },

    /// Failure parsing a scoring procedure definition.
    #[error("cannot parse scoring procedure")]
    ProcParse(#[from] serde_json::Error),
}

impl ScoreError {
    /// Create a malformed-report error.
    pub fn malformed(report: impl Into<String>, reason: impl Into<String>) -> Self {
        ScoreError::MalformedReport {
            report: report.into(),
            reason: reason.into(),
        }
    }

    /// Create a procedure-validation error.
    pub fn invalid_proc(reason: impl Into<String>) -> Self {
        ScoreError::InvalidProc {
            reason: reason.into(),
        }
    }

    /// True for errors that indicate bad configuration rather than bad
    /// input, i.e. the operator can fix them by editing the procedure.
    pub fn is_proc_error(&self) -> bool {
        matches!(
            self,
            ScoreError::DuplicateRule { .. }
                | ScoreError::InvalidPattern { .. }
                | ScoreError::InvalidProc { .. }
                | ScoreError::ProcParse(_)
        )
    }
}
