//! a11yscore converts heterogeneous accessibility-test reports — one JSON
//! report per tested page, with results from several independent analysis
//! tools — into a single reproducible deficit score plus a structured
//! breakdown explaining it.
//!
//! The pipeline runs strictly forward: per-tool normalizers extract
//! weighted findings from each test act, an accumulator folds them into
//! per-(tool, rule) totals, the registry classifies totals into issue
//! groups or solos, penalties cover prevented tests and abnormal
//! browser logging, and the assembler sums everything into a
//! [`ScoreRecord`] attached to the report.
//!
//! ```
//! use a11yscore::{score_report, Report, ScoreProc};
//!
//! let report: Report = serde_json::from_str(
//!     r#"{"id": "example", "acts": [], "jobData": {
//!         "logCount": 0, "logSize": 0, "errorLogCount": 0,
//!         "errorLogSize": 0, "prohibitedCount": 0,
//!         "visitTimeoutCount": 0, "visitRejectionCount": 0,
//!         "visitLatency": 0.0}}"#,
//! )?;
//! let record = score_report(&report, ScoreProc::default_proc())?;
//! assert_eq!(record.summary.total, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod core;
pub mod errors;
pub mod normalize;
pub mod penalty;
pub mod registry;
pub mod score;

pub use crate::aggregate::{Aggregation, GroupDetails, MemberScore, PackageDetails};
pub use crate::config::{
    GroupWeights, LogWeights, PreventionWeights, ScoreProc, ScoreProcData,
};
pub use crate::core::{Act, GroupSummaryItem, JobData, Report, ScoreRecord, Summary};
pub use crate::errors::{Result, ScoreError};
pub use crate::normalize::{adapter_for, supported_tools, Finding, ToolAdapter};
pub use crate::registry::{IssueGroup, IssueRegistry, PatternList, RegistryData, TestSpec};
pub use crate::score::{attach_score, score_report, score_reports};
