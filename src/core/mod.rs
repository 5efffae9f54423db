use crate::aggregate::{GroupDetails, PackageDetails};
use crate::config::{GroupWeights, LogWeights, PreventionWeights};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One per-page test report, as supplied by the external job driver.
///
/// The engine treats every field except `score` as immutable input; scoring
/// appends a [`ScoreRecord`] and changes nothing else.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub acts: Vec<Act>,
    /// Navigation and browser-console metadata for the visit. Mandatory
    /// for scoring; its absence marks the report malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_data: Option<JobData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreRecord>,
}

impl Report {
    pub fn new(id: impl Into<String>, acts: Vec<Act>, job_data: JobData) -> Self {
        Self {
            id: id.into(),
            acts,
            job_data: Some(job_data),
            score: None,
        }
    }

    /// Test acts only; navigation and other act types are invisible to
    /// the scoring engine.
    pub fn test_acts(&self) -> impl Iterator<Item = &Act> {
        self.acts.iter().filter(|act| act.is_test())
    }

    /// The scored total, if this report has been scored.
    pub fn total(&self) -> Option<i64> {
        self.score.as_ref().map(|score| score.summary.total)
    }
}

/// One recorded act within a report. Only acts with type `"test"` carry
/// tool results; the rest (navigation, waits) pass through unscored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Act {
    #[serde(rename = "type")]
    pub act_type: String,
    /// Tool identifier, e.g. `"axe"`, `"wave"`, `"probe"`.
    #[serde(default)]
    pub which: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what: Option<String>,
    /// Tool-specific payload. The shape is owned by the external tool and
    /// must be treated as untrusted and possibly partial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Act {
    pub fn test(which: impl Into<String>, result: Value) -> Self {
        Self {
            act_type: "test".into(),
            which: which.into(),
            what: None,
            result: Some(result),
        }
    }

    pub fn is_test(&self) -> bool {
        self.act_type == "test"
    }
}

/// Visit metadata used by the log penalty: browser-console volume, error
/// volume, prohibited actions, timeouts, rejections and latency.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    pub log_count: u64,
    pub log_size: u64,
    pub error_log_count: u64,
    pub error_log_size: u64,
    pub prohibited_count: u64,
    pub visit_timeout_count: u64,
    pub visit_rejection_count: u64,
    /// Total visit latency in seconds.
    pub visit_latency: f64,
}

/// Caller-facing result summary. Group entries are sorted by descending
/// score (ties by name) so rendered digests are stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: i64,
    pub log: i64,
    pub preventions: i64,
    pub solos: i64,
    pub groups: Vec<GroupSummaryItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryItem {
    pub group_name: String,
    pub score: i64,
}

/// The full, auditable output of one scoring call: the identity of the
/// procedure that produced it, every weight table it used, and the raw and
/// derived figures behind the total.
///
/// Scoring the same report with the same procedure yields a byte-identical
/// record; every map inside is a `BTreeMap` for exactly that reason.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(rename = "scoreProcID")]
    pub score_proc_id: String,
    pub log_weights: LogWeights,
    pub solo_weight: f64,
    pub group_weights: GroupWeights,
    pub prevention_weights: PreventionWeights,
    pub package_details: PackageDetails,
    pub group_details: GroupDetails,
    pub prevention_scores: BTreeMap<String, f64>,
    pub summary: Summary,
}
