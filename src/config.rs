//! Scoring procedures.
//!
//! A [`ScoreProc`] bundles every configurable input to the engine — the
//! issue registry, the four weight tables, the pre-weighted tool set —
//! under one procedure identifier. Changing any of them mints a new
//! identifier; historical procedures are frozen values, never edited in
//! place, so every stored score stays attributable to the exact formula
//! that produced it.

use crate::errors::{Result, ScoreError};
use crate::registry::{IssueRegistry, RegistryData};
use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The current built-in scoring procedure, embedded at compile time.
const DEFAULT_PROC_JSON: &str = include_str!("data/dsp14.json");

static DEFAULT_PROC: Lazy<ScoreProc> = Lazy::new(|| {
    ScoreProc::from_json(DEFAULT_PROC_JSON)
        .expect("embedded scoring procedure dsp14 must be valid")
});

/// Weights for the browser-log and latency penalty. One unit of penalty
/// per weighted count; latency is penalized only in excess of
/// `normal_latency` seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWeights {
    pub log_count: f64,
    pub log_size: f64,
    pub error_log_count: f64,
    pub error_log_size: f64,
    pub prohibited_count: f64,
    pub visit_timeout_count: f64,
    pub visit_rejection_count: f64,
    pub latency: f64,
    pub normal_latency: f64,
}

/// Constants of the duplicate-discounting group formula:
/// `absolute + largest × best + smaller × rest`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupWeights {
    /// Cost of having any defect in the category at all.
    pub absolute: f64,
    /// Multiplier for the worst-offending package subtotal.
    pub largest: f64,
    /// Discount multiplier for corroborating packages.
    pub smaller: f64,
}

/// Penalties for tests that could not run. Third-party failures are rarer
/// and more informative than in-house probe failures, so they cost more.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreventionWeights {
    pub in_house: f64,
    pub third_party: f64,
}

/// Serialized procedure shape, as stored in version control or on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreProcData {
    #[serde(rename = "scoreProcID")]
    pub score_proc_id: String,
    pub log_weights: LogWeights,
    pub solo_weight: f64,
    pub group_weights: GroupWeights,
    pub prevention_weights: PreventionWeights,
    /// Tools whose native severity scale is authoritative; their raw
    /// accumulated counts bypass the group-weight rescaling.
    #[serde(default)]
    pub pre_weighted: Vec<String>,
    pub registry: RegistryData,
}

/// A loaded, validated scoring procedure. Immutable and `Send + Sync`;
/// one instance may serve any number of concurrent scoring calls.
#[derive(Clone, Debug)]
pub struct ScoreProc {
    score_proc_id: String,
    log_weights: LogWeights,
    solo_weight: f64,
    group_weights: GroupWeights,
    prevention_weights: PreventionWeights,
    pre_weighted: BTreeSet<String>,
    registry: IssueRegistry,
}

impl ScoreProc {
    /// The built-in procedure (`dsp14`).
    pub fn default_proc() -> &'static ScoreProc {
        &DEFAULT_PROC
    }

    /// Validate raw procedure data and compile its registry.
    pub fn from_data(data: ScoreProcData) -> Result<Self> {
        validate_weights(&data)?;
        let registry = IssueRegistry::from_data(data.registry)?;
        Ok(Self {
            score_proc_id: data.score_proc_id,
            log_weights: data.log_weights,
            solo_weight: data.solo_weight,
            group_weights: data.group_weights,
            prevention_weights: data.prevention_weights,
            pre_weighted: data.pre_weighted.into_iter().collect(),
            registry,
        })
    }

    /// Parse and validate a procedure from its JSON definition.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ScoreProcData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Load a procedure definition from disk.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading scoring procedure from {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("loading scoring procedure from {}", path.display()))
    }

    pub fn id(&self) -> &str {
        &self.score_proc_id
    }

    pub fn log_weights(&self) -> &LogWeights {
        &self.log_weights
    }

    pub fn solo_weight(&self) -> f64 {
        self.solo_weight
    }

    pub fn group_weights(&self) -> &GroupWeights {
        &self.group_weights
    }

    pub fn prevention_weights(&self) -> &PreventionWeights {
        &self.prevention_weights
    }

    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    /// Whether a tool's own severity scale is used without group-weight
    /// rescaling.
    pub fn is_pre_weighted(&self, tool: &str) -> bool {
        self.pre_weighted.contains(tool)
    }
}

fn validate_weights(data: &ScoreProcData) -> Result<()> {
    if data.score_proc_id.trim().is_empty() {
        return Err(ScoreError::invalid_proc("empty scoreProcID"));
    }
    let named = [
        ("soloWeight", data.solo_weight),
        ("groupWeights.absolute", data.group_weights.absolute),
        ("groupWeights.largest", data.group_weights.largest),
        ("groupWeights.smaller", data.group_weights.smaller),
        ("preventionWeights.inHouse", data.prevention_weights.in_house),
        (
            "preventionWeights.thirdParty",
            data.prevention_weights.third_party,
        ),
        ("logWeights.logCount", data.log_weights.log_count),
        ("logWeights.logSize", data.log_weights.log_size),
        ("logWeights.errorLogCount", data.log_weights.error_log_count),
        ("logWeights.errorLogSize", data.log_weights.error_log_size),
        ("logWeights.prohibitedCount", data.log_weights.prohibited_count),
        (
            "logWeights.visitTimeoutCount",
            data.log_weights.visit_timeout_count,
        ),
        (
            "logWeights.visitRejectionCount",
            data.log_weights.visit_rejection_count,
        ),
        ("logWeights.latency", data.log_weights.latency),
        ("logWeights.normalLatency", data.log_weights.normal_latency),
    ];
    for (name, weight) in named {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ScoreError::invalid_proc(format!(
                "{name} must be a non-negative finite number, got {weight}"
            )));
        }
    }
    Ok(())
}
