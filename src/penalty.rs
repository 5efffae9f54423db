//! Penalties for what did not happen: tests that could not run, and
//! abnormal browser logging or latency during the visit.

use crate::config::{LogWeights, PreventionWeights, ScoreProc};
use crate::core::{JobData, Report};
use crate::normalize;
use std::collections::BTreeMap;

/// Prevention penalties, keyed by tool (or `probe:<check>` for
/// independently preventable in-house checks). One key counts once per
/// report, however many acts failed under it. An act whose tool has no
/// registered adapter is scored as a third-party prevention: the runner
/// promised a test the engine cannot interpret.
pub fn prevention_scores(report: &Report, proc: &ScoreProc) -> BTreeMap<String, f64> {
    let weights = proc.prevention_weights();
    let mut scores = BTreeMap::new();
    for act in report.test_acts() {
        match normalize::adapter_for(&act.which) {
            Some(adapter) => {
                let weight = penalty_weight(weights, adapter.is_in_house());
                for key in adapter.prevention_keys(act) {
                    scores.insert(key, weight);
                }
            }
            None => {
                scores.insert(act.which.clone(), weights.third_party);
            }
        }
    }
    scores
}

fn penalty_weight(weights: &PreventionWeights, in_house: bool) -> f64 {
    if in_house {
        weights.in_house
    } else {
        weights.third_party
    }
}

/// Sum of prevention penalties, rounded to an integer.
pub fn prevention_total(scores: &BTreeMap<String, f64>) -> i64 {
    scores.values().sum::<f64>().round() as i64
}

/// Linear penalty over browser-log volume and visit anomalies. Latency is
/// penalized only in excess of the procedure's normal baseline, and the
/// whole score floors at zero: a fast, quiet visit earns no bonus.
pub fn log_score(job_data: &JobData, weights: &LogWeights) -> i64 {
    let latency_excess = (job_data.visit_latency - weights.normal_latency).max(0.0);
    let raw = weights.log_count * job_data.log_count as f64
        + weights.log_size * job_data.log_size as f64
        + weights.error_log_count * job_data.error_log_count as f64
        + weights.error_log_size * job_data.error_log_size as f64
        + weights.prohibited_count * job_data.prohibited_count as f64
        + weights.visit_timeout_count * job_data.visit_timeout_count as f64
        + weights.visit_rejection_count * job_data.visit_rejection_count as f64
        + weights.latency * latency_excess;
    (raw.round() as i64).max(0)
}
