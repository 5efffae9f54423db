//! Score assembly: the engine entry point.
//!
//! One scoring call is a pure synchronous function of (report, procedure).
//! Every piece of aggregation state lives in the call, so any number of
//! reports can be scored concurrently against one shared procedure; the
//! batch helper leans on exactly that.

use crate::aggregate;
use crate::config::ScoreProc;
use crate::core::{GroupSummaryItem, Report, ScoreRecord, Summary};
use crate::errors::{Result, ScoreError};
use crate::penalty;
use rayon::prelude::*;

/// Score one report against a procedure and return the full record.
///
/// Deterministic: an identical report and procedure always produce a
/// byte-identical record. Fails only on a malformed report (missing job
/// metadata); absent tool results and unrecognized rules are handled
/// inside the engine.
pub fn score_report(report: &Report, proc: &ScoreProc) -> Result<ScoreRecord> {
    let job_data = report
        .job_data
        .as_ref()
        .ok_or_else(|| ScoreError::malformed(&report.id, "missing jobData"))?;

    let package_details = aggregate::accumulate(report, proc);
    let aggregation = aggregate::aggregate(&package_details, proc);
    let prevention_scores = penalty::prevention_scores(report, proc);

    let groups_total: i64 = aggregation.group_scores.values().sum();
    let preventions = penalty::prevention_total(&prevention_scores);
    let log = penalty::log_score(job_data, proc.log_weights());
    let total = groups_total + aggregation.solo_total + preventions + log;

    log::debug!(
        "scored report {}: total {total} (groups {groups_total}, solos {}, preventions {preventions}, log {log})",
        report.id,
        aggregation.solo_total,
    );

    let mut groups: Vec<GroupSummaryItem> = aggregation
        .group_scores
        .into_iter()
        .map(|(group_name, score)| GroupSummaryItem { group_name, score })
        .collect();
    groups.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.group_name.cmp(&b.group_name))
    });

    Ok(ScoreRecord {
        score_proc_id: proc.id().to_string(),
        log_weights: proc.log_weights().clone(),
        solo_weight: proc.solo_weight(),
        group_weights: proc.group_weights().clone(),
        prevention_weights: proc.prevention_weights().clone(),
        package_details,
        group_details: aggregation.group_details,
        prevention_scores,
        summary: Summary {
            total,
            log,
            preventions,
            solos: aggregation.solo_total,
            groups,
        },
    })
}

/// Score a report and append the record to it. Nothing else on the
/// report is touched.
pub fn attach_score(report: &mut Report, proc: &ScoreProc) -> Result<()> {
    let record = score_report(report, proc)?;
    report.score = Some(record);
    Ok(())
}

/// Score a batch of independent reports in parallel. Each report gets its
/// own result; one malformed report does not block the rest.
pub fn score_reports(reports: &mut [Report], proc: &ScoreProc) -> Vec<Result<()>> {
    reports
        .par_iter_mut()
        .map(|report| attach_score(report, proc))
        .collect()
}
