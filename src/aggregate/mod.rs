//! Aggregation: from normalized findings to group and solo scores.
//!
//! All state here is per scoring call. The accumulator folds normalizer
//! output into per-(tool, rule) totals; the group aggregator resolves each
//! total against the registry and applies the duplicate-discounting
//! formula; totals that match no group score as solos.

use crate::config::ScoreProc;
use crate::core::{Act, Report};
use crate::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated raw weighted counts for one report:
/// tool → rule → rounded total. Never shared across reports.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageDetails {
    details: BTreeMap<String, BTreeMap<String, i64>>,
}

impl PackageDetails {
    /// Add a weighted amount for a (tool, rule) pair, rounding to the
    /// nearest integer. A zero amount is ignored; a non-zero amount that
    /// rounds to zero still creates the entry, recording that the tool
    /// fired even though it contributes nothing.
    pub fn add_detail(&mut self, tool: &str, rule: &str, amount: f64) {
        if amount == 0.0 {
            return;
        }
        let entry = self
            .details
            .entry(tool.to_string())
            .or_default()
            .entry(rule.to_string())
            .or_insert(0);
        *entry += amount.round() as i64;
    }

    pub fn get(&self, tool: &str, rule: &str) -> Option<i64> {
        self.details.get(tool)?.get(rule).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, i64)> {
        self.details.iter().flat_map(|(tool, rules)| {
            rules
                .iter()
                .map(move |(rule, count)| (tool.as_str(), rule.as_str(), *count))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

/// One classified group member's contribution, kept for auditability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberScore {
    pub score: i64,
    pub what: String,
}

/// Classified and unclassified detail derived from [`PackageDetails`]:
/// `groups` is groupID → tool → rule → member score, `solos` is
/// tool → rule → accumulated count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDetails {
    pub groups: BTreeMap<String, BTreeMap<String, BTreeMap<String, MemberScore>>>,
    pub solos: BTreeMap<String, BTreeMap<String, i64>>,
}

/// Result of one aggregation pass.
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    pub group_details: GroupDetails,
    /// Scores for groups that actually count: positive weight and at
    /// least one non-zero member.
    pub group_scores: BTreeMap<String, i64>,
    pub solo_total: i64,
}

/// Run every test act through its adapter and fold the findings into a
/// fresh accumulator. Accumulation is commutative, so act order is
/// irrelevant. Acts whose tool has no adapter contribute nothing here;
/// they surface as preventions instead.
pub fn accumulate(report: &Report, proc: &ScoreProc) -> PackageDetails {
    let mut details = PackageDetails::default();
    for act in report.test_acts() {
        accumulate_act(act, proc, &mut details);
    }
    details
}

fn accumulate_act(act: &Act, proc: &ScoreProc, details: &mut PackageDetails) {
    let Some(adapter) = normalize::adapter_for(&act.which) else {
        return;
    };
    // A prevented act is penalized, not scored; partial findings from a
    // truncated run are not trusted.
    if adapter.is_prevented(act) {
        return;
    }
    for finding in adapter.normalize(act, proc.registry()) {
        details.add_detail(&act.which, &finding.rule, finding.weight);
    }
}

/// Classify accumulated totals into group members and solos, then score
/// both.
pub fn aggregate(details: &PackageDetails, proc: &ScoreProc) -> Aggregation {
    let registry = proc.registry();
    let mut group_details = GroupDetails::default();
    let mut solo_raw: i64 = 0;

    for (tool, rule, count) in details.iter() {
        match registry.member_of(tool, rule) {
            Some((group_id, group, spec)) => {
                let score = member_score(
                    count,
                    group.weight,
                    spec.quality,
                    proc.is_pre_weighted(tool),
                );
                group_details
                    .groups
                    .entry(group_id.to_string())
                    .or_default()
                    .entry(tool.to_string())
                    .or_default()
                    .insert(
                        rule.to_string(),
                        MemberScore {
                            score,
                            what: spec.what.clone(),
                        },
                    );
            }
            None => {
                log::warn!("unrecognized rule {tool}/{rule}; scoring as solo");
                group_details
                    .solos
                    .entry(tool.to_string())
                    .or_default()
                    .insert(rule.to_string(), count);
                solo_raw += count;
            }
        }
    }

    let group_scores = score_groups(&group_details, proc);
    let solo_total = (proc.solo_weight() * solo_raw as f64).round() as i64;

    Aggregation {
        group_details,
        group_scores,
        solo_total,
    }
}

/// Score one group member. Pre-weighted tools keep their raw count;
/// others are rescaled by `weight / 4`, 4 being the maximum unscaled
/// severity, so group weight acts as a multiplier relative to worst-case
/// findings. The quality factor discounts noisy rules. Any non-zero raw
/// count floors at 1 so rounding cannot erase a genuine defect.
fn member_score(count: i64, weight: u64, quality: f64, pre_weighted: bool) -> i64 {
    if count == 0 {
        return 0;
    }
    let rescaled = if pre_weighted {
        count as f64
    } else {
        count as f64 * weight as f64 / 4.0
    };
    ((rescaled * quality).round() as i64).max(1)
}

/// The duplicate-discounting formula. The worst-offending package counts
/// fully; corroborating packages count at a discount, since several tools
/// flagging one category usually reflect one underlying defect, not
/// several.
fn score_groups(details: &GroupDetails, proc: &ScoreProc) -> BTreeMap<String, i64> {
    let weights = proc.group_weights();
    let mut scores = BTreeMap::new();
    for (group_id, packages) in &details.groups {
        let ignorable = proc
            .registry()
            .group(group_id)
            .map_or(true, |group| group.weight == 0);
        if ignorable {
            continue;
        }
        let mut subtotals: Vec<i64> = packages
            .values()
            .map(|rules| rules.values().map(|member| member.score).sum())
            .filter(|subtotal| *subtotal > 0)
            .collect();
        if subtotals.is_empty() {
            // Every member count was zero; the group is pruned.
            continue;
        }
        subtotals.sort_unstable_by(|a, b| b.cmp(a));
        let rest: i64 = subtotals[1..].iter().sum();
        let score = weights.absolute
            + weights.largest * subtotals[0] as f64
            + weights.smaller * rest as f64;
        scores.insert(group_id.clone(), score.round() as i64);
    }
    scores
}
