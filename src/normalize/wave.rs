//! WebAIM WAVE: findings arrive pre-bucketed into named severity
//! categories, each with its own multiplier. Rule keys are namespaced with
//! a single-letter category prefix so an `error` rule and an `alert` rule
//! with the same key stay distinct accumulator buckets.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct WaveAdapter;

const CATEGORIES: [(&str, &str, f64); 3] =
    [("error", "e", 4.0), ("contrast", "c", 3.0), ("alert", "a", 1.0)];

fn categories(act: &Act) -> Option<&Value> {
    act.result.as_ref()?.get("categories")
}

impl ToolAdapter for WaveAdapter {
    fn tool(&self) -> &'static str {
        "wave"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        categories(act).and_then(Value::as_object).is_none()
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let Some(categories) = categories(act) else {
            return Vec::new();
        };
        let mut findings = Vec::new();
        for (category, prefix, multiplier) in CATEGORIES {
            let Some(items) = categories
                .get(category)
                .and_then(|c| c.get("items"))
                .and_then(Value::as_object)
            else {
                continue;
            };
            for (key, item) in items {
                let count = item.get("count").and_then(Value::as_u64).unwrap_or(1);
                findings.push(Finding::new(
                    format!("{prefix}:{key}"),
                    multiplier * count as f64,
                ));
            }
        }
        findings
    }
}
