//! Tenon: proportional-certainty scoring. A finding's contribution is
//! `certainty × priority / 2500`, which reaches the maximum severity of 4
//! at full certainty and priority (both 100) and scales down smoothly.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct TenonAdapter;

fn result_set(act: &Act) -> Option<&Vec<Value>> {
    act.result.as_ref()?.get("data")?.get("resultSet")?.as_array()
}

impl ToolAdapter for TenonAdapter {
    fn tool(&self) -> &'static str {
        "tenon"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        result_set(act).is_none()
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let Some(result_set) = result_set(act) else {
            return Vec::new();
        };
        result_set
            .iter()
            .filter_map(|item| {
                let rule = item.get("tID")?.as_u64()?;
                let certainty = item.get("certainty")?.as_f64()?;
                let priority = item.get("priority")?.as_f64()?;
                Some(Finding::new(
                    rule.to_string(),
                    certainty * priority / 2500.0,
                ))
            })
            .collect()
    }
}
