//! Siteimprove alfa: binary-verdict rule engine. Each result item carries
//! a verdict (`failed` or `cantTell`) and the rule it was produced by.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct AlfaAdapter;

fn items(act: &Act) -> Option<&Vec<Value>> {
    act.result.as_ref()?.get("items")?.as_array()
}

impl ToolAdapter for AlfaAdapter {
    fn tool(&self) -> &'static str {
        "alfa"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        items(act).is_none()
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let Some(items) = items(act) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let weight = match item.get("verdict").and_then(Value::as_str) {
                    Some("failed") => 4.0,
                    Some("cantTell") => 1.0,
                    _ => return None,
                };
                let rule = item.get("rule")?.get("ruleID")?.as_str()?;
                Some(Finding::new(rule, weight))
            })
            .collect()
    }
}
