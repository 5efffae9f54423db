//! Nu Html Checker: rules are free-text messages, not discrete
//! identifiers. Each weighted message is tested in order against the
//! registry's pattern list; the first matching pattern's source becomes
//! the canonical rule identifier, so distinct raw messages that match one
//! pattern collapse into a single accumulator bucket. Unmatched messages
//! keep their literal text and will score as solos.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct NuValAdapter;

fn messages(act: &Act) -> Option<&Vec<Value>> {
    act.result.as_ref()?.get("messages")?.as_array()
}

fn message_weight(message: &Value) -> f64 {
    match message.get("type").and_then(Value::as_str) {
        Some("error") => 4.0,
        Some("info") => {
            if message.get("subType").and_then(Value::as_str) == Some("warning") {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

impl ToolAdapter for NuValAdapter {
    fn tool(&self) -> &'static str {
        "nuVal"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        messages(act).is_none()
    }

    fn normalize(&self, act: &Act, registry: &IssueRegistry) -> Vec<Finding> {
        let Some(messages) = messages(act) else {
            return Vec::new();
        };
        messages
            .iter()
            .filter_map(|message| {
                let weight = message_weight(message);
                if weight == 0.0 {
                    return None;
                }
                let text = message.get("message")?.as_str()?;
                let rule = registry
                    .canonical_rule(self.tool(), text)
                    .unwrap_or(text)
                    .to_string();
                Some(Finding { rule, weight })
            })
            .collect()
    }
}
