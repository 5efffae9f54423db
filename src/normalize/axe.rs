//! Deque axe-core: severity-graded findings. Violations map through the
//! {minor, moderate, serious, critical} → {1..4} table times the number of
//! affected nodes; incomplete ("needs review") findings count at 25% of
//! their mapped severity.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct AxeAdapter;

fn impact_weight(impact: &str) -> Option<f64> {
    match impact {
        "minor" => Some(1.0),
        "moderate" => Some(2.0),
        "serious" => Some(3.0),
        "critical" => Some(4.0),
        _ => None,
    }
}

fn rule_items<'a>(act: &'a Act, key: &str) -> Option<&'a Vec<Value>> {
    act.result.as_ref()?.get(key)?.as_array()
}

fn findings_from(items: &[Value], discount: f64) -> impl Iterator<Item = Finding> + '_ {
    items.iter().filter_map(move |item| {
        let rule = item.get("id")?.as_str()?;
        let weight = impact_weight(item.get("impact")?.as_str()?)?;
        let nodes = item.get("nodes").and_then(Value::as_u64).unwrap_or(1);
        Some(Finding::new(rule, discount * weight * nodes as f64))
    })
}

impl ToolAdapter for AxeAdapter {
    fn tool(&self) -> &'static str {
        "axe"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        let violations = rule_items(act, "violations");
        let incomplete = rule_items(act, "incomplete");
        if violations.is_none() && incomplete.is_none() {
            return true;
        }
        // A totals block that disagrees with the item lists signals a
        // truncated run.
        if let Some(totals) = act.result.as_ref().and_then(|result| result.get("totals")) {
            for (key, items) in [("violations", violations), ("incomplete", incomplete)] {
                if let Some(expected) = totals.get(key).and_then(Value::as_u64) {
                    if expected as usize != items.map_or(0, Vec::len) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let violations = rule_items(act, "violations").map_or(&[][..], Vec::as_slice);
        let incomplete = rule_items(act, "incomplete").map_or(&[][..], Vec::as_slice);
        findings_from(violations, 1.0)
            .chain(findings_from(incomplete, 0.25))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryData;
    use serde_json::json;

    fn registry() -> IssueRegistry {
        IssueRegistry::from_data(RegistryData::default()).unwrap()
    }

    #[test]
    fn test_impact_times_nodes() {
        let act = Act::test(
            "axe",
            json!({
                "violations": [
                    {"id": "image-alt", "impact": "critical", "nodes": 3},
                    {"id": "color-contrast", "impact": "serious", "nodes": 2}
                ],
                "incomplete": []
            }),
        );
        let findings = AxeAdapter.normalize(&act, &registry());
        assert_eq!(
            findings,
            vec![
                Finding::new("image-alt", 12.0),
                Finding::new("color-contrast", 6.0),
            ]
        );
    }

    #[test]
    fn test_incomplete_counts_at_quarter_severity() {
        let act = Act::test(
            "axe",
            json!({
                "violations": [],
                "incomplete": [{"id": "color-contrast", "impact": "critical", "nodes": 4}]
            }),
        );
        let findings = AxeAdapter.normalize(&act, &registry());
        assert_eq!(findings, vec![Finding::new("color-contrast", 4.0)]);
    }

    #[test]
    fn test_missing_nodes_counts_once() {
        let act = Act::test(
            "axe",
            json!({"violations": [{"id": "label", "impact": "minor"}]}),
        );
        assert_eq!(
            AxeAdapter.normalize(&act, &registry()),
            vec![Finding::new("label", 1.0)]
        );
    }

    #[test]
    fn test_unknown_impact_is_skipped() {
        let act = Act::test(
            "axe",
            json!({"violations": [{"id": "label", "impact": "catastrophic", "nodes": 9}]}),
        );
        assert!(AxeAdapter.normalize(&act, &registry()).is_empty());
    }

    #[test]
    fn test_prevented_without_item_lists() {
        let act = Act::test("axe", json!({"error": "page crashed"}));
        assert!(AxeAdapter.is_prevented(&act));
    }

    #[test]
    fn test_prevented_on_totals_mismatch() {
        let act = Act::test(
            "axe",
            json!({
                "totals": {"violations": 2, "incomplete": 0},
                "violations": [{"id": "label", "impact": "minor", "nodes": 1}],
                "incomplete": []
            }),
        );
        assert!(AxeAdapter.is_prevented(&act));
    }

    #[test]
    fn test_not_prevented_when_totals_agree() {
        let act = Act::test(
            "axe",
            json!({
                "totals": {"violations": 1, "incomplete": 0},
                "violations": [{"id": "label", "impact": "minor", "nodes": 1}],
                "incomplete": []
            }),
        );
        assert!(!AxeAdapter.is_prevented(&act));
    }
}
