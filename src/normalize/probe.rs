//! In-house probe suite: a batch of small single-purpose checks run in the
//! page context. Most checks report an instance count scored through a
//! per-check severity table; the `bulk` check is a simple-count rule whose
//! contribution is a smooth function of the excess over a visible-element
//! threshold rather than a per-instance count. Checks are independently
//! preventable, so prevention keys are reported per check.

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct ProbeAdapter;

/// Pages under this many visible elements get no bulk penalty.
const BULK_THRESHOLD: f64 = 250.0;

fn check_severity(id: &str) -> f64 {
    match id {
        "focInd" => 3.0,
        "embAc" => 2.0,
        "autocomplete" => 1.0,
        _ => 2.0,
    }
}

fn checks(act: &Act) -> Option<&Vec<Value>> {
    act.result.as_ref()?.get("checks")?.as_array()
}

fn is_check_prevented(check: &Value) -> bool {
    check.get("prevented").and_then(Value::as_bool).unwrap_or(false)
}

impl ToolAdapter for ProbeAdapter {
    fn tool(&self) -> &'static str {
        "probe"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        checks(act).is_none()
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let Some(checks) = checks(act) else {
            return Vec::new();
        };
        checks
            .iter()
            .filter_map(|check| {
                if is_check_prevented(check) {
                    return None;
                }
                let id = check.get("id")?.as_str()?;
                let weight = if id == "bulk" {
                    let count = check.get("count")?.as_f64()?;
                    (count / BULK_THRESHOLD - 1.0).max(0.0)
                } else {
                    let instances = check.get("instances")?.as_f64()?;
                    instances * check_severity(id)
                };
                Some(Finding::new(id, weight))
            })
            .collect()
    }

    fn is_in_house(&self) -> bool {
        true
    }

    fn prevention_keys(&self, act: &Act) -> Vec<String> {
        let Some(checks) = checks(act) else {
            return vec![self.tool().to_string()];
        };
        checks
            .iter()
            .filter(|check| is_check_prevented(check))
            .filter_map(|check| check.get("id").and_then(Value::as_str))
            .map(|id| format!("probe:{id}"))
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
    fn test_instance_checks_use_severity_table() {
        let act = Act::test(
            "probe",
            json!({"checks": [
                {"id": "focInd", "instances": 2},
                {"id": "embAc", "instances": 1},
                {"id": "autocomplete", "instances": 3}
            ]}),
        );
        assert_eq!(
            ProbeAdapter.normalize(&act, &registry()),
            vec![
                Finding::new("focInd", 6.0),
                Finding::new("embAc", 2.0),
                Finding::new("autocomplete", 3.0),
            ]
        );
    }

    #[test]
    fn test_bulk_is_smooth_over_threshold() {
        let under = Act::test("probe", json!({"checks": [{"id": "bulk", "count": 200}]}));
        assert_eq!(
            ProbeAdapter.normalize(&under, &registry()),
            vec![Finding::new("bulk", 0.0)]
        );

        let over = Act::test("probe", json!({"checks": [{"id": "bulk", "count": 1000}]}));
        assert_eq!(
            ProbeAdapter.normalize(&over, &registry()),
            vec![Finding::new("bulk", 3.0)]
        );
    }

    #[test]
    fn test_prevented_check_yields_key_not_finding() {
        let act = Act::test(
            "probe",
            json!({"checks": [
                {"id": "focInd", "prevented": true},
                {"id": "embAc", "instances": 2}
            ]}),
        );
        assert!(!ProbeAdapter.is_prevented(&act));
        assert_eq!(ProbeAdapter.prevention_keys(&act), vec!["probe:focInd"]);
        assert_eq!(
            ProbeAdapter.normalize(&act, &registry()),
            vec![Finding::new("embAc", 4.0)]
        );
    }

    #[test]
    fn test_whole_act_prevention() {
        let act = Act::test("probe", json!({"error": "injection blocked"}));
        assert!(ProbeAdapter.is_prevented(&act));
        assert_eq!(ProbeAdapter.prevention_keys(&act), vec!["probe"]);
    }
}
