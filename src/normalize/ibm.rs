//! IBM Equal Access: runs twice, once over the page content and once over
//! the URL. The content scan is preferred unless it errored or the URL
//! scan reports strictly more violations (a tie keeps the content scan).

use super::{Finding, ToolAdapter};
use crate::core::Act;
use crate::registry::IssueRegistry;
use serde_json::Value;

pub struct IbmAdapter;

fn well_formed_scan<'a>(act: &'a Act, mode: &str) -> Option<&'a Value> {
    let scan = act.result.as_ref()?.get(mode)?;
    if scan.get("error").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    scan.get("items")?.as_array()?;
    Some(scan)
}

fn violation_count(scan: &Value) -> u64 {
    if let Some(total) = scan
        .get("totals")
        .and_then(|totals| totals.get("violation"))
        .and_then(Value::as_u64)
    {
        return total;
    }
    scan.get("items")
        .and_then(Value::as_array)
        .map_or(0, |items| {
            items
                .iter()
                .filter(|item| item.get("level").and_then(Value::as_str) == Some("violation"))
                .count() as u64
        })
}

/// The scan to score, per the content-over-url preference.
fn preferred_scan(act: &Act) -> Option<&Value> {
    match (well_formed_scan(act, "content"), well_formed_scan(act, "url")) {
        (Some(content), Some(url)) => {
            if violation_count(url) > violation_count(content) {
                Some(url)
            } else {
                Some(content)
            }
        }
        (content, url) => content.or(url),
    }
}

impl ToolAdapter for IbmAdapter {
    fn tool(&self) -> &'static str {
        "ibm"
    }

    fn is_prevented(&self, act: &Act) -> bool {
        preferred_scan(act).is_none()
    }

    fn normalize(&self, act: &Act, _registry: &IssueRegistry) -> Vec<Finding> {
        let Some(items) = preferred_scan(act)
            .and_then(|scan| scan.get("items"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let weight = match item.get("level").and_then(Value::as_str) {
                    Some("violation") => 4.0,
                    Some("recommendation") => 1.0,
                    _ => return None,
                };
                let rule = item.get("ruleId")?.as_str()?;
                Some(Finding::new(rule, weight))
            })
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

    fn dual(content: Value, url: Value) -> Act {
        Act::test("ibm", json!({"content": content, "url": url}))
    }

    #[test]
    fn test_content_scan_preferred_on_tie() {
        let act = dual(
            json!({
                "totals": {"violation": 1, "recommendation": 0},
                "items": [{"ruleId": "img_alt_valid", "level": "violation"}]
            }),
            json!({
                "totals": {"violation": 1, "recommendation": 0},
                "items": [{"ruleId": "a_text_purpose", "level": "violation"}]
            }),
        );
        assert_eq!(
            IbmAdapter.normalize(&act, &registry()),
            vec![Finding::new("img_alt_valid", 4.0)]
        );
    }

    #[test]
    fn test_url_scan_wins_with_strictly_more_violations() {
        let act = dual(
            json!({
                "totals": {"violation": 0, "recommendation": 1},
                "items": [{"ruleId": "input_label_exists", "level": "recommendation"}]
            }),
            json!({
                "totals": {"violation": 2, "recommendation": 0},
                "items": [
                    {"ruleId": "html_lang_exists", "level": "violation"},
                    {"ruleId": "page_title_exists", "level": "violation"}
                ]
            }),
        );
        assert_eq!(
            IbmAdapter.normalize(&act, &registry()),
            vec![
                Finding::new("html_lang_exists", 4.0),
                Finding::new("page_title_exists", 4.0),
            ]
        );
    }

    #[test]
    fn test_errored_content_falls_back_to_url() {
        let act = dual(
            json!({"error": true}),
            json!({"items": [{"ruleId": "frame_title_exists", "level": "violation"}]}),
        );
        assert!(!IbmAdapter.is_prevented(&act));
        assert_eq!(
            IbmAdapter.normalize(&act, &registry()),
            vec![Finding::new("frame_title_exists", 4.0)]
        );
    }

    #[test]
    fn test_prevented_when_both_scans_unusable() {
        let act = dual(json!({"error": true}), json!({"totals": {}}));
        assert!(IbmAdapter.is_prevented(&act));
        assert!(IbmAdapter.normalize(&act, &registry()).is_empty());
    }

    #[test]
    fn test_violation_count_falls_back_to_item_levels() {
        let scan = json!({"items": [
            {"ruleId": "a", "level": "violation"},
            {"ruleId": "b", "level": "recommendation"}
        ]});
        assert_eq!(violation_count(&scan), 1);
    }
}
