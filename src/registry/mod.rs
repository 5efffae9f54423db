//! Issue classification registry.
//!
//! The registry is versioned configuration, not logic: a nested map from
//! issue group → tool → rule identifier, plus ordered pattern lists for
//! tools whose rule identifiers are free-text messages. At load time it is
//! validated (a rule may belong to at most one group) and a reverse index
//! tool → rule → group is derived; both are read-only afterwards, so one
//! registry can be shared across concurrent scoring calls.

use crate::errors::{Result, ScoreError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_quality() -> f64 {
    1.0
}

/// One tool rule inside an issue group: a reliability multiplier and a
/// human-readable description of what the rule detects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestSpec {
    /// Discount for rules known to be noisier or more speculative than
    /// average. 1 means fully trusted.
    #[serde(default = "default_quality")]
    pub quality: f64,
    pub what: String,
}

/// A normalized category of defect that several tools may independently
/// detect. Weight 0 marks the group intentionally ignorable: its members
/// still show up in score details but contribute nothing to the total.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueGroup {
    pub weight: u64,
    #[serde(default)]
    pub summary: String,
    /// tool identifier → rule identifier → spec.
    pub packages: BTreeMap<String, BTreeMap<String, TestSpec>>,
}

/// Serialized registry shape: the group map plus, per free-text tool, an
/// ordered list of regular-expression sources.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryData {
    pub groups: BTreeMap<String, IssueGroup>,
    #[serde(default)]
    pub patterns: BTreeMap<String, Vec<String>>,
}

/// Ordered classification fallback for one free-text tool. First match
/// wins, and the matched pattern's source string is the canonical rule
/// identifier, so distinct raw messages matching the same pattern collapse
/// into a single accumulator bucket.
#[derive(Clone, Debug)]
pub struct PatternList {
    entries: Vec<(String, Regex)>,
}

impl PatternList {
    fn compile(tool: &str, sources: &[String]) -> Result<Self> {
        let mut entries = Vec::with_capacity(sources.len());
        for source in sources {
            let regex = Regex::new(source).map_err(|err| ScoreError::InvalidPattern {
                tool: tool.to_string(),
                pattern: source.clone(),
                source: err,
            })?;
            entries.push((source.clone(), regex));
        }
        Ok(Self { entries })
    }

    /// The canonical rule identifier for a raw message, if any pattern
    /// matches.
    pub fn canonical_for(&self, message: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, regex)| regex.is_match(message))
            .map(|(source, _)| source.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loaded, validated registry with its derived reverse index.
#[derive(Clone, Debug)]
pub struct IssueRegistry {
    groups: BTreeMap<String, IssueGroup>,
    /// tool → rule → group identifier, derived once at load.
    reverse: BTreeMap<String, BTreeMap<String, String>>,
    patterns: BTreeMap<String, PatternList>,
}

impl IssueRegistry {
    /// Validate raw registry data, compile its patterns and derive the
    /// reverse index. A (tool, rule) pair claimed by two groups is fatal
    /// here, never at scoring time.
    pub fn from_data(data: RegistryData) -> Result<Self> {
        let mut reverse: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (group_id, group) in &data.groups {
            for (tool, rules) in &group.packages {
                let tool_index = reverse.entry(tool.clone()).or_default();
                for rule in rules.keys() {
                    if let Some(first) = tool_index.get(rule) {
                        return Err(ScoreError::DuplicateRule {
                            tool: tool.clone(),
                            rule: rule.clone(),
                            first: first.clone(),
                            second: group_id.clone(),
                        });
                    }
                    tool_index.insert(rule.clone(), group_id.clone());
                }
            }
        }

        let mut patterns = BTreeMap::new();
        for (tool, sources) in &data.patterns {
            patterns.insert(tool.clone(), PatternList::compile(tool, sources)?);
        }

        Ok(Self {
            groups: data.groups,
            reverse,
            patterns,
        })
    }

    pub fn group(&self, group_id: &str) -> Option<&IssueGroup> {
        self.groups.get(group_id)
    }

    /// The group a (tool, rule) pair belongs to, via the reverse index.
    pub fn group_id_of(&self, tool: &str, rule: &str) -> Option<&str> {
        self.reverse
            .get(tool)
            .and_then(|rules| rules.get(rule))
            .map(String::as_str)
    }

    /// Group id, group and member spec for a classified (tool, rule) pair.
    pub fn member_of(&self, tool: &str, rule: &str) -> Option<(&str, &IssueGroup, &TestSpec)> {
        let group_id = self.group_id_of(tool, rule)?;
        let group = self.groups.get(group_id)?;
        let spec = group.packages.get(tool)?.get(rule)?;
        Some((group_id, group, spec))
    }

    pub fn patterns_for(&self, tool: &str) -> Option<&PatternList> {
        self.patterns.get(tool)
    }

    /// Canonicalize a free-text message for `tool`. Returns the matched
    /// pattern source, or `None` when no pattern matches (the caller keeps
    /// the literal message and the finding will score solo).
    pub fn canonical_rule(&self, tool: &str, message: &str) -> Option<&str> {
        self.patterns_for(tool)?.canonical_for(message)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_from_json(value: serde_json::Value) -> RegistryData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reverse_index_resolves_members() {
        let registry = IssueRegistry::from_data(data_from_json(json!({
            "groups": {
                "imageNoText": {
                    "weight": 4,
                    "packages": {
                        "axe": {"image-alt": {"what": "image has no text alternative"}},
                        "alfa": {"r2": {"quality": 0.8, "what": "img lacks accessible name"}}
                    }
                }
            }
        })))
        .unwrap();

        let (group_id, group, spec) = registry.member_of("alfa", "r2").unwrap();
        assert_eq!(group_id, "imageNoText");
        assert_eq!(group.weight, 4);
        assert_eq!(spec.quality, 0.8);
        assert!(registry.member_of("axe", "link-name").is_none());
    }

    #[test]
    fn test_quality_defaults_to_one() {
        let registry = IssueRegistry::from_data(data_from_json(json!({
            "groups": {
                "g": {
                    "weight": 1,
                    "packages": {"axe": {"r": {"what": "x"}}}
                }
            }
        })))
        .unwrap();
        let (_, _, spec) = registry.member_of("axe", "r").unwrap();
        assert_eq!(spec.quality, 1.0);
    }

    #[test]
    fn test_duplicate_rule_rejected_at_load() {
        let err = IssueRegistry::from_data(data_from_json(json!({
            "groups": {
                "first": {"weight": 1, "packages": {"axe": {"dup": {"what": "a"}}}},
                "second": {"weight": 2, "packages": {"axe": {"dup": {"what": "b"}}}}
            }
        })))
        .unwrap_err();
        match err {
            ScoreError::DuplicateRule { tool, rule, .. } => {
                assert_eq!(tool, "axe");
                assert_eq!(rule, "dup");
            }
            other => panic!("expected DuplicateRule, got {other:?}"),
        }
    }

    #[test]
    fn test_pattern_first_match_wins() {
        let registry = IssueRegistry::from_data(data_from_json(json!({
            "groups": {},
            "patterns": {
                "nuVal": [
                    "^Duplicate ID .+$",
                    "^Duplicate ID problem\\..*$"
                ]
            }
        })))
        .unwrap();
        // Both patterns match; the earlier one is canonical.
        assert_eq!(
            registry.canonical_rule("nuVal", "Duplicate ID problem. Fix it."),
            Some("^Duplicate ID .+$")
        );
        assert_eq!(registry.canonical_rule("nuVal", "Element misplaced"), None);
    }

    #[test]
    fn test_bad_pattern_rejected_at_load() {
        let err = IssueRegistry::from_data(data_from_json(json!({
            "groups": {},
            "patterns": {"nuVal": ["unclosed ["]}
        })))
        .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidPattern { .. }));
    }
}
