//! Per-tool result normalizers.
//!
//! Each supported tool gets one adapter that knows the tool's idiosyncratic
//! result shape and converts it to `(rule, weighted count)` findings on the
//! common 1–4 discounted severity scale. Adapters are pure over the act:
//! a missing or malformed result yields no findings, never an error — the
//! prevention side of that situation is reported separately through
//! [`ToolAdapter::is_prevented`]. Dispatch goes through a registered
//! adapter map, so supporting a new tool is a registration, not a branch.

use crate::core::Act;
use crate::registry::IssueRegistry;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

pub mod alfa;
pub mod axe;
pub mod ibm;
pub mod nuval;
pub mod probe;
pub mod tenon;
pub mod wave;

/// One normalized finding: a rule identifier in the tool's namespace and
/// its weighted instance count.
#[derive(Clone, Debug, PartialEq)]
pub struct Finding {
    pub rule: String,
    pub weight: f64,
}

impl Finding {
    pub fn new(rule: impl Into<String>, weight: f64) -> Self {
        Self {
            rule: rule.into(),
            weight,
        }
    }
}

/// Adapter contract for one tool.
pub trait ToolAdapter: Send + Sync {
    /// The tool identifier this adapter handles (`Act::which`).
    fn tool(&self) -> &'static str;

    /// Explicit per-tool check for "the test could not run". Shape
    /// requirements differ per tool; this replaces ad-hoc shape sniffing
    /// at the aggregation layer.
    fn is_prevented(&self, act: &Act) -> bool;

    /// Extract weighted findings from the act. Empty on absent or
    /// malformed results.
    fn normalize(&self, act: &Act, registry: &IssueRegistry) -> Vec<Finding>;

    /// Whether this tool runs in-house. In-house preventions carry a
    /// lower penalty than third-party ones, which are rarer and more
    /// informative.
    fn is_in_house(&self) -> bool {
        false
    }

    /// Prevention penalty keys for this act. One key counts once per
    /// report. Tools with independently preventable sub-checks (the
    /// in-house probe suite) override this to report per-check keys.
    fn prevention_keys(&self, act: &Act) -> Vec<String> {
        if self.is_prevented(act) {
            vec![self.tool().to_string()]
        } else {
            Vec::new()
        }
    }
}

static ALFA: alfa::AlfaAdapter = alfa::AlfaAdapter;
static AXE: axe::AxeAdapter = axe::AxeAdapter;
static IBM: ibm::IbmAdapter = ibm::IbmAdapter;
static NUVAL: nuval::NuValAdapter = nuval::NuValAdapter;
static PROBE: probe::ProbeAdapter = probe::ProbeAdapter;
static TENON: tenon::TenonAdapter = tenon::TenonAdapter;
static WAVE: wave::WaveAdapter = wave::WaveAdapter;

static ADAPTERS: Lazy<BTreeMap<&'static str, &'static dyn ToolAdapter>> = Lazy::new(|| {
    let adapters: [&'static dyn ToolAdapter; 7] =
        [&ALFA, &AXE, &IBM, &NUVAL, &PROBE, &TENON, &WAVE];
    adapters
        .into_iter()
        .map(|adapter| (adapter.tool(), adapter))
        .collect()
});

/// The adapter registered for a tool identifier, if any.
pub fn adapter_for(tool: &str) -> Option<&'static dyn ToolAdapter> {
    ADAPTERS.get(tool).copied()
}

/// Identifiers of all supported tools, in stable order.
pub fn supported_tools() -> impl Iterator<Item = &'static str> {
    ADAPTERS.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_adapter_registered_under_its_own_id() {
        for tool in supported_tools() {
            assert_eq!(adapter_for(tool).unwrap().tool(), tool);
        }
        assert_eq!(supported_tools().count(), 7);
    }

    #[test]
    fn test_unknown_tool_has_no_adapter() {
        assert!(adapter_for("lighthouse").is_none());
    }
}
