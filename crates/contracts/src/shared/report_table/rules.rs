use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative report configuration produced by the report-settings UI.
///
/// `rules` and `time_frames` stay as ordered JSON maps: the compiler keeps
/// document order for them and must tolerate keys it has never seen
/// (`serde_json` is built with `preserve_order` for exactly this).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesPayload {
    /// Static field toggles (campaign_name, grade, status, ...)
    #[serde(default)]
    pub rules: Map<String, Value>,
    /// Timeframe toggles for the regular metric grid
    #[serde(default)]
    pub time_frames: Map<String, Value>,
    /// Per-event-family metric toggles
    #[serde(default)]
    pub events: Option<EventsConfig>,
}

impl RulesPayload {
    pub fn parse(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid rules payload")
    }
}

/// Metric toggles per event family. Unknown metric keys inside a family are
/// kept (they surface with the raw key as column label).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub lead_form_submissions: Option<Map<String, Value>>,
    #[serde(default)]
    pub applications: Option<Map<String, Value>>,
    #[serde(default)]
    pub booked_calls: Option<Map<String, Value>>,
    #[serde(default)]
    pub sets: Option<Map<String, Value>>,
    #[serde(default)]
    pub qualified_opportunities: Option<Map<String, Value>>,
    #[serde(default)]
    pub offers: Option<Map<String, Value>>,
    #[serde(default)]
    pub add_to_carts: Option<Map<String, Value>>,
    #[serde(default)]
    pub ad_metrics: Option<AdMetricsConfig>,
    #[serde(default)]
    pub sales: Option<SalesConfig>,
}

/// Platform ad metric toggles, one block per ad source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdMetricsConfig {
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
    #[serde(default)]
    pub google: Option<Map<String, Value>>,
}

/// Sales block: metric toggles plus its own timeframe set and product groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesConfig {
    #[serde(default)]
    pub metrics: Map<String, Value>,
    /// Ordered list of product buckets; a single group named "all" means
    /// "no grouping"
    #[serde(default)]
    pub product_groups: Vec<ProductGroup>,
    /// Timeframe toggles specific to sales; any enabled one moves sales
    /// into its own column grid
    #[serde(default)]
    pub time_frames: Map<String, Value>,
}

impl SalesConfig {
    /// True when at least one sales-specific timeframe toggle is on
    pub fn has_sales_timeframe(&self) -> bool {
        self.time_frames.values().any(is_enabled)
    }

    /// True when sales metrics must be expanded per product group
    pub fn has_named_groups(&self) -> bool {
        self.product_groups
            .first()
            .map(|g| g.name != "all")
            .unwrap_or(false)
    }
}

/// A named product bucket partitioning sales metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductGroup {
    pub name: String,
}

/// Toggle leaves count as enabled for `true` or a non-zero number;
/// everything else is off
pub fn is_enabled(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(false),
        _ => false,
    }
}
