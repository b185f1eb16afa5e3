use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rules::{is_enabled, RulesPayload, SalesConfig};

/// One timeframe column group: key into node data plus display label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeColumn {
    /// Key into `node.timeframes` / `node.sales_timeframes`
    pub key: String,
    /// Header label ("Yesterday", "Last 7 Days", ...)
    pub label: String,
}

/// Compiled, ordered column specification for the funnel report table.
/// Recomputed from scratch on every payload change, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSchema {
    /// Static columns; always led by Campaign / Previous Grade / Grade
    /// when those toggles are on
    pub static_fields: Vec<String>,
    /// Timeframe groups of the regular metric grid
    pub timeframes: Vec<TimeframeColumn>,
    /// Metric labels repeated under every regular timeframe
    pub event_metrics: Vec<String>,
    /// Timeframe groups of the dedicated sales grid; empty unless a sales
    /// timeframe toggle is enabled
    pub sales_timeframes: Vec<TimeframeColumn>,
    /// Metric labels repeated under every sales timeframe
    pub sales_metrics: Vec<String>,
}

impl ReportSchema {
    pub fn has_sales_grid(&self) -> bool {
        !self.sales_timeframes.is_empty()
    }

    /// Header rows spanned by non-grouped columns: 2 when the dedicated
    /// sales grid is present, else 1
    pub fn header_row_span(&self) -> u32 {
        if self.has_sales_grid() {
            2
        } else {
            1
        }
    }
}

/// Static fields pinned to the front of the table, in this order
const PRIORITY_FIELDS: &[&str] = &["campaign_name", "previous_grade", "grade"];

const STATIC_FIELD_LABELS: &[(&str, &str)] = &[
    ("campaign_name", "Campaign"),
    ("previous_grade", "Previous Grade"),
    ("grade", "Grade"),
    ("ad_source", "Ad Source"),
    ("status", "Status"),
    ("budget", "Budget"),
    ("daily_budget", "Daily Budget"),
];

const TIMEFRAME_LABELS: &[(&str, &str)] = &[
    ("yesterday", "Yesterday"),
    ("two_days_ago", "2 Days Ago"),
    ("last_4_days", "Last 4 Days"),
    ("last_7_days", "Last 7 Days"),
    ("last_14_days", "Last 14 Days"),
    ("last_30_days", "Last 30 Days"),
    ("total", "Total"),
];

// Per-family metric tables. Column order inside a family is fixed here,
// regardless of key order in the payload.
const LEAD_FORM_FIELDS: &[(&str, &str)] = &[
    ("total", "Leads"),
    ("qualified", "Qualified Leads"),
    ("cost_per_lead", "Cost Per Lead"),
];

const APPLICATION_FIELDS: &[(&str, &str)] = &[
    ("total", "Apps"),
    ("qualified", "Qualified Apps"),
    ("cost_per_application", "Cost Per App"),
];

// The sales-rep and setter columns kept their historical camelCase labels
// when the report was rebuilt; both read booked_calls.total downstream.
const BOOKED_CALL_FIELDS: &[(&str, &str)] = &[
    ("total", "Booked Calls"),
    ("total_with_sales_rep", "totalCallsWithSalesRep"),
    ("total_with_setter", "totalCallsWithSetter"),
    ("qualified", "Qualified Calls"),
    ("show_rate", "Show Rate"),
    ("cost_per_call", "Cost Per Call"),
];

const SET_FIELDS: &[(&str, &str)] = &[("total", "Sets"), ("qualified", "Qualified Sets")];

const QUALIFIED_OPPORTUNITY_FIELDS: &[(&str, &str)] = &[
    ("total", "Qualified Opportunities"),
    ("cost_per_opportunity", "Cost Per Opportunity"),
];

const OFFER_FIELDS: &[(&str, &str)] = &[("total", "Offers"), ("accepted", "Offers Accepted")];

const ADD_TO_CART_FIELDS: &[(&str, &str)] = &[
    ("total", "Add To Carts"),
    ("cost_per_add_to_cart", "Cost Per ATC"),
];

const META_AD_FIELDS: &[(&str, &str)] = &[
    ("spend", "Spend"),
    ("impressions", "Impressions"),
    ("clicks", "Clicks"),
    ("cpm", "CPM"),
    ("cpc", "CPC"),
    ("ctr", "CTR"),
    ("frequency", "Frequency"),
    ("click_quality", "Click Quality"),
    ("total_custom_events", "totalCustomEvents"),
    ("thumb_scroll_stop_rate", "thumbScrollStopRate"),
];

const GOOGLE_AD_FIELDS: &[(&str, &str)] = &[
    ("spend", "Google Spend"),
    ("impressions", "Google Impressions"),
    ("clicks", "Google Clicks"),
    ("conversions", "Conversions"),
    ("cost_per_conversion", "Cost Per Conversion"),
];

const SALES_METRIC_FIELDS: &[(&str, &str)] = &[
    ("count_of_sales", "Sales"),
    ("revenue", "Rev"),
    ("cash_collected", "Cash"),
    ("roas", "ROAS"),
    ("roas_cash", "Cash ROAS"),
    ("cost_per_sale", "Cost Per Sale"),
];

/// Reverse lookup: static column label back to its rule key, for reading
/// values out of `static_metrics`
pub fn static_rule_key(label: &str) -> Option<&'static str> {
    STATIC_FIELD_LABELS
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(k, _)| *k)
}

/// Compile a rules payload into an ordered table schema.
/// Pure and deterministic: the same payload always yields the same schema.
/// Sales metrics without a sales timeframe fold into `event_metrics` after
/// every other event family, so the sales columns always sit at the right
/// edge of the regular grid.
pub fn compile(payload: &RulesPayload) -> ReportSchema {
    let mut schema = ReportSchema {
        static_fields: compile_static_fields(&payload.rules),
        timeframes: compile_timeframes(&payload.time_frames),
        ..Default::default()
    };

    let Some(events) = &payload.events else {
        return schema;
    };

    let families: [(&Option<Map<String, Value>>, &[(&str, &str)]); 7] = [
        (&events.lead_form_submissions, LEAD_FORM_FIELDS),
        (&events.applications, APPLICATION_FIELDS),
        (&events.booked_calls, BOOKED_CALL_FIELDS),
        (&events.sets, SET_FIELDS),
        (&events.qualified_opportunities, QUALIFIED_OPPORTUNITY_FIELDS),
        (&events.offers, OFFER_FIELDS),
        (&events.add_to_carts, ADD_TO_CART_FIELDS),
    ];
    for (config, table) in families {
        schema
            .event_metrics
            .extend(compile_family(config.as_ref(), table));
    }
    if let Some(ad_metrics) = &events.ad_metrics {
        schema
            .event_metrics
            .extend(compile_family(ad_metrics.meta.as_ref(), META_AD_FIELDS));
        schema
            .event_metrics
            .extend(compile_family(ad_metrics.google.as_ref(), GOOGLE_AD_FIELDS));
    }

    if let Some(sales) = &events.sales {
        let metrics = compile_sales_metrics(sales);
        if sales.has_sales_timeframe() {
            // Sales get their own column grid, independent of the regular one
            schema.sales_timeframes = compile_timeframes(&sales.time_frames);
            schema.sales_metrics = metrics;
        } else {
            // No sales timeframe: sales columns ride along the regular grid
            schema.event_metrics.extend(metrics);
        }
    }

    schema
}

fn compile_static_fields(rules: &Map<String, Value>) -> Vec<String> {
    let mut fields = Vec::new();
    for key in PRIORITY_FIELDS {
        if rules.get(*key).map(is_enabled).unwrap_or(false) {
            fields.push(label_for(STATIC_FIELD_LABELS, key));
        }
    }
    for (key, value) in rules {
        if !is_enabled(value) || PRIORITY_FIELDS.contains(&key.as_str()) {
            continue;
        }
        fields.push(label_for(STATIC_FIELD_LABELS, key));
    }
    fields
}

fn compile_timeframes(time_frames: &Map<String, Value>) -> Vec<TimeframeColumn> {
    time_frames
        .iter()
        .filter(|(_, value)| is_enabled(value))
        .map(|(key, _)| TimeframeColumn {
            key: key.clone(),
            label: label_for(TIMEFRAME_LABELS, key),
        })
        .collect()
}

/// Enabled metrics of one family: table order first, then unknown enabled
/// keys in payload order (unrecognized keys surface with the raw key as label)
fn compile_family(config: Option<&Map<String, Value>>, table: &[(&str, &str)]) -> Vec<String> {
    let Some(config) = config else {
        return Vec::new();
    };
    let mut labels = Vec::new();
    for (key, label) in table {
        if config.get(*key).map(is_enabled).unwrap_or(false) {
            labels.push((*label).to_string());
        }
    }
    for (key, value) in config {
        if is_enabled(value) && !table.iter().any(|(k, _)| k == key) {
            labels.push(key.clone());
        }
    }
    labels
}

fn compile_sales_metrics(sales: &SalesConfig) -> Vec<String> {
    let base = compile_family(Some(&sales.metrics), SALES_METRIC_FIELDS);
    if !sales.has_named_groups() {
        return base;
    }
    // Group-major expansion: all metrics of one group before the next group
    let mut labels = Vec::new();
    for group in &sales.product_groups {
        for label in &base {
            labels.push(format!("{}-{}", group.name, label));
        }
    }
    labels
}

fn label_for(table: &[(&str, &str)], key: &str) -> String {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> RulesPayload {
        RulesPayload::parse(json).unwrap()
    }

    #[test]
    fn test_compile_is_deterministic() {
        let p = payload(
            r#"{"rules":{"grade":true,"status":true,"campaign_name":true},
                "time_frames":{"yesterday":true,"last_7_days":true},
                "events":{"applications":{"total":true},"sales":{"metrics":{"revenue":true}}}}"#,
        );
        assert_eq!(compile(&p), compile(&p));
    }

    #[test]
    fn test_priority_fields_lead_regardless_of_payload_order() {
        let p = payload(
            r#"{"rules":{"status":true,"grade":true,"campaign_name":true,"previous_grade":true}}"#,
        );
        let schema = compile(&p);
        assert_eq!(
            schema.static_fields,
            vec!["Campaign", "Previous Grade", "Grade", "Status"]
        );
    }

    #[test]
    fn test_minimal_scenario() {
        let p = payload(
            r#"{"rules":{"campaign_name":true},
                "time_frames":{"yesterday":true},
                "events":{"applications":{"total":true}}}"#,
        );
        let schema = compile(&p);
        assert_eq!(schema.static_fields, vec!["Campaign"]);
        assert_eq!(schema.timeframes.len(), 1);
        assert_eq!(schema.timeframes[0].key, "yesterday");
        assert_eq!(schema.timeframes[0].label, "Yesterday");
        assert_eq!(schema.event_metrics, vec!["Apps"]);
        assert!(schema.sales_timeframes.is_empty());
        assert!(schema.sales_metrics.is_empty());
        assert_eq!(schema.header_row_span(), 1);
    }

    #[test]
    fn test_unknown_keys_fall_back_to_raw_label() {
        let p = payload(
            r#"{"rules":{"campaign_name":true,"pixel_health":true},
                "time_frames":{"last_90_days":true},
                "events":{"applications":{"total":true,"abandoned":true}}}"#,
        );
        let schema = compile(&p);
        assert_eq!(schema.static_fields, vec!["Campaign", "pixel_health"]);
        assert_eq!(schema.timeframes[0].label, "last_90_days");
        assert_eq!(schema.event_metrics, vec!["Apps", "abandoned"]);
    }

    #[test]
    fn test_no_events_yields_static_only_schema() {
        let p = payload(r#"{"rules":{"campaign_name":true}}"#);
        let schema = compile(&p);
        assert_eq!(schema.static_fields, vec!["Campaign"]);
        assert!(schema.event_metrics.is_empty());
    }

    #[test]
    fn test_sales_fold_into_event_metrics_without_sales_timeframe() {
        let p = payload(
            r#"{"time_frames":{"yesterday":true},
                "events":{"applications":{"total":true},
                          "ad_metrics":{"google":{"spend":true}},
                          "sales":{"metrics":{"revenue":true,"roas":true},
                                   "product_groups":[{"name":"all"}],
                                   "time_frames":{"total":false}}}}"#,
        );
        let schema = compile(&p);
        // Folded-in sales labels land after every other event family
        assert_eq!(
            schema.event_metrics,
            vec!["Apps", "Google Spend", "Rev", "ROAS"]
        );
        assert!(schema.sales_metrics.is_empty());
        assert!(!schema.has_sales_grid());
    }

    #[test]
    fn test_sales_grid_with_product_groups() {
        let p = payload(
            r#"{"events":{"sales":{"metrics":{"revenue":true,"cash_collected":true},
                                   "product_groups":[{"name":"Core"},{"name":"Upsell"}],
                                   "time_frames":{"last_7_days":true,"total":true}}}}"#,
        );
        let schema = compile(&p);
        assert!(schema.event_metrics.is_empty());
        assert_eq!(schema.sales_timeframes.len(), 2);
        assert_eq!(
            schema.sales_metrics,
            vec!["Core-Rev", "Core-Cash", "Upsell-Rev", "Upsell-Cash"]
        );
        assert_eq!(schema.header_row_span(), 2);
    }

    #[test]
    fn test_event_metric_order_is_family_then_field() {
        let p = payload(
            r#"{"events":{"booked_calls":{"total_with_setter":true,"total":true},
                          "lead_form_submissions":{"total":true},
                          "ad_metrics":{"meta":{"spend":true}}}}"#,
        );
        let schema = compile(&p);
        // Families in declaration order, fields in table order inside a family
        assert_eq!(
            schema.event_metrics,
            vec!["Leads", "Booked Calls", "totalCallsWithSetter", "Spend"]
        );
    }

    #[test]
    fn test_static_rule_key_reverse_lookup() {
        assert_eq!(static_rule_key("Status"), Some("status"));
        assert_eq!(static_rule_key("nope"), None);
    }
}
