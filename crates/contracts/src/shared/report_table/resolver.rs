use super::format::format_money;
use super::nodes::{CampaignNode, ReportNode, SalesBucket, SalesValue, TimeframeMetrics};
use super::schema::static_rule_key;

/// Sentinel rendered for any cell whose value cannot be resolved
pub const MISSING: &str = "-";

/// How a fractional value is rendered. Counts have no style: they always
/// render as plain integers without separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountStyle {
    /// Two decimals with thousands separator
    Money,
    /// Two decimals, no separator
    Rate2,
    /// One decimal, no separator
    Rate1,
}

/// A value read out of a node's metric records, carrying its rendering
#[derive(Debug, Clone, Copy, PartialEq)]
enum ResolvedValue {
    Count(i64),
    Amount(f64, AmountStyle),
}

fn count(value: Option<i64>) -> Option<ResolvedValue> {
    value.map(ResolvedValue::Count)
}

fn money(value: Option<f64>) -> Option<ResolvedValue> {
    value.map(|v| ResolvedValue::Amount(v, AmountStyle::Money))
}

fn rate2(value: Option<f64>) -> Option<ResolvedValue> {
    value.map(|v| ResolvedValue::Amount(v, AmountStyle::Rate2))
}

fn rate1(value: Option<f64>) -> Option<ResolvedValue> {
    value.map(|v| ResolvedValue::Amount(v, AmountStyle::Rate1))
}

fn render(value: ResolvedValue) -> String {
    match value {
        ResolvedValue::Count(n) => n.to_string(),
        ResolvedValue::Amount(v, AmountStyle::Money) => format_money(v),
        ResolvedValue::Amount(v, AmountStyle::Rate2) => format!("{v:.2}"),
        ResolvedValue::Amount(v, AmountStyle::Rate1) => format!("{v:.1}"),
    }
}

/// Static table mapping non-sales metric labels to field paths.
/// Every label the compiler can emit for these families has exactly one
/// variant here, so an unmapped label is a compiler/table mismatch caught
/// in tests rather than a runtime surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    LeadsTotal,
    LeadsQualified,
    CostPerLead,
    AppsTotal,
    AppsQualified,
    CostPerApplication,
    CallsTotal,
    CallsQualified,
    ShowRate,
    CostPerCall,
    SetsTotal,
    SetsQualified,
    OpportunitiesTotal,
    CostPerOpportunity,
    OffersTotal,
    OffersAccepted,
    AddToCartsTotal,
    CostPerAddToCart,
    MetaSpend,
    MetaImpressions,
    MetaClicks,
    MetaCpm,
    MetaCpc,
    MetaCtr,
    MetaFrequency,
    MetaClickQuality,
    GoogleSpend,
    GoogleImpressions,
    GoogleClicks,
    GoogleConversions,
    GoogleCostPerConversion,
    /// Labels with no backing field in the current data model; always "-"
    Unsupported,
}

impl MetricField {
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "Leads" => MetricField::LeadsTotal,
            "Qualified Leads" => MetricField::LeadsQualified,
            "Cost Per Lead" => MetricField::CostPerLead,
            "Apps" => MetricField::AppsTotal,
            "Qualified Apps" => MetricField::AppsQualified,
            "Cost Per App" => MetricField::CostPerApplication,
            // The sales-rep and setter columns both read booked_calls.total:
            // the upstream data model does not distinguish them yet
            "Booked Calls" | "totalCallsWithSalesRep" | "totalCallsWithSetter" => {
                MetricField::CallsTotal
            }
            "Qualified Calls" => MetricField::CallsQualified,
            "Show Rate" => MetricField::ShowRate,
            "Cost Per Call" => MetricField::CostPerCall,
            "Sets" => MetricField::SetsTotal,
            "Qualified Sets" => MetricField::SetsQualified,
            "Qualified Opportunities" => MetricField::OpportunitiesTotal,
            "Cost Per Opportunity" => MetricField::CostPerOpportunity,
            "Offers" => MetricField::OffersTotal,
            "Offers Accepted" => MetricField::OffersAccepted,
            "Add To Carts" => MetricField::AddToCartsTotal,
            "Cost Per ATC" => MetricField::CostPerAddToCart,
            "Spend" => MetricField::MetaSpend,
            "Impressions" => MetricField::MetaImpressions,
            "Clicks" => MetricField::MetaClicks,
            "CPM" => MetricField::MetaCpm,
            "CPC" => MetricField::MetaCpc,
            "CTR" => MetricField::MetaCtr,
            "Frequency" => MetricField::MetaFrequency,
            "Click Quality" => MetricField::MetaClickQuality,
            "totalCustomEvents" | "thumbScrollStopRate" => MetricField::Unsupported,
            "Google Spend" => MetricField::GoogleSpend,
            "Google Impressions" => MetricField::GoogleImpressions,
            "Google Clicks" => MetricField::GoogleClicks,
            "Conversions" => MetricField::GoogleConversions,
            "Cost Per Conversion" => MetricField::GoogleCostPerConversion,
            _ => return None,
        })
    }

    fn read(&self, tf: &TimeframeMetrics) -> Option<ResolvedValue> {
        match self {
            MetricField::LeadsTotal => count(tf.lead_form_submissions.as_ref()?.total),
            MetricField::LeadsQualified => count(tf.lead_form_submissions.as_ref()?.qualified),
            MetricField::CostPerLead => money(tf.lead_form_submissions.as_ref()?.cost_per_lead),
            MetricField::AppsTotal => count(tf.applications.as_ref()?.total),
            MetricField::AppsQualified => count(tf.applications.as_ref()?.qualified),
            MetricField::CostPerApplication => {
                money(tf.applications.as_ref()?.cost_per_application)
            }
            MetricField::CallsTotal => count(tf.booked_calls.as_ref()?.total),
            MetricField::CallsQualified => count(tf.booked_calls.as_ref()?.qualified),
            MetricField::ShowRate => rate2(tf.booked_calls.as_ref()?.show_rate),
            MetricField::CostPerCall => money(tf.booked_calls.as_ref()?.cost_per_call),
            MetricField::SetsTotal => count(tf.sets.as_ref()?.total),
            MetricField::SetsQualified => count(tf.sets.as_ref()?.qualified),
            MetricField::OpportunitiesTotal => count(tf.qualified_opportunities.as_ref()?.total),
            MetricField::CostPerOpportunity => {
                money(tf.qualified_opportunities.as_ref()?.cost_per_opportunity)
            }
            MetricField::OffersTotal => count(tf.offers.as_ref()?.total),
            MetricField::OffersAccepted => count(tf.offers.as_ref()?.accepted),
            MetricField::AddToCartsTotal => count(tf.add_to_carts.as_ref()?.total),
            MetricField::CostPerAddToCart => {
                money(tf.add_to_carts.as_ref()?.cost_per_add_to_cart)
            }
            MetricField::MetaSpend => money(tf.ad_metrics.as_ref()?.meta.as_ref()?.spend),
            MetricField::MetaImpressions => {
                count(tf.ad_metrics.as_ref()?.meta.as_ref()?.impressions)
            }
            MetricField::MetaClicks => count(tf.ad_metrics.as_ref()?.meta.as_ref()?.clicks),
            MetricField::MetaCpm => money(tf.ad_metrics.as_ref()?.meta.as_ref()?.cpm),
            MetricField::MetaCpc => money(tf.ad_metrics.as_ref()?.meta.as_ref()?.cpc),
            MetricField::MetaCtr => rate2(tf.ad_metrics.as_ref()?.meta.as_ref()?.ctr),
            MetricField::MetaFrequency => rate2(tf.ad_metrics.as_ref()?.meta.as_ref()?.frequency),
            // Click quality is the one metric shown with a single decimal
            MetricField::MetaClickQuality => {
                rate1(tf.ad_metrics.as_ref()?.meta.as_ref()?.click_quality)
            }
            MetricField::GoogleSpend => money(tf.ad_metrics.as_ref()?.google.as_ref()?.spend),
            MetricField::GoogleImpressions => {
                count(tf.ad_metrics.as_ref()?.google.as_ref()?.impressions)
            }
            MetricField::GoogleClicks => count(tf.ad_metrics.as_ref()?.google.as_ref()?.clicks),
            MetricField::GoogleConversions => {
                count(tf.ad_metrics.as_ref()?.google.as_ref()?.conversions)
            }
            MetricField::GoogleCostPerConversion => {
                money(tf.ad_metrics.as_ref()?.google.as_ref()?.cost_per_conversion)
            }
            MetricField::Unsupported => None,
        }
    }
}

/// Sub-metrics of a sales bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesField {
    CountOfSales,
    Revenue,
    CashCollected,
    Roas,
    RoasCash,
    CostPerSale,
}

impl SalesField {
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "Sales" => SalesField::CountOfSales,
            "Rev" => SalesField::Revenue,
            "Cash" => SalesField::CashCollected,
            "ROAS" => SalesField::Roas,
            "Cash ROAS" => SalesField::RoasCash,
            "Cost Per Sale" => SalesField::CostPerSale,
            _ => return None,
        })
    }

    fn read(&self, bucket: &SalesBucket) -> Option<ResolvedValue> {
        match self {
            SalesField::CountOfSales => count(bucket.count_of_sales),
            SalesField::Revenue => money(bucket.revenue),
            SalesField::CashCollected => money(bucket.cash_collected),
            SalesField::Roas => rate2(bucket.roas),
            SalesField::RoasCash => rate2(bucket.roas_cash),
            SalesField::CostPerSale => money(bucket.cost_per_sale),
        }
    }
}

/// Resolve one cell: node data + timeframe key + metric label → display
/// string. Total function: any missing path yields the "-" sentinel,
/// never a panic.
pub fn resolve<N: ReportNode>(node: &N, timeframe_key: &str, metric_label: &str) -> String {
    // Product-group-scoped sales label: "<group>-<metric>". The metric part
    // never contains a dash, group names may, so split from the right.
    if let Some((group, rest)) = metric_label.rsplit_once('-') {
        if let Some(field) = SalesField::from_label(rest) {
            return resolve_sales(node, timeframe_key, Some(group), field);
        }
    }
    if let Some(field) = SalesField::from_label(metric_label) {
        return resolve_sales(node, timeframe_key, None, field);
    }
    let Some(field) = MetricField::from_label(metric_label) else {
        return MISSING.to_string();
    };
    node.timeframes()
        .get(timeframe_key)
        .and_then(|tf| field.read(tf))
        .map(render)
        .unwrap_or_else(|| MISSING.to_string())
}

fn resolve_sales<N: ReportNode>(
    node: &N,
    timeframe_key: &str,
    group: Option<&str>,
    field: SalesField,
) -> String {
    let Some(value) = sales_value(node, timeframe_key) else {
        return MISSING.to_string();
    };
    let buckets = value.buckets();
    let bucket = match group {
        Some(name) => buckets.iter().find(|b| b.product_group_name == name),
        // Generic label: prefer the "all" bucket, else the first one
        None => buckets
            .iter()
            .find(|b| b.product_group_name == "all")
            .or_else(|| buckets.first()),
    };
    bucket
        .and_then(|b| field.read(b))
        .map(render)
        .unwrap_or_else(|| MISSING.to_string())
}

/// The dedicated sales grid wins for its timeframe keys; the regular grid's
/// `sales` block is the fallback
fn sales_value<'a, N: ReportNode>(node: &'a N, timeframe_key: &str) -> Option<&'a SalesValue> {
    node.sales_timeframes()
        .and_then(|grid| grid.get(timeframe_key))
        .and_then(|window| window.sales.as_ref())
        .or_else(|| {
            node.timeframes()
                .get(timeframe_key)
                .and_then(|tf| tf.sales.as_ref())
        })
}

/// Resolve a static column for a campaign row. The Grade column is
/// interactive and rendered by the UI, so it falls through to "-" here.
pub fn resolve_static(campaign: &CampaignNode, field_label: &str) -> String {
    match field_label {
        "Campaign" => campaign.name.clone(),
        "Previous Grade" => campaign
            .campaign_grade
            .as_ref()
            .map(|g| g.grade_label())
            .unwrap_or_else(|| MISSING.to_string()),
        "Ad Source" => campaign
            .ad_source
            .clone()
            .unwrap_or_else(|| MISSING.to_string()),
        _ => static_rule_key(field_label)
            .and_then(|key| campaign.static_metrics.get(key))
            .map(static_value)
            .unwrap_or_else(|| MISSING.to_string()),
    }
}

fn static_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::report_table::rules::RulesPayload;
    use crate::shared::report_table::schema::compile;

    fn campaign(json: &str) -> CampaignNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolver_is_total_over_missing_data() {
        let node = campaign(r#"{"id":"c1","name":"Launch"}"#);
        for timeframe in ["yesterday", "total", "nope"] {
            for label in ["Apps", "Rev", "Core-Rev", "Spend", "bogus", ""] {
                assert_eq!(resolve(&node, timeframe, label), MISSING);
            }
        }
    }

    #[test]
    fn test_minimal_scenario_cell() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"yesterday":{"applications":{"total":7}}}}"#,
        );
        assert_eq!(resolve(&node, "yesterday", "Apps"), "7");
        assert_eq!(resolve(&node, "yesterday", "Qualified Apps"), MISSING);
        assert_eq!(resolve(&node, "last_7_days", "Apps"), MISSING);
    }

    #[test]
    fn test_every_compiled_label_is_known_to_the_resolver() {
        // Enable everything; each resulting label must map to a field
        // (the two unsupported labels included) so no cell ever falls
        // through the unknown-label branch.
        let p = RulesPayload::parse(
            r#"{"events":{
                "lead_form_submissions":{"total":true,"qualified":true,"cost_per_lead":true},
                "applications":{"total":true,"qualified":true,"cost_per_application":true},
                "booked_calls":{"total":true,"total_with_sales_rep":true,"total_with_setter":true,"qualified":true,"show_rate":true,"cost_per_call":true},
                "sets":{"total":true,"qualified":true},
                "qualified_opportunities":{"total":true,"cost_per_opportunity":true},
                "offers":{"total":true,"accepted":true},
                "add_to_carts":{"total":true,"cost_per_add_to_cart":true},
                "ad_metrics":{"meta":{"spend":true,"impressions":true,"clicks":true,"cpm":true,"ctr":true,"cpc":true,"frequency":true,"click_quality":true,"total_custom_events":true,"thumb_scroll_stop_rate":true},
                               "google":{"spend":true,"impressions":true,"clicks":true,"conversions":true,"cost_per_conversion":true}},
                "sales":{"metrics":{"count_of_sales":true,"revenue":true,"cash_collected":true,"roas":true,"roas_cash":true,"cost_per_sale":true}}}}"#,
        )
        .unwrap();
        let schema = compile(&p);
        for label in &schema.event_metrics {
            let known = MetricField::from_label(label).is_some()
                || SalesField::from_label(label).is_some();
            assert!(known, "no field mapping for label {label:?}");
        }
    }

    #[test]
    fn test_call_alias_labels_read_the_same_field() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"booked_calls":{"total":12}}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Booked Calls"), "12");
        assert_eq!(resolve(&node, "total", "totalCallsWithSalesRep"), "12");
        assert_eq!(resolve(&node, "total", "totalCallsWithSetter"), "12");
    }

    #[test]
    fn test_unsupported_labels_always_miss() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"ad_metrics":{"meta":{"spend":10.0}}}}}"#,
        );
        assert_eq!(resolve(&node, "total", "totalCustomEvents"), MISSING);
        assert_eq!(resolve(&node, "total", "thumbScrollStopRate"), MISSING);
    }

    #[test]
    fn test_generic_sales_label_prefers_all_bucket() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"sales":[
                    {"product_group_name":"Core","revenue":50.0},
                    {"product_group_name":"all","revenue":80.0}]}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Rev"), "80.00");
    }

    #[test]
    fn test_generic_sales_label_falls_back_to_first_bucket() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"sales":[
                    {"product_group_name":"Core","revenue":50.0},
                    {"product_group_name":"Upsell","revenue":30.0}]}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Rev"), "50.00");
    }

    #[test]
    fn test_legacy_single_object_sales_shape() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"sales":{"count_of_sales":4,"revenue":99.5}}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Sales"), "4");
        assert_eq!(resolve(&node, "total", "Rev"), "99.50");
    }

    #[test]
    fn test_group_scoped_label_reads_the_named_bucket() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "sales_timeframes":{"total":{"sales":[
                    {"product_group_name":"Core","revenue":1234.5}]}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Core-Rev"), "1 234.50");
        // Bucket absent for this group
        assert_eq!(resolve(&node, "total", "Upsell-Rev"), MISSING);
    }

    #[test]
    fn test_sales_grid_wins_over_regular_grid() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{"sales":[{"product_group_name":"all","revenue":1.0}]}},
                "sales_timeframes":{"total":{"sales":[{"product_group_name":"all","revenue":2.0}]}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Rev"), "2.00");
    }

    #[test]
    fn test_value_styles() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{
                    "ad_metrics":{"meta":{"spend":1234.5,"impressions":98765,"ctr":1.2345,"click_quality":7.89}},
                    "booked_calls":{"show_rate":0.667}}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Spend"), "1 234.50");
        assert_eq!(resolve(&node, "total", "Impressions"), "98765");
        assert_eq!(resolve(&node, "total", "CTR"), "1.23");
        assert_eq!(resolve(&node, "total", "Click Quality"), "7.9");
        assert_eq!(resolve(&node, "total", "Show Rate"), "0.67");
    }

    #[test]
    fn test_counts_render_as_plain_integers() {
        // Count fields carry i64 all the way: no separators, no decimals,
        // no float rounding path
        let node = campaign(
            r#"{"id":"c1","name":"Launch",
                "timeframes":{"total":{
                    "ad_metrics":{"meta":{"impressions":1234567}},
                    "sales":[{"product_group_name":"all","count_of_sales":1000}]}}}"#,
        );
        assert_eq!(resolve(&node, "total", "Impressions"), "1234567");
        assert_eq!(resolve(&node, "total", "Sales"), "1000");
    }

    #[test]
    fn test_resolve_works_for_ad_set_and_ad_nodes() {
        let ad_set: crate::shared::report_table::nodes::AdSetNode = serde_json::from_str(
            r#"{"id":"s1","campaign_id":"c1","name":"Broad",
                "timeframes":{"yesterday":{"sets":{"total":3}}}}"#,
        )
        .unwrap();
        assert_eq!(resolve(&ad_set, "yesterday", "Sets"), "3");

        let ad: crate::shared::report_table::nodes::AdNode = serde_json::from_str(
            r#"{"id":"a1","name":"Hook v2",
                "timeframes":{"yesterday":{"offers":{"total":1}}}}"#,
        )
        .unwrap();
        assert_eq!(resolve(&ad, "yesterday", "Offers"), "1");
    }

    #[test]
    fn test_resolve_static() {
        let node = campaign(
            r#"{"id":"c1","name":"Launch","ad_source":"meta",
                "campaign_grade":{"date":"2025-03-01","grade":"3"},
                "static_metrics":{"status":"ACTIVE","budget":150}}"#,
        );
        assert_eq!(resolve_static(&node, "Campaign"), "Launch");
        assert_eq!(resolve_static(&node, "Previous Grade"), "Good");
        assert_eq!(resolve_static(&node, "Ad Source"), "meta");
        assert_eq!(resolve_static(&node, "Status"), "ACTIVE");
        assert_eq!(resolve_static(&node, "Budget"), "150");
        assert_eq!(resolve_static(&node, "Grade"), MISSING);
    }
}
