use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::grade::GradeEntry;

/// Per-product-group sales figures for one timeframe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesBucket {
    /// Product group this bucket belongs to; "all" is the ungrouped default
    #[serde(default)]
    pub product_group_name: String,
    #[serde(default)]
    pub count_of_sales: Option<i64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub cash_collected: Option<f64>,
    #[serde(default)]
    pub roas: Option<f64>,
    #[serde(default)]
    pub roas_cash: Option<f64>,
    #[serde(default)]
    pub cost_per_sale: Option<f64>,
}

/// The `sales` block arrives either as a bucket array (current shape) or as
/// a single object (legacy shape); both are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalesValue {
    Buckets(Vec<SalesBucket>),
    Legacy(SalesBucket),
}

impl SalesValue {
    /// Uniform bucket view over both wire shapes
    pub fn buckets(&self) -> &[SalesBucket] {
        match self {
            SalesValue::Buckets(buckets) => buckets,
            SalesValue::Legacy(bucket) => std::slice::from_ref(bucket),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadFormMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub qualified: Option<i64>,
    #[serde(default)]
    pub cost_per_lead: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub qualified: Option<i64>,
    #[serde(default)]
    pub cost_per_application: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookedCallMetrics {
    /// Shared by the sales-rep and setter call columns; the upstream data
    /// model does not distinguish them yet
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub qualified: Option<i64>,
    #[serde(default)]
    pub show_rate: Option<f64>,
    #[serde(default)]
    pub cost_per_call: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub qualified: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualifiedOpportunityMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub cost_per_opportunity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub accepted: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddToCartMetrics {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub cost_per_add_to_cart: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaAdMetrics {
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub impressions: Option<i64>,
    #[serde(default)]
    pub clicks: Option<i64>,
    #[serde(default)]
    pub cpm: Option<f64>,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub ctr: Option<f64>,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub click_quality: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleAdMetrics {
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub impressions: Option<i64>,
    #[serde(default)]
    pub clicks: Option<i64>,
    #[serde(default)]
    pub conversions: Option<i64>,
    #[serde(default)]
    pub cost_per_conversion: Option<f64>,
}

/// Platform ad metrics, one sub-record per ad source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdPlatformMetrics {
    #[serde(default)]
    pub meta: Option<MetaAdMetrics>,
    #[serde(default)]
    pub google: Option<GoogleAdMetrics>,
}

/// Metric records a node carries for one rolling time window.
/// Every family is optional: an absent record resolves to the "-" sentinel,
/// never to an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframeMetrics {
    #[serde(default)]
    pub sales: Option<SalesValue>,
    #[serde(default)]
    pub lead_form_submissions: Option<LeadFormMetrics>,
    #[serde(default)]
    pub applications: Option<ApplicationMetrics>,
    #[serde(default)]
    pub booked_calls: Option<BookedCallMetrics>,
    #[serde(default)]
    pub sets: Option<SetMetrics>,
    #[serde(default)]
    pub qualified_opportunities: Option<QualifiedOpportunityMetrics>,
    #[serde(default)]
    pub offers: Option<OfferMetrics>,
    #[serde(default)]
    pub add_to_carts: Option<AddToCartMetrics>,
    #[serde(default)]
    pub ad_metrics: Option<AdPlatformMetrics>,
}

/// Sales block for the dedicated sales-timeframe grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesWindow {
    #[serde(default)]
    pub sales: Option<SalesValue>,
}

/// Top level of the hierarchy: one advertising campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignNode {
    pub id: String,
    pub name: String,
    /// Ad platform the campaign runs on (e.g. "meta", "google")
    #[serde(default)]
    pub ad_source: Option<String>,
    /// Most recent saved grade; feeds the "Previous Grade" column
    #[serde(default)]
    pub campaign_grade: Option<GradeEntry>,
    /// Extra static column values, keyed by rule key (status, budget, ...)
    #[serde(default)]
    pub static_metrics: serde_json::Map<String, serde_json::Value>,
    /// Metrics per timeframe key (yesterday, last_7_days, ...)
    #[serde(default)]
    pub timeframes: HashMap<String, TimeframeMetrics>,
    /// Sales metrics for the dedicated sales-timeframe grid, when configured
    #[serde(default)]
    pub sales_timeframes: Option<HashMap<String, SalesWindow>>,
    /// None = not yet loaded, Some(vec![]) = loaded with no children
    #[serde(default)]
    pub ad_sets: Option<Vec<AdSetNode>>,
}

/// Middle level: one ad set inside a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdSetNode {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    #[serde(default)]
    pub static_metrics: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timeframes: HashMap<String, TimeframeMetrics>,
    #[serde(default)]
    pub sales_timeframes: Option<HashMap<String, SalesWindow>>,
    /// None = not yet loaded, Some(vec![]) = loaded with no children
    #[serde(default)]
    pub ads: Option<Vec<AdNode>>,
}

/// Leaf level: one ad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub static_metrics: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timeframes: HashMap<String, TimeframeMetrics>,
    #[serde(default)]
    pub sales_timeframes: Option<HashMap<String, SalesWindow>>,
}

/// Uniform access to per-timeframe data for all three hierarchy levels,
/// so the metric resolver does not care which level a cell belongs to.
pub trait ReportNode {
    fn timeframes(&self) -> &HashMap<String, TimeframeMetrics>;
    fn sales_timeframes(&self) -> Option<&HashMap<String, SalesWindow>>;
}

impl ReportNode for CampaignNode {
    fn timeframes(&self) -> &HashMap<String, TimeframeMetrics> {
        &self.timeframes
    }
    fn sales_timeframes(&self) -> Option<&HashMap<String, SalesWindow>> {
        self.sales_timeframes.as_ref()
    }
}

impl ReportNode for AdSetNode {
    fn timeframes(&self) -> &HashMap<String, TimeframeMetrics> {
        &self.timeframes
    }
    fn sales_timeframes(&self) -> Option<&HashMap<String, SalesWindow>> {
        self.sales_timeframes.as_ref()
    }
}

impl ReportNode for AdNode {
    fn timeframes(&self) -> &HashMap<String, TimeframeMetrics> {
        &self.timeframes
    }
    fn sales_timeframes(&self) -> Option<&HashMap<String, SalesWindow>> {
        self.sales_timeframes.as_ref()
    }
}
