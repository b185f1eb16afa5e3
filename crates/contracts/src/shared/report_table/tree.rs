//! Copy-on-write operations over the campaign hierarchy.
//!
//! The top-level campaign array is the only shared mutable resource of the
//! report; every merge produces a fresh vector so the renderer can detect
//! changes by reference and never observes a half-mutated node. Merges are
//! keyed by node id and commutative, so concurrent child fetches for
//! different nodes may land in any order.

use super::grade::GradeEntry;
use super::nodes::{AdNode, AdSetNode, CampaignNode};

/// Attach fetched ad sets to their campaign. Existing children of the
/// matching campaign are replaced, so a late-arriving duplicate merge is
/// harmless.
pub fn attach_ad_sets(
    campaigns: &[CampaignNode],
    campaign_id: &str,
    ad_sets: Vec<AdSetNode>,
) -> Vec<CampaignNode> {
    campaigns
        .iter()
        .map(|campaign| {
            if campaign.id != campaign_id {
                return campaign.clone();
            }
            let mut next = campaign.clone();
            next.ad_sets = Some(ad_sets.clone());
            next
        })
        .collect()
}

/// Attach fetched ads to their ad set, wherever it currently lives in the
/// loaded tree. Campaigns whose ad sets are not loaded yet are untouched.
pub fn attach_ads(
    campaigns: &[CampaignNode],
    ad_set_id: &str,
    ads: Vec<AdNode>,
) -> Vec<CampaignNode> {
    campaigns
        .iter()
        .map(|campaign| {
            let Some(ad_sets) = &campaign.ad_sets else {
                return campaign.clone();
            };
            if !ad_sets.iter().any(|s| s.id == ad_set_id) {
                return campaign.clone();
            }
            let mut next = campaign.clone();
            next.ad_sets = Some(
                ad_sets
                    .iter()
                    .map(|ad_set| {
                        if ad_set.id != ad_set_id {
                            return ad_set.clone();
                        }
                        let mut next_set = ad_set.clone();
                        next_set.ads = Some(ads.clone());
                        next_set
                    })
                    .collect(),
            );
            next
        })
        .collect()
}

/// Find the campaign owning an ad set by scanning currently loaded
/// campaigns. Returns None when the owner is not loaded (or stale), in
/// which case the caller abandons the ad fetch silently.
pub fn find_campaign_for_ad_set<'a>(
    campaigns: &'a [CampaignNode],
    ad_set_id: &str,
) -> Option<&'a CampaignNode> {
    campaigns.iter().find(|campaign| {
        campaign
            .ad_sets
            .as_ref()
            .map(|sets| sets.iter().any(|s| s.id == ad_set_id))
            .unwrap_or(false)
    })
}

/// Optimistically replace a campaign's in-memory grade after a successful
/// save, so the Previous Grade column reflects it without a refetch
pub fn apply_campaign_grade(
    campaigns: &[CampaignNode],
    campaign_id: &str,
    entry: GradeEntry,
) -> Vec<CampaignNode> {
    campaigns
        .iter()
        .map(|campaign| {
            if campaign.id != campaign_id {
                return campaign.clone();
            }
            let mut next = campaign.clone();
            next.campaign_grade = Some(entry.clone());
            next
        })
        .collect()
}
