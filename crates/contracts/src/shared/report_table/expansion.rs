use std::collections::HashSet;

/// Hierarchy levels that can be expanded (ads have no children)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyLevel {
    Campaign,
    AdSet,
}

/// UI-session expansion and in-flight-fetch state, keyed by node id.
///
/// An explicit value object rather than hidden component state: the owner
/// keeps it in a signal and every transition goes through these methods.
/// The expanded and loading sets are independent per level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionStore {
    expanded_campaigns: HashSet<String>,
    loading_campaigns: HashSet<String>,
    expanded_ad_sets: HashSet<String>,
    loading_ad_sets: HashSet<String>,
}

impl ExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, level: HierarchyLevel, id: &str) -> bool {
        self.expanded(level).contains(id)
    }

    pub fn is_loading(&self, level: HierarchyLevel, id: &str) -> bool {
        self.loading(level).contains(id)
    }

    /// Mark a node with already-loaded children as open (no fetch involved)
    pub fn expand(&mut self, level: HierarchyLevel, id: &str) {
        self.expanded_mut(level).insert(id.to_string());
    }

    /// Close a row; loaded children are retained by the tree
    pub fn collapse(&mut self, level: HierarchyLevel, id: &str) {
        self.expanded_mut(level).remove(id);
    }

    /// Enter the loading state for a first-time expand. Returns false while
    /// a fetch for this id is already in flight, in which case the caller
    /// must not issue another one.
    pub fn begin_load(&mut self, level: HierarchyLevel, id: &str) -> bool {
        if self.loading(level).contains(id) {
            return false;
        }
        self.loading_mut(level).insert(id.to_string());
        true
    }

    /// Leave the loading state. On success the node opens; on failure it
    /// stays collapsed/unloaded so the operator can retry by expanding again.
    pub fn finish_load(&mut self, level: HierarchyLevel, id: &str, success: bool) {
        self.loading_mut(level).remove(id);
        if success {
            self.expanded_mut(level).insert(id.to_string());
        }
    }

    fn expanded(&self, level: HierarchyLevel) -> &HashSet<String> {
        match level {
            HierarchyLevel::Campaign => &self.expanded_campaigns,
            HierarchyLevel::AdSet => &self.expanded_ad_sets,
        }
    }

    fn expanded_mut(&mut self, level: HierarchyLevel) -> &mut HashSet<String> {
        match level {
            HierarchyLevel::Campaign => &mut self.expanded_campaigns,
            HierarchyLevel::AdSet => &mut self.expanded_ad_sets,
        }
    }

    fn loading(&self, level: HierarchyLevel) -> &HashSet<String> {
        match level {
            HierarchyLevel::Campaign => &self.loading_campaigns,
            HierarchyLevel::AdSet => &self.loading_ad_sets,
        }
    }

    fn loading_mut(&mut self, level: HierarchyLevel) -> &mut HashSet<String> {
        match level {
            HierarchyLevel::Campaign => &mut self.loading_campaigns,
            HierarchyLevel::AdSet => &mut self.loading_ad_sets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HierarchyLevel::{AdSet, Campaign};

    #[test]
    fn test_begin_load_guards_duplicate_fetches() {
        let mut store = ExpansionStore::new();
        assert!(store.begin_load(Campaign, "c1"));
        // Second expand click while the fetch is outstanding is a no-op
        assert!(!store.begin_load(Campaign, "c1"));
        assert!(store.is_loading(Campaign, "c1"));
        assert!(!store.is_expanded(Campaign, "c1"));
    }

    #[test]
    fn test_successful_load_opens_the_row() {
        let mut store = ExpansionStore::new();
        store.begin_load(Campaign, "c1");
        store.finish_load(Campaign, "c1", true);
        assert!(!store.is_loading(Campaign, "c1"));
        assert!(store.is_expanded(Campaign, "c1"));
    }

    #[test]
    fn test_failed_load_leaves_row_collapsed_and_retriable() {
        let mut store = ExpansionStore::new();
        store.begin_load(Campaign, "c1");
        store.finish_load(Campaign, "c1", false);
        assert!(!store.is_loading(Campaign, "c1"));
        assert!(!store.is_expanded(Campaign, "c1"));
        // Retry is allowed after the failure
        assert!(store.begin_load(Campaign, "c1"));
    }

    #[test]
    fn test_collapse_and_reopen_without_reload() {
        let mut store = ExpansionStore::new();
        store.begin_load(Campaign, "c1");
        store.finish_load(Campaign, "c1", true);
        store.collapse(Campaign, "c1");
        assert!(!store.is_expanded(Campaign, "c1"));
        store.expand(Campaign, "c1");
        assert!(store.is_expanded(Campaign, "c1"));
        assert!(!store.is_loading(Campaign, "c1"));
    }

    #[test]
    fn test_levels_are_independent() {
        let mut store = ExpansionStore::new();
        store.expand(Campaign, "x");
        assert!(!store.is_expanded(AdSet, "x"));
        store.begin_load(AdSet, "x");
        assert!(!store.is_loading(Campaign, "x"));
    }
}
