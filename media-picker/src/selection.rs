use crate::models::{Asset, SelectionPolicy};
use std::collections::HashSet;
use uuid::Uuid;

/// What a [`SelectionSet::add`] call actually did
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    /// Asset appended to the selection
    Added,
    /// Auto-deselect evicted the previous pick before appending
    Replaced(Asset),
    /// Duplicate or maximum reached; nothing changed
    Unchanged,
}

/// Ordered, duplicate-free set of picked assets.
///
/// Insertion order is preserved for the finish callback; membership checks
/// go through a companion id set. The configured [`SelectionPolicy`] is
/// enforced on every mutation. Purely in-memory and scoped to one picking
/// session.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    policy: SelectionPolicy,
    ordered: Vec<Asset>,
    members: HashSet<Uuid>,
}

impl SelectionSet {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ordered: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// Creates a pre-seeded selection; duplicate seeds are dropped
    pub fn with_assets(policy: SelectionPolicy, seed: Vec<Asset>) -> Self {
        let mut set = Self::new(policy);
        for asset in seed {
            if !set.members.contains(&asset.id) {
                set.members.insert(asset.id);
                set.ordered.push(asset);
            }
        }
        set
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Adds an asset to the selection.
    ///
    /// No-op when the asset is already selected, or when the maximum gate is
    /// reached and auto-deselect does not apply. With auto-deselect active
    /// the oldest member is evicted first and handed back so the caller can
    /// clear its cell highlight.
    pub fn add(&mut self, asset: Asset) -> SelectionChange {
        self.insert(asset, true)
    }

    /// Adds past the maximum gate, for selections the host explicitly
    /// approved. Duplicates and auto-deselect still apply.
    pub fn add_overriding_limit(&mut self, asset: Asset) -> SelectionChange {
        self.insert(asset, false)
    }

    fn insert(&mut self, asset: Asset, enforce_limit: bool) -> SelectionChange {
        if self.members.contains(&asset.id) {
            return SelectionChange::Unchanged;
        }
        if self.auto_deselects() {
            let evicted = if self.ordered.is_empty() {
                None
            } else {
                let old = self.ordered.remove(0);
                self.members.remove(&old.id);
                Some(old)
            };
            self.members.insert(asset.id);
            self.ordered.push(asset);
            return match evicted {
                Some(old) => SelectionChange::Replaced(old),
                None => SelectionChange::Added,
            };
        }
        if enforce_limit && self.is_maximum_reached() {
            return SelectionChange::Unchanged;
        }
        self.members.insert(asset.id);
        self.ordered.push(asset);
        SelectionChange::Added
    }

    /// Removes an asset by id; returns it, or None if it was not selected
    pub fn remove(&mut self, id: &Uuid) -> Option<Asset> {
        if !self.members.remove(id) {
            return None;
        }
        let pos = self.ordered.iter().position(|a| &a.id == id)?;
        Some(self.ordered.remove(pos))
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Selected assets in insertion order
    pub fn assets(&self) -> &[Asset] {
        &self.ordered
    }

    /// Consumes the selection for the finish callback
    pub fn into_assets(self) -> Vec<Asset> {
        self.ordered
    }

    pub fn oldest(&self) -> Option<&Asset> {
        self.ordered.first()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.members.clear();
    }

    /// True when a single new pick should replace the previous one
    pub fn auto_deselects(&self) -> bool {
        self.policy.maximum == 1 && self.policy.maximum >= self.policy.minimum
    }

    /// Commit gate: enough assets selected to confirm the pick
    pub fn is_minimum_fulfilled(&self) -> bool {
        self.policy.minimum <= self.ordered.len()
    }

    /// Selection gate: no further picks allowed.
    ///
    /// A contradictory policy (effective minimum above the maximum) leaves
    /// the gate permanently open instead of raising a configuration error.
    pub fn is_maximum_reached(&self) -> bool {
        let effective_min = self.policy.minimum.max(1);
        if effective_min <= self.policy.maximum {
            self.policy.maximum <= self.ordered.len()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn policy(minimum: usize, maximum: usize) -> SelectionPolicy {
        SelectionPolicy {
            minimum,
            maximum,
            allows_multiple: true,
        }
    }

    fn asset(name: &str) -> Asset {
        Asset::image(format!("/photos/{}.jpg", name), Utc::now())
    }

    #[test]
    fn test_unbounded_add_remove_bookkeeping() {
        let mut set = SelectionSet::new(policy(1, 0));
        let a = asset("a");
        let b = asset("b");
        let c = asset("c");

        assert_eq!(set.add(a.clone()), SelectionChange::Added);
        assert_eq!(set.add(b.clone()), SelectionChange::Added);
        assert_eq!(set.add(c.clone()), SelectionChange::Added);
        // Duplicate add is a no-op
        assert_eq!(set.add(a.clone()), SelectionChange::Unchanged);
        assert_eq!(set.len(), 3);

        assert_eq!(set.remove(&b.id).map(|r| r.id), Some(b.id));
        assert_eq!(set.remove(&b.id), None);
        assert_eq!(set.len(), 2);

        // Insertion order survives removals
        let order: Vec<Uuid> = set.assets().iter().map(|x| x.id).collect();
        assert_eq!(order, vec![a.id, c.id]);
    }

    #[test]
    fn test_auto_deselect_keeps_newest_sole_member() {
        let mut set = SelectionSet::new(policy(1, 1));
        assert!(set.auto_deselects());

        let first = asset("first");
        let second = asset("second");
        assert_eq!(set.add(first.clone()), SelectionChange::Added);
        match set.add(second.clone()) {
            SelectionChange::Replaced(old) => assert_eq!(old.id, first.id),
            other => panic!("expected eviction, got {:?}", other),
        }
        assert_eq!(set.len(), 1);
        assert_eq!(set.assets()[0].id, second.id);
    }

    #[test]
    fn test_minimum_fulfilled_tracks_count() {
        let mut set = SelectionSet::new(policy(2, 0));
        assert!(!set.is_minimum_fulfilled());
        set.add(asset("a"));
        assert!(!set.is_minimum_fulfilled());
        set.add(asset("b"));
        assert!(set.is_minimum_fulfilled());
        set.add(asset("c"));
        assert!(set.is_minimum_fulfilled());
    }

    #[test]
    fn test_maximum_never_reached_when_policy_contradicts() {
        // Effective minimum 5 exceeds maximum 3: gate stays open
        let mut set = SelectionSet::new(policy(5, 3));
        for i in 0..10 {
            assert!(!set.is_maximum_reached());
            set.add(asset(&format!("a{}", i)));
        }
        // The gate never rejected, so the set grew past the nominal maximum
        assert_eq!(set.len(), 10);
        assert!(!set.is_maximum_reached());
    }

    #[test]
    fn test_commit_gating_scenario_min3_max6() {
        let mut set = SelectionSet::new(policy(3, 6));
        set.add(asset("a"));
        set.add(asset("b"));
        assert!(!set.is_minimum_fulfilled());
        set.add(asset("c"));
        assert!(set.is_minimum_fulfilled());

        set.add(asset("d"));
        set.add(asset("e"));
        assert!(!set.is_maximum_reached());
        set.add(asset("f"));
        assert!(set.is_maximum_reached());

        // The 7th add is rejected outright
        assert_eq!(set.add(asset("g")), SelectionChange::Unchanged);
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_max_one_with_larger_minimum_disables_auto_deselect() {
        // maximum == 1 but minimum 2 > maximum: auto-deselect is off and the
        // contradictory policy leaves the gate open, so picks accumulate.
        let mut set = SelectionSet::new(policy(2, 1));
        assert!(!set.auto_deselects());
        assert_eq!(set.add(asset("a")), SelectionChange::Added);
        assert_eq!(set.add(asset("b")), SelectionChange::Added);
        assert_eq!(set.len(), 2);
        assert!(!set.is_maximum_reached());
    }

    #[test]
    fn test_override_bypasses_maximum_gate() {
        let mut set = SelectionSet::new(policy(1, 2));
        set.add(asset("a"));
        set.add(asset("b"));
        assert!(set.is_maximum_reached());
        assert_eq!(set.add(asset("c")), SelectionChange::Unchanged);

        // Host-approved picks land even past the gate, duplicates still don't
        let d = asset("d");
        assert_eq!(set.add_overriding_limit(d.clone()), SelectionChange::Added);
        assert_eq!(set.add_overriding_limit(d.clone()), SelectionChange::Unchanged);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_preseed_drops_duplicates() {
        let a = asset("a");
        let seed = vec![a.clone(), a.clone(), asset("b")];
        let set = SelectionSet::with_assets(policy(1, 0), seed);
        assert_eq!(set.len(), 2);
        assert_eq!(set.oldest().map(|x| x.id), Some(a.id));
    }
}
