// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

/// Disjoint keyed operations that turn a previous collection into the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K> {
    pub create: Vec<K>,
    pub update: Vec<K>,
    pub delete: Vec<K>,
}

impl<K> Default for Reconciliation<K> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }
}

impl<K> Reconciliation<K> {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Diffs `previous` against `next`.
///
/// - `create`: keys only in `next`
/// - `update`: keys in both whose values differ
/// - `delete`: keys only in `previous`
///
/// Each list comes out in key order.
pub fn reconcile<'a, K, V>(
    previous: impl IntoIterator<Item = (&'a K, &'a V)>,
    next: &BTreeMap<K, V>,
) -> Reconciliation<K>
where
    K: Ord + Clone + 'a,
    V: PartialEq + 'a,
{
    let mut out = Reconciliation::default();
    let mut seen = BTreeSet::new();

    for (key, old) in previous {
        seen.insert(key);
        match next.get(key) {
            None => out.delete.push(key.clone()),
            Some(new) if new != old => out.update.push(key.clone()),
            Some(_) => {}
        }
    }
    out.delete.sort();
    out.update.sort();

    out.create = next
        .keys()
        .filter(|key| !seen.contains(key))
        .cloned()
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::reconcile;

    fn map(entries: &[(&'static str, i32)]) -> BTreeMap<&'static str, i32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn splits_keys_into_disjoint_sets() {
        let previous = map(&[("a", 1), ("b", 2), ("c", 3)]);
        let next = map(&[("b", 2), ("c", 30), ("d", 4)]);

        let diff = reconcile(&previous, &next);

        assert_eq!(diff.create, vec!["d"]);
        assert_eq!(diff.update, vec!["c"]);
        assert_eq!(diff.delete, vec!["a"]);
    }

    #[test]
    fn identical_collections_need_no_work() {
        let same = map(&[("a", 1), ("b", 2)]);
        assert!(reconcile(&same, &same.clone()).is_empty());
    }

    #[test]
    fn empty_previous_creates_everything() {
        let next = map(&[("x", 1), ("y", 2)]);
        let diff = reconcile(&BTreeMap::new(), &next);
        assert_eq!(diff.create, vec!["x", "y"]);
        assert!(diff.update.is_empty() && diff.delete.is_empty());
    }
}
