#![forbid(unsafe_code)]

//! Gutter collapse toggle.
//!
//! Clicking a gutter commonly collapses the panel next to it and clicking
//! again brings it back. The toggle is two-state per area: an area with a
//! non-empty size is collapsed into its neighbour across the gutter and the
//! size is remembered; an empty area gets the remembered size back, taken
//! from that same neighbour and never more than the neighbour has.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::area::{AreaId, AreaSize};

/// Which side of the gutter holds the area being toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseSide {
    /// The area just before the gutter.
    #[default]
    Before,
    /// The area just after the gutter.
    After,
}

/// Sizes remembered for collapsed areas.
#[derive(Debug, Clone, Default)]
pub struct CollapseMemory {
    remembered: FxHashMap<AreaId, f64>,
}

impl CollapseMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size `area` had before it was last collapsed.
    #[must_use]
    pub fn remembered(&self, area: AreaId) -> Option<f64> {
        self.remembered.get(&area).copied()
    }

    pub fn forget(&mut self, area: AreaId) {
        self.remembered.remove(&area);
    }

    pub fn clear(&mut self) {
        self.remembered.clear();
    }

    /// Compute the sizes after toggling the area on `side` of `gutter`.
    ///
    /// `ids`, `sizes` and `extents` describe the displayed areas in layout
    /// order; `extents` are pixel extents and are only read for a wildcard
    /// neighbour. Returns `None` when the toggle has no effect.
    pub fn plan(
        &mut self,
        ids: &[AreaId],
        sizes: &[AreaSize],
        extents: &[f64],
        gutter: usize,
        side: CollapseSide,
    ) -> Option<Vec<AreaSize>> {
        if gutter == 0 || gutter >= sizes.len() {
            return None;
        }
        let (target, neighbour) = match side {
            CollapseSide::Before => (gutter - 1, gutter),
            CollapseSide::After => (gutter, gutter - 1),
        };
        let target_id = *ids.get(target)?;
        let current = sizes[target].fixed()?;
        let mut next = sizes.to_vec();

        if current > 0.0 {
            next[target] = AreaSize::Fixed(0.0);
            if let AreaSize::Fixed(n) = sizes[neighbour] {
                next[neighbour] = AreaSize::Fixed(n + current);
            }
            self.remembered.insert(target_id, current);
            return Some(next);
        }

        let wanted = self.remembered(target_id)?;
        let available = match sizes[neighbour] {
            AreaSize::Fixed(n) => n,
            AreaSize::Wildcard => extents.get(neighbour).copied().unwrap_or(0.0),
        };
        let amount = wanted.min(available);
        if amount <= 0.0 {
            return None;
        }
        next[target] = AreaSize::Fixed(amount);
        if let AreaSize::Fixed(n) = sizes[neighbour] {
            next[neighbour] = AreaSize::Fixed(n - amount);
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<AreaId> {
        let mut out = vec![AreaId::MIN];
        while out.len() < n {
            let last = out[out.len() - 1];
            out.push(last.next());
        }
        out
    }

    fn fixed(v: &[f64]) -> Vec<AreaSize> {
        v.iter().copied().map(AreaSize::Fixed).collect()
    }

    #[test]
    fn collapse_and_restore_sequence() {
        let ids = ids(3);
        let mut mem = CollapseMemory::new();
        let mut sizes = fixed(&[25.0, 50.0, 25.0]);
        let steps = [
            (1, CollapseSide::Before, [0.0, 75.0, 25.0]),
            (1, CollapseSide::Before, [25.0, 50.0, 25.0]),
            (1, CollapseSide::Before, [0.0, 75.0, 25.0]),
            (2, CollapseSide::After, [0.0, 100.0, 0.0]),
            (1, CollapseSide::Before, [25.0, 75.0, 0.0]),
            (2, CollapseSide::After, [25.0, 50.0, 25.0]),
        ];
        for (gutter, side, expected) in steps {
            sizes = mem.plan(&ids, &sizes, &[], gutter, side).unwrap();
            assert_eq!(sizes, fixed(&expected), "gutter {gutter} {side:?}");
        }
    }

    #[test]
    fn restore_is_limited_by_neighbour() {
        let ids = ids(2);
        let mut mem = CollapseMemory::new();
        let collapsed = mem.plan(&ids, &fixed(&[60.0, 40.0]), &[], 1, CollapseSide::Before).unwrap();
        assert_eq!(collapsed, fixed(&[0.0, 100.0]));
        let restored = mem.plan(&ids, &fixed(&[0.0, 30.0]), &[], 1, CollapseSide::Before).unwrap();
        assert_eq!(restored, fixed(&[30.0, 0.0]));
    }

    #[test]
    fn empty_without_memory_is_noop() {
        let ids = ids(2);
        let mut mem = CollapseMemory::new();
        assert_eq!(mem.plan(&ids, &fixed(&[0.0, 100.0]), &[], 1, CollapseSide::Before), None);
        assert_eq!(mem.plan(&ids, &fixed(&[50.0, 50.0]), &[], 0, CollapseSide::Before), None);
        assert_eq!(mem.plan(&ids, &fixed(&[50.0, 50.0]), &[], 2, CollapseSide::After), None);
    }

    #[test]
    fn wildcard_neighbour_absorbs_implicitly() {
        let ids = ids(2);
        let mut mem = CollapseMemory::new();
        let sizes = vec![AreaSize::Fixed(200.0), AreaSize::Wildcard];
        let collapsed = mem.plan(&ids, &sizes, &[200.0, 589.0], 1, CollapseSide::Before).unwrap();
        assert_eq!(collapsed, vec![AreaSize::Fixed(0.0), AreaSize::Wildcard]);
        let restored = mem.plan(&ids, &collapsed, &[0.0, 789.0], 1, CollapseSide::Before).unwrap();
        assert_eq!(restored, sizes);
        // The wildcard itself cannot be collapsed.
        assert_eq!(mem.plan(&ids, &sizes, &[200.0, 589.0], 1, CollapseSide::After), None);
    }

    #[test]
    fn forget_drops_memory() {
        let ids = ids(2);
        let mut mem = CollapseMemory::new();
        mem.plan(&ids, &fixed(&[60.0, 40.0]), &[], 1, CollapseSide::Before);
        assert_eq!(mem.remembered(ids[0]), Some(60.0));
        mem.forget(ids[0]);
        assert_eq!(mem.remembered(ids[0]), None);
    }
}
