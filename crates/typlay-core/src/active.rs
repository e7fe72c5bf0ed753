//! Active-region tracking.
//!
//! Exactly one region can own editing focus at a time. The slot lives inside an
//! ownership-clear tracker value owned by the engine - never a module global - and
//! consumers always read the current value through the accessor at use time. Reading
//! through the accessor (instead of holding a captured snapshot across a suspend point) is
//! what makes stale compile results detectable.

use crate::region::RegionKind;

/// The region that currently owns editing focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRegion {
    /// The region flavor.
    pub kind: RegionKind,
    /// Region start, in document character offsets.
    pub from: usize,
    /// Region end (exclusive), in document character offsets.
    pub to: usize,
}

impl ActiveRegion {
    /// Create an active-region identity.
    pub fn new(kind: RegionKind, from: usize, to: usize) -> Self {
        Self { kind, from, to }
    }
}

/// Single mutable slot recording the cursor-active region. Last writer wins; there is no
/// stacking.
///
/// The region-detection caller updates this whenever the cursor enters or leaves a region;
/// every other component treats it as read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveRegionTracker {
    current: Option<ActiveRegion>,
}

impl ActiveRegionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new cursor-active region, overwriting any previous one.
    pub fn activate(&mut self, kind: RegionKind, from: usize, to: usize) {
        self.current = Some(ActiveRegion::new(kind, from, to));
    }

    /// Clear the slot. Idempotent.
    pub fn deactivate(&mut self) {
        self.current = None;
    }

    /// The current active region, if any.
    pub fn current(&self) -> Option<ActiveRegion> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_writer_wins() {
        let mut tracker = ActiveRegionTracker::new();
        assert_eq!(tracker.current(), None);

        tracker.activate(RegionKind::Math, 4, 9);
        tracker.activate(RegionKind::Code, 20, 40);
        assert_eq!(
            tracker.current(),
            Some(ActiveRegion::new(RegionKind::Code, 20, 40))
        );
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut tracker = ActiveRegionTracker::new();
        tracker.activate(RegionKind::Math, 0, 3);
        tracker.deactivate();
        tracker.deactivate();
        assert_eq!(tracker.current(), None);
    }
}
