//! Matcher: binds detected parts to unresolved waypoint slots.
//!
//! Parts are consumed in the order the aggregator recorded them. For each
//! part the registry is scanned front to back and the first unresolved slot
//! with the same [`SemanticKey`] receives the part's pose (height floored to
//! zero). When several slots share a key, registry order decides.
//!
//! A part binds at most one slot over the lifetime of the registry, so
//! repeated runs over unchanged inputs change nothing.

use std::collections::HashSet;

use parttour_types::{DetectedPart, SemanticKey};
use tracing::{debug, info};

use crate::registry::WaypointRegistry;

/// What a [`reconcile`] run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Registry indices resolved by this run, in binding order.
    pub newly_resolved: Vec<usize>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.newly_resolved.is_empty()
    }
}

/// Bind every not-yet-used part to the first free slot targeting its key.
pub fn reconcile(parts: &[DetectedPart], registry: &mut WaypointRegistry) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    // Keys that already own a slot.
    let mut bound: HashSet<SemanticKey> = registry
        .waypoints()
        .iter()
        .filter(|w| w.is_resolved())
        .filter_map(|w| w.key())
        .collect();

    for part in parts {
        debug!(part = %part.key, x = part.pose.position.x, y = part.pose.position.y, z = part.pose.position.z, "Processing detected part");
        if bound.contains(&part.key) {
            continue;
        }

        let slot = registry
            .waypoints_mut()
            .iter_mut()
            .enumerate()
            .find(|(_, w)| w.targets(part.key) && !w.is_resolved());

        if let Some((index, waypoint)) = slot
            && waypoint.resolve(part.pose)
        {
            info!(index, part = %part.key, "Waypoint resolved");
            bound.insert(part.key);
            report.newly_resolved.push(index);
        }
    }

    registry.log_waypoints();
    report
}
