//! [`WaypointRegistry`] – the ordered list of target slots for the tour.
//!
//! The registry is filled once per process, from the parameters of the first
//! marker id ever seen. Each slot names a part by type and color and starts
//! unresolved; the [matcher][crate::matcher] later gives it the map pose of a
//! matching detected part.

use parttour_types::{Pose, SemanticKey, TourError};
use tracing::{info, warn};

use crate::params::{ParameterSource, WaypointField, waypoint_key};

/// Slots read per discovered marker id.
pub const WAYPOINTS_PER_MARKER: usize = 5;

/// Substituted for a missing `type` parameter.
pub const DEFAULT_TYPE: &str = "default_type";
/// Substituted for a missing `color` parameter.
pub const DEFAULT_COLOR: &str = "default_color";

// ────────────────────────────────────────────────────────────────────────────
// Waypoint
// ────────────────────────────────────────────────────────────────────────────

/// A target slot.
///
/// `key` is `None` when the configured names are not a known color / type,
/// placeholders included; such a slot can never be resolved. Resolution is
/// one-way: once a pose is bound it is never replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    type_name: String,
    color_name: String,
    key: Option<SemanticKey>,
    pose: Option<Pose>,
}

impl Waypoint {
    pub fn new(type_name: impl Into<String>, color_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let color_name = color_name.into();
        let key = SemanticKey::from_names(&color_name, &type_name);
        Self {
            type_name,
            color_name,
            key,
            pose: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn color_name(&self) -> &str {
        &self.color_name
    }

    pub fn key(&self) -> Option<SemanticKey> {
        self.key
    }

    /// Bound map pose, `z` always `0.0`. `None` while unresolved.
    pub fn pose(&self) -> Option<Pose> {
        self.pose
    }

    pub fn is_resolved(&self) -> bool {
        self.pose.is_some()
    }

    /// `true` when this slot targets `key`.
    pub fn targets(&self, key: SemanticKey) -> bool {
        self.key == Some(key)
    }

    /// Bind `pose` projected to the ground. Returns `false`, leaving the
    /// slot untouched, if it was already resolved.
    pub(crate) fn resolve(&mut self, pose: Pose) -> bool {
        if self.pose.is_some() {
            return false;
        }
        self.pose = Some(pose.on_ground());
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WaypointRegistry
// ────────────────────────────────────────────────────────────────────────────

/// Result of [`WaypointRegistry::populate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// `count` slots were appended from the parameters of `marker_id`.
    Populated { marker_id: i64, count: usize },
    /// The registry had already been filled; nothing changed.
    AlreadyPopulated,
}

#[derive(Debug, Default)]
pub struct WaypointRegistry {
    waypoints: Vec<Waypoint>,
    marker_id: Option<i64>,
    populated: bool,
}

impl WaypointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry already holding `waypoints`; [`populate`][Self::populate]
    /// becomes a no-op.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            marker_id: None,
            populated: true,
        }
    }

    /// Read [`WAYPOINTS_PER_MARKER`] `(type, color)` pairs for `marker_id`
    /// and append them as unresolved slots, in slot order.
    ///
    /// Only the first call per registry has any effect. A missing parameter
    /// is replaced by [`DEFAULT_TYPE`] / [`DEFAULT_COLOR`].
    pub fn populate<P: ParameterSource + ?Sized>(
        &mut self,
        marker_id: i64,
        params: &P,
    ) -> PopulateOutcome {
        if self.populated {
            return PopulateOutcome::AlreadyPopulated;
        }
        self.populated = true;
        self.marker_id = Some(marker_id);

        for slot in 0..WAYPOINTS_PER_MARKER {
            let type_name = read_or_default(params, marker_id, slot, WaypointField::Type, DEFAULT_TYPE);
            let color_name =
                read_or_default(params, marker_id, slot, WaypointField::Color, DEFAULT_COLOR);
            self.waypoints.push(Waypoint::new(type_name, color_name));
        }

        info!(marker_id, count = WAYPOINTS_PER_MARKER, "Waypoints loaded for marker");
        PopulateOutcome::Populated {
            marker_id,
            count: WAYPOINTS_PER_MARKER,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub(crate) fn waypoints_mut(&mut self) -> &mut [Waypoint] {
        &mut self.waypoints
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Marker id the registry was populated from.
    pub fn marker_id(&self) -> Option<i64> {
        self.marker_id
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn resolved_count(&self) -> usize {
        self.waypoints.iter().filter(|w| w.is_resolved()).count()
    }

    /// Log the target and state of every slot.
    pub fn log_waypoints(&self) {
        for (index, wp) in self.waypoints.iter().enumerate() {
            let p = wp.pose.unwrap_or_default().position;
            info!(
                index,
                part_type = wp.type_name(),
                color = wp.color_name(),
                resolved = wp.is_resolved(),
                x = p.x,
                y = p.y,
                z = p.z,
                "Waypoint"
            );
        }
    }
}

fn read_or_default<P: ParameterSource + ?Sized>(
    params: &P,
    marker_id: i64,
    slot: usize,
    field: WaypointField,
    default: &str,
) -> String {
    let key = waypoint_key(marker_id, slot, field);
    params.get_string(&key).unwrap_or_else(|| {
        let err = TourError::MissingConfigurationEntry(key);
        warn!(error = %err, default, "Using placeholder");
        default.to_string()
    })
}
