//! Transform Frame (TF) Engine.
//!
//! Maintains a tree of named reference frames. Every frame except a root has
//! exactly one parent and a link holding the pose of the child in the parent
//! frame, either static or as a short time-stamped history. Lookups walk the
//! tree in both directions, inverting links when moving from child to
//! parent, and compose the result.
//!
//! Samples are never interpolated: a lookup at a time point uses the newest
//! sample at or before it and fails when the time point falls outside the
//! retained history.
//!
//! # Example
//!
//! ```rust
//! use parttour_perception::transform::{FrameTransformer, TfEngine, TimePoint, Transform3D};
//! use parttour_types::{Quaternion, Vec3};
//!
//! let mut tf = TfEngine::new();
//! tf.set_static_transform("map", "odom",
//!     Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()));
//! tf.set_static_transform("map", "camera1_frame",
//!     Transform3D::new(Vec3::new(0.0, 2.0, 1.0), Quaternion::identity()));
//!
//! // camera1_frame expressed in odom: up one link, down the other.
//! let t = tf.lookup_transform("odom", "camera1_frame", TimePoint::Latest).unwrap();
//! assert!((t.translation.x + 1.0).abs() < 1e-9);
//! assert!((t.translation.y - 2.0).abs() < 1e-9);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use parttour_types::{Pose, Quaternion, TourError, Vec3};

/// History retained per dynamic link unless configured otherwise.
pub const DEFAULT_CACHE_SECS: i64 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by `rotation` then add
/// `translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform3D {
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translation = self.translation + self.rotation.rotate(other.translation);
        let rotation = (self.rotation * other.rotation).normalized();
        Self::new(translation, rotation)
    }

    /// T_A_B → T_B_A.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.conjugate();
        Self::new(-rotation.rotate(self.translation), rotation)
    }

    pub fn apply_to_point(self, p: Vec3) -> Vec3 {
        self.translation + self.rotation.rotate(p)
    }

    /// Re-express a pose given in frame B in frame A.
    pub fn apply_to_pose(self, pose: Pose) -> Pose {
        Pose::new(
            self.apply_to_point(pose.position),
            (self.rotation * pose.orientation).normalized(),
        )
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FrameTransformer
// ────────────────────────────────────────────────────────────────────────────

/// Which sample of a time-varying link a lookup should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePoint {
    /// The newest sample of every link.
    Latest,
    At(DateTime<Utc>),
}

/// Source of frame-to-frame transforms.
///
/// `lookup_transform(target, source, time)` returns the transform that maps
/// poses expressed in `source_frame` into `target_frame`, or
/// [`TourError::TransformUnavailable`].
pub trait FrameTransformer: Send + Sync {
    fn lookup_transform(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: TimePoint,
    ) -> Result<Transform3D, TourError>;

    fn can_transform(&self, target_frame: &str, source_frame: &str, time: TimePoint) -> bool {
        self.lookup_transform(target_frame, source_frame, time)
            .is_ok()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TfEngine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum LinkHistory {
    Static(Transform3D),
    /// Sorted by stamp, oldest first.
    Dynamic(VecDeque<(DateTime<Utc>, Transform3D)>),
}

#[derive(Debug, Clone)]
struct FrameLink {
    parent: String,
    history: LinkHistory,
}

/// In-process frame tree implementing [`FrameTransformer`].
#[derive(Debug)]
pub struct TfEngine {
    /// `links[child]` = link to its parent.
    links: HashMap<String, FrameLink>,
    cache: TimeDelta,
}

impl Default for TfEngine {
    fn default() -> Self {
        Self::with_cache_secs(DEFAULT_CACHE_SECS)
    }
}

impl TfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that keeps `secs` seconds of history per dynamic link.
    pub fn with_cache_secs(secs: i64) -> Self {
        let fallback = TimeDelta::try_seconds(DEFAULT_CACHE_SECS).unwrap_or_default();
        Self {
            links: HashMap::new(),
            cache: TimeDelta::try_seconds(secs.max(0)).unwrap_or(fallback),
        }
    }

    /// Register a transform that never changes. Replaces any previous link
    /// of `child_frame`.
    pub fn set_static_transform(&mut self, parent_frame: &str, child_frame: &str, transform: Transform3D) {
        self.links.insert(
            child_frame.to_string(),
            FrameLink {
                parent: parent_frame.to_string(),
                history: LinkHistory::Static(transform),
            },
        );
    }

    /// Record a time-stamped sample of the pose of `child_frame` in
    /// `parent_frame`.
    ///
    /// Re-parenting a frame, or turning a static link dynamic, discards the
    /// previous history. Samples older than the cache window relative to the
    /// newest sample are pruned.
    pub fn set_transform(
        &mut self,
        parent_frame: &str,
        child_frame: &str,
        transform: Transform3D,
        stamp: DateTime<Utc>,
    ) {
        let link = self
            .links
            .entry(child_frame.to_string())
            .or_insert_with(|| FrameLink {
                parent: parent_frame.to_string(),
                history: LinkHistory::Dynamic(VecDeque::new()),
            });

        if link.parent != parent_frame || matches!(link.history, LinkHistory::Static(_)) {
            link.parent = parent_frame.to_string();
            link.history = LinkHistory::Dynamic(VecDeque::new());
        }

        let LinkHistory::Dynamic(samples) = &mut link.history else {
            return;
        };
        let pos = samples.partition_point(|(s, _)| *s <= stamp);
        samples.insert(pos, (stamp, transform));

        if let Some(&(newest, _)) = samples.back()
            && let Some(horizon) = newest.checked_sub_signed(self.cache)
        {
            while samples.front().is_some_and(|(s, _)| *s < horizon) {
                samples.pop_front();
            }
        }
    }

    /// `true` when `frame` appears in the tree as a child or a parent.
    pub fn has_frame(&self, frame: &str) -> bool {
        self.links.contains_key(frame) || self.links.values().any(|l| l.parent == frame)
    }

    /// Frame names along the tree path from `from` to `to`, both included.
    fn path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut came_from: HashMap<String, String> = HashMap::new();

        queue.push_back(from.to_string());
        visited.insert(from.to_string());

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![current.clone()];
                let mut cursor = current;
                while let Some(prev) = came_from.get(&cursor) {
                    path.push(prev.clone());
                    cursor = prev.clone();
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbours(&current) {
                if visited.insert(next.clone()) {
                    came_from.insert(next.clone(), current.clone());
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn neighbours(&self, frame: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .links
            .iter()
            .filter(|(_, link)| link.parent == frame)
            .map(|(child, _)| child.clone())
            .collect();
        if let Some(link) = self.links.get(frame) {
            out.push(link.parent.clone());
        }
        out
    }

    /// T_parent_child of `child`'s link at `time`.
    fn sample(&self, child: &str, time: TimePoint) -> Result<Transform3D, String> {
        let link = self
            .links
            .get(child)
            .ok_or_else(|| format!("frame {child} has no parent link"))?;
        match (&link.history, time) {
            (LinkHistory::Static(t), _) => Ok(*t),
            (LinkHistory::Dynamic(samples), TimePoint::Latest) => samples
                .back()
                .map(|(_, t)| *t)
                .ok_or_else(|| format!("no samples for {} -> {child}", link.parent)),
            (LinkHistory::Dynamic(samples), TimePoint::At(at)) => {
                let (Some((oldest, _)), Some((newest, _))) = (samples.front(), samples.back())
                else {
                    return Err(format!("no samples for {} -> {child}", link.parent));
                };
                if at < *oldest {
                    return Err(format!(
                        "lookup would require extrapolation into the past: requested {at}, oldest data {oldest}"
                    ));
                }
                if at > *newest {
                    return Err(format!(
                        "lookup would require extrapolation into the future: requested {at}, newest data {newest}"
                    ));
                }
                samples
                    .iter()
                    .rev()
                    .find(|(s, _)| *s <= at)
                    .map(|(_, t)| *t)
                    .ok_or_else(|| format!("no sample at or before {at}"))
            }
        }
    }
}

impl FrameTransformer for TfEngine {
    fn lookup_transform(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: TimePoint,
    ) -> Result<Transform3D, TourError> {
        let unavailable = |reason: String| TourError::TransformUnavailable {
            target_frame: target_frame.to_string(),
            source_frame: source_frame.to_string(),
            reason,
        };

        if target_frame == source_frame {
            return Ok(Transform3D::identity());
        }
        for frame in [target_frame, source_frame] {
            if !self.has_frame(frame) {
                return Err(unavailable(format!("frame {frame} does not exist")));
            }
        }

        let path = self.path(target_frame, source_frame).ok_or_else(|| {
            unavailable(format!(
                "frames {target_frame} and {source_frame} are not part of the same tree"
            ))
        })?;

        // Walk target → source accumulating T_target_current.
        let mut accumulated = Transform3D::identity();
        for pair in path.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            let step = match self.links.get(next.as_str()) {
                // Moving down: `next` is a child of `current`.
                Some(link) if link.parent == *current => self.sample(next, time),
                // Moving up: `current` is a child of `next`.
                _ => self.sample(current, time).map(Transform3D::inverse),
            }
            .map_err(&unavailable)?;
            accumulated = accumulated.compose(step);
        }
        Ok(accumulated)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn shift(x: f64, y: f64, z: f64) -> Transform3D {
        Transform3D::new(Vec3::new(x, y, z), Quaternion::identity())
    }

    // ── Transform3D ─────────────────────────────────────────────────────────

    #[test]
    fn compose_translations_add() {
        let composed = shift(1.0, 0.0, 0.0).compose(shift(2.0, 0.0, 0.0));
        assert!((composed.translation.x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Transform3D::new(Vec3::new(1.0, -2.0, 0.5), Quaternion::from_yaw(0.7));
        let round = t.compose(t.inverse());
        assert!(round.translation.x.abs() < 1e-9);
        assert!(round.translation.y.abs() < 1e-9);
        assert!(round.translation.z.abs() < 1e-9);
        assert!((round.rotation.w.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn apply_to_pose_rotates_position_and_orientation() {
        let t = Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::from_yaw(FRAC_PI_2));
        let pose = t.apply_to_pose(Pose::from_xyz(1.0, 0.0, 0.3));
        assert!((pose.position.x - 1.0).abs() < 1e-9, "x={}", pose.position.x);
        assert!((pose.position.y - 1.0).abs() < 1e-9, "y={}", pose.position.y);
        assert!((pose.position.z - 0.3).abs() < 1e-9);
        assert!((pose.orientation.yaw() - FRAC_PI_2).abs() < 1e-9);
    }

    // ── TfEngine ────────────────────────────────────────────────────────────

    #[test]
    fn lookup_same_frame_returns_identity() {
        let tf = TfEngine::new();
        let t = tf.lookup_transform("map", "map", TimePoint::Latest).unwrap();
        assert_eq!(t, Transform3D::identity());
    }

    #[test]
    fn lookup_direct_child() {
        let mut tf = TfEngine::new();
        tf.set_static_transform("map", "camera1_frame", shift(1.0, 2.0, 3.0));
        let t = tf
            .lookup_transform("map", "camera1_frame", TimePoint::Latest)
            .unwrap();
        assert!((t.translation.x - 1.0).abs() < 1e-9);
        assert!((t.translation.z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn lookup_upward_inverts_link() {
        let mut tf = TfEngine::new();
        tf.set_static_transform("map", "camera1_frame", shift(1.0, 2.0, 3.0));
        let t = tf
            .lookup_transform("camera1_frame", "map", TimePoint::Latest)
            .unwrap();
        assert!((t.translation.x + 1.0).abs() < 1e-9);
        assert!((t.translation.y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn lookup_respects_rotation_in_chain() {
        // base_link at the map origin yawed 90°, camera 1 m ahead of it.
        let mut tf = TfEngine::new();
        tf.set_static_transform(
            "map",
            "base_link",
            Transform3D::new(Vec3::zero(), Quaternion::from_yaw(FRAC_PI_2)),
        );
        tf.set_static_transform("base_link", "camera", shift(1.0, 0.0, 0.0));

        let t = tf.lookup_transform("map", "camera", TimePoint::Latest).unwrap();
        assert!(t.translation.x.abs() < 1e-9, "x={}", t.translation.x);
        assert!((t.translation.y - 1.0).abs() < 1e-9, "y={}", t.translation.y);
    }

    #[test]
    fn disconnected_frames_are_unavailable() {
        let mut tf = TfEngine::new();
        tf.set_static_transform("map", "odom", shift(0.0, 0.0, 0.0));
        tf.set_static_transform("world", "camera2_frame", shift(0.0, 0.0, 0.0));

        let err = tf
            .lookup_transform("map", "camera2_frame", TimePoint::Latest)
            .unwrap_err();
        assert!(matches!(err, TourError::TransformUnavailable { .. }));
        assert!(!tf.can_transform("map", "ghost_frame", TimePoint::Latest));
    }

    #[test]
    fn set_static_transform_overrides_previous() {
        let mut tf = TfEngine::new();
        tf.set_static_transform("map", "sensor", shift(1.0, 0.0, 0.0));
        tf.set_static_transform("map", "sensor", shift(5.0, 0.0, 0.0));
        let t = tf.lookup_transform("map", "sensor", TimePoint::Latest).unwrap();
        assert!((t.translation.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn dynamic_lookup_picks_newest_sample_at_or_before() {
        let mut tf = TfEngine::new();
        tf.set_transform("map", "base_link", shift(1.0, 0.0, 0.0), at(0));
        tf.set_transform("map", "base_link", shift(2.0, 0.0, 0.0), at(2));

        let mid = tf
            .lookup_transform("map", "base_link", TimePoint::At(at(1)))
            .unwrap();
        assert!((mid.translation.x - 1.0).abs() < 1e-9);

        let latest = tf
            .lookup_transform("map", "base_link", TimePoint::Latest)
            .unwrap();
        assert!((latest.translation.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn lookup_outside_history_fails() {
        let mut tf = TfEngine::with_cache_secs(5);
        tf.set_transform("map", "base_link", shift(1.0, 0.0, 0.0), at(0));
        tf.set_transform("map", "base_link", shift(2.0, 0.0, 0.0), at(10));

        // The first sample fell out of the 5 s window.
        let past = tf.lookup_transform("map", "base_link", TimePoint::At(at(2)));
        assert!(past.is_err());

        let future = tf.lookup_transform("map", "base_link", TimePoint::At(at(11)));
        match future {
            Err(TourError::TransformUnavailable { reason, .. }) => {
                assert!(reason.contains("future"), "reason: {reason}")
            }
            other => panic!("expected TransformUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn out_of_order_samples_are_kept_sorted() {
        let mut tf = TfEngine::new();
        tf.set_transform("map", "base_link", shift(3.0, 0.0, 0.0), at(3));
        tf.set_transform("map", "base_link", shift(1.0, 0.0, 0.0), at(1));

        let latest = tf
            .lookup_transform("map", "base_link", TimePoint::Latest)
            .unwrap();
        assert!((latest.translation.x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn reparenting_replaces_link() {
        let mut tf = TfEngine::new();
        tf.set_static_transform("map", "camera1_frame", shift(1.0, 0.0, 0.0));
        tf.set_transform("odom", "camera1_frame", shift(0.0, 1.0, 0.0), at(0));
        assert!(!tf.can_transform("map", "camera1_frame", TimePoint::Latest));
        assert!(tf.can_transform("odom", "camera1_frame", TimePoint::Latest));
    }
}
