//! Part Observation Aggregator.
//!
//! Folds logical-camera batches from any number of sensors into one canonical
//! list of [`DetectedPart`]s in the map frame, keyed by [`SemanticKey`].
//!
//! - The first observation of a key wins; later observations of the same key
//!   are dropped, never merged or overwritten.
//! - A batch whose sensor frame cannot be transformed into the map frame is
//!   abandoned as a whole.
//! - Once `target_count` distinct parts are known the aggregator stops
//!   listening for good, including the rest of the batch that completed it.
//!
//! # Example
//!
//! ```rust
//! use parttour_perception::aggregator::{IngestOutcome, PartAggregator};
//! use parttour_perception::transform::{TfEngine, Transform3D};
//! use parttour_types::{Pose, RawDetection};
//!
//! let mut tf = TfEngine::new();
//! tf.set_static_transform("map", "camera1_frame", Transform3D::identity());
//!
//! let mut parts = PartAggregator::new(5);
//! let batch = [RawDetection { color: 2, part_type: 10, pose: Pose::from_xyz(1.0, 0.0, 0.0) }];
//! let outcome = parts.ingest(&batch, "camera1_frame", &tf).unwrap();
//! assert_eq!(outcome, IngestOutcome::Accepted { added: 1 });
//! assert_eq!(parts.detected_count(), 1);
//! ```

use std::collections::HashSet;

use parttour_types::{DetectedPart, MAP_FRAME, RawDetection, SemanticKey, TourError};
use tracing::{debug, error, info, warn};

use crate::transform::{FrameTransformer, TimePoint};

/// Number of distinct parts after which the cameras are ignored.
pub const TARGET_PART_COUNT: usize = 5;

/// Camera sensor tags and the frames their detections are expressed in.
pub const CAMERA_FRAMES: [(&str, &str); 5] = [
    ("camera1", "camera1_frame"),
    ("camera2", "camera2_frame"),
    ("camera3", "camera3_frame"),
    ("camera4", "camera4_frame"),
    ("camera5", "camera5_frame"),
];

/// Resolve a camera tag to its frame id.
pub fn camera_frame(camera: &str) -> Result<&'static str, TourError> {
    CAMERA_FRAMES
        .iter()
        .find(|(tag, _)| *tag == camera)
        .map(|(_, frame)| *frame)
        .ok_or_else(|| TourError::UnknownSensorSource(camera.to_string()))
}

/// Result of feeding one batch to [`PartAggregator::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The batch was processed and `added` new parts were recorded.
    Accepted { added: usize },
    /// This batch brought the count to the target; listening has stopped.
    Completed { added: usize },
    /// The aggregator had already stopped listening.
    Ignored,
}

impl IngestOutcome {
    pub fn added(self) -> usize {
        match self {
            IngestOutcome::Accepted { added } | IngestOutcome::Completed { added } => added,
            IngestOutcome::Ignored => 0,
        }
    }
}

/// Deduplicating accumulator of camera detections.
#[derive(Debug)]
pub struct PartAggregator {
    /// Insertion order is the order the matcher consumes parts in.
    parts: Vec<DetectedPart>,
    known: HashSet<SemanticKey>,
    target_count: usize,
    map_frame: String,
    listening: bool,
}

impl Default for PartAggregator {
    fn default() -> Self {
        Self::new(TARGET_PART_COUNT)
    }
}

impl PartAggregator {
    pub fn new(target_count: usize) -> Self {
        Self {
            parts: Vec::new(),
            known: HashSet::new(),
            target_count,
            map_frame: MAP_FRAME.to_string(),
            listening: target_count > 0,
        }
    }

    /// Use `frame` instead of `map` as the common frame.
    pub fn with_map_frame(mut self, frame: impl Into<String>) -> Self {
        self.map_frame = frame.into();
        self
    }

    /// Fold one camera batch, expressed in `frame_id`, into the canonical list.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::TransformUnavailable`] when `frame_id` cannot be
    /// transformed into the map frame; no detection of the batch is recorded.
    pub fn ingest<T: FrameTransformer + ?Sized>(
        &mut self,
        detections: &[RawDetection],
        frame_id: &str,
        transformer: &T,
    ) -> Result<IngestOutcome, TourError> {
        if !self.listening {
            return Ok(IngestOutcome::Ignored);
        }
        if detections.is_empty() {
            return Ok(IngestOutcome::Accepted { added: 0 });
        }

        let to_map = transformer
            .lookup_transform(&self.map_frame, frame_id, TimePoint::Latest)
            .inspect_err(|e| {
                warn!(frame = frame_id, error = %e, "Failed to transform batch to map frame; batch dropped");
            })?;

        let mut added = 0;
        for detection in detections {
            let key = match SemanticKey::from_codes(detection.color, detection.part_type) {
                Ok(key) => key,
                Err(unmapped) => {
                    error!(frame = frame_id, error = %TourError::from(unmapped), "Detection skipped");
                    continue;
                }
            };

            if !self.known.insert(key) {
                continue;
            }

            let pose = to_map.apply_to_pose(detection.pose);
            debug!(part = %key, frame = frame_id, x = pose.position.x, y = pose.position.y, z = pose.position.z, "new part detected");
            self.parts.push(DetectedPart { key, pose });
            added += 1;

            if self.parts.len() >= self.target_count {
                self.listening = false;
                self.log_all_parts();
                return Ok(IngestOutcome::Completed { added });
            }
        }

        Ok(IngestOutcome::Accepted { added })
    }

    pub fn parts(&self) -> &[DetectedPart] {
        &self.parts
    }

    pub fn get(&self, key: SemanticKey) -> Option<&DetectedPart> {
        self.parts.iter().find(|p| p.key == key)
    }

    pub fn detected_count(&self) -> usize {
        self.parts.len()
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// `false` once the target count has been reached.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    fn log_all_parts(&self) {
        for part in &self.parts {
            let p = part.pose.position;
            info!(
                color = %part.key.color,
                part_type = %part.key.part_type,
                x = p.x,
                y = p.y,
                z = p.z,
                "Part detected"
            );
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
