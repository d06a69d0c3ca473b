//! Messages routed through the node's event queue.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Pose;
use crate::part::RawDetection;

/// Every input the tour node reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeEvent {
    /// Detections from one logical camera.
    CameraBatch(CameraBatch),
    /// Output of the fiducial-marker detector.
    MarkerBatch(MarkerBatch),
    /// Localization estimate (odometry).
    OdomSample(PoseEstimate),
    /// Terminal result of a previously submitted navigation goal.
    NavResult(NavigationResult),
    /// Periodic driver tick.
    Tick,
    /// Stop the dispatch loop.
    Shutdown,
}

/// One logical-camera message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraBatch {
    /// Sensor tag, `camera1` … `camera5`.
    pub camera: String,
    pub stamp: DateTime<Utc>,
    pub detections: Vec<RawDetection>,
}

/// One marker-detector message. Only the first id is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerBatch {
    pub marker_ids: Vec<i64>,
}

/// Robot pose estimate with its 6×6 covariance (row-major, may be empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    pub pose: Pose,
    #[serde(default)]
    pub covariance: Vec<f64>,
}

impl PoseEstimate {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            covariance: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Navigation
// ────────────────────────────────────────────────────────────────────────────

/// Handle of a goal accepted by the navigation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(pub Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A navigate-to-pose request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationGoal {
    pub frame_id: String,
    pub pose: Pose,
    /// Registry index the goal was issued for.
    pub waypoint_index: usize,
}

/// Terminal outcome of a navigation goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    Succeeded,
    Aborted,
    Canceled,
    Unknown,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultCode::Succeeded => "succeeded",
            ResultCode::Aborted => "aborted",
            ResultCode::Canceled => "canceled",
            ResultCode::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResult {
    pub goal_id: GoalId,
    pub code: ResultCode,
}
