//! `parttour-types` – shared vocabulary of the PartTour workspace.
//!
//! # Modules
//!
//! - [`geometry`] – [`Vec3`], [`Quaternion`], [`Pose`], [`StampedPose`].
//! - [`part`] – part colors and types, [`SemanticKey`], raw and detected
//!   parts.
//! - [`event`] – [`NodeEvent`] and the navigation message types.
//!
//! [`TourError`] is the single error type used across the workspace.

pub mod event;
pub mod geometry;
pub mod part;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use event::{
    CameraBatch, GoalId, MarkerBatch, NavigationGoal, NavigationResult, NodeEvent, PoseEstimate,
    ResultCode,
};
pub use geometry::{Pose, Quaternion, StampedPose, Vec3};
pub use part::{DetectedPart, PartColor, PartType, RawDetection, SemanticKey, UnmappedCode};

/// Name of the common reference frame.
pub const MAP_FRAME: &str = "map";

/// Errors raised anywhere in the tour pipeline. None of them is fatal to a
/// running node; each degrades to "this part / waypoint never resolves".
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TourError {
    #[error("Transform from {source_frame} to {target_frame} unavailable: {reason}")]
    TransformUnavailable {
        target_frame: String,
        source_frame: String,
        reason: String,
    },

    #[error("Unknown sensor source: {0}")]
    UnknownSensorSource(String),

    #[error("Unmapped part {kind} code {code}")]
    UnknownPartCode { kind: String, code: u8 },

    #[error("Navigation server not reachable within {timeout_ms} ms")]
    ServiceUnreachable { timeout_ms: u64 },

    #[error("Navigation goal rejected by server")]
    GoalRejected,

    #[error("Missing configuration entry: {0}")]
    MissingConfigurationEntry(String),

    #[error("Publish failed on {topic}: {details}")]
    PublishFailed { topic: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<UnmappedCode> for TourError {
    fn from(code: UnmappedCode) -> Self {
        TourError::UnknownPartCode {
            kind: code.kind().to_string(),
            code: code.code(),
        }
    }
}
