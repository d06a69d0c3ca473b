//! `parttour-perception` – turns camera detections into map-frame parts.
//!
//! # Modules
//!
//! - [`transform`] – [`TfEngine`][transform::TfEngine]: stamped frame tree
//!   behind the [`FrameTransformer`][transform::FrameTransformer] trait.
//! - [`aggregator`] – [`PartAggregator`][aggregator::PartAggregator]:
//!   deduplicates multi-camera detections by semantic key and records each
//!   part's first observed pose in the map frame.

pub mod aggregator;
pub mod transform;

pub use aggregator::{IngestOutcome, PartAggregator, TARGET_PART_COUNT, camera_frame};
pub use transform::{FrameTransformer, TfEngine, TimePoint, Transform3D};
