//! One-shot initial-pose publication from the first odometry sample.

use chrono::Utc;
use parttour_middleware::InitialPosePublisher;
use parttour_types::{MAP_FRAME, PoseEstimate, StampedPose};
use tracing::{info, warn};

#[derive(Debug)]
pub struct LocalizationBootstrapper {
    frame_id: String,
    initial_pose: Option<StampedPose>,
}

impl Default for LocalizationBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalizationBootstrapper {
    pub fn new() -> Self {
        Self {
            frame_id: MAP_FRAME.to_string(),
            initial_pose: None,
        }
    }

    pub fn with_frame(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }

    pub fn is_set(&self) -> bool {
        self.initial_pose.is_some()
    }

    pub fn initial_pose(&self) -> Option<&StampedPose> {
        self.initial_pose.as_ref()
    }

    /// Accept the first estimate ever seen and publish it as the initial
    /// pose. Returns the published pose, or `None` for every later call.
    ///
    /// The pose is marked as set before publishing; a failed publish is
    /// logged and never retried.
    pub fn on_pose_estimate<P: InitialPosePublisher + ?Sized>(
        &mut self,
        estimate: &PoseEstimate,
        publisher: &P,
    ) -> Option<StampedPose> {
        if self.initial_pose.is_some() {
            return None;
        }

        let stamped = StampedPose {
            frame_id: self.frame_id.clone(),
            stamp: Utc::now(),
            pose: estimate.pose.on_ground(),
        };
        self.initial_pose = Some(stamped.clone());

        let p = stamped.pose.position;
        info!(x = p.x, y = p.y, z = p.z, "Initial pose set");

        if let Err(e) = publisher.publish_initial_pose(&stamped) {
            warn!(error = %e, "Failed to publish initial pose");
        }
        Some(stamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parttour_middleware::SimPosePublisher;
    use parttour_types::Pose;

    #[test]
    fn first_estimate_is_floored_and_published_once() {
        let publisher = SimPosePublisher::new();
        let mut boot = LocalizationBootstrapper::new();

        let first = boot
            .on_pose_estimate(&PoseEstimate::new(Pose::from_xyz(1.5, -2.0, 0.3)), &publisher)
            .unwrap();
        assert_eq!(first.frame_id, "map");
        assert_eq!(first.pose.position.z, 0.0);
        assert!((first.pose.position.x - 1.5).abs() < 1e-9);

        let second = boot.on_pose_estimate(&PoseEstimate::new(Pose::from_xyz(9.0, 9.0, 9.0)), &publisher);
        assert!(second.is_none());

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0], first);
        assert_eq!(boot.initial_pose(), Some(&first));
    }

    #[test]
    fn failed_publish_is_not_retried() {
        let publisher = SimPosePublisher::new();
        publisher.set_available(false);
        let mut boot = LocalizationBootstrapper::new();

        assert!(boot
            .on_pose_estimate(&PoseEstimate::new(Pose::from_xyz(1.0, 1.0, 0.0)), &publisher)
            .is_some());
        assert!(boot.is_set());

        publisher.set_available(true);
        assert!(boot
            .on_pose_estimate(&PoseEstimate::new(Pose::from_xyz(1.0, 1.0, 0.0)), &publisher)
            .is_none());
        assert!(publisher.published().is_empty());
    }
}
