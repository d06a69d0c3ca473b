//! [`SimWorld`] – a scripted environment for headless runs.
//!
//! A world knows where each logical camera is mounted and what every sensor
//! will report. [`SimWorld::install_frames`] writes the camera mounts into a
//! [`TfEngine`]; [`SimWorld::replay`] pushes the odometry sample, the marker
//! reading and the camera batches onto the event queue, in that order.

use std::time::Duration;

use chrono::Utc;
use parttour_perception::{TfEngine, Transform3D, camera_frame};
use parttour_types::{
    CameraBatch, MarkerBatch, NodeEvent, Pose, PoseEstimate, Quaternion, RawDetection, TourError,
    Vec3,
};
use tracing::{debug, info};

use crate::queue::EventSender;

/// Pose of a camera frame in the map frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMount {
    /// Sensor tag, e.g. `camera1`.
    pub camera: String,
    pub position: Vec3,
    pub yaw: f64,
}

/// One camera message to replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedBatch {
    pub camera: String,
    pub detections: Vec<RawDetection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimWorld {
    mounts: Vec<CameraMount>,
    batches: Vec<ScriptedBatch>,
    marker_ids: Vec<i64>,
    odometry: Option<Pose>,
    replay_interval: Duration,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(mut self, camera: impl Into<String>, position: Vec3, yaw: f64) -> Self {
        self.mounts.push(CameraMount {
            camera: camera.into(),
            position,
            yaw,
        });
        self
    }

    pub fn with_batch(mut self, camera: impl Into<String>, detections: Vec<RawDetection>) -> Self {
        self.batches.push(ScriptedBatch {
            camera: camera.into(),
            detections,
        });
        self
    }

    pub fn with_marker_ids(mut self, ids: Vec<i64>) -> Self {
        self.marker_ids = ids;
        self
    }

    pub fn with_odometry(mut self, pose: Pose) -> Self {
        self.odometry = Some(pose);
        self
    }

    /// Pause between replayed messages.
    pub fn with_replay_interval(mut self, interval: Duration) -> Self {
        self.replay_interval = interval;
        self
    }

    pub fn mounts(&self) -> &[CameraMount] {
        &self.mounts
    }

    pub fn batches(&self) -> &[ScriptedBatch] {
        &self.batches
    }

    /// Register every camera mount as a static link under `map_frame`.
    ///
    /// # Errors
    ///
    /// [`TourError::UnknownSensorSource`] for a mount with an unknown tag;
    /// mounts before it are already installed.
    pub fn install_frames(&self, tf: &mut TfEngine, map_frame: &str) -> Result<usize, TourError> {
        for mount in &self.mounts {
            let frame = camera_frame(&mount.camera)?;
            tf.set_static_transform(
                map_frame,
                frame,
                Transform3D::new(mount.position, Quaternion::from_yaw(mount.yaw)),
            );
            debug!(camera = %mount.camera, frame, "Camera frame installed");
        }
        Ok(self.mounts.len())
    }

    /// Push the scripted sensor traffic onto `events`, waiting for queue
    /// space between messages. Returns the number of messages sent.
    pub async fn replay(&self, events: &EventSender) -> Result<usize, TourError> {
        let mut sent = 0;

        if let Some(pose) = self.odometry {
            events.send(NodeEvent::OdomSample(PoseEstimate::new(pose))).await?;
            sent += 1;
            self.pause().await;
        }
        if !self.marker_ids.is_empty() {
            events
                .send(NodeEvent::MarkerBatch(MarkerBatch {
                    marker_ids: self.marker_ids.clone(),
                }))
                .await?;
            sent += 1;
            self.pause().await;
        }
        for batch in &self.batches {
            events
                .send(NodeEvent::CameraBatch(CameraBatch {
                    camera: batch.camera.clone(),
                    stamp: Utc::now(),
                    detections: batch.detections.clone(),
                }))
                .await?;
            sent += 1;
            self.pause().await;
        }

        info!(messages = sent, "Simulated sensor replay finished");
        Ok(sent)
    }

    async fn pause(&self) {
        if !self.replay_interval.is_zero() {
            tokio::time::sleep(self.replay_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::event_queue;
    use parttour_perception::{FrameTransformer, TimePoint};

    fn det(color: u8, part_type: u8) -> RawDetection {
        RawDetection {
            color,
            part_type,
            pose: Pose::from_xyz(1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn install_frames_links_cameras_to_map() {
        let world = SimWorld::new()
            .with_mount("camera1", Vec3::new(2.0, 0.0, 1.0), 0.0)
            .with_mount("camera4", Vec3::new(0.0, 3.0, 1.0), std::f64::consts::FRAC_PI_2);
        let mut tf = TfEngine::new();

        assert_eq!(world.install_frames(&mut tf, "map").unwrap(), 2);
        assert!(tf.can_transform("map", "camera1_frame", TimePoint::Latest));

        // camera4 is yawed 90°, so its +x axis points along map +y.
        let t = tf
            .lookup_transform("map", "camera4_frame", TimePoint::Latest)
            .unwrap();
        let p = t.apply_to_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 4.0).abs() < 1e-9);
        assert!(!tf.can_transform("map", "camera2_frame", TimePoint::Latest));
    }

    #[test]
    fn install_frames_rejects_unknown_camera() {
        let world = SimWorld::new().with_mount("camera7", Vec3::zero(), 0.0);
        let err = world.install_frames(&mut TfEngine::new(), "map").unwrap_err();
        assert_eq!(err, TourError::UnknownSensorSource("camera7".to_string()));
    }

    #[tokio::test]
    async fn replay_sends_odometry_marker_then_batches() {
        let world = SimWorld::new()
            .with_odometry(Pose::from_xyz(0.5, 0.5, 0.0))
            .with_marker_ids(vec![7])
            .with_batch("camera1", vec![det(0, 10)])
            .with_batch("camera2", vec![det(2, 12)]);
        let (tx, mut rx) = event_queue(16);

        assert_eq!(world.replay(&tx).await.unwrap(), 4);
        assert!(matches!(rx.try_recv(), Some(NodeEvent::OdomSample(_))));
        assert!(matches!(rx.try_recv(), Some(NodeEvent::MarkerBatch(m)) if m.marker_ids == vec![7]));
        assert!(matches!(rx.try_recv(), Some(NodeEvent::CameraBatch(b)) if b.camera == "camera1"));
        assert!(matches!(rx.try_recv(), Some(NodeEvent::CameraBatch(b)) if b.camera == "camera2"));
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn replay_waits_for_queue_space() {
        let world = SimWorld::new()
            .with_marker_ids(vec![3])
            .with_batch("camera1", vec![det(0, 10)])
            .with_batch("camera2", vec![det(1, 11)]);
        let (tx, mut rx) = event_queue(1);

        let replay = tokio::spawn(async move { world.replay(&tx).await });
        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }

        assert_eq!(replay.await.unwrap().unwrap(), 3);
        assert_eq!(received.len(), 3);
        assert!(matches!(&received[2], NodeEvent::CameraBatch(b) if b.camera == "camera2"));
    }

    #[tokio::test]
    async fn replay_fails_once_node_stopped() {
        let world = SimWorld::new().with_marker_ids(vec![3]);
        let (tx, rx) = event_queue(4);
        drop(rx);

        let err = world.replay(&tx).await.unwrap_err();
        assert!(matches!(err, TourError::PublishFailed { .. }));
    }

    #[tokio::test]
    async fn empty_world_sends_nothing() {
        let (tx, rx) = event_queue(4);
        assert_eq!(SimWorld::new().replay(&tx).await.unwrap(), 0);
        assert!(rx.is_empty());
    }
}
