//! Single-consumer event queue feeding the tour node.
//!
//! Every input stream (cameras, marker detector, odometry, navigation
//! results, timer) is multiplexed onto one bounded [`tokio::sync::mpsc`]
//! channel. The node is the only consumer, so handlers never run
//! concurrently and the state they share needs no locking.
//!
//! [`EventSender`] is cheap to clone and can be handed to producers running
//! on other tasks or plain threads (e.g. a Ctrl-C handler).

use chrono::Utc;
use parttour_types::{
    CameraBatch, GoalId, MarkerBatch, NavigationResult, NodeEvent, RawDetection, ResultCode,
    TourError,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default channel capacity (events buffered before producers see
/// back-pressure).
pub const DEFAULT_CAPACITY: usize = 256;

/// Create a connected sender / receiver pair holding up to `capacity` events.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer handle.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<NodeEvent>,
}

impl EventSender {
    /// Enqueue `event` without waiting.
    ///
    /// # Errors
    ///
    /// [`TourError::PublishFailed`] when the queue is full or the node has
    /// stopped.
    pub fn publish(&self, event: NodeEvent) -> Result<(), TourError> {
        self.tx.try_send(event).map_err(|e| {
            let details = match e {
                TrySendError::Full(_) => "queue full",
                TrySendError::Closed(_) => "node stopped",
            };
            TourError::PublishFailed {
                topic: "event_queue".to_string(),
                details: details.to_string(),
            }
        })
    }

    /// Enqueue `event`, waiting for space if the queue is full.
    pub async fn send(&self, event: NodeEvent) -> Result<(), TourError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| TourError::PublishFailed {
                topic: "event_queue".to_string(),
                details: "node stopped".to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Convenience constructors
    // -----------------------------------------------------------------------

    /// Publish a logical-camera batch stamped now.
    pub fn camera_batch(
        &self,
        camera: impl Into<String>,
        detections: Vec<RawDetection>,
    ) -> Result<(), TourError> {
        self.publish(NodeEvent::CameraBatch(CameraBatch {
            camera: camera.into(),
            stamp: Utc::now(),
            detections,
        }))
    }

    pub fn marker_ids(&self, marker_ids: Vec<i64>) -> Result<(), TourError> {
        self.publish(NodeEvent::MarkerBatch(MarkerBatch { marker_ids }))
    }

    pub fn nav_result(&self, goal_id: GoalId, code: ResultCode) -> Result<(), TourError> {
        self.publish(NodeEvent::NavResult(NavigationResult { goal_id, code }))
    }

    pub fn shutdown(&self) -> Result<(), TourError> {
        self.publish(NodeEvent::Shutdown)
    }
}

/// Consumer handle, owned by the node.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<NodeEvent>,
}

impl EventReceiver {
    /// Wait for the next event. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<NodeEvent> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<NodeEvent> {
        self.rx.try_recv().ok()
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parttour_types::{Pose, PoseEstimate};

    #[tokio::test]
    async fn events_arrive_in_publish_order() -> Result<(), Box<dyn std::error::Error>> {
        let (tx, mut rx) = event_queue(8);
        tx.marker_ids(vec![7])?;
        tx.publish(NodeEvent::Tick)?;
        tx.publish(NodeEvent::OdomSample(PoseEstimate::new(Pose::from_xyz(1.0, 2.0, 0.1))))?;

        assert!(matches!(rx.recv().await, Some(NodeEvent::MarkerBatch(_))));
        assert!(matches!(rx.recv().await, Some(NodeEvent::Tick)));
        match rx.recv().await {
            Some(NodeEvent::OdomSample(est)) => assert!((est.pose.position.x - 1.0).abs() < 1e-9),
            other => panic!("expected OdomSample, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn publish_on_full_queue_returns_error() {
        let (tx, _rx) = event_queue(1);
        assert!(tx.publish(NodeEvent::Tick).is_ok());
        let err = tx.publish(NodeEvent::Tick).unwrap_err();
        assert!(err.to_string().contains("queue full"));
    }

    #[test]
    fn publish_after_receiver_dropped_returns_error() {
        let (tx, rx) = event_queue(4);
        drop(rx);
        let err = tx.shutdown().unwrap_err();
        assert!(err.to_string().contains("node stopped"));
    }

    #[tokio::test]
    async fn clones_share_the_same_queue() {
        let (tx, mut rx) = event_queue(4);
        let tx2 = tx.clone();
        tx.camera_batch("camera1", Vec::new()).unwrap();
        tx2.nav_result(GoalId::new(), ResultCode::Succeeded).unwrap();

        assert_eq!(rx.len(), 2);
        assert!(matches!(rx.try_recv(), Some(NodeEvent::CameraBatch(_))));
        assert!(matches!(rx.try_recv(), Some(NodeEvent::NavResult(_))));
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn recv_returns_none_when_all_senders_dropped() {
        let (tx, mut rx) = event_queue(4);
        tx.publish(NodeEvent::Tick).unwrap();
        drop(tx);
        assert!(matches!(rx.recv().await, Some(NodeEvent::Tick)));
        assert!(rx.recv().await.is_none());
    }
}
