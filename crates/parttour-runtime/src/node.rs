//! [`TourNode`] – the single actor that owns all tour state.
//!
//! Every input reaches the node as a [`NodeEvent`] on one queue. Handlers
//! run to completion one at a time, so the aggregator, registry, sequencer
//! and bootstrapper are plain owned fields.
//!
//! # Event handling
//!
//! | Event | Effect |
//! |---|---|
//! | `CameraBatch` | aggregate detections; match any new parts, then poll the sequencer |
//! | `MarkerBatch` | first non-empty batch populates the registry; later ones are ignored |
//! | `OdomSample` | first sample becomes the published initial pose |
//! | `NavResult` | advance or stall the sequencer |
//! | `Tick` | poll the sequencer |
//! | `Shutdown` | log a summary and stop |

use std::ops::ControlFlow;
use std::time::Duration;

use parttour_middleware::{EventReceiver, InitialPosePublisher, NavigationClient};
use parttour_mission::{ParameterStore, PopulateOutcome, WaypointRegistry, reconcile};
use parttour_perception::{FrameTransformer, IngestOutcome, PartAggregator, TARGET_PART_COUNT, camera_frame};
use parttour_types::{
    CameraBatch, GoalId, MAP_FRAME, MarkerBatch, NavigationResult, NodeEvent, PoseEstimate,
    TourError,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use crate::localization::LocalizationBootstrapper;
use crate::sequencer::{DEFAULT_SERVER_TIMEOUT, DEFAULT_TOUR_LENGTH, NavigationSequencer, SequencerState};

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for [`TourNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSettings {
    /// Period of the synthesized [`NodeEvent::Tick`].
    pub tick_period: Duration,
    /// How long a goal submission waits for the navigation server.
    pub server_timeout: Duration,
    /// Distinct parts after which the cameras are ignored.
    pub target_part_count: usize,
    /// Maximum number of waypoints visited.
    pub tour_length: usize,
    pub map_frame: String,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            server_timeout: DEFAULT_SERVER_TIMEOUT,
            target_part_count: TARGET_PART_COUNT,
            tour_length: DEFAULT_TOUR_LENGTH,
            map_frame: MAP_FRAME.to_string(),
        }
    }
}

/// Point-in-time summary of the node.
#[derive(Debug, Clone, PartialEq)]
pub struct TourStatus {
    pub parts_detected: usize,
    pub target_part_count: usize,
    pub cameras_listening: bool,
    pub marker_id: Option<i64>,
    pub waypoints: usize,
    pub waypoints_resolved: usize,
    pub cursor: usize,
    pub state: SequencerState,
    pub initial_pose_set: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// TourNode
// ─────────────────────────────────────────────────────────────────────────────

pub struct TourNode<T, N, P> {
    settings: NodeSettings,
    params: ParameterStore,
    aggregator: PartAggregator,
    registry: WaypointRegistry,
    sequencer: NavigationSequencer,
    bootstrapper: LocalizationBootstrapper,
    marker_gate_open: bool,
    transformer: T,
    navigator: N,
    publisher: P,
}

impl<T, N, P> TourNode<T, N, P>
where
    T: FrameTransformer,
    N: NavigationClient,
    P: InitialPosePublisher,
{
    pub fn new(
        settings: NodeSettings,
        params: ParameterStore,
        transformer: T,
        navigator: N,
        publisher: P,
    ) -> Self {
        let aggregator =
            PartAggregator::new(settings.target_part_count).with_map_frame(settings.map_frame.clone());
        let sequencer = NavigationSequencer::new(settings.tour_length, settings.server_timeout)
            .with_frame(settings.map_frame.clone());
        let bootstrapper = LocalizationBootstrapper::new().with_frame(settings.map_frame.clone());
        Self {
            settings,
            params,
            aggregator,
            registry: WaypointRegistry::new(),
            sequencer,
            bootstrapper,
            marker_gate_open: true,
            transformer,
            navigator,
            publisher,
        }
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn aggregator(&self) -> &PartAggregator {
        &self.aggregator
    }

    pub fn registry(&self) -> &WaypointRegistry {
        &self.registry
    }

    pub fn sequencer(&self) -> &NavigationSequencer {
        &self.sequencer
    }

    pub fn bootstrapper(&self) -> &LocalizationBootstrapper {
        &self.bootstrapper
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    pub fn status(&self) -> TourStatus {
        TourStatus {
            parts_detected: self.aggregator.detected_count(),
            target_part_count: self.aggregator.target_count(),
            cameras_listening: self.aggregator.is_listening(),
            marker_id: self.registry.marker_id(),
            waypoints: self.registry.len(),
            waypoints_resolved: self.registry.resolved_count(),
            cursor: self.sequencer.cursor(),
            state: self.sequencer.state(),
            initial_pose_set: self.bootstrapper.is_set(),
        }
    }

    /// Consume events until [`NodeEvent::Shutdown`] arrives or every sender
    /// is gone, synthesizing a tick every `tick_period`.
    pub async fn run(&mut self, mut events: EventReceiver) -> TourStatus {
        let mut ticker = tokio::time::interval(self.settings.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick_ms = self.settings.tick_period.as_millis() as u64, "Tour node running");
        loop {
            let event = tokio::select! {
                received = events.recv() => match received {
                    Some(event) => event,
                    None => {
                        info!("Event queue closed");
                        break;
                    }
                },
                _ = ticker.tick() => NodeEvent::Tick,
            };
            if self.handle(event).await.is_break() {
                break;
            }
        }
        self.status()
    }

    /// Dispatch one event. Returns `Break` after a shutdown request.
    pub async fn handle(&mut self, event: NodeEvent) -> ControlFlow<()> {
        match event {
            NodeEvent::CameraBatch(batch) => self.on_camera_batch(batch).await,
            NodeEvent::MarkerBatch(batch) => self.on_marker_batch(batch),
            NodeEvent::OdomSample(estimate) => self.on_odometry(&estimate),
            NodeEvent::NavResult(result) => self.on_nav_result(result).await,
            NodeEvent::Tick => self.on_tick().await,
            NodeEvent::Shutdown => {
                self.log_summary();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // ── handlers ────────────────────────────────────────────────────────────

    #[instrument(skip_all, fields(camera = %batch.camera, detections = batch.detections.len()))]
    async fn on_camera_batch(&mut self, batch: CameraBatch) {
        let frame = match camera_frame(&batch.camera) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Camera batch from unknown sensor dropped");
                return;
            }
        };

        let outcome = match self.aggregator.ingest(&batch.detections, frame, &self.transformer) {
            Ok(outcome) => outcome,
            // Already logged by the aggregator.
            Err(_) => return,
        };

        let added = outcome.added();
        match outcome {
            IngestOutcome::Ignored => return,
            IngestOutcome::Completed { .. } => {
                info!(added, total = self.aggregator.detected_count(), "All target parts detected; cameras released");
            }
            IngestOutcome::Accepted { .. } => {
                debug!(added, total = self.aggregator.detected_count(), "Camera batch ingested");
            }
        }
        if added > 0 && !self.registry.is_empty() {
            reconcile(self.aggregator.parts(), &mut self.registry);
        }
        self.poll_sequencer().await;
    }

    fn on_marker_batch(&mut self, batch: MarkerBatch) {
        if !self.marker_gate_open {
            return;
        }
        let Some(&marker_id) = batch.marker_ids.first() else {
            return;
        };
        self.marker_gate_open = false;
        info!(marker_id, "Marker detected");

        if let PopulateOutcome::Populated { .. } = self.registry.populate(marker_id, &self.params) {
            reconcile(self.aggregator.parts(), &mut self.registry);
        }
    }

    fn on_odometry(&mut self, estimate: &PoseEstimate) {
        self.bootstrapper.on_pose_estimate(estimate, &self.publisher);
    }

    #[instrument(skip_all, fields(goal = %result.goal_id, code = %result.code))]
    async fn on_nav_result(&mut self, result: NavigationResult) {
        let outcome = self
            .sequencer
            .on_result(result, &self.registry, &self.navigator)
            .await;
        log_submission(outcome);
    }

    async fn on_tick(&mut self) {
        self.poll_sequencer().await;
    }

    async fn poll_sequencer(&mut self) {
        let outcome = self.sequencer.tick(&self.registry, &self.navigator).await;
        log_submission(outcome);
    }

    fn log_summary(&self) {
        let s = self.status();
        info!(
            parts_detected = s.parts_detected,
            target_part_count = s.target_part_count,
            marker_id = ?s.marker_id,
            waypoints = s.waypoints,
            waypoints_resolved = s.waypoints_resolved,
            cursor = s.cursor,
            state = s.state.name(),
            initial_pose_set = s.initial_pose_set,
            "Tour node shutting down"
        );
    }
}

fn log_submission(outcome: Result<Option<GoalId>, TourError>) {
    match outcome {
        Ok(Some(goal_id)) => debug!(goal = %goal_id, "Navigation goal accepted"),
        Ok(None) => {}
        // The sequencer logs unreachable servers itself.
        Err(TourError::ServiceUnreachable { .. }) => {}
        Err(e) => error!(error = %e, "Navigation goal submission failed"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parttour_middleware::{EventSender, SimNavigator, SimPosePublisher, event_queue};
    use parttour_mission::ParameterSource;
    use parttour_perception::{TfEngine, Transform3D};
    use parttour_perception::aggregator::CAMERA_FRAMES;
    use parttour_types::{
        PartColor, PartType, Pose, Quaternion, RawDetection, ResultCode, SemanticKey, Vec3,
    };

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts events at info level or above.
    #[derive(Clone, Default)]
    struct InfoCounter(Arc<AtomicUsize>);

    impl InfoCounter {
        fn take(&self) -> usize {
            self.0.swap(0, Ordering::SeqCst)
        }
    }

    impl<S: Subscriber> Layer<S> for InfoCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    type Node = TourNode<TfEngine, Arc<SimNavigator>, Arc<SimPosePublisher>>;

    struct Harness {
        node: Node,
        nav: Arc<SimNavigator>,
        publisher: Arc<SimPosePublisher>,
        tx: EventSender,
        rx: EventReceiver,
    }

    impl Harness {
        /// Push `event` through the node, then every event it caused.
        async fn feed(&mut self, event: NodeEvent) {
            let _ = self.node.handle(event).await;
            while let Some(next) = self.rx.try_recv() {
                let _ = self.node.handle(next).await;
            }
        }

        async fn camera(&mut self, camera: &str, detections: Vec<RawDetection>) {
            self.tx.camera_batch(camera, detections).unwrap();
            let event = self.rx.try_recv().unwrap();
            self.feed(event).await;
        }
    }

    /// Cameras `1..=mounted` sit 1 m above the map origin, shifted along +x
    /// by their index.
    fn world(mounted: usize) -> TfEngine {
        let mut tf = TfEngine::new();
        for (i, (_, frame)) in CAMERA_FRAMES.iter().take(mounted).enumerate() {
            tf.set_static_transform(
                "map",
                frame,
                Transform3D::new(Vec3::new(i as f64 + 1.0, 0.0, 1.0), Quaternion::identity()),
            );
        }
        tf
    }

    /// Marker 7 asks for, in order: blue battery, red pump, green sensor,
    /// orange regulator, purple battery.
    fn params() -> ParameterStore {
        [
            ("aruco_7.wp1.type", "battery"),
            ("aruco_7.wp1.color", "blue"),
            ("aruco_7.wp2.type", "PUMP"),
            ("aruco_7.wp2.color", "Red"),
            ("aruco_7.wp3.type", "sensor"),
            ("aruco_7.wp3.color", "green"),
            ("aruco_7.wp4.type", "regulator"),
            ("aruco_7.wp4.color", "orange"),
            ("aruco_7.wp5.type", "battery"),
            ("aruco_7.wp5.color", "purple"),
        ]
        .into_iter()
        .collect()
    }

    fn harness(mounted: usize, auto_complete: bool) -> Harness {
        let (tx, rx) = event_queue(64);
        let nav = Arc::new(SimNavigator::new(tx.clone()));
        nav.set_auto_complete(auto_complete);
        let publisher = Arc::new(SimPosePublisher::new());
        let settings = NodeSettings {
            server_timeout: Duration::from_millis(5),
            ..NodeSettings::default()
        };
        let node = TourNode::new(settings, params(), world(mounted), nav.clone(), publisher.clone());
        Harness {
            node,
            nav,
            publisher,
            tx,
            rx,
        }
    }

    fn det(color: PartColor, part_type: PartType, x: f64) -> RawDetection {
        RawDetection {
            color: color.code(),
            part_type: part_type.code(),
            pose: Pose::from_xyz(x, 0.5, -0.2),
        }
    }

    fn marker(ids: Vec<i64>) -> NodeEvent {
        NodeEvent::MarkerBatch(MarkerBatch { marker_ids: ids })
    }

    fn nav_result(goal_id: GoalId, code: ResultCode) -> NodeEvent {
        NodeEvent::NavResult(NavigationResult { goal_id, code })
    }

    /// The five parts marker 7 asks for, one per camera.
    fn five_targets() -> [(PartColor, PartType); 5] {
        [
            (PartColor::Blue, PartType::Battery),
            (PartColor::Red, PartType::Pump),
            (PartColor::Green, PartType::Sensor),
            (PartColor::Orange, PartType::Regulator),
            (PartColor::Purple, PartType::Battery),
        ]
    }

    // ── Scenario A ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn five_cameras_fill_aggregator_and_resolve_all_waypoints() {
        let mut h = harness(5, false);
        h.feed(marker(vec![7])).await;

        for (i, (color, part_type)) in five_targets().into_iter().enumerate() {
            h.camera(&format!("camera{}", i + 1), vec![det(color, part_type, 0.5)]).await;
        }

        let status = h.node.status();
        assert_eq!(status.parts_detected, 5);
        assert!(!status.cameras_listening);
        assert_eq!(status.waypoints_resolved, 5);

        // Waypoint 1 (red pump) came from camera 2: x = 2 + 0.5, z floored.
        let wp = h.node.registry().get(1).unwrap().pose().unwrap();
        assert!((wp.position.x - 2.5).abs() < 1e-9);
        assert_eq!(wp.position.z, 0.0);

        // Later detections are ignored once the target count is reached.
        h.camera("camera1", vec![det(PartColor::Red, PartType::Sensor, 0.0)]).await;
        assert_eq!(h.node.aggregator().detected_count(), 5);
        assert!(h
            .node
            .aggregator()
            .get(SemanticKey::new(PartColor::Red, PartType::Sensor))
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_detections_across_cameras_keep_first_pose() {
        let mut h = harness(5, false);
        h.camera("camera1", vec![det(PartColor::Blue, PartType::Battery, 0.0)]).await;
        h.camera("camera3", vec![det(PartColor::Blue, PartType::Battery, 0.0)]).await;

        assert_eq!(h.node.aggregator().detected_count(), 1);
        let part = h
            .node
            .aggregator()
            .get(SemanticKey::new(PartColor::Blue, PartType::Battery))
            .unwrap();
        assert!((part.pose.position.x - 1.0).abs() < 1e-9);
    }

    // ── Scenario B ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn failed_transform_drops_only_that_batch() {
        // camera5_frame is not in the tree.
        let mut h = harness(4, false);
        h.camera("camera5", vec![det(PartColor::Green, PartType::Sensor, 0.0)]).await;
        assert_eq!(h.node.aggregator().detected_count(), 0);

        h.camera("camera1", vec![det(PartColor::Green, PartType::Sensor, 0.0)]).await;
        h.camera("camera2", vec![det(PartColor::Red, PartType::Pump, 0.0)]).await;
        assert_eq!(h.node.aggregator().detected_count(), 2);
        assert!(h.node.aggregator().is_listening());
    }

    #[tokio::test]
    async fn unknown_camera_and_unmapped_codes_are_skipped() {
        let mut h = harness(5, false);
        h.camera("camera9", vec![det(PartColor::Red, PartType::Pump, 0.0)]).await;
        h.camera(
            "camera1",
            vec![
                RawDetection {
                    color: 42,
                    part_type: 10,
                    pose: Pose::default(),
                },
                det(PartColor::Red, PartType::Pump, 0.0),
            ],
        )
        .await;

        assert_eq!(h.node.aggregator().detected_count(), 1);
    }

    // ── Scenario C ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn marker_seen_twice_populates_registry_once() {
        let mut h = harness(5, false);
        h.feed(marker(vec![])).await;
        assert!(!h.node.registry().is_populated());

        h.feed(marker(vec![7, 3])).await;
        h.feed(marker(vec![7])).await;
        h.feed(marker(vec![3])).await;

        assert_eq!(h.node.registry().len(), 5);
        assert_eq!(h.node.registry().marker_id(), Some(7));
        assert_eq!(
            h.node.registry().get(1).unwrap().key(),
            Some(SemanticKey::new(PartColor::Red, PartType::Pump))
        );
    }

    #[tokio::test]
    async fn parts_seen_before_marker_resolve_on_population() {
        let mut h = harness(5, false);
        h.camera("camera1", vec![det(PartColor::Green, PartType::Sensor, 0.0)]).await;
        h.feed(marker(vec![7])).await;

        assert!(h.node.registry().get(2).unwrap().is_resolved());
    }

    // ── Scenario D ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn success_submits_next_goal_without_waiting_for_tick() {
        let mut h = harness(5, false);
        h.feed(marker(vec![7])).await;
        h.camera("camera1", vec![det(PartColor::Blue, PartType::Battery, 0.0)]).await;
        h.camera("camera2", vec![det(PartColor::Red, PartType::Pump, 0.0)]).await;

        // The first accepted batch already issued the goal for waypoint 0.
        let (first, goal) = h.nav.last_goal().unwrap();
        assert_eq!(goal.waypoint_index, 0);
        assert_eq!(h.nav.goals().len(), 1);

        h.feed(nav_result(first, ResultCode::Succeeded)).await;

        assert_eq!(h.node.sequencer().cursor(), 1);
        let (second, goal) = h.nav.last_goal().unwrap();
        assert_ne!(second, first);
        assert_eq!(goal.waypoint_index, 1);
        assert_eq!(h.node.sequencer().pending_goal(), Some(second));
    }

    #[tokio::test]
    async fn full_tour_completes_with_auto_results() {
        let mut h = harness(5, true);
        h.feed(marker(vec![7])).await;
        for (i, (color, part_type)) in five_targets().into_iter().enumerate() {
            h.camera(&format!("camera{}", i + 1), vec![det(color, part_type, 0.0)]).await;
        }
        h.feed(NodeEvent::Tick).await;

        let status = h.node.status();
        assert_eq!(status.cursor, 5);
        assert_eq!(status.state, SequencerState::Done);
        let indices: Vec<usize> = h.nav.goals().iter().map(|(_, g)| g.waypoint_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    // ── Scenario E ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn aborted_goal_stalls_the_tour() {
        let mut h = harness(5, false);
        h.feed(marker(vec![7])).await;
        for (i, (color, part_type)) in five_targets().into_iter().enumerate() {
            h.camera(&format!("camera{}", i + 1), vec![det(color, part_type, 0.0)]).await;
        }
        let (first, _) = h.nav.last_goal().unwrap();

        h.feed(nav_result(first, ResultCode::Aborted)).await;
        for _ in 0..5 {
            h.feed(NodeEvent::Tick).await;
        }

        assert_eq!(h.node.sequencer().cursor(), 0);
        assert!(h.node.sequencer().is_stalled());
        assert_eq!(h.nav.goals().len(), 1);
    }

    // ── other inputs ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn first_odometry_sample_publishes_initial_pose_once() {
        let mut h = harness(5, false);
        h.feed(NodeEvent::OdomSample(PoseEstimate::new(Pose::from_xyz(0.2, -1.0, 0.05))))
            .await;
        h.feed(NodeEvent::OdomSample(PoseEstimate::new(Pose::from_xyz(5.0, 5.0, 0.0))))
            .await;

        let published = h.publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].frame_id, "map");
        assert_eq!(published[0].pose.position.z, 0.0);
        assert!(h.node.status().initial_pose_set);
    }

    #[tokio::test]
    async fn unreachable_server_is_retried_on_tick() {
        let mut h = harness(5, false);
        h.nav.set_online(false);
        h.feed(marker(vec![7])).await;
        h.camera("camera1", vec![det(PartColor::Blue, PartType::Battery, 0.0)]).await;
        assert!(h.nav.goals().is_empty());
        assert_eq!(h.node.sequencer().state(), SequencerState::Idle);

        h.nav.set_online(true);
        h.feed(NodeEvent::Tick).await;
        assert_eq!(h.nav.goals().len(), 1);
    }

    #[tokio::test]
    async fn tick_without_waypoints_is_harmless() {
        let mut h = harness(5, false);
        h.feed(NodeEvent::Tick).await;
        assert!(h.nav.goals().is_empty());
        assert_eq!(h.node.status().waypoints, 0);
    }

    #[tokio::test]
    async fn idle_ticks_do_not_relog_waypoints() {
        let counter = InfoCounter::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

        let mut h = harness(5, false);
        h.feed(marker(vec![7])).await;
        counter.take();
        for _ in 0..30 {
            h.feed(NodeEvent::Tick).await;
        }
        assert_eq!(counter.take(), 0);

        h.camera("camera1", vec![det(PartColor::Blue, PartType::Battery, 0.0)]).await;
        assert!(counter.take() > 0);
        assert_eq!(h.nav.goals().len(), 1);

        for _ in 0..30 {
            h.feed(NodeEvent::Tick).await;
        }
        assert_eq!(counter.take(), 0);
        assert_eq!(h.nav.goals().len(), 1);
        assert_eq!(h.node.status().waypoints_resolved, 1);
    }

    #[tokio::test]
    async fn empty_batch_from_unmounted_camera_is_accepted() {
        let counter = InfoCounter::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

        let mut h = harness(4, false);
        h.feed(marker(vec![7])).await;
        counter.take();
        h.camera("camera5", Vec::new()).await;
        assert_eq!(counter.take(), 0);
        assert!(h.node.aggregator().is_listening());
        assert_eq!(h.node.aggregator().detected_count(), 0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_and_reports_status() {
        let h = harness(5, false);
        let Harness {
            mut node, tx, rx, ..
        } = h;

        tx.marker_ids(vec![7]).unwrap();
        tx.camera_batch("camera1", vec![det(PartColor::Blue, PartType::Battery, 0.0)])
            .unwrap();
        tx.shutdown().unwrap();

        let status = node.run(rx).await;
        assert_eq!(status.marker_id, Some(7));
        assert_eq!(status.parts_detected, 1);
        assert_eq!(status.waypoints_resolved, 1);
    }

    #[test]
    fn params_fixture_uses_waypoint_keys() {
        assert_eq!(params().get_string("aruco_7.wp2.color").as_deref(), Some("Red"));
    }
}
