//! [`NavigationSequencer`] – walks the waypoint registry one goal at a time.
//!
//! # State machine
//!
//! ```text
//!            tick (resolved waypoint at cursor)
//!   Idle ───────────────────────────────────────► AwaitingServer
//!    ▲  ▲                                            │     │
//!    │  └──── server unreachable / goal rejected ────┘     │ accepted
//!    │                                                     ▼
//!    │        next waypoint unresolved              GoalInFlight ──┐
//!    └──────────────────────────── Advancing ◄──────────┘ success   │ aborted /
//!                                   │    │                          │ canceled /
//!                 next resolved ────┘    └──► Done (cursor at bound)│ unknown
//!                 (submit at once)                                  ▼
//!                                                           GoalInFlight (stalled)
//! ```
//!
//! The cursor only ever moves on a `Succeeded` result and never passes
//! `min(registry.len(), tour_length)`. A goal that ends in any other way
//! leaves the sequencer stalled on that waypoint: nothing in the node
//! resubmits it.

use std::time::Duration;

use parttour_middleware::NavigationClient;
use parttour_mission::WaypointRegistry;
use parttour_types::{GoalId, MAP_FRAME, NavigationGoal, NavigationResult, Pose, ResultCode, TourError};
use tracing::{debug, error, info, warn};

/// Maximum number of waypoints visited per tour.
pub const DEFAULT_TOUR_LENGTH: usize = 5;

/// How long a submission waits for the navigation server.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Waiting for the waypoint at the cursor to become resolved.
    Idle,
    /// Blocked on the server availability check.
    AwaitingServer,
    /// A goal for `index` has been accepted. `terminal` is set once the
    /// goal ended without success; the sequencer is then stalled.
    GoalInFlight {
        goal_id: GoalId,
        index: usize,
        terminal: Option<ResultCode>,
    },
    /// Cursor just moved past a reached waypoint.
    Advancing,
    /// Every waypoint up to the bound was reached.
    Done,
}

impl SequencerState {
    pub fn name(&self) -> &'static str {
        match self {
            SequencerState::Idle => "idle",
            SequencerState::AwaitingServer => "awaiting_server",
            SequencerState::GoalInFlight { terminal: None, .. } => "goal_in_flight",
            SequencerState::GoalInFlight { terminal: Some(_), .. } => "stalled",
            SequencerState::Advancing => "advancing",
            SequencerState::Done => "done",
        }
    }
}

#[derive(Debug)]
pub struct NavigationSequencer {
    state: SequencerState,
    cursor: usize,
    tour_length: usize,
    server_timeout: Duration,
    frame_id: String,
}

impl Default for NavigationSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_TOUR_LENGTH, DEFAULT_SERVER_TIMEOUT)
    }
}

impl NavigationSequencer {
    pub fn new(tour_length: usize, server_timeout: Duration) -> Self {
        Self {
            state: SequencerState::Idle,
            cursor: 0,
            tour_length,
            server_timeout,
            frame_id: MAP_FRAME.to_string(),
        }
    }

    /// Frame goals are expressed in (default `map`).
    pub fn with_frame(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Index of the next waypoint to visit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tour_length(&self) -> usize {
        self.tour_length
    }

    /// Upper limit of the cursor for `registry`.
    pub fn bound(&self, registry: &WaypointRegistry) -> usize {
        registry.len().min(self.tour_length)
    }

    pub fn is_done(&self) -> bool {
        self.state == SequencerState::Done
    }

    /// `true` once a goal ended without success.
    pub fn is_stalled(&self) -> bool {
        matches!(
            self.state,
            SequencerState::GoalInFlight {
                terminal: Some(_),
                ..
            }
        )
    }

    /// The in-flight goal, if one is pending a result.
    pub fn pending_goal(&self) -> Option<GoalId> {
        match self.state {
            SequencerState::GoalInFlight {
                goal_id,
                terminal: None,
                ..
            } => Some(goal_id),
            _ => None,
        }
    }

    /// Periodic poll: submit the waypoint at the cursor if it is resolved and
    /// nothing is in flight.
    ///
    /// Returns the id of the submitted goal, `None` when there was nothing to
    /// do (or the server refused the goal).
    ///
    /// # Errors
    ///
    /// [`TourError::ServiceUnreachable`] when the navigation server did not
    /// answer within the configured timeout; the next tick retries.
    pub async fn tick<C: NavigationClient + ?Sized>(
        &mut self,
        registry: &WaypointRegistry,
        client: &C,
    ) -> Result<Option<GoalId>, TourError> {
        if registry.is_empty() {
            warn!("No waypoints to navigate to");
            return Ok(None);
        }
        if self.state != SequencerState::Idle {
            return Ok(None);
        }
        if self.cursor >= self.bound(registry) {
            self.finish();
            return Ok(None);
        }
        match registry.get(self.cursor).and_then(|w| w.pose()) {
            Some(pose) => self.submit(self.cursor, pose, client).await,
            None => Ok(None),
        }
    }

    /// Handle the terminal result of a navigation goal.
    ///
    /// Results for anything but the in-flight goal are dropped. On success
    /// the cursor advances and, when the next waypoint is already resolved,
    /// its goal is submitted right away; the id of that goal is returned.
    pub async fn on_result<C: NavigationClient + ?Sized>(
        &mut self,
        result: NavigationResult,
        registry: &WaypointRegistry,
        client: &C,
    ) -> Result<Option<GoalId>, TourError> {
        let SequencerState::GoalInFlight {
            goal_id,
            index,
            terminal: None,
        } = self.state
        else {
            debug!(goal = %result.goal_id, state = self.state.name(), "Ignoring navigation result");
            return Ok(None);
        };
        if result.goal_id != goal_id {
            debug!(goal = %result.goal_id, pending = %goal_id, "Ignoring result for stale goal");
            return Ok(None);
        }

        match result.code {
            ResultCode::Succeeded => {
                info!(index, "Reached waypoint successfully");
                self.state = SequencerState::Advancing;
                self.cursor = index + 1;

                if self.cursor >= self.bound(registry) {
                    self.finish();
                    return Ok(None);
                }
                match registry.get(self.cursor).and_then(|w| w.pose()) {
                    Some(pose) => self.submit(self.cursor, pose, client).await,
                    None => {
                        self.state = SequencerState::Idle;
                        Ok(None)
                    }
                }
            }
            code => {
                match code {
                    ResultCode::Canceled => info!(index, "Goal was canceled"),
                    ResultCode::Unknown => error!(index, "Unknown result code"),
                    _ => {}
                }
                self.state = SequencerState::GoalInFlight {
                    goal_id,
                    index,
                    terminal: Some(code),
                };
                Ok(None)
            }
        }
    }

    async fn submit<C: NavigationClient + ?Sized>(
        &mut self,
        index: usize,
        pose: Pose,
        client: &C,
    ) -> Result<Option<GoalId>, TourError> {
        self.state = SequencerState::AwaitingServer;
        if !client.wait_for_server(self.server_timeout).await {
            let timeout_ms = u64::try_from(self.server_timeout.as_millis()).unwrap_or(u64::MAX);
            error!(timeout_ms, "Action server not available");
            self.state = SequencerState::Idle;
            return Err(TourError::ServiceUnreachable { timeout_ms });
        }

        let goal = NavigationGoal {
            frame_id: self.frame_id.clone(),
            pose,
            waypoint_index: index,
        };
        info!(index, x = pose.position.x, y = pose.position.y, "Sending navigation goal");

        match client.send_goal(goal).await {
            Ok(goal_id) => {
                self.state = SequencerState::GoalInFlight {
                    goal_id,
                    index,
                    terminal: None,
                };
                Ok(Some(goal_id))
            }
            Err(TourError::GoalRejected) => {
                self.state = SequencerState::Idle;
                Ok(None)
            }
            Err(e) => {
                self.state = SequencerState::Idle;
                Err(e)
            }
        }
    }

    fn finish(&mut self) {
        if self.state != SequencerState::Done {
            info!(cursor = self.cursor, "Reached the last waypoint of the tour");
        }
        self.state = SequencerState::Done;
    }
}
