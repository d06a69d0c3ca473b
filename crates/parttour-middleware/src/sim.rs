//! In-process stand-ins for the navigation server and the localization topic.
//!
//! - [`SimNavigator`] accepts goals, records them, and (unless told
//!   otherwise) immediately reports a terminal result on the event queue.
//!   Results come from a script, falling back to `Succeeded` once the script
//!   runs dry. It can also be taken offline or told to reject goals.
//! - [`SimPosePublisher`] records every initial pose it is asked to publish.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use parttour_types::{GoalId, NavigationGoal, ResultCode, StampedPose, TourError};
use tracing::{debug, info, warn};

use crate::adapter::{InitialPosePublisher, NavigationClient};
use crate::queue::EventSender;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// SimNavigator
// ────────────────────────────────────────────────────────────────────────────

pub struct SimNavigator {
    events: EventSender,
    online: AtomicBool,
    auto_complete: AtomicBool,
    rejections: AtomicUsize,
    script: Mutex<VecDeque<ResultCode>>,
    goals: Mutex<Vec<(GoalId, NavigationGoal)>>,
}

impl SimNavigator {
    /// An online navigator that completes every goal with `Succeeded`.
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            online: AtomicBool::new(true),
            auto_complete: AtomicBool::new(true),
            rejections: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            goals: Mutex::new(Vec::new()),
        }
    }

    /// Report `codes` for the next goals, in order.
    pub fn with_script(self, codes: impl IntoIterator<Item = ResultCode>) -> Self {
        lock(&self.script).extend(codes);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// When disabled, accepted goals stay pending until
    /// [`complete`][Self::complete] is called.
    pub fn set_auto_complete(&self, enabled: bool) {
        self.auto_complete.store(enabled, Ordering::SeqCst);
    }

    /// Refuse the next `count` submissions.
    pub fn reject_next(&self, count: usize) {
        self.rejections.store(count, Ordering::SeqCst);
    }

    /// Every accepted goal, oldest first.
    pub fn goals(&self) -> Vec<(GoalId, NavigationGoal)> {
        lock(&self.goals).clone()
    }

    pub fn last_goal(&self) -> Option<(GoalId, NavigationGoal)> {
        lock(&self.goals).last().cloned()
    }

    /// Report `code` for `goal_id` on the event queue.
    pub fn complete(&self, goal_id: GoalId, code: ResultCode) -> Result<(), TourError> {
        debug!(goal = %goal_id, code = %code, "Sim navigation result");
        self.events.nav_result(goal_id, code)
    }

    fn next_code(&self) -> ResultCode {
        lock(&self.script)
            .pop_front()
            .unwrap_or(ResultCode::Succeeded)
    }
}

#[async_trait]
impl NavigationClient for SimNavigator {
    async fn wait_for_server(&self, timeout: Duration) -> bool {
        if self.online.load(Ordering::SeqCst) {
            return true;
        }
        tokio::time::sleep(timeout).await;
        self.online.load(Ordering::SeqCst)
    }

    async fn send_goal(&self, goal: NavigationGoal) -> Result<GoalId, TourError> {
        let rejected = self
            .rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(TourError::GoalRejected);
        }

        let goal_id = GoalId::new();
        info!(
            goal = %goal_id,
            index = goal.waypoint_index,
            x = goal.pose.position.x,
            y = goal.pose.position.y,
            "Sim navigator accepted goal"
        );
        lock(&self.goals).push((goal_id, goal));

        if self.auto_complete.load(Ordering::SeqCst) {
            let code = self.next_code();
            if let Err(e) = self.complete(goal_id, code) {
                warn!(error = %e, goal = %goal_id, "Sim navigator could not report result");
            }
        }
        Ok(goal_id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimPosePublisher
// ────────────────────────────────────────────────────────────────────────────

pub struct SimPosePublisher {
    available: AtomicBool,
    published: Mutex<Vec<StampedPose>>,
}

impl Default for SimPosePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPosePublisher {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            published: Mutex::new(Vec::new()),
        }
    }

    /// While unavailable every publish fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<StampedPose> {
        lock(&self.published).clone()
    }
}

impl InitialPosePublisher for SimPosePublisher {
    fn publish_initial_pose(&self, pose: &StampedPose) -> Result<(), TourError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(TourError::PublishFailed {
                topic: "initialpose".to_string(),
                details: "publisher unavailable".to_string(),
            });
        }
        let p = pose.pose.position;
        info!(frame = %pose.frame_id, x = p.x, y = p.y, z = p.z, "Sim initial pose published");
        lock(&self.published).push(pose.clone());
        Ok(())
    }
}
