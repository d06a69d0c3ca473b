//! Outbound adapter traits.
//!
//! The tour node never talks to a navigation stack or a localization topic
//! directly. It drives these two traits, and the binary decides what stands
//! behind them.
//!
//! # Overview
//!
//! - [`NavigationClient`] – submits map-frame goals to a long-running
//!   navigate-to-pose action. Completion is reported asynchronously as a
//!   [`NodeEvent::NavResult`][parttour_types::NodeEvent::NavResult] on the
//!   event queue, never as the return value of `send_goal`.
//! - [`InitialPosePublisher`] – announces the robot's starting pose to the
//!   localization stack.
//! - [`SimNavigator`][crate::sim::SimNavigator] and
//!   [`SimPosePublisher`][crate::sim::SimPosePublisher] – in-process
//!   implementations used by the simulation harness and the tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parttour_types::{GoalId, NavigationGoal, StampedPose, TourError};

/// Client side of the navigate-to-pose action.
///
/// # Contract
///
/// * `wait_for_server` – waits at most `timeout` for the action server and
///   reports whether it became available.
///
/// * `send_goal` – submits `goal` and returns the server-assigned id once the
///   goal is accepted, or [`TourError::GoalRejected`] when it is refused.
///   The terminal result arrives later, tagged with the same id.
#[async_trait]
pub trait NavigationClient: Send + Sync {
    async fn wait_for_server(&self, timeout: Duration) -> bool;

    async fn send_goal(&self, goal: NavigationGoal) -> Result<GoalId, TourError>;
}

/// Publisher for the localization initial-pose topic.
pub trait InitialPosePublisher: Send + Sync {
    fn publish_initial_pose(&self, pose: &StampedPose) -> Result<(), TourError>;
}

#[async_trait]
impl<T: NavigationClient + ?Sized> NavigationClient for Arc<T> {
    async fn wait_for_server(&self, timeout: Duration) -> bool {
        (**self).wait_for_server(timeout).await
    }

    async fn send_goal(&self, goal: NavigationGoal) -> Result<GoalId, TourError> {
        (**self).send_goal(goal).await
    }
}

impl<T: InitialPosePublisher + ?Sized> InitialPosePublisher for Arc<T> {
    fn publish_initial_pose(&self, pose: &StampedPose) -> Result<(), TourError> {
        (**self).publish_initial_pose(pose)
    }
}
