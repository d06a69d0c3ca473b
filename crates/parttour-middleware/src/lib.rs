//! `parttour-middleware` – plumbing between the tour node and the outside
//! world.
//!
//! # Modules
//!
//! - [`queue`] – single-consumer event queue every input is funneled through.
//! - [`adapter`] – [`NavigationClient`] and [`InitialPosePublisher`], the
//!   outbound seams of the node.
//! - [`sim`] – in-process implementations of both adapters.
//! - [`world`] – [`SimWorld`]: scripted camera mounts and sensor traffic
//!   for headless runs.

pub mod adapter;
pub mod queue;
pub mod sim;
pub mod world;

pub use adapter::{InitialPosePublisher, NavigationClient};
pub use queue::{DEFAULT_CAPACITY, EventReceiver, EventSender, event_queue};
pub use sim::{SimNavigator, SimPosePublisher};
pub use world::{CameraMount, ScriptedBatch, SimWorld};
