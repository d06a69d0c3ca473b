//! `parttour-mission` – what the robot has to visit.
//!
//! # Modules
//!
//! - [`params`] – [`ParameterStore`][params::ParameterStore]: dotted-key
//!   string parameters behind the [`ParameterSource`][params::ParameterSource]
//!   trait.
//! - [`registry`] – [`WaypointRegistry`][registry::WaypointRegistry]: the
//!   ordered target slots read once from the parameters of the first marker
//!   seen.
//! - [`matcher`] – [`reconcile`][matcher::reconcile]: binds detected parts to
//!   unresolved slots, first free slot wins.

pub mod matcher;
pub mod params;
pub mod registry;

pub use matcher::{ReconcileReport, reconcile};
pub use params::{ParameterSource, ParameterStore};
pub use registry::{PopulateOutcome, WAYPOINTS_PER_MARKER, Waypoint, WaypointRegistry};
