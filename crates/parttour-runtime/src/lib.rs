//! `parttour-runtime` – the tour node and its state machines.
//!
//! # Modules
//!
//! - [`sequencer`] – [`NavigationSequencer`][sequencer::NavigationSequencer]:
//!   submits one navigation goal at a time and advances only on success.
//! - [`localization`] –
//!   [`LocalizationBootstrapper`][localization::LocalizationBootstrapper]:
//!   publishes the first odometry pose as the initial pose, once.
//! - [`node`] – [`TourNode`][node::TourNode]: the event-driven actor owning
//!   aggregation, matching, sequencing and localization state.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter. Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export.

pub mod localization;
pub mod node;
pub mod sequencer;
pub mod telemetry;

pub use localization::LocalizationBootstrapper;
pub use node::{NodeSettings, TourNode, TourStatus};
pub use sequencer::{DEFAULT_SERVER_TIMEOUT, DEFAULT_TOUR_LENGTH, NavigationSequencer, SequencerState};
pub use telemetry::{TracerProviderGuard, init_tracing};
