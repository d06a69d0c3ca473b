//! [`ParameterStore`] – flat string parameters keyed by dotted paths.
//!
//! Waypoint targets are configured per marker id under keys of the shape
//! `aruco_<id>.wp<n>.type` and `aruco_<id>.wp<n>.color`, with `n` counted
//! from 1.

use std::collections::HashMap;

/// Read-only access to configured string parameters.
pub trait ParameterSource {
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Which half of a waypoint target a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointField {
    Type,
    Color,
}

impl WaypointField {
    pub fn as_str(self) -> &'static str {
        match self {
            WaypointField::Type => "type",
            WaypointField::Color => "color",
        }
    }
}

/// Parameter key of field `field` of the zero-based `slot` of `marker_id`.
pub fn waypoint_key(marker_id: i64, slot: usize, field: WaypointField) -> String {
    format!("aruco_{marker_id}.wp{}.{}", slot + 1, field.as_str())
}

/// In-memory [`ParameterSource`].
///
/// # Example
///
/// ```
/// use parttour_mission::params::{ParameterSource, ParameterStore};
///
/// let mut params = ParameterStore::new();
/// params.set("aruco_7.wp1.type", "battery");
/// assert_eq!(params.get_string("aruco_7.wp1.type").as_deref(), Some("battery"));
/// assert!(params.get_string("aruco_7.wp2.type").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    values: HashMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSource for ParameterStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            store.set(k, v);
        }
        store
    }
}
