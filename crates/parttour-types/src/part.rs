//! Part identity: colors, types, and the [`SemanticKey`] built from them.
//!
//! The numeric codes are the wire values carried by the logical-camera
//! message. Names compare case-insensitively, so `"blue"` and `"BLUE"` decode
//! to the same [`PartColor`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Pose;

/// Color of a detected part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartColor {
    Red,
    Green,
    Blue,
    Orange,
    Purple,
}

impl PartColor {
    pub const ALL: [PartColor; 5] = [
        PartColor::Red,
        PartColor::Green,
        PartColor::Blue,
        PartColor::Orange,
        PartColor::Purple,
    ];

    /// Decode a logical-camera color code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PartColor::Red),
            1 => Some(PartColor::Green),
            2 => Some(PartColor::Blue),
            3 => Some(PartColor::Orange),
            4 => Some(PartColor::Purple),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PartColor::Red => 0,
            PartColor::Green => 1,
            PartColor::Blue => 2,
            PartColor::Orange => 3,
            PartColor::Purple => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PartColor::Red => "RED",
            PartColor::Green => "GREEN",
            PartColor::Blue => "BLUE",
            PartColor::Orange => "ORANGE",
            PartColor::Purple => "PURPLE",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a detected part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartType {
    Battery,
    Pump,
    Sensor,
    Regulator,
}

impl PartType {
    pub const ALL: [PartType; 4] = [
        PartType::Battery,
        PartType::Pump,
        PartType::Sensor,
        PartType::Regulator,
    ];

    /// Decode a logical-camera type code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            10 => Some(PartType::Battery),
            11 => Some(PartType::Pump),
            12 => Some(PartType::Sensor),
            13 => Some(PartType::Regulator),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PartType::Battery => 10,
            PartType::Pump => 11,
            PartType::Sensor => 12,
            PartType::Regulator => 13,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PartType::Battery => "BATTERY",
            PartType::Pump => "PUMP",
            PartType::Sensor => "SENSOR",
            PartType::Regulator => "REGULATOR",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SemanticKey
// ────────────────────────────────────────────────────────────────────────────

/// Identity of a physical part. Two observations are the same part iff their
/// keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticKey {
    pub color: PartColor,
    pub part_type: PartType,
}

impl SemanticKey {
    pub fn new(color: PartColor, part_type: PartType) -> Self {
        Self { color, part_type }
    }

    /// Decode the raw `(color, type)` code pair of a camera detection.
    ///
    /// Returns `Err` with the first code that has no mapping.
    pub fn from_codes(color: u8, part_type: u8) -> Result<Self, UnmappedCode> {
        let color = PartColor::from_code(color).ok_or(UnmappedCode::Color(color))?;
        let part_type = PartType::from_code(part_type).ok_or(UnmappedCode::Type(part_type))?;
        Ok(Self::new(color, part_type))
    }

    /// Parse configured names, ignoring case. `None` when either name is not
    /// a known color / type (placeholders included).
    pub fn from_names(color: &str, part_type: &str) -> Option<Self> {
        Some(Self::new(
            PartColor::from_name(color)?,
            PartType::from_name(part_type)?,
        ))
    }
}

impl fmt::Display for SemanticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.part_type)
    }
}

/// A camera code with no entry in the decoding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappedCode {
    Color(u8),
    Type(u8),
}

impl UnmappedCode {
    pub fn kind(self) -> &'static str {
        match self {
            UnmappedCode::Color(_) => "color",
            UnmappedCode::Type(_) => "type",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            UnmappedCode::Color(c) | UnmappedCode::Type(c) => c,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Detections
// ────────────────────────────────────────────────────────────────────────────

/// One entry of a logical-camera batch, pose local to the camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub color: u8,
    #[serde(rename = "type")]
    pub part_type: u8,
    pub pose: Pose,
}

/// A part in the common map frame. Created once per key, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedPart {
    pub key: SemanticKey,
    pub pose: Pose,
}
