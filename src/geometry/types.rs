use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera display flags as served by `GET /api/get_settings`.
///
/// The backend returns its whole settings object; only the three display
/// flags are read here and everything else is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(rename = "flip_h", default)]
    pub flip_horizontal: bool,
    #[serde(rename = "flip_v", default)]
    pub flip_vertical: bool,
    /// Rotate the preview 90° counter-clockwise.
    #[serde(default)]
    pub rotate: bool,
}

/// Pointer position relative to the preview element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

impl ClickPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen and intrinsic size of the preview image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub natural_width: f64,
    pub natural_height: f64,
}

/// A natural-space pixel position recorded as the tool's calibration target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NozzleCoordinate {
    #[serde(rename = "nozzleX")]
    pub x: i64,
    #[serde(rename = "nozzleY")]
    pub y: i64,
}

/// Result of a click: where the crosshair goes (displayed space) and the
/// nozzle coordinate it maps to (natural space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NozzleSelection {
    pub crosshair: ClickPoint,
    pub nozzle: NozzleCoordinate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("geometry unavailable: {reason}")]
    Unavailable { reason: String },
}

impl GeometryError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

pub type GeometryResult<T> = Result<T, GeometryError>;
