/// Snapshot → preview frame, and click → nozzle selection.
///
/// Each chain fetches the display settings itself, after its other inputs
/// are ready, so the computation always runs on the freshest flags.
use std::io::Cursor;

use base64::Engine as _;
use serde::Serialize;

use crate::api::PrinterBackend;
use crate::errors::{MattaError, MattaResult};
use crate::geometry::{
    compute_preview_transform, map_click_to_nozzle, ClickPoint, DisplaySettings, NozzleSelection,
    PreviewLayout, Size, ViewportGeometry,
};

/// A decoded snapshot with its computed layout. Never mutated once built.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewFrame {
    pub id: uuid::Uuid,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip)]
    pub jpeg: Vec<u8>,
    pub natural_size: Size,
    pub settings: DisplaySettings,
    pub layout: PreviewLayout,
}

impl PreviewFrame {
    /// Base64 `data:` URI for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
        )
    }

    /// Geometry of this frame as displayed at its computed image size.
    pub fn displayed_geometry(&self) -> ViewportGeometry {
        ViewportGeometry {
            displayed_width: self.layout.image_size.width,
            displayed_height: self.layout.image_size.height,
            natural_width: self.natural_size.width,
            natural_height: self.natural_size.height,
        }
    }
}

/// Decode the base64 payload and read the image's intrinsic size.
pub fn decode_snapshot(image_base64: &str) -> MattaResult<(Vec<u8>, Size)> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(image_base64.trim())?;
    let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| MattaError::Image(format!("snapshot decode: {e}")))?;
    Ok((
        bytes,
        Size {
            width: f64::from(width),
            height: f64::from(height),
        },
    ))
}

/// Fetch a snapshot, decode it, then fetch settings and lay the preview out.
pub async fn load_preview(
    backend: &dyn PrinterBackend,
    container_width: f64,
) -> MattaResult<PreviewFrame> {
    let snapshot = backend.get_snapshot().await?;
    let image_base64 = snapshot.image.ok_or_else(|| {
        MattaError::SnapshotUnavailable(
            snapshot
                .text
                .unwrap_or_else(|| "backend returned no image".to_string()),
        )
    })?;
    let (jpeg, natural_size) = decode_snapshot(&image_base64)?;
    tracing::debug!(
        bytes = jpeg.len(),
        width = natural_size.width,
        height = natural_size.height,
        "snapshot decoded"
    );

    let settings = backend.get_settings().await?;
    let layout = compute_preview_transform(
        &settings,
        natural_size.width,
        natural_size.height,
        container_width,
    )?;

    let frame = PreviewFrame {
        id: uuid::Uuid::new_v4(),
        fetched_at: chrono::Utc::now(),
        jpeg,
        natural_size,
        settings,
        layout,
    };
    tracing::info!(frame = %frame.id, transform = %frame.layout.transform_value(), "preview loaded");
    Ok(frame)
}

/// Map a click on `frame` displayed at `displayed` to a nozzle coordinate.
///
/// `displayed` defaults to the frame's computed image size.
pub async fn select_point(
    backend: &dyn PrinterBackend,
    frame: &PreviewFrame,
    click: ClickPoint,
    displayed: Option<Size>,
) -> MattaResult<NozzleSelection> {
    let settings = backend.get_settings().await?;
    if settings != frame.settings {
        tracing::debug!(frame = %frame.id, "display settings changed since preview was loaded");
    }
    let mut geometry = frame.displayed_geometry();
    if let Some(size) = displayed {
        geometry.displayed_width = size.width;
        geometry.displayed_height = size.height;
    }
    Ok(map_click_to_nozzle(click, &geometry, &settings)?)
}
