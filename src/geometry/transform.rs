/// Preview layout: the CSS transform and box sizes that render a snapshot
/// under the configured flip/rotate flags.
use serde::{Deserialize, Serialize};

use crate::geometry::mapper::{ensure_dimension, letterbox_offset};
use crate::geometry::types::{DisplaySettings, GeometryResult};

/// Bottom margin under an unrotated preview container, in px.
pub const CONTAINER_MARGIN_BOTTOM: f64 = 36.0;
/// Corner rounding of the square container used for rotated previews.
pub const ROTATED_BORDER_RADIUS: &str = "1%";
pub const CONTAINER_BACKGROUND: &str = "black";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLayout {
    /// Space-joined CSS transform functions; empty when no flag is set.
    pub css_transform: String,
    pub container_size: Size,
    pub container_margin_bottom: Option<f64>,
    pub container_border_radius: Option<String>,
    pub image_size: Size,
    /// Vertical offset of the image inside the container.
    pub image_offset: f64,
    pub image_absolute: bool,
}

impl PreviewLayout {
    /// Transform value suitable for a `transform:` declaration.
    pub fn transform_value(&self) -> &str {
        if self.css_transform.is_empty() {
            "none"
        } else {
            &self.css_transform
        }
    }

    pub fn container_css(&self) -> String {
        let mut decls = vec![
            format!("width: {}px", self.container_size.width),
            format!("height: {}px", self.container_size.height),
            format!("background-color: {CONTAINER_BACKGROUND}"),
        ];
        if let Some(margin) = self.container_margin_bottom {
            decls.push(format!("margin-bottom: {margin}px"));
        }
        if let Some(radius) = &self.container_border_radius {
            decls.push(format!("border-radius: {radius}"));
        }
        decls.join("; ")
    }

    pub fn image_css(&self) -> String {
        let Size { width, height } = self.image_size;
        let mut decls = vec![
            format!("width: {width}px"),
            format!("height: {height}px"),
            format!("max-width: {width}px"),
            format!("max-height: {height}px"),
        ];
        if self.image_absolute {
            decls.push("position: absolute".to_string());
            decls.push(format!("top: {}px", self.image_offset));
        }
        decls.push(format!("transform: {}", self.transform_value()));
        decls.join("; ")
    }
}

/// Build the CSS transform for the given flags.
///
/// Order is fixed: horizontal flip, vertical flip, rotation.
pub fn css_transform(settings: &DisplaySettings) -> String {
    let mut parts = Vec::with_capacity(3);
    if settings.flip_horizontal {
        parts.push("scaleX(-1)");
    }
    if settings.flip_vertical {
        parts.push("scaleY(-1)");
    }
    if settings.rotate {
        parts.push("rotate(-90deg)");
    }
    parts.join(" ")
}

/// Size the preview container and image for a snapshot of the given natural
/// size rendered `container_width` pixels wide.
pub fn compute_preview_transform(
    settings: &DisplaySettings,
    natural_width: f64,
    natural_height: f64,
    container_width: f64,
) -> GeometryResult<PreviewLayout> {
    ensure_dimension("natural_width", natural_width)?;
    ensure_dimension("natural_height", natural_height)?;
    ensure_dimension("container_width", container_width)?;

    let image_size = Size {
        width: container_width,
        height: container_width * (natural_height / natural_width),
    };

    let layout = if settings.rotate {
        // The rotated bounding box is treated as a square of side container_width.
        PreviewLayout {
            css_transform: css_transform(settings),
            container_size: Size {
                width: container_width,
                height: container_width,
            },
            container_margin_bottom: None,
            container_border_radius: Some(ROTATED_BORDER_RADIUS.to_string()),
            image_size,
            image_offset: letterbox_offset(container_width, image_size.height),
            image_absolute: true,
        }
    } else {
        PreviewLayout {
            css_transform: css_transform(settings),
            container_size: image_size,
            container_margin_bottom: Some(CONTAINER_MARGIN_BOTTOM),
            container_border_radius: None,
            image_size,
            image_offset: 0.0,
            image_absolute: false,
        }
    };

    tracing::debug!(
        transform = %layout.transform_value(),
        image_width = layout.image_size.width,
        image_height = layout.image_size.height,
        offset = layout.image_offset,
        "preview layout computed"
    );
    Ok(layout)
}
