/// Click → nozzle coordinate mapping.
///
/// Scales a pointer position from displayed space into the snapshot's
/// natural resolution. With rotation enabled the horizontal axis is shifted
/// by the same letterbox offset the preview layout uses to centre the image.
use crate::geometry::types::{
    ClickPoint, DisplaySettings, GeometryError, GeometryResult, NozzleCoordinate, NozzleSelection,
    ViewportGeometry,
};

/// Vertical padding that centres an image of `height` inside a square of
/// side `width`. Shared by the layout and the click mapping.
pub fn letterbox_offset(width: f64, height: f64) -> f64 {
    (width - height).abs() / 2.0
}

pub(crate) fn ensure_dimension(name: &str, value: f64) -> GeometryResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::unavailable(format!("{name} is {value}")))
    }
}

/// Truncate toward zero, refusing anything that is not a representable pixel index.
fn to_pixel(axis: &str, value: f64) -> GeometryResult<i64> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(GeometryError::unavailable(format!(
            "{axis} maps to non-representable value {value}"
        )));
    }
    Ok(truncated as i64)
}

/// Map a click on the displayed preview to a natural-space nozzle coordinate.
///
/// The crosshair stays at the raw click position. Results are not clamped:
/// clicks in the letterbox padding may land outside the image.
pub fn map_click_to_nozzle(
    click: ClickPoint,
    geometry: &ViewportGeometry,
    settings: &DisplaySettings,
) -> GeometryResult<NozzleSelection> {
    ensure_dimension("displayed_width", geometry.displayed_width)?;
    ensure_dimension("displayed_height", geometry.displayed_height)?;
    ensure_dimension("natural_width", geometry.natural_width)?;
    ensure_dimension("natural_height", geometry.natural_height)?;
    if !click.x.is_finite() || !click.y.is_finite() {
        return Err(GeometryError::unavailable(format!(
            "click ({}, {}) is not finite",
            click.x, click.y
        )));
    }

    let x = if settings.rotate {
        let aspect_ratio = geometry.displayed_height / geometry.displayed_width;
        let rendered_height = geometry.displayed_width * aspect_ratio;
        let offset = letterbox_offset(geometry.displayed_width, rendered_height);
        (click.x - offset) / geometry.displayed_width * geometry.natural_width
    } else {
        click.x / geometry.displayed_width * geometry.natural_width
    };
    let y = click.y / geometry.displayed_height * geometry.natural_height;

    let nozzle = NozzleCoordinate {
        x: to_pixel("x", x)?,
        y: to_pixel("y", y)?,
    };
    tracing::debug!(
        click_x = click.x,
        click_y = click.y,
        rotate = settings.rotate,
        nozzle_x = nozzle.x,
        nozzle_y = nozzle.y,
        "click mapped to nozzle coordinate"
    );

    Ok(NozzleSelection {
        crosshair: click,
        nozzle,
    })
}
