pub mod mapper;
pub mod transform;
pub mod types;

pub use mapper::{letterbox_offset, map_click_to_nozzle};
pub use transform::{compute_preview_transform, css_transform, PreviewLayout, Size};
pub use types::{
    ClickPoint, DisplaySettings, GeometryError, GeometryResult, NozzleCoordinate, NozzleSelection,
    ViewportGeometry,
};
