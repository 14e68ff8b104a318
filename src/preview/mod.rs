pub mod engine;
pub mod frame;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{PanelHandle, PreviewEngine};
pub use frame::{decode_snapshot, load_preview, select_point, PreviewFrame};
pub use state::{PanelAction, PanelCommand, PanelEvent, PanelState};
