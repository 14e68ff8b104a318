use std::sync::Arc;

use serde::Serialize;

use crate::api::{SavedValues, Temperatures};
use crate::geometry::{ClickPoint, NozzleSelection, Size};
use crate::preview::frame::PreviewFrame;

/// What the host page shows. Replaced wholesale on every event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PanelState {
    /// Bumped on every replacement.
    pub revision: u64,
    pub frame: Option<Arc<PreviewFrame>>,
    pub selection: Option<NozzleSelection>,
    pub values: Option<SavedValues>,
    pub temps: Option<Temperatures>,
    pub status: Option<String>,
    pub last_error: Option<String>,
}

impl PanelState {
    fn next(&self) -> Self {
        Self {
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    /// A new frame invalidates the previous selection.
    pub fn with_frame(&self, frame: PreviewFrame) -> Self {
        Self {
            frame: Some(Arc::new(frame)),
            selection: None,
            last_error: None,
            ..self.next()
        }
    }

    pub fn with_selection(&self, selection: NozzleSelection) -> Self {
        Self {
            selection: Some(selection),
            last_error: None,
            ..self.next()
        }
    }

    pub fn with_values(&self, values: SavedValues) -> Self {
        Self {
            values: Some(values),
            last_error: None,
            ..self.next()
        }
    }

    pub fn with_temps(&self, temps: Temperatures) -> Self {
        Self {
            temps: Some(temps),
            last_error: None,
            ..self.next()
        }
    }

    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            last_error: None,
            ..self.next()
        }
    }

    /// Record a failure; everything else is left as it was.
    pub fn with_error(&self, error: impl Into<String>) -> Self {
        Self {
            last_error: Some(error.into()),
            ..self.next()
        }
    }
}

/// Requests from the host page (button presses, clicks, resizes).
#[derive(Debug, Clone)]
pub enum PanelCommand {
    Refresh { container_width: f64 },
    Click { point: ClickPoint, displayed: Option<Size> },
    SaveSelection,
    HomePrinter,
    PrinterState,
    Temps,
    TestAuthToken,
    LoadValues,
    SaveValues(SavedValues),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    Refresh,
    Click,
    SaveSelection,
    HomePrinter,
    PrinterState,
    Temps,
    TestAuthToken,
    LoadValues,
    SaveValues,
}

impl std::fmt::Display for PanelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PanelAction::Refresh => "refresh",
            PanelAction::Click => "click",
            PanelAction::SaveSelection => "save_selection",
            PanelAction::HomePrinter => "home_printer",
            PanelAction::PrinterState => "printer_state",
            PanelAction::Temps => "temps",
            PanelAction::TestAuthToken => "test_auth_token",
            PanelAction::LoadValues => "load_values",
            PanelAction::SaveValues => "save_values",
        };
        f.write_str(name)
    }
}

/// Broadcast to every subscriber of the panel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PanelEvent {
    StateChanged { state: PanelState },
    Status { action: PanelAction, text: String },
    Error { action: PanelAction, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NozzleCoordinate;

    fn selection() -> NozzleSelection {
        NozzleSelection {
            crosshair: ClickPoint::new(1.0, 2.0),
            nozzle: NozzleCoordinate { x: 3, y: 4 },
        }
    }

    #[test]
    fn each_replacement_bumps_revision() {
        let s0 = PanelState::default();
        let s1 = s0.with_status("Operational");
        let s2 = s1.with_selection(selection());
        assert_eq!((s0.revision, s1.revision, s2.revision), (0, 1, 2));
        assert!(s0.status.is_none());
        assert_eq!(s2.status.as_deref(), Some("Operational"));
    }

    #[test]
    fn error_keeps_previous_values() {
        let s = PanelState::default().with_selection(selection()).with_error("timeout");
        assert_eq!(s.selection, Some(selection()));
        assert_eq!(s.last_error.as_deref(), Some("timeout"));

        let cleared = s.with_status("ok");
        assert!(cleared.last_error.is_none());
    }

    #[test]
    fn events_serialize_tagged() {
        let ev = PanelEvent::Error {
            action: PanelAction::SaveSelection,
            message: "No nozzle coordinate selected".into(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["action"], "save_selection");
    }
}
