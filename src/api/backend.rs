use async_trait::async_trait;

use crate::api::types::{SavedValues, SnapshotResponse, Temperatures};
use crate::errors::MattaResult;
use crate::geometry::{DisplaySettings, NozzleCoordinate};

/// The add-on's REST surface. One method per endpoint.
///
/// `HttpBackend` talks to a live add-on; the preview controller only sees
/// this trait.
#[async_trait]
pub trait PrinterBackend: Send + Sync {
    /// `POST /api/home_printer`
    async fn home_printer(&self) -> MattaResult<String>;

    /// `GET /api/get_printer_state`
    async fn get_printer_state(&self) -> MattaResult<String>;

    /// `GET /api/get_temps`
    async fn get_temps(&self) -> MattaResult<Temperatures>;

    /// `GET /api/test_auth_token`
    async fn test_auth_token(&self) -> MattaResult<String>;

    /// `GET /api/get_values`
    async fn get_values(&self) -> MattaResult<SavedValues>;

    /// `POST /api/save_values` with `{ nozzleX, nozzleY }`.
    async fn save_nozzle_coords(&self, coords: NozzleCoordinate) -> MattaResult<String>;

    /// `POST /api/save_values` with `{ authToken, terminalCmds }`.
    async fn save_values(&self, values: &SavedValues) -> MattaResult<String>;

    /// `GET /api/get_snapshot`
    async fn get_snapshot(&self) -> MattaResult<SnapshotResponse>;

    /// `GET /api/get_settings`
    async fn get_settings(&self) -> MattaResult<DisplaySettings>;
}
