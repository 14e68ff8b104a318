use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::backend::PrinterBackend;
use crate::api::types::{SavedValues, SnapshotResponse, Temperatures};
use crate::config::BackendConfig;
use crate::errors::{MattaError, MattaResult};
use crate::geometry::{DisplaySettings, NozzleCoordinate};

pub const HOME_PRINTER: &str = "/api/home_printer";
pub const GET_PRINTER_STATE: &str = "/api/get_printer_state";
pub const GET_TEMPS: &str = "/api/get_temps";
pub const TEST_AUTH_TOKEN: &str = "/api/test_auth_token";
pub const GET_VALUES: &str = "/api/get_values";
pub const SAVE_VALUES: &str = "/api/save_values";
pub const GET_SNAPSHOT: &str = "/api/get_snapshot";
pub const GET_SETTINGS: &str = "/api/get_settings";

/// `PrinterBackend` over HTTP against the add-on's web server.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> MattaResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(MattaError::Config("backend base_url is empty".into()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &BackendConfig) -> MattaResult<Self> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the request and turn non-2xx statuses into `MattaError::Backend`.
    async fn send(&self, path: &str, request: reqwest::RequestBuilder) -> MattaResult<reqwest::Response> {
        tracing::debug!(endpoint = path, "backend request");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = path, status = status.as_u16(), "backend request failed");
            return Err(MattaError::Backend {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_text(&self, path: &str) -> MattaResult<String> {
        let response = self.send(path, self.client.get(self.url(path))).await?;
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> MattaResult<T> {
        let response = self.send(path, self.client.get(self.url(path))).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> MattaResult<String> {
        let response = self
            .send(path, self.client.post(self.url(path)).json(body))
            .await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PrinterBackend for HttpBackend {
    async fn home_printer(&self) -> MattaResult<String> {
        let response = self.send(HOME_PRINTER, self.client.post(self.url(HOME_PRINTER))).await?;
        let text = response.text().await?;
        tracing::info!("printer homing triggered");
        Ok(text)
    }

    async fn get_printer_state(&self) -> MattaResult<String> {
        self.get_text(GET_PRINTER_STATE).await
    }

    async fn get_temps(&self) -> MattaResult<Temperatures> {
        self.get_json(GET_TEMPS).await
    }

    async fn test_auth_token(&self) -> MattaResult<String> {
        self.get_text(TEST_AUTH_TOKEN).await
    }

    async fn get_values(&self) -> MattaResult<SavedValues> {
        self.get_json(GET_VALUES).await
    }

    async fn save_nozzle_coords(&self, coords: NozzleCoordinate) -> MattaResult<String> {
        let text = self.post_json(SAVE_VALUES, &coords).await?;
        tracing::info!(nozzle_x = coords.x, nozzle_y = coords.y, "nozzle coordinates saved");
        Ok(text)
    }

    async fn save_values(&self, values: &SavedValues) -> MattaResult<String> {
        let text = self.post_json(SAVE_VALUES, values).await?;
        tracing::info!(terminal_cmds = values.terminal_cmds.len(), "values saved");
        Ok(text)
    }

    async fn get_snapshot(&self) -> MattaResult<SnapshotResponse> {
        self.get_json(GET_SNAPSHOT).await
    }

    async fn get_settings(&self) -> MattaResult<DisplaySettings> {
        self.get_json(GET_SETTINGS).await
    }
}
