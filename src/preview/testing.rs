//! In-memory `PrinterBackend` for controller tests.
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;

use crate::api::{PrinterBackend, SavedValues, SnapshotResponse, TemperatureReading, Temperatures};
use crate::errors::{MattaError, MattaResult};
use crate::geometry::{DisplaySettings, NozzleCoordinate};

pub fn jpeg_base64(width: u32, height: u32) -> String {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 40]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("encode test jpeg");
    base64::engine::general_purpose::STANDARD.encode(&bytes)
}

pub struct FakeBackend {
    image: Option<String>,
    queued_images: Mutex<VecDeque<String>>,
    snapshot_text: String,
    settings: Mutex<DisplaySettings>,
    values: Mutex<SavedValues>,
    saved_coords: Mutex<Vec<NozzleCoordinate>>,
    calls: Mutex<Vec<&'static str>>,
    fail_settings: Mutex<bool>,
    snapshot_delays: Mutex<VecDeque<Duration>>,
    settings_delays: Mutex<VecDeque<Duration>>,
}

fn delays_from(ms: &[u64]) -> VecDeque<Duration> {
    ms.iter().map(|ms| Duration::from_millis(*ms)).collect()
}

impl FakeBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Some(jpeg_base64(width, height)),
            queued_images: Mutex::new(VecDeque::new()),
            snapshot_text: "Snapshot taken".to_string(),
            settings: Mutex::new(DisplaySettings::default()),
            values: Mutex::new(SavedValues::default()),
            saved_coords: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_settings: Mutex::new(false),
            snapshot_delays: Mutex::new(VecDeque::new()),
            settings_delays: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_settings(self, settings: DisplaySettings) -> Self {
        self.set_settings(settings);
        self
    }

    pub fn without_image(mut self, text: &str) -> Self {
        self.image = None;
        self.snapshot_text = text.to_string();
        self
    }

    /// Delay successive `get_snapshot` calls by these amounts, in order.
    pub fn with_snapshot_delays(self, delays: &[u64]) -> Self {
        *self.snapshot_delays.lock().unwrap() = delays_from(delays);
        self
    }

    /// Delay successive `get_settings` calls by these amounts, in order.
    pub fn with_settings_delays(self, delays: &[u64]) -> Self {
        *self.settings_delays.lock().unwrap() = delays_from(delays);
        self
    }

    /// Serve images of these sizes from successive snapshots, then fall
    /// back to the size given to `new`.
    pub fn with_snapshot_sizes(self, sizes: &[(u32, u32)]) -> Self {
        *self.queued_images.lock().unwrap() =
            sizes.iter().map(|(w, h)| jpeg_base64(*w, *h)).collect();
        self
    }

    pub fn set_settings(&self, settings: DisplaySettings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn fail_settings(&self, fail: bool) {
        *self.fail_settings.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saved_coords(&self) -> Vec<NozzleCoordinate> {
        self.saved_coords.lock().unwrap().clone()
    }

    pub fn values(&self) -> SavedValues {
        self.values.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PrinterBackend for FakeBackend {
    async fn home_printer(&self) -> MattaResult<String> {
        self.record("home_printer");
        Ok("ok".to_string())
    }

    async fn get_printer_state(&self) -> MattaResult<String> {
        self.record("get_printer_state");
        Ok("Operational".to_string())
    }

    async fn get_temps(&self) -> MattaResult<Temperatures> {
        self.record("get_temps");
        let mut temps = Temperatures::new();
        temps.insert(
            "bed".to_string(),
            TemperatureReading {
                actual: Some(59.8),
                target: Some(60.0),
                offset: Some(0.0),
            },
        );
        Ok(temps)
    }

    async fn test_auth_token(&self) -> MattaResult<String> {
        self.record("test_auth_token");
        Ok("Token valid".to_string())
    }

    async fn get_values(&self) -> MattaResult<SavedValues> {
        self.record("get_values");
        Ok(self.values())
    }

    async fn save_nozzle_coords(&self, coords: NozzleCoordinate) -> MattaResult<String> {
        self.record("save_nozzle_coords");
        self.saved_coords.lock().unwrap().push(coords);
        Ok("Coordinates saved".to_string())
    }

    async fn save_values(&self, values: &SavedValues) -> MattaResult<String> {
        self.record("save_values");
        *self.values.lock().unwrap() = values.clone();
        Ok("Values saved".to_string())
    }

    async fn get_snapshot(&self) -> MattaResult<SnapshotResponse> {
        self.record("get_snapshot");
        let delay = self.snapshot_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.queued_images.lock().unwrap().pop_front();
        let image = queued.or_else(|| self.image.clone());
        Ok(SnapshotResponse {
            success: Some(image.is_some()),
            text: Some(self.snapshot_text.clone()),
            image,
        })
    }

    async fn get_settings(&self) -> MattaResult<DisplaySettings> {
        self.record("get_settings");
        let delay = self.settings_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_settings.lock().unwrap() {
            return Err(MattaError::Backend {
                endpoint: "/api/get_settings".to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(*self.settings.lock().unwrap())
    }
}
