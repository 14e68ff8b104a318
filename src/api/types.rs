use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// `GET /api/get_snapshot` response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotResponse {
    #[serde(default)]
    pub success: Option<bool>,
    /// Status text from the backend's camera fetch.
    #[serde(default)]
    pub text: Option<String>,
    /// Base64-encoded JPEG; null when the camera returned nothing.
    #[serde(default)]
    pub image: Option<String>,
}

/// One named reading from `GET /api/get_temps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub offset: Option<f64>,
}

pub type Temperatures = BTreeMap<String, TemperatureReading>;

/// Stored plugin values from `GET /api/get_values`, also the body of the
/// credential form of `POST /api/save_values`. Stored nozzle coordinates are
/// written out only when present.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedValues {
    #[serde(rename = "authToken", alias = "auth_token", default)]
    pub auth_token: String,
    #[serde(rename = "terminalCmds", alias = "terminal_cmds", default)]
    pub terminal_cmds: Vec<String>,
    #[serde(
        rename = "nozzle_tip_coords_x",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub nozzle_x: Option<f64>,
    #[serde(
        rename = "nozzle_tip_coords_y",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub nozzle_y: Option<f64>,
}

impl std::fmt::Debug for SavedValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.auth_token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("SavedValues")
            .field("auth_token", &token)
            .field("terminal_cmds", &self.terminal_cmds)
            .field("nozzle_x", &self.nozzle_x)
            .field("nozzle_y", &self.nozzle_y)
            .finish()
    }
}

/// The backend keeps coordinates in an INI file and may echo them as strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_with_null_image() {
        let snap: SnapshotResponse =
            serde_json::from_str(r#"{"success": false, "text": "camera offline", "image": null}"#).unwrap();
        assert!(snap.image.is_none());
        assert_eq!(snap.text.as_deref(), Some("camera offline"));
    }

    #[test]
    fn saved_values_accepts_both_spellings() {
        let camel: SavedValues =
            serde_json::from_str(r#"{"authToken": "abc", "terminalCmds": ["G28", "M105"]}"#).unwrap();
        let snake: SavedValues = serde_json::from_str(
            r#"{"auth_token": "abc", "terminal_cmds": ["G28", "M105"], "flip_h": true}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.terminal_cmds, vec!["G28", "M105"]);
    }

    #[test]
    fn saved_values_reads_string_coordinates() {
        let v: SavedValues = serde_json::from_str(
            r#"{"auth_token": "", "nozzle_tip_coords_x": "412", "nozzle_tip_coords_y": 96.5}"#,
        )
        .unwrap();
        assert_eq!(v.nozzle_x, Some(412.0));
        assert_eq!(v.nozzle_y, Some(96.5));
    }

    #[test]
    fn saved_values_serializes_credential_shape() {
        let v = SavedValues {
            auth_token: "tok".into(),
            terminal_cmds: vec!["M115".into()],
            ..SavedValues::default()
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"authToken": "tok", "terminalCmds": ["M115"]}));
    }

    #[test]
    fn stored_coordinates_are_shown() {
        let v: SavedValues = serde_json::from_str(
            r#"{"auth_token": "tok", "nozzle_tip_coords_x": "412", "nozzle_tip_coords_y": "96"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["nozzle_tip_coords_x"], serde_json::json!(412.0));
        assert_eq!(json["nozzle_tip_coords_y"], serde_json::json!(96.0));
    }

    #[test]
    fn temperatures_decode_named_readings() {
        let temps: Temperatures = serde_json::from_str(
            r#"{"bed": {"actual": 60.1, "target": 60.0, "offset": 0}, "tool0": {"actual": 210.5}}"#,
        )
        .unwrap();
        assert_eq!(temps["bed"].target, Some(60.0));
        assert_eq!(temps["tool0"].target, None);
    }
}
