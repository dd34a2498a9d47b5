// src/bridge/report.rs
//! Typed reports handed to the host and their JSON encoding.

use log::warn;
use serde::Serialize;

use crate::audio::FrequencyBands;
use crate::session::SessionController;

/// JSON returned whenever there is nothing to report or encoding fails.
pub const EMPTY_JSON: &str = "{}";

/// Point-in-time summary of the active media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    #[serde(rename = "position")]
    pub position_ms: u64,
    pub is_playing: bool,
}

/// Track info, or the explicit "nothing active" case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackInfoReport {
    Empty,
    Active(TrackInfo),
}

impl TrackInfoReport {
    /// Read the controller's live state. `Empty` without a current item.
    pub fn from_controller(controller: &dyn SessionController) -> Self {
        let Some(item) = controller.current_media_item() else {
            return TrackInfoReport::Empty;
        };
        let duration_ms = controller
            .duration()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut position_ms = controller.current_position().as_millis() as u64;
        if duration_ms > 0 {
            position_ms = position_ms.min(duration_ms);
        }
        let title = Some(item.title).filter(|t| !t.is_empty());
        TrackInfoReport::Active(TrackInfo {
            title,
            duration_ms,
            position_ms,
            is_playing: controller.is_playing(),
        })
    }

    pub fn to_json(&self) -> String {
        match self {
            TrackInfoReport::Empty => EMPTY_JSON.to_string(),
            TrackInfoReport::Active(info) => encode(info),
        }
    }
}

pub fn bands_json(bands: &FrequencyBands) -> String {
    encode(bands)
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("Report encoding failed: {e}");
        EMPTY_JSON.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn bands_json_has_exactly_three_keys() {
        let json = bands_json(&FrequencyBands::new(0.75, 0.4, 0.2));
        let value: Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!((object["bass"].as_f64().unwrap() - 0.75).abs() < 1e-6);
        assert!((object["mid"].as_f64().unwrap() - 0.4).abs() < 1e-6);
        assert!((object["treble"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn default_bands_encode_as_zeros() {
        let value: Value = serde_json::from_str(&bands_json(&FrequencyBands::default())).unwrap();
        assert_eq!(value["bass"], 0.0);
        assert_eq!(value["mid"], 0.0);
        assert_eq!(value["treble"], 0.0);
    }

    #[test]
    fn track_info_uses_host_key_names() {
        let report = TrackInfoReport::Active(TrackInfo {
            title: Some("MySong.mp3".into()),
            duration_ms: 240_000,
            position_ms: 120_000,
            is_playing: true,
        });
        let value: Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "MySong.mp3",
                "duration": 240000,
                "position": 120000,
                "isPlaying": true
            })
        );
    }

    #[test]
    fn missing_title_is_omitted_and_empty_is_braces() {
        let report = TrackInfoReport::Active(TrackInfo {
            title: None,
            duration_ms: 0,
            position_ms: 0,
            is_playing: false,
        });
        let value: Value = serde_json::from_str(&report.to_json()).unwrap();
        assert!(value.get("title").is_none());
        assert_eq!(TrackInfoReport::Empty.to_json(), "{}");
    }
}
