use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Forecast or time machine response body.
///
/// Every field defaults when absent so partial payloads (for example with
/// blocks excluded) still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub offset: f64,
    pub elevation: f64,
    pub currently: Option<DataPoint>,
    pub minutely: Option<DataBlock>,
    pub hourly: Option<DataBlock>,
    pub daily: Option<DataBlock>,
    pub alerts: Vec<Alert>,
    pub flags: Option<Flags>,
    #[serde(rename = "sourceIDX", skip_serializing_if = "Option::is_none")]
    pub source_idx: Option<SourceIdx>,
}

/// A single weather observation or forecast step. Times are Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataPoint {
    pub time: i64,
    pub summary: String,
    pub icon: String,
    pub nearest_storm_distance: Option<f64>,
    pub nearest_storm_bearing: Option<f64>,
    pub precip_intensity: f64,
    pub precip_probability: f64,
    pub precip_intensity_error: f64,
    pub precip_type: Option<String>,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub dew_point: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_bearing: f64,
    pub cloud_cover: f64,
    pub uv_index: f64,
    pub visibility: f64,
    pub ozone: f64,
    pub precip_accumulation: f64,
    pub temperature_high: f64,
    pub temperature_high_time: i64,
    pub temperature_low: f64,
    pub temperature_low_time: i64,
    pub apparent_temperature_high: f64,
    pub apparent_temperature_high_time: i64,
    pub apparent_temperature_low: f64,
    pub apparent_temperature_low_time: i64,
    pub moon_phase: f64,
    pub precip_intensity_max: f64,
    pub precip_intensity_max_time: i64,
    pub sunrise_time: i64,
    pub sunset_time: i64,
    pub temperature_min: f64,
    pub temperature_min_time: i64,
    pub temperature_max: f64,
    pub temperature_max_time: i64,
    pub apparent_temperature_min: f64,
    pub apparent_temperature_min_time: i64,
    pub apparent_temperature_max: f64,
    pub apparent_temperature_max_time: i64,
    // Version 2 fields
    pub smoke: Option<f64>,
    pub fire_index: Option<f64>,
    pub liquid_accumulation: Option<f64>,
    pub snow_accumulation: Option<f64>,
    pub ice_accumulation: Option<f64>,
    pub dawn_time: Option<i64>,
    pub dusk_time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataBlock {
    pub summary: String,
    pub icon: String,
    pub data: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub title: String,
    pub regions: Vec<String>,
    pub severity: String,
    pub time: i64,
    pub expires: i64,
    pub description: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flags {
    pub sources: Vec<String>,
    pub source_times: HashMap<String, String>,
    #[serde(rename = "nearest-station")]
    pub nearest_station: f64,
    pub units: String,
    pub version: String,
}

/// Grid cell the answer was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceIdx {
    pub x: i64,
    pub y: i64,
    pub latitude: f64,
    pub longitude: f64,
}
