//! Conversions between the measurement units the API reports in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

const KM_TO_MI: f64 = 0.621371;
const MI_TO_KM: f64 = 1.60934;
const MS_TO_KMH: f64 = 3.6;
const HPA_TO_INHG: f64 = 0.02953;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unsupported unit conversion: {from} to {to}")]
    Unsupported { from: String, to: String },

    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl FromStr for TemperatureUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" | "c" => Ok(Self::Celsius),
            "F" | "f" => Ok(Self::Fahrenheit),
            other => Err(ConversionError::UnknownUnit(other.to_string())),
        }
    }
}

pub fn convert_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

/// Distance, speed and pressure units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureUnit {
    Kilometers,
    Miles,
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Hectopascals,
    InchesOfMercury,
}

impl MeasureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "mi",
            Self::MetersPerSecond => "m/s",
            Self::KilometersPerHour => "km/h",
            Self::MilesPerHour => "mph",
            Self::Hectopascals => "hPa",
            Self::InchesOfMercury => "inHg",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for MeasureUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "km" => Ok(Self::Kilometers),
            "mi" => Ok(Self::Miles),
            "m/s" => Ok(Self::MetersPerSecond),
            "km/h" => Ok(Self::KilometersPerHour),
            "mph" => Ok(Self::MilesPerHour),
            "hPa" => Ok(Self::Hectopascals),
            "inHg" => Ok(Self::InchesOfMercury),
            other => Err(ConversionError::UnknownUnit(other.to_string())),
        }
    }
}

/// Convert between two units of the same dimension.
///
/// Only the pairs the API's unit systems actually differ by are supported;
/// m/s to mph, for example, is rejected.
pub fn convert(value: f64, from: MeasureUnit, to: MeasureUnit) -> Result<f64, ConversionError> {
    use MeasureUnit::*;

    if from == to {
        return Ok(value);
    }

    match (from, to) {
        (Kilometers, Miles) | (KilometersPerHour, MilesPerHour) => Ok(value * KM_TO_MI),
        (Miles, Kilometers) | (MilesPerHour, KilometersPerHour) => Ok(value * MI_TO_KM),
        (MetersPerSecond, KilometersPerHour) => Ok(value * MS_TO_KMH),
        (KilometersPerHour, MetersPerSecond) => Ok(value / MS_TO_KMH),
        (Hectopascals, InchesOfMercury) => Ok(value * HPA_TO_INHG),
        (InchesOfMercury, Hectopascals) => Ok(value / HPA_TO_INHG),
        _ => Err(ConversionError::Unsupported {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// RFC 3339 rendering of a Unix timestamp, `None` when out of range.
pub fn format_time(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}
