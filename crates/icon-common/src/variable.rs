//! The fixed ICON-2I variable set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A variable that can be ingested and retrieved.
///
/// Every variable has a lower-snake-case code used in requests and partition
/// keys. Decoded variables also carry the display name used to match GRIB
/// messages; the wind speed/direction variables are derived from the two
/// wind components instead of being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    DewpointTemperature,
    UWindComponent,
    VWindComponent,
    TotalCloudCover,
    TemperatureG,
    SnowDepthWaterEquivalent,
    PressureReducedToMsl,
    TotalPrecipitation,
    WindSpeed,
    WindDirection,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid variable \"{}\". Must be one of {:?}", .0, Variable::codes())]
pub struct UnknownVariable(pub String);

impl Variable {
    pub const ALL: [Variable; 11] = [
        Variable::Temperature,
        Variable::DewpointTemperature,
        Variable::UWindComponent,
        Variable::VWindComponent,
        Variable::TotalCloudCover,
        Variable::TemperatureG,
        Variable::SnowDepthWaterEquivalent,
        Variable::PressureReducedToMsl,
        Variable::TotalPrecipitation,
        Variable::WindSpeed,
        Variable::WindDirection,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::DewpointTemperature => "dewpoint_temperature",
            Variable::UWindComponent => "u_wind_component",
            Variable::VWindComponent => "v_wind_component",
            Variable::TotalCloudCover => "total_cloud_cover",
            Variable::TemperatureG => "temperature_g",
            Variable::SnowDepthWaterEquivalent => "snow_depth_water_equivalent",
            Variable::PressureReducedToMsl => "pressure_reduced_to_msl",
            Variable::TotalPrecipitation => "total_precipitation",
            Variable::WindSpeed => "wind_speed",
            Variable::WindDirection => "wind_direction",
        }
    }

    /// GRIB message name, or `None` for derived variables.
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            Variable::Temperature => Some("2 metre temperature"),
            Variable::DewpointTemperature => Some("2 metre dewpoint temperature"),
            Variable::UWindComponent => Some("10 metre U wind component"),
            Variable::VWindComponent => Some("10 metre V wind component"),
            Variable::TotalCloudCover => Some("Total Cloud Cover"),
            Variable::TemperatureG => Some("Temperature (G)"),
            Variable::SnowDepthWaterEquivalent => Some("Snow depth water equivalent"),
            Variable::PressureReducedToMsl => Some("Pressure Reduced to MSL"),
            Variable::TotalPrecipitation => Some("Total Precipitation"),
            Variable::WindSpeed | Variable::WindDirection => None,
        }
    }

    /// The publisher emits running totals for these variables.
    pub fn is_cumulative(&self) -> bool {
        matches!(self, Variable::TotalPrecipitation)
    }

    pub fn is_derived(&self) -> bool {
        self.display_name().is_none()
    }

    /// Source components of a derived variable.
    pub fn components(&self) -> Option<(Variable, Variable)> {
        match self {
            Variable::WindSpeed | Variable::WindDirection => {
                Some((Variable::UWindComponent, Variable::VWindComponent))
            }
            _ => None,
        }
    }

    pub fn codes() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.code()).collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Variable {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.code() == s)
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}
