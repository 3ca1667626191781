//! GRIB2 parameter name lookup tables.
//!
//! Translates the numeric (discipline, category, number) triple of a message,
//! optionally qualified by the type of its first fixed surface, into the
//! display name used to select messages (e.g. "Total Precipitation").

use std::collections::HashMap;

/// Lookup key for parameter: (discipline, category, number)
pub type ParamKey = (u8, u8, u8);

/// GRIB2 fixed surface type codes (Code Table 4.5) used by ICON-2I.
pub mod surface_types {
    /// Ground or water surface
    pub const GROUND: u8 = 1;
    /// Mean sea level
    pub const MSL: u8 = 101;
    /// Specified height level above ground
    pub const HEIGHT_ABOVE_GROUND: u8 = 103;
}

/// GRIB2 parameter lookup table.
///
/// A parameter can be registered for every surface or only for one surface
/// type; surface-specific entries win.
#[derive(Debug, Clone, Default)]
pub struct Grib2Tables {
    any_surface: HashMap<ParamKey, String>,
    per_surface: HashMap<(ParamKey, u8), String>,
}

impl Grib2Tables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Names produced by the ICON-2I surface/pressure-level files.
    pub fn icon_2i() -> Self {
        use surface_types::*;

        let mut tables = Self::new();
        tables.add_surface_parameter(0, 0, 0, HEIGHT_ABOVE_GROUND, "2 metre temperature");
        tables.add_surface_parameter(0, 0, 0, GROUND, "Temperature (G)");
        tables.add_surface_parameter(0, 0, 6, HEIGHT_ABOVE_GROUND, "2 metre dewpoint temperature");
        tables.add_surface_parameter(0, 2, 2, HEIGHT_ABOVE_GROUND, "10 metre U wind component");
        tables.add_surface_parameter(0, 2, 3, HEIGHT_ABOVE_GROUND, "10 metre V wind component");
        tables.add_parameter(0, 6, 1, "Total Cloud Cover");
        tables.add_parameter(0, 1, 60, "Snow depth water equivalent");
        tables.add_surface_parameter(0, 3, 1, MSL, "Pressure Reduced to MSL");
        tables.add_parameter(0, 1, 8, "Total Precipitation");
        tables.add_parameter(0, 1, 52, "Total Precipitation");

        // Generic fallbacks for the same quantities on other surfaces
        tables.add_parameter(0, 0, 0, "Temperature");
        tables.add_parameter(0, 2, 2, "U component of wind");
        tables.add_parameter(0, 2, 3, "V component of wind");
        tables
    }

    /// Add a parameter mapping valid for every surface type.
    pub fn add_parameter(&mut self, discipline: u8, category: u8, number: u8, name: &str) {
        self.any_surface
            .insert((discipline, category, number), name.to_string());
    }

    /// Add a parameter mapping that only applies to one surface type.
    pub fn add_surface_parameter(
        &mut self,
        discipline: u8,
        category: u8,
        number: u8,
        surface_type: u8,
        name: &str,
    ) {
        self.per_surface
            .insert(((discipline, category, number), surface_type), name.to_string());
    }

    /// Look up the display name of a message.
    ///
    /// Returns "P{discipline}_{category}_{number}" if not found.
    pub fn get_parameter_name(
        &self,
        discipline: u8,
        category: u8,
        number: u8,
        surface_type: Option<u8>,
    ) -> String {
        let key = (discipline, category, number);
        surface_type
            .and_then(|st| self.per_surface.get(&(key, st)))
            .or_else(|| self.any_surface.get(&key))
            .cloned()
            .unwrap_or_else(|| format!("P{}_{}_{}", discipline, category, number))
    }

    pub fn parameter_count(&self) -> usize {
        self.any_surface.len() + self.per_surface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_count() == 0
    }
}
