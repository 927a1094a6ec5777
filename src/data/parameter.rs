use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Parameter – closed table of plottable quantities
// ---------------------------------------------------------------------------

/// A physical quantity that can be differenced and plotted.
///
/// The table is closed: [`Parameter::resolve`] maps any key it does not know
/// to [`Parameter::default`] (sea surface temperature) instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// `sst` – sea water temperature.
    #[default]
    Sst,
    /// `sss` – sea water salinity.
    Sss,
}

impl Parameter {
    pub const ALL: [Parameter; 2] = [Parameter::Sst, Parameter::Sss];

    /// Look up a parameter key, falling back to the default entry.
    pub fn resolve(key: &str) -> Self {
        match Self::from_key(key) {
            Some(p) => p,
            None => {
                log::debug!("unknown parameter '{key}', using '{}'", Self::default().key());
                Self::default()
            }
        }
    }

    /// Strict lookup; `None` for keys outside the table.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            Parameter::Sst => "sst",
            Parameter::Sss => "sss",
        }
    }

    /// Field name the quantity is stored under, on both primary and match.
    pub fn field(self) -> &'static str {
        match self {
            Parameter::Sst => "sea_water_temperature",
            Parameter::Sss => "sea_water_salinity",
        }
    }

    /// Axis unit suffix.
    pub fn units(self) -> &'static str {
        match self {
            Parameter::Sst => "(°C)",
            Parameter::Sss => "(g/L)",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys() {
        assert_eq!(Parameter::resolve("sst").field(), "sea_water_temperature");
        assert_eq!(Parameter::resolve("sss").field(), "sea_water_salinity");
        assert_eq!(Parameter::resolve("sss").units(), "(g/L)");
    }

    #[test]
    fn test_unknown_key_falls_back_to_sst() {
        for key in ["wind_speed", "", "SST", "sst "] {
            let p = Parameter::resolve(key);
            assert_eq!(p, Parameter::Sst);
            assert_eq!(p.field(), "sea_water_temperature");
            assert_eq!(p.units(), "(°C)");
        }
        assert_eq!(Parameter::from_key("wind_speed"), None);
    }

    #[test]
    fn test_key_round_trips_through_table() {
        for p in Parameter::ALL {
            assert_eq!(Parameter::from_key(p.key()), Some(p));
        }
    }
}
