//! Lake configuration and numerical limits
//!
//! Configuration files may be written in TOML or JSON. Every field has a
//! default so partial files are accepted.

use crate::errors::{FlakeError, FlakeResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Angular velocity of the Earth's rotation (s⁻¹).
pub const EARTH_ANGULAR_VELOCITY: FloatValue = 7.2921e-5;

/// Thresholds and floors used to keep the step well defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericalLimits {
    /// Ice thickness at or below which ice is considered absent (m).
    /// Default: 1e-9
    pub h_ice_min: FloatValue,
    /// Snow thickness below which snow is considered absent (m).
    /// Default: 1e-5
    pub h_snow_min: FloatValue,
    /// Thickness reported for absent ice and snow (m).
    /// Default: 1e-9
    pub thickness_floor: FloatValue,
    /// Minimum mixed-layer depth (m).
    /// Default: 1e-2
    pub h_ml_min: FloatValue,
    /// Maximum mixed-layer depth (m).
    /// Default: 1e3
    pub h_ml_max: FloatValue,
    /// Minimum thickness of the upper sediment layer (m).
    /// Default: 1e-3
    pub h_b1_min: FloatValue,
    /// Minimum water-side friction velocity (m s⁻¹).
    /// Default: 1e-6
    pub u_star_min: FloatValue,
    /// Small number guarding divisions.
    /// Default: 1e-10
    pub c_small: FloatValue,
    /// Cap on the argument of decaying exponentials.
    /// Default: 100
    pub max_exp_arg: FloatValue,
    /// Undershoot of a liquid water temperature below freezing that is
    /// clamped without a warning (K).
    /// Default: 1e-6
    pub freezing_tolerance: FloatValue,
}

impl Default for NumericalLimits {
    fn default() -> Self {
        Self {
            h_ice_min: 1.0e-9,
            h_snow_min: 1.0e-5,
            thickness_floor: 1.0e-9,
            h_ml_min: 1.0e-2,
            h_ml_max: 1.0e3,
            h_b1_min: 1.0e-3,
            u_star_min: 1.0e-6,
            c_small: 1.0e-10,
            max_exp_arg: 1.0e2,
            freezing_tolerance: 1.0e-6,
        }
    }
}

impl NumericalLimits {
    pub fn validate(&self) -> FlakeResult<()> {
        let positive = [
            ("h_ice_min", self.h_ice_min),
            ("h_snow_min", self.h_snow_min),
            ("thickness_floor", self.thickness_floor),
            ("h_ml_min", self.h_ml_min),
            ("h_ml_max", self.h_ml_max),
            ("h_b1_min", self.h_b1_min),
            ("u_star_min", self.u_star_min),
            ("c_small", self.c_small),
            ("max_exp_arg", self.max_exp_arg),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.freezing_tolerance >= 0.0) {
            return Err(FlakeError::InvalidConfiguration(format!(
                "freezing_tolerance must not be negative, got {}",
                self.freezing_tolerance
            )));
        }
        if self.thickness_floor > self.h_ice_min || self.thickness_floor > self.h_snow_min {
            return Err(FlakeError::InvalidConfiguration(format!(
                "thickness_floor ({}) must not exceed h_ice_min ({}) or h_snow_min ({})",
                self.thickness_floor, self.h_ice_min, self.h_snow_min
            )));
        }
        if self.h_ml_max <= self.h_ml_min {
            return Err(FlakeError::InvalidConfiguration(format!(
                "h_ml_max ({}) must exceed h_ml_min ({})",
                self.h_ml_max, self.h_ml_min
            )));
        }
        Ok(())
    }
}

/// Static description of the lake and the timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    /// Lake depth (m).
    /// Default: 10.0
    pub depth_w: FloatValue,
    /// Depth of the thermally active sediment layer (m).
    /// Default: 10.0
    pub depth_bs: FloatValue,
    /// Climatological temperature at the base of the active sediment layer (K).
    /// Default: 277.13
    pub t_bs: FloatValue,
    /// Wind fetch (m).
    /// Default: 1000.0
    pub fetch: FloatValue,
    /// Latitude of the lake (degrees north). When set, the Coriolis
    /// parameter is derived from it and `coriolis` is ignored.
    /// Default: None
    pub latitude: Option<FloatValue>,
    /// Coriolis parameter (s⁻¹).
    /// Default: 1e-4
    pub coriolis: FloatValue,
    /// Timestep length (s).
    /// Default: 86400.0
    pub del_time: FloatValue,
    /// Whether the bottom sediment is modelled. When off the sediment state
    /// is passed through unchanged and no heat is exchanged with the bottom.
    /// Default: true
    pub sediments_on: bool,
    /// Typical extinction coefficient of the lake water (m⁻¹), used for the
    /// equilibrium depth of the convective layer.
    /// Default: 3.0
    pub extincoef_water_typ: FloatValue,
    pub limits: NumericalLimits,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            depth_w: 10.0,
            depth_bs: 10.0,
            t_bs: 277.13,
            fetch: 1000.0,
            latitude: None,
            coriolis: 1.0e-4,
            del_time: 86400.0,
            sediments_on: true,
            extincoef_water_typ: 3.0,
            limits: NumericalLimits::default(),
        }
    }
}

impl LakeConfig {
    /// Coriolis parameter used by the stable boundary layer closure (s⁻¹).
    pub fn coriolis_parameter(&self) -> FloatValue {
        match self.latitude {
            Some(latitude) => 2.0 * EARTH_ANGULAR_VELOCITY * latitude.to_radians().sin(),
            None => self.coriolis,
        }
    }

    pub fn validate(&self) -> FlakeResult<()> {
        self.limits.validate()?;

        let positive = [
            ("depth_w", self.depth_w),
            ("fetch", self.fetch),
            ("del_time", self.del_time),
            ("extincoef_water_typ", self.extincoef_water_typ),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.depth_w <= 2.0 * self.limits.h_ml_min {
            return Err(FlakeError::InvalidConfiguration(format!(
                "depth_w ({}) is too shallow for h_ml_min ({})",
                self.depth_w, self.limits.h_ml_min
            )));
        }
        if self.sediments_on {
            if !(self.depth_bs > 2.0 * self.limits.h_b1_min) || !self.depth_bs.is_finite() {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "depth_bs must exceed twice h_b1_min when sediments are on, got {}",
                    self.depth_bs
                )));
            }
            if !(self.t_bs > 0.0) || !self.t_bs.is_finite() {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "t_bs must be a positive temperature, got {}",
                    self.t_bs
                )));
            }
        }
        if let Some(latitude) = self.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "latitude must lie in [-90, 90], got {}",
                    latitude
                )));
            }
        } else if !self.coriolis.is_finite() {
            return Err(FlakeError::InvalidConfiguration(format!(
                "coriolis must be finite, got {}",
                self.coriolis
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> FlakeResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FlakeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> FlakeResult<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| FlakeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file, choosing the format from the extension.
    ///
    /// Files ending in `.json` are read as JSON, everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> FlakeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlakeError::ConfigParse(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn to_toml_string(&self) -> FlakeResult<String> {
        toml::to_string(self).map_err(|e| FlakeError::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn defaults_are_valid() {
        LakeConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml() {
        let config = LakeConfig::from_toml_str(
            r#"
depth_w = 30.0
del_time = 3600.0

[limits]
h_ml_min = 0.05
"#,
        )
        .unwrap();
        assert!(is_close!(config.depth_w, 30.0));
        assert!(is_close!(config.del_time, 3600.0));
        assert!(is_close!(config.limits.h_ml_min, 0.05));
        // Untouched fields fall back to their defaults
        assert!(is_close!(config.fetch, 1000.0));
        assert!(is_close!(config.limits.h_snow_min, 1e-5));
        assert!(config.sediments_on);
    }

    #[test]
    fn partial_json() {
        let config =
            LakeConfig::from_json_str(r#"{"sediments_on": false, "latitude": 60.0}"#).unwrap();
        assert!(!config.sediments_on);
        assert_eq!(config.latitude, Some(60.0));
        assert!(is_close!(config.depth_w, 10.0));
    }

    #[test]
    fn toml_round_trip() {
        let config = LakeConfig {
            depth_w: 25.0,
            latitude: Some(45.0),
            ..LakeConfig::default()
        };
        let serialised = config.to_toml_string().unwrap();
        let deserialised = LakeConfig::from_toml_str(&serialised).unwrap();
        assert_eq!(config, deserialised);
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let result = LakeConfig::from_toml_str("depth_w = \"deep\"");
        assert!(matches!(result, Err(FlakeError::ConfigParse(_))));
        let result = LakeConfig::from_json_str("{");
        assert!(matches!(result, Err(FlakeError::ConfigParse(_))));
    }

    #[test]
    fn rejects_non_positive_geometry() {
        for config in [
            LakeConfig {
                depth_w: 0.0,
                ..LakeConfig::default()
            },
            LakeConfig {
                del_time: -1.0,
                ..LakeConfig::default()
            },
            LakeConfig {
                depth_bs: 0.0,
                ..LakeConfig::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(FlakeError::InvalidConfiguration(_))
            ));
        }

        // Sediment depth is irrelevant when sediments are off
        let config = LakeConfig {
            depth_bs: 0.0,
            sediments_on: false,
            ..LakeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn coriolis_from_latitude() {
        let config = LakeConfig {
            latitude: Some(90.0),
            ..LakeConfig::default()
        };
        assert!(is_close!(
            config.coriolis_parameter(),
            2.0 * EARTH_ANGULAR_VELOCITY
        ));

        let config = LakeConfig {
            coriolis: 1.2e-4,
            ..LakeConfig::default()
        };
        assert!(is_close!(config.coriolis_parameter(), 1.2e-4));
    }

    #[test]
    fn rejects_floor_above_presence_threshold() {
        let limits = NumericalLimits {
            thickness_floor: 1e-3,
            ..NumericalLimits::default()
        };
        assert!(limits.validate().is_err());
    }
}
