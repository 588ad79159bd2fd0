//! Prognostic state of the lake column
//!
//! The water temperature profile is described by a mixed layer of depth
//! $h$ and temperature $T_{wML}$ above a thermocline reaching the bottom,
//! where
//!
//! $$T(z) = T_{wML} - (T_{wML} - T_{bot})\,\Phi_T\left(\frac{z - h}{D - h}\right)$$
//!
//! The mean temperature of the column follows from the shape factor
//! $C_T = \int_0^1 \Phi_T\, d\zeta$:
//!
//! $$T_{mnw} = T_{wML} - C_T \left(1 - \frac{h}{D}\right)(T_{wML} - T_{bot})$$

use crate::config::{LakeConfig, NumericalLimits};
use crate::errors::{FlakeError, FlakeResult};
use crate::physics::{
    C_T_MAX, C_T_MIN, C_TT_1, C_TT_2, PHI_T_PR0_1, PHI_T_PR0_2, T_F, T_FLOOR,
};
use crate::FloatValue;
use log::warn;
use serde::{Deserialize, Serialize};

/// Thermocline shape factor and the quantities derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoclineShape {
    /// Shape factor $C_T$.
    pub c_t: FloatValue,
    /// Second shape factor $C_{TT}$, the double integral of the profile.
    pub c_tt: FloatValue,
    /// Shape factor of the thermocline heat flux $C_Q = 2 C_{TT} / C_T$.
    pub c_q: FloatValue,
    /// Dimensionless profile gradient at the top of the thermocline.
    pub phi_t_pr0: FloatValue,
}

impl ThermoclineShape {
    /// Shape derived from `c_t`. The caller keeps `c_t` within
    /// `[C_T_MIN, C_T_MAX]`.
    pub fn from_c_t(c_t: FloatValue) -> Self {
        let c_tt = C_TT_1 * c_t - C_TT_2;
        Self {
            c_t,
            c_tt,
            c_q: 2.0 * c_tt / c_t,
            phi_t_pr0: PHI_T_PR0_1 * c_t - PHI_T_PR0_2,
        }
    }

    pub fn minimum() -> Self {
        Self::from_c_t(C_T_MIN)
    }
}

impl Default for ThermoclineShape {
    fn default() -> Self {
        Self::minimum()
    }
}

/// Complete prognostic state of a lake column.
///
/// Temperatures are in K and thicknesses in m. Absent ice and snow are stored
/// at [`NumericalLimits::thickness_floor`] with their temperatures at the
/// freezing point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LakeState {
    pub t_snow: FloatValue,
    pub t_ice: FloatValue,
    pub t_wml: FloatValue,
    pub t_mnw: FloatValue,
    pub t_bot: FloatValue,
    pub t_b1: FloatValue,
    pub h_snow: FloatValue,
    pub h_ice: FloatValue,
    pub h_ml: FloatValue,
    pub h_b1: FloatValue,
    pub shape: ThermoclineShape,
    /// Surface temperature reported by the previous step.
    pub t_sfc: FloatValue,
}

impl LakeState {
    pub fn has_ice(&self, limits: &NumericalLimits) -> bool {
        self.h_ice > limits.h_ice_min
    }

    pub fn has_snow(&self, limits: &NumericalLimits) -> bool {
        self.has_ice(limits) && self.h_snow >= limits.h_snow_min
    }

    /// Mean column temperature implied by the profile parameters.
    pub fn profile_mean_temperature(
        t_wml: FloatValue,
        t_bot: FloatValue,
        c_t: FloatValue,
        h_ml: FloatValue,
        depth_w: FloatValue,
    ) -> FloatValue {
        t_wml - c_t * (1.0 - h_ml / depth_w) * (t_wml - t_bot)
    }

    /// Build the initial state of a run from a set of initial conditions.
    pub fn cold_start(initial: &InitialConditions, config: &LakeConfig) -> FlakeResult<Self> {
        config.validate()?;
        initial.validate()?;
        let limits = &config.limits;

        let h_ml = initial_value("h_ml", initial.h_ml, 0.0, config.depth_w);
        let c_t = initial_value("c_t", initial.c_t, C_T_MIN, C_T_MAX);

        let has_ice = initial.h_ice > limits.h_ice_min;
        let t_wml = if has_ice {
            T_F
        } else {
            initial_value("t_wml", initial.t_wml, T_F, FloatValue::INFINITY)
        };
        let t_bot = initial_value("t_bot", initial.t_bot, T_F, FloatValue::INFINITY);
        let t_mnw = match initial.t_mnw {
            Some(t_mnw) => initial_value("t_mnw", t_mnw, T_F, FloatValue::INFINITY),
            None => Self::profile_mean_temperature(t_wml, t_bot, c_t, h_ml, config.depth_w),
        };

        let (h_ice, t_ice) = if has_ice {
            (
                initial.h_ice,
                initial_value("t_ice", initial.t_ice, T_FLOOR, T_F),
            )
        } else {
            (limits.thickness_floor, T_F)
        };
        let (h_snow, t_snow) = if has_ice && initial.h_snow >= limits.h_snow_min {
            (
                initial.h_snow,
                initial_value("t_snow", initial.t_snow, T_FLOOR, T_F),
            )
        } else if has_ice {
            (limits.thickness_floor, t_ice)
        } else {
            (limits.thickness_floor, T_F)
        };

        let h_b1 = initial.h_b1.unwrap_or(config.depth_bs);
        let t_b1 = initial.t_b1.unwrap_or(config.t_bs);

        let t_sfc = if h_snow >= limits.h_snow_min && has_ice {
            t_snow
        } else if has_ice {
            t_ice
        } else {
            t_wml
        };

        Ok(Self {
            t_snow,
            t_ice,
            t_wml,
            t_mnw,
            t_bot,
            t_b1,
            h_snow,
            h_ice,
            h_ml,
            h_b1,
            shape: ThermoclineShape::from_c_t(c_t),
            t_sfc,
        })
    }

    pub fn to_json(&self) -> FlakeResult<String> {
        serde_json::to_string(self).map_err(|e| FlakeError::ConfigParse(e.to_string()))
    }

    pub fn from_json(content: &str) -> FlakeResult<Self> {
        serde_json::from_str(content).map_err(|e| FlakeError::ConfigParse(e.to_string()))
    }
}

/// Limit an initial value to `[lower, upper]`, warning when it changes.
fn initial_value(
    quantity: &str,
    value: FloatValue,
    lower: FloatValue,
    upper: FloatValue,
) -> FloatValue {
    let bounded = value.clamp(lower, upper);
    if bounded != value {
        warn!(
            "initial {} {} outside [{}, {}], using {}",
            quantity, value, lower, upper, bounded
        );
    }
    bounded
}

/// Initial conditions of a run.
///
/// Unset sediment values start the sediment with no thermal wave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Mixed-layer temperature (K).
    /// Default: 277.15
    pub t_wml: FloatValue,
    /// Bottom temperature (K).
    /// Default: 277.15
    pub t_bot: FloatValue,
    /// Mean column temperature (K). Derived from the profile when unset.
    /// Default: None
    pub t_mnw: Option<FloatValue>,
    /// Mixed-layer depth (m), limited to the lake depth.
    /// Default: 3.0
    pub h_ml: FloatValue,
    /// Thermocline shape factor.
    /// Default: 0.65
    pub c_t: FloatValue,
    /// Default: 0.0
    pub h_ice: FloatValue,
    /// Default: 273.15
    pub t_ice: FloatValue,
    /// Default: 0.0
    pub h_snow: FloatValue,
    /// Default: 273.15
    pub t_snow: FloatValue,
    /// Thickness of the upper sediment layer (m).
    /// Default: None (sediment depth)
    pub h_b1: Option<FloatValue>,
    /// Temperature at the base of the upper sediment layer (K).
    /// Default: None (climatological sediment temperature)
    pub t_b1: Option<FloatValue>,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            t_wml: 277.15,
            t_bot: 277.15,
            t_mnw: None,
            h_ml: 3.0,
            c_t: C_T_MIN,
            h_ice: 0.0,
            t_ice: T_F,
            h_snow: 0.0,
            t_snow: T_F,
            h_b1: None,
            t_b1: None,
        }
    }
}

impl InitialConditions {
    fn validate(&self) -> FlakeResult<()> {
        let temperatures = [
            ("t_wml", Some(self.t_wml)),
            ("t_bot", Some(self.t_bot)),
            ("t_mnw", self.t_mnw),
            ("t_ice", Some(self.t_ice)),
            ("t_snow", Some(self.t_snow)),
            ("t_b1", self.t_b1),
        ];
        for (name, value) in temperatures {
            if let Some(value) = value {
                if !(value > 0.0) || !value.is_finite() {
                    return Err(FlakeError::InvalidConfiguration(format!(
                        "initial {} must be a positive temperature, got {}",
                        name, value
                    )));
                }
            }
        }
        let thicknesses = [
            ("h_ml", Some(self.h_ml)),
            ("h_ice", Some(self.h_ice)),
            ("h_snow", Some(self.h_snow)),
            ("h_b1", self.h_b1),
        ];
        for (name, value) in thicknesses {
            if let Some(value) = value {
                if !(value >= 0.0) || !value.is_finite() {
                    return Err(FlakeError::InvalidConfiguration(format!(
                        "initial {} must not be negative, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::T_R;
    use is_close::is_close;

    #[test]
    fn shape_at_bounds() {
        let shape = ThermoclineShape::from_c_t(C_T_MIN);
        assert!(is_close!(shape.phi_t_pr0, 2.0));
        assert!(is_close!(shape.c_tt, 11.0 / 18.0 * 0.65 - 7.0 / 45.0));
        assert!(is_close!(shape.c_q, 2.0 * shape.c_tt / C_T_MIN));

        let shape = ThermoclineShape::from_c_t(C_T_MAX);
        assert!(is_close!(shape.phi_t_pr0, 4.0));
    }

    #[test]
    fn cold_start_open_water() {
        let config = LakeConfig::default();
        let initial = InitialConditions {
            t_wml: 285.0,
            t_bot: 280.0,
            h_ml: 5.0,
            ..InitialConditions::default()
        };
        let state = LakeState::cold_start(&initial, &config).unwrap();

        assert!(!state.has_ice(&config.limits));
        assert!(is_close!(state.h_ice, config.limits.thickness_floor));
        assert!(is_close!(state.t_ice, T_F));
        assert!(is_close!(state.t_sfc, 285.0));
        assert!(is_close!(state.t_mnw, 285.0 - 0.65 * 0.5 * 5.0));
        assert!(is_close!(state.h_b1, config.depth_bs));
        assert!(is_close!(state.t_b1, config.t_bs));
    }

    #[test]
    fn cold_start_with_ice_and_snow() {
        let config = LakeConfig::default();
        let initial = InitialConditions {
            t_wml: 275.0,
            t_bot: T_R,
            h_ml: 0.0,
            h_ice: 0.3,
            t_ice: 265.0,
            h_snow: 0.1,
            t_snow: 260.0,
            ..InitialConditions::default()
        };
        let state = LakeState::cold_start(&initial, &config).unwrap();
        assert!(state.has_ice(&config.limits));
        assert!(state.has_snow(&config.limits));
        assert!(is_close!(state.t_wml, T_F));
        assert!(is_close!(state.t_sfc, 260.0));
    }

    #[test]
    fn cold_start_clamps_shape_factor() {
        let config = LakeConfig::default();
        let initial = InitialConditions {
            c_t: 0.5,
            ..InitialConditions::default()
        };
        let state = LakeState::cold_start(&initial, &config).unwrap();
        assert!(is_close!(state.shape.c_t, C_T_MIN));
    }

    #[test]
    fn cold_start_limits_out_of_range_values() {
        let config = LakeConfig {
            depth_w: 8.0,
            ..LakeConfig::default()
        };
        let initial = InitialConditions {
            t_wml: 271.0,
            t_bot: 270.0,
            t_mnw: Some(269.0),
            h_ml: 12.0,
            ..InitialConditions::default()
        };
        let state = LakeState::cold_start(&initial, &config).unwrap();
        assert!(is_close!(state.t_wml, T_F));
        assert!(is_close!(state.t_bot, T_F));
        assert!(is_close!(state.t_mnw, T_F));
        assert!(is_close!(state.h_ml, config.depth_w));
        assert!(is_close!(state.t_sfc, T_F));

        let frozen = InitialConditions {
            h_ice: 0.2,
            t_ice: 280.0,
            ..InitialConditions::default()
        };
        let state = LakeState::cold_start(&frozen, &config).unwrap();
        assert!(is_close!(state.t_ice, T_F));
    }

    #[test]
    fn cold_start_rejects_negative_thickness() {
        let initial = InitialConditions {
            h_ice: -1.0,
            ..InitialConditions::default()
        };
        assert!(LakeState::cold_start(&initial, &LakeConfig::default()).is_err());
    }

    #[test]
    fn json_round_trip() {
        let state =
            LakeState::cold_start(&InitialConditions::default(), &LakeConfig::default()).unwrap();
        let restored = LakeState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(state, restored);
    }
}
