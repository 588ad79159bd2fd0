//! Turbulent exchange between the lake surface and the atmosphere
//!
//! Bulk aerodynamic formulae give the momentum, sensible and latent heat
//! fluxes from the wind speed and the air-surface temperature and humidity
//! differences:
//!
//! $$\tau = \rho_a u_*^2, \quad H = -\rho_a c_p u_* \theta_*, \quad E = -\rho_a L u_* q_*$$
//!
//! Two schemes are provided. [`NeutralBulk`] uses constant exchange
//! coefficients. [`StabilityCorrected`] iterates on the Obukhov length with
//! Businger–Dyer stability functions and a fetch dependent Charnock
//! roughness over water.
//!
//! Fluxes follow the sign convention of [`rflake_core::forcing::ForcingBundle`]:
//! turbulent heat fluxes are positive upward and the momentum flux is
//! negative when momentum is transferred into the lake.

use log::debug;
use rflake_core::forcing::ForcingBundle;
use rflake_core::physics::{GRAVITY, L_F, RHO_W};
use rflake_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt::Debug;

/// von Kármán constant.
pub const VON_KARMAN: FloatValue = 0.40;
/// Specific heat of air at constant pressure (J kg⁻¹ K⁻¹).
pub const SPECIFIC_HEAT_AIR: FloatValue = 1005.0;
/// Gas constant of dry air (J kg⁻¹ K⁻¹).
pub const GAS_CONSTANT_DRY_AIR: FloatValue = 287.05;
/// Latent heat of evaporation (J kg⁻¹).
pub const LATENT_HEAT_EVAPORATION: FloatValue = 2.501e6;
/// Latent heat of sublimation (J kg⁻¹).
pub const LATENT_HEAT_SUBLIMATION: FloatValue = LATENT_HEAT_EVAPORATION + L_F;
/// Ratio of the molecular weights of water vapour and dry air.
pub const MOLECULAR_WEIGHT_RATIO: FloatValue = 0.622;
/// Kinematic viscosity of air (m² s⁻¹).
pub const KINEMATIC_VISCOSITY_AIR: FloatValue = 1.5e-5;

const VAPOUR_PRESSURE_REFERENCE: FloatValue = 610.78;
const TRIPLE_POINT: FloatValue = 273.16;

/// Saturation vapour pressure over water or ice (Pa), Magnus–Tetens form.
pub fn saturation_vapour_pressure(temperature: FloatValue, over_ice: bool) -> FloatValue {
    let (a, b) = if over_ice {
        (21.8745584, 7.66)
    } else {
        (17.2693882, 35.86)
    };
    VAPOUR_PRESSURE_REFERENCE * (a * (temperature - TRIPLE_POINT) / (temperature - b)).exp()
}

/// Specific humidity (kg kg⁻¹) for a vapour pressure and air pressure (Pa).
pub fn specific_humidity(vapour_pressure: FloatValue, pressure: FloatValue) -> FloatValue {
    MOLECULAR_WEIGHT_RATIO * vapour_pressure
        / (pressure - (1.0 - MOLECULAR_WEIGHT_RATIO) * vapour_pressure)
}

/// Saturation specific humidity at the surface.
pub fn saturation_specific_humidity(
    temperature: FloatValue,
    pressure: FloatValue,
    over_ice: bool,
) -> FloatValue {
    specific_humidity(saturation_vapour_pressure(temperature, over_ice), pressure)
}

/// Density of moist air (kg m⁻³).
pub fn air_density(
    temperature: FloatValue,
    specific_humidity: FloatValue,
    pressure: FloatValue,
) -> FloatValue {
    pressure / (GAS_CONSTANT_DRY_AIR * temperature * (1.0 + 0.608 * specific_humidity))
}

/// Near-surface atmospheric state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceAir {
    /// Wind speed (m s⁻¹).
    /// Default: 3.0
    pub u_a: FloatValue,
    /// Air temperature (K).
    /// Default: 283.15
    pub t_a: FloatValue,
    /// Specific humidity (kg kg⁻¹).
    /// Default: 0.006
    pub q_a: FloatValue,
    /// Surface air pressure (Pa).
    /// Default: 101325.0
    pub p_a: FloatValue,
    /// Height of the wind measurement (m).
    /// Default: 10.0
    pub height_u: FloatValue,
    /// Height of the temperature and humidity measurements (m).
    /// Default: 2.0
    pub height_tq: FloatValue,
}

impl Default for SurfaceAir {
    fn default() -> Self {
        Self {
            u_a: 3.0,
            t_a: 283.15,
            q_a: 0.006,
            p_a: 101325.0,
            height_u: 10.0,
            height_tq: 2.0,
        }
    }
}

impl SurfaceAir {
    pub fn density(&self) -> FloatValue {
        air_density(self.t_a, self.q_a, self.p_a)
    }
}

/// Fluxes returned by a [`SurfaceFluxScheme`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurbulentFluxes {
    /// Momentum flux (N m⁻², negative into the lake).
    pub q_momentum: FloatValue,
    /// Sensible heat flux (W m⁻², positive upward).
    pub q_sensible: FloatValue,
    /// Latent heat flux (W m⁻², positive upward).
    pub q_latent: FloatValue,
    /// Friction velocity in the air (m s⁻¹).
    pub u_star_air: FloatValue,
    /// Friction velocity in the surface water (m s⁻¹).
    pub u_star: FloatValue,
    /// Iterations used to reach the returned fluxes.
    pub iterations: usize,
    /// Whether the iteration met its tolerance.
    pub converged: bool,
}

impl TurbulentFluxes {
    fn from_scales(
        air: &SurfaceAir,
        u_star_air: FloatValue,
        theta_star: FloatValue,
        q_star: FloatValue,
        over_ice: bool,
    ) -> Self {
        let rho_a = air.density();
        let latent_heat = if over_ice {
            LATENT_HEAT_SUBLIMATION
        } else {
            LATENT_HEAT_EVAPORATION
        };
        Self {
            q_momentum: -rho_a * u_star_air.powi(2),
            q_sensible: -rho_a * SPECIFIC_HEAT_AIR * u_star_air * theta_star,
            q_latent: -rho_a * latent_heat * u_star_air * q_star,
            u_star_air,
            u_star: u_star_air * (rho_a / RHO_W).sqrt(),
            iterations: 0,
            converged: true,
        }
    }

    /// Copy the fluxes into a forcing bundle.
    pub fn apply_to(&self, forcing: &mut ForcingBundle) {
        forcing.q_momentum = self.q_momentum;
        forcing.q_sensible = self.q_sensible;
        forcing.q_latent = self.q_latent;
        forcing.u_star = self.u_star;
    }
}

/// A bulk scheme for the turbulent surface fluxes.
#[typetag::serde(tag = "scheme")]
pub trait SurfaceFluxScheme: Debug + Send + Sync {
    /// Fluxes between `air` and a surface at `t_sfc` (K).
    fn fluxes(
        &self,
        air: &SurfaceAir,
        t_sfc: FloatValue,
        fetch: FloatValue,
        over_ice: bool,
    ) -> TurbulentFluxes;
}

/// Constant exchange coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralBulk {
    /// Drag coefficient.
    /// Default: 1.3e-3
    pub c_d: FloatValue,
    /// Exchange coefficient for heat.
    /// Default: 1.3e-3
    pub c_h: FloatValue,
    /// Exchange coefficient for water vapour.
    /// Default: 1.3e-3
    pub c_e: FloatValue,
    /// Lower bound on the wind speed (m s⁻¹).
    /// Default: 0.1
    pub u_min: FloatValue,
}

impl Default for NeutralBulk {
    fn default() -> Self {
        Self {
            c_d: 1.3e-3,
            c_h: 1.3e-3,
            c_e: 1.3e-3,
            u_min: 0.1,
        }
    }
}

#[typetag::serde]
impl SurfaceFluxScheme for NeutralBulk {
    fn fluxes(
        &self,
        air: &SurfaceAir,
        t_sfc: FloatValue,
        _fetch: FloatValue,
        over_ice: bool,
    ) -> TurbulentFluxes {
        let u = air.u_a.max(self.u_min);
        let q_s = saturation_specific_humidity(t_sfc, air.p_a, over_ice);
        // Scales chosen so that u* θ* = -C_H U ΔT
        let u_star_air = self.c_d.sqrt() * u;
        let theta_star = self.c_h * u * (air.t_a - t_sfc) / u_star_air;
        let q_star = self.c_e * u * (air.q_a - q_s) / u_star_air;
        TurbulentFluxes::from_scales(air, u_star_air, theta_star, q_star, over_ice)
    }
}

/// Monin–Obukhov similarity with Businger–Dyer stability functions.
///
/// The iteration on the Obukhov length stops after `max_iterations` or once
/// the relative change of the inverse length falls below `tolerance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityCorrected {
    /// Default: 5
    pub max_iterations: usize,
    /// Relative tolerance on the Obukhov length.
    /// Default: 1e-3
    pub tolerance: FloatValue,
    /// Lower bound on the wind speed (m s⁻¹).
    /// Default: 0.1
    pub u_min: FloatValue,
    /// Charnock parameter for fully developed waves.
    /// Default: 0.012
    pub charnock_min: FloatValue,
    /// Charnock parameter for young waves at short fetch.
    /// Default: 0.1
    pub charnock_max: FloatValue,
    /// Dimensionless fetch at which waves are considered developed.
    /// Default: 1e5
    pub fetch_developed: FloatValue,
    /// Aerodynamic roughness of ice (m).
    /// Default: 1e-3
    pub z0_ice: FloatValue,
    /// Ratio of the scalar to the aerodynamic roughness.
    /// Default: 0.1
    pub scalar_roughness_ratio: FloatValue,
    /// Limit on the magnitude of the stability parameter z/L.
    /// Default: 10.0
    pub zeta_max: FloatValue,
}

impl Default for StabilityCorrected {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tolerance: 1.0e-3,
            u_min: 0.1,
            charnock_min: 1.2e-2,
            charnock_max: 1.0e-1,
            fetch_developed: 1.0e5,
            z0_ice: 1.0e-3,
            scalar_roughness_ratio: 0.1,
            zeta_max: 10.0,
        }
    }
}

/// Businger–Dyer integrated stability function for momentum.
pub fn psi_momentum(zeta: FloatValue) -> FloatValue {
    if zeta >= 0.0 {
        -5.0 * zeta
    } else {
        let x = (1.0 - 16.0 * zeta).powf(0.25);
        2.0 * ((1.0 + x) / 2.0).ln() + ((1.0 + x * x) / 2.0).ln() - 2.0 * x.atan() + FRAC_PI_2
    }
}

/// Businger–Dyer integrated stability function for heat and moisture.
pub fn psi_heat(zeta: FloatValue) -> FloatValue {
    if zeta >= 0.0 {
        -5.0 * zeta
    } else {
        let x = (1.0 - 16.0 * zeta).powf(0.25);
        2.0 * ((1.0 + x * x) / 2.0).ln()
    }
}

impl StabilityCorrected {
    /// Charnock parameter for the dimensionless fetch $g F / U^2$.
    pub fn charnock(&self, u: FloatValue, fetch: FloatValue) -> FloatValue {
        let fetch_n = GRAVITY * fetch / u.powi(2);
        self.charnock_min
            + (self.charnock_max - self.charnock_min)
                * (-(fetch_n / self.fetch_developed).cbrt()).exp()
    }

    /// Aerodynamic roughness (m).
    fn roughness(&self, u_star: FloatValue, charnock: FloatValue, over_ice: bool) -> FloatValue {
        if over_ice {
            self.z0_ice
        } else {
            (charnock * u_star.powi(2) / GRAVITY + 0.11 * KINEMATIC_VISCOSITY_AIR / u_star)
                .max(1.0e-5)
        }
    }

    fn zeta(&self, height: FloatValue, inverse_length: FloatValue) -> FloatValue {
        (height * inverse_length).clamp(-self.zeta_max, self.zeta_max)
    }
}

#[typetag::serde]
impl SurfaceFluxScheme for StabilityCorrected {
    fn fluxes(
        &self,
        air: &SurfaceAir,
        t_sfc: FloatValue,
        fetch: FloatValue,
        over_ice: bool,
    ) -> TurbulentFluxes {
        let u = air.u_a.max(self.u_min);
        let charnock = self.charnock(u, fetch);
        let q_s = saturation_specific_humidity(t_sfc, air.p_a, over_ice);
        // Potential temperature of the air relative to the surface
        let delta_theta = air.t_a + GRAVITY / SPECIFIC_HEAT_AIR * air.height_tq - t_sfc;
        let delta_q = air.q_a - q_s;

        let mut inverse_length: FloatValue = 0.0;
        let mut u_star = VON_KARMAN * u / (air.height_u / 1.0e-4).ln();
        let mut theta_star = 0.0;
        let mut q_star = 0.0;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iterations.max(1) {
            iterations += 1;
            let z0_m = self.roughness(u_star, charnock, over_ice);
            let z0_h = z0_m * self.scalar_roughness_ratio;

            let zeta_u = self.zeta(air.height_u, inverse_length);
            let zeta_t = self.zeta(air.height_tq, inverse_length);
            let momentum_resistance = ((air.height_u / z0_m).ln() - psi_momentum(zeta_u)).max(1.0);
            let scalar_resistance = ((air.height_tq / z0_h).ln() - psi_heat(zeta_t)).max(1.0);

            u_star = VON_KARMAN * u / momentum_resistance;
            theta_star = VON_KARMAN * delta_theta / scalar_resistance;
            q_star = VON_KARMAN * delta_q / scalar_resistance;

            let theta_v_star = theta_star * (1.0 + 0.608 * air.q_a) + 0.608 * air.t_a * q_star;
            let next = VON_KARMAN * GRAVITY * theta_v_star / (air.t_a * u_star.powi(2));

            let change = (next - inverse_length).abs();
            inverse_length = next;
            if change <= self.tolerance * next.abs() || next.abs() < 1.0e-12 {
                converged = true;
                break;
            }
        }

        if !converged {
            debug!(
                "surface flux iteration stopped after {} iterations (1/L={})",
                iterations, inverse_length
            );
        }

        TurbulentFluxes {
            iterations,
            converged,
            ..TurbulentFluxes::from_scales(air, u_star, theta_star, q_star, over_ice)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn air(u_a: FloatValue, t_a: FloatValue) -> SurfaceAir {
        SurfaceAir {
            u_a,
            t_a,
            ..SurfaceAir::default()
        }
    }

    #[test]
    fn saturation_vapour_pressure_at_triple_point() {
        assert!(is_close!(saturation_vapour_pressure(TRIPLE_POINT, false), 610.78));
        assert!(is_close!(saturation_vapour_pressure(TRIPLE_POINT, true), 610.78));
        // Ice saturates at a lower pressure than supercooled water
        assert!(
            saturation_vapour_pressure(263.15, true) < saturation_vapour_pressure(263.15, false)
        );
        assert!(saturation_vapour_pressure(303.15, false) > 4000.0);
    }

    #[test]
    fn specific_humidity_from_vapour_pressure() {
        let q = specific_humidity(1000.0, 101325.0);
        assert!(is_close!(q, 0.622 * 1000.0 / (101325.0 - 0.378 * 1000.0)));
    }

    #[test]
    fn neutral_bulk_signs() {
        let scheme = NeutralBulk::default();
        // Warm water under cold air loses heat
        let fluxes = scheme.fluxes(&air(5.0, 280.0), 290.0, 1000.0, false);
        assert!(fluxes.q_sensible > 0.0);
        assert!(fluxes.q_latent > 0.0);
        assert!(fluxes.q_momentum < 0.0);
        let rho_a = air(5.0, 280.0).density();
        assert!(is_close!(fluxes.q_sensible, rho_a * SPECIFIC_HEAT_AIR * 1.3e-3 * 5.0 * 10.0));
        assert!(is_close!(fluxes.q_momentum, -rho_a * 1.3e-3 * 25.0));
        assert!(is_close!(fluxes.u_star, (fluxes.q_momentum.abs() / RHO_W).sqrt()));
    }

    #[test]
    fn stability_functions() {
        assert_eq!(psi_momentum(0.0), 0.0);
        assert!(psi_heat(0.0).abs() < 1e-12);
        assert!(psi_momentum(0.5) < 0.0);
        assert!(psi_momentum(-0.5) > 0.0);
        assert!(psi_heat(-0.5) > psi_momentum(-0.5));
    }

    #[test]
    fn charnock_decreases_with_fetch() {
        let scheme = StabilityCorrected::default();
        let short = scheme.charnock(5.0, 10.0);
        let long = scheme.charnock(5.0, 1.0e6);
        assert!(short > long);
        assert!(long >= scheme.charnock_min && short <= scheme.charnock_max);
    }

    #[test]
    fn iteration_is_bounded() {
        let scheme = StabilityCorrected {
            max_iterations: 2,
            tolerance: 1e-12,
            ..StabilityCorrected::default()
        };
        let fluxes = scheme.fluxes(&air(1.0, 270.0), 285.0, 1000.0, false);
        assert!(fluxes.iterations <= 2);
        assert!(fluxes.q_sensible.is_finite() && fluxes.q_latent.is_finite());
    }

    #[test]
    fn unstable_air_enhances_exchange() {
        let scheme = StabilityCorrected::default();
        // Surface at the potential temperature of the air
        let t_neutral = 285.0 + GRAVITY / SPECIFIC_HEAT_AIR * 2.0;
        let neutral = scheme.fluxes(&air(4.0, 285.0), t_neutral, 5000.0, false);
        let unstable = scheme.fluxes(&air(4.0, 275.0), 285.0, 5000.0, false);
        let stable = scheme.fluxes(&air(4.0, 295.0), 285.0, 5000.0, false);
        assert!(neutral.q_sensible.abs() < 1.0);
        assert!(unstable.q_sensible > 0.0);
        assert!(stable.q_sensible < 0.0);
        // Transfer per unit temperature difference is larger in unstable air
        assert!(unstable.q_sensible / 10.0 > -stable.q_sensible / 10.0);
        assert!(unstable.u_star_air > stable.u_star_air);
    }

    #[test]
    fn sublimation_over_ice() {
        let scheme = NeutralBulk::default();
        let dry = SurfaceAir {
            q_a: 0.001,
            ..air(5.0, 263.15)
        };
        let over_ice = scheme.fluxes(&dry, 265.0, 1000.0, true);
        assert!(over_ice.q_latent > 0.0);
    }

    #[test]
    fn scheme_round_trips_through_json() {
        let scheme: Box<dyn SurfaceFluxScheme> = Box::new(StabilityCorrected::default());
        let serialised = serde_json::to_string(&scheme).unwrap();
        assert!(serialised.contains("\"scheme\":\"StabilityCorrected\""));
        let restored: Box<dyn SurfaceFluxScheme> = serde_json::from_str(&serialised).unwrap();
        let a = scheme.fluxes(&air(5.0, 280.0), 285.0, 1000.0, false);
        let b = restored.fluxes(&air(5.0, 280.0), 285.0, 1000.0, false);
        assert_eq!(a, b);
    }
}
