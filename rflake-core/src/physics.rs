//! Physical constants, equation of state and empirical closure constants
//!
//! The water equation of state is quadratic about the temperature of maximum
//! density $T_r$,
//!
//! $$\rho_w(T) = \rho_r \left[1 - \tfrac{1}{2} a_T (T - T_r)^2\right]$$
//!
//! so the buoyancy parameter entering every mixing closure is linear in
//! temperature:
//!
//! $$\beta(T) = g\, a_T\, (T - T_r)$$
//!
//! Snow density and conductivity grow with snow depth following the
//! compaction laws used for lake snow cover:
//!
//! $$\rho_S = \min\left(\rho_S^{max}, \frac{\rho_S^{min}}{1 - h_S \Gamma_\rho / \rho_w}\right)$$
//!
//! $$\kappa_S = \min\left(\kappa_S^{max}, \kappa_S^{min} + h_S \Gamma_\kappa \rho_S / \rho_w\right)$$

use crate::FloatValue;

/// Acceleration due to gravity (m s⁻²).
pub const GRAVITY: FloatValue = 9.81;
/// Temperature of maximum density of fresh water (K).
pub const T_R: FloatValue = 277.13;
/// Fresh water freezing point (K).
pub const T_F: FloatValue = 273.15;
/// Equation of state coefficient (K⁻²).
pub const A_T: FloatValue = 1.6509e-5;
/// Lowest temperature any ice or snow surface may take (K).
pub const T_FLOOR: FloatValue = 73.15;

/// Density of fresh water (kg m⁻³).
pub const RHO_W: FloatValue = 1.0e3;
/// Density of ice (kg m⁻³).
pub const RHO_I: FloatValue = 9.1e2;
/// Minimum snow density (kg m⁻³).
pub const RHO_S_MIN: FloatValue = 1.0e2;
/// Maximum snow density (kg m⁻³).
pub const RHO_S_MAX: FloatValue = 4.0e2;
/// Empirical parameter of the snow density law (kg m⁻⁴).
pub const GAMMA_RHO_S: FloatValue = 2.0e2;
/// Latent heat of fusion (J kg⁻¹).
pub const L_F: FloatValue = 3.3e5;

/// Specific heat of water (J kg⁻¹ K⁻¹).
pub const C_W: FloatValue = 4.2e3;
/// Specific heat of ice (J kg⁻¹ K⁻¹).
pub const C_I: FloatValue = 2.1e3;
/// Specific heat of snow (J kg⁻¹ K⁻¹).
pub const C_S: FloatValue = 2.1e3;

/// Molecular heat conductivity of water (W m⁻¹ K⁻¹).
pub const KAPPA_W: FloatValue = 5.46e-1;
/// Molecular heat conductivity of ice (W m⁻¹ K⁻¹).
pub const KAPPA_I: FloatValue = 2.29;
/// Minimum snow heat conductivity (W m⁻¹ K⁻¹).
pub const KAPPA_S_MIN: FloatValue = 0.2;
/// Maximum snow heat conductivity (W m⁻¹ K⁻¹).
pub const KAPPA_S_MAX: FloatValue = 1.5;
/// Empirical parameter of the snow conductivity law (W m⁻² K⁻¹).
pub const GAMMA_KAPPA_S: FloatValue = 1.3;

// Convective boundary layer entrainment
pub const C_CBL_1: FloatValue = 0.17;
pub const C_CBL_2: FloatValue = 1.0;

// Zilitinkevich and Mironov (1996) stable boundary layer depth
pub const C_SBL_ZM_N: FloatValue = 0.5;
pub const C_SBL_ZM_S: FloatValue = 10.0;
pub const C_SBL_ZM_I: FloatValue = 20.0;

/// Relaxation constant of the mixed-layer depth.
pub const C_RELAX_H: FloatValue = 0.030;
/// Relaxation constant of the thermocline shape factor.
pub const C_RELAX_C: FloatValue = 0.0030;

/// Lower bound of the thermocline shape factor.
pub const C_T_MIN: FloatValue = 0.65;
/// Upper bound of the thermocline shape factor.
pub const C_T_MAX: FloatValue = 0.8;
pub const PHI_T_PR0_1: FloatValue = 40.0 / 3.0;
pub const PHI_T_PR0_2: FloatValue = 20.0 / 3.0;
pub const C_TT_1: FloatValue = 11.0 / 18.0;
pub const C_TT_2: FloatValue = 7.0 / 45.0;

// Bottom sediment profile
pub const C_B1: FloatValue = 2.0 / 3.0;
pub const C_B2: FloatValue = 3.0 / 5.0;
pub const PHI_B1_PR0: FloatValue = 2.0;

// Snow profile
pub const C_S_LIN: FloatValue = 0.5;
pub const PHI_S_PR0_LIN: FloatValue = 1.0;

// Ice profile (Mironov and Ritter 2004)
pub const C_I_LIN: FloatValue = 0.5;
pub const PHI_I_PR0_LIN: FloatValue = 1.0;
pub const PHI_I_PR1_LIN: FloatValue = 1.0;
pub const PHI_I_AST_MR: FloatValue = 2.0;
pub const C_I_MR: FloatValue = 1.0 / 12.0;
/// Maximum ice thickness representable by the ice profile (m).
pub const H_ICE_MAX: FloatValue = 3.0;

/// Buoyancy parameter $\beta(T) = g a_T (T - T_r)$ (m s⁻² K⁻¹).
pub fn buoyancy_parameter(t_water: FloatValue) -> FloatValue {
    GRAVITY * A_T * (t_water - T_R)
}

/// Snow density as a function of snow depth (kg m⁻³), bounded to
/// `[RHO_S_MIN, RHO_S_MAX]`.
///
/// `c_small` keeps the denominator positive for deep snow.
pub fn snow_density(h_snow: FloatValue, c_small: FloatValue) -> FloatValue {
    let compaction = (1.0 - h_snow * GAMMA_RHO_S / RHO_W).max(c_small);
    (RHO_S_MIN / compaction).clamp(RHO_S_MIN, RHO_S_MAX)
}

/// Snow heat conductivity as a function of snow depth (W m⁻¹ K⁻¹), bounded
/// to `[KAPPA_S_MIN, KAPPA_S_MAX]`.
pub fn snow_conductivity(h_snow: FloatValue, c_small: FloatValue) -> FloatValue {
    let kappa =
        KAPPA_S_MIN + h_snow.max(0.0) * GAMMA_KAPPA_S * snow_density(h_snow, c_small) / RHO_W;
    kappa.min(KAPPA_S_MAX)
}

/// Shape functions of the self-similar ice temperature profile.
///
/// The ice profile departs from linear as the ice thickens, so the shape
/// factor and the profile derivatives at the ice base and surface depend on
/// the ice thickness relative to [`H_ICE_MAX`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceProfile {
    /// Shape factor of the ice temperature profile.
    pub c_i: FloatValue,
    /// Profile derivative at the ice-water interface.
    pub phi_i_pr0: FloatValue,
    /// Profile derivative at the ice surface.
    pub phi_i_pr1: FloatValue,
}

impl IceProfile {
    pub fn at(h_ice: FloatValue) -> Self {
        let ratio = h_ice / H_ICE_MAX;
        Self {
            c_i: C_I_LIN - C_I_MR * (1.0 + PHI_I_AST_MR) * ratio,
            phi_i_pr0: PHI_I_PR0_LIN - ratio,
            phi_i_pr1: PHI_I_PR1_LIN + PHI_I_AST_MR * ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn buoyancy_vanishes_at_maximum_density() {
        assert_eq!(buoyancy_parameter(T_R), 0.0);
    }

    #[test]
    fn buoyancy_is_antisymmetric_about_maximum_density() {
        for delta in [0.01, 0.5, 3.0, 12.0] {
            let above = buoyancy_parameter(T_R + delta);
            let below = buoyancy_parameter(T_R - delta);
            assert!(
                (above + below).abs() < 1e-12,
                "beta(T_r + {}) = {} but beta(T_r - {}) = {}",
                delta,
                above,
                delta,
                below
            );
            assert!(above > 0.0);
        }
    }

    #[test]
    fn snow_density_is_bounded() {
        assert!(is_close!(snow_density(0.0, 1e-10), RHO_S_MIN));
        assert!(is_close!(snow_density(10.0, 1e-10), RHO_S_MAX));
        let mid = snow_density(1.0, 1e-10);
        assert!(mid > RHO_S_MIN && mid <= RHO_S_MAX, "density {}", mid);
    }

    #[test]
    fn snow_conductivity_is_bounded() {
        assert!(is_close!(snow_conductivity(0.0, 1e-10), KAPPA_S_MIN));
        assert!(is_close!(snow_conductivity(10.0, 1e-10), KAPPA_S_MAX));
        let mut previous = KAPPA_S_MIN;
        for i in 1..50 {
            let kappa = snow_conductivity(i as FloatValue * 0.05, 1e-10);
            assert!(kappa >= previous, "conductivity decreased at {}", i);
            previous = kappa;
        }
    }

    #[test]
    fn ice_profile_is_linear_for_thin_ice() {
        let profile = IceProfile::at(0.0);
        assert!(is_close!(profile.c_i, C_I_LIN));
        assert!(is_close!(profile.phi_i_pr0, 1.0));
        assert!(is_close!(profile.phi_i_pr1, 1.0));

        let thick = IceProfile::at(H_ICE_MAX);
        assert!(is_close!(thick.c_i, 0.25));
        assert!(thick.phi_i_pr0.abs() < 1e-12);
    }
}
