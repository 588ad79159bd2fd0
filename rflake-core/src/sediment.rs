//! Two-layer bottom sediment
//!
//! The temperature wave penetrating the sediment is described by an upper
//! layer of thickness $H_{B1}$, bounded below by the temperature extremum
//! $T_{B1}$, over a deeper layer relaxing to the climatological temperature
//! $T_{bs}$ at depth $L_{bs}$. The heat flux from the water into the sediment
//! is
//!
//! $$Q_{bot} = -\kappa_w \frac{T_{B1} - T_{bot}}{H_{B1}} \Phi'_{B1}(0)$$
//!
//! While the wave is young the layer grows by pure diffusion,
//!
//! $$H_{B1}^{n+1} = \sqrt{H_{B1}^2 + \frac{2\Phi'_{B1}(0)}{1 - C_{B1}} \frac{\kappa_w}{\rho_w c_w} \Delta t}$$
//!
//! after which the heat budget of the upper layer sets its growth.

use crate::config::LakeConfig;
use crate::constraints::{ClampKind, Diagnostics};
use crate::physics::{C_B1, C_B2, C_W, KAPPA_W, PHI_B1_PR0, RHO_W, T_R};
use crate::state::LakeState;
use crate::FloatValue;
use log::debug;

/// Sediment variables after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SedimentOutcome {
    pub h_b1: FloatValue,
    pub t_b1: FloatValue,
    pub d_h_b1_dt: FloatValue,
    /// The thermal wave reached the base of the active layer and has been
    /// reset.
    pub thermal_wave_vanished: bool,
}

/// Heat flux from the water into the sediment (W m⁻², positive downward).
///
/// Zero when the sediment is switched off.
pub fn bottom_heat_flux(prev: &LakeState, config: &LakeConfig) -> FloatValue {
    if !config.sediments_on {
        return 0.0;
    }
    -KAPPA_W * (prev.t_b1 - prev.t_bot) / prev.h_b1.max(config.limits.h_b1_min) * PHI_B1_PR0
}

/// Advance the sediment over one step.
///
/// `t_bot` is the new bottom temperature and `q_bot`, `i_bot` the heat and
/// shortwave fluxes reaching the lake bottom during the step.
pub fn advance(
    prev: &LakeState,
    t_bot: FloatValue,
    q_bot: FloatValue,
    i_bot: FloatValue,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> SedimentOutcome {
    if !config.sediments_on {
        return SedimentOutcome {
            h_b1: prev.h_b1,
            t_b1: prev.t_b1,
            d_h_b1_dt: 0.0,
            thermal_wave_vanished: false,
        };
    }

    let limits = &config.limits;
    let depth_bs = config.depth_bs;
    let del_time = config.del_time;
    let rho_c = RHO_W * C_W;

    // A wave at the base restarts from the bottom
    let (h_b1_p, t_b1_p) = if prev.h_b1 >= depth_bs - limits.h_b1_min {
        (0.0, prev.t_bot)
    } else {
        (prev.h_b1, prev.t_b1)
    };

    let diffusive_growth = 2.0 * PHI_B1_PR0 / (1.0 - C_B1) * KAPPA_W / rho_c * del_time;
    let truncation_depth = diffusive_growth.sqrt().min(0.9 * depth_bs);
    let lower_gradient = C_B2 / (1.0 - C_B2) * (config.t_bs - t_b1_p) / (depth_bs - h_b1_p);

    let d_h_b1_dt = if h_b1_p < truncation_depth {
        ((h_b1_p.powi(2) + diffusive_growth).sqrt() - h_b1_p) / del_time
    } else {
        let heating =
            (q_bot + i_bot) / h_b1_p / rho_c - (1.0 - C_B1) * (t_bot - prev.t_bot) / del_time;
        let response = (1.0 - C_B1) * (prev.t_bot - t_b1_p) / h_b1_p + C_B1 * lower_gradient;
        if response.abs() < limits.c_small {
            diagnostics.record(
                ClampKind::DegenerateGeometry,
                "sediment_response",
                response,
                limits.c_small,
            );
            0.0
        } else {
            heating / response
        }
    };

    let h_b1 = h_b1_p + d_h_b1_dt * del_time;
    let t_b1 = t_b1_p + lower_gradient * d_h_b1_dt * del_time;

    let reached_base = h_b1 >= depth_bs - limits.h_b1_min;
    // The wave may not carry the sediment across the temperature of maximum
    // density away from the bottom water
    let crossed_t_r = (t_bot < T_R && t_b1 > T_R) || (t_bot >= T_R && t_b1 < T_R);
    if reached_base || crossed_t_r {
        debug!(
            "sediment thermal wave vanished (h_b1={}, t_b1={}), resetting to the base",
            h_b1, t_b1
        );
        return SedimentOutcome {
            h_b1: depth_bs,
            t_b1: config.t_bs,
            d_h_b1_dt,
            thermal_wave_vanished: true,
        };
    }

    SedimentOutcome {
        h_b1,
        t_b1,
        d_h_b1_dt,
        thermal_wave_vanished: false,
    }
}
