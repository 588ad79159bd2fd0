//! Mixed layer and thermocline evolution
//!
//! The mean column temperature follows directly from the heat budget of the
//! column,
//!
//! $$\frac{dT_{mnw}}{dt} = \frac{Q_w - Q_{bot} + I_w - I_{bot}}{\rho_w c_w D}$$
//!
//! The mixed-layer depth evolves under one of two closures in open water.
//! When the surface buoyancy flux $\beta Q_* / (\rho_w c_w)$ is negative the
//! mixed layer is a convective boundary layer deepening by entrainment, with
//! the convective velocity scale
//!
//! $$w_* = \left(-\beta \frac{Q_*}{\rho_w c_w} h\right)^{1/3}$$
//!
//! Otherwise the mixed layer relaxes toward the equilibrium depth of a
//! wind-mixed stable boundary layer (Zilitinkevich and Mironov 1996),
//!
//! $$h_e = \frac{u_*^3}{\left(|f|/C_n + N/C_i\right) u_*^2 + \beta Q_*/(\rho_w c_w C_s)}$$
//!
//! integrated analytically over the step:
//!
//! $$h^{n+1} = h_e - (h_e - h^n) \exp\left(-C_{rh} \frac{u_*}{h_e} \Delta t\right)$$
//!
//! Under ice the mixed layer temperature is pinned at the freezing point and
//! the thermocline either keeps its shape or is eroded from below by
//! convection once the bottom reaches the temperature of maximum density.

use crate::config::LakeConfig;
use crate::constraints::{ClampKind, Diagnostics};
use crate::driver::HeatFluxes;
use crate::forcing::ForcingBundle;
use crate::ice::{IceOutcome, IceRegime};
use crate::physics::{
    buoyancy_parameter, C_CBL_1, C_CBL_2, C_RELAX_C, C_RELAX_H, C_SBL_ZM_I, C_SBL_ZM_N,
    C_SBL_ZM_S, C_TT_2, C_T_MAX, C_T_MIN, C_W, RHO_W, T_F, T_R,
};
use crate::radiation::RadiationProfile;
use crate::state::LakeState;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderIceRegime {
    /// Ice formed this step.
    JustFrozen,
    /// Bottom colder than the temperature of maximum density, the profile
    /// keeps its depth and shape.
    Conductive,
    /// Bottom at the temperature of maximum density, a convective layer grows
    /// from below.
    BottomConvection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixingRegime {
    UnderIce(UnderIceRegime),
    /// Open water with a destabilising surface buoyancy flux.
    Convective,
    /// Open water mixed by the wind against a stabilising buoyancy flux.
    WindDriven,
}

/// Water column variables after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterColumn {
    pub regime: MixingRegime,
    pub t_mnw: FloatValue,
    pub t_wml: FloatValue,
    pub t_bot: FloatValue,
    pub h_ml: FloatValue,
    pub c_t: FloatValue,
    pub d_h_ml_dt: FloatValue,
    /// Convective velocity scale used by the closures (m s⁻¹).
    pub w_star: FloatValue,
}

/// Depth of the convective layer in equilibrium with volumetric heating.
///
/// Solar heating below the surface balances the surface heat loss at a
/// depth set by the ratio of the two fluxes.
pub fn convective_equilibrium_depth(
    q_w: FloatValue,
    i_w: FloatValue,
    t_wml: FloatValue,
    config: &LakeConfig,
) -> FloatValue {
    let limits = &config.limits;
    let ratio = -q_w / i_w.max(limits.c_small);
    if ratio > 0.0 && ratio < 1.0 && t_wml > T_R {
        let scale = (6.0 * ratio).sqrt() + 2.0 * ratio / (1.0 - ratio);
        (scale / config.extincoef_water_typ).min(config.depth_w)
    } else {
        0.0
    }
}

/// Mean buoyancy frequency of the thermocline (s⁻¹).
pub fn thermocline_buoyancy_frequency(
    t_wml: FloatValue,
    t_bot: FloatValue,
    h_ml: FloatValue,
    config: &LakeConfig,
) -> FloatValue {
    let thickness = config.depth_w - h_ml;
    if thickness >= config.limits.h_ml_min {
        let n_squared = buoyancy_parameter(0.5 * (t_wml + t_bot)) * (t_wml - t_bot);
        (n_squared.max(0.0) / thickness).sqrt()
    } else {
        0.0
    }
}

/// Advance the water column over one step.
pub fn advance(
    prev: &LakeState,
    ice: &IceOutcome,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    forcing: &ForcingBundle,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> WaterColumn {
    let limits = &config.limits;
    let depth_w = config.depth_w;

    // Ice that just formed takes up the surface heat loss
    let q_w = if ice.regime == IceRegime::IceForming {
        0.0
    } else {
        fluxes.q_w
    };
    let d_t_mnw_dt =
        (q_w - fluxes.q_bot + radiation.i_w - radiation.i_bot) / (RHO_W * C_W * depth_w);
    let t_mnw = diagnostics.at_least_freezing(
        "t_mnw",
        prev.t_mnw + d_t_mnw_dt * config.del_time,
        limits,
    );

    if ice.present {
        under_ice(prev, ice, t_mnw, config, diagnostics)
    } else {
        open_water(
            prev,
            t_mnw,
            d_t_mnw_dt,
            fluxes,
            radiation,
            forcing,
            config,
            diagnostics,
        )
    }
}

/// Bottom temperature consistent with the profile parameters.
fn profile_bottom_temperature(
    t_wml: FloatValue,
    t_mnw: FloatValue,
    c_t: FloatValue,
    h_ml: FloatValue,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> FloatValue {
    let weight = c_t * (1.0 - h_ml / config.depth_w);
    if weight < config.limits.c_small {
        diagnostics.record(
            ClampKind::DegenerateGeometry,
            "thermocline_thickness",
            config.depth_w - h_ml,
            0.0,
        );
        t_mnw
    } else {
        t_wml - (t_wml - t_mnw) / weight
    }
}

fn under_ice(
    prev: &LakeState,
    ice: &IceOutcome,
    t_mnw: FloatValue,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> WaterColumn {
    let limits = &config.limits;
    let depth_w = config.depth_w;
    let t_mnw = t_mnw.min(T_R);
    let t_wml = T_F;

    let (regime, h_ml, c_t, t_bot) = if ice.regime == IceRegime::IceForming {
        let (h_ml, c_t) = if prev.h_ml >= depth_w - limits.h_ml_min {
            (0.0, C_T_MIN)
        } else {
            (prev.h_ml, prev.shape.c_t)
        };
        let t_bot = profile_bottom_temperature(t_wml, t_mnw, c_t, h_ml, config, diagnostics);
        (UnderIceRegime::JustFrozen, h_ml, c_t, t_bot)
    } else if prev.t_bot < T_R {
        let (h_ml, c_t) = (prev.h_ml, prev.shape.c_t);
        let t_bot = profile_bottom_temperature(t_wml, t_mnw, c_t, h_ml, config, diagnostics);
        (UnderIceRegime::Conductive, h_ml, c_t, t_bot)
    } else {
        let t_bot = T_R;
        let (h_ml, c_t) = if prev.h_ml >= limits.c_small {
            let c_t = prev.shape.c_t;
            let h_ml = depth_w * (1.0 - (t_wml - t_mnw) / (t_wml - t_bot) / c_t);
            (h_ml.max(0.0), c_t)
        } else {
            let h_ml = prev.h_ml;
            let c_t = (t_wml - t_mnw) / (t_wml - t_bot) / (1.0 - h_ml / depth_w);
            (h_ml, c_t)
        };
        (UnderIceRegime::BottomConvection, h_ml, c_t, t_bot)
    };

    WaterColumn {
        regime: MixingRegime::UnderIce(regime),
        t_mnw,
        t_wml,
        t_bot: t_bot.min(T_R),
        h_ml,
        c_t,
        d_h_ml_dt: (h_ml - prev.h_ml) / config.del_time,
        w_star: 0.0,
    }
}

#[allow(clippy::too_many_arguments)]
fn open_water(
    prev: &LakeState,
    t_mnw: FloatValue,
    d_t_mnw_dt: FloatValue,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    forcing: &ForcingBundle,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> WaterColumn {
    let limits = &config.limits;
    let depth_w = config.depth_w;
    let del_time = config.del_time;
    let shape = prev.shape;
    let h_p = prev.h_ml;

    let u_star = forcing.water_friction_velocity();
    let buoyancy_flux = buoyancy_parameter(prev.t_wml) * fluxes.q_star / (RHO_W * C_W);
    let convective = buoyancy_flux < 0.0;
    let w_star = if convective {
        (-buoyancy_flux * h_p).cbrt()
    } else {
        0.0
    }
    .max(forcing.w_star);

    let conv_equil_h = convective_equilibrium_depth(fluxes.q_w, radiation.i_w, prev.t_wml, config);
    let n_t_mean = thermocline_buoyancy_frequency(prev.t_wml, prev.t_bot, h_p, config);

    // Shape factor relaxation rate, sign set by the mixed-layer tendency
    let velocity = w_star.max(u_star).max(limits.u_star_min);
    let timescale = n_t_mean * (depth_w - h_p).powi(2) / C_RELAX_C / velocity.powi(2);
    let c_t_rate = (C_T_MAX - C_T_MIN) / timescale.max(limits.c_small);

    let (regime, h_ml, c_t_rate) = if convective {
        let c_t_n = (shape.c_t + c_t_rate * del_time).clamp(C_T_MIN, C_T_MAX);
        let c_t_rate = (c_t_n - shape.c_t) / del_time;

        let h_ml = if h_p <= depth_w - limits.h_ml_min {
            let d_h_dt = if h_p <= limits.h_ml_min {
                // Spin-up from a vanishing mixed layer
                C_CBL_1 / C_CBL_2 * w_star.max(limits.c_small)
            } else {
                entrainment_rate(prev, fluxes, radiation, w_star, c_t_rate, config, diagnostics)
            };
            conv_equil_h.max((h_p + d_h_dt * del_time).min(depth_w))
        } else {
            depth_w
        };
        (MixingRegime::Convective, h_ml, c_t_rate)
    } else {
        let u_star = u_star.max(limits.u_star_min);
        let stability = (config.coriolis_parameter().abs() / C_SBL_ZM_N + n_t_mean / C_SBL_ZM_I)
            * u_star.powi(2)
            + buoyancy_flux / C_SBL_ZM_S;
        let h_equilibrium = (u_star.powi(3) / stability.max(limits.c_small))
            .max(limits.h_ml_min)
            .min(limits.h_ml_max)
            .max(conv_equil_h);

        let decay =
            (-(C_RELAX_H * u_star / h_equilibrium * del_time).min(limits.max_exp_arg)).exp();
        let h_ml = (h_equilibrium - (h_equilibrium - h_p) * decay)
            .max(limits.h_ml_min)
            .min(depth_w);

        let c_t_rate = if h_ml <= h_p { -c_t_rate } else { c_t_rate };
        let c_t_n = (shape.c_t + c_t_rate * del_time).clamp(C_T_MIN, C_T_MAX);
        (MixingRegime::WindDriven, h_ml, (c_t_n - shape.c_t) / del_time)
    };

    let h_ml = if h_ml < 0.0 {
        diagnostics.record(ClampKind::DegenerateGeometry, "h_ml", h_ml, 0.0);
        0.0
    } else {
        h_ml
    };
    let c_t = shape.c_t + c_t_rate * del_time;
    let d_h_ml_dt = (h_ml - h_p) / del_time;

    if h_ml <= depth_w - limits.h_ml_min {
        let d_t_bot_dt = if h_ml > h_p {
            bottom_temperature_tendency(prev, d_t_mnw_dt, d_h_ml_dt, c_t_rate, radiation, config)
        } else {
            0.0
        };
        let mut t_bot =
            diagnostics.at_least_freezing("t_bot", prev.t_bot + d_t_bot_dt * del_time, limits);
        // The bottom may not cross the temperature of maximum density away
        // from the mean temperature
        if (t_bot - T_R) * buoyancy_parameter(t_mnw) < 0.0 {
            t_bot = T_R;
        }

        let weight = c_t * (1.0 - h_ml / depth_w);
        let t_wml =
            diagnostics.at_least_freezing(
                "t_wml",
                (t_mnw - t_bot * weight) / (1.0 - weight),
                limits,
            );

        WaterColumn {
            regime,
            t_mnw,
            t_wml,
            t_bot,
            h_ml,
            c_t,
            d_h_ml_dt,
            w_star,
        }
    } else {
        // Mixed layer reached the bottom
        WaterColumn {
            regime,
            t_mnw,
            t_wml: t_mnw,
            t_bot: t_mnw,
            h_ml: depth_w,
            c_t: C_T_MIN,
            d_h_ml_dt: (depth_w - h_p) / del_time,
            w_star,
        }
    }
}

/// Entrainment rate of a convective mixed layer (m s⁻¹).
fn entrainment_rate(
    prev: &LakeState,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    w_star: FloatValue,
    c_t_rate: FloatValue,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> FloatValue {
    let limits = &config.limits;
    let depth_w = config.depth_w;
    let h_p = prev.h_ml;
    let shape = prev.shape;
    let delta_t = prev.t_wml - prev.t_bot;
    let rho_c = RHO_W * C_W;

    let r_h = depth_w / h_p;
    let r_rc = r_h - 1.0;
    let r_ti = shape.c_t / shape.c_tt;
    let r_tstar = (r_ti / 2.0 - 1.0) * r_rc + 1.0;

    let mut numerator = -(fluxes.q_star * (r_tstar * (1.0 + C_CBL_1) - 1.0) - fluxes.q_bot) / rho_c;
    numerator += (depth_w - h_p) * delta_t * C_TT_2 / shape.c_tt * c_t_rate;
    let radiative = radiation.i_bot + (r_ti - 1.0) * radiation.i_h - r_ti * radiation.i_intm_h_d
        + (r_ti - 2.0) * r_rc * (radiation.i_h - radiation.i_intm_0_h);
    numerator += radiative / rho_c;

    let denominator = -C_CBL_2 * r_tstar * fluxes.q_star / rho_c / w_star.max(limits.c_small)
        + shape.c_t * delta_t;

    if denominator.abs() < limits.c_small {
        diagnostics.record(
            ClampKind::DegenerateGeometry,
            "entrainment_denominator",
            denominator,
            limits.c_small,
        );
        return 0.0;
    }
    numerator / denominator
}

/// Rate of change of the bottom temperature while the mixed layer deepens,
/// from the heat budget of the thermocline (K s⁻¹).
fn bottom_temperature_tendency(
    prev: &LakeState,
    d_t_mnw_dt: FloatValue,
    d_h_ml_dt: FloatValue,
    c_t_rate: FloatValue,
    radiation: &RadiationProfile,
    config: &LakeConfig,
) -> FloatValue {
    let depth_w = config.depth_w;
    let h_p = prev.h_ml;
    let shape = prev.shape;
    let delta_t = prev.t_wml - prev.t_bot;

    let r_h = h_p / depth_w;
    let r_rc = 1.0 - r_h;
    let profile_weight = 0.5 * shape.c_t * r_rc + shape.c_tt * (2.0 * r_h - 1.0);
    let r_tstar = (0.5 + shape.c_tt - shape.c_q) / profile_weight;
    let r_ti = (1.0 - shape.c_t * r_rc) / profile_weight;

    let column = (depth_w * d_t_mnw_dt - shape.c_t * delta_t * d_h_ml_dt) * r_tstar / depth_w;
    let absorbed = (radiation.i_intm_h_d
        - (1.0 - shape.c_q) * radiation.i_h
        - shape.c_q * radiation.i_bot)
        * r_ti
        / (depth_w - h_p)
        / (RHO_W * C_W);
    let reshaping = (1.0 - C_TT_2 * r_ti) / shape.c_t * delta_t * c_t_rate;

    column + absorbed + reshaping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NumericalLimits;
    use crate::state::ThermoclineShape;
    use is_close::is_close;

    fn config(depth_w: FloatValue) -> LakeConfig {
        LakeConfig {
            depth_w,
            del_time: 3600.0,
            sediments_on: false,
            ..LakeConfig::default()
        }
    }

    fn open_state(
        t_wml: FloatValue,
        t_bot: FloatValue,
        h_ml: FloatValue,
        depth_w: FloatValue,
    ) -> LakeState {
        let limits = NumericalLimits::default();
        let shape = ThermoclineShape::minimum();
        LakeState {
            t_snow: T_F,
            t_ice: T_F,
            t_wml,
            t_mnw: LakeState::profile_mean_temperature(t_wml, t_bot, shape.c_t, h_ml, depth_w),
            t_bot,
            t_b1: T_R,
            h_snow: limits.thickness_floor,
            h_ice: limits.thickness_floor,
            h_ml,
            h_b1: 5.0,
            shape,
            t_sfc: t_wml,
        }
    }

    fn no_ice() -> IceOutcome {
        let limits = NumericalLimits::default();
        IceOutcome {
            regime: IceRegime::NoIce,
            h_ice: limits.thickness_floor,
            t_ice: T_F,
            h_snow: limits.thickness_floor,
            t_snow: T_F,
            d_h_ice_dt: 0.0,
            present: false,
        }
    }

    fn open_water_fluxes(q_w: FloatValue, radiation: &RadiationProfile) -> HeatFluxes {
        HeatFluxes {
            q_w,
            q_star: q_w + radiation.i_w + radiation.i_h - 2.0 * radiation.i_intm_0_h,
            ..HeatFluxes::default()
        }
    }

    #[test]
    fn equilibrium_depth_requires_warm_water_and_partial_compensation() {
        let config = config(20.0);
        assert_eq!(convective_equilibrium_depth(-50.0, 100.0, 275.0, &config), 0.0);
        assert_eq!(convective_equilibrium_depth(-150.0, 100.0, 285.0, &config), 0.0);
        assert_eq!(convective_equilibrium_depth(10.0, 100.0, 285.0, &config), 0.0);

        let h = convective_equilibrium_depth(-50.0, 100.0, 285.0, &config);
        let expected = (3.0_f64.sqrt() + 2.0) / 3.0;
        assert!(is_close!(h, expected));
    }

    #[test]
    fn surface_cooling_deepens_convective_mixed_layer() {
        let config = config(20.0);
        let prev = open_state(285.0, 280.0, 5.0, 20.0);
        let radiation = RadiationProfile::default();
        let fluxes = open_water_fluxes(-200.0, &radiation);
        let forcing = ForcingBundle {
            u_star: 0.005,
            ..ForcingBundle::default()
        };
        let mut diagnostics = Diagnostics::default();
        let column = advance(
            &prev,
            &no_ice(),
            &fluxes,
            &radiation,
            &forcing,
            &config,
            &mut diagnostics,
        );

        assert_eq!(column.regime, MixingRegime::Convective);
        assert!(column.w_star > 0.0);
        assert!(column.h_ml > 5.0, "mixed layer {}", column.h_ml);
        assert!(column.h_ml < 5.5, "mixed layer {}", column.h_ml);
        assert!(column.t_mnw < prev.t_mnw);
        assert!(column.c_t >= prev.shape.c_t);
    }

    #[test]
    fn heating_under_light_wind_shallows_mixed_layer() {
        let config = config(20.0);
        let prev = open_state(290.0, 280.0, 5.0, 20.0);
        let limits = &config.limits;
        let optics = crate::optics::LakeOptics::default();
        let radiation = RadiationProfile::compute(
            800.0,
            &optics,
            crate::radiation::SurfaceCover::OpenWater,
            0.0,
            0.0,
            5.0,
            20.0,
            limits,
        );
        let fluxes = open_water_fluxes(0.0, &radiation);
        let forcing = ForcingBundle {
            u_star: 0.002,
            ..ForcingBundle::default()
        };
        let column = advance(
            &prev,
            &no_ice(),
            &fluxes,
            &radiation,
            &forcing,
            &config,
            &mut Diagnostics::default(),
        );

        assert_eq!(column.regime, MixingRegime::WindDriven);
        assert!(column.h_ml < 5.0, "mixed layer {}", column.h_ml);
        assert!(column.h_ml >= limits.h_ml_min);
        // Retreat leaves the bottom temperature untouched
        assert!(is_close!(column.t_bot, 280.0));
        assert!(column.t_wml > 290.0);
    }

    #[test]
    fn mixed_layer_reaching_bottom_homogenises_column() {
        let config = config(10.0);
        let prev = open_state(285.0, 284.0, 9.995, 10.0);
        let radiation = RadiationProfile::default();
        let fluxes = open_water_fluxes(-100.0, &radiation);
        let column = advance(
            &prev,
            &no_ice(),
            &fluxes,
            &radiation,
            &ForcingBundle::default(),
            &config,
            &mut Diagnostics::default(),
        );
        assert!(is_close!(column.h_ml, 10.0));
        assert!(is_close!(column.t_wml, column.t_mnw));
        assert!(is_close!(column.t_bot, column.t_mnw));
        assert!(is_close!(column.c_t, C_T_MIN));
    }

    #[test]
    fn freezing_collapses_fully_mixed_column() {
        let config = config(10.0);
        let prev = open_state(T_F, T_F, 10.0, 10.0);
        let ice = IceOutcome {
            regime: IceRegime::IceForming,
            h_ice: 1.0e-3,
            t_ice: 273.1,
            present: true,
            ..no_ice()
        };
        let fluxes = HeatFluxes {
            q_w: -100.0,
            ..HeatFluxes::default()
        };
        let column = advance(
            &prev,
            &ice,
            &fluxes,
            &RadiationProfile::default(),
            &ForcingBundle::default(),
            &config,
            &mut Diagnostics::default(),
        );
        assert_eq!(
            column.regime,
            MixingRegime::UnderIce(UnderIceRegime::JustFrozen)
        );
        assert_eq!(column.h_ml, 0.0);
        assert!(is_close!(column.c_t, C_T_MIN));
        assert!(is_close!(column.t_wml, T_F));
        // The heat loss went into ice formation, not into the water
        assert!(is_close!(column.t_mnw, prev.t_mnw));
    }

    #[test]
    fn conductive_regime_keeps_profile_shape() {
        let config = config(10.0);
        let mut prev = open_state(T_F, 276.0, 0.0, 10.0);
        prev.h_ice = 0.4;
        let ice = IceOutcome {
            regime: IceRegime::CoveredThick,
            h_ice: 0.4,
            t_ice: 265.0,
            present: true,
            ..no_ice()
        };
        let column = advance(
            &prev,
            &ice,
            &HeatFluxes::default(),
            &RadiationProfile::default(),
            &ForcingBundle::default(),
            &config,
            &mut Diagnostics::default(),
        );
        assert_eq!(
            column.regime,
            MixingRegime::UnderIce(UnderIceRegime::Conductive)
        );
        assert!(is_close!(column.h_ml, 0.0));
        assert!(is_close!(column.t_bot, 276.0));
    }

    #[test]
    fn bottom_convection_under_ice() {
        let config = config(10.0);
        let mut prev = open_state(T_F, T_R, 0.0, 10.0);
        prev.h_ice = 0.4;
        prev.h_ml = 1.0;
        prev.t_mnw = LakeState::profile_mean_temperature(T_F, T_R, C_T_MIN, 1.0, 10.0);
        let ice = IceOutcome {
            regime: IceRegime::CoveredThick,
            h_ice: 0.4,
            t_ice: 265.0,
            present: true,
            ..no_ice()
        };
        // Solar heating warms the column under the ice
        let radiation = RadiationProfile {
            i_w: 50.0,
            ..RadiationProfile::default()
        };
        let column = advance(
            &prev,
            &ice,
            &HeatFluxes::default(),
            &radiation,
            &ForcingBundle::default(),
            &config,
            &mut Diagnostics::default(),
        );
        assert_eq!(
            column.regime,
            MixingRegime::UnderIce(UnderIceRegime::BottomConvection)
        );
        assert!(is_close!(column.t_bot, T_R));
        assert!(column.t_mnw > prev.t_mnw);
        // The convective layer grows upward from the bottom
        assert!(column.h_ml < prev.h_ml);
    }
}
