//! Ice and snow thermodynamics
//!
//! The ice regime is re-derived every step from the previous state and the
//! sign of the surface heat budget. Covered ice uses one of two models,
//! switched at the thickness
//!
//! $$h^* = \sqrt{\frac{\kappa_I \Delta t}{\rho_I c_I}}$$
//!
//! Below $h^*$ the ice heat capacity is negligible over a step and the
//! temperature profile is in quasi-equilibrium with the surface flux $F$:
//!
//! $$\frac{dh_I}{dt} = -\frac{F - Q_w}{\rho_I L_f}, \qquad T_I = T_f + \frac{h_I F}{\kappa_I \Phi'_I(0)}$$
//!
//! Above it the complete model integrates the heat conduction equation over
//! the ice, with self-similar profile shape factor $C_I(h_I)$:
//!
//! $$\rho_I L_f \frac{dh_I}{dt} = Q_w + \kappa_I \Phi'_I(0) \frac{T_f - T_I}{h_I}$$
//!
//! $$\rho_I c_I C_I h_I \frac{dT_I}{dt} = F + \kappa_I \Phi'_I(0) \frac{T_f - T_I}{h_I}(1 - R^*) - R^* Q_w$$
//!
//! where $R^* = (1 - C_I)\, c_I (T_f - T_I) / L_f$. With snow on the ice the
//! snow heat capacity is added to the left hand side and the snow surface
//! temperature follows from the continuity of the conductive flux at the
//! snow-ice interface.

use crate::config::NumericalLimits;
use crate::constraints::{ClampKind, Diagnostics};
use crate::driver::HeatFluxes;
use crate::physics::{
    snow_conductivity, snow_density, IceProfile, C_I, C_S, C_S_LIN, GAMMA_RHO_S, H_ICE_MAX,
    KAPPA_I, L_F, PHI_I_PR0_LIN, PHI_S_PR0_LIN, RHO_I, RHO_S_MAX, RHO_S_MIN, RHO_W, T_F,
    T_FLOOR,
};
use crate::radiation::RadiationProfile;
use crate::state::LakeState;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IceRegime {
    /// No ice and no ice formed this step.
    NoIce,
    /// Ice appears on supercooled or freezing water losing heat.
    IceForming,
    /// The ice or snow surface is at the melting point and gains heat.
    MeltingFromAbove,
    /// Thin ice, quasi-equilibrium model.
    CoveredThin,
    /// Thick ice, complete model.
    CoveredThick,
}

/// Thickness tendency and new values produced by one of the ice models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceStep {
    pub d_h_ice_dt: FloatValue,
    pub h_ice: FloatValue,
    pub t_ice: FloatValue,
}

/// New ice and snow variables after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IceOutcome {
    pub regime: IceRegime,
    pub h_ice: FloatValue,
    pub t_ice: FloatValue,
    pub h_snow: FloatValue,
    pub t_snow: FloatValue,
    pub d_h_ice_dt: FloatValue,
    /// Ice is present at the end of the step.
    pub present: bool,
}

/// Thickness separating the quasi-equilibrium and complete ice models.
pub fn ice_model_threshold(del_time: FloatValue, limits: &NumericalLimits) -> FloatValue {
    (KAPPA_I * del_time / (RHO_I * C_I))
        .sqrt()
        .max(limits.h_ice_min)
        .min(0.9 * H_ICE_MAX)
}

/// Ice temperature in quasi-equilibrium with the surface flux.
pub fn quasi_equilibrium_temperature(h_ice: FloatValue, surface_flux: FloatValue) -> FloatValue {
    T_F + h_ice * surface_flux / (KAPPA_I * IceProfile::at(h_ice).phi_i_pr0)
}

/// Advance thin ice with the quasi-equilibrium model.
///
/// `surface_flux` is the heat flux absorbed by the ice and snow, positive
/// downward, and `q_w` the flux from the ice base into the water.
pub fn quasi_equilibrium_step(
    h_ice: FloatValue,
    surface_flux: FloatValue,
    q_w: FloatValue,
    del_time: FloatValue,
) -> IceStep {
    let d_h_ice_dt = -(surface_flux - q_w) / (L_F * RHO_I);
    let h_ice_n = h_ice + d_h_ice_dt * del_time;
    let phi_i_pr0 = IceProfile::at(h_ice).phi_i_pr0;
    IceStep {
        d_h_ice_dt,
        h_ice: h_ice_n,
        t_ice: T_F + h_ice_n * surface_flux / (KAPPA_I * phi_i_pr0),
    }
}

/// Advance thick ice with the complete model.
///
/// `h_snow` is zero for bare ice.
pub fn complete_step(
    h_ice: FloatValue,
    t_ice: FloatValue,
    h_snow: FloatValue,
    surface_flux: FloatValue,
    q_w: FloatValue,
    del_time: FloatValue,
    c_small: FloatValue,
) -> IceStep {
    let profile = IceProfile::at(h_ice);
    let conduction = KAPPA_I * (T_F - t_ice) / h_ice * profile.phi_i_pr0;
    let d_h_ice_dt = (q_w + conduction) / (L_F * RHO_I);

    let r_ti = C_I * (T_F - t_ice) / L_F;
    let r_tstar = (1.0 - profile.c_i) * r_ti;

    let mut heat_capacity = profile.c_i * h_ice;
    if h_snow > 0.0 {
        let r_h = snow_to_ice_ratio(h_ice, h_snow, c_small);
        let r_rho_c = snow_density(h_snow, c_small) * C_S / (RHO_I * C_I);
        heat_capacity += (1.0 + C_S_LIN * r_h) * r_rho_c * h_snow;
    }

    let tendency = conduction * (1.0 - r_tstar) - r_tstar * q_w + surface_flux;
    let d_t_ice_dt = tendency / (RHO_I * C_I) / heat_capacity.max(c_small);

    IceStep {
        d_h_ice_dt,
        h_ice: h_ice + d_h_ice_dt * del_time,
        t_ice: t_ice + d_t_ice_dt * del_time,
    }
}

/// Ratio of the temperature drop across the snow to the drop across the ice.
fn snow_to_ice_ratio(h_ice: FloatValue, h_snow: FloatValue, c_small: FloatValue) -> FloatValue {
    IceProfile::at(h_ice).phi_i_pr1 / PHI_S_PR0_LIN * KAPPA_I
        / snow_conductivity(h_snow, c_small)
        * h_snow
        / h_ice.max(c_small)
}

/// Rate of change of snow depth for a given snow accumulation rate.
///
/// Below the maximum density, accumulated snow compacts the existing pack.
pub fn snow_depth_tendency(
    h_snow: FloatValue,
    dmsnow_dt: FloatValue,
    c_small: FloatValue,
) -> FloatValue {
    let rho_s = snow_density(h_snow, c_small);
    let compaction = if rho_s < RHO_S_MAX {
        h_snow * rho_s * GAMMA_RHO_S / (RHO_S_MIN * RHO_W)
    } else {
        0.0
    };
    dmsnow_dt / rho_s / (1.0 + compaction)
}

/// Surface heat budget driving the covered ice models.
fn covered_surface_flux(
    has_snow: bool,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
) -> FloatValue {
    if has_snow {
        fluxes.q_snow + radiation.i_snow - radiation.i_w
    } else {
        fluxes.q_ice + radiation.i_ice - radiation.i_w
    }
}

/// Heat available for melting at the top of the ice or snow.
fn melting_surface_flux(
    has_snow: bool,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
) -> FloatValue {
    if has_snow {
        fluxes.q_snow + radiation.i_snow - radiation.i_ice
    } else {
        fluxes.q_ice + radiation.i_ice - radiation.i_w - fluxes.q_w
    }
}

pub fn select_regime(
    prev: &LakeState,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    threshold: FloatValue,
    limits: &NumericalLimits,
) -> IceRegime {
    if !prev.has_ice(limits) {
        if prev.t_wml <= T_F + limits.c_small && fluxes.q_w < 0.0 {
            return IceRegime::IceForming;
        }
        return IceRegime::NoIce;
    }

    let has_snow = prev.has_snow(limits);
    let t_top = if has_snow { prev.t_snow } else { prev.t_ice };
    if t_top >= T_F - limits.c_small && melting_surface_flux(has_snow, fluxes, radiation) >= 0.0
    {
        IceRegime::MeltingFromAbove
    } else if prev.h_ice < threshold {
        IceRegime::CoveredThin
    } else {
        IceRegime::CoveredThick
    }
}

/// Advance ice and snow over one step.
pub fn advance(
    prev: &LakeState,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    dmsnow_dt: FloatValue,
    del_time: FloatValue,
    limits: &NumericalLimits,
    diagnostics: &mut Diagnostics,
) -> IceOutcome {
    let threshold = ice_model_threshold(del_time, limits);
    let regime = select_regime(prev, fluxes, radiation, threshold, limits);
    let has_snow = prev.has_snow(limits);

    let candidate = match regime {
        IceRegime::NoIce => return no_ice(regime, limits),
        IceRegime::IceForming => forming(fluxes, dmsnow_dt, del_time),
        IceRegime::MeltingFromAbove => {
            melting_from_above(prev, has_snow, fluxes, radiation, dmsnow_dt, del_time, limits)
        }
        IceRegime::CoveredThin | IceRegime::CoveredThick => covered(
            prev,
            regime,
            has_snow,
            fluxes,
            radiation,
            dmsnow_dt,
            del_time,
            limits,
        ),
    };

    finalise(regime, candidate, limits, diagnostics)
}

fn no_ice(regime: IceRegime, limits: &NumericalLimits) -> IceOutcome {
    IceOutcome {
        regime,
        h_ice: limits.thickness_floor,
        t_ice: T_F,
        h_snow: limits.thickness_floor,
        t_snow: T_F,
        d_h_ice_dt: 0.0,
        present: false,
    }
}

/// Ice and snow values before the security checks.
struct Candidate {
    step: IceStep,
    h_snow: FloatValue,
    t_snow: FloatValue,
}

fn forming(fluxes: &HeatFluxes, dmsnow_dt: FloatValue, del_time: FloatValue) -> Candidate {
    let d_h_ice_dt = -fluxes.q_w / (L_F * RHO_I);
    let h_ice = d_h_ice_dt * del_time;
    let t_ice = T_F + h_ice * fluxes.q_w / (KAPPA_I * PHI_I_PR0_LIN);
    Candidate {
        step: IceStep {
            d_h_ice_dt,
            h_ice,
            t_ice,
        },
        h_snow: dmsnow_dt / RHO_S_MIN * del_time,
        t_snow: t_ice,
    }
}

fn melting_from_above(
    prev: &LakeState,
    has_snow: bool,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    dmsnow_dt: FloatValue,
    del_time: FloatValue,
    limits: &NumericalLimits,
) -> Candidate {
    let surface_flux = melting_surface_flux(has_snow, fluxes, radiation);
    let (d_h_ice_dt, d_h_snow_dt) = if has_snow {
        // Surface heat melts snow, shortwave absorbed in the ice melts ice
        let d_h_snow_dt =
            (-surface_flux / L_F + dmsnow_dt) / snow_density(prev.h_snow, limits.c_small);
        let d_h_ice_dt = -(radiation.i_ice - radiation.i_w - fluxes.q_w) / (L_F * RHO_I);
        (d_h_ice_dt, d_h_snow_dt)
    } else {
        (-surface_flux / (L_F * RHO_I), dmsnow_dt / RHO_S_MIN)
    };

    Candidate {
        step: IceStep {
            d_h_ice_dt,
            h_ice: prev.h_ice + d_h_ice_dt * del_time,
            t_ice: T_F,
        },
        h_snow: prev.h_snow + d_h_snow_dt * del_time,
        t_snow: T_F,
    }
}

#[allow(clippy::too_many_arguments)]
fn covered(
    prev: &LakeState,
    regime: IceRegime,
    has_snow: bool,
    fluxes: &HeatFluxes,
    radiation: &RadiationProfile,
    dmsnow_dt: FloatValue,
    del_time: FloatValue,
    limits: &NumericalLimits,
) -> Candidate {
    let c_small = limits.c_small;
    let surface_flux = covered_surface_flux(has_snow, fluxes, radiation);

    let d_h_snow_dt = if has_snow {
        snow_depth_tendency(prev.h_snow, dmsnow_dt, c_small)
    } else {
        dmsnow_dt / RHO_S_MIN
    };
    let h_snow = prev.h_snow + d_h_snow_dt * del_time;

    let step = match regime {
        IceRegime::CoveredThin => {
            quasi_equilibrium_step(prev.h_ice, surface_flux, fluxes.q_w, del_time)
        }
        _ => complete_step(
            prev.h_ice,
            prev.t_ice,
            if has_snow { prev.h_snow } else { 0.0 },
            surface_flux,
            fluxes.q_w,
            del_time,
            c_small,
        ),
    };

    let t_snow = if h_snow > 0.0 {
        let r_h = snow_to_ice_ratio(step.h_ice.max(limits.h_ice_min), h_snow, c_small);
        step.t_ice + r_h * (step.t_ice - T_F)
    } else {
        step.t_ice
    };

    Candidate {
        step,
        h_snow,
        t_snow,
    }
}

/// Security checks shared by every regime with ice.
fn finalise(
    regime: IceRegime,
    candidate: Candidate,
    limits: &NumericalLimits,
    diagnostics: &mut Diagnostics,
) -> IceOutcome {
    let Candidate {
        step,
        h_snow,
        t_snow,
    } = candidate;

    if step.h_ice <= limits.h_ice_min {
        // Ice melted through, snow on top of it goes with it
        return IceOutcome {
            d_h_ice_dt: step.d_h_ice_dt,
            ..no_ice(regime, limits)
        };
    }

    let h_ice = diagnostics.bounded(
        ClampKind::DegenerateGeometry,
        "h_ice",
        step.h_ice,
        limits.h_ice_min,
        H_ICE_MAX,
    );

    // Temperatures above the melting point are taken up by the melting
    // regime on the next step
    let t_ice = bounded_ice_temperature("t_ice", step.t_ice, diagnostics);
    let (h_snow, t_snow) = if h_snow < limits.h_snow_min {
        (limits.thickness_floor, t_ice)
    } else {
        (h_snow, bounded_ice_temperature("t_snow", t_snow, diagnostics))
    };

    IceOutcome {
        regime,
        h_ice,
        t_ice,
        h_snow,
        t_snow,
        d_h_ice_dt: step.d_h_ice_dt,
        present: true,
    }
}

fn bounded_ice_temperature(
    quantity: &'static str,
    value: FloatValue,
    diagnostics: &mut Diagnostics,
) -> FloatValue {
    if value < T_FLOOR {
        diagnostics.record(ClampKind::PhysicalBound, quantity, value, T_FLOOR);
        T_FLOOR
    } else {
        value.min(T_F)
    }
}
