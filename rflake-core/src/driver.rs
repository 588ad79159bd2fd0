//! Single timestep advance of the lake column
//!
//! The step runs in a fixed order: shortwave profile, ice and snow, water
//! column, sediment, then the consistency pass. The previous state is never
//! modified; the new state is returned in a [`StepOutput`] together with the
//! fluxes and regimes used to produce it.

use crate::config::LakeConfig;
use crate::constraints::{self, Diagnostics};
use crate::errors::FlakeResult;
use crate::forcing::ForcingBundle;
use crate::ice::{self, IceRegime};
use crate::mixing::{self, MixingRegime};
use crate::optics::LakeOptics;
use crate::physics::{KAPPA_W, T_R};
use crate::radiation::{RadiationProfile, SurfaceCover};
use crate::sediment;
use crate::state::{LakeState, ThermoclineShape};
use crate::FloatValue;
use log::debug;
use serde::Serialize;

/// Heat fluxes entering each medium during a step (W m⁻², positive downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeatFluxes {
    /// Non-solar flux at the snow surface.
    pub q_snow: FloatValue,
    /// Non-solar flux at the ice surface.
    pub q_ice: FloatValue,
    /// Flux at the water surface, or from the water into the ice base.
    pub q_w: FloatValue,
    /// Flux from the water into the sediment.
    pub q_bot: FloatValue,
    /// Buoyancy flux scale combining the surface flux and the shortwave
    /// absorbed in the mixed layer.
    pub q_star: FloatValue,
}

impl HeatFluxes {
    /// Distribute the atmospheric fluxes over the top medium of the
    /// previous state.
    pub fn partition(
        prev: &LakeState,
        forcing: &ForcingBundle,
        radiation: &RadiationProfile,
        cover: SurfaceCover,
        config: &LakeConfig,
    ) -> Self {
        let limits = &config.limits;
        let q_atm = forcing.net_surface_heat_flux();

        let (q_snow, q_ice, q_w) = match cover {
            SurfaceCover::SnowOnIce => (q_atm, 0.0, 0.0),
            SurfaceCover::Ice => (0.0, q_atm, 0.0),
            SurfaceCover::OpenWater => (0.0, 0.0, q_atm),
        };

        // Under ice the water loses heat by conduction through a vanishing
        // mixed layer
        let q_w = if cover != SurfaceCover::OpenWater {
            if prev.h_ml <= limits.h_ml_min {
                -KAPPA_W * (prev.t_bot - prev.t_wml) / config.depth_w
                    * prev.shape.phi_t_pr0.max(1.0)
            } else {
                0.0
            }
        } else {
            q_w
        };

        let q_bot = sediment::bottom_heat_flux(prev, config);
        let q_star = q_w + radiation.i_w + radiation.i_h - 2.0 * radiation.i_intm_0_h;

        Self {
            q_snow,
            q_ice,
            q_w,
            q_bot,
            q_star,
        }
    }
}

/// Everything produced by a single step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutput {
    pub state: LakeState,
    /// Surface temperature to return to the atmosphere (K).
    pub t_sfc: FloatValue,
    pub radiation: RadiationProfile,
    pub fluxes: HeatFluxes,
    pub ice_regime: IceRegime,
    pub mixing_regime: MixingRegime,
    pub d_h_ice_dt: FloatValue,
    pub d_h_ml_dt: FloatValue,
    pub d_h_b1_dt: FloatValue,
    /// Convective velocity scale of the mixed layer (m s⁻¹).
    pub w_star: FloatValue,
    pub diagnostics: Diagnostics,
}

fn surface_cover(prev: &LakeState, config: &LakeConfig) -> SurfaceCover {
    if prev.has_snow(&config.limits) {
        SurfaceCover::SnowOnIce
    } else if prev.has_ice(&config.limits) {
        SurfaceCover::Ice
    } else {
        SurfaceCover::OpenWater
    }
}

/// Advance the lake by one timestep.
pub fn advance(
    prev: &LakeState,
    forcing: &ForcingBundle,
    config: &LakeConfig,
    optics: &LakeOptics,
) -> FlakeResult<StepOutput> {
    config.validate()?;
    forcing.validate()?;
    Ok(advance_validated(prev, forcing, config, optics))
}

fn advance_validated(
    prev: &LakeState,
    forcing: &ForcingBundle,
    config: &LakeConfig,
    optics: &LakeOptics,
) -> StepOutput {
    let limits = &config.limits;
    let mut diagnostics = Diagnostics::default();

    let cover = surface_cover(prev, config);
    let radiation = RadiationProfile::compute(
        forcing.i_atm,
        optics,
        cover,
        prev.h_snow,
        prev.h_ice,
        prev.h_ml,
        config.depth_w,
        limits,
    );
    let fluxes = HeatFluxes::partition(prev, forcing, &radiation, cover, config);

    let ice = ice::advance(
        prev,
        &fluxes,
        &radiation,
        forcing.dmsnow_dt,
        config.del_time,
        limits,
        &mut diagnostics,
    );
    let water = mixing::advance(
        prev,
        &ice,
        &fluxes,
        &radiation,
        forcing,
        config,
        &mut diagnostics,
    );
    let sediment = sediment::advance(
        prev,
        water.t_bot,
        fluxes.q_bot,
        radiation.i_bot,
        config,
        &mut diagnostics,
    );
    diagnostics.thermal_wave_vanished = sediment.thermal_wave_vanished;

    let mut state = LakeState {
        t_snow: ice.t_snow,
        t_ice: ice.t_ice,
        t_wml: water.t_wml,
        t_mnw: water.t_mnw,
        t_bot: water.t_bot,
        t_b1: sediment.t_b1,
        h_snow: ice.h_snow,
        h_ice: ice.h_ice,
        h_ml: water.h_ml,
        h_b1: sediment.h_b1,
        // Limited to [C_T_MIN, C_T_MAX] by the consistency pass
        shape: ThermoclineShape::from_c_t(water.c_t),
        t_sfc: prev.t_sfc,
    };
    let t_sfc = constraints::enforce(&mut state, config, &mut diagnostics);

    if ice.regime == IceRegime::IceForming || (prev.has_ice(limits) && !ice.present) {
        debug!(
            "ice cover changed: {:?}, t_sfc={}, t_mnw={} (T_r={})",
            ice.regime, t_sfc, state.t_mnw, T_R
        );
    }

    StepOutput {
        state,
        t_sfc,
        radiation,
        fluxes,
        ice_regime: ice.regime,
        mixing_regime: water.regime,
        d_h_ice_dt: ice.d_h_ice_dt,
        d_h_ml_dt: water.d_h_ml_dt,
        d_h_b1_dt: sediment.d_h_b1_dt,
        w_star: water.w_star,
        diagnostics,
    }
}

/// A lake with a validated configuration and optics.
///
/// Validation happens once at construction so repeated steps only check the
/// forcing.
#[derive(Debug, Clone, PartialEq)]
pub struct LakeModel {
    config: LakeConfig,
    optics: LakeOptics,
}

impl LakeModel {
    pub fn from_parameters(config: LakeConfig, optics: LakeOptics) -> FlakeResult<Self> {
        config.validate()?;
        Ok(Self { config, optics })
    }

    pub fn config(&self) -> &LakeConfig {
        &self.config
    }

    pub fn optics(&self) -> &LakeOptics {
        &self.optics
    }

    pub fn advance(&self, prev: &LakeState, forcing: &ForcingBundle) -> FlakeResult<StepOutput> {
        forcing.validate()?;
        Ok(advance_validated(prev, forcing, &self.config, &self.optics))
    }

    /// Advance with optics that differ from the stored ones for this step,
    /// e.g. a temperature dependent ice albedo.
    pub fn advance_with_optics(
        &self,
        prev: &LakeState,
        forcing: &ForcingBundle,
        optics: &LakeOptics,
    ) -> FlakeResult<StepOutput> {
        forcing.validate()?;
        Ok(advance_validated(prev, forcing, &self.config, optics))
    }
}
