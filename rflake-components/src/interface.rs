//! Interface between an atmospheric state and the lake engine
//!
//! [`LakeColumn::step`] turns near-surface meteorology into the
//! [`ForcingBundle`] expected by the engine: it evaluates the ice albedo at
//! the previous surface temperature, the net longwave flux and the
//! turbulent fluxes, then advances the lake by one step.

use crate::components::{DownwellingLongwave, LongwaveBudget, StabilityCorrected};
use crate::components::{SurfaceAir, SurfaceFluxScheme, TurbulentFluxes};
use rflake_core::config::LakeConfig;
use rflake_core::driver::{LakeModel, StepOutput};
use rflake_core::errors::{FlakeError, FlakeResult};
use rflake_core::forcing::ForcingBundle;
use rflake_core::optics::{ice_albedo, LakeOptics};
use rflake_core::state::LakeState;
use rflake_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Meteorological input for a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Incoming shortwave radiation (W m⁻²).
    pub i_atm: FloatValue,
    pub longwave: DownwellingLongwave,
    pub air: SurfaceAir,
    /// Snow accumulation rate (kg m⁻² s⁻¹).
    pub dmsnow_dt: FloatValue,
}

/// Parameters of a [`LakeColumn`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeColumnParameters {
    pub config: LakeConfig,
    pub optics: LakeOptics,
    /// Default: StabilityCorrected
    pub flux_scheme: Box<dyn SurfaceFluxScheme>,
    pub longwave: LongwaveBudget,
    /// Evaluate the ice and snow albedo from the surface temperature of the
    /// previous step instead of using the fixed values in `optics`.
    /// Default: true
    pub dynamic_ice_albedo: bool,
}

impl Default for LakeColumnParameters {
    fn default() -> Self {
        Self {
            config: LakeConfig::default(),
            optics: LakeOptics::default(),
            flux_scheme: Box::new(StabilityCorrected::default()),
            longwave: LongwaveBudget::default(),
            dynamic_ice_albedo: true,
        }
    }
}

impl LakeColumnParameters {
    pub fn from_json_str(content: &str) -> FlakeResult<Self> {
        serde_json::from_str(content).map_err(|e| FlakeError::ConfigParse(e.to_string()))
    }
}

/// A lake forced by near-surface meteorology.
#[derive(Debug)]
pub struct LakeColumn {
    model: LakeModel,
    flux_scheme: Box<dyn SurfaceFluxScheme>,
    longwave: LongwaveBudget,
    dynamic_ice_albedo: bool,
}

impl LakeColumn {
    pub fn from_parameters(parameters: LakeColumnParameters) -> FlakeResult<Self> {
        Ok(Self {
            model: LakeModel::from_parameters(parameters.config, parameters.optics)?,
            flux_scheme: parameters.flux_scheme,
            longwave: parameters.longwave,
            dynamic_ice_albedo: parameters.dynamic_ice_albedo,
        })
    }

    pub fn config(&self) -> &LakeConfig {
        self.model.config()
    }

    /// Optics for a step starting from `prev`.
    pub fn optics_for(&self, prev: &LakeState) -> Cow<'_, LakeOptics> {
        let optics = self.model.optics();
        if !self.dynamic_ice_albedo {
            return Cow::Borrowed(optics);
        }
        let albedo = ice_albedo(prev.t_sfc);
        let mut optics = optics.clone();
        optics.albedo.ice = albedo;
        optics.albedo.snow = albedo;
        Cow::Owned(optics)
    }

    /// Turbulent fluxes over the surface of `prev`.
    pub fn turbulent_fluxes(&self, prev: &LakeState, air: &SurfaceAir) -> TurbulentFluxes {
        let config = self.model.config();
        self.flux_scheme.fluxes(
            air,
            prev.t_sfc,
            config.fetch,
            prev.has_ice(&config.limits),
        )
    }

    /// Forcing for a step starting from `prev`.
    pub fn forcing(&self, prev: &LakeState, atmosphere: &Atmosphere) -> ForcingBundle {
        let downwelling = atmosphere.longwave.flux(atmosphere.air.t_a);
        let mut forcing = ForcingBundle {
            i_atm: atmosphere.i_atm,
            q_atm_lw: self.longwave.net(downwelling, prev.t_sfc),
            dmsnow_dt: atmosphere.dmsnow_dt,
            ..ForcingBundle::default()
        };
        self.turbulent_fluxes(prev, &atmosphere.air)
            .apply_to(&mut forcing);
        forcing
    }

    /// Advance the lake by one step under `atmosphere`.
    pub fn step(&self, prev: &LakeState, atmosphere: &Atmosphere) -> FlakeResult<StepOutput> {
        let forcing = self.forcing(prev, atmosphere);
        let optics = self.optics_for(prev);
        self.model.advance_with_optics(prev, &forcing, &optics)
    }
}
