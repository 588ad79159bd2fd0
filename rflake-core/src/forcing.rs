use crate::errors::{FlakeError, FlakeResult};
use crate::physics::RHO_W;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Atmospheric forcing and surface fluxes for a single timestep.
///
/// Radiative fluxes are positive downward and turbulent fluxes positive
/// upward (W m⁻²). The momentum flux is negative when momentum is
/// transferred into the lake (N m⁻²).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingBundle {
    /// Incoming shortwave radiation at the surface.
    pub i_atm: FloatValue,
    /// Net longwave radiation at the surface.
    pub q_atm_lw: FloatValue,
    pub q_momentum: FloatValue,
    pub q_sensible: FloatValue,
    pub q_latent: FloatValue,
    /// Snow accumulation rate (kg m⁻² s⁻¹).
    pub dmsnow_dt: FloatValue,
    /// Water-side friction velocity (m s⁻¹). When zero it is derived from
    /// the momentum flux.
    pub u_star: FloatValue,
    /// Convective velocity scale supplied by the caller (m s⁻¹). Acts as a
    /// lower bound on the scale diagnosed from the surface buoyancy flux.
    pub w_star: FloatValue,
}

impl ForcingBundle {
    pub fn validate(&self) -> FlakeResult<()> {
        let values = [
            ("i_atm", self.i_atm),
            ("q_atm_lw", self.q_atm_lw),
            ("q_momentum", self.q_momentum),
            ("q_sensible", self.q_sensible),
            ("q_latent", self.q_latent),
            ("dmsnow_dt", self.dmsnow_dt),
            ("u_star", self.u_star),
            ("w_star", self.w_star),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(FlakeError::InvalidForcing(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("i_atm", self.i_atm),
            ("u_star", self.u_star),
            ("w_star", self.w_star),
        ] {
            if value < 0.0 {
                return Err(FlakeError::InvalidForcing(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Net non-solar heat flux into the surface (W m⁻²).
    pub fn net_surface_heat_flux(&self) -> FloatValue {
        self.q_atm_lw - self.q_sensible - self.q_latent
    }

    /// Water-side friction velocity (m s⁻¹).
    pub fn water_friction_velocity(&self) -> FloatValue {
        if self.u_star > 0.0 {
            self.u_star
        } else {
            (self.q_momentum.abs() / RHO_W).sqrt()
        }
    }
}
