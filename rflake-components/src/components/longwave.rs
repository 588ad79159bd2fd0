//! Longwave radiation budget of the lake surface
//!
//! The net longwave flux absorbed by the surface is
//!
//! $$Q_{lw} = \epsilon L_\downarrow - \epsilon \sigma T_s^4$$
//!
//! where the downwelling flux $L_\downarrow$ is either measured or estimated
//! from the air temperature and cloud cover,
//! $L_\downarrow = \sigma T_a^4 (0.6 + 0.2 n)$.

use rflake_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Stefan–Boltzmann constant (W m⁻² K⁻⁴).
pub const STEFAN_BOLTZMANN: FloatValue = 5.67e-8;

/// Source of the downwelling longwave flux.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DownwellingLongwave {
    /// Measured flux (W m⁻²).
    Measured { flux: FloatValue },
    /// Estimated from the cloud cover fraction in [0, 1].
    FromCloudiness { cloudiness: FloatValue },
}

impl DownwellingLongwave {
    /// Downwelling flux for an air temperature `t_a` (K).
    pub fn flux(&self, t_a: FloatValue) -> FloatValue {
        match *self {
            DownwellingLongwave::Measured { flux } => flux,
            DownwellingLongwave::FromCloudiness { cloudiness } => {
                let cloudiness = cloudiness.clamp(0.0, 1.0);
                STEFAN_BOLTZMANN * t_a.powi(4) * (0.6 + 0.2 * cloudiness)
            }
        }
    }
}

impl Default for DownwellingLongwave {
    fn default() -> Self {
        DownwellingLongwave::FromCloudiness { cloudiness: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongwaveBudget {
    /// Longwave emissivity of the surface.
    /// Default: 0.99
    pub emissivity: FloatValue,
}

impl Default for LongwaveBudget {
    fn default() -> Self {
        Self { emissivity: 0.99 }
    }
}

impl LongwaveBudget {
    /// Flux emitted by a surface at `t_sfc` (W m⁻², positive upward).
    pub fn emission(&self, t_sfc: FloatValue) -> FloatValue {
        self.emissivity * STEFAN_BOLTZMANN * t_sfc.powi(4)
    }

    /// Net longwave flux into the surface (W m⁻², positive downward).
    pub fn net(&self, downwelling: FloatValue, t_sfc: FloatValue) -> FloatValue {
        self.emissivity * downwelling - self.emission(t_sfc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn clear_and_overcast_sky() {
        let t_a: FloatValue = 283.15;
        let clear = DownwellingLongwave::FromCloudiness { cloudiness: 0.0 }.flux(t_a);
        let overcast = DownwellingLongwave::FromCloudiness { cloudiness: 1.0 }.flux(t_a);
        assert!(is_close!(clear, 0.6 * STEFAN_BOLTZMANN * t_a.powi(4)));
        assert!(is_close!(overcast, 0.8 * STEFAN_BOLTZMANN * t_a.powi(4)));
        // Cloud cover outside [0, 1] is limited
        let beyond = DownwellingLongwave::FromCloudiness { cloudiness: 3.0 }.flux(t_a);
        assert!(is_close!(beyond, overcast));
    }

    #[test]
    fn measured_flux_is_used_directly() {
        let source = DownwellingLongwave::Measured { flux: 312.5 };
        assert_eq!(source.flux(250.0), 312.5);
    }

    #[test]
    fn net_budget_vanishes_in_radiative_equilibrium() {
        let budget = LongwaveBudget::default();
        let t_s: FloatValue = 280.0;
        let downwelling = STEFAN_BOLTZMANN * t_s.powi(4);
        assert!(budget.net(downwelling, t_s).abs() < 1e-9);
        assert!(budget.net(0.8 * downwelling, t_s) < 0.0);
    }

    #[test]
    fn deserialises_tagged_source() {
        let source: DownwellingLongwave =
            serde_json::from_str(r#"{"source": "measured", "flux": 300.0}"#).unwrap();
        assert_eq!(source, DownwellingLongwave::Measured { flux: 300.0 });
    }
}
