//! Optical characteristics of water, ice and snow
//!
//! Shortwave radiation is attenuated by each medium following a sum of
//! exponentials over spectral bands,
//!
//! $$I(z) = I_0 \sum_i f_i \exp(-k_i z)$$
//!
//! where the band fractions $f_i$ sum to one and $k_i$ are the extinction
//! coefficients (m⁻¹).

use crate::errors::{FlakeError, FlakeResult};
use crate::physics::T_F;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Maximum number of spectral bands per medium.
pub const MAX_BANDS: usize = 10;

/// Tolerance on the sum of band fractions.
pub const FRACTION_TOLERANCE: FloatValue = 1.0e-6;

/// Extinction coefficient used to make ice or snow opaque (m⁻¹).
pub const OPAQUE_EXTINCTION: FloatValue = 1.0e7;

/// Interpolation coefficient of the ice albedo parameterisation.
pub const ICE_ALBEDO_COEFFICIENT: FloatValue = 95.6;

/// A single spectral band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalBand {
    /// Fraction of the total shortwave flux in this band.
    pub fraction: FloatValue,
    /// Extinction coefficient (m⁻¹).
    pub extinction: FloatValue,
}

/// Ordered set of spectral bands describing one medium.
///
/// Construction validates the band set, so every value of this type has
/// between one and [`MAX_BANDS`] bands, positive extinction coefficients and
/// fractions summing to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OpticalBand>", into = "Vec<OpticalBand>")]
pub struct OpticalProperties {
    bands: Vec<OpticalBand>,
}

impl OpticalProperties {
    pub fn new(bands: Vec<OpticalBand>) -> FlakeResult<Self> {
        if bands.is_empty() {
            return Err(FlakeError::InvalidConfiguration(
                "optical properties need at least one band".to_string(),
            ));
        }
        if bands.len() > MAX_BANDS {
            return Err(FlakeError::InvalidConfiguration(format!(
                "{} optical bands given, at most {} are supported",
                bands.len(),
                MAX_BANDS
            )));
        }
        for band in &bands {
            if !(band.extinction > 0.0) || !band.extinction.is_finite() {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "extinction coefficient must be positive, got {}",
                    band.extinction
                )));
            }
            if !(0.0..=1.0).contains(&band.fraction) {
                return Err(FlakeError::InvalidConfiguration(format!(
                    "band fraction must lie in [0, 1], got {}",
                    band.fraction
                )));
            }
        }
        let total: FloatValue = bands.iter().map(|b| b.fraction).sum();
        if (total - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(FlakeError::InvalidConfiguration(format!(
                "band fractions must sum to 1, got {}",
                total
            )));
        }
        Ok(Self { bands })
    }

    /// Single band medium with the given extinction coefficient.
    pub fn single(extinction: FloatValue) -> FlakeResult<Self> {
        Self::new(vec![OpticalBand {
            fraction: 1.0,
            extinction,
        }])
    }

    // The reference sets below are known to be valid
    fn reference(bands: &[(FloatValue, FloatValue)]) -> Self {
        Self {
            bands: bands
                .iter()
                .map(|&(fraction, extinction)| OpticalBand {
                    fraction,
                    extinction,
                })
                .collect(),
        }
    }

    /// Typical lake water, 3 m⁻¹.
    pub fn water_reference() -> Self {
        Self::reference(&[(1.0, 3.0)])
    }

    /// Transparent water, two bands.
    pub fn water_transparent() -> Self {
        Self::reference(&[(0.10, 2.0), (0.90, 0.20)])
    }

    pub fn white_ice() -> Self {
        Self::reference(&[(1.0, 17.1)])
    }

    pub fn blue_ice() -> Self {
        Self::reference(&[(1.0, 8.4)])
    }

    pub fn dry_snow() -> Self {
        Self::reference(&[(1.0, 25.0)])
    }

    pub fn melting_snow() -> Self {
        Self::reference(&[(1.0, 15.0)])
    }

    /// Medium that absorbs all incoming shortwave at its surface.
    pub fn opaque() -> Self {
        Self::reference(&[(1.0, OPAQUE_EXTINCTION)])
    }

    pub fn bands(&self) -> &[OpticalBand] {
        &self.bands
    }

    /// Fraction of the flux entering the medium that remains at `depth`.
    ///
    /// Exponent arguments are capped at `max_exp_arg`.
    pub fn transmission(&self, depth: FloatValue, max_exp_arg: FloatValue) -> FloatValue {
        self.bands
            .iter()
            .map(|b| b.fraction * (-(b.extinction * depth).min(max_exp_arg)).exp())
            .sum()
    }

    /// Integral of the transmission between `top` and `bottom`, divided by
    /// the layer thickness.
    ///
    /// Returns the mean fraction of the flux entering the medium over the
    /// layer. The caller is responsible for `bottom > top`.
    pub fn mean_transmission(
        &self,
        top: FloatValue,
        bottom: FloatValue,
        max_exp_arg: FloatValue,
    ) -> FloatValue {
        let integral: FloatValue = self
            .bands
            .iter()
            .map(|b| {
                let upper = (-(b.extinction * top).min(max_exp_arg)).exp();
                let lower = (-(b.extinction * bottom).min(max_exp_arg)).exp();
                b.fraction / b.extinction * (upper - lower)
            })
            .sum();
        integral / (bottom - top)
    }
}

impl TryFrom<Vec<OpticalBand>> for OpticalProperties {
    type Error = FlakeError;

    fn try_from(bands: Vec<OpticalBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<OpticalProperties> for Vec<OpticalBand> {
    fn from(value: OpticalProperties) -> Self {
        value.bands
    }
}

/// Shortwave albedo of each surface medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceAlbedo {
    /// Default: 0.07
    pub water: FloatValue,
    /// Default: 0.60 (white ice)
    pub ice: FloatValue,
    /// Default: 0.60 (dry snow)
    pub snow: FloatValue,
}

impl SurfaceAlbedo {
    pub const WATER: FloatValue = 0.07;
    pub const WHITE_ICE: FloatValue = 0.60;
    pub const BLUE_ICE: FloatValue = 0.10;
    pub const DRY_SNOW: FloatValue = 0.60;
    pub const MELTING_SNOW: FloatValue = 0.10;
}

impl Default for SurfaceAlbedo {
    fn default() -> Self {
        Self {
            water: Self::WATER,
            ice: Self::WHITE_ICE,
            snow: Self::DRY_SNOW,
        }
    }
}

/// Albedo of an ice surface at temperature `t_surface`.
///
/// Interpolates between white ice for cold surfaces and blue ice at the
/// melting point:
///
/// $$\alpha = \alpha_{white} (1 - x) + \alpha_{blue} x, \quad x = \exp\left(-95.6 \frac{T_f - T_s}{T_f}\right)$$
pub fn ice_albedo(t_surface: FloatValue) -> FloatValue {
    let x = (-ICE_ALBEDO_COEFFICIENT * (T_F - t_surface).max(0.0) / T_F).exp();
    SurfaceAlbedo::WHITE_ICE * (1.0 - x) + SurfaceAlbedo::BLUE_ICE * x
}

/// Optical properties and albedos of every medium in the lake column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeOptics {
    /// Default: single band, 3 m⁻¹
    pub water: OpticalProperties,
    /// Default: opaque
    pub ice: OpticalProperties,
    /// Default: opaque
    pub snow: OpticalProperties,
    pub albedo: SurfaceAlbedo,
}

impl LakeOptics {
    /// Water with a single band of the given extinction coefficient under
    /// opaque ice and snow.
    pub fn with_water_extinction(extinction: FloatValue) -> FlakeResult<Self> {
        Ok(Self {
            water: OpticalProperties::single(extinction)?,
            ..Self::default()
        })
    }
}

impl Default for LakeOptics {
    fn default() -> Self {
        Self {
            water: OpticalProperties::water_reference(),
            ice: OpticalProperties::opaque(),
            snow: OpticalProperties::opaque(),
            albedo: SurfaceAlbedo::default(),
        }
    }
}
