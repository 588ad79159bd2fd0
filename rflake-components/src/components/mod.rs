pub mod longwave;
pub mod surface_flux;

pub use longwave::{DownwellingLongwave, LongwaveBudget};
pub use surface_flux::{
    saturation_specific_humidity, NeutralBulk, StabilityCorrected, SurfaceAir, SurfaceFluxScheme,
    TurbulentFluxes,
};
