//! Shortwave radiation through snow, ice and water
//!
//! The flux that penetrates the surface, $I_0 = I_{atm}(1 - \alpha)$, is
//! attenuated band by band through each medium in turn. Within the water the
//! mean flux over a layer $[z_1, z_2]$ has the closed form
//!
//! $$\bar I = \frac{I_w}{z_2 - z_1} \sum_i \frac{f_i}{k_i}\left(e^{-k_i z_1} - e^{-k_i z_2}\right)$$

use crate::config::NumericalLimits;
use crate::optics::LakeOptics;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Shortwave fluxes at every interface of the lake column (W m⁻²).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiationProfile {
    /// Air-snow interface.
    pub i_snow: FloatValue,
    /// Snow-ice interface.
    pub i_ice: FloatValue,
    /// Ice-water interface, or the water surface in open water.
    pub i_w: FloatValue,
    /// Bottom of the mixed layer.
    pub i_h: FloatValue,
    /// Lake bottom.
    pub i_bot: FloatValue,
    /// Mean over the mixed layer.
    pub i_intm_0_h: FloatValue,
    /// Mean over the thermocline.
    pub i_intm_h_d: FloatValue,
}

/// Surface covering the water, which decides where the albedo applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCover {
    OpenWater,
    Ice,
    SnowOnIce,
}

impl RadiationProfile {
    pub fn compute(
        i_atm: FloatValue,
        optics: &LakeOptics,
        cover: SurfaceCover,
        h_snow: FloatValue,
        h_ice: FloatValue,
        h_ml: FloatValue,
        depth_w: FloatValue,
        limits: &NumericalLimits,
    ) -> Self {
        let max_arg = limits.max_exp_arg;

        let (i_snow, i_ice, i_w) = match cover {
            SurfaceCover::SnowOnIce => {
                let i_snow = i_atm * (1.0 - optics.albedo.snow);
                let i_ice = i_snow * optics.snow.transmission(h_snow, max_arg);
                (i_snow, i_ice, i_ice * optics.ice.transmission(h_ice, max_arg))
            }
            SurfaceCover::Ice => {
                let i_ice = i_atm * (1.0 - optics.albedo.ice);
                (i_atm, i_ice, i_ice * optics.ice.transmission(h_ice, max_arg))
            }
            SurfaceCover::OpenWater => (i_atm, i_atm, i_atm * (1.0 - optics.albedo.water)),
        };

        let i_h = i_w * optics.water.transmission(h_ml, max_arg);
        let i_bot = i_w * optics.water.transmission(depth_w, max_arg);

        let i_intm_0_h = if h_ml >= limits.h_ml_min {
            i_w * optics.water.mean_transmission(0.0, h_ml, max_arg)
        } else {
            i_h
        };
        let i_intm_h_d = if h_ml <= depth_w - limits.h_ml_min {
            i_w * optics.water.mean_transmission(h_ml, depth_w, max_arg)
        } else {
            0.0
        };

        Self {
            i_snow,
            i_ice,
            i_w,
            i_h,
            i_bot,
            i_intm_0_h,
            i_intm_h_d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::{OpticalProperties, SurfaceAlbedo};
    use is_close::is_close;

    fn limits() -> NumericalLimits {
        NumericalLimits::default()
    }

    #[test]
    fn open_water_single_band_energy_balance() {
        let optics = LakeOptics::default();
        let h_ml = 2.0;
        let profile = RadiationProfile::compute(
            400.0,
            &optics,
            SurfaceCover::OpenWater,
            0.0,
            0.0,
            h_ml,
            20.0,
            &limits(),
        );
        assert!(is_close!(profile.i_w, 400.0 * (1.0 - SurfaceAlbedo::WATER)));

        // Flux entering the mixed layer minus the flux leaving it equals the
        // energy absorbed in between
        let k = 3.0;
        let absorbed = k * h_ml * profile.i_intm_0_h;
        assert!(
            (profile.i_w - profile.i_h - absorbed).abs() < 1e-9,
            "i_w={} i_h={} absorbed={}",
            profile.i_w,
            profile.i_h,
            absorbed
        );

        let absorbed = k * (20.0 - h_ml) * profile.i_intm_h_d;
        assert!((profile.i_h - profile.i_bot - absorbed).abs() < 1e-9);
    }

    #[test]
    fn attenuation_is_monotonic_with_depth() {
        let optics = LakeOptics {
            water: OpticalProperties::water_transparent(),
            ice: OpticalProperties::blue_ice(),
            snow: OpticalProperties::melting_snow(),
            ..LakeOptics::default()
        };
        for cover in [
            SurfaceCover::OpenWater,
            SurfaceCover::Ice,
            SurfaceCover::SnowOnIce,
        ] {
            for h_ml in [0.0, 0.005, 1.0, 5.0, 9.995, 10.0] {
                let p = RadiationProfile::compute(
                    600.0,
                    &optics,
                    cover,
                    0.1,
                    0.3,
                    h_ml,
                    10.0,
                    &limits(),
                );
                assert!(p.i_snow >= p.i_ice, "{:?}", p);
                assert!(p.i_ice >= p.i_w, "{:?}", p);
                assert!(p.i_w >= p.i_h, "{:?}", p);
                assert!(p.i_h >= p.i_bot, "{:?}", p);
                assert!(p.i_intm_0_h <= p.i_w && p.i_intm_0_h >= p.i_h);
            }
        }
    }

    #[test]
    fn snow_albedo_applies_at_the_top() {
        let optics = LakeOptics {
            snow: OpticalProperties::dry_snow(),
            ice: OpticalProperties::white_ice(),
            ..LakeOptics::default()
        };
        let p = RadiationProfile::compute(
            100.0,
            &optics,
            SurfaceCover::SnowOnIce,
            0.02,
            0.2,
            0.0,
            10.0,
            &limits(),
        );
        assert!(is_close!(p.i_snow, 100.0 * (1.0 - SurfaceAlbedo::DRY_SNOW)));
        assert!(is_close!(p.i_ice, p.i_snow * (-25.0_f64 * 0.02).exp()));
        assert!(is_close!(p.i_w, p.i_ice * (-17.1_f64 * 0.2).exp()));
    }

    #[test]
    fn opaque_ice_blocks_radiation() {
        let p = RadiationProfile::compute(
            800.0,
            &LakeOptics::default(),
            SurfaceCover::Ice,
            0.0,
            0.1,
            1.0,
            10.0,
            &limits(),
        );
        assert!(p.i_ice > 0.0);
        assert!(p.i_w < 1e-30);
    }

    #[test]
    fn degenerate_layers() {
        let optics = LakeOptics::default();
        // Mixed layer thinner than the minimum: mean is the flux at its base
        let p = RadiationProfile::compute(
            100.0,
            &optics,
            SurfaceCover::OpenWater,
            0.0,
            0.0,
            0.001,
            10.0,
            &limits(),
        );
        assert!(is_close!(p.i_intm_0_h, p.i_h));

        // Mixed layer reaching the bottom: no thermocline
        let p = RadiationProfile::compute(
            100.0,
            &optics,
            SurfaceCover::OpenWater,
            0.0,
            0.0,
            10.0,
            10.0,
            &limits(),
        );
        assert_eq!(p.i_intm_h_d, 0.0);
        assert!(p.i_intm_0_h.is_finite());
    }
}
