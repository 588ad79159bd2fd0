//! A year of daily steps driven by an idealised mid-latitude climate.

use approx::assert_abs_diff_eq;
use rflake_components::components::{
    saturation_specific_humidity, DownwellingLongwave, SurfaceAir,
};
use rflake_components::interface::{Atmosphere, LakeColumn, LakeColumnParameters};
use rflake_components::simulation::Simulation;
use rflake_core::config::LakeConfig;
use rflake_core::driver::StepOutput;
use rflake_core::physics::{C_T_MAX, C_T_MIN, T_F, T_R};
use rflake_core::state::{InitialConditions, LakeState};
use rflake_core::FloatValue;
use std::f64::consts::PI;

const DAYS: usize = 365;
/// Day of the year with the coldest air and the weakest sunshine.
const COLDEST_DAY: FloatValue = 15.0;

fn seasonal(day: usize, low: FloatValue, high: FloatValue) -> FloatValue {
    let phase = 2.0 * PI * (day as FloatValue - COLDEST_DAY) / DAYS as FloatValue;
    0.5 * (low + high) - 0.5 * (high - low) * phase.cos()
}

fn climate() -> Vec<Atmosphere> {
    (0..DAYS)
        .map(|day| {
            let t_a = seasonal(day, 258.0, 298.0);
            let p_a = 101325.0;
            Atmosphere {
                i_atm: seasonal(day, 20.0, 280.0),
                longwave: DownwellingLongwave::FromCloudiness { cloudiness: 0.6 },
                air: SurfaceAir {
                    u_a: 4.0,
                    t_a,
                    q_a: 0.8 * saturation_specific_humidity(t_a, p_a, t_a < T_F),
                    p_a,
                    ..SurfaceAir::default()
                },
                dmsnow_dt: 0.0,
            }
        })
        .collect()
}

fn simulate() -> (LakeConfig, Vec<StepOutput>) {
    let config = LakeConfig {
        depth_w: 6.0,
        depth_bs: 5.0,
        t_bs: 279.0,
        fetch: 2000.0,
        del_time: 86400.0,
        ..LakeConfig::default()
    };
    let column = LakeColumn::from_parameters(LakeColumnParameters {
        config: config.clone(),
        ..LakeColumnParameters::default()
    })
    .unwrap();
    let initial = LakeState::cold_start(&InitialConditions::default(), &config).unwrap();
    let outputs = Simulation::new(column).run(initial, &climate()).unwrap();
    (config, outputs)
}

mod annual_cycle {
    use super::*;

    #[test]
    fn test_every_day_is_consistent() {
        let (config, outputs) = simulate();
        assert_eq!(outputs.len(), DAYS);

        for (day, output) in outputs.iter().enumerate() {
            let state = &output.state;
            assert!(output.t_sfc.is_finite(), "day {}", day);
            assert_eq!(output.t_sfc, state.t_sfc);
            assert!(state.h_ice >= config.limits.thickness_floor, "day {}", day);
            assert!(state.h_ml >= 0.0 && state.h_ml <= config.depth_w, "day {}", day);
            assert!(state.t_wml >= T_F && state.t_bot >= T_F, "day {}", day);
            assert!(state.t_ice <= T_F, "day {}", day);
            assert!(
                state.shape.c_t >= C_T_MIN && state.shape.c_t <= C_T_MAX,
                "day {}",
                day
            );
        }
    }

    #[test]
    fn test_ice_forms_in_winter_and_melts_by_late_summer() {
        let (config, outputs) = simulate();
        let h_ice_min = config.limits.h_ice_min;

        let winter_ice = outputs[..90]
            .iter()
            .map(|o| o.state.h_ice)
            .fold(0.0, FloatValue::max);
        assert!(winter_ice > 0.05, "maximum winter ice {}", winter_ice);

        let late_summer = &outputs[240];
        assert!(late_summer.state.h_ice <= h_ice_min);
        assert_abs_diff_eq!(late_summer.t_sfc, late_summer.state.t_wml);
        assert!(late_summer.t_sfc > T_R);
    }
}
