//! Clamp bookkeeping and the consistency pass applied to every new state
//!
//! A step never fails on a physically inconsistent intermediate value.
//! Instead the value is clamped, the clamp is recorded in [`Diagnostics`]
//! and logged. Clamps of liquid water temperatures within
//! [`NumericalLimits::freezing_tolerance`] of the freezing point are logged
//! at `debug` level only.
//!
//! The final pass also removes statically unstable stratification by
//! mixing the column down to its mean temperature, and selects the surface
//! temperature reported to the atmosphere.

use crate::config::{LakeConfig, NumericalLimits};
use crate::physics::{buoyancy_parameter, C_T_MAX, C_T_MIN, T_F};
use crate::state::{LakeState, ThermoclineShape};
use crate::FloatValue;
use log::{debug, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClampKind {
    /// A quantity left its physical range, e.g. water below freezing.
    PhysicalBound,
    /// A length or ratio degenerated, e.g. a layer thicker than the lake.
    DegenerateGeometry,
}

/// A single clamp applied during a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clamp {
    pub kind: ClampKind,
    pub quantity: &'static str,
    /// Value produced by the scheme.
    pub computed: FloatValue,
    /// Value kept in the state.
    pub clamped: FloatValue,
}

/// Clamps and events recorded while stepping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub clamps: Vec<Clamp>,
    /// The sediment thermal wave reached the base of the active layer.
    pub thermal_wave_vanished: bool,
    /// The column was statically unstable and has been mixed.
    pub unstable_collapse: bool,
}

impl Diagnostics {
    pub fn record(
        &mut self,
        kind: ClampKind,
        quantity: &'static str,
        computed: FloatValue,
        clamped: FloatValue,
    ) {
        match kind {
            ClampKind::PhysicalBound => {
                warn!("{} clamped from {} to {}", quantity, computed, clamped)
            }
            ClampKind::DegenerateGeometry => {
                debug!("{} clamped from {} to {}", quantity, computed, clamped)
            }
        }
        self.clamps.push(Clamp {
            kind,
            quantity,
            computed,
            clamped,
        });
    }

    pub fn has_clamp(&self, quantity: &str) -> bool {
        self.clamps.iter().any(|c| c.quantity == quantity)
    }

    /// Raise a liquid water temperature to the freezing point.
    ///
    /// Undershoots within the freezing tolerance are round-off and are not
    /// recorded.
    pub fn at_least_freezing(
        &mut self,
        quantity: &'static str,
        value: FloatValue,
        limits: &NumericalLimits,
    ) -> FloatValue {
        if value >= T_F {
            value
        } else {
            if T_F - value > limits.freezing_tolerance {
                self.record(ClampKind::PhysicalBound, quantity, value, T_F);
            }
            T_F
        }
    }

    /// Limit a value to `[lower, upper]`, recording the clamp.
    pub fn bounded(
        &mut self,
        kind: ClampKind,
        quantity: &'static str,
        value: FloatValue,
        lower: FloatValue,
        upper: FloatValue,
    ) -> FloatValue {
        let clamped = value.max(lower).min(upper);
        if clamped != value {
            self.record(kind, quantity, value, clamped);
        }
        clamped
    }
}

/// Enforce the state invariants on a freshly computed state and return the
/// surface temperature.
pub fn enforce(
    state: &mut LakeState,
    config: &LakeConfig,
    diagnostics: &mut Diagnostics,
) -> FloatValue {
    let limits = &config.limits;
    let depth_w = config.depth_w;

    state.h_ml = diagnostics.bounded(
        ClampKind::DegenerateGeometry,
        "h_ml",
        state.h_ml,
        0.0,
        depth_w,
    );

    if (state.t_wml - state.t_bot) * buoyancy_parameter(state.t_mnw) < 0.0 {
        debug!(
            "unstable stratification (t_wml={}, t_bot={}), mixing column to {}",
            state.t_wml, state.t_bot, state.t_mnw
        );
        state.t_wml = state.t_mnw;
        state.t_bot = state.t_mnw;
        state.h_ml = depth_w;
        state.shape = ThermoclineShape::minimum();
        diagnostics.unstable_collapse = true;
    }

    state.t_wml = diagnostics.at_least_freezing("t_wml", state.t_wml, limits);
    state.t_mnw = diagnostics.at_least_freezing("t_mnw", state.t_mnw, limits);
    state.t_bot = diagnostics.at_least_freezing("t_bot", state.t_bot, limits);

    let c_t = diagnostics.bounded(
        ClampKind::PhysicalBound,
        "c_t",
        state.shape.c_t,
        C_T_MIN,
        C_T_MAX,
    );
    state.shape = ThermoclineShape::from_c_t(c_t);

    // Ice and snow never fall below the reporting floor
    if state.h_ice < limits.thickness_floor {
        state.h_ice = limits.thickness_floor;
    }
    if state.h_snow < limits.thickness_floor {
        state.h_snow = limits.thickness_floor;
    }
    if state.h_b1 < 0.0 {
        diagnostics.record(ClampKind::DegenerateGeometry, "h_b1", state.h_b1, 0.0);
        state.h_b1 = 0.0;
    }

    let t_sfc = if state.has_snow(limits) {
        state.t_snow
    } else if state.has_ice(limits) {
        state.t_ice
    } else {
        state.t_wml
    };
    state.t_sfc = t_sfc;
    t_sfc
}
