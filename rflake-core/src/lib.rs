//! Timestep advance engine for a two-layer lake model.
//!
//! The lake is represented by a mixed layer over a thermocline with a
//! self-similar temperature profile, optionally capped by ice and snow and
//! underlain by a two-layer bottom sediment. A single call to
//! [`driver::advance`] moves the [`state::LakeState`] forward by one timestep.

pub mod config;
pub mod constraints;
pub mod driver;
pub mod errors;
pub mod forcing;
pub mod ice;
pub mod mixing;
pub mod optics;
pub mod physics;
pub mod python;
pub mod radiation;
pub mod sediment;
pub mod state;

/// Floating point type used for every physical quantity in the engine.
pub type FloatValue = f64;
