//! Collaborators of the rflake lake engine
//!
//! The engine in `rflake-core` expects previously computed surface fluxes.
//! This crate provides the pieces that produce them from near-surface
//! meteorology:
//! - `components`: turbulent surface flux schemes and the longwave budget
//! - `interface`: a lake column stepping under an atmospheric state
//! - `simulation`: runs a column through a forcing series

pub mod components;
pub mod interface;
pub mod python;
pub mod simulation;
