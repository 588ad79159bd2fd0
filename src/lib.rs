//! Python bindings for the rflake lake model
//!
//! The engine lives in `rflake-core` and the atmospheric collaborators in
//! `rflake-components`. This crate only assembles the extension module.

pub mod python;
