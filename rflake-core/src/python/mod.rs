//! Python bindings for the lake engine
//!
//! The wrappers hold the Rust values directly. Parameter structs can be
//! built from plain Python dictionaries with the same field names as the
//! Rust structs.

use crate::errors::FlakeError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::{pymodule, Bound, PyResult};

pub mod driver;
pub mod state;

pub use driver::{PyLakeModel, PyStepOutput};
pub use state::{PyForcingBundle, PyLakeConfig, PyLakeOptics, PyLakeState};

pub(crate) fn to_py_err(error: FlakeError) -> PyErr {
    PyValueError::new_err(format!("{}", error))
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLakeConfig>()?;
    m.add_class::<PyLakeOptics>()?;
    m.add_class::<PyLakeState>()?;
    m.add_class::<PyForcingBundle>()?;
    m.add_class::<PyStepOutput>()?;
    m.add_class::<PyLakeModel>()?;
    m.add_function(wrap_pyfunction!(driver::advance, m)?)?;
    Ok(())
}
