use crate::driver::{self, LakeModel, StepOutput};
use crate::python::state::{PyForcingBundle, PyLakeConfig, PyLakeOptics, PyLakeState};
use crate::python::to_py_err;
use crate::FloatValue;
use numpy::PyArray1;
use pyo3::prelude::*;

/// Result of a single timestep
#[pyclass]
#[pyo3(name = "StepOutput")]
#[derive(Debug, Clone)]
pub struct PyStepOutput(pub StepOutput);

#[pymethods]
impl PyStepOutput {
    #[getter]
    fn state(&self) -> PyLakeState {
        PyLakeState(self.0.state)
    }

    #[getter]
    fn t_sfc(&self) -> FloatValue {
        self.0.t_sfc
    }

    #[getter]
    fn ice_regime(&self) -> String {
        format!("{:?}", self.0.ice_regime)
    }

    #[getter]
    fn mixing_regime(&self) -> String {
        format!("{:?}", self.0.mixing_regime)
    }

    #[getter]
    fn w_star(&self) -> FloatValue {
        self.0.w_star
    }

    /// Shortwave fluxes [i_snow, i_ice, i_w, i_h, i_bot, i_intm_0_h, i_intm_h_d]
    fn radiation<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<FloatValue>> {
        let r = &self.0.radiation;
        PyArray1::from_slice_bound(
            py,
            &[
                r.i_snow,
                r.i_ice,
                r.i_w,
                r.i_h,
                r.i_bot,
                r.i_intm_0_h,
                r.i_intm_h_d,
            ],
        )
    }

    /// Heat fluxes [q_snow, q_ice, q_w, q_bot, q_star]
    fn fluxes<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<FloatValue>> {
        let f = &self.0.fluxes;
        PyArray1::from_slice_bound(py, &[f.q_snow, f.q_ice, f.q_w, f.q_bot, f.q_star])
    }

    /// Names of the quantities clamped during the step
    fn clamped_quantities(&self) -> Vec<String> {
        self.0
            .diagnostics
            .clamps
            .iter()
            .map(|c| c.quantity.to_string())
            .collect()
    }

    #[getter]
    fn thermal_wave_vanished(&self) -> bool {
        self.0.diagnostics.thermal_wave_vanished
    }

    #[getter]
    fn unstable_collapse(&self) -> bool {
        self.0.diagnostics.unstable_collapse
    }
}

/// A lake with a fixed configuration and optics
#[pyclass]
#[pyo3(name = "LakeModel")]
#[derive(Debug, Clone)]
pub struct PyLakeModel(pub LakeModel);

#[pymethods]
impl PyLakeModel {
    #[new]
    #[pyo3(signature = (config, optics=None))]
    fn new(config: &PyLakeConfig, optics: Option<PyRef<'_, PyLakeOptics>>) -> PyResult<Self> {
        let optics = optics.map(|o| o.0.clone()).unwrap_or_default();
        LakeModel::from_parameters(config.0.clone(), optics)
            .map(Self)
            .map_err(to_py_err)
    }

    fn advance(&self, state: &PyLakeState, forcing: &PyForcingBundle) -> PyResult<PyStepOutput> {
        self.0
            .advance(&state.0, &forcing.0)
            .map(PyStepOutput)
            .map_err(to_py_err)
    }
}

/// Advance a lake state by one timestep
#[pyfunction]
#[pyo3(signature = (state, forcing, config, optics=None))]
pub fn advance(
    state: &PyLakeState,
    forcing: &PyForcingBundle,
    config: &PyLakeConfig,
    optics: Option<PyRef<'_, PyLakeOptics>>,
) -> PyResult<PyStepOutput> {
    let optics = optics.map(|o| o.0.clone()).unwrap_or_default();
    driver::advance(&state.0, &forcing.0, &config.0, &optics)
        .map(PyStepOutput)
        .map_err(to_py_err)
}
