//! Python wrappers for the configuration, optics, forcing and state values

use crate::config::LakeConfig;
use crate::forcing::ForcingBundle;
use crate::optics::LakeOptics;
use crate::python::to_py_err;
use crate::state::{InitialConditions, LakeState};
use crate::FloatValue;
use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::de::DeserializeOwned;

/// Deserialize a parameter struct from a Python mapping.
fn from_mapping<T: DeserializeOwned>(parameters: Bound<PyAny>) -> PyResult<T> {
    pythonize::depythonize_bound::<T>(parameters)
        .map_err(|e| PyValueError::new_err(format!("{}", e)))
}

/// Static description of a lake and the timestep.
///
/// Example:
///     config = LakeConfig.from_parameters({"depth_w": 25.0, "del_time": 3600.0})
#[pyclass]
#[pyo3(name = "LakeConfig")]
#[derive(Debug, Clone)]
pub struct PyLakeConfig(pub LakeConfig);

#[pymethods]
impl PyLakeConfig {
    #[new]
    #[pyo3(signature = (
        depth_w=10.0,
        del_time=86400.0,
        depth_bs=10.0,
        t_bs=277.13,
        fetch=1000.0,
        latitude=None,
        sediments_on=true
    ))]
    fn new(
        depth_w: FloatValue,
        del_time: FloatValue,
        depth_bs: FloatValue,
        t_bs: FloatValue,
        fetch: FloatValue,
        latitude: Option<FloatValue>,
        sediments_on: bool,
    ) -> PyResult<Self> {
        let config = LakeConfig {
            depth_w,
            del_time,
            depth_bs,
            t_bs,
            fetch,
            latitude,
            sediments_on,
            ..LakeConfig::default()
        };
        config.validate().map_err(to_py_err)?;
        Ok(Self(config))
    }

    /// Build from a dictionary, unset fields take their defaults
    #[staticmethod]
    fn from_parameters(parameters: Bound<PyAny>) -> PyResult<Self> {
        let config: LakeConfig = from_mapping(parameters)?;
        config.validate().map_err(to_py_err)?;
        Ok(Self(config))
    }

    #[staticmethod]
    fn from_toml(content: &str) -> PyResult<Self> {
        LakeConfig::from_toml_str(content)
            .map(Self)
            .map_err(to_py_err)
    }

    fn to_toml(&self) -> PyResult<String> {
        self.0.to_toml_string().map_err(to_py_err)
    }

    #[getter]
    fn depth_w(&self) -> FloatValue {
        self.0.depth_w
    }

    #[getter]
    fn del_time(&self) -> FloatValue {
        self.0.del_time
    }

    #[getter]
    fn depth_bs(&self) -> FloatValue {
        self.0.depth_bs
    }

    #[getter]
    fn t_bs(&self) -> FloatValue {
        self.0.t_bs
    }

    #[getter]
    fn fetch(&self) -> FloatValue {
        self.0.fetch
    }

    #[getter]
    fn sediments_on(&self) -> bool {
        self.0.sediments_on
    }

    /// Coriolis parameter used by the model (s⁻¹)
    fn coriolis_parameter(&self) -> FloatValue {
        self.0.coriolis_parameter()
    }

    fn __repr__(&self) -> String {
        format!(
            "LakeConfig(depth_w={}, del_time={}, sediments_on={})",
            self.0.depth_w, self.0.del_time, self.0.sediments_on
        )
    }
}

/// Optical properties and albedos of the lake surfaces
#[pyclass]
#[pyo3(name = "LakeOptics")]
#[derive(Debug, Clone)]
pub struct PyLakeOptics(pub LakeOptics);

#[pymethods]
impl PyLakeOptics {
    #[new]
    fn new() -> Self {
        Self(LakeOptics::default())
    }

    /// Reference optics with a single band water extinction coefficient (m⁻¹)
    #[staticmethod]
    fn with_water_extinction(extinction: FloatValue) -> PyResult<Self> {
        LakeOptics::with_water_extinction(extinction)
            .map(Self)
            .map_err(to_py_err)
    }

    #[staticmethod]
    fn from_parameters(parameters: Bound<PyAny>) -> PyResult<Self> {
        from_mapping(parameters).map(Self)
    }

    #[getter]
    fn water_albedo(&self) -> FloatValue {
        self.0.albedo.water
    }

    #[getter]
    fn ice_albedo(&self) -> FloatValue {
        self.0.albedo.ice
    }

    #[getter]
    fn snow_albedo(&self) -> FloatValue {
        self.0.albedo.snow
    }
}

/// Fluxes and forcing for a single timestep.
///
/// Radiative fluxes are positive downward, turbulent fluxes positive upward.
#[pyclass]
#[pyo3(name = "ForcingBundle")]
#[derive(Debug, Clone)]
pub struct PyForcingBundle(pub ForcingBundle);

#[pymethods]
impl PyForcingBundle {
    #[new]
    #[pyo3(signature = (
        i_atm=0.0,
        q_atm_lw=0.0,
        q_momentum=0.0,
        q_sensible=0.0,
        q_latent=0.0,
        dmsnow_dt=0.0,
        u_star=0.0,
        w_star=0.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        i_atm: FloatValue,
        q_atm_lw: FloatValue,
        q_momentum: FloatValue,
        q_sensible: FloatValue,
        q_latent: FloatValue,
        dmsnow_dt: FloatValue,
        u_star: FloatValue,
        w_star: FloatValue,
    ) -> PyResult<Self> {
        let forcing = ForcingBundle {
            i_atm,
            q_atm_lw,
            q_momentum,
            q_sensible,
            q_latent,
            dmsnow_dt,
            u_star,
            w_star,
        };
        forcing.validate().map_err(to_py_err)?;
        Ok(Self(forcing))
    }

    #[getter]
    fn i_atm(&self) -> FloatValue {
        self.0.i_atm
    }

    /// Net non-solar heat flux into the surface (W m⁻²)
    fn net_surface_heat_flux(&self) -> FloatValue {
        self.0.net_surface_heat_flux()
    }
}

/// Prognostic state of a lake column
#[pyclass]
#[pyo3(name = "LakeState")]
#[derive(Debug, Clone)]
pub struct PyLakeState(pub LakeState);

#[pymethods]
impl PyLakeState {
    /// Initial state from a dictionary of initial conditions
    #[staticmethod]
    #[pyo3(signature = (config, initial=None))]
    fn cold_start(config: &PyLakeConfig, initial: Option<Bound<PyAny>>) -> PyResult<Self> {
        let initial: InitialConditions = match initial {
            Some(initial) => from_mapping(initial)?,
            None => InitialConditions::default(),
        };
        LakeState::cold_start(&initial, &config.0)
            .map(Self)
            .map_err(to_py_err)
    }

    #[staticmethod]
    fn from_json(content: &str) -> PyResult<Self> {
        LakeState::from_json(content).map(Self).map_err(to_py_err)
    }

    fn to_json(&self) -> PyResult<String> {
        self.0.to_json().map_err(to_py_err)
    }

    #[getter]
    fn t_snow(&self) -> FloatValue {
        self.0.t_snow
    }

    #[getter]
    fn t_ice(&self) -> FloatValue {
        self.0.t_ice
    }

    #[getter]
    fn t_wml(&self) -> FloatValue {
        self.0.t_wml
    }

    #[getter]
    fn t_mnw(&self) -> FloatValue {
        self.0.t_mnw
    }

    #[getter]
    fn t_bot(&self) -> FloatValue {
        self.0.t_bot
    }

    #[getter]
    fn t_b1(&self) -> FloatValue {
        self.0.t_b1
    }

    #[getter]
    fn h_snow(&self) -> FloatValue {
        self.0.h_snow
    }

    #[getter]
    fn h_ice(&self) -> FloatValue {
        self.0.h_ice
    }

    #[getter]
    fn h_ml(&self) -> FloatValue {
        self.0.h_ml
    }

    #[getter]
    fn h_b1(&self) -> FloatValue {
        self.0.h_b1
    }

    #[getter]
    fn c_t(&self) -> FloatValue {
        self.0.shape.c_t
    }

    #[getter]
    fn t_sfc(&self) -> FloatValue {
        self.0.t_sfc
    }

    /// Temperatures as an array [t_snow, t_ice, t_wml, t_mnw, t_bot, t_b1]
    fn temperatures<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<FloatValue>> {
        let s = &self.0;
        PyArray1::from_slice_bound(py, &[s.t_snow, s.t_ice, s.t_wml, s.t_mnw, s.t_bot, s.t_b1])
    }

    /// Thicknesses as an array [h_snow, h_ice, h_ml, h_b1]
    fn thicknesses<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<FloatValue>> {
        let s = &self.0;
        PyArray1::from_slice_bound(py, &[s.h_snow, s.h_ice, s.h_ml, s.h_b1])
    }

    fn __repr__(&self) -> String {
        format!(
            "LakeState(t_sfc={:.3}, t_wml={:.3}, h_ml={:.3}, h_ice={:.4}, h_snow={:.4})",
            self.0.t_sfc, self.0.t_wml, self.0.h_ml, self.0.h_ice, self.0.h_snow
        )
    }
}
