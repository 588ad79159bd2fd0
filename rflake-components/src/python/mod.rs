use crate::components::{DownwellingLongwave, SurfaceAir};
use crate::interface::{Atmosphere, LakeColumn, LakeColumnParameters};
use crate::simulation::Simulation;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::{pymodule, Bound, PyResult};
use rflake_core::python::{PyLakeConfig, PyLakeState, PyStepOutput};
use rflake_core::FloatValue;
use std::collections::HashMap;

/// A lake forced by near-surface meteorology
///
/// Example:
///     column = LakeColumn.from_parameters({"config": {"depth_w": 20.0, "del_time": 3600.0}})
///     outputs = column.run(state, i_atm, t_a, q_a, u_a, cloudiness)
#[pyclass]
#[pyo3(name = "LakeColumn")]
pub struct PyLakeColumn(pub Simulation);

fn build(parameters: LakeColumnParameters) -> PyResult<PyLakeColumn> {
    LakeColumn::from_parameters(parameters)
        .map(|column| PyLakeColumn(Simulation::new(column)))
        .map_err(|e| PyValueError::new_err(format!("{}", e)))
}

fn to_vec(values: &PyReadonlyArray1<FloatValue>) -> Vec<FloatValue> {
    values.as_array().iter().copied().collect()
}

#[pymethods]
impl PyLakeColumn {
    #[new]
    fn new(config: &PyLakeConfig) -> PyResult<Self> {
        build(LakeColumnParameters {
            config: config.0.clone(),
            ..LakeColumnParameters::default()
        })
    }

    #[staticmethod]
    pub fn from_parameters(parameters: Bound<PyAny>) -> PyResult<Self> {
        let parameters = pythonize::depythonize_bound::<LakeColumnParameters>(parameters)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        build(parameters)
    }

    #[getter]
    fn config(&self) -> PyLakeConfig {
        PyLakeConfig(self.0.column().config().clone())
    }

    /// Advance the lake by a single step
    #[pyo3(signature = (state, i_atm, t_a, q_a, u_a, cloudiness=0.5, p_a=101325.0, dmsnow_dt=0.0))]
    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        state: &PyLakeState,
        i_atm: FloatValue,
        t_a: FloatValue,
        q_a: FloatValue,
        u_a: FloatValue,
        cloudiness: FloatValue,
        p_a: FloatValue,
        dmsnow_dt: FloatValue,
    ) -> PyResult<PyStepOutput> {
        let atmosphere = Atmosphere {
            i_atm,
            longwave: DownwellingLongwave::FromCloudiness { cloudiness },
            air: SurfaceAir {
                u_a,
                t_a,
                q_a,
                p_a,
                ..SurfaceAir::default()
            },
            dmsnow_dt,
        };
        self.0
            .column()
            .step(&state.0, &atmosphere)
            .map(PyStepOutput)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))
    }

    /// Run the lake through a forcing series
    ///
    /// Every input array holds one value per step. Returns a dictionary of
    /// arrays with the surface temperature and the main state variables
    /// after each step.
    #[pyo3(signature = (state, i_atm, t_a, q_a, u_a, cloudiness, p_a=101325.0))]
    #[allow(clippy::too_many_arguments)]
    fn run<'py>(
        &self,
        py: Python<'py>,
        state: &PyLakeState,
        i_atm: PyReadonlyArray1<'py, FloatValue>,
        t_a: PyReadonlyArray1<'py, FloatValue>,
        q_a: PyReadonlyArray1<'py, FloatValue>,
        u_a: PyReadonlyArray1<'py, FloatValue>,
        cloudiness: PyReadonlyArray1<'py, FloatValue>,
        p_a: FloatValue,
    ) -> PyResult<HashMap<String, Bound<'py, PyArray1<FloatValue>>>> {
        let i_atm = to_vec(&i_atm);
        let t_a = to_vec(&t_a);
        let q_a = to_vec(&q_a);
        let u_a = to_vec(&u_a);
        let cloudiness = to_vec(&cloudiness);

        let n = i_atm.len();
        if [t_a.len(), q_a.len(), u_a.len(), cloudiness.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(PyValueError::new_err(
                "all forcing arrays must have the same length",
            ));
        }

        let atmosphere: Vec<Atmosphere> = (0..n)
            .map(|i| Atmosphere {
                i_atm: i_atm[i],
                longwave: DownwellingLongwave::FromCloudiness {
                    cloudiness: cloudiness[i],
                },
                air: SurfaceAir {
                    u_a: u_a[i],
                    t_a: t_a[i],
                    q_a: q_a[i],
                    p_a,
                    ..SurfaceAir::default()
                },
                dmsnow_dt: 0.0,
            })
            .collect();

        let outputs = self
            .0
            .run(state.0, &atmosphere)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;

        let series = |f: fn(&rflake_core::driver::StepOutput) -> FloatValue| {
            PyArray1::from_vec_bound(py, outputs.iter().map(f).collect())
        };
        Ok(HashMap::from([
            ("t_sfc".to_string(), series(|o| o.t_sfc)),
            ("t_wml".to_string(), series(|o| o.state.t_wml)),
            ("t_mnw".to_string(), series(|o| o.state.t_mnw)),
            ("t_bot".to_string(), series(|o| o.state.t_bot)),
            ("h_ml".to_string(), series(|o| o.state.h_ml)),
            ("h_ice".to_string(), series(|o| o.state.h_ice)),
            ("h_snow".to_string(), series(|o| o.state.h_snow)),
            ("c_t".to_string(), series(|o| o.state.shape.c_t)),
        ]))
    }
}

#[pymodule]
pub fn components(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLakeColumn>()?;
    Ok(())
}
