use pyo3::prelude::*;
use pyo3::wrap_pymodule;
use rflake_components::python::components;
use rflake_core::python::core;

#[pymodule]
#[pyo3(name = "_lib")]
fn rflake(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(core))?;
    m.add_wrapped(wrap_pymodule!(components))?;

    register(m, "rflake._lib.core", "core")?;
    register(m, "rflake._lib.components", "components")?;

    Ok(())
}

/// Make a submodule importable by its dotted path
fn register(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let code = format!("import sys\nsys.modules['{path}'] = {module}\n");
    m.py().run_bound(&code, None, Some(&m.dict()))
}
