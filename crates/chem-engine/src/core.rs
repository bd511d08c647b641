use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use serde::Deserialize;
use std::ffi::CString;
use std::sync::OnceLock;

static RDKIT_MODULE: OnceLock<Py<PyModule>> = OnceLock::new();

pub fn init_python() -> PyResult<()> {
    if RDKIT_MODULE.get().is_some() {
        return Ok(());
    }
    Python::attach(|py| {
        let code = CString::new(include_str!("../python/rdkit_wrapper.py"))?;
        let module = PyModule::from_code(py, code.as_c_str(), c_str!("rdkit_wrapper.py"), c_str!("rdkit_wrapper"))?;
        RDKIT_MODULE.set(module.unbind()).ok();
        Ok(())
    })
}

fn get_module(py: Python<'_>) -> PyResult<Py<PyModule>> {
    RDKIT_MODULE.get().map(|module| module.clone_ref(py)).ok_or_else(|| {
                                                             PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(
            "init_python() debe llamarse antes de molblock_info()"
        )
                                                         })
}

#[derive(Debug, Deserialize)]
pub struct RdkitMolecule {
    pub smiles: String,
    pub num_atoms: usize,
}

/// `Ok(None)` cuando RDKit no logra sanitizar el molfile.
pub fn molblock_info(molblock: &str) -> PyResult<Option<RdkitMolecule>> {
    Python::attach(|py| {
        let rdkit_py = get_module(py)?;
        let rdkit = rdkit_py.bind(py);
        let binding = rdkit.getattr("molblock_info")?.call1((molblock,))?;
        if binding.is_none() {
            return Ok(None);
        }
        let info = binding.downcast::<PyDict>()?;
        let json_str: String = py.import("json")?.call_method1("dumps", (info,))?.extract()?;
        let molecule: RdkitMolecule = serde_json::from_str(&json_str).map_err(|e| {
                                          PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Deserialization error: {}", e))
                                      })?;
        Ok(Some(molecule))
    })
}
