// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the effective-potential engine.
//!
//! Exposes `EngineConfig` and `Model` to Python via PyO3. A `Model` owns
//! one `Potential`; engine errors surface as `ValueError`.
//!
//! Install: `pip install -e crates/bsmpt-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from bsmpt_engine import Model
//!
//! m = Model("r2hdm", [2.74, 0.24, 5.53, -2.59, -2.23, 7738.56, 4.63, 1])
//! m.counterterms()
//! m.triple_couplings()["Tree_hhh"]
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use bsmpt_core::{checks, Contributions, LoopOrder, Potential};
use bsmpt_models::{build_model, ModelId};
use bsmpt_types::{DerivativeMethod, EngineConfig, SmConstants};

fn value_error(e: impl ToString) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Parse a contribution selector such as `"all"`, `"tree"` or `"ct+cw"`.
fn parse_parts(selector: &str) -> PyResult<Contributions> {
    let mut parts = Contributions {
        tree: false,
        counterterm: false,
        one_loop: false,
    };
    for token in selector.split('+').map(str::trim) {
        match token.to_ascii_lowercase().as_str() {
            "all" => parts = Contributions::ALL,
            "tree" => parts.tree = true,
            "ct" | "counterterm" => parts.counterterm = true,
            "cw" | "loop" | "one_loop" => parts.one_loop = true,
            other => {
                return Err(value_error(format!(
                    "unknown contribution '{other}' (expected tree, ct, cw or all)"
                )))
            }
        }
    }
    Ok(parts)
}

// ─── PyEngineConfig ─────────────────────────────────────────────────

/// Python-visible engine configuration.
#[pyclass(name = "EngineConfig")]
#[derive(Clone)]
struct PyEngineConfig {
    inner: EngineConfig,
}

#[pymethods]
impl PyEngineConfig {
    #[new]
    #[pyo3(signature = (
        analytic = true,
        fd_eps = 1e-4,
        cw_threshold = 1e-4,
        zero_mass_threshold = 1e-5,
        numerical_zero = 1e-10,
        mixing_threshold = 1e-5,
    ))]
    fn new(
        analytic: bool,
        fd_eps: f64,
        cw_threshold: f64,
        zero_mass_threshold: f64,
        numerical_zero: f64,
        mixing_threshold: f64,
    ) -> PyResult<Self> {
        let config = EngineConfig {
            derivative_method: if analytic {
                DerivativeMethod::Analytic
            } else {
                DerivativeMethod::FiniteDifference
            },
            fd_eps,
            cw_threshold,
            zero_mass_threshold,
            numerical_zero,
            mixing_threshold,
            ..EngineConfig::default()
        };
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = EngineConfig::from_json(json).map_err(value_error)?;
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(value_error)
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(method={:?}, fd_eps={:e}, cw_threshold={:e})",
            self.inner.derivative_method, self.inner.fd_eps, self.inner.cw_threshold
        )
    }
}

// ─── PyModel ────────────────────────────────────────────────────────

/// A model instance at one parameter point.
#[pyclass(name = "Model")]
struct PyModel {
    inner: Potential,
}

#[pymethods]
impl PyModel {
    #[new]
    #[pyo3(signature = (name, params, config = None))]
    fn new(name: &str, params: Vec<f64>, config: Option<PyEngineConfig>) -> PyResult<Self> {
        let id: ModelId = name.parse().map_err(value_error)?;
        let model = build_model(id, &params, SmConstants::default()).map_err(value_error)?;
        let config = config.map(|c| c.inner).unwrap_or_default();
        let mut inner = Potential::new(model, config).map_err(value_error)?;
        inner.set_curvature_arrays().map_err(value_error)?;
        Ok(Self { inner })
    }

    #[getter]
    fn name(&self) -> String {
        self.inner.model().name().to_string()
    }

    #[getter]
    fn n_higgs(&self) -> usize {
        self.inner.n_higgs()
    }

    #[getter]
    fn vev(&self) -> Vec<f64> {
        self.inner.vev().to_vec()
    }

    #[getter]
    fn stage(&self) -> String {
        format!("{:?}", self.inner.stage())
    }

    #[getter]
    fn contraction_count(&self) -> usize {
        self.inner.contraction_count()
    }

    fn parameters<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        for (name, value) in self.inner.model().parameters() {
            dict.set_item(name, value)?;
        }
        Ok(dict)
    }

    fn set_vev(&mut self, vev: Vec<f64>) -> PyResult<()> {
        self.inner.set_vev(&vev).map_err(value_error)
    }

    #[pyo3(signature = (fields, parts = "all"))]
    fn potential(&mut self, fields: Vec<f64>, parts: &str) -> PyResult<f64> {
        let parts = self.prepare(parts)?;
        self.inner.potential(&fields, parts).map_err(value_error)
    }

    #[pyo3(signature = (fields, parts = "all"))]
    fn first_derivative(&mut self, fields: Vec<f64>, parts: &str) -> PyResult<Vec<f64>> {
        let parts = self.prepare(parts)?;
        self.inner
            .first_derivative(&fields, parts)
            .map_err(value_error)
    }

    /// Flattened n×n Hessian.
    #[pyo3(signature = (fields, parts = "all"))]
    fn second_derivative(&mut self, fields: Vec<f64>, parts: &str) -> PyResult<Vec<f64>> {
        let parts = self.prepare(parts)?;
        self.inner
            .second_derivative(&fields, parts)
            .map_err(value_error)
    }

    /// Flattened n×n×n third derivative.
    #[pyo3(signature = (fields, parts = "all"))]
    fn third_derivative(&mut self, fields: Vec<f64>, parts: &str) -> PyResult<Vec<f64>> {
        let parts = self.prepare(parts)?;
        self.inner
            .third_derivative(&fields, parts)
            .map_err(value_error)
    }

    /// Squared masses of every species at the current vacuum.
    fn spectrum<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let spectrum = self.inner.spectrum().map_err(value_error)?;
        let dict = PyDict::new_bound(py);
        dict.set_item("higgs", spectrum.higgs)?;
        dict.set_item("gauge", spectrum.gauge)?;
        dict.set_item("quark", spectrum.quark)?;
        dict.set_item("lepton", spectrum.lepton)?;
        Ok(dict)
    }

    /// Labels, squared masses and rotation rows in canonical order.
    fn mixing<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let mixing = self.inner.mixing().map_err(value_error)?;
        let dict = PyDict::new_bound(py);
        dict.set_item("labels", mixing.labels.clone())?;
        dict.set_item("masses", mixing.sorted_masses())?;
        dict.set_item("rotation", mixing.sorted_rotation())?;
        Ok(dict)
    }

    /// Scalar squared masses and rotation at `fields` and `temperature`.
    #[pyo3(signature = (fields, temperature = 0.0, one_loop = false))]
    fn diagonalize(
        &mut self,
        fields: Vec<f64>,
        temperature: f64,
        one_loop: bool,
    ) -> PyResult<(Vec<f64>, Vec<f64>)> {
        let order = if one_loop {
            self.prepare("ct")?;
            LoopOrder::OneLoop
        } else {
            LoopOrder::Tree
        };
        let result = self
            .inner
            .diagonalize_mass_matrix(&fields, temperature, order)
            .map_err(value_error)?;
        Ok((result.masses, result.rotation))
    }

    fn counterterms<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        self.prepare("ct")?;
        let set = self.inner.solve_counterterms().map_err(value_error)?;
        let dict = PyDict::new_bound(py);
        for (name, value) in set.names.iter().zip(&set.values) {
            dict.set_item(name, *value)?;
        }
        Ok(dict)
    }

    /// Independent triple couplings keyed by legend entry, e.g. `Tree_hhH`.
    fn triple_couplings<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let triple = self.inner.triple_physical_couplings().map_err(value_error)?;
        let dict = PyDict::new_bound(py);
        for (key, value) in triple.legend().into_iter().zip(triple.flat_values()) {
            dict.set_item(key, value)?;
        }
        Ok(dict)
    }

    fn triple_couplings_json(&mut self) -> PyResult<String> {
        let triple = self.inner.triple_physical_couplings().map_err(value_error)?;
        serde_json::to_string(triple).map_err(value_error)
    }

    /// Run the consistency checks; one dict per check.
    fn checks<'py>(&mut self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let outcomes = checks::run_all(&mut self.inner).map_err(value_error)?;
        outcomes
            .into_iter()
            .map(|o| {
                let dict = PyDict::new_bound(py);
                dict.set_item("name", o.name)?;
                dict.set_item("passed", o.passed)?;
                dict.set_item("detail", o.detail)?;
                Ok(dict)
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Model(name={}, n_higgs={}, stage={:?})",
            self.inner.model().name(),
            self.inner.n_higgs(),
            self.inner.stage()
        )
    }
}

impl PyModel {
    /// Parse `parts` and bring the engine to the stage it needs.
    fn prepare(&mut self, parts: &str) -> PyResult<Contributions> {
        let parts = parse_parts(parts)?;
        if parts.counterterm {
            self.inner
                .calculate_physical_couplings()
                .map_err(value_error)?;
            self.inner.solve_counterterms().map_err(value_error)?;
        }
        Ok(parts)
    }
}

/// Registered models and their number of input parameters.
#[pyfunction]
fn available_models() -> Vec<(String, usize)> {
    ModelId::ALL
        .iter()
        .map(|id| (id.as_str().to_string(), id.n_inputs()))
        .collect()
}

// ─── Module ─────────────────────────────────────────────────────────

#[pymodule]
fn bsmpt_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEngineConfig>()?;
    m.add_class::<PyModel>()?;
    m.add_function(wrap_pyfunction!(available_models, m)?)?;
    Ok(())
}
