use std::path::{Path, PathBuf};

use polars::prelude::*;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;
use tracing_subscriber::EnvFilter;

use crate::attributes::{self, AttributeTable};
use crate::catalog::{self, BasinCatalog};
use crate::config::{DataLayout, DatasetConfig};
use crate::dataset::CamelsSweDataset;
use crate::discharge;
use crate::error::LoaderError;
use crate::forcing;
use crate::swe;

/// CAMELS US + Colorado SWE dataset as seen from Python.
#[pyclass(name = "CamelsSweDataset")]
pub struct PyCamelsSweDataset {
    inner: CamelsSweDataset,
}

#[pymethods]
impl PyCamelsSweDataset {
    #[new]
    #[pyo3(signature = (data_dir, forcings, target_variables=None, basins=None, basin_file=None))]
    fn new(
        data_dir: PathBuf,
        forcings: Vec<String>,
        target_variables: Option<Vec<String>>,
        basins: Option<Vec<String>>,
        basin_file: Option<PathBuf>,
    ) -> PyResult<Self> {
        let mut config = DatasetConfig::new(data_dir, forcings);
        config.target_variables = target_variables.unwrap_or_default();
        config.basins = basins.unwrap_or_default();
        config.basin_file = basin_file;
        Ok(Self {
            inner: CamelsSweDataset::new(config)?,
        })
    }

    /// Build the dataset from a YAML run config.
    #[staticmethod]
    fn from_yaml(path: PathBuf) -> PyResult<Self> {
        let config = DatasetConfig::from_yaml_file(&path)?;
        Ok(Self {
            inner: CamelsSweDataset::new(config)?,
        })
    }

    // ── Per-basin data ──────────────────────────────────────────────────────

    /// Daily forcing (and discharge, if configured) of one basin, indexed by `date`.
    fn load_basin_data(&self, basin: &str) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.load_basin_data(basin)?))
    }

    // ── Static attributes ───────────────────────────────────────────────────

    /// Attributes of the configured basins, one row per `gauge_id`.
    #[pyo3(signature = (basins=None))]
    fn load_attributes(&self, basins: Option<Vec<String>>) -> PyResult<PyDataFrame> {
        let table = match basins {
            Some(b) => self.inner.load_attributes_for(&b)?,
            None => self.inner.load_attributes()?,
        };
        Ok(PyDataFrame(table.to_dataframe()?))
    }

    #[getter]
    fn basins(&self) -> Vec<String> {
        self.inner.basins().to_vec()
    }

    #[getter]
    fn primary_basins(&self) -> Vec<String> {
        self.inner.catalog().primary().ids().to_vec()
    }

    #[getter]
    fn auxiliary_basins(&self) -> Vec<String> {
        self.inner.catalog().auxiliary().ids().to_vec()
    }

    fn reload_catalog(&mut self) -> PyResult<()> {
        Ok(self.inner.reload_catalog()?)
    }
}

// ── Module-level loaders ────────────────────────────────────────────────────

fn default_catalog(data_dir: &Path) -> PyResult<BasinCatalog> {
    Ok(BasinCatalog::load(data_dir, &DataLayout::default())?)
}

/// Returns `(frame, area)`.
#[pyfunction]
pub fn load_basin_forcings(
    data_dir: PathBuf,
    basin: &str,
    product: &str,
) -> PyResult<(PyDataFrame, u64)> {
    let catalog = default_catalog(&data_dir)?;
    let out =
        forcing::load_basin_forcings(&data_dir, &DataLayout::default(), &catalog, basin, product)?;
    Ok((PyDataFrame(out.data), out.area))
}

#[pyfunction]
pub fn load_camels_daily_forcings(
    data_dir: PathBuf,
    basin: &str,
    product: &str,
) -> PyResult<(PyDataFrame, u64)> {
    let out =
        forcing::load_camels_daily_forcings(&data_dir, &DataLayout::default(), basin, product)?;
    Ok((PyDataFrame(out.data), out.area))
}

#[pyfunction]
pub fn load_hydroatlas_daily_forcing(data_dir: PathBuf, basin: &str) -> PyResult<PyDataFrame> {
    let df = forcing::load_hydroatlas_daily_forcing(&data_dir, &DataLayout::default(), basin)?;
    Ok(PyDataFrame(df))
}

#[pyfunction]
pub fn load_discharge(data_dir: PathBuf, basin: &str, area: u64) -> PyResult<PyDataFrame> {
    let df = discharge::load_discharge(&data_dir, &DataLayout::default(), basin, area)?;
    Ok(PyDataFrame(df))
}

#[pyfunction]
pub fn add_swe_to_forcing(
    data_dir: PathBuf,
    df: PyDataFrame,
    basin: &str,
) -> PyResult<PyDataFrame> {
    let df = swe::add_swe_to_forcing(&data_dir, &DataLayout::default(), df.0, basin)?;
    Ok(PyDataFrame(df))
}

#[pyfunction]
#[pyo3(signature = (data_dir, basins=None))]
pub fn load_camels_attributes(
    data_dir: PathBuf,
    basins: Option<Vec<String>>,
) -> PyResult<PyDataFrame> {
    let table = attributes::load_camels_attributes(
        &data_dir,
        &DataLayout::default(),
        &basins.unwrap_or_default(),
    )?;
    Ok(PyDataFrame(table.to_dataframe()?))
}

/// Returns `(hydroatlas, hydroatlas_pca)`.
#[pyfunction]
pub fn load_camels_hydroatlas(
    data_dir: PathBuf,
    basins: Vec<String>,
) -> PyResult<(PyDataFrame, PyDataFrame)> {
    let (hydroatlas, pca) =
        attributes::load_camels_hydroatlas(&data_dir, &DataLayout::default(), &basins)?;
    Ok((
        PyDataFrame(hydroatlas.to_dataframe()?),
        PyDataFrame(pca.to_dataframe()?),
    ))
}

#[pyfunction]
pub fn join_auxiliary_attributes(
    camels: PyDataFrame,
    hydroatlas: PyDataFrame,
    hydroatlas_pca: PyDataFrame,
) -> PyResult<PyDataFrame> {
    let from_py = |df: &PyDataFrame, what: &str| -> PyResult<AttributeTable> {
        let columns = df
            .0
            .get_columns()
            .iter()
            .map(|c| c.cast(&DataType::String))
            .collect::<PolarsResult<Vec<_>>>()
            .map_err(LoaderError::from)?;
        let raw = DataFrame::new(columns).map_err(LoaderError::from)?;
        Ok(AttributeTable::from_frame(&raw, Path::new(what))?)
    };
    let joined = attributes::join_auxiliary_attributes(
        from_py(&camels, "<camels>")?,
        &from_py(&hydroatlas, "<hydroatlas>")?,
        &from_py(&hydroatlas_pca, "<hydroatlas_pca>")?,
    );
    Ok(PyDataFrame(joined.to_dataframe()?))
}

#[pyfunction]
#[pyo3(signature = (data_dir, basins=None))]
pub fn load_all_attributes(
    data_dir: PathBuf,
    basins: Option<Vec<String>>,
) -> PyResult<PyDataFrame> {
    let catalog = default_catalog(&data_dir)?;
    let table = attributes::load_all_attributes(
        &data_dir,
        &DataLayout::default(),
        &catalog,
        &basins.unwrap_or_default(),
    )?;
    Ok(PyDataFrame(table.to_dataframe()?))
}

#[pyfunction]
pub fn read_basin_list(path: PathBuf) -> PyResult<Vec<String>> {
    Ok(catalog::read_basin_list(&path)?)
}

/// Install a `tracing` subscriber writing to stderr.
///
/// `level` takes an `EnvFilter` directive such as `"debug"`; without it
/// `RUST_LOG` is used, falling back to `info`.
/// Calling it again is a no-op.
#[pyfunction]
#[pyo3(signature = (level=None))]
pub fn init_logging(level: Option<&str>) -> PyResult<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCamelsSweDataset>()?;
    m.add_function(wrap_pyfunction!(load_basin_forcings, m)?)?;
    m.add_function(wrap_pyfunction!(load_camels_daily_forcings, m)?)?;
    m.add_function(wrap_pyfunction!(load_hydroatlas_daily_forcing, m)?)?;
    m.add_function(wrap_pyfunction!(load_discharge, m)?)?;
    m.add_function(wrap_pyfunction!(add_swe_to_forcing, m)?)?;
    m.add_function(wrap_pyfunction!(load_camels_attributes, m)?)?;
    m.add_function(wrap_pyfunction!(load_camels_hydroatlas, m)?)?;
    m.add_function(wrap_pyfunction!(join_auxiliary_attributes, m)?)?;
    m.add_function(wrap_pyfunction!(load_all_attributes, m)?)?;
    m.add_function(wrap_pyfunction!(read_basin_list, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    Ok(())
}
