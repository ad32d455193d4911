//! Loaders for CAMELS US basins enriched with Colorado snow water equivalent,
//! plus HydroATLAS level-12 basins in Colorado.
//!
//! Every per-basin table is a polars `DataFrame` with a sorted, unique
//! `date` column; missing values are nulls. Static attributes are kept in an
//! [`AttributeTable`] keyed by `gauge_id`.

pub mod attributes;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod discharge;
pub mod error;
mod files;
pub mod forcing;
pub mod schema;
pub mod swe;
pub mod table;

#[cfg(feature = "python")]
mod bindings;
#[cfg(test)]
mod testutil;

pub use attributes::{
    join_auxiliary_attributes, load_all_attributes, load_camels_attributes,
    load_camels_hydroatlas, AttributeTable,
};
pub use catalog::{read_basin_list, BasinCatalog, BasinList, BasinSource};
pub use config::{DataLayout, DatasetConfig, LoadPlan};
pub use dataset::CamelsSweDataset;
pub use discharge::load_discharge;
pub use error::{LoaderError, Result};
pub use forcing::{
    load_basin_forcings, load_camels_daily_forcings, load_hydroatlas_daily_forcing, BasinForcing,
};
pub use swe::add_swe_to_forcing;

#[cfg(feature = "python")]
mod python_module {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::schema;

    /// Export schema constants as Python submodules
    fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // TimeSeries
        let timeseries = PyModule::new(m.py(), "timeseries")?;
        timeseries.add("DATE", schema::timeseries::DATE)?;
        m.add_submodule(&timeseries)?;

        // Discharge
        let discharge = PyModule::new(m.py(), "discharge")?;
        discharge.add("QOBS", schema::discharge::QOBS)?;
        discharge.add("FLAG", schema::discharge::FLAG)?;
        m.add_submodule(&discharge)?;

        // SWE
        let swe = PyModule::new(m.py(), "swe")?;
        swe.add("UA", schema::swe::UA)?;
        swe.add("SNOTEL", schema::swe::SNOTEL)?;
        m.add_submodule(&swe)?;

        // HydroATLAS forcing
        let hydroatlas_forcing = PyModule::new(m.py(), "hydroatlas_forcing")?;
        hydroatlas_forcing.add("VARIABLES", schema::hydroatlas_forcing::ALL.to_vec())?;
        hydroatlas_forcing.add(
            "PLACEHOLDER_AREA",
            schema::hydroatlas_forcing::PLACEHOLDER_AREA,
        )?;
        m.add_submodule(&hydroatlas_forcing)?;

        // Attributes
        let attributes = PyModule::new(m.py(), "attributes")?;
        attributes.add("GAUGE_ID", schema::attributes::GAUGE_ID)?;
        attributes.add("HUC_02", schema::attributes::HUC_02)?;
        attributes.add("HUC", schema::attributes::HUC)?;
        m.add_submodule(&attributes)?;

        Ok(())
    }

    #[pymodule]
    fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        crate::bindings::register(m)?;
        add_schema_exports(m)?;
        Ok(())
    }
}
