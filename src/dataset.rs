//! Per-basin dataset assembly handed to the host framework.

use std::path::Path;

use polars::prelude::*;
use tracing::{info, instrument};

use crate::attributes::{load_all_attributes, AttributeTable};
use crate::catalog::BasinCatalog;
use crate::config::{DataLayout, DatasetConfig, LoadPlan};
use crate::discharge::load_discharge;
use crate::error::Result;
use crate::forcing::{load_basin_forcings, BasinForcing};
use crate::schema::discharge;
use crate::schema::timeseries::DATE;
use crate::table;

/// CAMELS US with Colorado SWE and HydroATLAS basins.
///
/// The host framework asks for one basin's time series at a time and for the
/// attribute table of the configured basin set. The basin catalogs are read
/// once at construction; call [`CamelsSweDataset::reload_catalog`] after the
/// manifests change.
#[derive(Debug, Clone)]
pub struct CamelsSweDataset {
    config: DatasetConfig,
    plan: LoadPlan,
    catalog: BasinCatalog,
}

impl CamelsSweDataset {
    pub fn new(config: DatasetConfig) -> Result<Self> {
        let plan = config.resolve()?;
        let catalog = BasinCatalog::load(&config.data_dir, &config.layout)?;
        Ok(Self {
            config,
            plan,
            catalog,
        })
    }

    pub fn catalog(&self) -> &BasinCatalog {
        &self.catalog
    }

    pub fn basins(&self) -> &[String] {
        &self.plan.basins
    }

    pub fn reload_catalog(&mut self) -> Result<()> {
        self.catalog.reload()
    }

    fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn layout(&self) -> &DataLayout {
        &self.config.layout
    }

    /// Forcing of every configured product, optional discharge, with negative
    /// discharge values replaced by nulls.
    #[instrument(skip(self))]
    pub fn load_basin_data(&self, basin: &str) -> Result<DataFrame> {
        let mut frames = Vec::with_capacity(self.plan.forcings.len());
        let mut area = None;
        for product in &self.plan.forcings {
            let BasinForcing { mut data, area: a } =
                load_basin_forcings(self.data_dir(), self.layout(), &self.catalog, basin, product)?;
            if self.plan.suffix_products {
                table::suffix_columns(&mut data, product)?;
            }
            frames.push(data);
            area = Some(a);
        }
        let mut df = table::outer_merge_on_date(frames)?;

        if let (true, Some(area)) = (self.plan.include_discharge, area) {
            let qobs = load_discharge(self.data_dir(), self.layout(), basin, area)?
                .lazy()
                .select([col(DATE), col(discharge::QOBS)])
                .collect()?;
            df = table::left_join_on_date(df, qobs)?;
        }

        let qobs_columns = discharge_columns(&df);
        let df = table::mask_negative(df, &qobs_columns)?;
        info!(rows = df.height(), columns = df.width(), "basin data loaded");
        Ok(df)
    }

    /// Attributes of the configured basin list.
    pub fn load_attributes(&self) -> Result<AttributeTable> {
        self.load_attributes_for(&self.plan.basins)
    }

    pub fn load_attributes_for(&self, basins: &[String]) -> Result<AttributeTable> {
        load_all_attributes(self.data_dir(), self.layout(), &self.catalog, basins)
    }
}

/// Columns holding discharge, recognised by `qobs` in their name.
pub fn discharge_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .iter()
        .filter(|c| c.to_lowercase().contains(discharge::QOBS_MARKER))
        .map(|c| c.to_string())
        .collect()
}
