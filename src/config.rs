//! Typed run configuration.
//!
//! Mirrors the subset of the host framework's YAML run config that the
//! loaders need, plus the directory layout of the data tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::catalog::read_basin_list;
use crate::error::{LoaderError, Result};
use crate::schema::discharge;

/// Directory and file names below `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataLayout {
    pub primary_dir: String,
    pub auxiliary_dir: String,
    pub primary_basin_list: String,
    pub auxiliary_basin_list: String,
    pub swe_stats_file: String,
    pub snotel_file: String,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self {
            primary_dir: "CAMELS_US".to_string(),
            auxiliary_dir: "HydroAtlas_colorado".to_string(),
            primary_basin_list: "list_671_camels_basins.txt".to_string(),
            auxiliary_basin_list: "list_colorado_hydroatlas_basins.txt".to_string(),
            swe_stats_file: "co_camels_stats_all_years_20230814.csv".to_string(),
            snotel_file: "co_camels_snotel_time_series.csv".to_string(),
        }
    }
}

impl DataLayout {
    pub fn primary_root(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.primary_dir)
    }

    pub fn auxiliary_root(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.auxiliary_dir)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
    #[serde(deserialize_with = "one_or_many")]
    pub forcings: Vec<String>,
    #[serde(default)]
    pub target_variables: Vec<String>,
    #[serde(default)]
    pub basins: Vec<String>,
    #[serde(default)]
    pub basin_file: Option<PathBuf>,
    #[serde(default)]
    pub layout: DataLayout,
}

/// What a dataset load will do, decided once from a [`DatasetConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub forcings: Vec<String>,
    pub include_discharge: bool,
    pub suffix_products: bool,
    pub basins: Vec<String>,
}

impl DatasetConfig {
    pub fn new(data_dir: impl Into<PathBuf>, forcings: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            forcings,
            target_variables: Vec::new(),
            basins: Vec::new(),
            basin_file: None,
            layout: DataLayout::default(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Validate the config and resolve it into a [`LoadPlan`].
    ///
    /// The basin file, when given, is read here and appended to `basins`.
    pub fn resolve(&self) -> Result<LoadPlan> {
        if self.forcings.is_empty() {
            return Err(LoaderError::Config(
                "at least one forcing product must be configured".into(),
            ));
        }
        if let Some(dup) = self
            .forcings
            .iter()
            .enumerate()
            .find(|(i, f)| self.forcings[..*i].contains(f))
            .map(|(_, f)| f)
        {
            return Err(LoaderError::Config(format!(
                "forcing product '{dup}' configured twice"
            )));
        }

        let mut basins = self.basins.clone();
        if let Some(file) = &self.basin_file {
            basins.extend(read_basin_list(file)?);
        }

        Ok(LoadPlan {
            forcings: self.forcings.clone(),
            include_discharge: self
                .target_variables
                .iter()
                .any(|t| t == discharge::QOBS),
            suffix_products: self.forcings.len() > 1,
            basins,
        })
    }
}

/// Accept both `forcings: daymet` and `forcings: [daymet, nldas]`.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
