//! Static basin attributes: CAMELS attribute groups joined with HydroATLAS.
//!
//! Attribute tables are merged explicitly by basin id rather than through
//! frame joins. Conflict policy for every merge: when two tables carry a
//! column with the same name, the column of the earlier (left) table is kept
//! unchanged and the later one is dropped.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::catalog::BasinCatalog;
use crate::config::DataLayout;
use crate::error::{LoaderError, Result};
use crate::files::{require_dir, require_file};
use crate::schema::attributes;
use crate::table;

/// Basin-keyed attribute rows. Cells are kept as trimmed text; a missing
/// cell (empty or a missing marker) is simply absent from its row.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    columns: Vec<String>,
    basins: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<HashMap<String, String>>,
}

impl AttributeTable {
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    /// Build from an all-string frame keyed by `gauge_id`.
    pub fn from_frame(df: &DataFrame, path: &Path) -> Result<Self> {
        let ids = table::string_column(df, attributes::GAUGE_ID, path)?;
        let columns: Vec<String> = df
            .get_column_names_str()
            .iter()
            .filter(|c| **c != attributes::GAUGE_ID)
            .map(|c| c.to_string())
            .collect();
        let values = columns
            .iter()
            .map(|c| table::string_column(df, c, path))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Self::with_columns(columns.clone());
        for (row, id) in ids.into_iter().enumerate() {
            // header is line 1
            let line = row + 2;
            let id = id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| LoaderError::invalid(path, line, "missing gauge_id"))?;
            if out.contains(id) {
                return Err(LoaderError::invalid(
                    path,
                    line,
                    format!("duplicate gauge_id {id}"),
                ));
            }

            let cells = columns
                .iter()
                .zip(&values)
                .filter_map(|(name, column)| {
                    column
                        .get(row)
                        .map(str::trim)
                        .filter(|v| !table::is_missing(v))
                        .map(|v| (name.clone(), v.to_string()))
                })
                .collect();
            out.push_row(id.to_string(), cells);
        }
        Ok(out)
    }

    fn push_row(&mut self, basin: String, cells: HashMap<String, String>) {
        self.index.insert(basin.clone(), self.rows.len());
        self.basins.push(basin);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn basins(&self) -> &[String] {
        &self.basins
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    pub fn contains(&self, basin: &str) -> bool {
        self.index.contains_key(basin)
    }

    pub fn get(&self, basin: &str, column: &str) -> Option<&str> {
        self.index
            .get(basin)
            .and_then(|&i| self.rows[i].get(column))
            .map(String::as_str)
    }

    /// Columns of `other` that this table does not have yet.
    fn new_columns(&self, other: &AttributeTable) -> Vec<String> {
        let (new, clashing): (Vec<_>, Vec<_>) = other
            .columns
            .iter()
            .cloned()
            .partition(|c| !self.columns.contains(c));
        if !clashing.is_empty() {
            warn!(columns = ?clashing, "attribute columns already present, keeping existing values");
        }
        new
    }

    fn absorb(&mut self, other: &AttributeTable, columns: &[String], add_rows: bool) {
        for (basin, cells) in other.basins.iter().zip(&other.rows) {
            let existing = self.index.get(basin).copied();
            let idx = match existing {
                Some(i) => i,
                None if add_rows => {
                    self.push_row(basin.clone(), HashMap::new());
                    self.rows.len() - 1
                }
                None => continue,
            };
            for column in columns {
                if let Some(v) = cells.get(column) {
                    self.rows[idx].insert(column.clone(), v.clone());
                }
            }
        }
        self.columns.extend(columns.iter().cloned());
    }

    /// Column-wise concatenation over the union of basins.
    pub fn merge_outer(&mut self, other: &AttributeTable) {
        let columns = self.new_columns(other);
        self.absorb(other, &columns, true);
    }

    /// Left join: rows of `self` are kept, rows only in `other` are dropped,
    /// unmatched rows of `self` get missing cells for the new columns.
    pub fn join_left(&mut self, other: &AttributeTable) {
        let columns = self.new_columns(other);
        self.absorb(other, &columns, false);
    }

    /// Keep only rows whose basin is in `basins`, preserving order.
    pub fn retain_basins(&mut self, basins: &HashSet<&str>) {
        let (kept_basins, kept_rows): (Vec<_>, Vec<_>) = std::mem::take(&mut self.basins)
            .into_iter()
            .zip(std::mem::take(&mut self.rows))
            .filter(|(b, _)| basins.contains(b.as_str()))
            .unzip();
        self.basins = kept_basins;
        self.rows = kept_rows;
        self.index = self
            .basins
            .iter()
            .enumerate()
            .map(|(i, b)| (b.clone(), i))
            .collect();
    }

    /// Rows for `basins` in the requested order. Every basin must be present.
    pub fn select_rows(&self, basins: &[String]) -> Result<Self> {
        let missing: Vec<String> = basins
            .iter()
            .filter(|b| !self.contains(b))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingAttributes(missing));
        }

        let mut out = Self::with_columns(self.columns.clone());
        for basin in basins {
            if !out.contains(basin) {
                out.push_row(basin.clone(), self.rows[self.index[basin]].clone());
            }
        }
        Ok(out)
    }

    /// Replace the numeric `huc_02` column by a two-character text `huc` column.
    pub fn normalize_huc(&mut self, path: &Path) -> Result<()> {
        let Some(pos) = self.columns.iter().position(|c| c == attributes::HUC_02) else {
            return Err(LoaderError::missing_column(attributes::HUC_02, path));
        };
        self.columns.remove(pos);
        self.columns.push(attributes::HUC.to_string());

        for row in &mut self.rows {
            if let Some(raw) = row.remove(attributes::HUC_02) {
                row.insert(attributes::HUC.to_string(), zero_pad_huc(&raw));
            }
        }
        Ok(())
    }

    /// Convert to a frame with a `gauge_id` column followed by one column per
    /// attribute. Columns whose present values all parse as numbers become
    /// Float64, everything else String.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![Column::new(attributes::GAUGE_ID.into(), &self.basins)];

        for name in &self.columns {
            let cells: Vec<Option<&str>> = self
                .rows
                .iter()
                .map(|row| row.get(name).map(String::as_str))
                .collect();
            let numbers: Option<Vec<Option<f64>>> = cells
                .iter()
                .map(|c| match c {
                    None => Some(None),
                    Some(s) => s.parse::<f64>().ok().map(Some),
                })
                .collect();

            let column = match numbers {
                Some(values) if name != attributes::HUC => Column::new(name.as_str().into(), &values),
                _ => Column::new(name.as_str().into(), &cells),
            };
            columns.push(column);
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// `1` -> `01`, `1.0` -> `01`, `10` -> `10`.
fn zero_pad_huc(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 => format!("{:02}", v as i64),
        _ => format!("{raw:0>2}"),
    }
}

/// Load and concatenate every `camels_*.txt` attribute group.
///
/// An empty `basins` list returns all basins.
#[instrument(skip(data_dir, layout, basins), fields(n_basins = basins.len()))]
pub fn load_camels_attributes(
    data_dir: &Path,
    layout: &DataLayout,
    basins: &[String],
) -> Result<AttributeTable> {
    let attributes_path = layout.primary_root(data_dir).join(attributes::DIR);
    require_dir(&attributes_path)?;

    let mut files: Vec<_> = std::fs::read_dir(&attributes_path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name().and_then(|n| n.to_str()).is_some_and(|n| {
                    n.starts_with(attributes::FILE_PREFIX) && n.ends_with(attributes::FILE_SUFFIX)
                })
        })
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(LoaderError::FileNotFound {
            what: "attribute".into(),
            path: attributes_path.join(format!(
                "{}*{}",
                attributes::FILE_PREFIX,
                attributes::FILE_SUFFIX
            )),
        });
    }

    let mut merged = AttributeTable::default();
    for file in &files {
        let raw = table::read_csv_as_strings(file, attributes::SEPARATOR)?;
        let group = AttributeTable::from_frame(&raw, file)?;
        debug!(file = %file.display(), rows = group.len(), columns = group.columns().len(), "attribute group parsed");
        merged.merge_outer(&group);
    }
    merged.normalize_huc(&attributes_path)?;

    if !basins.is_empty() {
        merged.retain_basins(&basins.iter().map(String::as_str).collect());
    }
    Ok(merged)
}

/// Load the HydroATLAS attributes and their PCA-transformed counterpart,
/// restricted to `basins`.
#[instrument(skip(data_dir, layout, basins), fields(n_basins = basins.len()))]
pub fn load_camels_hydroatlas(
    data_dir: &Path,
    layout: &DataLayout,
    basins: &[String],
) -> Result<(AttributeTable, AttributeTable)> {
    let dir = layout
        .primary_root(data_dir)
        .join(attributes::HYDROATLAS_DIR);
    let wanted: HashSet<&str> = basins.iter().map(String::as_str).collect();

    let load = |name: &str| -> Result<AttributeTable> {
        let path = dir.join(name);
        require_file(&path, "HydroATLAS attribute")?;
        let raw = table::read_csv_as_strings(&path, b',')?;
        let mut t = AttributeTable::from_frame(&raw, &path)?;
        t.retain_basins(&wanted);
        Ok(t)
    };

    let hydroatlas = load(attributes::HYDROATLAS_FILE)?;
    let pca = load(attributes::HYDROATLAS_PCA_FILE)?;
    Ok((hydroatlas, pca))
}

/// Left-join HydroATLAS and its PCA transform onto the CAMELS attributes.
pub fn join_auxiliary_attributes(
    mut camels: AttributeTable,
    hydroatlas: &AttributeTable,
    pca: &AttributeTable,
) -> AttributeTable {
    camels.join_left(hydroatlas);
    camels.join_left(pca);
    camels
}

/// Load the complete attribute table for `basins`.
///
/// The CAMELS groups are loaded for every basin they list, so whether a
/// basin has attributes does not depend on the rest of the request. With a
/// non-empty request every requested basin must be present in the result
/// and rows come back in request order; an empty request returns all basins
/// of the attribute files. HydroATLAS attributes are joined for the basins
/// returned.
#[instrument(skip_all, fields(n_basins = basins.len()))]
pub fn load_all_attributes(
    data_dir: &Path,
    layout: &DataLayout,
    catalog: &BasinCatalog,
    basins: &[String],
) -> Result<AttributeTable> {
    let auxiliary = basins
        .iter()
        .filter(|b| !catalog.contains_primary(b) && catalog.contains_auxiliary(b))
        .count();
    if auxiliary > 0 {
        debug!(auxiliary, "auxiliary basins have no static attributes");
    }

    let camels = load_camels_attributes(data_dir, layout, &[])?;
    let camels = if basins.is_empty() {
        camels
    } else {
        camels.select_rows(basins)?
    };

    let (hydroatlas, pca) = load_camels_hydroatlas(data_dir, layout, camels.basins())?;
    let result = join_auxiliary_attributes(camels, &hydroatlas, &pca);
    info!(
        rows = result.len(),
        columns = result.columns().len(),
        "static attributes loaded"
    );
    Ok(result)
}
