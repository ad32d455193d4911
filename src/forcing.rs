//! Daily meteorological forcing loaders.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::catalog::{BasinCatalog, BasinSource};
use crate::config::DataLayout;
use crate::error::{LoaderError, Result};
use crate::files::{find_unique_file, require_dir, require_file};
use crate::schema::{forcing, hydroatlas_forcing};
use crate::swe::add_swe_to_forcing;
use crate::table::{self, WhitespaceTable};

/// A basin's forcing table together with its catchment area.
#[derive(Debug, Clone)]
pub struct BasinForcing {
    pub data: DataFrame,
    /// Catchment area as given in the forcing file header.
    pub area: u64,
}

/// Load the forcing data of one product for a basin, whichever catalog it is in.
///
/// Primary basins get the CAMELS forcing file enriched with Colorado SWE;
/// auxiliary basins get the HydroATLAS forcing (the same for every product)
/// with a placeholder area.
pub fn load_basin_forcings(
    data_dir: &Path,
    layout: &DataLayout,
    catalog: &BasinCatalog,
    basin: &str,
    product: &str,
) -> Result<BasinForcing> {
    match catalog.source_of(basin)? {
        BasinSource::Primary => {
            let BasinForcing { data, area } =
                load_camels_daily_forcings(data_dir, layout, basin, product)?;
            let data = add_swe_to_forcing(data_dir, layout, data, basin)?;
            Ok(BasinForcing { data, area })
        }
        BasinSource::Auxiliary => Ok(BasinForcing {
            data: load_hydroatlas_daily_forcing(data_dir, layout, basin)?,
            area: hydroatlas_forcing::PLACEHOLDER_AREA,
        }),
    }
}

/// Load a CAMELS `*_forcing_leap.txt` file.
///
/// The file has three header lines (latitude, elevation, area) followed by a
/// whitespace-delimited table with `Year`, `Mnth` and `Day` columns.
#[instrument(skip(data_dir, layout))]
pub fn load_camels_daily_forcings(
    data_dir: &Path,
    layout: &DataLayout,
    basin: &str,
    product: &str,
) -> Result<BasinForcing> {
    let forcing_path = layout
        .primary_root(data_dir)
        .join(forcing::DIR)
        .join(product);
    require_dir(&forcing_path)?;

    let file = find_unique_file(
        &forcing_path,
        &format!("{basin}_"),
        forcing::FILE_SUFFIX,
        "forcing",
    )?;
    let contents = std::fs::read_to_string(&file)?;
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < forcing::HEADER_LINES {
        return Err(LoaderError::invalid(
            &file,
            lines.len(),
            "file ends inside the header",
        ));
    }

    let area_line = lines[forcing::HEADER_LINES - 1].trim();
    let area = match area_line.parse::<u64>() {
        Ok(a) if a > 0 => a,
        _ => {
            return Err(LoaderError::invalid(
                &file,
                forcing::HEADER_LINES,
                format!("catchment area '{area_line}' is not a positive integer"),
            ))
        }
    };

    let body = WhitespaceTable::parse(
        lines[forcing::HEADER_LINES..].iter().copied(),
        None,
        forcing::HEADER_LINES + 1,
        &file,
    )?;
    let dates = body.dates([forcing::YEAR, forcing::MONTH, forcing::DAY], &file)?;

    let mut columns = vec![table::date_column(&dates)?];
    for (idx, name) in body.columns.iter().enumerate() {
        let column = if [forcing::YEAR, forcing::MONTH, forcing::DAY].contains(&name.as_str()) {
            Column::new(name.as_str().into(), &body.int_values(idx, &file)?)
        } else {
            Column::new(name.as_str().into(), &body.float_values(idx, &file)?)
        };
        columns.push(column);
    }

    let df = table::sorted_by_date(DataFrame::new(columns)?, &file)?;
    let df = table::reindex_daily(df)?;
    debug!(rows = df.height(), columns = df.width(), area, "forcing file parsed");

    Ok(BasinForcing { data: df, area })
}

/// Load HydroATLAS level-12 forcing for a basin outside the CAMELS catalog.
///
/// Each variable lives in its own `date`-indexed file with one column per
/// basin. The result is reindexed onto a gap-free daily calendar.
#[instrument(skip(data_dir, layout))]
pub fn load_hydroatlas_daily_forcing(
    data_dir: &Path,
    layout: &DataLayout,
    basin: &str,
) -> Result<DataFrame> {
    let dir = layout
        .auxiliary_root(data_dir)
        .join(hydroatlas_forcing::DIR);

    let mut frames = Vec::with_capacity(hydroatlas_forcing::ALL.len());
    for variable in hydroatlas_forcing::ALL {
        let path = dir.join(hydroatlas_forcing::file_name(variable));
        require_file(&path, "HydroATLAS forcing")?;

        let raw = table::read_csv_as_strings(&path, b',')?;
        let values = table::dated_values(&raw, hydroatlas_forcing::DATE, basin, &path)?;
        frames.push(table::series_frame(variable, &values)?);
    }

    let df = table::reindex_daily(table::outer_merge_on_date(frames)?)?;
    let dates = table::date_index(&df)?;
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        debug!(rows = df.height(), %first, %last, "HydroATLAS forcing assembled");
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::timeseries::DATE;
    use crate::testutil::{d, DataTree};

    #[test]
    fn camels_forcing_reads_area_and_dates() {
        let tree = DataTree::new();
        tree.forcing("daymet", "01013500", 2252, d(1980, 1, 1), 400);

        let f = load_camels_daily_forcings(tree.root(), &tree.layout, "01013500", "daymet").unwrap();
        assert_eq!(f.area, 2252);
        assert_eq!(f.data.height(), 400);

        let dates = table::date_index(&f.data).unwrap();
        assert_eq!(dates[0], d(1980, 1, 1));
        assert!(dates.windows(2).all(|w| w[1] == w[0].succ_opt().unwrap()));

        let prcp = f.data.column("prcp(mm/day)").unwrap().f64().unwrap();
        assert_eq!(prcp.get(10), Some(10.0));
        assert_eq!(f.data.column("Year").unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn missing_product_directory() {
        let tree = DataTree::new();
        let err =
            load_camels_daily_forcings(tree.root(), &tree.layout, "01013500", "nldas").unwrap_err();
        assert!(matches!(err, LoaderError::MissingDirectory(_)));
    }

    #[test]
    fn missing_basin_file() {
        let tree = DataTree::new();
        tree.forcing("daymet", "01013500", 2252, d(1980, 1, 1), 3);
        let err =
            load_camels_daily_forcings(tree.root(), &tree.layout, "09035800", "daymet").unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound { .. }));
    }

    #[test]
    fn non_integer_area_is_rejected() {
        let tree = DataTree::new();
        let path = tree
            .primary()
            .join("basin_mean_forcing/daymet/01/01013500_lump_cida_forcing_leap.txt");
        tree.write(&path, "44.6\n177\n22.5\nYear Mnth Day prcp\n1980 1 1 0.0\n");

        let err =
            load_camels_daily_forcings(tree.root(), &tree.layout, "01013500", "daymet").unwrap_err();
        assert!(matches!(err, LoaderError::InvalidData { line: 3, .. }));
    }

    #[test]
    fn hydroatlas_forcing_is_gap_free() {
        let tree = DataTree::new();
        let basins = ["4120025450", "4120025460"];
        tree.hydroatlas_forcing(&basins, &[d(2001, 1, 1), d(2001, 1, 2), d(2001, 1, 5)]);

        let df = load_hydroatlas_daily_forcing(tree.root(), &tree.layout, "4120025460").unwrap();
        let mut names = df.get_column_names_str();
        names.sort();
        assert_eq!(
            names,
            vec!["apcpsfc", "date", "dswrfsfc", "pressfc", "tmp2m_max", "tmp2m_min"]
        );
        assert_eq!(df.height(), 5);

        let apcp = df.column("apcpsfc").unwrap().f64().unwrap();
        assert_eq!(apcp.get(0), Some(10.0));
        assert_eq!(apcp.get(2), None);
        assert_eq!(apcp.get(4), Some(12.0));
        let tmin = df.column("tmp2m_min").unwrap().f64().unwrap();
        assert_eq!(tmin.get(1), Some(411.0));
    }

    #[test]
    fn hydroatlas_forcing_requires_basin_column() {
        let tree = DataTree::new();
        tree.hydroatlas_forcing(&["4120025450"], &[d(2001, 1, 1)]);
        let err = load_hydroatlas_daily_forcing(tree.root(), &tree.layout, "4120099999").unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { column, .. } if column == "4120099999"));
    }

    #[test]
    fn hydroatlas_missing_markers_are_nulls() {
        let tree = DataTree::new();
        tree.hydroatlas_forcing(&["4120025450"], &[d(2001, 1, 1), d(2001, 1, 2)]);
        let path = tree
            .auxiliary()
            .join(hydroatlas_forcing::DIR)
            .join(hydroatlas_forcing::file_name(hydroatlas_forcing::APCPSFC));
        tree.write(&path, "date,4120025450\n2001-01-01,1.5\n2001-01-02,NA\n");

        let df = load_hydroatlas_daily_forcing(tree.root(), &tree.layout, "4120025450").unwrap();
        let apcp: Vec<Option<f64>> = df.column("apcpsfc").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(apcp, vec![Some(1.5), None]);
    }

    #[test]
    fn hydroatlas_without_rows_is_empty() {
        let tree = DataTree::new();
        tree.hydroatlas_forcing(&["4120025450"], &[]);

        let df = load_hydroatlas_daily_forcing(tree.root(), &tree.layout, "4120025450").unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 1 + hydroatlas_forcing::ALL.len());
        assert_eq!(df.column(DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn dispatch_by_catalog() {
        let tree = DataTree::new();
        tree.catalogs(&["01013500"], &["4120025450"]);
        tree.hydroatlas_forcing(&["4120025450"], &[d(2001, 1, 1), d(2001, 1, 3)]);
        let catalog = BasinCatalog::load(tree.root(), &tree.layout).unwrap();

        let aux = load_basin_forcings(tree.root(), &tree.layout, &catalog, "4120025450", "daymet")
            .unwrap();
        assert_eq!(aux.area, 1);
        assert_eq!(aux.data.height(), 3);

        let err = load_basin_forcings(tree.root(), &tree.layout, &catalog, "99999999", "daymet")
            .unwrap_err();
        assert!(matches!(err, LoaderError::BasinNotFound(_)));
    }
}
