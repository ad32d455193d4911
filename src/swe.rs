//! Colorado snow water equivalent enrichment of CAMELS forcing tables.
//!
//! Two shared files cover all Colorado basins: the UA reanalysis statistics
//! (`sum_<id>` columns) and the SNOTEL station series (`<id>` columns), where
//! `<id>` is the basin id without its leading digit. Both are cut at
//! 2014-12-31 before merging, and after each merge the target table is cut to
//! start at a product-specific date.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::config::DataLayout;
use crate::error::{LoaderError, Result};
use crate::files::require_file;
use crate::schema::swe;
use crate::table;

/// One SWE product merged into the forcing table.
struct SweSource<'a> {
    file: &'a str,
    date_column: &'static str,
    value_prefix: &'static str,
    target: &'static str,
    keep_from: (i32, u32, u32),
}

/// Add `co_swe_ua` and `co_swe_snotel` to a primary basin's forcing table.
#[instrument(skip(data_dir, layout, df), fields(rows = df.height()))]
pub fn add_swe_to_forcing(
    data_dir: &Path,
    layout: &DataLayout,
    df: DataFrame,
    basin: &str,
) -> Result<DataFrame> {
    let sources = [
        SweSource {
            file: &layout.swe_stats_file,
            date_column: swe::UA_DATE,
            value_prefix: swe::UA_PREFIX,
            target: swe::UA,
            keep_from: swe::UA_START,
        },
        SweSource {
            file: &layout.snotel_file,
            date_column: swe::SNOTEL_DATE,
            value_prefix: "",
            target: swe::SNOTEL,
            keep_from: swe::SNOTEL_START,
        },
    ];

    let dir = layout.primary_root(data_dir).join(swe::DIR);
    sources.iter().try_fold(df, |df, source| {
        let enriched = merge_swe_source(&dir.join(source.file), source, df, basin)?;
        table::truncate_from(&enriched, table::ymd(source.keep_from))
    })
}

fn merge_swe_source(
    path: &Path,
    source: &SweSource<'_>,
    df: DataFrame,
    basin: &str,
) -> Result<DataFrame> {
    require_file(path, "SWE")?;

    let id = basin.get(1..).ok_or_else(|| {
        LoaderError::Config(format!("basin id '{basin}' is too short for SWE lookup"))
    })?;
    let value_column = format!("{}{id}", source.value_prefix);

    let raw = table::read_csv_as_strings(path, b',')?;
    let mut values = table::dated_values(&raw, source.date_column, &value_column, path)?;
    let end = table::ymd(swe::SOURCE_END);
    values.retain(|date, _| *date <= end);
    debug!(
        column = %value_column,
        rows = values.len(),
        "SWE source parsed"
    );

    let series = table::series_frame(source.target, &values)?;
    table::left_join_on_date(df, series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{d, DataTree};

    fn forcing_frame(start: chrono::NaiveDate, days: usize) -> DataFrame {
        let dates: Vec<_> = start.iter_days().take(days).collect();
        let prcp: Vec<f64> = (0..days).map(|i| i as f64).collect();
        DataFrame::new(vec![
            table::date_column(&dates).unwrap(),
            Column::new("prcp".into(), &prcp),
        ])
        .unwrap()
    }

    #[test]
    fn truncates_to_snotel_start() {
        let tree = DataTree::new();
        tree.swe(&["09035800"], d(1998, 1, 1), 365 * 5, 1.0);

        let df = forcing_frame(d(1990, 1, 1), 365 * 15);
        let out = add_swe_to_forcing(tree.root(), &tree.layout, df, "09035800").unwrap();

        let dates = table::date_index(&out).unwrap();
        assert_eq!(dates[0], d(2000, 10, 1));
        assert_eq!(*dates.last().unwrap(), d(1990, 1, 1) + chrono::Days::new(365 * 15 - 1));
        assert!(out.column(swe::UA).is_ok());
        assert!(out.column(swe::SNOTEL).is_ok());
    }

    #[test]
    fn assigns_by_date_and_cuts_source_at_2014() {
        let tree = DataTree::new();
        // source covers 2014-12-30 .. 2015-01-02
        tree.swe(&["09035800"], d(2014, 12, 30), 4, 2.0);

        let df = forcing_frame(d(2014, 12, 29), 5);
        let out = add_swe_to_forcing(tree.root(), &tree.layout, df, "09035800").unwrap();

        let ua: Vec<Option<f64>> = out.column(swe::UA).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(ua, vec![None, Some(0.0), Some(2.0), None, None]);
        let snotel: Vec<Option<f64>> =
            out.column(swe::SNOTEL).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(snotel, vec![None, Some(0.0), Some(20.0), None, None]);
        // original columns untouched
        assert_eq!(out.column("prcp").unwrap().f64().unwrap().get(4), Some(4.0));
    }

    #[test]
    fn missing_basin_column() {
        let tree = DataTree::new();
        tree.swe(&["09035800"], d(2001, 1, 1), 2, 1.0);
        let df = forcing_frame(d(2001, 1, 1), 2);
        let err = add_swe_to_forcing(tree.root(), &tree.layout, df, "09999999").unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { column, .. } if column == "sum_9999999"));
    }

    #[test]
    fn missing_swe_file() {
        let tree = DataTree::new();
        let df = forcing_frame(d(2001, 1, 1), 2);
        let err = add_swe_to_forcing(tree.root(), &tree.layout, df, "09035800").unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound { .. }));
    }
}
