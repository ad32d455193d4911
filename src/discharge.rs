//! USGS streamflow loader.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::config::DataLayout;
use crate::error::{LoaderError, Result};
use crate::files::find_unique_named;
use crate::schema::discharge;
use crate::schema::timeseries::DATE;
use crate::table::{self, WhitespaceTable};

const COLUMNS: [&str; 6] = [
    discharge::BASIN,
    "Year",
    "Mnth",
    "Day",
    discharge::QOBS_RAW,
    discharge::FLAG,
];

/// Convert a flow in cubic feet per second to a depth rate in mm/day over
/// a catchment of `area` km².
pub fn cfs_to_mm_per_day(flow_cfs: Expr, area: u64) -> Expr {
    lit(discharge::CFS_TO_MM3) * flow_cfs * lit(discharge::SECONDS_PER_DAY)
        / lit(area as f64 * discharge::KM2_TO_MM2)
}

/// Load a `<basin>_streamflow_qc.txt` file.
///
/// Returns a frame with `date`, `QObs(mm/d)` and the USGS quality `flag`.
/// Missing-data markers (`-999`) are converted like any other value and stay
/// negative; the dataset masks them.
#[instrument(skip(data_dir, layout))]
pub fn load_discharge(
    data_dir: &Path,
    layout: &DataLayout,
    basin: &str,
    area: u64,
) -> Result<DataFrame> {
    if area == 0 {
        return Err(LoaderError::Config(format!(
            "catchment area of basin {basin} must be positive"
        )));
    }

    let discharge_path = layout.primary_root(data_dir).join(discharge::DIR);
    let file = find_unique_named(
        &discharge_path,
        &format!("{basin}{}", discharge::FILE_SUFFIX),
        "streamflow",
    )?;
    let contents = std::fs::read_to_string(&file)?;

    let body = WhitespaceTable::parse(contents.lines(), Some(COLUMNS.as_slice()), 1, &file)?;
    let dates = body.dates([COLUMNS[1], COLUMNS[2], COLUMNS[3]], &file)?;
    let flow = body.float_values(body.position(discharge::QOBS_RAW, &file)?, &file)?;
    let flags = body.string_values(body.position(discharge::FLAG, &file)?);

    let raw = DataFrame::new(vec![
        table::date_column(&dates)?,
        Column::new(discharge::QOBS_RAW.into(), &flow),
        Column::new(discharge::FLAG.into(), &flags),
    ])?;
    let raw = table::sorted_by_date(raw, &file)?;

    let df = raw
        .lazy()
        .select([
            col(DATE),
            cfs_to_mm_per_day(col(discharge::QOBS_RAW), area).alias(discharge::QOBS),
            col(discharge::FLAG),
        ])
        .collect()?;
    debug!(rows = df.height(), "streamflow parsed");

    Ok(df)
}
