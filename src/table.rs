//! Date-indexed table helpers shared by all loaders.
//!
//! Every per-basin table is a polars `DataFrame` with a `date` column of
//! `Date` dtype that is sorted ascending and unique. The helpers here keep
//! that invariant: joins are always left joins onto a known calendar and are
//! re-sorted afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{LoaderError, Result};
use crate::schema::timeseries::DATE;

/// Cell texts read as missing values, the same set pandas' `read_csv` uses.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn ymd(date: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or(NaiveDate::MIN)
}

/// Empty or one of [`MISSING_MARKERS`], ignoring surrounding whitespace.
pub fn is_missing(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || MISSING_MARKERS.contains(&raw)
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time of day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Parse a numeric cell. Missing markers and `NaN` are missing.
pub fn parse_float(raw: Option<&str>) -> std::result::Result<Option<f64>, String> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(s) if is_missing(s) => Ok(None),
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(format!("'{s}' is not a number")),
        },
    }
}

/// Build a `Date` column from calendar dates.
pub fn date_column(dates: &[NaiveDate]) -> Result<Column> {
    Ok(Column::new(DATE.into(), dates))
}

/// Read the `date` column back into calendar dates.
pub fn date_index(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    df.column(DATE)?
        .date()?
        .as_date_iter()
        .map(|d| {
            d.ok_or_else(|| {
                LoaderError::Polars(PolarsError::ComputeError(
                    "null value in date column".into(),
                ))
            })
        })
        .collect()
}

/// Sort a freshly parsed frame by date, rejecting duplicate dates.
pub fn sorted_by_date(df: DataFrame, path: &Path) -> Result<DataFrame> {
    let mut seen = BTreeSet::new();
    if let Some(dup) = date_index(&df)?.into_iter().find(|d| !seen.insert(*d)) {
        return Err(LoaderError::invalid(path, 0, format!("duplicate date {dup}")));
    }
    Ok(df
        .lazy()
        .sort([DATE], SortMultipleOptions::default())
        .collect()?)
}

/// A frame holding only a `date` column.
pub fn calendar_frame(dates: &[NaiveDate]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![date_column(dates)?])?)
}

/// Every day from `start` to `end`, both inclusive.
pub fn daily_calendar(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Build a two-column frame (`date`, `name`) from date-keyed values.
pub fn series_frame(name: &str, values: &BTreeMap<NaiveDate, Option<f64>>) -> Result<DataFrame> {
    let dates: Vec<NaiveDate> = values.keys().copied().collect();
    let data: Vec<Option<f64>> = values.values().copied().collect();
    Ok(DataFrame::new(vec![
        date_column(&dates)?,
        Column::new(name.into(), &data),
    ])?)
}

/// Left-assign the columns of `source` onto `target` by date.
///
/// Rows of `target` without a match get nulls; rows of `source` whose date
/// is not in `target` are dropped. `source` must have unique dates.
pub fn left_join_on_date(target: DataFrame, source: DataFrame) -> Result<DataFrame> {
    let df = target
        .lazy()
        .join(
            source.lazy(),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([DATE], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Column-wise concatenation over the union of all dates.
pub fn outer_merge_on_date(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut all_dates = BTreeSet::new();
    for df in &frames {
        all_dates.extend(date_index(df)?);
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    frames
        .into_iter()
        .try_fold(calendar_frame(&dates)?, left_join_on_date)
}

/// Reindex onto a gap-free daily calendar spanning the first and last date.
pub fn reindex_daily(df: DataFrame) -> Result<DataFrame> {
    let dates = date_index(&df)?;
    let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
        return Ok(df);
    };
    let calendar = calendar_frame(&daily_calendar(*first, *last))?;
    left_join_on_date(calendar, df)
}

/// Keep rows dated on or after `start`.
pub fn truncate_from(df: &DataFrame, start: NaiveDate) -> Result<DataFrame> {
    let dates = date_index(df)?;
    let offset = dates.partition_point(|d| *d < start);
    Ok(df.slice(offset as i64, dates.len() - offset))
}

/// Replace negative values in the given columns by nulls.
pub fn mask_negative(df: DataFrame, columns: &[String]) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(df);
    }
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|c| {
            when(col(c.as_str()).lt(lit(0.0)))
                .then(lit(NULL).cast(DataType::Float64))
                .otherwise(col(c.as_str()))
                .alias(c.as_str())
        })
        .collect();
    Ok(df.lazy().with_columns(exprs).collect()?)
}

/// Append `suffix` to every column name except `date`.
pub fn suffix_columns(df: &mut DataFrame, suffix: &str) -> Result<()> {
    let renamed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| {
            if *c == DATE {
                c.to_string()
            } else {
                format!("{c}_{suffix}")
            }
        })
        .collect();
    df.set_column_names(renamed.as_slice())?;
    Ok(())
}

/// Read a delimited file with all columns as String dtype.
/// Trims whitespace from column names; [`MISSING_MARKERS`] become nulls.
pub fn read_csv_as_strings(path: &Path, separator: u8) -> Result<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_null_values(Some(NullValues::AllColumns(
                    MISSING_MARKERS.iter().map(|m| (*m).into()).collect(),
                )))
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

/// Borrow a String column, reporting a missing column against `path`.
pub fn string_column<'a>(df: &'a DataFrame, name: &str, path: &Path) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| LoaderError::missing_column(name, path))?;
    Ok(column.str()?)
}

/// Parse a date column and one value column of a string frame into a
/// date-keyed map. Later rows win on duplicate dates.
pub fn dated_values(
    df: &DataFrame,
    date_col: &str,
    value_col: &str,
    path: &Path,
) -> Result<BTreeMap<NaiveDate, Option<f64>>> {
    let dates = string_column(df, date_col, path)?;
    let values = string_column(df, value_col, path)?;

    let mut out = BTreeMap::new();
    for (row, (date, value)) in dates.into_iter().zip(values.into_iter()).enumerate() {
        // header is line 1
        let line = row + 2;
        let date = date
            .and_then(parse_date)
            .ok_or_else(|| LoaderError::invalid(path, line, format!("bad date {date:?}")))?;
        let value = parse_float(value).map_err(|m| LoaderError::invalid(path, line, m))?;
        out.insert(date, value);
    }
    Ok(out)
}

/// A whitespace-delimited text table, as found in the CAMELS forcing and
/// streamflow files.
#[derive(Debug)]
pub struct WhitespaceTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based file line of each row.
    lines: Vec<usize>,
}

impl WhitespaceTable {
    /// Parse `lines`. When `columns` is `None` the first non-blank line is the
    /// header. `first_line` is the 1-based file line number of the first item.
    pub fn parse<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        columns: Option<&[&str]>,
        first_line: usize,
        path: &Path,
    ) -> Result<Self> {
        let mut lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, l)| (i + first_line, l))
            .filter(|(_, l)| !l.trim().is_empty());

        let columns: Vec<String> = match columns {
            Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
            None => match lines.next() {
                Some((_, header)) => header.split_whitespace().map(str::to_string).collect(),
                None => return Err(LoaderError::invalid(path, first_line, "missing table header")),
            },
        };

        let mut rows = Vec::new();
        let mut line_numbers = Vec::new();
        for (line, text) in lines {
            let fields: Vec<String> = text.split_whitespace().map(str::to_string).collect();
            if fields.len() != columns.len() {
                return Err(LoaderError::invalid(
                    path,
                    line,
                    format!("expected {} fields, found {}", columns.len(), fields.len()),
                ));
            }
            rows.push(fields);
            line_numbers.push(line);
        }

        Ok(Self {
            columns,
            rows,
            lines: line_numbers,
        })
    }

    pub fn position(&self, name: &str, path: &Path) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| LoaderError::missing_column(name, path))
    }

    pub fn int_values(&self, idx: usize, path: &Path) -> Result<Vec<i32>> {
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, line)| {
                row[idx].parse::<i32>().map_err(|_| {
                    LoaderError::invalid(path, *line, format!("'{}' is not an integer", row[idx]))
                })
            })
            .collect()
    }

    pub fn float_values(&self, idx: usize, path: &Path) -> Result<Vec<Option<f64>>> {
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, line)| {
                parse_float(Some(&row[idx])).map_err(|m| LoaderError::invalid(path, *line, m))
            })
            .collect()
    }

    pub fn string_values(&self, idx: usize) -> Vec<String> {
        self.rows.iter().map(|row| row[idx].clone()).collect()
    }

    /// Build calendar dates from year/month/day columns.
    pub fn dates(&self, ymd_cols: [&str; 3], path: &Path) -> Result<Vec<NaiveDate>> {
        let years = self.int_values(self.position(ymd_cols[0], path)?, path)?;
        let months = self.int_values(self.position(ymd_cols[1], path)?, path)?;
        let days = self.int_values(self.position(ymd_cols[2], path)?, path)?;

        years
            .iter()
            .zip(&months)
            .zip(&days)
            .zip(&self.lines)
            .map(|(((y, m), d), line)| {
                let date = u32::try_from(*m)
                    .ok()
                    .zip(u32::try_from(*d).ok())
                    .and_then(|(m, d)| NaiveDate::from_ymd_opt(*y, m, d));
                date.ok_or_else(|| {
                    LoaderError::invalid(path, *line, format!("invalid date {y}/{m}/{d}"))
                })
            })
            .collect()
    }
}
