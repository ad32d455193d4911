//! Throwaway data trees for unit tests.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::config::DataLayout;
use crate::schema::{attributes, hydroatlas_forcing, swe};

pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub(crate) struct DataTree {
    dir: TempDir,
    pub layout: DataLayout,
}

impl DataTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            layout: DataLayout::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn primary(&self) -> PathBuf {
        self.layout.primary_root(self.root())
    }

    pub fn auxiliary(&self) -> PathBuf {
        self.layout.auxiliary_root(self.root())
    }

    pub fn write(&self, path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn catalogs(&self, primary: &[&str], auxiliary: &[&str]) {
        self.write(
            &self.primary().join(&self.layout.primary_basin_list),
            &(primary.join("\n") + "\n"),
        );
        self.write(
            &self.auxiliary().join(&self.layout.auxiliary_basin_list),
            &(auxiliary.join("\n") + "\n"),
        );
    }

    /// A CAMELS forcing file with `days` daily rows from `start`.
    /// `prcp` on day `i` is `i`.
    pub fn forcing(&self, product: &str, basin: &str, area: u64, start: NaiveDate, days: usize) {
        let mut text = format!("44.61\n177\n{area}\n");
        text.push_str("Year Mnth Day Hr dayl(s) prcp(mm/day) srad(W/m2) swe(mm) tmax(C) tmin(C) vp(Pa)\n");
        for (i, date) in start.iter_days().take(days).enumerate() {
            text.push_str(&format!(
                "{} {:02} {:02} 12 35000.00 {}.00 150.5 0.00 5.0 -3.5 450.0\n",
                date.format("%Y"),
                date.format("%m"),
                date.format("%d"),
                i
            ));
        }
        let path = self
            .primary()
            .join("basin_mean_forcing")
            .join(product)
            .join("01")
            .join(format!("{basin}_lump_cida_forcing_leap.txt"));
        self.write(&path, &text);
    }

    /// A USGS streamflow file with one row per flow value.
    pub fn streamflow(&self, basin: &str, start: NaiveDate, flows: &[f64]) {
        let text: String = start
            .iter_days()
            .zip(flows)
            .map(|(date, q)| {
                let flag = if *q < 0.0 { "M" } else { "A" };
                format!("{basin} {} {q:.2} {flag}\n", date.format("%Y %m %d"))
            })
            .collect();
        let path = self
            .primary()
            .join("usgs_streamflow")
            .join("01")
            .join(format!("{basin}_streamflow_qc.txt"));
        self.write(&path, &text);
    }

    /// Both SWE files for `basins`; the value on day `i` is `scale * i`.
    pub fn swe(&self, basins: &[&str], start: NaiveDate, days: usize, scale: f64) {
        let dir = self.primary().join(swe::DIR);

        let mut ua = String::from("timestamp");
        let mut snotel = String::from("Date");
        for basin in basins {
            ua.push_str(&format!(",sum_{}", &basin[1..]));
            snotel.push_str(&format!(",{}", &basin[1..]));
        }
        ua.push('\n');
        snotel.push('\n');
        for (i, date) in start.iter_days().take(days).enumerate() {
            let value = scale * i as f64;
            ua.push_str(&date.format("%Y-%m-%d").to_string());
            snotel.push_str(&date.format("%Y-%m-%d").to_string());
            for _ in basins {
                ua.push_str(&format!(",{value}"));
                snotel.push_str(&format!(",{}", value * 10.0));
            }
            ua.push('\n');
            snotel.push('\n');
        }
        self.write(&dir.join(&self.layout.swe_stats_file), &ua);
        self.write(&dir.join(&self.layout.snotel_file), &snotel);
    }

    /// Write all five HydroATLAS forcing files with the given dated rows.
    pub fn hydroatlas_forcing(&self, basins: &[&str], dates: &[NaiveDate]) {
        for (v, variable) in hydroatlas_forcing::ALL.iter().enumerate() {
            let mut text = format!("date,{}\n", basins.join(","));
            for (i, date) in dates.iter().enumerate() {
                text.push_str(&date.format("%Y-%m-%d").to_string());
                for b in 0..basins.len() {
                    text.push_str(&format!(",{}", (v * 100 + b * 10 + i) as f64));
                }
                text.push('\n');
            }
            let path = self
                .auxiliary()
                .join(hydroatlas_forcing::DIR)
                .join(hydroatlas_forcing::file_name(variable));
            self.write(&path, &text);
        }
    }

    pub fn attribute_file(&self, name: &str, contents: &str) {
        let path = self.primary().join(attributes::DIR).join(name);
        self.write(&path, contents);
    }

    pub fn hydroatlas_attributes(&self, raw: &str, pca: &str) {
        let dir = self.primary().join(attributes::HYDROATLAS_DIR);
        self.write(&dir.join(attributes::HYDROATLAS_FILE), raw);
        self.write(&dir.join(attributes::HYDROATLAS_PCA_FILE), pca);
    }
}
