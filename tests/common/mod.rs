use std::path::{Path, PathBuf};

use _core::DataLayout;
use chrono::NaiveDate;
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A miniature CAMELS_US / HydroAtlas_colorado tree.
pub struct Fixture {
    dir: TempDir,
    pub layout: DataLayout,
}

impl Fixture {
    pub fn new(primary: &[&str], auxiliary: &[&str]) -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
            layout: DataLayout::default(),
        };
        fixture.write(
            &fixture.primary().join(&fixture.layout.primary_basin_list),
            &format!("{}\n", primary.join("\n")),
        );
        fixture.write(
            &fixture.auxiliary().join(&fixture.layout.auxiliary_basin_list),
            &format!("{}\n", auxiliary.join("\n")),
        );
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    fn primary(&self) -> PathBuf {
        self.layout.primary_root(self.root())
    }

    fn auxiliary(&self) -> PathBuf {
        self.layout.auxiliary_root(self.root())
    }

    pub fn write(&self, path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    /// Daily forcing rows from `start`; every `skip`-th day is left out of the
    /// file when `skip` is non-zero. `tmax` on day `i` is `i`.
    pub fn forcing(&self, product: &str, basin: &str, area: &str, start: NaiveDate, days: usize, skip: usize) {
        let mut text = format!("39.5\n2800\n{area}\n");
        text.push_str("Year Mnth Day Hr dayl(s) prcp(mm/day) tmax(C)\n");
        for (i, d) in start.iter_days().take(days).enumerate() {
            if skip > 0 && i > 0 && i % skip == 0 {
                continue;
            }
            text.push_str(&format!("{} 12 36000.0 1.5 {i}.0\n", d.format("%Y %m %d")));
        }
        let path = self
            .primary()
            .join("basin_mean_forcing")
            .join(product)
            .join("14")
            .join(format!("{basin}_lump_cida_forcing_leap.txt"));
        self.write(&path, &text);
    }

    pub fn streamflow(&self, basin: &str, start: NaiveDate, flows: &[f64]) {
        let text: String = start
            .iter_days()
            .zip(flows)
            .map(|(d, q)| format!("{basin} {} {q:.2} A\n", d.format("%Y %m %d")))
            .collect();
        let path = self
            .primary()
            .join("usgs_streamflow")
            .join("14")
            .join(format!("{basin}_streamflow_qc.txt"));
        self.write(&path, &text);
    }

    /// Constant SWE values for one basin over `days` days from `start`.
    pub fn swe(&self, basin: &str, start: NaiveDate, days: usize) {
        let id = &basin[1..];
        let mut ua = format!("timestamp,sum_{id}\n");
        let mut snotel = format!("Date,{id}\n");
        for d in start.iter_days().take(days) {
            ua.push_str(&format!("{} 00:00:00,12.5\n", d.format("%Y-%m-%d")));
            snotel.push_str(&format!("{},40\n", d.format("%Y-%m-%d")));
        }
        let dir = self.primary().join("colorado_swe");
        self.write(&dir.join(&self.layout.swe_stats_file), &ua);
        self.write(&dir.join(&self.layout.snotel_file), &snotel);
    }

    pub fn attributes(&self, name: &str, contents: &str) {
        let path = self.primary().join("camels_attributes_v2.0").join(name);
        self.write(&path, contents);
    }

    pub fn hydroatlas_attributes(&self, raw: &str, pca: &str) {
        let dir = self.primary().join("hydroATLAS/hydroATLAS_Camels");
        self.write(&dir.join("camels_hydroatlas.csv"), raw);
        self.write(&dir.join("camels_hydroatlas_pca_transformed_all.csv"), pca);
    }
}
