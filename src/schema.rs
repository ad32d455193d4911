/// Column-name and file-name constants for the CAMELS + Colorado SWE data tree.
/// Single source of truth - exported to Python via PyO3.

// ── Shared index column ─────────────────────────────────────────────────────
pub mod timeseries {
    pub const DATE: &str = "date";
}

// ── CAMELS forcing files ────────────────────────────────────────────────────
pub mod forcing {
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Mnth";
    pub const DAY: &str = "Day";

    pub const DIR: &str = "basin_mean_forcing";
    pub const FILE_SUFFIX: &str = "_forcing_leap.txt";
    pub const HEADER_LINES: usize = 3;
}

// ── USGS streamflow files ───────────────────────────────────────────────────
pub mod discharge {
    pub const BASIN: &str = "basin";
    pub const QOBS_RAW: &str = "QObs";
    pub const QOBS: &str = "QObs(mm/d)";
    pub const FLAG: &str = "flag";

    /// Marker searched for (case-insensitive) in column names that hold discharge.
    pub const QOBS_MARKER: &str = "qobs";

    pub const DIR: &str = "usgs_streamflow";
    pub const FILE_SUFFIX: &str = "_streamflow_qc.txt";

    /// Cubic feet per second to cubic millimetres per second.
    pub const CFS_TO_MM3: f64 = 28316846.592;
    pub const SECONDS_PER_DAY: f64 = 86400.0;
    pub const KM2_TO_MM2: f64 = 1e6;
}

// ── Colorado snow water equivalent ──────────────────────────────────────────
pub mod swe {
    pub const DIR: &str = "colorado_swe";

    pub const UA: &str = "co_swe_ua";
    pub const UA_DATE: &str = "timestamp";
    pub const UA_PREFIX: &str = "sum_";

    pub const SNOTEL: &str = "co_swe_snotel";
    pub const SNOTEL_DATE: &str = "Date";

    /// Last day of enrichment data that is used.
    pub const SOURCE_END: (i32, u32, u32) = (2014, 12, 31);
    /// First day kept after merging the UA product.
    pub const UA_START: (i32, u32, u32) = (1999, 10, 1);
    /// First day kept after merging the SNOTEL product.
    pub const SNOTEL_START: (i32, u32, u32) = (2000, 10, 1);
}

// ── HydroATLAS level-12 forcing ─────────────────────────────────────────────
pub mod hydroatlas_forcing {
    pub const DIR: &str = "forcing";
    pub const DATE: &str = "date";

    pub const APCPSFC: &str = "apcpsfc";
    pub const DSWRFSFC: &str = "dswrfsfc";
    pub const PRESSFC: &str = "pressfc";
    pub const TMP2M_MAX: &str = "tmp2m_max";
    pub const TMP2M_MIN: &str = "tmp2m_min";

    pub const ALL: [&str; 5] = [APCPSFC, DSWRFSFC, PRESSFC, TMP2M_MAX, TMP2M_MIN];

    pub fn file_name(variable: &str) -> String {
        format!("hydroatlas_co_{variable}_qc_daily.csv")
    }

    /// Catchment area is not available for these basins.
    pub const PLACEHOLDER_AREA: u64 = 1;
}

// ── Static attributes ───────────────────────────────────────────────────────
pub mod attributes {
    pub const GAUGE_ID: &str = "gauge_id";
    pub const HUC_02: &str = "huc_02";
    pub const HUC: &str = "huc";

    pub const DIR: &str = "camels_attributes_v2.0";
    pub const FILE_PREFIX: &str = "camels_";
    pub const FILE_SUFFIX: &str = ".txt";
    pub const SEPARATOR: u8 = b';';

    pub const HYDROATLAS_DIR: &str = "hydroATLAS/hydroATLAS_Camels";
    pub const HYDROATLAS_FILE: &str = "camels_hydroatlas.csv";
    pub const HYDROATLAS_PCA_FILE: &str = "camels_hydroatlas_pca_transformed_all.csv";
}
