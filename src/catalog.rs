use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::DataLayout;
use crate::error::{LoaderError, Result};

/// Which data product a basin is sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasinSource {
    Primary,
    Auxiliary,
}

/// Ordered basin manifest with constant-time membership.
#[derive(Debug, Clone, Default)]
pub struct BasinList {
    ids: Vec<String>,
    members: HashSet<String>,
}

impl BasinList {
    pub fn new(ids: Vec<String>) -> Self {
        let members = ids.iter().cloned().collect();
        Self { ids, members }
    }

    pub fn contains(&self, basin: &str) -> bool {
        self.members.contains(basin)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Read a manifest with one basin id per line.
///
/// Trailing whitespace is stripped and blank lines are skipped.
pub fn read_basin_list(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(LoaderError::FileNotFound {
            what: "basin list".into(),
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// The primary and auxiliary basin catalogs, loaded once.
///
/// Holds its source paths so the manifests can be re-read with [`BasinCatalog::reload`]
/// when the files change on disk; nothing is re-read implicitly.
#[derive(Debug, Clone)]
pub struct BasinCatalog {
    primary_path: PathBuf,
    auxiliary_path: PathBuf,
    primary: BasinList,
    auxiliary: BasinList,
}

impl BasinCatalog {
    #[instrument(skip(layout), fields(data_dir = %data_dir.display()))]
    pub fn load(data_dir: &Path, layout: &DataLayout) -> Result<Self> {
        let mut catalog = Self {
            primary_path: layout
                .primary_root(data_dir)
                .join(&layout.primary_basin_list),
            auxiliary_path: layout
                .auxiliary_root(data_dir)
                .join(&layout.auxiliary_basin_list),
            primary: BasinList::default(),
            auxiliary: BasinList::default(),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    pub fn reload(&mut self) -> Result<()> {
        self.primary = BasinList::new(read_basin_list(&self.primary_path)?);
        self.auxiliary = BasinList::new(read_basin_list(&self.auxiliary_path)?);
        debug!(
            primary = self.primary.len(),
            auxiliary = self.auxiliary.len(),
            "basin catalogs loaded"
        );
        Ok(())
    }

    /// Resolve a basin to its data product. Primary membership wins.
    pub fn source_of(&self, basin: &str) -> Result<BasinSource> {
        if self.primary.contains(basin) {
            Ok(BasinSource::Primary)
        } else if self.auxiliary.contains(basin) {
            Ok(BasinSource::Auxiliary)
        } else {
            Err(LoaderError::BasinNotFound(basin.to_string()))
        }
    }

    pub fn contains_primary(&self, basin: &str) -> bool {
        self.primary.contains(basin)
    }

    pub fn contains_auxiliary(&self, basin: &str) -> bool {
        self.auxiliary.contains(basin)
    }

    pub fn primary(&self) -> &BasinList {
        &self.primary
    }

    pub fn auxiliary(&self) -> &BasinList {
        &self.auxiliary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_catalogs(root: &Path, primary: &str, auxiliary: &str) -> DataLayout {
        let layout = DataLayout::default();
        let p = layout.primary_root(root);
        let a = layout.auxiliary_root(root);
        std::fs::create_dir_all(&p).unwrap();
        std::fs::create_dir_all(&a).unwrap();
        std::fs::write(p.join(&layout.primary_basin_list), primary).unwrap();
        std::fs::write(a.join(&layout.auxiliary_basin_list), auxiliary).unwrap();
        layout
    }

    #[test]
    fn resolves_membership() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_catalogs(dir.path(), "01013500\n09035800\r\n", "4120025450\n");
        let catalog = BasinCatalog::load(dir.path(), &layout).unwrap();

        assert_eq!(catalog.primary().ids(), ["01013500", "09035800"]);
        assert_eq!(catalog.source_of("09035800").unwrap(), BasinSource::Primary);
        assert_eq!(
            catalog.source_of("4120025450").unwrap(),
            BasinSource::Auxiliary
        );
        assert!(matches!(
            catalog.source_of("99999999"),
            Err(LoaderError::BasinNotFound(b)) if b == "99999999"
        ));
    }

    #[test]
    fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_catalogs(dir.path(), "01013500\n", "");
        let mut catalog = BasinCatalog::load(dir.path(), &layout).unwrap();
        assert!(!catalog.contains_primary("09035800"));

        write_catalogs(dir.path(), "01013500\n09035800\n", "");
        assert!(!catalog.contains_primary("09035800"));
        catalog.reload().unwrap();
        assert!(catalog.contains_primary("09035800"));
    }

    #[test]
    fn missing_manifest_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = BasinCatalog::load(dir.path(), &DataLayout::default()).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound { .. }));
    }
}
