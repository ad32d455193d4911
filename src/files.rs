use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{LoaderError, Result};

pub fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(LoaderError::MissingDirectory(path.to_path_buf()))
    }
}

pub fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LoaderError::FileNotFound {
            what: what.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Recursively find the single file below `root` whose name starts with
/// `prefix` and ends with `suffix` (the `**/<prefix>*<suffix>` glob).
///
/// No match is [`LoaderError::FileNotFound`]; several matches are
/// [`LoaderError::AmbiguousFile`].
pub fn find_unique_file(root: &Path, prefix: &str, suffix: &str, what: &str) -> Result<PathBuf> {
    find_unique_matching(root, &format!("{prefix}*{suffix}"), what, |name| {
        name.len() >= prefix.len() + suffix.len()
            && name.starts_with(prefix)
            && name.ends_with(suffix)
    })
}

/// Recursively find the single file below `root` called exactly `name`
/// (the `**/<name>` glob).
pub fn find_unique_named(root: &Path, name: &str, what: &str) -> Result<PathBuf> {
    find_unique_matching(root, name, what, |candidate| candidate == name)
}

fn find_unique_matching(
    root: &Path,
    pattern: &str,
    what: &str,
    is_match: impl Fn(&str) -> bool,
) -> Result<PathBuf> {
    let pattern = root.join("**").join(pattern);

    let mut matches: Vec<PathBuf> = Vec::new();
    if root.is_dir() {
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| {
                LoaderError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            if entry.file_type().is_file() && is_match(&entry.file_name().to_string_lossy()) {
                matches.push(entry.into_path());
            }
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(LoaderError::FileNotFound {
            what: what.to_string(),
            path: pattern,
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(LoaderError::AmbiguousFile {
            pattern: pattern.display().to_string(),
            matches,
        }),
    }
}
