use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::ScanError;

/// Subdirectory of the base directory searched for nested charms
pub const DEFAULT_CHARMS_SUBDIR: &str = "charms";

/// File whose presence marks a directory as a charm
pub const METADATA_FILE: &str = "metadata.yaml";

/// Find charm directories under `base_dir`.
///
/// Every immediate child of `base_dir/charms_subdir` holding a `metadata.yaml`
/// is a charm. When there are none, `base_dir` itself is returned if it holds
/// the marker. Otherwise the result is empty. A missing `base_dir` is not an
/// error.
///
/// Results follow filesystem enumeration order and keep the form of
/// `base_dir` (relative stays relative, symlinks are not resolved).
pub fn find_charms_in_dir<P: AsRef<Path>>(
    base_dir: P,
    charms_subdir: &str,
) -> Result<Vec<PathBuf>, ScanError> {
    let base_dir = base_dir.as_ref();
    let charms_dir = base_dir.join(charms_subdir);

    let nested = find_nested_charms(&charms_dir)?;
    if !nested.is_empty() {
        info!("Found {} nested charm(s) in {}", nested.len(), charms_dir.display());
        return Ok(nested);
    }

    // No nested charms, the base directory may be a charm itself
    debug!("No nested charms in {}, checking base directory", charms_dir.display());
    if base_dir.is_dir() && has_metadata(base_dir)? {
        info!("Base directory {} is a charm", base_dir.display());
        return Ok(vec![base_dir.to_path_buf()]);
    }

    info!("No charms found in {}", base_dir.display());
    Ok(Vec::new())
}

fn find_nested_charms(charms_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut charms = Vec::new();

    if !charms_dir.is_dir() {
        debug!("Charms directory {} does not exist", charms_dir.display());
        return Ok(charms);
    }

    for entry in WalkDir::new(charms_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ScanError::ReadDir {
            path: charms_dir.to_path_buf(),
            source,
        })?;

        // Symlinked charms count, dangling links do not
        let is_dir = entry.file_type().is_dir()
            || (entry.path_is_symlink() && entry.path().is_dir());
        if !is_dir {
            continue;
        }

        if has_metadata(entry.path())? {
            debug!("Found charm at {}", entry.path().display());
            charms.push(entry.path().to_path_buf());
        }
    }

    Ok(charms)
}

fn has_metadata(dir: &Path) -> Result<bool, ScanError> {
    let marker = dir.join(METADATA_FILE);
    match fs::metadata(&marker) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ScanError::Probe {
            path: marker,
            source,
        }),
    }
}

/// Render each path as a string ending in exactly one `/`.
///
/// Paths are normalized lexically first (`.` components and trailing
/// separators dropped) so stringifying an already stringified path is a
/// no-op.
pub fn stringify_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    paths.iter().map(|p| stringify_path(p.as_ref())).collect()
}

fn stringify_path(path: &Path) -> String {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let rendered = if normalized.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalized.to_string_lossy().into_owned()
    };

    // Only the root keeps a trailing separator after normalization
    let mut rendered = rendered.trim_end_matches(['/', std::path::MAIN_SEPARATOR]).to_string();
    rendered.push('/');
    rendered
}
