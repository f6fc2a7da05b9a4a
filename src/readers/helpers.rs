// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::walkdir::WalkDir;

use crate::common::FPath;

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    let mut riter = path.rsplit(std::path::MAIN_SEPARATOR);

    FPath::from(riter.next().unwrap_or(""))
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &Path {
    Path::new(path)
}

/// Resolve an index-recorded data-file path against the profile data
/// directory.
///
/// The index stores paths relative to the profile data directory, but
/// files occasionally move between the numbered subdirectories while the
/// index lags behind. When the joined path does not exist, the data
/// directory is searched for a file with the same name.
pub fn resolve_data_file(
    data_dir: &Path,
    index_path: &FPath,
) -> Option<PathBuf> {
    defn!("({:?}, {:?})", data_dir, index_path);
    let joined: PathBuf = data_dir.join(index_path);
    if joined.is_file() {
        defx!("return {:?}", joined);
        return Some(joined);
    }
    let file_name: &std::ffi::OsStr = Path::new(index_path).file_name()?;
    for entry in WalkDir::new(data_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if entry.file_type().is_file() && entry.file_name() == file_name {
            defx!("return {:?}; found by walk", entry.path());
            return Some(entry.into_path());
        }
    }
    defx!("return None");

    None
}
