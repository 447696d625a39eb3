//! One-time download of canonical dataset sources.
//!
//! A download only happens when no non-empty artifact exists on disk, so a
//! process (or a fleet of reruns) touches the network at most once per
//! dataset.

use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::error::BoundaryError;

/// Whether `path` names an existing file with at least one byte.
pub fn file_exists_non_zero(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// Download `url` to `destination` unless a non-empty file is already there.
///
/// The response body is streamed to disk. A zero-length file (a previously
/// interrupted download) does not count as present and is re-fetched.
///
/// # Errors
///
/// Returns [`BoundaryError::Fetch`] on any HTTP failure (including non-2xx
/// status) and [`BoundaryError::Io`] if the file cannot be written.
pub fn maybe_download(url: &str, destination: &Path) -> Result<(), BoundaryError> {
    if file_exists_non_zero(destination) {
        debug!(path = %destination.display(), "dataset artifact already present");
        return Ok(());
    }

    info!(url, path = %destination.display(), "downloading reference dataset");
    let fetch_err = |source: reqwest::Error| BoundaryError::Fetch {
        url: url.to_owned(),
        source,
    };
    let mut response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(fetch_err)?;

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(destination)?;
    response.copy_to(&mut file).map_err(fetch_err)?;
    Ok(())
}
