//! Reading dotenv files into a lookup map.
//!
//! The file is parsed with `dotenvy` but never exported into the process
//! environment; the resulting map is consulted only after the live
//! environment during override resolution.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

/// Key/value pairs read from a dotenv file.
pub type DotenvMap = HashMap<String, String>;

/// Read `path` as a dotenv file.
///
/// The dotenv layer is always optional: a missing, unreadable or malformed
/// file yields an empty map and a warning.
///
/// # Example
///
/// ```
/// use theta_config::read_dotenv;
///
/// let map = read_dotenv("/nonexistent/.env");
/// assert!(map.is_empty());
/// ```
pub fn read_dotenv(path: impl AsRef<Path>) -> DotenvMap {
    let path = path.as_ref();
    debug!(file = %path.display(), "Reading dotenv file");

    if !path.exists() {
        warn!(
            file = %path.display(),
            "Dotenv file not found, only process environment will be used"
        );
        return DotenvMap::new();
    }

    let entries =
        dotenvy::from_path_iter(path).and_then(|iter| iter.collect::<Result<DotenvMap, _>>());

    match entries {
        Ok(map) => {
            debug!(file = %path.display(), entries = map.len(), "Dotenv file loaded");
            map
        }
        Err(e) => {
            warn!(
                file = %path.display(),
                error = %e,
                "Could not read dotenv file, only process environment will be used"
            );
            DotenvMap::new()
        }
    }
}
