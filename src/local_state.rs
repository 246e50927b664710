//! Best-effort JSON persistence for dashboard-session state (spray log,
//! device flag).
//!
//! Save errors are logged and swallowed — persisting is a convenience and
//! must never interrupt normal application flow. Loads return `None` for a
//! missing or unreadable file and for corrupt JSON, so callers fall back to
//! their seeded defaults instead of crashing.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// Read and deserialize `path`. `None` means "start from defaults": the file
/// is absent, unreadable, or not valid JSON for `T`.
pub async fn load<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local_state: failed to read");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local_state: corrupt file, using defaults");
            None
        }
    }
}

/// Serialize `value` as pretty JSON and write it to `path`, creating parent
/// directories as needed.
pub async fn save<T: Serialize>(path: &Path, value: &T) {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(dir).await {
                warn!(path = %path.display(), error = %e, "local_state: failed to create directory");
                return;
            }
        }
    }

    let content = match serde_json::to_vec_pretty(value) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local_state: failed to serialize");
            return;
        }
    };

    if let Err(e) = fs::write(path, &content).await {
        warn!(path = %path.display(), error = %e, "local_state: failed to write");
    } else {
        debug!(path = %path.display(), bytes = content.len(), "local_state: saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(load::<Vec<i64>>(&path).await, None);
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        save(&path, &vec![1i64, 2, 3]).await;
        assert_eq!(load::<Vec<i64>>(&path).await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn load_corrupt_json_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert_eq!(load::<Vec<i64>>(&path).await, None);
    }
}
