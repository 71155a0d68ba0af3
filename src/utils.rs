//! Helpers for log formatting and output directory handling.

use std::fs as stdfs;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::errors::PipelineError;

/// Truncate a string for logging purposes.
///
/// Long strings keep their first `max` characters and get `"…(+N chars)"`
/// appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

/// Remove a directory with everything in it, then recreate it empty.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn clear_directory(path: &Path) -> Result<(), PipelineError> {
    if fs::try_exists(path).await? {
        fs::remove_dir_all(path).await?;
        info!("Cleared directory");
    }
    fs::create_dir_all(path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("…(+400 chars)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        assert_eq!(truncate_for_log("ééé", 2), "éé…(+1 chars)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("results").join("nested");

        ensure_writable_dir(&target).await.unwrap();

        assert!(target.is_dir());
        assert!(!target.join("..__probe_write__").exists());
    }

    #[tokio::test]
    async fn test_clear_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("datasets");
        std::fs::create_dir_all(target.join("sub")).unwrap();
        std::fs::write(target.join("old_finviz.html"), "stale").unwrap();

        clear_directory(&target).await.unwrap();

        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }
}
