use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Report file name derived from the watch name.
pub fn report_file_name(watch_name: &str) -> PathBuf {
    PathBuf::from(format!("violations_{}.csv", watch_name))
}

/// Where the single-page variant dumps the raw first-page response.
pub fn raw_page_file_name(watch_name: &str) -> PathBuf {
    PathBuf::from(format!("violations_{}.json", watch_name))
}

/// Where a watch definition is backed up before an in-place modification.
pub fn watch_backup_file_name(watch_name: &str) -> PathBuf {
    PathBuf::from(format!("{}.json.bak", watch_name))
}

/// Write a watch definition backup into `dir`, named `<watch>.json.bak`,
/// and return its path. The contents are written verbatim so the backup can
/// be PUT back by hand to revert a bad update.
pub fn backup_watch_definition(dir: &Path, watch_name: &str, definition: &str) -> Result<PathBuf> {
    let backup = dir.join(watch_backup_file_name(watch_name));
    fs::write(&backup, definition)
        .with_context(|| format!("cannot write the backup file {}", backup.display()))?;
    Ok(backup)
}

/// All file paths of one run, threaded explicitly instead of being global
/// state.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub report: PathBuf,
    pub raw_page: PathBuf,
}

impl ExportPaths {
    pub fn for_watch(watch_name: &str, report_override: Option<String>) -> Self {
        ExportPaths {
            report: report_override
                .map(PathBuf::from)
                .unwrap_or_else(|| report_file_name(watch_name)),
            raw_page: raw_page_file_name(watch_name),
        }
    }
}

/// A file that is removed on drop unless explicitly kept. Intermediate
/// artifacts go through this so that every exit path, success or failure,
/// cleans them up.
pub struct ScopedFile {
    path: PathBuf,
    keep: bool,
}

impl ScopedFile {
    pub fn write(path: &Path, contents: &[u8]) -> Result<Self> {
        fs::write(path, contents)
            .with_context(|| format!("cannot write file {}", path.display()))?;
        Ok(ScopedFile {
            path: path.to_path_buf(),
            keep: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file on disk; returns its path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_deterministic() {
        assert_eq!(
            report_file_name("prod-watch"),
            PathBuf::from("violations_prod-watch.csv")
        );
        assert_eq!(
            raw_page_file_name("prod-watch"),
            PathBuf::from("violations_prod-watch.json")
        );
        assert_eq!(
            watch_backup_file_name("prod-watch"),
            PathBuf::from("prod-watch.json.bak")
        );
    }

    #[test]
    fn export_paths_honor_the_override() {
        let defaults = ExportPaths::for_watch("w", None);
        assert_eq!(defaults.report, PathBuf::from("violations_w.csv"));
        let overridden = ExportPaths::for_watch("w", Some("custom.csv".to_string()));
        assert_eq!(overridden.report, PathBuf::from("custom.csv"));
        assert_eq!(overridden.raw_page, PathBuf::from("violations_w.json"));
    }

    // the backup must be a byte-for-byte copy of the definition it was
    // given, under the deterministic .bak name
    #[test]
    fn backup_is_identical_to_the_definition() {
        let dir = tempfile::tempdir().unwrap();
        let definition = "{\n  \"general_data\": {\n    \"name\": \"prod-watch\"\n  }\n}";
        let backup = backup_watch_definition(dir.path(), "prod-watch", definition).unwrap();
        assert_eq!(backup, dir.path().join("prod-watch.json.bak"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), definition);
    }

    #[test]
    fn backup_in_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let error = backup_watch_definition(&missing, "prod-watch", "{}").unwrap_err();
        assert!(error.to_string().contains("prod-watch.json.bak"));
    }

    #[test]
    fn scoped_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        {
            let scoped = ScopedFile::write(&path, b"{}").unwrap();
            assert!(scoped.path().exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn kept_scoped_file_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        let kept = {
            let scoped = ScopedFile::write(&path, b"{\"violations\":[]}").unwrap();
            scoped.keep()
        };
        assert!(kept.exists());
        assert_eq!(fs::read_to_string(&kept).unwrap(), "{\"violations\":[]}");
    }
}
