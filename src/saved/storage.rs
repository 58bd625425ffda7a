use super::types::SavedStore;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default saved calculations path (~/.config/gradecalc/saved.json)
pub fn get_store_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("saved.json"))
}

/// Load saved calculations from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store(path: &Path) -> Result<SavedStore> {
    if !path.exists() {
        return Ok(SavedStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open saved calculations at {}", path.display()))?;

    let store: SavedStore =
        serde_json::from_reader(file).context("Failed to load saved calculations")?;

    if store.version != 1 {
        anyhow::bail!("Unsupported saved calculations version: {}", store.version);
    }

    tracing::debug!(path = %path.display(), accounts = store.accounts.len(), "loaded saved calculations");
    Ok(store)
}

/// Save calculations to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_store(path: &Path, store: &SavedStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store)
        .context("Failed to serialize saved calculations")?;

    file.commit().context("Failed to save calculations")?;

    tracing::debug!(path = %path.display(), "wrote saved calculations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{FinalExamQuery, GradeEntry, GradingConfig};
    use crate::saved::CalculationData;
    use crate::worksheet::Worksheet;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(&dir.path().join("saved.json")).unwrap();
        assert_eq!(store.version, 1);
        assert!(store.accounts.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("saved.json");

        let report = Worksheet::new(vec![
            GradeEntry::new("HW1", "A", "5"),
            GradeEntry::new("Project", "B", "20"),
        ])
        .evaluate(&GradingConfig::default())
        .unwrap();
        let final_result = FinalExamQuery::new(90.0, 85.0, 30.0).solve().unwrap();

        let mut store = SavedStore::new();
        store
            .save("sam", "Midterm check", "", CalculationData::Grade(report.clone()))
            .unwrap();
        store
            .save("sam", "", "", CalculationData::Final(final_result))
            .unwrap();

        save_store(&path, &store).unwrap();
        let loaded = load_store(&path).unwrap();

        let calcs = loaded.list("sam");
        assert_eq!(calcs.len(), 2);
        assert_eq!(calcs[0].name, "Midterm check");
        match &calcs[0].data {
            CalculationData::Grade(loaded) => {
                assert_eq!(loaded.result.letter, report.result.letter);
                assert_eq!(loaded.result.average, 85.4);
                assert_eq!(loaded.result.entries, report.result.entries);
                assert!(loaded.projection.is_none());
            }
            other => panic!("expected grade calculation, got {:?}", other),
        }
        match &calcs[1].data {
            CalculationData::Final(loaded) => {
                assert_eq!(loaded.required, final_result.required);
                assert!((loaded.raw_required - final_result.raw_required).abs() < 1e-9);
            }
            other => panic!("expected final calculation, got {:?}", other),
        }
        assert_eq!(calcs[1].name, "Calculation 2");
        assert_eq!(calcs[1].id, store.list("sam")[1].id);
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");

        let mut store = SavedStore::new();
        for name in ["one", "two", "three"] {
            let result = FinalExamQuery::new(90.0, 85.0, 30.0).solve().unwrap();
            store.save("sam", name, "", CalculationData::Final(result)).unwrap();
        }
        save_store(&path, &store).unwrap();

        store.delete("sam", 1).unwrap();
        store.delete("sam", 1).unwrap();
        save_store(&path, &store).unwrap();

        let loaded = load_store(&path).unwrap();
        let names: Vec<&str> = loaded.list("sam").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["three"]);

        // The temporary file is renamed into place, nothing else is left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("saved.json")]);
    }

    #[test]
    fn test_failed_save_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "data").unwrap();

        let mut store = SavedStore::new();
        let result = FinalExamQuery::new(90.0, 85.0, 30.0).solve().unwrap();
        store.save("sam", "", "", CalculationData::Final(result)).unwrap();

        assert!(save_store(&path, &store).is_err());
        assert!(path.is_dir());
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "data");
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("not-a-dir");
        std::fs::write(&parent, "").unwrap();

        let err = save_store(&parent.join("saved.json"), &SavedStore::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to open atomic write file"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        std::fs::write(&path, r#"{"version": 2, "accounts": {}}"#).unwrap();
        let err = load_store(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_store(&path).is_err());
    }
}
