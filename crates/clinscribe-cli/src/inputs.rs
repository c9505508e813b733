//! Input directory reading.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clinscribe_core::InputItem;

/// Read every `*.txt` file in `dir`, sorted by file name.
///
/// Text is trimmed. Empty or unreadable files are skipped with a warning.
/// A missing directory is an error.
pub fn read_inputs(dir: &Path) -> Result<Vec<InputItem>> {
    if !dir.is_dir() {
        bail!("Input directory not found: {}", dir.display());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Skipping unreadable input");
                continue;
            }
        };

        match InputItem::new(name, text.trim()) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!(error = %e, "Skipping input"),
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_sorted_trimmed_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "  segundo caso \n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "primeiro caso").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let items = read_inputs(dir.path()).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(items[1].text(), "segundo caso");
    }

    #[test]
    fn test_skips_empty_and_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blank.txt"), " \n\t").unwrap();
        std::fs::write(dir.path().join("binary.txt"), [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(dir.path().join("case1.txt"), "patient reports anxiety").unwrap();

        let items = read_inputs(dir.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "case1.txt");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_inputs(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("Input directory not found"));
    }

    #[test]
    fn test_empty_directory_gives_no_items() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_inputs(dir.path()).unwrap().is_empty());
    }
}
