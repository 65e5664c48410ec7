//! Content discovery: the learnable units under a goal's content root.

use std::path::Path;

/// File extension of content pages.
pub const CONTENT_EXTENSION: &str = "md";

/// Page that describes a directory rather than being a unit itself.
pub const INDEX_FILE: &str = "index.md";

/// List the items directly under `root`, sorted lexicographically.
///
/// Subdirectories (except hidden ones) contribute their name; markdown files
/// other than `index.md` contribute their stem. A missing or unreadable root
/// yields an empty list.
pub fn discover(root: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %root.display(), error = %e, "content root not readable");
            return Vec::new();
        }
    };

    let mut items: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let name = entry.file_name().into_string().ok()?;
            let file_type = entry.file_type().ok()?;
            if file_type.is_dir() {
                (!name.starts_with('.')).then_some(name)
            } else if file_type.is_file()
                && name != INDEX_FILE
                && path.extension().is_some_and(|ext| ext == CONTENT_EXTENSION)
            {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            } else {
                None
            }
        })
        .collect();

    items.sort();
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_dirs_and_markdown_stems_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("ch2")).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::write(root.join("ch1.md"), "# one").unwrap();
        std::fs::write(root.join("ch3.md"), "# three").unwrap();
        std::fs::write(root.join("index.md"), "# index").unwrap();
        std::fs::write(root.join("notes.txt"), "skip").unwrap();

        assert_eq!(discover(root), vec!["ch1", "ch2", "ch3"]);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(discover(&dir.path().join("nope")).is_empty());
    }
}
