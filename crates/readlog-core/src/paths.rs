use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "readlog.yaml";
pub const DEFAULT_CONTENT_DIR: &str = "content/reading";
pub const RECORD_EXTENSION: &str = "md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the content directory against the site root.
/// Absolute paths are returned unchanged.
pub fn content_dir(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

pub fn is_record(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
}

/// Render `path` relative to `root` when possible, for display.
pub fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/site");
        assert_eq!(config_path(root), PathBuf::from("/tmp/site/readlog.yaml"));
        assert_eq!(
            content_dir(root, Path::new(DEFAULT_CONTENT_DIR)),
            PathBuf::from("/tmp/site/content/reading")
        );
        assert_eq!(
            content_dir(root, Path::new("/srv/reading")),
            PathBuf::from("/srv/reading")
        );
    }

    #[test]
    fn only_markdown_files_are_records() {
        assert!(is_record(Path::new("content/reading/sicp.md")));
        assert!(!is_record(Path::new("content/reading/cover.jpg")));
        assert!(!is_record(Path::new("content/reading/README")));
    }

    #[test]
    fn display_relative_strips_root() {
        let root = Path::new("/tmp/site");
        assert_eq!(
            display_relative(root, Path::new("/tmp/site/content/reading/a.md")),
            "content/reading/a.md"
        );
        assert_eq!(display_relative(root, Path::new("/elsewhere/b.md")), "/elsewhere/b.md");
    }
}
