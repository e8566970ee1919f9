use std::path::{Path, PathBuf};

use lead_config::PROJECT_DIR;

/// Walk upwards from `start` until a `.leads` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::find_project_root;

    #[test]
    fn finds_project_root_in_current_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".leads")).expect(".leads should create");

        let found = find_project_root(temp.path());
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn finds_project_root_from_nested_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".leads")).expect(".leads should create");
        let deep = temp.path().join("exports/2026/q3");
        std::fs::create_dir_all(&deep).expect("nested dirs should create");

        assert_eq!(find_project_root(&deep).as_deref(), Some(temp.path()));
    }

    #[test]
    fn a_leads_file_is_not_a_project() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join(".leads"), "").expect("file should write");

        assert!(find_project_root(temp.path()).is_none_or(|root| root != temp.path()));
    }
}
