//! Directory listing for package discovery.
//!
//! The scanner returns raw entry names. Deciding which entries are package
//! directories is left to the caller.

use camino::Utf8Path;
use log::{trace, warn};

/// List the entries of `path`, skipping dotfiles.
///
/// Equivalent to [`list_entries`] with no exclusions and `skip_dotfiles`
/// enabled.
#[must_use]
pub fn list_dir(path: &Utf8Path) -> Vec<String> {
    list_entries(path, &[], true)
}

/// List the entry names of a directory.
///
/// Names appear in the order the filesystem enumerates them. When
/// `skip_dotfiles` is set, names starting with `.` are dropped; any name in
/// `exclude` is removed afterwards without disturbing the order of the rest.
///
/// A missing path or a path that is not a directory yields an empty list.
/// Entries whose names are not valid UTF-8 are skipped.
///
/// # Examples
///
/// ```
/// use app_builder::scanner::list_entries;
/// use camino::Utf8Path;
///
/// assert!(list_entries(Utf8Path::new("/nonexistent/path"), &[], true).is_empty());
/// ```
#[must_use]
pub fn list_entries(path: &Utf8Path, exclude: &[&str], skip_dotfiles: bool) -> Vec<String> {
    if !path.is_dir() {
        trace!("{path} is not a directory; nothing to list");
        return Vec::new();
    }

    let entries = match path.read_dir_utf8() {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read directory {path}: {err}");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {path}: {err}");
                continue;
            }
        };

        let name = entry.file_name();
        if skip_dotfiles && name.starts_with('.') {
            continue;
        }
        names.push(name.to_owned());
    }

    if !exclude.is_empty() {
        names.retain(|name| !exclude.contains(&name.as_str()));
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Populated {
        _temp: TempDir,
        root: camino::Utf8PathBuf,
    }

    #[fixture]
    fn populated() -> Populated {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = Utf8Path::from_path(temp.path())
            .expect("non-UTF8 path")
            .to_owned();
        fs::create_dir(root.join("alpha")).expect("create alpha");
        fs::create_dir(root.join(".git")).expect("create .git");
        fs::write(root.join("notes.txt"), b"x").expect("write notes");
        fs::write(root.join(".DS_Store"), b"x").expect("write .DS_Store");
        Populated { _temp: temp, root }
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[rstest]
    fn lists_files_and_directories_without_dotfiles(populated: Populated) {
        let names = sorted(list_dir(&populated.root));
        assert_eq!(names, vec!["alpha", "notes.txt"]);
    }

    #[rstest]
    fn keeps_dotfiles_when_asked(populated: Populated) {
        let names = sorted(list_entries(&populated.root, &[], false));
        assert_eq!(names, vec![".DS_Store", ".git", "alpha", "notes.txt"]);
    }

    #[rstest]
    #[case::single(&["notes.txt"], &["alpha"])]
    #[case::all(&["notes.txt", "alpha"], &[])]
    #[case::unknown(&["missing"], &["alpha", "notes.txt"])]
    fn exclude_set_is_removed(
        populated: Populated,
        #[case] exclude: &[&str],
        #[case] expected: &[&str],
    ) {
        let names = sorted(list_entries(&populated.root, exclude, true));
        assert_eq!(names, expected);
    }

    #[rstest]
    fn exclusion_preserves_enumeration_order(populated: Populated) {
        let all = list_dir(&populated.root);
        let filtered = list_entries(&populated.root, &["notes.txt"], true);
        let expected: Vec<String> = all.into_iter().filter(|n| n != "notes.txt").collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn missing_path_yields_empty_list() {
        assert!(list_dir(Utf8Path::new("/nonexistent/app-builder/path")).is_empty());
    }

    #[rstest]
    fn file_path_yields_empty_list(populated: Populated) {
        assert!(list_dir(&populated.root.join("notes.txt")).is_empty());
    }
}
