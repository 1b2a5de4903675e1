use crate::domain::constants::{CONFLICT_OURS, CONFLICT_THEIRS};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerState {
    Missing,
    Unreadable(String),
    Single(String),
    MultiLine(Vec<String>),
}

pub fn read_marker(path: &Path) -> MarkerState {
    if !path.exists() {
        return MarkerState::Missing;
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return MarkerState::Unreadable(e.to_string()),
    };
    let lines: Vec<String> = raw.trim().lines().map(str::to_string).collect();
    match lines.as_slice() {
        [] => MarkerState::Single(String::new()),
        [name] => MarkerState::Single(name.clone()),
        _ => MarkerState::MultiLine(lines),
    }
}

pub fn find_conflict_names<S: AsRef<str>>(lines: &[S]) -> Option<(String, String)> {
    if lines.len() <= 1 {
        return None;
    }
    let first = lines[0].as_ref();
    let last = lines[lines.len() - 1].as_ref();
    if !first.starts_with(CONFLICT_OURS) || !last.starts_with(CONFLICT_THEIRS) {
        return None;
    }
    Some((
        lines[1].as_ref().trim().to_string(),
        lines[lines.len() - 2].as_ref().trim().to_string(),
    ))
}

/// Normalizes file-order names to `(merged, rebased)`.
///
/// During a rebase the upstream side is written first; during a merge the
/// current branch is, so the pair swaps.
pub fn orient(names: (String, String), merging: bool) -> (String, String) {
    let (first, second) = names;
    if merging {
        (second, first)
    } else {
        (first, second)
    }
}

pub fn write_marker(path: &Path, name: &str) -> std::io::Result<()> {
    std::fs::write(path, format!("{}\n", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn none_without_a_block() {
        assert_eq!(find_conflict_names::<&str>(&[]), None);
        assert_eq!(find_conflict_names(&["not_a_marker", "0002_a"]), None);
        assert_eq!(find_conflict_names(&["<<<<<<<", "0002_a"]), None);
        assert_eq!(find_conflict_names(&["<<<<<<< HEAD"]), None);
    }

    #[test]
    fn two_way_block() {
        let lines = [
            "<<<<<<< HEAD",
            "0002_author_nicknames",
            "=======",
            "0002_longer_titles",
            ">>>>>>> 123456789 (Increase Book title length)",
        ];
        assert_eq!(
            find_conflict_names(&lines),
            Some((
                "0002_author_nicknames".to_string(),
                "0002_longer_titles".to_string()
            ))
        );
    }

    #[test]
    fn three_way_block_skips_base() {
        let lines = [
            "<<<<<<<",
            "0002_author_nicknames",
            "||||||| merged common ancestors",
            "0001_initial",
            "=======",
            "0002_longer_titles",
            ">>>>>>>",
        ];
        assert_eq!(
            find_conflict_names(&lines),
            Some((
                "0002_author_nicknames".to_string(),
                "0002_longer_titles".to_string()
            ))
        );
    }

    #[test]
    fn merge_swaps_orientation() {
        let names = ("0002_longer_titles".to_string(), "0002_author_nicknames".to_string());
        assert_eq!(
            orient(names.clone(), true),
            (
                "0002_author_nicknames".to_string(),
                "0002_longer_titles".to_string()
            )
        );
        assert_eq!(orient(names.clone(), false), names);
    }

    #[test]
    fn read_marker_states() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("max_migration.txt");
        assert_eq!(read_marker(&path), MarkerState::Missing);

        std::fs::write(&path, "0001_initial\n").unwrap();
        assert_eq!(read_marker(&path), MarkerState::Single("0001_initial".into()));

        std::fs::write(&path, "\n  \n").unwrap();
        assert_eq!(read_marker(&path), MarkerState::Single(String::new()));

        std::fs::write(&path, "line1\nline2\n").unwrap();
        assert!(matches!(read_marker(&path), MarkerState::MultiLine(l) if l.len() == 2));

        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_marker(&path), MarkerState::Unreadable(_)));

        write_marker(&path, "0003_b").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0003_b\n");
    }
}
