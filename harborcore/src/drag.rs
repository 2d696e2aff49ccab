//! Inter-instance drag state.
//!
//! A drag writes the dragged file URIs to a temp file; another harbor
//! window can read them to accept the drop. The state file expires after
//! 30 seconds so an aborted drag cannot linger.

use std::fs;
use std::path::{Path, PathBuf};

fn drag_state_path() -> PathBuf {
    std::env::temp_dir().join("harbor_drag_state.txt")
}

/// `file://` URI for a path, the payload a drag carries.
pub fn uri_for(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Begin a drag carrying `paths`.
pub fn start_drag(paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    let content: Vec<String> = paths.iter().map(|p| uri_for(p)).collect();
    let _ = fs::write(drag_state_path(), content.join("\n"));
}

/// End or cancel the drag.
pub fn end_drag() {
    let _ = fs::remove_file(drag_state_path());
}

/// Paths of an active drag, `None` when no fresh drag state exists.
pub fn active_drag_paths() -> Option<Vec<PathBuf>> {
    let state = drag_state_path();
    let meta = fs::metadata(&state).ok()?;
    if let Ok(modified) = meta.modified() {
        if let Ok(elapsed) = modified.elapsed() {
            if elapsed.as_secs() > 30 {
                let _ = fs::remove_file(&state);
                return None;
            }
        }
    }

    let content = fs::read_to_string(&state).ok()?;
    let paths: Vec<PathBuf> = content
        .lines()
        .filter_map(|l| l.strip_prefix("file://"))
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .collect();
    if paths.is_empty() {
        None
    } else {
        Some(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_payload() {
        assert_eq!(uri_for(Path::new("/x/a b.txt")), "file:///x/a b.txt");
    }

    #[test]
    fn drag_state_roundtrip() {
        // Uses the real temp dir; the single writer below is this test.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dragged.txt");
        fs::write(&file, "x").unwrap();

        start_drag(&[file.clone()]);
        let paths = active_drag_paths().expect("drag should be active");
        assert_eq!(paths, vec![file]);

        end_drag();
        assert!(active_drag_paths().is_none());
    }
}
