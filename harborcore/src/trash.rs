//! XDG trash integration and the `trash://` virtual path.
//!
//! Listing reads the freedesktop trash directory's `info/*.trashinfo`
//! records. Deletion shells out to `gio trash` on a background thread; the
//! completion event is sent back over a channel and drained by the UI loop,
//! which then refreshes the listing.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::Sender;

use crate::listing::Entry;
use crate::special::SpecialPath;
use crate::storage;

pub const SCHEME: &str = "trash://";

/// One trashed file, as recorded by its `.trashinfo` sidecar.
#[derive(Debug, Clone, PartialEq)]
pub struct TrashItem {
    pub name: String,
    pub original_path: PathBuf,
    pub deleted_at: String,
}

fn trash_dir() -> PathBuf {
    storage::data_dir().join("Trash")
}

/// All trashed items; an unreadable or missing trash directory reads as
/// empty.
pub fn items() -> Vec<TrashItem> {
    items_in(&trash_dir())
}

fn items_in(trash_dir: &Path) -> Vec<TrashItem> {
    let info_dir = trash_dir.join("info");
    let rd = match fs::read_dir(&info_dir) {
        Ok(rd) => rd,
        Err(_) => return Vec::new(),
    };
    let mut items = Vec::new();
    for entry in rd.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(name) = file_name.strip_suffix(".trashinfo") else {
            continue;
        };
        if let Ok(text) = fs::read_to_string(entry.path()) {
            if let Some(item) = parse_trash_info(name, &text) {
                items.push(item);
            }
        }
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

/// Look up one trashed item by the name shown in the `trash://` listing.
pub fn item_info(name: &str) -> Option<TrashItem> {
    let info_path = trash_dir().join("info").join(format!("{name}.trashinfo"));
    let text = fs::read_to_string(info_path).ok()?;
    parse_trash_info(name, &text)
}

/// Parse a `.trashinfo` record: a `[Trash Info]` section with
/// percent-encoded `Path=` and `DeletionDate=` lines.
fn parse_trash_info(name: &str, text: &str) -> Option<TrashItem> {
    let mut lines = text.lines();
    if lines.next()?.trim() != "[Trash Info]" {
        return None;
    }
    let mut original_path = None;
    let mut deleted_at = String::new();
    for line in lines {
        if let Some(value) = line.strip_prefix("Path=") {
            original_path = Some(PathBuf::from(percent_decode(value)));
        } else if let Some(value) = line.strip_prefix("DeletionDate=") {
            deleted_at = value.to_string();
        }
    }
    Some(TrashItem {
        name: name.to_string(),
        original_path: original_path?,
        deleted_at,
    })
}

/// Decode the percent-encoding used by trashinfo `Path=` values. Malformed
/// escapes pass through untouched.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// `trash://` — trashed items by name. These entries point back into the
/// virtual path, not the filesystem; activation and paste are no-ops.
pub struct TrashPath;

impl SpecialPath for TrashPath {
    fn items(&self) -> Vec<Entry> {
        items()
            .into_iter()
            .map(|item| Entry {
                path: PathBuf::from(format!("{SCHEME}{}", item.name)),
                is_dir: false,
                group: String::new(),
                item_count: 0,
                size: 0,
                modified: None,
                name: item.name,
            })
            .collect()
    }

    fn path(&self) -> String {
        SCHEME.to_string()
    }

    fn parent_path(&self) -> String {
        String::new()
    }

    fn name(&self) -> String {
        "Trash".to_string()
    }
}

/// Completion signal for a background trash deletion.
#[derive(Debug)]
pub struct TrashEvent {
    pub path: PathBuf,
    pub ok: bool,
}

/// Move `path` to the trash via `gio trash` on a background thread. The
/// completion event lands on `tx`; the UI loop drains it and refreshes.
/// Failures are logged and otherwise silent.
pub fn spawn_move_to_trash(path: PathBuf, tx: Sender<TrashEvent>) {
    std::thread::spawn(move || {
        let ok = match Command::new("gio").arg("trash").arg(&path).status() {
            Ok(status) => status.success(),
            Err(err) => {
                log::warn!("gio trash failed for {}: {err}", path.display());
                false
            }
        };
        if !ok {
            log::warn!("could not move {} to trash", path.display());
        }
        let _ = tx.send(TrashEvent { path, ok });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "[Trash Info]\nPath=/home/user/old%20notes.txt\nDeletionDate=2026-03-14T15:00:00\n";

    #[test]
    fn parses_trashinfo_records() {
        let item = parse_trash_info("old notes.txt", SAMPLE).unwrap();
        assert_eq!(item.name, "old notes.txt");
        assert_eq!(
            item.original_path,
            PathBuf::from("/home/user/old notes.txt")
        );
        assert_eq!(item.deleted_at, "2026-03-14T15:00:00");
    }

    #[test]
    fn rejects_records_without_header_or_path() {
        assert_eq!(parse_trash_info("x", "Path=/a\n"), None);
        assert_eq!(parse_trash_info("x", "[Trash Info]\nDeletionDate=now\n"), None);
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("/a%20b/c"), "/a b/c");
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("bad%2"), "bad%2");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn lists_info_directory() {
        let dir = tempdir().unwrap();
        let info = dir.path().join("info");
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join("a.txt.trashinfo"), SAMPLE).unwrap();
        fs::write(info.join("ignored.other"), "x").unwrap();
        let items = items_in(dir.path());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a.txt");
    }

    #[test]
    fn missing_trash_reads_empty() {
        let dir = tempdir().unwrap();
        assert!(items_in(&dir.path().join("nope")).is_empty());
    }
}
