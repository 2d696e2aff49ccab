//! Recently visited paths and the `recent://` virtual path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::listing::Entry;
use crate::special::SpecialPath;
use crate::storage;

pub const SCHEME: &str = "recent://";

/// Most-recently-used beyond this many entries are dropped.
pub const RECENT_CAP: usize = 100;

/// Persistent MRU list of absolute paths.
pub struct RecentStore {
    paths: Vec<String>,
    db_path: PathBuf,
}

impl RecentStore {
    pub fn default_path() -> PathBuf {
        storage::config_dir().join("recent.json")
    }

    /// Open the store at `db_path`, starting empty when the file is missing
    /// or unreadable.
    pub fn open(db_path: PathBuf) -> RecentStore {
        let paths = fs::read_to_string(&db_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        RecentStore { paths, db_path }
    }

    fn save(&self) {
        if let Some(parent) = self.db_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.paths) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.db_path, json) {
                    log::warn!(
                        "failed to save recent paths to {}: {err}",
                        self.db_path.display()
                    );
                }
            }
            Err(err) => log::warn!("failed to serialize recent paths: {err}"),
        }
    }

    /// Record a visit: de-duplicate by moving the path to the front, then
    /// trim to [`RECENT_CAP`].
    pub fn add(&mut self, path: &str) {
        if let Some(pos) = self.paths.iter().position(|p| p == path) {
            self.paths.remove(pos);
        }
        self.paths.insert(0, path.to_string());
        self.paths.truncate(RECENT_CAP);
        self.save();
    }

    /// Paths in most-recently-used order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// `recent://` — the MRU list, vanished paths skipped.
pub struct RecentPath<'a> {
    store: &'a RecentStore,
}

impl<'a> RecentPath<'a> {
    pub fn new(store: &'a RecentStore) -> Self {
        Self { store }
    }
}

impl SpecialPath for RecentPath<'_> {
    fn items(&self) -> Vec<Entry> {
        self.store
            .paths()
            .iter()
            .filter_map(|p| Entry::from_path(Path::new(p)))
            .collect()
    }

    fn path(&self) -> String {
        SCHEME.to_string()
    }

    fn parent_path(&self) -> String {
        String::new()
    }

    fn name(&self) -> String {
        "Recent".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> RecentStore {
        RecentStore::open(dir.join("recent.json"))
    }

    #[test]
    fn most_recent_first_with_move_to_front() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add("/a");
        store.add("/b");
        store.add("/c");
        store.add("/a"); // revisit moves to front, no duplicate
        assert_eq!(store.paths(), &["/a", "/c", "/b"]);

        let store = store_in(dir.path());
        assert_eq!(store.paths(), &["/a", "/c", "/b"]);
    }

    #[test]
    fn capped_at_one_hundred() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        for i in 0..110 {
            store.add(&format!("/p{}", i));
        }
        assert_eq!(store.paths().len(), RECENT_CAP);
        assert_eq!(store.paths()[0], "/p109");
        assert_eq!(store.paths()[RECENT_CAP - 1], "/p10");
    }

    #[test]
    fn provider_skips_vanished_paths() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        let real = dir.path().join("real.txt");
        std::fs::write(&real, "x").unwrap();
        store.add("/gone/away");
        store.add(real.to_string_lossy().as_ref());

        let provider = RecentPath::new(&store);
        let items = provider.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "real.txt");
        assert_eq!(provider.name(), "Recent");
        assert_eq!(provider.parent_path(), "");
    }
}
