//! Tag store and the `tags://` virtual paths.
//!
//! Tags live in one JSON object mapping absolute paths to tag lists.
//! `tags://` lists every known tag as a folder-like entry; `tags://<tag>`
//! lists the paths carrying that tag.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::listing::Entry;
use crate::special::SpecialPath;
use crate::storage;

pub const SCHEME: &str = "tags://";

/// Persistent path → tags mapping.
pub struct TagStore {
    tags: BTreeMap<String, Vec<String>>,
    db_path: PathBuf,
}

impl TagStore {
    pub fn default_path() -> PathBuf {
        storage::config_dir().join("tags.json")
    }

    /// Open the store at `db_path`, starting empty when the file is missing
    /// or unreadable.
    pub fn open(db_path: PathBuf) -> TagStore {
        let tags = fs::read_to_string(&db_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        TagStore { tags, db_path }
    }

    fn save(&self) {
        if let Some(parent) = self.db_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.tags) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.db_path, json) {
                    log::warn!("failed to save tags to {}: {err}", self.db_path.display());
                }
            }
            Err(err) => log::warn!("failed to serialize tags: {err}"),
        }
    }

    pub fn add(&mut self, path: &Path, tag: &str) {
        let key = path.to_string_lossy().into_owned();
        let tags = self.tags.entry(key).or_default();
        if tags.iter().any(|t| t == tag) {
            return;
        }
        tags.push(tag.to_string());
        self.save();
    }

    pub fn remove(&mut self, path: &Path, tag: &str) {
        let key = path.to_string_lossy().into_owned();
        if let Some(tags) = self.tags.get_mut(&key) {
            tags.retain(|t| t != tag);
            if tags.is_empty() {
                self.tags.remove(&key);
            }
            self.save();
        }
    }

    pub fn tags_for(&self, path: &Path) -> Vec<String> {
        self.tags
            .get(path.to_string_lossy().as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// All paths carrying `tag`, sorted.
    pub fn paths_for(&self, tag: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .tags
            .iter()
            .filter(|(_, tags)| tags.iter().any(|t| t == tag))
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Every distinct tag, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for tags in self.tags.values() {
            for tag in tags {
                if !all.contains(tag) {
                    all.push(tag.clone());
                }
            }
        }
        all.sort();
        all
    }
}

/// `tags://` — one folder-like entry per known tag.
pub struct TagsRoot<'a> {
    store: &'a TagStore,
}

impl<'a> TagsRoot<'a> {
    pub fn new(store: &'a TagStore) -> Self {
        Self { store }
    }
}

impl SpecialPath for TagsRoot<'_> {
    fn items(&self) -> Vec<Entry> {
        self.store
            .all_tags()
            .into_iter()
            .map(|tag| Entry {
                path: PathBuf::from(format!("{SCHEME}{tag}")),
                is_dir: true,
                group: String::new(),
                item_count: self.store.paths_for(&tag).len(),
                size: 0,
                modified: None,
                name: tag,
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
        "Tags".to_string()
    }
}

/// `tags://<tag>` — the paths carrying one tag. Vanished paths are skipped.
pub struct TagPath<'a> {
    tag: String,
    store: &'a TagStore,
}

impl<'a> TagPath<'a> {
    pub fn new(tag: &str, store: &'a TagStore) -> Self {
        Self {
            tag: tag.to_string(),
            store,
        }
    }
}

impl SpecialPath for TagPath<'_> {
    fn items(&self) -> Vec<Entry> {
        self.store
            .paths_for(&self.tag)
            .iter()
            .filter_map(|p| Entry::from_path(Path::new(p)))
            .collect()
    }

    fn path(&self) -> String {
        format!("{SCHEME}{}", self.tag)
    }

    fn parent_path(&self) -> String {
        SCHEME.to_string()
    }

    fn name(&self) -> String {
        self.tag.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> TagStore {
        TagStore::open(dir.join("tags.json"))
    }

    #[test]
    fn add_remove_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add(Path::new("/x/a.txt"), "work");
        store.add(Path::new("/x/a.txt"), "work"); // duplicate is a no-op
        store.add(Path::new("/x/b.txt"), "work");
        store.add(Path::new("/x/a.txt"), "keep");

        assert_eq!(store.tags_for(Path::new("/x/a.txt")), vec!["work", "keep"]);
        assert_eq!(store.paths_for("work"), vec!["/x/a.txt", "/x/b.txt"]);
        assert_eq!(store.all_tags(), vec!["keep", "work"]);

        store.remove(Path::new("/x/a.txt"), "work");
        assert_eq!(store.tags_for(Path::new("/x/a.txt")), vec!["keep"]);

        // Reload from disk.
        let store = store_in(dir.path());
        assert_eq!(store.paths_for("work"), vec!["/x/b.txt"]);
        assert_eq!(store.all_tags(), vec!["keep", "work"]);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.all_tags().is_empty());
    }

    #[test]
    fn tags_root_lists_tags_as_folders() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add(Path::new("/x/a.txt"), "work");
        store.add(Path::new("/x/b.txt"), "work");

        let root = TagsRoot::new(&store);
        let items = root.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "work");
        assert!(items[0].is_dir);
        assert_eq!(items[0].item_count, 2);
        assert_eq!(items[0].path, PathBuf::from("tags://work"));
        assert_eq!(items[0].group, "");
        assert_eq!(root.parent_path(), "");
    }

    #[test]
    fn tag_path_skips_vanished_entries() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        let real = dir.path().join("real.txt");
        std::fs::write(&real, "x").unwrap();
        store.add(&real, "work");
        store.add(Path::new("/gone/away.txt"), "work");

        let tag = TagPath::new("work", &store);
        let items = tag.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "real.txt");
        assert_eq!(tag.path(), "tags://work");
        assert_eq!(tag.parent_path(), "tags://");
    }
}
