//! Virtual paths: `trash://`, `tags://[tag]`, `recent://`.
//!
//! When the current path matches one of these schemes, listing is delegated
//! entirely to a provider; the filter/sort/group pipeline does not apply to
//! provider output, and write operations (paste, create, rename) are
//! rejected by the owner.

use crate::listing::Entry;
use crate::recent::{self, RecentPath, RecentStore};
use crate::tags::{self, TagPath, TagStore, TagsRoot};
use crate::trash::{self, TrashPath};

/// A non-filesystem pseudo-directory.
pub trait SpecialPath {
    /// Already-final entries; no filtering, sorting or grouping applies.
    fn items(&self) -> Vec<Entry>;
    fn path(&self) -> String;
    /// Empty when the provider has no parent (navigation stays put).
    fn parent_path(&self) -> String;
    fn name(&self) -> String;
}

/// Owns the tag and recent stores and resolves paths to providers.
pub struct SpecialPathManager {
    tags: TagStore,
    recent: RecentStore,
}

impl Default for SpecialPathManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialPathManager {
    /// Open the stores at their default locations under the config dir.
    pub fn new() -> Self {
        Self {
            tags: TagStore::open(TagStore::default_path()),
            recent: RecentStore::open(RecentStore::default_path()),
        }
    }

    /// Build a manager over explicit stores (tests, alternate locations).
    pub fn with_stores(tags: TagStore, recent: RecentStore) -> Self {
        Self { tags, recent }
    }

    /// Whether `path` names a virtual location rather than a directory.
    pub fn is_special(path: &str) -> bool {
        path.starts_with(tags::SCHEME)
            || path.starts_with(trash::SCHEME)
            || path.starts_with(recent::SCHEME)
    }

    /// Resolve a path to its provider; `None` for filesystem paths.
    pub fn resolve(&self, path: &str) -> Option<Box<dyn SpecialPath + '_>> {
        if let Some(rest) = path.strip_prefix(tags::SCHEME) {
            let tag = rest.split('/').next().unwrap_or("");
            if !tag.is_empty() {
                return Some(Box::new(TagPath::new(tag, &self.tags)));
            }
            return Some(Box::new(TagsRoot::new(&self.tags)));
        }
        if path.starts_with(trash::SCHEME) {
            return Some(Box::new(TrashPath));
        }
        if path.starts_with(recent::SCHEME) {
            return Some(Box::new(RecentPath::new(&self.recent)));
        }
        None
    }

    /// Record a visited filesystem path in the recent list.
    pub fn add_recent(&mut self, path: &str) {
        self.recent.add(path);
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagStore {
        &mut self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn manager() -> (tempfile::TempDir, SpecialPathManager) {
        let dir = tempdir().unwrap();
        let tags = TagStore::open(dir.path().join("tags.json"));
        let recent = RecentStore::open(dir.path().join("recent.json"));
        (dir, SpecialPathManager::with_stores(tags, recent))
    }

    #[test]
    fn scheme_detection() {
        assert!(SpecialPathManager::is_special("trash://"));
        assert!(SpecialPathManager::is_special("tags://work"));
        assert!(SpecialPathManager::is_special("recent://"));
        assert!(!SpecialPathManager::is_special("/home/user"));
        assert!(!SpecialPathManager::is_special("trash"));
    }

    #[test]
    fn resolves_each_scheme() {
        let (_dir, manager) = manager();
        assert_eq!(manager.resolve("trash://").unwrap().name(), "Trash");
        assert_eq!(manager.resolve("recent://").unwrap().name(), "Recent");
        assert_eq!(manager.resolve("tags://").unwrap().name(), "Tags");
        assert_eq!(manager.resolve("tags://work").unwrap().name(), "work");
        assert!(manager.resolve("/home/user").is_none());
    }

    #[test]
    fn tag_provider_parents_chain_to_the_root() {
        let (_dir, manager) = manager();
        let provider = manager.resolve("tags://work").unwrap();
        assert_eq!(provider.path(), "tags://work");
        assert_eq!(provider.parent_path(), "tags://");
        let root = manager.resolve("tags://").unwrap();
        assert_eq!(root.parent_path(), "");
    }

    #[test]
    fn recent_visits_flow_into_the_provider() {
        let dir = tempdir().unwrap();
        let tags = TagStore::open(dir.path().join("tags.json"));
        let recent = RecentStore::open(dir.path().join("recent.json"));
        let mut manager = SpecialPathManager::with_stores(tags, recent);

        let visited = dir.path().join("visited");
        std::fs::create_dir(&visited).unwrap();
        manager.add_recent(visited.to_string_lossy().as_ref());
        manager.add_recent("/gone");

        let items = manager.resolve("recent://").unwrap().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, visited);
        assert!(items[0].is_dir);
    }

    #[test]
    fn tag_store_is_reachable_for_the_tag_dialog() {
        let (_dir, mut manager) = manager();
        manager.tags_mut().add(Path::new("/x/a.txt"), "work");
        assert_eq!(manager.tags().all_tags(), vec!["work"]);
        let items = manager.resolve("tags://").unwrap().items();
        assert_eq!(items[0].name, "work");
    }
}
