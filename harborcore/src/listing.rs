//! Directory listing: classification, filtering, sorting, grouping.
//!
//! `list` is the one pipeline behind both the main viewer and the directory
//! preview: read the directory, drop entries the search text or the filter
//! set excludes, sort by name or by modification time, and stamp every
//! surviving entry with its display group. The pipeline is pure apart from
//! the directory reads; running it twice against an unchanged directory
//! yields an identical sequence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("cannot read directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    ByName,
    ByTime,
}

/// One item of a listing, ready for display. Entries are immutable
/// snapshots: a changed directory produces a whole new sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    /// Full path used for every operation (open, navigate, copy, tag).
    pub path: PathBuf,
    pub is_dir: bool,
    /// Display group: an initial letter under name sort, a recency bucket
    /// under time sort, empty for provider-produced entries (no headers).
    pub group: String,
    /// Immediate child count, directories only, 0 when unreadable.
    pub item_count: usize,
    /// Byte size, files only.
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Build an entry for an arbitrary path by stat'ing it. Used by the
    /// virtual-path providers, whose output carries no group headers.
    /// Returns `None` when the path no longer exists.
    pub fn from_path(path: &Path) -> Option<Entry> {
        let meta = fs::metadata(path).ok()?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        let is_dir = meta.is_dir();
        Some(Entry {
            name,
            path: path.to_path_buf(),
            is_dir,
            group: String::new(),
            item_count: if is_dir { dir_item_count(path) } else { 0 },
            size: if is_dir { 0 } else { meta.len() },
            modified: meta.modified().ok(),
        })
    }
}

/// Classification of a raw directory entry, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Name starts with `.`.
    Hidden,
    /// Name starts with `~`; excluded from every filter, never shown.
    Temp,
    Directory,
    /// No extension and at least one executable permission bit.
    Executable,
    /// Lower-cased extension bucket.
    Extension(String),
    /// No extension, not executable: belongs to no bucket, never shown.
    Plain,
}

pub const FILTER_DIRECTORIES: &str = "Directories";
pub const FILTER_EXECUTABLES: &str = "Executables";
pub const FILTER_HIDDEN: &str = "Hidden";

/// Enabled/disabled state per filter key. Keys are the synthetic
/// `Directories` / `Executables` / `Hidden` entries plus one key per
/// extension present in the directory at derivation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    enabled: BTreeMap<String, bool>,
    synthetic: Vec<&'static str>,
    extensions: Vec<String>,
}

impl FilterSet {
    /// Synthetic keys present in this set, in fixed order.
    pub fn synthetic_keys(&self) -> &[&'static str] {
        &self.synthetic
    }

    /// Extension keys present in this set, lexicographically sorted.
    pub fn extension_keys(&self) -> &[String] {
        &self.extensions
    }

    /// Unknown keys read as disabled.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled.get(key).copied().unwrap_or(false)
    }

    pub fn set_enabled(&mut self, key: &str, on: bool) {
        if let Some(slot) = self.enabled.get_mut(key) {
            *slot = on;
        }
    }

    /// Whether an entry of the given kind passes this filter set.
    pub fn allows(&self, kind: &FileKind) -> bool {
        match kind {
            FileKind::Hidden => self.is_enabled(FILTER_HIDDEN),
            FileKind::Temp => false,
            FileKind::Directory => self.is_enabled(FILTER_DIRECTORIES),
            FileKind::Executable => self.is_enabled(FILTER_EXECUTABLES),
            FileKind::Extension(ext) => self.is_enabled(ext),
            FileKind::Plain => false,
        }
    }

    fn derive(raw: &[Raw]) -> FilterSet {
        let mut extensions: Vec<String> = Vec::new();
        let mut has_dir = false;
        let mut has_exec = false;
        let mut has_hidden = false;

        for r in raw {
            match classify(&r.name, r.is_dir, r.executable) {
                FileKind::Hidden => has_hidden = true,
                FileKind::Temp | FileKind::Plain => {}
                FileKind::Directory => has_dir = true,
                FileKind::Executable => has_exec = true,
                FileKind::Extension(ext) => {
                    if !extensions.contains(&ext) {
                        extensions.push(ext);
                    }
                }
            }
        }
        extensions.sort();

        let mut set = FilterSet::default();
        if has_dir {
            set.synthetic.push(FILTER_DIRECTORIES);
            set.enabled.insert(FILTER_DIRECTORIES.to_string(), true);
        }
        if has_exec {
            set.synthetic.push(FILTER_EXECUTABLES);
            set.enabled.insert(FILTER_EXECUTABLES.to_string(), true);
        }
        if has_hidden {
            set.synthetic.push(FILTER_HIDDEN);
            set.enabled.insert(FILTER_HIDDEN.to_string(), false);
        }
        for ext in &extensions {
            set.enabled.insert(ext.clone(), true);
        }
        set.extensions = extensions;
        set
    }
}

/// Inputs to one `list` run. The filter set is derived separately (only on
/// directory change) and passed in here on every run.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions<'a> {
    pub sort_order: SortOrder,
    pub search: &'a str,
    pub filters: &'a FilterSet,
}

/// Raw directory entry before filtering: just the metadata the pipeline
/// needs, collected in a single pass over `read_dir`.
#[derive(Debug, Clone)]
struct Raw {
    name: String,
    path: PathBuf,
    is_dir: bool,
    executable: bool,
    size: u64,
    modified: Option<SystemTime>,
}

fn scan(path: &Path) -> Result<Vec<Raw>, ListError> {
    let rd = fs::read_dir(path).map_err(|source| ListError::DirectoryUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut raw = Vec::new();
    for entry in rd.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata().ok();
        let is_dir = meta.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        raw.push(Raw {
            name,
            path: entry.path(),
            is_dir,
            executable: meta.as_ref().map(|m| is_executable(m)).unwrap_or(false),
            size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
            modified: meta.and_then(|m| m.modified().ok()),
        });
    }
    Ok(raw)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

/// Derive a fresh filter set from the directory's current contents.
/// Called when the directory changes, never on search or sort toggles;
/// previously toggled filter states are discarded.
pub fn derive_filters(path: &Path) -> Result<FilterSet, ListError> {
    Ok(FilterSet::derive(&scan(path)?))
}

/// List a directory: filter, sort and group per `options`.
pub fn list(path: &Path, options: &ListOptions) -> Result<Vec<Entry>, ListError> {
    Ok(build(scan(path)?, options))
}

/// Classification precedence, first match wins.
pub fn classify(name: &str, is_dir: bool, executable: bool) -> FileKind {
    if name.starts_with('.') {
        return FileKind::Hidden;
    }
    if name.starts_with('~') {
        return FileKind::Temp;
    }
    if is_dir {
        return FileKind::Directory;
    }
    let ext = extension_of(name);
    if ext.is_empty() {
        if executable {
            return FileKind::Executable;
        }
        return FileKind::Plain;
    }
    FileKind::Extension(ext)
}

/// Lower-cased extension including nothing for dotless names. A leading dot
/// alone (`.bashrc`) is not an extension, but that case never reaches here:
/// dot-prefixed names classify as hidden first.
fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => name[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// The pure tail of the pipeline, separated from the directory read so the
/// filter/sort/group behavior is testable against synthetic input.
fn build(raw: Vec<Raw>, options: &ListOptions) -> Vec<Entry> {
    let search = options.search.to_lowercase();

    let mut kept: Vec<(Raw, String)> = raw
        .into_iter()
        .filter(|r| {
            if !search.is_empty() && !r.name.to_lowercase().starts_with(&search) {
                return false;
            }
            options
                .filters
                .allows(&classify(&r.name, r.is_dir, r.executable))
        })
        .map(|r| {
            let key = title_key(&r.name);
            (r, key)
        })
        .collect();

    match options.sort_order {
        SortOrder::ByName => {
            kept.sort_by(|(a, ka), (b, kb)| {
                ka.cmp(kb)
                    .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
            });
        }
        SortOrder::ByTime => {
            // Unreadable mtimes read as the epoch so they sort last under
            // newest-first; equal timestamps fall back to the name key.
            kept.sort_by(|(a, ka), (b, kb)| {
                let ta = a.modified.unwrap_or(UNIX_EPOCH);
                let tb = b.modified.unwrap_or(UNIX_EPOCH);
                tb.cmp(&ta)
                    .then_with(|| ka.cmp(kb))
                    .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
            });
        }
    }

    let now = Local::now();
    kept.into_iter()
        .map(|(r, key)| {
            let group = match options.sort_order {
                SortOrder::ByName => key.chars().next().map(String::from).unwrap_or_default(),
                SortOrder::ByTime => {
                    time_group(r.modified.unwrap_or(UNIX_EPOCH), now).to_string()
                }
            };
            Entry {
                item_count: if r.is_dir { dir_item_count(&r.path) } else { 0 },
                size: if r.is_dir { 0 } else { r.size },
                name: r.name,
                path: r.path,
                is_dir: r.is_dir,
                group,
                modified: r.modified,
            }
        })
        .collect()
}

/// Title-cased sort key: the first letter of every word upper-cased, the
/// rest untouched. The first character of this key is also the name-sort
/// group, so multi-byte initials group as one character, not one byte.
fn title_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut boundary = true;
    for ch in name.chars() {
        if boundary && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        boundary = !ch.is_alphabetic();
    }
    out
}

/// Recency bucket for time-sorted listings. "Today" wins over the 24-hour
/// bucket even when both match.
fn time_group(modified: SystemTime, now: DateTime<Local>) -> &'static str {
    let m: DateTime<Local> = modified.into();
    if m.date_naive() >= now.date_naive() {
        return "Today";
    }
    let hours = (now - m).num_hours();
    if hours <= 24 {
        "Last 24 hours"
    } else if hours <= 24 * 7 {
        "Last Week"
    } else if hours <= 24 * 30 {
        "Last Month"
    } else {
        "Later"
    }
}

/// Shallow child count for a directory entry; unreadable reads as 0.
pub fn dir_item_count(path: &Path) -> usize {
    match fs::read_dir(path) {
        Ok(rd) => rd.count(),
        Err(_) => 0,
    }
}

/// Byte size formatted for display.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn raw(name: &str, is_dir: bool, executable: bool) -> Raw {
        Raw {
            name: name.to_string(),
            path: PathBuf::from("/t").join(name),
            is_dir,
            executable,
            size: 0,
            modified: None,
        }
    }

    fn filters_for(raws: &[Raw]) -> FilterSet {
        FilterSet::derive(raws)
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn classify_precedence() {
        assert_eq!(classify(".git", true, false), FileKind::Hidden);
        assert_eq!(classify("~lock.txt", false, false), FileKind::Temp);
        assert_eq!(classify("src", true, true), FileKind::Directory);
        assert_eq!(classify("run", false, true), FileKind::Executable);
        assert_eq!(
            classify("Readme.MD", false, false),
            FileKind::Extension("md".into())
        );
        assert_eq!(classify("LICENSE", false, false), FileKind::Plain);
    }

    #[test]
    fn derive_defaults() {
        let raws = vec![
            raw("src", true, false),
            raw(".hidden", false, false),
            raw("run", false, true),
            raw("b.TXT", false, false),
            raw("a.md", false, false),
        ];
        let set = filters_for(&raws);
        assert_eq!(
            set.synthetic_keys(),
            &[FILTER_DIRECTORIES, FILTER_EXECUTABLES, FILTER_HIDDEN]
        );
        assert_eq!(set.extension_keys(), &["md".to_string(), "txt".to_string()]);
        assert!(set.is_enabled(FILTER_DIRECTORIES));
        assert!(set.is_enabled(FILTER_EXECUTABLES));
        assert!(!set.is_enabled(FILTER_HIDDEN));
        assert!(set.is_enabled("md"));
        assert!(set.is_enabled("txt"));
        assert!(!set.is_enabled("rs"));
    }

    #[test]
    fn name_sort_and_letter_groups() {
        let raws = vec![
            raw("b.txt", false, false),
            raw("A.txt", false, false),
            raw(".hidden", false, false),
        ];
        let filters = filters_for(&raws);
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = build(raws.clone(), &opts);
        assert_eq!(names(&entries), vec!["A.txt", "b.txt"]);
        assert_eq!(entries[0].group, "A");
        assert_eq!(entries[1].group, "B");
    }

    #[test]
    fn hidden_filter_reveals_dot_files() {
        let raws = vec![
            raw("b.txt", false, false),
            raw("A.txt", false, false),
            raw(".hidden", false, false),
        ];
        let mut filters = filters_for(&raws);
        filters.set_enabled(FILTER_HIDDEN, true);
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = build(raws, &opts);
        assert_eq!(names(&entries), vec![".hidden", "A.txt", "b.txt"]);
        // Title-casing leaves the dot in front, so the file groups under it.
        assert_eq!(entries[0].group, ".");
    }

    #[test]
    fn search_is_case_insensitive_prefix() {
        let raws = vec![
            raw("Makefile.txt", false, false),
            raw("main.rs", false, false),
            raw("notes.txt", false, false),
        ];
        let filters = filters_for(&raws);
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "ma",
            filters: &filters,
        };
        let entries = build(raws, &opts);
        assert_eq!(names(&entries), vec!["main.rs", "Makefile.txt"]);
    }

    #[test]
    fn filtering_is_a_subset_of_classified_input() {
        let raws = vec![
            raw("src", true, false),
            raw(".env", false, false),
            raw("~swap", false, false),
            raw("tool", false, true),
            raw("LICENSE", false, false),
            raw("doc.pdf", false, false),
        ];
        let filters = filters_for(&raws);
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = build(raws.clone(), &opts);
        let input_names: Vec<&str> = raws.iter().map(|r| r.name.as_str()).collect();
        for e in &entries {
            assert!(input_names.contains(&e.name.as_str()));
            let r = raws.iter().find(|r| r.name == e.name).unwrap();
            assert!(filters.allows(&classify(&r.name, r.is_dir, r.executable)));
        }
        // Temp and plain entries never appear, hidden is off by default.
        assert_eq!(names(&entries), vec!["doc.pdf", "src", "tool"]);
    }

    #[test]
    fn groups_are_contiguous() {
        let raws = vec![
            raw("apple", true, false),
            raw("axe.txt", false, false),
            raw("banana", true, false),
            raw("berry.txt", false, false),
            raw("cherry.txt", false, false),
        ];
        let filters = filters_for(&raws);
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = build(raws, &opts);
        let mut seen: Vec<&str> = Vec::new();
        for e in &entries {
            match seen.last() {
                Some(&last) if last == e.group => {}
                _ => {
                    assert!(
                        !seen.contains(&e.group.as_str()),
                        "group {} reappears after closing",
                        e.group
                    );
                    seen.push(&e.group);
                }
            }
        }
    }

    #[test]
    fn time_sort_is_newest_first_with_total_order() {
        let base = UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let mut old = raw("old.txt", false, false);
        old.modified = Some(base);
        let mut new = raw("new.txt", false, false);
        new.modified = Some(base + std::time::Duration::from_secs(3600));
        let unknown = raw("unknown.txt", false, false); // modified: None
        let raws = vec![old, unknown, new];
        let filters = filters_for(&raws);
        let opts = ListOptions {
            sort_order: SortOrder::ByTime,
            search: "",
            filters: &filters,
        };
        let entries = build(raws, &opts);
        assert_eq!(names(&entries), vec!["new.txt", "old.txt", "unknown.txt"]);
    }

    #[test]
    fn time_groups() {
        use chrono::TimeZone;
        let now = Local.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap();
        let at = |h: i64| {
            let t: DateTime<Local> = now - chrono::Duration::hours(h);
            SystemTime::from(t)
        };
        assert_eq!(time_group(at(1), now), "Today");
        // 20 hours ago is yesterday evening: inside 24h but not today.
        assert_eq!(time_group(at(20), now), "Last 24 hours");
        assert_eq!(time_group(at(30), now), "Last Week");
        assert_eq!(time_group(at(24 * 10), now), "Last Month");
        assert_eq!(time_group(at(24 * 40), now), "Later");
        assert_eq!(time_group(UNIX_EPOCH, now), "Later");
    }

    #[test]
    fn listing_a_real_directory_is_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["b.txt", "A.txt", ".hidden", "notes.md"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            writeln!(f, "x").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("child")).unwrap();

        let filters = derive_filters(dir.path()).unwrap();
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let first = list(dir.path(), &opts).unwrap();
        let second = list(dir.path(), &opts).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["A.txt", "b.txt", "notes.md", "sub"]);
        let sub = first.iter().find(|e| e.name == "sub").unwrap();
        assert!(sub.is_dir);
        assert_eq!(sub.item_count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_classifies_extensionless_files() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let tool = dir.path().join("tool");
        File::create(&tool).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        File::create(dir.path().join("LICENSE")).unwrap();

        let filters = derive_filters(dir.path()).unwrap();
        assert!(filters.is_enabled(FILTER_EXECUTABLES));
        let opts = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = list(dir.path(), &opts).unwrap();
        // The extensionless non-executable file belongs to no bucket.
        assert_eq!(names(&entries), vec!["tool"]);
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let err = list(
            Path::new("/nonexistent/harbor/test/dir"),
            &ListOptions {
                sort_order: SortOrder::ByName,
                search: "",
                filters: &FilterSet::default(),
            },
        );
        assert!(matches!(
            err,
            Err(ListError::DirectoryUnreadable { .. })
        ));
    }

    #[test]
    fn title_key_upper_cases_word_starts() {
        assert_eq!(title_key("b.txt"), "B.Txt");
        assert_eq!(title_key(".hidden"), ".Hidden");
        assert_eq!(title_key("émile"), "Émile");
    }
}
