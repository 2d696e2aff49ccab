//! Filesystem locations for persisted state and user folders.

use std::path::PathBuf;

/// Harbor's configuration directory, `~/.config/harbor` on Linux. The
/// directory is not created here; callers create it before writing.
pub fn config_dir() -> PathBuf {
    let base = directories::BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("harbor")
}

/// XDG data directory (`$XDG_DATA_HOME` or `~/.local/share`).
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg);
        }
    }
    directories::BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The user's home directory, falling back to `/` when unresolvable.
pub fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// Well-known user folder, falling back to home when the system does not
/// define it (headless setups without xdg-user-dirs).
fn user_dir(pick: impl Fn(&directories::UserDirs) -> Option<&std::path::Path>) -> PathBuf {
    directories::UserDirs::new()
        .and_then(|d| pick(&d).map(|p| p.to_path_buf()))
        .unwrap_or_else(home_dir)
}

pub fn documents_dir() -> PathBuf {
    user_dir(|d| d.document_dir())
}

pub fn downloads_dir() -> PathBuf {
    user_dir(|d| d.download_dir())
}

pub fn pictures_dir() -> PathBuf {
    user_dir(|d| d.picture_dir())
}

pub fn music_dir() -> PathBuf {
    user_dir(|d| d.audio_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_is_namespaced() {
        assert!(config_dir().ends_with("harbor"));
    }

    #[test]
    fn data_dir_respects_xdg_override() {
        // Serial with nothing else: no other test reads XDG_DATA_HOME.
        std::env::set_var("XDG_DATA_HOME", "/tmp/harbor-xdg-test");
        assert_eq!(data_dir(), PathBuf::from("/tmp/harbor-xdg-test"));
        std::env::remove_var("XDG_DATA_HOME");
    }
}
