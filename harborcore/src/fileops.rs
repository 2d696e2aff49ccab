//! File operations: copy, move, create, rename, and the background paste
//! worker.
//!
//! Batch operations continue past individual failures; the first error is
//! the one reported to the user, the rest are logged. The paste worker runs
//! on its own thread and talks back over a channel — UI state is only ever
//! touched by the UI loop draining that channel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        source: io::Error,
    },
    #[error("move {}: {source}", .path.display())]
    Move {
        path: PathBuf,
        source: io::Error,
    },
    #[error("create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: io::Error,
    },
    #[error("rename {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        source: io::Error,
    },
    #[error("'{0}' is not a valid name")]
    InvalidName(String),
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
}

/// Copy one file or directory (recursively) into `dest_dir`, keeping its
/// base name.
pub fn copy_into(source: &Path, dest_dir: &Path) -> io::Result<()> {
    let name = source
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no name"))?;
    let dest = dest_dir.join(name);
    if source.is_dir() {
        copy_dir(source, &dest)
    } else {
        copy_file(source, &dest)
    }
}

fn copy_dir(source: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            copy_file(&entry.path(), &target)?;
        }
    }
    Ok(())
}

fn copy_file(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;
    Ok(())
}

/// Copy every source into `dest_dir`, reporting progress as the completed
/// fraction after each one. A failing source does not stop the batch.
pub fn copy_files(
    sources: &[PathBuf],
    dest_dir: &Path,
    mut progress: impl FnMut(f32),
) -> Vec<FileOpError> {
    let mut errors = Vec::new();
    if let Err(source) = fs::create_dir_all(dest_dir) {
        return vec![FileOpError::Create {
            path: dest_dir.to_path_buf(),
            source,
        }];
    }
    for (i, source) in sources.iter().enumerate() {
        if let Err(err) = copy_into(source, dest_dir) {
            errors.push(FileOpError::Copy {
                path: source.clone(),
                source: err,
            });
        }
        progress((i + 1) as f32 / sources.len() as f32);
    }
    errors
}

/// Move every source into `dest_dir` by rename, falling back to
/// copy-then-delete across filesystems. A failing source does not stop the
/// batch.
pub fn move_files(sources: &[PathBuf], dest_dir: &Path) -> Vec<FileOpError> {
    let mut errors = Vec::new();
    if let Err(source) = fs::create_dir_all(dest_dir) {
        return vec![FileOpError::Create {
            path: dest_dir.to_path_buf(),
            source,
        }];
    }
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let dest = dest_dir.join(name);
        let result = fs::rename(source, &dest).or_else(|_| {
            // Cross-filesystem: copy, then remove the original.
            if source.is_dir() {
                copy_dir(source, &dest)?;
                fs::remove_dir_all(source)
            } else {
                copy_file(source, &dest)?;
                fs::remove_file(source)
            }
        });
        if let Err(err) = result {
            errors.push(FileOpError::Move {
                path: source.clone(),
                source: err,
            });
        }
    }
    errors
}

/// A file or directory name the filesystem layer will accept.
pub fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\0')
}

/// Create an empty file named `name` inside `dir`.
pub fn create_file(dir: &Path, name: &str) -> Result<PathBuf, FileOpError> {
    let path = prepare_create(dir, name)?;
    fs::File::create(&path)
        .map(|_| path.clone())
        .map_err(|source| FileOpError::Create { path, source })
}

/// Create a directory named `name` inside `dir`.
pub fn create_dir(dir: &Path, name: &str) -> Result<PathBuf, FileOpError> {
    let path = prepare_create(dir, name)?;
    fs::create_dir(&path)
        .map(|_| path.clone())
        .map_err(|source| FileOpError::Create { path, source })
}

fn prepare_create(dir: &Path, name: &str) -> Result<PathBuf, FileOpError> {
    let name = name.trim();
    if !valid_name(name) {
        return Err(FileOpError::InvalidName(name.to_string()));
    }
    let path = dir.join(name);
    if path.exists() {
        return Err(FileOpError::AlreadyExists(path));
    }
    Ok(path)
}

/// Rename `path` to `new_name` within its parent directory.
pub fn rename(path: &Path, new_name: &str) -> Result<PathBuf, FileOpError> {
    let new_name = new_name.trim();
    if !valid_name(new_name) {
        return Err(FileOpError::InvalidName(new_name.to_string()));
    }
    let parent = path.parent().unwrap_or_else(|| Path::new("/"));
    let dest = parent.join(new_name);
    if dest.exists() {
        return Err(FileOpError::AlreadyExists(dest));
    }
    fs::rename(path, &dest)
        .map(|_| dest)
        .map_err(|source| FileOpError::Rename {
            path: path.to_path_buf(),
            source,
        })
}

/// A staged paste: the marked sources, the destination, and whether the
/// marks were cut (move) rather than copied.
#[derive(Debug, Clone)]
pub struct PasteRequest {
    pub sources: Vec<PathBuf>,
    pub dest: PathBuf,
    pub cut: bool,
}

/// Progress and completion events from the paste worker.
#[derive(Debug)]
pub enum PasteEvent {
    /// Completed fraction in `0.0..=1.0`.
    Progress(f32),
    /// The batch ran to the end; `first_error` carries the one error shown
    /// to the user, if any.
    Finished { first_error: Option<String> },
}

/// Run a paste on a background thread. The returned receiver is drained by
/// the UI loop each frame; the worker never touches UI-owned state.
pub fn spawn_paste(request: PasteRequest) -> Receiver<PasteEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || run_paste(request, tx));
    rx
}

fn run_paste(request: PasteRequest, tx: Sender<PasteEvent>) {
    let errors = if request.cut {
        move_files(&request.sources, &request.dest)
    } else {
        copy_files(&request.sources, &request.dest, |fraction| {
            let _ = tx.send(PasteEvent::Progress(fraction));
        })
    };
    for err in errors.iter().skip(1) {
        log::warn!("paste: {err}");
    }
    let _ = tx.send(PasteEvent::Finished {
        first_error: errors.first().map(|e| e.to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn copies_directories_recursively() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        write(&src.join("a.txt"), "a");
        write(&src.join("nested").join("b.txt"), "b");
        let dest = dir.path().join("dest");
        fs::create_dir(&dest).unwrap();

        assert!(copy_into(&src, &dest).is_ok());
        assert_eq!(
            fs::read_to_string(dest.join("src").join("nested").join("b.txt")).unwrap(),
            "b"
        );
    }

    #[test]
    fn copy_batch_continues_past_failures_and_reports_progress() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        write(&good, "ok");
        let missing = dir.path().join("missing.txt");
        let dest = dir.path().join("dest");

        let mut fractions = Vec::new();
        let errors = copy_files(
            &[missing.clone(), good.clone()],
            &dest,
            |f| fractions.push(f),
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], FileOpError::Copy { path, .. } if *path == missing));
        assert_eq!(fractions, vec![0.5, 1.0]);
        assert!(dest.join("good.txt").exists());
    }

    #[test]
    fn move_renames_within_a_filesystem() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        write(&src, "a");
        let dest = dir.path().join("dest");

        let errors = move_files(&[src.clone()], &dest);
        assert!(errors.is_empty());
        assert!(!src.exists());
        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn create_and_rename_validate_names() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            create_file(dir.path(), ""),
            Err(FileOpError::InvalidName(_))
        ));
        assert!(matches!(
            create_dir(dir.path(), "a/b"),
            Err(FileOpError::InvalidName(_))
        ));

        let made = create_file(dir.path(), "note.txt").unwrap();
        assert!(made.exists());
        assert!(matches!(
            create_file(dir.path(), "note.txt"),
            Err(FileOpError::AlreadyExists(_))
        ));

        let renamed = rename(&made, "renamed.txt").unwrap();
        assert!(renamed.exists());
        assert!(!made.exists());
        assert!(matches!(
            rename(&renamed, "bad/name"),
            Err(FileOpError::InvalidName(_))
        ));
    }

    #[test]
    fn paste_worker_reports_over_the_channel() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        write(&src, "a");
        let dest = dir.path().join("dest");

        let rx = spawn_paste(PasteRequest {
            sources: vec![src],
            dest: dest.clone(),
            cut: false,
        });

        let mut finished = false;
        let mut saw_progress = false;
        for event in rx {
            match event {
                PasteEvent::Progress(f) => {
                    assert!((0.0..=1.0).contains(&f));
                    saw_progress = true;
                }
                PasteEvent::Finished { first_error } => {
                    assert!(first_error.is_none());
                    finished = true;
                }
            }
        }
        assert!(finished && saw_progress);
        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn cut_paste_worker_moves() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        write(&src, "a");
        let dest = dir.path().join("dest");

        let rx = spawn_paste(PasteRequest {
            sources: vec![src.clone()],
            dest: dest.clone(),
            cut: true,
        });
        let mut first_error = Some("unset".to_string());
        for event in rx {
            if let PasteEvent::Finished { first_error: e } = event {
                first_error = e;
            }
        }
        assert!(first_error.is_none());
        assert!(!src.exists());
        assert!(dest.join("a.txt").exists());
    }
}
