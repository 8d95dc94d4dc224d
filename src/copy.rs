use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use fs_extra::dir;
use fs_extra::file;
use tracing::debug;

use crate::error::{StepError, StepResult};

/// A single copy of a source directory into a destination directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyRequest {
    pub src: PathBuf,
    pub dest: PathBuf,
    /// Copy the whole tree when set, only the top-level files otherwise.
    pub recurse: bool,
}

impl CopyRequest {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>, recurse: bool) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            recurse,
        }
    }

    /// Runs the copy and returns the number of bytes written.
    ///
    /// Existing destination entries are never removed; files with the same
    /// relative path are overwritten.
    pub fn run(&self) -> StepResult<u64> {
        if self.recurse {
            self.copy_tree()
        } else {
            self.copy_top_level_files()
        }
    }

    fn copy_tree(&self) -> StepResult<u64> {
        let mut options = dir::CopyOptions::new();
        options.overwrite = true;
        options.copy_inside = true;
        options.content_only = true;
        dir::copy(&self.src, &self.dest, &options)
            .map_err(|source| StepError::copy(&self.src, &self.dest, source))
    }

    fn copy_top_level_files(&self) -> StepResult<u64> {
        fs::create_dir_all(&self.dest)
            .map_err(|source| StepError::io("create destination", &self.dest, source))?;
        let entries = fs::read_dir(&self.src)
            .map_err(|source| StepError::io("read source directory", &self.src, source))?;

        let mut options = file::CopyOptions::new();
        options.overwrite = true;
        let mut copied = 0;
        for entry in entries {
            let entry =
                entry.map_err(|source| StepError::io("read source directory", &self.src, source))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let target = self.dest.join(entry.file_name());
            debug!(from = %path.display(), to = %target.display(), "copying file");
            copied += file::copy(&path, &target, &options)
                .map_err(|source| StepError::copy(&path, &target, source))?;
            copy_times(&path, &target)?;
        }
        Ok(copied)
    }
}

/// Carries access and modification times over from `from` to `to`.
fn copy_times(from: &Path, to: &Path) -> StepResult<()> {
    let metadata =
        fs::metadata(from).map_err(|source| StepError::io("read metadata", from, source))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    open_for_times(to)
        .and_then(|target| target.set_times(times))
        .map_err(|source| StepError::io("set file times", to, source))
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::options().write(true).open(path)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}
