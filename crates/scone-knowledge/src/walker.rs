use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};

/// List knowledge files under `root` in load order.
///
/// The walk is pre-order: within each directory, its matching files sorted by
/// name come first, then its subdirectories in sorted order. Directories
/// named [`LoaderConfig::snapshot_dir`] are skipped wherever they appear; once
/// the main walk is done, `root/<snapshot_dir>` is walked the same way.
///
/// Symlinked directories are not followed. A missing root yields no files.
pub fn knowledge_files(root: &Path, config: &LoaderConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, config, &mut files)?;
    walk(&root.join(&config.snapshot_dir), config, &mut files)?;
    debug!(root = %root.display(), count = files.len(), "knowledge files found");
    Ok(files)
}

fn walk(dir: &Path, config: &LoaderConfig, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(LoadError::Walk {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut here = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| LoadError::Walk {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            if entry.file_name() != config.snapshot_dir.as_str() {
                subdirs.push(path);
            }
        } else if is_file(&path, file_type.is_symlink()) && has_extension(&path, config) {
            here.push(path);
        }
    }

    here.sort();
    subdirs.sort();

    for path in here {
        if files.len() >= config.max_files {
            return Err(LoadError::TooManyFiles {
                max: config.max_files,
            });
        }
        files.push(path);
    }
    for subdir in subdirs {
        walk(&subdir, config, files)?;
    }
    Ok(())
}

fn is_file(path: &Path, is_symlink: bool) -> bool {
    if is_symlink {
        // Links to files count; links to directories are not followed.
        fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
    } else {
        path.is_file()
    }
}

fn has_extension(path: &Path, config: &LoaderConfig) -> bool {
    path.extension()
        .is_some_and(|ext| ext == config.extension.as_str())
}
