//! Temporary file management for the intermediate map files.
//!
//! Map files live in a fresh `tempfile::TempDir` inside the work directory and
//! disappear when the [`MapWorkspace`] is dropped, whether the encode
//! succeeded, failed or was cancelled.

use std::path::{Path, PathBuf};

use tempfile::{Builder as TempFileBuilder, TempDir};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::remap::MapPaths;

const WORKSPACE_PREFIX: &str = "superview_maps_";

/// Directory holding `x.pgm` and `y.pgm` for one encode. Auto-cleaned when dropped.
#[derive(Debug)]
pub struct MapWorkspace {
    dir: TempDir,
}

impl MapWorkspace {
    /// Creates the workspace under `config.work_dir`, or the system temp dir.
    pub fn create(config: &CoreConfig) -> CoreResult<Self> {
        let base = config
            .work_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        Self::create_in(&base)
    }

    pub fn create_in(base: &Path) -> CoreResult<Self> {
        std::fs::create_dir_all(base).map_err(|source| CoreError::FileIoFailed {
            path: base.to_path_buf(),
            source,
        })?;
        let dir = TempFileBuilder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(base)
            .map_err(|source| CoreError::FileIoFailed {
                path: base.to_path_buf(),
                source,
            })?;
        log::debug!("Created map workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the map files go inside the workspace.
    pub fn map_paths(&self) -> MapPaths {
        MapPaths {
            x_path: self.dir.path().join("x.pgm"),
            y_path: self.dir.path().join("y.pgm"),
        }
    }
}

/// Destination of kept map files: `<output-stem>.x.pgm` / `<output-stem>.y.pgm`
/// next to the output.
pub fn kept_map_paths(output_path: &Path) -> MapPaths {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let sibling = |suffix: &str| -> PathBuf { output_path.with_file_name(format!("{stem}.{suffix}.pgm")) };
    MapPaths {
        x_path: sibling("x"),
        y_path: sibling("y"),
    }
}

/// Copies the workspace maps next to the output.
pub fn keep_maps(maps: &MapPaths, output_path: &Path) -> CoreResult<MapPaths> {
    let kept = kept_map_paths(output_path);
    for (from, to) in [(&maps.x_path, &kept.x_path), (&maps.y_path, &kept.y_path)] {
        std::fs::copy(from, to).map_err(|source| CoreError::FileIoFailed {
            path: to.clone(),
            source,
        })?;
    }
    log::info!(
        "Kept map files: {}, {}",
        kept.x_path.display(),
        kept.y_path.display()
    );
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let workspace = MapWorkspace::create_in(base.path()).unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.starts_with(base.path()));
        assert!(path.is_dir());
        assert_eq!(workspace.map_paths().x_path, path.join("x.pgm"));
        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn missing_work_dir_is_created() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let workspace = MapWorkspace::create_in(&nested).unwrap();
        assert!(workspace.path().starts_with(&nested));
    }

    #[test]
    fn kept_maps_sit_next_to_the_output() {
        let kept = kept_map_paths(Path::new("/videos/flight.mp4"));
        assert_eq!(kept.x_path, PathBuf::from("/videos/flight.x.pgm"));
        assert_eq!(kept.y_path, PathBuf::from("/videos/flight.y.pgm"));
    }
}
