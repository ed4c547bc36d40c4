//! Frame discovery.

use std::path::{Path, PathBuf};

use crate::FrameIoError;
use crate::naming::{is_edges_artifact, is_supported_frame};

/// List the frames in `dir`, sorted by path.
///
/// Only regular files with a supported extension are returned. Saved
/// edge images (`edges_*`) are skipped so a rerun never converts its
/// own artifacts. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`FrameIoError::Scan`] if the directory cannot be listed.
pub fn scan_frames(dir: &Path) -> Result<Vec<PathBuf>, FrameIoError> {
    let scan_err = |source| FrameIoError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if !path.is_file() {
            continue;
        }
        if is_edges_artifact(&path) {
            tracing::debug!(path = %path.display(), "skipping edge image");
            continue;
        }
        if !is_supported_frame(&path) {
            tracing::debug!(path = %path.display(), "skipping unsupported file");
            continue;
        }
        frames.push(path);
    }
    frames.sort();

    tracing::info!(dir = %dir.display(), count = frames.len(), "found frames");
    Ok(frames)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    fn names(frames: &[PathBuf]) -> Vec<String> {
        frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn returns_sorted_supported_frames() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["0003.png", "0001.jpg", "0002.JPEG", "0010.PNG"] {
            touch(tmp.path(), name);
        }
        let frames = scan_frames(tmp.path()).unwrap();
        assert_eq!(
            names(&frames),
            ["0001.jpg", "0002.JPEG", "0003.png", "0010.PNG"]
        );
    }

    #[test]
    fn skips_edge_images_and_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["0001.png", "edges_0001.png", "notes.txt", "clip.gif"] {
            touch(tmp.path(), name);
        }
        std::fs::create_dir(tmp.path().join("nested.png")).unwrap();

        let frames = scan_frames(tmp.path()).unwrap();
        assert_eq!(names(&frames), ["0001.png"]);
    }

    #[test]
    fn empty_directory_yields_no_frames() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scan_frames(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_a_scan_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = scan_frames(&missing).unwrap_err();
        assert!(matches!(err, FrameIoError::Scan { ref path, .. } if *path == missing));
    }
}
