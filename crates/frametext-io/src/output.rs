//! Reading frames and writing results.
//!
//! Text output goes through a temporary file in the destination
//! directory that is renamed over the final name once fully written.
//! A failed or interrupted write leaves no partial `.txt` behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use frametext_pipeline::GrayImage;

use crate::FrameIoError;
use crate::naming::edges_artifact_path;

/// Read a frame's encoded bytes.
///
/// # Errors
///
/// Returns [`FrameIoError::Read`] if the file cannot be read.
pub fn read_frame(path: &Path) -> Result<Vec<u8>, FrameIoError> {
    std::fs::read(path).map_err(|source| FrameIoError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `dir` and any missing parents.
///
/// # Errors
///
/// Returns [`FrameIoError::Write`] if the directory cannot be created.
pub fn ensure_output_dir(dir: &Path) -> Result<(), FrameIoError> {
    std::fs::create_dir_all(dir).map_err(|source| FrameIoError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `text` to `path` as UTF-8, replacing any existing file.
///
/// The content is written to a hidden temporary file next to `path`
/// and renamed into place. The temporary file is removed if any step
/// fails.
///
/// # Errors
///
/// Returns [`FrameIoError::Write`] if the temporary file cannot be
/// created or written, or the rename fails.
pub fn write_text_atomic(path: &Path, text: &str) -> Result<(), FrameIoError> {
    let write_err = |source| FrameIoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".frametext-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote frame text");
    Ok(())
}

/// Save the cropped edge image next to `input` as `edges_<file name>`.
///
/// The encoder is chosen from the input's extension, so a `.jpg` frame
/// gets a JPEG edge image.
///
/// # Errors
///
/// Returns [`FrameIoError::Artifact`] if encoding or writing fails.
pub fn save_edges_artifact(input: &Path, edges: &GrayImage) -> Result<PathBuf, FrameIoError> {
    let path = edges_artifact_path(input);
    edges.save(&path).map_err(|source| FrameIoError::Artifact {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "saved edge image");
    Ok(path)
}
