//! File naming conventions for frames and their derived files.
//!
//! - `frames/0001.png` converts to `<output>/0001.txt`.
//! - The optional edge image lands next to the input as
//!   `frames/edges_0001.png`, and is skipped on later scans.
//! - Frames sharing a stem (`a.png`, `a.jpg`) would share a text file;
//!   [`plan_outputs`] keeps the first in scan order and refuses the rest.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::FrameIoError;

/// File name prefix marking a saved edge image.
pub const EDGES_PREFIX: &str = "edges_";

/// Frame extensions accepted by the scanner, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Whether `path` has a supported frame extension.
#[must_use]
pub fn is_supported_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Whether `path` names a previously saved edge image.
#[must_use]
pub fn is_edges_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(EDGES_PREFIX))
}

/// Text output path for `input`: `<output_dir>/<input stem>.txt`.
#[must_use]
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".txt");
    output_dir.join(name)
}

/// One frame and the text file it converts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJob {
    /// Input frame.
    pub input: PathBuf,
    /// Destination `.txt` file.
    pub output: PathBuf,
}

/// Pair every frame with its output path, in the order given.
///
/// Output names must be unique within a batch. When several frames map
/// to the same `.txt` file, the first one keeps it and every later one
/// becomes [`FrameIoError::OutputCollision`].
#[must_use]
pub fn plan_outputs(output_dir: &Path, frames: &[PathBuf]) -> Vec<Result<FrameJob, FrameIoError>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(frames.len());
    frames
        .iter()
        .map(|input| {
            let output = output_path(output_dir, input);
            if let Some(first) = claimed.get(&output) {
                return Err(FrameIoError::OutputCollision {
                    path: input.clone(),
                    output,
                    first: first.to_path_buf(),
                });
            }
            claimed.insert(output.clone(), input);
            Ok(FrameJob {
                input: input.clone(),
                output,
            })
        })
        .collect()
}

/// Edge image path for `input`: `edges_<file name>` in the same directory.
#[must_use]
pub fn edges_artifact_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(EDGES_PREFIX);
    name.push(input.file_name().unwrap_or_default());
    input.with_file_name(name)
}
