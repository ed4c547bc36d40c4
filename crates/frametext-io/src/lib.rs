//! frametext-io: Filesystem boundary for frame conversion.
//!
//! Discovers input frames, derives output names, reads frame bytes,
//! writes text output atomically, and persists optional edge images.
//! All conversion logic lives in `frametext-pipeline`; this crate only
//! moves bytes between the pipeline and the disk.

use std::path::PathBuf;

pub mod naming;
pub mod output;
pub mod scan;

pub use naming::{
    FrameJob, edges_artifact_path, is_edges_artifact, is_supported_frame, output_path,
    plan_outputs,
};
pub use output::{ensure_output_dir, read_frame, save_edges_artifact, write_text_atomic};
pub use scan::scan_frames;

/// Errors raised at the filesystem boundary.
///
/// Every variant carries the path involved so batch summaries can name
/// the frame that failed.
#[derive(Debug, thiserror::Error)]
pub enum FrameIoError {
    /// Reading an input frame failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Frame that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Listing the input directory failed.
    #[error("failed to scan {}: {source}", path.display())]
    Scan {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating the output directory or writing a text file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Encoding or saving the edge image failed.
    #[error("failed to save edge image {}: {source}", path.display())]
    Artifact {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },

    /// Another frame in the batch already produces the same text file.
    #[error(
        "skipping {}: {} is already produced by {}",
        path.display(),
        output.display(),
        first.display()
    )]
    OutputCollision {
        /// Frame that was skipped.
        path: PathBuf,
        /// Text file both frames map to.
        output: PathBuf,
        /// Frame that keeps the output.
        first: PathBuf,
    },

    /// The frame could not be converted.
    #[error("failed to convert {}: {source}", path.display())]
    Pipeline {
        /// Input frame.
        path: PathBuf,
        /// Underlying pipeline error.
        source: frametext_pipeline::PipelineError,
    },
}

impl FrameIoError {
    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Scan { path, .. }
            | Self::Write { path, .. }
            | Self::Artifact { path, .. }
            | Self::OutputCollision { path, .. }
            | Self::Pipeline { path, .. } => path,
        }
    }
}
