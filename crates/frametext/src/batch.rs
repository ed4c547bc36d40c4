//! Batch driver: convert every frame in a directory on a worker pool.
//!
//! Frames are independent. Each one is read, converted, and written by
//! a single rayon task; a failure is recorded for that frame and the
//! rest of the batch carries on. Output names are derived from input
//! stems and claimed before any worker starts; a frame whose stem is
//! already taken fails instead of sharing a file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use frametext_io::{FrameIoError, FrameJob};
use frametext_pipeline::PipelineConfig;
use frametext_pipeline::diagnostics::{Clock, process_staged_with_diagnostics};
use rayon::prelude::*;

/// Where to read frames from and where to put the results.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for frames.
    pub input_dir: PathBuf,
    /// Directory receiving `<stem>.txt` files. Created if missing.
    pub output_dir: PathBuf,
    /// Also write `edges_<name>` next to each input.
    pub save_edges: bool,
    /// Worker count; `None` uses rayon's default.
    pub jobs: Option<usize>,
}

/// Errors that stop the batch before any frame is converted.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The pipeline configuration is invalid.
    #[error(transparent)]
    Config(#[from] frametext_pipeline::PipelineError),

    /// Scanning the input or preparing the output directory failed.
    #[error(transparent)]
    Io(#[from] FrameIoError),

    /// A worker count of zero was requested.
    #[error("worker count must be at least 1")]
    ZeroJobs,

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Text files written, in input order.
    pub written: Vec<PathBuf>,
    /// Frames that failed, in input order.
    pub failures: Vec<FrameIoError>,
}

impl BatchReport {
    /// Whether every discovered frame was converted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary for the end of a run.
    #[must_use]
    pub fn summary(&self, output_dir: &Path) -> String {
        let mut line = format!(
            "Converted {} frames to ASCII in '{}'",
            self.written.len(),
            output_dir.display(),
        );
        if !self.failures.is_empty() {
            line.push_str(&format!(" ({} failed)", self.failures.len()));
        }
        line
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Build the dedicated worker pool.
///
/// # Errors
///
/// Returns [`BatchError::ZeroJobs`] for `Some(0)` and
/// [`BatchError::ThreadPool`] if rayon cannot spawn the threads.
pub fn build_thread_pool(jobs: Option<usize>) -> Result<rayon::ThreadPool, BatchError> {
    if jobs == Some(0) {
        return Err(BatchError::ZeroJobs);
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("frametext-{i}"));
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    Ok(builder.build()?)
}

/// Convert every frame in `options.input_dir`.
///
/// Per-frame failures are logged and collected in the report; they do
/// not stop the batch.
///
/// # Errors
///
/// Returns [`BatchError`] if the config is invalid, the worker pool
/// cannot be built, the input directory cannot be scanned, or the
/// output directory cannot be created.
pub fn run_batch(
    options: &BatchOptions,
    config: &PipelineConfig,
) -> Result<BatchReport, BatchError> {
    config.validate()?;
    let pool = build_thread_pool(options.jobs)?;
    let frames = frametext_io::scan_frames(&options.input_dir)?;
    frametext_io::ensure_output_dir(&options.output_dir)?;

    tracing::info!(
        frames = frames.len(),
        workers = pool.current_num_threads(),
        output = %options.output_dir.display(),
        "starting batch",
    );

    let jobs = frametext_io::plan_outputs(&options.output_dir, &frames);
    let results: Vec<Result<PathBuf, FrameIoError>> = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| job.and_then(|job| convert_frame(&job, options.save_edges, config)))
            .collect()
    });

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(path) => report.written.push(path),
            Err(e) => {
                tracing::error!(frame = %e.path().display(), "{e}");
                report.failures.push(e);
            }
        }
    }
    Ok(report)
}

/// Read, convert, and write a single frame.
fn convert_frame(
    job: &FrameJob,
    save_edges: bool,
    config: &PipelineConfig,
) -> Result<PathBuf, FrameIoError> {
    let input = job.input.as_path();
    let bytes = frametext_io::read_frame(input)?;
    let (staged, diagnostics) =
        process_staged_with_diagnostics(bytes, config, &StdClock).map_err(|source| {
            FrameIoError::Pipeline {
                path: input.to_path_buf(),
                source,
            }
        })?;

    tracing::debug!(
        frame = %input.display(),
        elapsed_ms = diagnostics.total_duration.as_secs_f64() * 1000.0,
        columns = diagnostics.summary.columns,
        rows = diagnostics.summary.rows,
        "converted frame",
    );
    tracing::trace!("{}", diagnostics.report());

    if save_edges
        && let Err(e) = frametext_io::save_edges_artifact(input, &staged.edges)
    {
        tracing::warn!(frame = %input.display(), "{e}");
    }

    frametext_io::write_text_atomic(&job.output, &staged.frame.to_text())?;
    Ok(job.output.clone())
}
