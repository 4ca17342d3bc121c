//! Frame sources and destinations.

/// Filesystem frame discovery and parsing.
pub mod loader;

/// PNG encoding and decoding of rasters.
pub mod png;

/// PNG frame persistence.
pub mod sink;

use std::path::PathBuf;

use crate::{
    error::PipelineError,
    frame::{DepthGrid, FrameIdentifier, ProcessedFrame, RawFrame},
    orchestrator::{BatchReport, FrameFailure},
};

/// Finds and reads raw frames.
pub trait FrameLoader: Send + Sync {
    /// List every frame whose sources are all present, in a stable order.
    fn discover(&self) -> Result<Vec<FrameIdentifier>, PipelineError>;

    /// Read the sources of one frame.
    ///
    /// Missing or unparseable sources are `PipelineError::SourceUnavailable`.
    fn load(&self, identifier: &FrameIdentifier) -> Result<RawFrame, PipelineError>;
}

/// Persists pipeline outputs.
pub trait FrameSink: Send + Sync {
    /// Store the raw millimeter depth of a frame before gap filling.
    fn save_raw_depth(
        &self,
        identifier: &FrameIdentifier,
        depth_mm: &DepthGrid,
    ) -> Result<(), PipelineError>;

    /// Store a fully processed frame.
    fn save_processed(&self, frame: &ProcessedFrame) -> Result<(), PipelineError>;

    /// Store the list of failed frames, returning where it went if it is a file.
    fn save_failure_report(
        &self,
        failures: &[FrameFailure],
    ) -> Result<Option<PathBuf>, PipelineError>;

    /// Store a summary of the whole batch.
    fn save_summary(&self, _report: &BatchReport) -> Result<(), PipelineError> {
        Ok(())
    }
}
