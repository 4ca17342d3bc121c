#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// joint geometric augmentation of RGB, depth and mask.
pub mod augment;

/// yaml configuration of the pipeline.
pub mod config;

/// error types for the pipeline.
pub mod error;

/// frame data model.
pub mod frame;

/// depth unit conversion and gap filling.
pub mod gap_fill;

/// depth to HHA encoding.
pub mod hha;

/// frame loading and persistence.
pub mod io;

/// polygon annotations to class masks.
pub mod mask;

/// batch processing with per-frame failure isolation.
pub mod orchestrator;

pub use crate::augment::{augment, TransformParams};
pub use crate::config::PipelineConfig;
pub use crate::error::{ConfigError, PipelineError};
pub use crate::frame::{DepthGrid, FrameIdentifier, LabelMask, ProcessedFrame, RawFrame};
pub use crate::gap_fill::{fill_depth, InpaintingMethod};
pub use crate::hha::{GeocentricHha, HhaConverter};
pub use crate::mask::rasterize_polygons;
pub use crate::orchestrator::{BatchReport, FrameFailure, FrameOrchestrator, FrameStage};
