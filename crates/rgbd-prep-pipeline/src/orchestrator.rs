use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    augment::augment,
    config::{AugmentationConfig, PipelineConfig},
    error::PipelineError,
    frame::{FrameIdentifier, ProcessedFrame},
    gap_fill::{fill_depth, InpaintingMethod},
    hha::{convert_checked, HhaConverter},
    io::{FrameLoader, FrameSink},
    mask::rasterize_polygons,
};

/// Lifecycle of a frame inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStage {
    /// Sources read.
    Loaded,
    /// Depth converted to meters and gaps filled.
    Filled,
    /// Polygons rasterized.
    Masked,
    /// Joint augmentation applied.
    Augmented,
    /// HHA computed.
    Encoded,
    /// Outputs written.
    Saved,
    /// Terminal state after any error.
    Failed,
}

impl std::fmt::Display for FrameStage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            FrameStage::Loaded => "loaded",
            FrameStage::Filled => "filled",
            FrameStage::Masked => "masked",
            FrameStage::Augmented => "augmented",
            FrameStage::Encoded => "encoded",
            FrameStage::Saved => "saved",
            FrameStage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// A frame that did not make it through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameFailure {
    /// The frame base name.
    pub identifier: String,
    /// The stage the frame was trying to reach when it failed.
    pub stage: FrameStage,
    /// The error message.
    pub error: String,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Base names of the frames that were saved.
    pub succeeded: Vec<String>,
    /// The frames that failed.
    pub failed: Vec<FrameFailure>,
}

impl BatchReport {
    /// Whether every frame was saved.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs every frame through fill, mask, augment, encode and save, isolating failures.
pub struct FrameOrchestrator {
    method: InpaintingMethod,
    augmentation: AugmentationConfig,
    intrinsics: [[f64; 3]; 3],
    parallel: bool,
    show_progress: bool,
    loader: Box<dyn FrameLoader>,
    sink: Box<dyn FrameSink>,
    converter: Box<dyn HhaConverter>,
}

impl FrameOrchestrator {
    /// Create an orchestrator from a configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// `PipelineError::UnsupportedMethod` when the configured inpainting method is unknown.
    pub fn new(
        config: &PipelineConfig,
        loader: Box<dyn FrameLoader>,
        sink: Box<dyn FrameSink>,
        converter: Box<dyn HhaConverter>,
    ) -> Result<Self, PipelineError> {
        let method = config.inpainting.method.parse::<InpaintingMethod>()?;

        Ok(Self {
            method,
            augmentation: config.augmentation.clone(),
            intrinsics: config.cameras.depth_camera_matrix.to_matrix(),
            parallel: config.execution.parallel,
            show_progress: true,
            loader,
            sink,
            converter,
        })
    }

    /// Process frames on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Draw a progress bar while processing.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Discover all frames with the loader and process them.
    ///
    /// # Errors
    ///
    /// Only discovery errors are returned; per-frame errors end up in the report.
    pub fn run(&self) -> Result<BatchReport, PipelineError> {
        let frames = self.loader.discover()?;
        log::info!("Discovered {} frames", frames.len());

        Ok(self.process_all(&frames))
    }

    /// Process `frames` and report which ones succeeded.
    ///
    /// A failing frame is logged and recorded, the batch carries on. Afterwards the failure
    /// list and a summary are handed to the sink.
    pub fn process_all(&self, frames: &[FrameIdentifier]) -> BatchReport {
        let pb = self.progress_bar(frames.len());

        let results: Vec<Result<String, FrameFailure>> = if self.parallel {
            frames
                .par_iter()
                .progress_with(pb)
                .map(|identifier| self.process_frame(identifier))
                .collect()
        } else {
            frames
                .iter()
                .progress_with(pb)
                .map(|identifier| self.process_frame(identifier))
                .collect()
        };

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(name) => report.succeeded.push(name),
                Err(failure) => report.failed.push(failure),
            }
        }

        self.finish_batch(&report);

        report
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##>-");

        ProgressBar::new(len as u64)
            .with_style(style)
            .with_message("Processing frames")
    }

    fn finish_batch(&self, report: &BatchReport) {
        if report.failed.is_empty() {
            log::info!(
                "Completed successfully. All {} frames processed.",
                report.succeeded.len()
            );
        } else {
            match self.sink.save_failure_report(&report.failed) {
                Ok(Some(path)) => log::warn!(
                    "Completed with {} failures. See {}",
                    report.failed.len(),
                    path.display()
                ),
                Ok(None) => log::warn!("Completed with {} failures", report.failed.len()),
                Err(e) => log::error!("Failed to write the failure report: {e}"),
            }
        }

        if let Err(e) = self.sink.save_summary(report) {
            log::warn!("Failed to write the batch summary: {e}");
        }
    }

    fn process_frame(&self, identifier: &FrameIdentifier) -> Result<String, FrameFailure> {
        let mut stage = FrameStage::Loaded;

        match self.run_stages(identifier, &mut stage) {
            Ok(()) => Ok(identifier.base_name.clone()),
            Err(e) => {
                log::error!(
                    "Failed processing {} at stage {}: {}",
                    identifier.base_name,
                    stage,
                    e
                );
                Err(FrameFailure {
                    identifier: identifier.base_name.clone(),
                    stage,
                    error: e.to_string(),
                })
            }
        }
    }

    // `stage` tracks the stage being attempted so a failure can name it
    fn run_stages(
        &self,
        identifier: &FrameIdentifier,
        stage: &mut FrameStage,
    ) -> Result<(), PipelineError> {
        let name = &identifier.base_name;

        *stage = FrameStage::Loaded;
        let raw = self.loader.load(identifier)?;
        log::debug!("{name}: {stage}");

        *stage = FrameStage::Filled;
        if raw.rgb.size() != raw.depth_mm.size() {
            return Err(PipelineError::DimensionMismatch {
                name: name.clone(),
                rgb: raw.rgb.size(),
                depth: raw.depth_mm.size(),
            });
        }
        if let Err(e) = self.sink.save_raw_depth(identifier, &raw.depth_mm) {
            log::warn!("{name}: could not save the raw depth snapshot: {e}");
        }
        let depth_m = fill_depth(&raw.depth_mm, self.method)?;
        log::debug!("{name}: {stage}");

        *stage = FrameStage::Masked;
        let mask = rasterize_polygons(&raw.polygons, raw.rgb.size())?;
        log::debug!("{name}: {stage}");

        *stage = FrameStage::Augmented;
        let augmented = augment(&raw.rgb, &depth_m, &mask, &self.augmentation)?;
        log::debug!("{name}: {stage}");

        *stage = FrameStage::Encoded;
        let hha = convert_checked(self.converter.as_ref(), &augmented.depth, &self.intrinsics)?;
        log::debug!("{name}: {stage}");

        *stage = FrameStage::Saved;
        self.sink.save_processed(&ProcessedFrame {
            identifier: identifier.clone(),
            rgb: augmented.rgb,
            depth_m: augmented.depth,
            mask: augmented.mask,
            hha,
        })?;
        log::debug!("{name}: {stage}");

        Ok(())
    }
}
