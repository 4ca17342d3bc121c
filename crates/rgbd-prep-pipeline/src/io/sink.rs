use std::{
    fs,
    path::{Path, PathBuf},
};

use rgbd_prep_image::Image;

use super::{
    png::{write_png_gray16, write_png_gray8, write_png_rgb16, write_png_rgb8},
    FrameSink,
};
use crate::{
    error::PipelineError,
    frame::{DepthGrid, FrameIdentifier, ProcessedFrame},
    orchestrator::{BatchReport, FrameFailure},
};

/// Scale factor from meters to millimeters for 16-bit depth output.
pub const M_TO_MM: f32 = 1000.0;

/// Scale factor applied to HHA values before 16-bit quantization.
pub const HHA_SCALE: f32 = 1000.0;

/// Name of the failure list written next to the outputs.
pub const FAILED_FILES: &str = "failed_files.txt";

/// Name of the machine readable batch summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Quantize to 16 bits after scaling, rounding to nearest and clipping to `[0, 65535]`.
///
/// NaN becomes 0.
pub fn quantize_u16<const C: usize>(image: &Image<f32, C>, scale: f32) -> Image<u16, C> {
    image.map(|&v| (v * scale).round().clamp(0.0, u16::MAX as f32) as u16)
}

/// Writes frames as PNG files under one run directory.
///
/// Layout of the run directory:
///
/// * `depth_raw_png/<id>_depth_raw.png` raw depth in millimeters, 16-bit
/// * `depth_filled_png/<id>_depth_filled.png` filled depth in millimeters, 16-bit
/// * `hha_png/<id>_hha.png` HHA scaled by 1000, 16-bit RGB
/// * `masks/<id>_mask.png` class mask, 8-bit
/// * `rgb/<id>_rgb.png` color image, 8-bit RGB
#[derive(Debug, Clone)]
pub struct PngFrameSink {
    run_dir: PathBuf,
}

impl PngFrameSink {
    /// Use `run_dir` as the output directory, creating it if needed.
    pub fn new(run_dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let run_dir = run_dir.into();
        fs::create_dir_all(&run_dir)?;
        Ok(Self { run_dir })
    }

    /// Create a fresh `run_<YYYYmmdd_HHMMSS>` directory under `processed_dir`.
    pub fn create_run(processed_dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let run_dir = processed_dir.as_ref().join(format!("run_{timestamp}"));
        log::info!("Writing outputs to {}", run_dir.display());
        Self::new(run_dir)
    }

    /// The output directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    fn output_path(&self, dir: &str, file_name: String) -> Result<PathBuf, PipelineError> {
        let dir = self.run_dir.join(dir);
        fs::create_dir_all(&dir)?;
        Ok(dir.join(file_name))
    }
}

impl FrameSink for PngFrameSink {
    fn save_raw_depth(
        &self,
        identifier: &FrameIdentifier,
        depth_mm: &DepthGrid,
    ) -> Result<(), PipelineError> {
        let path = self.output_path(
            "depth_raw_png",
            format!("{}_depth_raw.png", identifier.base_name),
        )?;
        write_png_gray16(path, &quantize_u16(depth_mm, 1.0))
    }

    fn save_processed(&self, frame: &ProcessedFrame) -> Result<(), PipelineError> {
        let name = &frame.identifier.base_name;

        let path = self.output_path("depth_filled_png", format!("{name}_depth_filled.png"))?;
        write_png_gray16(path, &quantize_u16(&frame.depth_m, M_TO_MM))?;

        let path = self.output_path("hha_png", format!("{name}_hha.png"))?;
        write_png_rgb16(path, &quantize_u16(&frame.hha, HHA_SCALE))?;

        let path = self.output_path("masks", format!("{name}_mask.png"))?;
        write_png_gray8(path, &frame.mask)?;

        let path = self.output_path("rgb", format!("{name}_rgb.png"))?;
        write_png_rgb8(path, &frame.rgb)?;

        Ok(())
    }

    fn save_failure_report(
        &self,
        failures: &[FrameFailure],
    ) -> Result<Option<PathBuf>, PipelineError> {
        let path = self.run_dir.join(FAILED_FILES);
        let content = failures
            .iter()
            .map(|f| format!("{}\n", f.identifier))
            .collect::<String>();
        fs::write(&path, content)?;

        Ok(Some(path))
    }

    fn save_summary(&self, report: &BatchReport) -> Result<(), PipelineError> {
        let file = fs::File::create(self.run_dir.join(SUMMARY_FILE))?;
        serde_json::to_writer_pretty(file, report).map_err(std::io::Error::from)?;
        Ok(())
    }
}
