//! Geocentric depth encoding (horizontal disparity, height above ground, angle with gravity).
//!
//! The core pipeline only talks to [`HhaConverter`]; any implementation can be plugged into the
//! orchestrator. [`GeocentricHha`] is a self-contained baseline.

mod geocentric;

pub use geocentric::GeocentricHha;

use rgbd_prep_image::Image;

use crate::{error::PipelineError, frame::DepthGrid};

/// Converts metric depth and camera intrinsics into a three channel HHA image.
pub trait HhaConverter: Send + Sync {
    /// Encode `depth_m` (meters) seen through the 3x3 intrinsic matrix `intrinsics`.
    ///
    /// The result must have the spatial size of `depth_m` and finite values.
    fn convert(
        &self,
        depth_m: &DepthGrid,
        intrinsics: &[[f64; 3]; 3],
    ) -> Result<Image<f32, 3>, PipelineError>;
}

/// Run a converter and check that its output honors the [`HhaConverter`] contract.
///
/// # Errors
///
/// Errors of the converter are returned as is. An output of the wrong size or with non-finite
/// values is `PipelineError::ConverterContractViolation`.
pub fn convert_checked(
    converter: &dyn HhaConverter,
    depth_m: &DepthGrid,
    intrinsics: &[[f64; 3]; 3],
) -> Result<Image<f32, 3>, PipelineError> {
    let hha = converter.convert(depth_m, intrinsics)?;

    if hha.size() != depth_m.size() {
        return Err(PipelineError::ConverterContractViolation(format!(
            "expected an image of {}, got {}",
            depth_m.size(),
            hha.size()
        )));
    }

    if let Some(idx) = hha.as_slice().iter().position(|v| !v.is_finite()) {
        return Err(PipelineError::ConverterContractViolation(format!(
            "non-finite value at pixel {}",
            idx / 3
        )));
    }

    Ok(hha)
}
