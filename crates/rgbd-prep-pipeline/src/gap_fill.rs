use std::str::FromStr;

use rgbd_prep_imgproc::inpaint::fill_holes_linear_nearest;

use crate::{error::PipelineError, frame::DepthGrid};

/// Scale from raw millimeters to meters.
pub const MM_TO_M: f32 = 1e-3;

/// How missing depth samples are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InpaintingMethod {
    /// Linear interpolation over the convex hull of the valid samples, then nearest valid sample.
    #[default]
    LinearThenNearest,
    /// Unit conversion only; gaps are kept.
    Passthrough,
}

impl InpaintingMethod {
    /// The canonical name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            InpaintingMethod::LinearThenNearest => "linear_then_nearest",
            InpaintingMethod::Passthrough => "passthrough",
        }
    }
}

impl std::fmt::Display for InpaintingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InpaintingMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "linear_then_nearest" | "linear_nearest" => Ok(InpaintingMethod::LinearThenNearest),
            "passthrough" | "none" => Ok(InpaintingMethod::Passthrough),
            other => Err(PipelineError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Whether a raw depth sample holds a measurement.
#[inline]
pub fn is_valid_sample(value: f32) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Convert a raw millimeter depth grid to meters and fill its gaps.
///
/// Samples that are exactly zero or NaN are missing. With [`InpaintingMethod::LinearThenNearest`]
/// the result has no missing samples: valid samples are kept, holes inside the convex hull of the
/// valid samples are interpolated linearly, the rest takes the nearest valid sample. A grid with
/// no valid sample at all becomes all zeros.
///
/// # Arguments
///
/// * `raw_depth_mm` - The raw depth in millimeters.
/// * `method` - The gap filling method.
///
/// # Returns
///
/// The depth in meters.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_pipeline::gap_fill::{fill_depth, InpaintingMethod};
///
/// let raw = Image::<f32, 1>::new(
///     ImageSize { width: 3, height: 2 },
///     vec![1000.0, 0.0, 3000.0, 1000.0, 2000.0, 3000.0],
/// )
/// .unwrap();
///
/// let filled = fill_depth(&raw, InpaintingMethod::LinearThenNearest).unwrap();
///
/// assert!((filled.as_slice()[1] - 2.0).abs() < 1e-5);
/// ```
pub fn fill_depth(
    raw_depth_mm: &DepthGrid,
    method: InpaintingMethod,
) -> Result<DepthGrid, PipelineError> {
    let depth_m = raw_depth_mm.map(|&v| v * MM_TO_M);

    match method {
        InpaintingMethod::Passthrough => Ok(depth_m),
        InpaintingMethod::LinearThenNearest => {
            let mut filled = DepthGrid::from_size_val(depth_m.size(), 0.0)?;
            let stats = fill_holes_linear_nearest(&depth_m, &mut filled, is_valid_sample)?;

            log::debug!(
                "Gap filling {}: {} valid, {} linear, {} nearest, {} zeroed",
                depth_m.size(),
                stats.valid,
                stats.linear,
                stats.nearest,
                stats.zeroed
            );

            Ok(filled)
        }
    }
}
