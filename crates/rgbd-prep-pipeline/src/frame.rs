use std::path::PathBuf;

use rgbd_prep_image::{Image, ImageSize};

use crate::error::PipelineError;

/// A single-channel depth raster, in millimeters before gap filling and meters after.
pub type DepthGrid = Image<f32, 1>;

/// A single-channel class-index raster.
pub type LabelMask = Image<u8, 1>;

/// Assemble a depth grid from rows of samples.
///
/// # Errors
///
/// `PipelineError::InvalidShape` when the rows are empty or of unequal length.
///
/// # Example
///
/// ```
/// use rgbd_prep_pipeline::frame::depth_grid_from_rows;
///
/// let grid = depth_grid_from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// assert_eq!(grid.width(), 2);
/// assert!(depth_grid_from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
/// ```
pub fn depth_grid_from_rows(rows: Vec<Vec<f32>>) -> Result<DepthGrid, PipelineError> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    if width == 0 {
        return Err(PipelineError::InvalidShape(
            "depth grid has no samples".to_string(),
        ));
    }

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(PipelineError::InvalidShape(format!(
            "depth row {i} has {} samples, expected {width}",
            row.len()
        )));
    }

    let height = rows.len();
    let data = rows.into_iter().flatten().collect();

    Ok(Image::new(ImageSize { width, height }, data)?)
}

/// Key binding the three sources that describe one capture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIdentifier {
    /// Name used for output files and failure reports.
    pub base_name: String,
    /// Path of the color image.
    pub rgb_path: PathBuf,
    /// Path of the depth text file, in millimeters.
    pub depth_path: PathBuf,
    /// Path of the polygon annotation file.
    pub annotation_path: PathBuf,
}

impl std::fmt::Display for FrameIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.base_name)
    }
}

/// A labelled polygon with vertices in normalized image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// The class painted inside the polygon.
    pub class_id: u8,
    /// Flat `x0, y0, x1, y1, ...` coordinates in `[0, 1]`.
    pub coords: Vec<f32>,
}

impl Polygon {
    /// Create a polygon from a class and flat normalized coordinates.
    pub fn new(class_id: u8, coords: Vec<f32>) -> Self {
        Self { class_id, coords }
    }

    /// Number of complete `(x, y)` vertices.
    pub fn num_vertices(&self) -> usize {
        self.coords.len() / 2
    }
}

/// A frame as read from its sources.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// The frame key.
    pub identifier: FrameIdentifier,
    /// The color image.
    pub rgb: Image<u8, 3>,
    /// Raw depth in millimeters; 0 or NaN where no sample was taken.
    pub depth_mm: DepthGrid,
    /// Polygons in drawing order.
    pub polygons: Vec<Polygon>,
}

/// RGB, depth and mask rasters that share one size and stay pixel-registered.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbdTriple {
    /// The color image.
    pub rgb: Image<u8, 3>,
    /// Metric depth.
    pub depth: DepthGrid,
    /// Class-index mask.
    pub mask: LabelMask,
}

/// A frame ready to be written out.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    /// The frame key.
    pub identifier: FrameIdentifier,
    /// The augmented color image.
    pub rgb: Image<u8, 3>,
    /// The augmented metric depth.
    pub depth_m: DepthGrid,
    /// The augmented mask.
    pub mask: LabelMask,
    /// The HHA encoding of `depth_m`.
    pub hha: Image<f32, 3>,
}
