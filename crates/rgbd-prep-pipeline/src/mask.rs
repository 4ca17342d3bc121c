use rgbd_prep_image::ImageSize;
use rgbd_prep_imgproc::draw::fill_polygon;

use crate::{
    error::PipelineError,
    frame::{LabelMask, Polygon},
};

/// Map a normalized coordinate to a pixel index in `[0, dim - 1]`.
fn to_pixel(t: f32, dim: usize) -> i64 {
    let max = dim.saturating_sub(1) as f32;
    (t * max).round().clamp(0.0, max) as i64
}

/// Rasterize normalized polygons into a class-index mask.
///
/// The mask starts as class 0 and polygons are filled, interior and boundary, in input order so
/// that later polygons overwrite earlier ones. Polygons with fewer than three vertices or an odd
/// number of coordinates are skipped.
///
/// # Arguments
///
/// * `polygons` - The polygons in drawing order.
/// * `size` - The size of the output mask.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::ImageSize;
/// use rgbd_prep_pipeline::{frame::Polygon, mask::rasterize_polygons};
///
/// let square = Polygon::new(2, vec![0.25, 0.25, 0.75, 0.25, 0.75, 0.75, 0.25, 0.75]);
/// let mask = rasterize_polygons(&[square], ImageSize { width: 5, height: 5 }).unwrap();
///
/// assert_eq!(mask.get([2, 2, 0]), Some(&2));
/// assert_eq!(mask.get([0, 0, 0]), Some(&0));
/// ```
pub fn rasterize_polygons(
    polygons: &[Polygon],
    size: ImageSize,
) -> Result<LabelMask, PipelineError> {
    let mut mask = LabelMask::from_size_val(size, 0)?;

    for polygon in polygons {
        if polygon.coords.len() % 2 != 0 || polygon.num_vertices() < 3 {
            log::debug!(
                "Skipping degenerate polygon of class {} with {} coordinates",
                polygon.class_id,
                polygon.coords.len()
            );
            continue;
        }

        let points = polygon
            .coords
            .chunks_exact(2)
            .map(|xy| (to_pixel(xy[0], size.width), to_pixel(xy[1], size.height)))
            .collect::<Vec<_>>();

        fill_polygon(&mut mask, &points, [polygon.class_id]);
    }

    Ok(mask)
}
