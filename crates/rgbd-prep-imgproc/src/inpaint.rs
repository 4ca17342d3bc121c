//! Gap filling for single-channel rasters with missing samples.
//!
//! Missing pixels are reconstructed in two passes: piecewise-linear interpolation over a
//! Delaunay triangulation of the valid pixels (which covers exactly their convex hull), then a
//! nearest-valid-pixel lookup for whatever the first pass could not resolve. Anything still
//! undefined afterwards is set to zero.

use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};
use rgbd_prep_image::{Image, ImageError};
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};

/// A valid pixel used as an interpolation node.
struct Sample {
    position: Point2<f64>,
    value: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Counters describing how each pixel of a filled raster was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Pixels that were valid and copied verbatim.
    pub valid: usize,
    /// Missing pixels resolved by linear interpolation.
    pub linear: usize,
    /// Missing pixels resolved by the nearest valid pixel.
    pub nearest: usize,
    /// Missing pixels that could not be resolved and were set to zero.
    pub zeroed: usize,
}

/// Fill the invalid pixels of `src` into `dst`.
///
/// # Arguments
///
/// * `src` - The input raster.
/// * `dst` - The output raster, same size as `src`.
/// * `is_valid` - Predicate telling whether a pixel of `src` holds a sample.
///
/// # Returns
///
/// How the pixels were resolved. When `src` has no valid pixel at all, `dst` is all zeros.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::inpaint::fill_holes_linear_nearest;
///
/// let src = Image::<f32, 1>::new(
///     ImageSize { width: 3, height: 2 },
///     vec![1.0, 0.0, 3.0, 1.0, 2.0, 3.0],
/// )
/// .unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// let stats = fill_holes_linear_nearest(&src, &mut dst, |v| v != 0.0).unwrap();
///
/// assert_eq!(stats.valid, 5);
/// assert!((dst.as_slice()[1] - 2.0).abs() < 1e-6);
/// ```
pub fn fill_holes_linear_nearest(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    is_valid: impl Fn(f32) -> bool,
) -> Result<FillStats, ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let cols = src.cols();
    let mut stats = FillStats::default();

    let mut samples = Vec::new();
    let mut missing = Vec::new();
    for (idx, &value) in src.as_slice().iter().enumerate() {
        if is_valid(value) {
            samples.push(Sample {
                position: Point2::new((idx % cols) as f64, (idx / cols) as f64),
                value: value as f64,
            });
        } else {
            missing.push(idx);
        }
    }
    stats.valid = samples.len();

    if samples.is_empty() {
        dst.as_slice_mut().fill(0.0);
        stats.zeroed = missing.len();
        return Ok(stats);
    }

    dst.as_slice_mut().copy_from_slice(src.as_slice());
    if missing.is_empty() {
        return Ok(stats);
    }

    // first pass: barycentric interpolation inside the convex hull of the valid pixels
    let mut unresolved = Vec::new();
    let nodes: Vec<[f64; 2]> = samples
        .iter()
        .map(|s| [s.position.x, s.position.y])
        .collect();
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

    let triangulation = DelaunayTriangulation::<Sample>::bulk_load(samples)
        .map_err(|e| ImageError::TriangulationError(format!("{e:?}")))?;
    let barycentric = triangulation.barycentric();

    let data = dst.as_slice_mut();
    for idx in missing {
        let query = Point2::new((idx % cols) as f64, (idx / cols) as f64);
        match barycentric.interpolate(|v| v.data().value, query) {
            Some(value) if value.is_finite() => {
                data[idx] = value as f32;
                stats.linear += 1;
            }
            _ => unresolved.push(idx),
        }
    }

    if unresolved.is_empty() {
        return Ok(stats);
    }

    // second pass: nearest valid pixel for the periphery
    let kdtree: ImmutableKdTree<f64, u32, 2, 32> = ImmutableKdTree::new_from_slice(&nodes);
    for idx in unresolved {
        let query = [(idx % cols) as f64, (idx / cols) as f64];
        let nn = kdtree.nearest_one::<SquaredEuclidean>(&query);
        match values.get(nn.item as usize) {
            Some(value) if value.is_finite() => {
                data[idx] = *value as f32;
                stats.nearest += 1;
            }
            _ => {
                data[idx] = 0.0;
                stats.zeroed += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rgbd_prep_image::{Image, ImageError, ImageSize};

    fn fill(src: &Image<f32, 1>) -> Result<(Image<f32, 1>, super::FillStats), ImageError> {
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), -1.0)?;
        let stats = super::fill_holes_linear_nearest(src, &mut dst, |v| v != 0.0 && !v.is_nan())?;
        Ok((dst, stats))
    }

    #[test]
    fn fill_interior_hole_linear() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            ImageSize { width: 3, height: 3 },
            vec![
                1.0, 1.0, 1.0,
                1.0, 0.0, 1.0,
                1.0, 1.0, 1.0,
            ],
        )?;

        let (dst, stats) = fill(&src)?;

        assert_relative_eq!(dst.as_slice()[4], 1.0, epsilon = 1e-6);
        assert_eq!(stats.valid, 8);
        assert_eq!(stats.linear, 1);
        assert_eq!(stats.nearest, 0);

        Ok(())
    }

    #[test]
    fn fill_linear_ramp() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            ImageSize { width: 4, height: 2 },
            vec![
                1.0, 0.0, 0.0, 4.0,
                1.0, f32::NAN, 3.0, 4.0,
            ],
        )?;

        let (dst, _) = fill(&src)?;

        assert_relative_eq!(dst.as_slice()[1], 2.0, epsilon = 1e-5);
        assert_relative_eq!(dst.as_slice()[2], 3.0, epsilon = 1e-5);
        assert_relative_eq!(dst.as_slice()[5], 2.0, epsilon = 1e-5);

        Ok(())
    }

    #[test]
    fn fill_outside_hull_uses_nearest() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let src = Image::<f32, 1>::new(
            ImageSize { width: 4, height: 1 },
            vec![0.0, 0.0, 2.0, 0.0],
        )?;

        let (dst, stats) = fill(&src)?;

        assert_eq!(dst.as_slice(), &[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(stats.nearest, 3);

        Ok(())
    }

    #[test]
    fn fill_border_and_interior_holes() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let src = Image::<f32, 1>::new(
            size,
            (0..size.area())
                .map(|i| {
                    let (x, y) = (i % size.width, i / size.width);
                    let border = x < 2 || y < 2 || x >= size.width - 2 || y >= size.height - 2;
                    let hole = (10..20).contains(&x) && (10..20).contains(&y);
                    if border || hole {
                        0.0
                    } else {
                        1.0
                    }
                })
                .collect(),
        )?;

        let (dst, stats) = fill(&src)?;

        for &v in dst.as_slice() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-5);
        }
        assert_eq!(stats.linear, 100);
        assert_eq!(stats.nearest, size.area() - 60 * 44);
        assert_eq!(stats.zeroed, 0);

        Ok(())
    }

    #[test]
    fn fill_no_valid_samples_is_zero() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, f32::NAN, 0.0, 0.0],
        )?;

        let (dst, stats) = fill(&src)?;

        assert_eq!(dst.as_slice(), &[0.0; 4]);
        assert_eq!(stats.zeroed, 4);

        Ok(())
    }

    #[test]
    fn fill_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            1.0,
        )?;
        let mut dst = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0.0,
        )?;

        let res = super::fill_holes_linear_nearest(&src, &mut dst, |_| true);
        assert!(res.is_err());

        Ok(())
    }
}
