use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use rgbd_prep_image::{Image, ImageDtype, ImageError};

use crate::interpolation::{interpolate_pixel, InterpolationMode};

/// Invert a 2x3 affine matrix `[a, b, c, d, e, f]`.
///
/// # Errors
///
/// `ImageError::SingularTransform` when the linear part has a zero determinant.
pub fn invert_affine_transform(m: &[f32; 6]) -> Result<[f32; 6], ImageError> {
    let [a, b, c, d, e, f] = *m;

    let det = a * e - b * d;
    if det.abs() <= f32::EPSILON {
        return Err(ImageError::SingularTransform(det));
    }

    let (ia, ib, id, ie) = (e / det, -b / det, -d / det, a / det);

    Ok([ia, ib, -(ia * c + ib * f), id, ie, -(id * c + ie * f)])
}

/// 2x3 matrix rotating by `angle` degrees and scaling by `scale` about `center`.
///
/// Positive angles turn the content counter-clockwise as seen on screen, i.e. with the y axis
/// pointing down. `center` is a fixed point of the map.
pub fn get_rotation_matrix2d(center: (f32, f32), angle: f32, scale: f32) -> [f32; 6] {
    let (sin, cos) = angle.to_radians().sin_cos();
    let (alpha, beta) = (scale * cos, scale * sin);
    let (cx, cy) = center;

    [
        alpha,
        beta,
        cx - alpha * cx - beta * cy,
        -beta,
        alpha,
        cy + beta * cx - alpha * cy,
    ]
}

/// Warp `src` into `dst` with the forward affine map `m` (source to destination).
///
/// Every destination pixel is pulled from the source through the inverse of `m`. Pixels that
/// land outside the area covered by the source pixels are set to zero (`T::default()`), which for depth means "no sample"
/// and for masks means background.
///
/// # Errors
///
/// `ImageError::EmptyImage` for an empty source or destination and
/// `ImageError::SingularTransform` when `m` cannot be inverted.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::interpolation::InterpolationMode;
/// use rgbd_prep_imgproc::warp::{get_rotation_matrix2d, warp_affine};
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![1, 2, 3]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// // half a turn about the center reverses the row
/// let m = get_rotation_matrix2d((1.0, 0.0), 180.0, 1.0);
/// warp_affine(&src, &mut dst, &m, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), &[3, 2, 1]);
/// ```
pub fn warp_affine<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size().area() == 0 {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }
    if dst.size().area() == 0 {
        return Err(ImageError::EmptyImage(dst.width(), dst.height()));
    }

    let [a, b, c, d, e, f] = invert_affine_transform(m)?;
    // a source pixel covers [i - 0.5, i + 0.5) around its center
    let (max_u, max_v) = ((src.cols() - 1) as f32, (src.rows() - 1) as f32);
    let dst_cols = dst.cols();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let y = y as f32;
            // source position of the first pixel of the row, then step along x
            let (mut u, mut v) = (b * y + c, e * y + f);
            for dst_pixel in dst_row.chunks_exact_mut(C) {
                if u >= -0.5 && u < max_u + 0.5 && v >= -0.5 && v < max_v + 0.5 {
                    let (su, sv) = (u.clamp(0.0, max_u), v.clamp(0.0, max_v));
                    dst_pixel.copy_from_slice(&interpolate_pixel(src, su, sv, interpolation));
                } else {
                    dst_pixel.fill(T::default());
                }
                u += a;
                v += d;
            }
        });

    Ok(())
}
