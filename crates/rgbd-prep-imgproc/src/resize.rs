use rgbd_prep_image::{Image, ImageDtype, ImageError};

use crate::interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Resize an image to the size of `dst`.
///
/// Pixel centers are aligned between source and destination, i.e. the destination pixel `x`
/// samples the source at `(x + 0.5) * src_width / dst_width - 0.5`. Nearest neighbor resampling
/// picks the source pixel whose area contains that center, so values are never mixed.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated with the target size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::interpolation::InterpolationMode;
/// use rgbd_prep_imgproc::resize::resize;
///
/// let image = Image::<_, 1>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![1u8, 2],
/// )
/// .unwrap();
///
/// let mut resized = Image::<_, 1>::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 2,
///     },
///     0u8,
/// )
/// .unwrap();
///
/// resize(&image, &mut resized, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(resized.as_slice(), &[1, 1, 2, 2, 1, 1, 2, 2]);
/// ```
pub fn resize<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size().area() == 0 {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }
    if dst.size().area() == 0 {
        return Err(ImageError::EmptyImage(dst.width(), dst.height()));
    }

    let scale_x = src.cols() as f32 / dst.cols() as f32;
    let scale_y = src.rows() as f32 / dst.rows() as f32;
    let (max_x, max_y) = ((src.cols() - 1) as f32, (src.rows() - 1) as f32);

    let (map_x, map_y) = meshgrid_from_fn(dst.cols(), dst.rows(), |x, y| {
        let (cx, cy) = ((x as f32 + 0.5) * scale_x, (y as f32 + 0.5) * scale_y);
        let uv = match interpolation {
            InterpolationMode::Bilinear => (
                (cx - 0.5).clamp(0.0, max_x),
                (cy - 0.5).clamp(0.0, max_y),
            ),
            InterpolationMode::Nearest => (cx.floor().min(max_x), cy.floor().min(max_y)),
        };
        Ok(uv)
    })?;

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        dst_pixel.copy_from_slice(&interpolate_pixel(src, x, y, interpolation));
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use rgbd_prep_image::{Image, ImageError, ImageSize};

    use crate::interpolation::InterpolationMode;

    #[test]
    fn resize_same_size_is_identity() -> Result<(), ImageError> {
        let image = Image::<_, 3>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            (0..18).map(|x| x as f32 * 0.25).collect(),
        )?;
        let mut resized = Image::<_, 3>::from_size_val(image.size(), 0.0)?;

        super::resize(&image, &mut resized, InterpolationMode::Bilinear)?;

        assert_eq!(resized.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn resize_downscale_bilinear() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![0f32, 2.0, 4.0, 6.0],
        )?;
        let mut resized = Image::<_, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 1,
            },
            0.0,
        )?;

        super::resize(&image, &mut resized, InterpolationMode::Bilinear)?;

        // centers of the destination pixels fall between source pixels 0-1 and 2-3
        assert!((resized.as_slice()[0] - 1.0).abs() < 1e-6);
        assert!((resized.as_slice()[1] - 5.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn resize_nearest_keeps_labels() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0u8, 0, 0, 0, 5, 0, 0, 0, 0],
        )?;
        let mut resized = Image::<_, 1>::from_size_val(
            ImageSize {
                width: 7,
                height: 5,
            },
            0u8,
        )?;

        super::resize(&image, &mut resized, InterpolationMode::Nearest)?;

        assert!(resized.as_slice().iter().all(|&v| v == 0 || v == 5));
        assert!(resized.as_slice().contains(&5));

        Ok(())
    }

    #[test]
    fn resize_empty_fails() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 0,
                height: 3,
            },
            vec![],
        )?;
        let mut resized = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0.0,
        )?;

        let res = super::resize(&image, &mut resized, InterpolationMode::Bilinear);
        assert_eq!(res, Err(ImageError::EmptyImage(0, 3)));

        Ok(())
    }
}
