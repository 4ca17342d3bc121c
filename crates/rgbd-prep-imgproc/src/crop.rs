use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use rgbd_prep_image::{Image, ImageError};

/// Copy the window of `src` whose top-left corner sits at `(x, y)` into `dst`.
///
/// The window has the size of `dst` and may reach past any border of `src`, including negative
/// offsets; the part outside `src` is set to `fill`. This covers plain cropping, constant padding
/// and a mix of both.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, its size is the window size.
/// * `x` - Column of `src` mapped to the first column of `dst`.
/// * `y` - Row of `src` mapped to the first row of `dst`.
/// * `fill` - The pixel written where the window leaves `src`.
///
/// # Example
///
/// ```rust
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::crop::crop_window;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 2 }, vec![
///     1, 2, 3,
///     4, 5, 6,
/// ]).unwrap();
///
/// let mut window = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 9).unwrap();
///
/// crop_window(&image, &mut window, 2, 1, [0]).unwrap();
///
/// assert_eq!(window.as_slice(), &[6, 0, 0, 0]);
/// ```
pub fn crop_window<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: isize,
    y: isize,
    fill: [T; C],
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let dst_cols = dst.cols();
    if dst.size().area() == 0 {
        return Ok(());
    }

    let (src_cols, src_rows) = (src.cols() as isize, src.rows() as isize);

    // columns of dst that read from src, as a half-open range
    let first = (-x).clamp(0, dst_cols as isize) as usize;
    let last = (src_cols - x).clamp(first as isize, dst_cols as isize) as usize;

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .for_each(|pixel| pixel.copy_from_slice(&fill));

            let sy = y + i as isize;
            if sy < 0 || sy >= src_rows || first == last {
                return;
            }

            let offset = (sy as usize * src.cols() + (x + first as isize) as usize) * C;
            let len = (last - first) * C;
            dst_row[first * C..first * C + len]
                .copy_from_slice(&src.as_slice()[offset..offset + len]);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use rgbd_prep_image::{Image, ImageError, ImageSize};

    use super::crop_window;

    fn ramp(width: usize, height: usize) -> Result<Image<u8, 1>, ImageError> {
        Image::new(
            ImageSize { width, height },
            (0..width * height).map(|i| i as u8 + 1).collect(),
        )
    }

    #[test]
    fn window_inside() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let rgb = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![
                0, 1, 2, 3, 4, 5,
                6, 7, 8, 9, 10, 11,
                12, 13, 14, 15, 16, 17,
            ],
        )?;
        let mut window = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 1,
                height: 2,
            },
            0,
        )?;

        crop_window(&rgb, &mut window, 1, 1, [0; 3])?;

        assert_eq!(window.as_slice(), &[9, 10, 11, 15, 16, 17]);
        Ok(())
    }

    #[test]
    fn window_larger_than_source() -> Result<(), ImageError> {
        let src = ramp(2, 2)?;
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 3,
            },
            9,
        )?;

        crop_window(&src, &mut dst, -1, -1, [0])?;

        #[rustfmt::skip]
        let expected = [
            0, 0, 0, 0,
            0, 1, 2, 0,
            0, 3, 4, 0,
        ];
        assert_eq!(dst.as_slice(), &expected);
        Ok(())
    }

    #[test]
    fn window_fully_outside() -> Result<(), ImageError> {
        let src = ramp(3, 3)?;
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            9,
        )?;

        crop_window(&src, &mut dst, 5, -4, [7])?;

        assert_eq!(dst.as_slice(), &[7, 7, 7, 7]);
        Ok(())
    }

    #[test]
    fn window_fill_per_channel() -> Result<(), ImageError> {
        let src = Image::<f32, 2>::from_size_val(
            ImageSize {
                width: 1,
                height: 1,
            },
            1.0,
        )?;
        let mut dst = Image::<f32, 2>::from_size_val(
            ImageSize {
                width: 2,
                height: 1,
            },
            0.0,
        )?;

        crop_window(&src, &mut dst, 0, 0, [0.0, -1.0])?;

        assert_eq!(dst.as_slice(), &[1.0, 1.0, 0.0, -1.0]);
        Ok(())
    }
}
