use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};
use rgbd_prep_image::{Image, ImageError};

/// Mirror an image left to right into `dst`.
///
/// Pixels are moved as a whole, so channel order is kept and label values are never mixed.
///
/// # Errors
///
/// `ImageError::InvalidImageSize` when `dst` and `src` differ in size.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::flip::horizontal_flip;
///
/// let mask = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![1, 0, 2]).unwrap();
/// let mut flipped = Image::<u8, 1>::from_size_val(mask.size(), 0).unwrap();
///
/// horizontal_flip(&mask, &mut flipped).unwrap();
///
/// assert_eq!(flipped.as_slice(), &[2, 0, 1]);
/// ```
pub fn horizontal_flip<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            src.width(),
            src.height(),
        ));
    }

    let stride = src.cols() * C;
    if stride == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(stride)
        .zip(src.as_slice().par_chunks_exact(stride))
        .for_each(|(dst_row, src_row)| {
            dst_row
                .chunks_exact_mut(C)
                .zip(src_row.chunks_exact(C).rev())
                .for_each(|(d, s)| d.copy_from_slice(s));
        });

    Ok(())
}
