use rgbd_prep_image::Image;

/// Kernel for nearest neighbor interpolation
///
/// Values are copied verbatim, so label rasters never receive mixed classes.
pub(crate) fn nearest_neighbor_interpolation<T: Copy + Default, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [T; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu = (u.round().max(0.0) as usize).min(cols - 1);
    let iv = (v.round().max(0.0) as usize).min(rows - 1);

    let base = (iv * cols + iu) * C;

    let mut pixel = [T::default(); C];
    pixel.copy_from_slice(&image.as_slice()[base..base + C]);

    pixel
}
