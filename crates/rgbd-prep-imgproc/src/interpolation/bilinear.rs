use rgbd_prep_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// Neighbours beyond the last row or column are clamped to the edge.
pub(crate) fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [T; C] {
    let (rows, cols) = (image.rows(), image.cols());

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let data = image.as_slice();

    let mut pixel = [T::default(); C];
    for (k, out) in pixel.iter_mut().enumerate() {
        let p00: f32 = data[base00 + k].into();
        let p01: f32 = data[base01 + k].into();
        let p10: f32 = data[base10 + k].into();
        let p11: f32 = data[base11 + k].into();
        *out = T::from_f32(p00 * w00 + p01 * w01 + p10 * w10 + p11 * w11);
    }

    pixel
}

#[cfg(test)]
mod tests {
    use rgbd_prep_image::{Image, ImageError, ImageSize};

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;
        let [val] = super::bilinear_interpolation(&image, 0.5, 0.5);
        assert!((val - 1.5).abs() < 1e-6);

        let [edge] = super::bilinear_interpolation(&image, 1.5, 1.0);
        assert!((edge - 3.0).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn bilinear_u8_rounds() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0, 3],
        )?;
        let [val] = super::bilinear_interpolation(&image, 0.5, 0.0);
        assert_eq!(val, 2);

        Ok(())
    }
}
