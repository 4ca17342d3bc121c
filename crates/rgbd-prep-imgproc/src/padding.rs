use rgbd_prep_image::{Image, ImageError, ImageSize};

use crate::crop::crop_window;

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// Padding that grows `size` to at least `min_size` in both dimensions.
    ///
    /// The missing pixels are split evenly between both sides; an odd remainder goes to the
    /// bottom or right side. Dimensions that are already large enough get no padding.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rgbd_prep_image::ImageSize;
    /// use rgbd_prep_imgproc::padding::Padding2D;
    ///
    /// let padding = Padding2D::to_min_size(
    ///     ImageSize { width: 4, height: 6 },
    ///     ImageSize { width: 7, height: 5 },
    /// );
    ///
    /// assert_eq!(padding, Padding2D { top: 0, bottom: 0, left: 1, right: 2 });
    /// ```
    pub fn to_min_size(size: ImageSize, min_size: ImageSize) -> Self {
        let pad_h = min_size.height.saturating_sub(size.height);
        let pad_w = min_size.width.saturating_sub(size.width);

        Self {
            top: pad_h / 2,
            bottom: pad_h - pad_h / 2,
            left: pad_w / 2,
            right: pad_w - pad_w / 2,
        }
    }

    /// Whether the padding adds no pixels.
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }

    /// The image size after applying this padding to `size`.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }
}

/// Surround `src` with `padding` pixels of `constant_value` on each side, writing into `dst`.
///
/// # Errors
///
/// `ImageError::InvalidImageSize` when `dst` is not `padding.padded_size(src.size())`.
///
/// # Example
///
/// ```rust
/// use rgbd_prep_image::{ImageSize, Image};
/// use rgbd_prep_imgproc::padding::{Padding2D, spatial_padding};
///
/// let depth = Image::<f32, 1>::from_size_val(ImageSize { width: 1, height: 1 }, 2.5).unwrap();
/// let padding = Padding2D { top: 0, bottom: 1, left: 1, right: 0 };
///
/// let mut padded = Image::<f32, 1>::from_size_val(padding.padded_size(depth.size()), 9.0).unwrap();
/// spatial_padding(&depth, &mut padded, padding, [0.0]).unwrap();
///
/// assert_eq!(padded.as_slice(), &[0.0, 2.5, 0.0, 0.0]);
/// ```
pub fn spatial_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: Padding2D,
    constant_value: [T; C],
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let expected = padding.padded_size(src.size());
    if dst.size() != expected {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            expected.width,
            expected.height,
        ));
    }

    crop_window(
        src,
        dst,
        -(padding.left as isize),
        -(padding.top as isize),
        constant_value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_size_split() {
        let cases = [
            ((10, 10), (4, 4), Padding2D::default()),
            ((4, 6), (7, 5), Padding2D { top: 0, bottom: 0, left: 1, right: 2 }),
            ((1, 1), (2, 4), Padding2D { top: 1, bottom: 2, left: 0, right: 1 }),
        ];

        for ((w, h), (mw, mh), expected) in cases {
            let size = ImageSize { width: w, height: h };
            let padding = Padding2D::to_min_size(size, ImageSize { width: mw, height: mh });
            assert_eq!(padding, expected);

            let padded = padding.padded_size(size);
            assert!(padded.width >= mw && padded.height >= mh);
        }
        assert!(Padding2D::default().is_empty());
    }

    #[test]
    fn pad_rgb_with_constant() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4],
        )?;
        let padding = Padding2D {
            top: 1,
            bottom: 1,
            left: 1,
            right: 1,
        };
        let mut dst = Image::<u8, 3>::from_size_val(padding.padded_size(src.size()), 0)?;

        spatial_padding(&src, &mut dst, padding, [9, 8, 7])?;

        let rows = dst.as_slice().chunks_exact(4 * 3).collect::<Vec<_>>();
        assert_eq!(rows[0], &[9, 8, 7, 9, 8, 7, 9, 8, 7, 9, 8, 7]);
        assert_eq!(rows[1], &[9, 8, 7, 1, 1, 1, 2, 2, 2, 9, 8, 7]);
        assert_eq!(rows[2], &[9, 8, 7, 3, 3, 3, 4, 4, 4, 9, 8, 7]);
        assert_eq!(rows[3], rows[0]);

        Ok(())
    }

    #[test]
    fn pad_wrong_destination_size() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            1,
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 4,
            },
            0,
        )?;
        let padding = Padding2D {
            top: 1,
            bottom: 1,
            left: 1,
            right: 1,
        };

        let res = spatial_padding(&src, &mut dst, padding, [0]);
        assert_eq!(res, Err(ImageError::InvalidImageSize(3, 4, 4, 4)));

        Ok(())
    }
}
