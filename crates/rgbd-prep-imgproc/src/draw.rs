use rgbd_prep_image::Image;

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<T: Copy, const C: usize>(img: &mut Image<T, C>, x: i64, y: i64, color: [T; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Fill the pixels of row `y` between `x0` and `x1` (inclusive), clipped to the image.
fn fill_span<T: Copy, const C: usize>(img: &mut Image<T, C>, y: i64, x0: i64, x1: i64, color: [T; C]) {
    if y < 0 || y >= img.rows() as i64 {
        return;
    }
    let x0 = x0.max(0);
    let x1 = x1.min(img.cols() as i64 - 1);
    for x in x0..=x1 {
        set_pixel(img, x, y, color);
    }
}

/// Draws a one pixel wide line on an image inplace using Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
pub fn draw_line<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [T; C],
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        set_pixel(img, x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Fills a polygon on an image inplace, interior and boundary.
///
/// Rows are filled with a scanline pass over the polygon edges (even-odd rule, sampling at
/// integer pixel centers) and the outline is drawn on top, so boundary pixels always take the
/// fill color. Polygons with fewer than three vertices are ignored.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The polygon vertices in pixel coordinates as (x, y).
/// * `color` - The fill color as an array of `C` elements.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_imgproc::draw::fill_polygon;
///
/// let mut mask = Image::<u8, 1>::from_size_val(ImageSize { width: 5, height: 5 }, 0).unwrap();
///
/// fill_polygon(&mut mask, &[(1, 1), (3, 1), (3, 3), (1, 3)], [7]);
///
/// assert_eq!(mask.get([2, 2, 0]), Some(&7));
/// assert_eq!(mask.get([0, 0, 0]), Some(&0));
/// assert_eq!(mask.as_slice().iter().filter(|&&v| v == 7).count(), 9);
/// ```
pub fn fill_polygon<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    points: &[(i64, i64)],
    color: [T; C],
) {
    if points.len() < 3 || img.size().area() == 0 {
        return;
    }

    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let y_max = points
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(0)
        .min(img.rows() as i64 - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());

    for y in y_min..=y_max {
        crossings.clear();

        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            if y0 == y1 {
                continue;
            }
            // half-open edge span avoids counting shared vertices twice
            let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
            if y >= lo && y < hi {
                let t = (y - y0) as f64 / (y1 - y0) as f64;
                crossings.push(x0 as f64 + t * (x1 - x0) as f64);
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            fill_span(img, y, span[0].ceil() as i64, span[1].floor() as i64, color);
        }
    }

    for (i, &p0) in points.iter().enumerate() {
        let p1 = points[(i + 1) % points.len()];
        draw_line(img, p0, p1, color);
    }
}

#[cfg(test)]
mod tests {
    use rgbd_prep_image::{Image, ImageError, ImageSize};

    #[test]
    fn draw_line_diagonal() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            0,
        )?;
        super::draw_line(&mut img, (0, 0), (2, 2), [1]);
        assert_eq!(img.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);
        Ok(())
    }

    #[test]
    fn fill_triangle() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 5,
            },
            0,
        )?;
        super::fill_polygon(&mut img, &[(0, 0), (4, 0), (0, 4)], [3]);

        #[rustfmt::skip]
        let expected = vec![
            3, 3, 3, 3, 3,
            3, 3, 3, 3, 0,
            3, 3, 3, 0, 0,
            3, 3, 0, 0, 0,
            3, 0, 0, 0, 0,
        ];
        assert_eq!(img.as_slice(), &expected);
        Ok(())
    }

    #[test]
    fn fill_clips_to_image() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )?;
        super::fill_polygon(&mut img, &[(-5, -5), (10, -5), (10, 10), (-5, 10)], [1]);
        assert!(img.as_slice().iter().all(|&v| v == 1));
        Ok(())
    }

    #[test]
    fn fill_degenerate_is_noop() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            0,
        )?;
        super::fill_polygon(&mut img, &[(0, 0), (2, 2)], [1]);
        assert!(img.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }
}
