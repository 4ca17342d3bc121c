use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use rgbd_prep_image::Image;

use super::HhaConverter;
use crate::{
    error::{ConfigError, PipelineError},
    frame::DepthGrid,
};

/// Baseline HHA encoder assuming gravity points along the image down axis.
///
/// Per pixel with positive depth `z` the channels are:
///
/// * horizontal disparity `1 / z`,
/// * height above the lowest observed point, measured along the camera's up axis (-Y),
/// * angle in radians between the surface normal and the up axis, in `[0, pi]`.
///
/// Pixels without depth are encoded as zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeocentricHha;

type Point3 = [f32; 3];

fn sub(a: &Point3, b: &Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: &Point3, b: &Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: &Point3, b: &Point3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

// back-project every pixel, `None` where there is no depth
fn back_project(depth: &DepthGrid, k: &[[f64; 3]; 3]) -> Vec<Option<Point3>> {
    let (fx, fy) = (k[0][0] as f32, k[1][1] as f32);
    let (cx, cy) = (k[0][2] as f32, k[1][2] as f32);
    let cols = depth.cols();

    depth
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, &z)| {
            if !(z > 0.0 && z.is_finite()) {
                return None;
            }
            let (u, v) = ((idx % cols) as f32, (idx / cols) as f32);
            Some([(u - cx) * z / fx, (v - cy) * z / fy, z])
        })
        .collect()
}

// angle of the surface normal at (x, y) with the up axis, from its valid neighbours
fn normal_angle(points: &[Option<Point3>], cols: usize, rows: usize, x: usize, y: usize) -> f32 {
    let at = |x: usize, y: usize| points[y * cols + x];
    let Some(center) = at(x, y) else {
        return 0.0;
    };

    let neighbour = |x: usize, y: usize| at(x, y).unwrap_or(center);
    let du = sub(
        &neighbour((x + 1).min(cols - 1), y),
        &neighbour(x.saturating_sub(1), y),
    );
    let dv = sub(
        &neighbour(x, (y + 1).min(rows - 1)),
        &neighbour(x, y.saturating_sub(1)),
    );

    let mut normal = cross(&du, &dv);
    let norm = dot(&normal, &normal).sqrt();
    if norm <= f32::EPSILON {
        return 0.0;
    }

    // orient towards the camera
    if dot(&normal, &center) > 0.0 {
        normal = [-normal[0], -normal[1], -normal[2]];
    }

    let up = [0.0, -1.0, 0.0];
    (dot(&normal, &up) / norm).clamp(-1.0, 1.0).acos()
}

impl HhaConverter for GeocentricHha {
    fn convert(
        &self,
        depth_m: &DepthGrid,
        intrinsics: &[[f64; 3]; 3],
    ) -> Result<Image<f32, 3>, PipelineError> {
        if !(intrinsics[0][0] > 0.0 && intrinsics[1][1] > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "focal lengths must be positive, got fx={} fy={}",
                intrinsics[0][0], intrinsics[1][1]
            ))
            .into());
        }

        let (cols, rows) = (depth_m.cols(), depth_m.rows());
        let mut hha = Image::<f32, 3>::from_size_val(depth_m.size(), 0.0)?;
        if depth_m.size().area() == 0 {
            return Ok(hha);
        }

        let points = back_project(depth_m, intrinsics);

        // the lowest point has the largest Y since Y grows downwards
        let floor_y = points
            .iter()
            .flatten()
            .map(|p| p[1])
            .fold(f32::NEG_INFINITY, f32::max);

        hha.as_slice_mut()
            .par_chunks_exact_mut(cols * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                    if let Some(p) = points[y * cols + x] {
                        pixel[0] = 1.0 / p[2];
                        pixel[1] = floor_y - p[1];
                        pixel[2] = normal_angle(&points, cols, rows, x, y);
                    }
                }
            });

        Ok(hha)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rgbd_prep_image::ImageSize;

    use super::*;
    use crate::io::sink::{quantize_u16, HHA_SCALE};

    const K: [[f64; 3]; 3] = [[10.0, 0.0, 2.0], [0.0, 10.0, 2.0], [0.0, 0.0, 1.0]];

    #[test]
    fn fronto_parallel_plane() -> Result<(), PipelineError> {
        let depth = DepthGrid::from_size_val(
            ImageSize {
                width: 5,
                height: 5,
            },
            2.0,
        )?;

        let hha = GeocentricHha.convert(&depth, &K)?;

        for pixel in hha.as_slice().chunks_exact(3) {
            assert_relative_eq!(pixel[0], 0.5, epsilon = 1e-6);
            // a wall facing the camera is perpendicular to gravity
            assert_relative_eq!(pixel[2], std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        }

        // vertical surfaces survive the 16-bit encoding
        let encoded = quantize_u16(&hha, HHA_SCALE);
        assert!(encoded.as_slice().chunks_exact(3).all(|p| p[2] == 1571));

        // bottom row is the floor reference, top row is 4 px * z / fy = 0.8 m above it
        assert_relative_eq!(hha.get_pixel(2, 4, 1)?, 0.0, epsilon = 1e-6);
        assert_relative_eq!(hha.get_pixel(2, 0, 1)?, 0.8, epsilon = 1e-5);

        Ok(())
    }

    #[test]
    fn ground_plane_faces_up() -> Result<(), PipelineError> {
        // a horizontal plane 1 m below the camera: Y = 1 => z = fy / (v - cy)
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let mut depth = DepthGrid::from_size_val(size, 0.0)?;
        for v in 3..5 {
            for u in 0..5 {
                depth.set_pixel(u, v, 0, 10.0 / (v as f32 - 2.0))?;
            }
        }

        let hha = GeocentricHha.convert(&depth, &K)?;

        assert_relative_eq!(hha.get_pixel(2, 3, 2)?, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hha.get_pixel(2, 4, 1)?, 0.0, epsilon = 1e-5);

        Ok(())
    }

    #[test]
    fn missing_depth_is_zero() -> Result<(), PipelineError> {
        let depth = DepthGrid::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0.0, 1.0],
        )?;

        let hha = GeocentricHha.convert(&depth, &K)?;

        assert_eq!(&hha.as_slice()[0..3], &[0.0, 0.0, 0.0]);
        assert_relative_eq!(hha.as_slice()[3], 1.0);

        Ok(())
    }

    #[test]
    fn invalid_intrinsics_fail() -> Result<(), PipelineError> {
        let depth = DepthGrid::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            1.0,
        )?;
        let k = [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]];

        assert!(matches!(
            GeocentricHha.convert(&depth, &k),
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));

        Ok(())
    }
}
