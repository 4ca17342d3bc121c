use rand::{rngs::StdRng, Rng, SeedableRng};
use rgbd_prep_image::{Image, ImageDtype, ImageSize};
use rgbd_prep_imgproc::{
    crop::crop_window,
    flip::horizontal_flip,
    interpolation::InterpolationMode,
    padding::{spatial_padding, Padding2D},
    resize::resize,
    warp::{get_rotation_matrix2d, warp_affine},
};

use crate::{
    config::AugmentationConfig,
    error::PipelineError,
    frame::{DepthGrid, LabelMask, RgbdTriple},
};

/// One draw of the random geometric transform, shared by all rasters of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Size of the rasters the parameters were drawn for.
    pub input_size: ImageSize,
    /// Zero padding applied before any other step.
    pub padding: Padding2D,
    /// Whether the rasters are mirrored left to right.
    pub flip: bool,
    /// Isotropic scale factor.
    pub scale: f64,
    /// Size after scaling; rotation keeps it.
    pub scaled_size: ImageSize,
    /// Rotation angle in degrees, counter-clockwise.
    pub angle: f64,
    /// Zero padding applied when the scaled raster is smaller than the crop.
    pub crop_padding: Padding2D,
    /// Top-left corner of the crop as `(x, y)`.
    pub crop_origin: (usize, usize),
    /// Output size.
    pub crop_size: ImageSize,
}

// uniform in [lo, hi]
fn uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    lo + rng.random::<f64>() * (hi - lo)
}

impl TransformParams {
    /// Draw transform parameters for rasters of `input_size`.
    ///
    /// A fresh generator is seeded from `config.seed` on every call, so equal configurations and
    /// sizes always produce equal parameters. The flip decision, scale, angle and crop origin are
    /// drawn in that order.
    pub fn sample(input_size: ImageSize, config: &AugmentationConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let crop_size = config.crop_size();

        let padding = if config.pad_if_needed {
            Padding2D::to_min_size(input_size, crop_size)
        } else {
            Padding2D::default()
        };
        let padded_size = padding.padded_size(input_size);

        let flip = rng.random::<f64>() < config.horizontal_flip_prob;

        let scale_limit = config.random_scale_limit.abs();
        let scale = uniform(&mut rng, 1.0 - scale_limit, 1.0 + scale_limit);
        let scaled_size = ImageSize {
            width: ((padded_size.width as f64 * scale).floor() as usize).max(1),
            height: ((padded_size.height as f64 * scale).floor() as usize).max(1),
        };

        let rotate_limit = f64::from(config.rotate_limit);
        let angle = uniform(&mut rng, -rotate_limit, rotate_limit);

        let crop_padding = Padding2D::to_min_size(scaled_size, crop_size);
        let crop_source = crop_padding.padded_size(scaled_size);
        let crop_origin = (
            rng.random_range(0..=crop_source.width - crop_size.width),
            rng.random_range(0..=crop_source.height - crop_size.height),
        );

        Self {
            input_size,
            padding,
            flip,
            scale,
            scaled_size,
            angle,
            crop_padding,
            crop_origin,
            crop_size,
        }
    }

    /// Apply the transform to one raster.
    ///
    /// # Arguments
    ///
    /// * `src` - A raster of `self.input_size`.
    /// * `interpolation` - Resampling used for scaling and rotation.
    ///
    /// # Returns
    ///
    /// A raster of `self.crop_size`. Pixels that fall outside the source are zero.
    pub fn apply<T: ImageDtype, const C: usize>(
        &self,
        src: &Image<T, C>,
        interpolation: InterpolationMode,
    ) -> Result<Image<T, C>, PipelineError> {
        if src.size() != self.input_size {
            return Err(PipelineError::InvalidShape(format!(
                "transform drawn for {}, got {}",
                self.input_size,
                src.size()
            )));
        }

        let padded = pad_zero(src, self.padding)?;

        let flipped = if self.flip {
            let mut dst = Image::from_size_val(padded.size(), T::default())?;
            horizontal_flip(&padded, &mut dst)?;
            dst
        } else {
            padded
        };

        let scaled = if flipped.size() != self.scaled_size {
            let mut dst = Image::from_size_val(self.scaled_size, T::default())?;
            resize(&flipped, &mut dst, interpolation)?;
            dst
        } else {
            flipped
        };

        let rotated = if self.angle != 0.0 {
            let center = (
                (scaled.width() as f32 - 1.0) / 2.0,
                (scaled.height() as f32 - 1.0) / 2.0,
            );
            let m = get_rotation_matrix2d(center, self.angle as f32, 1.0);
            let mut dst = Image::from_size_val(scaled.size(), T::default())?;
            warp_affine(&scaled, &mut dst, &m, interpolation)?;
            dst
        } else {
            scaled
        };

        // the crop origin is expressed in the zero padded frame
        let x = self.crop_origin.0 as isize - self.crop_padding.left as isize;
        let y = self.crop_origin.1 as isize - self.crop_padding.top as isize;
        let mut dst = Image::from_size_val(self.crop_size, T::default())?;
        crop_window(&rotated, &mut dst, x, y, [T::default(); C])?;

        Ok(dst)
    }
}

fn pad_zero<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    padding: Padding2D,
) -> Result<Image<T, C>, PipelineError> {
    if padding.is_empty() {
        return Ok(src.clone());
    }

    let mut dst = Image::from_size_val(padding.padded_size(src.size()), T::default())?;
    spatial_padding(src, &mut dst, padding, [T::default(); C])?;

    Ok(dst)
}

/// Apply one random geometric transform jointly to an RGB image, a depth map and a mask.
///
/// RGB and depth are resampled bilinearly, the mask with nearest neighbor so no new class
/// values appear. With augmentation disabled the inputs are returned unchanged.
///
/// # Errors
///
/// `PipelineError::InputShapeMismatch` when the three rasters do not share one size.
///
/// # Example
///
/// ```
/// use rgbd_prep_image::{Image, ImageSize};
/// use rgbd_prep_pipeline::{augment::augment, config::AugmentationConfig};
///
/// let size = ImageSize { width: 40, height: 30 };
/// let rgb = Image::<u8, 3>::from_size_val(size, 128).unwrap();
/// let depth = Image::<f32, 1>::from_size_val(size, 1.5).unwrap();
/// let mask = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// let config = AugmentationConfig::with_crop_size(ImageSize { width: 32, height: 24 });
/// let out = augment(&rgb, &depth, &mask, &config).unwrap();
///
/// assert_eq!(out.rgb.size(), ImageSize { width: 32, height: 24 });
/// assert_eq!(out.depth.size(), out.mask.size());
/// ```
pub fn augment(
    rgb: &Image<u8, 3>,
    depth: &DepthGrid,
    mask: &LabelMask,
    config: &AugmentationConfig,
) -> Result<RgbdTriple, PipelineError> {
    if rgb.size() != depth.size() || rgb.size() != mask.size() {
        return Err(PipelineError::InputShapeMismatch(
            rgb.size(),
            depth.size(),
            mask.size(),
        ));
    }

    if !config.enabled {
        return Ok(RgbdTriple {
            rgb: rgb.clone(),
            depth: depth.clone(),
            mask: mask.clone(),
        });
    }

    let params = TransformParams::sample(rgb.size(), config);
    log::debug!(
        "Augmenting {}: flip={} scale={:.3} angle={:.2} crop at {:?}",
        rgb.size(),
        params.flip,
        params.scale,
        params.angle,
        params.crop_origin
    );

    Ok(RgbdTriple {
        rgb: params.apply(rgb, InterpolationMode::Bilinear)?,
        depth: params.apply(depth, InterpolationMode::Bilinear)?,
        mask: params.apply(mask, InterpolationMode::Nearest)?,
    })
}
