use std::path::{Path, PathBuf};

use rgbd_prep_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pinhole camera intrinsics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length along x in pixels.
    pub fx: f64,
    /// Focal length along y in pixels.
    pub fy: f64,
    /// Principal point x in pixels.
    pub cx: f64,
    /// Principal point y in pixels.
    pub cy: f64,
}

impl CameraIntrinsics {
    /// The 3x3 intrinsic matrix `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

/// Gap filling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InpaintingConfig {
    /// Name of the gap filling method, e.g. `linear_nearest` or `none`.
    pub method: String,
}

/// Joint geometric augmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentationConfig {
    /// Whether augmentation runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seed of the parameter sampler, re-applied on every call.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Probability of a horizontal flip.
    #[serde(default = "default_flip_prob")]
    pub horizontal_flip_prob: f64,
    /// Scale factors are drawn from `[1 - limit, 1 + limit]`.
    #[serde(default = "default_scale_limit")]
    pub random_scale_limit: f64,
    /// Output size as `[width, height]`.
    pub crop_size: [usize; 2],
    /// Rotation angles are drawn from `[-limit, limit]`, in whole degrees.
    #[serde(default = "default_rotate_limit")]
    pub rotate_limit: u32,
    /// Zero-pad inputs smaller than the crop before transforming.
    #[serde(default = "default_true")]
    pub pad_if_needed: bool,
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    42
}

fn default_flip_prob() -> f64 {
    0.5
}

fn default_scale_limit() -> f64 {
    0.1
}

fn default_rotate_limit() -> u32 {
    15
}

impl AugmentationConfig {
    /// Augmentation with default parameters and the given crop size.
    pub fn with_crop_size(crop_size: ImageSize) -> Self {
        Self {
            enabled: true,
            seed: default_seed(),
            horizontal_flip_prob: default_flip_prob(),
            random_scale_limit: default_scale_limit(),
            crop_size: [crop_size.width, crop_size.height],
            rotate_limit: default_rotate_limit(),
            pad_if_needed: true,
        }
    }

    /// The crop size as an image size.
    pub fn crop_size(&self) -> ImageSize {
        self.crop_size.into()
    }
}

/// Intrinsics of both sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamerasConfig {
    /// Intrinsics of the color camera.
    pub rgb_camera_matrix: CameraIntrinsics,
    /// Intrinsics of the depth camera, used for HHA encoding.
    pub depth_camera_matrix: CameraIntrinsics,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the `rgb`, `depth` and `annotations` folders.
    pub raw_dir: PathBuf,
    /// Directory receiving one `run_<timestamp>` folder per batch.
    pub processed_dir: PathBuf,
}

/// Batch execution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Process frames on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

/// The full pipeline configuration.
///
/// # Example
///
/// ```
/// use rgbd_prep_pipeline::config::PipelineConfig;
///
/// let config = PipelineConfig::from_yaml_str(
///     r#"
/// inpainting:
///   method: linear_nearest
/// augmentation:
///   crop_size: [64, 48]
/// cameras:
///   rgb_camera_matrix: { fx: 500.0, fy: 500.0, cx: 32.0, cy: 24.0 }
///   depth_camera_matrix: { fx: 400.0, fy: 400.0, cx: 32.0, cy: 24.0 }
/// paths:
///   raw_dir: data/raw
///   processed_dir: data/processed
/// "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.augmentation.seed, 42);
/// assert!(!config.execution.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Gap filling settings.
    pub inpainting: InpaintingConfig,
    /// Augmentation settings.
    pub augmentation: AugmentationConfig,
    /// Camera intrinsics.
    pub cameras: CamerasConfig,
    /// Input and output directories.
    pub paths: PathsConfig,
    /// Execution settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl PipelineConfig {
    /// Load and validate a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// `ConfigError::NotFound` when the file is missing, `ConfigError::Parse` when the YAML is
    /// malformed or does not match the schema, and `ConfigError::Invalid` when a value is out of
    /// range.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        log::debug!("Loaded config from {}", path.display());

        Ok(config)
    }

    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the schema alone does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let aug = &self.augmentation;

        if !(0.0..=1.0).contains(&aug.horizontal_flip_prob) {
            return Err(ConfigError::Invalid(format!(
                "horizontal_flip_prob must be in [0, 1], got {}",
                aug.horizontal_flip_prob
            )));
        }

        if !(0.0..1.0).contains(&aug.random_scale_limit) {
            return Err(ConfigError::Invalid(format!(
                "random_scale_limit must be in [0, 1), got {}",
                aug.random_scale_limit
            )));
        }

        if aug.crop_size.contains(&0) {
            return Err(ConfigError::Invalid(format!(
                "crop_size must be non-zero, got {:?}",
                aug.crop_size
            )));
        }

        for (name, camera) in [
            ("rgb_camera_matrix", &self.cameras.rgb_camera_matrix),
            ("depth_camera_matrix", &self.cameras.depth_camera_matrix),
        ] {
            if camera.fx <= 0.0 || camera.fy <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} focal lengths must be positive, got fx={} fy={}",
                    camera.fx, camera.fy
                )));
            }
        }

        Ok(())
    }
}
