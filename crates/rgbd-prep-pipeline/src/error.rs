use std::path::PathBuf;

use rgbd_prep_image::{ImageError, ImageSize};

/// An error type for the configuration module.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Error when the configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Error to read the configuration file.
    #[error("Failed to read config file. {0}")]
    Io(#[from] std::io::Error),

    /// Error when the configuration is not valid YAML or does not match the schema.
    #[error("Failed to parse config. {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Error when a configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// An error type for the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error when a grid cannot be assembled into a rectangular raster.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Error when an inpainting method name is not known.
    #[error("Unsupported inpainting method: {0}")]
    UnsupportedMethod(String),

    /// Error when the RGB image and the depth grid of a frame disagree in size.
    #[error("Dimension mismatch RGB({rgb}) vs Depth({depth}) for {name}")]
    DimensionMismatch {
        /// The frame base name.
        name: String,
        /// The size of the RGB image.
        rgb: ImageSize,
        /// The size of the depth grid.
        depth: ImageSize,
    },

    /// Error when the rasters handed to the augmenter do not share one size.
    #[error("Augmentation inputs disagree in size: rgb {0}, depth {1}, mask {2}")]
    InputShapeMismatch(ImageSize, ImageSize, ImageSize),

    /// Error when a frame source cannot be read or parsed.
    #[error("Source unavailable {0}: {1}")]
    SourceUnavailable(PathBuf, String),

    /// Error when the HHA converter returns a result that breaks its contract.
    #[error("HHA converter contract violation: {0}")]
    ConverterContractViolation(String),

    /// Error to encode or decode a PNG image.
    #[error("Failed to encode or decode png {0}: {1}")]
    PngError(PathBuf, String),

    /// Error from an image kernel.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the filesystem.
    #[error("Failed to manipulate the file. {0}")]
    Io(#[from] std::io::Error),

    /// Error from the configuration layer.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
