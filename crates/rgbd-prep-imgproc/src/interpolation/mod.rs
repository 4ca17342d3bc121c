//! Pixel interpolation methods for image transformations.
//!
//! - **Nearest**: uses the nearest pixel value, never mixes values. Required for label rasters.
//! - **Bilinear**: smooth linear interpolation between the four adjacent pixels.

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

pub(crate) mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
