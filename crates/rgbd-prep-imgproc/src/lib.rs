#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image cropping module.
pub mod crop;

/// utilities to draw on images.
pub mod draw;

/// image flipping module.
pub mod flip;

/// depth gap filling from scattered valid samples.
pub mod inpaint;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// spatial padding module.
pub mod padding;

/// utility functions for resizing images.
pub mod resize;

/// image geometric transformations module.
pub mod warp;
