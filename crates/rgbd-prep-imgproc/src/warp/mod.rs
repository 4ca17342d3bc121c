//! Geometric image transformations using affine warps.
//!
//! # Examples
//!
//! Rotating an image by 45 degrees around its center:
//!
//! ```no_run
//! use rgbd_prep_imgproc::warp::get_rotation_matrix2d;
//!
//! let rotation_matrix = get_rotation_matrix2d((127.5, 127.5), 45.0, 1.0);
//! // Use with warp_affine to rotate the image
//! ```

mod affine;

pub use affine::{get_rotation_matrix2d, invert_affine_transform, warp_affine};
