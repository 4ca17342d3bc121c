#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rgbd_prep_image as image;

#[doc(inline)]
pub use rgbd_prep_imgproc as imgproc;

#[doc(inline)]
pub use rgbd_prep_pipeline as pipeline;
