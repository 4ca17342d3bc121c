use std::{fs::File, path::Path};

use png::{BitDepth, ColorType, Decoder, Encoder};
use rgbd_prep_image::{Image, ImageSize};

use crate::error::PipelineError;

fn u16_to_be_bytes(buf: &[u16]) -> Vec<u8> {
    buf.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn be_bytes_to_u16(buf: &[u8]) -> Vec<u16> {
    buf.chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}

/// Writes an 8-bit grayscale PNG.
pub fn write_png_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), PipelineError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Grayscale,
    )
}

/// Writes a 16-bit grayscale PNG.
pub fn write_png_gray16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 1>,
) -> Result<(), PipelineError> {
    write_png_impl(
        file_path,
        &u16_to_be_bytes(image.as_slice()),
        image.size(),
        BitDepth::Sixteen,
        ColorType::Grayscale,
    )
}

/// Writes an 8-bit RGB PNG.
pub fn write_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), PipelineError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

/// Writes a 16-bit RGB PNG.
pub fn write_png_rgb16(
    file_path: impl AsRef<Path>,
    image: &Image<u16, 3>,
) -> Result<(), PipelineError> {
    write_png_impl(
        file_path,
        &u16_to_be_bytes(image.as_slice()),
        image.size(),
        BitDepth::Sixteen,
        ColorType::Rgb,
    )
}

/// Reads an 8-bit grayscale PNG, e.g. a class mask.
pub fn read_png_gray8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, PipelineError> {
    let (buf, size) = read_png_impl(file_path, BitDepth::Eight, ColorType::Grayscale)?;
    Ok(Image::new(size, buf)?)
}

/// Reads a 16-bit grayscale PNG, e.g. a depth map in millimeters.
pub fn read_png_gray16(file_path: impl AsRef<Path>) -> Result<Image<u16, 1>, PipelineError> {
    let (buf, size) = read_png_impl(file_path, BitDepth::Sixteen, ColorType::Grayscale)?;
    Ok(Image::new(size, be_bytes_to_u16(&buf))?)
}

fn read_png_impl(
    file_path: impl AsRef<Path>,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(Vec<u8>, ImageSize), PipelineError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(PipelineError::SourceUnavailable(
            file_path.to_path_buf(),
            "file does not exist".to_string(),
        ));
    }

    let file = File::open(file_path)?;
    let mut reader = Decoder::new(file)
        .read_info()
        .map_err(|e| PipelineError::PngError(file_path.to_path_buf(), e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| PipelineError::PngError(file_path.to_path_buf(), e.to_string()))?;

    if info.bit_depth != depth || info.color_type != color_type {
        return Err(PipelineError::PngError(
            file_path.to_path_buf(),
            format!(
                "expected {color_type:?} {depth:?}, got {:?} {:?}",
                info.color_type, info.bit_depth
            ),
        ));
    }

    buf.truncate(info.buffer_size());

    Ok((
        buf,
        ImageSize {
            width: info.width as usize,
            height: info.height as usize,
        },
    ))
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    // Make sure you set `depth` correctly
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), PipelineError> {
    let file_path = file_path.as_ref();
    let file = File::create(file_path)?;

    let mut encoder = Encoder::new(file, image_size.width as u32, image_size.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| PipelineError::PngError(file_path.to_path_buf(), e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| PipelineError::PngError(file_path.to_path_buf(), e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rgbd_prep_image::{Image, ImageSize};

    use super::*;

    #[test]
    fn write_read_gray16() -> Result<(), PipelineError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("depth.png");

        let image = Image::<u16, 1>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0, 1, 255, 256, 1000, u16::MAX],
        )?;
        write_png_gray16(&file_path, &image)?;

        let image_back = read_png_gray16(&file_path)?;
        assert_eq!(image_back, image);

        Ok(())
    }

    #[test]
    fn read_wrong_format_fails() -> Result<(), PipelineError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("mask.png");

        let mask = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            3,
        )?;
        write_png_gray8(&file_path, &mask)?;

        assert_eq!(read_png_gray8(&file_path)?, mask);
        assert!(matches!(
            read_png_gray16(&file_path),
            Err(PipelineError::PngError(..))
        ));

        Ok(())
    }

    #[test]
    fn read_missing_file_fails() {
        let res = read_png_gray8("/does/not/exist.png");
        assert!(matches!(res, Err(PipelineError::SourceUnavailable(..))));
    }
}
