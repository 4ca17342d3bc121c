use std::path::{Path, PathBuf};

use rgbd_prep_image::{Image, ImageSize};

use super::FrameLoader;
use crate::{
    error::PipelineError,
    frame::{depth_grid_from_rows, DepthGrid, FrameIdentifier, Polygon, RawFrame},
};

const RGB_DIR: &str = "rgb";
const DEPTH_DIR: &str = "depth";
const ANNOTATIONS_DIR: &str = "annotations";

/// Loads frames from a raw capture directory.
///
/// The directory holds three folders:
///
/// * `rgb/rgb_frame_<id>_png.rf.<hash>.jpg`
/// * `depth/depth_data_<id>.txt`
/// * `annotations/rgb_frame_<id>_png.rf.<hash>.txt`
#[derive(Debug, Clone)]
pub struct FileFrameLoader {
    raw_dir: PathBuf,
}

impl FileFrameLoader {
    /// Create a loader rooted at `raw_dir`.
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }
}

/// Extract `<id>` from a name like `rgb_frame_<id>_png.rf.<hash>.jpg`.
fn frame_id_from_rgb_name(name: &str) -> Option<&str> {
    let start = name.find("rgb_frame_")? + "rgb_frame_".len();
    let rest = &name[start..];
    let end = rest.find("_png.rf.")?;
    match &rest[..end] {
        "" => None,
        id => Some(id),
    }
}

/// Sorted file names of a directory, empty when the directory does not exist.
fn sorted_file_names(dir: &Path) -> Result<Vec<String>, PipelineError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect::<Vec<_>>();
    names.sort();

    Ok(names)
}

fn source_error(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::SourceUnavailable(path.to_path_buf(), e.to_string())
}

/// Decode a color image into an RGB raster.
pub fn read_rgb(path: impl AsRef<Path>) -> Result<Image<u8, 3>, PipelineError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| source_error(path, e))?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.to_rgb8().into_raw())?)
}

/// Parse a raw depth text file in millimeters.
///
/// Two layouts are accepted: a plain whitespace separated grid with one row per line, or a
/// header with `Width: <w>` and `Height: <h>` lines followed by sparse `row,column,value`
/// triples. Pixels without a triple are zero.
///
/// # Errors
///
/// `PipelineError::InvalidShape` for a grid with rows of unequal length, and
/// `PipelineError::SourceUnavailable` when neither layout can be recognized.
pub fn parse_depth_text(content: &str, path: &Path) -> Result<DepthGrid, PipelineError> {
    let lines = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let grid = lines
        .iter()
        .map(|line| {
            line.split_whitespace()
                .map(|token| token.parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>();

    match grid {
        Ok(rows) if !rows.is_empty() => depth_grid_from_rows(rows),
        _ => parse_sparse_depth(&lines, path),
    }
}

fn parse_sparse_depth(lines: &[&str], path: &Path) -> Result<DepthGrid, PipelineError> {
    let header_value = |key: &str| {
        lines
            .iter()
            .filter_map(|line| line.strip_prefix(key))
            .find_map(|value| value.trim().parse::<usize>().ok())
    };

    let (Some(width), Some(height)) = (header_value("Width:"), header_value("Height:")) else {
        return Err(source_error(
            path,
            "not a depth grid and no Width/Height header found",
        ));
    };

    let mut depth = DepthGrid::from_size_val(ImageSize { width, height }, 0.0)?;

    for line in lines {
        let parts = line.split(',').map(str::trim).collect::<Vec<_>>();
        let [row, col, value] = *parts.as_slice() else {
            continue;
        };
        let is_index = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !is_index(row) || !is_index(col) {
            continue;
        }
        let (Ok(row), Ok(col), Ok(value)) = (
            row.parse::<usize>(),
            col.parse::<usize>(),
            value.parse::<f32>(),
        ) else {
            continue;
        };
        if row < height && col < width {
            depth.set_pixel(col, row, 0, value)?;
        }
    }

    Ok(depth)
}

/// Parse polygon annotations, one `class_id x1 y1 x2 y2 ...` polygon per line.
///
/// Lines with an odd number of coordinates are skipped.
pub fn parse_annotations(content: &str, path: &Path) -> Result<Vec<Polygon>, PipelineError> {
    let mut polygons = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let Some(class_token) = tokens.next() else {
            continue;
        };

        let class_id = class_token.parse::<u8>().map_err(|e| {
            source_error(path, format!("line {}: bad class id: {e}", line_no + 1))
        })?;
        let coords = tokens
            .map(|t| t.parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                source_error(path, format!("line {}: bad coordinate: {e}", line_no + 1))
            })?;

        if coords.len() % 2 != 0 {
            log::warn!(
                "Skipping malformed polygon in {} line {}",
                path.display(),
                line_no + 1
            );
            continue;
        }

        polygons.push(Polygon::new(class_id, coords));
    }

    Ok(polygons)
}

impl FrameLoader for FileFrameLoader {
    fn discover(&self) -> Result<Vec<FrameIdentifier>, PipelineError> {
        let rgb_dir = self.raw_dir.join(RGB_DIR);
        let depth_dir = self.raw_dir.join(DEPTH_DIR);
        let annotations_dir = self.raw_dir.join(ANNOTATIONS_DIR);

        if !rgb_dir.is_dir() {
            log::warn!("No rgb directory under {}", self.raw_dir.display());
            return Ok(Vec::new());
        }

        let annotation_names = sorted_file_names(&annotations_dir)?;
        let mut frames = Vec::new();

        for rgb_name in sorted_file_names(&rgb_dir)? {
            if !rgb_name.ends_with(".jpg") {
                continue;
            }
            let Some(id) = frame_id_from_rgb_name(&rgb_name) else {
                continue;
            };

            let depth_path = depth_dir.join(format!("depth_data_{id}.txt"));
            let prefix = format!("rgb_frame_{id}_png.rf.");
            let annotation = annotation_names
                .iter()
                .find(|name| name.starts_with(&prefix) && name.ends_with(".txt"));

            let Some(annotation) = annotation else {
                log::debug!("Skipping {rgb_name}: no annotation file");
                continue;
            };
            if !depth_path.is_file() {
                log::debug!("Skipping {rgb_name}: no depth file");
                continue;
            }

            frames.push(FrameIdentifier {
                base_name: id.to_string(),
                rgb_path: rgb_dir.join(&rgb_name),
                depth_path,
                annotation_path: annotations_dir.join(annotation),
            });
        }

        frames.sort();

        Ok(frames)
    }

    fn load(&self, identifier: &FrameIdentifier) -> Result<RawFrame, PipelineError> {
        let rgb = read_rgb(&identifier.rgb_path)?;

        let depth_path = &identifier.depth_path;
        let depth_text =
            std::fs::read_to_string(depth_path).map_err(|e| source_error(depth_path, e))?;
        let depth_mm = parse_depth_text(&depth_text, depth_path)?;

        let annotation_path = &identifier.annotation_path;
        let annotation_text = std::fs::read_to_string(annotation_path)
            .map_err(|e| source_error(annotation_path, e))?;
        let polygons = parse_annotations(&annotation_text, annotation_path)?;

        Ok(RawFrame {
            identifier: identifier.clone(),
            rgb,
            depth_mm,
            polygons,
        })
    }
}
