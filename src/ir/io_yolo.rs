//! YOLO label files.
//!
//! A label file has one object per line: `<class> <cx> <cy> <w> <h>`, with
//! the spatial values normalized to the image size. Class ids are 0-based;
//! decoded boxes get `class + 1` so that category 0 stays free for
//! "background".

use std::fs;
use std::path::Path;

use super::bbox::{BBoxXYWH, Pixel};
use super::io_image::read_image_dimensions;
use super::model::BoxRecord;
use super::CategoryId;
use crate::error::DetprepError;

/// The numeric fields of one label line, still normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLabelRow {
    pub class_id: u64,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Parses one label line.
///
/// Returns `None` for lines that are not a record: blank lines, fewer than
/// five tokens, tokens that do not parse, or a class id with no 1-based
/// category (`u64::MAX`). Tokens past the fifth are ignored.
pub fn parse_label_line(line: &str) -> Option<YoloLabelRow> {
    // Take at most 5 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = line.split_whitespace().take(5).collect();
    if tokens.len() < 5 {
        return None;
    }

    let class_id: u64 = tokens[0].parse().ok()?;
    class_id.checked_add(1)?;

    Some(YoloLabelRow {
        class_id,
        cx: tokens[1].parse().ok()?,
        cy: tokens[2].parse().ok()?,
        w: tokens[3].parse().ok()?,
        h: tokens[4].parse().ok()?,
    })
}

/// Converts a normalized label row to a pixel-space box for an image of the
/// given size.
pub fn to_pixel_box(row: YoloLabelRow, image_width: u32, image_height: u32) -> BoxRecord {
    let image_width = image_width as f64;
    let image_height = image_height as f64;

    let center_x = row.cx * image_width;
    let center_y = row.cy * image_height;
    let width = row.w * image_width;
    let height = row.h * image_height;

    BoxRecord::new(
        CategoryId::new(row.class_id.saturating_add(1)),
        BBoxXYWH::<Pixel>::from_cxcywh(center_x, center_y, width, height),
    )
}

/// Decodes label file contents for an image of the given size, in line order.
pub fn parse_label_str(content: &str, image_width: u32, image_height: u32) -> Vec<BoxRecord> {
    content
        .lines()
        .filter_map(parse_label_line)
        .map(|row| to_pixel_box(row, image_width, image_height))
        .collect()
}

/// Reads `image_path`'s dimensions, then decodes every record of `label_path`.
///
/// Fails if either the image header or the label file cannot be read.
pub fn read_yolo_boxes(label_path: &Path, image_path: &Path) -> Result<Vec<BoxRecord>, DetprepError> {
    let (width, height) = read_image_dimensions(image_path)?;
    let content = fs::read_to_string(label_path).map_err(DetprepError::io_at(label_path))?;
    Ok(parse_label_str(&content, width, height))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Option<BoxRecord> {
    parse_label_line(input).map(|row| to_pixel_box(row, 640, 480))
}
