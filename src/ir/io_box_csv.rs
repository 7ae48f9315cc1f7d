//! Per-image box CSV reader and writer.
//!
//! Each image `<stem>` of a reorganized category has a `csv/<stem>.csv` with
//! one row per object, in pixel space with a top-left origin:
//!
//! ```text
//! #item,x,y,width,height,label
//! 0,40.0,15.0,20.0,20.0,1
//! ```
//!
//! # Column aliases
//!
//! Column names are matched case-insensitively. For each field the aliases
//! are tried in order and the first one holding a parseable number wins:
//!
//! | field    | aliases                      |
//! |----------|------------------------------|
//! | x        | `x`, `xc`, `x_center`        |
//! | y        | `y`, `yc`, `y_center`        |
//! | width    | `w`, `width`, `dx`           |
//! | height   | `h`, `height`, `dy`          |
//! | label    | `label`, `class`, `category_id` |
//!
//! Rows lacking any of x/y/width/height are dropped. A missing label means
//! category 1.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::bbox::{BBoxXYWH, Pixel};
use super::model::BoxRecord;
use super::CategoryId;
use super::io_write::write_atomically;
use crate::error::DetprepError;

const X_ALIASES: [&str; 3] = ["x", "xc", "x_center"];
const Y_ALIASES: [&str; 3] = ["y", "yc", "y_center"];
const W_ALIASES: [&str; 3] = ["w", "width", "dx"];
const H_ALIASES: [&str; 3] = ["h", "height", "dy"];
const LABEL_ALIASES: [&str; 3] = ["label", "class", "category_id"];

/// Header written by [`write_box_csv`].
pub const HEADER: [&str; 6] = ["#item", "x", "y", "width", "height", "label"];

/// Category used for rows without a usable label column.
pub const DEFAULT_CATEGORY: CategoryId = CategoryId(1);

/// Decimal places kept for coordinates on write.
pub const WRITE_DECIMALS: i32 = 2;

/// Reads the boxes of one per-image CSV. A missing file has no boxes.
pub fn read_box_csv(path: &Path) -> Result<Vec<BoxRecord>, DetprepError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(DetprepError::io_at(path))?;
    parse_box_csv(BufReader::new(file), path)
}

/// Reads boxes from CSV text. Useful for testing without file I/O.
pub fn from_box_csv_str(csv_str: &str) -> Result<Vec<BoxRecord>, DetprepError> {
    from_box_csv_slice(csv_str.as_bytes())
}

/// Reads boxes from raw CSV bytes.
pub fn from_box_csv_slice(bytes: &[u8]) -> Result<Vec<BoxRecord>, DetprepError> {
    parse_box_csv(bytes, Path::new("<bytes>"))
}

fn parse_box_csv<R: Read>(reader: R, path: &Path) -> Result<Vec<BoxRecord>, DetprepError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .byte_headers()
        .map_err(|source| DetprepError::BoxCsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = ColumnIndex::from_headers(&headers);

    let mut boxes = Vec::new();
    for result in csv_reader.byte_records() {
        let record = result.map_err(|source| DetprepError::BoxCsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parsed) = columns.parse_row(&record) {
            boxes.push(parsed);
        }
    }

    Ok(boxes)
}

/// Lower-cased header name to column position.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::ByteRecord) -> Self {
        // Later duplicates win, matching a plain dict built over the header.
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (String::from_utf8_lossy(name).trim().to_lowercase(), idx))
            .collect();
        Self { positions }
    }

    fn value(&self, record: &csv::ByteRecord, aliases: &[&str]) -> Option<f64> {
        aliases.iter().find_map(|alias| {
            let idx = *self.positions.get(*alias)?;
            let raw = std::str::from_utf8(record.get(idx)?).ok()?.trim();
            if raw.is_empty() {
                return None;
            }
            raw.parse::<f64>().ok()
        })
    }

    fn parse_row(&self, record: &csv::ByteRecord) -> Option<BoxRecord> {
        let x = self.value(record, &X_ALIASES)?;
        let y = self.value(record, &Y_ALIASES)?;
        let w = self.value(record, &W_ALIASES)?;
        let h = self.value(record, &H_ALIASES)?;

        let category_id = match self.value(record, &LABEL_ALIASES) {
            Some(label) => label_to_category(label)?,
            None => DEFAULT_CATEGORY,
        };

        Some(BoxRecord::new(category_id, BBoxXYWH::new(x, y, w, h)))
    }
}

/// Truncates a numeric label to a category id. Non-finite or negative
/// labels have no category and make the row malformed.
fn label_to_category(label: f64) -> Option<CategoryId> {
    if !label.is_finite() || label < 0.0 {
        return None;
    }
    Some(CategoryId::new(label.trunc() as u64))
}

/// Writes boxes as a per-image CSV, rounding coordinates to two decimals.
pub fn write_box_csv(path: &Path, boxes: &[BoxRecord]) -> Result<(), DetprepError> {
    write_atomically(path, |writer| write_rows(writer, boxes, path))
}

/// Renders boxes as per-image CSV text. Useful for testing without file I/O.
pub fn to_box_csv_string(boxes: &[BoxRecord]) -> Result<String, DetprepError> {
    let dummy_path = Path::new("<string>");
    let mut bytes = Vec::new();
    write_rows(&mut bytes, boxes, dummy_path)?;

    String::from_utf8(bytes).map_err(|e| DetprepError::LayoutInvalid {
        path: dummy_path.to_path_buf(),
        message: format!("Invalid UTF-8 in output: {}", e),
    })
}

fn write_rows<W: Write>(out: W, boxes: &[BoxRecord], path: &Path) -> Result<(), DetprepError> {
    let to_err = |source| DetprepError::BoxCsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::Writer::from_writer(out);
    csv_writer.write_record(HEADER).map_err(to_err)?;

    for (item, record) in boxes.iter().enumerate() {
        let bbox: BBoxXYWH<Pixel> = record.bbox.rounded(WRITE_DECIMALS);
        csv_writer
            .write_record([
                item.to_string(),
                format_coord(bbox.x),
                format_coord(bbox.y),
                format_coord(bbox.width),
                format_coord(bbox.height),
                record.category_id.to_string(),
            ])
            .map_err(to_err)?;
    }

    csv_writer
        .flush()
        .map_err(DetprepError::io_at(path))
}

/// Formats a coordinate so whole numbers keep a trailing `.0` (`40.0`, not `40`).
fn format_coord(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
