//! COCO JSON document assembly, writing and reading.
//!
//! COCO bounding boxes are `[x, y, width, height]` with `(x, y)` the
//! top-left corner in pixels, the same shape as [`BBoxXYWH<Pixel>`], so no
//! coordinate conversion happens here.
//!
//! The assembled document always has the same shape: a fixed `info` block
//! (only the description varies), the collected `images`, `annotations` and
//! `categories`, and a one-element `licenses` list. Nothing checks that an
//! annotation's `image_id` or `category_id` refers to an emitted entry.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::bbox::{BBoxXYWH, Pixel};
use super::model::{BoxRecord, Dataset};
use super::{AnnotationId, CategoryId, ImageId};
use super::io_write::write_atomically;
use crate::error::DetprepError;

// ============================================================================
// COCO Schema Types
// ============================================================================

/// Top-level COCO document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CocoDocument {
    #[serde(default)]
    pub info: CocoInfo,

    #[serde(default)]
    pub images: Vec<CocoImage>,

    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,

    #[serde(default)]
    pub categories: Vec<CocoCategory>,

    #[serde(default)]
    pub licenses: Vec<CocoLicense>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoInfo {
    #[serde(default)]
    pub year: u32,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub contributor: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoLicense {
    pub id: u64,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: ImageId,
    pub file_name: String,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,

    /// `[x, y, width, height]`, top-left origin.
    pub bbox: BBoxXYWH<Pixel>,

    #[serde(default)]
    pub area: f64,

    #[serde(default)]
    pub iscrowd: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: CategoryId,
    pub name: String,

    #[serde(default)]
    pub supercategory: String,
}

// ============================================================================
// Fixed metadata
// ============================================================================

/// Static metadata stamped into every assembled document.
#[derive(Clone, Debug, PartialEq)]
pub struct CocoMeta {
    pub year: u32,
    pub version: String,
    pub url: String,
    pub contributor: String,
    pub license: CocoLicense,
}

impl Default for CocoMeta {
    fn default() -> Self {
        Self {
            year: 2020,
            version: "2.0".to_string(),
            url: "https://laboro.ai/".to_string(),
            contributor: "Laboro.ai".to_string(),
            license: CocoLicense {
                id: 1,
                name: "Attribution-NonCommercial-ShareAlike License".to_string(),
                url: "http://creativecommons.org/licenses/by-nc-sa/4.0/".to_string(),
            },
        }
    }
}

/// Description used for the COCO file of one (category, split) pair.
pub fn split_description(category: &str, split: &str) -> String {
    format!("Tomato Ripeness Detection {} {} split", category, split)
}

/// File name of the COCO document for one (category, split) pair.
pub fn instances_file_name(category: &str, split: &str) -> String {
    format!("{}_instances_{}.json", category, split)
}

// ============================================================================
// Assembly
// ============================================================================

/// Wraps collected records into a COCO document.
pub fn assemble_coco(dataset: &Dataset, meta: &CocoMeta, description: &str) -> CocoDocument {
    let info = CocoInfo {
        year: meta.year,
        version: meta.version.clone(),
        description: description.to_string(),
        url: meta.url.clone(),
        contributor: meta.contributor.clone(),
    };

    let images = dataset
        .images
        .iter()
        .map(|img| CocoImage {
            id: img.id,
            file_name: img.file_name.clone(),
            width: img.width,
            height: img.height,
        })
        .collect();

    let annotations = dataset
        .annotations
        .iter()
        .map(|ann| CocoAnnotation {
            id: ann.id,
            image_id: ann.image_id,
            category_id: ann.category_id,
            bbox: ann.bbox,
            area: ann.area(),
            iscrowd: 0,
        })
        .collect();

    let categories = dataset
        .categories
        .iter()
        .map(|cat| CocoCategory {
            id: cat.id,
            name: cat.name.clone(),
            supercategory: cat.supercategory.clone(),
        })
        .collect();

    CocoDocument {
        info,
        images,
        annotations,
        categories,
        licenses: vec![meta.license.clone()],
    }
}

// ============================================================================
// Public I/O API
// ============================================================================

/// Writes a COCO document as pretty-printed JSON, replacing `path` only once
/// the whole document is written.
pub fn write_coco_json(path: &Path, doc: &CocoDocument) -> Result<(), DetprepError> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, doc).map_err(|source| DetprepError::JsonWrite {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Serializes a COCO document. Useful for testing without file I/O.
pub fn to_coco_string(doc: &CocoDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Reads a COCO document from a file.
pub fn read_coco_json(path: &Path) -> Result<CocoDocument, DetprepError> {
    let file = File::open(path).map_err(DetprepError::io_at(path))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DetprepError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a COCO document from a string.
pub fn from_coco_str(json: &str) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a COCO document from a byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Groups a document's boxes by the `file_name` of the image they belong to.
///
/// Annotations whose `image_id` has no image entry are dropped. Within one
/// file the annotation order of the document is kept.
pub fn boxes_by_file_name(doc: &CocoDocument) -> BTreeMap<String, Vec<BoxRecord>> {
    let file_by_id: BTreeMap<ImageId, &str> = doc
        .images
        .iter()
        .map(|img| (img.id, img.file_name.as_str()))
        .collect();

    let mut grouped: BTreeMap<String, Vec<BoxRecord>> = BTreeMap::new();
    for ann in &doc.annotations {
        let Some(file_name) = file_by_id.get(&ann.image_id) else {
            continue;
        };
        grouped
            .entry((*file_name).to_string())
            .or_default()
            .push(BoxRecord::new(ann.category_id, ann.bbox));
    }
    grouped
}
