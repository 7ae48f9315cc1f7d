//! Per-image JSON documents.
//!
//! One document describes a single image: a COCO-like layout with exactly
//! one `images` entry, that image's annotations, and only the categories
//! those annotations use. Ids are synthetic (see [`unique_id`]) because the
//! documents are not meant to be merged.

use std::collections::BTreeSet;
use std::path::Path;

use rand::distr::{Distribution, Uniform};
use rand::Rng;
use serde::Serialize;

use super::bbox::{BBoxXYWH, Pixel};
use super::io_image::ImageMeta;
use super::model::{BoxRecord, LabelMap};
use super::CategoryId;
use super::io_write::write_atomically;
use crate::error::DetprepError;

#[derive(Clone, Debug, Serialize)]
pub struct IndividualDocument {
    pub info: IndividualInfo,
    pub images: Vec<IndividualImage>,
    pub annotations: Vec<IndividualAnnotation>,
    pub categories: Vec<IndividualCategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndividualInfo {
    pub description: String,
    pub version: String,
    pub year: u32,
    pub contributor: String,
    pub source: String,
    pub license: IndividualLicense,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndividualLicense {
    pub name: String,
    pub url: String,
}

impl Default for IndividualInfo {
    fn default() -> Self {
        Self {
            description: "Individual image annotation".to_string(),
            version: "1.0".to_string(),
            year: 2025,
            contributor: "search engine".to_string(),
            source: "augmented".to_string(),
            license: IndividualLicense {
                name: "Creative Commons Attribution 4.0 International".to_string(),
                url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct IndividualImage {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub size: u64,
    pub format: String,
    pub url: String,
    pub hash: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndividualAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: CategoryId,
    pub segmentation: Vec<Vec<f64>>,
    pub area: f64,
    pub bbox: BBoxXYWH<Pixel>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IndividualCategory {
    pub id: CategoryId,
    pub name: String,
    pub supercategory: String,
}

/// Supercategory stamped on per-image categories.
pub const SUPERCATEGORY: &str = "Tomato Ripeness";

/// Draws a synthetic id: seven random digits followed by the last three
/// digits of `timestamp_secs`.
pub fn unique_id<R: Rng + ?Sized>(rng: &mut R, timestamp_secs: u64) -> u64 {
    // Both bounds are constants with low < high.
    let digits = Uniform::new_inclusive(1_000_000u64, 9_999_999u64)
        .map(|dist| dist.sample(rng))
        .unwrap_or(1_000_000);
    digits * 1000 + timestamp_secs % 1000
}

/// Assembles the document for one image.
///
/// Category entries are the distinct ids of `boxes` in ascending order,
/// named through `names`.
pub fn assemble_individual<R: Rng + ?Sized>(
    file_name: &str,
    meta: &ImageMeta,
    boxes: &[BoxRecord],
    names: &LabelMap,
    rng: &mut R,
    timestamp_secs: u64,
) -> IndividualDocument {
    let image_id = unique_id(rng, timestamp_secs);

    let annotations = boxes
        .iter()
        .map(|record| IndividualAnnotation {
            id: unique_id(rng, timestamp_secs),
            image_id,
            category_id: record.category_id,
            segmentation: Vec::new(),
            area: record.bbox.area(),
            bbox: record.bbox,
        })
        .collect();

    let category_ids: BTreeSet<CategoryId> = boxes.iter().map(|b| b.category_id).collect();
    let categories = category_ids
        .into_iter()
        .map(|id| IndividualCategory {
            id,
            name: names.name_or_placeholder(id),
            supercategory: SUPERCATEGORY.to_string(),
        })
        .collect();

    IndividualDocument {
        info: IndividualInfo::default(),
        images: vec![IndividualImage {
            id: image_id,
            width: meta.width,
            height: meta.height,
            file_name: file_name.to_string(),
            size: meta.size,
            format: meta.format.clone(),
            url: String::new(),
            hash: String::new(),
            status: "success".to_string(),
        }],
        annotations,
        categories,
    }
}

/// Writes a per-image document as pretty-printed JSON. A failed write leaves
/// `path` as it was.
pub fn write_individual_json(path: &Path, doc: &IndividualDocument) -> Result<(), DetprepError> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, doc).map_err(|source| DetprepError::JsonWrite {
            path: path.to_path_buf(),
            source,
        })
    })
}
