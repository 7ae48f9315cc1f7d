//! Per-image JSON generation.
//!
//! Every image of a folder gets a `<stem>.json` document next to it (see
//! [`crate::ir::io_individual_json`]). Boxes come from an existing COCO file
//! when it has any for the image, otherwise from the image's YOLO label file.

use std::collections::BTreeMap;
use std::path::Path;

use log::{error, info, warn};
use rand::Rng;

use crate::conversion::RunReport;
use crate::error::DetprepError;
use crate::ir::io_coco_json::{boxes_by_file_name, read_coco_json};
use crate::ir::io_image::read_image_meta;
use crate::ir::io_individual_json::{assemble_individual, write_individual_json};
use crate::ir::io_yolo::parse_label_str;
use crate::ir::{BoxRecord, LabelMap};
use crate::layout::list_files_with_extensions;

/// Image extensions that get a per-image document.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// `(split folder under data/origin, annotations file under annotations/)`.
pub const ORIGIN_SPLITS: [(&str, &str); 2] = [("train", "train.json"), ("val", "test.json")];

/// Writes a document for every image in `images_dir`.
///
/// A missing or malformed `annotations_file` only disables the COCO source.
/// Unreadable images are skipped; documents that cannot be written are
/// recorded as failures and the remaining images still run.
pub fn generate_individual<R: Rng + ?Sized>(
    images_dir: &Path,
    labels_dir: &Path,
    annotations_file: &Path,
    names: &LabelMap,
    rng: &mut R,
    timestamp_secs: u64,
) -> Result<RunReport, DetprepError> {
    let grouped = load_grouped_boxes(annotations_file);
    let mut report = RunReport::new("individual");

    for image_path in list_files_with_extensions(images_dir, &IMAGE_EXTENSIONS)? {
        let (Some(file_name), Some(stem)) = (
            image_path.file_name().and_then(|s| s.to_str()),
            image_path.file_stem().and_then(|s| s.to_str()),
        ) else {
            continue;
        };

        let meta = match read_image_meta(&image_path) {
            Ok(meta) => meta,
            Err(err) => {
                warn!("skipping unreadable image: {}", err);
                report.skip(&image_path, err.to_string());
                continue;
            }
        };

        let boxes = match grouped.get(file_name) {
            Some(boxes) if !boxes.is_empty() => boxes.clone(),
            _ => label_boxes(&labels_dir.join(format!("{stem}.txt")), meta.width, meta.height),
        };

        let doc = assemble_individual(file_name, &meta, &boxes, names, rng, timestamp_secs);
        let json_path = image_path.with_extension("json");

        match write_individual_json(&json_path, &doc) {
            Ok(()) => {
                info!("Generated: {}", json_path.display());
                report.images += 1;
                report.annotations += boxes.len();
                report.add_output(json_path);
            }
            Err(err) => {
                error!("{}", err);
                report.fail(&json_path, err.to_string());
            }
        }
    }

    Ok(report)
}

/// Runs [`generate_individual`] over `<root>/data/origin/{train,val}`.
///
/// Splits whose images folder does not exist are skipped.
pub fn generate_for_root<R: Rng + ?Sized>(
    root: &Path,
    names: &LabelMap,
    rng: &mut R,
    timestamp_secs: u64,
) -> Result<RunReport, DetprepError> {
    let mut report = RunReport::new("individual");

    for (split, annotations) in ORIGIN_SPLITS {
        let split_dir = root.join("data").join("origin").join(split);
        let images_dir = split_dir.join("images");
        if !images_dir.is_dir() {
            warn!("no images folder for split '{}' at {}", split, images_dir.display());
            continue;
        }

        info!("Processing {} folder...", split);
        report.merge(generate_individual(
            &images_dir,
            &split_dir.join("labels"),
            &root.join("annotations").join(annotations),
            names,
            rng,
            timestamp_secs,
        )?);
    }

    Ok(report)
}

/// Boxes of an existing COCO file keyed by image base name.
fn load_grouped_boxes(annotations_file: &Path) -> BTreeMap<String, Vec<BoxRecord>> {
    if !annotations_file.is_file() {
        warn!("no annotations file at {}", annotations_file.display());
        return BTreeMap::new();
    }

    let doc = match read_coco_json(annotations_file) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("ignoring annotations file: {}", err);
            return BTreeMap::new();
        }
    };

    let mut by_base: BTreeMap<String, Vec<BoxRecord>> = BTreeMap::new();
    for (file_name, boxes) in boxes_by_file_name(&doc) {
        let base = file_name.rsplit('/').next().unwrap_or(&file_name).to_string();
        by_base.entry(base).or_default().extend(boxes);
    }
    by_base
}

fn label_boxes(label_path: &Path, width: u32, height: u32) -> Vec<BoxRecord> {
    if !label_path.is_file() {
        return Vec::new();
    }

    match std::fs::read_to_string(label_path) {
        Ok(content) => parse_label_str(&content, width, height),
        Err(err) => {
            warn!("failed to read {}: {}", label_path.display(), err);
            Vec::new()
        }
    }
}
