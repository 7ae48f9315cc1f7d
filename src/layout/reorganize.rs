//! Reorganizes a raw `train/` + `val/` YOLO export into the category layout.
//!
//! Input:
//!
//! ```text
//! <root>/{train,val}/images/<stem>.jpg
//! <root>/{train,val}/labels/<stem>.txt
//! ```
//!
//! Output is [`CategoryLayout`] under `<root>/<category>`. The raw export has
//! no test split, so `test.txt` repeats `val.txt`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::{error, info, warn};

use super::{list_files_with_extensions, write_split_list, CategoryLayout};
use crate::conversion::RunReport;
use crate::error::DetprepError;
use crate::ir::io_box_csv::write_box_csv;
use crate::ir::io_yolo::read_yolo_boxes;

/// Source splits read from the raw export, in processing order.
pub const SOURCE_SPLITS: [&str; 2] = ["train", "val"];

/// Copies images, converts labels to per-image CSV and writes split lists.
///
/// Missing labels and unreadable images are reported as skipped; a CSV or
/// image that cannot be written is reported as failed. Only layout creation
/// and split list writes abort the run.
pub fn reorganize(root: &Path, category: &str) -> Result<RunReport, DetprepError> {
    let layout = CategoryLayout::new(root, category);
    layout.create_dirs()?;

    let mut report = RunReport::new("reorganize");
    let mut train = BTreeSet::new();
    let mut val = BTreeSet::new();

    for split in SOURCE_SPLITS {
        let stems = if split == "train" { &mut train } else { &mut val };
        reorganize_split(root, split, &layout, stems, &mut report)?;
    }

    let overlap: Vec<&String> = train.intersection(&val).collect();
    if !overlap.is_empty() {
        warn!(
            "{} stem(s) appear in both train and val, e.g. '{}'",
            overlap.len(),
            overlap[0]
        );
    }

    let all: BTreeSet<&str> = train.iter().chain(val.iter()).map(String::as_str).collect();
    let lists: [(&str, Vec<&str>); 5] = [
        ("train", train.iter().map(String::as_str).collect()),
        ("val", val.iter().map(String::as_str).collect()),
        ("test", val.iter().map(String::as_str).collect()),
        ("all", all.iter().copied().collect()),
        ("train_val", all.iter().copied().collect()),
    ];

    for (name, stems) in lists {
        let path = layout.split_list_path(name);
        write_split_list(&path, stems.iter().copied())?;
        info!("Wrote {} ({} stems)", path.display(), stems.len());
        report.add_output(path);
    }

    Ok(report)
}

fn reorganize_split(
    root: &Path,
    split: &str,
    layout: &CategoryLayout,
    stems: &mut BTreeSet<String>,
    report: &mut RunReport,
) -> Result<(), DetprepError> {
    let source_images = root.join(split).join("images");
    let source_labels = root.join(split).join("labels");

    if !source_images.is_dir() {
        warn!("no images directory for split '{}' at {}", split, source_images.display());
        return Ok(());
    }

    for source in list_files_with_extensions(&source_images, &["jpg"])? {
        let (Some(stem), Some(file_name)) = (
            source.file_stem().and_then(|s| s.to_str()),
            source.file_name(),
        ) else {
            continue;
        };

        let target = layout.images_dir.join(file_name);
        if let Err(err) = fs::copy(&source, &target) {
            error!("failed to copy {}: {}", source.display(), err);
            report.fail(&source, format!("copy failed: {err}"));
            continue;
        }
        stems.insert(stem.to_string());
        report.images += 1;

        let label_path = source_labels.join(format!("{stem}.txt"));
        if !label_path.is_file() {
            warn!("no label file for {}", source.display());
            report.skip(&label_path, "label file not found");
            continue;
        }

        let boxes = match read_yolo_boxes(&label_path, &target) {
            Ok(boxes) => boxes,
            Err(err) => {
                warn!("skipping labels for {}: {}", source.display(), err);
                report.skip(&label_path, err.to_string());
                continue;
            }
        };

        let csv_path = layout.csv_path(stem);
        match write_box_csv(&csv_path, &boxes) {
            Ok(()) => report.annotations += boxes.len(),
            Err(err) => {
                error!("{}", err);
                report.fail(&csv_path, err.to_string());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::io_box_csv::read_box_csv;
    use crate::ir::io_image::test_support::write_image;
    use crate::layout::read_split_list;

    fn raw_image(root: &Path, split: &str, stem: &str, label: Option<&str>) {
        let images = root.join(split).join("images");
        let labels = root.join(split).join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        write_image(&images.join(format!("{stem}.jpg")), 100, 50);
        if let Some(label) = label {
            fs::write(labels.join(format!("{stem}.txt")), label).unwrap();
        }
    }

    #[test]
    fn builds_layout_and_split_lists() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        raw_image(root, "train", "b", Some("0 0.5 0.5 0.2 0.4\n"));
        raw_image(root, "train", "a", Some("1 0.5 0.5 0.2 0.4\n2 0.1 0.1 0.1 0.1\n"));
        raw_image(root, "val", "c", None);

        let report = reorganize(root, "tomatoes").expect("reorganize");
        let layout = CategoryLayout::new(root, "tomatoes");

        assert!(layout.images_dir.join("a.jpg").is_file());
        assert!(layout.images_dir.join("c.jpg").is_file());
        assert_eq!(read_split_list(&layout.split_list_path("train")).unwrap(), vec!["a", "b"]);
        assert_eq!(read_split_list(&layout.split_list_path("val")).unwrap(), vec!["c"]);
        assert_eq!(read_split_list(&layout.split_list_path("test")).unwrap(), vec!["c"]);
        assert_eq!(
            read_split_list(&layout.split_list_path("train_val")).unwrap(),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            read_split_list(&layout.split_list_path("all")).unwrap(),
            vec!["a", "b", "c"]
        );

        let boxes = read_box_csv(&layout.csv_path("b")).expect("read csv");
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].category_id.as_u64(), 1);
        assert_eq!(boxes[0].bbox.to_array(), [40.0, 15.0, 20.0, 20.0]);
        assert!(!layout.csv_path("c").exists());

        assert_eq!(report.images, 3);
        assert_eq!(report.annotations, 3);
        assert_eq!(report.skipped_count(), 1);
        assert!(report.is_ok());
        assert_eq!(report.outputs.len(), 5);
    }

    #[test]
    fn missing_split_directories_yield_empty_lists() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let report = reorganize(temp.path(), "tomatoes").expect("reorganize");
        let layout = CategoryLayout::new(temp.path(), "tomatoes");

        assert!(read_split_list(&layout.split_list_path("all")).unwrap().is_empty());
        assert!(layout.split_list_path("val").is_file());
        assert_eq!(report.images, 0);
    }

    #[test]
    fn unreadable_image_keeps_stem_but_skips_csv() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        let images = root.join("train/images");
        let labels = root.join("train/labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        fs::write(images.join("broken.jpg"), b"not an image").unwrap();
        fs::write(labels.join("broken.txt"), "0 0.5 0.5 0.1 0.1\n").unwrap();

        let report = reorganize(root, "tomatoes").expect("reorganize");
        let layout = CategoryLayout::new(root, "tomatoes");

        assert_eq!(read_split_list(&layout.split_list_path("train")).unwrap(), vec!["broken"]);
        assert!(!layout.csv_path("broken").exists());
        assert_eq!(report.skipped_count(), 1);
    }
}
