//! Dataset collection: one split of a category layout into [`Dataset`] records.
//!
//! Stems are visited in lexicographic order and ids are handed out by fresh
//! [`SequentialIds`] counters, so the same inputs always produce the same ids.

use log::{debug, warn};

use crate::conversion::RunReport;
use crate::error::DetprepError;
use crate::ir::io_box_csv::read_box_csv;
use crate::ir::io_image::{find_image_for_stem, read_image_dimensions};
use crate::ir::{Annotation, Dataset, Image, LabelMap, SequentialIds};
use crate::layout::CategoryLayout;

/// Collects the images and boxes of `split`.
///
/// Categories come from `label_map` in ascending id order, each stamped with
/// `supercategory`. Stems without an image file, and images whose header
/// cannot be read, are skipped without consuming an id.
pub fn collect_split(
    layout: &CategoryLayout,
    split: &str,
    label_map: &LabelMap,
    supercategory: &str,
) -> Result<Dataset, DetprepError> {
    let mut report = RunReport::new("collect");
    collect_split_reporting(layout, split, label_map, supercategory, &mut report)
}

/// Same as [`collect_split`], recording skipped stems in `report`.
pub fn collect_split_reporting(
    layout: &CategoryLayout,
    split: &str,
    label_map: &LabelMap,
    supercategory: &str,
    report: &mut RunReport,
) -> Result<Dataset, DetprepError> {
    let stems = layout.split_stems(split)?;
    debug!("collecting {} stem(s) for split '{}'", stems.len(), split);

    let mut dataset = Dataset {
        categories: label_map.categories(supercategory),
        ..Default::default()
    };
    let mut image_ids = SequentialIds::new();
    let mut annotation_ids = SequentialIds::new();

    for stem in &stems {
        let Some(image_path) = find_image_for_stem(&layout.images_dir, stem) else {
            warn!("no image found for '{}' in {}", stem, layout.images_dir.display());
            report.skip(&layout.images_dir.join(stem), "image not found");
            continue;
        };

        let (width, height) = match read_image_dimensions(&image_path) {
            Ok(dims) => dims,
            Err(err) => {
                warn!("skipping unreadable image: {}", err);
                report.skip(&image_path, err.to_string());
                continue;
            }
        };

        let image_id = image_ids.next_id();
        dataset.images.push(Image::new(
            image_id,
            layout.document_file_name(&image_path),
            width,
            height,
        ));

        let csv_path = layout.csv_path(stem);
        let boxes = match read_box_csv(&csv_path) {
            Ok(boxes) => boxes,
            Err(err) => {
                warn!("ignoring boxes for '{}': {}", stem, err);
                report.skip(&csv_path, err.to_string());
                Vec::new()
            }
        };

        for record in boxes {
            if record.category_id.is_background() {
                continue;
            }
            dataset
                .annotations
                .push(Annotation::new(annotation_ids.next_id(), image_id, record));
        }
    }

    report.images += dataset.images.len();
    report.annotations += dataset.annotations.len();
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::io_box_csv::write_box_csv;
    use crate::ir::io_image::test_support::write_image;
    use crate::ir::{BBoxXYWH, BoxRecord, CategoryId};
    use crate::layout::write_split_list;
    use std::fs;

    fn label_map() -> LabelMap {
        [(0u64, "background"), (1, "b_fully_ripened"), (2, "b_green")]
            .into_iter()
            .collect()
    }

    fn sample_layout(temp: &tempfile::TempDir) -> CategoryLayout {
        let layout = CategoryLayout::new(temp.path(), "tomatoes");
        layout.create_dirs().expect("create dirs");

        write_image(&layout.images_dir.join("b.jpg"), 100, 50);
        write_image(&layout.images_dir.join("a.png"), 40, 30);
        write_box_csv(
            &layout.csv_path("a"),
            &[
                BoxRecord::new(1u64, BBoxXYWH::new(1.0, 2.0, 3.0, 4.0)),
                BoxRecord::new(0u64, BBoxXYWH::new(0.0, 0.0, 5.0, 5.0)),
            ],
        )
        .expect("write csv");
        write_box_csv(
            &layout.csv_path("b"),
            &[BoxRecord::new(2u64, BBoxXYWH::new(10.0, 10.0, 20.0, 20.0))],
        )
        .expect("write csv");
        write_split_list(&layout.split_list_path("train"), ["b", "a", "missing"])
            .expect("write list");
        layout
    }

    #[test]
    fn assigns_sequential_ids_in_stem_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = sample_layout(&temp);

        let mut report = RunReport::new("collect");
        let dataset =
            collect_split_reporting(&layout, "train", &label_map(), "tomato_ripeness", &mut report)
                .expect("collect");

        let files: Vec<&str> = dataset.images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(files, vec!["tomatoes/images/a.png", "tomatoes/images/b.jpg"]);
        assert_eq!(dataset.images[0].id.as_u64(), 1);
        assert_eq!((dataset.images[0].width, dataset.images[0].height), (40, 30));
        assert_eq!(dataset.images[1].id.as_u64(), 2);

        assert_eq!(dataset.annotations.len(), 2);
        assert_eq!(dataset.annotations[0].id.as_u64(), 1);
        assert_eq!(dataset.annotations[0].image_id.as_u64(), 1);
        assert_eq!(dataset.annotations[1].id.as_u64(), 2);
        assert_eq!(dataset.annotations[1].image_id.as_u64(), 2);
        assert_eq!(dataset.annotations[1].category_id, CategoryId::new(2));

        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.images, 2);
        assert_eq!(report.annotations, 2);
    }

    #[test]
    fn background_never_reaches_output() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = sample_layout(&temp);

        let dataset =
            collect_split(&layout, "train", &label_map(), "tomato_ripeness").expect("collect");

        assert!(dataset.annotations.iter().all(|a| !a.category_id.is_background()));
        let ids: Vec<u64> = dataset.categories.iter().map(|c| c.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(dataset
            .categories
            .iter()
            .all(|c| c.supercategory == "tomato_ripeness"));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = sample_layout(&temp);

        let first = collect_split(&layout, "train", &label_map(), "s").expect("collect");
        let second = collect_split(&layout, "train", &label_map(), "s").expect("collect");
        assert_eq!(first.images, second.images);
        assert_eq!(first.annotations, second.annotations);
    }

    #[test]
    fn scans_images_when_list_is_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = sample_layout(&temp);
        fs::write(layout.images_dir.join("c.jpg"), b"not an image").unwrap();

        let dataset = collect_split(&layout, "val", &LabelMap::new(), "s").expect("collect");

        // c.jpg is listed by the scan but cannot be read
        assert_eq!(dataset.images.len(), 2);
        assert_eq!(dataset.images[1].id.as_u64(), 2);
        assert!(dataset.categories.is_empty());
    }

    #[test]
    fn image_without_csv_has_no_annotations() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = CategoryLayout::new(temp.path(), "tomatoes");
        layout.create_dirs().expect("create dirs");
        write_image(&layout.images_dir.join("solo.bmp"), 8, 8);

        let dataset = collect_split(&layout, "train", &label_map(), "s").expect("collect");
        assert_eq!(dataset.images.len(), 1);
        assert!(dataset.annotations.is_empty());
    }

    #[test]
    fn upper_case_extension_is_collected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let layout = CategoryLayout::new(temp.path(), "tomatoes");
        layout.create_dirs().expect("create dirs");
        write_image(&layout.images_dir.join("a.JPG"), 12, 6);
        write_box_csv(
            &layout.csv_path("a"),
            &[BoxRecord::new(1u64, BBoxXYWH::new(1.0, 1.0, 2.0, 2.0))],
        )
        .expect("write csv");

        let mut report = RunReport::new("collect");
        let dataset =
            collect_split_reporting(&layout, "train", &label_map(), "s", &mut report)
                .expect("collect");

        assert_eq!(dataset.images.len(), 1);
        assert_eq!(dataset.images[0].file_name, "tomatoes/images/a.JPG");
        assert_eq!((dataset.images[0].width, dataset.images[0].height), (12, 6));
        assert_eq!(dataset.annotations.len(), 1);
        assert_eq!(report.skipped_count(), 0);
    }
}
