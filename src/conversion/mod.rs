//! Category-to-COCO conversion driver.
//!
//! For each requested split: collect the layout into records, assemble the
//! COCO document and write `<out>/<category>_instances_<split>.json`.

pub mod report;

pub use report::{RunIssue, RunReport, RunSeverity};

use std::fs;
use std::path::Path;

use log::{error, info};

use crate::collect::collect_split_reporting;
use crate::error::DetprepError;
use crate::ir::io_coco_json::{
    assemble_coco, instances_file_name, split_description, write_coco_json, CocoMeta,
};
use crate::ir::io_label_map::read_label_map;
use crate::layout::CategoryLayout;

/// Splits converted when none are requested.
pub const DEFAULT_SPLITS: [&str; 3] = ["train", "val", "test"];

/// Supercategory used when none is configured.
pub const DEFAULT_SUPERCATEGORY: &str = "tomato_ripeness";

/// Options for [`convert_category`].
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub splits: Vec<String>,
    pub supercategory: String,
    pub meta: CocoMeta,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            splits: DEFAULT_SPLITS.iter().map(|s| s.to_string()).collect(),
            supercategory: DEFAULT_SUPERCATEGORY.to_string(),
            meta: CocoMeta::default(),
        }
    }
}

/// Writes one COCO file per split of `<root>/<category>` into `out_dir`.
///
/// The label map is read from the category's `labelmap.json`. A split whose
/// file cannot be written is logged and recorded as failed; the remaining
/// splits still run.
pub fn convert_category(
    root: &Path,
    out_dir: &Path,
    category: &str,
    options: &ConvertOptions,
) -> Result<RunReport, DetprepError> {
    let layout = CategoryLayout::new(root, category);
    if !layout.root.is_dir() {
        return Err(DetprepError::LayoutInvalid {
            path: layout.root.clone(),
            message: "category directory does not exist".to_string(),
        });
    }

    fs::create_dir_all(out_dir).map_err(DetprepError::io_at(out_dir))?;
    let label_map = read_label_map(&layout.label_map_path)?;

    let mut report = RunReport::new("coco");
    for split in &options.splits {
        let dataset = collect_split_reporting(
            &layout,
            split,
            &label_map,
            &options.supercategory,
            &mut report,
        )?;

        let doc = assemble_coco(&dataset, &options.meta, &split_description(category, split));
        let path = out_dir.join(instances_file_name(category, split));

        match write_coco_json(&path, &doc) {
            Ok(()) => {
                info!(
                    "Generated: {} ({} images, {} annotations)",
                    path.display(),
                    doc.images.len(),
                    doc.annotations.len()
                );
                report.add_output(path);
            }
            Err(err) => {
                error!("{}", err);
                report.fail(&path, err.to_string());
            }
        }
    }

    Ok(report)
}
