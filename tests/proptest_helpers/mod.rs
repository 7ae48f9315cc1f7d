#![allow(dead_code)]

use detprep::ir::io_yolo::YoloLabelRow;
use detprep::ir::{BBoxXYWH, BoxRecord, Pixel};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Tolerance for values that went through f64 arithmetic only.
pub const EPS_EXACT: f64 = 1e-9;

/// Tolerance, in pixels, after the 2-decimal CSV write.
pub const EPS_CSV: f64 = 0.01;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_image_size() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=4096, 1u32..=4096)
}

/// Label rows with every normalized value in `[0, 1]`.
pub fn arb_label_row() -> impl Strategy<Value = YoloLabelRow> {
    (0u64..80, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(class_id, cx, cy, w, h)| YoloLabelRow {
            class_id,
            cx,
            cy,
            w,
            h,
        },
    )
}

/// Pixel boxes already on the 2-decimal grid, so a CSV write is lossless.
pub fn arb_csv_record() -> impl Strategy<Value = BoxRecord> {
    (1u64..=12, 0u32..400_000, 0u32..400_000, 0u32..200_000, 0u32..200_000).prop_map(
        |(category, x, y, w, h)| {
            let bbox: BBoxXYWH<Pixel> = BBoxXYWH::new(
                x as f64 / 100.0,
                y as f64 / 100.0,
                w as f64 / 100.0,
                h as f64 / 100.0,
            );
            BoxRecord::new(category, bbox)
        },
    )
}

pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Renders boxes under an arbitrary header, values in `x,y,w,h,label` order.
pub fn render_csv(header: &str, records: &[BoxRecord]) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for (item, record) in records.iter().enumerate() {
        let [x, y, w, h] = record.bbox.to_array();
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},{}\n",
            item,
            x,
            y,
            w,
            h,
            record.category_id.as_u64()
        ));
    }
    out
}
