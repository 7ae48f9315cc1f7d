use detprep::ir::io_box_csv::{from_box_csv_str, to_box_csv_string};
use detprep::ir::io_yolo::{parse_label_line, to_pixel_box};
use proptest::prelude::*;

mod proptest_helpers;
use proptest_helpers::{approx_eq, arb_image_size, arb_label_row, EPS_CSV, EPS_EXACT};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn pixel_box_is_centered_on_scaled_center(
        row in arb_label_row(),
        (width, height) in arb_image_size(),
    ) {
        let record = to_pixel_box(row, width, height);
        let bbox = record.bbox;

        prop_assert_eq!(record.category_id.as_u64(), row.class_id + 1);
        prop_assert!(approx_eq(bbox.x + bbox.width / 2.0, row.cx * width as f64, EPS_EXACT * width as f64));
        prop_assert!(approx_eq(bbox.y + bbox.height / 2.0, row.cy * height as f64, EPS_EXACT * height as f64));
        prop_assert!(approx_eq(bbox.width, row.w * width as f64, EPS_EXACT * width as f64));
        prop_assert!(approx_eq(bbox.height, row.h * height as f64, EPS_EXACT * height as f64));
    }

    #[test]
    fn normalizing_restores_label_values(
        row in arb_label_row(),
        (width, height) in arb_image_size(),
    ) {
        let normalized = to_pixel_box(row, width, height)
            .bbox
            .to_normalized(width as f64, height as f64);
        let (cx, cy, w, h) = normalized.to_cxcywh();

        prop_assert!(approx_eq(cx, row.cx, EPS_EXACT));
        prop_assert!(approx_eq(cy, row.cy, EPS_EXACT));
        prop_assert!(approx_eq(w, row.w, EPS_EXACT));
        prop_assert!(approx_eq(h, row.h, EPS_EXACT));
    }

    #[test]
    fn csv_write_stays_within_a_hundredth_of_a_pixel(
        rows in proptest::collection::vec(arb_label_row(), 0..12),
        (width, height) in arb_image_size(),
    ) {
        let records: Vec<_> = rows.iter().map(|row| to_pixel_box(*row, width, height)).collect();
        let csv = to_box_csv_string(&records).expect("write csv");
        let restored = from_box_csv_str(&csv).expect("read csv");

        prop_assert_eq!(restored.len(), records.len());
        for (before, after) in records.iter().zip(&restored) {
            prop_assert_eq!(before.category_id, after.category_id);
            for (a, b) in before.bbox.to_array().into_iter().zip(after.bbox.to_array()) {
                prop_assert!(approx_eq(a, b, EPS_CSV), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn formatted_rows_parse_back(row in arb_label_row()) {
        let line = format!("{} {} {} {} {}", row.class_id, row.cx, row.cy, row.w, row.h);
        prop_assert_eq!(parse_label_line(&line), Some(row));
    }

    #[test]
    fn short_lines_are_not_records(tokens in proptest::collection::vec("[0-9.]{1,6}", 0..5)) {
        prop_assert_eq!(parse_label_line(&tokens.join(" ")), None);
    }
}
