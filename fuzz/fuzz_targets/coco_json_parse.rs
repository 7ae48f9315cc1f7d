//! Fuzz target for COCO JSON reading and box grouping.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use detprep::ir::io_coco_json::{boxes_by_file_name, from_coco_slice};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_coco_slice(data) {
        let _ = boxes_by_file_name(&doc);
    }
});
