//! Fuzz target for per-image box CSV parsing, header aliases included.

#![no_main]

use detprep::ir::io_box_csv::{from_box_csv_slice, to_box_csv_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(boxes) = from_box_csv_slice(data) {
        let _ = to_box_csv_string(&boxes);
    }
});
