//! Fuzz target for dataset descriptor YAML, list and index-map `names`.

#![no_main]

use detprep::ir::io_data_yaml::from_data_yaml_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(descriptor) = from_data_yaml_str(text) {
        let _ = descriptor.label_map();
        let _ = descriptor.train_path();
    }
});
