//! `labelmap.json` reader.
//!
//! The file is a JSON array of entries such as
//! `{"label_id": 1, "object_name": "b_fully_ripened"}`. Older files spell the
//! id `object_id`; `label_id` wins when both are present.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use super::model::LabelMap;
use crate::error::DetprepError;

#[derive(Debug, Deserialize)]
struct LabelMapEntry {
    #[serde(default)]
    label_id: Option<u64>,

    #[serde(default)]
    object_id: Option<u64>,

    #[serde(default)]
    object_name: String,
}

/// Loads a label map. A missing file gives an empty map.
pub fn read_label_map(path: &Path) -> Result<LabelMap, DetprepError> {
    if !path.is_file() {
        debug!("no label map at {}, using an empty one", path.display());
        return Ok(LabelMap::new());
    }

    let file = File::open(path).map_err(DetprepError::io_at(path))?;
    let entries: Vec<LabelMapEntry> = serde_json::from_reader(BufReader::new(file)).map_err(
        |source| DetprepError::LabelMapParse {
            path: path.to_path_buf(),
            source,
        },
    )?;

    Ok(entries_to_map(entries))
}

/// Parses label map JSON text. Useful for testing without file I/O.
pub fn from_label_map_str(json: &str) -> Result<LabelMap, serde_json::Error> {
    let entries: Vec<LabelMapEntry> = serde_json::from_str(json)?;
    Ok(entries_to_map(entries))
}

fn entries_to_map(entries: Vec<LabelMapEntry>) -> LabelMap {
    entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.label_id.or(entry.object_id)?;
            Some((id, entry.object_name))
        })
        .collect()
}
