//! Dataset descriptor (`data.yaml`) reader and writer.
//!
//! YOLO tooling describes a dataset with a small YAML file:
//!
//! ```yaml
//! path: ./dataset
//! train: train/images
//! val: val/images
//! nc: 3
//! names: [b_fully_ripened, b_half_ripened, b_green]
//! ```
//!
//! `names` may also be an index map (`{0: b_fully_ripened, 1: ...}`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::model::LabelMap;
use crate::error::DetprepError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataYaml {
    /// Class names indexed by 0-based YOLO class id.
    #[serde(default, deserialize_with = "deserialize_names")]
    pub names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nc: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
}

/// Upper bound on index-map keys; gaps are filled, so keys size the vector.
const MAX_CLASS_INDEX: usize = 1 << 16;

#[derive(Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn deserialize_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let names = match DataYamlNames::deserialize(deserializer)? {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let len = mapping.keys().next_back().map_or(0, |max| max.saturating_add(1));
            if len > MAX_CLASS_INDEX {
                return Err(serde::de::Error::custom(format!(
                    "class index {} exceeds the supported maximum of {}",
                    len - 1,
                    MAX_CLASS_INDEX - 1
                )));
            }
            let mut names = vec![String::new(); len];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{}", index);
                }
            }
            names
        }
    };
    Ok(names)
}

impl DataYaml {
    /// Declared class count, falling back to the number of names.
    pub fn class_count(&self) -> usize {
        self.nc.unwrap_or(self.names.len())
    }

    /// `path` joined with `train`, or `train` alone when either is unset.
    pub fn train_path(&self) -> Option<String> {
        join_base(self.path.as_deref(), self.train.as_deref())
    }

    /// `path` joined with `val`, or `val` alone when either is unset.
    pub fn val_path(&self) -> Option<String> {
        join_base(self.path.as_deref(), self.val.as_deref())
    }

    /// Names keyed by category id; YOLO class `i` becomes category `i + 1`.
    pub fn label_map(&self) -> LabelMap {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| ((i + 1) as u64, name.clone()))
            .collect()
    }
}

fn join_base(base: Option<&str>, split: Option<&str>) -> Option<String> {
    match (base, split) {
        (Some(base), Some(split)) if !base.is_empty() && !split.is_empty() => {
            Some(format!("{}/{}", base, split))
        }
        (_, split) => split.map(str::to_string),
    }
}

pub fn read_data_yaml(path: &Path) -> Result<DataYaml, DetprepError> {
    let data = fs::read_to_string(path).map_err(DetprepError::io_at(path))?;
    serde_yaml::from_str(&data).map_err(|source| DetprepError::DataYamlParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn from_data_yaml_str(yaml: &str) -> Result<DataYaml, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

pub fn write_data_yaml(path: &Path, data: &DataYaml) -> Result<(), DetprepError> {
    let yaml = serde_yaml::to_string(data).map_err(|source| DetprepError::DataYamlWrite {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(DetprepError::io_at(path))
}

/// Reads every document of a multi-document (`---` separated) YAML file.
pub fn read_yaml_documents(path: &Path) -> Result<Vec<serde_yaml::Value>, DetprepError> {
    let data = fs::read_to_string(path).map_err(DetprepError::io_at(path))?;
    serde_yaml::Deserializer::from_str(&data)
        .map(|document| {
            serde_yaml::Value::deserialize(document).map_err(|source| {
                DetprepError::DataYamlParse {
                    path: path.to_path_buf(),
                    source,
                }
            })
        })
        .collect()
}
