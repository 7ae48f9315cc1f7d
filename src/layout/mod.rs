//! Canonical on-disk layout of one dataset category.
//!
//! ```text
//! <root>/<category>/
//!     images/<stem>.jpg
//!     csv/<stem>.csv
//!     sets/{train,val,test,all,train_val}.txt
//!     labelmap.json
//! ```
//!
//! Split lists hold one image stem per line, sorted, without extension.

pub mod reorganize;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::DetprepError;
use crate::ir::io_image::{has_extension, SCAN_EXTENSIONS};

/// Paths of one category inside a dataset root.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub csv_dir: PathBuf,
    pub sets_dir: PathBuf,
    pub label_map_path: PathBuf,
}

impl CategoryLayout {
    /// Layout of `<dataset_root>/<category>`.
    pub fn new(dataset_root: &Path, category: &str) -> Self {
        Self::at(dataset_root.join(category))
    }

    /// Layout rooted directly at `category_root`.
    pub fn at(category_root: impl Into<PathBuf>) -> Self {
        let root = category_root.into();
        Self {
            images_dir: root.join("images"),
            csv_dir: root.join("csv"),
            sets_dir: root.join("sets"),
            label_map_path: root.join("labelmap.json"),
            root,
        }
    }

    pub fn split_list_path(&self, split: &str) -> PathBuf {
        self.sets_dir.join(format!("{split}.txt"))
    }

    pub fn csv_path(&self, stem: &str) -> PathBuf {
        self.csv_dir.join(format!("{stem}.csv"))
    }

    /// Creates `images/`, `csv/` and `sets/` if missing.
    pub fn create_dirs(&self) -> Result<(), DetprepError> {
        for dir in [&self.images_dir, &self.csv_dir, &self.sets_dir] {
            fs::create_dir_all(dir).map_err(DetprepError::io_at(dir))?;
        }
        Ok(())
    }

    /// Image path as recorded in COCO documents: relative to the parent of
    /// the category root, `/`-separated.
    pub fn document_file_name(&self, image_path: &Path) -> String {
        let base = self.root.parent().unwrap_or_else(|| Path::new(""));
        rel_string(base, image_path)
    }

    /// Stems of a split: the persisted list, or a scan of `images/` when the
    /// list is absent or empty.
    pub fn split_stems(&self, split: &str) -> Result<BTreeSet<String>, DetprepError> {
        let listed = read_split_list(&self.split_list_path(split))?;
        if !listed.is_empty() {
            return Ok(listed.into_iter().collect());
        }

        debug!(
            "no stems listed for split '{}', scanning {}",
            split,
            self.images_dir.display()
        );
        scan_image_stems(&self.images_dir)
    }
}

/// Reads a split list. A missing file is an empty list; blank lines are skipped.
pub fn read_split_list(path: &Path) -> Result<Vec<String>, DetprepError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(DetprepError::io_at(path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes `stems` sorted, one per line.
pub fn write_split_list<'a>(
    path: &Path,
    stems: impl IntoIterator<Item = &'a str>,
) -> Result<(), DetprepError> {
    let mut sorted: Vec<&str> = stems.into_iter().collect();
    sorted.sort_unstable();

    let mut content = String::new();
    for stem in sorted {
        content.push_str(stem);
        content.push('\n');
    }
    fs::write(path, content).map_err(DetprepError::io_at(path))
}

/// Stems of the images directly inside `images_dir` with a recognized
/// extension. A missing directory has no stems.
pub fn scan_image_stems(images_dir: &Path) -> Result<BTreeSet<String>, DetprepError> {
    let mut stems = BTreeSet::new();
    if !images_dir.is_dir() {
        return Ok(stems);
    }

    for entry in WalkDir::new(images_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| DetprepError::LayoutInvalid {
            path: images_dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, &SCAN_EXTENSIONS) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.insert(stem.to_string());
        }
    }

    Ok(stems)
}

/// Files directly inside `dir` whose extension is in `extensions`, sorted by name.
pub fn list_files_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, DetprepError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| DetprepError::LayoutInvalid {
            path: dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
