//! Structured records shared by every reader and writer.

use std::collections::BTreeMap;

use super::bbox::{BBoxXYWH, Pixel};
use super::ids::{AnnotationId, CategoryId, ImageId};

/// One object box decoded from a YOLO label line or a per-image CSV row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxRecord {
    pub category_id: CategoryId,
    pub bbox: BBoxXYWH<Pixel>,
}

impl BoxRecord {
    pub fn new(category_id: impl Into<CategoryId>, bbox: BBoxXYWH<Pixel>) -> Self {
        Self {
            category_id: category_id.into(),
            bbox,
        }
    }
}

/// An image included in an output document.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub id: ImageId,

    /// Path of the image, `/`-separated, relative to the document's base.
    pub file_name: String,

    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A box attached to one image.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub bbox: BBoxXYWH<Pixel>,
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        record: BoxRecord,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: record.category_id,
            bbox: record.bbox,
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub supercategory: String,
}

impl Category {
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: supercategory.into(),
        }
    }
}

/// The images, annotations and categories collected for one split.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

/// Category id to human-readable name, iterated in ascending id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelMap {
    names: BTreeMap<CategoryId, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<CategoryId>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn get(&self, id: CategoryId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for `id`, or `category_<id>` when the map has no entry.
    pub fn name_or_placeholder(&self, id: CategoryId) -> String {
        self.get(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("category_{}", id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Categories for an output document, dropping an id-0 "background" entry.
    pub fn categories(&self, supercategory: &str) -> Vec<Category> {
        self.iter()
            .filter(|(id, name)| !(id.is_background() && name.eq_ignore_ascii_case("background")))
            .map(|(id, name)| Category::new(id, name, supercategory))
            .collect()
    }
}

impl<I: Into<CategoryId>, S: Into<String>> FromIterator<(I, S)> for LabelMap {
    fn from_iter<T: IntoIterator<Item = (I, S)>>(iter: T) -> Self {
        let mut map = LabelMap::new();
        for (id, name) in iter {
            map.insert(id, name);
        }
        map
    }
}
