//! Records and file formats for detprep.
//!
//! Every format reader produces [`BoxRecord`]s: a category id plus a
//! pixel-space top-left box ([`BBoxXYWH<Pixel>`]). Writers take the
//! collected [`Dataset`] (or plain box lists) and render one format.
//!
//! # Example
//!
//! ```
//! use detprep::ir::io_yolo::{parse_label_line, to_pixel_box};
//!
//! let row = parse_label_line("0 0.5 0.5 0.2 0.4").unwrap();
//! let record = to_pixel_box(row, 100, 50);
//! assert_eq!(record.category_id.as_u64(), 1);
//! assert_eq!(record.bbox.width, 20.0);
//! ```

mod bbox;
mod ids;
pub mod io_box_csv;
pub mod io_coco_json;
pub mod io_data_yaml;
pub mod io_image;
pub mod io_individual_json;
pub mod io_label_map;
pub mod io_yolo;
mod io_write;
mod model;

pub use bbox::{BBoxXYWH, Normalized, Pixel};
pub use ids::{AnnotationId, CategoryId, ImageId, SequentialIds};
pub use model::{Annotation, BoxRecord, Category, Dataset, Image, LabelMap};
