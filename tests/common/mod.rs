#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Minimal 24-bit BMP of the given size. Only the header matters to the
/// dimension reader, the pixel array is zeros.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&[0; 24]);

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Writes an image file (BMP bytes, whatever the extension says).
pub fn write_image(path: &Path, width: u32, height: u32) {
    write_file(path, bmp_bytes(width, height));
}

pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Raw YOLO export under `root`:
///
/// - `train/a.jpg` 100x50 with one box, `train/b.jpg` 40x40 with two
/// - `val/c.jpg` 20x10 without a label file
pub fn write_raw_export(root: &Path) {
    write_image(&root.join("train/images/a.jpg"), 100, 50);
    write_file(&root.join("train/labels/a.txt"), "0 0.5 0.5 0.2 0.4\n");

    write_image(&root.join("train/images/b.jpg"), 40, 40);
    write_file(
        &root.join("train/labels/b.txt"),
        "1 0.25 0.25 0.5 0.5\n2 0.75 0.75 0.1 0.1\n",
    );

    write_image(&root.join("val/images/c.jpg"), 20, 10);
}

/// `labelmap.json` with a background entry and three ripeness classes.
pub fn write_label_map(path: &Path) {
    write_file(
        path,
        r#"[
  {"label_id": 0, "object_name": "background"},
  {"label_id": 1, "object_name": "b_fully_ripened"},
  {"label_id": 2, "object_name": "b_half_ripened"},
  {"object_id": 3, "object_name": "b_green"}
]"#,
    );
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read json file");
    serde_json::from_str(&text).expect("parse json file")
}
