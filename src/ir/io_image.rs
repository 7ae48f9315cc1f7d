//! Image header reads.
//!
//! Only dimensions and a few file facts are needed, so images are never
//! decoded: `imagesize` reads just enough of the header.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::DetprepError;

/// Extensions tried, in priority order, when looking an image up by stem.
pub const LOOKUP_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Extensions recognized when scanning an images directory for stems.
pub const SCAN_EXTENSIONS: [&str; 3] = ["jpg", "png", "bmp"];

/// Returns `(width, height)` in pixels.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), DetprepError> {
    let size = imagesize::size(path).map_err(|source| DetprepError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| DetprepError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| DetprepError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    if width == 0 || height == 0 {
        return Err(DetprepError::LayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image has empty dimensions {}x{}", width, height),
        });
    }

    Ok((width, height))
}

/// Dimensions plus file facts recorded in per-image JSON documents.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    /// File size in bytes.
    pub size: u64,
    /// Upper-case format name derived from the extension, e.g. `JPEG`.
    pub format: String,
}

pub fn read_image_meta(path: &Path) -> Result<ImageMeta, DetprepError> {
    let (width, height) = read_image_dimensions(path)?;
    let size = fs::metadata(path)
        .map_err(DetprepError::io_at(path))?
        .len();

    Ok(ImageMeta {
        width,
        height,
        size,
        format: format_name(path).to_string(),
    })
}

fn format_name(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "PNG",
        "bmp" => "BMP",
        _ => "JPEG",
    }
}

/// Finds `<dir>/<stem>.<ext>` trying [`LOOKUP_EXTENSIONS`] in order.
///
/// Extensions match ignoring case, the same way a directory scan does, so
/// `a.JPG` is found for stem `a`. Between two names with the same extension
/// the exact lower-case one wins.
pub fn find_image_for_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    let preferred = dir.join(format!("{stem}.{}", LOOKUP_EXTENSIONS[0]));
    if preferred.is_file() {
        return Some(preferred);
    }

    let mut best: Option<((usize, bool), PathBuf)> = None;
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.file_stem().and_then(|s| s.to_str()) != Some(stem)
        {
            continue;
        }
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        let Some(rank) = LOOKUP_EXTENSIONS
            .iter()
            .position(|known| ext.eq_ignore_ascii_case(known))
        else {
            continue;
        };
        let key = (rank, ext != LOOKUP_EXTENSIONS[rank]);
        if best.as_ref().map_or(true, |(best_key, _)| key < *best_key) {
            best = Some((key, path.to_path_buf()));
        }
    }

    best.map(|(_, path)| path)
}

/// True when `path` has one of `allowed` as its extension, ignoring case.
pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

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
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
        bytes.extend_from_slice(&2835u32.to_le_bytes());
        bytes.extend_from_slice(&2835u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        bytes.resize(file_size as usize, 0);
        bytes
    }

    /// Writes a BMP at `path`; the extension of `path` does not matter to
    /// `imagesize`, which sniffs the header.
    pub fn write_image(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, bmp_bytes(width, height)).expect("write image file");
    }
}
