//! Output file replacement.
//!
//! Writers render into a temp file next to the target and rename it into
//! place, so a failed write leaves any previous file untouched and never a
//! truncated one.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::DetprepError;

/// Runs `write` against a buffered temp file in `path`'s directory, then
/// renames the temp file over `path`. On any error the temp file is removed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), DetprepError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), DetprepError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(DetprepError::io_at(path))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush().map_err(DetprepError::io_at(path))?;
    }

    tmp.persist(path)
        .map_err(|err| DetprepError::io_at(path)(err.error))?;
    Ok(())
}
