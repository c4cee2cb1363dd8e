//! Image input: validate the path, sniff the file type, decode

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::Path;

/// Check that `path` names a regular file that can be read as an image
///
/// The format is detected from the file's leading bytes, never from its
/// extension, so a renamed text file is rejected.
///
/// # Errors
/// [`Error::StdinUnsupported`] for `-`, [`Error::NotAFile`] for anything that
/// isn't a regular file, [`Error::UnrecognizedImage`] when no signature matches
pub fn sniff_format(path: &Path) -> Result<ImageFormat> {
    let bytes = read_input(path)?;
    guess(path, &bytes)
}

/// Validate, sniff and decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let bytes = read_input(path)?;
    let format = guess(path, &bytes)?;
    log::debug!("Detected {format:?} for {}", path.display());

    image::load_from_memory_with_format(&bytes, format).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate the path and read the file into memory
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        return Err(Error::StdinUnsupported);
    }
    if !path.is_file() {
        return Err(Error::NotAFile {
            path: path.to_path_buf(),
        });
    }

    fs::read(path).map_err(|e| Error::io(path, e))
}

fn guess(path: &Path, bytes: &[u8]) -> Result<ImageFormat> {
    image::guess_format(bytes).map_err(|_| Error::UnrecognizedImage {
        path: path.to_path_buf(),
    })
}
