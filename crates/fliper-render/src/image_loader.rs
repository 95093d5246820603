//! Image loading module.
//! Decodes PNG, JPEG, GIF, BMP and other formats into RGBA FrameBuffers.

use std::path::Path;

use fliper_core::FrameBuffer;

use crate::backend::DecodeError;

/// Load an image file and convert it to an RGBA FrameBuffer.
///
/// The format is sniffed from the file contents, not the extension.
pub fn load_image(path: &Path) -> Result<FrameBuffer, DecodeError> {
    if !path.exists() {
        return Err(DecodeError::Missing(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(DecodeError::NotAFile(path.to_path_buf()));
    }

    let undecodable = |reason: String| DecodeError::Undecodable {
        path: path.to_path_buf(),
        reason,
    };

    let img = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| undecodable(e.to_string()))?
        .decode()
        .map_err(|e| undecodable(e.to_string()))?;

    Ok(from_dynamic(img))
}

fn from_dynamic(img: image::DynamicImage) -> FrameBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    }
}
