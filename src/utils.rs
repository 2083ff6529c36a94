//! Utility helpers shared across the crate.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::DynamicImage;

use crate::error::{OverlayError, Result};

/// Load the input photograph.
///
/// JPEG files go through `jpeg_decoder` directly to bypass decoder stride
/// issues; everything else falls back to `image::open`. A missing file is a
/// startup precondition failure, surfaced as an image error.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(OverlayError::ImageError(format!(
            "Input image not found: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    if let Some("jpg") | Some("jpeg") = ext.as_deref() {
        if let Ok(file) = File::open(path) {
            let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
            if let Ok(pixels) = decoder.decode() {
                if let Some(metadata) = decoder.info() {
                    let width = u32::from(metadata.width);
                    let height = u32::from(metadata.height);
                    match metadata.pixel_format {
                        jpeg_decoder::PixelFormat::RGB24 => {
                            if let Some(buffer) =
                                image::ImageBuffer::from_raw(width, height, pixels)
                            {
                                return Ok(DynamicImage::ImageRgb8(buffer));
                            }
                        }
                        jpeg_decoder::PixelFormat::L8 => {
                            if let Some(buffer) =
                                image::ImageBuffer::from_raw(width, height, pixels)
                            {
                                return Ok(DynamicImage::ImageLuma8(buffer));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    image::open(path).map_err(|e| OverlayError::ImageError(e.to_string()))
}

/// Format bytes as a human-readable string (e.g. "10.4MB").
#[must_use]
pub fn format_bytes(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes >= GB {
        format!("{:.1}GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes / KB)
    } else {
        format!("{bytes:.0}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_is_error() {
        let result = load_image(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(OverlayError::ImageError(_))));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512B");
        assert_eq!(format_bytes(2048.0), "2.0KB");
        assert_eq!(format_bytes(10.4 * 1024.0 * 1024.0), "10.4MB");
    }
}
