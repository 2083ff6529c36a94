//! Model downloading utilities.
//!
//! Resolves the default multi-pose model, fetching it next to the working
//! directory when it is not found locally.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{OverlayError, Result};
use crate::utils::format_bytes;
use crate::verbose;

/// Default multi-pose model file name.
pub const DEFAULT_MODEL: &str = "movenet-multipose-lightning.onnx";

/// URL for downloading the default multi-pose model.
const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/pose-compare/models/resolve/main/movenet-multipose-lightning.onnx";

/// Download chunk size in bytes.
const CHUNK_SIZE: usize = 64 * 1024;

/// Ensure a model file exists locally, downloading the default when absent.
///
/// A user-supplied path that does not exist is an error; only the default
/// model name triggers a download.
///
/// # Errors
///
/// Returns an error if the model is missing and cannot be downloaded.
pub fn ensure_model(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    let is_default = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == DEFAULT_MODEL);
    if !is_default {
        return Err(OverlayError::ModelLoadError(format!(
            "Model file not found: {}",
            path.display()
        )));
    }

    download_file(DEFAULT_MODEL_URL, path)?;
    Ok(path.to_path_buf())
}

/// Download a URL to a local file, logging progress totals.
fn download_file(url: &str, dest: &Path) -> Result<()> {
    verbose!("Downloading {url} to {}", dest.display());
    let start = Instant::now();

    let response = ureq::get(url)
        .call()
        .map_err(|e| OverlayError::DownloadError(format!("Failed to fetch {url}: {e}")))?;

    let file = File::create(dest)?;
    let mut writer = BufWriter::new(file);
    let mut reader = response.into_body().into_reader();

    let mut total: u64 = 0;
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader
            .read(&mut chunk)
            .map_err(|e| OverlayError::DownloadError(format!("Read failed: {e}")))?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n])?;
        total += n as u64;
    }
    writer.flush()?;

    verbose!(
        "Downloaded {} in {:.1}s",
        format_bytes(total as f64),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_model_is_returned() {
        // Any existing file qualifies; use this source file.
        let path = Path::new(file!());
        let resolved = ensure_model(path).unwrap();
        assert_eq!(resolved, path.to_path_buf());
    }

    #[test]
    fn test_missing_custom_model_is_error() {
        let result = ensure_model(Path::new("/nonexistent/custom-model.onnx"));
        assert!(matches!(result, Err(OverlayError::ModelLoadError(_))));
    }
}
