//! Saving and describing a settled result.
//!
//! These are the download/preview conveniences of the results panel, kept
//! free of any rendering so a CLI or a GUI can both use them.

use crate::error::Web2MdError;
use crate::result::ConversionResult;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when the service did not report a saved file.
pub const DEFAULT_FILENAME: &str = "converted.md";

/// Download name for `result`: the last segment of the server-side path, else
/// [`DEFAULT_FILENAME`].
pub fn suggested_filename(result: &ConversionResult) -> String {
    result
        .saved_file_path()
        .and_then(|p| p.rsplit(['/', '\\']).next())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}

/// Human-readable size of a Markdown document: `812 chars`, `4.2K chars`, `1.3M chars`.
///
/// Counts Unicode scalar values, not bytes.
pub fn format_content_length(markdown: &str) -> String {
    let len = markdown.chars().count();
    if len < 1_000 {
        format!("{len} chars")
    } else if len < 1_000_000 {
        format!("{:.1}K chars", len as f64 / 1_000.0)
    } else {
        format!("{:.1}M chars", len as f64 / 1_000_000.0)
    }
}

/// Write the result's Markdown to `path`.
///
/// Uses atomic write (temp file in the same directory + rename) to prevent
/// partial files.
///
/// # Errors
/// [`Web2MdError::NoMarkdown`] for failure results;
/// [`Web2MdError::OutputWriteFailed`] on I/O errors.
pub fn write_markdown(result: &ConversionResult, path: impl AsRef<Path>) -> Result<(), Web2MdError> {
    let markdown = result.markdown_text().ok_or(Web2MdError::NoMarkdown)?;
    let path = path.as_ref();
    let write_failed = |source: std::io::Error| Web2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_failed)?;
    tmp.write_all(markdown.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    info!("Wrote {} to {}", format_content_length(markdown), path.display());
    Ok(())
}

/// Write the result into `dir` under its [`suggested_filename`]; returns the full path.
pub fn write_markdown_to_dir(
    result: &ConversionResult,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, Web2MdError> {
    let path = dir.as_ref().join(suggested_filename(result));
    write_markdown(result, &path)?;
    Ok(path)
}
