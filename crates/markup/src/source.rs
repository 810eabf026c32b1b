//! Source photo: the original encoded bytes and their declared format.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::constants::{DEFAULT_BASE_NAME, EDITED_SUFFIX};
use crate::error::SessionError;

/// The photo a session was opened with.
///
/// The encoded bytes are kept for the whole session and shared with export
/// workers; the decoded full-resolution bitmap is never retained.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    format: ImageFormat,
    file_name: Option<String>,
}

impl SourceImage {
    /// Wrap encoded bytes.
    ///
    /// The file signature decides the format when it is recognized, so a
    /// mislabelled upload still decodes; otherwise the declared MIME type is
    /// trusted.
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        mime_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, SessionError> {
        let bytes: Arc<[u8]> = bytes.into();
        let declared = mime_type.and_then(ImageFormat::from_mime_type);
        let sniffed = image::guess_format(&bytes).ok();
        let format = match (declared, sniffed) {
            (Some(declared), Some(sniffed)) if declared != sniffed => {
                debug!(
                    "Declared {:?} but content is {:?}; using the content format",
                    declared, sniffed
                );
                sniffed
            }
            (Some(format), _) | (None, Some(format)) => format,
            (None, None) => {
                return Err(SessionError::UnsupportedFormat(
                    mime_type.unwrap_or("unknown").to_string(),
                ));
            }
        };
        Ok(Self {
            bytes,
            format,
            file_name: file_name.map(str::to_string),
        })
    }

    /// Decode the full-resolution bitmap
    pub fn decode(&self) -> Result<DynamicImage, image::ImageError> {
        image::load_from_memory_with_format(&self.bytes, self.format)
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// File name without directories or extension, `image` if unknown
    pub fn base_name(&self) -> &str {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(DEFAULT_BASE_NAME)
    }

    /// `<base>-edited.<ext>`
    pub fn edited_file_name(&self, extension: &str) -> String {
        format!("{}{}.{}", self.base_name(), EDITED_SUFFIX, extension)
    }
}

/// Preferred file extension for a format
pub fn extension_for(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("bin")
}

/// Parse an output format from an extension (`png`) or MIME type (`image/png`)
pub fn parse_format(name: &str) -> Option<ImageFormat> {
    let name = name.trim();
    if name.contains('/') {
        ImageFormat::from_mime_type(name)
    } else {
        ImageFormat::from_extension(name.trim_start_matches('.'))
    }
}
