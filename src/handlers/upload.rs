use base64::{engine::general_purpose, Engine};
use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::AnalysisError;
use crate::models::UploadFormat;

const TEMP_JPEG_QUALITY: u8 = 90;

/// A decoded upload, alive for one request.
pub struct UploadedImage {
    bytes: Vec<u8>,
    format: UploadFormat,
    image: DynamicImage,
    file_name: Option<String>,
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("bytes", &self.bytes.len())
            .field("format", &self.format)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Raw upload as received from the browser.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl Upload {
    /// Checks the declared type (content type first, then file extension),
    /// then decodes the bytes in whichever of JPEG or PNG they actually are.
    pub fn decode(self) -> Result<UploadedImage, AnalysisError> {
        let declared = self
            .content_type
            .as_deref()
            .and_then(UploadFormat::from_mime)
            .or_else(|| self.file_name.as_deref().and_then(UploadFormat::from_file_name))
            .ok_or_else(|| AnalysisError::UnsupportedType(self.declared_type()))?;

        if self.bytes.is_empty() {
            return Err(AnalysisError::Decode("empty upload".to_string()));
        }

        let (format, image_format) = match image::guess_format(&self.bytes) {
            Ok(ImageFormat::Jpeg) => (UploadFormat::Jpeg, ImageFormat::Jpeg),
            Ok(ImageFormat::Png) => (UploadFormat::Png, ImageFormat::Png),
            Ok(other) => {
                return Err(AnalysisError::Decode(format!(
                    "declared {} but content is {:?}",
                    declared, other
                )))
            }
            Err(e) => return Err(AnalysisError::Decode(e.to_string())),
        };
        if format != declared {
            log::debug!("🔀 Upload declared as {} but content is {}", declared, format);
        }

        let image = image::load_from_memory_with_format(&self.bytes, image_format)
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        log::debug!(
            "🖼️ Decoded {} upload: {}x{} ({} bytes)",
            format,
            image.width(),
            image.height(),
            self.bytes.len()
        );

        Ok(UploadedImage {
            bytes: self.bytes,
            format,
            image,
            file_name: self.file_name,
        })
    }

    fn declared_type(&self) -> String {
        self.content_type
            .clone()
            .or_else(|| self.file_name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl UploadedImage {
    pub fn format(&self) -> UploadFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Original bytes as a data URL, for showing the upload back to the user.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Re-encodes the image as RGB JPEG into `dir`. The file is removed when
    /// the returned handle drops.
    pub fn write_temp_copy(&self, dir: &Path) -> Result<NamedTempFile, AnalysisError> {
        let mut jpeg_bytes = Vec::new();
        DynamicImage::ImageRgb8(self.image.to_rgb8())
            .write_to(
                &mut Cursor::new(&mut jpeg_bytes),
                ImageOutputFormat::Jpeg(TEMP_JPEG_QUALITY),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".jpg")
            .tempfile_in(dir)?;
        file.write_all(&jpeg_bytes)?;
        file.flush()?;

        log::debug!(
            "💾 Wrote {} bytes to {}",
            jpeg_bytes.len(),
            file.path().display()
        );

        Ok(file)
    }
}
