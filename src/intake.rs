//! Image intake
//!
//! Reads a single image from disk and turns it into the inline base64 payload
//! that is attached to the dialogue request.

use crate::ai::mime;
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// Base64 image data plus its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub media_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Encode raw bytes under a declared media type. Only `image/*` types are
    /// accepted.
    pub fn new(media_type: &str, bytes: &[u8]) -> Result<Self> {
        if !mime::is_image_mime(media_type) {
            return Err(Error::UnsupportedMedia(media_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(Error::UnsupportedMedia("image file is empty".to_string()));
        }

        Ok(Self {
            media_type: media_type.trim().to_ascii_lowercase(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Encode raw bytes, sniffing the media type from the content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let media_type = mime::detect_image_mime(bytes)
            .ok_or_else(|| Error::UnsupportedMedia("unrecognized image data".to_string()))?;
        Self::new(media_type, bytes)
    }

    /// Parse a `data:<type>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::UnsupportedMedia("not a data URL".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::UnsupportedMedia("data URL has no payload".to_string()))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::UnsupportedMedia("data URL is not base64".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| Error::UnsupportedMedia(format!("invalid base64 payload: {}", e)))?;
        Self::new(media_type, &bytes)
    }

    /// Preview form, suitable for an `<img src>` or a terminal image protocol.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Read an image file and encode it. The media type comes from the extension,
/// falling back to the file's magic bytes.
pub async fn load_image(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!("Error reading file {}: {}", path.display(), e);
        e
    })?;

    let payload = match mime::mime_from_extension(path) {
        Some(media_type) => ImagePayload::new(media_type, &bytes)?,
        None => ImagePayload::from_bytes(&bytes)?,
    };

    tracing::info!(
        "Loaded image {} ({}, {} bytes)",
        path.display(),
        payload.media_type,
        bytes.len()
    );
    Ok(payload)
}
