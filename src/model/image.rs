//! Image types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// An extracted raster region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub bbox: BBox,

    /// Encoded image bytes (PNG or JPEG); base64 text on the wire
    #[serde(rename = "base64", with = "base64_bytes")]
    pub data: Vec<u8>,

    /// MIME type sniffed from `data`
    pub mime_type: String,

    #[serde(rename = "type")]
    pub kind: ImageKind,

    pub confidence: f32,
    pub page_number: u32,

    /// Width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Image {
    /// Get the size of the encoded payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if the image carries no payload (a placeholder).
    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the file extension based on MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            _ => "bin",
        }
    }
}

/// Kind of extracted raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Figure,
    Photo,
    #[default]
    Unknown,
}

/// Detect MIME type from data magic bytes.
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    None
}

/// MIME type for a payload, `application/octet-stream` when unrecognized.
pub fn mime_type_for(data: &[u8]) -> &'static str {
    detect_mime_type(data).unwrap_or("application/octet-stream")
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
