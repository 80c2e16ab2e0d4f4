//! Resource types for embedded binaries (images, OLE objects).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An embedded resource in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Decompressed binary data, serialized as base64
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/png")
    pub mime_type: String,

    /// Resource type
    pub resource_type: ResourceType,

    /// Name of the part inside the container, e.g. "BinData/BIN0001.png"
    pub filename: Option<String>,
}

fn to_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}

impl Resource {
    /// Create a new resource.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            resource_type,
            filename: None,
        }
    }

    /// Create an image resource.
    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::new(data, mime_type, ResourceType::Image)
    }

    /// Create a resource, sniffing its MIME type from the bytes and falling
    /// back to the extension of `filename`.
    pub fn from_bytes(data: Vec<u8>, filename: Option<&str>) -> Self {
        let extension = filename
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let mime = Self::detect_mime_type(&data)
            .or_else(|| extension.as_deref().and_then(mime_from_extension))
            .unwrap_or("application/octet-stream");
        let resource_type = if mime.starts_with("image/") {
            ResourceType::Image
        } else if matches!(extension.as_deref(), Some("ole")) {
            ResourceType::Attachment
        } else {
            ResourceType::Other
        };
        Self {
            filename: filename.map(String::from),
            ..Self::new(data, mime, resource_type)
        }
    }

    /// Set filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Get the size of the resource data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this is an image resource.
    pub fn is_image(&self) -> bool {
        matches!(self.resource_type, ResourceType::Image)
    }

    /// Suggested output filename for a resource id.
    pub fn suggested_filename(&self, id: &str) -> String {
        if let Some(name) = self.filename.as_deref().and_then(|f| f.rsplit('/').next()) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        format!("{}.{}", id, self.extension())
    }

    /// Get the file extension based on MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/tiff" => "tiff",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            "image/x-wmf" => "wmf",
            "image/x-emf" => "emf",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }

    /// `data:` URI for inline embedding.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// Detect MIME type from data magic bytes.
    pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
        if data.len() < 4 {
            return None;
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some("image/png");
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("image/gif");
        }
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some("image/tiff");
        }
        if data.starts_with(b"BM") {
            return Some("image/bmp");
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }
        // Placeable WMF header
        if data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
            return Some("image/x-wmf");
        }
        // EMR_HEADER record with " EMF" signature at offset 40
        if data.len() >= 44 && data.starts_with(&[0x01, 0x00, 0x00, 0x00]) && &data[40..44] == b" EMF"
        {
            return Some("image/x-emf");
        }

        None
    }
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "wmf" => "image/x-wmf",
        "emf" => "image/x-emf",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => return None,
    })
}

/// Type of embedded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Image (PNG, JPEG, WMF, ...)
    Image,
    /// Embedded OLE object
    Attachment,
    /// Other/unknown
    Other,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Image => write!(f, "image"),
            ResourceType::Attachment => write!(f, "attachment"),
            ResourceType::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_type() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(Resource::detect_mime_type(&jpeg), Some("image/jpeg"));

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(Resource::detect_mime_type(&png), Some("image/png"));

        assert_eq!(Resource::detect_mime_type(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn test_from_bytes_falls_back_to_extension() {
        let res = Resource::from_bytes(vec![1, 2, 3, 4, 5], Some("BinData/BIN0001.bmp"));
        assert_eq!(res.mime_type, "image/bmp");
        assert!(res.is_image());
        assert_eq!(res.suggested_filename("1"), "BIN0001.bmp");

        let unknown = Resource::from_bytes(vec![1, 2, 3, 4], None);
        assert_eq!(unknown.resource_type, ResourceType::Other);
        assert_eq!(unknown.suggested_filename("7"), "7.bin");
    }

    #[test]
    fn test_data_serialized_as_base64() {
        let res = Resource::image(b"\x89PNG".to_vec(), "image/png");
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("\"iVBORw==\""));
        let back: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
        assert_eq!(res.data_uri(), "data:image/png;base64,iVBORw==");
    }
}
