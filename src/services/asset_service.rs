use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::database::models::BusinessId;
use crate::storage::{ObjectStore, StorageError};

pub const IMAGE_PREFIX: &str = "user-images/";
pub const MENU_PREFIX: &str = "user-menus/";

const IMAGE_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp", "svg+xml"];
const DOCUMENT_SUBTYPES: &[&str] = &["pdf"];
const MAX_CATEGORY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid data URI. Expected data:<type>/<subtype>;base64,<payload>")]
    MalformedDataUri,

    #[error("Unsupported format '{found}'. Allowed: {allowed}")]
    UnsupportedFormat { found: String, allowed: String },

    #[error("File exceeds the {} MB limit", .limit / (1024 * 1024))]
    TooLarge { limit: usize },

    #[error("Payload is not valid base64")]
    InvalidBase64,

    #[error("Invalid upload category. Use 1-32 letters, digits, '_' or '-'")]
    InvalidCategory,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Document,
}

impl AssetKind {
    fn media_type(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Document => "application",
        }
    }

    fn allowed_subtypes(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => IMAGE_SUBTYPES,
            AssetKind::Document => DOCUMENT_SUBTYPES,
        }
    }
}

/// A validated, decoded upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAsset {
    pub content_type: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Result of an upload, as returned to dashboard clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub url: String,
    pub filename: String,
    pub placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn extension_for(subtype: &str) -> &'static str {
    match subtype {
        "jpeg" => "jpeg",
        "jpg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        "svg+xml" => "svg",
        _ => "pdf",
    }
}

fn valid_subtype(subtype: &str) -> bool {
    !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
}

/// Decoded length of a base64 payload, exact when the payload is well formed
fn estimated_len(payload: &str) -> usize {
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count().min(2);
    (payload.len() - padding) * 3 / 4
}

/// Parse and decode a `data:` URI of the given kind, enforcing `limit` bytes
pub fn decode_data_uri(kind: AssetKind, data_uri: &str, limit: usize) -> Result<DecodedAsset, IngestError> {
    let rest = data_uri.trim().strip_prefix("data:").ok_or(IngestError::MalformedDataUri)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(IngestError::MalformedDataUri)?;
    let (media_type, subtype) = mime.split_once('/').ok_or(IngestError::MalformedDataUri)?;
    let media_type = media_type.to_ascii_lowercase();
    let subtype = subtype.to_ascii_lowercase();

    if media_type != kind.media_type() || !valid_subtype(&subtype) || payload.is_empty() {
        return Err(IngestError::MalformedDataUri);
    }

    let allowed = kind.allowed_subtypes();
    if !allowed.contains(&subtype.as_str()) {
        return Err(IngestError::UnsupportedFormat {
            found: subtype,
            allowed: allowed.join(", "),
        });
    }

    // Refuse before decoding anything obviously oversized
    if estimated_len(payload) > limit {
        return Err(IngestError::TooLarge { limit });
    }
    let bytes = STANDARD.decode(payload).map_err(|_| IngestError::InvalidBase64)?;
    if bytes.len() > limit {
        return Err(IngestError::TooLarge { limit });
    }

    Ok(DecodedAsset {
        content_type: format!("{}/{}", media_type, subtype),
        extension: extension_for(&subtype),
        bytes,
    })
}

pub fn validate_category(category: &str) -> Result<(), IngestError> {
    let ok = (1..=MAX_CATEGORY_LEN).contains(&category.len())
        && category.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(IngestError::InvalidCategory)
    }
}

fn unique_token() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Inline SVG shown in place of an image that could not be stored
pub fn placeholder_data_uri(category: &str) -> String {
    let svg = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300">"##,
            r##"<rect width="400" height="300" fill="#e5e7eb"/>"##,
            r##"<text x="200" y="150" font-family="sans-serif" font-size="24" fill="#6b7280" "##,
            r##"text-anchor="middle" dominant-baseline="middle">{}</text></svg>"##
        ),
        category.to_uppercase()
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Validates uploads and forwards them to object storage
#[derive(Clone)]
pub struct AssetService {
    store: Arc<dyn ObjectStore>,
    uploads: UploadConfig,
}

impl AssetService {
    pub fn new(store: Arc<dyn ObjectStore>, uploads: UploadConfig) -> Self {
        Self { store, uploads }
    }

    /// Store an image under `user-images/`. Storage failures degrade to a
    /// placeholder when so configured.
    pub async fn ingest_image(&self, data_uri: &str, category: &str) -> Result<UploadOutcome, IngestError> {
        validate_category(category)?;
        let asset = decode_data_uri(AssetKind::Image, data_uri, self.uploads.max_image_bytes)?;

        let filename = format!(
            "{}_{}_{}.{}",
            category,
            Utc::now().timestamp_millis(),
            unique_token(),
            asset.extension
        );
        let path = format!("{}{}", IMAGE_PREFIX, filename);
        let size = asset.bytes.len();

        match self.store.put_public(&path, &asset.content_type, asset.bytes).await {
            Ok(url) => {
                info!("Image uploaded: {} ({} bytes)", path, size);
                Ok(UploadOutcome {
                    url,
                    filename,
                    placeholder: false,
                    warning: None,
                })
            }
            Err(e) if self.uploads.image_placeholder_on_failure => {
                warn!("Image upload failed, serving placeholder: {}", e);
                Ok(UploadOutcome {
                    url: placeholder_data_uri(category),
                    filename: format!("placeholder_{}.svg", category),
                    placeholder: true,
                    warning: Some("Image storage is unavailable; a placeholder image was used".to_string()),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store a tenant's menu PDF under `user-menus/`
    pub async fn ingest_menu(&self, data_uri: &str, business_number: &BusinessId) -> Result<UploadOutcome, IngestError> {
        let asset = decode_data_uri(AssetKind::Document, data_uri, self.uploads.max_document_bytes)?;

        let filename = format!(
            "menu_{}_{}_{}.pdf",
            business_number,
            Utc::now().timestamp_millis(),
            unique_token()
        );
        let path = format!("{}{}", MENU_PREFIX, filename);
        let url = self.store.put_public(&path, &asset.content_type, asset.bytes).await?;
        info!("Menu uploaded for {}: {}", business_number, path);

        Ok(UploadOutcome {
            url,
            filename,
            placeholder: false,
            warning: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryObjectStore;

    const MIB: usize = 1024 * 1024;

    fn data_uri(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }

    fn service() -> (Arc<MemoryObjectStore>, AssetService) {
        let store = Arc::new(MemoryObjectStore::new("https://storage.googleapis.com/bucket/"));
        let service = AssetService::new(store.clone(), AppConfig::development().uploads);
        (store, service)
    }

    #[test]
    fn decodes_allowed_image() {
        let asset = decode_data_uri(AssetKind::Image, &data_uri("image/PNG", b"\x89PNG"), MIB).unwrap();
        assert_eq!(asset.content_type, "image/png");
        assert_eq!(asset.extension, "png");
        assert_eq!(asset.bytes, b"\x89PNG");
    }

    #[test]
    fn svg_maps_to_svg_extension() {
        let asset = decode_data_uri(AssetKind::Image, &data_uri("image/svg+xml", b"<svg/>"), MIB).unwrap();
        assert_eq!(asset.extension, "svg");
    }

    #[test]
    fn rejects_wrong_media_type_and_format() {
        assert!(matches!(
            decode_data_uri(AssetKind::Image, &data_uri("application/pdf", b"%PDF"), MIB),
            Err(IngestError::MalformedDataUri)
        ));
        assert!(matches!(
            decode_data_uri(AssetKind::Image, &data_uri("image/bmp", b"BM"), MIB),
            Err(IngestError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            decode_data_uri(AssetKind::Document, "not a data uri", MIB),
            Err(IngestError::MalformedDataUri)
        ));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            decode_data_uri(AssetKind::Document, "data:application/pdf;base64,@@@@", MIB),
            Err(IngestError::InvalidBase64)
        ));
    }

    #[test]
    fn limit_is_inclusive() {
        let exact = vec![0u8; 1000];
        assert!(decode_data_uri(AssetKind::Document, &data_uri("application/pdf", &exact), 1000).is_ok());
        assert!(matches!(
            decode_data_uri(AssetKind::Document, &data_uri("application/pdf", &exact), 999),
            Err(IngestError::TooLarge { limit: 999 })
        ));
    }

    #[test]
    fn category_rules() {
        assert!(validate_category("logo").is_ok());
        assert!(validate_category("banner_2-x").is_ok());
        assert!(validate_category("").is_err());
        assert!(validate_category("../etc").is_err());
        assert!(validate_category(&"a".repeat(33)).is_err());
    }

    #[tokio::test]
    async fn six_mib_image_is_rejected() {
        let (store, service) = service();
        let uri = data_uri("image/png", &vec![0u8; 6 * MIB]);
        let err = service.ingest_image(&uri, "banner").await.unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { limit } if limit == 5 * MIB));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn four_mib_png_is_stored() {
        let (store, service) = service();
        let uri = data_uri("image/png", &vec![7u8; 4 * MIB]);
        let outcome = service.ingest_image(&uri, "logo").await.unwrap();

        assert!(outcome.url.starts_with("https://storage.googleapis.com/bucket/user-images/logo_"));
        assert!(outcome.url.ends_with(".png"));
        assert!(!outcome.placeholder);
        let stored = store.get(&format!("{}{}", IMAGE_PREFIX, outcome.filename)).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.bytes.len(), 4 * MIB);
    }

    #[tokio::test]
    async fn image_outage_degrades_to_placeholder() {
        let (store, service) = service();
        store.set_failing(true);
        let outcome = service.ingest_image(&data_uri("image/png", b"png"), "logo").await.unwrap();
        assert!(outcome.placeholder);
        assert!(outcome.url.starts_with("data:image/svg+xml;base64,"));
        assert!(outcome.warning.is_some());

        let svg = STANDARD.decode(outcome.url.trim_start_matches("data:image/svg+xml;base64,")).unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("LOGO"));
    }

    #[tokio::test]
    async fn image_outage_fails_when_placeholder_disabled() {
        let store = Arc::new(MemoryObjectStore::new("https://storage.googleapis.com/bucket/"));
        store.set_failing(true);
        let mut uploads = AppConfig::development().uploads;
        uploads.image_placeholder_on_failure = false;
        let service = AssetService::new(store, uploads);

        let err = service.ingest_image(&data_uri("image/png", b"png"), "logo").await.unwrap_err();
        assert!(matches!(err, IngestError::Storage(_)));
    }

    #[tokio::test]
    async fn menu_outage_is_a_hard_failure() {
        let (store, service) = service();
        let bn: BusinessId = "BIS00012".parse().unwrap();

        let ok = service.ingest_menu(&data_uri("application/pdf", b"%PDF-1.4"), &bn).await.unwrap();
        assert!(ok.filename.starts_with("menu_BIS00012_"));
        assert!(ok.url.contains("/user-menus/"));

        store.set_failing(true);
        let err = service.ingest_menu(&data_uri("application/pdf", b"%PDF-1.4"), &bn).await.unwrap_err();
        assert!(matches!(err, IngestError::Storage(_)));
    }
}
