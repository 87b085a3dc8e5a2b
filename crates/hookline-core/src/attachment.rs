// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment codec: raw file bytes to the inline base64 form and back.
//!
//! The inline form is what gets stored with a message and rendered by
//! clients. The raw form is what goes over the wire to a webhook.
//!
//! Only image files are encoded. Anything else picked by the user is left
//! out of the attachment set and out of the outgoing request, which keeps
//! payloads sent to remote endpoints bounded.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HooklineError;

/// Prefix of every key in an [`AttachmentSet`].
pub const KEY_PREFIX: &str = "data";

const IMAGE_PREFIX: &str = "image/";

/// A file embedded inline in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub mime_type: String,
    /// Coarse category, `image` or `file`.
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_extension: String,
    /// Base64 payload (standard alphabet, padded).
    pub data: String,
    #[serde(default)]
    pub file_name: String,
    /// Human-readable size, e.g. `12.5 KB`.
    #[serde(default)]
    pub file_size: String,
}

impl Attachment {
    /// Decodes the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, HooklineError> {
        decode(&self.data)
    }
}

/// One entry of an attachment set.
///
/// Remote endpoints are free to put anything under `data`, so entries that
/// do not look like an [`Attachment`] are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttachmentValue {
    Inline(Attachment),
    Opaque(serde_json::Value),
}

impl AttachmentValue {
    pub fn as_inline(&self) -> Option<&Attachment> {
        match self {
            AttachmentValue::Inline(a) => Some(a),
            AttachmentValue::Opaque(_) => None,
        }
    }
}

impl From<Attachment> for AttachmentValue {
    fn from(value: Attachment) -> Self {
        AttachmentValue::Inline(value)
    }
}

/// Attachments of one message, keyed `data0`, `data1`, ...
///
/// A message without attachments carries `None`, never an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentSet(BTreeMap<String, AttachmentValue>);

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key for the attachment at `index`.
    pub fn key(index: usize) -> String {
        format!("{KEY_PREFIX}{index}")
    }

    /// True for keys of the form `data<N>`.
    pub fn is_key(key: &str) -> bool {
        key.strip_prefix(KEY_PREFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Appends a value under the next free `data<N>` key and returns the key.
    pub fn push(&mut self, value: impl Into<AttachmentValue>) -> String {
        let mut index = self.0.len();
        while self.0.contains_key(&Self::key(index)) {
            index += 1;
        }
        let key = Self::key(index);
        self.0.insert(key.clone(), value.into());
        key
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttachmentValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttachmentValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in index order (`data2` before `data10`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttachmentValue)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by_key(|(k, _)| {
            (
                k.strip_prefix(KEY_PREFIX)
                    .and_then(|n| n.parse::<u64>().ok())
                    .unwrap_or(u64::MAX),
                k.as_str(),
            )
        });
        entries.into_iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `None` when empty, so "no attachments" has one representation.
    pub fn into_non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// A file as picked by the user, before encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a local file, guessing its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, HooklineError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            HooklineError::Validation(format!("cannot read {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        debug!(path = %path.display(), %content_type, bytes = bytes.len(), "file loaded");
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with(IMAGE_PREFIX)
    }
}

impl std::fmt::Debug for RawFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Encodes an image file. Returns `None` for anything that is not an image.
pub fn encode(file: &RawFile) -> Option<Attachment> {
    if !file.is_image() {
        return None;
    }
    Some(Attachment {
        mime_type: file.content_type.clone(),
        file_type: file_type_tag(&file.content_type).to_string(),
        file_extension: extension(&file.name).to_string(),
        data: STANDARD.encode(&file.bytes),
        file_name: file.name.clone(),
        file_size: format_size(file.bytes.len()),
    })
}

/// Encodes every eligible file, in selection order.
pub fn encode_all(files: &[RawFile]) -> Option<AttachmentSet> {
    let mut set = AttachmentSet::new();
    for attachment in files.iter().filter_map(encode) {
        set.push(attachment);
    }
    if set.len() < files.len() {
        debug!(skipped = files.len() - set.len(), "only images are encoded");
    }
    set.into_non_empty()
}

/// The files [`encode`] accepts, in selection order.
pub fn eligible(files: &[RawFile]) -> Vec<RawFile> {
    files.iter().filter(|f| f.is_image()).cloned().collect()
}

/// Decodes a base64 payload.
pub fn decode(payload: &str) -> Result<Vec<u8>, HooklineError> {
    STANDARD.decode(payload.trim()).map_err(|e| {
        debug!(error = %e, len = payload.len(), "attachment payload is not base64");
        HooklineError::MalformedPayload(e.to_string())
    })
}

fn file_type_tag(content_type: &str) -> &'static str {
    if content_type.starts_with(IMAGE_PREFIX) {
        "image"
    } else {
        "file"
    }
}

fn extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Renders a byte count in kilobytes with one decimal.
pub fn format_size(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str, bytes: &[u8]) -> RawFile {
        RawFile::new(name, "image/png", bytes.to_vec())
    }

    #[test]
    fn encode_then_decode_is_byte_identical() {
        let bytes: Vec<u8> = (0..=255).collect();
        let attachment = encode(&png("photo.png", &bytes)).unwrap();
        assert_eq!(attachment.decode().unwrap(), bytes);
    }

    #[test]
    fn encode_fills_metadata() {
        let attachment = encode(&png("cat.photo.PNG", &[0u8; 2048])).unwrap();
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.file_type, "image");
        assert_eq!(attachment.file_extension, "PNG");
        assert_eq!(attachment.file_name, "cat.photo.PNG");
        assert_eq!(attachment.file_size, "2.0 KB");
    }

    #[test]
    fn name_without_suffix_has_empty_extension() {
        let attachment = encode(&png("snapshot", b"x")).unwrap();
        assert_eq!(attachment.file_extension, "");
    }

    #[test]
    fn non_images_are_not_encoded() {
        let pdf = RawFile::new("doc.pdf", "application/pdf", b"%PDF".to_vec());
        assert!(encode(&pdf).is_none());
        assert!(encode_all(&[pdf]).is_none());
    }

    #[test]
    fn encode_all_assigns_keys_in_selection_order() {
        let files = vec![
            png("a.png", b"a"),
            RawFile::new("notes.txt", "text/plain", b"skip".to_vec()),
            png("b.png", b"b"),
        ];
        let set = encode_all(&files).unwrap();
        assert_eq!(set.len(), 2);
        let names: Vec<_> = set
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_inline().unwrap().file_name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("data0".to_string(), "a.png".to_string()),
                ("data1".to_string(), "b.png".to_string())
            ]
        );
        assert_eq!(eligible(&files).len(), 2);
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let err = decode("not base64!!").unwrap_err();
        assert!(matches!(err, HooklineError::MalformedPayload(_)));
    }

    #[test]
    fn size_is_rendered_in_kilobytes() {
        assert_eq!(format_size(0), "0.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1024.0 KB");
    }

    #[test]
    fn key_shape_detection() {
        assert!(AttachmentSet::is_key("data0"));
        assert!(AttachmentSet::is_key("data12"));
        assert!(!AttachmentSet::is_key("data"));
        assert!(!AttachmentSet::is_key("dataX"));
        assert!(!AttachmentSet::is_key("mimeType"));
    }

    #[test]
    fn iteration_follows_numeric_index() {
        let mut set = AttachmentSet::new();
        for i in [10, 2, 0] {
            set.insert(AttachmentSet::key(i), AttachmentValue::Opaque(serde_json::json!(i)));
        }
        let keys: Vec<_> = set.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["data0", "data2", "data10"]);
    }

    #[test]
    fn set_serializes_as_plain_map() {
        let mut set = AttachmentSet::new();
        set.push(encode(&png("x.png", b"hi")).unwrap());
        set.push(AttachmentValue::Opaque(serde_json::json!("raw")));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["data0"]["mimeType"], "image/png");
        assert_eq!(json["data0"]["data"], "aGk=");
        assert_eq!(json["data1"], "raw");

        let back: AttachmentSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[tokio::test]
    async fn from_path_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.jpg");
        tokio::fs::write(&path, b"jpeg-bytes").await.unwrap();

        let file = RawFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "pic.jpg");
        assert_eq!(file.content_type, "image/jpeg");
        assert!(file.is_image());
        assert_eq!(file.bytes, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn from_path_missing_file_is_validation_error() {
        let err = RawFile::from_path("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, HooklineError::Validation(_)));
    }
}
