//! Attachment validation and encoding.
//!
//! Attachments are checked before any network call: images must be a
//! supported format within the model's size limit, other files must be UTF-8
//! text within the per-file and total limits. Images are base64-encoded for
//! the wire; text files are inlined into the prompt as fenced blocks.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gateway_domain::{Capability, FileKind, FileRef, GatewayError, ModelDescriptor};
use std::path::Path;
use tracing::debug;

/// Size limits applied to attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLimits {
    /// Image limit for models that declare none
    pub default_max_image_bytes: u64,
    pub max_file_bytes: u64,
    /// Combined limit over all text files of one request
    pub max_total_file_bytes: u64,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            default_max_image_bytes: 5 * 1024 * 1024,
            max_file_bytes: 256 * 1024,
            max_total_file_bytes: 1024 * 1024,
        }
    }
}

/// A validated attachment, ready for a vendor payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedAttachment {
    Image {
        path: String,
        media_type: &'static str,
        /// Base64 (standard alphabet, padded)
        data: String,
    },
    Text {
        path: String,
        text: String,
    },
}

impl PreparedAttachment {
    pub fn is_image(&self) -> bool {
        matches!(self, PreparedAttachment::Image { .. })
    }

    /// `data:` URL form of an image.
    pub fn data_url(&self) -> Option<String> {
        match self {
            PreparedAttachment::Image {
                media_type, data, ..
            } => Some(format!("data:{media_type};base64,{data}")),
            PreparedAttachment::Text { .. } => None,
        }
    }
}

/// Validate and load every attachment for `model`.
pub async fn prepare(
    attachments: &[FileRef],
    model: &ModelDescriptor,
    limits: &AttachmentLimits,
) -> Result<Vec<PreparedAttachment>, GatewayError> {
    let mut prepared = Vec::with_capacity(attachments.len());
    let mut total_text: u64 = 0;

    for file in attachments {
        let shown = file.host_path.display().to_string();
        let size = file_size(&file.sandbox_path, &shown).await?;

        if file.kind == FileKind::Image {
            if !model.supports(Capability::VisionGeneration) {
                return Err(GatewayError::invalid_attachment(
                    shown,
                    format!("model '{}' does not accept images", model.model_id),
                ));
            }
            let limit = model
                .max_image_bytes
                .unwrap_or(limits.default_max_image_bytes);
            if size > limit {
                return Err(GatewayError::invalid_attachment(
                    shown,
                    format!("image is {size} bytes; limit is {limit}"),
                ));
            }
            let bytes = read(&file.sandbox_path, &shown).await?;
            let media_type = sniff_image(&bytes).ok_or_else(|| {
                GatewayError::invalid_attachment(
                    shown.clone(),
                    "not a PNG, JPEG, GIF or WebP image",
                )
            })?;
            debug!(path = %shown, media_type, bytes = size, "Attachment image accepted");
            prepared.push(PreparedAttachment::Image {
                path: shown,
                media_type,
                data: STANDARD.encode(&bytes),
            });
        } else {
            if size > limits.max_file_bytes {
                return Err(GatewayError::invalid_attachment(
                    shown,
                    format!("file is {size} bytes; limit is {}", limits.max_file_bytes),
                ));
            }
            total_text += size;
            if total_text > limits.max_total_file_bytes {
                return Err(GatewayError::invalid_attachment(
                    shown,
                    format!(
                        "attached files exceed the combined limit of {} bytes",
                        limits.max_total_file_bytes
                    ),
                ));
            }
            let bytes = read(&file.sandbox_path, &shown).await?;
            let text = String::from_utf8(bytes).map_err(|_| {
                GatewayError::invalid_attachment(shown.clone(), "not a UTF-8 text file")
            })?;
            prepared.push(PreparedAttachment::Text {
                path: shown,
                text,
            });
        }
    }

    Ok(prepared)
}

/// The prompt followed by every text attachment as a fenced block.
pub fn compose_prompt(prompt: &str, attachments: &[PreparedAttachment]) -> String {
    let mut out = prompt.to_string();
    for attachment in attachments {
        if let PreparedAttachment::Text { path, text } = attachment {
            out.push_str("\n\n");
            out.push_str(&fenced_block(path, text));
        }
    }
    out
}

/// Render a file as a Markdown code block. The fence is longer than any
/// backtick run inside the file.
pub fn fenced_block(path: &str, text: &str) -> String {
    let longest_run = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let lang = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    format!("File: {path}\n{fence}{lang}\n{text}{newline}{fence}")
}

/// Detect the image format from its magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

async fn file_size(path: &Path, display: &str) -> Result<u64, GatewayError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| GatewayError::invalid_attachment(display, format!("cannot read file: {e}")))?;
    if !metadata.is_file() {
        return Err(GatewayError::invalid_attachment(display, "not a regular file"));
    }
    Ok(metadata.len())
}

async fn read(path: &Path, display: &str) -> Result<Vec<u8>, GatewayError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| GatewayError::invalid_attachment(display, format!("cannot read file: {e}")))
}
