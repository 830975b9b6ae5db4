//! Message content shapes shared between the orchestrator and storage.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageRole {
    /// The human or API caller driving the session.
    User,
    /// The model.
    Assistant,
    /// System-injected content (bootstrap prompt, tool results framed as context).
    System,
}

/// A reference to a stored attachment, never the attachment bytes themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// Stable attachment id, unique within the session.
    pub id: String,
    /// Original filename as supplied by the caller.
    pub name: String,
    /// MIME type as supplied by the caller, not re-sniffed.
    pub mime_type: String,
    /// Size in bytes of the stored asset.
    pub size_bytes: u64,
    /// Path of the stored asset relative to the session's attachment directory.
    pub relative_path: String,
}

/// One segment of a message's content: either inline text or a reference to
/// a previously persisted attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MessageSegment {
    /// Plain text content.
    Text {
        /// The text itself.
        text: String,
    },
    /// A reference to an attachment persisted alongside the session.
    Attachment {
        /// The referenced attachment.
        attachment: AttachmentRef,
    },
}

impl MessageSegment {
    /// The segment's text, if it is a [`MessageSegment::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageSegment::Text { text } => Some(text),
            MessageSegment::Attachment { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_segment_as_text() {
        let seg = MessageSegment::Text {
            text: "hello".to_string(),
        };
        assert_eq!(seg.as_text(), Some("hello"));
    }

    #[test]
    fn attachment_segment_as_text_is_none() {
        let seg = MessageSegment::Attachment {
            attachment: AttachmentRef {
                id: "att-1".to_string(),
                name: "file.png".to_string(),
                mime_type: "image/png".to_string(),
                size_bytes: 10,
                relative_path: "attachments/att-1-file.png".to_string(),
            },
        };
        assert_eq!(seg.as_text(), None);
    }
}
