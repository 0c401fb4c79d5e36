#![forbid(unsafe_code)]

//! Clipboard seam used by copy, cut and paste.

/// Content held by a clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    /// Raw bytes copied from a document.
    Binary(Vec<u8>),
    /// Text, e.g. bytes copied as code or text from another application.
    Text(String),
}

impl ClipboardContent {
    /// Bytes pasted for this content: raw bytes, or UTF-8 for text.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Binary(bytes) => bytes.clone(),
            Self::Text(text) => text.as_bytes().to_vec(),
        }
    }
}

/// Storage for copied content.
pub trait Clipboard {
    fn contents(&self) -> Option<ClipboardContent>;
    fn set_contents(&mut self, content: ClipboardContent);
    fn clear(&mut self);

    fn has_contents(&self) -> bool {
        self.contents().is_some()
    }
}

/// Process-local clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard for MemoryClipboard {
    fn contents(&self) -> Option<ClipboardContent> {
        self.content.clone()
    }

    fn set_contents(&mut self, content: ClipboardContent) {
        self.content = Some(content);
    }

    fn clear(&mut self) {
        self.content = None;
    }
}
