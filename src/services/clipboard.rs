//! Clipboard sink for copying draft replies.

use std::sync::Mutex;

use tracing::debug;

use crate::error::ClipboardError;

/// Somewhere draft text can be copied to.
pub trait ClipboardSink: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard. Opens a fresh handle per write.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        debug!(bytes = text.len(), "Copied to clipboard");
        Ok(())
    }
}

/// In-memory clipboard, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
