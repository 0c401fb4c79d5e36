#![forbid(unsafe_code)]

//! A view paired with its recording command handler.

use bined_core::{EditableBinaryData, KeyEvent};

use crate::command_handler::{CommandHandler, OperationCommandHandler};
use crate::config::EditorConfig;
use crate::macros::MacroCommandHandler;
use crate::undo::CommandResult;
use crate::view::{CodeArea, CodeAreaView};

/// One open document: its view and the handler its input goes through.
#[derive(Debug)]
pub struct BinaryEditor<H = OperationCommandHandler> {
    pub view: CodeAreaView,
    pub handler: MacroCommandHandler<H>,
}

impl BinaryEditor {
    /// Editor over `data` with default settings.
    #[must_use]
    pub fn new(data: impl EditableBinaryData + 'static) -> Self {
        Self::with_handler(
            CodeAreaView::new(CodeArea::new(data)),
            OperationCommandHandler::new(),
        )
    }

    #[must_use]
    pub fn with_config(data: impl EditableBinaryData + 'static, config: &EditorConfig) -> Self {
        Self::with_handler(
            CodeAreaView::with_config(data, config),
            OperationCommandHandler::new(),
        )
    }
}

impl<H: CommandHandler> BinaryEditor<H> {
    #[must_use]
    pub const fn with_handler(view: CodeAreaView, handler: H) -> Self {
        Self {
            view,
            handler: MacroCommandHandler::new(handler),
        }
    }

    /// Route a key event through the handler.
    pub fn key_pressed(&mut self, event: KeyEvent) -> CommandResult {
        self.handler.key_pressed(&mut self.view, event)
    }

    /// Type each character of `text`.
    pub fn type_text(&mut self, text: &str) -> CommandResult {
        for ch in text.chars() {
            self.handler.key_typed(&mut self.view, ch)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_macro_recording(&self) -> bool {
        self.handler.is_macro_recording()
    }

    /// Copy of the document, or empty if it cannot be read.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.view.data_snapshot().unwrap_or_default()
    }
}
