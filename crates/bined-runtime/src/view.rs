#![forbid(unsafe_code)]

//! Editor view state.
//!
//! [`CodeArea`] is the single owner of the document and of the caret and
//! selection that operate on it. [`CodeAreaView`] adds the undo history and
//! clipboard a command handler works against.

use std::fmt;

use bined_core::{
    BinaryData, CaretPosition, CodeAreaLayout, CodeAreaSection, CodeCharactersCase, CodeType,
    EditOperation, EditableBinaryData, SelectionRange,
};

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::config::EditorConfig;
use crate::operation::ExecutionResult;
use crate::undo::{CommandResult, HistoryManager};

/// Document plus caret, selection and presentation settings.
pub struct CodeArea {
    data: Box<dyn EditableBinaryData>,
    caret: CaretPosition,
    selection: SelectionRange,
    code_type: CodeType,
    characters_case: CodeCharactersCase,
    edit_operation: EditOperation,
    editable: bool,
    layout: CodeAreaLayout,
    data_changes: u64,
    cursor_reveals: u64,
}

impl fmt::Debug for CodeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeArea")
            .field("data_size", &self.data.size())
            .field("caret", &self.caret)
            .field("selection", &self.selection)
            .field("code_type", &self.code_type)
            .field("edit_operation", &self.edit_operation)
            .field("editable", &self.editable)
            .finish()
    }
}

impl CodeArea {
    /// Editable area over `data` with default settings.
    #[must_use]
    pub fn new(data: impl EditableBinaryData + 'static) -> Self {
        Self {
            data: Box::new(data),
            caret: CaretPosition::default(),
            selection: SelectionRange::default(),
            code_type: CodeType::default(),
            characters_case: CodeCharactersCase::default(),
            edit_operation: EditOperation::default(),
            editable: true,
            layout: CodeAreaLayout::default(),
            data_changes: 0,
            cursor_reveals: 0,
        }
    }

    /// Area configured from editor settings.
    #[must_use]
    pub fn with_config(data: impl EditableBinaryData + 'static, config: &EditorConfig) -> Self {
        let mut area = Self::new(data);
        area.code_type = config.code_type;
        area.characters_case = config.characters_case;
        area.edit_operation = config.edit_operation;
        area.editable = !config.read_only;
        area.layout = CodeAreaLayout::new(config.bytes_per_row, config.rows_per_page);
        area
    }

    #[must_use]
    pub fn content_data(&self) -> &dyn EditableBinaryData {
        self.data.as_ref()
    }

    pub fn content_data_mut(&mut self) -> &mut dyn EditableBinaryData {
        self.data.as_mut()
    }

    #[must_use]
    pub fn data_size(&self) -> u64 {
        self.data.size()
    }

    #[must_use]
    pub const fn caret_position(&self) -> CaretPosition {
        self.caret
    }

    /// Move the caret, clamped to the document end.
    pub fn set_caret_position(&mut self, caret: CaretPosition) {
        let size = self.data.size();
        self.caret = if caret.data_position > size {
            caret.moved_to(size, 0)
        } else {
            caret
        };
    }

    #[must_use]
    pub const fn active_section(&self) -> CodeAreaSection {
        self.caret.section
    }

    #[must_use]
    pub const fn selection(&self) -> SelectionRange {
        self.selection
    }

    pub fn set_selection(&mut self, selection: SelectionRange) {
        self.selection = selection;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    #[must_use]
    pub const fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    #[must_use]
    pub const fn code_type(&self) -> CodeType {
        self.code_type
    }

    pub fn set_code_type(&mut self, code_type: CodeType) {
        self.code_type = code_type;
        let max = code_type.max_digits_for_byte() - 1;
        self.caret.code_offset = self.caret.code_offset.min(max);
    }

    #[must_use]
    pub const fn characters_case(&self) -> CodeCharactersCase {
        self.characters_case
    }

    #[must_use]
    pub const fn edit_operation(&self) -> EditOperation {
        self.edit_operation
    }

    pub fn set_edit_operation(&mut self, operation: EditOperation) {
        self.edit_operation = operation;
    }

    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    #[must_use]
    pub const fn layout(&self) -> CodeAreaLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: CodeAreaLayout) {
        self.layout = layout;
    }

    /// Reposition caret and selection as an operation requested.
    pub fn apply(&mut self, result: ExecutionResult) {
        if let Some(caret) = result.caret {
            let target = self.caret.moved_to(caret.data_position, caret.code_offset);
            self.set_caret_position(target);
        }
        if let Some(selection) = result.selection {
            self.selection = selection;
        }
    }

    /// Record that the document content changed.
    pub fn notify_data_changed(&mut self) {
        self.data_changes += 1;
        tracing::trace!(size = self.data.size(), "data changed");
    }

    /// Request the caret to be scrolled into view.
    pub fn reveal_cursor(&mut self) {
        self.cursor_reveals += 1;
    }

    /// Number of data change notifications so far.
    #[must_use]
    pub const fn data_change_count(&self) -> u64 {
        self.data_changes
    }

    /// Number of reveal requests so far.
    #[must_use]
    pub const fn cursor_reveal_count(&self) -> u64 {
        self.cursor_reveals
    }
}

/// A code area with its undo history and clipboard.
pub struct CodeAreaView {
    pub area: CodeArea,
    pub history: HistoryManager,
    pub clipboard: Box<dyn Clipboard>,
}

impl fmt::Debug for CodeAreaView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAreaView")
            .field("area", &self.area)
            .field("history", &self.history)
            .finish()
    }
}

impl CodeAreaView {
    /// View with default history limits and a private clipboard.
    #[must_use]
    pub fn new(area: CodeArea) -> Self {
        Self {
            area,
            history: HistoryManager::default(),
            clipboard: Box::new(MemoryClipboard::default()),
        }
    }

    /// View configured from editor settings.
    #[must_use]
    pub fn with_config(data: impl EditableBinaryData + 'static, config: &EditorConfig) -> Self {
        Self {
            area: CodeArea::with_config(data, config),
            history: HistoryManager::new(config.history.into()),
            clipboard: Box::new(MemoryClipboard::default()),
        }
    }

    /// Replace the clipboard, e.g. to share one between views.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Undo the most recent command, if any.
    pub fn undo(&mut self) -> Option<Result<String, crate::undo::CommandError>> {
        self.history.undo(&mut self.area)
    }

    /// Redo the most recently undone command, if any.
    pub fn redo(&mut self) -> Option<Result<String, crate::undo::CommandError>> {
        self.history.redo(&mut self.area)
    }

    /// Execute a command and record it in history.
    pub fn execute(&mut self, command: Box<dyn crate::undo::CodeAreaCommand>) -> CommandResult {
        self.history.execute(command, &mut self.area)
    }

    /// Copy of the whole document.
    pub fn data_snapshot(&self) -> bined_core::DataResult<Vec<u8>> {
        self.area.content_data().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bined_core::ByteArrayData;

    #[test]
    fn caret_is_clamped_to_document() {
        let mut area = CodeArea::new(ByteArrayData::from(vec![1, 2, 3]));
        area.set_caret_position(CaretPosition::new(10, 1));
        assert_eq!(area.caret_position(), CaretPosition::new(3, 0));
    }

    #[test]
    fn apply_keeps_active_section() {
        let mut area = CodeArea::new(ByteArrayData::from(vec![0; 8]));
        area.set_caret_position(CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview));
        area.apply(ExecutionResult::caret(4, 0).with_selection(SelectionRange::new(1, 4)));
        assert_eq!(area.caret_position().data_position, 4);
        assert_eq!(area.active_section(), CodeAreaSection::TextPreview);
        assert_eq!(area.selection(), SelectionRange::new(1, 4));
    }

    #[test]
    fn code_type_change_clamps_offset() {
        let mut area = CodeArea::new(ByteArrayData::from(vec![0; 2]));
        area.set_code_type(CodeType::Binary);
        area.set_caret_position(CaretPosition::new(0, 6));
        area.set_code_type(CodeType::Hexadecimal);
        assert_eq!(area.caret_position().code_offset, 1);
    }

    #[test]
    fn notifications_are_counted() {
        let mut area = CodeArea::new(ByteArrayData::new());
        area.notify_data_changed();
        area.reveal_cursor();
        area.reveal_cursor();
        assert_eq!(area.data_change_count(), 1);
        assert_eq!(area.cursor_reveal_count(), 2);
    }

    #[test]
    fn config_applies_to_area() {
        let config = EditorConfig {
            code_type: CodeType::Octal,
            read_only: true,
            bytes_per_row: 8,
            ..EditorConfig::default()
        };
        let view = CodeAreaView::with_config(ByteArrayData::new(), &config);
        assert_eq!(view.area.code_type(), CodeType::Octal);
        assert!(!view.area.is_editable());
        assert_eq!(view.area.layout().bytes_per_row, 8);
    }
}
