#![forbid(unsafe_code)]

//! Translation of user input into edits of a code area.
//!
//! [`CommandHandler`] is the seam between input and the document: every
//! entry point takes the [`CodeAreaView`] it acts on. The default
//! [`CommandHandler::key_pressed`] maps key events onto the other entry
//! points, so a decorator that overrides those entry points also sees keys
//! routed through the dispatch.
//!
//! [`OperationCommandHandler`] performs each request through undoable
//! commands. Consecutive typed digits or characters extend one
//! [`EditDataCommand`] until something breaks the typing sequence.

use bined_core::{
    BinaryData, CaretPosition, CodeAreaSection, EditOperation, KeyCode, KeyEvent,
    MovementDirection, SelectingMode, SelectionRange, compute_move_position,
};

use crate::clipboard::ClipboardContent;
use crate::operation::{InsertOperation, OperationError, RemoveOperation, ReplaceOperation};
use crate::undo::{
    CodeAreaCommand, CommandError, CommandResult, CommandSource, CompoundCommand, DataCommand,
    DeleteSelectionCommand, EditDataCommand, EditKind,
};
use crate::view::{CodeArea, CodeAreaView};

/// Highest code of the ASCII control range.
const LAST_CONTROL_CODE: u32 = 0x1f;
const DELETE_CHAR: char = '\u{7f}';

/// Whether a character may be typed into the text preview.
#[must_use]
pub fn is_printable_char(ch: char) -> bool {
    u32::from(ch) > LAST_CONTROL_CODE && ch != DELETE_CHAR
}

/// Input entry points of a code area.
pub trait CommandHandler {
    /// Dispatch a key event to the matching entry point.
    fn key_pressed(&mut self, view: &mut CodeAreaView, event: KeyEvent) -> CommandResult {
        let mode = if event.shift() {
            SelectingMode::Selecting
        } else {
            SelectingMode::None
        };
        let jump = event.platform_modifier();
        match event.code {
            KeyCode::Left => self.move_caret(view, mode, MovementDirection::Left),
            KeyCode::Right => self.move_caret(view, mode, MovementDirection::Right),
            KeyCode::Up => self.move_caret(view, mode, MovementDirection::Up),
            KeyCode::Down => self.move_caret(view, mode, MovementDirection::Down),
            KeyCode::Home if jump => self.move_caret(view, mode, MovementDirection::DocStart),
            KeyCode::Home => self.move_caret(view, mode, MovementDirection::RowStart),
            KeyCode::End if jump => self.move_caret(view, mode, MovementDirection::DocEnd),
            KeyCode::End => self.move_caret(view, mode, MovementDirection::RowEnd),
            KeyCode::PageUp => self.move_caret(view, mode, MovementDirection::PageUp),
            KeyCode::PageDown => self.move_caret(view, mode, MovementDirection::PageDown),
            KeyCode::Tab => self.move_caret(view, mode, MovementDirection::SwitchSection),
            KeyCode::Insert => self.change_edit_operation(view),
            KeyCode::Enter => self.enter_pressed(view),
            KeyCode::Backspace => self.backspace_pressed(view),
            KeyCode::Delete => self.delete_pressed(view),
            KeyCode::Escape => self.clear_selection(view),
            KeyCode::Char(c) if jump => match c.to_ascii_lowercase() {
                'c' => self.copy(view),
                'x' => self.cut(view),
                'v' => self.paste(view),
                'a' => self.select_all(view),
                _ => Ok(()),
            },
            KeyCode::Char(c) => self.key_typed(view, c),
        }
    }

    /// A character typed at the caret.
    fn key_typed(&mut self, view: &mut CodeAreaView, ch: char) -> CommandResult;

    fn enter_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn backspace_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn delete_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult;

    /// Delete the selection.
    fn delete(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn cut(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn copy(&mut self, view: &mut CodeAreaView) -> CommandResult;

    /// Copy the selection as code text.
    fn copy_as_code(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn paste(&mut self, view: &mut CodeAreaView) -> CommandResult;

    /// Paste clipboard text parsed as code.
    fn paste_from_code(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn can_paste(&self, view: &CodeAreaView) -> bool;

    fn select_all(&mut self, view: &mut CodeAreaView) -> CommandResult;

    fn clear_selection(&mut self, view: &mut CodeAreaView) -> CommandResult;

    /// Place the caret at `caret`, extending the selection when selecting.
    fn update_selection(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        caret: CaretPosition,
    ) -> CommandResult;

    /// Place the caret and drop the selection.
    fn set_caret_position(&mut self, view: &mut CodeAreaView, caret: CaretPosition)
    -> CommandResult;

    fn move_caret(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        direction: MovementDirection,
    ) -> CommandResult;

    /// Toggle between insert and overwrite.
    fn change_edit_operation(&mut self, view: &mut CodeAreaView) -> CommandResult;

    /// End the current typing sequence; the next keystroke opens a new undo
    /// entry.
    fn undo_sequence_break(&mut self);

    /// Source attached to the commands this handler creates.
    fn command_source(&self) -> CommandSource {
        CommandSource::User
    }

    /// Tag commands created from now on with `source`. Handlers that create
    /// no commands ignore it.
    fn set_command_source(&mut self, _source: CommandSource) {}
}

/// Command handler that edits through undoable commands.
#[derive(Debug, Clone)]
pub struct OperationCommandHandler {
    /// Whether the newest history entry is a typing session this handler
    /// may extend.
    edit_in_progress: bool,
    source: CommandSource,
}

impl Default for OperationCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationCommandHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edit_in_progress: false,
            source: CommandSource::User,
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn run(&mut self, view: &mut CodeAreaView, command: Box<dyn CodeAreaCommand>) -> CommandResult {
        self.edit_in_progress = false;
        view.execute(command)
    }

    fn delete_selection(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !view.area.has_selection() {
            return Ok(());
        }
        let command = DeleteSelectionCommand::new(view.area.selection()).with_source(self.source);
        self.run(view, Box::new(command))
    }

    fn move_to(area: &mut CodeArea, mode: SelectingMode, target: CaretPosition) {
        let caret = area.caret_position();
        area.set_caret_position(target);
        let position = area.caret_position().data_position;
        match mode {
            SelectingMode::Selecting => {
                let selection = area.selection();
                let anchor = if selection.is_empty() {
                    caret.data_position
                } else {
                    selection.start
                };
                area.set_selection(SelectionRange::new(anchor, position));
            }
            SelectingMode::None => area.set_selection(SelectionRange::empty_at(position)),
        }
        area.reveal_cursor();
    }

    /// Write typed bytes at `position`, extending the open typing session
    /// when it accepts the caret.
    fn write_edit(
        &mut self,
        view: &mut CodeAreaView,
        kind: EditKind,
        bytes: &[u8],
        in_place: bool,
        next: CaretPosition,
    ) -> CommandResult {
        let mode = view.area.edit_operation();
        let caret = view.area.caret_position();
        let CodeAreaView { area, history, .. } = view;

        let continues = self.edit_in_progress
            && history
                .last_undo()
                .and_then(|cmd| cmd.as_any().downcast_ref::<EditDataCommand>())
                .is_some_and(|edit| edit.accepts(kind, mode, caret));

        if continues {
            history
                .update_last_undo(|cmd| match cmd.as_any_mut().downcast_mut::<EditDataCommand>() {
                    Some(edit) => Self::write_session(edit, area, caret, bytes, in_place, next),
                    None => Err(CommandError::InvalidState("typing session lost".into())),
                })
                .unwrap_or(Err(CommandError::NotExecuted))?;
        } else {
            let mut edit = EditDataCommand::new(kind, mode, area).with_source(self.source);
            Self::write_session(&mut edit, area, caret, bytes, in_place, next)?;
            tracing::debug!(kind = ?kind, mode = ?mode, start = caret.data_position, "typing session opened");
            history.push(Box::new(edit));
            self.edit_in_progress = true;
        }
        Ok(())
    }

    fn write_session(
        edit: &mut EditDataCommand,
        area: &mut CodeArea,
        caret: CaretPosition,
        bytes: &[u8],
        in_place: bool,
        next: CaretPosition,
    ) -> CommandResult {
        for (i, byte) in bytes.iter().enumerate() {
            let position = caret.data_position + i as u64;
            let replace = in_place && position < area.data_size();
            edit.write_byte(area, position, *byte, replace)?;
        }
        edit.set_caret_after(next);
        area.set_caret_position(next);
        area.set_selection(SelectionRange::empty_at(next.data_position));
        area.reveal_cursor();
        area.notify_data_changed();
        Ok(())
    }

    fn type_code(&mut self, view: &mut CodeAreaView, ch: char) -> CommandResult {
        let code_type = view.area.code_type();
        let offset = view.area.caret_position().code_offset;
        if !code_type.is_valid_code_key_value(ch, offset) {
            return Ok(());
        }
        let Some(value) = code_type.digit_value(ch) else {
            return Ok(());
        };
        self.delete_selection(view)?;

        let area = &view.area;
        let caret = area.caret_position();
        let position = caret.data_position;
        let offset = caret.code_offset;
        let in_place = area.edit_operation() == EditOperation::Overwrite || offset > 0;
        let current = if in_place && position < area.data_size() {
            area.content_data()
                .byte_at(position)
                .map_err(OperationError::from)?
        } else {
            0
        };
        let byte = code_type.set_code_value(current, value, offset);
        let next = if offset + 1 < code_type.max_digits_for_byte() {
            caret.moved_to(position, offset + 1)
        } else {
            caret.moved_to(position + 1, 0)
        };
        self.write_edit(view, EditKind::Code, &[byte], in_place, next)
    }

    fn type_text(&mut self, view: &mut CodeAreaView, bytes: &[u8]) -> CommandResult {
        self.delete_selection(view)?;
        let caret = view.area.caret_position();
        let in_place = view.area.edit_operation() == EditOperation::Overwrite;
        let next = caret.moved_to(caret.data_position + bytes.len() as u64, 0);
        self.write_edit(view, EditKind::Text, bytes, in_place, next)
    }

    fn selected_bytes(view: &CodeAreaView) -> Result<Option<Vec<u8>>, CommandError> {
        let selection = view.area.selection();
        if selection.is_empty() {
            return Ok(None);
        }
        let bytes = view
            .area
            .content_data()
            .copy(selection.first(), selection.length())
            .map_err(OperationError::from)?;
        Ok(Some(bytes))
    }

    fn paste_bytes(&mut self, view: &mut CodeAreaView, bytes: Vec<u8>) -> CommandResult {
        if bytes.is_empty() {
            return Ok(());
        }
        let selection = view.area.selection();
        let position = if selection.is_empty() {
            view.area.caret_position().data_position
        } else {
            selection.first()
        };
        let length = bytes.len() as u64;
        let paste = match view.area.edit_operation() {
            EditOperation::Overwrite => {
                DataCommand::new(ReplaceOperation::from_bytes(position, bytes))
            }
            EditOperation::Insert => {
                DataCommand::new(InsertOperation::from_bytes(position, 0, bytes))
            }
        }
        .with_description("Paste")
        .with_source(self.source);

        if selection.is_empty() {
            self.run(view, Box::new(paste))?;
        } else {
            let mut compound = CompoundCommand::new("Paste over selection");
            compound.push(Box::new(
                DeleteSelectionCommand::new(selection).with_source(self.source),
            ));
            compound.push(Box::new(paste));
            self.run(view, Box::new(compound))?;
        }
        let end = position + length;
        view.area.set_selection(SelectionRange::empty_at(end));
        tracing::debug!(position, length, "pasted");
        Ok(())
    }
}

impl CommandHandler for OperationCommandHandler {
    fn key_typed(&mut self, view: &mut CodeAreaView, ch: char) -> CommandResult {
        if !view.area.is_editable() {
            return Ok(());
        }
        match view.area.active_section() {
            CodeAreaSection::CodeMatrix => self.type_code(view, ch),
            CodeAreaSection::TextPreview => {
                if !is_printable_char(ch) {
                    return Ok(());
                }
                let mut buffer = [0; 4];
                let encoded = ch.encode_utf8(&mut buffer);
                self.type_text(view, encoded.as_bytes())
            }
        }
    }

    fn enter_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !view.area.is_editable() || view.area.active_section() != CodeAreaSection::TextPreview {
            return Ok(());
        }
        self.type_text(view, b"\n")
    }

    fn backspace_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !view.area.is_editable() {
            return Ok(());
        }
        if view.area.has_selection() {
            return self.delete_selection(view);
        }
        let position = view.area.caret_position().data_position;
        if position == 0 {
            return Ok(());
        }
        let remove = RemoveOperation::new(position - 1, 0, 1);
        let command = DataCommand::new(remove)
            .with_description("Backspace")
            .with_source(self.source);
        self.run(view, Box::new(command))
    }

    fn delete_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !view.area.is_editable() {
            return Ok(());
        }
        if view.area.has_selection() {
            return self.delete_selection(view);
        }
        let position = view.area.caret_position().data_position;
        if position >= view.area.data_size() {
            return Ok(());
        }
        let remove = RemoveOperation::new(position, 0, 1);
        let command = DataCommand::new(remove)
            .with_description("Delete")
            .with_source(self.source);
        self.run(view, Box::new(command))
    }

    fn delete(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !view.area.is_editable() {
            return Ok(());
        }
        self.delete_selection(view)
    }

    fn cut(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.copy(view)?;
        self.delete(view)
    }

    fn copy(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if let Some(bytes) = Self::selected_bytes(view)? {
            view.clipboard.set_contents(ClipboardContent::Binary(bytes));
        }
        Ok(())
    }

    fn copy_as_code(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if let Some(bytes) = Self::selected_bytes(view)? {
            let text = view
                .area
                .code_type()
                .format_bytes(&bytes, view.area.characters_case());
            view.clipboard.set_contents(ClipboardContent::Text(text));
        }
        Ok(())
    }

    fn paste(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !self.can_paste(view) {
            return Ok(());
        }
        let Some(content) = view.clipboard.contents() else {
            return Ok(());
        };
        self.paste_bytes(view, content.to_bytes())
    }

    fn paste_from_code(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if !self.can_paste(view) {
            return Ok(());
        }
        let bytes = match view.clipboard.contents() {
            None => return Ok(()),
            Some(ClipboardContent::Binary(bytes)) => bytes,
            Some(ClipboardContent::Text(text)) => view
                .area
                .code_type()
                .parse_bytes(&text)
                .map_err(|e| CommandError::InvalidState(e.to_string()))?,
        };
        self.paste_bytes(view, bytes)
    }

    fn can_paste(&self, view: &CodeAreaView) -> bool {
        view.area.is_editable() && view.clipboard.has_contents()
    }

    fn select_all(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.undo_sequence_break();
        let size = view.area.data_size();
        view.area.set_selection(SelectionRange::new(0, size));
        Ok(())
    }

    fn clear_selection(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.undo_sequence_break();
        view.area.clear_selection();
        Ok(())
    }

    fn update_selection(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        caret: CaretPosition,
    ) -> CommandResult {
        self.undo_sequence_break();
        Self::move_to(&mut view.area, mode, caret);
        Ok(())
    }

    fn set_caret_position(
        &mut self,
        view: &mut CodeAreaView,
        caret: CaretPosition,
    ) -> CommandResult {
        self.update_selection(view, SelectingMode::None, caret)
    }

    fn move_caret(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        direction: MovementDirection,
    ) -> CommandResult {
        self.undo_sequence_break();
        let area = &mut view.area;
        let target = compute_move_position(
            area.caret_position(),
            direction,
            area.data_size(),
            area.layout(),
            area.code_type(),
        );
        Self::move_to(area, mode, target);
        Ok(())
    }

    fn change_edit_operation(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.undo_sequence_break();
        let toggled = view.area.edit_operation().toggled();
        view.area.set_edit_operation(toggled);
        tracing::debug!(edit_operation = ?toggled, "edit operation changed");
        Ok(())
    }

    fn undo_sequence_break(&mut self) {
        self.edit_in_progress = false;
    }

    fn command_source(&self) -> CommandSource {
        self.source
    }

    fn set_command_source(&mut self, source: CommandSource) {
        if self.source != source {
            // A typing session never spans two sources.
            self.edit_in_progress = false;
            self.source = source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bined_core::{ByteArrayData, CodeType, Modifiers};

    fn view(bytes: &[u8]) -> CodeAreaView {
        CodeAreaView::new(CodeArea::new(ByteArrayData::from(bytes)))
    }

    fn text_view(bytes: &[u8]) -> CodeAreaView {
        let mut view = view(bytes);
        view.area
            .set_caret_position(CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview));
        view
    }

    fn typed(handler: &mut OperationCommandHandler, view: &mut CodeAreaView, text: &str) {
        for ch in text.chars() {
            handler.key_typed(view, ch).unwrap();
        }
    }

    #[test]
    fn hex_digits_build_bytes_in_one_undo_entry() {
        let mut view = view(&[]);
        view.area.set_edit_operation(EditOperation::Insert);
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "a5ff");
        assert_eq!(view.data_snapshot().unwrap(), vec![0xa5, 0xff]);
        assert_eq!(view.area.caret_position(), CaretPosition::new(2, 0));
        assert_eq!(view.history.undo_depth(), 1);

        view.undo().unwrap().unwrap();
        assert!(view.data_snapshot().unwrap().is_empty());
        assert_eq!(view.area.caret_position(), CaretPosition::new(0, 0));
    }

    #[test]
    fn overwrite_replaces_digits_of_existing_bytes() {
        let mut view = view(&[0x12, 0x34]);
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "9");
        assert_eq!(view.data_snapshot().unwrap(), vec![0x92, 0x34]);
        assert_eq!(view.area.caret_position(), CaretPosition::new(0, 1));
        typed(&mut handler, &mut view, "87");
        assert_eq!(view.data_snapshot().unwrap(), vec![0x98, 0x74]);
        view.undo().unwrap().unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![0x12, 0x34]);
    }

    #[test]
    fn invalid_digits_are_ignored() {
        let mut view = view(&[0]);
        view.area.set_code_type(CodeType::Octal);
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "9z");
        assert_eq!(view.data_snapshot().unwrap(), vec![0]);
        assert!(!view.history.can_undo());
    }

    #[test]
    fn movement_breaks_the_typing_session() {
        let mut view = text_view(b"");
        view.area.set_edit_operation(EditOperation::Insert);
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "ab");
        handler
            .move_caret(&mut view, SelectingMode::None, MovementDirection::Left)
            .unwrap();
        handler
            .move_caret(&mut view, SelectingMode::None, MovementDirection::Right)
            .unwrap();
        typed(&mut handler, &mut view, "c");
        assert_eq!(view.data_snapshot().unwrap(), b"abc".to_vec());
        assert_eq!(view.history.undo_depth(), 2);
    }

    #[test]
    fn text_preview_writes_utf8_and_rejects_controls() {
        let mut view = text_view(b"");
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "é\u{1}\u{7f}");
        assert_eq!(view.data_snapshot().unwrap(), "é".as_bytes().to_vec());
        handler.enter_pressed(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), b"\xc3\xa9\n".to_vec());
        assert_eq!(view.area.caret_position().data_position, 3);
    }

    #[test]
    fn typing_over_selection_deletes_it_first() {
        let mut view = text_view(b"hello");
        view.area.set_edit_operation(EditOperation::Insert);
        view.area.set_selection(SelectionRange::new(1, 4));
        view.area.set_caret_position(
            CaretPosition::new(4, 0).with_section(CodeAreaSection::TextPreview),
        );
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "i");
        assert_eq!(view.data_snapshot().unwrap(), b"hio".to_vec());
        assert_eq!(view.history.undo_depth(), 2);
    }

    #[test]
    fn read_only_area_ignores_edits() {
        let mut view = view(&[1, 2]);
        view.area.set_editable(false);
        let mut handler = OperationCommandHandler::new();
        typed(&mut handler, &mut view, "ff");
        handler.backspace_pressed(&mut view).unwrap();
        handler.delete_pressed(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1, 2]);
    }

    #[test]
    fn backspace_and_delete_remove_single_bytes() {
        let mut view = view(&[1, 2, 3]);
        let mut handler = OperationCommandHandler::new();
        handler.set_caret_position(&mut view, CaretPosition::new(2, 0)).unwrap();
        handler.backspace_pressed(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1, 3]);
        assert_eq!(view.area.caret_position().data_position, 1);
        handler.delete_pressed(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1]);
        handler.delete_pressed(&mut view).unwrap();
        assert_eq!(view.history.undo_depth(), 2);
    }

    #[test]
    fn shift_movement_extends_selection_from_caret() {
        let mut view = view(&[0; 10]);
        let mut handler = OperationCommandHandler::new();
        handler.set_caret_position(&mut view, CaretPosition::new(2, 0)).unwrap();
        let shift_right = KeyEvent::new(KeyCode::Right).with_modifiers(Modifiers::SHIFT);
        handler.key_pressed(&mut view, shift_right).unwrap();
        assert_eq!(view.area.caret_position(), CaretPosition::new(2, 1));
        assert!(!view.area.has_selection());
        handler.key_pressed(&mut view, shift_right).unwrap();
        assert_eq!(view.area.caret_position(), CaretPosition::new(3, 0));
        assert_eq!(view.area.selection(), SelectionRange::new(2, 3));
        let shift_down = KeyEvent::new(KeyCode::Down).with_modifiers(Modifiers::SHIFT);
        handler.key_pressed(&mut view, shift_down).unwrap();
        assert_eq!(view.area.selection().start, 2);
        handler.key_pressed(&mut view, KeyEvent::new(KeyCode::Left)).unwrap();
        assert!(!view.area.has_selection());
    }

    #[test]
    fn copy_paste_round_trip_through_clipboard() {
        let mut view = view(&[1, 2, 3]);
        view.area.set_edit_operation(EditOperation::Insert);
        let mut handler = OperationCommandHandler::new();
        view.area.set_selection(SelectionRange::new(0, 2));
        handler.copy(&mut view).unwrap();
        assert_eq!(
            view.clipboard.contents(),
            Some(ClipboardContent::Binary(vec![1, 2]))
        );
        handler.set_caret_position(&mut view, CaretPosition::new(3, 0)).unwrap();
        handler.paste(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1, 2, 3, 1, 2]);
        assert_eq!(view.area.caret_position().data_position, 5);
    }

    #[test]
    fn paste_over_selection_is_one_undo_entry() {
        let mut view = view(&[1, 2, 3, 4]);
        view.area.set_edit_operation(EditOperation::Insert);
        view.clipboard.set_contents(ClipboardContent::Binary(vec![9]));
        view.area.set_selection(SelectionRange::new(1, 3));
        let mut handler = OperationCommandHandler::new();
        handler.paste(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1, 9, 4]);
        assert_eq!(view.history.undo_depth(), 1);
        view.undo().unwrap().unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn code_clipboard_uses_current_code_type() {
        let mut view = view(&[0xde, 0xad]);
        let mut handler = OperationCommandHandler::new();
        handler.select_all(&mut view).unwrap();
        handler.copy_as_code(&mut view).unwrap();
        assert_eq!(
            view.clipboard.contents(),
            Some(ClipboardContent::Text("DE AD".into()))
        );
        handler.set_caret_position(&mut view, CaretPosition::new(0, 0)).unwrap();
        view.clipboard.set_contents(ClipboardContent::Text("01 02".into()));
        handler.paste_from_code(&mut view).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![0x01, 0x02]);

        view.clipboard.set_contents(ClipboardContent::Text("zz".into()));
        assert!(handler.paste_from_code(&mut view).is_err());
    }

    #[test]
    fn cut_copies_then_deletes() {
        let mut view = view(&[5, 6, 7]);
        let mut handler = OperationCommandHandler::new();
        view.area.set_selection(SelectionRange::new(2, 0));
        let ctrl_x = KeyEvent::new(KeyCode::Char('x')).with_modifiers(Modifiers::CTRL);
        handler.key_pressed(&mut view, ctrl_x).unwrap();
        assert_eq!(view.data_snapshot().unwrap(), vec![7]);
        assert_eq!(
            view.clipboard.contents(),
            Some(ClipboardContent::Binary(vec![5, 6]))
        );
    }

    #[test]
    fn insert_key_toggles_edit_operation() {
        let mut view = view(&[]);
        let mut handler = OperationCommandHandler::new();
        let before = view.area.edit_operation();
        handler.key_pressed(&mut view, KeyEvent::new(KeyCode::Insert)).unwrap();
        assert_eq!(view.area.edit_operation(), before.toggled());
    }

    #[test]
    fn tab_switches_section() {
        let mut view = view(&[0]);
        let mut handler = OperationCommandHandler::new();
        handler.key_pressed(&mut view, KeyEvent::new(KeyCode::Tab)).unwrap();
        assert_eq!(view.area.active_section(), CodeAreaSection::TextPreview);
    }
}
