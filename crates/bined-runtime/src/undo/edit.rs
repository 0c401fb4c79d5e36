#![forbid(unsafe_code)]

//! Typing session recorded as a single undo unit.
//!
//! While a session is open the handler writes each typed byte straight into
//! the document and extends the span the session covers. The span always
//! has the same shape:
//!
//! ```text
//!   start            start + overwritten       start + length
//!   │ overwritten bytes │ inserted bytes          │
//! ```
//!
//! so undo is a `Modify` of the saved original bytes followed by a `Remove`
//! of the inserted tail.

use std::any::Any;

use bined_core::{CaretPosition, EditOperation, SelectionRange};

use super::command::{
    CodeAreaCommand, CommandError, CommandMetadata, CommandResult, CommandSource, CommandType,
};
use crate::operation::{
    CodeAreaOperation, CompoundOperation, ModifyOperation, OperationError, RemoveOperation,
};
use crate::view::CodeArea;

/// What is being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Code digits in the code matrix.
    Code,
    /// Characters in the text preview.
    Text,
}

#[derive(Debug)]
enum EditState {
    /// Open for more input; the document holds the typed bytes.
    Editing,
    /// Undone; holds the operation that reapplies the typing.
    Reverted(CodeAreaOperation),
    /// Redone after an undo; holds the operation that reverts it.
    Applied(CodeAreaOperation),
}

/// Accumulates digits or characters typed at consecutive positions.
#[derive(Debug)]
pub struct EditDataCommand {
    kind: EditKind,
    mode: EditOperation,
    start: u64,
    length: u64,
    overwritten: Vec<u8>,
    caret_before: CaretPosition,
    selection_before: SelectionRange,
    caret_after: CaretPosition,
    state: EditState,
    metadata: CommandMetadata,
}

impl EditDataCommand {
    /// Open a session at the current caret.
    #[must_use]
    pub fn new(kind: EditKind, mode: EditOperation, area: &CodeArea) -> Self {
        let caret = area.caret_position();
        let description = match (kind, mode) {
            (EditKind::Code, EditOperation::Insert) => "Insert code",
            (EditKind::Code, EditOperation::Overwrite) => "Overwrite code",
            (EditKind::Text, EditOperation::Insert) => "Insert text",
            (EditKind::Text, EditOperation::Overwrite) => "Overwrite text",
        };
        Self {
            kind,
            mode,
            start: caret.data_position,
            length: 0,
            overwritten: Vec::new(),
            caret_before: caret,
            selection_before: area.selection(),
            caret_after: caret,
            state: EditState::Editing,
            metadata: CommandMetadata::new(description),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.metadata.source = source;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> EditKind {
        self.kind
    }

    #[must_use]
    pub const fn mode(&self) -> EditOperation {
        self.mode
    }

    #[must_use]
    pub const fn start_position(&self) -> u64 {
        self.start
    }

    /// Bytes covered by the session.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// True once the session was undone; further typing starts a new one.
    #[must_use]
    pub const fn was_reverted(&self) -> bool {
        !matches!(self.state, EditState::Editing)
    }

    /// Whether typing of `kind` in `mode` at `caret` continues this session.
    #[must_use]
    pub fn accepts(&self, kind: EditKind, mode: EditOperation, caret: CaretPosition) -> bool {
        if self.was_reverted() || kind != self.kind || mode != self.mode {
            return false;
        }
        let end = self.start + self.length;
        if caret.data_position == end {
            return caret.code_offset == 0 || self.length == 0;
        }
        self.kind == EditKind::Code
            && caret.code_offset > 0
            && self.length > 0
            && caret.data_position + 1 == end
    }

    /// Write `byte` at `position`, extending the span when needed.
    ///
    /// `position` must be inside the span or directly after it. Directly
    /// after it, `replace_existing` overwrites the byte already there instead
    /// of inserting a new one.
    pub fn write_byte(
        &mut self,
        area: &mut CodeArea,
        position: u64,
        byte: u8,
        replace_existing: bool,
    ) -> CommandResult {
        if !matches!(self.state, EditState::Editing) {
            return Err(CommandError::InvalidState("edit session is closed".into()));
        }
        let end = self.start + self.length;
        let data = area.content_data_mut();
        if position >= self.start && position < end {
            data.set_byte(position, byte).map_err(OperationError::from)?;
            return Ok(());
        }
        if position != end {
            return Err(CommandError::InvalidState(format!(
                "edit at {position} does not continue session ending at {end}"
            )));
        }

        if replace_existing {
            if self.length != self.overwritten.len() as u64 {
                return Err(CommandError::InvalidState(
                    "cannot overwrite after inserted bytes".into(),
                ));
            }
            let previous = data.byte_at(position).map_err(OperationError::from)?;
            data.set_byte(position, byte).map_err(OperationError::from)?;
            self.overwritten.push(previous);
        } else {
            data.insert(position, &[byte]).map_err(OperationError::from)?;
        }
        self.length += 1;
        Ok(())
    }

    /// Record where the caret ended after the latest keystroke.
    pub fn set_caret_after(&mut self, caret: CaretPosition) {
        self.caret_after = caret;
    }

    fn revert_operation(&self) -> CodeAreaOperation {
        let overwritten = self.overwritten.len() as u64;
        let mut compound = CompoundOperation::new();
        if overwritten > 0 {
            compound
                .append_operation(ModifyOperation::new(self.start, self.overwritten.clone()).into());
        }
        if self.length > overwritten {
            compound.append_operation(
                RemoveOperation::new(self.start + overwritten, 0, self.length - overwritten).into(),
            );
        }
        compound.into()
    }

    fn finish(&self, area: &mut CodeArea, caret: CaretPosition, selection: SelectionRange) {
        area.set_caret_position(caret);
        area.set_selection(selection);
        area.reveal_cursor();
        area.notify_data_changed();
    }
}

impl CodeAreaCommand for EditDataCommand {
    /// The typed bytes are written as they arrive; nothing to replay.
    fn execute(&mut self, _area: &mut CodeArea) -> CommandResult {
        Ok(())
    }

    fn redo(&mut self, area: &mut CodeArea) -> CommandResult {
        let EditState::Reverted(redo) = &self.state else {
            return Err(CommandError::InvalidState("edit is already applied".into()));
        };
        let (_, undo) = redo.execute_with_undo(area.content_data_mut())?;
        self.state = EditState::Applied(undo.unwrap_or_else(|| CompoundOperation::new().into()));
        let caret = self.caret_after;
        self.finish(area, caret, SelectionRange::empty_at(caret.data_position));
        Ok(())
    }

    fn undo(&mut self, area: &mut CodeArea) -> CommandResult {
        let (revert, from_applied) = match std::mem::replace(&mut self.state, EditState::Editing) {
            EditState::Editing => (self.revert_operation(), false),
            EditState::Applied(op) => (op, true),
            reverted @ EditState::Reverted(_) => {
                self.state = reverted;
                return Err(CommandError::InvalidState("edit is already undone".into()));
            }
        };
        match revert.execute_with_undo(area.content_data_mut()) {
            Ok((_, redo)) => {
                let mut spent = revert;
                spent.dispose();
                self.state =
                    EditState::Reverted(redo.unwrap_or_else(|| CompoundOperation::new().into()));
                self.finish(area, self.caret_before, self.selection_before);
                Ok(())
            }
            Err(e) => {
                if from_applied {
                    self.state = EditState::Applied(revert);
                }
                Err(e.into())
            }
        }
    }

    fn command_type(&self) -> CommandType {
        CommandType::DataEdited
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        let held = match &self.state {
            EditState::Editing => 0,
            EditState::Reverted(op) | EditState::Applied(op) => op.size_bytes(),
        };
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.overwritten.capacity()
            + held
    }

    fn dispose(&mut self) {
        self.overwritten = Vec::new();
        match &mut self.state {
            EditState::Editing => {}
            EditState::Reverted(op) | EditState::Applied(op) => op.dispose(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "EditDataCommand"
    }
}
