#![forbid(unsafe_code)]

//! Recording decorator around a command handler.
//!
//! [`MacroCommandHandler`] forwards every entry point to the wrapped
//! handler. While a [`MacroRecord`] is installed it first appends the
//! matching step, folding repeats into the previous step:
//!
//! | Repeated step                         | Result                        |
//! |---------------------------------------|-------------------------------|
//! | `caret-move` / `selection-update`     | count parameter, starting at 2 |
//! | `key-press`                           | text concatenated             |
//! | copy, copy as code, select all, clear | second occurrence dropped     |
//! | anything else                         | new step                      |

use std::fmt;

use bined_core::{CaretPosition, CodeAreaSection, MovementDirection, SelectingMode};

use super::codec::{encode_step, parse_step};
use super::record::MacroRecord;
use super::step::{MacroOperation, MacroParameter, MacroStep};
use crate::command_handler::{CommandHandler, is_printable_char};
use crate::undo::{CommandError, CommandResult, CommandSource};
use crate::view::CodeAreaView;

/// Failure to replay a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroStepError {
    /// A parameter is missing or has the wrong type.
    InvalidParameters { step: MacroStep, message: String },
    /// The step is not handled by a command handler, e.g. search steps.
    NotHandled(MacroStep),
    Command(CommandError),
}

impl fmt::Display for MacroStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { step, message } => {
                write!(f, "invalid parameters for {step}: {message}")
            }
            Self::NotHandled(step) => write!(f, "step {step} is not handled by the command handler"),
            Self::Command(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MacroStepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Command(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommandError> for MacroStepError {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

fn invalid(step: MacroStep, message: impl Into<String>) -> MacroStepError {
    MacroStepError::InvalidParameters {
        step,
        message: message.into(),
    }
}

/// Command handler that records the calls it forwards.
#[derive(Debug, Clone, Default)]
pub struct MacroCommandHandler<H> {
    inner: H,
    recording: Option<MacroRecord>,
    last_macro_step: Option<MacroStep>,
}

impl<H: CommandHandler> MacroCommandHandler<H> {
    #[must_use]
    pub const fn new(inner: H) -> Self {
        Self {
            inner,
            recording: None,
            last_macro_step: None,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    /// Install (or remove, with `None`) the record that receives steps.
    ///
    /// Returns the previously installed record. Coalescing restarts either
    /// way.
    pub fn set_recording_macro(&mut self, record: Option<MacroRecord>) -> Option<MacroRecord> {
        self.last_macro_step = None;
        std::mem::replace(&mut self.recording, record)
    }

    #[must_use]
    pub fn recording_macro(&self) -> Option<&MacroRecord> {
        self.recording.as_ref()
    }

    #[must_use]
    pub const fn is_macro_recording(&self) -> bool {
        self.recording.is_some()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Append a step to the installed record, coalescing with the previous
    /// step where possible. No-op when not recording.
    pub fn append_macro_operation_step(&mut self, step: MacroStep, parameters: Vec<MacroParameter>) {
        let Some(record) = self.recording.as_mut() else {
            return;
        };

        let previous = if self.last_macro_step == Some(step) {
            record.last_step().map(str::to_string)
        } else {
            None
        };
        if let Some(last) = previous {
            match parse_step(&last) {
                Ok(mut previous) => {
                    if Self::coalesce(&mut previous, step, &parameters) {
                        let index = record.len() - 1;
                        let encoded = previous.to_string();
                        tracing::trace!(macro_event = "step_coalesced", step = %encoded);
                        record.set_step(index, encoded);
                        return;
                    }
                    if step.is_idempotent() {
                        tracing::trace!(macro_event = "step_suppressed", step = %step);
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        macro_event = "coalesce_failed",
                        step = %last,
                        error = %e,
                        "previous step unreadable, appending"
                    );
                }
            }
        }

        let encoded = encode_step(step, &parameters);
        tracing::debug!(macro_event = "step_recorded", step = %encoded);
        record.add_step(encoded);
        self.last_macro_step = Some(step);
    }

    /// Fold `parameters` of a repeated `step` into `previous`.
    fn coalesce(previous: &mut MacroOperation, step: MacroStep, parameters: &[MacroParameter]) -> bool {
        if step.is_counted() {
            if previous.parameters.first() != parameters.first() {
                return false;
            }
            match previous.parameters.get_mut(1) {
                Some(MacroParameter::Integer(count)) => *count = count.saturating_add(1),
                _ => {
                    previous.parameters.truncate(1);
                    previous.parameters.push(MacroParameter::Integer(2));
                }
            }
            return true;
        }
        if step == MacroStep::KeyPressed {
            if let (Some(MacroParameter::Text(text)), Some(MacroParameter::Text(added))) =
                (previous.parameters.get_mut(0), parameters.first())
            {
                text.push_str(added);
                return true;
            }
        }
        false
    }

    fn record(&mut self, step: MacroStep) {
        self.append_macro_operation_step(step, Vec::new());
    }

    fn record_caret(&mut self, step: MacroStep, caret: CaretPosition) {
        self.append_macro_operation_step(
            step,
            vec![
                MacroParameter::Integer(caret.data_position),
                MacroParameter::Integer(u64::from(caret.code_offset)),
            ],
        );
    }

    /// Record a text search issued outside the handler.
    pub fn record_find_text(&mut self, text: &str, match_case: bool) {
        self.append_macro_operation_step(
            MacroStep::FindText,
            vec![
                MacroParameter::Text(text.to_string()),
                MacroParameter::Integer(u64::from(match_case)),
            ],
        );
    }

    pub fn record_find_again(&mut self) {
        self.record(MacroStep::FindAgain);
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Replay one decoded step through this handler.
    ///
    /// `key-press` text is typed one character at a time and counted moves
    /// repeat `count` times. Search steps are rejected with
    /// [`MacroStepError::NotHandled`].
    pub fn execute_macro_step(
        &mut self,
        view: &mut CodeAreaView,
        operation: &MacroOperation,
    ) -> Result<(), MacroStepError> {
        let step = operation.step;
        match step {
            MacroStep::KeyPressed => {
                let text = operation
                    .parameter(0)
                    .and_then(MacroParameter::as_text)
                    .ok_or_else(|| invalid(step, "expected text"))?;
                for ch in text.chars() {
                    self.key_typed(view, ch)?;
                }
            }
            MacroStep::EnterKey => self.enter_pressed(view)?,
            MacroStep::BackspaceKey => self.backspace_pressed(view)?,
            MacroStep::DeleteKey => self.delete_pressed(view)?,
            MacroStep::EditOperationChange => self.change_edit_operation(view)?,
            MacroStep::ClipboardCut => self.cut(view)?,
            MacroStep::ClipboardCopy => self.copy(view)?,
            MacroStep::ClipboardCopyAsCode => self.copy_as_code(view)?,
            MacroStep::ClipboardPaste => self.paste(view)?,
            MacroStep::ClipboardPasteFromCode => self.paste_from_code(view)?,
            MacroStep::ClipboardDelete => self.delete(view)?,
            MacroStep::SelectionSelectAll => self.select_all(view)?,
            MacroStep::SelectionClear => self.clear_selection(view)?,
            MacroStep::CaretMove | MacroStep::SelectionUpdate => {
                let direction = operation
                    .parameter(0)
                    .and_then(MacroParameter::as_direction)
                    .ok_or_else(|| invalid(step, "expected direction"))?;
                let count = match operation.parameter(1) {
                    None => 1,
                    Some(p) => p.as_integer().ok_or_else(|| invalid(step, "expected count"))?,
                };
                let mode = if step == MacroStep::SelectionUpdate {
                    SelectingMode::Selecting
                } else {
                    SelectingMode::None
                };
                for _ in 0..count {
                    self.move_caret(view, mode, direction)?;
                }
            }
            MacroStep::CaretSet => {
                let caret = Self::caret_parameter(view, operation)?;
                self.set_caret_position(view, caret)?;
            }
            MacroStep::SelectionSet => {
                let caret = Self::caret_parameter(view, operation)?;
                self.update_selection(view, SelectingMode::Selecting, caret)?;
            }
            MacroStep::FindText | MacroStep::FindAgain => {
                return Err(MacroStepError::NotHandled(step));
            }
        }
        Ok(())
    }

    /// Optional `(position, offset)` parameters; missing values keep the
    /// current caret.
    fn caret_parameter(
        view: &CodeAreaView,
        operation: &MacroOperation,
    ) -> Result<CaretPosition, MacroStepError> {
        let step = operation.step;
        let current = view.area.caret_position();
        let integer = |index: usize| -> Result<Option<u64>, MacroStepError> {
            operation
                .parameter(index)
                .map(|p| p.as_integer().ok_or_else(|| invalid(step, "expected integer")))
                .transpose()
        };
        if operation.parameters.is_empty() {
            return Ok(current);
        }
        let position = integer(0)?.unwrap_or(current.data_position);
        let offset = match integer(1)? {
            None => 0,
            Some(offset) => {
                u32::try_from(offset).map_err(|_| invalid(step, "code offset out of range"))?
            }
        };
        Ok(current.moved_to(position, offset))
    }
}

impl<H: CommandHandler> CommandHandler for MacroCommandHandler<H> {
    fn key_typed(&mut self, view: &mut CodeAreaView, ch: char) -> CommandResult {
        if self.is_macro_recording()
            && (view.area.active_section() != CodeAreaSection::TextPreview || is_printable_char(ch))
        {
            self.append_macro_operation_step(
                MacroStep::KeyPressed,
                vec![MacroParameter::Text(ch.to_string())],
            );
        }
        self.inner.key_typed(view, ch)
    }

    fn enter_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        if view.area.active_section() == CodeAreaSection::TextPreview {
            self.record(MacroStep::EnterKey);
        }
        self.inner.enter_pressed(view)
    }

    fn backspace_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::BackspaceKey);
        self.inner.backspace_pressed(view)
    }

    fn delete_pressed(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::DeleteKey);
        self.inner.delete_pressed(view)
    }

    fn delete(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardDelete);
        self.inner.delete(view)
    }

    fn cut(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardCut);
        self.inner.cut(view)
    }

    fn copy(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardCopy);
        self.inner.copy(view)
    }

    fn copy_as_code(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardCopyAsCode);
        self.inner.copy_as_code(view)
    }

    fn paste(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardPaste);
        self.inner.paste(view)
    }

    fn paste_from_code(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::ClipboardPasteFromCode);
        self.inner.paste_from_code(view)
    }

    fn can_paste(&self, view: &CodeAreaView) -> bool {
        self.inner.can_paste(view)
    }

    fn select_all(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::SelectionSelectAll);
        self.inner.select_all(view)
    }

    fn clear_selection(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::SelectionClear);
        self.inner.clear_selection(view)
    }

    fn update_selection(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        caret: CaretPosition,
    ) -> CommandResult {
        let step = match mode {
            SelectingMode::Selecting => MacroStep::SelectionSet,
            SelectingMode::None => MacroStep::CaretSet,
        };
        self.record_caret(step, caret);
        self.inner.update_selection(view, mode, caret)
    }

    fn set_caret_position(
        &mut self,
        view: &mut CodeAreaView,
        caret: CaretPosition,
    ) -> CommandResult {
        self.record_caret(MacroStep::CaretSet, caret);
        self.inner.set_caret_position(view, caret)
    }

    fn move_caret(
        &mut self,
        view: &mut CodeAreaView,
        mode: SelectingMode,
        direction: MovementDirection,
    ) -> CommandResult {
        let step = match mode {
            SelectingMode::Selecting => MacroStep::SelectionUpdate,
            SelectingMode::None => MacroStep::CaretMove,
        };
        self.append_macro_operation_step(step, vec![MacroParameter::Direction(direction)]);
        self.inner.move_caret(view, mode, direction)
    }

    fn change_edit_operation(&mut self, view: &mut CodeAreaView) -> CommandResult {
        self.record(MacroStep::EditOperationChange);
        self.inner.change_edit_operation(view)
    }

    fn undo_sequence_break(&mut self) {
        self.inner.undo_sequence_break();
    }

    fn command_source(&self) -> CommandSource {
        self.inner.command_source()
    }

    fn set_command_source(&mut self, source: CommandSource) {
        self.inner.set_command_source(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_handler::OperationCommandHandler;
    use crate::view::CodeArea;
    use bined_core::{ByteArrayData, EditOperation, KeyCode, KeyEvent, Modifiers, SelectionRange};

    fn view(bytes: &[u8]) -> CodeAreaView {
        CodeAreaView::new(CodeArea::new(ByteArrayData::from(bytes)))
    }

    fn recording() -> MacroCommandHandler<OperationCommandHandler> {
        let mut handler = MacroCommandHandler::new(OperationCommandHandler::new());
        handler.set_recording_macro(Some(MacroRecord::new("test")));
        handler
    }

    fn steps(handler: &MacroCommandHandler<OperationCommandHandler>) -> Vec<String> {
        handler.recording_macro().map(|r| r.steps.clone()).unwrap_or_default()
    }

    #[test]
    fn repeated_moves_fold_into_a_count() {
        let mut handler = recording();
        let right = vec![MacroParameter::Direction(MovementDirection::Right)];
        handler.append_macro_operation_step(MacroStep::CaretMove, right.clone());
        assert_eq!(steps(&handler), ["caret-move(RIGHT)"]);
        handler.append_macro_operation_step(MacroStep::CaretMove, right.clone());
        assert_eq!(steps(&handler), ["caret-move(RIGHT,2)"]);
        handler.append_macro_operation_step(MacroStep::CaretMove, right);
        assert_eq!(steps(&handler), ["caret-move(RIGHT,3)"]);
        handler.append_macro_operation_step(
            MacroStep::CaretMove,
            vec![MacroParameter::Direction(MovementDirection::Left)],
        );
        assert_eq!(steps(&handler), ["caret-move(RIGHT,3)", "caret-move(LEFT)"]);
    }

    #[test]
    fn move_count_saturates() {
        let mut handler = recording();
        let right = vec![MacroParameter::Direction(MovementDirection::Right)];
        handler.append_macro_operation_step(MacroStep::CaretMove, right.clone());
        let saturated = format!("caret-move(RIGHT,{})", u64::MAX);
        handler.recording.as_mut().unwrap().set_step(0, saturated.clone());
        handler.append_macro_operation_step(MacroStep::CaretMove, right);
        assert_eq!(steps(&handler), [saturated]);
    }

    #[test]
    fn typed_characters_concatenate() {
        let mut handler = recording();
        let mut view = view(&[]);
        view.area.set_caret_position(
            CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview),
        );
        for ch in "a\"b".chars() {
            handler.key_typed(&mut view, ch).unwrap();
        }
        // Control characters never reach the text preview.
        handler.key_typed(&mut view, '\u{7}').unwrap();
        assert_eq!(steps(&handler), [r#"key-press("a\"b")"#]);
        assert_eq!(view.data_snapshot().unwrap(), b"a\"b".to_vec());
    }

    #[test]
    fn idempotent_steps_are_not_repeated() {
        let mut handler = recording();
        let mut view = view(&[1, 2]);
        handler.copy(&mut view).unwrap();
        handler.copy(&mut view).unwrap();
        handler.select_all(&mut view).unwrap();
        handler.select_all(&mut view).unwrap();
        handler.paste(&mut view).unwrap();
        handler.paste(&mut view).unwrap();
        assert_eq!(
            steps(&handler),
            [
                "clipboard-copy",
                "selection-select-all",
                "clipboard-paste",
                "clipboard-paste"
            ]
        );
    }

    #[test]
    fn key_events_record_through_dispatch() {
        let mut handler = recording();
        let mut view = view(&[0; 40]);
        let shift = Modifiers::SHIFT;
        handler.key_pressed(&mut view, KeyEvent::new(KeyCode::Down)).unwrap();
        handler
            .key_pressed(&mut view, KeyEvent::new(KeyCode::Right).with_modifiers(shift))
            .unwrap();
        handler
            .key_pressed(&mut view, KeyEvent::new(KeyCode::Right).with_modifiers(shift))
            .unwrap();
        handler
            .key_pressed(&mut view, KeyEvent::new(KeyCode::End).with_modifiers(Modifiers::CTRL))
            .unwrap();
        handler.key_pressed(&mut view, KeyEvent::new(KeyCode::Insert)).unwrap();
        assert_eq!(
            steps(&handler),
            [
                "caret-move(DOWN)",
                "selection-update(RIGHT,2)",
                "caret-move(DOC_END)",
                "edit-operation-change"
            ]
        );
    }

    #[test]
    fn enter_is_recorded_only_in_text_preview() {
        let mut handler = recording();
        let mut view = view(&[]);
        handler.enter_pressed(&mut view).unwrap();
        assert!(steps(&handler).is_empty());
        view.area.set_caret_position(
            CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview),
        );
        handler.enter_pressed(&mut view).unwrap();
        assert_eq!(steps(&handler), ["enter-key"]);
    }

    #[test]
    #[tracing_test::traced_test]
    fn unreadable_previous_step_appends_new_step() {
        let mut handler = recording();
        handler.append_macro_operation_step(MacroStep::KeyPressed, vec!["a".into()]);
        if let Some(record) = handler.recording.as_mut() {
            record.set_step(0, "key-press(\"broken");
        }
        handler.append_macro_operation_step(MacroStep::KeyPressed, vec!["b".into()]);
        assert_eq!(steps(&handler), ["key-press(\"broken", "key-press(\"b\")"]);
        assert!(logs_contain("coalesce_failed"));
        assert!(logs_contain("step_recorded"));
    }

    #[test]
    fn nothing_is_recorded_without_a_record() {
        let mut handler = MacroCommandHandler::new(OperationCommandHandler::new());
        let mut view = view(&[]);
        handler.key_typed(&mut view, 'a').unwrap();
        assert!(!handler.is_macro_recording());
        assert_eq!(view.data_snapshot().unwrap(), vec![0xa0]);
    }

    #[test]
    fn playback_expands_text_and_counts() {
        let mut handler = MacroCommandHandler::new(OperationCommandHandler::new());
        let mut view = view(&[]);
        view.area.set_edit_operation(EditOperation::Insert);
        view.area.set_caret_position(
            CaretPosition::new(0, 0).with_section(CodeAreaSection::TextPreview),
        );
        handler
            .execute_macro_step(&mut view, &parse_step("key-press(\"abc\")").unwrap())
            .unwrap();
        handler
            .execute_macro_step(&mut view, &parse_step("selection-update(LEFT,2)").unwrap())
            .unwrap();
        assert_eq!(view.data_snapshot().unwrap(), b"abc".to_vec());
        assert_eq!(view.area.selection(), SelectionRange::new(3, 1));

        handler
            .execute_macro_step(&mut view, &parse_step("caret-set(0)").unwrap())
            .unwrap();
        assert_eq!(view.area.caret_position().data_position, 0);
        assert!(!view.area.has_selection());
    }

    #[test]
    fn playback_rejects_bad_parameters_and_search_steps() {
        let mut handler = MacroCommandHandler::new(OperationCommandHandler::new());
        let mut view = view(&[]);
        let err = handler
            .execute_macro_step(&mut view, &parse_step("caret-move(3)").unwrap())
            .unwrap_err();
        assert!(matches!(err, MacroStepError::InvalidParameters { .. }));
        let err = handler
            .execute_macro_step(&mut view, &MacroOperation::new(MacroStep::FindAgain))
            .unwrap_err();
        assert_eq!(err, MacroStepError::NotHandled(MacroStep::FindAgain));
    }

    #[test]
    fn caret_set_and_selection_set_are_recorded() {
        let mut handler = recording();
        let mut view = view(&[0; 8]);
        handler
            .set_caret_position(&mut view, CaretPosition::new(2, 1))
            .unwrap();
        handler
            .update_selection(&mut view, SelectingMode::Selecting, CaretPosition::new(5, 0))
            .unwrap();
        assert_eq!(steps(&handler), ["caret-set(2,1)", "selection-set(5,0)"]);
        assert_eq!(view.area.selection(), SelectionRange::new(2, 5));
    }
}
