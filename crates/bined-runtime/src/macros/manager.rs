#![forbid(unsafe_code)]

//! Stored macros: recording lifecycle, playback and persistence.
//!
//! ```text
//!   start_macro_recording ──► handler records steps ──► stop_macro_recording
//!                                                         │ non-empty?
//!                                                         ▼
//!                                          records.push + save to preferences
//!
//!   execute_macro(i) ──► for each step line: parse ──► search service
//!                                                  └─► handler.execute_macro_step
//! ```

use std::fmt;

use super::codec::{MacroParseError, parse_step};
use super::handler::MacroStepError;
use super::record::MacroRecord;
use super::step::{MacroOperation, MacroParameter, MacroStep};
use crate::command_handler::CommandHandler;
use crate::config::MacroSettings;
use crate::editor::BinaryEditor;
use crate::preferences::{MacroPreferences, PreferencesError, PreferencesStore};
use crate::search::{SearchError, SearchOutcome, SearchService};
use crate::undo::CommandSource;

/// Why a single macro line failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroFailure {
    Parse(MacroParseError),
    Step(MacroStepError),
    Search(SearchError),
    /// A search step was replayed without a search service.
    NoSearchService,
}

impl fmt::Display for MacroFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Step(e) => write!(f, "{e}"),
            Self::Search(e) => write!(f, "{e}"),
            Self::NoSearchService => write!(f, "Search is not available"),
        }
    }
}

impl std::error::Error for MacroFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Step(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::NoSearchService => None,
        }
    }
}

/// Macro playback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroExecutionError {
    UnknownMacro { index: usize, count: usize },
    /// Step at 1-based `line` failed; earlier steps stay applied.
    Step { line: usize, cause: MacroFailure },
}

impl MacroExecutionError {
    /// 1-based line of the failing step.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Step { line, .. } => Some(*line),
            Self::UnknownMacro { .. } => None,
        }
    }
}

impl fmt::Display for MacroExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMacro { index, count } => {
                write!(f, "No macro at index {index} ({count} stored)")
            }
            Self::Step { line, cause } => write!(f, "Error on line {line}: {cause}"),
        }
    }
}

impl std::error::Error for MacroExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step { cause, .. } => Some(cause),
            Self::UnknownMacro { .. } => None,
        }
    }
}

/// Owns the stored macros and the services playback needs.
#[derive(Debug)]
pub struct MacroManager<P, S> {
    preferences: MacroPreferences<P>,
    search: Option<S>,
    records: Vec<MacroRecord>,
    last_active_macro: Option<usize>,
    last_macro_index: u64,
    settings: MacroSettings,
}

impl<P: PreferencesStore, S: SearchService> MacroManager<P, S> {
    /// Manager over `store`, loading the macros already in it.
    #[must_use]
    pub fn new(store: P, search: Option<S>) -> Self {
        Self::with_settings(store, search, MacroSettings::default())
    }

    #[must_use]
    pub fn with_settings(store: P, search: Option<S>, settings: MacroSettings) -> Self {
        let preferences = MacroPreferences::new(store);
        let records = preferences.load_records();
        tracing::debug!(macro_event = "loaded", count = records.len());
        Self {
            last_macro_index: records.len() as u64,
            preferences,
            search,
            records,
            last_active_macro: None,
            settings,
        }
    }

    #[must_use]
    pub fn macro_records(&self) -> &[MacroRecord] {
        &self.records
    }

    /// Replace every stored macro and save.
    pub fn set_macro_records(&mut self, records: Vec<MacroRecord>) -> Result<(), PreferencesError> {
        self.records = records;
        self.save()
    }

    fn save(&mut self) -> Result<(), PreferencesError> {
        self.preferences.save_records(&self.records)
    }

    #[must_use]
    pub const fn preferences(&self) -> &MacroPreferences<P> {
        &self.preferences
    }

    #[must_use]
    pub const fn search(&self) -> Option<&S> {
        self.search.as_ref()
    }

    pub fn search_mut(&mut self) -> Option<&mut S> {
        self.search.as_mut()
    }

    /// Macro run by "execute last macro".
    ///
    /// Falls back to the first macro when none was run or recorded yet, and
    /// is `None` when the remembered index no longer exists.
    #[must_use]
    pub fn last_active_macro(&self) -> Option<usize> {
        match self.last_active_macro {
            None if !self.records.is_empty() => Some(0),
            Some(index) if index < self.records.len() => Some(index),
            _ => None,
        }
    }

    /// Menu entries for the first macros; unnamed ones get a numbered name.
    #[must_use]
    pub fn menu_labels(&self) -> Vec<String> {
        self.records
            .iter()
            .take(self.settings.menu_limit)
            .enumerate()
            .map(|(i, record)| {
                if record.name.is_empty() {
                    format!("{}{}", self.settings.name_prefix, i + 1)
                } else {
                    record.name.clone()
                }
            })
            .collect()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Install a fresh, numbered record on the editor's handler.
    ///
    /// A recording already in progress is discarded.
    pub fn start_macro_recording<H: CommandHandler>(&mut self, editor: &mut BinaryEditor<H>) {
        self.last_macro_index += 1;
        let name = format!("{}{}", self.settings.name_prefix, self.last_macro_index);
        tracing::info!(macro_event = "recording_started", name = %name);
        editor
            .handler
            .set_recording_macro(Some(MacroRecord::new(name)));
    }

    /// Finish recording. A non-empty record is stored, becomes the last
    /// active macro and is saved; its index is returned.
    pub fn stop_macro_recording<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
    ) -> Result<Option<usize>, PreferencesError> {
        let Some(record) = editor.handler.set_recording_macro(None) else {
            return Ok(None);
        };
        if record.is_empty() {
            tracing::info!(macro_event = "recording_discarded", name = %record.name);
            return Ok(None);
        }
        tracing::info!(
            macro_event = "recording_stopped",
            name = %record.name,
            steps = record.len()
        );
        self.records.push(record);
        let index = self.records.len() - 1;
        self.last_active_macro = Some(index);
        self.save()?;
        Ok(Some(index))
    }

    #[must_use]
    pub fn is_macro_recording<H: CommandHandler>(&self, editor: &BinaryEditor<H>) -> bool {
        editor.is_macro_recording()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Search through the service, recording the step while recording.
    ///
    /// `None` when there is no search service.
    pub fn find_text<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
        text: &str,
        match_case: bool,
    ) -> Option<Result<SearchOutcome, SearchError>> {
        let search = self.search.as_mut()?;
        editor.handler.record_find_text(text, match_case);
        Some(search.perform_search_text(&mut editor.view, text, match_case))
    }

    pub fn find_again<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
    ) -> Option<Result<SearchOutcome, SearchError>> {
        let search = self.search.as_mut()?;
        editor.handler.record_find_again();
        Some(search.perform_find_again(&mut editor.view))
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Replay the macro at `index` on `editor`.
    ///
    /// Steps run in order; the first failing line aborts playback.
    pub fn execute_macro<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
        index: usize,
    ) -> Result<(), MacroExecutionError> {
        let Some(record) = self.records.get(index).cloned() else {
            return Err(MacroExecutionError::UnknownMacro {
                index,
                count: self.records.len(),
            });
        };
        self.last_active_macro = Some(index);
        tracing::info!(
            macro_event = "execute",
            name = %record.name,
            steps = record.len()
        );
        let previous_source = editor.handler.command_source();
        editor.handler.set_command_source(CommandSource::Macro);
        let result = self.execute_steps(editor, &record);
        editor.handler.set_command_source(previous_source);
        result
    }

    fn execute_steps<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
        record: &MacroRecord,
    ) -> Result<(), MacroExecutionError> {
        for (i, line) in record.steps.iter().enumerate() {
            let line_number = i + 1;
            self.execute_line(editor, line).map_err(|cause| {
                tracing::warn!(
                    macro_event = "execute_failed",
                    line = line_number,
                    error = %cause
                );
                MacroExecutionError::Step {
                    line: line_number,
                    cause,
                }
            })?;
        }
        Ok(())
    }

    /// Replay the last active macro; `Ok(false)` when there is none.
    pub fn execute_last_macro<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
    ) -> Result<bool, MacroExecutionError> {
        let Some(index) = self.last_active_macro() else {
            return Ok(false);
        };
        self.execute_macro(editor, index)?;
        Ok(true)
    }

    fn execute_line<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
        line: &str,
    ) -> Result<(), MacroFailure> {
        let operation = parse_step(line).map_err(MacroFailure::Parse)?;
        tracing::debug!(macro_event = "step_executed", step = %operation.step);
        match operation.step {
            MacroStep::FindText => self.replay_find_text(editor, &operation),
            MacroStep::FindAgain => {
                let search = self.search.as_mut().ok_or(MacroFailure::NoSearchService)?;
                editor.handler.record_find_again();
                search
                    .perform_find_again(&mut editor.view)
                    .map(drop)
                    .map_err(MacroFailure::Search)
            }
            _ => editor
                .handler
                .execute_macro_step(&mut editor.view, &operation)
                .map_err(MacroFailure::Step),
        }
    }

    fn replay_find_text<H: CommandHandler>(
        &mut self,
        editor: &mut BinaryEditor<H>,
        operation: &MacroOperation,
    ) -> Result<(), MacroFailure> {
        let invalid = |message: &str| {
            MacroFailure::Step(MacroStepError::InvalidParameters {
                step: MacroStep::FindText,
                message: message.to_string(),
            })
        };
        let text = operation
            .parameter(0)
            .and_then(MacroParameter::as_text)
            .ok_or_else(|| invalid("expected text"))?;
        let match_case = match operation.parameter(1) {
            None => true,
            Some(p) => p.as_integer().ok_or_else(|| invalid("expected integer"))? != 0,
        };
        let search = self.search.as_mut().ok_or(MacroFailure::NoSearchService)?;
        editor.handler.record_find_text(text, match_case);
        search
            .perform_search_text(&mut editor.view, text, match_case)
            .map(drop)
            .map_err(MacroFailure::Search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use crate::search::BinarySearch;
    use bined_core::{ByteArrayData, CaretPosition, EditOperation, KeyCode, KeyEvent, SelectionRange};

    type Manager = MacroManager<MemoryPreferences, BinarySearch>;

    fn manager() -> Manager {
        MacroManager::new(MemoryPreferences::new(), Some(BinarySearch::new()))
    }

    fn insert_editor(bytes: &[u8]) -> BinaryEditor {
        let mut editor = BinaryEditor::new(ByteArrayData::from(bytes));
        editor.view.area.set_edit_operation(EditOperation::Insert);
        editor
    }

    #[test]
    fn recording_is_named_stored_and_saved() {
        let mut manager = manager();
        let mut editor = insert_editor(&[]);
        manager.start_macro_recording(&mut editor);
        assert!(manager.is_macro_recording(&editor));
        editor.type_text("a").unwrap();
        let index = manager.stop_macro_recording(&mut editor).unwrap();

        assert_eq!(index, Some(0));
        assert!(!manager.is_macro_recording(&editor));
        assert_eq!(manager.macro_records()[0].name, "Macro 1");
        assert_eq!(manager.macro_records()[0].steps, ["key-press(\"a\")"]);
        assert_eq!(manager.last_active_macro(), Some(0));
        assert_eq!(manager.preferences().macros_count(), 1);
    }

    #[test]
    fn empty_recording_is_discarded() {
        let mut manager = manager();
        let mut editor = insert_editor(&[]);
        manager.start_macro_recording(&mut editor);
        assert_eq!(manager.stop_macro_recording(&mut editor).unwrap(), None);
        assert!(manager.macro_records().is_empty());
        assert_eq!(manager.last_active_macro(), None);
        assert_eq!(manager.preferences().store().flush_count(), 0);
    }

    #[test]
    fn replay_reproduces_typing_and_moves() {
        let mut manager = manager();
        let mut editor = insert_editor(&[]);
        manager.start_macro_recording(&mut editor);
        editor.type_text("12").unwrap();
        editor.key_pressed(KeyEvent::new(KeyCode::Left)).unwrap();
        editor.key_pressed(KeyEvent::new(KeyCode::Left)).unwrap();
        manager.stop_macro_recording(&mut editor).unwrap();
        assert_eq!(
            manager.macro_records()[0].steps,
            ["key-press(\"12\")", "caret-move(LEFT,2)"]
        );

        let mut other = insert_editor(&[]);
        manager.execute_macro(&mut other, 0).unwrap();
        assert_eq!(other.bytes(), editor.bytes());
        assert_eq!(other.view.area.caret_position(), CaretPosition::new(0, 0));
    }

    #[test]
    fn replayed_commands_are_tagged_as_macro() {
        let mut manager = manager();
        manager
            .set_macro_records(vec![MacroRecord::with_steps(
                "typing",
                vec!["key-press(\"ab\")".into()],
            )])
            .unwrap();
        let mut editor = insert_editor(&[]);
        editor.type_text("1").unwrap();
        manager.execute_macro(&mut editor, 0).unwrap();

        assert_eq!(editor.view.history.undo_depth(), 2);
        let last = editor.view.history.last_undo().unwrap();
        assert_eq!(last.metadata().source, CommandSource::Macro);
        assert_eq!(editor.handler.command_source(), CommandSource::User);

        editor.view.history.undo(&mut editor.view.area).unwrap().unwrap();
        let first = editor.view.history.last_undo().unwrap();
        assert_eq!(first.metadata().source, CommandSource::User);
    }

    #[test]
    fn failing_line_is_reported() {
        let mut manager = manager();
        manager
            .set_macro_records(vec![MacroRecord::with_steps(
                "broken",
                vec!["selection-select-all".into(), "caret-move(SIDEWAYS)".into()],
            )])
            .unwrap();
        let mut editor = insert_editor(&[1, 2, 3]);
        let err = manager.execute_macro(&mut editor, 0).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.to_string(),
            "Error on line 2: Unknown value at position 11"
        );
        assert_eq!(editor.view.area.selection(), SelectionRange::new(0, 3));
    }

    #[test]
    fn unknown_index_is_an_error() {
        let mut manager = manager();
        let mut editor = insert_editor(&[]);
        assert_eq!(
            manager.execute_macro(&mut editor, 3),
            Err(MacroExecutionError::UnknownMacro { index: 3, count: 0 })
        );
        assert_eq!(manager.execute_last_macro(&mut editor), Ok(false));
    }

    #[test]
    fn search_steps_use_the_search_service() {
        let mut manager = manager();
        manager
            .set_macro_records(vec![MacroRecord::with_steps(
                "find",
                vec!["search-find-text(\"ab\",1)".into(), "search-find-again".into()],
            )])
            .unwrap();
        let mut editor = insert_editor(b"xabyab");
        manager.execute_macro(&mut editor, 0).unwrap();
        assert_eq!(editor.view.area.selection(), SelectionRange::new(4, 6));

        let mut without: MacroManager<MemoryPreferences, BinarySearch> =
            MacroManager::new(MemoryPreferences::new(), None);
        without
            .set_macro_records(manager.macro_records().to_vec())
            .unwrap();
        let err = without.execute_macro(&mut editor, 0).unwrap_err();
        assert_eq!(
            err,
            MacroExecutionError::Step {
                line: 1,
                cause: MacroFailure::NoSearchService
            }
        );
    }

    #[test]
    fn find_text_is_recorded() {
        let mut manager = manager();
        let mut editor = insert_editor(b"hello");
        manager.start_macro_recording(&mut editor);
        let found = manager.find_text(&mut editor, "ll", false);
        assert_eq!(found, Some(Ok(SearchOutcome::Found(2))));
        manager.stop_macro_recording(&mut editor).unwrap();
        assert_eq!(
            manager.macro_records()[0].steps,
            ["search-find-text(\"ll\",0)"]
        );
    }

    #[test]
    fn menu_labels_are_limited_and_named() {
        let mut manager = manager();
        let records = (0..12)
            .map(|i| {
                let name = if i == 1 { String::new() } else { format!("m{i}") };
                MacroRecord::with_steps(name, vec!["selection-clear".into()])
            })
            .collect();
        manager.set_macro_records(records).unwrap();
        let labels = manager.menu_labels();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0], "m0");
        assert_eq!(labels[1], "Macro 2");
    }

    #[test]
    fn stored_macros_are_loaded_and_numbering_continues() {
        let mut first = manager();
        first
            .set_macro_records(vec![MacroRecord::with_steps(
                "Macro 1",
                vec!["selection-clear".into()],
            )])
            .unwrap();
        let store = first.preferences().store().clone();

        let mut second: Manager = MacroManager::new(store, None);
        assert_eq!(second.macro_records().len(), 1);
        assert_eq!(second.last_active_macro(), Some(0));
        let mut editor = insert_editor(&[]);
        second.start_macro_recording(&mut editor);
        assert_eq!(
            editor.handler.recording_macro().map(|r| r.name.as_str()),
            Some("Macro 2")
        );
    }
}
