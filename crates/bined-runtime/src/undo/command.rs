#![forbid(unsafe_code)]

//! Command trait and the commands built on operations.

use std::any::Any;
use std::fmt;

use bined_core::{CaretPosition, SelectionRange};
use web_time::Instant;

use crate::operation::{
    CodeAreaOperation, CompoundOperation, OperationError, OperationType, RemoveOperation,
};
use crate::view::CodeArea;

/// Who or what triggered a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandSource {
    /// Direct user input.
    #[default]
    User,
    /// Replayed from a recorded macro.
    Macro,
}

/// Description and provenance attached to every command.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description, e.g. "Insert data".
    pub description: String,
    pub timestamp: Instant,
    pub source: CommandSource,
}

impl CommandMetadata {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
            source: CommandSource::User,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Classification of commands for history display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    DataInserted,
    DataRemoved,
    DataModified,
    /// Characters or code digits typed as one unit.
    DataEdited,
    Compound,
}

impl From<OperationType> for CommandType {
    fn from(kind: OperationType) -> Self {
        match kind {
            OperationType::InsertData => Self::DataInserted,
            OperationType::RemoveData => Self::DataRemoved,
            OperationType::ModifyData | OperationType::ReplaceData | OperationType::ConvertData => {
                Self::DataModified
            }
            OperationType::Compound => Self::Compound,
        }
    }
}

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors raised by commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The wrapped operation failed.
    Operation(OperationError),
    /// `undo` was called before the command ever ran.
    NotExecuted,
    /// The command cannot run in the current state.
    InvalidState(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(e) => write!(f, "{e}"),
            Self::NotExecuted => write!(f, "command was not executed"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Operation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OperationError> for CommandError {
    fn from(e: OperationError) -> Self {
        Self::Operation(e)
    }
}

/// A reversible command over a code area.
pub trait CodeAreaCommand: Send + Sync {
    /// Run the command for the first time.
    fn execute(&mut self, area: &mut CodeArea) -> CommandResult {
        self.redo(area)
    }

    /// Apply the command's effect.
    fn redo(&mut self, area: &mut CodeArea) -> CommandResult;

    /// Revert the command's effect.
    fn undo(&mut self, area: &mut CodeArea) -> CommandResult;

    fn can_undo(&self) -> bool {
        true
    }

    fn command_type(&self) -> CommandType;

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn metadata(&self) -> &CommandMetadata;

    /// Heap usage for history budgeting.
    fn size_bytes(&self) -> usize;

    /// Release held data. Safe to call more than once.
    fn dispose(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn debug_name(&self) -> &'static str {
        "CodeAreaCommand"
    }
}

impl fmt::Debug for dyn CodeAreaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

// ============================================================================
// DataCommand
// ============================================================================

/// Command wrapping a single operation.
#[derive(Debug)]
pub struct DataCommand {
    operation: CodeAreaOperation,
    undo_operation: Option<CodeAreaOperation>,
    before: Option<(CaretPosition, SelectionRange)>,
    command_type: CommandType,
    metadata: CommandMetadata,
}

impl DataCommand {
    #[must_use]
    pub fn new(operation: impl Into<CodeAreaOperation>) -> Self {
        let operation = operation.into();
        let command_type = CommandType::from(operation.operation_type());
        let description = match command_type {
            CommandType::DataInserted => "Insert data",
            CommandType::DataRemoved => "Remove data",
            CommandType::DataModified => "Modify data",
            CommandType::DataEdited => "Edit data",
            CommandType::Compound => "Compound edit",
        };
        Self {
            operation,
            undo_operation: None,
            before: None,
            command_type,
            metadata: CommandMetadata::new(description),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.metadata.source = source;
        self
    }

    #[must_use]
    pub fn operation(&self) -> &CodeAreaOperation {
        &self.operation
    }

    /// Whether the command is currently applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.undo_operation.is_some()
    }
}

impl CodeAreaCommand for DataCommand {
    fn redo(&mut self, area: &mut CodeArea) -> CommandResult {
        if self.undo_operation.is_some() {
            return Err(CommandError::InvalidState("command already applied".into()));
        }
        let before = (area.caret_position(), area.selection());
        let (result, undo) = self.operation.execute_with_undo(area.content_data_mut())?;
        self.before = Some(before);
        self.undo_operation = Some(undo.unwrap_or_else(|| CompoundOperation::new().into()));
        area.apply(result);
        area.reveal_cursor();
        area.notify_data_changed();
        Ok(())
    }

    fn undo(&mut self, area: &mut CodeArea) -> CommandResult {
        let Some(undo) = self.undo_operation.take() else {
            return Err(CommandError::NotExecuted);
        };
        if let Err(e) = undo.execute(area.content_data_mut()) {
            self.undo_operation = Some(undo);
            return Err(e.into());
        }
        let mut spent = undo;
        spent.dispose();
        if let Some((caret, selection)) = self.before {
            area.set_caret_position(caret);
            area.set_selection(selection);
        }
        area.reveal_cursor();
        area.notify_data_changed();
        Ok(())
    }

    fn command_type(&self) -> CommandType {
        self.command_type
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.operation.size_bytes()
            + self
                .undo_operation
                .as_ref()
                .map_or(0, CodeAreaOperation::size_bytes)
    }

    fn dispose(&mut self) {
        self.operation.dispose();
        if let Some(undo) = self.undo_operation.as_mut() {
            undo.dispose();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "DataCommand"
    }
}

// ============================================================================
// DeleteSelectionCommand
// ============================================================================

/// Removes the selected bytes and leaves an empty selection at its start.
#[derive(Debug)]
pub struct DeleteSelectionCommand {
    inner: DataCommand,
    selection: SelectionRange,
}

impl DeleteSelectionCommand {
    #[must_use]
    pub fn new(selection: SelectionRange) -> Self {
        let remove = RemoveOperation::new(selection.first(), 0, selection.length());
        Self {
            inner: DataCommand::new(remove).with_description("Delete selection"),
            selection,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.inner = self.inner.with_source(source);
        self
    }

    #[must_use]
    pub const fn selection(&self) -> SelectionRange {
        self.selection
    }
}

impl CodeAreaCommand for DeleteSelectionCommand {
    fn redo(&mut self, area: &mut CodeArea) -> CommandResult {
        self.inner.redo(area)?;
        area.set_selection(SelectionRange::empty_at(self.selection.first()));
        Ok(())
    }

    fn undo(&mut self, area: &mut CodeArea) -> CommandResult {
        self.inner.undo(area)
    }

    fn command_type(&self) -> CommandType {
        CommandType::DataRemoved
    }

    fn metadata(&self) -> &CommandMetadata {
        self.inner.metadata()
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<SelectionRange>() + self.inner.size_bytes()
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "DeleteSelectionCommand"
    }
}

// ============================================================================
// CompoundCommand
// ============================================================================

/// Commands that execute and undo together as one history entry.
pub struct CompoundCommand {
    commands: Vec<Box<dyn CodeAreaCommand>>,
    metadata: CommandMetadata,
    executed_to: usize,
}

impl fmt::Debug for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundCommand")
            .field("commands_count", &self.commands.len())
            .field("metadata", &self.metadata)
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl CompoundCommand {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            executed_to: 0,
        }
    }

    pub fn push(&mut self, command: Box<dyn CodeAreaCommand>) {
        self.commands.push(command);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CodeAreaCommand for CompoundCommand {
    fn redo(&mut self, area: &mut CodeArea) -> CommandResult {
        for index in self.executed_to..self.commands.len() {
            if let Err(e) = self.commands[index].redo(area) {
                for done in (0..index).rev() {
                    if let Err(rollback) = self.commands[done].undo(area) {
                        tracing::error!(
                            command = "compound",
                            error = %rollback,
                            "compound command rollback failed"
                        );
                        break;
                    }
                }
                self.executed_to = 0;
                return Err(e);
            }
            self.executed_to = index + 1;
        }
        Ok(())
    }

    fn undo(&mut self, area: &mut CodeArea) -> CommandResult {
        if self.executed_to == 0 && !self.commands.is_empty() {
            return Err(CommandError::NotExecuted);
        }
        for index in (0..self.executed_to).rev() {
            self.commands[index].undo(area)?;
            self.executed_to = index;
        }
        Ok(())
    }

    fn command_type(&self) -> CommandType {
        CommandType::Compound
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.commands.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn dispose(&mut self) {
        for command in &mut self.commands {
            command.dispose();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CompoundCommand"
    }
}
