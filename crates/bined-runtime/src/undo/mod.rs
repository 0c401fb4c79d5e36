#![forbid(unsafe_code)]

//! Undo/redo commands over the code area.
//!
//! Commands are the entries of the undo history. A command wraps an
//! operation (or a typing session) and carries the view bookkeeping the
//! operation itself does not: caret restoration, scroll-into-view and data
//! change notification.
//!
//! # Architecture
//!
//! ```text
//!   HistoryManager
//!   ├── undo stack: [cmd1, cmd2, cmd3]   newest at back
//!   └── redo stack: [cmd5, cmd4]         cleared on push
//!
//!   CodeAreaCommand
//!   ├── DataCommand             one CodeAreaOperation
//!   ├── DeleteSelectionCommand  Remove of the selection
//!   ├── EditDataCommand         digits/characters typed as one unit
//!   └── CompoundCommand         ordered commands, undone in reverse
//! ```
//!
//! # Invariants
//!
//! - `redo()` then `undo()` restores the document bytes and the caret
//!   position captured before `redo()`
//! - `undo()` before any `redo()` fails with [`CommandError::NotExecuted`]
//! - Pushing a command clears the redo stack

mod command;
mod edit;
mod history;

pub use command::{
    CodeAreaCommand, CommandError, CommandMetadata, CommandResult, CommandSource, CommandType,
    CompoundCommand, DataCommand, DeleteSelectionCommand,
};
pub use edit::{EditDataCommand, EditKind};
pub use history::{HistoryConfig, HistoryManager};
