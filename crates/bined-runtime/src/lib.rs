#![forbid(unsafe_code)]

//! Runtime: edit operations, undo history, command handling and macros.
//!
//! # Role in BinEd
//! `bined-runtime` is the editing engine on top of `bined-core`. Every
//! change to a document goes through a reversible operation wrapped in an
//! undoable command, and every user action enters through a
//! [`CommandHandler`] that a [`MacroCommandHandler`] can record.
//!
//! # Key Components
//!
//! - [`CodeAreaOperation`] - reversible document mutations
//! - [`HistoryManager`] - undo/redo stacks of [`CodeAreaCommand`]s
//! - [`CodeAreaView`] - document, caret, selection, history and clipboard
//! - [`OperationCommandHandler`] - key and clipboard input as commands
//! - [`MacroManager`] - stored macros, recording and playback
//! - [`BitSwapping`] - byte order and bit inversion conversions
//!
//! # Feature flags
//!
//! - `persistence`: TOML/JSON loading of [`EditorConfig`] and the
//!   [`JsonFilePreferences`] backend.

pub mod bit_swap;
pub mod clipboard;
pub mod command_handler;
pub mod config;
pub mod editor;
pub mod macros;
pub mod operation;
pub mod preferences;
pub mod search;
pub mod undo;
pub mod view;

pub use bit_swap::{BitSwapOperation, BitSwapping};
pub use clipboard::{Clipboard, ClipboardContent, MemoryClipboard};
pub use command_handler::{CommandHandler, OperationCommandHandler};
pub use config::{ConfigError, EditorConfig, HistorySettings, MacroSettings};
pub use editor::BinaryEditor;
pub use macros::{
    MacroCommandHandler, MacroExecutionError, MacroFailure, MacroManager, MacroOperation,
    MacroParameter, MacroParseError, MacroRecord, MacroStep, MacroStepError, encode_step,
    parse_step,
};
pub use operation::{
    CodeAreaOperation, CompoundOperation, ConversionDataProvider, ConvertOperation, DataProvider,
    ExecutionResult, InsertOperation, ModifyOperation, OperationError, OperationResult,
    OperationVisitor, RemoveOperation, ReplaceOperation,
};
#[cfg(feature = "persistence")]
pub use preferences::JsonFilePreferences;
pub use preferences::{
    BookmarkPreferences, BookmarkRecord, MacroPreferences, MemoryPreferences, PreferencesError,
    PreferencesStore, Rgb,
};
pub use search::{BinarySearch, SearchError, SearchOutcome, SearchService};
pub use undo::{
    CodeAreaCommand, CommandError, CommandResult, CommandSource, CommandType, CompoundCommand,
    DataCommand, DeleteSelectionCommand, EditDataCommand, HistoryConfig, HistoryManager,
};
pub use view::{CodeArea, CodeAreaView};
