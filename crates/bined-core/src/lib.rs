#![forbid(unsafe_code)]

//! Core: binary document model, caret positions, code types, and input events.
//!
//! # Role in BinEd
//! `bined-core` is the data layer. It owns the byte-addressable document
//! abstraction, the caret and selection value types, the numeric code
//! representations of a byte, and the normalized key events that the
//! command handlers in `bined-runtime` consume.
//!
//! # Primary responsibilities
//! - **BinaryData / EditableBinaryData**: random-access byte documents.
//! - **CaretPosition / SelectionRange**: cursor and selection values.
//! - **CodeType**: binary, octal, decimal and hexadecimal digit rules.
//! - **Movement**: caret movement over a row/page layout.
//! - **KeyEvent**: canonical keyboard input.

pub mod code_type;
pub mod data;
pub mod event;
pub mod movement;
pub mod position;

pub use code_type::{CodeCharactersCase, CodeParseError, CodeType};
pub use data::{BinaryData, ByteArrayData, DataError, DataResult, EditableBinaryData};
pub use event::{KeyCode, KeyEvent, Modifiers};
pub use movement::{
    CodeAreaLayout, EditOperation, MovementDirection, SelectingMode, compute_move_position,
};
pub use position::{CaretPosition, CodeAreaSection, SelectionRange};
