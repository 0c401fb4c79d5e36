#![forbid(unsafe_code)]

//! Macro recording and playback.
//!
//! A macro is a [`MacroRecord`]: a name plus one encoded step per line.
//!
//! # Architecture
//!
//! ```text
//!   key input ──► MacroCommandHandler ──► wrapped CommandHandler ──► view
//!                      │ while recording
//!                      ▼
//!                 MacroRecord.steps  ◄── encode_step / parse_step ──► MacroOperation
//!                      │
//!                      ▼
//!                 MacroManager ──► MacroPreferences (store)
//! ```
//!
//! # Invariants
//!
//! - `parse_step(&encode_step(step, params))` yields `step` and `params`
//! - Replaying a recorded macro on an identical document and caret produces
//!   the same document and caret as the recorded session

mod codec;
mod handler;
mod manager;
mod record;
mod step;

pub use codec::{MacroParseError, encode_step, parse_step};
pub use handler::{MacroCommandHandler, MacroStepError};
pub use manager::{MacroExecutionError, MacroFailure, MacroManager};
pub use record::MacroRecord;
pub use step::{MacroOperation, MacroParameter, MacroStep};
