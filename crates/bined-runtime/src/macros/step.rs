#![forbid(unsafe_code)]

//! Macro step kinds and their parameters.

use std::fmt;
use std::str::FromStr;

use bined_core::MovementDirection;

/// One kind of recordable action.
///
/// The operation code is the persisted name and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroStep {
    KeyPressed,
    EnterKey,
    BackspaceKey,
    DeleteKey,
    CaretSet,
    CaretMove,
    SelectionUpdate,
    SelectionSet,
    ClipboardCut,
    ClipboardCopy,
    ClipboardCopyAsCode,
    ClipboardPaste,
    ClipboardPasteFromCode,
    ClipboardDelete,
    SelectionSelectAll,
    SelectionClear,
    EditOperationChange,
    FindText,
    FindAgain,
}

impl MacroStep {
    pub const ALL: [Self; 19] = [
        Self::KeyPressed,
        Self::EnterKey,
        Self::BackspaceKey,
        Self::DeleteKey,
        Self::CaretSet,
        Self::CaretMove,
        Self::SelectionUpdate,
        Self::SelectionSet,
        Self::ClipboardCut,
        Self::ClipboardCopy,
        Self::ClipboardCopyAsCode,
        Self::ClipboardPaste,
        Self::ClipboardPasteFromCode,
        Self::ClipboardDelete,
        Self::SelectionSelectAll,
        Self::SelectionClear,
        Self::EditOperationChange,
        Self::FindText,
        Self::FindAgain,
    ];

    #[must_use]
    pub const fn operation_code(self) -> &'static str {
        match self {
            Self::KeyPressed => "key-press",
            Self::EnterKey => "enter-key",
            Self::BackspaceKey => "backspace-key",
            Self::DeleteKey => "delete-key",
            Self::CaretSet => "caret-set",
            Self::CaretMove => "caret-move",
            Self::SelectionUpdate => "selection-update",
            Self::SelectionSet => "selection-set",
            Self::ClipboardCut => "clipboard-cut",
            Self::ClipboardCopy => "clipboard-copy",
            Self::ClipboardCopyAsCode => "clipboard-copy-as-code",
            Self::ClipboardPaste => "clipboard-paste",
            Self::ClipboardPasteFromCode => "clipboard-paste-from-code",
            Self::ClipboardDelete => "clipboard-delete",
            Self::SelectionSelectAll => "selection-select-all",
            Self::SelectionClear => "selection-clear",
            Self::EditOperationChange => "edit-operation-change",
            Self::FindText => "search-find-text",
            Self::FindAgain => "search-find-again",
        }
    }

    #[must_use]
    pub fn find_by_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.operation_code() == code)
    }

    /// Steps dropped when recorded twice in a row.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        matches!(
            self,
            Self::ClipboardCopy
                | Self::ClipboardCopyAsCode
                | Self::SelectionSelectAll
                | Self::SelectionClear
        )
    }

    /// Steps whose repeats fold into a count parameter.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::CaretMove | Self::SelectionUpdate)
    }
}

impl fmt::Display for MacroStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_code())
    }
}

impl FromStr for MacroStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::find_by_code(s).ok_or_else(|| format!("Unknown operation: {s}"))
    }
}

/// A typed step parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MacroParameter {
    Text(String),
    Integer(u64),
    Direction(MovementDirection),
}

impl MacroParameter {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_direction(&self) -> Option<MovementDirection> {
        match self {
            Self::Direction(direction) => Some(*direction),
            _ => None,
        }
    }
}

impl From<&str> for MacroParameter {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MacroParameter {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<u64> for MacroParameter {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<MovementDirection> for MacroParameter {
    fn from(direction: MovementDirection) -> Self {
        Self::Direction(direction)
    }
}

/// A decoded step: kind plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroOperation {
    pub step: MacroStep,
    pub parameters: Vec<MacroParameter>,
}

impl MacroOperation {
    #[must_use]
    pub const fn new(step: MacroStep) -> Self {
        Self {
            step,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameters(step: MacroStep, parameters: Vec<MacroParameter>) -> Self {
        Self { step, parameters }
    }

    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<&MacroParameter> {
        self.parameters.get(index)
    }
}

impl From<MacroStep> for MacroOperation {
    fn from(step: MacroStep) -> Self {
        Self::new(step)
    }
}
