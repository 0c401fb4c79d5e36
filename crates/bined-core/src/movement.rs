#![forbid(unsafe_code)]

//! Caret movement over a row/page layout.

use std::fmt;
use std::str::FromStr;

use crate::code_type::CodeType;
use crate::position::{CaretPosition, CodeAreaSection};

/// Direction of a caret movement.
///
/// The canonical names are part of the macro step format and must stay
/// stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementDirection {
    Left,
    Right,
    Up,
    Down,
    RowStart,
    RowEnd,
    PageUp,
    PageDown,
    DocStart,
    DocEnd,
    SwitchSection,
}

impl MovementDirection {
    /// Every direction, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::RowStart,
        Self::RowEnd,
        Self::PageUp,
        Self::PageDown,
        Self::DocStart,
        Self::DocEnd,
        Self::SwitchSection,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::RowStart => "ROW_START",
            Self::RowEnd => "ROW_END",
            Self::PageUp => "PAGE_UP",
            Self::PageDown => "PAGE_DOWN",
            Self::DocStart => "DOC_START",
            Self::DocEnd => "DOC_END",
            Self::SwitchSection => "SWITCH_SECTION",
        }
    }

    /// Look up a direction by canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MovementDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown movement direction '{s}'"))
    }
}

/// Whether a movement extends the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectingMode {
    #[default]
    None,
    Selecting,
}

/// How typed input affects existing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EditOperation {
    #[default]
    Overwrite,
    Insert,
}

impl EditOperation {
    /// The other operation.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Overwrite => Self::Insert,
            Self::Insert => Self::Overwrite,
        }
    }
}

/// Row geometry used for vertical movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeAreaLayout {
    /// Bytes shown on one row, at least 1.
    pub bytes_per_row: u64,
    /// Rows scrolled by a page movement, at least 1.
    pub rows_per_page: u64,
}

impl Default for CodeAreaLayout {
    fn default() -> Self {
        Self {
            bytes_per_row: 16,
            rows_per_page: 16,
        }
    }
}

impl CodeAreaLayout {
    #[must_use]
    pub const fn new(bytes_per_row: u64, rows_per_page: u64) -> Self {
        Self {
            bytes_per_row: if bytes_per_row == 0 { 1 } else { bytes_per_row },
            rows_per_page: if rows_per_page == 0 { 1 } else { rows_per_page },
        }
    }
}

/// Caret position reached by moving `position` in `direction`.
///
/// `data_size` bounds the result: the caret may sit on `data_size` (the
/// append position) but never beyond it.
#[must_use]
pub fn compute_move_position(
    position: CaretPosition,
    direction: MovementDirection,
    data_size: u64,
    layout: CodeAreaLayout,
    code_type: CodeType,
) -> CaretPosition {
    let bytes_per_row = layout.bytes_per_row.max(1);
    let last_digit = code_type.max_digits_for_byte() - 1;
    let in_code = position.section == CodeAreaSection::CodeMatrix;
    let mut target = position;
    let data_position = position.data_position;

    match direction {
        MovementDirection::Left => {
            if in_code {
                if position.code_offset > 0 {
                    target.code_offset = position.code_offset - 1;
                } else if data_position > 0 {
                    target.data_position = data_position - 1;
                    target.code_offset = last_digit;
                }
            } else if data_position > 0 {
                target.data_position = data_position - 1;
            }
        }
        MovementDirection::Right => {
            if data_position < data_size {
                if in_code && position.code_offset < last_digit {
                    target.code_offset = position.code_offset + 1;
                } else {
                    target.data_position = data_position + 1;
                    target.code_offset = 0;
                }
            }
        }
        MovementDirection::Up => {
            if data_position >= bytes_per_row {
                target.data_position = data_position - bytes_per_row;
            }
        }
        MovementDirection::Down => {
            let next = data_position.saturating_add(bytes_per_row);
            if next < data_size || (next == data_size && position.code_offset == 0) {
                target.data_position = next;
            }
        }
        MovementDirection::RowStart => {
            target.data_position = data_position - data_position % bytes_per_row;
            target.code_offset = 0;
        }
        MovementDirection::RowEnd => {
            let increment = bytes_per_row - 1 - data_position % bytes_per_row;
            target.data_position = match data_position.checked_add(increment) {
                Some(end) if end <= data_size => end,
                _ => data_size,
            };
            if in_code {
                target.code_offset = if target.data_position == data_size {
                    0
                } else {
                    last_digit
                };
            }
        }
        MovementDirection::PageUp => {
            let increment = bytes_per_row.saturating_mul(layout.rows_per_page.max(1));
            target.data_position = if data_position < increment {
                data_position % bytes_per_row
            } else {
                data_position - increment
            };
        }
        MovementDirection::PageDown => {
            let increment = bytes_per_row.saturating_mul(layout.rows_per_page.max(1));
            if data_position.saturating_add(increment) > data_size {
                let position_on_row = data_position % bytes_per_row;
                let mut last_row_start = data_size - data_size % bytes_per_row;
                let same_column = data_size - position_on_row;
                if last_row_start == same_column {
                    target.data_position = data_size;
                    target.code_offset = 0;
                } else if last_row_start > same_column {
                    if last_row_start > bytes_per_row {
                        last_row_start -= bytes_per_row;
                        target.data_position = last_row_start + position_on_row;
                    }
                } else {
                    target.data_position = last_row_start + position_on_row;
                }
            } else {
                target.data_position = data_position + increment;
            }
        }
        MovementDirection::DocStart => {
            target.data_position = 0;
            target.code_offset = 0;
        }
        MovementDirection::DocEnd => {
            target.data_position = data_size;
            target.code_offset = 0;
        }
        MovementDirection::SwitchSection => {
            target.section = position.section.toggled();
            if target.section == CodeAreaSection::TextPreview {
                target.code_offset = 0;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        direction = direction.name(),
        from = position.data_position,
        to = target.data_position,
        "caret move"
    );

    target
}
