#![forbid(unsafe_code)]

//! Caret and selection values.

/// Area of the editor the caret is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CodeAreaSection {
    /// Numeric code digits of each byte.
    #[default]
    CodeMatrix,
    /// Character rendition of the bytes.
    TextPreview,
}

impl CodeAreaSection {
    /// The other section.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::CodeMatrix => Self::TextPreview,
            Self::TextPreview => Self::CodeMatrix,
        }
    }
}

/// Caret location: byte position plus digit offset inside that byte's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CaretPosition {
    /// Byte position, `0..=size`.
    pub data_position: u64,
    /// Digit offset for multi-digit code types.
    pub code_offset: u32,
    /// Active section.
    pub section: CodeAreaSection,
}

impl CaretPosition {
    /// Caret at a byte position in the code matrix.
    #[must_use]
    pub const fn new(data_position: u64, code_offset: u32) -> Self {
        Self {
            data_position,
            code_offset,
            section: CodeAreaSection::CodeMatrix,
        }
    }

    /// Same caret in another section.
    #[must_use]
    pub const fn with_section(mut self, section: CodeAreaSection) -> Self {
        self.section = section;
        self
    }

    /// Same section, new position.
    #[must_use]
    pub const fn moved_to(self, data_position: u64, code_offset: u32) -> Self {
        Self {
            data_position,
            code_offset,
            section: self.section,
        }
    }
}

/// Directionless selection between two positions.
///
/// `end` may be lower than `start` when the selection grows backward.
/// The covered range is `first()..first() + length()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SelectionRange {
    pub start: u64,
    pub end: u64,
}

impl SelectionRange {
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Collapsed selection at a position.
    #[must_use]
    pub const fn empty_at(position: u64) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Selection covering `length` bytes from `first`.
    #[must_use]
    pub const fn from_length(first: u64, length: u64) -> Self {
        Self {
            start: first,
            end: first.saturating_add(length),
        }
    }

    #[must_use]
    pub const fn first(&self) -> u64 {
        if self.start < self.end {
            self.start
        } else {
            self.end
        }
    }

    /// Last selected byte. Meaningless for an empty selection.
    #[must_use]
    pub const fn last(&self) -> u64 {
        if self.start < self.end {
            self.end - 1
        } else {
            self.start.saturating_sub(1)
        }
    }

    #[must_use]
    pub const fn length(&self) -> u64 {
        self.start.abs_diff(self.end)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` lies in the selection.
    #[must_use]
    pub const fn contains(&self, position: u64) -> bool {
        if self.start < self.end {
            position >= self.start && position < self.end
        } else {
            position >= self.end && position < self.start
        }
    }

    /// Collapse onto the start.
    pub fn clear(&mut self) {
        self.end = self.start;
    }
}
