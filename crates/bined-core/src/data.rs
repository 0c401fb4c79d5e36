#![forbid(unsafe_code)]

//! Byte-addressable documents.
//!
//! [`BinaryData`] is the read side used by clipboard and search code,
//! [`EditableBinaryData`] adds the mutations that operations perform.
//! Positions and lengths are `u64` so a document is not limited by the
//! address space of the platform, even though [`ByteArrayData`] keeps
//! everything in one `Vec<u8>`.
//!
//! # Invariants
//!
//! - Every access is bounds checked and reports [`DataError::OutOfBounds`]
//! - `insert_uninitialized` produces zero bytes
//! - `replace` may end exactly at the document end but never past it

use std::fmt;

/// Result of a document access.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised by document accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataError {
    /// The requested range does not fit in the document.
    OutOfBounds {
        position: u64,
        length: u64,
        size: u64,
    },
    /// The range does not fit in memory on this platform.
    TooLarge { length: u64 },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                position,
                length,
                size,
            } => write!(
                f,
                "range {}..{} out of bounds (size {})",
                position,
                position.saturating_add(*length),
                size
            ),
            Self::TooLarge { length } => write!(f, "range of {} bytes is too large", length),
        }
    }
}

impl std::error::Error for DataError {}

/// Read access to a binary document.
pub trait BinaryData {
    /// Document length in bytes.
    fn size(&self) -> u64;

    /// Byte at the given position.
    fn byte_at(&self, position: u64) -> DataResult<u8>;

    /// Copy `length` bytes starting at `position` into `target`.
    fn copy_to_slice(&self, position: u64, target: &mut [u8]) -> DataResult<()>;

    /// Copy a range into a new buffer.
    fn copy(&self, position: u64, length: u64) -> DataResult<Vec<u8>> {
        let len = usize::try_from(length).map_err(|_| DataError::TooLarge { length })?;
        let mut buffer = vec![0; len];
        self.copy_to_slice(position, &mut buffer)?;
        Ok(buffer)
    }

    /// Copy the whole document.
    fn to_vec(&self) -> DataResult<Vec<u8>> {
        self.copy(0, self.size())
    }

    /// Whether the document holds no bytes.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Mutation access to a binary document.
pub trait EditableBinaryData: BinaryData {
    /// Overwrite a single byte.
    fn set_byte(&mut self, position: u64, value: u8) -> DataResult<()>;

    /// Insert `length` zero bytes at `position`.
    fn insert_uninitialized(&mut self, position: u64, length: u64) -> DataResult<()>;

    /// Insert bytes at `position`.
    fn insert(&mut self, position: u64, bytes: &[u8]) -> DataResult<()>;

    /// Remove `length` bytes starting at `position`.
    fn remove(&mut self, position: u64, length: u64) -> DataResult<()>;

    /// Overwrite bytes starting at `position`.
    fn replace(&mut self, position: u64, bytes: &[u8]) -> DataResult<()>;

    /// Drop all content.
    fn clear(&mut self);
}

/// In-memory document backed by a byte vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteArrayData {
    bytes: Vec<u8>,
}

impl ByteArrayData {
    /// Create an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Borrow the raw content.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the document and return its bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    fn check_range(&self, position: u64, length: u64) -> DataResult<(usize, usize)> {
        let size = self.size();
        let out_of_bounds = DataError::OutOfBounds {
            position,
            length,
            size,
        };
        let end = position.checked_add(length).ok_or(out_of_bounds)?;
        if end > size {
            return Err(out_of_bounds);
        }
        // Both fit: bounded by the vector length.
        Ok((position as usize, end as usize))
    }

    fn check_position(&self, position: u64) -> DataResult<usize> {
        if position > self.size() {
            return Err(DataError::OutOfBounds {
                position,
                length: 0,
                size: self.size(),
            });
        }
        Ok(position as usize)
    }
}

impl From<Vec<u8>> for ByteArrayData {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for ByteArrayData {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl BinaryData for ByteArrayData {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn byte_at(&self, position: u64) -> DataResult<u8> {
        let (start, _) = self.check_range(position, 1)?;
        Ok(self.bytes[start])
    }

    fn copy_to_slice(&self, position: u64, target: &mut [u8]) -> DataResult<()> {
        let (start, end) = self.check_range(position, target.len() as u64)?;
        target.copy_from_slice(&self.bytes[start..end]);
        Ok(())
    }
}

impl EditableBinaryData for ByteArrayData {
    fn set_byte(&mut self, position: u64, value: u8) -> DataResult<()> {
        let (start, _) = self.check_range(position, 1)?;
        self.bytes[start] = value;
        Ok(())
    }

    fn insert_uninitialized(&mut self, position: u64, length: u64) -> DataResult<()> {
        let at = self.check_position(position)?;
        let len = usize::try_from(length).map_err(|_| DataError::TooLarge { length })?;
        self.bytes.splice(at..at, std::iter::repeat_n(0, len));
        Ok(())
    }

    fn insert(&mut self, position: u64, bytes: &[u8]) -> DataResult<()> {
        let at = self.check_position(position)?;
        self.bytes.splice(at..at, bytes.iter().copied());
        Ok(())
    }

    fn remove(&mut self, position: u64, length: u64) -> DataResult<()> {
        let (start, end) = self.check_range(position, length)?;
        self.bytes.drain(start..end);
        Ok(())
    }

    fn replace(&mut self, position: u64, bytes: &[u8]) -> DataResult<()> {
        let (start, end) = self.check_range(position, bytes.len() as u64)?;
        self.bytes[start..end].copy_from_slice(bytes);
        Ok(())
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }
}
