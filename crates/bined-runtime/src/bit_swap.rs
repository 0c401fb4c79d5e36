#![forbid(unsafe_code)]

//! Bit and byte order conversions over a range.
//!
//! Each conversion streams the source range in [`BUFFER_SIZE`] chunks and
//! writes its output directly after the source, as a
//! [`ConversionDataProvider`] for [`ConvertOperation`]. Memory use stays
//! bounded by the chunk size regardless of the selection length.

use std::fmt;

use bined_core::{BinaryData, DataResult, EditableBinaryData, SelectionRange};

use crate::operation::{ConversionDataProvider, ConvertOperation, OperationResult};
use crate::undo::DataCommand;
use crate::view::CodeArea;

/// Chunk size used while streaming a conversion.
pub const BUFFER_SIZE: usize = 4096;

/// Available conversions. All of them preserve the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitSwapOperation {
    /// XOR every byte with `0xFF`.
    InvertBits,
    /// Reverse the order of bytes in the whole range.
    ReverseBytesOrder,
    /// Exchange adjacent byte pairs; a trailing odd byte stays.
    SwapPairs,
}

impl BitSwapOperation {
    pub const ALL: [Self; 3] = [Self::InvertBits, Self::ReverseBytesOrder, Self::SwapPairs];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvertBits => "invert",
            Self::ReverseBytesOrder => "reverse",
            Self::SwapPairs => "swap-pairs",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Converted form of the chunk at `offset` of a range of `length` bytes,
    /// returned as (output offset, bytes).
    fn convert_chunk<D: BinaryData + ?Sized>(
        self,
        data: &D,
        source_position: u64,
        length: u64,
        offset: u64,
        chunk: u64,
    ) -> DataResult<(u64, Vec<u8>)> {
        match self {
            Self::InvertBits => {
                let mut bytes = data.copy(source_position + offset, chunk)?;
                for byte in &mut bytes {
                    *byte ^= 0xff;
                }
                Ok((offset, bytes))
            }
            Self::ReverseBytesOrder => {
                // Output chunk at `offset` mirrors the source chunk ending at
                // `length - offset`.
                let mut bytes = data.copy(source_position + length - offset - chunk, chunk)?;
                bytes.reverse();
                Ok((offset, bytes))
            }
            Self::SwapPairs => {
                let mut bytes = data.copy(source_position + offset, chunk)?;
                for pair in bytes.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
                Ok((offset, bytes))
            }
        }
    }
}

impl fmt::Display for BitSwapOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ConversionDataProvider for BitSwapOperation {
    fn provide(
        &self,
        data: &mut dyn EditableBinaryData,
        source_position: u64,
        source_length: u64,
        target_position: u64,
    ) -> OperationResult<()> {
        let mut offset = 0;
        while offset < source_length {
            let chunk = (source_length - offset).min(BUFFER_SIZE as u64);
            let (at, bytes) =
                self.convert_chunk(&*data, source_position, source_length, offset, chunk)?;
            data.insert(target_position + at, &bytes)?;
            offset += chunk;
        }
        Ok(())
    }

    fn convert_detached(
        &self,
        data: &dyn BinaryData,
        position: u64,
        length: u64,
        limit: usize,
    ) -> OperationResult<Vec<u8>> {
        let wanted = length.min(limit as u64);
        let mut preview = Vec::with_capacity(usize::try_from(wanted).unwrap_or(limit));
        let mut offset = 0;
        while offset < wanted {
            let chunk = (wanted - offset).min(BUFFER_SIZE as u64);
            let (_, bytes) = self.convert_chunk(data, position, length, offset, chunk)?;
            preview.extend_from_slice(&bytes);
            offset += chunk;
        }
        // A pair split by the limit shows its swapped first half only.
        if *self == Self::SwapPairs && wanted % 2 == 1 && wanted < length {
            if let Some(last) = preview.last_mut() {
                *last = data.byte_at(position + wanted)?;
            }
        }
        Ok(preview)
    }
}

/// Entry points for bit swapping a code area.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitSwapping;

impl BitSwapping {
    /// Command converting the selection, or the whole document when nothing
    /// is selected. `None` for an empty range.
    #[must_use]
    pub fn create_command(area: &CodeArea, operation: BitSwapOperation) -> Option<DataCommand> {
        let selection = area.selection();
        let (start, length) = if selection.is_empty() {
            (0, area.data_size())
        } else {
            (selection.first(), selection.length())
        };
        if length == 0 {
            return None;
        }
        let convert = ConvertOperation::new(start, length, length, Box::new(operation));
        Some(DataCommand::new(convert).with_description(format!("Bit swap ({operation})")))
    }

    /// First `limit` bytes of the converted range, without touching `data`.
    pub fn preview(
        data: &dyn BinaryData,
        range: SelectionRange,
        operation: BitSwapOperation,
        limit: usize,
    ) -> OperationResult<Vec<u8>> {
        operation.convert_detached(data, range.first(), range.length(), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::CodeAreaCommand;
    use bined_core::ByteArrayData;

    fn convert(bytes: Vec<u8>, operation: BitSwapOperation) -> Vec<u8> {
        let mut area = CodeArea::new(ByteArrayData::from(bytes));
        let mut cmd = BitSwapping::create_command(&area, operation).unwrap();
        cmd.execute(&mut area).unwrap();
        area.content_data().to_vec().unwrap()
    }

    #[test]
    fn invert_flips_every_bit() {
        assert_eq!(
            convert(vec![0x00, 0x0f, 0xff], BitSwapOperation::InvertBits),
            vec![0xff, 0xf0, 0x00]
        );
    }

    #[test]
    fn reverse_spans_chunk_boundaries() {
        let source: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut expected = source.clone();
        expected.reverse();
        assert_eq!(convert(source, BitSwapOperation::ReverseBytesOrder), expected);
    }

    #[test]
    fn swap_pairs_keeps_trailing_byte() {
        assert_eq!(
            convert(vec![1, 2, 3, 4, 5], BitSwapOperation::SwapPairs),
            vec![2, 1, 4, 3, 5]
        );
    }

    #[test]
    fn selection_limits_the_conversion() {
        let mut area = CodeArea::new(ByteArrayData::from(vec![1, 2, 3, 4]));
        area.set_selection(SelectionRange::new(3, 1));
        let mut cmd =
            BitSwapping::create_command(&area, BitSwapOperation::ReverseBytesOrder).unwrap();
        cmd.execute(&mut area).unwrap();
        assert_eq!(area.content_data().to_vec().unwrap(), vec![1, 3, 2, 4]);
        assert_eq!(area.selection(), SelectionRange::new(1, 3));
        cmd.undo(&mut area).unwrap();
        assert_eq!(area.content_data().to_vec().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_document_yields_no_command() {
        let area = CodeArea::new(ByteArrayData::new());
        assert!(BitSwapping::create_command(&area, BitSwapOperation::InvertBits).is_none());
    }

    #[test]
    fn preview_is_bounded_and_leaves_data_alone() {
        let data = ByteArrayData::from(vec![1, 2, 3, 4, 5, 6]);
        let range = SelectionRange::new(0, 6);
        assert_eq!(
            BitSwapping::preview(&data, range, BitSwapOperation::ReverseBytesOrder, 2).unwrap(),
            vec![6, 5]
        );
        assert_eq!(
            BitSwapping::preview(&data, range, BitSwapOperation::SwapPairs, 3).unwrap(),
            vec![2, 1, 4]
        );
        assert_eq!(data.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn names_round_trip() {
        for op in BitSwapOperation::ALL {
            assert_eq!(BitSwapOperation::from_name(op.name()), Some(op));
        }
    }
}
