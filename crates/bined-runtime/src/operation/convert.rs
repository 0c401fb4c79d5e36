#![forbid(unsafe_code)]

//! Length-changing conversion of a range.

use std::fmt;

use bined_core::{BinaryData, EditableBinaryData, SelectionRange};

use super::{
    CodeAreaOperation, CompoundOperation, ExecutionResult, InsertOperation, OperationError,
    OperationResult, RemoveOperation,
};

/// Transform writing converted bytes into the same document.
///
/// The provider reads `[source_position, source_position + source_length)`
/// and inserts its output at `target_position`, directly after the source
/// range. The operation removes the source afterward.
pub trait ConversionDataProvider: fmt::Debug + Send + Sync {
    fn provide(
        &self,
        data: &mut dyn EditableBinaryData,
        source_position: u64,
        source_length: u64,
        target_position: u64,
    ) -> OperationResult<()>;

    /// First `limit` converted bytes of `[position, position + length)`,
    /// leaving `data` untouched.
    fn convert_detached(
        &self,
        _data: &dyn BinaryData,
        _position: u64,
        _length: u64,
        _limit: usize,
    ) -> OperationResult<Vec<u8>> {
        Err(OperationError::Unsupported("detached conversion"))
    }
}

/// Replaces a range by its converted form, which may differ in length.
#[derive(Debug)]
pub struct ConvertOperation {
    start_position: u64,
    length: u64,
    converted_length: u64,
    provider: Box<dyn ConversionDataProvider>,
}

impl ConvertOperation {
    #[must_use]
    pub fn new(
        start_position: u64,
        length: u64,
        converted_length: u64,
        provider: Box<dyn ConversionDataProvider>,
    ) -> Self {
        Self {
            start_position,
            length,
            converted_length,
            provider,
        }
    }

    #[must_use]
    pub const fn start_position(&self) -> u64 {
        self.start_position
    }

    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub const fn converted_length(&self) -> u64 {
        self.converted_length
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        self.convert(data)
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        let original = data.copy(self.start_position, self.length)?;
        let mut undo = CompoundOperation::new();
        undo.append_operation(
            RemoveOperation::new(self.start_position, 0, self.converted_length).into(),
        );
        undo.append_operation(InsertOperation::from_bytes(self.start_position, 0, original).into());

        let result = self.convert(data)?;
        Ok((result, Some(undo.into())))
    }

    fn convert(&self, data: &mut dyn EditableBinaryData) -> OperationResult<ExecutionResult> {
        let target = self.start_position + self.length;
        let size_before = data.size();
        self.provider
            .provide(data, self.start_position, self.length, target)?;
        let written = data.size().saturating_sub(size_before);
        if written != self.converted_length {
            data.remove(target, written)?;
            return Err(OperationError::Conversion(format!(
                "expected {} converted bytes, got {}",
                self.converted_length, written
            )));
        }
        data.remove(self.start_position, self.length)?;

        Ok(
            ExecutionResult::caret(self.start_position + self.converted_length, 0).with_selection(
                SelectionRange::from_length(self.start_position, self.converted_length),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bined_core::{ByteArrayData, CaretPosition};

    /// Duplicates every byte.
    #[derive(Debug)]
    struct Doubler;

    impl ConversionDataProvider for Doubler {
        fn provide(
            &self,
            data: &mut dyn EditableBinaryData,
            source_position: u64,
            source_length: u64,
            target_position: u64,
        ) -> OperationResult<()> {
            let source = data.copy(source_position, source_length)?;
            let doubled: Vec<u8> = source.iter().flat_map(|b| [*b, *b]).collect();
            data.insert(target_position, &doubled)?;
            Ok(())
        }
    }

    #[test]
    fn convert_changes_length_and_selects_result() {
        let mut data = ByteArrayData::from(vec![0, 1, 2, 9]);
        let op = ConvertOperation::new(1, 2, 4, Box::new(Doubler));
        let (result, undo) = op.execute_with_undo(&mut data).unwrap();
        assert_eq!(data.as_slice(), &[0, 1, 1, 2, 2, 9]);
        assert_eq!(result.caret, Some(CaretPosition::new(5, 0)));
        assert_eq!(result.selection, Some(SelectionRange::new(1, 5)));

        undo.unwrap().execute(&mut data).unwrap();
        assert_eq!(data.to_vec().unwrap(), vec![0, 1, 2, 9]);
    }

    #[test]
    fn mismatched_converted_length_is_rejected() {
        let mut data = ByteArrayData::from(vec![5, 6]);
        let op = ConvertOperation::new(0, 2, 3, Box::new(Doubler));
        let err = op.execute(&mut data).unwrap_err();
        assert!(matches!(err, OperationError::Conversion(_)));
        assert_eq!(data.as_slice(), &[5, 6]);
    }

    #[test]
    fn detached_conversion_defaults_to_unsupported() {
        let data = ByteArrayData::from(vec![1, 2]);
        assert_eq!(
            Doubler.convert_detached(&data, 0, 2, 8),
            Err(OperationError::Unsupported("detached conversion"))
        );
    }
}
