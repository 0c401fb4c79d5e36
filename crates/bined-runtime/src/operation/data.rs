#![forbid(unsafe_code)]

//! Insert, remove, modify and replace operations.

use bined_core::EditableBinaryData;

use super::{
    CodeAreaOperation, CompoundOperation, DataProvider, ExecutionResult, OperationError,
    OperationResult,
};

/// Inserts `length` bytes supplied by a provider.
#[derive(Debug)]
pub struct InsertOperation {
    position: u64,
    code_offset: u32,
    length: u64,
    provider: Box<dyn DataProvider>,
}

impl InsertOperation {
    #[must_use]
    pub fn new(
        position: u64,
        code_offset: u32,
        length: u64,
        provider: Box<dyn DataProvider>,
    ) -> Self {
        Self {
            position,
            code_offset,
            length,
            provider,
        }
    }

    /// Insert literal bytes.
    #[must_use]
    pub fn from_bytes(position: u64, code_offset: u32, bytes: Vec<u8>) -> Self {
        let length = bytes.len() as u64;
        Self::new(position, code_offset, length, Box::new(bytes))
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    pub(crate) fn provider_size(&self) -> usize {
        self.provider.size_bytes()
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        data.insert_uninitialized(self.position, self.length)?;
        if let Err(e) = self.provider.provide(data, self.position, self.length) {
            data.remove(self.position, self.length)?;
            return Err(e);
        }
        Ok(ExecutionResult::caret(self.position + self.length, 0))
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        let result = self.execute(data)?;
        let undo = RemoveOperation::new(self.position, self.code_offset, self.length);
        Ok((result, Some(undo.into())))
    }

    pub(super) fn dispose(&mut self) {
        self.provider.dispose();
    }
}

/// Removes a range; the caret lands where the range started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOperation {
    position: u64,
    code_offset: u32,
    length: u64,
}

impl RemoveOperation {
    #[must_use]
    pub const fn new(position: u64, code_offset: u32, length: u64) -> Self {
        Self {
            position,
            code_offset,
            length,
        }
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        data.remove(self.position, self.length)?;
        Ok(ExecutionResult::caret(self.position, self.code_offset))
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        let removed = data.copy(self.position, self.length)?;
        let result = self.execute(data)?;
        let undo = InsertOperation::from_bytes(self.position, self.code_offset, removed);
        Ok((result, Some(undo.into())))
    }
}

/// Overwrites bytes in place without changing the document size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyOperation {
    position: u64,
    bytes: Vec<u8>,
}

impl ModifyOperation {
    #[must_use]
    pub const fn new(position: u64, bytes: Vec<u8>) -> Self {
        Self { position, bytes }
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        data.replace(self.position, &self.bytes)?;
        Ok(ExecutionResult::none())
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        let previous = data.copy(self.position, self.bytes.len() as u64)?;
        let result = self.execute(data)?;
        Ok((result, Some(Self::new(self.position, previous).into())))
    }

    pub(super) fn dispose(&mut self) {
        self.bytes = Vec::new();
    }
}

/// Overwrites `length` bytes, growing the document when the range runs
/// past its end.
#[derive(Debug)]
pub struct ReplaceOperation {
    position: u64,
    length: u64,
    provider: Box<dyn DataProvider>,
}

impl ReplaceOperation {
    #[must_use]
    pub fn new(position: u64, length: u64, provider: Box<dyn DataProvider>) -> Self {
        Self {
            position,
            length,
            provider,
        }
    }

    /// Replace with literal bytes.
    #[must_use]
    pub fn from_bytes(position: u64, bytes: Vec<u8>) -> Self {
        let length = bytes.len() as u64;
        Self::new(position, length, Box::new(bytes))
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    pub(crate) fn provider_size(&self) -> usize {
        self.provider.size_bytes()
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        self.run(data, false).map(|(result, _)| result)
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        self.run(data, true)
    }

    fn run(
        &self,
        data: &mut dyn EditableBinaryData,
        with_undo: bool,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        let size = data.size();
        let position = self.position;
        let length = self.length;
        if position > size {
            return Err(OperationError::OutsideDocument { position, size });
        }

        let end = position
            .checked_add(length)
            .ok_or(OperationError::OutsideDocument { position, size })?;
        // Bytes past the current end that the replace appends.
        let appended = end.saturating_sub(size);

        let undo: Option<CodeAreaOperation> = if !with_undo {
            None
        } else if position == size {
            Some(RemoveOperation::new(position, 0, length).into())
        } else if appended > 0 {
            let overlapped = data.copy(position, length - appended)?;
            let mut compound = CompoundOperation::new();
            compound.append_operation(ModifyOperation::new(position, overlapped).into());
            compound.append_operation(RemoveOperation::new(size, 0, appended).into());
            Some(compound.into())
        } else {
            Some(ModifyOperation::new(position, data.copy(position, length)?).into())
        };

        if appended > 0 {
            data.insert_uninitialized(size, appended)?;
        }
        if let Err(e) = self.provider.provide(data, position, length) {
            if appended > 0 {
                data.remove(size, appended)?;
            }
            return Err(e);
        }
        Ok((ExecutionResult::caret(end, 0), undo))
    }

    pub(super) fn dispose(&mut self) {
        self.provider.dispose();
    }
}
