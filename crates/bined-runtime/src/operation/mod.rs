#![forbid(unsafe_code)]

//! Reversible document operations.
//!
//! An operation is a single mutation of an [`EditableBinaryData`]. It runs
//! once, through either [`CodeAreaOperation::execute`] or
//! [`CodeAreaOperation::execute_with_undo`], and the latter also produces the
//! operation that reverses it.
//!
//! # Architecture
//!
//! ```text
//!   CodeAreaOperation (closed enum)
//!   ├── Insert    undo: Remove
//!   ├── Remove    undo: Insert (removed bytes)
//!   ├── Modify    undo: Modify (previous bytes)
//!   ├── Replace   undo: Remove | Modify | Compound[Modify, Remove]
//!   ├── Convert   undo: Compound[Remove, Insert]
//!   └── Compound  undo: Compound (children reversed)
//! ```
//!
//! Operations never touch the caret or selection directly. Each execution
//! returns an [`ExecutionResult`] naming where the caret and selection should
//! land; the command layer applies it to the view.
//!
//! # Invariants
//!
//! - `execute_with_undo` followed by executing the returned undo restores
//!   the document bytes exactly
//! - A compound's undo lists its children's undo operations in reverse order
//! - A failing compound rolls back the children it already applied

mod compound;
mod convert;
mod data;

use std::fmt;

use bined_core::{CaretPosition, DataError, EditableBinaryData, SelectionRange};

pub use compound::CompoundOperation;
pub use convert::{ConversionDataProvider, ConvertOperation};
pub use data::{InsertOperation, ModifyOperation, RemoveOperation, ReplaceOperation};

/// Result of an operation.
pub type OperationResult<T> = Result<T, OperationError>;

/// Errors raised while executing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The operation targets a position past the document end.
    OutsideDocument { position: u64, size: u64 },
    /// The underlying document rejected an access.
    Data(DataError),
    /// A data provider could not supply the requested bytes.
    ProviderExhausted { expected: u64, available: u64 },
    /// The requested path is deliberately not implemented.
    Unsupported(&'static str),
    /// A conversion failed.
    Conversion(String),
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideDocument { position, size } => write!(
                f,
                "Unable to replace data outside of document (position {}, size {})",
                position, size
            ),
            Self::Data(e) => write!(f, "data access failed: {e}"),
            Self::ProviderExhausted {
                expected,
                available,
            } => write!(
                f,
                "data provider supplied {} of {} bytes",
                available, expected
            ),
            Self::Unsupported(what) => write!(f, "unsupported operation: {what}"),
            Self::Conversion(msg) => write!(f, "conversion failed: {msg}"),
        }
    }
}

impl std::error::Error for OperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for OperationError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}

/// Kind of an operation, for logging and command classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    InsertData,
    RemoveData,
    ModifyData,
    ReplaceData,
    ConvertData,
    Compound,
}

impl OperationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsertData => "insert",
            Self::RemoveData => "remove",
            Self::ModifyData => "modify",
            Self::ReplaceData => "replace",
            Self::ConvertData => "convert",
            Self::Compound => "compound",
        }
    }
}

/// Where the caret and selection land after an operation.
///
/// Only `data_position` and `code_offset` of the caret are meaningful; the
/// view keeps its active section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub caret: Option<CaretPosition>,
    pub selection: Option<SelectionRange>,
}

impl ExecutionResult {
    /// Nothing to reposition.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            caret: None,
            selection: None,
        }
    }

    /// Move the caret only.
    #[must_use]
    pub const fn caret(data_position: u64, code_offset: u32) -> Self {
        Self {
            caret: Some(CaretPosition::new(data_position, code_offset)),
            selection: None,
        }
    }

    /// Also set the selection.
    #[must_use]
    pub const fn with_selection(mut self, selection: SelectionRange) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Combine with a later result; later values win.
    #[must_use]
    pub fn then(self, later: Self) -> Self {
        Self {
            caret: later.caret.or(self.caret),
            selection: later.selection.or(self.selection),
        }
    }
}

/// Source of the bytes written by insert and replace operations.
///
/// `provide` must fill exactly `[position, position + length)`, which the
/// operation has already made room for.
pub trait DataProvider: fmt::Debug + Send + Sync {
    fn provide(
        &self,
        data: &mut dyn EditableBinaryData,
        position: u64,
        length: u64,
    ) -> OperationResult<()>;

    /// Bytes held by the provider, for memory accounting.
    fn size_bytes(&self) -> usize {
        0
    }

    /// Release held resources.
    fn dispose(&mut self) {}
}

impl DataProvider for Vec<u8> {
    fn provide(
        &self,
        data: &mut dyn EditableBinaryData,
        position: u64,
        length: u64,
    ) -> OperationResult<()> {
        let chunk = usize::try_from(length)
            .ok()
            .and_then(|len| self.get(..len))
            .ok_or(OperationError::ProviderExhausted {
                expected: length,
                available: self.len() as u64,
            })?;
        data.replace(position, chunk)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        self.capacity()
    }

    fn dispose(&mut self) {
        self.clear();
        self.shrink_to_fit();
    }
}

/// A single reversible mutation.
#[derive(Debug)]
pub enum CodeAreaOperation {
    Insert(InsertOperation),
    Remove(RemoveOperation),
    Modify(ModifyOperation),
    Replace(ReplaceOperation),
    Convert(ConvertOperation),
    Compound(CompoundOperation),
}

impl CodeAreaOperation {
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Insert(_) => OperationType::InsertData,
            Self::Remove(_) => OperationType::RemoveData,
            Self::Modify(_) => OperationType::ModifyData,
            Self::Replace(_) => OperationType::ReplaceData,
            Self::Convert(_) => OperationType::ConvertData,
            Self::Compound(_) => OperationType::Compound,
        }
    }

    /// Apply the operation without building an undo.
    pub fn execute(&self, data: &mut dyn EditableBinaryData) -> OperationResult<ExecutionResult> {
        tracing::trace!(operation = self.operation_type().as_str(), "execute");
        match self {
            Self::Insert(op) => op.execute(data),
            Self::Remove(op) => op.execute(data),
            Self::Modify(op) => op.execute(data),
            Self::Replace(op) => op.execute(data),
            Self::Convert(op) => op.execute(data),
            Self::Compound(op) => op.execute(data),
        }
    }

    /// Apply the operation and return the operation that reverses it.
    pub fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        tracing::trace!(
            operation = self.operation_type().as_str(),
            "execute with undo"
        );
        match self {
            Self::Insert(op) => op.execute_with_undo(data),
            Self::Remove(op) => op.execute_with_undo(data),
            Self::Modify(op) => op.execute_with_undo(data),
            Self::Replace(op) => op.execute_with_undo(data),
            Self::Convert(op) => op.execute_with_undo(data),
            Self::Compound(op) => op.execute_with_undo(data),
        }
    }

    /// Release held data. Safe to call more than once.
    pub fn dispose(&mut self) {
        match self {
            Self::Insert(op) => op.dispose(),
            Self::Remove(_) | Self::Convert(_) => {}
            Self::Modify(op) => op.dispose(),
            Self::Replace(op) => op.dispose(),
            Self::Compound(op) => op.dispose(),
        }
    }

    /// Walk the operation tree.
    pub fn accept<V: OperationVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Insert(op) => visitor.visit_insert(op),
            Self::Remove(op) => visitor.visit_remove(op),
            Self::Modify(op) => visitor.visit_modify(op),
            Self::Replace(op) => visitor.visit_replace(op),
            Self::Convert(op) => visitor.visit_convert(op),
            Self::Compound(op) => visitor.visit_compound(op),
        }
    }

    /// Approximate heap usage for history budgeting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let mut sizer = SizeVisitor::default();
        self.accept(&mut sizer);
        sizer.total
    }
}

impl From<InsertOperation> for CodeAreaOperation {
    fn from(op: InsertOperation) -> Self {
        Self::Insert(op)
    }
}

impl From<RemoveOperation> for CodeAreaOperation {
    fn from(op: RemoveOperation) -> Self {
        Self::Remove(op)
    }
}

impl From<ModifyOperation> for CodeAreaOperation {
    fn from(op: ModifyOperation) -> Self {
        Self::Modify(op)
    }
}

impl From<ReplaceOperation> for CodeAreaOperation {
    fn from(op: ReplaceOperation) -> Self {
        Self::Replace(op)
    }
}

impl From<ConvertOperation> for CodeAreaOperation {
    fn from(op: ConvertOperation) -> Self {
        Self::Convert(op)
    }
}

impl From<CompoundOperation> for CodeAreaOperation {
    fn from(op: CompoundOperation) -> Self {
        Self::Compound(op)
    }
}

/// Visitor over an operation tree.
///
/// The default compound visit descends into the children in order.
pub trait OperationVisitor {
    fn visit_insert(&mut self, _op: &InsertOperation) {}
    fn visit_remove(&mut self, _op: &RemoveOperation) {}
    fn visit_modify(&mut self, _op: &ModifyOperation) {}
    fn visit_replace(&mut self, _op: &ReplaceOperation) {}
    fn visit_convert(&mut self, _op: &ConvertOperation) {}
    fn visit_compound(&mut self, op: &CompoundOperation) {
        for child in op.operations() {
            child.accept(self);
        }
    }
}

#[derive(Default)]
struct SizeVisitor {
    total: usize,
}

impl OperationVisitor for SizeVisitor {
    fn visit_insert(&mut self, op: &InsertOperation) {
        self.total += std::mem::size_of::<InsertOperation>() + op.provider_size();
    }

    fn visit_remove(&mut self, _op: &RemoveOperation) {
        self.total += std::mem::size_of::<RemoveOperation>();
    }

    fn visit_modify(&mut self, op: &ModifyOperation) {
        self.total += std::mem::size_of::<ModifyOperation>() + op.bytes().len();
    }

    fn visit_replace(&mut self, op: &ReplaceOperation) {
        self.total += std::mem::size_of::<ReplaceOperation>() + op.provider_size();
    }

    fn visit_convert(&mut self, _op: &ConvertOperation) {
        self.total += std::mem::size_of::<ConvertOperation>();
    }

    fn visit_compound(&mut self, op: &CompoundOperation) {
        self.total += std::mem::size_of::<CompoundOperation>();
        for child in op.operations() {
            child.accept(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bined_core::ByteArrayData;

    #[test]
    fn vec_provider_fills_range() {
        let mut doc = ByteArrayData::from(vec![0u8; 4]);
        vec![7u8, 8, 9].provide(&mut doc, 1, 2).unwrap();
        assert_eq!(doc.as_slice(), &[0, 7, 8, 0]);
    }

    #[test]
    fn short_vec_provider_fails() {
        let mut doc = ByteArrayData::from(vec![0u8; 4]);
        let err = vec![7u8].provide(&mut doc, 0, 2).unwrap_err();
        assert_eq!(
            err,
            OperationError::ProviderExhausted {
                expected: 2,
                available: 1
            }
        );
    }

    #[test]
    fn disposed_vec_provider_is_empty() {
        let mut provider = vec![1u8, 2];
        DataProvider::dispose(&mut provider);
        assert!(provider.is_empty());
    }

    #[test]
    fn execution_result_merge_prefers_later() {
        let first = ExecutionResult::caret(1, 0).with_selection(SelectionRange::new(0, 1));
        let second = ExecutionResult::caret(5, 1);
        let merged = first.then(second);
        assert_eq!(merged.caret, Some(CaretPosition::new(5, 1)));
        assert_eq!(merged.selection, Some(SelectionRange::new(0, 1)));
        assert_eq!(ExecutionResult::none().then(ExecutionResult::none()), ExecutionResult::none());
    }

    #[test]
    fn outside_document_message() {
        let err = OperationError::OutsideDocument {
            position: 9,
            size: 4,
        };
        assert!(err.to_string().starts_with("Unable to replace data outside of document"));
    }

    #[test]
    fn size_accounts_for_payload() {
        let small = CodeAreaOperation::from(ModifyOperation::new(0, vec![1]));
        let large = CodeAreaOperation::from(ModifyOperation::new(0, vec![1; 100]));
        assert!(large.size_bytes() > small.size_bytes());
    }
}
