#![forbid(unsafe_code)]

//! Ordered group of operations applied as one unit.

use bined_core::EditableBinaryData;

use super::{CodeAreaOperation, ExecutionResult, OperationResult};

/// Operations executed in order and undone in reverse order.
///
/// Execution is fail-fast: when a child fails, the children already applied
/// are reverted before the error is returned, so the document is left as it
/// was before the compound started.
#[derive(Debug, Default)]
pub struct CompoundOperation {
    operations: Vec<CodeAreaOperation>,
}

impl CompoundOperation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_operation(&mut self, operation: CodeAreaOperation) {
        self.operations.push(operation);
    }

    pub fn append_operations(&mut self, operations: impl IntoIterator<Item = CodeAreaOperation>) {
        self.operations.extend(operations);
    }

    #[must_use]
    pub fn operations(&self) -> &[CodeAreaOperation] {
        &self.operations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(super) fn execute(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<ExecutionResult> {
        self.run(data).map(|(result, _)| result)
    }

    pub(super) fn execute_with_undo(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        self.run(data)
    }

    fn run(
        &self,
        data: &mut dyn EditableBinaryData,
    ) -> OperationResult<(ExecutionResult, Option<CodeAreaOperation>)> {
        // Undo operations are collected in execution order and reversed at
        // the end, which equals prepending each one.
        let mut undo_operations = Vec::with_capacity(self.operations.len());
        let mut result = ExecutionResult::none();

        for (index, operation) in self.operations.iter().enumerate() {
            match operation.execute_with_undo(data) {
                Ok((child_result, undo)) => {
                    result = result.then(child_result);
                    undo_operations.extend(undo);
                }
                Err(error) => {
                    tracing::warn!(
                        operation = "compound",
                        failed_child = index,
                        applied = undo_operations.len(),
                        error = %error,
                        "compound child failed, rolling back"
                    );
                    for undo in undo_operations.iter().rev() {
                        if let Err(rollback_error) = undo.execute(data) {
                            tracing::error!(
                                operation = "compound",
                                error = %rollback_error,
                                "compound rollback failed"
                            );
                            break;
                        }
                    }
                    return Err(error);
                }
            }
        }

        if undo_operations.is_empty() {
            return Ok((result, None));
        }
        undo_operations.reverse();
        let undo = CompoundOperation {
            operations: undo_operations,
        };
        Ok((result, Some(undo.into())))
    }

    pub(super) fn dispose(&mut self) {
        for operation in &mut self.operations {
            operation.dispose();
        }
    }
}
