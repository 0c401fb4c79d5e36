#![forbid(unsafe_code)]

//! Undo/redo history for one code area.
//!
//! [`HistoryManager`] keeps two stacks of commands with depth and memory
//! limits, plus a sync point marking the history position that matches the
//! saved document.
//!
//! # Invariants
//!
//! 1. `total_bytes` equals the sum of `size_bytes()` of all held commands
//! 2. `undo_stack.len() <= config.max_depth` after every operation
//! 3. The redo stack is cleared whenever a new command is pushed
//! 4. `is_modified()` is false exactly when the undo depth equals the sync
//!    point and the commands below it are unchanged
//!
//! ```text
//! push(c4)       undo: [c1 c2 c3 c4]   redo: []
//! undo() x2      undo: [c1 c2]         redo: [c4 c3]
//! push(c5)       undo: [c1 c2 c5]      redo: []       <- branch, redo dropped
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::command::{CodeAreaCommand, CommandError, CommandResult};
use crate::view::CodeArea;

/// Limits for the history manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of commands kept for undo.
    pub max_depth: usize,
    /// Maximum total bytes held by commands (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub const fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }

    /// No limits at all.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }
}

/// Undo and redo stacks with limits and a saved-state marker.
pub struct HistoryManager {
    undo_stack: VecDeque<Box<dyn CodeAreaCommand>>,
    redo_stack: VecDeque<Box<dyn CodeAreaCommand>>,
    config: HistoryConfig,
    total_bytes: usize,
    /// Undo depth matching the saved document, if still reachable.
    sync_point: Option<usize>,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("sync_point", &self.sync_point)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            total_bytes: 0,
            sync_point: Some(0),
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute a command and record it.
    ///
    /// A command that fails is not recorded.
    pub fn execute(
        &mut self,
        mut command: Box<dyn CodeAreaCommand>,
        area: &mut CodeArea,
    ) -> CommandResult {
        command.execute(area)?;
        tracing::debug!(
            command = command.debug_name(),
            description = command.description(),
            "command executed"
        );
        self.push(command);
        Ok(())
    }

    /// Record a command that has already been executed.
    ///
    /// Clears the redo stack and enforces limits.
    pub fn push(&mut self, command: Box<dyn CodeAreaCommand>) {
        self.clear_redo();
        if self.sync_point.is_some_and(|sync| sync > self.undo_stack.len()) {
            self.sync_point = None;
        }
        self.total_bytes += command.size_bytes();
        self.undo_stack.push_back(command);
        self.enforce_limits();
    }

    /// Undo the newest command.
    ///
    /// Returns `None` when there is nothing to undo. A command that fails to
    /// undo stays on the undo stack.
    pub fn undo(&mut self, area: &mut CodeArea) -> Option<Result<String, CommandError>> {
        let mut command = self.undo_stack.pop_back()?;
        let description = command.description().to_string();
        let before = command.size_bytes();
        let result = command.undo(area);
        self.total_bytes = self.total_bytes.saturating_sub(before) + command.size_bytes();
        match result {
            Ok(()) => {
                self.redo_stack.push_back(command);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(description = %description, error = %e, "undo failed");
                self.undo_stack.push_back(command);
                Some(Err(e))
            }
        }
    }

    /// Redo the most recently undone command.
    pub fn redo(&mut self, area: &mut CodeArea) -> Option<Result<String, CommandError>> {
        let mut command = self.redo_stack.pop_back()?;
        let description = command.description().to_string();
        let before = command.size_bytes();
        let result = command.redo(area);
        self.total_bytes = self.total_bytes.saturating_sub(before) + command.size_bytes();
        match result {
            Ok(()) => {
                self.undo_stack.push_back(command);
                Some(Ok(description))
            }
            Err(e) => {
                tracing::warn!(description = %description, error = %e, "redo failed");
                self.redo_stack.push_back(command);
                Some(Err(e))
            }
        }
    }

    /// Mutate the newest undo entry in place, e.g. to extend a typing
    /// session. Memory accounting follows the change.
    pub fn update_last_undo<R>(
        &mut self,
        update: impl FnOnce(&mut dyn CodeAreaCommand) -> R,
    ) -> Option<R> {
        let depth = self.undo_stack.len();
        let last = self.undo_stack.back_mut()?;
        let before = last.size_bytes();
        let result = update(last.as_mut());
        let after = last.size_bytes();
        self.total_bytes = self.total_bytes.saturating_sub(before) + after;
        if self.sync_point == Some(depth) {
            self.sync_point = None;
        }
        self.clear_redo();
        self.enforce_limits();
        Some(result)
    }

    /// Newest undo entry.
    #[must_use]
    pub fn last_undo(&self) -> Option<&dyn CodeAreaCommand> {
        self.undo_stack.back().map(|c| c.as_ref())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Saved State
    // ========================================================================

    /// Mark the current position as matching the saved document.
    pub fn set_sync_point(&mut self) {
        self.sync_point = Some(self.undo_stack.len());
    }

    /// Whether the document differs from the last sync point.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.sync_point != Some(self.undo_stack.len())
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Descriptions of undoable commands, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    /// Descriptions of redoable commands, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description())
            .collect()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|c| c.description())
    }

    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop all history. An unmodified document stays unmodified.
    pub fn clear(&mut self) {
        let was_modified = self.is_modified();
        for mut command in self.undo_stack.drain(..).chain(self.redo_stack.drain(..)) {
            command.dispose();
        }
        self.total_bytes = 0;
        self.sync_point = if was_modified { None } else { Some(0) };
    }

    fn clear_redo(&mut self) {
        for mut command in self.redo_stack.drain(..) {
            self.total_bytes = self.total_bytes.saturating_sub(command.size_bytes());
            command.dispose();
        }
    }

    fn evict_oldest_undo(&mut self) -> bool {
        let Some(mut command) = self.undo_stack.pop_front() else {
            return false;
        };
        self.total_bytes = self.total_bytes.saturating_sub(command.size_bytes());
        command.dispose();
        self.sync_point = match self.sync_point {
            Some(sync) if sync > 0 => Some(sync - 1),
            _ => None,
        };
        true
    }

    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            self.evict_oldest_undo();
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes {
                if let Some(mut command) = self.redo_stack.pop_front() {
                    self.total_bytes = self.total_bytes.saturating_sub(command.size_bytes());
                    command.dispose();
                    continue;
                }
                if !self.evict_oldest_undo() {
                    break;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
