//! Engine commands and the chain builder.
//!
//! A [`Command`] maps 1:1 to an engine primitive. The [`Chain`] builder is
//! how callers hand a focus request plus a command sequence to the engine
//! as one atomic unit.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::engine::Engine;
use crate::types::{Alignment, BlockType, Color, HeadingLevel, ListKind, Mark};

/// A single named engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Toggle an inline mark on the current selection.
    ToggleMark(Mark),
    /// Set the block type outright (used for paragraph).
    SetBlock(BlockType),
    /// Toggle a heading level: setting it when inactive, reverting the
    /// block to paragraph when that exact level is already active.
    ToggleHeading(HeadingLevel),
    SetAlignment(Alignment),
    ToggleList(ListKind),
    /// Wrap the selection in a link. Empty URLs are rejected by the engine.
    SetLink(SmolStr),
    UnsetLink,
    ToggleBlockquote,
    UnsetBlockquote,
    SetHorizontalRule,
    /// Set the text color at the selection.
    SetColor(Color),
    /// Set the highlight (background) color at the selection.
    SetHighlight(Color),
    InsertTable {
        rows: usize,
        cols: usize,
        with_header_row: bool,
    },
    AddRowAfter,
    DeleteRow,
    AddColumnAfter,
    DeleteColumn,
    DeleteTable,
    Undo,
    Redo,
}

impl Command {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleMark(_) => "toggle-mark",
            Command::SetBlock(_) => "set-block",
            Command::ToggleHeading(_) => "toggle-heading",
            Command::SetAlignment(_) => "set-alignment",
            Command::ToggleList(_) => "toggle-list",
            Command::SetLink(_) => "set-link",
            Command::UnsetLink => "unset-link",
            Command::ToggleBlockquote => "toggle-blockquote",
            Command::UnsetBlockquote => "unset-blockquote",
            Command::SetHorizontalRule => "set-horizontal-rule",
            Command::SetColor(_) => "set-color",
            Command::SetHighlight(_) => "set-highlight",
            Command::InsertTable { .. } => "insert-table",
            Command::AddRowAfter => "add-row-after",
            Command::DeleteRow => "delete-row",
            Command::AddColumnAfter => "add-column-after",
            Command::DeleteColumn => "delete-column",
            Command::DeleteTable => "delete-table",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }

    /// Whether this is a history pass-through rather than a document edit.
    pub fn is_history(&self) -> bool {
        matches!(self, Command::Undo | Command::Redo)
    }
}

/// A pending command sequence against an engine.
///
/// Mirrors the command-chain surface of the underlying editor: optionally
/// refocus the document, then apply every queued command as one atomic
/// history entry. `run` reports whether anything actually changed; a chain
/// that hits only no-ops (history boundary, redundant state) returns false
/// and is never an error.
#[must_use = "a chain does nothing until run"]
pub struct Chain<'a, E: Engine + ?Sized> {
    engine: &'a mut E,
    focus: bool,
    commands: Vec<Command>,
}

impl<'a, E: Engine + ?Sized> Chain<'a, E> {
    pub fn new(engine: &'a mut E) -> Self {
        Self {
            engine,
            focus: false,
            commands: Vec::new(),
        }
    }

    /// Re-acquire focus on the document before applying, so the commands
    /// target the live selection.
    pub fn focus(mut self) -> Self {
        self.focus = true;
        self
    }

    /// Queue a command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Focus (if requested) and apply the queued commands atomically.
    pub fn run(self) -> bool {
        if self.focus {
            self.engine.focus();
        }
        if self.commands.is_empty() {
            return false;
        }
        tracing::trace!(
            commands = self.commands.len(),
            first = self.commands[0].name(),
            "running chain"
        );
        self.engine.apply_chain(&self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;

    #[test]
    fn test_empty_chain_is_noop() {
        let mut engine = MemoryEngine::new();
        let before = engine.revision();
        assert!(!engine.chain().focus().run());
        assert_eq!(engine.revision(), before);
    }

    #[test]
    fn test_chain_focuses_before_applying() {
        let mut engine = MemoryEngine::new();
        assert!(
            engine
                .chain()
                .focus()
                .command(Command::ToggleMark(Mark::Bold))
                .run()
        );
        assert_eq!(engine.focus_count(), 1);
    }

    #[test]
    fn test_chain_is_one_history_entry() {
        let mut engine = MemoryEngine::new();
        assert!(
            engine
                .chain()
                .command(Command::ToggleMark(Mark::Bold))
                .command(Command::ToggleMark(Mark::Italic))
                .run()
        );
        assert!(engine.apply(Command::Undo));
        assert!(!engine.is_active(&crate::StateQuery::Mark(Mark::Bold)));
        assert!(!engine.is_active(&crate::StateQuery::Mark(Mark::Italic)));
    }
}
