//! The document-engine trait.
//!
//! The toolbar layer drives the editor through this deliberately narrow
//! interface: a command-chain executor, selection state queries, a
//! serialize-to-markup accessor, and a change-notification hook. Keeping
//! the seam this small lets the orchestration layer run against the
//! reference [`MemoryEngine`](crate::memory::MemoryEngine) in tests.

use crate::command::{Chain, Command};
use crate::types::{Color, HeadingLevel, StateQuery};

/// Notification delivered synchronously after every document mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Monotonic revision, bumped once per mutating chain.
    pub revision: u64,
}

/// Callback invoked on every change notification.
pub type ChangeHook = Box<dyn FnMut(ChangeEvent)>;

/// A live rich-text document.
pub trait Engine {
    /// Re-acquire focus on the document so commands target the live
    /// selection.
    fn focus(&mut self);

    /// Apply a command sequence as one atomic history entry.
    ///
    /// Returns false when nothing changed: the chain was empty, every
    /// command was redundant, or undo/redo hit the history boundary.
    fn apply_chain(&mut self, commands: &[Command]) -> bool;

    /// Whether a mark/block is active uniformly at the current selection.
    ///
    /// An uninitialized or empty document reports everything inactive.
    fn is_active(&self, query: &StateQuery) -> bool;

    /// The heading level active at the selection, if any.
    fn active_heading(&self) -> Option<HeadingLevel>;

    /// Text color visually applied at the selection, if any.
    fn text_color(&self) -> Option<Color>;

    /// Highlight color visually applied at the selection, if any.
    fn highlight_color(&self) -> Option<Color>;

    /// Serialize the full document to markup.
    fn serialize_html(&self) -> String;

    /// Monotonic document revision.
    fn revision(&self) -> u64;

    /// Install (or clear) the change-notification hook. The hook fires
    /// synchronously, in the same turn as the mutation that caused it.
    fn set_change_hook(&mut self, hook: Option<ChangeHook>);

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;

    /// Start a command chain against this engine.
    fn chain(&mut self) -> Chain<'_, Self>
    where
        Self: Sized,
    {
        Chain::new(self)
    }

    /// Apply a single command without refocusing.
    fn apply(&mut self, command: Command) -> bool
    where
        Self: Sized,
    {
        self.apply_chain(std::slice::from_ref(&command))
    }
}
