//! Heading selector.
//!
//! A fixed-option dropdown over paragraph and the six heading levels. The
//! selector keeps a displayed choice, but the engine stays authoritative:
//! after every change notification [`HeadingSelector::sync`] reconciles
//! the display against the derived toolbar state, so a heading toggled
//! back to paragraph by its own command (or by undo) never leaves a stale
//! label behind.

use plume_engine::types::{BlockType, HeadingLevel};
use plume_engine::Command;

use crate::state::ToolbarState;

/// One dropdown option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingChoice {
    #[default]
    Paragraph,
    Heading(HeadingLevel),
}

impl HeadingChoice {
    /// All options in display order.
    pub const ALL: [HeadingChoice; 7] = [
        HeadingChoice::Paragraph,
        HeadingChoice::Heading(HeadingLevel::H1),
        HeadingChoice::Heading(HeadingLevel::H2),
        HeadingChoice::Heading(HeadingLevel::H3),
        HeadingChoice::Heading(HeadingLevel::H4),
        HeadingChoice::Heading(HeadingLevel::H5),
        HeadingChoice::Heading(HeadingLevel::H6),
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            HeadingChoice::Paragraph => "Paragraphe",
            HeadingChoice::Heading(HeadingLevel::H1) => "Titre 1",
            HeadingChoice::Heading(HeadingLevel::H2) => "Titre 2",
            HeadingChoice::Heading(HeadingLevel::H3) => "Titre 3",
            HeadingChoice::Heading(HeadingLevel::H4) => "Titre 4",
            HeadingChoice::Heading(HeadingLevel::H5) => "Titre 5",
            HeadingChoice::Heading(HeadingLevel::H6) => "Titre 6",
        }
    }

    /// The command this option dispatches.
    ///
    /// Paragraph sets the block outright; a level uses toggle semantics,
    /// so picking the already-active level reverts to paragraph.
    pub fn command(&self) -> Command {
        match self {
            HeadingChoice::Paragraph => Command::SetBlock(BlockType::Paragraph),
            HeadingChoice::Heading(level) => Command::ToggleHeading(*level),
        }
    }
}

/// The selector's displayed state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingSelector {
    selected: HeadingChoice,
}

impl HeadingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> HeadingChoice {
        self.selected
    }

    /// Pick an option, returning the command to dispatch. The display is
    /// set optimistically and reconciled by the next `sync`.
    pub fn choose(&mut self, choice: HeadingChoice) -> Command {
        self.selected = choice;
        choice.command()
    }

    /// Reconcile the display against engine truth.
    pub fn sync(&mut self, state: &ToolbarState) {
        self.selected = match state.heading {
            Some(level) => HeadingChoice::Heading(level),
            None => HeadingChoice::Paragraph,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(HeadingChoice::Paragraph.label(), "Paragraphe");
        assert_eq!(HeadingChoice::Heading(HeadingLevel::H3).label(), "Titre 3");
        assert_eq!(HeadingChoice::ALL.len(), 7);
    }

    #[test]
    fn test_choose_maps_to_commands() {
        let mut selector = HeadingSelector::new();
        assert_eq!(
            selector.choose(HeadingChoice::Heading(HeadingLevel::H2)),
            Command::ToggleHeading(HeadingLevel::H2)
        );
        assert_eq!(
            selector.choose(HeadingChoice::Paragraph),
            Command::SetBlock(BlockType::Paragraph)
        );
    }

    #[test]
    fn test_sync_reconciles_against_state() {
        let mut selector = HeadingSelector::new();
        selector.choose(HeadingChoice::Heading(HeadingLevel::H1));

        // The engine reports paragraph (the toggle reverted), so the
        // display must follow.
        selector.sync(&ToolbarState::default());
        assert_eq!(selector.selected(), HeadingChoice::Paragraph);

        let state = ToolbarState {
            heading: Some(HeadingLevel::H4),
            ..ToolbarState::default()
        };
        selector.sync(&state);
        assert_eq!(selector.selected(), HeadingChoice::Heading(HeadingLevel::H4));
    }
}
