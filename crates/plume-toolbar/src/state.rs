//! Derived toolbar state.
//!
//! A [`ToolbarState`] is a plain snapshot of the engine's answers to every
//! question the toolbar renders from. It is re-derived from scratch on
//! every change notification and never cached across edits; the engine is
//! the single source of truth and the snapshot is just the last thing it
//! said.

use plume_engine::types::{Alignment, BlockType, Color, HeadingLevel, ListKind, Mark, StateQuery};
use plume_engine::Engine;

/// Active-state snapshot for every toolbar control.
///
/// The default value is all-inactive, which is also what an uninitialized
/// or empty document reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub bullet_list: bool,
    pub ordered_list: bool,
    pub blockquote: bool,
    pub link: bool,
    pub alignment: Alignment,
    pub heading: Option<HeadingLevel>,
    pub text_color: Option<Color>,
    pub highlight_color: Option<Color>,
}

impl ToolbarState {
    /// Query the engine for every field.
    pub fn derive<E: Engine>(engine: &E) -> Self {
        let alignment = [Alignment::Center, Alignment::Right, Alignment::Justify]
            .into_iter()
            .find(|a| engine.is_active(&StateQuery::Align(*a)))
            .unwrap_or_default();
        Self {
            bold: engine.is_active(&StateQuery::Mark(Mark::Bold)),
            italic: engine.is_active(&StateQuery::Mark(Mark::Italic)),
            underline: engine.is_active(&StateQuery::Mark(Mark::Underline)),
            strike: engine.is_active(&StateQuery::Mark(Mark::Strike)),
            bullet_list: engine.is_active(&StateQuery::List(ListKind::Bullet)),
            ordered_list: engine.is_active(&StateQuery::List(ListKind::Ordered)),
            blockquote: engine.is_active(&StateQuery::Blockquote),
            link: engine.is_active(&StateQuery::Link),
            alignment,
            heading: engine.active_heading(),
            text_color: engine.text_color(),
            highlight_color: engine.highlight_color(),
        }
    }

    /// Whether an inline mark is reported active.
    pub fn mark_active(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strike => self.strike,
        }
    }

    /// The block type the heading selector should display.
    pub fn block(&self) -> BlockType {
        match self.heading {
            Some(level) => BlockType::Heading(level),
            None => BlockType::Paragraph,
        }
    }
}
