//! In-memory reference engine.
//!
//! `MemoryEngine` is a plain-field implementation of [`Engine`] used by the
//! toolbar tests and the demo binary. It models the formatting state at the
//! current selection plus a small amount of structure (one table, pasted
//! fragments, horizontal rules) rather than a full document tree; that is
//! exactly as much engine as the orchestration layer needs to be exercised
//! honestly, including history grouping and markup serialization.

use std::collections::BTreeSet;

use smol_str::SmolStr;
use web_time::Instant;

use crate::command::Command;
use crate::engine::{ChangeEvent, ChangeHook, Engine};
use crate::history::{History, HistoryConfig};
use crate::types::{Alignment, BlockType, Color, HeadingLevel, ListKind, Mark, StateQuery};

/// A table grid. The first row doubles as the header when `header_row`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableState {
    header_row: bool,
    rows: Vec<Vec<String>>,
}

impl TableState {
    fn new(rows: usize, cols: usize, with_header_row: bool) -> Self {
        Self {
            header_row: with_header_row,
            rows: vec![vec![String::new(); cols]; rows],
        }
    }

    fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// The whole document state, cloned into history snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
struct DocState {
    text: String,
    marks: BTreeSet<Mark>,
    block: BlockType,
    alignment: Alignment,
    list: Option<ListKind>,
    blockquote: bool,
    link: Option<SmolStr>,
    text_color: Option<Color>,
    highlight: Option<Color>,
    table: Option<TableState>,
    /// Horizontal rules appended after the text block.
    rules: usize,
    /// Raw pasted fragments, serialized verbatim. This is the untrusted
    /// path that the sanitize pipeline exists for.
    pasted: Vec<String>,
}

/// Reference engine with plain-field storage.
pub struct MemoryEngine {
    doc: DocState,
    history: History<DocState>,
    focused: bool,
    focus_count: u64,
    revision: u64,
    hook: Option<ChangeHook>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::with_history(HistoryConfig::default())
    }

    pub fn with_history(config: HistoryConfig) -> Self {
        Self {
            doc: DocState::default(),
            history: History::new(config),
            focused: false,
            focus_count: 0,
            revision: 0,
            hook: None,
        }
    }

    /// Whether the document currently holds focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// How many times focus was re-acquired. Lets tests assert the
    /// dispatcher's refocus-before-apply contract.
    pub fn focus_count(&self) -> u64 {
        self.focus_count
    }

    /// Type text at the selection (the engine's own input path).
    pub fn insert_text(&mut self, text: &str) {
        self.insert_text_at(text, Instant::now());
    }

    /// Type text with an explicit timestamp, for history-grouping tests.
    pub fn insert_text_at(&mut self, text: &str, now: Instant) {
        if text.is_empty() {
            return;
        }
        self.edit_at(now, |doc| doc.text.push_str(text));
    }

    /// Paste a raw markup fragment from an untrusted source. The fragment
    /// is stored and serialized verbatim; cleaning it is the sanitize
    /// pipeline's job, not the engine's.
    pub fn paste_html(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.edit_at(Instant::now(), |doc| doc.pasted.push(fragment.to_string()));
    }

    /// Apply a chain with an explicit timestamp, for grouping tests.
    pub fn apply_chain_at(&mut self, commands: &[Command], now: Instant) -> bool {
        if commands.is_empty() {
            return false;
        }
        let mut changed = false;
        // Mutating commands in one chain share a single history entry;
        // undo/redo execute in order between them.
        let mut batch_before: Option<DocState> = None;
        for command in commands {
            match command {
                Command::Undo => {
                    if let Some(before) = batch_before.take() {
                        self.history.record_at(before, now);
                    }
                    if let Some(state) = self.history.undo(self.doc.clone()) {
                        self.doc = state;
                        changed = true;
                    } else {
                        tracing::debug!("undo at history boundary, ignoring");
                    }
                }
                Command::Redo => {
                    if let Some(before) = batch_before.take() {
                        self.history.record_at(before, now);
                    }
                    if let Some(state) = self.history.redo(self.doc.clone()) {
                        self.doc = state;
                        changed = true;
                    } else {
                        tracing::debug!("redo at history boundary, ignoring");
                    }
                }
                other => {
                    let before = self.doc.clone();
                    if apply_command(&mut self.doc, other) && self.doc != before {
                        if batch_before.is_none() {
                            batch_before = Some(before);
                        }
                        changed = true;
                    } else {
                        self.doc = before;
                    }
                }
            }
        }
        if let Some(before) = batch_before.take() {
            self.history.record_at(before, now);
        }
        if changed {
            self.notify();
        }
        changed
    }

    fn edit_at(&mut self, now: Instant, f: impl FnOnce(&mut DocState)) {
        let before = self.doc.clone();
        f(&mut self.doc);
        if self.doc == before {
            return;
        }
        self.history.record_at(before, now);
        self.notify();
    }

    fn notify(&mut self) {
        self.revision += 1;
        if let Some(hook) = self.hook.as_mut() {
            hook(ChangeEvent {
                revision: self.revision,
            });
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one non-history command. Returns false when the command cannot
/// run at all (e.g. a table op without a table); redundant state changes
/// are caught by the caller's equality check.
fn apply_command(doc: &mut DocState, command: &Command) -> bool {
    match command {
        Command::ToggleMark(mark) => {
            if !doc.marks.remove(mark) {
                doc.marks.insert(*mark);
            }
            true
        }
        Command::SetBlock(block) => {
            doc.block = *block;
            true
        }
        Command::ToggleHeading(level) => {
            doc.block = if doc.block == BlockType::Heading(*level) {
                BlockType::Paragraph
            } else {
                BlockType::Heading(*level)
            };
            true
        }
        Command::SetAlignment(alignment) => {
            doc.alignment = *alignment;
            true
        }
        Command::ToggleList(kind) => {
            doc.list = if doc.list == Some(*kind) {
                None
            } else {
                Some(*kind)
            };
            true
        }
        Command::SetLink(url) => {
            if url.is_empty() {
                return false;
            }
            doc.link = Some(url.clone());
            true
        }
        Command::UnsetLink => {
            doc.link = None;
            true
        }
        Command::ToggleBlockquote => {
            doc.blockquote = !doc.blockquote;
            true
        }
        Command::UnsetBlockquote => {
            doc.blockquote = false;
            true
        }
        Command::SetHorizontalRule => {
            doc.rules += 1;
            true
        }
        Command::SetColor(color) => {
            doc.text_color = Some(color.clone());
            true
        }
        Command::SetHighlight(color) => {
            doc.highlight = Some(color.clone());
            true
        }
        Command::InsertTable {
            rows,
            cols,
            with_header_row,
        } => {
            if *rows == 0 || *cols == 0 {
                return false;
            }
            doc.table = Some(TableState::new(*rows, *cols, *with_header_row));
            true
        }
        Command::AddRowAfter => {
            let Some(table) = doc.table.as_mut() else {
                return false;
            };
            let cols = table.cols();
            table.rows.push(vec![String::new(); cols]);
            true
        }
        Command::DeleteRow => {
            let Some(table) = doc.table.as_mut() else {
                return false;
            };
            table.rows.pop();
            if table.rows.is_empty() {
                doc.table = None;
            }
            true
        }
        Command::AddColumnAfter => {
            let Some(table) = doc.table.as_mut() else {
                return false;
            };
            for row in &mut table.rows {
                row.push(String::new());
            }
            true
        }
        Command::DeleteColumn => {
            let Some(table) = doc.table.as_mut() else {
                return false;
            };
            for row in &mut table.rows {
                row.pop();
            }
            if table.cols() == 0 {
                doc.table = None;
            }
            true
        }
        Command::DeleteTable => doc.table.take().is_some(),
        Command::Undo | Command::Redo => false,
    }
}

impl Engine for MemoryEngine {
    fn focus(&mut self) {
        self.focused = true;
        self.focus_count += 1;
    }

    fn apply_chain(&mut self, commands: &[Command]) -> bool {
        self.apply_chain_at(commands, Instant::now())
    }

    fn is_active(&self, query: &StateQuery) -> bool {
        let doc = &self.doc;
        match query {
            StateQuery::Mark(mark) => doc.marks.contains(mark),
            StateQuery::Block(block) => doc.block == *block,
            StateQuery::List(kind) => doc.list == Some(*kind),
            StateQuery::Blockquote => doc.blockquote,
            StateQuery::Link => doc.link.is_some(),
            StateQuery::Align(alignment) => doc.alignment == *alignment,
        }
    }

    fn active_heading(&self) -> Option<HeadingLevel> {
        match self.doc.block {
            BlockType::Heading(level) => Some(level),
            BlockType::Paragraph => None,
        }
    }

    fn text_color(&self) -> Option<Color> {
        self.doc.text_color.clone()
    }

    fn highlight_color(&self) -> Option<Color> {
        self.doc.highlight.clone()
    }

    fn serialize_html(&self) -> String {
        serialize(&self.doc)
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_change_hook(&mut self, hook: Option<ChangeHook>) {
        self.hook = hook;
    }

    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

fn serialize(doc: &DocState) -> String {
    let mut html = String::new();

    if doc.blockquote {
        html.push_str("<blockquote>");
    }
    if let Some(kind) = doc.list {
        html.push('<');
        html.push_str(kind.tag());
        html.push_str("><li>");
    }

    // Block tag with optional alignment style.
    html.push('<');
    html.push_str(doc.block.tag());
    if doc.alignment != Alignment::Left {
        html.push_str(" style=\"text-align: ");
        html.push_str(doc.alignment.css_value());
        html.push('"');
    }
    html.push('>');

    let mut inline_close: Vec<&str> = Vec::new();
    if let Some(url) = &doc.link {
        html.push_str("<a href=\"");
        push_escaped_attr(&mut html, url);
        html.push_str("\">");
        inline_close.push("</a>");
    }
    for mark in &doc.marks {
        let (open, close) = match mark {
            Mark::Bold => ("<strong>", "</strong>"),
            Mark::Italic => ("<em>", "</em>"),
            Mark::Underline => ("<u>", "</u>"),
            Mark::Strike => ("<s>", "</s>"),
        };
        html.push_str(open);
        inline_close.push(close);
    }
    if doc.text_color.is_some() || doc.highlight.is_some() {
        html.push_str("<span style=\"");
        if let Some(color) = &doc.text_color {
            html.push_str("color: ");
            html.push_str(color.as_str());
            html.push(';');
        }
        if let Some(color) = &doc.highlight {
            if doc.text_color.is_some() {
                html.push(' ');
            }
            html.push_str("background-color: ");
            html.push_str(color.as_str());
            html.push(';');
        }
        html.push_str("\">");
        inline_close.push("</span>");
    }

    push_escaped_text(&mut html, &doc.text);

    for close in inline_close.into_iter().rev() {
        html.push_str(close);
    }

    html.push_str("</");
    html.push_str(doc.block.tag());
    html.push('>');

    if let Some(kind) = doc.list {
        html.push_str("</li></");
        html.push_str(kind.tag());
        html.push('>');
    }
    if doc.blockquote {
        html.push_str("</blockquote>");
    }

    for _ in 0..doc.rules {
        html.push_str("<hr>");
    }

    if let Some(table) = &doc.table {
        html.push_str("<table>");
        let mut rows = table.rows.iter();
        if table.header_row {
            if let Some(head) = rows.next() {
                html.push_str("<thead><tr>");
                for cell in head {
                    html.push_str("<th>");
                    push_escaped_text(&mut html, cell);
                    html.push_str("</th>");
                }
                html.push_str("</tr></thead>");
            }
        }
        html.push_str("<tbody>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                push_escaped_text(&mut html, cell);
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }

    for fragment in &doc.pasted {
        html.push_str(fragment);
    }

    html
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn ungrouped() -> MemoryEngine {
        // Zero window plus explicit timestamps: every edit is its own step.
        MemoryEngine::with_history(HistoryConfig {
            depth: 100,
            group_within: Duration::ZERO,
        })
    }

    fn apply_at(engine: &mut MemoryEngine, command: Command, now: Instant) -> bool {
        engine.apply_chain_at(std::slice::from_ref(&command), now)
    }

    #[test]
    fn test_toggle_mark_twice_restores_state() {
        let mut engine = MemoryEngine::new();
        let query = StateQuery::Mark(Mark::Bold);

        assert!(!engine.is_active(&query));
        assert!(engine.apply(Command::ToggleMark(Mark::Bold)));
        assert!(engine.is_active(&query));
        assert!(engine.apply(Command::ToggleMark(Mark::Bold)));
        assert!(!engine.is_active(&query));
    }

    #[test]
    fn test_toggle_heading_reverts_to_paragraph() {
        let mut engine = MemoryEngine::new();

        assert!(engine.apply(Command::ToggleHeading(HeadingLevel::H2)));
        assert_eq!(engine.active_heading(), Some(HeadingLevel::H2));

        // Same level toggles back to paragraph.
        assert!(engine.apply(Command::ToggleHeading(HeadingLevel::H2)));
        assert_eq!(engine.active_heading(), None);
        assert!(engine.is_active(&StateQuery::Block(BlockType::Paragraph)));

        // A different level replaces instead of toggling off.
        assert!(engine.apply(Command::ToggleHeading(HeadingLevel::H1)));
        assert!(engine.apply(Command::ToggleHeading(HeadingLevel::H3)));
        assert_eq!(engine.active_heading(), Some(HeadingLevel::H3));
    }

    #[test]
    fn test_redundant_command_is_noop() {
        let mut engine = MemoryEngine::new();
        assert!(engine.apply(Command::SetAlignment(Alignment::Center)));
        let revision = engine.revision();

        assert!(!engine.apply(Command::SetAlignment(Alignment::Center)));
        assert_eq!(engine.revision(), revision);
        assert!(!engine.apply(Command::UnsetLink));
        assert!(!engine.apply(Command::DeleteTable));
    }

    #[test]
    fn test_empty_link_rejected() {
        let mut engine = MemoryEngine::new();
        assert!(!engine.apply(Command::SetLink(SmolStr::default())));
        assert!(!engine.is_active(&StateQuery::Link));
    }

    #[test]
    fn test_undo_redo_roundtrip_over_commands() {
        let mut engine = ungrouped();
        let t = Instant::now();

        let commands = [
            Command::ToggleMark(Mark::Bold),
            Command::SetAlignment(Alignment::Right),
            Command::ToggleList(ListKind::Ordered),
        ];
        for (i, command) in commands.iter().enumerate() {
            assert!(apply_at(
                &mut engine,
                command.clone(),
                t + Duration::from_secs(i as u64 + 1),
            ));
        }
        let formatted = engine.serialize_html();

        for _ in 0..commands.len() {
            assert!(engine.apply(Command::Undo));
        }
        assert_eq!(engine.serialize_html(), serialize(&DocState::default()));
        assert!(!engine.apply(Command::Undo));

        for _ in 0..commands.len() {
            assert!(engine.apply(Command::Redo));
        }
        assert_eq!(engine.serialize_html(), formatted);
        assert!(!engine.apply(Command::Redo));
    }

    #[test]
    fn test_keystrokes_group_into_single_undo() {
        let mut engine = MemoryEngine::new();
        let t = Instant::now();

        engine.insert_text_at("h", t);
        engine.insert_text_at("e", t + Duration::from_millis(80));
        engine.insert_text_at("y", t + Duration::from_millis(160));

        assert!(engine.apply(Command::Undo));
        assert!(engine.serialize_html().contains("<p></p>"));
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_table_insert_and_delete_column() {
        let mut engine = MemoryEngine::new();
        assert!(engine.apply(Command::InsertTable {
            rows: 3,
            cols: 3,
            with_header_row: true,
        }));
        assert!(engine.apply(Command::DeleteColumn));

        let html = engine.serialize_html();
        // Header row intact with 2 columns, 2 data rows of 2 cells.
        assert_eq!(html.matches("<th>").count(), 2);
        assert_eq!(html.matches("<td>").count(), 4);
        assert!(html.contains("<thead>"));
    }

    #[test]
    fn test_deleting_last_column_removes_table() {
        let mut engine = MemoryEngine::new();
        assert!(engine.apply(Command::InsertTable {
            rows: 2,
            cols: 1,
            with_header_row: false,
        }));
        assert!(engine.apply(Command::DeleteColumn));
        assert!(!engine.serialize_html().contains("<table>"));

        // Further table ops are silent no-ops.
        assert!(!engine.apply(Command::DeleteRow));
        assert!(!engine.apply(Command::AddColumnAfter));
    }

    #[test]
    fn test_serialize_formatting() {
        let mut engine = MemoryEngine::new();
        engine.insert_text("bonjour");
        engine.apply(Command::ToggleMark(Mark::Bold));
        engine.apply(Command::ToggleMark(Mark::Italic));
        engine.apply(Command::SetAlignment(Alignment::Center));
        engine.apply(Command::SetColor(Color::parse("#FF0000").unwrap()));

        let html = engine.serialize_html();
        assert_eq!(
            html,
            "<p style=\"text-align: center\"><strong><em>\
             <span style=\"color: #FF0000;\">bonjour</span></em></strong></p>"
        );
    }

    #[test]
    fn test_serialize_escapes_typed_text() {
        let mut engine = MemoryEngine::new();
        engine.insert_text("<script>alert(1)</script>");
        let html = engine.serialize_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_pasted_fragment_survives_verbatim() {
        let mut engine = MemoryEngine::new();
        engine.paste_html("<img src=x onerror=alert(1)>");
        assert!(engine.serialize_html().contains("onerror"));
    }

    #[test]
    fn test_change_hook_fires_per_mutation() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut engine = MemoryEngine::new();
        let seen = Rc::new(Cell::new(0u64));
        let hook_seen = Rc::clone(&seen);
        engine.set_change_hook(Some(Box::new(move |event| {
            hook_seen.set(event.revision);
        })));

        engine.apply(Command::ToggleMark(Mark::Bold));
        assert_eq!(seen.get(), 1);
        engine.insert_text("a");
        assert_eq!(seen.get(), 2);

        // No-ops do not notify.
        engine.apply(Command::UnsetLink);
        assert_eq!(seen.get(), 2);
    }
}
