//! The editing surface: command dispatch and wiring.
//!
//! `EditorSurface` exclusively owns the document engine for its mounted
//! lifetime. Every user action funnels through [`EditorSurface::dispatch`]
//! as one focused, atomic command chain; the engine's change notification
//! marks the surface dirty and the same turn re-derives the toolbar
//! state, reconciles the heading selector, and re-runs the sanitize
//! pipeline into the preview string.
//!
//! Actions against an unmounted surface are silent debug-logged no-ops.
//! The engine can be absent (not yet initialized, or already released);
//! that is a normal state, never an error.

use std::cell::Cell;
use std::rc::Rc;

use plume_engine::types::Color;
use plume_engine::{Command, Engine};
use plume_sanitize::Sanitizer;

use crate::heading::{HeadingChoice, HeadingSelector};
use crate::picker::{ColorPicker, ColorTarget};
use crate::pointer::{Bounds, PointerEvents, PointerSubscription};
use crate::prompt::LinkPrompt;
use crate::state::ToolbarState;

struct Mounted<E> {
    engine: E,
    subscription: PointerSubscription,
}

/// Toolbar orchestration over a mounted engine.
pub struct EditorSurface<E: Engine, P: LinkPrompt> {
    mounted: Option<Mounted<E>>,
    prompt: P,
    toolbar: ToolbarState,
    heading: HeadingSelector,
    text_picker: ColorPicker,
    highlight_picker: ColorPicker,
    sanitizer: Sanitizer,
    preview: String,
    /// Set by the engine's change hook, drained by the dispatching turn.
    dirty: Rc<Cell<bool>>,
}

impl<E: Engine, P: LinkPrompt> EditorSurface<E, P> {
    pub fn new(prompt: P) -> Self {
        Self {
            mounted: None,
            prompt,
            toolbar: ToolbarState::default(),
            heading: HeadingSelector::new(),
            text_picker: ColorPicker::new(ColorTarget::Text),
            highlight_picker: ColorPicker::new(ColorTarget::Highlight),
            sanitizer: Sanitizer::default(),
            preview: String::new(),
            dirty: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Take ownership of the engine: install the change hook, acquire the
    /// pointer subscription, and derive the initial state.
    pub fn mount(&mut self, mut engine: E, events: &PointerEvents) {
        if self.mounted.is_some() {
            tracing::debug!("mount over a mounted surface, releasing the previous engine");
            self.unmount();
        }
        let dirty = Rc::clone(&self.dirty);
        engine.set_change_hook(Some(Box::new(move |_event| dirty.set(true))));
        self.mounted = Some(Mounted {
            engine,
            subscription: events.subscribe(),
        });
        self.refresh();
    }

    /// Release the engine: clear the hook, drop the subscription.
    pub fn unmount(&mut self) -> Option<E> {
        let mut mounted = self.mounted.take()?;
        mounted.engine.set_change_hook(None);
        Some(mounted.engine)
    }

    /// Apply one command as a focused atomic chain, then react to the
    /// change notification in the same turn.
    ///
    /// Returns whether the document changed. An unmounted surface, a
    /// redundant command, or undo/redo at the history boundary all report
    /// false and are not errors.
    pub fn dispatch(&mut self, command: Command) -> bool {
        let Some(mounted) = self.mounted.as_mut() else {
            tracing::debug!(command = command.name(), "dispatch with no engine, ignoring");
            return false;
        };
        self.dirty.set(false);
        let changed = mounted.engine.chain().focus().command(command).run();
        if self.dirty.replace(false) {
            self.refresh();
        }
        changed
    }

    /// Run a closure against the mounted engine (content entry paths like
    /// typing or pasting), reacting to any change it causes.
    pub fn with_engine<R>(&mut self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let mounted = self.mounted.as_mut()?;
        self.dirty.set(false);
        let result = f(&mut mounted.engine);
        if self.dirty.replace(false) {
            self.refresh();
        }
        Some(result)
    }

    /// Prompt for a URL and wrap the selection in a link. A dismissed or
    /// empty prompt is a silent no-op.
    pub fn insert_link(&mut self) -> bool {
        if self.mounted.is_none() {
            tracing::debug!("insert-link with no engine, ignoring");
            return false;
        }
        match self.prompt.prompt_url() {
            Some(url) if !url.is_empty() => self.dispatch(Command::SetLink(url)),
            _ => {
                tracing::debug!("link prompt dismissed or empty, ignoring");
                false
            }
        }
    }

    /// Pick a heading option from the dropdown.
    pub fn select_heading(&mut self, choice: HeadingChoice) -> bool {
        if self.mounted.is_none() {
            tracing::debug!("heading selection with no engine, ignoring");
            return false;
        }
        let command = self.heading.choose(choice);
        self.dispatch(command)
    }

    pub fn open_picker(&mut self, target: ColorTarget) {
        self.picker_mut(target).open();
    }

    /// Report a picker panel's layout rectangle for outside-press checks.
    pub fn set_picker_bounds(&mut self, target: ColorTarget, bounds: Bounds) {
        self.picker_mut(target).set_bounds(bounds);
    }

    /// Preview a swatch in the document. No-op while the panel is closed.
    pub fn pick_color(&mut self, target: ColorTarget, color: Color) -> bool {
        match self.picker_mut(target).choose(color) {
            Some(command) => self.dispatch(command),
            None => false,
        }
    }

    /// Commit the current preview and close the panel. The document
    /// already shows the preview, so nothing is dispatched.
    pub fn apply_color(&mut self, target: ColorTarget) {
        self.picker_mut(target).apply();
    }

    /// Close the panel and revert the document to the color captured when
    /// it opened.
    pub fn cancel_color(&mut self, target: ColorTarget) -> bool {
        match self.picker_mut(target).cancel() {
            Some(command) => self.dispatch(command),
            None => false,
        }
    }

    /// Drain pending pointer-downs; a press outside an open picker takes
    /// that picker's cancel path.
    pub fn pump_pointer(&mut self) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        let events = mounted.subscription.drain();
        for event in events {
            for target in [ColorTarget::Text, ColorTarget::Highlight] {
                let picker = self.picker_mut(target);
                if picker.is_open() && !picker.bounds().contains(event) {
                    tracing::debug!(
                        channel = target.name(),
                        "press outside open picker, cancelling"
                    );
                    if let Some(command) = picker.cancel() {
                        self.dispatch(command);
                    }
                }
            }
        }
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    /// The sanitized document markup, refreshed on every change.
    pub fn preview_html(&self) -> &str {
        &self.preview
    }

    pub fn heading(&self) -> &HeadingSelector {
        &self.heading
    }

    pub fn picker(&self, target: ColorTarget) -> &ColorPicker {
        match target {
            ColorTarget::Text => &self.text_picker,
            ColorTarget::Highlight => &self.highlight_picker,
        }
    }

    fn picker_mut(&mut self, target: ColorTarget) -> &mut ColorPicker {
        match target {
            ColorTarget::Text => &mut self.text_picker,
            ColorTarget::Highlight => &mut self.highlight_picker,
        }
    }

    fn refresh(&mut self) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        self.toolbar = ToolbarState::derive(&mounted.engine);
        self.heading.sync(&self.toolbar);
        self.preview = self.sanitizer.clean(&mounted.engine.serialize_html());
        tracing::trace!(revision = mounted.engine.revision(), "surface state refreshed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_engine::types::Mark;
    use plume_engine::MemoryEngine;

    use crate::prompt::StaticPrompt;

    fn surface() -> EditorSurface<MemoryEngine, StaticPrompt> {
        EditorSurface::new(StaticPrompt::new())
    }

    #[test]
    fn test_dispatch_before_mount_is_silent_noop() {
        let mut surface = surface();
        assert!(!surface.dispatch(Command::ToggleMark(Mark::Bold)));
        assert_eq!(surface.toolbar(), &ToolbarState::default());
        assert_eq!(surface.preview_html(), "");
    }

    #[test]
    fn test_mount_derives_initial_state() {
        let events = PointerEvents::new();
        let mut surface = surface();
        let mut engine = MemoryEngine::new();
        engine.apply(Command::ToggleMark(Mark::Bold));
        engine.insert_text("salut");

        surface.mount(engine, &events);
        assert!(surface.toolbar().bold);
        assert_eq!(surface.preview_html(), "<p><strong>salut</strong></p>");
    }

    #[test]
    fn test_dispatch_focuses_and_refreshes() {
        let events = PointerEvents::new();
        let mut surface = surface();
        surface.mount(MemoryEngine::new(), &events);

        assert!(surface.dispatch(Command::ToggleMark(Mark::Bold)));
        assert!(surface.toolbar().bold);

        let engine = surface.unmount().unwrap();
        assert_eq!(engine.focus_count(), 1);
        assert!(engine.is_focused());
    }

    #[test]
    fn test_unmount_releases_engine_and_hook() {
        let events = PointerEvents::new();
        let mut surface = surface();
        surface.mount(MemoryEngine::new(), &events);
        assert_eq!(events.subscriber_count(), 1);

        let mut engine = surface.unmount().unwrap();
        assert_eq!(events.subscriber_count(), 0);
        assert!(!surface.is_mounted());
        assert!(surface.unmount().is_none());

        // The released engine mutates without touching the surface.
        engine.apply(Command::ToggleMark(Mark::Italic));
        assert!(!surface.toolbar().italic);
    }
}
