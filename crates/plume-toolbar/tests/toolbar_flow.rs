//! End-to-end flows over a mounted surface: dispatch, state reflection,
//! picker cycles, outside-press handling, undo/redo, and the sanitize
//! pipeline.

use plume_engine::types::{Alignment, Color, HeadingLevel, Mark};
use plume_engine::{Command, Engine, MemoryEngine, SmolStr};
use plume_toolbar::{
    Bounds, ColorTarget, EditorSurface, HeadingChoice, PointerDown, PointerEvents, StaticPrompt,
    ToolbarState,
};

fn mounted(events: &PointerEvents) -> EditorSurface<MemoryEngine, StaticPrompt> {
    let mut surface = EditorSurface::new(StaticPrompt::new());
    surface.mount(MemoryEngine::new(), events);
    surface
}

fn red() -> Color {
    Color::parse("#FF0000").unwrap()
}

fn blue() -> Color {
    Color::parse("#0000FF").unwrap()
}

#[test]
fn test_toggle_bold_twice_restores_state() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    assert!(surface.dispatch(Command::ToggleMark(Mark::Bold)));
    assert!(surface.toolbar().bold);

    assert!(surface.dispatch(Command::ToggleMark(Mark::Bold)));
    assert!(!surface.toolbar().bold);
    assert_eq!(surface.toolbar(), &ToolbarState::default());
}

#[test]
fn test_formatting_flows_into_preview() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.with_engine(|engine| engine.insert_text("bonjour"));
    surface.dispatch(Command::ToggleMark(Mark::Bold));
    surface.dispatch(Command::SetAlignment(Alignment::Center));

    let preview = surface.preview_html();
    assert!(preview.contains("<strong>bonjour</strong>"), "{preview}");
    assert!(preview.contains("text-align: center"), "{preview}");
}

#[test]
fn test_picker_cancel_reverts_past_every_preview() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    // Commit red so the fallback differs from the channel default.
    surface.open_picker(ColorTarget::Text);
    assert!(surface.pick_color(ColorTarget::Text, red()));
    surface.apply_color(ColorTarget::Text);
    assert_eq!(surface.toolbar().text_color, Some(red()));

    // Preview twice, cancel: the document must return to red.
    surface.open_picker(ColorTarget::Text);
    surface.pick_color(ColorTarget::Text, blue());
    surface.pick_color(ColorTarget::Text, Color::parse("#123456").unwrap());
    assert_eq!(surface.toolbar().text_color, Some(Color::parse("#123456").unwrap()));

    surface.cancel_color(ColorTarget::Text);
    assert_eq!(surface.toolbar().text_color, Some(red()));
    assert!(!surface.picker(ColorTarget::Text).is_open());
    assert_eq!(surface.picker(ColorTarget::Text).committed(), &red());
}

#[test]
fn test_apply_commits_preview() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.open_picker(ColorTarget::Highlight);
    surface.pick_color(ColorTarget::Highlight, blue());
    surface.apply_color(ColorTarget::Highlight);

    assert_eq!(surface.toolbar().highlight_color, Some(blue()));
    assert_eq!(surface.picker(ColorTarget::Highlight).committed(), &blue());
    assert!(!surface.picker(ColorTarget::Highlight).is_open());
}

#[test]
fn test_pickers_are_independent() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.open_picker(ColorTarget::Text);
    surface.open_picker(ColorTarget::Highlight);
    surface.pick_color(ColorTarget::Text, red());
    surface.pick_color(ColorTarget::Highlight, blue());

    surface.apply_color(ColorTarget::Text);
    assert!(!surface.picker(ColorTarget::Text).is_open());
    assert!(surface.picker(ColorTarget::Highlight).is_open());

    surface.cancel_color(ColorTarget::Highlight);
    assert_eq!(surface.toolbar().text_color, Some(red()));
    assert_eq!(surface.toolbar().highlight_color, Some(Color::white()));
}

#[test]
fn test_outside_press_cancels_like_explicit_cancel() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.set_picker_bounds(ColorTarget::Text, Bounds::new(100.0, 100.0, 200.0, 150.0));
    surface.open_picker(ColorTarget::Text);
    surface.pick_color(ColorTarget::Text, blue());

    // A press inside the panel leaves it open and the preview intact.
    events.dispatch(PointerDown::new(150.0, 120.0));
    surface.pump_pointer();
    assert!(surface.picker(ColorTarget::Text).is_open());
    assert_eq!(surface.toolbar().text_color, Some(blue()));

    // A press outside takes the cancel path, reverting the document.
    events.dispatch(PointerDown::new(10.0, 10.0));
    surface.pump_pointer();
    assert!(!surface.picker(ColorTarget::Text).is_open());
    assert_eq!(surface.toolbar().text_color, Some(Color::black()));
}

#[test]
fn test_heading_selector_reconciles_with_engine() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.select_heading(HeadingChoice::Heading(HeadingLevel::H2));
    assert_eq!(surface.toolbar().heading, Some(HeadingLevel::H2));
    assert_eq!(
        surface.heading().selected(),
        HeadingChoice::Heading(HeadingLevel::H2)
    );
    assert!(surface.preview_html().starts_with("<h2>"));

    // Picking the active level toggles the block back to paragraph, and
    // the selector display follows the engine instead of sticking.
    surface.select_heading(HeadingChoice::Heading(HeadingLevel::H2));
    assert_eq!(surface.toolbar().heading, None);
    assert_eq!(surface.heading().selected(), HeadingChoice::Paragraph);
    assert!(surface.preview_html().starts_with("<p>"));
}

#[test]
fn test_undo_redo_roundtrip_through_surface() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.dispatch(Command::ToggleMark(Mark::Bold));
    surface.dispatch(Command::SetAlignment(Alignment::Right));
    surface.dispatch(Command::ToggleHeading(HeadingLevel::H3));
    let formatted = surface.toolbar().clone();
    assert_ne!(formatted, ToolbarState::default());

    while surface.dispatch(Command::Undo) {}
    assert_eq!(surface.toolbar(), &ToolbarState::default());
    // The boundary undo was a no-op, not an error.
    assert!(!surface.dispatch(Command::Undo));

    while surface.dispatch(Command::Redo) {}
    assert_eq!(surface.toolbar(), &formatted);
    assert!(!surface.dispatch(Command::Redo));
}

#[test]
fn test_table_column_deletion_keeps_header() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.dispatch(Command::InsertTable {
        rows: 3,
        cols: 3,
        with_header_row: true,
    });
    surface.dispatch(Command::DeleteColumn);

    let preview = surface.preview_html();
    assert_eq!(preview.matches("<th>").count(), 2, "{preview}");
    assert_eq!(preview.matches("<td>").count(), 4, "{preview}");
    assert!(preview.contains("<thead>"));
}

#[test]
fn test_pasted_markup_is_sanitized_in_preview() {
    let events = PointerEvents::new();
    let mut surface = mounted(&events);

    surface.with_engine(|engine| {
        engine.paste_html("<img src=x onerror=alert(1)><script>alert(2)</script><em>ok</em>");
    });

    // The engine serializes the fragment verbatim; the preview must not.
    let raw = surface.with_engine(|engine| engine.serialize_html()).unwrap();
    assert!(raw.contains("onerror"));

    let preview = surface.preview_html();
    assert!(!preview.contains("onerror"), "{preview}");
    assert!(!preview.to_ascii_lowercase().contains("<script"), "{preview}");
    assert!(preview.contains("<em>ok</em>"), "{preview}");
}

#[test]
fn test_link_prompt_flow() {
    let events = PointerEvents::new();
    let prompt = StaticPrompt::with_answers([
        None,
        Some(SmolStr::new_static("")),
        Some(SmolStr::new_static("https://example.org")),
    ]);
    let mut surface = EditorSurface::new(prompt);
    surface.mount(MemoryEngine::new(), &events);

    // Dismissed, then empty: silent no-ops.
    assert!(!surface.insert_link());
    assert!(!surface.insert_link());
    assert!(!surface.toolbar().link);

    assert!(surface.insert_link());
    assert!(surface.toolbar().link);
    assert!(surface.preview_html().contains("href=\"https://example.org\""));

    assert!(surface.dispatch(Command::UnsetLink));
    assert!(!surface.toolbar().link);
}

#[test]
fn test_unmounted_surface_ignores_everything() {
    let mut surface: EditorSurface<MemoryEngine, StaticPrompt> =
        EditorSurface::new(StaticPrompt::with_answers([Some(SmolStr::new_static(
            "https://example.org",
        ))]));

    assert!(!surface.dispatch(Command::ToggleMark(Mark::Bold)));
    assert!(!surface.insert_link());
    assert!(!surface.select_heading(HeadingChoice::Heading(HeadingLevel::H1)));
    surface.pump_pointer();
    assert_eq!(surface.toolbar(), &ToolbarState::default());
    assert_eq!(surface.preview_html(), "");
}

#[test]
fn test_subscription_lifecycle_across_remounts() {
    let events = PointerEvents::new();
    let mut surface = EditorSurface::new(StaticPrompt::new());
    assert_eq!(events.subscriber_count(), 0);

    surface.mount(MemoryEngine::new(), &events);
    assert_eq!(events.subscriber_count(), 1);

    // Remount replaces the subscription instead of stacking one.
    surface.mount(MemoryEngine::new(), &events);
    assert_eq!(events.subscriber_count(), 1);

    surface.unmount();
    assert_eq!(events.subscriber_count(), 0);
}
