use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use plume_engine::types::{Alignment, HeadingLevel, Mark};
use plume_engine::{Command, MemoryEngine, SmolStr};
use plume_sanitize::Sanitizer;
use plume_toolbar::{
    default_palette, ColorTarget, EditorSurface, HeadingChoice, PointerEvents, StaticPrompt,
    ToolbarState,
};

#[derive(Parser)]
#[command(version, about = "Plume - rich-text toolbar orchestration demo", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Text file used to seed the demo document
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize HTML from stdin (or a file) and print the result
    Html {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Print the picker palette
    Palette,
}

fn main() -> Result<()> {
    init_miette();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Html { input }) => sanitize_input(input),
        Some(Commands::Palette) => {
            for entry in default_palette() {
                println!("{:8} {}", entry.name, entry.color);
            }
            Ok(())
        }
        None => run_demo(cli.source),
    }
}

fn sanitize_input(input: Option<PathBuf>) -> Result<()> {
    let html = match input {
        Some(path) => std::fs::read_to_string(&path).into_diagnostic()?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .into_diagnostic()?;
            buffer
        }
    };
    println!("{}", Sanitizer::default().clean(&html));
    Ok(())
}

/// Drive a mounted surface through the toolbar's whole repertoire and
/// show the derived state plus the sanitized preview after each stage.
fn run_demo(source: Option<PathBuf>) -> Result<()> {
    let text = match source {
        Some(path) => std::fs::read_to_string(&path).into_diagnostic()?,
        None => "Bonjour tout le monde".to_string(),
    };

    let events = PointerEvents::new();
    let prompt = StaticPrompt::with_answers([Some(SmolStr::new_static("https://example.org"))]);
    let mut surface = EditorSurface::new(prompt);

    let mut engine = MemoryEngine::new();
    engine.insert_text(text.trim_end());
    surface.mount(engine, &events);

    println!("→ Formatting");
    surface.dispatch(Command::ToggleMark(Mark::Bold));
    surface.dispatch(Command::ToggleMark(Mark::Italic));
    surface.dispatch(Command::SetAlignment(Alignment::Center));
    surface.select_heading(HeadingChoice::Heading(HeadingLevel::H2));
    surface.insert_link();
    report(&surface);

    println!("→ Color picker: preview twice, cancel, then commit");
    let palette = default_palette();
    surface.open_picker(ColorTarget::Text);
    surface.pick_color(ColorTarget::Text, palette[0].color.clone());
    surface.pick_color(ColorTarget::Text, palette[2].color.clone());
    surface.cancel_color(ColorTarget::Text);
    println!(
        "  after cancel: {}",
        surface
            .toolbar()
            .text_color
            .as_ref()
            .map_or("engine default", |c| c.as_str())
    );
    surface.open_picker(ColorTarget::Text);
    surface.pick_color(ColorTarget::Text, palette[1].color.clone());
    surface.apply_color(ColorTarget::Text);
    report(&surface);

    println!("→ Table: 3x3 with header, then delete a column");
    surface.dispatch(Command::InsertTable {
        rows: 3,
        cols: 3,
        with_header_row: true,
    });
    surface.dispatch(Command::DeleteColumn);
    report(&surface);

    println!("→ Undo everything, then redo once");
    while surface.dispatch(Command::Undo) {}
    surface.dispatch(Command::Redo);
    report(&surface);

    println!("✓ Done");
    Ok(())
}

fn report(surface: &EditorSurface<MemoryEngine, StaticPrompt>) {
    let state = surface.toolbar();
    println!("  active: {}", describe(state));
    println!("  preview: {}", surface.preview_html());
}

fn describe(state: &ToolbarState) -> String {
    let mut active = Vec::new();
    for mark in Mark::ALL {
        if state.mark_active(mark) {
            active.push(mark.name().to_string());
        }
    }
    if let Some(level) = state.heading {
        active.push(format!("titre {}", level.level()));
    }
    if state.alignment != Alignment::Left {
        active.push(format!("align {}", state.alignment.css_value()));
    }
    if state.bullet_list {
        active.push("bullet-list".into());
    }
    if state.ordered_list {
        active.push("ordered-list".into());
    }
    if state.blockquote {
        active.push("blockquote".into());
    }
    if state.link {
        active.push("link".into());
    }
    if let Some(color) = &state.text_color {
        active.push(format!("color {color}"));
    }
    if let Some(color) = &state.highlight_color {
        active.push(format!("highlight {color}"));
    }
    if active.is_empty() {
        "(none)".to_string()
    } else {
        active.join(", ")
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
