//! Color-picker state machines.
//!
//! Two independent pickers, one for text color and one for highlight,
//! share the same machine parameterized by [`ColorTarget`]. The contract
//! is the preview-then-commit cycle: opening captures the color to fall
//! back to, every palette choice is previewed live in the document, and
//! Cancel (explicit or a press outside the panel) reverts to the color at
//! open time no matter how many previews happened in between. Apply
//! promotes the last preview to the committed color.
//!
//! The machine only decides; the surface dispatches the commands it
//! returns. Transitions invoked while the picker is closed are no-ops.

use plume_engine::types::Color;
use plume_engine::Command;
use smol_str::SmolStr;

use crate::pointer::Bounds;

/// Which color channel a picker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Text,
    Highlight,
}

impl ColorTarget {
    /// The channel's engine default, shown before any commit.
    pub fn default_color(&self) -> Color {
        match self {
            ColorTarget::Text => Color::black(),
            ColorTarget::Highlight => Color::white(),
        }
    }

    /// The command that sets this channel to `color`.
    pub fn command(&self, color: Color) -> Command {
        match self {
            ColorTarget::Text => Command::SetColor(color),
            ColorTarget::Highlight => Command::SetHighlight(color),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorTarget::Text => "text",
            ColorTarget::Highlight => "highlight",
        }
    }
}

/// A named swatch in the picker palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: SmolStr,
    pub color: Color,
}

/// The fixed eight-swatch palette.
pub fn default_palette() -> Vec<PaletteEntry> {
    [
        ("Rouge", "#FF0000"),
        ("Vert", "#00FF00"),
        ("Bleu", "#0000FF"),
        ("Jaune", "#FFFF00"),
        ("Orange", "#FFA500"),
        ("Violet", "#800080"),
        ("Noir", "#000000"),
        ("Blanc", "#FFFFFF"),
    ]
    .into_iter()
    .map(|(name, hex)| PaletteEntry {
        name: SmolStr::new_static(name),
        // Palette constants are known-valid hex.
        color: Color::parse(hex).unwrap(),
    })
    .collect()
}

/// One picker's state machine.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    target: ColorTarget,
    open: bool,
    committed: Color,
    preview: Color,
    color_at_open: Color,
    bounds: Bounds,
}

impl ColorPicker {
    pub fn new(target: ColorTarget) -> Self {
        let committed = target.default_color();
        Self {
            target,
            open: false,
            preview: committed.clone(),
            color_at_open: committed.clone(),
            committed,
            bounds: Bounds::default(),
        }
    }

    pub fn target(&self) -> ColorTarget {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The last applied color; what the toolbar swatch shows when closed.
    pub fn committed(&self) -> &Color {
        &self.committed
    }

    /// The color currently previewed in the document.
    pub fn preview(&self) -> &Color {
        &self.preview
    }

    /// The panel's screen rectangle, reported by the frontend after layout.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Open the panel, capturing the fallback for a later cancel.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.color_at_open = self.committed.clone();
        self.preview = self.committed.clone();
        tracing::trace!(
            channel = self.target.name(),
            at_open = %self.color_at_open,
            "picker opened"
        );
    }

    /// Preview a swatch. Returns the command to dispatch, or None when the
    /// panel is closed.
    pub fn choose(&mut self, color: Color) -> Option<Command> {
        if !self.open {
            return None;
        }
        self.preview = color.clone();
        Some(self.target.command(color))
    }

    /// Commit the current preview and close.
    pub fn apply(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.committed = self.preview.clone();
        tracing::trace!(
            channel = self.target.name(),
            committed = %self.committed,
            "picker applied"
        );
    }

    /// Close and return the command reverting the document to the color
    /// captured at open time, or None when the panel is closed.
    ///
    /// The revert target is `color_at_open`, never the latest preview.
    pub fn cancel(&mut self) -> Option<Command> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.preview = self.committed.clone();
        tracing::trace!(
            channel = self.target.name(),
            revert_to = %self.color_at_open,
            "picker cancelled"
        );
        Some(self.target.command(self.color_at_open.clone()))
    }
}
