//! plume-toolbar: orchestration between a toolbar frontend and a document
//! engine.
//!
//! The crate owns everything between "the user pressed a control" and "the
//! engine mutated the document":
//! - [`EditorSurface`]: the command dispatcher and the single owner of the
//!   mounted engine
//! - [`ToolbarState`]: the derived active-state snapshot the controls
//!   render from
//! - [`ColorPicker`]: the preview/apply/cancel color state machine, one
//!   instance per color channel
//! - [`HeadingSelector`]: the fixed-option block selector, reconciled
//!   against engine truth
//! - [`PointerEvents`]: document-level pointer dispatch for closing open
//!   pickers on outside presses
//! - [`LinkPrompt`]: the URL-entry seam

pub mod heading;
pub mod picker;
pub mod pointer;
pub mod prompt;
pub mod state;
pub mod surface;

pub use heading::{HeadingChoice, HeadingSelector};
pub use picker::{default_palette, ColorPicker, ColorTarget, PaletteEntry};
pub use pointer::{Bounds, PointerDown, PointerEvents, PointerSubscription};
pub use prompt::{LinkPrompt, StaticPrompt};
pub use state::ToolbarState;
pub use surface::EditorSurface;
