//! plume-engine: the document-engine seam for the Plume toolbar.
//!
//! This crate provides:
//! - The [`Engine`] trait: the narrow collaborator interface the toolbar
//!   drives (command chains, state queries, markup serialization, change
//!   notifications)
//! - [`Command`] and the [`Chain`] builder
//! - [`History`]: bounded, time-grouped undo stacks
//! - [`MemoryEngine`]: a plain-field reference implementation for tests
//!   and demos

pub mod command;
pub mod engine;
pub mod error;
pub mod history;
pub mod memory;
pub mod types;

pub use command::{Chain, Command};
pub use engine::{ChangeEvent, ChangeHook, Engine};
pub use error::ColorError;
pub use history::{History, HistoryConfig};
pub use memory::MemoryEngine;
pub use smol_str::SmolStr;
pub use types::{Alignment, BlockType, Color, HeadingLevel, ListKind, Mark, StateQuery};
