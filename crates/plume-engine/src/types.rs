//! Core formatting types shared by the engine and the toolbar layer.
//!
//! These are framework-agnostic value types: inline marks, block types,
//! alignment, list kinds, and validated hex colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ColorError;

/// An inline formatting attribute applicable to a text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
}

impl Mark {
    /// All toggleable marks, in toolbar order.
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Underline, Mark::Strike];

    /// Stable name used for logging and command tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
        }
    }
}

/// Heading levels 1 through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// All levels, ascending.
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Numeric level (1..=6).
    pub fn level(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    /// Level from a number; None outside 1..=6.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            5 => Some(HeadingLevel::H5),
            6 => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    /// The HTML tag name for this level (`h1`..`h6`).
    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

/// The structural role of a paragraph-level node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading(HeadingLevel),
}

impl BlockType {
    /// The HTML tag name for this block.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "p",
            BlockType::Heading(level) => level.tag(),
        }
    }
}

/// Paragraph-level text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value.
    pub fn css_value(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// List container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    /// The HTML tag name for this list (`ul` or `ol`).
    pub fn tag(&self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// A validated `#RRGGBB` color, normalized to uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SmolStr", into = "SmolStr")]
pub struct Color(SmolStr);

impl Color {
    /// Parse and normalize a `#RRGGBB` string.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let Some(hex) = input.strip_prefix('#') else {
            return Err(ColorError::Format(input.to_string()));
        };
        if hex.len() != 6 {
            return Err(ColorError::Format(input.to_string()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::HexDigit(input.to_string()));
        }
        let mut normalized = String::with_capacity(7);
        normalized.push('#');
        normalized.extend(hex.chars().map(|c| c.to_ascii_uppercase()));
        Ok(Self(SmolStr::new(normalized)))
    }

    /// The normalized hex string, including the leading `#`.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Default text color.
    pub fn black() -> Self {
        Self(SmolStr::new_static("#000000"))
    }

    /// Default highlight color.
    pub fn white() -> Self {
        Self(SmolStr::new_static("#FFFFFF"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<SmolStr> for Color {
    type Error = ColorError;

    fn try_from(value: SmolStr) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for SmolStr {
    fn from(color: Color) -> SmolStr {
        color.0
    }
}

/// A question the toolbar asks the engine about the current selection.
///
/// "Active" means the mark or block applies uniformly across the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateQuery {
    Mark(Mark),
    Block(BlockType),
    List(ListKind),
    Blockquote,
    Link,
    Align(Alignment),
}
