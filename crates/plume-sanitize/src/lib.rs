//! Allowlist HTML sanitizer.
//!
//! The preview pipeline runs every serialized document through
//! [`Sanitizer::clean`] before the result is rendered as markup. The
//! contract is the one real security property of the editor: the output
//! never contains a script-capable element or attribute, for any input,
//! including markup pasted from untrusted sources.
//!
//! The sanitizer is a pure, deterministic `markup -> markup` function:
//! - elements whose content is executable (`script`, `style`, `iframe`,
//!   and friends) are dropped together with their content
//! - other disallowed tags are stripped but their text is kept
//! - attributes are rebuilt from an allowlist: `style` limited to the
//!   formatting properties the editor emits, `href` limited to safe
//!   schemes (checked on the entity-decoded value, the way a browser
//!   reads it), `colspan`/`rowspan` on table cells; every `on*` handler
//!   falls out by construction
//! - comments and processing instructions are removed, text is
//!   re-escaped (existing entities are left alone)
//!
//! Disallowed content is silently stripped, never reported; the caller
//! sees a cleaned result, not an error.

use std::collections::BTreeSet;

use smol_str::SmolStr;

/// Structural and formatting tags the editor legitimately emits.
const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "b", "em", "i", "u", "s", "strike", "span",
    "mark", "a", "ul", "ol", "li", "blockquote", "hr", "br", "table", "thead", "tbody", "tr",
    "th", "td",
];

/// Elements dropped together with everything inside them.
const DROP_CONTENT_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "svg", "math", "template",
];

/// Tags emitted without a closing counterpart.
const VOID_TAGS: &[&str] = &["hr", "br"];

/// URL schemes permitted in `href`; scheme-less (relative) URLs pass.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// CSS properties permitted inside `style`.
const ALLOWED_STYLE_PROPS: &[&str] = &["color", "background-color", "text-align"];

/// What the sanitizer lets through.
#[derive(Debug, Clone)]
pub struct Policy {
    tags: BTreeSet<SmolStr>,
    drop_content: BTreeSet<SmolStr>,
    schemes: BTreeSet<SmolStr>,
    style_props: BTreeSet<SmolStr>,
}

impl Default for Policy {
    fn default() -> Self {
        fn set(items: &[&str]) -> BTreeSet<SmolStr> {
            items.iter().copied().map(SmolStr::new).collect()
        }
        Self {
            tags: set(ALLOWED_TAGS),
            drop_content: set(DROP_CONTENT_TAGS),
            schemes: set(ALLOWED_SCHEMES),
            style_props: set(ALLOWED_STYLE_PROPS),
        }
    }
}

impl Policy {
    fn is_allowed(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn drops_content(&self, tag: &str) -> bool {
        self.drop_content.contains(tag)
    }

    /// Rebuild one attribute, or None to drop it.
    fn clean_attr(&self, tag: &str, attr: &str, value: &str) -> Option<String> {
        match attr {
            "style" => {
                let filtered = self.filter_style(value);
                (!filtered.is_empty()).then_some(filtered)
            }
            "href" if tag == "a" => {
                // Browsers decode character references in attribute values
                // before URL parsing, so the scheme check must run on the
                // decoded text. An undecodable reference drops the
                // attribute outright.
                let decoded = decode_char_refs(value)?;
                self.safe_url(&decoded).then(|| decoded.trim().to_string())
            }
            "colspan" | "rowspan" if tag == "td" || tag == "th" => {
                let digits = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
                digits.then(|| value.to_string())
            }
            _ => None,
        }
    }

    /// Keep only allowlisted declarations with inert values.
    fn filter_style(&self, style: &str) -> String {
        let mut kept = Vec::new();
        for declaration in style.split(';') {
            let Some((prop, value)) = declaration.split_once(':') else {
                continue;
            };
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            if !self.style_props.contains(prop.as_str()) {
                continue;
            }
            let inert = !value.is_empty()
                && value.chars().all(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, '#' | ' ' | ',' | '.' | '%' | '-')
                });
            if inert {
                kept.push(format!("{prop}: {value}"));
            }
        }
        kept.join("; ")
    }

    /// Reject script-capable URL schemes, including obfuscated ones
    /// (`java\nscript:` collapses to `javascript:` in browsers).
    fn safe_url(&self, url: &str) -> bool {
        let cleaned: String = url
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_ascii_control())
            .collect();
        let lowered = cleaned.to_ascii_lowercase();
        for (i, ch) in lowered.char_indices() {
            match ch {
                ':' => return self.schemes.contains(&lowered[..i]),
                // A path/query/fragment delimiter before any ':' means
                // there is no scheme.
                '/' | '?' | '#' => return true,
                _ => {}
            }
        }
        true
    }
}

/// The sanitize-render pipeline's cleaning stage.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: Policy,
}

enum TagScan {
    /// Emit rebuilt markup and continue after the tag.
    Emit { markup: String, next: usize },
    /// Drop the tag (and possibly its content) and continue.
    Skip { next: usize },
    /// Not actually a tag; treat the `<` as text.
    NotATag,
}

impl Sanitizer {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Sanitize a markup string. Never panics, whatever the input shape.
    pub fn clean(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut pos = 0;
        while pos < html.len() {
            if html.as_bytes()[pos] == b'<' {
                match self.scan_tag(html, pos) {
                    TagScan::Emit { markup, next } => {
                        out.push_str(&markup);
                        pos = next;
                    }
                    TagScan::Skip { next } => pos = next,
                    TagScan::NotATag => {
                        out.push_str("&lt;");
                        pos += 1;
                    }
                }
            } else {
                let end = html[pos..]
                    .find('<')
                    .map_or(html.len(), |offset| pos + offset);
                push_text(&mut out, &html[pos..end]);
                pos = end;
            }
        }
        out
    }

    fn scan_tag(&self, html: &str, pos: usize) -> TagScan {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            let next = rest
                .find("-->")
                .map_or(html.len(), |offset| pos + offset + 3);
            return TagScan::Skip { next };
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let next = rest.find('>').map_or(html.len(), |offset| pos + offset + 1);
            return TagScan::Skip { next };
        }

        if let Some(body) = rest.strip_prefix("</") {
            let name = read_tag_name(body);
            if name.is_empty() {
                return TagScan::NotATag;
            }
            let next = rest.find('>').map_or(html.len(), |offset| pos + offset + 1);
            if self.policy.is_allowed(&name) && !VOID_TAGS.contains(&name.as_str()) {
                return TagScan::Emit {
                    markup: format!("</{name}>"),
                    next,
                };
            }
            return TagScan::Skip { next };
        }

        let name = read_tag_name(&rest[1..]);
        if name.is_empty() {
            return TagScan::NotATag;
        }
        let (attrs, next) = parse_attrs(html, pos + 1 + name.len());

        if self.policy.drops_content(&name) {
            tracing::debug!(tag = %name, "dropping script-capable element with content");
            return TagScan::Skip {
                next: skip_past_closing(html, next, &name),
            };
        }
        if !self.policy.is_allowed(&name) {
            tracing::debug!(tag = %name, "stripping disallowed tag, keeping content");
            return TagScan::Skip { next };
        }

        let mut markup = String::with_capacity(name.len() + 2);
        markup.push('<');
        markup.push_str(&name);
        for (attr, value) in &attrs {
            if let Some(clean) = self.policy.clean_attr(&name, attr, value) {
                markup.push(' ');
                markup.push_str(attr);
                markup.push_str("=\"");
                push_attr(&mut markup, &clean);
                markup.push('"');
            }
        }
        markup.push('>');
        TagScan::Emit { markup, next }
    }
}

/// Convenience: sanitize with the default policy.
pub fn sanitize(html: &str) -> String {
    Sanitizer::default().clean(html)
}

/// Lowercased tag name at the start of `input`, empty if none.
fn read_tag_name(input: &str) -> String {
    let mut name = String::new();
    for ch in input.chars() {
        if ch.is_ascii_alphabetic() || (!name.is_empty() && ch.is_ascii_digit()) {
            name.push(ch.to_ascii_lowercase());
        } else {
            break;
        }
    }
    name
}

/// Parse attributes from after the tag name to past the closing `>`.
/// Tolerates quoting styles, missing values, and truncated input.
fn parse_attrs(html: &str, mut pos: usize) -> (Vec<(String, String)>, usize) {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut attrs = Vec::new();

    loop {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len {
            return (attrs, len);
        }
        match bytes[pos] {
            b'>' => return (attrs, pos + 1),
            b'/' => pos += 1,
            _ => {
                let start = pos;
                while pos < len
                    && !bytes[pos].is_ascii_whitespace()
                    && !matches!(bytes[pos], b'=' | b'>' | b'/')
                {
                    pos += 1;
                }
                if pos == start {
                    pos += 1;
                    continue;
                }
                let name = html[start..pos].to_ascii_lowercase();

                while pos < len && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                let mut value = String::new();
                if pos < len && bytes[pos] == b'=' {
                    pos += 1;
                    while pos < len && bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                    if pos < len && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                        let quote = bytes[pos];
                        pos += 1;
                        let start = pos;
                        while pos < len && bytes[pos] != quote {
                            pos += 1;
                        }
                        value = html[start..pos].to_string();
                        if pos < len {
                            pos += 1;
                        }
                    } else {
                        let start = pos;
                        while pos < len && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                            pos += 1;
                        }
                        value = html[start..pos].to_string();
                    }
                }
                attrs.push((name, value));
            }
        }
    }
}

/// Skip to just past `</name ... >`, case-insensitively; to the end of
/// input when the element is never closed.
fn skip_past_closing(html: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{name}");
    let hay = html[from..].to_ascii_lowercase();
    match hay.find(&needle) {
        Some(offset) => {
            let at = from + offset;
            html[at..].find('>').map_or(html.len(), |j| at + j + 1)
        }
        None => html.len(),
    }
}

/// One parse step over a `&` in attribute text.
enum CharRef {
    /// A reference browsers decode: the character and the consumed length.
    Decoded(char, usize),
    /// A bare `&` no browser decodes; keep it literal.
    Literal,
    /// Entity-shaped input outside the table; the caller rejects the value.
    Undecodable,
}

/// Parse the character reference at `input` (which starts with `&`).
///
/// Numeric references decode with or without the terminating semicolon,
/// matching browser attribute parsing. Named references need the
/// semicolon; the table covers the references that can appear in a URL,
/// and anything else named is `Undecodable` rather than guessed at.
fn parse_char_ref(input: &str) -> CharRef {
    let body = &input[1..];
    if let Some(numeric) = body.strip_prefix('#') {
        let (digits, prefix_len) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 2),
            None => (numeric, 1),
        };
        let radix = if prefix_len == 2 { 16 } else { 10 };
        let count = digits.chars().take_while(|c| c.is_digit(radix)).count();
        if count == 0 || count > 7 {
            return CharRef::Undecodable;
        }
        let Ok(code) = u32::from_str_radix(&digits[..count], radix) else {
            return CharRef::Undecodable;
        };
        let Some(ch) = char::from_u32(code) else {
            return CharRef::Undecodable;
        };
        let mut consumed = 1 + prefix_len + count;
        if input[consumed..].starts_with(';') {
            consumed += 1;
        }
        return CharRef::Decoded(ch, consumed);
    }
    let count = body.chars().take_while(|c| c.is_ascii_alphanumeric()).count();
    if count == 0 || count > 10 || !body[count..].starts_with(';') {
        return CharRef::Literal;
    }
    let ch = match &body[..count] {
        "amp" | "AMP" => '&',
        "lt" | "LT" => '<',
        "gt" | "GT" => '>',
        "quot" | "QUOT" => '"',
        "apos" => '\'',
        "colon" => ':',
        "semi" => ';',
        "sol" => '/',
        "num" => '#',
        "Tab" => '\t',
        "NewLine" => '\n',
        "nbsp" => '\u{a0}',
        _ => return CharRef::Undecodable,
    };
    CharRef::Decoded(ch, 1 + count + 1)
}

/// Decode character references the way a browser decodes an attribute
/// value, once. None when the value holds a reference outside the table.
fn decode_char_refs(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        match parse_char_ref(tail) {
            CharRef::Decoded(ch, len) => {
                out.push(ch);
                rest = &tail[len..];
            }
            CharRef::Literal => {
                out.push('&');
                rest = &tail[1..];
            }
            CharRef::Undecodable => return None,
        }
    }
    out.push_str(rest);
    Some(out)
}

/// Whether `input` (starting with `&`) begins a plausible entity.
fn starts_entity(input: &str) -> bool {
    let body = &input[1..];
    let Some(end) = body.find(';') else {
        return false;
    };
    if end == 0 || end > 10 {
        return false;
    }
    let name = &body[..end];
    if let Some(numeric) = name.strip_prefix('#') {
        let numeric = numeric.strip_prefix(['x', 'X']).unwrap_or(numeric);
        !numeric.is_empty() && numeric.bytes().all(|b| b.is_ascii_hexdigit())
    } else {
        name.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

fn push_text(out: &mut String, text: &str) {
    for (i, ch) in text.char_indices() {
        match ch {
            '&' if !starts_entity(&text[i..]) => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escape an attribute value. Every `&` is escaped, unlike text content:
/// attribute values were already decoded, so a preserved reference would
/// be decoded a second time by the browser.
fn push_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
