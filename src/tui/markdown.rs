//! Plain-text markdown rendering for descriptions and comments.
//!
//! Renderers are cached per wrap width behind a mutex. A failed
//! construction falls back to the raw text and is not cached, so a bad
//! width never poisons later frames.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use crate::util::text::wrap;

const MIN_WIDTH: usize = 4;

/// A renderer bound to one wrap width
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    width: usize,
}

impl MarkdownRenderer {
    pub fn new(width: usize) -> Result<MarkdownRenderer, String> {
        if width < MIN_WIDTH {
            return Err(format!("wrap width {width} is too narrow"));
        }
        Ok(MarkdownRenderer { width })
    }

    /// Strip inline markers, flatten headings and list bullets, wrap.
    pub fn render(&self, md: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        for line in md.lines() {
            let trimmed = line.trim_start();
            let flattened = if let Some(rest) = trimmed.strip_prefix("### ") {
                rest.to_string()
            } else if let Some(rest) = trimmed.strip_prefix("## ") {
                rest.to_string()
            } else if let Some(rest) = trimmed.strip_prefix("# ") {
                rest.to_string()
            } else if let Some(rest) = trimmed.strip_prefix("- ") {
                format!("{} {}", crate::tui::glyphs::current().bullet, rest)
            } else if let Some(rest) = trimmed.strip_prefix("* ") {
                format!("{} {}", crate::tui::glyphs::current().bullet, rest)
            } else {
                line.to_string()
            };
            let plain = strip_inline(&flattened);
            out.extend(wrap(&plain, self.width));
        }
        out.join("\n")
    }
}

/// Drop `**`, `*`, `` ` `` and `_` marker pairs, keeping their content
fn strip_inline(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' | '`' | '_' => {
                // Collapse runs of the same marker
                while chars.peek() == Some(&c) {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

static CACHE: LazyLock<Mutex<HashMap<usize, MarkdownRenderer>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Render through the width-keyed cache; construction failure degrades
/// to the raw text without caching.
pub fn render(md: &str, width: usize) -> String {
    let mut cache = CACHE.lock().expect("markdown cache poisoned");
    if let Some(renderer) = cache.get(&width) {
        return renderer.render(md);
    }
    match MarkdownRenderer::new(width) {
        Ok(renderer) => {
            let rendered = renderer.render(md);
            cache.insert(width, renderer);
            rendered
        }
        Err(_) => md.to_string(),
    }
}
